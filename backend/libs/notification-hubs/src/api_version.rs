use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Management API version the hub is addressed with
///
/// Template expression features are gated on the version (see
/// [`crate::expression`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ApiVersion {
    #[serde(rename = "2013-04")]
    V2013_04,
    #[serde(rename = "2013-07")]
    V2013_07,
    #[serde(rename = "2013-08")]
    V2013_08,
    #[serde(rename = "2013-10")]
    V2013_10,
    #[serde(rename = "2014-01")]
    V2014_01,
    #[serde(rename = "2014-09")]
    V2014_09,
    #[serde(rename = "2015-01")]
    V2015_01,
    #[serde(rename = "2016-07")]
    V2016_07,
    #[serde(rename = "2017-04")]
    V2017_04,
}

impl ApiVersion {
    pub const LATEST: ApiVersion = ApiVersion::V2017_04;

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V2013_04 => "2013-04",
            ApiVersion::V2013_07 => "2013-07",
            ApiVersion::V2013_08 => "2013-08",
            ApiVersion::V2013_10 => "2013-10",
            ApiVersion::V2014_01 => "2014-01",
            ApiVersion::V2014_09 => "2014-09",
            ApiVersion::V2015_01 => "2015-01",
            ApiVersion::V2016_07 => "2016-07",
            ApiVersion::V2017_04 => "2017-04",
        }
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        ApiVersion::LATEST
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "2013-04" => Ok(ApiVersion::V2013_04),
            "2013-07" => Ok(ApiVersion::V2013_07),
            "2013-08" => Ok(ApiVersion::V2013_08),
            "2013-10" => Ok(ApiVersion::V2013_10),
            "2014-01" => Ok(ApiVersion::V2014_01),
            "2014-09" => Ok(ApiVersion::V2014_09),
            "2015-01" => Ok(ApiVersion::V2015_01),
            "2016-07" => Ok(ApiVersion::V2016_07),
            "2017-04" => Ok(ApiVersion::V2017_04),
            other => Err(format!("Unknown API version: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let version: ApiVersion = "2015-01".parse().unwrap();
        assert_eq!(version, ApiVersion::V2015_01);
        assert_eq!(version.to_string(), "2015-01");
        assert!("2099-01".parse::<ApiVersion>().is_err());
    }

    #[test]
    fn test_versions_are_ordered() {
        assert!(ApiVersion::V2013_04 < ApiVersion::V2013_08);
        assert_eq!(ApiVersion::default(), ApiVersion::V2017_04);
    }
}
