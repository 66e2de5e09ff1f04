//! Checks shared by every template registration

use tracing::debug;

use crate::api_version::ApiVersion;
use crate::error::{Result, ValidationError};
use crate::expression::{self, ExpressionType};
use crate::headers::HeaderCollection;
use crate::payload::{self, TemplateExpression};

/// Maximum length of a template name
pub const MAX_TEMPLATE_NAME_LENGTH: usize = 200;

pub fn validate_template_name(name: Option<&str>) -> Result<()> {
    match name {
        Some(name) if name.chars().count() > MAX_TEMPLATE_NAME_LENGTH => {
            Err(ValidationError::LimitExceeded {
                reason: "TemplateNameLengthExceeded",
                field: "TemplateName".to_string(),
                limit: MAX_TEMPLATE_NAME_LENGTH,
            })
        }
        _ => Ok(()),
    }
}

/// Fails naming `key` when the header is absent or blank
pub fn require_header(headers: &HeaderCollection, key: &str) -> Result<()> {
    match headers.get(key) {
        Some(value) if !value.trim().is_empty() => Ok(()),
        _ => Err(ValidationError::missing("MissingHeader", key)),
    }
}

/// Blank values fail outright, the rest go through the expression grammar
pub fn validate_header_values(headers: &HeaderCollection, version: ApiVersion) -> Result<()> {
    for (key, value) in headers.iter() {
        validate_header_value(key, value, version)?;
    }
    Ok(())
}

pub fn validate_header_value(key: &str, value: &str, version: ApiVersion) -> Result<ExpressionType> {
    if value.trim().is_empty() {
        return Err(ValidationError::missing("HeaderValueEmpty", key));
    }
    expression::validate(value, version)
}

/// XML-or-JSON body check used by the WNS and MPNS templates
pub fn scan_xml_or_json_body(body: &str, version: ApiVersion) -> Result<Vec<TemplateExpression>> {
    if payload::is_xml_payload(body) {
        payload::scan_xml_template(body, version)
    } else if payload::is_json_object_payload(body) {
        payload::scan_json_template(body, version)?;
        Ok(Vec::new())
    } else {
        debug!("Body template is neither XML nor a JSON object");
        Err(ValidationError::malformed(
            "InvalidPayloadFormat",
            "body template must be an XML document or a JSON object",
        ))
    }
}

/// JSON body and name check used by the APNs, Baidu, ADM, FCM and browser templates
pub fn validate_json_template(
    body: &str,
    template_name: Option<&str>,
    version: ApiVersion,
) -> Result<()> {
    payload::scan_json_template(body, version)?;
    validate_template_name(template_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_name_limit() {
        let at_limit = "n".repeat(200);
        assert!(validate_template_name(Some(&at_limit)).is_ok());

        let over = "n".repeat(201);
        let err = validate_template_name(Some(&over)).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::LimitExceeded { limit: 200, .. }
        ));
        assert!(err.to_string().contains("200"));
        assert!(validate_template_name(None).is_ok());
    }

    #[test]
    fn test_blank_header_value_fails_before_expression_check() {
        let err = validate_header_value("X-WNS-Type", "  ", ApiVersion::LATEST).unwrap_err();
        assert_eq!(err.reason(), "HeaderValueEmpty");
        assert!(err.to_string().contains("X-WNS-Type"));
    }

    #[test]
    fn test_require_header() {
        let mut headers = HeaderCollection::new();
        assert_eq!(
            require_header(&headers, "X-WNS-Type").unwrap_err().reason(),
            "MissingHeader"
        );
        headers.insert("x-wns-type", "toast").unwrap();
        assert!(require_header(&headers, "X-WNS-Type").is_ok());
    }

    #[test]
    fn test_body_must_be_xml_or_json() {
        let err = scan_xml_or_json_body("plain text", ApiVersion::LATEST).unwrap_err();
        assert_eq!(err.reason(), "InvalidPayloadFormat");
        assert!(scan_xml_or_json_body(r#"{"k":"$(v)"}"#, ApiVersion::LATEST)
            .unwrap()
            .is_empty());
    }
}
