use notification_hubs::tags::expression::{validate_tag_expression, MAX_MIXED_TAGS, MAX_OR_ONLY_TAGS};
use notification_hubs::tags::{tag_count, validate_tags, MAX_TAG_LENGTH};
use notification_hubs::registration::FcmRegistration;
use notification_hubs::{RegistrationDescription, ValidationError};

#[test]
fn test_tag_list_grammar() {
    assert!(validate_tags(""));
    assert!(validate_tags("a,b,$InstallationId:{x=1},c"));
    assert!(validate_tags("$InstallationId:{x},user@example.com,team#1"));
    assert!(validate_tags("Region:EU,lang.en-GB"));

    assert!(!validate_tags("$InstallationId:{x},$InstallationId:{y}"));
    assert!(!validate_tags("a,,b"));
    assert!(!validate_tags("has space"));
    assert!(!validate_tags("a,"));
}

#[test]
fn test_tag_count_is_naive() {
    assert_eq!(tag_count("a,b,c"), 3);
    assert_eq!(tag_count(",a,"), 3);
    assert_eq!(tag_count(""), 1);
}

#[test]
fn test_registration_tags_reset_on_invalid_input() {
    let mut reg = RegistrationDescription::new(FcmRegistration::new("token"));
    reg.set_tags_string("sports,news");
    assert_eq!(reg.tags().len(), 2);

    reg.set_tags_string("sports,has space");
    assert!(reg.invalid_tags());
    assert!(reg.tags().is_empty());

    reg.set_tags(["x".repeat(MAX_TAG_LENGTH + 1)]);
    assert!(reg.invalid_tags());
}

#[test]
fn test_tag_expression_limits() {
    let or_only = (0..MAX_OR_ONLY_TAGS)
        .map(|i| format!("tag{}", i))
        .collect::<Vec<_>>()
        .join(" || ");
    assert!(validate_tag_expression(&or_only).is_ok());

    let too_many = format!("{} || extra", or_only);
    let err = validate_tag_expression(&too_many).unwrap_err();
    assert!(matches!(err, ValidationError::LimitExceeded { limit: 20, .. }));

    let mixed = (0..MAX_MIXED_TAGS)
        .map(|i| format!("t{}", i))
        .collect::<Vec<_>>()
        .join(" && ");
    assert!(validate_tag_expression(&mixed).is_ok());
    let err = validate_tag_expression(&format!("({}) && !t99", mixed)).unwrap_err();
    assert!(matches!(err, ValidationError::LimitExceeded { limit: 6, .. }));
}

#[test]
fn test_tag_expression_syntax() {
    assert!(validate_tag_expression("sports").is_ok());
    assert!(validate_tag_expression("(sports || news) && !muted").is_ok());
    assert!(validate_tag_expression("$InstallationId:{abc} || vip").is_ok());

    for bad in ["", "a &&", "(a || b", "a b", "a & b"] {
        let err = validate_tag_expression(bad).unwrap_err();
        assert_eq!(err.reason(), "InvalidTagExpression", "input {:?}", bad);
    }
}
