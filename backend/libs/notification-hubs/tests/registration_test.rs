use notification_hubs::headers::{APNS_PRIORITY, WNS_TYPE};
use notification_hubs::registration::{
    AppleTemplateRegistration, BaiduTemplateRegistration, FcmRegistration,
    WindowsTemplateRegistration, MAX_TEMPLATE_NAME_LENGTH,
};
use notification_hubs::{
    validate_registration, ApiVersion, PlatformRegistration, RegistrationDescription,
    ValidationError,
};

const CHANNEL: &str = "https://db5.notify.windows.com/?token=AwYAAAB";

fn windows(reg: &RegistrationDescription) -> &WindowsTemplateRegistration {
    match &reg.registration {
        PlatformRegistration::WindowsTemplate(t) => t,
        other => panic!("unexpected platform {:?}", other),
    }
}

#[test]
fn test_windows_toast_end_to_end() {
    notification_hubs::telemetry::init_tracing("notification_hubs=debug");

    let body = r#"<toast><visual><binding template="ToastText01"><text id="1">Hi</text></binding></visual></toast>"#;
    let reg = RegistrationDescription::new(WindowsTemplateRegistration::new(CHANNEL, body))
        .with_tags(["sports", "$InstallationId:{device-1}"]);

    let validated = validate_registration(&reg, ApiVersion::LATEST).unwrap();
    assert_eq!(windows(&validated).wns_headers.get(WNS_TYPE), Some("toast"));
    assert!(windows(&validated).expressions.is_empty());
    assert_eq!(validated.tags_string(), "$InstallationId:{device-1},sports");
}

#[test]
fn test_repeated_attribute_expression_gets_ascending_offsets() {
    let body = r#"<tile><visual><binding template="$(tpl)"/><binding template="$(tpl)"/></visual></tile>"#;
    let reg = RegistrationDescription::new(WindowsTemplateRegistration::new(CHANNEL, body));

    let validated = validate_registration(&reg, ApiVersion::LATEST).unwrap();
    let expressions = &windows(&validated).expressions;
    assert_eq!(expressions.len(), 2);
    assert!(expressions[0].start < expressions[1].start);
    for e in expressions {
        assert_eq!(&body[e.start..e.start + e.length], "$(tpl)");
    }
    assert_eq!(windows(&validated).wns_headers.get(WNS_TYPE), Some("tile"));
}

#[test]
fn test_composite_expression_with_escaped_quote() {
    let body = r#"<toast><visual><binding template="ToastText01"><text id="1">{'Hi &amp; welcome, ' + $(name)}</text></binding></visual></toast>"#;
    let reg = RegistrationDescription::new(WindowsTemplateRegistration::new(CHANNEL, body));

    let validated = validate_registration(&reg, ApiVersion::LATEST).unwrap();
    let e = &windows(&validated).expressions[0];
    assert_eq!(e.expression, "{'Hi & welcome, ' + $(name)}");
    assert_eq!(&body[e.start..e.start + e.length], "{'Hi &amp; welcome, ' + $(name)}");

    // composite expressions postdate the first API versions
    let err = validate_registration(&reg, ApiVersion::V2013_04).unwrap_err();
    assert_eq!(err.reason(), "UnsupportedExpression");
}

#[test]
fn test_unknown_windows_root_fails() {
    let reg = RegistrationDescription::new(WindowsTemplateRegistration::new(
        CHANNEL,
        "<notification><text>Hi</text></notification>",
    ));
    let err = validate_registration(&reg, ApiVersion::LATEST).unwrap_err();
    assert!(matches!(err, ValidationError::MalformedPayload { .. }));
}

#[test]
fn test_raw_windows_template_skips_inference() {
    let mut template = WindowsTemplateRegistration::new(CHANNEL, "<data>$(payload)</data>");
    template.wns_headers.insert(WNS_TYPE, "wns/raw").unwrap();
    let reg = RegistrationDescription::new(template);

    let validated = validate_registration(&reg, ApiVersion::LATEST).unwrap();
    assert_eq!(windows(&validated).wns_headers.len(), 1);

    let mut broken = WindowsTemplateRegistration::new(CHANNEL, "<data>");
    broken.wns_headers.insert(WNS_TYPE, "wns/raw").unwrap();
    let err = validate_registration(&RegistrationDescription::new(broken), ApiVersion::LATEST)
        .unwrap_err();
    assert_eq!(err.reason(), "NotSupportedXmlFormat");
}

#[test]
fn test_template_name_limit() {
    let body = r#"{"aps":{"alert":"$(message)"}}"#;
    let ok = AppleTemplateRegistration::new("ab12cd34", body)
        .with_template_name("n".repeat(MAX_TEMPLATE_NAME_LENGTH));
    assert!(validate_registration(&RegistrationDescription::new(ok), ApiVersion::LATEST).is_ok());

    let too_long = AppleTemplateRegistration::new("ab12cd34", body)
        .with_template_name("n".repeat(MAX_TEMPLATE_NAME_LENGTH + 1));
    let err = validate_registration(&RegistrationDescription::new(too_long), ApiVersion::LATEST)
        .unwrap_err();
    assert!(matches!(err, ValidationError::LimitExceeded { limit: 200, .. }));
    assert!(err.to_string().contains("200"));
}

#[test]
fn test_apple_header_and_field_rules() {
    let body = r#"{"aps":{"alert":"$(message)"}}"#;
    let mut template = AppleTemplateRegistration::new("ab12cd34", body);
    template.expiry = Some("$(expiry)".into());
    template.priority = Some("10".into());
    template.apns_headers.insert(APNS_PRIORITY, "$(prio)").unwrap();
    assert!(validate_registration(&RegistrationDescription::new(template.clone()), ApiVersion::LATEST).is_ok());

    let mut bad_key = template.clone();
    bad_key.apns_headers.insert("x-collapse", "id").unwrap();
    let err = validate_registration(&RegistrationDescription::new(bad_key), ApiVersion::LATEST)
        .unwrap_err();
    assert_eq!(err.reason(), "InvalidApnsHeaderKey");
    assert!(err.to_string().contains("x-collapse"));

    let mut bad_priority = template;
    bad_priority.priority = Some("256".into());
    let err = validate_registration(&RegistrationDescription::new(bad_priority), ApiVersion::LATEST)
        .unwrap_err();
    assert_eq!(err.reason(), "InvalidApnsPriority");
}

#[test]
fn test_baidu_bad_json_gets_friendly_error() {
    let template = BaiduTemplateRegistration::new("user", "channel", r#"{"title": "#);
    let err = validate_registration(&RegistrationDescription::new(template), ApiVersion::LATEST)
        .unwrap_err();
    assert_eq!(err.reason(), "BodyTemplateDeserializeFailed");
}

#[test]
fn test_wire_adapters() {
    let mut reg = RegistrationDescription::new(FcmRegistration::new("fcm-token"))
        .with_registration_id("8721-4cc9")
        .with_etag("3");
    reg.set_tags_string("a,b,$InstallationId:{x=1},c");
    assert!(!reg.invalid_tags());
    assert_eq!(reg.tags().len(), 4);

    reg.set_property_bag_string(r#"{"lang":"en"}"#).unwrap();
    assert_eq!(reg.push_variables.get("lang").map(String::as_str), Some("en"));

    let json = serde_json::to_string(&reg).unwrap();
    let back: RegistrationDescription = serde_json::from_str(&json).unwrap();
    assert_eq!(back, reg);
    assert!(validate_registration(&back, ApiVersion::LATEST).is_ok());
}
