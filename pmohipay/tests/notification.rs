use pmohipay::{
    HipayClient, NotificationError, NotificationOperation, NotificationStatus,
    ParseNotificationOptions,
};

const PASSWORD: &str = "FAKE_PASSWORD";

fn snapshot(name: &str) -> String {
    let path = format!("{}/tests/snapshots/{}", env!("CARGO_MANIFEST_DIR"), name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {path}: {e}"))
}

fn client() -> HipayClient {
    HipayClient::new("stage", "FAKE_LOGIN", PASSWORD).unwrap()
}

#[test]
fn parse_notification_matches_snapshot() -> anyhow::Result<()> {
    let notification = client().parse_notification(&snapshot("notification_hashed.xml"), None)?;

    let expected: serde_json::Value =
        serde_json::from_str(&snapshot("notification_hashed.result.json"))?;
    assert_eq!(serde_json::to_value(&notification)?, expected);

    let result = &notification.result;
    assert_eq!(result.operation(), Some(NotificationOperation::Capture));
    assert_eq!(result.status(), Some(NotificationStatus::Ok));
    assert_eq!(result.transid(), Some("5D8C9A2B6A6C1"));
    assert_eq!(result.orig_amount(), Some("14.39"));
    assert_eq!(result.merchant_data("color"), Some("yellow"));
    assert_eq!(result.return_code(), None);
    Ok(())
}

#[test]
fn shape_errors() {
    let client = client();

    assert_eq!(
        client.parse_notification("", None),
        Err(NotificationError::Incomplete)
    );
    assert_eq!(
        client.parse_notification(&snapshot("notification_incomplete.xml"), None),
        Err(NotificationError::Incomplete)
    );
    assert_eq!(
        client.parse_notification(&snapshot("notification_malformed.xml"), None),
        Err(NotificationError::Decode)
    );
    assert_eq!(
        NotificationError::Decode.to_string(),
        "cannot decode XML content"
    );
}

#[test]
fn default_options_accept_both_schemes() {
    let client = client();
    assert!(
        client
            .parse_notification(&snapshot("notification_hashed.xml"), None)
            .is_ok()
    );
    assert!(
        client
            .parse_notification(&snapshot("notification_signed.xml"), None)
            .is_ok()
    );
}

#[test]
fn tampered_digest_cites_both_schemes() {
    let err = client()
        .parse_notification(&snapshot("notification_bad_hash.xml"), None)
        .unwrap_err();

    match &err {
        NotificationError::BadDigest(legacy, signature) => {
            assert!(legacy.starts_with("0123456789abcdef0123456789abcdef(current) != "));
            assert!(signature.ends_with("(expected)"));
            assert_ne!(legacy, signature);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(err.to_string().starts_with("bad digest: "));
}

#[test]
fn signature_only() {
    let client = client();
    let options = ParseNotificationOptions::signature_only();

    assert!(
        client
            .parse_notification(&snapshot("notification_signed.xml"), Some(&options))
            .is_ok()
    );
    assert!(matches!(
        client.parse_notification(&snapshot("notification_hashed.xml"), Some(&options)),
        Err(NotificationError::BadSignature(_))
    ));
    let err = client
        .parse_notification(&snapshot("notification_bad_hash.xml"), Some(&options))
        .unwrap_err();
    assert!(err.to_string().starts_with("bad signature: "));
}

#[test]
fn both_flags_check_the_signature_only() {
    let client = client();
    let options = ParseNotificationOptions {
        check_digest: true,
        check_signature: true,
    };

    assert!(
        client
            .parse_notification(&snapshot("notification_signed.xml"), Some(&options))
            .is_ok()
    );
    assert!(matches!(
        client.parse_notification(&snapshot("notification_hashed.xml"), Some(&options)),
        Err(NotificationError::BadSignature(_))
    ));
}

#[test]
fn wrong_password_rejects_signature() {
    let client = HipayClient::new("stage", "FAKE_LOGIN", "OTHER_PASSWORD").unwrap();
    let options = ParseNotificationOptions::signature_only();
    assert!(
        client
            .parse_notification(&snapshot("notification_signed.xml"), Some(&options))
            .is_err()
    );
    // the legacy digest does not involve the password
    assert!(
        client
            .parse_notification(&snapshot("notification_hashed.xml"), None)
            .is_ok()
    );
}

#[test]
fn illegal_digest_is_rejected_before_hashing() {
    let client = client();
    for options in [
        ParseNotificationOptions::default(),
        ParseNotificationOptions::signature_only(),
    ] {
        assert_eq!(
            client.parse_notification(&snapshot("notification_illegal_hash.xml"), Some(&options)),
            Err(NotificationError::InvalidDigest)
        );
    }
}

#[test]
fn verification_can_be_disabled() {
    let client = client();
    let options = ParseNotificationOptions::unchecked();
    for name in [
        "notification_bad_hash.xml",
        "notification_illegal_hash.xml",
        "notification_signed.xml",
    ] {
        assert!(
            client
                .parse_notification(&snapshot(name), Some(&options))
                .is_ok(),
            "{name}"
        );
    }
}

#[test]
fn form_encoded_callback() -> anyhow::Result<()> {
    let xml = snapshot("notification_signed.xml");
    let body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("xml", &xml)
        .finish();

    let notification = client().parse_notification_form(&body, None)?;
    assert_eq!(notification.version, "1.0");
    assert_eq!(notification.result.id_for_merchant(), Some("REF-42"));

    assert_eq!(
        client().parse_notification_form("foo=bar", None),
        Err(NotificationError::MissingXmlField)
    );
    Ok(())
}
