use super::*;

#[test]
fn request_sets_fields() {
    let frame = Frame::request("source:edit", Data::new());
    assert_eq!(frame.syscall, "source:edit");
    assert_eq!(frame.status, Status::Request);
    assert!(frame.parent_id.is_none());
    assert!(frame.ts > 0);
}

#[test]
fn reply_inherits_context() {
    let req = Frame::request("viewport:zoom", Data::new());
    let done = req.done(Data::new());

    assert_eq!(done.parent_id, Some(req.id));
    assert_eq!(done.syscall, "viewport:zoom");
    assert_eq!(done.status, Status::Done);
}

#[test]
fn terminal_statuses() {
    assert!(Status::Done.is_terminal());
    assert!(Status::Error.is_terminal());
    assert!(!Status::Request.is_terminal());
}

#[test]
fn prefix_extraction() {
    let frame = Frame::request("viewport:drag:begin", Data::new());
    assert_eq!(frame.prefix(), "viewport");

    let frame = Frame::request("noseparator", Data::new());
    assert_eq!(frame.prefix(), "noseparator");
}

#[test]
fn missing_data_deserializes_empty() {
    let id = Uuid::new_v4();
    let json = format!(r#"{{"id":"{id}","parent_id":null,"ts":1,"syscall":"source:rerender","status":"request"}}"#);
    let frame: Frame = serde_json::from_str(&json).expect("deserialize");
    assert!(frame.data.is_empty());
    assert_eq!(frame.prefix(), "source");
}

#[test]
fn typed_field_accessors() {
    let frame = Frame::request("viewport:drag:move", Data::new())
        .with_data("x", 12.5)
        .with_data("label", "hello");
    assert_eq!(frame.f64_field("x"), Some(12.5));
    assert_eq!(frame.str_field("label"), Some("hello"));
    assert_eq!(frame.f64_field("label"), None);
    assert_eq!(frame.str_field("missing"), None);
}

#[test]
fn error_from_typed() {
    #[derive(Debug, thiserror::Error)]
    #[error("nothing rendered")]
    struct NothingRendered;

    impl ErrorCode for NothingRendered {
        fn error_code(&self) -> &'static str {
            "E_NO_ARTIFACT"
        }
    }

    let req = Frame::request("export:png", Data::new());
    let err = req.error_from(&NothingRendered);

    assert_eq!(err.status, Status::Error);
    assert_eq!(err.data.get("code").and_then(|v| v.as_str()), Some("E_NO_ARTIFACT"));
    assert_eq!(err.data.get("message").and_then(|v| v.as_str()), Some("nothing rendered"));
    assert_eq!(
        err.data
            .get("retryable")
            .and_then(serde_json::Value::as_bool),
        Some(false)
    );
}
