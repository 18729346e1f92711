use hr_core::errors::{ErrorInfo, HrError};
use hr_core::Quota;

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("vertex", "r1")
        .with_context("reason", "example")
}

#[test]
fn graph_error_surface() {
    let err = HrError::Graph(sample_info("asymmetric-edge", "edge missing on one side"));
    assert_eq!(err.code(), "asymmetric-edge");
    assert!(err.info().context.contains_key("vertex"));
}

#[test]
fn format_error_surface() {
    let err = HrError::Format(sample_info("unexpected-token", "expected ';'"));
    assert_eq!(err.info().code, "unexpected-token");
    assert!(err.to_string().starts_with("format error:"));
}

#[test]
fn internal_error_surface() {
    let err = HrError::Internal(sample_info("over-capacity", "receiver overfull"));
    assert_eq!(err.code(), "over-capacity");
}

#[test]
fn context_is_added_without_changing_family() {
    let err = HrError::Matching(ErrorInfo::new("unknown-pair", "pair not in graph"))
        .with_context("line", 3);
    match err {
        HrError::Matching(info) => assert_eq!(info.context.get("line"), Some(&"3".to_string())),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn display_includes_context_and_hint() {
    let err = HrError::Config(
        ErrorInfo::new("empty-partition", "no proposers requested")
            .with_context("proposers", "0")
            .with_hint("set proposers >= 1"),
    );
    let text = err.to_string();
    assert!(text.contains("proposers=0"));
    assert!(text.contains("hint: set proposers >= 1"));
}

#[test]
fn errors_round_trip_through_json() {
    let err = HrError::Serde(sample_info("deserialize-json", "bad payload"));
    let json = serde_json::to_string(&err).unwrap();
    let restored: HrError = serde_json::from_str(&json).unwrap();
    assert_eq!(err, restored);
}

#[test]
fn quota_rejects_inverted_bounds() {
    let err = Quota::new(3, 2).unwrap_err();
    assert_eq!(err.code(), "invalid-quota");
    let quota = Quota::new(1, 4).unwrap();
    assert_eq!((quota.lower(), quota.upper()), (1, 4));
    assert_eq!(Quota::default(), Quota::unit());
    assert_eq!(Quota::unit().to_string(), "(0,1)");
}
