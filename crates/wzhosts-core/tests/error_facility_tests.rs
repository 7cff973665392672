use wzhosts_core::errors::{ExError, ExErrorKind, HostsError};

#[test]
fn test_not_found_verifiable_by_kind() {
    let err = HostsError::HostNotFound {
        id: "unknown".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::NotFound);
    assert_eq!(ex_err.code(), "ERR_NOT_FOUND");
    assert_eq!(ex_err.entity_id(), Some("unknown"));
    assert_eq!(ex_err.message(), "Host unknown not found");
}

#[test]
fn test_empty_store_is_precondition_not_not_found() {
    let ex_err: ExError = HostsError::NoHostsConfigured.into();

    assert_eq!(ex_err.kind(), ExErrorKind::PreconditionFailed);
    assert_ne!(ex_err.kind(), ExErrorKind::NotFound);
    assert_eq!(ex_err.message(), "There are not configured hosts");
}

#[test]
fn test_busy_message_and_kind() {
    let ex_err: ExError = HostsError::Busy.into();

    assert_eq!(ex_err.kind(), ExErrorKind::Busy);
    assert!(ex_err.is_retryable());
    assert_eq!(
        ex_err.message(),
        "Another process is updating the configuration file"
    );
}

#[test]
fn test_codec_errors_share_one_kind() {
    let record: ExError = HostsError::MalformedRecord {
        reason: "host id is empty".to_string(),
    }
    .into();
    let list: ExError = HostsError::MalformedHostList {
        reason: "wazuh.hosts is not a list".to_string(),
    }
    .into();

    assert_eq!(record.kind(), ExErrorKind::Codec);
    assert_eq!(list.kind(), ExErrorKind::Codec);
    assert!(list.message().contains("not a list"));
}
