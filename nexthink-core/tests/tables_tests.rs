//! Integration tests for the constant tables.

use nexthink_core::{ErrorKind, ExportStatus, Region, status_code};

#[test]
fn test_every_documented_status_has_a_specific_message() {
    let documented = [
        status_code::BAD_REQUEST,
        status_code::UNAUTHORIZED,
        status_code::FORBIDDEN,
        status_code::NOT_FOUND,
        status_code::CONFLICT,
        status_code::UNPROCESSABLE_ENTITY,
        status_code::TOO_MANY_REQUESTS,
        status_code::INTERNAL_SERVER_ERROR,
        status_code::BAD_GATEWAY,
        status_code::SERVICE_UNAVAILABLE,
        status_code::GATEWAY_TIMEOUT,
    ];

    for status in documented {
        let kind = ErrorKind::from_status(status);
        assert_ne!(kind, ErrorKind::Other, "status {status}");
        assert_ne!(kind.default_message(), "Unknown error");
    }
}

#[test]
fn test_region_serde_matches_hostname_form() {
    let region: Region = serde_json::from_str(r#""pac""#).unwrap();
    assert_eq!(region, Region::Pac);
    assert_eq!(serde_json::to_string(&Region::Meta).unwrap(), r#""meta""#);
}

#[test]
fn test_export_status_in_struct() {
    #[derive(serde::Deserialize)]
    struct Status {
        status: ExportStatus,
    }

    let parsed: Status = serde_json::from_str(r#"{"status":"SUBMITTED"}"#).unwrap();
    assert_eq!(parsed.status, ExportStatus::Submitted);
    assert!(!parsed.status.is_terminal());
}
