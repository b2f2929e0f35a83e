//! Input checks run before any NQL request is sent.

use nexthink_transport::TransportError;

use super::models::{ExecuteRequest, ExportRequest};

/// Maximum length of a query identifier.
pub const MAX_QUERY_ID_LENGTH: usize = 256;

/// Maximum length of a platform name.
pub const MAX_PLATFORM_LENGTH: usize = 50;

/// Maximum length of an export identifier.
pub const MAX_EXPORT_ID_LENGTH: usize = 256;

/// Validates an execute request.
pub fn validate_execute_request(request: &ExecuteRequest) -> Result<(), TransportError> {
    validate_query_id(&request.query_id)?;
    validate_platform(request.platform.as_deref())
}

/// Validates an export request.
///
/// The format is a closed enum and needs no check here.
pub fn validate_export_request(request: &ExportRequest) -> Result<(), TransportError> {
    validate_query_id(&request.query_id)?;
    validate_platform(request.platform.as_deref())
}

/// Validates an export identifier.
pub fn validate_export_id(export_id: &str) -> Result<(), TransportError> {
    if export_id.is_empty() {
        return invalid("export ID cannot be empty".to_string());
    }
    if export_id.len() > MAX_EXPORT_ID_LENGTH {
        return invalid(format!(
            "export ID exceeds maximum length of {MAX_EXPORT_ID_LENGTH} characters"
        ));
    }
    // The id becomes a single path segment.
    if export_id == "." || export_id == ".." {
        return invalid(format!("export ID is not a valid path segment: {export_id}"));
    }
    if let Some(c) = export_id
        .chars()
        .find(|&c| matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_whitespace() || c.is_control())
    {
        return invalid(format!("export ID contains invalid character {c:?}"));
    }
    Ok(())
}

fn validate_query_id(query_id: &str) -> Result<(), TransportError> {
    if query_id.is_empty() {
        return invalid("query ID is required".to_string());
    }
    if !query_id.starts_with('#') {
        return invalid(format!("query ID must start with '#', got: {query_id}"));
    }
    if query_id.len() > MAX_QUERY_ID_LENGTH {
        return invalid(format!(
            "query ID exceeds maximum length of {MAX_QUERY_ID_LENGTH} characters"
        ));
    }
    Ok(())
}

fn validate_platform(platform: Option<&str>) -> Result<(), TransportError> {
    match platform {
        Some(p) if p.len() > MAX_PLATFORM_LENGTH => invalid(format!(
            "platform exceeds maximum length of {MAX_PLATFORM_LENGTH} characters"
        )),
        _ => Ok(()),
    }
}

fn invalid(message: String) -> Result<(), TransportError> {
    Err(TransportError::InvalidInput(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_id_rules() {
        assert!(validate_execute_request(&ExecuteRequest::new("#ok")).is_ok());

        let err = validate_execute_request(&ExecuteRequest::new("")).unwrap_err();
        assert_eq!(err.to_string(), "invalid input: query ID is required");

        let err = validate_execute_request(&ExecuteRequest::new("no_hash")).unwrap_err();
        assert!(err.to_string().contains("must start with '#'"));

        let long = format!("#{}", "q".repeat(256));
        assert!(validate_execute_request(&ExecuteRequest::new(long)).is_err());
        let max = format!("#{}", "q".repeat(255));
        assert!(validate_execute_request(&ExecuteRequest::new(max)).is_ok());
    }

    #[test]
    fn test_platform_length() {
        let ok = ExportRequest::new("#q").with_platform("p".repeat(50));
        assert!(validate_export_request(&ok).is_ok());
        let too_long = ExportRequest::new("#q").with_platform("p".repeat(51));
        assert!(validate_export_request(&too_long).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_export_id() {
        assert!(validate_export_id("abc").is_ok());
        assert!(validate_export_id("").is_err());
        assert!(validate_export_id(&"e".repeat(257)).is_err());
        assert!(validate_export_id(&"e".repeat(256)).is_ok());
    }

    #[test]
    fn test_export_id_must_be_one_path_segment() {
        assert!(validate_export_id("3f2a-41c9_b7.e1").is_ok());
        for bad in ["..", ".", "a/b", "../status", "e1?x=1", "e1#f", "e%2F1", "e 1", "e\\1"] {
            let err = validate_export_id(bad).unwrap_err();
            assert!(err.is_invalid_input(), "{bad}");
        }
    }
}
