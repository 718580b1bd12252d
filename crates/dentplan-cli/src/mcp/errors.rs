//! Error handling utilities for the MCP server

use dentplan_core::{ErrorKind, PlannerError};
use rmcp::ErrorData;
use serde_json::json;

/// Converts a planner error into an MCP error of the matching class.
///
/// The outcome class, its HTTP-equivalent status and the validation code (if
/// any) travel in the error data so clients can branch without parsing the
/// message.
pub fn to_mcp_error(message: &str, error: &PlannerError) -> ErrorData {
    let kind = error.kind();
    let text = format!("{message}: {error}");
    let data = Some(json!({
        "kind": format!("{kind:?}"),
        "status": kind.status_code(),
        "code": error.code(),
    }));

    match kind {
        ErrorKind::NotFound => ErrorData::resource_not_found(text, data),
        ErrorKind::Validation => ErrorData::invalid_params(text, data),
        ErrorKind::Conflict | ErrorKind::AccessDenied => ErrorData::invalid_request(text, data),
        ErrorKind::Internal => ErrorData::internal_error(text, data),
    }
}

#[cfg(test)]
mod tests {
    use dentplan_core::error::codes;
    use rmcp::model::ErrorCode;

    use super::*;

    #[test]
    fn test_error_classes_map_to_mcp_codes() {
        let missing = PlannerError::not_found("Plan", "TP-20260101-0009");
        assert_eq!(
            to_mcp_error("Failed to get plan", &missing).code,
            ErrorCode::RESOURCE_NOT_FOUND
        );

        let invalid = PlannerError::validation(codes::EMPTY_PLAN, "plan has no items");
        let error = to_mcp_error("Failed to submit plan", &invalid);
        assert_eq!(error.code, ErrorCode::INVALID_PARAMS);
        assert!(error.message.contains("plan has no items"));
        let data = error.data.unwrap();
        assert_eq!(data["code"], "EMPTY_PLAN");
        assert_eq!(data["status"], 400);

        let denied = PlannerError::access_denied("not your plan");
        assert_eq!(
            to_mcp_error("Failed to cancel plan", &denied).code,
            ErrorCode::INVALID_REQUEST
        );
    }
}
