//! Helpers for translating internal errors into protocol-specific payloads.

use a2a_types::JSONRPCError;
use serde_json::json;

use crate::errors::AgentError;

/// Map an [`AgentError`] into an A2A-compliant [`JSONRPCError`].
#[must_use]
pub fn to_jsonrpc_error(error: AgentError) -> JSONRPCError {
    match error {
        AgentError::InvalidInput(message) => JSONRPCError::invalid_params(message),
        AgentError::Serialization { format, reason } => {
            JSONRPCError::invalid_params(format!("Invalid {format} params: {reason}"))
        }
        AgentError::TaskNotFound { task_id } => {
            JSONRPCError::task_not_found(&task_id).with_data(json!({ "taskId": task_id }))
        }
        AgentError::TaskNotCancelable { task_id, state } => {
            JSONRPCError::task_not_cancelable(&task_id)
                .with_data(json!({ "taskId": task_id, "state": state }))
        }
        AgentError::InvalidConfiguration { field, reason } => JSONRPCError::invalid_request(
            format!("Invalid configuration for {field}: {reason}"),
        )
        .with_data(json!({ "field": field, "reason": reason })),
        AgentError::MissingConfiguration { field } => {
            JSONRPCError::invalid_request(format!("Missing configuration: {field}"))
                .with_data(json!({ "field": field }))
        }
        other => {
            JSONRPCError::internal("Internal error").with_data(json!({ "details": other.to_string() }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a2a_types::error_codes;

    #[test]
    fn invalid_input_maps_to_invalid_params() {
        let err = to_jsonrpc_error(AgentError::InvalidInput("bad".into()));
        assert_eq!(err.code, error_codes::INVALID_PARAMS);
        assert!(err.message.contains("bad"));
    }

    #[test]
    fn task_errors_use_a2a_codes() {
        let err = to_jsonrpc_error(AgentError::TaskNotFound {
            task_id: "t-1".into(),
        });
        assert_eq!(err.code, error_codes::TASK_NOT_FOUND);
        assert_eq!(err.data, Some(json!({ "taskId": "t-1" })));

        let err = to_jsonrpc_error(AgentError::TaskNotCancelable {
            task_id: "t-1".into(),
            state: "completed".into(),
        });
        assert_eq!(err.code, error_codes::TASK_NOT_CANCELABLE);
    }

    #[test]
    fn everything_else_is_internal() {
        let err = to_jsonrpc_error(AgentError::QueueClosed {
            task_id: "t-1".into(),
        });
        assert_eq!(err.code, error_codes::INTERNAL_ERROR);
        assert!(err.data.unwrap()["details"]
            .as_str()
            .unwrap()
            .contains("t-1"));
    }
}
