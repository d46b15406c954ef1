//! Axum handlers for the agent endpoints.

use std::sync::Arc;

use a2a_types::{
    A2ARequest, A2ARequestPayload, AgentCard, JSONRPCError, JSONRPCErrorResponse, JSONRPCId,
    JSONRPCSuccessResponse, JSONRPC_VERSION,
};
use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::errors::AgentResult;
use crate::runtime::error_mapper;
use crate::runtime::request_handler::DefaultRequestHandler;

/// State shared by every handler of one agent.
pub struct AppState {
    pub card: AgentCard,
    pub handler: DefaultRequestHandler,
}

/// `GET /.well-known/agent-card.json`
pub async fn agent_card_handler(State(state): State<Arc<AppState>>) -> Json<AgentCard> {
    Json(state.card.clone())
}

/// `GET /health`
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "status": "ok", "agent": state.card.name }))
}

/// `POST /`: the JSON-RPC endpoint.
///
/// The body is parsed in stages so that each kind of malformed request gets
/// its own error code: bad JSON, a bad envelope, an unknown method, bad params.
pub async fn json_rpc_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let raw: Value = match serde_json::from_slice(&body) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!(error = %e, "rejecting unparseable JSON-RPC body");
            return error_response(None, JSONRPCError::parse_error());
        }
    };

    let id = raw
        .get("id")
        .and_then(|id| serde_json::from_value::<JSONRPCId>(id.clone()).ok());

    let method = match validate_envelope(&raw) {
        Ok(method) => method,
        Err(error) => return error_response(id, error),
    };

    if !A2ARequestPayload::METHODS.contains(&method.as_str()) {
        let error = if is_a2a_method(&method) {
            JSONRPCError::unsupported_operation(&method)
        } else {
            JSONRPCError::method_not_found(&method)
        };
        return error_response(id, error);
    }

    let request: A2ARequest = match serde_json::from_value(raw) {
        Ok(request) => request,
        Err(e) => {
            return error_response(id, JSONRPCError::invalid_params(format!("Invalid params: {e}")))
        }
    };

    tracing::debug!(method = request.payload.method(), "handling JSON-RPC request");
    let handler = &state.handler;
    match request.payload {
        A2ARequestPayload::SendMessage { params } => {
            respond(id, handler.on_send_message(params).await)
        }
        A2ARequestPayload::GetTask { params } => respond(id, handler.on_get_task(params).await),
        A2ARequestPayload::CancelTask { params } => {
            respond(id, handler.on_cancel_task(params).await)
        }
        A2ARequestPayload::SendStreamingMessage { .. }
        | A2ARequestPayload::TaskResubscription { .. } => {
            error_response(id, JSONRPCError::unsupported_operation(&method))
        }
    }
}

fn validate_envelope(raw: &Value) -> Result<String, JSONRPCError> {
    let Some(object) = raw.as_object() else {
        return Err(JSONRPCError::invalid_request("Request must be a JSON object"));
    };
    if object.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
        return Err(JSONRPCError::invalid_request("jsonrpc must be \"2.0\""));
    }
    object
        .get("method")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| JSONRPCError::invalid_request("method must be a string"))
}

/// Methods in the A2A namespaces that this server does not implement.
fn is_a2a_method(method: &str) -> bool {
    ["message/", "tasks/", "agent/"]
        .iter()
        .any(|prefix| method.starts_with(prefix))
}

fn respond<T: Serialize>(id: Option<JSONRPCId>, result: AgentResult<T>) -> Response {
    match result {
        Ok(value) => Json(JSONRPCSuccessResponse::new(id, value)).into_response(),
        Err(error) => {
            tracing::warn!(error = %error, "JSON-RPC request failed");
            error_response(id, error_mapper::to_jsonrpc_error(error))
        }
    }
}

fn error_response(id: Option<JSONRPCId>, error: JSONRPCError) -> Response {
    Json(JSONRPCErrorResponse::new(id, error)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{
        AgentExecutor, AgentServer, EventQueue, InMemoryTaskStore, RequestContext, TaskUpdater,
    };
    use a2a_types::{error_codes, AgentCard, Task, TaskState};
    use async_trait::async_trait;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct DoneExecutor;

    #[async_trait]
    impl AgentExecutor for DoneExecutor {
        async fn execute(&self, context: RequestContext, event_queue: EventQueue) {
            let mut updater = TaskUpdater::new(event_queue, &context.task_id, &context.context_id);
            updater.submit().unwrap();
            updater.start_work().unwrap();
            updater.complete("done").unwrap();
        }

        async fn cancel(&self, context: RequestContext, event_queue: EventQueue) {
            let mut updater = TaskUpdater::new(event_queue, &context.task_id, &context.context_id);
            updater.cancel("canceled").unwrap();
        }
    }

    fn router() -> axum::Router {
        let card = AgentCard::new("Test Agent", "answers", "1.0.0", "http://localhost:1/");
        let handler = DefaultRequestHandler::new(
            Arc::new(InMemoryTaskStore::new()),
            Arc::new(DoneExecutor),
        );
        AgentServer::new(card, handler).router()
    }

    async fn call(router: axum::Router, request: Request<axum::body::Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn rpc(body: impl Into<String>) -> Request<axum::body::Body> {
        Request::post("/")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(body.into()))
            .unwrap()
    }

    #[tokio::test]
    async fn serves_agent_card_under_both_paths() {
        for path in ["/.well-known/agent-card.json", "/.well-known/agent.json"] {
            let request = Request::get(path).body(axum::body::Body::empty()).unwrap();
            let (status, body) = call(router(), request).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["name"], "Test Agent");
        }
    }

    #[tokio::test]
    async fn health_reports_agent_name() {
        let request = Request::get("/health").body(axum::body::Body::empty()).unwrap();
        let (_, body) = call(router(), request).await;
        assert_eq!(body, json!({ "status": "ok", "agent": "Test Agent" }));
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let (status, body) = call(router(), rpc("{not json")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["code"], error_codes::PARSE_ERROR);
        assert_eq!(body["id"], Value::Null);
    }

    #[tokio::test]
    async fn missing_jsonrpc_version_is_invalid_request() {
        let (_, body) = call(router(), rpc(r#"{"id":1,"method":"tasks/get"}"#)).await;
        assert_eq!(body["error"]["code"], error_codes::INVALID_REQUEST);
        assert_eq!(body["id"], 1);
    }

    #[tokio::test]
    async fn streaming_is_unsupported() {
        let request = json!({
            "jsonrpc": "2.0",
            "id": "s-1",
            "method": "message/stream",
            "params": {"message": {"kind": "message", "messageId": "m", "role": "user", "parts": [{"kind": "text", "text": "hi"}]}}
        });
        let (_, body) = call(router(), rpc(request.to_string())).await;
        assert_eq!(body["error"]["code"], error_codes::UNSUPPORTED_OPERATION);

        let push = json!({"jsonrpc": "2.0", "id": 2, "method": "tasks/pushNotificationConfig/set", "params": {}});
        let (_, body) = call(router(), rpc(push.to_string())).await;
        assert_eq!(body["error"]["code"], error_codes::UNSUPPORTED_OPERATION);
    }

    #[tokio::test]
    async fn unknown_method_is_not_found() {
        let request = json!({"jsonrpc": "2.0", "id": 3, "method": "hello", "params": {}});
        let (_, body) = call(router(), rpc(request.to_string())).await;
        assert_eq!(body["error"]["code"], error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn send_without_text_is_invalid_params() {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "message/send",
            "params": {"message": {"kind": "message", "messageId": "m", "role": "user", "parts": []}}
        });
        let (_, body) = call(router(), rpc(request.to_string())).await;
        assert_eq!(body["error"]["code"], error_codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn blocking_send_then_get_and_cancel() {
        let router = router();
        let send = json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "message/send",
            "params": {
                "message": {"kind": "message", "messageId": "m", "role": "user", "parts": [{"kind": "text", "text": "hi"}]},
                "configuration": {"blocking": true}
            }
        });
        let (_, body) = call(router.clone(), rpc(send.to_string())).await;
        let task: Task = serde_json::from_value(body["result"].clone()).unwrap();
        assert_eq!(task.status.state, TaskState::Completed);

        let get = json!({"jsonrpc": "2.0", "id": 6, "method": "tasks/get", "params": {"id": task.id}});
        let (_, body) = call(router.clone(), rpc(get.to_string())).await;
        assert_eq!(body["result"]["status"]["state"], "completed");

        let cancel = json!({"jsonrpc": "2.0", "id": 7, "method": "tasks/cancel", "params": {"id": task.id}});
        let (_, body) = call(router.clone(), rpc(cancel.to_string())).await;
        assert_eq!(body["error"]["code"], error_codes::TASK_NOT_CANCELABLE);

        let missing = json!({"jsonrpc": "2.0", "id": 8, "method": "tasks/get", "params": {"id": "nope"}});
        let (_, body) = call(router, rpc(missing.to_string())).await;
        assert_eq!(body["error"]["code"], error_codes::TASK_NOT_FOUND);
    }
}
