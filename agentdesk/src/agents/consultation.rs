//! How the manager asks the expert for product details.
//!
//! One consultation is a `message/send` followed by a bounded `tasks/get` poll
//! loop. Nothing here returns an error: every failure turns into placeholder
//! text so the manager can still write its email.

use std::sync::Arc;

use a2a_client::{A2AClient, A2AError, PollOutcome, RemoteAgent, TaskPoller};
use a2a_types::{Message, MessageSendParams, SendMessageResult, TaskState};

use super::preview;

pub const DEFAULT_EXPERT_URL: &str = "http://localhost:10007/";

pub const EXPERT_UNAVAILABLE: &str =
    "The expert is temporarily unavailable. Using basic product information.";
pub const TASK_NOT_CREATED: &str = "Failed to create a task for the expert.";

/// The expert's answer, or the text that stands in for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Consultation {
    Answered(String),
    Degraded(String),
}

impl Consultation {
    pub fn text(&self) -> &str {
        match self {
            Consultation::Answered(text) | Consultation::Degraded(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Consultation::Answered(text) | Consultation::Degraded(text) => text,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, Consultation::Answered(_))
    }
}

/// The question sent to the expert for an inbound customer email.
pub fn consultation_query(client_email: &str) -> String {
    format!(
        "Analyse this customer email and provide details of our products that can help:\n\n\
         {client_email}\n\n\
         Especially interested in information about Document Analyzer and Vision AI. \
         Don't write a return email, just tell us about our products."
    )
}

enum ExpertLink {
    /// Fetch the agent card from `base_url` for each consultation.
    Discover { base_url: String, http: reqwest::Client },
    Fixed(Arc<dyn RemoteAgent>),
}

pub struct ExpertConsultant {
    link: ExpertLink,
    poller: TaskPoller,
}

impl ExpertConsultant {
    pub fn discover(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            link: ExpertLink::Discover {
                base_url: base_url.into(),
                http,
            },
            poller: TaskPoller::default(),
        }
    }

    /// Talks to `agent` directly, skipping card discovery.
    pub fn with_agent(agent: Arc<dyn RemoteAgent>) -> Self {
        Self {
            link: ExpertLink::Fixed(agent),
            poller: TaskPoller::default(),
        }
    }

    #[must_use]
    pub fn with_poller(mut self, poller: TaskPoller) -> Self {
        self.poller = poller;
        self
    }

    pub async fn consult(&self, client_email: &str) -> Consultation {
        let agent = match self.connect().await {
            Ok(agent) => agent,
            Err(e) => {
                tracing::warn!(error = %e, "could not resolve the expert agent");
                return Consultation::Degraded(transport_placeholder(&e));
            }
        };

        let message = Message::user_text(uuid::Uuid::new_v4().to_string(), consultation_query(client_email));
        tracing::info!(message_id = %message.message_id, "sending consultation to the expert");

        let task = match agent.send_message(MessageSendParams::new(message)).await {
            Ok(SendMessageResult::Task(task)) => task,
            Ok(SendMessageResult::Message(reply)) => {
                return match reply.first_text() {
                    Some(text) => Consultation::Answered(text.to_string()),
                    None => Consultation::Degraded(no_response("unknown")),
                };
            }
            Err(e @ A2AError::RemoteAgentError { .. }) => {
                tracing::warn!(error = %e, "expert refused the consultation");
                return Consultation::Degraded(TASK_NOT_CREATED.to_string());
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not reach the expert");
                return Consultation::Degraded(transport_placeholder(&e));
            }
        };
        tracing::info!(task_id = %task.id, "expert task created");

        let outcome = self.poller.wait_for_terminal(agent.as_ref(), task).await;
        if let PollOutcome::Exhausted { attempts, .. } = &outcome {
            tracing::warn!(attempts, "expert did not finish within the poll ceiling");
        }

        let task = outcome.into_task();
        match (task.status.state, task.status.message_text()) {
            (TaskState::Completed, Some(text)) => {
                tracing::info!(task_id = %task.id, answer = %preview(text, 100), "expert answered");
                Consultation::Answered(text.to_string())
            }
            (state, _) => {
                tracing::warn!(task_id = %task.id, state = %state, "no usable answer from the expert");
                Consultation::Degraded(no_response(&state.to_string()))
            }
        }
    }

    async fn connect(&self) -> Result<Arc<dyn RemoteAgent>, A2AError> {
        match &self.link {
            ExpertLink::Fixed(agent) => Ok(Arc::clone(agent)),
            ExpertLink::Discover { base_url, http } => {
                let client = A2AClient::from_card_url_with_client(base_url, http.clone()).await?;
                Ok(Arc::new(client))
            }
        }
    }
}

fn no_response(state: &str) -> String {
    format!("Could not get a response from the expert. Status: {state}")
}

fn transport_placeholder(error: &A2AError) -> String {
    if error.is_transport() {
        EXPERT_UNAVAILABLE.to_string()
    } else {
        format!("Error communicating with the expert: {error}. Using basic information.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_wraps_the_email() {
        let query = consultation_query("We need invoices processed.");
        assert!(query.starts_with("Analyse this customer email"));
        assert!(query.contains("\n\nWe need invoices processed.\n\n"));
        assert!(query.ends_with("just tell us about our products."));
    }

    #[test]
    fn placeholders_name_the_cause() {
        let network = A2AError::NetworkError {
            message: "connection refused".into(),
        };
        assert_eq!(transport_placeholder(&network), EXPERT_UNAVAILABLE);

        let garbled = A2AError::SerializationError {
            message: "bad card".into(),
        };
        let text = transport_placeholder(&garbled);
        assert!(text.starts_with("Error communicating with the expert:"));
        assert!(text.ends_with("Using basic information."));
    }

    #[tokio::test]
    async fn unreachable_expert_degrades() {
        let consultant = ExpertConsultant::discover("http://127.0.0.1:1/", reqwest::Client::new());
        let outcome = consultant.consult("hello").await;
        assert_eq!(outcome, Consultation::Degraded(EXPERT_UNAVAILABLE.to_string()));
    }
}
