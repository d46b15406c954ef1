//! The sales manager: consults the expert, then drafts the reply email.

mod email;
mod reply;

pub use email::{compose_email, SENDER, SIGNATURE};
pub use reply::{extract_client_name, extract_subject, ManagerReply, DEFAULT_CLIENT_NAME, DEFAULT_SUBJECT};

use std::sync::Arc;

use a2a_types::{AgentCard, AgentSkill, SecurityScheme};
use async_trait::async_trait;

use super::consultation::ExpertConsultant;
use super::{apply_or_reopen, open_updater, preview};
use crate::config::ServerAddress;
use crate::errors::{AgentError, AgentResult};
use crate::models::{BaseLlm, Thread};
use crate::runtime::{AgentExecutor, EventQueue, RequestContext, TaskUpdater};

pub const DEFAULT_MODEL: &str = "mistral-large-latest";
pub const DEFAULT_PORT: u16 = 10008;

const SYSTEM_PROMPT: &str = "You are a sales manager at AI Solutions Corp. You write warm, \
     professional replies to customer emails using the product information supplied by the \
     company expert. You always answer with a single JSON object.";

/// Builds the drafting prompt from the customer email and the expert's notes.
pub fn drafting_prompt(client_email: &str, expert_info: &str) -> String {
    format!(
        "Information from our company expert:\n{expert_info}\n\n\
         Customer email:\n{client_email}\n\n\
         Write a personalised reply to this customer. Address the client by name, acknowledge \
         their needs, explain how our products help and propose a demo. Do not end the body with \
         a sign-off such as \"Best regards\" or \"Sales Manager\"; the signature is added for you.\n\n\
         Answer with a JSON object matching this schema:\n{}",
        ManagerReply::schema()
    )
}

pub struct ManagerExecutor {
    llm: Arc<dyn BaseLlm>,
    consultant: ExpertConsultant,
}

impl ManagerExecutor {
    pub fn new(llm: Arc<dyn BaseLlm>, consultant: ExpertConsultant) -> Self {
        Self { llm, consultant }
    }

    /// Asks the model for a structured reply.
    async fn draft(&self, client_email: &str, expert_info: &str) -> AgentResult<ManagerReply> {
        let thread = Thread::from_user(drafting_prompt(client_email, expert_info)).with_system(SYSTEM_PROMPT);
        let response = self.llm.generate_content(thread, None).await?;
        let (text, _) = response.into_parts();
        let text = text.ok_or_else(|| AgentError::MalformedLlmOutput {
            reason: "manager model returned no text".to_string(),
        })?;
        ManagerReply::parse(&text)
    }

    async fn run(&self, context: &RequestContext, updater: &mut TaskUpdater) -> AgentResult<()> {
        apply_or_reopen(updater, context, TaskUpdater::submit)?;
        apply_or_reopen(updater, context, TaskUpdater::start_work)?;

        let client_email = context.user_text();
        tracing::info!(task_id = %context.task_id, email = %preview(client_email, 100), "manager received email");

        let consultation = self.consultant.consult(client_email).await;
        if !consultation.is_answered() {
            tracing::warn!(task_id = %context.task_id, "drafting without an expert answer");
        }
        let expert_info = consultation.into_text();

        let reply = match self.draft(client_email, &expert_info).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(
                    task_id = %context.task_id,
                    model = self.llm.model_name(),
                    error = %e,
                    "drafting failed, using fallback reply"
                );
                ManagerReply::fallback(client_email, &expert_info)
            }
        };

        let email = compose_email(&reply);
        tracing::info!(task_id = %context.task_id, client = %reply.client_name, "manager reply ready");
        apply_or_reopen(updater, context, |u| u.complete(email.clone()))
    }
}

#[async_trait]
impl AgentExecutor for ManagerExecutor {
    async fn execute(&self, context: RequestContext, event_queue: EventQueue) {
        let mut updater = open_updater(event_queue, &context);

        if let Err(e) = self.run(&context, &mut updater).await {
            tracing::error!(task_id = %context.task_id, error = %e, "manager failed");
            let text = format!("Error while processing the email: {e}");
            if let Err(report) = apply_or_reopen(&mut updater, &context, |u| u.fail(text.clone())) {
                tracing::error!(task_id = %context.task_id, error = %report, "could not report manager failure");
            }
        }
    }

    async fn cancel(&self, context: RequestContext, event_queue: EventQueue) {
        let mut updater = TaskUpdater::new(event_queue, &context.task_id, &context.context_id);
        if let Err(e) = updater.cancel("The email task was canceled.") {
            tracing::error!(task_id = %context.task_id, error = %e, "could not cancel manager task");
        }
    }
}

pub fn manager_card(address: &ServerAddress) -> AgentCard {
    AgentCard::new(
        "Sales Manager Agent",
        "Sales manager of AI Solutions Corp. Processes customer emails, consults the company \
         expert and writes personalised replies.",
        "1.0.0",
        address.base_url(),
    )
    .with_streaming(false)
    .with_security_scheme("basic", SecurityScheme::basic())
    .add_skill(
        AgentSkill::new("client_communication", "Client Communication")
            .with_description("Processes customer emails and drafts personalised replies")
            .with_tags(["email", "sales", "communication"])
            .add_example("Reply to this email from a client asking about document automation"),
    )
    .add_skill(
        AgentSkill::new("expert_consultation", "Expert Consultation")
            .with_description("Consults the company expert about products that fit the client")
            .with_tags(["consultation", "products"]),
    )
}
