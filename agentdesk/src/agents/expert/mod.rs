//! The company expert: answers product questions with a tool-calling model.

pub mod company;

use std::collections::HashMap;
use std::sync::Arc;

use a2a_types::{AgentCard, AgentSkill, SecurityScheme};
use async_trait::async_trait;
use serde_json::Value;

use crate::config::ServerAddress;
use crate::errors::{AgentError, AgentResult};
use crate::models::{BaseLlm, Thread, ToolCall, Turn};
use super::{apply_or_reopen, open_updater, preview};
use crate::runtime::{AgentExecutor, EventQueue, RequestContext, TaskUpdater};
use crate::tools::{BaseTool, BaseToolset, CalculatorTool, DocumentSearchTool, SimpleToolset};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_PORT: u16 = 10007;

/// Reasoning loop: ask the model, run the tools it calls, feed results back,
/// until it answers in plain text or the round limit is hit.
pub struct ExpertAgent {
    llm: Arc<dyn BaseLlm>,
    toolset: Arc<SimpleToolset>,
    max_rounds: usize,
}

impl ExpertAgent {
    pub const MAX_ROUNDS: usize = 5;

    pub fn new(llm: Arc<dyn BaseLlm>, search: DocumentSearchTool) -> Self {
        let toolset = SimpleToolset::new(vec![
            Arc::new(search) as Arc<dyn BaseTool>,
            Arc::new(CalculatorTool),
        ]);
        Self {
            llm,
            toolset: Arc::new(toolset),
            max_rounds: Self::MAX_ROUNDS,
        }
    }

    #[must_use]
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    pub async fn answer(&self, question: &str) -> AgentResult<String> {
        let mut thread = Thread::from_user(question).with_system(company::system_prompt());
        let toolset: Arc<dyn BaseToolset> = self.toolset.clone();

        for round in 1..=self.max_rounds {
            let response = self
                .llm
                .generate_content(thread.clone(), Some(Arc::clone(&toolset)))
                .await?;
            let (text, tool_calls) = response.into_parts();

            if tool_calls.is_empty() {
                return text.ok_or_else(|| AgentError::MalformedLlmOutput {
                    reason: "model returned neither text nor tool calls".to_string(),
                });
            }

            tracing::debug!(round, calls = tool_calls.len(), "expert model requested tools");
            thread.push(Turn::tool_request(text, tool_calls.clone()));
            for call in &tool_calls {
                let output = self.run_tool(call).await;
                thread.push(Turn::tool_result(call.id(), output));
            }
        }

        Err(AgentError::MalformedLlmOutput {
            reason: format!("no final answer after {} tool rounds", self.max_rounds),
        })
    }

    async fn run_tool(&self, call: &ToolCall) -> String {
        let Some(tool) = self.toolset.find(call.name()) else {
            tracing::warn!(tool = call.name(), "model called an unknown tool");
            return AgentError::ToolNotFound {
                tool_name: call.name().to_string(),
            }
            .to_string();
        };

        let args: HashMap<String, Value> = match call.arguments() {
            Value::Object(map) => map.clone().into_iter().collect(),
            _ => HashMap::new(),
        };
        tool.run_async(args).await.to_model_text()
    }
}

/// Serves [`ExpertAgent`] answers as A2A tasks.
pub struct ExpertExecutor {
    agent: ExpertAgent,
}

impl ExpertExecutor {
    pub fn new(agent: ExpertAgent) -> Self {
        Self { agent }
    }

    async fn run(&self, context: &RequestContext, updater: &mut TaskUpdater) -> AgentResult<()> {
        apply_or_reopen(updater, context, TaskUpdater::submit)?;
        apply_or_reopen(updater, context, TaskUpdater::start_work)?;

        let question = context.user_text();
        tracing::info!(task_id = %context.task_id, question = %preview(question, 100), "expert received question");

        let answer = self.agent.answer(question).await?;
        tracing::info!(task_id = %context.task_id, answer = %preview(&answer, 200), "expert answering");
        apply_or_reopen(updater, context, |u| u.complete(answer.clone()))
    }
}

#[async_trait]
impl AgentExecutor for ExpertExecutor {
    async fn execute(&self, context: RequestContext, event_queue: EventQueue) {
        let mut updater = open_updater(event_queue, &context);

        if let Err(e) = self.run(&context, &mut updater).await {
            tracing::error!(task_id = %context.task_id, error = %e, "expert failed");
            let text = format!("Error while processing the request: {e}");
            if let Err(report) = apply_or_reopen(&mut updater, &context, |u| u.fail(text.clone())) {
                tracing::error!(task_id = %context.task_id, error = %report, "could not report expert failure");
            }
        }
    }

    async fn cancel(&self, context: RequestContext, event_queue: EventQueue) {
        let mut updater = TaskUpdater::new(event_queue, &context.task_id, &context.context_id);
        if let Err(e) = updater.cancel("The expert task was canceled.") {
            tracing::error!(task_id = %context.task_id, error = %e, "could not cancel expert task");
        }
    }
}

pub fn expert_card(address: &ServerAddress) -> AgentCard {
    AgentCard::new(
        "Company Expert Agent",
        "Expert on the products and services of AI Solutions Corp. Answers questions about the \
         company, performs calculations and searches company documents.",
        "1.0.0",
        address.base_url(),
    )
    .with_streaming(false)
    .with_security_scheme("basic", SecurityScheme::basic())
    .add_skill(
        AgentSkill::new("company_expertise", "Company Expertise")
            .with_description("Expert knowledge of AI Solutions Corp products and services")
            .with_tags(["company", "products", "expertise"]),
    )
    .add_skill(
        AgentSkill::new("document_search", "Document Search")
            .with_description("Searches company documents for information")
            .with_tags(["search", "documents"]),
    )
    .add_skill(
        AgentSkill::new("calculations", "Calculations")
            .with_description("Performs mathematical calculations")
            .with_tags(["math", "calculations"])
            .add_example("What is 7 times 8?"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LlmResponse;
    use crate::test_support::FakeLlm;
    use serde_json::json;

    #[tokio::test]
    async fn plain_answer_returns_immediately() {
        let llm = FakeLlm::with_responses("fake", [Ok(LlmResponse::from_text("Vision AI costs $8,000/month"))]);
        let agent = ExpertAgent::new(Arc::new(llm.clone()), DocumentSearchTool::unavailable());

        let answer = agent.answer("How much is Vision AI?").await.unwrap();
        assert_eq!(answer, "Vision AI costs $8,000/month");
        assert_eq!(llm.calls().len(), 1);
        assert!(llm.calls()[0].system().unwrap().contains("AI Solutions Corp"));
    }

    #[tokio::test]
    async fn tool_results_are_fed_back() {
        let llm = FakeLlm::with_responses(
            "fake",
            [
                Ok(LlmResponse::from_tool_calls(vec![
                    ToolCall::new("c-1", "calculate", json!({"expression": "7*8"})),
                    ToolCall::new("c-2", "search_documents", json!({"query": "pricing"})),
                ])),
                Ok(LlmResponse::from_text("7 times 8 is 56.")),
            ],
        );
        let agent = ExpertAgent::new(Arc::new(llm.clone()), DocumentSearchTool::unavailable());

        let answer = agent.answer("What is 7 times 8?").await.unwrap();
        assert_eq!(answer, "7 times 8 is 56.");

        let calls = llm.calls();
        assert_eq!(calls.len(), 2);
        let turns = calls[1].turns();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[2].content(), Some("Result: 56"));
        assert_eq!(turns[3].content(), Some(crate::tools::SEARCH_UNAVAILABLE));
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_to_the_model() {
        let llm = FakeLlm::with_responses(
            "fake",
            [
                Ok(LlmResponse::from_tool_calls(vec![ToolCall::new("c-1", "shell", json!({}))])),
                Ok(LlmResponse::from_text("ok")),
            ],
        );
        let agent = ExpertAgent::new(Arc::new(llm.clone()), DocumentSearchTool::unavailable());
        agent.answer("run ls").await.unwrap();

        let calls = llm.calls();
        assert!(calls[1].turns()[2].content().unwrap().contains("Tool not found: shell"));
    }

    #[tokio::test]
    async fn endless_tool_calls_hit_round_limit() {
        let responses: Vec<_> = (0..3)
            .map(|i| {
                Ok(LlmResponse::from_tool_calls(vec![ToolCall::new(
                    format!("c-{i}"),
                    "calculate",
                    json!({"expression": "1+1"}),
                )]))
            })
            .collect();
        let llm = FakeLlm::with_responses("fake", responses);
        let agent = ExpertAgent::new(Arc::new(llm), DocumentSearchTool::unavailable()).with_max_rounds(3);

        let err = agent.answer("loop").await.unwrap_err();
        assert!(matches!(err, AgentError::MalformedLlmOutput { .. }));
    }

    #[test]
    fn card_lists_three_skills() {
        let card = expert_card(&ServerAddress::new("localhost", DEFAULT_PORT));
        assert_eq!(card.name, "Company Expert Agent");
        assert_eq!(card.url, "http://localhost:10007/");
        let ids: Vec<&str> = card.skills.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["company_expertise", "document_search", "calculations"]);
        assert_eq!(card.capabilities.streaming, Some(false));
    }
}
