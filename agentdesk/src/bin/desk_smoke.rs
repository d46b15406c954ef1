//! Smoke checks against running expert and manager agents.

use std::time::Duration;

use a2a_client::{A2AClient, A2AError, PollOutcome, PollPolicy, TaskPoller};
use agentdesk::a2a::{Message, MessageSendParams, SendMessageResult, Task, TaskState};
use agentdesk::agents::consultation::DEFAULT_EXPERT_URL;
use agentdesk::config::load_dotenv;
use agentdesk::runtime::init_tracing;
use agentdesk::{AgentError, AgentResult};
use clap::{Parser, Subcommand};

const CLIENT_EMAIL: &str = "
Subject: Inquiry about AI Solutions for E-commerce Logistics

Hello,

My name is Sarah Jones, and I am the Operations Manager at 'Global Retail Express'.

We are rapidly expanding and facing challenges with processing a high volume of shipping \
documents and managing our new warehouse inventory.

I am particularly interested in your 'Document Analyzer' for automating invoice processing \
and your 'Vision AI' solution for inventory monitoring.

Could you please provide more details on these products and let me know if it's possible to \
schedule a demo?

Thank you,
Sarah Jones
Operations Manager
Global Retail Express
";

const PRODUCT_QUESTION: &str = "Tell us in detail about Document Analyzer and Vision AI products. \
                                What can they do and how much do they cost?";
const CALC_QUESTION: &str = "What is 7 times 8? And also 15 plus 25?";

const EXPERT_WAIT: Duration = Duration::from_secs(30);
const MANAGER_WAIT: Duration = Duration::from_secs(60);
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Checks that the expert and manager agents are up and answering
#[derive(Parser, Debug)]
#[command(name = "desk-smoke")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Check,

    /// Base URL of the company expert
    #[arg(long, env = "EXPERT_AGENT_URL", default_value = DEFAULT_EXPERT_URL, global = true)]
    expert_url: String,

    /// Base URL of the sales manager
    #[arg(long, env = "MANAGER_AGENT_URL", default_value = "http://localhost:10008/", global = true)]
    manager_url: String,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    /// Health and agent card of both agents
    Availability,
    /// A product question to the expert
    Expert,
    /// Arithmetic through the expert's calculator
    Calc,
    /// A customer email through the manager
    Manager,
    /// Every check above, in order
    All,
}

struct Smoke {
    http: reqwest::Client,
    expert_url: String,
    manager_url: String,
}

impl Smoke {
    async fn availability(&self) -> bool {
        let mut ok = true;
        for (label, url) in [("expert", &self.expert_url), ("manager", &self.manager_url)] {
            let health = format!("{}/health", url.trim_end_matches('/'));
            match self.http.get(&health).timeout(Duration::from_secs(5)).send().await {
                Ok(response) => println!("{label} health: {}", response.status()),
                Err(e) => {
                    println!("{label} is not answering on /health: {e}");
                    ok = false;
                    continue;
                }
            }
            match A2AClient::from_card_url_with_client(url, self.http.clone()).await {
                Ok(client) => {
                    let card = client.agent_card();
                    let skills: Vec<&str> = card.skills.iter().map(|s| s.name.as_str()).collect();
                    println!("{label} card: {} v{} ({})", card.name, card.version, skills.join(", "));
                }
                Err(e) => {
                    println!("{label} card unavailable: {e}");
                    ok = false;
                }
            }
        }
        ok
    }

    async fn ask(&self, label: &str, url: &str, text: &str, wait: Duration) -> bool {
        match self.round_trip(url, text, wait).await {
            Ok(task) if task.status.state == TaskState::Completed => {
                println!("{label} completed task {}:", task.id);
                println!("{}", task.status.message_text().unwrap_or("<no text>"));
                true
            }
            Ok(task) => {
                println!("{label} ended in state {}", task.status.state);
                if let Some(text) = task.status.message_text() {
                    println!("message: {text}");
                }
                false
            }
            Err(e) => {
                println!("{label} check failed: {e}");
                false
            }
        }
    }

    async fn round_trip(&self, url: &str, text: &str, wait: Duration) -> Result<Task, A2AError> {
        let client = A2AClient::from_card_url_with_client(url, self.http.clone()).await?;
        let message = Message::user_text(uuid::Uuid::new_v4().to_string(), text);

        let task = match client.send_message(MessageSendParams::new(message)).await? {
            SendMessageResult::Task(task) => task,
            SendMessageResult::Message(reply) => {
                println!("direct reply: {}", reply.first_text().unwrap_or("<no text>"));
                return Err(A2AError::InvalidParameter {
                    message: "agent replied without creating a task".to_string(),
                });
            }
        };
        println!("created task {}", task.id);

        let policy = PollPolicy {
            interval: POLL_INTERVAL,
            max_attempts: attempts_within(wait),
        };
        match TaskPoller::new(policy).wait_for_terminal(&client, task).await {
            PollOutcome::Finished(task) => Ok(task),
            PollOutcome::Exhausted { task, .. } => Err(A2AError::NetworkError {
                message: format!("task {} did not finish within {}s", task.id, wait.as_secs()),
            }),
            PollOutcome::Interrupted { error, .. } => Err(error),
        }
    }
}

fn attempts_within(wait: Duration) -> u32 {
    let attempts = wait.as_millis() / POLL_INTERVAL.as_millis();
    u32::try_from(attempts).unwrap_or(u32::MAX)
}

#[tokio::main]
async fn main() -> AgentResult<()> {
    load_dotenv();
    init_tracing();
    let args = Args::parse();

    let http = a2a_client::default_http_client().map_err(|e| AgentError::InvalidConfiguration {
        field: "http_client".to_string(),
        reason: e.to_string(),
    })?;
    let smoke = Smoke {
        http,
        expert_url: args.expert_url,
        manager_url: args.manager_url,
    };

    let run = |check: Check| args.command == Check::All || args.command == check;
    let mut results = Vec::new();

    if run(Check::Availability) {
        println!("=== availability ===");
        results.push(("availability", smoke.availability().await));
    }
    if run(Check::Expert) {
        println!("\n=== expert ===");
        let ok = smoke.ask("expert", &smoke.expert_url, PRODUCT_QUESTION, EXPERT_WAIT).await;
        results.push(("expert", ok));
    }
    if run(Check::Calc) {
        println!("\n=== calculations ===");
        let ok = smoke.ask("expert", &smoke.expert_url, CALC_QUESTION, EXPERT_WAIT).await;
        results.push(("calc", ok));
    }
    if run(Check::Manager) {
        println!("\n=== manager ===");
        let ok = smoke.ask("manager", &smoke.manager_url, CLIENT_EMAIL, MANAGER_WAIT).await;
        results.push(("manager", ok));
    }

    println!("\n=== summary ===");
    for (name, ok) in &results {
        println!("{name}: {}", if *ok { "passed" } else { "FAILED" });
    }

    let failed: Vec<&str> = results.iter().filter(|(_, ok)| !ok).map(|(name, _)| *name).collect();
    if failed.is_empty() {
        Ok(())
    } else {
        Err(AgentError::Internal {
            component: "smoke".to_string(),
            reason: format!("failed checks: {}", failed.join(", ")),
        })
    }
}
