//! Serves the sales manager agent.

use std::sync::Arc;

use agentdesk::agents::consultation::{ExpertConsultant, DEFAULT_EXPERT_URL};
use agentdesk::agents::manager::{manager_card, ManagerExecutor, DEFAULT_MODEL, DEFAULT_PORT};
use agentdesk::config::{load_dotenv, ServerAddress};
use agentdesk::models::MistralLlm;
use agentdesk::runtime::init_tracing;
use agentdesk::{AgentError, AgentResult, AgentServer, DefaultRequestHandler, InMemoryTaskStore};
use clap::Parser;

/// Sales manager for AI Solutions Corp, served over A2A
#[derive(Parser, Debug)]
#[command(name = "sales-manager")]
#[command(version, about, long_about = None)]
struct Args {
    /// Host to bind and advertise
    #[arg(long, env = "MANAGER_HOST", default_value = "localhost")]
    host: String,

    /// Port to bind
    #[arg(long, env = "MANAGER_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Base URL of the company expert
    #[arg(long, env = "EXPERT_AGENT_URL", default_value = DEFAULT_EXPERT_URL)]
    expert_url: String,

    /// Mistral model to draft replies with
    #[arg(long, env = "MANAGER_MODEL", default_value = DEFAULT_MODEL)]
    model: String,
}

#[tokio::main]
async fn main() -> AgentResult<()> {
    load_dotenv();
    init_tracing();
    let args = Args::parse();

    let llm = MistralLlm::from_env(&args.model)?.with_json_output();

    let http = a2a_client::default_http_client().map_err(|e| AgentError::InvalidConfiguration {
        field: "http_client".to_string(),
        reason: e.to_string(),
    })?;
    tracing::info!(expert_url = %args.expert_url, "consulting expert");
    let consultant = ExpertConsultant::discover(args.expert_url, http);

    let address = ServerAddress::new(args.host, args.port);
    let executor = ManagerExecutor::new(Arc::new(llm), consultant);
    let handler = DefaultRequestHandler::new(Arc::new(InMemoryTaskStore::new()), Arc::new(executor));

    AgentServer::new(manager_card(&address), handler).serve(&address).await
}
