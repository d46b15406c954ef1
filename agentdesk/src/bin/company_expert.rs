//! Serves the company expert agent.

use std::sync::Arc;

use agentdesk::agents::expert::{expert_card, ExpertAgent, ExpertExecutor, DEFAULT_MODEL, DEFAULT_PORT};
use agentdesk::config::{load_dotenv, ServerAddress};
use agentdesk::models::OpenAILlm;
use agentdesk::runtime::init_tracing;
use agentdesk::tools::{DocumentSearch, DocumentSearchTool, HttpDocumentSearch};
use agentdesk::{AgentResult, AgentServer, DefaultRequestHandler, InMemoryTaskStore};
use clap::Parser;

/// Company expert for AI Solutions Corp, served over A2A
#[derive(Parser, Debug)]
#[command(name = "company-expert")]
#[command(version, about, long_about = None)]
struct Args {
    /// Host to bind and advertise
    #[arg(long, env = "EXPERT_HOST", default_value = "localhost")]
    host: String,

    /// Port to bind
    #[arg(long, env = "EXPERT_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Document retrieval endpoint; search is disabled when unset
    #[arg(long, env = "DOCUMENT_SEARCH_URL")]
    search_url: Option<String>,

    /// OpenAI model to reason with
    #[arg(long, env = "EXPERT_MODEL", default_value = DEFAULT_MODEL)]
    model: String,
}

#[tokio::main]
async fn main() -> AgentResult<()> {
    load_dotenv();
    init_tracing();
    let args = Args::parse();

    let llm = OpenAILlm::from_env(&args.model)?;

    let search = match args.search_url {
        Some(url) => {
            tracing::info!(url = %url, "document search enabled");
            DocumentSearchTool::new(Some(Arc::new(HttpDocumentSearch::new(url)) as Arc<dyn DocumentSearch>))
        }
        None => {
            tracing::warn!("DOCUMENT_SEARCH_URL not set, document search is unavailable");
            DocumentSearchTool::unavailable()
        }
    };

    let address = ServerAddress::new(args.host, args.port);
    let executor = ExpertExecutor::new(ExpertAgent::new(Arc::new(llm), search));
    let handler = DefaultRequestHandler::new(Arc::new(InMemoryTaskStore::new()), Arc::new(executor));

    AgentServer::new(expert_card(&address), handler).serve(&address).await
}
