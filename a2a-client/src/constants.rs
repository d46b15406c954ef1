//! Constants for the A2A client

use std::time::Duration;

/// Path of the agent card relative to an agent's base URL.
pub const AGENT_CARD_PATH: &str = ".well-known/agent-card.json";

/// JSON-RPC version
pub const JSONRPC_VERSION: &str = "2.0";

/// Whole-request timeout applied by the default HTTP client.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Delay between two `tasks/get` calls while waiting on a remote task.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Number of `tasks/get` attempts before giving up on a remote task.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 20;
