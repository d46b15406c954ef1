//! # A2A Protocol Client
//!
//! Client side of agent-to-agent task dispatch: discover a remote agent
//! through its card, send it a message, then poll the returned task until it
//! reaches a terminal state or the attempt ceiling runs out.
//!
//! ## Example
//!
//! ```rust,no_run
//! use a2a_client::{A2AClient, PollOutcome, TaskPoller};
//! use a2a_types::{Message, MessageSendParams, SendMessageResult};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = A2AClient::from_card_url("http://localhost:10007").await?;
//!
//! let message = Message::user_text("msg-123", "What does Vision AI cost?");
//! let result = client.send_message(MessageSendParams::new(message)).await?;
//!
//! if let SendMessageResult::Task(task) = result {
//!     match TaskPoller::default().wait_for_terminal(&client, task).await {
//!         PollOutcome::Finished(task) => println!("{:?}", task.status.message_text()),
//!         other => println!("gave up in state {}", other.task().status.state),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod constants;
pub mod error;
pub mod poll;
pub mod remote;

pub use client::{default_http_client, A2AClient};
pub use error::{A2AError, A2AResult};
pub use poll::{PollOutcome, PollPolicy, Sleeper, TaskPoller, TokioSleeper};
pub use remote::RemoteAgent;
