pub mod api;
pub mod commands;
pub mod controller;
pub mod error;

pub use api::{ApiReply, ElectionApi, HttpElectionApi, DEFAULT_API_BASE_URL};
pub use commands::{ClientCommand, CommandOutput, CommandReport};
pub use controller::{status, CommandResult, Session, SessionController};
pub use error::ClientError;
