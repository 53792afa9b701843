pub mod chat;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use chat::{ChatReply, ChatService, ChatSettings};
pub use error::AppError;
pub use server::{configure, json_config, run_server};
pub use state::AppState;
