pub mod conversation;
pub mod error;
pub mod session;
pub mod transport;
pub mod types;

pub use conversation::Conversation;
pub use error::{ChatError, Result};
pub use session::ChatSession;
pub use transport::{ChatTransport, LineStream};
pub use types::{GenerationParams, Message, MessageId, PayloadMessage, Role, TurnRequest};
