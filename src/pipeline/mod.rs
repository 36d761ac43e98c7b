//! Request pipeline around the classifier: validation, sanitization and
//! response mapping.

mod sanitize;
mod service;

pub use sanitize::{DEFAULT_MAX_MESSAGE_LENGTH, RequestError, Sanitizer};
pub use service::{ChatDebug, ChatReply, ChatService};
