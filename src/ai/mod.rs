pub mod attachment;
pub mod client;
pub mod credentials;
pub mod error;
pub mod json_parser;
pub mod prompts;
pub mod session;

pub use attachment::*;
pub use client::*;
pub use credentials::*;
pub use error::AssistantError;
pub use session::*;
