//! Authentication: credential files, prompting, and session establishment.

pub mod authenticator;
pub mod authfile;
pub mod prompt;

pub use authenticator::{login, Authenticator};
pub use prompt::{CredentialPrompt, TerminalPrompt};
