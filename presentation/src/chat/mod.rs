//! Interactive chat module
//!
//! Provides a line-editor based interactive chat bound to one session.

mod repl;

pub use repl::{ChatRepl, ReplCommand};
