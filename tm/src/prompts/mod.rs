//! Reply Templates
//!
//! Every assistant turn the dialogue produces is rendered from a `.pmt`
//! (prompt template) file.
//!
//! Template loading chain:
//! 1. `{prompts.dir}/{name}.pmt` (user override, from config)
//! 2. Embedded copy compiled into the binary
//!
//! Templates use Handlebars syntax for variable substitution.

pub mod embedded;
mod loader;

pub use loader::{PromptLoader, ReplyContext};
