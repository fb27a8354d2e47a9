mod execute;
mod output;

use clap::Args;

pub use execute::EscapeResult;

/// Escape a string for a single-quoted SQL literal
///
/// Kept for scripts that still build SQL by hand. Prefer `--params`.
#[derive(Args, Debug)]
pub struct EscapeCmd {
    /// Text to escape
    pub text: String,
}
