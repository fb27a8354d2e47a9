mod execute;
mod output;

use clap::Args;

pub use execute::InfoResult;

/// Show server, client and connection metadata
#[derive(Args, Debug)]
pub struct InfoCmd {}
