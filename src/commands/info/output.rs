//! Output formatting for info command results.

use super::execute::InfoResult;
use crate::output::Outputable;

impl Outputable for InfoResult {
    fn to_table(&self) -> String {
        [
            format!("Backend: {}", self.backend),
            format!("Server:  {}", self.server_info),
            format!("Client:  {}", self.client_info),
            format!("Host:    {}", self.host_info),
        ]
        .join("\n")
    }
}
