//! `veritas events` — Page through the registry or protocol event log.

use clap::{Args, ValueEnum};

use veritas_core::LogEntry;
use veritas_credentials::RegistryEvent;
use veritas_verification::VerificationEvent;

use crate::client::NodeClient;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Stream {
    Registry,
    Protocol,
}

#[derive(Args, Debug)]
pub struct EventsArgs {
    /// Which log to read.
    #[arg(value_enum)]
    pub stream: Stream,

    /// First sequence number to return.
    #[arg(long, default_value_t = 0)]
    pub since: u64,

    /// Maximum number of entries.
    #[arg(long, default_value_t = 100)]
    pub limit: usize,
}

pub async fn run(node: &NodeClient, args: &EventsArgs) -> anyhow::Result<()> {
    let query = format!("since={}&limit={}", args.since, args.limit);
    // One JSON object per line, for piping into other tools.
    match args.stream {
        Stream::Registry => {
            let entries: Vec<LogEntry<RegistryEvent>> =
                node.get(&format!("/events/registry?{}", query)).await?;
            for entry in &entries {
                println!("{}", serde_json::to_string(entry)?);
            }
        }
        Stream::Protocol => {
            let entries: Vec<LogEntry<VerificationEvent>> =
                node.get(&format!("/events/protocol?{}", query)).await?;
            for entry in &entries {
                println!("{}", serde_json::to_string(entry)?);
            }
        }
    }
    Ok(())
}
