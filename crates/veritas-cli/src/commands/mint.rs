//! `veritas mint` — Mint a soulbound credential.

use clap::Args;
use serde::Serialize;

use veritas_core::{Address, Bytes32};
use veritas_credentials::{CredentialMetadata, NewCredential};

use crate::client::{print_json, CallerArgs, CredentialView, NodeClient};

#[derive(Args, Debug)]
pub struct MintArgs {
    #[command(flatten)]
    pub from: CallerArgs,

    /// Recipient address; the credential is bound to it permanently.
    #[arg(long)]
    pub to: Address,

    /// Credential type, e.g. "Smart Contract Auditor".
    #[arg(short = 't', long)]
    pub credential_type: String,

    /// Display name of the issuing organisation.
    #[arg(long)]
    pub issuer_name: String,

    /// Human-readable description stored in the metadata document.
    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Extra metadata fields as a JSON object.
    #[arg(long)]
    pub data: Option<String>,

    /// Use an externally hosted metadata document instead of an inline one.
    #[arg(long, requires = "metadata_hash")]
    pub metadata_uri: Option<String>,

    /// Content hash of the external metadata document.
    #[arg(long, requires = "metadata_uri")]
    pub metadata_hash: Option<Bytes32>,

    /// Print the full credential as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct MintRequest {
    caller: Address,
    #[serde(flatten)]
    credential: NewCredential,
}

/// Build the metadata hash and URI for a mint, encoding the document
/// inline unless an external one was named.
fn metadata(args: &MintArgs) -> anyhow::Result<(Bytes32, String)> {
    if let (Some(uri), Some(hash)) = (&args.metadata_uri, args.metadata_hash) {
        return Ok((hash, uri.clone()));
    }

    let additional = match &args.data {
        Some(raw) => Some(
            serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("invalid --data JSON: {}", e))?,
        ),
        None => None,
    };
    let encoded = CredentialMetadata::new(
        args.description.clone(),
        additional,
        args.from.caller,
        chrono::Utc::now(),
    )
    .encode()?;
    Ok((encoded.hash, encoded.uri))
}

pub async fn run(node: &NodeClient, args: &MintArgs) -> anyhow::Result<()> {
    let (metadata_hash, metadata_uri) = metadata(args)?;
    let body = MintRequest {
        caller: args.from.caller,
        credential: NewCredential {
            recipient: args.to,
            credential_type: args.credential_type.clone(),
            issuer_name: args.issuer_name.clone(),
            metadata_hash,
            metadata_uri,
        },
    };

    let view: CredentialView = node.post("/credentials", &body).await?;
    if args.json {
        return print_json(&view.credential);
    }

    let c = &view.credential;
    println!("Credential minted!");
    println!("  Token ID:  {}", c.token_id);
    println!("  Owner:     {}", c.owner);
    println!("  Type:      {}", c.credential_type);
    println!("  Issuer:    {} ({})", c.issuer_name, c.issuer);
    println!("  Metadata:  {}", c.metadata_hash);
    Ok(())
}
