//! Thin HTTP client for the node API.

use anyhow::Context;
use clap::Args;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use veritas_core::Address;
use veritas_credentials::Credential;

/// Connection options shared by every networked subcommand.
#[derive(Args, Debug, Clone)]
pub struct NodeArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = "http://127.0.0.1:9001", global = true)]
    pub endpoint: String,
}

/// Options for subcommands that act as an address.
#[derive(Args, Debug, Clone)]
pub struct CallerArgs {
    /// Address the call is made from.
    #[arg(long = "from")]
    pub caller: Address,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
    #[serde(default)]
    kind: Option<String>,
}

/// A credential as the node reports it.
#[derive(Debug, Deserialize)]
pub struct CredentialView {
    #[serde(flatten)]
    pub credential: Credential,
    pub is_valid: bool,
}

pub struct NodeClient {
    endpoint: String,
    http: reqwest::Client,
}

impl NodeClient {
    pub fn new(args: &NodeArgs) -> Self {
        Self {
            endpoint: args.endpoint.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.endpoint, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| self.unreachable())?;
        decode(resp).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        let url = self.url(path);
        tracing::debug!(%url, "POST");
        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| self.unreachable())?;
        decode(resp).await
    }

    fn unreachable(&self) -> String {
        format!(
            "could not reach node at {} (is it running? start it with: veritas-node)",
            self.endpoint
        )
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> anyhow::Result<T> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }
    match resp.json::<ErrorResponse>().await {
        Ok(err) => match err.kind {
            Some(kind) => anyhow::bail!("{} error (HTTP {}): {}", kind, status, err.error),
            None => anyhow::bail!("node error (HTTP {}): {}", status, err.error),
        },
        Err(_) => anyhow::bail!("node returned HTTP {}", status),
    }
}

/// Print any response body as indented JSON.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
