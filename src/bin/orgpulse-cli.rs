//! ORGPULSE CLI Client
//!
//! Queries a running admin server and prints the JSON response.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// ORGPULSE CLI - Admin API client
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Server host
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = 8088)]
    port: u16,

    /// Path prefix for admin routes
    #[arg(long, default_value = "/admin")]
    prefix: String,

    #[command(subcommand)]
    query: Query,
}

#[derive(Subcommand, Debug)]
enum Query {
    /// System health snapshot
    Health,
    /// Per-endpoint performance
    Performance,
    /// Per-table row counts
    Database,
    /// Recent security events
    Security {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Recent log entries
    Logs {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Filesystem usage
    Disk,
}

impl Query {
    fn target(&self, prefix: &str) -> String {
        let (route, limit) = match self {
            Query::Health => ("system-health", None),
            Query::Performance => ("performance", None),
            Query::Database => ("database", None),
            Query::Security { limit } => ("security", *limit),
            Query::Logs { limit } => ("logs", *limit),
            Query::Disk => ("disk-usage", None),
        };

        let prefix = prefix.trim_end_matches('/');
        match limit {
            Some(n) => format!("{}/{}?limit={}", prefix, route, n),
            None => format!("{}/{}", prefix, route),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);
    let target = args.query.target(&args.prefix);

    let mut stream = TcpStream::connect(&addr)
        .await
        .with_context(|| format!("connecting to {}", addr))?;

    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        target, addr
    );
    stream.write_all(request.as_bytes()).await?;

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await?;
    let raw = String::from_utf8(raw).context("response is not UTF-8")?;

    let (head, body) = raw
        .split_once("\r\n\r\n")
        .context("malformed HTTP response")?;
    let status: u16 = head
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .context("missing status code")?;

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", body),
    }

    if status >= 400 {
        bail!("request failed with status {}", status);
    }

    Ok(())
}
