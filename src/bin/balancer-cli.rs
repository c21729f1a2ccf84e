use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "balancer-cli")]
#[command(about = "Management CLI for the HTTP load balancer", long_about = None)]
struct Cli {
    /// Admin API base URL
    #[arg(short, long, default_value = "http://127.0.0.1:3001")]
    url: String,

    /// Bearer token, if the admin API requires one
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check balancer status
    Status,
    /// List backends and their liveness
    Backends,
    /// Replace the backend list
    Reload {
        /// Listen port to persist (applied on restart)
        #[arg(short, long, default_value = "")]
        port: String,

        /// Backend URLs in rotation order
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", key))?,
        );
    }

    let res = match cli.command {
        Commands::Status => {
            client.get(format!("{}/status", base))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Backends => {
            client.get(format!("{}/backends", base))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Reload { port, urls } => {
            client.put(format!("{}/config", base))
                .headers(headers)
                .json(&json!({ "port": port, "urls": urls }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
