use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "oracle-cli")]
#[command(about = "Query a running coins oracle", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered nodes
    Nodes {
        /// Skip fetching chain state
        #[arg(long)]
        noinfo: bool,
    },
    /// Show chain state of one node
    Info { asset: String },
    /// Show the balance of an address
    Balance { asset: String, addr: String },
    /// Look up a transaction
    Tx { asset: String, hash: String },
    /// Ask the node to start tracking an address
    Import { asset: String, addr: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Nodes { noinfo } => {
            client
                .get(format!("{}/nodes", base))
                .query(&[("noinfo", noinfo)])
                .send()
                .await?
        }
        Commands::Info { asset } => client.get(format!("{}/nodes/{}/info", base, asset)).send().await?,
        Commands::Balance { asset, addr } => {
            client
                .get(format!("{}/nodes/{}/addrs/{}/balance", base, asset, addr))
                .send()
                .await?
        }
        Commands::Tx { asset, hash } => {
            client
                .get(format!("{}/nodes/{}/txs/{}", base, asset, hash))
                .send()
                .await?
        }
        Commands::Import { asset, addr } => {
            client
                .post(format!("{}/nodes/{}/addrs/import", base, asset))
                .json(&json!({ "addr": addr }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", rendered);
    } else {
        eprintln!("Error: oracle returned status {}", status);
        eprintln!("{}", rendered);
        std::process::exit(1);
    }
    Ok(())
}
