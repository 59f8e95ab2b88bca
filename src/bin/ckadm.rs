use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "ckadm")]
#[command(about = "Management CLI for the ClickHouse admin service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8808")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show service status and cached connections
    Status,
    /// Print a UI form schema
    Schema {
        /// Schema kind (create, config)
        #[arg(short = 't', long = "type")]
        kind: String,
    },
    /// Find one reachable replica per shard
    Available {
        /// Native TCP port, recorded in each DSN. The service reaches nodes
        /// on its configured HTTP port.
        #[arg(short, long, default_value_t = 9000)]
        port: u16,
        #[arg(long, default_value = "default")]
        user: String,
        #[arg(long, default_value = "")]
        password: String,
        /// Comma-separated replicas of one shard; repeat per shard
        #[arg(short, long = "shard", required = true)]
        shards: Vec<String>,
        /// Include per-shard detail
        #[arg(long)]
        report: bool,
    },
    /// List cached connections
    Connections,
    /// Close cached connections
    Evict {
        hosts: Vec<String>,
    },
    /// List MergeTree tables through a cached connection
    Tables {
        host: String,
        #[arg(long)]
        engine: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Status => client.get(format!("{}/api/v1/status", base)).send().await?,
        Commands::Schema { kind } => {
            client
                .get(format!("{}/api/v1/ui/schema", base))
                .query(&[("type", kind)])
                .send()
                .await?
        }
        Commands::Available {
            port,
            user,
            password,
            shards,
            report,
        } => {
            let shards = split_shards(&shards);
            client
                .post(format!("{}/api/v1/ck/available", base))
                .json(&json!({
                    "shards": shards,
                    "port": port,
                    "user": user,
                    "password": password,
                    "report": report,
                }))
                .send()
                .await?
        }
        Commands::Connections => {
            client
                .get(format!("{}/api/v1/ck/connections", base))
                .send()
                .await?
        }
        Commands::Evict { hosts } => {
            client
                .delete(format!("{}/api/v1/ck/connections", base))
                .json(&json!({ "hosts": hosts }))
                .send()
                .await?
        }
        Commands::Tables { host, engine } => {
            let mut req = client.get(format!("{}/api/v1/ck/tables/{}", base, host));
            if let Some(engine) = engine {
                req = req.query(&[("engine", engine)]);
            }
            req.send().await?
        }
    };

    print_response(res).await
}

fn split_shards(args: &[String]) -> Vec<Vec<String>> {
    args.iter()
        .map(|shard| {
            shard
                .split(',')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(String::from)
                .collect()
        })
        .collect()
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: admin API returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_shards() {
        let cli =
            Cli::try_parse_from(["ckadm", "available", "--shard", "a, b", "--shard", "c"]).unwrap();
        match cli.command {
            Commands::Available { shards, port, .. } => {
                assert_eq!(split_shards(&shards), vec![vec!["a", "b"], vec!["c"]]);
                assert_eq!(port, 9000);
            }
            _ => panic!("expected available"),
        }
    }

    #[test]
    fn test_schema_type_flag() {
        let cli = Cli::try_parse_from(["ckadm", "schema", "--type", "create"]).unwrap();
        assert!(matches!(cli.command, Commands::Schema { kind } if kind == "create"));
    }
}
