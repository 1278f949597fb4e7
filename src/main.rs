use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use tracing_subscriber::EnvFilter;

use collation::collation::CollationGathering;
use collation::config::{load_config, save_config, CollationConfig, CONFIG_FILENAME};
use collation::resolution::Dereferencer;
use collation::types::*;

/// Dereference cross-document pointers in XML collation documents.
#[derive(Parser)]
#[command(
    name = "collation-deref",
    about = "Dereference cross-document pointers in XML collation documents"
)]
struct Cli {
    /// Configuration file (default: ./collation.json if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every referenced document and resolve all pointers
    Resolve {
        /// URL or path of the collation document
        root: String,
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// List the pointers in a collation document without resolving them
    Pointers {
        /// URL or path of the collation document
        root: String,
    },
    /// Write a default configuration file
    InitConfig {
        /// Destination (default: ./collation.json)
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> collation::errors::Result<()> {
    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));

    match cli.command {
        Commands::Resolve { root, json } => {
            let config = load_config(&config_path)?;
            let gathering =
                CollationGathering::open_url(&root, Dereferencer::from_config(&config)).await?;
            let results = gathering.dereference_pointers().await?;
            let summary = DereferenceSummary::from_results(&results);

            if json {
                let output = serde_json::json!({
                    "summary": summary,
                    "results": results,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                for r in &results {
                    print_resolution(r);
                }
                println!(
                    "\n{} pointers: {} resolved, {} unresolved ({} documents)",
                    summary.total,
                    summary.resolved_count,
                    summary.unresolved_count,
                    summary.documents_loaded
                );
            }
        }
        Commands::Pointers { root } => {
            let config = load_config(&config_path)?;
            let gathering =
                CollationGathering::open_url(&root, Dereferencer::from_config(&config)).await?;
            let pointers = gathering.pointers()?;
            if pointers.is_empty() {
                println!("No pointers found in '{}'", root);
            }
            for p in &pointers {
                println!("{}  {}", p.url, p.locator);
            }
        }
        Commands::InitConfig { path } => {
            let path = path.unwrap_or(config_path);
            save_config(&path, &CollationConfig::default())?;
            println!("Wrote default configuration to {}", path.display());
        }
    }
    Ok(())
}

fn print_resolution(r: &PointerResolution) {
    match &r.resolution {
        Resolution::Resolved { tier, nodes } => {
            println!(
                "[{}] {} -> {} node(s)",
                tier.as_str(),
                r.pointer.target(),
                nodes.len()
            );
            for node in nodes {
                let name = node.name.as_deref().unwrap_or(node.kind.as_str());
                println!("    {}: {}", name, preview(&node.text, 72));
            }
        }
        Resolution::Unresolved => {
            println!("[unresolved] {}", r.pointer.target());
        }
    }
}

/// Collapses whitespace and truncates to `max` characters.
fn preview(text: &str, max: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max {
        return collapsed;
    }
    let truncated: String = collapsed.chars().take(max).collect();
    format!("{}...", truncated)
}
