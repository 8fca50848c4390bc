use clap::{Parser, Subcommand};
use dadjoke::config::{load_config, RuntimeConfig};
use dadjoke::jokes::JokeSource;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dadjoke")]
#[command(about = "Dad Joke Agent", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the agent's HTTP server (activity protocol, JSON-RPC message/send, discovery documents).
    Serve {
        /// Config file path (default: DADJOKE_CONFIG_PATH or ~/.dadjoke/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Listen port (default from PORT, config, or 2009)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Print the public URL of every endpoint as JSON, derived from BASE_URL.
    Endpoints {
        /// Config file path (default: DADJOKE_CONFIG_PATH or ~/.dadjoke/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Print one joke. Without a topic (or with a generic one) a classic is picked at random.
    Joke {
        /// Config file path (default: DADJOKE_CONFIG_PATH or ~/.dadjoke/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Topic words, e.g. `dadjoke joke cats`
        topic: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("ignoring unreadable .env: {}", e);
        }
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("dadjoke {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("serve failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Endpoints { config }) => {
            if let Err(e) = run_endpoints(config) {
                log::error!("endpoints failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Joke { config, topic }) => {
            if let Err(e) = run_joke(config, topic).await {
                log::error!("joke failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn resolve_runtime(config_path: Option<PathBuf>) -> anyhow::Result<RuntimeConfig> {
    let (config, path) = load_config(config_path)?;
    log::debug!("config: {}", path.display());
    Ok(RuntimeConfig::resolve(&config))
}

async fn run_serve(config_path: Option<PathBuf>, port: Option<u16>) -> anyhow::Result<()> {
    let mut runtime = resolve_runtime(config_path)?;
    if let Some(p) = port {
        // Keep the default base URL in step with the overridden port.
        if runtime.base_url == format!("http://localhost:{}", runtime.port) {
            runtime.base_url = format!("http://localhost:{}", p);
        }
        runtime.port = p;
    }
    log::info!("starting agent on {}:{}", runtime.bind, runtime.port);
    dadjoke::gateway::run_gateway(runtime).await
}

fn run_endpoints(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let runtime = resolve_runtime(config_path)?;
    let urls = runtime.endpoint_urls();
    println!("{}", serde_json::to_string_pretty(&urls)?);
    Ok(())
}

async fn run_joke(config_path: Option<PathBuf>, topic: Vec<String>) -> anyhow::Result<()> {
    let runtime = resolve_runtime(config_path)?;
    let source = JokeSource::from_config(&runtime);
    let joke = source.get_joke(&topic.join(" ")).await;
    println!("{}", joke);
    Ok(())
}
