//! flora-harvest — entry point.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use flora_harvest::HarvestConfig;
use flora_harvest_cli::{classify_report, harvest, index};

#[derive(Parser)]
#[command(
    name = "flora-harvest",
    about = "Build PlantCLEF-style training data from encyclopedia page images",
    version
)]
struct Cli {
    /// MediaWiki API endpoint. Also reads FLORA_API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory receiving images, sidecars and manifests. Also reads FLORA_OUTPUT_DIR.
    #[arg(short, long, global = true)]
    output_dir: Option<String>,

    /// Concurrent image-info lookups.
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest and classify every image of the page named TERM.
    Harvest {
        /// Search term, e.g. a plant name.
        term: Option<String>,
    },

    /// Show how a single image URL would be classified.
    Classify {
        /// Image URL.
        url: String,
    },

    /// Group the sidecars in DIR by observation id.
    Index {
        /// Directory holding the `.xml` sidecars.
        dir: std::path::PathBuf,

        /// Index file to write.
        #[arg(long, default_value = "output.txt")]
        output: std::path::PathBuf,
    },

    /// Answer `GET /?q=TERM` over HTTP.
    #[cfg(feature = "http")]
    Serve {
        /// Listen address (host:port).
        #[arg(long, default_value = "127.0.0.1:3200")]
        addr: String,
    },

    /// Print the effective configuration as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   flora-harvest completions bash > ~/.local/share/bash-completion/completions/flora-harvest
    ///   flora-harvest completions zsh > ~/.zfunc/_flora-harvest
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = HarvestConfig::resolve(cli.api_url.as_deref(), cli.output_dir.as_deref());
    if let Some(concurrency) = cli.concurrency {
        config = config.with_concurrency(concurrency);
    }

    match cli.command {
        Commands::Harvest { term } => {
            let status = harvest(&config, term.as_deref()).await?;
            println!("{status}");
        }

        Commands::Classify { url } => {
            println!("{}", serde_json::to_string_pretty(&classify_report(&url))?);
        }

        Commands::Index { dir, output } => {
            println!("{}", index(&dir, &output)?);
        }

        #[cfg(feature = "http")]
        Commands::Serve { addr } => {
            tracing::info!("Output dir: {}", config.output_dir.display());
            flora_harvest_cli::server::run(&addr, config).await?;
        }

        Commands::Info => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "flora-harvest", &mut std::io::stdout());
        }
    }

    Ok(())
}
