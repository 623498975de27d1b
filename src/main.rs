use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use vinstall::commands::{self, Settings};
use vinstall::core::profile::Profile;

#[derive(Parser)]
#[clap(name = "vinstall")]
#[clap(about = "Download, cache and install versioned artifacts")]
#[clap(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a version into the cache and print its path
    Download {
        /// Version substituted into the URL and file name templates
        version: String,
        #[clap(flatten)]
        tool: ToolArgs,
    },
    /// Download a version and extract it
    Install {
        /// Version substituted into the URL and file name templates
        version: String,
        #[clap(flatten)]
        tool: ToolArgs,
        /// Directory to extract into (default: <cache dir>/<version>)
        #[clap(long)]
        extract_to: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ToolArgs {
    /// TOML profile describing the tool
    #[clap(short, long)]
    config: Option<PathBuf>,
    /// Download URL, with %s in place of the version
    #[clap(long)]
    url: Option<String>,
    /// Local file name, with %s in place of the version
    #[clap(long)]
    file: Option<String>,
    /// Cache directory, relative to the profile directory or the current directory
    #[clap(long)]
    cache_dir: Option<PathBuf>,
    /// Download again even if the version is cached
    #[clap(long)]
    no_cache: bool,
    /// Don't print progress
    #[clap(short, long)]
    quiet: bool,
}

impl ToolArgs {
    fn into_settings(self, extract_to: Option<PathBuf>) -> Settings {
        Settings {
            config: self.config,
            overrides: Profile {
                url: self.url,
                file: self.file,
                cache_dir: self.cache_dir,
                no_cache: self.no_cache,
                extract_to,
            },
            quiet: self.quiet,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Download { version, tool } => {
            commands::download::download_version(&version, &tool.into_settings(None))
                .map(|_| ())
                .map_err(|e| anyhow::anyhow!(e))
        }
        Commands::Install {
            version,
            tool,
            extract_to,
        } => commands::install::install_version(&version, &tool.into_settings(extract_to))
            .map_err(|e| anyhow::anyhow!(e)),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
