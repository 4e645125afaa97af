use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Default log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP service
    Serve {
        /// Address to listen on (overrides NUTRI_BIND_ADDR)
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },
    /// Analyze one meal description and print ingredients with totals
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct AnalyzeArgs {
    /// Free-text meal description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Path to a text file holding the meal description
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

impl AnalyzeArgs {
    pub async fn read_description(&self) -> Result<String> {
        match (&self.description, &self.file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read meal description file '{}'", path.display())),
            (None, None) => bail!("either --description or --file is required"),
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
