use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// errgate record server
#[derive(Debug, Parser)]
#[command(name = "errgate", about = "Serves records with structured error responses")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "errgate.toml", env = "ERRGATE_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "ERRGATE_LISTEN")]
    pub listen: Option<SocketAddr>,
}
