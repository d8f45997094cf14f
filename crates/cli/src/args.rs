pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vendo")]
#[command(about = "Bucketed inventories of single-use tokens", version)]
pub struct Args {
    /// Path to the vendo state directory (defaults to ~/.vendo)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Run the command as this operator (defaults to $USER)
    #[arg(long, global = true)]
    pub actor: Option<String>,

    #[command(subcommand)]
    pub command: crate::Command,
}
