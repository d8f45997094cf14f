use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use vendo_cli::state::AppState;
use vendo_cli::{args::Args, op::Op};

fn init_logging(default_level: &str) {
    let log_level: tracing::Level = default_level.parse().unwrap_or(tracing::Level::WARN);
    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // The config's log_level seeds the filter, RUST_LOG still wins.
    // Before `vendo init` there is no config, so fall back to warn.
    let default_level = AppState::load(args.config_path.clone())
        .map(|state| state.config.log_level)
        .unwrap_or_else(|_| "warn".to_string());
    init_logging(&default_level);

    let actor = vendo_cli::op::resolve_actor(args.actor);
    let ctx = vendo_cli::op::OpContext::new(args.config_path, actor);

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
