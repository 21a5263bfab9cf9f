//! Worker process entry point.
//!
//! One worker serves exactly one fact operation for one major version,
//! speaking length-prefixed JSON frames on stdin/stdout. Logs go to
//! stderr so they never interleave with the protocol.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tailwind_resolver::protocol::Operation;
use tailwind_resolver::worker::{serve, WorkerOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tailwind-resolver-worker")]
#[command(about = "Fact-resolution worker for tailwind-resolver", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve one operation over stdin/stdout until stdin closes
    Serve(ServeArgs),
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// The operation this worker is dedicated to
    #[arg(long = "operation", value_enum)]
    operation: Operation,

    /// Resolved framework major version
    #[arg(long = "major")]
    major: u64,

    /// Disable context caching (every request rebuilds the context)
    #[arg(long = "no-cache", default_value_t = false)]
    no_cache: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => {
            let options = WorkerOptions {
                operation: args.operation,
                major: args.major,
                no_cache: args.no_cache,
            };
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_io()
                .build()
                .context("failed to start the worker runtime")?;
            runtime
                .block_on(serve(options))
                .context("worker serve loop failed")?;
            Ok(())
        }
    }
}
