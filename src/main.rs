use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod core;
mod delivery;
mod engine;
mod store;
mod web;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("pairwheel=debug,info")
    } else {
        EnvFilter::new("pairwheel=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Generate(args) => {
            cli::generate::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Frequency(args) => {
            cli::frequency::run(args)?;
        }
        cli::Commands::Send(args) => {
            cli::send::run(args, cli.verbose)?;
        }
        cli::Commands::Table(args) => {
            cli::table::run(args, cli.format)?;
        }
        cli::Commands::Serve(args) => {
            web::server::run(args)?;
        }
    }

    Ok(())
}
