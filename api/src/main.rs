use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    application::{
        cli::{history, profile, scan},
        http::server::http_server,
    },
    args::{Args, Command, LogArgs},
};

mod application;
mod args;

fn init_logger(args: &LogArgs) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.filter));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout is reserved for command output
    if args.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    init_logger(&args.log);

    match args.command {
        Command::Serve(serve_args) => http_server::serve(serve_args).await,
        Command::Scan(scan_args) => scan::run(scan_args).await,
        Command::Profile(profile_args) => profile::run(profile_args),
        Command::History(history_args) => history::run(history_args).await,
    }
}
