mod assistant;
mod cli;
mod csv_sheet;
mod db;
mod error;
mod fmt;
mod ledger;
mod models;
mod parse;
mod schema;
mod server;
mod settings;
mod sheet;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = match settings::load_settings() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(&settings.log_level);

    let result = match cli.command {
        Commands::Init { data_dir, backend } => cli::init::run(settings, data_dir, backend),
        Commands::Serve { addr } => cli::serve::run(settings, addr),
        Commands::Add {
            amount,
            description,
            payment_method,
            category,
            kind,
        } => cli::add::run(
            &settings,
            &amount,
            &description,
            &payment_method,
            &category,
            &kind,
        ),
        Commands::Record { text, reply } => cli::record::run(&settings, text, reply),
        Commands::Daily { date } => cli::report::daily(&settings, date),
        Commands::Balance => cli::report::balance(&settings),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
