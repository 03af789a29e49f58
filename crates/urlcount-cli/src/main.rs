mod cli;

use clap::Parser;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    cli.init_logging();

    if let Err(err) = cli.dispatch().await {
        eprintln!("urlcount error: {:#}", err);
        std::process::exit(1);
    }
}
