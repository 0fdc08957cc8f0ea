use altwatch_lib::cli::Cli;
use clap::Parser;

#[tokio::main]
async fn main() {
    altwatch_lib::init_logging();

    let cli = Cli::parse();
    if let Err(err) = altwatch_lib::run(cli).await {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}
