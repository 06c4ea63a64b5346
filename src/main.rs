use anyhow::Result;
use structopt::StructOpt;

use shearstream::services::*;

#[derive(Debug, StructOpt)]
#[structopt(about = "Resilient ingestion pipeline for batched salon hair readings.")]
struct MainOptions {
    #[structopt(flatten)]
    shared_options: SharedOptions,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    #[cfg(feature = "receiver")]
    Receiver(receiver::Options),

    #[cfg(feature = "storage")]
    Storage(storage::Options),
}

#[tokio::main]
async fn main() -> Result<()> {
    let main_options = MainOptions::from_args();
    let shared_options = main_options.shared_options;

    pretty_env_logger::formatted_timed_builder()
        .parse_filters(&shared_options.log)
        .init();

    match main_options.cmd {
        #[cfg(feature = "receiver")]
        Command::Receiver(options) => receiver::run(shared_options, options).await?,

        #[cfg(feature = "storage")]
        Command::Storage(options) => storage::run(shared_options, options).await?,
    }

    Ok(())
}
