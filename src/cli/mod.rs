use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod serve;
pub mod transcribe;

#[derive(Subcommand)]
enum Command {
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "8787")]
        port: String,
    },
    /// Read subtitle text from stdin and stream the transcript to stdout
    Transcribe {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await;
        }
        Some(Command::Transcribe {}) => {
            transcribe::run().await?;
        }
        None => {}
    }

    Ok(())
}
