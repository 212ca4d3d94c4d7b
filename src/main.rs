use anyhow::Result;
use subscript::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
