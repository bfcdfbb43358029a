use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    uitree_cli::cli::run().await
}
