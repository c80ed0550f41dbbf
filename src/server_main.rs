use anyhow::Result;

use pukeko::app::serve;

#[tokio::main]
async fn main() -> Result<()> {
    serve().await
}
