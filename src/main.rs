use std::io::Result;

#[tokio::main]
async fn main() -> Result<()> {
    territory_server::run_with_config().await
}
