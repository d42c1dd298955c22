use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    taskday::tui::run().await
}
