//! Entry point for the data validation and transformation tool server.

use agent_tool_servers::core::{ServerKind, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run(ServerKind::Data).await?;
    Ok(())
}
