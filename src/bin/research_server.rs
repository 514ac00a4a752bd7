//! Entry point for the arXiv research tool server.

use agent_tool_servers::core::{ServerKind, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run(ServerKind::Research).await?;
    Ok(())
}
