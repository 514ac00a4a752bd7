//! Entry point for the PDF and text document tool server.

use agent_tool_servers::core::{ServerKind, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run(ServerKind::Document).await?;
    Ok(())
}
