//! Entry point for the web tool server.

use agent_tool_servers::core::{ServerKind, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run(ServerKind::Web).await?;
    Ok(())
}
