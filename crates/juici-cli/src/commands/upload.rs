use anyhow::{Context, Result};
use juici::models::agent::AgentIdentity;
use juici::store::ConversationHandle;
use juici::transport::{ChatClient, TurnOutcome};
use std::path::Path;

use crate::prompt::Prompt;

/// Upload one image to `agent` and render the analysis
pub async fn run(
    client: &ChatClient,
    agent: &AgentIdentity,
    path: &Path,
    prompt: &mut dyn Prompt,
) -> Result<TurnOutcome> {
    let image = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let conversation = ConversationHandle::new(agent.clone());
    prompt.show_busy();
    let outcome = client
        .send_image(&conversation, agent, image, &file_name)
        .await;
    prompt.hide_busy();

    for message in conversation.snapshot() {
        prompt.render(&message);
    }
    Ok(outcome)
}
