use anyhow::Result;
use console::style;
use juici::models::agent::AgentIdentity;
use juici::transport::ChatClient;

pub async fn list(client: &ChatClient) -> Result<()> {
    let agents = client.list_agents().await?;
    for agent in agents {
        println!(
            "{}  {}\n    {}",
            style(&agent.id).bold(),
            style(&agent.name).cyan(),
            style(&agent.description).dim()
        );
    }
    Ok(())
}

pub async fn show(client: &ChatClient, agent: &AgentIdentity) -> Result<()> {
    let profile = client.agent_profile(agent).await?;
    println!(
        "{} ({})",
        style(&profile.descriptor.name).bold(),
        profile.descriptor.id
    );
    println!("{}", profile.descriptor.description);

    if !profile.example_prompts.is_empty() {
        println!("\n{}", style("Try asking:").dim());
        for prompt in &profile.example_prompts {
            println!("  - {}", prompt);
        }
    }
    Ok(())
}
