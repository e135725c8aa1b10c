use anyhow::Result;
use console::style;
use juici::models::agent::AgentIdentity;
use juici::models::message::MessageState;
use juici::store::ConversationHandle;
use juici::transport::{ChatClient, DeliveryMode, TurnOutcome};
use std::time::Duration;

use crate::prompt::{print_help, InputType, Prompt};

const RENDER_INTERVAL: Duration = Duration::from_millis(50);

/// One conversation with one agent at a time, driven by a prompt
pub struct ChatSession<'a> {
    client: ChatClient,
    conversation: ConversationHandle,
    prompt: Box<dyn Prompt + 'a>,
}

impl<'a> ChatSession<'a> {
    pub fn new(client: ChatClient, agent: AgentIdentity, prompt: Box<dyn Prompt + 'a>) -> Self {
        ChatSession {
            client,
            conversation: ConversationHandle::new(agent),
            prompt,
        }
    }

    pub fn conversation(&self) -> &ConversationHandle {
        &self.conversation
    }

    pub async fn start(&mut self) -> Result<()> {
        self.prompt.ready(&self.conversation.agent());

        loop {
            let input = self.prompt.get_input()?;
            match input.input_type {
                InputType::Message => {
                    if let Some(text) = input.content {
                        self.send(&text).await;
                    }
                }
                InputType::Switch => {
                    if let Some(target) = input.content {
                        self.switch(&target);
                    }
                }
                InputType::Clear => {
                    self.conversation.clear();
                    println!("{}", style("Conversation cleared.").dim());
                }
                InputType::Help => print_help(),
                InputType::AskAgain => continue,
                InputType::Exit => break,
            }
        }

        self.prompt.close();
        Ok(())
    }

    /// Send one message and exit
    pub async fn headless_start(&mut self, message: &str) -> Result<TurnOutcome> {
        Ok(self.send(message).await)
    }

    fn switch(&mut self, target: &str) {
        match AgentIdentity::new(target) {
            Ok(agent) => {
                println!(
                    "{}",
                    style(format!("Switched to {}.", agent.display_name())).dim()
                );
                self.conversation.switch_agent(agent);
            }
            Err(e) => eprintln!("{}", style(e).red()),
        }
    }

    /// Run one turn, echoing a streamed reply as it grows in the conversation
    async fn send(&mut self, text: &str) -> TurnOutcome {
        let client = self.client.clone();
        let conversation = self.conversation.clone();
        let agent = conversation.agent();
        let reply_index = conversation.lock().len() + 1;

        self.prompt.show_busy();
        let turn = client.send_text(&conversation, &agent, text);
        tokio::pin!(turn);

        let mut ticker = tokio::time::interval(RENDER_INTERVAL);
        let mut printed = 0;
        let outcome = loop {
            tokio::select! {
                outcome = &mut turn => break outcome,
                _ = ticker.tick() => {
                    printed = self.echo_stream(reply_index, printed, false);
                }
            }
        };
        let streamed = matches!(
            outcome,
            TurnOutcome::Completed {
                mode: DeliveryMode::Streaming,
                ..
            }
        );
        printed = self.echo_stream(reply_index, printed, streamed);
        self.prompt.hide_busy();

        self.finish(&outcome, printed > 0);
        outcome
    }

    /// Print whatever a streaming reply gained since the last look
    ///
    /// Complete messages are only echoed when `include_complete` is set, so a buffered
    /// reply or the fixed error text is left for `finish` to render whole.
    fn echo_stream(&mut self, index: usize, printed: usize, include_complete: bool) -> usize {
        let content = {
            let conversation = self.conversation.lock();
            match conversation.messages().get(index) {
                Some(message)
                    if matches!(message.state, MessageState::Streaming | MessageState::Error)
                        || (include_complete && message.state == MessageState::Complete) =>
                {
                    message.content.clone()
                }
                _ => return printed,
            }
        };

        if let Some(delta) = content.get(printed..).filter(|delta| !delta.is_empty()) {
            if printed == 0 {
                self.prompt.hide_busy();
            }
            self.prompt.render_chunk(delta);
        }
        content.len().max(printed)
    }

    fn finish(&mut self, outcome: &TurnOutcome, streamed: bool) {
        match outcome {
            TurnOutcome::Completed {
                message_id,
                mode: DeliveryMode::Buffered,
            } => {
                if let Some(message) = self.conversation.get(*message_id) {
                    self.prompt.render(&message);
                }
            }
            TurnOutcome::Completed { .. } => println!("\n"),
            TurnOutcome::Failed { message_id, error } => {
                tracing::warn!(error = %error, "turn failed");
                if streamed {
                    println!();
                }
                if let Some(message) = self.conversation.get(*message_id) {
                    self.prompt.render(&message);
                }
            }
            TurnOutcome::Cancelled => {
                println!("{}", style("Reply cancelled.").dim());
            }
        }
    }
}
