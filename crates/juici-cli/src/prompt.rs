use anyhow::Result;
use juici::models::agent::AgentIdentity;
use juici::models::message::Message;

pub mod rustyline;
pub mod thinking;

/// Terminal surface of a chat session
pub trait Prompt {
    /// Show a complete message
    fn render(&mut self, message: &Message);
    /// Show the next piece of a reply that is still arriving
    fn render_chunk(&mut self, text: &str);
    fn get_input(&mut self) -> Result<Input>;
    fn show_busy(&mut self);
    fn hide_busy(&mut self);
    fn close(&self);
    fn ready(&self, agent: &AgentIdentity) {
        println!("\n");
        println!(
            "Chatting with {}. Type /help for commands, or exit to quit.",
            agent.display_name()
        );
        println!("\n");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // command argument or the message text
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    AskAgain, // nothing to send, prompt again
    Message,
    Switch, // clear the conversation and talk to another agent
    Clear,
    Help,
    Exit,
}

impl Input {
    fn new(input_type: InputType, content: Option<String>) -> Self {
        Input {
            input_type,
            content,
        }
    }

    /// Interpret one line typed by the user
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Input::new(InputType::AskAgain, None);
        }

        if ["exit", "/exit", "/quit"]
            .iter()
            .any(|command| line.eq_ignore_ascii_case(command))
        {
            return Input::new(InputType::Exit, None);
        }
        if line.eq_ignore_ascii_case("/clear") {
            return Input::new(InputType::Clear, None);
        }
        if line.eq_ignore_ascii_case("/?") || line.eq_ignore_ascii_case("/help") {
            return Input::new(InputType::Help, None);
        }

        let mut words = line.splitn(2, char::is_whitespace);
        if words
            .next()
            .is_some_and(|command| command.eq_ignore_ascii_case("/switch"))
        {
            let target = words.next().map(str::trim).filter(|s| !s.is_empty());
            return match target {
                Some(agent) => Input::new(InputType::Switch, Some(agent.to_string())),
                None => Input::new(InputType::Help, None),
            };
        }

        Input::new(InputType::Message, Some(line.to_string()))
    }
}

pub fn print_help() {
    println!("Commands:");
    println!("/switch <agent> - Clear the conversation and talk to another agent");
    println!("/clear - Clear the conversation");
    println!("exit | /exit - Exit the session");
    println!("/? | /help - Display this help message");
}
