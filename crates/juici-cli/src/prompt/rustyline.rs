use std::io::{self, Write};

use anyhow::Result;
use bat::WrappingMode;
use cliclack::spinner;
use console::style;
use juici::models::message::{Message, MessageState};
use juici::models::role::Role;

use super::{thinking::get_random_thinking_message, Input, InputType, Prompt};

const PROMPT: &str = "\x1b[1m\x1b[38;5;208m(juici)> \x1b[0m";
const THEME: &str = "zenburn";

pub struct RustylinePrompt {
    editor: rustyline::DefaultEditor,
    spinner: Option<cliclack::ProgressBar>,
}

impl RustylinePrompt {
    pub fn new() -> Result<Self> {
        Ok(RustylinePrompt {
            editor: rustyline::DefaultEditor::new()?,
            spinner: None,
        })
    }
}

pub fn print_markdown(content: &str) {
    let printed = bat::PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .theme(THEME)
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print();
    // fall back to plain output when the terminal cannot be highlighted
    if printed.is_err() {
        println!("{}", content);
    }
}

impl Prompt for RustylinePrompt {
    fn render(&mut self, message: &Message) {
        match (message.role, message.state) {
            (Role::User, _) => println!("{}", style(&message.content).dim()),
            (Role::Assistant, MessageState::Error) => {
                println!("{}", style("(reply interrupted)").red().italic())
            }
            (Role::Assistant, _) => print_markdown(&message.content),
        }
        println!();
        let _ = io::stdout().flush();
    }

    fn render_chunk(&mut self, text: &str) {
        print!("{}", text);
        let _ = io::stdout().flush();
    }

    fn show_busy(&mut self) {
        let spinner = spinner();
        spinner.start(format!("{}...", get_random_thinking_message()));
        self.spinner = Some(spinner);
    }

    fn hide_busy(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop("");
        }
    }

    fn get_input(&mut self) -> Result<Input> {
        match self.editor.readline(PROMPT) {
            Ok(line) => {
                let _ = self.editor.add_history_entry(line.as_str());
                Ok(Input::parse(&line))
            }
            Err(e) => {
                match e {
                    rustyline::error::ReadlineError::Interrupted
                    | rustyline::error::ReadlineError::Eof => (),
                    _ => eprintln!("Input error: {}", e),
                }
                Ok(Input {
                    input_type: InputType::Exit,
                    content: None,
                })
            }
        }
    }

    fn close(&self) {
        println!("{}", style("Bye!").dim());
    }
}
