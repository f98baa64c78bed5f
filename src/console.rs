use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::io::{self, Write};

/// Line-based console seam. The engine never touches stdio directly so
/// tests can script both sides of the conversation.
pub trait Console {
    /// Block for one line of user input.
    fn read_line(&mut self) -> Result<String>;
    /// Display an agent utterance.
    fn show_agent(&mut self, text: &str);
    /// Display a session-level notice (greeting, goodbye).
    fn show_notice(&mut self, text: &str);
}

pub struct StdConsole;

impl Console for StdConsole {
    fn read_line(&mut self) -> Result<String> {
        print!("\n{} ", "You:".cyan().bold());
        io::stdout().flush().ok();
        let mut input = String::new();
        io::stdin()
            .read_line(&mut input)
            .context("Failed to read user input")?;
        Ok(input.trim_end().to_string())
    }

    fn show_agent(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        println!("\n{} {}", "AI:".green().bold(), text.trim());
    }

    fn show_notice(&mut self, text: &str) {
        println!("{}", text.dimmed());
    }
}
