use std::io::{self, Write};

use anyhow::Result;
use bat::WrappingMode;
use cliclack::{input, spinner, ProgressBar};
use console::style;
use scout::models::event::AgentEvent;

use super::{Input, Prompt, Theme};

/// Tool output beyond this many characters is elided on screen
const MAX_RESULT_PREVIEW: usize = 300;

pub struct CliclackPrompt {
    spinner: Option<ProgressBar>,
    theme: Theme,
}

impl CliclackPrompt {
    pub fn new() -> Self {
        CliclackPrompt {
            spinner: None,
            theme: Theme::Dark,
        }
    }

    fn bat_theme(&self) -> &'static str {
        match self.theme {
            Theme::Light => "GitHub",
            Theme::Dark => "zenburn",
        }
    }
}

fn print_markdown(content: &str, theme: &str) {
    let printed = bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(theme)
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print();
    if printed.is_err() {
        println!("{}", content);
    }
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(MAX_RESULT_PREVIEW) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

impl Prompt for CliclackPrompt {
    fn greet(&mut self, greeting: &str) {
        println!(
            "{} {}",
            style("🔎 Scout - Chat with Search").bold(),
            style("- type \"exit\" to end the session").dim()
        );
        println!();
        print_markdown(greeting, self.bat_theme());
        println!();
    }

    fn render_event(&mut self, event: &AgentEvent) {
        let busy = self.spinner.is_some();
        self.hide_busy();

        match event {
            AgentEvent::ModelThought { text } => println!("{}", style(text).dim()),
            AgentEvent::ToolInvoked { tool, query, .. } => {
                println!("{}", style(format!("🔧 {}: {}", tool, query)).dim())
            }
            AgentEvent::ToolResult {
                output, is_error, ..
            } => {
                if *is_error {
                    println!("{}", style(preview(output)).red().dim())
                } else {
                    println!("{}", style(preview(output)).dim())
                }
            }
            AgentEvent::FinalAnswer { text } => {
                println!();
                print_markdown(text, self.bat_theme());
                println!();
            }
        }
        let _ = io::stdout().flush();

        if busy && !event.is_final() {
            self.show_busy();
        }
    }

    fn render_error(&mut self, error: &str) {
        self.hide_busy();
        println!("{}", style(format!("Error: {}", error)).red());
        println!();
    }

    fn get_input(&mut self) -> Result<Input> {
        let message_text: String = input("Message:")
            .placeholder("What do you want to search for?")
            .required(false)
            .interact()?;
        let message_text = message_text.trim();

        if message_text.is_empty() {
            Ok(Input::ask_again())
        } else if ["exit", "/exit", "/quit"]
            .iter()
            .any(|command| message_text.eq_ignore_ascii_case(command))
        {
            Ok(Input::exit())
        } else if message_text.eq_ignore_ascii_case("/t") {
            self.theme = match self.theme {
                Theme::Light => {
                    println!("Switching to Dark theme");
                    Theme::Dark
                }
                Theme::Dark => {
                    println!("Switching to Light theme");
                    Theme::Light
                }
            };
            Ok(Input::ask_again())
        } else if message_text.eq_ignore_ascii_case("/?") {
            println!("Commands:");
            println!("exit - Exit the session");
            println!("/t - Toggle Light/Dark theme");
            println!("/? - Display this help message");
            println!("Ctrl+C - Interrupt the current search");
            Ok(Input::ask_again())
        } else {
            Ok(Input::message(message_text))
        }
    }

    fn show_busy(&mut self) {
        let spin = spinner();
        spin.start("searching...");
        self.spinner = Some(spin);
    }

    fn hide_busy(&mut self) {
        if let Some(spin) = self.spinner.take() {
            spin.stop("");
        }
    }

    fn close(&self) {
        // No cleanup required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview() {
        assert_eq!(preview("short"), "short");
        let long = "é".repeat(MAX_RESULT_PREVIEW + 5);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), MAX_RESULT_PREVIEW + 3);
    }
}
