use colored::*;
use futures::StreamExt;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::RunOptions;
use crate::core::{ContextVariables, Message, Role, RunEvent};
use crate::runtime::Anthill;

/// Console handles all terminal I/O with colored formatting
pub struct Console {
    user_color: Color,
    agent_color: Color,
    tool_color: Color,
}

impl Console {
    /// Create a new Console with default colors
    pub fn new() -> Self {
        Self {
            user_color: Color::BrightBlack,
            agent_color: Color::BrightBlue,
            tool_color: Color::Magenta,
        }
    }

    /// Create a new Console with custom colors
    pub fn with_colors(user_color: Color, agent_color: Color, tool_color: Color) -> Self {
        Self {
            user_color,
            agent_color,
            tool_color,
        }
    }

    /// Render one transcript message
    ///
    /// Assistant messages show the sender in color followed by content and tool calls;
    /// tool results are dimmed.
    pub fn format_message(&self, message: &Message) -> String {
        match message.role {
            Role::User => format!(
                "{} {}",
                "User:".color(self.user_color).bold(),
                message.text().unwrap_or_default()
            ),
            Role::Assistant => {
                let sender = message.sender.as_deref().unwrap_or("Assistant");
                let mut out = format!("{}:", sender.color(self.agent_color).bold());
                if let Some(text) = message.text() {
                    out.push(' ');
                    out.push_str(text);
                }
                for call in &message.tool_calls {
                    out.push_str(&format!(
                        "\n  {}({})",
                        call.name.color(self.tool_color),
                        call.arguments
                    ));
                }
                out
            }
            Role::Tool => format!(
                "  {}",
                message.text().unwrap_or_default().bright_black()
            ),
        }
    }

    /// Print one transcript message
    pub fn print_message(&self, message: &Message) {
        println!("{}", self.format_message(message));
    }

    /// Print a sequence of transcript messages
    pub fn print_messages(&self, messages: &[Message]) {
        for message in messages {
            self.print_message(message);
        }
    }

    /// Print an agent name prefix (without newline)
    pub fn print_agent_prefix(&self, sender: &str) {
        print!("{} ", format!("{}:", sender).color(self.agent_color).bold());
        let _ = io::stdout().flush();
    }

    /// Print a chunk of a streamed completion
    pub fn print_chunk(&self, chunk: &str) {
        print!("{}", chunk);
        let _ = io::stdout().flush();
    }

    /// Render a streaming run event
    ///
    /// Text deltas are printed as they arrive; completed assistant messages only
    /// contribute their tool calls.
    pub fn print_event(&self, event: &RunEvent) {
        match event {
            RunEvent::Start { sender } => self.print_agent_prefix(sender),
            RunEvent::Delta { delta, .. } => {
                if let Some(text) = delta.content.as_deref() {
                    self.print_chunk(text);
                }
            }
            RunEvent::End => println!(),
            RunEvent::Message(message) if message.role == Role::Tool => self.print_message(message),
            RunEvent::Message(message) => {
                for call in &message.tool_calls {
                    println!("  {}({})", call.name.color(self.tool_color), call.arguments);
                }
            }
            RunEvent::Response(_) => {}
        }
    }

    /// Print a system message (errors, info, etc.)
    pub fn print_system(&self, message: &str) {
        println!("{} {}", "System:".yellow().bold(), message);
    }

    /// Print an error message
    pub fn print_error(&self, error: &str) {
        eprintln!("{} {}", "Error:".red().bold(), error);
    }

    /// Print the input prompt
    pub fn print_prompt(&self) {
        print!("{} ", "User:".color(self.user_color).bold());
        let _ = io::stdout().flush();
    }

    /// Print a welcome banner
    pub fn print_banner(&self) {
        println!("{}", "=".repeat(60).bright_blue());
        println!("{}", "  Starting Anthill CLI".bright_blue().bold());
        println!("{}", "=".repeat(60).bright_blue());
        println!();
        println!("Type your message and press Enter. Type 'exit' or 'quit' to end the session.");
        println!();
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

/// Interactive stdin loop over a runner
///
/// Each line becomes a user message; the conversation history and the active agent
/// carry over between runs. Ends on `exit`, `quit` or end of input.
pub async fn run_demo_loop(
    anthill: &Anthill,
    starting_agent: &str,
    context_variables: ContextVariables,
    options: RunOptions,
) -> anyhow::Result<()> {
    let console = Console::new();
    console.print_banner();

    let mut messages: Vec<Message> = Vec::new();
    let mut agent = starting_agent.to_string();
    let mut context = context_variables;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        console.print_prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        messages.push(Message::user(input));

        let mut events =
            anthill.run_and_stream(&agent, messages.clone(), context.clone(), options.clone());
        let mut response = None;
        while let Some(event) = events.next().await {
            match event {
                Ok(RunEvent::Response(done)) => response = Some(done),
                Ok(event) if options.stream => console.print_event(&event),
                Ok(RunEvent::Message(message)) => console.print_message(&message),
                Ok(_) => {}
                Err(e) => {
                    console.print_error(&e.to_string());
                    break;
                }
            }
        }

        if let Some(response) = response {
            messages.extend(response.messages);
            agent = response.agent;
            context = response.context_variables;
        }
    }

    tracing::info!("[Console] Demo loop finished");
    Ok(())
}
