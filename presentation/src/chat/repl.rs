//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::output::console::ConsoleFormatter;
use crate::progress::reporter::ProgressReporter;
use chain_agent_application::{NoTurnObserver, SessionManager, TurnError};
use chain_agent_domain::util::preview_line;
use chain_agent_domain::{OutputFormat, Role, SessionId};
use colored::Colorize;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::path::PathBuf;
use std::sync::Arc;

const HISTORY_SIZE: usize = 1000;

/// Slash commands understood by the REPL
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Help,
    Context,
    Clear,
    Quit,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        match line.split_whitespace().next().unwrap_or_default() {
            "/help" | "/h" | "/?" => Command::Help,
            "/context" => Command::Context,
            "/clear" => Command::Clear,
            "/quit" | "/exit" | "/q" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// Interactive chat REPL
pub struct ChatRepl {
    manager: Arc<SessionManager>,
    session_id: SessionId,
    backend_label: String,
    formatter: ConsoleFormatter,
    output: OutputFormat,
    show_progress: bool,
    history_file: Option<PathBuf>,
}

impl ChatRepl {
    pub fn new(manager: Arc<SessionManager>, session_id: SessionId) -> Self {
        Self {
            manager,
            session_id,
            backend_label: String::new(),
            formatter: ConsoleFormatter::new(),
            output: OutputFormat::Text,
            show_progress: true,
            history_file: None,
        }
    }

    /// Label shown in the banner, e.g. "openai / gpt-4-turbo"
    pub fn with_backend_label(mut self, label: impl Into<String>) -> Self {
        self.backend_label = label.into();
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }

    pub fn with_formatter(mut self, formatter: ConsoleFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_history_file(mut self, path: Option<PathBuf>) -> Self {
        self.history_file = path;
        self
    }

    fn default_history_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("chain-agent").join("history.txt"))
    }

    fn line_editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = self
            .history_file
            .clone()
            .or_else(Self::default_history_path)
        else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(HISTORY_SIZE, path) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(_) => editor,
        }
    }

    /// Run the interactive REPL until `/quit` or Ctrl-D.
    pub async fn run(&self) -> std::io::Result<()> {
        let mut editor = self.line_editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("chain-agent".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if line.starts_with('/') {
                        if self.handle_command(Command::parse(line)) {
                            break;
                        }
                        continue;
                    }
                    if !self.process_query(line).await {
                        break;
                    }
                }
                Signal::CtrlC => {
                    println!("^C");
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
            }
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│           chain-agent - Chat Mode           │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        if !self.backend_label.is_empty() {
            println!("Backend: {}", self.backend_label);
            println!();
        }
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?     - Show this help");
        println!("  /context          - Show the conversation context");
        println!("  /clear            - Forget the conversation context");
        println!("  /quit, /exit, /q  - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&self, command: Command) -> bool {
        match command {
            Command::Quit => {
                println!("Bye!");
                return true;
            }
            Command::Help => {
                println!();
                Self::print_help();
            }
            Command::Context => self.print_context(),
            Command::Clear => {
                self.manager.clear_context(&self.session_id);
                println!("Context cleared.");
            }
            Command::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
            }
        }
        false
    }

    fn print_context(&self) {
        let context = self.manager.context(&self.session_id);
        println!();
        if context.is_empty() {
            println!("(no context yet)");
        }
        for message in context.messages() {
            let role = match message.role {
                Role::User => "user".cyan(),
                Role::Assistant => "assistant".green(),
                Role::System => "system".yellow(),
            };
            println!("  {:>9}: {}", role, preview_line(&message.content, 100));
        }
        let wallet = self.manager.wallet(&self.session_id);
        if let Some(active) = wallet.active() {
            println!("  {:>9}: {}", "wallet".magenta(), active.address);
        }
        println!();
    }

    /// Run one query. Returns false when the session can no longer continue.
    async fn process_query(&self, query: &str) -> bool {
        println!();

        let result = if self.show_progress {
            let progress = ProgressReporter::new();
            self.manager
                .handle_turn_observed(&self.session_id, query, &progress)
                .await
        } else {
            self.manager
                .handle_turn_observed(&self.session_id, query, &NoTurnObserver)
                .await
        };

        let keep_going = match result {
            Ok(outcome) => {
                self.manager
                    .update_context(&self.session_id, query, &outcome.final_response);
                println!("{}", self.formatter.render(&outcome, self.output));
                true
            }
            Err(e) if is_fatal(&e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                eprintln!("Check the provider credentials and model in your configuration.");
                self.manager.end_session(&self.session_id);
                false
            }
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                true
            }
        };
        println!();
        keep_going
    }
}

/// Errors after which no further query on the session can succeed.
fn is_fatal(err: &TurnError) -> bool {
    err.is_authentication() || err.is_model_unavailable()
}
