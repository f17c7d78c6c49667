use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "devlog",
    about = "Development-mode request/response logger for chat pipelines",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/devlog/logs/devlog.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to devlog.yaml config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a single filter hook
    Hook {
        #[command(subcommand)]
        action: HookAction,
    },

    /// Replay a recorded JSONL transcript through one logger
    Replay {
        /// Transcript file, or - for stdin
        input: String,

        /// Write every returned payload here as JSONL
        #[arg(long, short = 'O')]
        output: Option<PathBuf>,

        /// Force logging on for this run
        #[arg(long)]
        enable: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum HookAction {
    /// Pass one payload through a hook
    Dispatch {
        /// Hook name (inlet, stream, outlet)
        hook: String,

        /// Payload JSON (reads from stdin if not provided)
        #[arg(long)]
        payload: Option<String>,

        /// User descriptor JSON
        #[arg(long)]
        user: Option<String>,

        /// Model descriptor JSON
        #[arg(long)]
        model: Option<String>,

        /// Treat the payload as raw bytes (stream only)
        #[arg(long)]
        raw: bool,

        /// Force logging on for this run
        #[arg(long)]
        enable: bool,

        /// Write the returned payload to stdout
        #[arg(long)]
        echo: bool,
    },

    /// List registered filters
    List {
        /// Filter by hook
        #[arg(long)]
        hook: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Get a configuration value
    Get {
        /// Configuration key (dot notation)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (dot notation)
        key: String,

        /// New value
        value: String,
    },
}
