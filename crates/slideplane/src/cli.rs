use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::navigation::Mode;

#[derive(Parser)]
#[command(name = "slideplane")]
#[command(author, version, about)]
#[command(long_about = "Present slides laid out on an infinite plane.\n\n\
    A deck places slides at offsets on a plane and lists the focus stops a camera\n\
    visits in order.\n\n\
    Examples:\n  \
    slideplane deck.yaml              Launch presentation (fullscreen)\n  \
    slideplane deck.yaml --windowed   Launch in a window\n  \
    slideplane deck.yaml --editor     Rearrange slides with shift-drag\n  \
    slideplane check deck.yaml        Validate a deck and print each focus")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Deck file to present
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Start on a specific focus (1-indexed)
    #[arg(long, global = false)]
    pub focus: Option<usize>,

    /// Start in editor mode
    #[arg(long, global = false)]
    pub editor: bool,

    /// Start with free roam enabled
    #[arg(long, global = false)]
    pub free_roam: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a deck and print every resolved focus
    Check {
        /// Deck file to check
        file: PathBuf,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.mode, free_roam.tick_rate)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Start-up options for the presentation window.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub file: PathBuf,
    pub windowed: bool,
    /// 0-based focus index.
    pub start_focus: isize,
    /// `None` keeps the configured default.
    pub mode: Option<Mode>,
    pub free_roam: bool,
}

impl Cli {
    /// Tracing filter level implied by `-v` / `-q`.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Check { file }) => {
                if !file.exists() {
                    anyhow::bail!("File not found: {}", file.display());
                }
                crate::commands::check::run(&file)
            }
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                println!("slideplane {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                if let Some(file) = self.file {
                    if !file.exists() {
                        anyhow::bail!("File not found: {}", file.display());
                    }
                    let start_focus = match self.focus {
                        Some(0) => anyhow::bail!("Focus numbers start at 1"),
                        Some(n) => isize::try_from(n - 1)?,
                        None => 0,
                    };
                    crate::app::run(LaunchOptions {
                        file,
                        windowed: self.windowed,
                        start_focus,
                        mode: self.editor.then_some(Mode::Editor),
                        free_roam: self.free_roam,
                    })
                } else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    Ok(())
                }
            }
        }
    }
}
