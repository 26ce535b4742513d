//! Root CLI structure for miranda-rs

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use miranda_db::{DecodeOptions, UtfMode};

#[derive(Parser)]
#[command(name = "miranda-rs")]
#[command(about = "Command-line tools for Miranda IM profile databases", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Options controlling how the database is read
    #[command(flatten)]
    pub load: LoadOptions,
}

/// How Unicode-flagged text is decoded
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum UtfModeArg {
    /// UTF-8, as written by Miranda
    #[default]
    Utf8,
    /// UTF-16, matching older export tools
    Utf16,
}

impl From<UtfModeArg> for UtfMode {
    fn from(arg: UtfModeArg) -> Self {
        match arg {
            UtfModeArg::Utf8 => Self::Utf8,
            UtfModeArg::Utf16 => Self::Utf16,
        }
    }
}

/// Options shared by every command that reads a database
#[derive(Args, Clone, Debug)]
pub struct LoadOptions {
    /// Decoding of text flagged as Unicode
    #[arg(
        long,
        value_enum,
        default_value = "utf8",
        env = "MIRANDA_UTF_MODE",
        global = true
    )]
    pub utf_mode: UtfModeArg,

    /// Memory-map the database instead of reading it into memory
    #[arg(long, global = true)]
    pub mmap: bool,
}

impl LoadOptions {
    /// Decoder options for these settings
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::new().with_utf_mode(self.utf_mode.into())
    }
}

/// Export file formats
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// SQLite database with contacts, settings and events tables
    Sqlite,
    /// JSON document
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the database header
    Info {
        /// Path to the profile database
        file: PathBuf,
    },

    /// List UIN, nick and name of every contact
    Names {
        /// Path to the profile database
        file: PathBuf,
    },

    /// Show contacts whose setting KEY displays as VALUE
    Find {
        /// Path to the profile database
        file: PathBuf,

        /// Setting name, e.g. "UIN" or "Nick"
        key: String,

        /// Value to compare against
        value: String,
    },

    /// Show every contact with its settings
    Contacts {
        /// Path to the profile database
        file: PathBuf,
    },

    /// Print the message history of every contact
    Events {
        /// Path to the profile database
        file: PathBuf,
    },

    /// Export contacts, settings and events
    Export {
        /// Path to the profile database
        file: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "export.db3")]
        output: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "sqlite")]
        format: ExportFormat,

        /// Replace the output file if it already exists
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_export_defaults() {
        let cli = Cli::try_parse_from(["miranda-rs", "export", "profile.dat"]).unwrap();
        match cli.command {
            Commands::Export {
                output,
                format,
                force,
                ..
            } => {
                assert_eq!(output, PathBuf::from("export.db3"));
                assert_eq!(format, ExportFormat::Sqlite);
                assert!(!force);
            }
            _ => panic!("Expected export command"),
        }
    }

    #[test]
    fn test_utf_mode_flag() {
        let cli =
            Cli::try_parse_from(["miranda-rs", "events", "profile.dat", "--utf-mode", "utf16"])
                .unwrap();
        assert_eq!(cli.load.decode_options().utf_mode, UtfMode::Utf16);
    }
}
