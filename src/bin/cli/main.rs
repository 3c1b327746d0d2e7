//! CLI tool for browsing resource packs.

mod commands;
mod exit_codes;
mod output;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use exit_codes::ExitCode;

/// Browse resource pack directories and ZIP/JAR archives
#[derive(Parser)]
#[command(name = "resvfs")]
#[command(author, version, about = "Browse resource pack directories and ZIP/JAR archives", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the mirrored tree of a pack (alias: t)
    #[command(alias = "t")]
    Tree {
        /// Pack directory or .zip/.jar archive
        pack: PathBuf,
    },

    /// List entries of a pack (alias: l)
    #[command(alias = "l")]
    Ls {
        /// Pack directory or .zip/.jar archive
        pack: PathBuf,

        /// Path inside the pack to list
        #[arg(short = 'i', long)]
        inner: Option<String>,

        /// List every descendant in canonical order
        #[arg(short = 'r', long)]
        recursive: bool,
    },

    /// Write the contents of one entry to stdout
    Cat {
        /// Pack directory or .zip/.jar archive
        pack: PathBuf,

        /// Path of the entry inside the pack
        inner: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Tree { pack } => commands::tree(&pack, cli.format),

        Commands::Ls {
            pack,
            inner,
            recursive,
        } => commands::ls(&pack, inner.as_deref(), recursive, cli.format),

        Commands::Cat { pack, inner } => commands::cat(&pack, &inner),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
