use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "translit", about = "Transliteration method diagnostics")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Type text through an input method and print the resulting field
    Convert {
        /// Bundled method id, or path to a method definition file
        method: String,
        /// Text to type, one keystroke per character
        text: String,
        /// Print every keystroke's edit instruction
        #[arg(long)]
        each: bool,
    },

    /// List available methods
    Methods {
        /// Also load definition files (<id>.toml / <id>.json) from this
        /// directory
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Validate a method definition file
    Check {
        /// Path to a .toml or .json definition
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Convert { method, text, each } => commands::convert::run(&method, &text, each),
        Command::Methods { dir } => commands::method_ops::list(dir.as_deref()),
        Command::Check { file } => commands::method_ops::check(&file),
    };
    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
