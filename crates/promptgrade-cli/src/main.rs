//! promptgrade CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(name = "promptgrade", version, about = "Prompt quality grading engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Output format for a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade one prompt against a challenge
    Evaluate {
        /// Path to a challenge .toml file or directory
        #[arg(long)]
        challenges: PathBuf,

        /// ID of the challenge to grade against
        #[arg(long)]
        challenge_id: String,

        /// Prompt text
        #[arg(long, conflicts_with = "prompt_file", required_unless_present = "prompt_file")]
        prompt: Option<String>,

        /// Read the prompt from a file
        #[arg(long)]
        prompt_file: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade a file of submissions from several users concurrently
    Batch {
        /// Path to a challenge .toml file or directory
        #[arg(long)]
        challenges: PathBuf,

        /// TOML file of [[submissions]] (user, challenge_id, prompt)
        #[arg(long)]
        submissions: PathBuf,

        /// Override the configured parallelism
        #[arg(long)]
        parallelism: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate challenge TOML files
    Validate {
        /// Path to a challenge file or directory
        #[arg(long)]
        challenges: PathBuf,
    },

    /// Create starter config and example challenges
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("promptgrade=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Evaluate {
            challenges,
            challenge_id,
            prompt,
            prompt_file,
            format,
            config,
        } => {
            commands::evaluate::execute(challenges, challenge_id, prompt, prompt_file, format, config)
                .await
        }
        Commands::Batch {
            challenges,
            submissions,
            parallelism,
            config,
        } => commands::batch::execute(challenges, submissions, parallelism, config).await,
        Commands::Validate { challenges } => commands::validate::execute(challenges),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
