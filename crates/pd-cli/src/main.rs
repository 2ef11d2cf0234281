//! CLI frontend for the Paredao host control panel.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "paredao",
    about = "Paredao: a control panel for hosting live elimination games",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log engine activity at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Host a season interactively
    Play {
        /// Planned season length in minutes
        #[arg(short, long, default_value = "60")]
        target: u32,

        /// RNG seed for challenge suggestions
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Active participants at which the final is suggested
        #[arg(long, default_value = "3")]
        final_threshold: usize,

        /// Seconds to wait for the narrator or the room automation
        #[arg(long, default_value = "30")]
        timeout: u64,

        /// Program that reads a prompt on stdin and prints the finale speech
        #[arg(long)]
        narrator: Option<String>,

        /// Program that types stdin lines into the game room
        #[arg(long)]
        automation: Option<String>,

        /// Archive directory
        #[arg(short, long, default_value = ".paredao")]
        archive: PathBuf,
    },

    /// List the challenge catalog
    Catalog {
        /// Only show challenges that fit this many players
        #[arg(short, long)]
        players: Option<u32>,
    },

    /// Suggest challenges for the next round
    Suggest {
        /// Participants still in the game
        #[arg(short, long)]
        players: u32,

        /// Minutes already played
        #[arg(short, long, default_value = "0")]
        elapsed: f64,

        /// Planned season length in minutes
        #[arg(short, long, default_value = "60")]
        target: u32,

        /// Challenges already played this season
        #[arg(short, long)]
        used: Vec<String>,

        /// RNG seed for the jitter
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },

    /// List archived seasons
    Seasons {
        /// Archive directory
        #[arg(short, long, default_value = ".paredao")]
        archive: PathBuf,
    },

    /// Show participant statistics of an archived season
    Stats {
        /// Season ID (default: the most recent)
        season: Option<i64>,

        /// Archive directory
        #[arg(short, long, default_value = ".paredao")]
        archive: PathBuf,
    },

    /// Export every archived season as JSON
    Export {
        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Archive directory
        #[arg(short, long, default_value = ".paredao")]
        archive: PathBuf,
    },

    /// List the known participant names
    Known {
        /// Archive directory
        #[arg(short, long, default_value = ".paredao")]
        archive: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Play {
            target,
            seed,
            final_threshold,
            timeout,
            narrator,
            automation,
            archive,
        } => commands::play::run(commands::play::PlayOptions {
            target,
            seed,
            final_threshold,
            timeout,
            narrator,
            automation,
            archive,
        }),
        Commands::Catalog { players } => commands::catalog::run(players),
        Commands::Suggest {
            players,
            elapsed,
            target,
            used,
            seed,
        } => commands::suggest::run(players, elapsed, target, &used, seed),
        Commands::Seasons { archive } => commands::archive::seasons(&archive),
        Commands::Stats { season, archive } => commands::archive::stats(&archive, season),
        Commands::Export { output, archive } => {
            commands::archive::export(&archive, output.as_deref())
        }
        Commands::Known { archive } => commands::archive::known(&archive),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
