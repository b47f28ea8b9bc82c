//! CLI for xentropy: random numbers from the last minute of public posts.

mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xentropy")]
#[command(about = "xentropy: random numbers from the timestamps of recent public posts")]
#[command(version = xentropy_core::VERSION)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides applied on top of the XAI_API_KEY / XENTROPY_* environment.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Append the log stream to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Search API key (default: $XAI_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Search endpoint URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Delay between search requests in milliseconds
    #[arg(long, global = true)]
    rate_limit_ms: Option<u64>,

    /// Give up collecting after this many seconds (0 = never)
    #[arg(long, global = true)]
    deadline_secs: Option<u64>,

    /// Give up collecting after this many requests
    #[arg(long, global = true)]
    max_attempts: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw random integers in MIN..=MAX (inclusive)
    Generate {
        /// Lower bound (inclusive)
        #[arg(allow_negative_numbers = true)]
        min: i64,

        /// Upper bound (inclusive)
        #[arg(allow_negative_numbers = true)]
        max: i64,

        /// Number of independent draws; each one collects its own entropy
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
        count: u64,

        /// Print JSON objects with collection details instead of bare numbers
        #[arg(long)]
        json: bool,
    },

    /// Start an HTTP server exposing /api/v1/random?min=&max=
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8043")]
        port: u16,

        /// Bind address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Show the effective configuration (API key redacted)
    Config,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = xentropy_core::logging::init(cli.global.log_file.as_deref()) {
        eprintln!("Error: cannot open log stream: {e}");
        std::process::exit(1);
    }

    match cli.command {
        Commands::Generate {
            min,
            max,
            count,
            json,
        } => commands::generate::run(&cli.global, min, max, count, json),
        Commands::Serve { port, host } => commands::server::run(&cli.global, &host, port),
        Commands::Config => commands::config::run(&cli.global),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("xentropy").chain(args.iter().copied()))
    }

    #[test]
    fn generate_accepts_negative_bounds() {
        let cli = parse(&["generate", "-10", "-1", "--count", "3"]).unwrap();
        match cli.command {
            Commands::Generate { min, max, count, .. } => {
                assert_eq!((min, max, count), (-10, -1, 3));
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn zero_count_is_rejected() {
        assert!(parse(&["generate", "1", "6", "--count", "0"]).is_err());
        assert!(parse(&["generate", "1", "6", "--count", "1"]).is_ok());
    }
}
