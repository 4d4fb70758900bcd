//! Referly CLI
//!
//! Run the serverless functions locally against the configured AI gateway
//! and drive motion presets headlessly.

mod config;
mod simulate;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::ReferlyConfig;
use referly_functions::{Function, FunctionRequest, HttpGateway, Method};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "referly")]
#[command(about = "Referly functions and motion tooling", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to referly.toml (defaults to ./referly.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a function once and print the response
    Invoke {
        /// parse-resume, linkedin-import, or salary-intelligence
        function: String,

        /// JSON body file, or `-` for stdin
        #[arg(short, long)]
        body: Option<String>,

        /// HTTP method to simulate
        #[arg(short, long, default_value = "POST")]
        method: String,
    },

    /// Run a motion preset against a synthetic page, one JSON line per frame written
    Simulate {
        /// Preset name (fade-up, parallax, scale-in, reveal-once, cursor-tilt, progress-bar, float)
        #[arg(short, long)]
        preset: Option<String>,

        /// Number of frames to run
        #[arg(short, long)]
        frames: Option<u32>,

        /// Final scroll position in pixels
        #[arg(short, long)]
        scroll_to: Option<f32>,

        /// Honor prefers-reduced-motion
        #[arg(long)]
        reduced_motion: bool,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = ReferlyConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Invoke {
            function,
            body,
            method,
        } => cmd_invoke(&config, &function, body.as_deref(), &method),
        Commands::Simulate {
            preset,
            frames,
            scroll_to,
            reduced_motion,
        } => {
            let mut options = config.simulate.clone();
            if let Some(preset) = preset {
                options.preset = preset;
            }
            if let Some(frames) = frames {
                options.frames = frames;
            }
            if let Some(scroll_to) = scroll_to {
                options.scroll_to = scroll_to;
            }
            options.reduced_motion |= reduced_motion;
            simulate::run(&options, &mut io::stdout().lock())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            let key = if config.gateway.api_key.is_some() {
                "set"
            } else {
                "not set"
            };
            println!("# api key: {key}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_body(source: Option<&str>) -> Result<String> {
    match source {
        None => Ok("{}".to_string()),
        Some("-") => {
            let mut body = String::new();
            io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read body from stdin")?;
            Ok(body)
        }
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read {path}")),
    }
}

fn cmd_invoke(
    config: &ReferlyConfig,
    function: &str,
    body: Option<&str>,
    method: &str,
) -> Result<ExitCode> {
    let function: Function = function.parse()?;
    let method: Method = method.parse()?;
    let request = FunctionRequest::new(method, read_body(body)?);

    let gateway = HttpGateway::new(config.gateway.clone())?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    tracing::info!(%function, "invoking");
    let response = runtime.block_on(function.dispatch(&request, &gateway));

    eprintln!("HTTP {}", response.status);
    println!("{}", serde_json::to_string_pretty(&response.body)?);

    Ok(if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
