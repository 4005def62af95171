use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use enotes_bootstrap::{bootstrap, BootstrapError, Settings};
use enotes_identity::SecretError;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};
use zeroize::Zeroizing;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Publish the encrypted-notes schemas and definition to Ceramic", long_about = None)]
struct Args {
    /// Optional TOML settings file.
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Base URL of the Ceramic node.
    #[clap(long)]
    ceramic_url: Option<String>,

    /// Where to write the config record.
    #[clap(short, long, value_parser)]
    output: Option<PathBuf>,

    /// Environment variable holding the hex-encoded 32-byte seed.
    #[clap(long)]
    seed_env: Option<String>,

    /// Timeout for each request to the node, in seconds.
    #[clap(long)]
    timeout_secs: Option<u64>,
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings file: {:?}", path))?;
            Settings::from_toml_str(&contents)
                .with_context(|| format!("Failed to parse settings file: {:?}", path))?
        }
        None => Settings::default(),
    };

    if let Some(url) = &args.ceramic_url {
        settings.ceramic_url = url.clone();
    }
    if let Some(output) = &args.output {
        settings.output_path = output.clone();
    }
    if let Some(seed_env) = &args.seed_env {
        settings.seed_env = seed_env.clone();
    }
    if let Some(secs) = args.timeout_secs {
        settings.request_timeout_secs = secs;
    }
    if settings.request_timeout_secs == 0 {
        anyhow::bail!("request timeout must be at least one second");
    }
    Ok(settings)
}

fn init_tracing(settings: &Settings) {
    let log_level_str = settings.log_level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level_str))
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(settings: &Settings) -> Result<(), BootstrapError> {
    let secret = Zeroizing::new(
        std::env::var(&settings.seed_env).map_err(|_| SecretError::Missing(settings.seed_env.clone()))?,
    );

    let record = bootstrap(settings, &secret).await?;
    let pretty = serde_json::to_string_pretty(&record)?;

    println!(
        "{} {}",
        "Config written to".green().bold(),
        settings.output_path.display().to_string().cyan()
    );
    println!("{}", pretty);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let settings = match load_settings(&args) {
        Ok(settings) => settings,
        Err(e) => {
            let err = BootstrapError::Config(format!("{:#}", e));
            eprintln!("{} {}", "Error:".red().bold(), err);
            return ExitCode::from(err.exit_code());
        }
    };
    init_tracing(&settings);

    info!(seed_env = %settings.seed_env, "enotes-bootstrap starting");

    match run(&settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "Error:".red().bold(), err);
            if err.is_transient() {
                eprintln!("{}", "The node may recover; re-running is safe.".yellow());
            }
            ExitCode::from(err.exit_code())
        }
    }
}
