use std::path::PathBuf;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::error;
use tracing_subscriber::EnvFilter;

use reportgen::Config;

#[derive(Parser)]
#[command(name = "reportgen", version)]
#[command(about = "Convert report markup to a LaTeX document")]
struct Cli {
    /// Input markup file
    input: PathBuf,

    /// Output LaTeX file
    output: PathBuf,

    /// TOML file overriding the bundled configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log progress at info level
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            std::process::exit(code);
        }
    };

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{e}");
                std::process::exit(2);
            }
        },
        None => Config::compiled_default(),
    };

    if let Err(e) = reportgen::convert_file(&cli.input, &cli.output, &config) {
        error!(input = %cli.input.display(), "Error while parsing input: {e}");
        std::process::exit(2);
    }
}
