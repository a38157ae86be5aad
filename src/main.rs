//! nscout - PyPI package name availability checker.
//!
//! CLI entry point.

use clap::Parser;
use nscout::notify::ConsoleOutput;
use nscout::{exit_code, Config, NameChecker};
use std::fs;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// Diagnostic failures (bad input, unreadable file) exit with the same
// code as lookup errors, never with the "taken" code.
const EXIT_ERROR: u8 = 4;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Set up logging
    let filter = if config.verbose {
        EnvFilter::new("nscout=debug,info")
    } else {
        EnvFilter::new("nscout=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let names = match config.load_names() {
        Ok(names) => names,
        Err(e) => {
            error!("Failed to load names: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if names.is_empty() {
        error!("No package names given. Pass names or -f <file>.");
        return ExitCode::from(EXIT_ERROR);
    }

    let checker = match NameChecker::new(&config) {
        Ok(checker) => checker,
        Err(e) => {
            error!("Failed to create checker: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let results = checker.check_all(&names).await;

    if config.json {
        let json = match serde_json::to_string_pretty(&results) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize results: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        };
        if let Some(ref output_path) = config.output {
            if let Err(e) = fs::write(output_path, &json) {
                error!("Failed to write output file: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        } else {
            println!("{}", json);
        }
    } else {
        ConsoleOutput::new(config.verbose, false).print_results(&results);

        if let Some(ref output_path) = config.output {
            // Write JSON to file even in human mode
            let json = match serde_json::to_string_pretty(&results) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize results: {}", e);
                    return ExitCode::from(EXIT_ERROR);
                }
            };
            if let Err(e) = fs::write(output_path, &json) {
                error!("Failed to write output file: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
            info!("Results written to: {:?}", output_path);
        }
    }

    ExitCode::from(exit_code(&results))
}
