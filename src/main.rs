//! Photo Day-Stamp - Batch timestamp watermarking for photo folders
//!
//! Stamps each photo with its file timestamp and its day offset from a
//! target date, writing PNG copies to an output directory.

use anyhow::Result;
use clap::Parser;
use photo_daystamp::{Cli, Config, Error, Processor, ProcessingStatus, RunOutcome, bootstrap};
use std::path::{Path, PathBuf};
use tracing::{Level, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// CLI Output Module
mod cli_output {
    //! Colored summary output for the terminal.

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use std::io::stdout;

    /// CLI theme colors
    pub struct CliTheme;

    impl CliTheme {
        pub const SUCCESS: Color = Color::Green;
        pub const WARNING: Color = Color::Yellow;
        pub const ERROR: Color = Color::Red;
        pub const HINT: Color = Color::DarkGrey;
    }

    pub fn print_separator() {
        let _ = stdout().execute(Print(format!("{}\n", "─".repeat(60))));
    }

    pub fn print_warning(msg: &str) {
        let _ = stdout().execute(Print(style("⚠ ").with(CliTheme::WARNING).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_stat(key: &str, value: &str, color: Color) {
        let key_styled = style(key).with(CliTheme::HINT);
        let value_styled = style(value).with(color).bold();
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(key_styled));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(value_styled));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_result(status_icon: &str, status_color: Color, source: &str, dest_or_msg: &str) {
        let icon_styled = style(status_icon).with(status_color).bold();
        let msg_styled = style(dest_or_msg).with(CliTheme::HINT);

        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(icon_styled));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(style(source).italic()));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(msg_styled));
        let _ = stdout().execute(Print("\n"));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", Config::sample_config());
        return Ok(());
    }

    // Config first: `verbose` from the file also raises the log level
    let (config, config_file) = load_config(&cli)?;
    let _guard = setup_logging(&cli, log_level(&config))?;

    info!(version = env!("CARGO_PKG_VERSION"), "Photo Day-Stamp starting");
    if let Some(path) = &config_file {
        info!(config_file = %path.display(), "Loaded configuration from file");
    }
    if config.verbose {
        info!(?config, "Configuration loaded");
    }

    // Run-level preconditions: any failure ends the process here
    let (run_config, font) = match bootstrap(&config) {
        Ok(parts) => parts,
        Err(e) => {
            error!(error = %e, "Setup failed");
            return Err(e.into());
        }
    };

    let mut processor = Processor::new(run_config, font);

    match processor.run() {
        Ok(results) => {
            use cli_output::*;

            let stats = processor.stats();

            print_separator();
            match stats.outcome() {
                RunOutcome::NoImages => {
                    print_warning(&format!(
                        "No supported images ({}) found in {}",
                        config.image_extensions.join(", "),
                        config.input_dir.display()
                    ));
                }
                RunOutcome::Completed | RunOutcome::CompletedWithFailures => {
                    print_stat("Processed", &stats.processed.to_string(), CliTheme::SUCCESS);
                    print_stat("Failed", &stats.failed.to_string(), CliTheme::ERROR);
                    print_stat("Skipped", &stats.skipped.to_string(), CliTheme::WARNING);
                }
            }

            if config.verbose {
                print_separator();
                for result in &results {
                    let source = result.source.display().to_string();
                    match result.status {
                        ProcessingStatus::Success => {
                            let dest = result
                                .destination
                                .as_ref()
                                .map(|p| p.display().to_string())
                                .unwrap_or_default();
                            print_result("✓", CliTheme::SUCCESS, &source, &format!("→ {}", dest));
                        }
                        ProcessingStatus::Failed => {
                            let msg = result.error.as_deref().unwrap_or("unknown error");
                            print_result("✗", CliTheme::ERROR, &source, msg);
                        }
                    }
                }
            }

            if stats.outcome() == RunOutcome::CompletedWithFailures {
                print_separator();
                print_error(&format!("{} file(s) could not be processed", stats.failed));
            }

            info!(
                processed = stats.processed,
                failed = stats.failed,
                "Processing complete"
            );

            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Processing failed");
            Err(e.into())
        }
    }
}

/// Resolve config path - `-C mysettings` also finds `mysettings.toml`
fn resolve_config_path(config_path: &Path) -> PathBuf {
    if config_path.exists() || config_path.extension().is_some() {
        return config_path.to_path_buf();
    }

    let with_extension = config_path.with_extension("toml");
    if with_extension.exists() {
        return with_extension;
    }

    config_path.to_path_buf()
}

/// Load configuration from file or CLI arguments
///
/// Also returns the config file actually read, if any.
fn load_config(cli: &Cli) -> Result<(Config, Option<PathBuf>)> {
    let Some(ref config_path) = cli.config else {
        return Ok((cli.to_config(), None));
    };

    let resolved_path = resolve_config_path(config_path);
    let file_config = Config::load_from_file(&resolved_path).map_err(Error::from)?;
    Ok((cli.merge_with_config(file_config), Some(resolved_path)))
}

/// Default log level once CLI flags and the config file are merged
fn log_level(config: &Config) -> Level {
    if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Setup logging: console always, plus a log file when requested
fn setup_logging(cli: &Cli, level: Level) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    let Some(log_path) = cli.log_file.as_deref() else {
        subscriber.init();
        return Ok(None);
    };

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    if cli.json_log {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .init();
    }

    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_config_file_enables_debug_logs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stamp.toml");
        std::fs::write(&path, "verbose = true\n").unwrap();

        // `-C stamp` finds `stamp.toml`
        let cli = Cli::parse_from(["photo-daystamp", "-C", dir.path().join("stamp").to_str().unwrap()]);
        let (config, config_file) = load_config(&cli).unwrap();

        assert_eq!(config_file, Some(path));
        assert!(config.verbose);
        assert_eq!(log_level(&config), Level::DEBUG);
    }

    #[test]
    fn test_default_log_level_is_info() {
        let cli = Cli::parse_from(["photo-daystamp"]);
        let (config, config_file) = load_config(&cli).unwrap();

        assert!(config_file.is_none());
        assert_eq!(log_level(&config), Level::INFO);
    }
}
