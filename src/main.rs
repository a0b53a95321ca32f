use colored::*;
use env_logger::{Builder, Env, Target};
use is_terminal::IsTerminal;
use log::{info, warn};
use repo_inspector::app::InspectorApp;
use repo_inspector::cli::Cli;
use repo_inspector::config::Config;
use repo_inspector::error::{InspectorError, Result};
use repo_inspector::Parser;
use std::fs;
use std::sync::atomic::Ordering;
use std::time::Instant;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", format!("Error: {e}").red());
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli)?;
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let start_time = Instant::now();
    let config = Config::load(cli.config.as_deref())?;
    let app = InspectorApp::new(config);

    let cancel = app.cancel_flag();
    if let Err(e) = ctrlc::set_handler(move || cancel.store(true, Ordering::Relaxed)) {
        warn!("Could not install Ctrl-C handler: {e}");
    }

    app.run(&cli)?;
    info!(
        "Finished. Total elapsed time: {:.2?}",
        start_time.elapsed()
    );
    Ok(())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let default_level = if cli.verbose { "info" } else { "warn" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));

    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(
            buf,
            "{} [{}] [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    });

    if let Some(log_path) = &cli.log {
        if let Some(parent_dir) = log_path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                fs::create_dir_all(parent_dir)?;
            }
        }
        let log_file = fs::File::create(log_path)?;
        builder.target(Target::Pipe(Box::new(log_file)));
    } else {
        builder.target(Target::Stderr);
    }

    builder
        .try_init()
        .map_err(|e| InspectorError::Other(e.to_string()))?;
    Ok(())
}
