//! CodeSensei - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use codesensei::{
    cli::{Args, Commands, Verbosity},
    config::Config,
    repl::{display, ReplSession},
    storage::FileStore,
    Sensei,
};
use colored::Colorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_logging(verbosity: Verbosity) {
    // RUST_LOG wins over the command-line level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("codesensei={}", verbosity.log_filter())));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(dir) = &args.data_dir {
        config.storage.dir = Some(dir.clone());
    }
    Ok(config)
}

fn open_session(args: &Args, config: &Config) -> Result<Sensei<FileStore>> {
    let dir = config.storage_dir()?;
    let store = FileStore::new(&dir)
        .with_context(|| format!("Failed to open state directory {}", dir.display()))?;
    debug!("Using state directory {}", dir.display());

    Sensei::from_config(config, store, &args.user).context("Failed to start session")
}

fn run_repl(args: &Args, config: &Config) -> Result<()> {
    let sensei = open_session(args, config)?;
    let history_path = config.storage_dir()?.join("repl_history");

    let mut repl_session = ReplSession::with_history(sensei, history_path)?;
    repl_session.run(VERSION)
}

fn ask(args: &Args, config: &Config, question: &str) -> Result<()> {
    let mut sensei = open_session(args, config)?;
    let outcome = sensei.handle_query(question);
    display::show_outcome(&outcome);
    Ok(())
}

fn show_config(args: &Args, config: &Config) -> Result<()> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };

    println!("\n{}", "CodeSensei Configuration".bold().cyan());
    println!("{}", "=".repeat(60).cyan());
    println!("File:        {}", path.display());
    println!("State dir:   {}", config.storage_dir()?.display());
    println!("User:        {}", args.user);
    println!("Verbosity:   {}", args.verbosity().as_str());
    println!();
    print!("{}", toml::to_string_pretty(config).context("Failed to serialize config")?);
    println!();

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbosity());

    if let Err(message) = args.validate() {
        if args.verbosity().show_hints() {
            println!("CodeSensei v{} - Programming Tutor", VERSION);
            println!("\nUsage:");
            println!("  codesensei <question>         Answer a question");
            println!("  codesensei start              Interactive REPL mode");
            println!("  codesensei progress           Show learning progress");
            println!("  codesensei recommend          Suggest topics to study next");
            println!("  codesensei insights           Show learning insights");
            println!("  codesensei history            Show recent questions");
            println!("  codesensei reset              Forget progress");
            println!("  codesensei config             Show configuration");
            println!("\nExample:");
            println!("  codesensei \"What is a for loop?\"");
            println!();
        }
        anyhow::bail!(message);
    }

    let config = load_config(&args)?;
    debug!("CodeSensei v{} starting", VERSION);

    match &args.command {
        Some(Commands::Start) => run_repl(&args, &config)?,
        Some(Commands::Progress) => {
            let sensei = open_session(&args, &config)?;
            display::show_progress(sensei.progress(), sensei.knowledge());
        }
        Some(Commands::Recommend { top }) => {
            let mut sensei = open_session(&args, &config)?;
            display::show_recommendations(&sensei.recommendations(*top));
        }
        Some(Commands::Insights) => {
            let mut sensei = open_session(&args, &config)?;
            display::show_insights(&sensei.insights());
        }
        Some(Commands::History { limit, clear }) => {
            let mut sensei = open_session(&args, &config)?;
            if *clear {
                sensei.clear_history()?;
                println!("{}", "Question history cleared.".yellow());
            } else {
                display::show_history(&sensei.history(*limit));
            }
        }
        Some(Commands::Reset) => {
            let mut sensei = open_session(&args, &config)?;
            sensei.reset()?;
            println!("{}", "Progress and learned preferences reset.".yellow());
        }
        Some(Commands::Config) => show_config(&args, &config)?,
        None => {
            if let Some(question) = &args.question {
                ask(&args, &config, question)?;
            }
        }
    }

    Ok(())
}
