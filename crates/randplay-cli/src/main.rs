mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::rc::Rc;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use progress::CliReporter;
use randplay_core::launcher::ProcessLauncher;
use randplay_core::storage::{Database, SqliteGrantStore, SqlitePreferenceStore};
use randplay_core::{AppConfig, Session};
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match randplay_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Grant { path }) => {
            if let Err(err) = run_grant(&config, &path) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::Revoke { path }) => {
            if let Err(err) = run_revoke(&config, &path) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::Dirs) => {
            if let Err(err) = run_dirs(&config) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::AddExt { name }) => {
            if let Err(err) = run_add_ext(&config, &name) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::RemoveExt { name }) => {
            if let Err(err) = run_remove_ext(&config, &name) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::ListExt) => {
            if let Err(err) = run_list_ext(&config) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::Index) => {
            if let Err(err) = run_index(&config) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::Play { handler, delete }) => {
            if let Err(err) = run_play(&config, handler, delete) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn open_session(config: &AppConfig) -> Result<Session, randplay_core::Error> {
    let db = Rc::new(Database::open(&config.db_path)?);
    let grants = Box::new(SqliteGrantStore::new(Rc::clone(&db)));
    let prefs = Box::new(SqlitePreferenceStore::new(db));
    Ok(Session::new(grants, prefs, Arc::new(CliReporter::new())))
}

fn run_grant(config: &AppConfig, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(config)?;
    session.load()?;
    if session.grant_directory(path)? {
        println!("{} {}", "Granted".green(), path.display());
    } else {
        println!("'{}' is already granted", path.display());
    }
    Ok(())
}

fn run_revoke(config: &AppConfig, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(config)?;
    session.load()?;
    if session.revoke_directory(path)? {
        println!("{} {}", "Revoked".yellow(), path.display());
    } else {
        println!("'{}' was not granted", path.display());
    }
    Ok(())
}

fn run_dirs(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(&config.db_path)?;
    let grants = db.list_grants()?;
    if grants.is_empty() {
        println!("No directories granted");
        return Ok(());
    }
    for grant in &grants {
        match randplay_core::grants::resolve(grant) {
            Ok(_) => println!("{}  {}", "live ".green(), grant.path),
            Err(err) => println!("{}  {} ({})", "stale".red(), grant.path, err),
        }
    }
    Ok(())
}

fn run_add_ext(config: &AppConfig, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(config)?;
    session.load()?;
    if session.add_extension(name)? {
        println!("{} extension '{}'", "Added".green(), name.trim());
    } else {
        println!("Extension '{}' is already in the set (or empty)", name.trim());
    }
    Ok(())
}

fn run_remove_ext(config: &AppConfig, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(config)?;
    session.load()?;
    if session.remove_extension(name)? {
        println!("{} extension '{}'", "Removed".yellow(), name.trim());
    } else {
        println!("Extension '{}' was not in the set", name.trim());
    }
    Ok(())
}

fn run_list_ext(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(config)?;
    session.load()?;
    if session.extensions().is_empty() {
        println!(
            "No extensions configured (defaults {:?} apply on first index)",
            config.default_extensions
        );
        return Ok(());
    }
    for name in session.extensions().names() {
        println!("{}", name);
    }
    Ok(())
}

fn run_index(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(config)?;
    session.load()?;
    session.bootstrap_extensions(&config.default_extensions)?;
    let count = session.reindex()?;

    println!();
    info!(
        "{} files indexed across {} directories",
        count.to_string().green(),
        session.working_set().len().to_string().cyan(),
    );
    Ok(())
}

fn run_play(
    config: &AppConfig,
    handler: Option<PathBuf>,
    delete: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let handler = handler
        .or_else(|| config.handler_program.clone().map(PathBuf::from))
        .ok_or("no handler program; pass --handler or set handler_program in Config.toml")?;

    let mut session = open_session(config)?;
    session.load()?;
    session.bootstrap_extensions(&config.default_extensions)?;
    let count = session.reindex()?;
    if count == 0 {
        println!(
            "{}",
            "No files matched the current extension filters".yellow()
        );
        return Ok(());
    }

    let file = session.select_and_execute(&handler, &ProcessLauncher)?;
    println!("{} {}", "Playing".green(), file.path.display());

    if delete {
        let pending = session.request_delete()?;
        if prompt_confirm(&format!("Delete '{}'?", pending.display()), Some(false))? {
            let outcome = session.confirm_delete()?;
            if outcome.succeeded() {
                println!("{}", outcome.message().green());
            } else {
                println!("{}", outcome.message().red());
            }
        } else {
            session.cancel_delete();
            println!("Kept '{}'", pending.display());
        }
    }

    Ok(())
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
