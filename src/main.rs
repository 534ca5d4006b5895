use std::path::PathBuf;

use crate::auth::policy::Role;
use crate::config::AppConfig;
use crate::db::connection::{init_db, Database};
use crate::domain::status::CategoryType;
use crate::errors::ServerError;
use crate::logging::init_logging;
use crate::router::{handle, now_unix, App};
use astra::Server;
use clap::Parser;

mod admin;
mod auth;
mod config;
mod db;
mod domain;
mod errors;
mod forms;
mod logging;
mod responses;
mod router;
mod templates;
mod workflow;

#[cfg(test)]
mod tests;

#[derive(Parser)]
#[command(name = "relief_board", about = "Disaster relief coordination board")]
struct Cli {
    /// TOML configuration file. Without it `RELIEF_CONFIG`, then `relief.toml`, is tried.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the web server (the default).
    Serve,
    /// Create an account.
    AddUser {
        username: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "user")]
        role: Role,
    },
    /// Print a fresh session token for an existing account.
    IssueSession { username: String },
    /// Change the role of an existing account.
    SetRole { username: String, role: Role },
    /// Add a need category.
    AddCategory {
        name: String,
        #[arg(long = "type", default_value = "problem")]
        category_type: CategoryType,
        #[arg(long, default_value = "")]
        icon: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => AppConfig::from_toml_file(path),
        None => AppConfig::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration failed: {e}");
            std::process::exit(1);
        }
    };

    let format = match config.log_format() {
        Ok(format) => format,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    init_logging(format, &config.log_level);

    let db = Database::new(config.database_path.clone()).with_busy_timeout(config.busy_timeout());

    if let Err(e) = init_db(&db, &config.schema_path) {
        tracing::error!(error = %e, "database initialization failed");
        std::process::exit(1);
    }

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            serve(db, &config);
            Ok(())
        }
        command => run_admin(&db, command),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        std::process::exit(1);
    }
}

fn serve(db: Database, config: &AppConfig) {
    let app = App::new(db, config);
    tracing::info!(addr = %config.bind_addr, workers = config.max_workers, "starting server");

    let server = Server::bind(&config.bind_addr).max_workers(config.max_workers);

    let result = server.serve(move |req, _info| match handle(req, &app) {
        Ok(resp) => resp,
        Err(err) => responses::error_response(err),
    });

    if let Err(e) = result {
        tracing::error!(error = %e, "server ended with error");
    }

    tracing::info!("server shut down");
}

fn run_admin(db: &Database, command: Command) -> Result<(), ServerError> {
    let now = now_unix();
    db.with_conn(|conn| match command {
        Command::Serve => Ok(()),
        Command::AddUser { username, email, role } => {
            let id = admin::add_user(conn, &username, &email, role, now)?;
            println!("created {role} '{username}' (#{id})");
            Ok(())
        }
        Command::IssueSession { username } => {
            let token = admin::issue_session(conn, &username, now)?;
            println!("{token}");
            Ok(())
        }
        Command::SetRole { username, role } => {
            admin::change_role(conn, &username, role)?;
            println!("'{username}' is now {role}");
            Ok(())
        }
        Command::AddCategory { name, category_type, icon } => {
            let id = admin::add_category(conn, &name, category_type, &icon)?;
            println!("created {category_type} category '{name}' (#{id})");
            Ok(())
        }
    })
}
