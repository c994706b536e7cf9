//! meetnotes CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use meetnotes_core::{TracingConfig, init_tracing};

use meetnotes_client::cli::{
    AdminAction, CalendarAction, Cli, Command, ConfigAction, NotesAction, TokenAction,
};
use meetnotes_client::commands::{self, admin, auth, calendar, notes};
use meetnotes_client::{ApiClient, ClientConfig, ClientResult, TokenStore};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };
    if let Some(url) = cli.server_url {
        config = config.with_server_url(url);
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(secs);
    }
    let json = cli.json;

    match cli.command {
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
        Command::Logout => auth::logout(&TokenStore::new(config.token_path())),
        Command::Token { action } => {
            let tokens = TokenStore::new(config.token_path());
            match action {
                TokenAction::Set { token } => auth::set_token(&tokens, &token),
                TokenAction::Show => auth::show_token(&tokens, json),
            }
        }
        command => {
            let api = ApiClient::new(&config)?;
            dispatch(&api, command, json).await
        }
    }
}

async fn dispatch(api: &ApiClient, command: Command, json: bool) -> ClientResult<()> {
    match command {
        Command::Login => auth::login(api, json).await,
        Command::Whoami => auth::whoami(api, json).await,
        Command::Health => auth::health(api, json).await,
        Command::Notes { action } => match action {
            NotesAction::List => notes::list(api, json).await,
            NotesAction::Show { event_id } => notes::show(api, &event_id, json).await,
            NotesAction::History { event_id } => notes::history(api, &event_id, json).await,
            NotesAction::Put { event_id, content } => {
                notes::put(api, &event_id, &content, json).await
            }
        },
        Command::Admin { action } => match action {
            AdminAction::Notes => admin::notes(api, json).await,
            AdminAction::Edit { note_id, content } => admin::edit(api, &note_id, &content).await,
            AdminAction::Users => admin::users(api, json).await,
            AdminAction::SetRole { email, role } => admin::set_role(api, &email, &role).await,
        },
        Command::Calendar { action } => match action {
            CalendarAction::Upcoming { from, to } => calendar::upcoming(api, from, to, json).await,
            CalendarAction::Event { event_id } => calendar::event(api, &event_id, json).await,
            CalendarAction::Watch => calendar::watch(api, json).await,
        },
        Command::Config { .. } | Command::Logout | Command::Token { .. } => Ok(()),
    }
}
