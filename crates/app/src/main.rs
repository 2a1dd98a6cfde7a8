//! Garage Console - Command line entry point
//!
//! Wires the authenticated client from the environment, runs one command
//! and prints the JSON result.

mod cli;

use std::sync::Arc;

use clap::Parser;
use garage_application::{KeyValueStorage, Route};
use garage_domain::{ApiRequest, Credentials, StatusEvent, StatusKind};
use garage_infrastructure::{
    ClientBuilder, Connection, FileStorage, GarageClient, MemoryStorage, load_client_config,
};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

use crate::cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_client_config()?;
    let storage = open_storage(&args);

    let Connection { client, mut routes } = ClientBuilder::new(config).storage(storage).build()?;

    for kind in [StatusKind::Unauthorized, StatusKind::Forbidden] {
        let _subscription = client.events().subscribe(kind, |event: &StatusEvent| {
            eprintln!("{} ({}): {}", event.kind, event.status, event.message);
        });
    }
    let redirects = tokio::spawn(async move {
        while let Some(route) = routes.recv().await {
            if route == Route::Login {
                eprintln!("Run `garage-console login` to sign in again.");
            }
        }
    });

    let output = run(&client, args.command).await;
    drop(client);
    let _ = redirects.await;

    if let Some(value) = output? {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}

fn open_storage(args: &Args) -> Arc<dyn KeyValueStorage> {
    if args.ephemeral {
        return Arc::new(MemoryStorage::new());
    }
    match args.session_file.clone().or_else(FileStorage::default_path) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "using session file");
            Arc::new(FileStorage::new(path))
        }
        None => {
            tracing::warn!("no config directory available, session will not be kept");
            Arc::new(MemoryStorage::new())
        }
    }
}

async fn run(
    client: &GarageClient,
    command: Command,
) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let value: Option<Value> = match command {
        Command::Login { email, password } => {
            let session = client.login(&Credentials::new(email, password)).await?;
            Some(json!({
                "userId": session.user_id,
                "role": session.role,
                "organization": session.organization,
            }))
        }
        Command::Logout => {
            client.logout();
            None
        }
        Command::Whoami => client.store().get().map(|session| {
            json!({
                "authenticated": session.access_token().is_some(),
                "userId": session.user_id,
                "role": session.role,
                "organization": session.organization,
            })
        }),
        Command::Get { path, query } => {
            let request = query
                .into_iter()
                .fold(ApiRequest::get(path), |request, (name, value)| {
                    request.with_query(name, value)
                });
            Some(client.send(request).await?.json()?)
        }
        Command::Post { path, data } => {
            let body: Value = serde_json::from_str(&data)?;
            Some(client.post(&path, &body).await?)
        }
        Command::Delete { path } => {
            client.delete(&path).await?;
            None
        }
    };
    Ok(value)
}
