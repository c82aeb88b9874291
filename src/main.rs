// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kube::Client;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use workload_binder::config::{Config, DeletionConfig};
use workload_binder::context::{namespace_deleter, AppContext};
use workload_binder::server;

#[derive(Parser)]
#[command(name = "workload-binder", version, about = "Federated workload identity bindings and namespace teardown")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service (default)
    Serve {
        /// Address to listen on, overrides LISTEN_ADDR
        #[arg(long)]
        listen: Option<SocketAddr>,
    },
    /// Delete a namespace, forcing its finalizers off if it gets stuck
    DeleteNamespace {
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve { listen: None }) {
        Command::Serve { listen } => {
            let config = Config::from_env()?;
            let client = kube_client().await?;
            let addr = listen.unwrap_or(config.listen_addr);
            info!("Starting workload-binder, subscription={}", config.subscription_id);
            let ctx = AppContext::from_config(config, client)?;
            server::run(Arc::new(ctx), addr).await
        }
        Command::DeleteNamespace { name } => {
            // Only the deletion timings are needed here, not the Azure settings
            let config = DeletionConfig::from_env()?;
            let client = kube_client().await?;
            let report = namespace_deleter(&config, client)
                .delete_namespace(&name)
                .await
                .with_context(|| format!("Failed to delete namespace {}", name))?;

            println!("{}", serde_json::to_string_pretty(&report.status())?);
            if !report.is_success() {
                error!("Namespace {} could not be removed", name);
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

async fn kube_client() -> Result<Client> {
    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    info!("Connected to Kubernetes cluster");
    Ok(client)
}
