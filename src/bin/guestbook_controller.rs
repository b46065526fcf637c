use anyhow::Result;
use clap::Parser;
use guestbook_controller::cli::{Cli, Commands};
use guestbook_controller::crds::Guestbook;
use guestbook_controller::shim_layer::controller_runtime::run_controller;
use kube::{Client, CustomResourceExt};
use tracing::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Export => {
            info!("exporting custom resource definition");
            println!("{}", serde_yaml::to_string(&Guestbook::crd())?);
        }
        Commands::Run(args) => {
            info!("running guestbook-controller");
            let client = Client::try_default().await?;
            run_controller(client, args.settings()).await?;
        }
    }
    Ok(())
}
