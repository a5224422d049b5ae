mod auth;
mod cli;
mod client;
mod commands;
mod config;
mod console;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;

use cli::{
    AppsCommands, Cli, Commands, SchemaCommands, SubsCommands, TeamsCommands, TokensCommands,
    TopicsCommands,
};
use config::{ConfigStore, Session};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    observability::init_tracing(cli.verbose);

    let store = ConfigStore::from_env()?;
    let session = Session::resolve(&cli, &store)?;
    tracing::debug!(profile = %session.profile, api_url = %session.api_url, "resolved session");

    match &cli.command {
        Commands::Login(args) => {
            commands::auth::login(&store, &session, &args.token).await?;
        }
        Commands::Logout => {
            commands::auth::logout(&store, &session.profile)?;
        }
        Commands::Status => {
            commands::auth::status(&session)?;
        }
        Commands::Config(args) => {
            commands::config::run(&store, &session.profile, &args.command, session.format)?;
        }
        Commands::Teams(command) => {
            let client = session.client()?;
            match command {
                TeamsCommands::List => commands::teams::list(&client, &session).await?,
                TeamsCommands::Set { slug } => {
                    commands::teams::set(&client, &store, &session, slug).await?
                }
            }
        }
        Commands::Apps(command) => {
            let client = session.client()?;
            match command {
                AppsCommands::List => commands::apps::list(&client, &session).await?,
                AppsCommands::Create { slug } => {
                    commands::apps::create(&client, &session, slug).await?
                }
                AppsCommands::Usage { slug } => {
                    commands::apps::usage(&client, &session, slug.as_deref()).await?
                }
            }
        }
        Commands::Topics(command) => {
            let client = session.client()?;
            match command {
                TopicsCommands::List => commands::topics::list(&client, &session).await?,
                TopicsCommands::Create { slug } => {
                    commands::topics::create(&client, &session, slug).await?
                }
            }
        }
        Commands::Subs(command) => {
            let client = session.client()?;
            match command {
                SubsCommands::List { topic } => {
                    commands::subscriptions::list(&client, &session, topic).await?
                }
                SubsCommands::Create(args) => {
                    commands::subscriptions::create(&client, &session, args).await?
                }
                SubsCommands::View { topic, slug } => {
                    commands::subscriptions::view(&client, &session, topic, slug).await?
                }
            }
        }
        Commands::Tokens(command) => {
            let client = session.client()?;
            match command {
                TokensCommands::Create { label } => {
                    commands::tokens::create(&client, &session, label).await?
                }
                TokensCommands::List => commands::tokens::list(&client, &session).await?,
            }
        }
        Commands::Schema(SchemaCommands::Create(args)) => {
            commands::schema::create(args)?;
        }
        Commands::Schema(SchemaCommands::Apply(args)) => {
            let client = session.client()?;
            commands::schema::apply(&client, &session, args).await?;
        }
    }

    Ok(())
}
