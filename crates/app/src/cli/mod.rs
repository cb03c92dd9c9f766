use bazaar_app::{config::ClientConfig, context::AppContext, observability};
use clap::{Parser, Subcommand};

mod cart;
mod dialogs;
mod listings;
mod render;
mod tabs;

#[derive(Debug, Parser)]
#[command(name = "bazaar-app", about = "Bazaar client CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: ClientConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the cart grouped by seller.
    Cart(cart::CartArgs),

    /// Search public listings.
    Listings(listings::ListingsArgs),

    /// Show messenger dialogs.
    Dialogs(dialogs::DialogsArgs),

    /// Show or change the tab order.
    Tabs(tabs::TabsCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        observability::init(&self.config.logging)
            .map_err(|error| format!("failed to initialise logging: {error}"))?;

        let context = AppContext::from_config(&self.config)
            .await
            .map_err(|error| format!("{error}: {}", source_message(&error)))?;

        match self.command {
            Commands::Cart(args) => cart::run(&context, &self.config, args).await,
            Commands::Listings(args) => listings::run(&context, &self.config, args).await,
            Commands::Dialogs(args) => dialogs::run(&context, &self.config, args).await,
            Commands::Tabs(command) => tabs::run(&context, command).await,
        }
    }
}

fn source_message(error: &dyn std::error::Error) -> String {
    error
        .source()
        .map_or_else(String::new, ToString::to_string)
}
