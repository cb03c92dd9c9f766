use bazaar::tabs::{Tab, TabOrder};
use bazaar_app::{context::AppContext, errors::DomainError};
use clap::{Args, Subcommand};

use super::render;

#[derive(Debug, Args)]
pub(crate) struct TabsCommand {
    #[command(subcommand)]
    command: TabsSubcommand,
}

#[derive(Debug, Subcommand)]
enum TabsSubcommand {
    /// Print the current tab order.
    Show,

    /// Move a tab to a new position.
    Move(MoveTabArgs),
}

#[derive(Debug, Args)]
struct MoveTabArgs {
    /// Tab to move (listings, basket, messenger, orders, profile)
    #[arg(long)]
    tab: Tab,

    /// Zero-based target position
    #[arg(long)]
    position: usize,
}

pub(crate) async fn run(context: &AppContext, command: TabsCommand) -> Result<(), String> {
    let order = match command.command {
        TabsSubcommand::Show => context.tab_order.load().await,
        TabsSubcommand::Move(args) => context.tab_order.move_tab(args.tab, args.position).await,
    }
    .map_err(|error| {
        let error = DomainError::from(error);
        format!("tab order: {error} ({})", error.code)
    })?;

    println!("{}", tab_table(&order));

    Ok(())
}

fn tab_table(order: &TabOrder) -> String {
    let rows = order
        .tabs()
        .iter()
        .enumerate()
        .map(|(position, tab)| [position.to_string(), tab.to_string()]);

    render::table(["Position", "Tab"], rows, 0..1)
}
