use bazaar_app::{
    config::ClientConfig, context::AppContext, domain::dialogs::models::unread_total,
};
use clap::Args;

use super::render;

#[derive(Debug, Args)]
pub(crate) struct DialogsArgs {
    /// Number of pages to load
    #[arg(long, default_value_t = 1)]
    pages: u32,
}

pub(crate) async fn run(
    context: &AppContext,
    config: &ClientConfig,
    args: DialogsArgs,
) -> Result<(), String> {
    let session = config.api.session().map_err(|error| error.to_string())?;
    let store = context.dialogs_store();

    store
        .reload(&session)
        .await
        .map_err(|error| format!("failed to load dialogs: {error} ({})", error.code))?;

    for _ in 1..args.pages {
        store
            .load_next(&session)
            .await
            .map_err(|error| format!("failed to load dialogs: {error} ({})", error.code))?;
    }

    let state = store.state();
    let dialogs = state.page.items();

    if dialogs.is_empty() {
        println!("no dialogs");
        return Ok(());
    }

    let rows = dialogs.iter().map(|dialog| {
        [
            dialog.id.to_string(),
            dialog.peer_name.clone(),
            dialog.last_message.clone().unwrap_or_default(),
            dialog.unread_count.to_string(),
            dialog.updated_at.to_string(),
        ]
    });

    println!(
        "{}",
        render::table(["Dialog", "Peer", "Last message", "Unread", "Updated"], rows, 3..4)
    );
    println!("unread: {}", unread_total(dialogs));

    Ok(())
}
