use bazaar::listing::{ListingQuery, SortOrder};
use bazaar_app::{config::ClientConfig, context::AppContext, session::Session};
use clap::{Args, ValueEnum};

use super::render;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortArg {
    Relevance,
    PriceAsc,
    PriceDesc,
    Newest,
}

impl From<SortArg> for SortOrder {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Relevance => SortOrder::Relevance,
            SortArg::PriceAsc => SortOrder::PriceAscending,
            SortArg::PriceDesc => SortOrder::PriceDescending,
            SortArg::Newest => SortOrder::Newest,
        }
    }
}

#[derive(Debug, Args)]
pub(crate) struct ListingsArgs {
    /// Free text search
    text: Option<String>,

    /// Category slug
    #[arg(long)]
    category: Option<String>,

    /// Sort order
    #[arg(long, value_enum, default_value_t = SortArg::Relevance)]
    sort: SortArg,

    /// Number of pages to load
    #[arg(long, default_value_t = 1)]
    pages: u32,
}

pub(crate) async fn run(
    context: &AppContext,
    config: &ClientConfig,
    args: ListingsArgs,
) -> Result<(), String> {
    // Search is public, so a missing login is fine.
    let session = config.api.session().unwrap_or_else(|_| Session::anonymous());

    let query = ListingQuery {
        text: args.text,
        category: args.category,
        sort: args.sort.into(),
        ..ListingQuery::default()
    };

    let store = context.listings_store();

    store
        .set_query(&session, query)
        .await
        .map_err(|error| format!("search failed: {error} ({})", error.code))?;

    for _ in 1..args.pages {
        store
            .load_next(&session)
            .await
            .map_err(|error| format!("search failed: {error} ({})", error.code))?;
    }

    let state = store.state();

    let rows = state.page.items().iter().map(|item| {
        [
            item.offer_id.to_string(),
            item.seller_id.to_string(),
            item.title.clone(),
            item.price.to_string(),
            if item.safe_deal_eligible { "yes" } else { "no" }.to_string(),
        ]
    });

    println!(
        "{}",
        render::table(["Offer", "Seller", "Title", "Price", "Safe deal"], rows, 3..4)
    );

    if !state.page.is_exhausted() {
        println!("more results available; pass --pages to load them");
    }

    Ok(())
}
