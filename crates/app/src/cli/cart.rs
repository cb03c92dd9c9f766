use bazaar::sellers::SellerId;
use bazaar_app::{config::ClientConfig, context::AppContext, store::CartState};
use clap::Args;

use super::render;

#[derive(Debug, Args)]
pub(crate) struct CartArgs {
    /// Select every safe-deal line of this seller and print the total
    #[arg(long)]
    select_seller: Option<i64>,

    /// Order the selected lines
    #[arg(long, requires = "select_seller")]
    checkout: bool,
}

pub(crate) async fn run(
    context: &AppContext,
    config: &ClientConfig,
    args: CartArgs,
) -> Result<(), String> {
    let session = config.api.session().map_err(|error| error.to_string())?;
    let store = context.cart_store();

    store
        .refresh(&session)
        .await
        .map_err(|error| format!("failed to load cart: {error} ({})", error.code))?;

    let state = store.state();

    if state.cart.is_empty() {
        println!("cart is empty");
        return Ok(());
    }

    println!("{}", cart_table(&state));

    let Some(seller) = args.select_seller.map(SellerId::new) else {
        return Ok(());
    };

    let selected = store.select_all_for_seller(seller).await;
    let state = store.state();

    println!(
        "selected {selected} line(s) from seller {seller}, total {}",
        state
            .total
            .map_or_else(|| "unavailable".to_string(), |total| total.to_string())
    );

    if args.checkout {
        let order_id = store
            .checkout(&session)
            .await
            .map_err(|error| format!("checkout failed: {error} ({})", error.code))?;

        println!("order_id: {order_id}");
    }

    Ok(())
}

fn cart_table(state: &CartState) -> String {
    let rows = state.groups.iter().flat_map(|group| {
        group.lines.iter().map(|line| {
            [
                group.seller.name.clone(),
                line.offer_id.to_string(),
                line.title.clone(),
                line.selected_quantity.to_string(),
                line.available_quantity.to_string(),
                line.price_per_item.to_string(),
                if line.safe_deal_eligible { "yes" } else { "no" }.to_string(),
            ]
        })
    });

    render::table(
        [
            "Seller",
            "Offer",
            "Title",
            "Qty",
            "Available",
            "Price",
            "Safe deal",
        ],
        rows,
        3..6,
    )
}
