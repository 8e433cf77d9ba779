use super::ui;
use crate::core::catalog::Catalog;
use crate::core::fraction::{FractionSession, PricedAsset};
use anyhow::{Context, Result};
use comfy_table::Cell;

/// Builds a pricing session for `nft_id` with the requested fragment count and
/// purchase quantity applied in that order. Out-of-range values are clamped.
pub fn build_session(
    catalog: &Catalog,
    nft_id: &str,
    fragments: Option<i64>,
    quantity: Option<i64>,
) -> Result<FractionSession> {
    let nft = catalog
        .find(nft_id)
        .with_context(|| format!("NFT '{nft_id}' is not in the catalog"))?;
    let asset = PricedAsset::try_from(nft)?;

    let mut session = FractionSession::new();
    session.select_asset(asset);
    if let Some(fragments) = fragments {
        session.set_fragment_count(fragments);
    }
    if let Some(quantity) = quantity {
        session.set_purchase_quantity(quantity);
    }
    Ok(session)
}

pub fn display_session(session: &FractionSession, currency: &str) -> String {
    let pricing = session.pricing();
    let mut output = String::new();

    if let Some(asset) = session.selected_asset() {
        output.push_str(&format!(
            "Asset: {} ({})\n\n",
            ui::style_text(asset.display_name(), ui::StyleType::Title),
            asset.identifier()
        ));
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Item"), ui::header_cell("Value")]);

    let total_price = session.selected_asset().map_or(0.0, PricedAsset::total_price);
    table.add_row(vec![
        Cell::new("Asset price"),
        ui::number_cell(ui::format_amount(total_price, currency)),
    ]);
    table.add_row(vec![
        Cell::new("Fragments"),
        ui::number_cell(pricing.fragment_count.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Price per fragment"),
        ui::number_cell(ui::format_amount(pricing.per_fragment_price, currency)),
    ]);
    table.add_row(vec![
        Cell::new("Fragments to buy"),
        ui::number_cell(pricing.purchase_quantity.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Ownership"),
        ui::number_cell(format!("{:.2}%", pricing.ownership_percentage())),
    ]);
    output.push_str(&table.to_string());

    output.push_str(&format!(
        "\n\n{} {}",
        ui::style_text("Total Price:", ui::StyleType::TotalLabel),
        ui::style_text(
            &ui::format_amount(pricing.total_purchase_price, currency),
            ui::StyleType::TotalValue
        )
    ));
    output
}

pub fn run(
    catalog: &Catalog,
    nft_id: &str,
    fragments: Option<i64>,
    quantity: Option<i64>,
    currency: &str,
) -> Result<()> {
    let session = build_session(catalog, nft_id, fragments, quantity)?;
    println!("{}", display_session(&session, currency));
    Ok(())
}
