use super::ui;
use crate::core::catalog::{Catalog, Collection, Nft};
use anyhow::Result;
use comfy_table::Cell;

fn collection_name<'a>(catalog: &'a Catalog, nft: &'a Nft) -> &'a str {
    nft.collection
        .as_deref()
        .map(|id| catalog.collection(id).map_or(id, |c| c.name.as_str()))
        .unwrap_or("-")
}

pub fn nfts_table(catalog: &Catalog, nfts: &[&Nft], currency: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Name"),
        ui::header_cell("Collection"),
        ui::header_cell("Creator"),
        ui::header_cell("Rarity"),
        ui::header_cell(&format!("Price ({currency})")),
    ]);

    for nft in nfts {
        table.add_row(vec![
            Cell::new(&nft.id),
            Cell::new(&nft.name),
            Cell::new(collection_name(catalog, nft)),
            Cell::new(&nft.creator),
            Cell::new(nft.rarity().unwrap_or("-")),
            ui::number_cell(format!("{:.2}", nft.price)),
        ]);
    }
    table.to_string()
}

pub fn collections_table(collections: &[Collection], currency: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Collection"),
        ui::header_cell("Creator"),
        ui::header_cell(&format!("Floor ({currency})")),
        ui::header_cell(&format!("Volume ({currency})")),
        ui::header_cell("Items"),
        ui::header_cell("Holders"),
    ]);

    for collection in collections {
        table.add_row(vec![
            Cell::new(&collection.id),
            Cell::new(&collection.name),
            Cell::new(&collection.creator),
            ui::number_cell(format!("{:.2}", collection.floor_price)),
            ui::number_cell(format!("{:.0}", collection.volume_traded)),
            ui::number_cell(collection.items.to_string()),
            ui::number_cell(collection.holders.to_string()),
        ]);
    }
    table.to_string()
}

/// Prints the collections and the NFTs matching the search filters.
pub fn run(
    catalog: &Catalog,
    query: Option<&str>,
    collection: Option<&str>,
    currency: &str,
) -> Result<()> {
    if let Some(id) = collection.filter(|c| !c.eq_ignore_ascii_case("all")) {
        if catalog.collection(id).is_none() {
            anyhow::bail!("Unknown collection '{id}'");
        }
    }

    if !catalog.collections.is_empty() {
        println!("{}\n", ui::style_text("Collections", ui::StyleType::Title));
        println!("{}", collections_table(&catalog.collections, currency));
        ui::print_separator();
    }

    let matches = catalog.search(query, collection);
    println!("{}\n", ui::style_text("NFTs", ui::StyleType::Title));
    if matches.is_empty() {
        println!(
            "{}",
            ui::style_text("No NFTs match the given filters.", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    println!("{}", nfts_table(catalog, &matches, currency));
    println!(
        "\n{} {}",
        ui::style_text("Listed:", ui::StyleType::TotalLabel),
        ui::style_text(
            &format!("{} of {}", matches.len(), catalog.nfts.len()),
            ui::StyleType::TotalValue
        )
    );
    Ok(())
}
