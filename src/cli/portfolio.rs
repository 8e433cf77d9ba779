use super::ui;
use crate::core::catalog::{Catalog, DEFAULT_RECOMMENDATIONS};
use crate::core::portfolio::{FractionalShare, Portfolio, PortfolioValue};
use anyhow::Result;
use comfy_table::Cell;
use console::style;

impl PortfolioValue<'_> {
    pub fn display_as_table(&self, currency: &str) -> String {
        let mut output = format!(
            "Portfolio: {}\n\n",
            ui::style_text(&self.name, ui::StyleType::Title)
        );

        let mut performance = ui::new_styled_table();
        performance.set_header(vec![
            ui::header_cell("24h"),
            ui::header_cell("7d"),
            ui::header_cell("30d"),
        ]);
        performance.add_row(vec![
            ui::change_cell(self.performance.daily),
            ui::change_cell(self.performance.weekly),
            ui::change_cell(self.performance.monthly),
        ]);
        output.push_str(&performance.to_string());
        output.push_str("\n\n");

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("NFT"),
            ui::header_cell("Collection"),
            ui::header_cell(&format!("Price ({currency})")),
            ui::header_cell("Weight (%)"),
        ]);
        for (nft, weight) in self.weights() {
            table.add_row(vec![
                Cell::new(&nft.name),
                Cell::new(nft.collection.as_deref().unwrap_or("-")),
                ui::number_cell(format!("{:.2}", nft.price)),
                ui::format_optional_cell(weight, |w| format!("{w:.2}%")),
            ]);
        }
        for id in &self.missing {
            table.add_row(vec![
                Cell::new(id),
                ui::error_cell("not in catalog"),
                ui::format_optional_cell(None::<f64>, |p| format!("{p:.2}")),
                ui::format_optional_cell(None::<f64>, |w| format!("{w:.2}%")),
            ]);
        }
        output.push_str(&table.to_string());

        let total_style = if self.missing.is_empty() {
            ui::StyleType::TotalValue
        } else {
            ui::StyleType::Error
        };
        output.push_str(&format!(
            "\n\nTotal Value ({}): {}",
            ui::style_text(currency, ui::StyleType::TotalLabel),
            ui::style_text(&format!("{:.2}", self.total_value), total_style)
        ));
        output
    }
}

pub fn shares_table(shares: &[FractionalShare], catalog: &Catalog, currency: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("NFT"),
        ui::header_cell("Share (%)"),
        ui::header_cell(&format!("Value ({currency})")),
    ]);
    for share in shares {
        let name = catalog
            .find(&share.nft_id)
            .map_or(share.nft_id.as_str(), |nft| nft.name.as_str());
        table.add_row(vec![
            Cell::new(name),
            ui::number_cell(format!("{:.2}", share.percentage)),
            ui::format_optional_cell(share.valuate(catalog), |v| format!("{v:.4}")),
        ]);
    }
    table.to_string()
}

/// Shows the selected portfolios (all of them when `portfolio_id` is `None`),
/// the user's fractional shares and a few NFTs not yet held.
pub fn run(
    portfolios: &[Portfolio],
    shares: &[FractionalShare],
    catalog: &Catalog,
    portfolio_id: Option<&str>,
    currency: &str,
) -> Result<()> {
    let selected: Vec<&Portfolio> = portfolios
        .iter()
        .filter(|p| portfolio_id.is_none_or(|id| p.id == id))
        .collect();
    if let Some(id) = portfolio_id {
        if selected.is_empty() {
            anyhow::bail!("Unknown portfolio '{id}'");
        }
    }

    let values: Vec<PortfolioValue> = selected.iter().map(|p| p.valuate(catalog)).collect();
    for (i, value) in values.iter().enumerate() {
        println!("{}", value.display_as_table(currency));
        if i + 1 < values.len() {
            ui::print_separator();
        }
    }

    if values.len() > 1 {
        let grand_total: f64 = values.iter().map(|v| v.total_value).sum();
        let total_str = format!("Grand Total ({currency}): {grand_total:.2}");
        println!("\n{}", style(total_str).bold().green());
    }

    if !shares.is_empty() {
        ui::print_separator();
        println!(
            "{}\n",
            ui::style_text("Fractional Shares", ui::StyleType::Title)
        );
        println!("{}", shares_table(shares, catalog, currency));
    }

    let held: Vec<String> = selected
        .iter()
        .flat_map(|p| p.assets.iter().cloned())
        .collect();
    let picks = catalog.recommendations(&held, DEFAULT_RECOMMENDATIONS);
    if !picks.is_empty() {
        ui::print_separator();
        println!("{}\n", ui::style_text("Recommended", ui::StyleType::Title));
        println!("{}", super::explore::nfts_table(catalog, &picks, currency));
    }
    Ok(())
}
