use super::ui;
use crate::core::launch::{
    LaunchApi, LaunchService, LaunchStatus, MessageSigner, PumpLaunchParams, TokenCreationParams,
};
use crate::core::user::WalletSession;
use anyhow::{Context, Result};
use comfy_table::Cell;
use std::sync::Arc;

/// Token parameters plus optional overrides of the pump.fun launch defaults.
#[derive(Debug, Clone, Default)]
pub struct LaunchRequest {
    pub token: TokenCreationParams,
    pub token_mint: Option<String>,
    pub initial_price: Option<f64>,
    pub trading_fee: Option<f64>,
    pub creator_fee: Option<f64>,
    pub liquidity_percentage: Option<f64>,
    /// Register the launch instead of only printing the plan.
    pub submit: bool,
}

impl LaunchRequest {
    pub fn launch_params(&self) -> PumpLaunchParams {
        let mut params =
            PumpLaunchParams::for_token(self.token_mint.as_deref().unwrap_or(""), &self.token);
        if let Some(price) = self.initial_price {
            params.initial_price = price;
        }
        if let Some(fee) = self.trading_fee {
            params.trading_fee = fee;
        }
        if let Some(fee) = self.creator_fee {
            params.creator_fee = fee;
        }
        if let Some(pct) = self.liquidity_percentage {
            params.liquidity_percentage = pct;
        }
        params
    }
}

pub fn plan_table(token: &TokenCreationParams, params: &PumpLaunchParams, currency: &str) -> String {
    let raw_supply = token
        .raw_supply()
        .map_or_else(|_| "overflow".to_string(), |s| s.to_string());
    let mint = if params.token_mint.is_empty() {
        "(not created)"
    } else {
        params.token_mint.as_str()
    };

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Parameter"), ui::header_cell("Value")]);
    let rows = [
        ("Name", token.name.clone()),
        ("Symbol", token.symbol.clone()),
        ("Supply", token.supply.to_string()),
        ("Decimals", token.decimals.to_string()),
        ("Supply (base units)", raw_supply),
        ("Token mint", mint.to_string()),
        (
            "Initial price",
            format!("{:.9} {currency}", params.initial_price),
        ),
        ("Trading fee", format!("{:.1}%", params.trading_fee)),
        ("Creator fee", format!("{:.1}%", params.creator_fee)),
        ("Liquidity", format!("{:.1}%", params.liquidity_percentage)),
        (
            "Fully diluted value",
            ui::format_amount(params.fully_diluted_value(), currency),
        ),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    table.to_string()
}

pub fn status_table(status: &LaunchStatus, currency: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Token mint"),
        ui::header_cell("Status"),
        ui::header_cell(&format!("Market cap ({currency})")),
        ui::header_cell("Bonding curve"),
    ]);
    table.add_row(vec![
        Cell::new(&status.token_mint),
        Cell::new(&status.status),
        ui::format_optional_cell(status.market_cap, |v| format!("{v:.2}")),
        ui::format_optional_cell(status.bonding_curve_progress, |p| format!("{p:.1}%")),
    ]);
    table.to_string()
}

/// Validates the launch, prints the plan and, with `submit`, registers it.
pub async fn run(
    request: &LaunchRequest,
    wallet: &WalletSession,
    api: Arc<dyn LaunchApi>,
    signer: Option<&dyn MessageSigner>,
    currency: &str,
) -> Result<()> {
    request
        .token
        .validate()
        .context("Invalid token parameters")?;
    let params = request.launch_params();
    // The mint is only required once a token exists or the launch is submitted.
    let checked = if request.token_mint.is_some() || request.submit {
        params.validate()
    } else {
        params.validate_terms()
    };
    checked.context("Invalid launch parameters")?;

    println!(
        "{}\n",
        ui::style_text(
            &format!("Launch plan for {}", request.token.symbol),
            ui::StyleType::Title
        )
    );
    println!("{}", plan_table(&request.token, &params, currency));

    if !request.submit {
        println!(
            "\n{}",
            ui::style_text("Dry run. Pass --submit to register.", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    let signer = signer.context("No signer configured; add a `signer` section to the config")?;
    let receipt = LaunchService::new(api)
        .register(wallet, signer, &params)
        .await
        .context("Launch registration failed")?;

    println!(
        "\n{} {}",
        ui::style_text("Registered:", ui::StyleType::TotalLabel),
        ui::style_text(&receipt.token_mint, ui::StyleType::TotalValue)
    );
    if let Some(url) = &receipt.url {
        println!("{url}");
    }
    Ok(())
}

pub async fn status(
    api: Arc<dyn LaunchApi>,
    token_mint: &str,
    currency: &str,
) -> Result<()> {
    let status = LaunchService::new(api)
        .status(token_mint)
        .await
        .with_context(|| format!("Failed to fetch launch status for {token_mint}"))?;
    println!("{}", status_table(&status, currency));
    Ok(())
}
