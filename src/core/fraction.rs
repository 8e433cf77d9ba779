//! Fractional ownership pricing.
//!
//! A selected asset is split into `fragment_count` equal fragments and a buyer
//! chooses how many of them to purchase. Every setter normalizes its input into
//! range instead of rejecting it, and pricing degrades to zero when no asset is
//! selected.

use crate::core::catalog::Nft;
use crate::core::error::{ServiceError, ServiceResult};
use tracing::debug;

pub const MIN_FRAGMENTS: u32 = 2;
pub const MAX_FRAGMENTS: u32 = 100;
pub const DEFAULT_FRAGMENTS: u32 = 10;
pub const MIN_PURCHASE: u32 = 1;

/// An item with a total valuation, eligible for fractional sale.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedAsset {
    identifier: String,
    display_name: String,
    total_price: f64,
}

impl PricedAsset {
    pub fn new(
        identifier: impl Into<String>,
        display_name: impl Into<String>,
        total_price: f64,
    ) -> ServiceResult<Self> {
        if !total_price.is_finite() || total_price < 0.0 {
            return Err(ServiceError::invalid(format!(
                "asset price must be a non-negative number, got {total_price}"
            )));
        }
        Ok(Self {
            identifier: identifier.into(),
            display_name: display_name.into(),
            total_price,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn total_price(&self) -> f64 {
        self.total_price
    }
}

impl TryFrom<&Nft> for PricedAsset {
    type Error = ServiceError;

    fn try_from(nft: &Nft) -> Result<Self, Self::Error> {
        PricedAsset::new(&nft.id, &nft.name, nft.price)
    }
}

/// Fragment count and purchase quantity, always within their bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FractionConfig {
    fragment_count: u32,
    purchase_quantity: u32,
}

impl Default for FractionConfig {
    fn default() -> Self {
        Self {
            fragment_count: DEFAULT_FRAGMENTS,
            purchase_quantity: MIN_PURCHASE,
        }
    }
}

impl FractionConfig {
    pub fn fragment_count(&self) -> u32 {
        self.fragment_count
    }

    pub fn purchase_quantity(&self) -> u32 {
        self.purchase_quantity
    }
}

/// Derived prices for the current selection. Never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingResult {
    pub per_fragment_price: f64,
    pub total_purchase_price: f64,
    pub fragment_count: u32,
    pub purchase_quantity: u32,
}

impl PricingResult {
    /// Share of the whole asset bought, in percent.
    pub fn ownership_percentage(&self) -> f64 {
        if self.fragment_count == 0 {
            return 0.0;
        }
        self.purchase_quantity as f64 / self.fragment_count as f64 * 100.0
    }
}

/// Price of one fragment, or zero when there is nothing to divide.
pub fn compute_per_fragment_price(asset: Option<&PricedAsset>, fragment_count: i64) -> f64 {
    match asset {
        Some(asset) if fragment_count > 0 => asset.total_price / fragment_count as f64,
        _ => 0.0,
    }
}

/// Unrounded total for `purchase_quantity` fragments.
pub fn compute_total_price(per_fragment_price: f64, purchase_quantity: i64) -> f64 {
    per_fragment_price * purchase_quantity as f64
}

fn clamp_to(value: i64, min: u32, max: u32) -> u32 {
    value.clamp(min as i64, max as i64) as u32
}

/// Sets the fragment count, clamped to `[MIN_FRAGMENTS, MAX_FRAGMENTS]`.
///
/// A purchase quantity left above the new count is pulled down to it so that
/// `purchase_quantity <= fragment_count` keeps holding.
pub fn set_fragment_count(config: &mut FractionConfig, value: i64) {
    let count = clamp_to(value, MIN_FRAGMENTS, MAX_FRAGMENTS);
    if count as i64 != value {
        debug!("Clamped fragment count {value} to {count}");
    }
    config.fragment_count = count;
    if config.purchase_quantity > count {
        debug!(
            "Purchase quantity {} exceeds new fragment count, clamping to {count}",
            config.purchase_quantity
        );
        config.purchase_quantity = count;
    }
}

/// Sets the purchase quantity, clamped to `[MIN_PURCHASE, fragment_count]`.
pub fn set_purchase_quantity(config: &mut FractionConfig, value: i64) {
    let quantity = clamp_to(value, MIN_PURCHASE, config.fragment_count);
    if quantity as i64 != value {
        debug!("Clamped purchase quantity {value} to {quantity}");
    }
    config.purchase_quantity = quantity;
}

/// Selection state plus fraction configuration for one pricing session.
#[derive(Debug, Clone, Default)]
pub struct FractionSession {
    asset: Option<PricedAsset>,
    config: FractionConfig,
}

impl FractionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the selection and resets the configuration to its defaults.
    pub fn select_asset(&mut self, asset: PricedAsset) {
        debug!(
            "Selected asset {} ({}) at {}",
            asset.identifier, asset.display_name, asset.total_price
        );
        self.asset = Some(asset);
        self.config = FractionConfig::default();
    }

    pub fn clear_selection(&mut self) {
        self.asset = None;
        self.config = FractionConfig::default();
    }

    pub fn selected_asset(&self) -> Option<&PricedAsset> {
        self.asset.as_ref()
    }

    pub fn config(&self) -> FractionConfig {
        self.config
    }

    pub fn set_fragment_count(&mut self, value: i64) {
        set_fragment_count(&mut self.config, value);
    }

    pub fn set_purchase_quantity(&mut self, value: i64) {
        set_purchase_quantity(&mut self.config, value);
    }

    pub fn increment_purchase(&mut self) {
        let next = self.config.purchase_quantity as i64 + 1;
        set_purchase_quantity(&mut self.config, next);
    }

    pub fn decrement_purchase(&mut self) {
        let next = self.config.purchase_quantity as i64 - 1;
        set_purchase_quantity(&mut self.config, next);
    }

    pub fn pricing(&self) -> PricingResult {
        let per_fragment_price =
            compute_per_fragment_price(self.asset.as_ref(), self.config.fragment_count as i64);
        PricingResult {
            per_fragment_price,
            total_purchase_price: compute_total_price(
                per_fragment_price,
                self.config.purchase_quantity as i64,
            ),
            fragment_count: self.config.fragment_count,
            purchase_quantity: self.config.purchase_quantity,
        }
    }
}
