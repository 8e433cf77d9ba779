//! Portfolio valuation against the catalog.
use crate::core::catalog::{Catalog, Nft};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq)]
pub struct Performance {
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Portfolio {
    pub id: String,
    pub name: String,
    pub owner: String,
    /// Catalog NFT ids held by the portfolio.
    pub assets: Vec<String>,
    #[serde(default)]
    pub performance: Performance,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FractionalShare {
    pub id: String,
    pub nft_id: String,
    pub percentage: f64,
    pub owner: String,
}

impl FractionalShare {
    /// Shares cover `(0, 100]` percent of an NFT.
    pub fn has_valid_percentage(&self) -> bool {
        self.percentage > 0.0 && self.percentage <= 100.0
    }

    /// Value of the share at the NFT's catalog price. `None` if the NFT is
    /// unknown or the percentage is out of range.
    pub fn valuate(&self, catalog: &Catalog) -> Option<f64> {
        if !self.has_valid_percentage() {
            debug!("Share {} has invalid percentage {}", self.id, self.percentage);
            return None;
        }
        catalog
            .find(&self.nft_id)
            .map(|nft| nft.price * self.percentage / 100.0)
    }
}

/// A portfolio with its assets resolved against the catalog.
#[derive(Debug)]
pub struct PortfolioValue<'a> {
    pub id: String,
    pub name: String,
    pub assets: Vec<&'a Nft>,
    pub missing: Vec<String>,
    pub total_value: f64,
    pub performance: Performance,
}

impl<'a> PortfolioValue<'a> {
    /// Weight of each resolved asset in percent of the total value.
    pub fn weights(&self) -> Vec<(&'a Nft, Option<f64>)> {
        self.assets
            .iter()
            .map(|nft| {
                let weight = (self.total_value > 0.0).then(|| nft.price / self.total_value * 100.0);
                (*nft, weight)
            })
            .collect()
    }
}

impl Portfolio {
    pub fn valuate<'a>(&self, catalog: &'a Catalog) -> PortfolioValue<'a> {
        let mut assets = Vec::new();
        let mut missing = Vec::new();

        for id in &self.assets {
            match catalog.find(id) {
                Some(nft) => assets.push(nft),
                None => {
                    debug!("Portfolio {} references unknown NFT {}", self.id, id);
                    missing.push(id.clone());
                }
            }
        }

        let total_value = assets.iter().map(|nft| nft.price).sum();
        debug!(
            "Valuated portfolio {}: {} assets, total {}",
            self.id,
            assets.len(),
            total_value
        );

        PortfolioValue {
            id: self.id.clone(),
            name: self.name.clone(),
            assets,
            missing,
            total_value,
            performance: self.performance,
        }
    }
}
