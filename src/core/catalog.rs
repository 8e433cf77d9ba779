//! NFT catalog: listings and collections available for browsing and fractionalization.

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_RECOMMENDATIONS: usize = 4;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NftAttribute {
    pub trait_type: String,
    pub value: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Nft {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    pub creator: String,
    #[serde(default)]
    pub owner: String,
    pub price: f64,
    pub collection: Option<String>,
    #[serde(default)]
    pub attributes: Vec<NftAttribute>,
}

impl Nft {
    /// Value of the "Rarity" trait, if the NFT carries one.
    pub fn rarity(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.trait_type.eq_ignore_ascii_case("rarity"))
            .map(|a| a.value.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    pub creator: String,
    pub floor_price: f64,
    pub volume_traded: f64,
    pub items: u64,
    pub holders: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Catalog {
    #[serde(default)]
    pub collections: Vec<Collection>,
    #[serde(default)]
    pub nfts: Vec<Nft>,
}

impl Catalog {
    pub fn find(&self, id: &str) -> Option<&Nft> {
        self.nfts.iter().find(|nft| nft.id == id)
    }

    pub fn collection(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    /// Filters by a case-insensitive name substring and an optional collection id.
    ///
    /// A collection of `"all"` matches every NFT, the same as `None`.
    pub fn search(&self, query: Option<&str>, collection: Option<&str>) -> Vec<&Nft> {
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);
        let collection = collection.filter(|c| !c.eq_ignore_ascii_case("all"));

        let results: Vec<&Nft> = self
            .nfts
            .iter()
            .filter(|nft| {
                query
                    .as_ref()
                    .is_none_or(|q| nft.name.to_lowercase().contains(q))
            })
            .filter(|nft| collection.is_none_or(|c| nft.collection.as_deref() == Some(c)))
            .collect();

        debug!(
            "Catalog search query={:?} collection={:?} matched {} of {}",
            query,
            collection,
            results.len(),
            self.nfts.len()
        );
        results
    }

    /// NFTs not in `held_ids`, in catalog order.
    pub fn recommendations(&self, held_ids: &[String], limit: usize) -> Vec<&Nft> {
        self.nfts
            .iter()
            .filter(|nft| !held_ids.contains(&nft.id))
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nft(id: &str, name: &str, price: f64, collection: &str) -> Nft {
        Nft {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            image: format!("https://arweave.net/placeholder{id}"),
            creator: "Studio Nebula".to_string(),
            owner: "user1".to_string(),
            price,
            collection: Some(collection.to_string()),
            attributes: vec![NftAttribute {
                trait_type: "Rarity".to_string(),
                value: "Rare".to_string(),
            }],
        }
    }

    fn catalog() -> Catalog {
        Catalog {
            collections: vec![],
            nfts: vec![
                nft("1", "Space Explorer #001", 2.5, "art"),
                nft("2", "Cyberpunk Street #042", 1.8, "art"),
                nft("3", "Magic Academy Student #137", 3.2, "gaming"),
                nft("4", "Metaverse Architect #089", 5.0, "metaverse"),
                nft("5", "Pixel Adventurer #210", 1.5, "gaming"),
                nft("6", "Future Athlete #055", 2.8, "gaming"),
            ],
        }
    }

    #[test]
    fn test_search_without_filters_returns_everything() {
        let catalog = catalog();
        assert_eq!(catalog.search(None, None).len(), 6);
        assert_eq!(catalog.search(Some("  "), Some("all")).len(), 6);
    }

    #[test]
    fn test_search_by_collection_and_name() {
        let catalog = catalog();
        let gaming = catalog.search(None, Some("gaming"));
        assert_eq!(gaming.len(), 3);

        let matches = catalog.search(Some("PIXEL"), Some("gaming"));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "5");

        assert!(catalog.search(Some("pixel"), Some("art")).is_empty());
    }

    #[test]
    fn test_recommendations_skip_held_assets() {
        let catalog = catalog();
        let held = vec!["1".to_string(), "2".to_string(), "3".to_string()];
        let picks = catalog.recommendations(&held, DEFAULT_RECOMMENDATIONS);
        let ids: Vec<&str> = picks.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["4", "5", "6"]);
    }

    #[test]
    fn test_find_and_rarity() {
        let catalog = catalog();
        assert_eq!(catalog.find("4").map(|n| n.price), Some(5.0));
        assert!(catalog.find("99").is_none());
        assert_eq!(catalog.find("1").and_then(Nft::rarity), Some("Rare"));
    }
}
