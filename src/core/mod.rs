//! Core domain logic: pricing, catalog, portfolios, user data and token launch

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fraction;
pub mod launch;
pub mod log;
pub mod portfolio;
pub mod user;

// Re-export main types for cleaner imports
pub use error::{ServiceError, ServiceResult};
pub use fraction::{FractionConfig, FractionSession, PricedAsset, PricingResult};
pub use user::{ChainClient, UserDataApi, UserDataManager, WalletSession};
