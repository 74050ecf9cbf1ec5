pub mod app_config;
pub mod config;
pub mod error;
pub mod expand;
pub mod matching;
pub mod offer;
pub mod rank;
pub mod stores;
pub mod text;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use expand::expand_query;
pub use matching::{name_contains_query, offer_matches_query};
pub use offer::{discount_percent_from_name, Offer, OfferKind};
pub use rank::{rank_stores, StoreRow, MAX_STORE_ROWS};
pub use stores::{is_grocery_store, is_junk_name};
pub use text::normalize_text;
