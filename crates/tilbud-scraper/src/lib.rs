pub mod cache;
pub mod client;
pub mod decode;
pub mod error;
pub mod extract;
pub mod normalize;

pub use cache::{CacheKey, SearchCache};
pub use client::{DealsClient, UPSTREAM_ORIGIN};
pub use decode::decode_offer_payload;
pub use error::ScrapeError;
pub use extract::extract_offer_urls;
pub use normalize::normalize_offer;
