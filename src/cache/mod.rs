pub mod geocode_cache;

pub use geocode_cache::{CacheEntry, GeocodeCache};
