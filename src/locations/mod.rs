pub mod division;
pub mod resolver;
pub mod static_list;

pub use division::{division_for_district, normalize_division, CANONICAL_DIVISIONS};
pub use resolver::{LocationResolver, Resolution, ResolutionSource};
pub use static_list::STATIC_DISTRICTS;
