//! Published-version catalog cache and version resolver for govm.

mod catalog;
mod resolver;
mod stable;

pub use catalog::{CatalogCache, CatalogSnapshot};
pub use resolver::Resolver;
pub use stable::StableCache;
