//! Registry aggregation: author tables in, one immutable [`Catalog`] out.
//!
//! ```rust,no_run
//! use llm_catalog::registry::{CatalogHandle, CatalogLoader};
//!
//! # async fn example() -> llm_catalog::Result<()> {
//! let loader = CatalogLoader::new("catalog");
//! let handle = CatalogHandle::new(loader.load().await?);
//!
//! let catalog = handle.current();
//! for endpoint in catalog.endpoints_for_model("claude-sonnet-4") {
//!     println!("{}", endpoint.identity());
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
#[cfg(feature = "builtin-catalog")]
mod builtin;
mod catalog;
mod loader;
pub mod merge;
mod snapshot;
mod table;

pub use builder::{BuildError, CatalogBuilder};
#[cfg(feature = "builtin-catalog")]
pub use builtin::builtin_tables;
pub use catalog::{Catalog, EffectiveLimits};
pub use loader::{CatalogIndex, CatalogLoader, DEFAULT_INDEX_FILE};
pub use merge::deep_merge;
pub use snapshot::CatalogHandle;
pub use table::{AuthorTable, PartialCatalog};

/// Builds a catalog from `tables`, failing on the first conflict.
pub fn load_catalog(tables: Vec<PartialCatalog>) -> crate::Result<Catalog> {
    Ok(CatalogBuilder::from_tables(tables).build()?)
}
