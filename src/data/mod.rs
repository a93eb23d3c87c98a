/// Data layer: core types, loading, caching and filtering.
///
/// Architecture:
/// ```text
///  .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → drop incomplete rows → derive Discount / Main_Category
///   └──────────┘
///        │            ┌───────┐
///        ├──────────▶ │ cache │  memoized by SourceKey (path, size, mtime)
///        ▼            └───────┘
///   ┌────────────────┐
///   │ ProductCatalog │  Vec<ProductRecord>, brand / category indices
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  brand ∧ category ∧ name search → filtered indices
///   └──────────┘
/// ```

pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
