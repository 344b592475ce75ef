/// Data layer: loading, normalization, search and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  typed PatentRecords, filing year, IPC group
///   └───────────┘     (memoized by content hash in `cache`)
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  immutable, shared record storage
///   └──────────┘
///        │
///        ├──▶ filter     SearchQuery → narrowed Dataset
///        ├──▶ aggregate  group-by counts, top-N, growth series
///        ├──▶ summary    per-column statistics
///        └──▶ export     Dataset → CSV
/// ```

pub mod aggregate;
pub mod cache;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod summary;
