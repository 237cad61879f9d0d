//! Revtrend core library: quarterly revenue extraction and storage.
//!
//! Turns periodically published financial PDF reports into a canonical
//! time-series: the extractor reads the revenue table off a report's first
//! page, the normalizer and quarter parser give rows and columns stable
//! keys, and the store persists everything with upsert-by-natural-key
//! semantics plus range/latest-N retrieval and CSV/JSON export.

pub mod batch;
pub mod errors;
pub mod extract;
pub mod locator;
pub mod models;
pub mod normalize;
pub mod quarter;
pub mod series;
pub mod store;

pub use errors::{RevtrendError, RevtrendResult};
pub use models::{ImportRecord, QuarterlyRecord};
pub use store::RevenueStore;
