//! Storage abstractions for scrape results.
//!
//! The whole result map is one document, rewritten after every route so an
//! interrupted run keeps everything finished so far.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ResultMap;

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for result storage backends.
#[async_trait]
pub trait ResultStorage: Send + Sync {
    /// Replace the stored document with `results`.
    async fn save(&self, results: &ResultMap) -> Result<()>;

    /// Load the stored document, `None` if nothing was saved yet.
    async fn load(&self) -> Result<Option<ResultMap>>;

    /// Human-readable location of the document, for logs.
    fn location(&self) -> String;
}
