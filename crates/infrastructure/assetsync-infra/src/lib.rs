pub mod store;
#[cfg(feature = "test-util")]
pub mod testing;

// Re-exports for convenience
pub use store::{StoreClient, StoreError, StoreTarget};
