//! Data models
//!
//! Shared between the checkout core and the backend client (via API).
//! Menu item and size IDs are `i64`, matching the backend's integer keys.

pub mod cart;
pub mod held;
pub mod product;

// Re-exports
pub use cart::*;
pub use held::*;
pub use product::*;
