//! Shared types for the Brew point-of-sale client
//!
//! Catalog and cart models, wire DTOs for the sales backend and the GCash
//! payment provider, the unified error codes, and the API response envelope.

pub mod error;
pub mod models;
pub mod payment;
pub mod request;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{CartLine, DiscountPercent, HeldTransaction, Product, SizeOption, SugarLevel};
pub use payment::{PaymentMethod, PaymentStatus};
pub use response::ApiResponse;
