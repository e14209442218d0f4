//! Brew Client - REST collaborator for the checkout core
//!
//! [`BrewApi`] implements [`brew_checkout::SalesBackend`] and
//! [`brew_checkout::PaymentGateway`] over the sales backend's HTTP API.

pub mod api;
pub mod claims;
pub mod config;
pub mod error;
pub mod http;

pub use api::BrewApi;
pub use claims::OperatorClaims;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::NetworkHttpClient;

pub use shared::ApiResponse;
