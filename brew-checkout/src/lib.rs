//! Checkout and payment orchestration for the Brew café terminal
//!
//! The cart, the modifier wizard and the pricing rules are plain
//! synchronous state. The three checkout paths (cash, hold, GCash) share
//! one [`Register`] and one [`CheckoutGuard`], so only one of them can own
//! the cart at a time. Everything that crosses the network goes through
//! the [`SalesBackend`] and [`PaymentGateway`] traits.
//!
//! ```ignore
//! let register = Register::new(PricingEngine::new(config.tax_percent));
//! let cash = CashCheckout::new(backend.clone(), store.clone(), register.clone());
//! let gcash = GcashCheckout::new(backend.clone(), gateway, store, register.clone(), config.gcash);
//! ```

pub mod backend;
pub mod cart;
pub mod cash;
pub mod config;
pub mod error;
pub mod gcash;
pub mod guard;
pub mod hold;
pub mod logger;
pub mod modifier;
pub mod money;
pub mod pricing;
pub mod register;
pub mod session;
pub mod storage;
pub mod submit;

pub use backend::{BackendError, BackendResult, PaymentGateway, SalesBackend};
pub use cart::{CartStore, MAX_LINE_QUANTITY};
pub use cash::{CashCheckout, CashReceipt, CashState};
pub use config::{CheckoutConfig, GcashConfig};
pub use error::{CheckoutError, CheckoutResult};
pub use gcash::{CompletionSource, GcashCheckout, GcashSession, GcashState, SessionOutcome};
pub use guard::{CheckoutGuard, CheckoutKind, CheckoutLease, CheckoutState};
pub use hold::HoldOrchestrator;
pub use modifier::{ModifierSelectionFlow, ModifierStep, OpenOutcome};
pub use pricing::{PricingEngine, PricingSnapshot};
pub use register::{CartSnapshot, Register};
pub use session::{Operator, ReopenedHold, ResumeMarker, SessionContext};
pub use storage::{LocalStore, StorageError};
pub use submit::{Accepted, BatchReport};
