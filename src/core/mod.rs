//! Canonical invoice model and the validation rule engine.
//!
//! Every e-invoice dialect is normalized into [`CanonicalInvoice`], which
//! [`validate`] / [`validate_at`] check against the EN 16931-style rule
//! catalogue in [`rules`].

mod builder;
pub mod currencies;
mod error;
pub mod rules;
mod types;
mod validation;

pub use builder::*;
pub use currencies::is_known_currency_code;
pub use error::*;
pub use types::*;
pub use validation::*;
