//! Defines the opaque-amount abstraction boundary: the handle type for
//! secret amounts, the arithmetic engine trait, and the asset vault trait
//!
//! The ledger core is written entirely against these traits; the production
//! engine (an encrypted-integer backend) and asset ledger live outside this
//! workspace. The `mocks` feature provides cleartext stand-ins for tests

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod engine;
pub mod vault;

#[cfg(feature = "mocks")]
pub mod mocks;

pub use engine::{OpaqueAmount, OpaqueEngine, OpaqueError};
pub use vault::{AssetVault, VaultError};
