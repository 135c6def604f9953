//! Durable project storage.

mod error;
mod registry;

pub use error::StoreError;
pub use registry::{ProjectRegistry, RegistryEvent};
