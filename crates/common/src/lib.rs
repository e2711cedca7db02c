//! Shared identifiers and value types used across the order crates.

pub mod page;
pub mod status;
pub mod types;

pub use page::Page;
pub use status::{OrderStatus, ParseStatusError};
pub use types::{OrderId, ServiceId};
