//! Ordering Domain Concerns

pub mod identity;
pub mod orders;
pub mod products;
