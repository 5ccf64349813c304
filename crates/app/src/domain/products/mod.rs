//! Products
//!
//! Stock-relevant projection of the catalog, read inside the order creation transaction.

pub mod records;
mod repository;

pub(crate) use repository::PgProductsRepository;
