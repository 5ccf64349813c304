//! Order placement, lifecycle and reporting on top of `PostgreSQL`.

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod export;
pub mod ids;
pub mod logging;
pub mod unit_of_work;

mod columns;

#[cfg(test)]
mod test;
