//! Core translation engine module

pub mod cache;
pub mod chunked;
pub mod client;
pub mod config;
pub mod errors;
pub mod interrupt;
pub mod models;
pub mod progress;

#[cfg(test)]
pub(crate) mod testing;
