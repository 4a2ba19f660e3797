#![allow(clippy::doc_markdown)]
#![doc = include_str!("../../README.md")]

pub mod api;
pub mod core;
pub mod error;
pub mod prelude;
pub mod settings;
pub mod statistics;
pub mod synthesis;
pub mod temperature;

#[cfg(test)]
mod testing;
