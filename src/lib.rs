pub mod algorithm;
pub mod color;
pub mod config;
pub mod coordinate;
pub mod error;
pub mod grid;
pub mod heap;
pub mod snapshot;
pub mod stat;
