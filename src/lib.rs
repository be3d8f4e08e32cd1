pub mod analytics;
pub mod config;
pub mod diagnostics;
pub mod directory;
pub mod filter;
pub mod handlers;
pub mod live;
pub mod models;
pub mod storage;
pub mod users;
pub mod utils;

#[cfg(test)]
mod testing;
