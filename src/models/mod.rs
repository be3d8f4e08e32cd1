pub mod integrations;
pub mod server;
pub mod user;
