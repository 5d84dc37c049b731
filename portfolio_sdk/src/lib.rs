pub mod config;
pub mod connection;
pub mod contracts;
pub mod error;
pub mod operations;
pub mod orders;
pub mod routers;
pub mod signer;
#[cfg(test)]
pub mod tests;
pub mod tools;
pub mod utils;

pub use config::ConnectionConfig;
pub use connection::PortfolioConnection;
pub use operations::HasOrders;
