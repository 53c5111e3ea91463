pub mod catalog;
pub mod error;
pub mod identity;
pub mod orders;
pub mod payments;
pub mod query;
pub mod server;
