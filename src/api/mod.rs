//! Clients for sending GraphQL requests to serverless functions, and the App Store and
//! Marketplace clients built on them.
pub mod address;
pub mod app_store;
pub mod config;
pub mod envelope;
pub mod error;
pub mod graphql;
pub mod invoker;
pub mod marketplace;
pub mod upload;

#[cfg(test)]
mod testing;
