//! `phc_sdk` sends GraphQL queries and mutations to backend functions through a function
//! invocation transport rather than HTTP.
//!
//! Each request is wrapped in the event an API gateway would produce for an HTTP POST,
//! sent to the function named by its address, and the doubly-encoded response is
//! unwrapped into the GraphQL data or an error.
//!
//! # Example
//!
//! ```rust,ignore
//! use phc_sdk::api::graphql::LambdaGraphQLClient;
//! use serde_json::{json, Map};
//!
//! let client = LambdaGraphQLClient::builder("my-account", "my-user")
//!     .build_from_env(None)
//!     .await;
//!
//! let mut variables = Map::new();
//! variables.insert("id".to_string(), json!("1234"));
//!
//! let data = client.execute(
//!     "app-store-service:deployed/graphql",
//!     "query GetApp($id: ID!) { app(id: $id) { name } }",
//!     &variables
//! ).await?;
//! ```
pub mod api;

pub use api::{
    config::{ClientConfig, Policy},
    error::GqlError,
    graphql::{GraphQLExecutor, LambdaGraphQLClient},
    invoker::Invoker
};
