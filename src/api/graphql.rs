//! A GraphQL client that sends queries to serverless functions instead of HTTP servers.
//!
//! A request is addressed with a string of the form `<function>/<path>`. The function
//! part picks which function to invoke and the path is the route the function would
//! see if the request had come through an API gateway.
//!
//! # Example
//!
//! ```rust,ignore
//! use phc_sdk::api::graphql::LambdaGraphQLClient;
//! use serde_json::{json, Map};
//!
//! let client = LambdaGraphQLClient::builder("my-account", "my-user")
//!     .rule("publishContent", true)
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
//! println!("{}", data["app"]["name"]);
//! ```
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::{
    address::Address,
    app_store::AppStoreClient,
    config::{ClientConfig, Policy},
    envelope::{decode_response, encode_request},
    error::GqlError,
    invoker::Invoker,
    marketplace::MarketplaceClient
};

/// Executes GraphQL documents against an addressed backend.
///
/// The App Store and Marketplace clients are written against this trait rather than a
/// concrete client.
#[async_trait::async_trait]
pub trait GraphQLExecutor: Send + Sync {
    async fn gql(&self, address: &str, query: &str, variables: &Map<String, Value>) -> Result<Map<String, Value>, GqlError>;
}

/// Converts the data returned by a GraphQL call into a typed response.
pub fn decode_data<T: DeserializeOwned>(data: Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(data))
        .with_context(|| format!("Error decoding GraphQL data into {}", std::any::type_name::<T>()))
}

/// Turns a `json!` object literal into a variables map.
pub(crate) fn variables(value: Value) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("GraphQL variables must be a JSON object, got {other}")
    }
}

/// Sends GraphQL requests through an [`Invoker`], attaching the account, user and policy
/// from its [`ClientConfig`] to every request.
///
/// The client is cheap to clone and every clone shares the same invoker.
#[derive(Clone)]
pub struct LambdaGraphQLClient {
    config: Arc<ClientConfig>,
    invoker: Arc<dyn Invoker>
}

impl std::fmt::Debug for LambdaGraphQLClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LambdaGraphQLClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LambdaGraphQLClient {
    pub fn new(config: ClientConfig, invoker: impl Invoker + 'static) -> Self {
        Self {
            config: Arc::new(config),
            invoker: Arc::new(invoker)
        }
    }

    pub fn builder(account: &str, user: &str) -> LambdaGraphQLClientBuilder {
        LambdaGraphQLClientBuilder::new(account, user)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends `query` with `variables` to the function named by `address` and returns the
    /// `data` of the GraphQL response.
    ///
    /// Nothing is invoked if the address has no `/`. If the response reports GraphQL
    /// errors, only the first error's message is returned and the data is dropped.
    pub async fn execute(&self, address: &str, query: &str, variables: &Map<String, Value>) -> Result<Map<String, Value>, GqlError> {
        let address = Address::parse(address)?;
        log::debug!("Sending GraphQL request to function {} at path {}", address.function_name, address.path);

        let payload = encode_request(&self.config, address.path, query, variables)?;

        let response = self.invoker.invoke(address.function_name, payload)
            .await
            .map_err(GqlError::Invocation)?;

        decode_response(&response)
    }

    /// Like [`execute`](Self::execute), then decodes the data into `T`.
    pub async fn execute_as<T: DeserializeOwned>(&self, address: &str, query: &str, variables: &Map<String, Value>) -> Result<T> {
        let data = self.execute(address, query, variables).await?;
        decode_data(data)
    }

    pub fn app_store(&self) -> AppStoreClient<'_> {
        AppStoreClient::new(self)
    }

    pub fn marketplace(&self) -> Result<MarketplaceClient<'_>> {
        MarketplaceClient::new(self)
    }
}

#[async_trait::async_trait]
impl GraphQLExecutor for LambdaGraphQLClient {
    async fn gql(&self, address: &str, query: &str, variables: &Map<String, Value>) -> Result<Map<String, Value>, GqlError> {
        self.execute(address, query, variables).await
    }
}

/// Collects the identity and rules for a [`LambdaGraphQLClient`] before choosing how it
/// will invoke functions.
///
/// # Example
///
/// ```rust
/// use phc_sdk::api::graphql::LambdaGraphQLClient;
///
/// let builder = LambdaGraphQLClient::builder("my-account", "my-user")
///     .rule("publishContent", true)
///     .rule("readData", false);
///
/// assert_eq!(builder.config.policy.rules.len(), 2);
/// ```
#[derive(Debug)]
pub struct LambdaGraphQLClientBuilder {
    pub config: ClientConfig
}

impl LambdaGraphQLClientBuilder {
    pub fn new(account: &str, user: &str) -> Self {
        Self {
            config: ClientConfig::new(account, user)
        }
    }

    pub fn rule(mut self, name: &str, allowed: bool) -> Self {
        self.config = self.config.with_rule(name, allowed);
        self
    }

    pub fn policy(mut self, policy: Policy) -> Self {
        self.config = self.config.with_policy(policy);
        self
    }

    pub fn build(self, invoker: impl Invoker + 'static) -> LambdaGraphQLClient {
        LambdaGraphQLClient::new(self.config, invoker)
    }

    /// Builds a client that invokes AWS Lambda with credentials from the environment.
    #[cfg(feature = "lambda")]
    pub async fn build_from_env(self, region: Option<String>) -> LambdaGraphQLClient {
        let invoker = super::invoker::LambdaInvoker::from_env(region).await;
        self.build(invoker)
    }
}
