//! The transport used to reach serverless functions.
//!
//! The [`Invoker`] trait is the only thing the GraphQL client needs from the outside
//! world: call a function by name with an opaque payload, get bytes back. The
//! [`LambdaInvoker`] implementation (behind the `lambda` feature) does this with AWS
//! Lambda.
use anyhow::Result;

/// Invokes a named function with a raw payload and returns its raw response.
///
/// Implementations must be safe to share between concurrent calls. Any retry policy
/// belongs to the implementation, the GraphQL client will report the first failure.
#[async_trait::async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke(&self, function_name: &str, payload: Vec<u8>) -> Result<Vec<u8>>;
}

#[cfg(feature = "lambda")]
pub use self::lambda::LambdaInvoker;

#[cfg(feature = "lambda")]
mod lambda {
    use anyhow::{bail, Context, Result};
    use aws_config::BehaviorVersion;
    use aws_sdk_lambda::{config::Region, primitives::Blob, Client};

    use super::Invoker;

    /// An [`Invoker`] that calls AWS Lambda functions synchronously.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use phc_sdk::api::invoker::{Invoker, LambdaInvoker};
    ///
    /// let invoker = LambdaInvoker::from_env(None).await;
    /// let response = invoker.invoke("my-function:live", br#"{"ping": true}"#.to_vec()).await?;
    /// ```
    #[derive(Debug, Clone)]
    pub struct LambdaInvoker {
        client: Client
    }

    impl LambdaInvoker {
        /// Loads credentials and region from the default AWS provider chain. `region`
        /// overrides whatever region the environment provides.
        pub async fn from_env(region: Option<String>) -> Self {
            let mut loader = aws_config::defaults(BehaviorVersion::latest());

            if let Some(region) = region {
                loader = loader.region(Region::new(region));
            }

            let config = loader.load().await;

            Self {
                client: Client::new(&config)
            }
        }

        pub fn from_client(client: Client) -> Self {
            Self {
                client
            }
        }
    }

    #[async_trait::async_trait]
    impl Invoker for LambdaInvoker {
        async fn invoke(&self, function_name: &str, payload: Vec<u8>) -> Result<Vec<u8>> {
            log::info!("Invoking function {function_name}");

            let output = self.client.invoke()
                .function_name(function_name)
                .payload(Blob::new(payload))
                .send()
                .await
                .with_context(|| format!("Error invoking function {function_name}"))?;

            let response = output.payload()
                .map(|blob| blob.as_ref().to_vec())
                .unwrap_or_default();

            if let Some(function_error) = output.function_error() {
                bail!(
                    "Function {function_name} failed with {function_error}: {}",
                    String::from_utf8_lossy(&response)
                );
            }

            Ok(response)
        }
    }

}
