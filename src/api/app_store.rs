//! The `phc_sdk::api::app_store` module provides a client for managing App Store listings.
//!
//! The `AppStoreClient` runs its queries and mutations through any
//! [`GraphQLExecutor`], usually a
//! [`LambdaGraphQLClient`](super::graphql::LambdaGraphQLClient).
//!
//! # Example
//!
//! ```rust,ignore
//! use phc_sdk::api::graphql::LambdaGraphQLClient;
//!
//! let client = LambdaGraphQLClient::builder("my-account", "my-user")
//!     .build_from_env(None)
//!     .await;
//!
//! let listing = client.app_store().get_listing("app-id").await?;
//! println!("{listing}");
//! ```
use std::fmt::Display;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::graphql::{self, decode_data, GraphQLExecutor};

pub const APP_STORE_ADDRESS: &str = "app-store-service:deployed/graphql";

const PRODUCT: &str = "LX";

enum AppStoreOperations {
    GetListing,
    CreateListing,
    EditListing,
    DeleteListing
}

impl AppStoreOperations {
    fn query(&self) -> &'static str {
        match self {
            AppStoreOperations::GetListing => r#"
  query GetAppStoreListing($id: ID!) {
    app(id: $id) {
      name
      description
      authorDisplay
      image
      ... on AppStoreWebApplication {
        url
      }
    }
  }
"#,
            AppStoreOperations::CreateListing => r#"
  mutation CreateAppStoreListing($input: CreateWebAppInput!) {
    createWebApp(input: $input) {
      id
    }
  }
"#,
            AppStoreOperations::EditListing => r#"
  mutation EditAppStoreListing($id: ID!, $edits: EditWebAppInput!) {
    editWebApp(id: $id, edits: $edits)
  }
"#,
            AppStoreOperations::DeleteListing => r#"
  mutation DeleteAppStoreListing($id: ID!) {
    deleteApp(id: $id)
  }
"#
        }
    }
}

/// An app as it is listed in the App Store. `url` is only set for web applications.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppStoreListing {
    pub name: String,
    pub description: String,
    pub author_display: String,
    pub image: String,
    pub url: Option<String>
}

impl Display for AppStoreListing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string_pretty(&self).map_err(|_| std::fmt::Error)?;
        write!(f, "{json}")
    }
}

/// The fields used both to create a listing and to edit one.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppStoreListingInput {
    pub name: String,
    pub author_display: String,
    pub url: String,
    pub description: String,
    pub image: String
}

#[derive(Deserialize)]
struct GetListingData {
    app: Option<AppStoreListing>
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateListingData {
    create_web_app: CreatedApp
}

#[derive(Deserialize)]
struct CreatedApp {
    id: String
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditListingData {
    edit_web_app: bool
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteListingData {
    delete_app: bool
}

pub struct AppStoreClient<'a> {
    client: &'a dyn GraphQLExecutor,
    address: String
}

impl<'a> AppStoreClient<'a> {
    pub fn new(client: &'a dyn GraphQLExecutor) -> Self {
        Self {
            client,
            address: APP_STORE_ADDRESS.to_string()
        }
    }

    /// Sends requests to `address` instead of the deployed App Store function.
    pub fn with_address(mut self, address: &str) -> Self {
        self.address = address.to_string();
        self
    }

    async fn gql(&self, operation: AppStoreOperations, variables: serde_json::Value) -> Result<serde_json::Map<String, serde_json::Value>> {
        let variables = graphql::variables(variables)?;

        Ok(self.client.gql(&self.address, operation.query(), &variables).await?)
    }

    pub async fn get_listing(&self, id: &str) -> Result<AppStoreListing> {
        let data = self.gql(AppStoreOperations::GetListing, json!({ "id": id }))
            .await
            .with_context(|| format!("Error getting App Store listing {id}"))?;

        decode_data::<GetListingData>(data)?
            .app
            .with_context(|| format!("App Store listing {id} was not found"))
    }

    /// Creates a web app listing and returns its id.
    pub async fn create_listing(&self, input: &AppStoreListingInput) -> Result<String> {
        let data = self.gql(AppStoreOperations::CreateListing, json!({
            "input": {
                "name": input.name,
                "authorDisplay": input.author_display,
                "url": input.url,
                "description": input.description,
                "image": input.image,
                "product": PRODUCT
            }
        }))
            .await
            .with_context(|| format!("Error creating App Store listing {}", input.name))?;

        Ok(decode_data::<CreateListingData>(data)?.create_web_app.id)
    }

    pub async fn edit_listing(&self, id: &str, input: &AppStoreListingInput) -> Result<()> {
        let data = self.gql(AppStoreOperations::EditListing, json!({
            "id": id,
            "edits": input
        }))
            .await
            .with_context(|| format!("Error editing App Store listing {id}"))?;

        if !decode_data::<EditListingData>(data)?.edit_web_app {
            bail!("The app you're trying to edit does not exist");
        }

        Ok(())
    }

    pub async fn delete_listing(&self, id: &str) -> Result<()> {
        let data = self.gql(AppStoreOperations::DeleteListing, json!({ "id": id }))
            .await
            .with_context(|| format!("Error deleting App Store listing {id}"))?;

        if !decode_data::<DeleteListingData>(data)?.delete_app {
            bail!("The app you're trying to delete does not exist");
        }

        Ok(())
    }
}
