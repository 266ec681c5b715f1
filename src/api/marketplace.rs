//! The `phc_sdk::api::marketplace` module provides a client for publishing app tile modules
//! to the Marketplace.
//!
//! Publishing a module takes several calls: a draft module is created, its app tile
//! source is set, an icon is uploaded and attached, and finally the draft is published
//! under a version. [`MarketplaceClient::publish_new_app_tile_module`] runs the whole
//! sequence.
//!
//! # Example
//!
//! ```rust,ignore
//! use phc_sdk::api::{graphql::LambdaGraphQLClient, marketplace::AppTileCreate};
//!
//! let client = LambdaGraphQLClient::builder("my-account", "my-user")
//!     .rule("publishContent", true)
//!     .build_from_env(None)
//!     .await;
//!
//! let module_id = client.marketplace()?
//!     .publish_new_app_tile_module(&AppTileCreate {
//!         name: "My Tile".to_string(),
//!         description: "Opens my app".to_string(),
//!         image: "icon.png".into(),
//!         app_tile_id: "app-tile-id".to_string(),
//!         version: "1.0.0".to_string(),
//!         parent_module_id: None
//!     })
//!     .await?;
//! ```
use std::{collections::HashMap, fmt::Display, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{
    graphql::{self, decode_data, GraphQLExecutor},
    upload::{FormUploader, ImageUploader}
};

pub const MARKETPLACE_ADDRESS: &str = "marketplace-service:deployed/v1/marketplace/authenticated/graphql";

const APP_TILE_CATEGORY: &str = "APP_TILE";
const ICON_UPLOAD_TYPE: &str = "ICON";

enum MarketplaceOperations {
    GetPublishedAppTileModule,
    CreateDraftModule,
    SetAppTile,
    PublishModule,
    StartImageUpload,
    FinalizeImageUpload
}

impl MarketplaceOperations {
    fn query(&self) -> &'static str {
        match self {
            MarketplaceOperations::GetPublishedAppTileModule => r#"
  query GetPublishedModule($id: ID!, $version: String) {
    myModule(moduleId: $id, version: $version) {
      title
      description
      version
      source {
        ... on AppTile {
          id
        }
      }
      iconV2 {
        url
        fileName
        fileExtension
      }
    }
  }
"#,
            MarketplaceOperations::CreateDraftModule => r#"
  mutation CreateDraftModule($input: CreateDraftModuleInput!) {
    createDraftModule(input: $input) {
      id
    }
  }
"#,
            MarketplaceOperations::SetAppTile => r#"
  mutation SetAppTile($input: SetPublicAppTileDraftModuleSourceInput!) {
    setPublicAppTileDraftModuleSource(input: $input) {
      moduleId
    }
  }
"#,
            MarketplaceOperations::PublishModule => r#"
  mutation PublishModule($input: PublishDraftModuleInputV2!) {
    publishDraftModuleV2(input: $input) {
      id
      version {
        version
      }
    }
  }
"#,
            MarketplaceOperations::StartImageUpload => r#"
  mutation StartImageUpload($input: StartUploadInput!) {
    startUpload(input: $input) {
      id
      url
      fields
    }
  }
"#,
            MarketplaceOperations::FinalizeImageUpload => r#"
  mutation FinalizeImageUpload($input: FinalizeUploadInput!) {
    finalizeUpload(input: $input) {
      moduleId
    }
  }
"#
        }
    }
}

/// A published app tile module.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppTileModule {
    pub title: String,
    pub description: String,
    pub version: String,
    #[serde(default)]
    pub source: AppTileSource,
    pub icon_v2: Option<ModuleIcon>
}

impl Display for AppTileModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string_pretty(&self).map_err(|_| std::fmt::Error)?;
        write!(f, "{json}")
    }
}

/// The source of a module. `id` is only set when the source is an app tile.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct AppTileSource {
    pub id: Option<String>
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModuleIcon {
    pub url: String,
    pub file_name: String,
    pub file_extension: String
}

/// Everything needed to create and publish an app tile module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppTileCreate {
    pub name: String,
    pub description: String,
    /// Local path of the icon to upload.
    pub image: PathBuf,
    pub app_tile_id: String,
    pub version: String,
    pub parent_module_id: Option<String>
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetModuleData {
    my_module: Option<AppTileModule>
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDraftModuleData {
    create_draft_module: ModuleId
}

#[derive(Deserialize)]
struct ModuleId {
    id: String
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetAppTileData {
    set_public_app_tile_draft_module_source: DraftModuleRef
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftModuleRef {
    module_id: String
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartUploadData {
    start_upload: StartedUpload
}

#[derive(Deserialize)]
struct StartedUpload {
    id: String,
    url: String,
    #[serde(default)]
    fields: HashMap<String, String>
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinalizeUploadData {
    finalize_upload: DraftModuleRef
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishModuleData {
    publish_draft_module_v2: ModuleId
}

pub struct MarketplaceClient<'a> {
    client: &'a dyn GraphQLExecutor,
    uploader: Box<dyn ImageUploader + 'a>,
    address: String
}

impl<'a> MarketplaceClient<'a> {
    pub fn new(client: &'a dyn GraphQLExecutor) -> Result<Self> {
        Ok(Self::with_uploader(client, FormUploader::new()?))
    }

    pub fn with_uploader(client: &'a dyn GraphQLExecutor, uploader: impl ImageUploader + 'a) -> Self {
        Self {
            client,
            uploader: Box::new(uploader),
            address: MARKETPLACE_ADDRESS.to_string()
        }
    }

    /// Sends requests to `address` instead of the deployed Marketplace function.
    pub fn with_address(mut self, address: &str) -> Self {
        self.address = address.to_string();
        self
    }

    async fn gql(&self, operation: MarketplaceOperations, variables: Value) -> Result<Map<String, Value>> {
        let variables = graphql::variables(variables)?;

        Ok(self.client.gql(&self.address, operation.query(), &variables).await?)
    }

    /// Fetches a module by id, optionally at a specific version. Returns `None` when the
    /// module does not exist.
    pub async fn get_app_tile_module(&self, id: &str, version: Option<&str>) -> Result<Option<AppTileModule>> {
        let mut variables = json!({ "id": id });
        if let Some(version) = version {
            variables["version"] = json!(version);
        }

        let data = self.gql(MarketplaceOperations::GetPublishedAppTileModule, variables)
            .await
            .with_context(|| format!("Error getting module {id}"))?;

        Ok(decode_data::<GetModuleData>(data)?.my_module)
    }

    /// Uploads `image` and attaches it to the draft module as its icon.
    pub async fn attach_image_to_draft_module(&self, module_id: &str, image: &Path) -> Result<()> {
        let file_name = image.file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("Image path {} has no file name", image.display()))?;

        let data = self.gql(MarketplaceOperations::StartImageUpload, json!({
            "input": {
                "fileName": file_name
            }
        }))
            .await
            .with_context(|| format!("Error starting upload of {file_name}"))?;

        let upload = decode_data::<StartUploadData>(data)?.start_upload;

        self.uploader.upload(&upload.url, image, file_name, &upload.fields)
            .await?;

        let data = self.gql(MarketplaceOperations::FinalizeImageUpload, json!({
            "input": {
                "id": upload.id,
                "moduleId": module_id,
                "type": ICON_UPLOAD_TYPE
            }
        }))
            .await
            .with_context(|| format!("Error finalizing upload of {file_name} for module {module_id}"))?;

        let finalized = decode_data::<FinalizeUploadData>(data)?.finalize_upload;
        log::debug!("Attached {file_name} to module {}", finalized.module_id);

        Ok(())
    }

    /// Creates a draft app tile module with its source and icon set, and returns the id
    /// of the draft.
    pub async fn create_app_tile_draft_module(&self, params: &AppTileCreate) -> Result<String> {
        let data = self.gql(MarketplaceOperations::CreateDraftModule, json!({
            "input": {
                "title": params.name,
                "description": params.description,
                "parentModuleId": params.parent_module_id,
                "category": APP_TILE_CATEGORY
            }
        }))
            .await
            .with_context(|| format!("Error creating draft module {}", params.name))?;

        let module_id = decode_data::<CreateDraftModuleData>(data)?.create_draft_module.id;

        let data = self.gql(MarketplaceOperations::SetAppTile, json!({
            "input": {
                "moduleId": module_id,
                "sourceInfo": {
                    "id": params.app_tile_id
                }
            }
        }))
            .await
            .with_context(|| format!("Error setting app tile {} on module {module_id}", params.app_tile_id))?;

        decode_data::<SetAppTileData>(data)?;

        self.attach_image_to_draft_module(&module_id, &params.image)
            .await?;

        Ok(module_id)
    }

    /// Creates a draft module and publishes it under `params.version`. Returns the id of
    /// the published module.
    pub async fn publish_new_app_tile_module(&self, params: &AppTileCreate) -> Result<String> {
        let draft_module_id = self.create_app_tile_draft_module(params).await?;

        let data = self.gql(MarketplaceOperations::PublishModule, json!({
            "input": {
                "moduleId": draft_module_id,
                "version": {
                    "version": params.version
                }
            }
        }))
            .await
            .with_context(|| format!("Error publishing module {draft_module_id} as version {}", params.version))?;

        Ok(decode_data::<PublishModuleData>(data)?.publish_draft_module_v2.id)
    }
}
