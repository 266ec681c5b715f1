//! This module uploads files to the pre-signed URLs handed out by the Marketplace.
//!
//! Uploads do not go through the function invocation transport. The Marketplace answers
//! a `startUpload` mutation with a URL and a set of form fields, and the file is then
//! posted to that URL as a multipart form.
//!
//! # Examples
//!
//! Uploading an image with the default client:
//!
//! ```rust,ignore
//! use phc_sdk::api::upload::{FormUploader, ImageUploader};
//! use std::{collections::HashMap, path::Path};
//!
//! let uploader = FormUploader::new()?;
//! let fields = HashMap::from([("key".to_string(), "uploads/icon.png".to_string())]);
//!
//! uploader.upload("https://bucket.example.com", Path::new("icon.png"), "icon.png", &fields).await?;
//! ```
//!
//! Creating a `FormUploader` with a custom timeout using `FormUploaderBuilder`:
//!
//! ```rust,ignore
//! use phc_sdk::api::upload::FormUploader;
//! use std::time::Duration;
//!
//! let mut builder = FormUploader::builder();
//! builder.client_builder = builder.client_builder
//!     .timeout(Duration::from_secs(120));
//!
//! let uploader = builder.build()?;
//! ```
use std::{collections::HashMap, path::Path, time::Duration};

use anyhow::{Context, Result};
use reqwest::{multipart::{Form, Part}, Client, ClientBuilder};

const FILE_FIELD: &str = "file";

/// Posts a local image to an upload URL together with the form fields the URL requires.
#[async_trait::async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload(&self, url: &str, image: &Path, file_name: &str, fields: &HashMap<String, String>) -> Result<()>;
}

#[async_trait::async_trait]
impl<'u, U: ImageUploader + ?Sized> ImageUploader for &'u U {
    async fn upload(&self, url: &str, image: &Path, file_name: &str, fields: &HashMap<String, String>) -> Result<()> {
        (**self).upload(url, image, file_name, fields).await
    }
}

/// The production [`ImageUploader`], backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct FormUploader {
    pub client: Client
}

impl FormUploader {
    /// Creates a new `FormUploader` with a 30 second timeout.
    pub fn new() -> Result<Self> {
        FormUploader::builder()
            .build()
    }

    pub fn builder() -> FormUploaderBuilder {
        FormUploaderBuilder::new()
    }

    /// Builds the multipart form. The file must be the last part, pre-signed POST
    /// endpoints ignore any field that follows it.
    pub fn build_form(file: Vec<u8>, file_name: &str, fields: &HashMap<String, String>) -> Form {
        let form = fields.iter()
            .fold(Form::new(), |form, (key, value)| form.text(key.clone(), value.clone()));

        form.part(FILE_FIELD, Part::bytes(file).file_name(file_name.to_string()))
    }
}

#[async_trait::async_trait]
impl ImageUploader for FormUploader {
    async fn upload(&self, url: &str, image: &Path, file_name: &str, fields: &HashMap<String, String>) -> Result<()> {
        let file = tokio::fs::read(image)
            .await
            .with_context(|| format!("Error reading image {}", image.display()))?;

        log::info!("Uploading {} to {url}", image.display());

        let response = self.client.post(url)
            .multipart(Self::build_form(file, file_name, fields))
            .send()
            .await
            .with_context(|| format!("Error uploading {file_name}"))?;

        response.error_for_status()
            .with_context(|| format!("Upload of {file_name} was rejected"))?;

        Ok(())
    }
}

/// The `FormUploaderBuilder` struct provides a way to customize the underlying `reqwest`
/// client before building a `FormUploader`.
#[derive(Debug)]
pub struct FormUploaderBuilder {
    pub client_builder: ClientBuilder
}

impl FormUploaderBuilder {
    pub fn new() -> Self {
        let client_builder = Client::builder()
            .timeout(Duration::from_secs(30));

        Self {
            client_builder
        }
    }

    pub fn build(self) -> Result<FormUploader> {
        let client = self.client_builder
            .build()
            .with_context(|| "Error creating upload client")?;

        Ok(FormUploader {
            client
        })
    }
}

impl Default for FormUploaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
