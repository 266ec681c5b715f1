use std::{collections::{HashMap, VecDeque}, path::{Path, PathBuf}, sync::Mutex};

use anyhow::{bail, Result};
use serde_json::{Map, Value};

use super::{error::GqlError, graphql::GraphQLExecutor, upload::ImageUploader};

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub address: String,
    pub query: String,
    pub variables: Value
}

/// A [`GraphQLExecutor`] that replays queued data maps or remote errors in order.
#[derive(Debug, Default)]
pub struct MockExecutor {
    calls: Mutex<Vec<RecordedCall>>,
    responses: Mutex<VecDeque<Result<Value, String>>>
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, data: Value) -> Self {
        self.responses.lock().unwrap().push_back(Ok(data));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.responses.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl GraphQLExecutor for MockExecutor {
    async fn gql(&self, address: &str, query: &str, variables: &Map<String, Value>) -> Result<Map<String, Value>, GqlError> {
        self.calls.lock().unwrap().push(RecordedCall {
            address: address.to_string(),
            query: query.to_string(),
            variables: Value::Object(variables.clone())
        });

        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(Value::Object(data))) => Ok(data),
            Some(Ok(_)) => Ok(Map::new()),
            Some(Err(message)) => Err(GqlError::Remote { message }),
            None => Err(GqlError::Remote { message: "MockExecutor has no response queued".to_string() })
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub url: String,
    pub image: PathBuf,
    pub file_name: String,
    pub fields: HashMap<String, String>
}

#[derive(Debug, Default)]
pub struct MockUploader {
    uploads: Mutex<Vec<RecordedUpload>>,
    failure: Option<String>
}

impl MockUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            uploads: Mutex::default(),
            failure: Some(message.to_string())
        }
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ImageUploader for MockUploader {
    async fn upload(&self, url: &str, image: &Path, file_name: &str, fields: &HashMap<String, String>) -> Result<()> {
        self.uploads.lock().unwrap().push(RecordedUpload {
            url: url.to_string(),
            image: image.to_path_buf(),
            file_name: file_name.to_string(),
            fields: fields.clone()
        });

        if let Some(message) = &self.failure {
            bail!("{message}");
        }

        Ok(())
    }
}
