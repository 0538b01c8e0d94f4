use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use crate::cpq::catalog::Catalog;
use crate::errors::{ApplicationError, DomainError};

/// Where the raw catalog document comes from. Fetching is the only asynchronous step.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<Value, ApplicationError>;
}

pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Value, ApplicationError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|error| {
            ApplicationError::CatalogSource(format!(
                "could not read catalog `{}`: {error}",
                self.path.display()
            ))
        })?;

        serde_json::from_str(&raw).map_err(|error| {
            DomainError::malformed(format!(
                "catalog `{}` is not valid JSON: {error}",
                self.path.display()
            ))
            .into()
        })
    }
}

/// Serves a document that is already in memory.
pub struct StaticCatalogSource {
    document: Value,
}

impl StaticCatalogSource {
    pub fn new(document: Value) -> Self {
        Self { document }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    fn describe(&self) -> String {
        "in-memory".to_string()
    }

    async fn fetch(&self) -> Result<Value, ApplicationError> {
        Ok(self.document.clone())
    }
}

/// Fetches once and parses. Either a complete catalog or an error; nothing partial.
pub async fn load_catalog(source: &dyn CatalogSource) -> Result<Catalog, ApplicationError> {
    let document = source.fetch().await?;

    match Catalog::load(&document) {
        Ok(catalog) => {
            tracing::info!(
                event_name = "catalog.loaded",
                source = %source.describe(),
                categories = catalog.categories().len(),
                products = catalog.len(),
                "catalog loaded"
            );
            Ok(catalog)
        }
        Err(error) => {
            tracing::warn!(
                event_name = "catalog.malformed",
                source = %source.describe(),
                error = %error,
                "catalog rejected"
            );
            Err(error.into())
        }
    }
}
