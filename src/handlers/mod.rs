pub mod search;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::config::{DataverseSettings, OutputFormat};
use crate::core::DatasetMapper;
use crate::utils::serialization::{archive_file_name, export_file_name};

pub use search::{convert_to_global_search_response, SearchHit};

/// Anything that can hand out the native-API metadata of a dataset.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    async fn fetch_metadata(&self, persistent_id: &str) -> Result<Value>;
}

/// Client for the native API of a Dataverse installation.
pub struct DataverseClient {
    client: reqwest::Client,
    api_base: Url,
}

impl DataverseClient {
    pub fn new(base_url: &str, timeout: u64, accept_invalid_certs: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .context("Failed to create HTTP client")?;

        let root = format!("{}/", base_url.trim_end_matches('/'));
        let api_base = Url::parse(&root)
            .and_then(|root| root.join("api/"))
            .with_context(|| format!("Invalid Dataverse base URL: {}", base_url))?;

        Ok(Self { client, api_base })
    }

    pub fn from_settings(settings: &DataverseSettings) -> Result<Self> {
        Self::new(
            &settings.base_url,
            settings.timeout,
            settings.accept_invalid_certs,
        )
    }

    /// API root, always ending in `api/`.
    pub fn api_base(&self) -> &str {
        self.api_base.as_str()
    }

    async fn send(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        accept: &'static str,
    ) -> Result<reqwest::Response> {
        let url = self
            .api_base
            .join(endpoint)
            .with_context(|| format!("Invalid API endpoint: {}", endpoint))?;
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, accept)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to query Dataverse: {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Dataverse API error {}: {}", status, error_text);
        }

        Ok(response)
    }

    async fn get_json(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Value> {
        self.send(endpoint, query, "application/json")
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse Dataverse response from {}", endpoint))
    }

    /// The `data` member of `GET api/datasets/:persistentId/`.
    pub async fn get_dataset_metadata(&self, persistent_id: &str) -> Result<Value> {
        let mut payload = self
            .get_json("datasets/:persistentId/", &[("persistentId", persistent_id)])
            .await?;

        payload
            .get_mut("data")
            .map(Value::take)
            .with_context(|| format!("No data returned for dataset {}", persistent_id))
    }

    /// Raw search response listing every published dataset.
    pub async fn get_all_datasets(&self) -> Result<Value> {
        self.get_json("search/", &[("q", "*"), ("type", "dataset")]).await
    }

    /// Zip archive of every file of a dataset, from
    /// `GET api/access/dataset/:persistentId/`.
    pub async fn download_dataset(&self, persistent_id: &str) -> Result<Vec<u8>> {
        let download_name = archive_file_name(persistent_id);
        let archive = self
            .send(
                "access/dataset/:persistentId/",
                &[("persistentId", persistent_id), ("download_name", download_name.as_str())],
                "*/*",
            )
            .await?
            .bytes()
            .await
            .with_context(|| format!("Failed to read archive of dataset {}", persistent_id))?;

        info!("Downloaded {} bytes for dataset {}", archive.len(), persistent_id);
        Ok(archive.to_vec())
    }

    pub async fn global_search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let response = self.get_json("search/", &[("q", query)]).await?;
        convert_to_global_search_response(&response, self.api_base())
    }
}

#[async_trait]
impl DatasetSource for DataverseClient {
    async fn fetch_metadata(&self, persistent_id: &str) -> Result<Value> {
        self.get_dataset_metadata(persistent_id).await
    }
}

/// Fetch one dataset, map it, and write it under `directory`.
///
/// Returns the path of the written file, named after the persistent id.
pub async fn export_dataset<S: DatasetSource + ?Sized>(
    source: &S,
    mapper: &DatasetMapper,
    persistent_id: &str,
    directory: &Path,
    format: &OutputFormat,
) -> Result<PathBuf> {
    let metadata = source.fetch_metadata(persistent_id).await?;
    let result = mapper
        .run(&metadata, persistent_id)
        .with_context(|| format!("Failed to map dataset {}", persistent_id))?;

    tokio::fs::create_dir_all(directory)
        .await
        .with_context(|| format!("Failed to create output directory: {}", directory.display()))?;

    let path = directory.join(export_file_name(persistent_id, format));
    let graph = result.graph;
    let format = *format;
    let target = path.clone();
    let triples = graph.len();
    tokio::task::spawn_blocking(move || graph.export_to_file(&target, &format))
        .await
        .context("Export task failed")??;

    info!(
        "Dataset {} exported to {} ({} triples)",
        persistent_id,
        path.display(),
        triples
    );
    Ok(path)
}
