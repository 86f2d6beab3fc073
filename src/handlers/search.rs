//! Translation of Dataverse search results into global search hits.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub label: Option<String>,
    pub description: Option<String>,
    pub link: String,
}

/// One hit per `data.items[]` entry of a Dataverse `/api/search` response.
///
/// `api_base` is the API root (ending in `api/`); links point at the
/// installation's web pages.
pub fn convert_to_global_search_response(response: &Value, api_base: &str) -> Result<Vec<SearchHit>> {
    let items = response
        .pointer("/data/items")
        .and_then(Value::as_array)
        .context("Search response has no data.items list")?;

    let site = api_base.strip_suffix("api/").unwrap_or(api_base);

    Ok(items
        .iter()
        .map(|item| SearchHit {
            label: item.get("name").and_then(Value::as_str).map(str::to_string),
            description: item.get("description").and_then(Value::as_str).map(str::to_string),
            link: item_link(item, site),
        })
        .collect())
}

fn item_link(item: &Value, site: &str) -> String {
    let text = |key: &str| item.get(key).and_then(Value::as_str).unwrap_or_default();

    match text("type") {
        "dataverse" => text("url").to_string(),
        "dataset" => format!("{}dataset.xhtml?persistentId={}", site, text("global_id")),
        "file" => format!("{}file.xhtml?persistentId={}", site, text("file_persistent_id")),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const API: &str = "https://entrepot.recherche.data.gouv.fr/api/";

    #[test]
    fn test_links_per_item_type() {
        let response = json!({"status": "OK", "data": {"items": [
            {"type": "dataverse", "name": "INRAE", "url": "https://entrepot.recherche.data.gouv.fr/dataverse/inrae"},
            {"type": "dataset", "name": "Soil", "description": "Soil cores", "global_id": "doi:10.15454/DOWA7X"},
            {"type": "file", "name": "cores.tab", "file_persistent_id": "doi:10.15454/DOWA7X/A1"},
            {"type": "unknown", "name": "?"}
        ]}});

        let hits = convert_to_global_search_response(&response, API).unwrap();
        assert_eq!(hits.len(), 4);
        assert_eq!(hits[0].link, "https://entrepot.recherche.data.gouv.fr/dataverse/inrae");
        assert_eq!(
            hits[1],
            SearchHit {
                label: Some("Soil".to_string()),
                description: Some("Soil cores".to_string()),
                link: "https://entrepot.recherche.data.gouv.fr/dataset.xhtml?persistentId=doi:10.15454/DOWA7X"
                    .to_string(),
            }
        );
        assert_eq!(
            hits[2].link,
            "https://entrepot.recherche.data.gouv.fr/file.xhtml?persistentId=doi:10.15454/DOWA7X/A1"
        );
        assert_eq!(hits[3].link, "");
        assert_eq!(hits[2].description, None);
    }

    #[test]
    fn test_missing_items_is_an_error() {
        assert!(convert_to_global_search_response(&json!({"status": "ERROR"}), API).is_err());
    }
}
