//! Resource Resolver & Policy Accessor (§4.2).
//!
//! Looks resources up in the `tables_index` table and reads their
//! optional index-policy record from `resources_exceptions`. Both are
//! thin GETs against PostgREST — grounded on
//! `DataAccessor.get_resource`/`get_potential_indexes` in the
//! distilled-from source's data access layer.

use crate::error::ClientError;
use std::collections::BTreeSet;
use tabular_common::model::{Column, ColumnType, Resource, Schema};

#[derive(Clone)]
pub struct Resolver {
    http: reqwest::Client,
    base_url: String,
}

impl Resolver {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Looks up `resource_id`, selecting `columns` plus `deleted_at`
    /// and `dataset_id` (deduplicated), ordered by `created_at desc`,
    /// taking the first record.
    pub async fn resolve(&self, resource_id: &str, columns: &[&str]) -> Result<Resource, ClientError> {
        let mut select: Vec<&str> = columns.to_vec();
        if !select.contains(&"deleted_at") {
            select.push("deleted_at");
        }
        if !select.contains(&"dataset_id") {
            select.push("dataset_id");
        }
        let url = format!(
            "{}/tables_index?select={}&resource_id=eq.{}&order=created_at.desc&limit=1",
            self.base_url,
            select.join(","),
            resource_id
        );
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.json().await.unwrap_or(serde_json::Value::Null);
            return Err(ClientError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        let body: serde_json::Value = response.json().await?;
        let record = body
            .as_array()
            .and_then(|rows| rows.first())
            .ok_or_else(|| ClientError::NotFound(resource_id.to_string()))?;

        parse_resource(resource_id, record)
    }

    /// Reads the index-policy exception record, if any. An absent
    /// record and an empty `table_indexes` mapping both resolve to
    /// `None` (no restriction) — the spec treats them identically.
    pub async fn index_policy(
        &self,
        resource_id: &str,
    ) -> Result<Option<BTreeSet<String>>, ClientError> {
        let url = format!(
            "{}/resources_exceptions?select=table_indexes&resource_id=eq.{}",
            self.base_url, resource_id
        );
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.json().await.unwrap_or(serde_json::Value::Null);
            return Err(ClientError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        let body: serde_json::Value = response.json().await?;
        let record = match body.as_array().and_then(|rows| rows.first()) {
            Some(record) => record,
            None => return Ok(None),
        };
        let indexes = match record.get("table_indexes").and_then(|v| v.as_object()) {
            Some(map) if !map.is_empty() => map.keys().cloned().collect::<BTreeSet<_>>(),
            _ => return Ok(None),
        };
        Ok(Some(indexes))
    }
}

fn parse_resource(resource_id: &str, record: &serde_json::Value) -> Result<Resource, ClientError> {
    let deleted_at: Option<chrono::DateTime<chrono::Utc>> = record
        .get("deleted_at")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok());
    let dataset_id = record
        .get("dataset_id")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    if let Some(deleted_at) = deleted_at {
        let dataset_note = match &dataset_id {
            Some(id) => format!(
                " by its producer. You can find more information about this resource at \
                 https://www.data.gouv.fr/datasets/{id}"
            ),
            None => " by its producer. Contact the resource producer to get more information.".to_string(),
        };
        return Err(ClientError::Gone {
            resource_id: resource_id.to_string(),
            deleted_at: format_timestamp(record.get("deleted_at")),
            dataset_note,
        });
    }

    let created_at = record
        .get("created_at")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(chrono_now);
    let url = record
        .get("url")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let parsing_table = record
        .get("parsing_table")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let profile = parse_profile(record.get("profile"));

    Ok(Resource {
        resource_id: resource_id.to_string(),
        created_at,
        url,
        parsing_table,
        profile,
        deleted_at: None,
        dataset_id,
    })
}

fn parse_profile(profile: Option<&serde_json::Value>) -> Schema {
    let columns = match profile.and_then(|p| p.get("columns")).and_then(|c| c.as_object()) {
        Some(columns) => columns,
        None => return Schema::new(),
    };
    columns
        .iter()
        .map(|(name, meta)| {
            let python_type = meta.get("python_type").and_then(|v| v.as_str()).unwrap_or("string");
            Column {
                name: name.clone(),
                type_: ColumnType::from_python_type(python_type),
            }
        })
        .collect()
}

fn format_timestamp(value: Option<&serde_json::Value>) -> String {
    value.and_then(|v| v.as_str()).unwrap_or("an unknown date").to_string()
}

fn chrono_now() -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::<chrono::Utc>::from_timestamp(0, 0).expect("epoch is always representable")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_profile_columns() {
        let profile = json!({
            "columns": {
                "age": {"python_type": "int"},
                "name": {"python_type": "string"}
            }
        });
        let schema = parse_profile(Some(&profile));
        assert_eq!(schema.len(), 2);
        assert!(schema.iter().any(|c| c.name == "age" && c.type_ == ColumnType::Int));
    }

    #[test]
    fn gone_message_includes_dataset_link() {
        let record = json!({
            "deleted_at": "2024-01-01T00:00:00Z",
            "dataset_id": "abc123",
            "parsing_table": "t"
        });
        let err = parse_resource("rid", &record).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("rid"));
        assert!(message.contains("2024-01-01T00:00:00Z"));
        match err {
            ClientError::Gone { dataset_note, .. } => {
                assert!(dataset_note.contains("abc123"));
            }
            other => panic!("expected Gone, got {other:?}"),
        }
    }

    #[test]
    fn gone_message_without_dataset_id_asks_to_contact_producer() {
        let record = json!({"deleted_at": "2024-01-01T00:00:00Z", "parsing_table": "t"});
        let err = parse_resource("rid", &record).unwrap_err();
        match err {
            ClientError::Gone { dataset_note, .. } => {
                assert!(dataset_note.contains("Contact the resource producer"));
            }
            other => panic!("expected Gone, got {other:?}"),
        }
    }
}
