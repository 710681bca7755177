//! Firestore listing store.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use drivex_core::ListingId;

use super::codec::{decode_listing, encode_listing};
use super::{FirebaseBackend, parse_json, read_body};
use crate::backend::{BackendError, ListingField, ListingQuery, ListingStore};
use crate::models::{ListingFields, ListingRecord};

const SERVICE: &str = "firestore";

/// One element of a `runQuery` response stream.
#[derive(Debug, Deserialize)]
struct RunQueryItem {
    #[serde(default)]
    document: Option<Value>,
}

fn field_filter(field: ListingField, op: &str, value: &str) -> Value {
    json!({
        "fieldFilter": {
            "field": { "fieldPath": field.as_str() },
            "op": op,
            "value": { "stringValue": value },
        }
    })
}

/// Decode the documents of a `runQuery` response, skipping malformed ones.
fn decode_documents(items: &[RunQueryItem]) -> Vec<ListingRecord> {
    items
        .iter()
        .filter_map(|item| item.document.as_ref())
        .filter_map(|document| match decode_listing(document) {
            Ok(record) => Some(record),
            Err(e) => {
                let name = document.get("name").and_then(Value::as_str);
                warn!(error = %e, document = ?name, "Skipping undecodable listing document");
                None
            }
        })
        .collect()
}

/// Build the `structuredQuery` for a listing query.
pub(super) fn structured_query(collection: &str, query: &ListingQuery) -> Value {
    let from = json!([{ "collectionId": collection }]);
    match query {
        ListingQuery::Recent => json!({
            "from": from,
            "orderBy": [{
                "field": { "fieldPath": ListingField::CreatedAt.as_str() },
                "direction": "DESCENDING",
            }],
        }),
        ListingQuery::Equals { field, value } => json!({
            "from": from,
            "where": field_filter(*field, "EQUAL", value),
        }),
        ListingQuery::Range { field, start, end } => json!({
            "from": from,
            "where": {
                "compositeFilter": {
                    "op": "AND",
                    "filters": [
                        field_filter(*field, "GREATER_THAN_OR_EQUAL", start),
                        field_filter(*field, "LESS_THAN_OR_EQUAL", end),
                    ],
                }
            },
        }),
    }
}

impl FirebaseBackend {
    fn documents_url(&self) -> String {
        let config = self.config();
        format!(
            "{}/v1/projects/{}/databases/(default)/documents",
            config.firestore_url.as_str().trim_end_matches('/'),
            config.project_id
        )
    }

    fn document_url(&self, id: &ListingId) -> String {
        format!(
            "{}/{}/{}",
            self.documents_url(),
            self.inner.collection,
            urlencoding::encode(id.as_str())
        )
    }

    async fn fetch_document(&self, id: &ListingId) -> Result<Option<ListingRecord>, BackendError> {
        let url = self.document_url(id);
        let request = self.authorized(self.client().get(url)).await;
        let response = request.send().await?;
        match read_body(response, SERVICE).await {
            Ok(body) => Ok(Some(decode_listing(&parse_json(&body)?)?)),
            Err(BackendError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl ListingStore for FirebaseBackend {
    #[instrument(skip(self))]
    async fn query(&self, query: &ListingQuery) -> Result<Vec<ListingRecord>, BackendError> {
        let body = json!({ "structuredQuery": structured_query(&self.inner.collection, query) });
        let url = format!("{}:runQuery", self.documents_url());
        let request = self.authorized(self.client().post(url)).await.json(&body);

        let text = read_body(request.send().await?, SERVICE).await?;
        let items: Vec<RunQueryItem> = parse_json(&text)?;

        let records = decode_documents(&items);

        debug!(count = records.len(), "Firestore query");
        Ok(records)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get(&self, id: &ListingId) -> Result<Option<ListingRecord>, BackendError> {
        if id.is_empty() {
            return Ok(None);
        }

        let Some(cache) = &self.inner.details else {
            return self.fetch_document(id).await;
        };

        if let Some(record) = cache.get(id).await {
            debug!("Cache hit for listing");
            return Ok(Some(record));
        }

        let record = self.fetch_document(id).await?;
        if let Some(record) = &record {
            cache.insert(id.clone(), record.clone()).await;
        }
        Ok(record)
    }

    #[instrument(skip(self, fields), fields(name = %fields.name))]
    async fn create(&self, fields: &ListingFields) -> Result<ListingRecord, BackendError> {
        let body = json!({ "fields": encode_listing(fields)? });
        let url = format!("{}/{}", self.documents_url(), self.inner.collection);
        let request = self
            .require_auth(self.client().post(url))
            .await?
            .json(&body);

        let text = read_body(request.send().await?, SERVICE).await?;
        let record = decode_listing(&parse_json(&text)?)?;
        debug!(id = %record.id, "Listing document created");
        Ok(record)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: &ListingId) -> Result<(), BackendError> {
        let url = self.document_url(id);
        let request = self.require_auth(self.client().delete(url)).await?;
        read_body(request.send().await?, SERVICE).await?;

        if let Some(cache) = &self.inner.details {
            cache.invalidate(id).await;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::backend::firebase::tests::backend;

    #[test]
    fn test_recent_orders_by_created_desc() {
        let query = structured_query("vehicles", &ListingQuery::Recent);
        assert_eq!(query["from"][0]["collectionId"], "vehicles");
        assert_eq!(query["orderBy"][0]["field"]["fieldPath"], "created");
        assert_eq!(query["orderBy"][0]["direction"], "DESCENDING");
        assert!(query.get("where").is_none());
    }

    #[test]
    fn test_equals_filter() {
        let query = structured_query(
            "vehicles",
            &ListingQuery::Equals {
                field: ListingField::BodyType,
                value: "SUV".to_string(),
            },
        );
        let filter = &query["where"]["fieldFilter"];
        assert_eq!(filter["field"]["fieldPath"], "body");
        assert_eq!(filter["op"], "EQUAL");
        assert_eq!(filter["value"]["stringValue"], "SUV");
    }

    #[test]
    fn test_range_filter_is_inclusive() {
        let query = structured_query(
            "vehicles",
            &ListingQuery::Range {
                field: ListingField::SearchName,
                start: "FE".to_string(),
                end: "FE\u{f8ff}".to_string(),
            },
        );
        let filters = &query["where"]["compositeFilter"]["filters"];
        assert_eq!(filters[0]["fieldFilter"]["op"], "GREATER_THAN_OR_EQUAL");
        assert_eq!(filters[1]["fieldFilter"]["op"], "LESS_THAN_OR_EQUAL");
        let end = &filters[1]["fieldFilter"]["value"]["stringValue"];
        assert_eq!(end, "FE\u{f8ff}");
    }

    #[test]
    fn test_document_url_encodes_id() {
        let backend = backend(Duration::ZERO);
        assert_eq!(
            backend.document_url(&ListingId::new("a/b")),
            "http://127.0.0.1:9/v1/projects/drive-test/databases/(default)/documents/vehicles/a%2Fb"
        );
    }

    #[test]
    fn test_malformed_documents_are_skipped() {
        let items: Vec<RunQueryItem> = serde_json::from_value(json!([
            { "readTime": "2024-01-01T00:00:00Z" },
            { "document": {
                "name": "projects/p/databases/(default)/documents/vehicles/good",
                "fields": { "name": { "stringValue": "GOL" } }
            } },
            { "document": {
                "name": "projects/p/databases/(default)/documents/vehicles/bad",
                "fields": { "name": { "geoPointValue": {} } }
            } },
            { "document": { "fields": {} } }
        ]))
        .unwrap();

        let records = decode_documents(&items);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_str(), "good");
        assert_eq!(records[0].fields.name, "GOL");
    }

    #[tokio::test]
    async fn test_writes_require_sign_in() {
        let backend = backend(Duration::ZERO);
        assert!(matches!(
            backend.create(&ListingFields::default()).await,
            Err(BackendError::Unauthenticated)
        ));
        assert!(matches!(
            ListingStore::delete(&backend, &ListingId::new("x")).await,
            Err(BackendError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_get_empty_id_is_none() {
        let backend = backend(Duration::ZERO);
        assert!(backend.get(&ListingId::default()).await.unwrap().is_none());
    }
}
