//! Firestore typed-value encoding.
//!
//! Firestore's REST API wraps every value in a type tag
//! (`{"stringValue": "..."}`, `{"integerValue": "42"}`, ...). Listing bodies
//! are converted through plain `serde_json` values so that the serde field
//! names in [`ListingFields`] stay the single source of truth.

use serde_json::{Map, Number, Value, json};

use drivex_core::ListingId;

use crate::backend::{BackendError, ListingField};
use crate::models::{ListingFields, ListingRecord};

/// Encode a plain JSON value as a Firestore value.
#[must_use]
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                json!({ "integerValue": n.to_string() })
            } else {
                json!({ "doubleValue": n })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_map(map) } }),
    }
}

fn encode_map(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect()
}

/// Encode a listing body as a Firestore `fields` map.
///
/// # Errors
///
/// Returns `BackendError::Parse` if the body does not serialize to an object.
pub fn encode_listing(fields: &ListingFields) -> Result<Map<String, Value>, BackendError> {
    let Value::Object(plain) = serde_json::to_value(fields)? else {
        return Err(BackendError::Parse(
            "listing did not serialize to an object".to_string(),
        ));
    };
    let mut encoded = encode_map(&plain);
    // The creation time must be a native timestamp so it orders correctly.
    let created = ListingField::CreatedAt.as_str();
    if let Some(Value::String(ts)) = plain.get(created) {
        encoded.insert(created.to_string(), json!({ "timestampValue": ts }));
    }
    Ok(encoded)
}

/// Decode a Firestore value into plain JSON.
///
/// # Errors
///
/// Returns `BackendError::Parse` for unknown type tags or malformed integers.
pub fn decode_value(value: &Value) -> Result<Value, BackendError> {
    let Some((tag, inner)) = value.as_object().and_then(|obj| obj.iter().next()) else {
        return Err(BackendError::Parse(format!("untyped value: {value}")));
    };
    match tag.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" | "doubleValue" | "stringValue" | "timestampValue" | "referenceValue" => {
            Ok(inner.clone())
        }
        "integerValue" => {
            let raw = inner
                .as_str()
                .map_or_else(|| inner.to_string(), str::to_string);
            raw.parse::<i64>()
                .map(|n| Value::Number(Number::from(n)))
                .map_err(|e| BackendError::Parse(format!("integerValue {raw}: {e}")))
        }
        "arrayValue" => {
            let items = inner.get("values").and_then(Value::as_array);
            let values = items
                .into_iter()
                .flatten()
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(values))
        }
        "mapValue" => {
            let fields = inner.get("fields").and_then(Value::as_object);
            Ok(Value::Object(decode_fields(fields)?))
        }
        other => {
            let message = format!("unsupported value type {other}");
            Err(BackendError::Parse(message))
        }
    }
}

/// Null fields are dropped so the listing body falls back to its defaults.
fn decode_fields(fields: Option<&Map<String, Value>>) -> Result<Map<String, Value>, BackendError> {
    let mut decoded = Map::new();
    for (key, value) in fields.into_iter().flatten() {
        match decode_value(value)? {
            Value::Null => {}
            plain => {
                decoded.insert(key.clone(), plain);
            }
        }
    }
    Ok(decoded)
}

/// Id of a document from its resource name
/// (`projects/{p}/databases/(default)/documents/{collection}/{id}`).
#[must_use]
pub fn document_id(name: &str) -> ListingId {
    ListingId::new(name.rsplit('/').next().unwrap_or_default())
}

/// Decode a Firestore document resource into a listing.
///
/// # Errors
///
/// Returns `BackendError::Parse` if the document is malformed.
pub fn decode_listing(document: &Value) -> Result<ListingRecord, BackendError> {
    let name = document
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| BackendError::Parse("document without name".to_string()))?;
    let fields = decode_fields(document.get("fields").and_then(Value::as_object))?;
    let body: ListingFields = serde_json::from_value(Value::Object(fields))?;
    Ok(ListingRecord::new(document_id(name), body))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::ImageReference;

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode_value(&json!("a")), json!({ "stringValue": "a" }));
        assert_eq!(encode_value(&json!(42)), json!({ "integerValue": "42" }));
        assert_eq!(encode_value(&json!(1.5)), json!({ "doubleValue": 1.5 }));
        assert_eq!(encode_value(&json!(true)), json!({ "booleanValue": true }));
        assert_eq!(
            encode_value(&json!([])),
            json!({ "arrayValue": { "values": [] } })
        );
    }

    #[test]
    fn test_decode_missing_array_values() {
        let decoded = decode_value(&json!({ "arrayValue": {} })).unwrap();
        assert_eq!(decoded, json!([]));
    }

    #[test]
    fn test_decode_rejects_unknown_tag() {
        assert!(decode_value(&json!({ "geoPointValue": {} })).is_err());
    }

    #[test]
    fn test_listing_created_is_timestamp() {
        let fields = ListingFields {
            name: "FIAT".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            images: vec![ImageReference {
                uid: "u1".into(),
                name: "n1".to_string(),
                url: "https://x/y".to_string(),
            }],
            ..ListingFields::default()
        };
        let encoded = encode_listing(&fields).unwrap();
        assert!(encoded["created"].get("timestampValue").is_some());
        assert_eq!(encoded["name"], json!({ "stringValue": "FIAT" }));
        let image = &encoded["images"]["arrayValue"]["values"][0]["mapValue"]["fields"];
        assert_eq!(image["url"], json!({ "stringValue": "https://x/y" }));
    }

    #[test]
    fn test_decode_document() {
        let doc = json!({
            "name": "projects/p/databases/(default)/documents/vehicles/AbC123",
            "fields": {
                "name": { "stringValue": "FERRARI" },
                "price": { "integerValue": "5550000" },
                "km": { "stringValue": "23.000km" },
                "created": { "timestampValue": "2023-08-05T10:00:00Z" },
                "images": { "arrayValue": { "values": [
                    { "mapValue": { "fields": {
                        "uid": { "stringValue": "u1" },
                        "name": { "stringValue": "img" },
                        "url": { "stringValue": "https://cdn/img" }
                    } } }
                ] } }
            }
        });
        let record = decode_listing(&doc).unwrap();
        assert_eq!(record.id.as_str(), "AbC123");
        assert_eq!(record.fields.name, "FERRARI");
        assert_eq!(record.fields.price_label(), "R$ 5.550.000,00");
        assert_eq!(record.fields.images.len(), 1);
        assert_eq!(
            record.fields.created_at,
            Utc.with_ymd_and_hms(2023, 8, 5, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_decode_null_fields_use_defaults() {
        let doc = json!({
            "name": "projects/p/databases/(default)/documents/vehicles/N1",
            "fields": {
                "name": { "stringValue": "GOL" },
                "vehicleOwner": { "nullValue": null },
                "images": { "arrayValue": { "values": [
                    { "mapValue": { "fields": {
                        "uid": { "stringValue": "u1" },
                        "name": { "nullValue": null },
                        "url": { "stringValue": "https://cdn/img" }
                    } } }
                ] } }
            }
        });
        let record = decode_listing(&doc).unwrap();
        assert_eq!(record.fields.name, "GOL");
        assert_eq!(record.fields.owner_name, "");
        assert_eq!(record.fields.images[0].name, "");
        assert_eq!(record.fields.images[0].url, "https://cdn/img");
    }
}
