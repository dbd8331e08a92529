use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Item, ItemId, ListNumber};

pub const DEFAULT_LISTS_URL: &str = "https://apis.ccbp.in/list-creation/lists";

/// Body returned by the lists endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListsResponse {
    pub lists: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct RawListsResponse {
    lists: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    id: RawItemId,
    name: String,
    description: String,
    list_number: i64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawItemId {
    Text(String),
    Number(i64),
}

impl From<RawItemId> for ItemId {
    fn from(value: RawItemId) -> Self {
        match value {
            RawItemId::Text(text) => ItemId(text),
            RawItemId::Number(number) => ItemId(number.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("invalid lists payload: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("duplicate item id {0} in lists payload")]
    DuplicateId(ItemId),
}

/// Decodes and validates a lists payload. Ids may arrive as strings or
/// integers; both are normalised to string ids.
pub fn decode_lists_payload(bytes: &[u8]) -> Result<ListsResponse, PayloadError> {
    let raw: RawListsResponse = serde_json::from_slice(bytes)?;
    let mut seen = HashSet::with_capacity(raw.lists.len());
    let mut lists = Vec::with_capacity(raw.lists.len());

    for entry in raw.lists {
        let id = ItemId::from(entry.id);
        if !seen.insert(id.clone()) {
            return Err(PayloadError::DuplicateId(id));
        }
        lists.push(Item {
            id,
            name: entry.name,
            description: entry.description,
            list_number: ListNumber(entry.list_number),
        });
    }

    Ok(ListsResponse { lists })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_string_and_numeric_ids() {
        let body = br#"{"lists":[
            {"id":"a","name":"A","description":"first","list_number":1},
            {"id":7,"name":"B","description":"second","list_number":2,"extra":true}
        ]}"#;

        let decoded = decode_lists_payload(body).expect("decode");
        assert_eq!(decoded.lists.len(), 2);
        assert_eq!(decoded.lists[0].id, ItemId::new("a"));
        assert_eq!(decoded.lists[1].id, ItemId::new("7"));
        assert_eq!(decoded.lists[1].list_number, ListNumber(2));
    }

    #[test]
    fn rejects_missing_lists_array() {
        let err = decode_lists_payload(br#"{"items":[]}"#).expect_err("must fail");
        assert!(matches!(err, PayloadError::Shape(_)));

        let err = decode_lists_payload(br#"{"lists":{}}"#).expect_err("must fail");
        assert!(matches!(err, PayloadError::Shape(_)));

        let err = decode_lists_payload(b"[]").expect_err("must fail");
        assert!(matches!(err, PayloadError::Shape(_)));
    }

    #[test]
    fn rejects_items_missing_fields() {
        let body = br#"{"lists":[{"id":"a","name":"A","list_number":1}]}"#;
        assert!(decode_lists_payload(body).is_err());

        let body = br#"{"lists":[{"id":"a","name":"A","description":"x","list_number":"1"}]}"#;
        assert!(decode_lists_payload(body).is_err());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let body = br#"{"lists":[
            {"id":"a","name":"A","description":"","list_number":1},
            {"id":"a","name":"A again","description":"","list_number":2}
        ]}"#;

        let err = decode_lists_payload(body).expect_err("must fail");
        assert!(matches!(err, PayloadError::DuplicateId(id) if id == ItemId::new("a")));
    }

    #[test]
    fn accepts_empty_lists_array() {
        let decoded = decode_lists_payload(br#"{"lists":[]}"#).expect("decode");
        assert!(decoded.lists.is_empty());
    }
}
