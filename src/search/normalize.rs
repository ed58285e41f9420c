use log::debug;
use serde_json::Value;

use crate::state::{Creator, CreatorPage};

/// Coerces a provider payload into a [`CreatorPage`].
///
/// Missing or mistyped fields fall back to an empty list, `0` and `false`.
/// Creators that do not decode are dropped.
pub fn normalize_page(payload: &Value) -> CreatorPage {
    let creators = match payload.get("creators") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match serde_json::from_value::<Creator>(item.clone()) {
                Ok(c) => Some(c),
                Err(e) => {
                    debug!("Skipping malformed creator entry: {}", e);
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    let total_count = payload
        .get("totalCount")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    let has_more = payload
        .get("hasMore")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    CreatorPage {
        creators,
        total_count,
        has_more,
    }
}
