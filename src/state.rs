use serde::{Deserialize, Deserializer, Serialize};

/// User-facing message for every failed search. The cause is only logged.
pub const SEARCH_FAILED_MESSAGE: &str = "Failed to search creators. Please try again.";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub follower_count: Option<u64>,
}

// Nullable text columns come back as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatorPage {
    pub creators: Vec<Creator>,
    pub total_count: u64,
    pub has_more: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum SearchState {
    #[default]
    Idle,
    Loading {
        query: String,
    },
    Success {
        query: String,
        page: CreatorPage,
    },
    Error {
        query: String,
        message: String,
    },
}

impl SearchState {
    /// Creators currently on display. Empty outside of `Success`.
    pub fn results(&self) -> &[Creator] {
        match self {
            Self::Success { page, .. } => &page.creators,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creator(id: &str) -> Creator {
        Creator {
            id: id.into(),
            name: format!("Creator {}", id),
            description: String::new(),
            avatar: None,
            verified: None,
            follower_count: None,
        }
    }

    #[test]
    fn test_results_only_in_success() {
        let page = CreatorPage {
            creators: vec![creator("1"), creator("2")],
            total_count: 2,
            has_more: false,
        };
        let success = SearchState::Success { query: "ade".into(), page };
        assert_eq!(success.results().len(), 2);

        let loading = SearchState::Loading { query: "ade".into() };
        assert!(loading.results().is_empty());
        assert!(loading.is_loading());
        assert_eq!(SearchState::default(), SearchState::Idle);
    }

    #[test]
    fn test_creator_camel_case_fields() {
        let json = serde_json::json!({
            "id": "7",
            "name": "Tems",
            "description": "Singer",
            "avatar": "https://cdn.example.com/tems.png",
            "verified": true,
            "followerCount": 1200
        });
        let c: Creator = serde_json::from_value(json).unwrap();
        assert_eq!(c.follower_count, Some(1200));
        assert_eq!(c.verified, Some(true));
        assert_eq!(c.avatar.as_deref(), Some("https://cdn.example.com/tems.png"));
    }

    #[test]
    fn test_creator_optional_fields_missing() {
        let json = serde_json::json!({ "id": "1", "name": "Aaron Amick" });
        let c: Creator = serde_json::from_value(json).unwrap();
        assert!(c.description.is_empty());
        assert!(c.avatar.is_none());
        assert!(c.verified.is_none());
        assert!(c.follower_count.is_none());
    }

    #[test]
    fn test_creator_null_fields() {
        let json = serde_json::json!({
            "id": "1",
            "name": "Asa",
            "description": null,
            "avatar": null,
            "verified": null,
            "followerCount": null
        });
        let c: Creator = serde_json::from_value(json).unwrap();
        assert!(c.description.is_empty());
        assert!(c.avatar.is_none());
        assert!(c.verified.is_none());
        assert!(c.follower_count.is_none());
    }
}
