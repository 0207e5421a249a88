//! Content query models and the filter-to-query-parameter transform.

use serde::{Deserialize, Serialize};

use crate::api::ValidationError;

/// Sort direction, using the provider's numeric tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// The provider's wire token (`1` ascending, `-1` descending).
    pub fn token(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "1",
            SortDirection::Descending => "-1",
        }
    }

    /// Parse either the numeric wire token or a human-friendly name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1" | "asc" | "ascending" => Some(SortDirection::Ascending),
            "-1" | "desc" | "descending" => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

/// Which transcript sub-resource of a report to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Individual matched posts.
    Tweets,
    /// Matched accounts.
    Users,
}

impl ContentKind {
    pub fn path_segment(&self) -> &'static str {
        match self {
            ContentKind::Tweets => "tweets",
            ContentKind::Users => "users",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tweets" => Some(ContentKind::Tweets),
            "users" => Some(ContentKind::Users),
            _ => None,
        }
    }
}

/// Combine a sort field and direction into the provider's `field|direction`
/// token. Partial specifications yield nothing rather than an error; the
/// provider's default ordering applies.
pub fn sort_token(field: Option<&str>, direction: Option<SortDirection>) -> Option<String> {
    match (field, direction) {
        (Some(field), Some(direction)) => Some(format!("{}|{}", field, direction.token())),
        _ => None,
    }
}

/// Normalized shape of a paginated content request.
///
/// `filter` is the caller's single JSON-encoded object, e.g.
/// `{"counts.favorites":{"$gt":10}}`. It is parsed exactly once, when the
/// query is serialized to parameters; each top-level entry becomes one
/// `filter[<fieldPath>]` parameter whose value is the entry's value
/// re-encoded as a JSON string for the provider to parse server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentQuery {
    /// 1-based page number.
    pub page: Option<u32>,

    /// Items per page.
    pub per_page: Option<u32>,

    /// Field to sort by (only used together with `sort_direction`).
    pub sort_by: Option<String>,

    /// Sort direction (only used together with `sort_by`).
    pub sort_direction: Option<SortDirection>,

    /// JSON-encoded filter object, forwarded field by field.
    pub filter: Option<String>,
}

impl ContentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        self.sort_by = Some(field.into());
        self
    }

    pub fn sort_direction(mut self, direction: SortDirection) -> Self {
        self.sort_direction = Some(direction);
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Serialize to the provider's flat query-parameter list.
    ///
    /// This is the one client-side validation gate in the retrieval path: a
    /// filter string that is not a JSON object fails here with
    /// [`ValidationError::MalformedFilter`] before any network call is made.
    pub fn to_params(&self) -> Result<Vec<(String, String)>, ValidationError> {
        let mut params = Vec::new();

        if let Some(page) = self.page {
            params.push(("page".to_string(), page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            params.push(("perPage".to_string(), per_page.to_string()));
        }
        if let Some(sort) = sort_token(self.sort_by.as_deref(), self.sort_direction) {
            params.push(("sort".to_string(), sort));
        }

        if let Some(filter) = &self.filter {
            let entries: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(filter)
                    .map_err(|e| ValidationError::MalformedFilter(e.to_string()))?;

            for (path, expression) in &entries {
                if path.is_empty() {
                    return Err(ValidationError::MalformedFilter(
                        "empty filter field path".to_string(),
                    ));
                }
                let value = serde_json::to_string(expression)
                    .map_err(|e| ValidationError::MalformedFilter(e.to_string()))?;
                params.push((format!("filter[{path}]"), value));
            }
        }

        Ok(params)
    }
}
