use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::state::pagination::{PageLinks, PageSnapshot};

/// Query string of list and delete routes.
///
/// `page` stays a raw string: anything that is not a positive integer triggers a
/// redirect to the first page instead of a 400.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Requested page, raw.
    pub page: Option<String>,
    /// Rows per page; the configured default when absent.
    pub limit: Option<u32>,
    /// `field,ASC` or `field,DESC`; the configured default when absent.
    pub sort: Option<String>,
}

/// One page of a collection.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    /// Rows of the page.
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
    /// Page shown.
    pub page: u32,
    /// Number of pages, at least one.
    pub page_count: u32,
    /// Paginator targets.
    pub links: PageLinks,
}

impl From<PageSnapshot<Value>> for PageResponse {
    fn from(snapshot: PageSnapshot<Value>) -> Self {
        Self {
            links: PageLinks::new(snapshot.page, snapshot.total_pages),
            data: snapshot.items,
            page: snapshot.page,
            page_count: snapshot.total_pages,
        }
    }
}

/// Result of a delete issued from a list page.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    /// The page as it reads after the deletion.
    pub page: PageResponse,
    /// Set when the page the delete was issued from no longer exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigate_to: Option<u32>,
    /// Set when the record was deleted but the page could not be read back; reload it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_error: Option<String>,
}

/// Query string of the suggestion routes.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SuggestionParams {
    /// Label prefix typed in the picker, case-insensitive.
    #[serde(default)]
    pub q: String,
}
