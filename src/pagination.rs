//! Cursor pagination primitives.
//!
//! Endpoint modules embed [`CursorPagination`] in their option structs and
//! decode [`CursorPaginationMeta`] from the `meta` object of list responses.
//! Iterating over pages is left to the caller.

use serde::{Deserialize, Serialize};

/// Request-side cursor parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPagination {
    /// Number of results per page. Most endpoints accept up to 100.
    #[serde(rename = "page[size]", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    /// Cursor of the next page.
    #[serde(rename = "page[after]", skip_serializing_if = "Option::is_none")]
    pub page_after: Option<String>,

    /// Cursor of the previous page.
    #[serde(rename = "page[before]", skip_serializing_if = "Option::is_none")]
    pub page_before: Option<String>,
}

impl CursorPagination {
    pub fn with_size(page_size: u32) -> Self {
        Self {
            page_size: Some(page_size),
            ..Default::default()
        }
    }

    /// Parameters for the page following `meta`, or `None` on the last page.
    pub fn next(&self, meta: &CursorPaginationMeta) -> Option<Self> {
        if !meta.has_more {
            return None;
        }
        let after = meta.after_cursor.clone()?;
        Some(Self {
            page_size: self.page_size,
            page_after: Some(after),
            page_before: None,
        })
    }
}

/// Response-side cursor metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorPaginationMeta {
    /// True when more results exist after this page.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub has_more: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_cursor: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_cursor: Option<String>,
}
