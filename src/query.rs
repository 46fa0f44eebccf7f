//! Query-string composition for endpoint option structs.

use serde::Serialize;

use crate::error::Result;

/// Appends the URL-encoded form of `opts` to `path`.
///
/// Option structs mark optional fields with
/// `#[serde(skip_serializing_if = "Option::is_none")]` so unset values never
/// reach the query string. When `opts` encodes to nothing the path is
/// returned unchanged; a path that already carries a query is extended.
pub fn add_options<T: Serialize + ?Sized>(path: &str, opts: &T) -> Result<String> {
    let query = serde_urlencoded::to_string(opts)?;
    if query.is_empty() {
        return Ok(path.to_string());
    }

    let separator = if path.contains('?') { '&' } else { '?' };
    Ok(format!("{}{}{}", path, separator, query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::pagination::CursorPagination;
    use std::collections::BTreeMap;

    #[derive(Serialize, Default)]
    struct ListTicketsOptions {
        #[serde(flatten)]
        page: CursorPagination,
        #[serde(skip_serializing_if = "Option::is_none")]
        sort_by: Option<String>,
    }

    #[test]
    fn test_add_options_encodes_cursor_fields() {
        let opts = CursorPagination {
            page_size: Some(50),
            page_after: Some("abc".to_string()),
            page_before: None,
        };
        let path = add_options("/tickets.json", &opts).unwrap();
        assert_eq!(path, "/tickets.json?page%5Bsize%5D=50&page%5Bafter%5D=abc");
    }

    #[test]
    fn test_add_options_empty_leaves_path_alone() {
        let path = add_options("/tickets.json", &CursorPagination::default()).unwrap();
        assert_eq!(path, "/tickets.json");
    }

    #[test]
    fn test_add_options_extends_existing_query() {
        let opts = ListTicketsOptions {
            sort_by: Some("updated_at".to_string()),
            ..Default::default()
        };
        let path = add_options("/search.json?query=open", &opts).unwrap();
        assert_eq!(path, "/search.json?query=open&sort_by=updated_at");
    }

    #[test]
    fn test_add_options_with_flattened_pagination() {
        let opts = ListTicketsOptions {
            page: CursorPagination::with_size(25),
            sort_by: Some("id".to_string()),
        };
        let path = add_options("/tickets.json", &opts).unwrap();
        assert_eq!(path, "/tickets.json?page%5Bsize%5D=25&sort_by=id");
    }

    #[test]
    fn test_add_options_map() {
        let mut opts = BTreeMap::new();
        opts.insert("include", "users");
        let path = add_options("/tickets/1.json", &opts).unwrap();
        assert_eq!(path, "/tickets/1.json?include=users");
    }

    #[test]
    fn test_add_options_rejects_scalar_options() {
        let result = add_options("/tickets.json", &42u32);
        assert!(matches!(result, Err(Error::Query(_))));
    }
}
