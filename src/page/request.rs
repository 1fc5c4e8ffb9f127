//! Page-request parsing and page-response construction.
//!
//! The limit default is one value, used everywhere. `has_next` is exact:
//! callers fetch `limit + 1` rows and this module trims the probe row.

use crate::error::Error;
use crate::page::Cursor;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const DEFAULT_LIMIT: u32 = 25;
pub const MAX_LIMIT: u32 = 100;

/// A parsed listing request using opaque cursors.
#[derive(Clone, Debug, PartialEq)]
pub struct PageRequest {
    pub limit: u32,
    /// Raw token as supplied; decoded by the store that knows the key flavor.
    pub cursor: Option<String>,
}

impl PageRequest {
    pub fn parse(limit: Option<&str>, cursor: Option<&str>) -> Result<Self, Error> {
        Ok(PageRequest {
            limit: parse_limit(limit)?,
            cursor: cursor.filter(|c| !c.is_empty()).map(String::from),
        })
    }

    pub fn first_page() -> Self {
        PageRequest {
            limit: DEFAULT_LIMIT,
            cursor: None,
        }
    }
}

/// A parsed listing request using raw integer offsets.
#[derive(Clone, Debug, PartialEq)]
pub struct OffsetPageRequest {
    pub limit: u32,
    pub offset: u64,
}

impl OffsetPageRequest {
    pub fn parse(limit: Option<&str>, offset: Option<&str>) -> Result<Self, Error> {
        let offset = match offset.filter(|o| !o.is_empty()) {
            None => 0,
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| Error::validation("cursor", format!("invalid offset '{raw}'")))?,
        };
        Ok(OffsetPageRequest {
            limit: parse_limit(limit)?,
            offset,
        })
    }
}

fn parse_limit(limit: Option<&str>) -> Result<u32, Error> {
    let limit = match limit.filter(|l| !l.is_empty()) {
        None => DEFAULT_LIMIT,
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| Error::validation("limit", format!("invalid limit '{raw}'")))?,
    };
    if limit == 0 || limit > MAX_LIMIT {
        return Err(Error::validation(
            "limit",
            format!("must be between 1 and {MAX_LIMIT}"),
        ));
    }
    Ok(limit)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_prev: bool,
    pub has_next: bool,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    pub page_total: u32,
}

#[derive(Clone, Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}

/// Build a cursor page from rows fetched with `limit + 1`. The probe row is
/// trimmed; `cursor_of` derives the resume token from the last kept row.
/// The previous cursor echoes the token the caller supplied.
pub fn build_page<T, O, K>(
    mut rows: Vec<T>,
    req: &PageRequest,
    cursor_of: impl Fn(&T) -> Cursor<O, K>,
) -> Result<Page<T>, Error>
where
    O: Serialize + DeserializeOwned,
    K: Serialize + DeserializeOwned,
{
    let limit = req.limit as usize;
    let has_next = rows.len() > limit;
    rows.truncate(limit);
    let next_cursor = match rows.last() {
        Some(last) if has_next => Some(cursor_of(last).encode()?),
        _ => None,
    };
    Ok(Page {
        info: PageInfo {
            has_prev: req.cursor.is_some(),
            has_next,
            limit: req.limit,
            previous_cursor: req.cursor.clone(),
            next_cursor,
            page_total: rows.len() as u32,
        },
        items: rows,
    })
}

/// Offset flavor: the previous cursor subtracts the limit, clamped at zero;
/// the next cursor adds it.
pub fn build_offset_page<T>(mut rows: Vec<T>, req: &OffsetPageRequest) -> Page<T> {
    let limit = req.limit as usize;
    let has_next = rows.len() > limit;
    rows.truncate(limit);
    let has_prev = req.offset > 0;
    Page {
        info: PageInfo {
            has_prev,
            has_next,
            limit: req.limit,
            previous_cursor: has_prev
                .then(|| req.offset.saturating_sub(req.limit as u64).to_string()),
            next_cursor: has_next.then(|| (req.offset + req.limit as u64).to_string()),
            page_total: rows.len() as u32,
        },
        items: rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::TextCursor;

    #[test]
    fn limit_bounds() {
        assert!(PageRequest::parse(Some("0"), None).is_err());
        assert!(PageRequest::parse(Some("101"), None).is_err());
        let req = PageRequest::parse(Some("100"), None).unwrap();
        assert_eq!(req.limit, 100);
    }

    #[test]
    fn limit_defaults_uniformly() {
        assert_eq!(PageRequest::parse(None, None).unwrap().limit, DEFAULT_LIMIT);
        assert_eq!(
            OffsetPageRequest::parse(None, None).unwrap().limit,
            DEFAULT_LIMIT
        );
    }

    #[test]
    fn non_numeric_limit_fails_validation() {
        let err = PageRequest::parse(Some("lots"), None).unwrap_err();
        assert!(err.to_string().contains("limit"));
    }

    #[test]
    fn non_numeric_offset_fails_validation() {
        assert!(OffsetPageRequest::parse(None, Some("abc")).is_err());
        assert!(OffsetPageRequest::parse(None, Some("-3")).is_err());
    }

    #[test]
    fn probe_row_is_trimmed_and_signals_next() {
        let req = PageRequest::parse(Some("2"), None).unwrap();
        let rows = vec!["a", "b", "c"];
        let page = build_page(rows, &req, |r| TextCursor::new(r.to_string(), r.to_string()))
            .unwrap();
        assert_eq!(page.items, vec!["a", "b"]);
        assert!(page.info.has_next);
        assert!(!page.info.has_prev);
        assert_eq!(page.info.page_total, 2);
        let next = page.info.next_cursor.unwrap();
        let decoded = TextCursor::<String>::decode(&next).unwrap().unwrap();
        assert_eq!(decoded.key, "b");
    }

    #[test]
    fn exact_multiple_reports_no_next_page() {
        let req = PageRequest::parse(Some("2"), None).unwrap();
        let page = build_page(vec!["a", "b"], &req, |r| {
            TextCursor::new(r.to_string(), r.to_string())
        })
        .unwrap();
        assert!(!page.info.has_next);
        assert!(page.info.next_cursor.is_none());
    }

    #[test]
    fn previous_cursor_echoes_supplied_token() {
        let req = PageRequest::parse(Some("2"), Some("token123")).unwrap();
        let page = build_page(vec!["c"], &req, |r| {
            TextCursor::new(r.to_string(), r.to_string())
        })
        .unwrap();
        assert!(page.info.has_prev);
        assert_eq!(page.info.previous_cursor.as_deref(), Some("token123"));
    }

    #[test]
    fn offset_previous_clamps_at_zero() {
        let req = OffsetPageRequest::parse(Some("10"), Some("5")).unwrap();
        let page = build_offset_page(vec![1, 2, 3], &req);
        assert_eq!(page.info.previous_cursor.as_deref(), Some("0"));
        assert!(!page.info.has_next);
    }
}
