//! Recovering paging information from responses.
//!
//! APIs advertise page boundaries in different ways. Resolution tries the
//! most authoritative signal first:
//!
//! 1. a GitHub-style `Link` header (`<url?page=4>; rel="last"`),
//! 2. a paging envelope in the JSON body (`{"page": 1, "pages": 5, ...}`),
//!
//! and then, if the model found has no items-per-page count, backfills it
//! from the request's `per_page` query value or from the number of items
//! actually decoded.

use reqwest::header::{HeaderMap, LINK};
use serde_json::Value;

use crate::paging::PagingModel;

/// Infer paging from a `Link` header value.
///
/// Each comma-separated entry has the form `<url>; rel="name"`; commas inside
/// the `<...>` target do not separate entries. The `page`
/// query value of the `next`, `last` and `previous` (or `prev`) entries is
/// recorded; the current page is `previous + 1`, or `next - 1` when there is
/// no previous entry. Returns `None` unless both the current and last page
/// were determined. The resulting model has `per == 0`.
pub fn from_link_header(header: &str) -> Option<PagingModel> {
    let mut next = None;
    let mut last = None;
    let mut previous = None;

    for entry in link_entries(header) {
        let mut target = None;
        let mut rels: Vec<&str> = Vec::new();

        for segment in entry.split(';').map(str::trim) {
            if let Some(inner) = segment.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
                target = Some(inner);
            } else if let Some(value) = segment.strip_prefix("rel=") {
                let value = value.trim_matches(|c: char| c == '"' || c == '\'');
                rels.extend(value.split_whitespace());
            }
        }

        let Some(page) = target.and_then(|url| query_value(url, "page")) else {
            continue;
        };
        let Ok(page) = page.parse::<u32>() else {
            continue;
        };

        for rel in rels {
            match rel {
                "next" => next = Some(page),
                "last" => last = Some(page),
                "previous" | "prev" => previous = Some(page),
                _ => {}
            }
        }
    }

    let current = match (previous, next) {
        (Some(previous), _) => previous.checked_add(1)?,
        (None, Some(next)) => next.checked_sub(1)?,
        (None, None) => return None,
    };

    Some(PagingModel::new(current, last?, 0))
}

/// Split a `Link` header value into entries at commas outside `<...>`.
fn link_entries(header: &str) -> impl Iterator<Item = &str> {
    let mut in_target = false;
    header
        .split(move |c: char| match c {
            '<' => {
                in_target = true;
                false
            }
            '>' => {
                in_target = false;
                false
            }
            ',' => !in_target,
            _ => false,
        })
        .filter(|entry| !entry.trim().is_empty())
}

/// Infer paging from the `Link` header fields of a response, if present.
///
/// Several `Link` fields are read as one comma-joined value.
pub fn from_headers(headers: &HeaderMap) -> Option<PagingModel> {
    let fields: Vec<&str> = headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();
    if fields.is_empty() {
        return None;
    }
    from_link_header(&fields.join(", "))
}

/// Infer paging from a paging envelope in a JSON body.
///
/// Looks at the top-level object and at object members one level down
/// (`{"photos": {"page": 2, "pages": 9, "perpage": 100, ...}}`) for integer
/// or numeric-string `page` and `pages` fields. `per` is read from `perpage`
/// or `per_page` when present.
pub fn from_body(body: &Value) -> Option<PagingModel> {
    let object = body.as_object()?;
    envelope(object).or_else(|| {
        object
            .values()
            .filter_map(Value::as_object)
            .find_map(envelope)
    })
}

fn envelope(object: &serde_json::Map<String, Value>) -> Option<PagingModel> {
    let page = object.get("page").and_then(as_u32)?;
    let pages = object.get("pages").and_then(as_u32)?;
    let per = object
        .get("perpage")
        .or_else(|| object.get("per_page"))
        .and_then(as_u32)
        .unwrap_or(0);
    Some(PagingModel::new(page, pages, per))
}

fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read the `per_page` query value from a URL string.
pub fn per_page_from_url(url: &str) -> Option<u32> {
    query_value(url, "per_page").and_then(|v| v.parse().ok())
}

/// Find the value of `key` in the query part of `url`.
///
/// Works on relative URLs too, which appear in some `Link` headers.
fn query_value<'a>(url: &'a str, key: &str) -> Option<&'a str> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or_default();
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then_some(v)
    })
}

/// Fill in a missing items-per-page count.
///
/// Models that already have `per > 0` are returned unchanged. Otherwise the
/// request URL's `per_page` is tried, then the decoded item count. If neither
/// is positive the model is returned with `per == 0`, which callers treat as
/// "not paginated".
pub fn backfill_per(paging: PagingModel, request_url: &str, item_count: usize) -> PagingModel {
    if paging.per() > 0 {
        return paging;
    }

    if let Some(per) = per_page_from_url(request_url).filter(|&p| p > 0) {
        return paging.with_per(per);
    }

    match u32::try_from(item_count) {
        Ok(count) if count > 0 => paging.with_per(count),
        _ => {
            tracing::warn!(%paging, url = request_url, "could not determine items per page");
            paging
        }
    }
}

/// Resolve paging for a response, trying every signal in order.
pub fn resolve(
    headers: &HeaderMap,
    body: Option<&Value>,
    request_url: &str,
    item_count: usize,
) -> Option<PagingModel> {
    let paging = from_headers(headers).or_else(|| body.and_then(from_body))?;
    Some(backfill_per(paging, request_url, item_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    const GITHUB_LINKS: &str =
        "<u?page=2>; rel=\"next\", <u?page=4>; rel=\"last\", <u?page=1>; rel=\"previous\"";

    #[test]
    fn test_link_header_full() {
        let model = from_link_header(GITHUB_LINKS).unwrap();
        assert_eq!(model.current(), 2);
        assert_eq!(model.last(), 4);
        assert_eq!(model.per(), 0);
    }

    #[test]
    fn test_link_header_comma_in_url() {
        let header = "<https://x/rest?extras=owner_name,date_taken&page=2>; rel=\"next\", \
                      <https://x/rest?extras=owner_name,date_taken&page=4>; rel=\"last\"";
        assert_eq!(from_link_header(header), Some(PagingModel::new(1, 4, 0)));
    }

    #[test]
    fn test_link_header_next_only_first_page() {
        let header = "<https://api.github.com/repos?page=2&per_page=30>; rel=\"next\", \
                      <https://api.github.com/repos?page=7&per_page=30>; rel=\"last\"";
        let model = from_link_header(header).unwrap();
        assert_eq!(model.current(), 1);
        assert_eq!(model.last(), 7);
        assert_eq!(model.previous(), None);
    }

    #[test]
    fn test_link_header_prev_alias() {
        let header = "<https://x/y?page=3>; rel=\"prev\", <https://x/y?page=5>; rel=\"last\"";
        let model = from_link_header(header).unwrap();
        assert_eq!(model.current(), 4);
        assert_eq!(model.last(), 5);
    }

    #[test]
    fn test_link_header_partial_is_none() {
        // No last page advertised
        assert_eq!(from_link_header("<https://x/y?page=2>; rel=\"next\""), None);
        // No current page derivable
        assert_eq!(from_link_header("<https://x/y?page=9>; rel=\"last\""), None);
        assert_eq!(from_link_header(""), None);
    }

    #[test]
    fn test_page_not_confused_with_per_page() {
        let header = "<https://x/y?per_page=50&page=2>; rel=\"next\", \
                      <https://x/y?per_page=50&page=3>; rel=\"last\"";
        let model = from_link_header(header).unwrap();
        assert_eq!(model.current(), 1);
        assert_eq!(model.last(), 3);
    }

    #[test]
    fn test_from_headers_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("Link", HeaderValue::from_static(GITHUB_LINKS));
        assert_eq!(from_headers(&headers), Some(PagingModel::new(2, 4, 0)));
        assert_eq!(from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_from_headers_joins_link_fields() {
        let mut headers = HeaderMap::new();
        headers.append(LINK, HeaderValue::from_static("<u?page=3>; rel=\"next\""));
        headers.append(LINK, HeaderValue::from_static("<u?page=6>; rel=\"last\""));
        assert_eq!(from_headers(&headers), Some(PagingModel::new(2, 6, 0)));
    }

    #[test]
    fn test_from_body_nested_envelope() {
        let body = json!({
            "photos": { "page": 2, "pages": "9", "perpage": 100, "photo": [] },
            "stat": "ok"
        });
        assert_eq!(from_body(&body), Some(PagingModel::new(2, 9, 100)));
    }

    #[test]
    fn test_from_body_top_level_and_missing() {
        let body = json!({ "page": 1, "pages": 3, "items": [] });
        assert_eq!(from_body(&body), Some(PagingModel::new(1, 3, 0)));
        assert_eq!(from_body(&json!({ "items": [] })), None);
        assert_eq!(from_body(&json!([1, 2, 3])), None);
    }

    #[test]
    fn test_per_page_from_url() {
        assert_eq!(per_page_from_url("https://x/y?a=1&per_page=25&page=2"), Some(25));
        assert_eq!(per_page_from_url("https://x/y?page=2"), None);
        assert_eq!(per_page_from_url("https://x/y"), None);
    }

    #[test]
    fn test_backfill_from_url_then_count() {
        let model = from_link_header(GITHUB_LINKS).unwrap();

        let from_url = backfill_per(model, "https://x/y?per_page=30&page=2", 12);
        assert_eq!(from_url.per(), 30);

        let from_count = backfill_per(model, "https://x/y?page=2", 12);
        assert_eq!(from_count.per(), 12);

        let abandoned = backfill_per(model, "https://x/y?page=2", 0);
        assert_eq!(abandoned.per(), 0);
        assert_eq!(abandoned.current(), 2);
        assert_eq!(abandoned.last(), 4);
    }

    #[test]
    fn test_backfill_keeps_known_per() {
        let model = PagingModel::new(1, 2, 40);
        assert_eq!(backfill_per(model, "https://x/y?per_page=5", 3), model);
    }

    #[test]
    fn test_resolve_prefers_header_over_body() {
        let mut headers = HeaderMap::new();
        headers.insert(LINK, HeaderValue::from_static(GITHUB_LINKS));
        let body = json!({ "page": 7, "pages": 8, "perpage": 3 });

        let model = resolve(&headers, Some(&body), "https://x/y?page=2", 10).unwrap();
        assert_eq!(model, PagingModel::new(2, 4, 10));

        let model = resolve(&HeaderMap::new(), Some(&body), "https://x/y", 3).unwrap();
        assert_eq!(model, PagingModel::new(7, 8, 3));

        assert_eq!(resolve(&HeaderMap::new(), None, "https://x/y", 3), None);
    }
}
