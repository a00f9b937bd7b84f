//! Paginated item collection handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::mock_server::state::{paginate, MockState, PageSlice};

/// Query parameters for listing items.
#[derive(Debug, Default, Deserialize)]
pub struct ListItemsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// GET /items
///
/// Responds with a bare JSON array and, when there is more than one page, a
/// `Link` header with `first`, `previous`, `next` and `last` relations.
pub async fn list_items(
    State(state): State<Arc<RwLock<MockState>>>,
    Query(query): Query<ListItemsQuery>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let mut state = state.write().await;
    state.log_request(uri.to_string());

    let slice = paginate(&state.items, query.page, query.per_page);
    let host = headers.get(header::HOST).and_then(|h| h.to_str().ok());
    let link = link_header(host, &slice, query.per_page.is_some());

    let mut response = Json(slice.items.to_vec()).into_response();
    if let Some(value) = link.and_then(|l| HeaderValue::from_str(&l).ok()) {
        response.headers_mut().insert(header::LINK, value);
    }
    response
}

/// Build a GitHub-style `Link` header for `slice`.
///
/// Returns `None` for single-page collections. `per_page` is echoed in each
/// link only when the client sent it.
pub fn link_header<T>(host: Option<&str>, slice: &PageSlice<'_, T>, echo_per: bool) -> Option<String> {
    if slice.pages <= 1 {
        return None;
    }

    let base = match host {
        Some(host) => format!("http://{host}/items"),
        None => "/items".to_string(),
    };
    let href = |page: u32| {
        if echo_per {
            format!("<{base}?page={page}&per_page={}>", slice.per_page)
        } else {
            format!("<{base}?page={page}>")
        }
    };

    let mut links = Vec::new();
    if slice.page < slice.pages {
        links.push(format!("{}; rel=\"next\"", href(slice.page + 1)));
    }
    links.push(format!("{}; rel=\"last\"", href(slice.pages)));
    if slice.page > 1 {
        links.push(format!("{}; rel=\"first\"", href(1)));
        links.push(format!("{}; rel=\"previous\"", href(slice.page - 1)));
    }

    Some(links.join(", "))
}
