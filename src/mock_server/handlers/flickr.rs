//! Flickr REST endpoint handler.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::Uri,
    Json,
};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::mock_server::state::{paginate, MockState};

const INTERESTINGNESS: &str = "flickr.interestingness.getList";
const FLICKR_DEFAULT_PER_PAGE: u32 = 100;

/// GET /services/rest/
///
/// Answers `flickr.interestingness.getList` with the `photos` envelope.
/// Like Flickr, failures are reported with `"stat": "fail"` and status 200.
pub async fn flickr_rest(
    State(state): State<Arc<RwLock<MockState>>>,
    Query(query): Query<HashMap<String, String>>,
    uri: Uri,
) -> Json<Value> {
    let mut state = state.write().await;
    state.log_request(uri.to_string());

    if let Some(ref required) = state.api_key {
        if query.get("api_key") != Some(required) {
            return Json(fail(100, "Invalid API Key (Key has invalid format)"));
        }
    }

    let method = query.get("method").map(String::as_str).unwrap_or_default();
    if method != INTERESTINGNESS {
        return Json(fail(112, &format!("Method \"{method}\" not found")));
    }

    let page = query.get("page").and_then(|p| p.parse().ok());
    let per_page = query
        .get("per_page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(FLICKR_DEFAULT_PER_PAGE);
    let slice = paginate(&state.photos, page, Some(per_page));

    Json(json!({
        "photos": {
            "page": slice.page,
            "pages": slice.pages,
            "perpage": slice.per_page,
            "total": state.photos.len(),
            "photo": slice.items,
        },
        "stat": "ok",
    }))
}

fn fail(code: u32, message: &str) -> Value {
    json!({ "stat": "fail", "code": code, "message": message })
}
