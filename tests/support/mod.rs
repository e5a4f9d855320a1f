//! Shared fixtures for integration tests.

#![allow(dead_code)]

pub mod socket_guard;

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path of the mocked search endpoint.
pub const SEARCH_PATH: &str = "/api/v1/search";

/// Full search endpoint URL on `server`.
pub fn search_url(server: &MockServer) -> String {
    format!("{}{SEARCH_PATH}", server.uri())
}

/// Search response body listing `names` as images served by `server`.
pub fn search_body(server: &MockServer, names: &[&str], current_page: u32, last_page: u32) -> Value {
    let data: Vec<Value> = names
        .iter()
        .map(|name| {
            json!({
                "id": name.trim_end_matches(".jpg"),
                "path": format!("{}/full/{name}", server.uri()),
                "file_size": 3,
            })
        })
        .collect();
    json!({
        "data": data,
        "meta": {
            "current_page": current_page,
            "last_page": last_page,
            "per_page": 24,
            "total": u64::from(last_page) * 24,
        }
    })
}

/// Mounts a search response for `page`.
pub async fn mount_search_page(server: &MockServer, page: u32, body: Value) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mounts a 200 image response for `name` with `body`.
pub async fn mount_image(server: &MockServer, name: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/full/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}
