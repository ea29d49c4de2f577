#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)]
//! Shared fixtures for the HTTP integration tests.
//!
//! [`TestApp`] wires the real routers, the real session layer, and the real
//! templates from the repository `templates/` directory over an in-memory
//! content store, so tests exercise the same request path as the `mosaico`
//! binary.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use mosaico_kernel::AppState;
use mosaico_kernel::access::{AccessPolicy, AllowAll};
use mosaico_kernel::layout::TemplateRegistry;
use mosaico_kernel::media::{MediaLibrary, MemoryMediaLibrary};
use mosaico_kernel::models::{ContentRecord, RecordKind};
use mosaico_kernel::store::{ContentStore, MemoryStore};
use mosaico_kernel::theme::ThemeEngine;
use mosaico_kernel::{routes, session};

/// Test application over the real routers and real templates.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub media: Arc<MemoryMediaLibrary>,
}

impl TestApp {
    /// Build an app with the permissive default access policy.
    pub fn new() -> Self {
        Self::with_policy(Arc::new(AllowAll))
    }

    /// Build an app with an explicit access policy.
    pub fn with_policy(policy: Arc<dyn AccessPolicy>) -> Self {
        // Tests run from crates/kernel/; the templates live at the
        // repository root.
        let templates_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .and_then(Path::parent)
            .expect("manifest dir has a repository root")
            .join("templates");

        let store = Arc::new(MemoryStore::new());
        let media = Arc::new(MemoryMediaLibrary::new());
        let registry = Arc::new(
            TemplateRegistry::scan(&templates_dir.join("sections"))
                .expect("failed to scan section templates"),
        );
        assert!(
            !registry.is_empty(),
            "no section templates found under {}",
            templates_dir.display()
        );
        let theme =
            Arc::new(ThemeEngine::new(&templates_dir).expect("failed to load theme templates"));

        let state = AppState::from_parts(
            Arc::clone(&store) as Arc<dyn ContentStore>,
            registry,
            theme,
            Arc::clone(&media) as Arc<dyn MediaLibrary>,
            policy,
        );

        let router = Router::new()
            .merge(routes::editor::router())
            .merge(routes::front::router())
            .layer(session::create_session_layer())
            .with_state(state.clone());

        Self {
            router,
            state,
            store,
            media,
        }
    }

    /// Seed a host-owned page directly into the store.
    pub fn seed_page(&self, title: &str) -> Uuid {
        let now = chrono::Utc::now().timestamp();
        let record = ContentRecord {
            id: Uuid::now_v7(),
            kind: RecordKind::Page,
            parent_id: None,
            order_key: 0,
            title: title.to_string(),
            body: String::new(),
            format: "plain_text".to_string(),
            created: now,
            changed: now,
        };
        let id = record.id;
        self.store.seed(record);
        id
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("failed to send request")
    }

    /// Send a request with cookies captured from a previous response.
    pub async fn request_with_cookies(
        &self,
        mut request: Request<Body>,
        cookies: &str,
    ) -> Response {
        if !cookies.is_empty() {
            request
                .headers_mut()
                .insert(header::COOKIE, cookies.parse().expect("invalid cookie"));
        }
        self.request(request).await
    }

    /// Fetch the editor bootstrap for a page, returning the payload and the
    /// session cookies the minted tokens live in.
    pub async fn bootstrap(&self, page_id: Uuid) -> (Value, String) {
        let response = self
            .request(
                Request::get(format!("/editor/{page_id}/bootstrap"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(
            response.status(),
            axum::http::StatusCode::OK,
            "bootstrap failed for page {page_id}"
        );
        let cookies = extract_cookies(&response);
        (response_json(response).await, cookies)
    }

    /// POST a JSON body with session cookies.
    pub async fn post_json(&self, path: &str, body: Value, cookies: &str) -> Response {
        self.request_with_cookies(
            Request::post(path)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            cookies,
        )
        .await
    }
}

/// Extract Set-Cookie headers from a response for use in later requests.
pub fn extract_cookies(response: &Response) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Read a response body as JSON.
pub async fn response_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is not valid JSON")
}

/// Read a response body as text.
pub async fn response_text(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("body is not valid UTF-8")
}
