use crate::core::models::Capability;
use crate::core::traits::StorageConfig;
use crate::state::AppState;
use axum::{
    routing::{delete, get, get_service, put},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;

pub mod auth;
mod clipboard;
pub mod common;
mod pages;
mod proxy;
mod vault;

use auth::guarded;

pub fn build_routes(state: Arc<AppState>) -> Router {
    let static_dir = state.storage.static_dir();
    tracing::info!("Serving static files from {:?}", static_dir);
    let static_files = guarded(
        &state,
        &[Capability::StaticRead],
        get_service(ServeDir::new(static_dir)),
    )
    .with_state::<()>(state.clone());

    Router::new()
        // Proxy subscription
        .route(
            "/proxy/",
            guarded(&state, &[Capability::ProxyRead], get(proxy::get_proxy)),
        )
        .route(
            "/proxy/sub",
            guarded(&state, &[Capability::ProxyRead], get(proxy::get_named_proxy)),
        )
        // Clipboard
        .route("/clipboard/", get(pages::clipboard_page))
        .route(
            "/clipboard/api",
            guarded(
                &state,
                &[Capability::ClipboardRead],
                get(clipboard::read_clipboard),
            )
            .merge(guarded(
                &state,
                &[Capability::ClipboardWrite],
                put(clipboard::write_clipboard),
            )),
        )
        // Vault
        .route("/vault/", get(pages::vault_page))
        .route(
            "/vault/api/key_configs",
            guarded(&state, &[Capability::VaultRead], get(vault::list_key_configs)),
        )
        .route(
            "/vault/api/key_configs/:id",
            guarded(
                &state,
                &[Capability::VaultCreate],
                put(vault::create_key_config),
            )
            .merge(guarded(
                &state,
                &[Capability::VaultDelete],
                delete(vault::delete_key_config),
            )),
        )
        .route("/healthz", get(|| async { "ok" }))
        .nest_service("/static", static_files)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::{AuthMode, CredentialTable};
    use crate::core::models::{GatewayConfig, UserRecord};
    use crate::core::traits::DefaultStorageConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use std::collections::{BTreeSet, HashMap};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn user(name: &str, caps: &[Capability], admin: bool) -> UserRecord {
        UserRecord {
            username: name.to_string(),
            capabilities: caps.iter().copied().collect::<BTreeSet<_>>(),
            is_admin: admin,
        }
    }

    fn enforced() -> AuthMode {
        let mut users = HashMap::new();
        users.insert("admin-token".to_string(), user("root", &[], true));
        users.insert(
            "reader-token".to_string(),
            user("reader", &[Capability::ClipboardRead], false),
        );
        users.insert(
            "vault-token".to_string(),
            user(
                "keeper",
                &[Capability::VaultRead, Capability::VaultCreate],
                false,
            ),
        );
        users.insert(
            "static-token".to_string(),
            user("viewer", &[Capability::StaticRead], false),
        );
        AuthMode::Enforced(CredentialTable::new(users))
    }

    fn app(dir: &TempDir, auth: AuthMode) -> Router {
        let storage = DefaultStorageConfig::with_path(dir.path().to_path_buf()).unwrap();
        let state = AppState::new(storage, GatewayConfig::default(), auth).unwrap();
        build_routes(Arc::new(state))
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Body) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("auth_token", token);
        }
        builder.body(body).unwrap()
    }

    fn json_put(uri: &str, token: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header("auth_token", token)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthenticated() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir, enforced());

        let response = app
            .clone()
            .oneshot(request("GET", "/clipboard/api", None, Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_string(response).await.contains("\"error\""));

        let response = app
            .oneshot(request("GET", "/clipboard/api", Some("nobody"), Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_forbidden_names_missing_capability() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir, enforced());

        let response = app
            .oneshot(request(
                "PUT",
                "/clipboard/api",
                Some("reader-token"),
                Body::from("hello"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_string(response).await;
        assert!(body.contains("clipboard.write"));
        assert!(body.contains("reader"));
    }

    #[tokio::test]
    async fn test_clipboard_last_write_wins() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir, enforced());

        let response = app
            .clone()
            .oneshot(request("GET", "/clipboard/api", Some("reader-token"), Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "");

        for text in ["first", "second"] {
            let response = app
                .clone()
                .oneshot(request("PUT", "/clipboard/api", Some("admin-token"), Body::from(text)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
        }

        let response = app
            .oneshot(request("GET", "/clipboard/api", Some("reader-token"), Body::empty()))
            .await
            .unwrap();
        assert_eq!(
            response.headers()["content-type"],
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_string(response).await, "second");
    }

    #[tokio::test]
    async fn test_vault_create_list_delete() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir, enforced());
        let config = r#"{"platform":"github","length":16,"symbols":"!@#"}"#;

        let response = app
            .clone()
            .oneshot(json_put("/vault/api/key_configs/gh", "vault-token", config))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // 同名配置不可覆盖
        let response = app
            .clone()
            .oneshot(json_put("/vault/api/key_configs/gh", "vault-token", config))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(request("GET", "/vault/api/key_configs", Some("vault-token"), Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let listed: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(listed["gh"]["platform"], "github");
        assert_eq!(listed["gh"]["length"], 16);

        let response = app
            .clone()
            .oneshot(request(
                "DELETE",
                "/vault/api/key_configs/gh",
                Some("vault-token"),
                Body::empty(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(request(
                    "DELETE",
                    "/vault/api/key_configs/gh",
                    Some("admin-token"),
                    Body::empty(),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
        }

        let response = app
            .oneshot(request("GET", "/vault/api/key_configs", Some("admin-token"), Body::empty()))
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "{}");
    }

    #[tokio::test]
    async fn test_vault_rejects_unsafe_identifiers() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir, enforced());
        let config = r#"{"platform":"x","length":8}"#;

        for id in ["bad-id", "CON", "a.b"] {
            let uri = format!("/vault/api/key_configs/{}", id);
            let response = app
                .clone()
                .oneshot(json_put(&uri, "admin-token", config))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "id {}", id);
        }
    }

    #[tokio::test]
    async fn test_disabled_auth_allows_everything() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir, AuthMode::Disabled);

        let response = app
            .clone()
            .oneshot(request("PUT", "/clipboard/api", None, Body::from("open")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(request("GET", "/clipboard/api", None, Body::empty()))
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "open");
    }

    #[tokio::test]
    async fn test_pages_are_public() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir, enforced());

        let response = app
            .clone()
            .oneshot(request("GET", "/vault/", None, Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        std::fs::create_dir_all(dir.path().join("templates")).unwrap();
        std::fs::write(
            dir.path().join("templates").join("cloud_clipboard.html"),
            "<html>clipboard</html>",
        )
        .unwrap();

        let response = app
            .oneshot(request("GET", "/clipboard/", None, Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "<html>clipboard</html>");
    }

    #[tokio::test]
    async fn test_static_files_require_capability() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("static")).unwrap();
        std::fs::write(dir.path().join("static").join("app.js"), "console.log(1)").unwrap();
        let app = app(&dir, enforced());

        let response = app
            .clone()
            .oneshot(request("GET", "/static/app.js", None, Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .clone()
            .oneshot(request("GET", "/static/app.js", Some("reader-token"), Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(request("GET", "/static/app.js", Some("static-token"), Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "console.log(1)");

        let response = app
            .oneshot(request("GET", "/static/missing.js", Some("static-token"), Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_healthz() {
        let dir = TempDir::new().unwrap();
        let response = app(&dir, enforced())
            .oneshot(request("GET", "/healthz", None, Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "ok");
    }

    #[tokio::test]
    async fn test_proxy_without_subscription_is_server_error() {
        let dir = TempDir::new().unwrap();
        let response = app(&dir, enforced())
            .oneshot(request("GET", "/proxy/", Some("admin-token"), Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_bad_query_is_json_error() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir, enforced());

        for uri in ["/proxy/sub", "/proxy/sub?sub_name=work&raw=maybe", "/proxy/?raw=maybe"] {
            let response = app
                .clone()
                .oneshot(request("GET", uri, Some("admin-token"), Body::empty()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri {}", uri);
            let body: serde_json::Value =
                serde_json::from_str(&body_string(response).await).unwrap();
            assert!(body["error"].is_string(), "uri {}", uri);
        }
    }
}
