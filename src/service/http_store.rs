//! 远程 API 持久化客户端
//!
//! 以 JSON 调用 `/api/export`, `/api/livraison` 等接口. 非 2xx 响应中的
//! `{error}` 原样返回给调用方展示.

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::marker::PhantomData;
use std::time::Duration;

use super::store::DocumentStore;
use crate::error::{AppError, ErrorBody};
use crate::models::LineDocument;

/// 基于 HTTP 的单据存储
#[derive(Debug, Clone)]
pub struct HttpDocumentStore<D> {
    client: Client,
    base_url: String,
    _document: PhantomData<fn() -> D>,
}

impl<D: LineDocument> HttpDocumentStore<D> {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            _document: PhantomData,
        })
    }

    /// 资源地址, 例如 `http://host/api/export`
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, D::RESOURCE.api_path())
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, AppError> {
        let response = check(request.send().await?).await?;
        Ok(response.json::<T>().await?)
    }
}

/// 非 2xx 时提取 `{error}`, 取不到则用状态码
async fn check(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => format!("Error {}", status),
    };
    tracing::warn!("remote request failed: {} {}", status, message);
    Err(AppError::Remote(message))
}

impl<D> DocumentStore<D> for HttpDocumentStore<D>
where
    D: LineDocument + Serialize + DeserializeOwned,
{
    async fn load(&self, id: &str) -> Result<Option<D>, AppError> {
        let response = self
            .client
            .get(format!("{}/{}", self.endpoint(), id))
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(check(response).await?.json::<D>().await?))
    }

    async fn list(&self, owner_email: &str) -> Result<Vec<D>, AppError> {
        let request = self
            .client
            .get(self.endpoint())
            .query(&[("email", owner_email)]);
        Self::send(request).await
    }

    async fn create(&self, document: &D) -> Result<D, AppError> {
        Self::send(self.client.post(self.endpoint()).json(document)).await
    }

    async fn update(&self, document: &D) -> Result<D, AppError> {
        Self::send(self.client.put(self.endpoint()).json(document)).await
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let request = self
            .client
            .delete(self.endpoint())
            .json(&json!({ "id": id }));
        check(request.send().await?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExportDeclaration, Livraison};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};

    /// 在随机端口启动本地服务, 返回 base url
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_endpoint_per_document() {
        let exports =
            HttpDocumentStore::<ExportDeclaration>::new("http://localhost:8080/", Duration::from_secs(30))
                .unwrap();
        let livraisons =
            HttpDocumentStore::<Livraison>::new("http://localhost:8080", Duration::from_secs(30))
                .unwrap();

        assert_eq!(exports.endpoint(), "http://localhost:8080/api/export");
        assert_eq!(livraisons.endpoint(), "http://localhost:8080/api/livraison");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error() {
        let store =
            HttpDocumentStore::<Livraison>::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = store.list("a@b.c").await.unwrap_err();
        assert!(matches!(err, AppError::Http(_)));
        assert_eq!(err.user_message(), "Unable to reach the server");
    }

    #[tokio::test]
    async fn test_remote_error_body_is_surfaced_verbatim() {
        let router = Router::new()
            .route(
                "/api/export",
                post(|| async {
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        Json(json!({ "error": "Client is required" })),
                    )
                })
                .put(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route("/api/export/:id", get(|| async { StatusCode::NOT_FOUND }));
        let base = serve(router).await;
        let store =
            HttpDocumentStore::<ExportDeclaration>::new(base, Duration::from_secs(5)).unwrap();
        let draft = ExportDeclaration::new("a@b.c", "ACME");

        let err = store.create(&draft).await.unwrap_err();
        assert!(matches!(&err, AppError::Remote(message) if message == "Client is required"));
        assert_eq!(err.user_message(), "Client is required");

        // 非 JSON 错误体退回状态码
        let saved = draft.clone().with_id("exp-1".to_string());
        let err = store.update(&saved).await.unwrap_err();
        assert!(
            matches!(&err, AppError::Remote(message) if message == "Error 500 Internal Server Error")
        );

        assert!(store.load("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_posts_new_and_deletes_by_id() {
        let router = Router::new().route(
            "/api/livraison",
            post(|Json(livraison): Json<Livraison>| async move {
                (
                    StatusCode::CREATED,
                    Json(livraison.with_id("liv-1".to_string())),
                )
            })
            .delete(|Json(body): Json<serde_json::Value>| async move {
                if body["id"] == "liv-1" {
                    (StatusCode::OK, Json(json!({ "success": true })))
                } else {
                    (StatusCode::NOT_FOUND, Json(json!({ "error": "livraison not found" })))
                }
            }),
        );
        let base = serve(router).await;
        let store = HttpDocumentStore::<Livraison>::new(base, Duration::from_secs(5)).unwrap();

        let saved = store.save(&Livraison::new("a@b.c", "ACME")).await.unwrap();
        assert_eq!(saved.id, "liv-1");
        assert_eq!(saved.client_name, "ACME");

        store.delete("liv-1").await.unwrap();
        let err = store.delete("liv-2").await.unwrap_err();
        assert_eq!(err.user_message(), "livraison not found");
    }
}
