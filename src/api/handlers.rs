use crate::binder::ChangeAction;
use crate::error::AppError;
use crate::models::{ExportDeclaration, LineDocument};
use crate::service::{export_csv_bytes, DocumentStore, PgDocumentStore};
use axum::{
    extract::{Json, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use super::AppState;

/// 查询参数: 所有者邮箱
#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub email: String,
}

/// 请求体: 单据ID
#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub id: String,
}

/// 响应体
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// 提交超时视为失败
async fn within_submit_timeout<T>(
    timeout: Duration,
    submit: impl Future<Output = Result<T, AppError>>,
) -> Result<T, AppError> {
    tokio::time::timeout(timeout, submit)
        .await
        .map_err(|_| AppError::Timeout(timeout))?
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 按 ID 查询单据
pub async fn get_document<D>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<D>, AppError>
where
    D: LineDocument + Serialize + 'static,
    PgDocumentStore: DocumentStore<D>,
{
    let document = DocumentStore::<D>::load(state.documents.as_ref(), &id).await?;
    document
        .map(Json)
        .ok_or_else(|| AppError::not_found(D::RESOURCE.as_str(), id))
}

/// 按所有者列出单据
pub async fn list_documents<D>(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<D>>, AppError>
where
    D: LineDocument + Serialize + 'static,
    PgDocumentStore: DocumentStore<D>,
{
    let documents = DocumentStore::<D>::list(state.documents.as_ref(), &query.email).await?;
    tracing::debug!("{} {} documents for {}", documents.len(), D::RESOURCE, query.email);
    Ok(Json(documents))
}

/// 新建单据 (含明细行)
pub async fn create_document<D>(
    State(state): State<AppState>,
    Json(document): Json<D>,
) -> Result<Response, AppError>
where
    D: LineDocument + Serialize + DeserializeOwned + 'static,
    PgDocumentStore: DocumentStore<D>,
{
    if document.owner_email().trim().is_empty() {
        return Err(AppError::Validation("email is required".to_string()));
    }
    let document = state.editor.normalize(&document);
    let saved = within_submit_timeout(
        state.submit_timeout,
        DocumentStore::<D>::create(state.documents.as_ref(), &document),
    )
    .await?;
    state
        .bus
        .publish(D::RESOURCE, saved.id(), ChangeAction::Saved);
    Ok((StatusCode::CREATED, Json(saved)).into_response())
}

/// 更新单据, 明细行整体替换
pub async fn update_document<D>(
    State(state): State<AppState>,
    Json(document): Json<D>,
) -> Result<Json<D>, AppError>
where
    D: LineDocument + Serialize + DeserializeOwned + 'static,
    PgDocumentStore: DocumentStore<D>,
{
    if document.is_new() {
        return Err(AppError::Validation("id is required".to_string()));
    }
    let document = state.editor.normalize(&document);
    let saved = within_submit_timeout(
        state.submit_timeout,
        DocumentStore::<D>::update(state.documents.as_ref(), &document),
    )
    .await?;
    state
        .bus
        .publish(D::RESOURCE, saved.id(), ChangeAction::Saved);
    Ok(Json(saved))
}

/// 删除单据
pub async fn delete_document<D>(
    State(state): State<AppState>,
    Json(req): Json<DeleteRequest>,
) -> Result<Json<MessageResponse>, AppError>
where
    D: LineDocument + 'static,
    PgDocumentStore: DocumentStore<D>,
{
    within_submit_timeout(
        state.submit_timeout,
        DocumentStore::<D>::delete(state.documents.as_ref(), &req.id),
    )
    .await?;
    state.bus.publish(D::RESOURCE, &req.id, ChangeAction::Deleted);
    Ok(Json(MessageResponse {
        success: true,
        message: format!("Deleted {} {}", D::RESOURCE, req.id),
    }))
}

/// 出口申报单明细 CSV
pub async fn export_csv(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let declaration = DocumentStore::<ExportDeclaration>::load(state.documents.as_ref(), &id)
        .await?
        .ok_or_else(|| AppError::not_found("export", id.clone()))?;

    let bytes = export_csv_bytes(&declaration)?;
    let disposition = format!("attachment; filename=\"export-{}.csv\"", id);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
