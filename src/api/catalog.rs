use crate::binder::ChangeAction;
use crate::db;
use crate::error::AppError;
use crate::models::client_model::{dedup_models, ClientModelFilter, ClientModelForm};
use crate::models::commande::{self, NewCommande};
use crate::models::{Client, ClientModel, Commande, Resource};
use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::handlers::{DeleteRequest, MessageResponse, OwnerQuery};
use super::AppState;

/// 客户列表
pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<Client>>, AppError> {
    Ok(Json(db::list_clients(&state.pool, &query.email).await?))
}

/// 客户模型目录, 按 (clientId, name) 去重
pub async fn list_client_models(
    State(state): State<AppState>,
    Query(filter): Query<ClientModelFilter>,
) -> Result<Json<Vec<ClientModel>>, AppError> {
    let models = db::list_client_models(&state.pool, &filter).await?;
    let total = models.len();
    let unique = dedup_models(models);
    tracing::debug!("client models for {}: {} rows, {} unique", filter.email, total, unique.len());
    Ok(Json(unique))
}

pub async fn create_client_model(
    State(state): State<AppState>,
    Json(form): Json<ClientModelForm>,
) -> Result<Response, AppError> {
    let email = form
        .email
        .clone()
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AppError::Validation("email is required".to_string()))?;
    let draft = form.into_draft()?;

    let id = db::insert_client_model(&state.pool, &email, &draft).await?;
    tracing::info!("client model {} created for client {}", id, draft.client_id);
    state.bus.publish(Resource::ClientModel, &id, ChangeAction::Saved);
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))).into_response())
}

pub async fn update_client_model(
    State(state): State<AppState>,
    Json(form): Json<ClientModelForm>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = form
        .id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("id is required".to_string()))?;
    let draft = form.into_draft()?;

    if db::update_client_model(&state.pool, &id, &draft).await? == 0 {
        return Err(AppError::not_found("client-model", id));
    }
    state.bus.publish(Resource::ClientModel, &id, ChangeAction::Saved);
    Ok(Json(MessageResponse {
        success: true,
        message: format!("Updated client model {}", id),
    }))
}

pub async fn delete_client_model(
    State(state): State<AppState>,
    Json(req): Json<DeleteRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if db::delete_client_model(&state.pool, &req.id).await? == 0 {
        return Err(AppError::not_found("client-model", req.id));
    }
    state
        .bus
        .publish(Resource::ClientModel, &req.id, ChangeAction::Deleted);
    Ok(Json(MessageResponse {
        success: true,
        message: format!("Deleted client model {}", req.id),
    }))
}

/// commande 查询参数
#[derive(Debug, Deserialize)]
pub struct CommandeQuery {
    pub email: String,
    pub search: Option<String>,
}

pub async fn list_commandes(
    State(state): State<AppState>,
    Query(query): Query<CommandeQuery>,
) -> Result<Json<Vec<Commande>>, AppError> {
    let commandes = db::list_commandes(&state.pool, &query.email).await?;
    let commandes = match query.search.as_deref() {
        Some(term) if !term.is_empty() => commande::filter_commandes(&commandes, term)
            .into_iter()
            .cloned()
            .collect(),
        _ => commandes,
    };
    Ok(Json(commandes))
}

pub async fn create_commande(
    State(state): State<AppState>,
    Json(req): Json<NewCommande>,
) -> Result<Response, AppError> {
    if req.email.trim().is_empty() {
        return Err(AppError::Validation("email is required".to_string()));
    }
    let name = commande::validate_name(&req.name)?;
    let created = db::insert_commande(&state.pool, &req.email, &name).await?;
    state
        .bus
        .publish(Resource::Commande, &created.id, ChangeAction::Saved);
    Ok((StatusCode::CREATED, Json(created)).into_response())
}
