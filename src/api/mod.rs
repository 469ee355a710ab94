pub mod catalog;
pub mod handlers;

pub use handlers::{health_check, DeleteRequest, MessageResponse, OwnerQuery};

use axum::{routing::get, Router};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::binder::ChangeBus;
use crate::editor::LineEditor;
use crate::models::{ExportDeclaration, Livraison};
use crate::service::PgDocumentStore;

/// 共享状态
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub documents: Arc<PgDocumentStore>,
    pub editor: Arc<LineEditor>,
    pub bus: ChangeBus,
    /// 单次提交 (整理 + 落库 + 回读) 的总时限
    pub submit_timeout: Duration,
}

impl AppState {
    pub fn new(documents: PgDocumentStore, bus: ChangeBus, submit_timeout: Duration) -> Self {
        Self {
            pool: documents.pool().clone(),
            documents: Arc::new(documents),
            editor: Arc::new(LineEditor::new()),
            bus,
            submit_timeout,
        }
    }
}

/// 构建全部路由
pub fn router(state: AppState) -> Router {
    use handlers::{
        create_document, delete_document, export_csv, get_document, list_documents,
        update_document,
    };

    let export_routes = Router::new()
        .route(
            "/api/export",
            get(list_documents::<ExportDeclaration>)
                .post(create_document::<ExportDeclaration>)
                .put(update_document::<ExportDeclaration>)
                .delete(delete_document::<ExportDeclaration>),
        )
        .route("/api/export/:id", get(get_document::<ExportDeclaration>))
        .route("/api/export/:id/csv", get(export_csv));

    let livraison_routes = Router::new()
        .route(
            "/api/livraison",
            get(list_documents::<Livraison>)
                .post(create_document::<Livraison>)
                .put(update_document::<Livraison>)
                .delete(delete_document::<Livraison>),
        )
        .route("/api/livraison/:id", get(get_document::<Livraison>));

    let catalog_routes = Router::new()
        .route("/api/client", get(catalog::list_clients))
        .route(
            "/api/client-model",
            get(catalog::list_client_models)
                .post(catalog::create_client_model)
                .put(catalog::update_client_model)
                .delete(catalog::delete_client_model),
        )
        .route(
            "/api/commande",
            get(catalog::list_commandes).post(catalog::create_commande),
        );

    Router::new()
        .route("/health", get(health_check))
        .merge(export_routes)
        .merge(livraison_routes)
        .merge(catalog_routes)
        .with_state(state)
}
