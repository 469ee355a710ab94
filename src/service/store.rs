use std::future::Future;

use crate::error::AppError;
use crate::models::LineDocument;

/// 单据持久化协作方
///
/// 服务端由 [`PgDocumentStore`](super::PgDocumentStore) 实现, 前端/远程调用由
/// [`HttpDocumentStore`](super::HttpDocumentStore) 实现.
pub trait DocumentStore<D: LineDocument>: Send + Sync {
    fn load(&self, id: &str) -> impl Future<Output = Result<Option<D>, AppError>> + Send;

    fn list(&self, owner_email: &str) -> impl Future<Output = Result<Vec<D>, AppError>> + Send;

    /// 新建单据, 返回带服务端 ID 的单据
    fn create(&self, document: &D) -> impl Future<Output = Result<D, AppError>> + Send;

    fn update(&self, document: &D) -> impl Future<Output = Result<D, AppError>> + Send;

    fn delete(&self, id: &str) -> impl Future<Output = Result<(), AppError>> + Send;

    /// 无 ID 时新建, 否则更新
    fn save(&self, document: &D) -> impl Future<Output = Result<D, AppError>> + Send {
        async move {
            if document.is_new() {
                self.create(document).await
            } else {
                self.update(document).await
            }
        }
    }
}
