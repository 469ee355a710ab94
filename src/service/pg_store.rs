use sqlx::PgPool;
use std::future::Future;
use std::time::{Duration, Instant};

use super::store::DocumentStore;
use crate::db::queries;
use crate::error::AppError;
use crate::models::{ExportDeclaration, LineDocument, Livraison};

/// PostgreSQL 单据存储
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    write_timeout: Duration,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool, write_timeout: Duration) -> Self {
        Self {
            pool,
            write_timeout,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 写操作统一加超时并记录耗时
    async fn timed_write<T>(
        &self,
        label: &str,
        write: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        let start = Instant::now();
        match tokio::time::timeout(self.write_timeout, write).await {
            Ok(Ok(value)) => {
                tracing::info!("✓ {} 成功, 耗时: {:?}", label, start.elapsed());
                Ok(value)
            }
            Ok(Err(e)) => {
                tracing::error!("✗ {} 失败, 耗时: {:?}, 错误: {:?}", label, start.elapsed(), e);
                Err(e)
            }
            Err(_) => {
                tracing::error!("✗ {} 超时 (>{:?})!", label, self.write_timeout);
                Err(AppError::Timeout(self.write_timeout))
            }
        }
    }
}

impl DocumentStore<ExportDeclaration> for PgDocumentStore {
    async fn load(&self, id: &str) -> Result<Option<ExportDeclaration>, AppError> {
        Ok(queries::get_export(&self.pool, id).await?)
    }

    async fn list(&self, owner_email: &str) -> Result<Vec<ExportDeclaration>, AppError> {
        Ok(queries::list_exports(&self.pool, owner_email).await?)
    }

    async fn create(&self, document: &ExportDeclaration) -> Result<ExportDeclaration, AppError> {
        let id = self
            .timed_write("INSERT export", async {
                let mut tx = self.pool.begin().await?;
                let id = queries::insert_export(&mut tx, document).await?;
                queries::replace_export_lines(&mut tx, &id, document.lines()).await?;
                tx.commit().await?;
                Ok::<_, AppError>(id)
            })
            .await?;
        queries::get_export(&self.pool, &id)
            .await?
            .ok_or_else(|| AppError::not_found("export", id))
    }

    async fn update(&self, document: &ExportDeclaration) -> Result<ExportDeclaration, AppError> {
        let id = document.id();
        self.timed_write("UPDATE export", async {
            let mut tx = self.pool.begin().await?;
            if queries::update_export_header(&mut tx, document).await? == 0 {
                return Err(AppError::not_found("export", id));
            }
            queries::replace_export_lines(&mut tx, id, document.lines()).await?;
            tx.commit().await?;
            Ok::<_, AppError>(())
        })
        .await?;
        queries::get_export(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("export", id))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.timed_write("DELETE export", async {
            let mut tx = self.pool.begin().await?;
            if queries::delete_export(&mut tx, id).await? == 0 {
                return Err(AppError::not_found("export", id));
            }
            tx.commit().await?;
            Ok::<_, AppError>(())
        })
        .await
    }
}

impl DocumentStore<Livraison> for PgDocumentStore {
    async fn load(&self, id: &str) -> Result<Option<Livraison>, AppError> {
        Ok(queries::get_livraison(&self.pool, id).await?)
    }

    async fn list(&self, owner_email: &str) -> Result<Vec<Livraison>, AppError> {
        Ok(queries::list_livraisons(&self.pool, owner_email).await?)
    }

    async fn create(&self, document: &Livraison) -> Result<Livraison, AppError> {
        let id = self
            .timed_write("INSERT livraison", async {
                let mut tx = self.pool.begin().await?;
                let id = queries::insert_livraison(&mut tx, document).await?;
                queries::replace_livraison_lines(&mut tx, &id, document.lines()).await?;
                tx.commit().await?;
                Ok::<_, AppError>(id)
            })
            .await?;
        queries::get_livraison(&self.pool, &id)
            .await?
            .ok_or_else(|| AppError::not_found("livraison", id))
    }

    async fn update(&self, document: &Livraison) -> Result<Livraison, AppError> {
        let id = document.id();
        self.timed_write("UPDATE livraison", async {
            let mut tx = self.pool.begin().await?;
            if queries::update_livraison_header(&mut tx, document).await? == 0 {
                return Err(AppError::not_found("livraison", id));
            }
            queries::replace_livraison_lines(&mut tx, id, document.lines()).await?;
            tx.commit().await?;
            Ok::<_, AppError>(())
        })
        .await?;
        queries::get_livraison(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("livraison", id))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.timed_write("DELETE livraison", async {
            let mut tx = self.pool.begin().await?;
            if queries::delete_livraison(&mut tx, id).await? == 0 {
                return Err(AppError::not_found("livraison", id));
            }
            tx.commit().await?;
            Ok::<_, AppError>(())
        })
        .await
    }
}
