use crate::models::{
    Client, ClientModel, ClientModelDraft, ClientModelFilter, ClientModelRow, Commande,
};
use sqlx::types::Json;
use sqlx::PgPool;

/// 查询所有者名下的客户
pub async fn list_clients(pool: &PgPool, email: &str) -> Result<Vec<Client>, sqlx::Error> {
    sqlx::query_as::<_, Client>(
        r#"
        SELECT id, name
        FROM client
        WHERE email = $1
        ORDER BY name
        "#,
    )
    .bind(email)
    .fetch_all(pool)
    .await
}

/// 查询客户模型目录 (未去重)
pub async fn list_client_models(
    pool: &PgPool,
    filter: &ClientModelFilter,
) -> Result<Vec<ClientModel>, sqlx::Error> {
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s));

    let rows = sqlx::query_as::<_, ClientModelRow>(
        r#"
        SELECT m.id, m.name, m.description, m.commandes, m.commandes_with_variants,
               m.lotto, m.ordine, m.puht, m.client_id, c.name as client_name,
               m.variants, m.created_at
        FROM client_model m
        LEFT JOIN client c ON c.id = m.client_id
        WHERE m.email = $1
          AND ($2::text IS NULL OR m.client_id = $2)
          AND ($3::text IS NULL OR m.name ILIKE $3 OR c.name ILIKE $3)
          AND ($4::date IS NULL OR m.created_at >= $4)
          AND ($5::date IS NULL OR m.created_at < $5 + 1)
        ORDER BY m.created_at DESC
        "#,
    )
    .bind(&filter.email)
    .bind(&filter.client_id)
    .bind(search)
    .bind(filter.date_debut)
    .bind(filter.date_fin)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ClientModel::from).collect())
}

/// 新建客户模型, 返回 ID
pub async fn insert_client_model(
    pool: &PgPool,
    email: &str,
    draft: &ClientModelDraft,
) -> Result<String, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        r#"
        INSERT INTO client_model (
            id, email, name, description, commandes, commandes_with_variants,
            variants, lotto, ordine, puht, client_id, created_at
        )
        VALUES (gen_random_uuid()::text, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now())
        RETURNING id
        "#,
    )
    .bind(email)
    .bind(&draft.name)
    .bind(&draft.description)
    .bind(&draft.commandes)
    .bind(Json(&draft.commandes_with_variants))
    .bind(Json(&draft.variants))
    .bind(&draft.lotto)
    .bind(&draft.ordine)
    .bind(&draft.puht)
    .bind(&draft.client_id)
    .fetch_one(pool)
    .await
}

/// 更新客户模型, 返回影响行数
pub async fn update_client_model(
    pool: &PgPool,
    id: &str,
    draft: &ClientModelDraft,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE client_model
        SET name = $2, description = $3, commandes = $4, commandes_with_variants = $5,
            variants = $6, lotto = $7, ordine = $8, puht = $9, client_id = $10
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&draft.name)
    .bind(&draft.description)
    .bind(&draft.commandes)
    .bind(Json(&draft.commandes_with_variants))
    .bind(Json(&draft.variants))
    .bind(&draft.lotto)
    .bind(&draft.ordine)
    .bind(&draft.puht)
    .bind(&draft.client_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_client_model(pool: &PgPool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM client_model WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// 查询所有者的 commande 列表
pub async fn list_commandes(pool: &PgPool, email: &str) -> Result<Vec<Commande>, sqlx::Error> {
    sqlx::query_as::<_, Commande>(
        r#"
        SELECT id, name, email, created_at
        FROM commande
        WHERE email = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(email)
    .fetch_all(pool)
    .await
}

pub async fn insert_commande(
    pool: &PgPool,
    email: &str,
    name: &str,
) -> Result<Commande, sqlx::Error> {
    sqlx::query_as::<_, Commande>(
        r#"
        INSERT INTO commande (id, name, email, created_at)
        VALUES (gen_random_uuid()::text, $1, $2, now())
        RETURNING id, name, email, created_at
        "#,
    )
    .bind(name)
    .bind(email)
    .fetch_one(pool)
    .await
}
