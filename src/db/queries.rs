use crate::models::{ExportDeclaration, ExportLine, Livraison, LivraisonLine};
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;

/// 每条 INSERT 的最大行数 (Postgres 单语句绑定参数上限 65535, 每行最多 9 个参数)
pub const LINE_INSERT_CHUNK: usize = 1000;

/// 按 LINE_INSERT_CHUNK 分块, 附带每块首行的位置
fn line_chunks<L>(lines: &[L]) -> impl Iterator<Item = (usize, &[L])> {
    lines
        .chunks(LINE_INSERT_CHUNK)
        .enumerate()
        .map(|(index, chunk)| (index * LINE_INSERT_CHUNK, chunk))
}

/// 查询出口申报单 (含明细行)
pub async fn get_export(
    pool: &PgPool,
    export_id: &str,
) -> Result<Option<ExportDeclaration>, sqlx::Error> {
    let header = sqlx::query_as::<_, ExportDeclaration>(
        r#"
        SELECT id, email, client_name, client_id, declaration_date, lot_number, created_at
        FROM export_declaration
        WHERE id = $1
        "#,
    )
    .bind(export_id)
    .fetch_optional(pool)
    .await?;

    let Some(mut declaration) = header else {
        return Ok(None);
    };
    declaration.lines = list_export_lines(pool, &[declaration.id.clone()])
        .await?
        .remove(&declaration.id)
        .unwrap_or_default();
    Ok(Some(declaration))
}

/// 按所有者查询出口申报单
pub async fn list_exports(
    pool: &PgPool,
    email: &str,
) -> Result<Vec<ExportDeclaration>, sqlx::Error> {
    let mut declarations = sqlx::query_as::<_, ExportDeclaration>(
        r#"
        SELECT id, email, client_name, client_id, declaration_date, lot_number, created_at
        FROM export_declaration
        WHERE email = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(email)
    .fetch_all(pool)
    .await?;

    let ids: Vec<String> = declarations.iter().map(|d| d.id.clone()).collect();
    let mut lines = list_export_lines(pool, &ids).await?;
    for declaration in &mut declarations {
        declaration.lines = lines.remove(&declaration.id).unwrap_or_default();
    }
    Ok(declarations)
}

/// 批量查询明细行, 按父单据分组, 保持插入顺序
async fn list_export_lines(
    pool: &PgPool,
    export_ids: &[String],
) -> Result<HashMap<String, Vec<ExportLine>>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ExportLine>(
        r#"
        SELECT id, commande, modele, description, quantity, unit_price, is_excluded, export_id
        FROM export_line
        WHERE export_id = ANY($1)
        ORDER BY export_id, position
        "#,
    )
    .bind(export_ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<String, Vec<ExportLine>> = HashMap::new();
    for row in rows {
        grouped.entry(row.export_id.clone()).or_default().push(row);
    }
    Ok(grouped)
}

/// 新建出口申报单, 返回服务端生成的 ID
pub async fn insert_export(
    tx: &mut Transaction<'_, Postgres>,
    declaration: &ExportDeclaration,
) -> Result<String, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        r#"
        INSERT INTO export_declaration (id, email, client_name, client_id, declaration_date, lot_number, created_at)
        VALUES (gen_random_uuid()::text, $1, $2, $3, $4, $5, now())
        RETURNING id
        "#,
    )
    .bind(&declaration.email)
    .bind(&declaration.client_name)
    .bind(&declaration.client_id)
    .bind(declaration.declaration_date)
    .bind(&declaration.lot_number)
    .fetch_one(&mut **tx)
    .await
}

/// 更新表头, 返回影响行数
pub async fn update_export_header(
    tx: &mut Transaction<'_, Postgres>,
    declaration: &ExportDeclaration,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE export_declaration
        SET client_name = $2, client_id = $3, declaration_date = $4, lot_number = $5
        WHERE id = $1
        "#,
    )
    .bind(&declaration.id)
    .bind(&declaration.client_name)
    .bind(&declaration.client_id)
    .bind(declaration.declaration_date)
    .bind(&declaration.lot_number)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected())
}

/// 整体替换明细行
pub async fn replace_export_lines(
    tx: &mut Transaction<'_, Postgres>,
    export_id: &str,
    lines: &[ExportLine],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM export_line WHERE export_id = $1")
        .bind(export_id)
        .execute(&mut **tx)
        .await?;

    if lines.is_empty() {
        return Ok(());
    }

    tracing::debug!("批量插入 {} 条出口明细, 单据 {}", lines.len(), export_id);
    let mut inserted = 0;
    for (offset, chunk) in line_chunks(lines) {
        let mut query_builder = sqlx::QueryBuilder::new(
            "INSERT INTO export_line (
                export_id, id, position, commande, modele, description,
                quantity, unit_price, is_excluded
            ) ",
        );

        query_builder.push_values(chunk.iter().enumerate(), |mut b, (i, line)| {
            b.push_bind(export_id.to_string())
                .push_bind(line.id.clone())
                .push_bind((offset + i) as i32)
                .push_bind(line.commande.clone())
                .push_bind(line.modele.clone())
                .push_bind(line.description.clone())
                .push_bind(line.quantity)
                .push_bind(line.unit_price.clone())
                .push_bind(line.is_excluded);
        });

        inserted += query_builder.build().execute(&mut **tx).await?.rows_affected();
    }
    tracing::debug!("出口明细插入完成, 影响 {} 行", inserted);
    Ok(())
}

/// 删除出口申报单及其明细, 返回表头影响行数
pub async fn delete_export(
    tx: &mut Transaction<'_, Postgres>,
    export_id: &str,
) -> Result<u64, sqlx::Error> {
    sqlx::query("DELETE FROM export_line WHERE export_id = $1")
        .bind(export_id)
        .execute(&mut **tx)
        .await?;
    let result = sqlx::query("DELETE FROM export_declaration WHERE id = $1")
        .bind(export_id)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}

/// 查询交货单 (含明细行)
pub async fn get_livraison(
    pool: &PgPool,
    livraison_id: &str,
) -> Result<Option<Livraison>, sqlx::Error> {
    let header = sqlx::query_as::<_, Livraison>(
        r#"
        SELECT id, email, client_name, delivery_date, created_at
        FROM livraison
        WHERE id = $1
        "#,
    )
    .bind(livraison_id)
    .fetch_optional(pool)
    .await?;

    let Some(mut livraison) = header else {
        return Ok(None);
    };
    livraison.lines = list_livraison_lines(pool, &[livraison.id.clone()])
        .await?
        .remove(&livraison.id)
        .unwrap_or_default();
    Ok(Some(livraison))
}

/// 按所有者查询交货单
pub async fn list_livraisons(pool: &PgPool, email: &str) -> Result<Vec<Livraison>, sqlx::Error> {
    let mut livraisons = sqlx::query_as::<_, Livraison>(
        r#"
        SELECT id, email, client_name, delivery_date, created_at
        FROM livraison
        WHERE email = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(email)
    .fetch_all(pool)
    .await?;

    let ids: Vec<String> = livraisons.iter().map(|l| l.id.clone()).collect();
    let mut lines = list_livraison_lines(pool, &ids).await?;
    for livraison in &mut livraisons {
        livraison.lines = lines.remove(&livraison.id).unwrap_or_default();
    }
    Ok(livraisons)
}

async fn list_livraison_lines(
    pool: &PgPool,
    livraison_ids: &[String],
) -> Result<HashMap<String, Vec<LivraisonLine>>, sqlx::Error> {
    let rows = sqlx::query_as::<_, LivraisonLine>(
        r#"
        SELECT id, modele, commande, description, quantity, livraison_id
        FROM livraison_line
        WHERE livraison_id = ANY($1)
        ORDER BY livraison_id, position
        "#,
    )
    .bind(livraison_ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<String, Vec<LivraisonLine>> = HashMap::new();
    for row in rows {
        grouped.entry(row.livraison_id.clone()).or_default().push(row);
    }
    Ok(grouped)
}

pub async fn insert_livraison(
    tx: &mut Transaction<'_, Postgres>,
    livraison: &Livraison,
) -> Result<String, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        r#"
        INSERT INTO livraison (id, email, client_name, delivery_date, created_at)
        VALUES (gen_random_uuid()::text, $1, $2, $3, now())
        RETURNING id
        "#,
    )
    .bind(&livraison.email)
    .bind(&livraison.client_name)
    .bind(livraison.delivery_date)
    .fetch_one(&mut **tx)
    .await
}

pub async fn update_livraison_header(
    tx: &mut Transaction<'_, Postgres>,
    livraison: &Livraison,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE livraison
        SET client_name = $2, delivery_date = $3
        WHERE id = $1
        "#,
    )
    .bind(&livraison.id)
    .bind(&livraison.client_name)
    .bind(livraison.delivery_date)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected())
}

pub async fn replace_livraison_lines(
    tx: &mut Transaction<'_, Postgres>,
    livraison_id: &str,
    lines: &[LivraisonLine],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM livraison_line WHERE livraison_id = $1")
        .bind(livraison_id)
        .execute(&mut **tx)
        .await?;

    if lines.is_empty() {
        return Ok(());
    }

    tracing::debug!("批量插入 {} 条交货明细, 单据 {}", lines.len(), livraison_id);
    let mut inserted = 0;
    for (offset, chunk) in line_chunks(lines) {
        let mut query_builder = sqlx::QueryBuilder::new(
            "INSERT INTO livraison_line (
                livraison_id, id, position, modele, commande, description, quantity
            ) ",
        );

        query_builder.push_values(chunk.iter().enumerate(), |mut b, (i, line)| {
            b.push_bind(livraison_id.to_string())
                .push_bind(line.id.clone())
                .push_bind((offset + i) as i32)
                .push_bind(line.modele.clone())
                .push_bind(line.commande.clone())
                .push_bind(line.description.clone())
                .push_bind(line.quantity);
        });

        inserted += query_builder.build().execute(&mut **tx).await?.rows_affected();
    }
    tracing::debug!("交货明细插入完成, 影响 {} 行", inserted);
    Ok(())
}

pub async fn delete_livraison(
    tx: &mut Transaction<'_, Postgres>,
    livraison_id: &str,
) -> Result<u64, sqlx::Error> {
    sqlx::query("DELETE FROM livraison_line WHERE livraison_id = $1")
        .bind(livraison_id)
        .execute(&mut **tx)
        .await?;
    let result = sqlx::query("DELETE FROM livraison WHERE id = $1")
        .bind(livraison_id)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}
