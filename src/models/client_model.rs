use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::error::AppError;

/// 客户 (Client)
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
}

/// 变体: commande 下的子选项及其数量
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub qte_variante: i64,
}

/// 一个 commande 及其变体列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandeVariants {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

/// 客户模型目录条目 (ClientModel)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientModel {
    pub id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub commandes: String,
    #[serde(default)]
    pub commandes_with_variants: Vec<CommandeVariants>,
    pub lotto: Option<String>,
    pub ordine: Option<String>,
    pub puht: Option<BigDecimal>,
    pub client_id: String,
    pub client: Option<Client>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    pub created_at: Option<DateTime<Utc>>,
}

/// 数据库行 (JSONB 列通过 sqlx Json 解码)
#[derive(Debug, Clone, FromRow)]
pub struct ClientModelRow {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub commandes: Option<String>,
    pub commandes_with_variants: Option<Json<Vec<CommandeVariants>>>,
    pub lotto: Option<String>,
    pub ordine: Option<String>,
    pub puht: Option<BigDecimal>,
    pub client_id: String,
    pub client_name: Option<String>,
    pub variants: Option<Json<Vec<Variant>>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ClientModelRow> for ClientModel {
    fn from(row: ClientModelRow) -> Self {
        let client = row.client_name.map(|name| Client {
            id: row.client_id.clone(),
            name,
        });
        Self {
            id: row.id,
            name: row.name,
            description: row.description.unwrap_or_default(),
            commandes: row.commandes.unwrap_or_default(),
            commandes_with_variants: row.commandes_with_variants.map(|j| j.0).unwrap_or_default(),
            lotto: row.lotto,
            ordine: row.ordine,
            puht: row.puht,
            client_id: row.client_id,
            client,
            variants: row.variants.map(|j| j.0).unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

/// 客户模型表单提交体
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientModelForm {
    pub id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub commandes_with_variants: Vec<CommandeVariants>,
    pub lotto: Option<String>,
    pub ordine: Option<String>,
    pub puht: Option<BigDecimal>,
    #[serde(default)]
    pub client_id: String,
}

/// 整理后可直接落库的客户模型
#[derive(Debug, Clone, PartialEq)]
pub struct ClientModelDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub commandes: Option<String>,
    pub commandes_with_variants: Vec<CommandeVariants>,
    pub variants: Vec<Variant>,
    pub lotto: Option<String>,
    pub ordine: Option<String>,
    pub puht: Option<BigDecimal>,
    pub client_id: String,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ClientModelForm {
    /// 非空 commande 以逗号拼接
    pub fn combined_commandes(&self) -> Option<String> {
        let joined = self
            .commandes_with_variants
            .iter()
            .map(|c| c.value.as_str())
            .filter(|v| !v.trim().is_empty())
            .collect::<Vec<_>>()
            .join(",");
        if joined.is_empty() {
            None
        } else {
            Some(joined)
        }
    }

    /// 展平变体, 名称形如 "OPR3328:defaut"
    pub fn flattened_variants(&self) -> Vec<Variant> {
        self.commandes_with_variants
            .iter()
            .flat_map(|c| {
                c.variants
                    .iter()
                    .filter(|v| !v.name.trim().is_empty())
                    .map(move |v| Variant {
                        id: v.id.clone(),
                        name: format!("{}:{}", c.value, v.name),
                        qte_variante: v.qte_variante,
                    })
            })
            .collect()
    }

    pub fn into_draft(self) -> Result<ClientModelDraft, AppError> {
        if self.client_id.trim().is_empty() {
            return Err(AppError::Validation("clientId is required".to_string()));
        }
        let commandes = self.combined_commandes();
        let variants = self.flattened_variants();
        let commandes_with_variants = self
            .commandes_with_variants
            .into_iter()
            .filter(|c| !c.value.trim().is_empty())
            .collect();

        Ok(ClientModelDraft {
            name: blank_to_none(self.name),
            description: blank_to_none(self.description),
            commandes,
            commandes_with_variants,
            variants,
            lotto: blank_to_none(self.lotto),
            ordine: blank_to_none(self.ordine),
            puht: self.puht.filter(|p| *p != BigDecimal::from(0)),
            client_id: self.client_id,
        })
    }
}

/// 目录查询条件
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientModelFilter {
    pub email: String,
    pub client_id: Option<String>,
    pub search: Option<String>,
    pub date_debut: Option<NaiveDate>,
    pub date_fin: Option<NaiveDate>,
}

/// 按 (clientId, name) 去重: 保留最后一条, 顺序按首次出现
pub fn dedup_models(models: Vec<ClientModel>) -> Vec<ClientModel> {
    let mut unique: IndexMap<(String, Option<String>), ClientModel> = IndexMap::new();
    for model in models {
        unique.insert((model.client_id.clone(), model.name.clone()), model);
    }
    unique.into_values().collect()
}
