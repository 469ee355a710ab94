use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

/// commande 名称最大长度 (字符)
pub const COMMANDE_NAME_MAX: usize = 60;

/// 订单 (Commande)
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commande {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// 创建请求体
#[derive(Debug, Clone, Deserialize)]
pub struct NewCommande {
    pub email: String,
    pub name: String,
}

/// 校验并返回去除首尾空白后的名称
pub fn validate_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Commande name must not be empty".to_string()));
    }
    if trimmed.chars().count() > COMMANDE_NAME_MAX {
        return Err(AppError::Validation(format!(
            "Commande name must be at most {} characters",
            COMMANDE_NAME_MAX
        )));
    }
    Ok(trimmed.to_string())
}

/// 按名称或 id 过滤, 不区分大小写
pub fn filter_commandes<'a>(commandes: &'a [Commande], term: &str) -> Vec<&'a Commande> {
    let term = term.to_lowercase();
    commandes
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&term) || c.id.to_lowercase().contains(&term))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commande(id: &str, name: &str) -> Commande {
        Commande {
            id: id.to_string(),
            name: name.to_string(),
            email: "a@b.c".to_string(),
            created_at: None,
        }
    }

    #[test]
    fn test_validate_name_trims() {
        assert_eq!(validate_name("  OPR3328 ").unwrap(), "OPR3328");
    }

    #[test]
    fn test_validate_name_rejects_blank_and_long() {
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"é".repeat(60)).is_ok());
        assert!(validate_name(&"x".repeat(61)).is_err());
    }

    #[test]
    fn test_filter_commandes() {
        let list = vec![commande("abc1", "Printemps"), commande("xyz2", "Hiver")];
        assert_eq!(filter_commandes(&list, "PRINT").len(), 1);
        assert_eq!(filter_commandes(&list, "XYZ")[0].name, "Hiver");
        assert_eq!(filter_commandes(&list, "").len(), 2);
    }
}
