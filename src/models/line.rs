use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use crate::editor::coerce;

/// 可编辑的行字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineField {
    Commande,
    Modele,
    Description,
    Quantity,
    UnitPrice,
    Excluded,
}

impl LineField {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineField::Commande => "commande",
            LineField::Modele => "modele",
            LineField::Description => "description",
            LineField::Quantity => "quantity",
            LineField::UnitPrice => "unitPrice",
            LineField::Excluded => "isExcluded",
        }
    }
}

impl fmt::Display for LineField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 行项目的公共行为 (出口行 / 交货行)
pub trait LineItem: Clone + PartialEq + fmt::Debug + Send + Sync {
    /// 新建默认行: 数量 1, 其余为空
    fn blank(id: String, parent_id: &str) -> Self;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    fn parent_id(&self) -> &str;

    fn set_parent_id(&mut self, parent_id: &str);

    /// 负数量/单价归零, 有改动时返回 true
    fn clamp_negatives(&mut self) -> bool;

    /// 将原始输入写入字段, 该变体没有的字段返回 false
    fn apply_field(&mut self, field: LineField, raw: &str) -> bool;

    /// 行金额 (仅出口行有单价)
    fn amount(&self) -> Option<BigDecimal> {
        None
    }

    fn is_excluded(&self) -> bool {
        false
    }
}

/// 出口申报行 (ExportLine)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportLine {
    pub id: String,
    #[serde(default)]
    pub commande: String,
    #[serde(default)]
    pub modele: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default = "BigDecimal::zero")]
    pub unit_price: BigDecimal,
    #[serde(default)]
    pub is_excluded: bool,
    #[serde(default)]
    pub export_id: String,
}

impl LineItem for ExportLine {
    fn blank(id: String, parent_id: &str) -> Self {
        Self {
            id,
            commande: String::new(),
            modele: String::new(),
            description: String::new(),
            quantity: 1,
            unit_price: BigDecimal::zero(),
            is_excluded: false,
            export_id: parent_id.to_string(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn parent_id(&self) -> &str {
        &self.export_id
    }

    fn set_parent_id(&mut self, parent_id: &str) {
        self.export_id = parent_id.to_string();
    }

    fn clamp_negatives(&mut self) -> bool {
        let mut changed = false;
        if self.quantity < 0 {
            self.quantity = 0;
            changed = true;
        }
        if self.unit_price < BigDecimal::zero() {
            self.unit_price = BigDecimal::zero();
            changed = true;
        }
        changed
    }

    fn apply_field(&mut self, field: LineField, raw: &str) -> bool {
        match field {
            LineField::Commande => self.commande = raw.to_string(),
            LineField::Modele => self.modele = raw.to_string(),
            LineField::Description => self.description = raw.to_string(),
            LineField::Quantity => self.quantity = coerce::parse_quantity(raw),
            LineField::UnitPrice => self.unit_price = coerce::parse_unit_price(raw),
            LineField::Excluded => self.is_excluded = coerce::parse_flag(raw),
        }
        true
    }

    fn amount(&self) -> Option<BigDecimal> {
        Some(BigDecimal::from(self.quantity) * &self.unit_price)
    }

    fn is_excluded(&self) -> bool {
        self.is_excluded
    }
}

/// 交货行 (LivraisonLine)
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivraisonLine {
    pub id: String,
    #[serde(default)]
    pub modele: String,
    #[serde(default)]
    pub commande: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub livraison_id: String,
}

impl LineItem for LivraisonLine {
    fn blank(id: String, parent_id: &str) -> Self {
        Self {
            id,
            modele: String::new(),
            commande: String::new(),
            description: String::new(),
            quantity: 1,
            livraison_id: parent_id.to_string(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn parent_id(&self) -> &str {
        &self.livraison_id
    }

    fn set_parent_id(&mut self, parent_id: &str) {
        self.livraison_id = parent_id.to_string();
    }

    fn clamp_negatives(&mut self) -> bool {
        if self.quantity < 0 {
            self.quantity = 0;
            return true;
        }
        false
    }

    fn apply_field(&mut self, field: LineField, raw: &str) -> bool {
        match field {
            LineField::Commande => self.commande = raw.to_string(),
            LineField::Modele => self.modele = raw.to_string(),
            LineField::Description => self.description = raw.to_string(),
            LineField::Quantity => self.quantity = coerce::parse_quantity(raw),
            LineField::UnitPrice | LineField::Excluded => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_export_line_defaults() {
        let line = ExportLine::blank("1".to_string(), "exp-1");
        assert_eq!(line.quantity, 1);
        assert_eq!(line.unit_price, BigDecimal::zero());
        assert!(!line.is_excluded);
        assert_eq!(line.export_id, "exp-1");
        assert!(line.commande.is_empty());
    }

    #[test]
    fn test_livraison_line_ignores_price_fields() {
        let mut line = LivraisonLine::blank("1".to_string(), "liv-1");
        let before = line.clone();
        assert!(!line.apply_field(LineField::UnitPrice, "12.5"));
        assert!(!line.apply_field(LineField::Excluded, "true"));
        assert_eq!(line, before);
        assert_eq!(line.amount(), None);
    }

    #[test]
    fn test_export_line_json_shape() {
        let mut line = ExportLine::blank("1700000000000".to_string(), "exp-1");
        line.unit_price = BigDecimal::from_str("2.5").unwrap();
        let value = serde_json::to_value(&line).unwrap();
        assert_eq!(value["id"], "1700000000000");
        assert_eq!(value["exportId"], "exp-1");
        assert_eq!(value["isExcluded"], false);
        assert!(value.get("unitPrice").is_some());
    }

    #[test]
    fn test_export_line_accepts_numeric_unit_price() {
        let json = r#"{"id":"1","commande":"OPR1","modele":"M","description":"d",
            "quantity":3,"unitPrice":2.5,"isExcluded":false,"exportId":"e"}"#;
        let line: ExportLine = serde_json::from_str(json).unwrap();
        assert_eq!(line.unit_price, BigDecimal::from_str("2.5").unwrap());
        assert_eq!(line.quantity, 3);
    }

    #[test]
    fn test_line_field_wire_names() {
        assert_eq!(LineField::UnitPrice.to_string(), "unitPrice");
        assert_eq!(LineField::Excluded.as_str(), "isExcluded");
        assert_eq!(LineField::Quantity.to_string(), "quantity");
    }

    #[test]
    fn test_clamp_negatives() {
        let mut line = ExportLine::blank("1".to_string(), "e");
        line.quantity = -3;
        line.unit_price = BigDecimal::from_str("-2.5").unwrap();
        assert!(line.clamp_negatives());
        assert_eq!(line.quantity, 0);
        assert_eq!(line.unit_price, BigDecimal::zero());
        assert!(!line.clamp_negatives());

        let mut delivery = LivraisonLine::blank("1".to_string(), "l");
        delivery.quantity = -1;
        assert!(delivery.clamp_negatives());
        assert_eq!(delivery.quantity, 0);
    }
}
