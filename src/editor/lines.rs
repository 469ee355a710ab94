//! 行集合编辑操作
//!
//! 每个操作都接收当前单据并返回一张新单据: 行数组整体重建, 只有目标行
//! 被替换/追加/删除, 其余行按值保持不变. 操作本身从不报错.

use bigdecimal::{BigDecimal, Zero};

use super::LineKey;
use crate::models::{ClientModel, ExportLine, LineDocument, LineField, LineItem};

/// 修改一个字段 (原始文本输入)
pub fn update_field<'k, D: LineDocument>(
    document: &D,
    key: impl Into<LineKey<'k>>,
    field: LineField,
    raw: &str,
) -> D {
    replace_line(document, key.into(), |line| {
        if !line.apply_field(field, raw) {
            tracing::debug!("field {} not carried by {:?} lines, ignored", field, D::RESOURCE);
        }
    })
}

/// 选择客户模型: 命中时覆盖 commande 与 description, 未命中时清空两者
pub fn bind_model<'k, D>(
    document: &D,
    key: impl Into<LineKey<'k>>,
    model_name: &str,
    catalog: &[ClientModel],
) -> D
where
    D: LineDocument<Line = ExportLine>,
{
    let selected = catalog
        .iter()
        .find(|model| model.name.as_deref() == Some(model_name));

    replace_line(document, key.into(), |line| {
        line.modele = model_name.to_string();
        match selected {
            Some(model) => {
                line.commande = model.commandes.clone();
                line.description = model.description.clone();
            }
            None => {
                line.commande.clear();
                line.description.clear();
            }
        }
    })
}

/// 删除一行, 之后的行下标前移
pub fn remove_line<'k, D: LineDocument>(document: &D, key: impl Into<LineKey<'k>>) -> D {
    let key = key.into();
    let Some(position) = key.resolve(document.lines()) else {
        tracing::debug!("remove_line: {} not found, document unchanged", key);
        return document.clone();
    };

    let lines = document
        .lines()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != position)
        .map(|(_, line)| line.clone())
        .collect();
    document.with_lines(lines)
}

/// 行金额 quantity * unitPrice, 每次现算
pub fn compute_line_amount(line: &ExportLine) -> BigDecimal {
    BigDecimal::from(line.quantity) * &line.unit_price
}

/// 金额显示: 保留两位小数
pub fn display_amount(amount: &BigDecimal) -> String {
    amount.round(2).with_scale(2).to_string()
}

/// 未排除行的金额合计
pub fn compute_total<D: LineDocument>(document: &D) -> BigDecimal {
    document
        .lines()
        .iter()
        .filter(|line| !line.is_excluded())
        .filter_map(|line| line.amount())
        .fold(BigDecimal::zero(), |acc, amount| acc + amount)
}

fn replace_line<D: LineDocument>(
    document: &D,
    key: LineKey<'_>,
    edit: impl FnOnce(&mut D::Line),
) -> D {
    let Some(position) = key.resolve(document.lines()) else {
        tracing::debug!("{} not found, document unchanged", key);
        return document.clone();
    };

    let mut edit = Some(edit);
    let lines = document
        .lines()
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let mut next = line.clone();
            if i == position {
                if let Some(edit) = edit.take() {
                    edit(&mut next);
                }
            }
            next
        })
        .collect();
    document.with_lines(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExportDeclaration, Livraison, LivraisonLine};
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn export_line(id: &str, quantity: i64, price: &str) -> ExportLine {
        ExportLine {
            quantity,
            unit_price: dec(price),
            ..ExportLine::blank(id.to_string(), "exp-1")
        }
    }

    fn declaration() -> ExportDeclaration {
        ExportDeclaration {
            id: "exp-1".to_string(),
            lines: vec![
                export_line("1", 3, "2.5"),
                export_line("2", 1, "10"),
                export_line("3", 2, "1.25"),
            ],
            ..ExportDeclaration::new("a@b.c", "ACME")
        }
    }

    fn catalog() -> Vec<ClientModel> {
        vec![ClientModel {
            id: "m1".to_string(),
            name: Some("Polo".to_string()),
            description: "Polo coton".to_string(),
            commandes: "OPR3328".to_string(),
            commandes_with_variants: Vec::new(),
            lotto: None,
            ordine: None,
            puht: None,
            client_id: "c1".to_string(),
            client: None,
            variants: Vec::new(),
            created_at: None,
        }]
    }

    #[test]
    fn test_update_field_touches_only_target() {
        let before = declaration();
        let after = update_field(&before, LineKey::At(1), LineField::Description, "Chemise");

        assert_eq!(after.lines.len(), before.lines.len());
        assert_eq!(after.lines[0], before.lines[0]);
        assert_eq!(after.lines[2], before.lines[2]);
        assert_eq!(after.lines[1].description, "Chemise");
        assert_eq!(before.lines[1].description, "");
    }

    #[test]
    fn test_update_field_by_id() {
        let after = update_field(&declaration(), "3", LineField::Quantity, "8");
        assert_eq!(after.lines[2].quantity, 8);
        assert_eq!(after.lines[0].quantity, 3);
    }

    #[test]
    fn test_update_field_empty_quantity_is_zero() {
        let after = update_field(&declaration(), LineKey::At(0), LineField::Quantity, "");
        assert_eq!(after.lines[0].quantity, 0);
    }

    #[test]
    fn test_update_field_out_of_range_is_noop() {
        let before = declaration();
        assert_eq!(update_field(&before, LineKey::At(9), LineField::Quantity, "4"), before);
        assert_eq!(update_field(&before, "missing", LineField::Quantity, "4"), before);
    }

    #[test]
    fn test_update_field_unsupported_on_livraison() {
        let liv = Livraison {
            lines: vec![LivraisonLine::blank("1".to_string(), "liv-1")],
            ..Livraison::new("a@b.c", "ACME")
        };
        let after = update_field(&liv, LineKey::At(0), LineField::UnitPrice, "9.99");
        assert_eq!(after, liv);
    }

    #[test]
    fn test_compute_line_amount() {
        let amount = compute_line_amount(&export_line("1", 3, "2.5"));
        assert_eq!(amount, dec("7.50"));
        assert_eq!(display_amount(&amount), "7.50");
    }

    #[test]
    fn test_display_amount_rounds() {
        assert_eq!(display_amount(&dec("2.345")), "2.35");
        assert_eq!(display_amount(&BigDecimal::zero()), "0.00");
        assert_eq!(display_amount(&dec("12")), "12.00");
    }

    #[test]
    fn test_compute_total_skips_excluded() {
        let decl = update_field(&declaration(), LineKey::At(1), LineField::Excluded, "true");
        // 7.5 + 2.5
        assert_eq!(compute_total(&decl), dec("10"));
        assert_eq!(decl.lines.len(), 3);
        assert!(decl.lines[1].is_excluded);
        assert_eq!(decl.lines[1].unit_price, dec("10"));
    }

    #[test]
    fn test_compute_total_of_livraison_is_zero() {
        let liv = Livraison {
            lines: vec![LivraisonLine::blank("1".to_string(), "liv-1")],
            ..Livraison::new("a@b.c", "ACME")
        };
        assert_eq!(compute_total(&liv), BigDecimal::zero());
    }

    #[test]
    fn test_bind_model_overwrites_reference_fields() {
        let decl = update_field(&declaration(), LineKey::At(0), LineField::Description, "manual");
        let decl = update_field(&decl, LineKey::At(0), LineField::Commande, "HAND");
        let bound = bind_model(&decl, LineKey::At(0), "Polo", &catalog());

        let line = &bound.lines[0];
        assert_eq!(line.modele, "Polo");
        assert_eq!(line.commande, "OPR3328");
        assert_eq!(line.description, "Polo coton");
        assert_eq!(line.quantity, 3);
        assert_eq!(line.unit_price, dec("2.5"));
        assert_eq!(bound.lines[1], decl.lines[1]);
    }

    #[test]
    fn test_bind_model_miss_clears_fields() {
        let decl = update_field(&declaration(), LineKey::At(0), LineField::Description, "manual");
        let bound = bind_model(&decl, LineKey::At(0), "Unknown", &catalog());
        assert_eq!(bound.lines[0].modele, "Unknown");
        assert_eq!(bound.lines[0].commande, "");
        assert_eq!(bound.lines[0].description, "");
    }

    #[test]
    fn test_remove_line_reindexes() {
        let after = remove_line(&declaration(), LineKey::At(0));
        assert_eq!(after.lines.len(), 2);
        assert_eq!(after.lines[0].id, "2");
        assert_eq!(after.lines[1].id, "3");
    }

    #[test]
    fn test_remove_line_by_id_and_missing() {
        let before = declaration();
        assert_eq!(remove_line(&before, "2").lines.len(), 2);
        assert_eq!(remove_line(&before, LineKey::At(7)), before);
    }
}
