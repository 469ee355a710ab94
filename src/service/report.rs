use std::io::Write;

use crate::editor::{compute_line_amount, compute_total, display_amount};
use crate::error::AppError;
use crate::models::ExportDeclaration;

const HEADER: [&str; 7] = [
    "commande",
    "modele",
    "description",
    "quantity",
    "unitPrice",
    "amount",
    "excluded",
];

/// 导出申报单明细到 CSV, 末行为未排除行的合计
pub fn write_export_csv<W: Write>(
    declaration: &ExportDeclaration,
    output: W,
) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(HEADER)?;

    for line in &declaration.lines {
        writer.write_record([
            line.commande.clone(),
            line.modele.clone(),
            line.description.clone(),
            line.quantity.to_string(),
            display_amount(&line.unit_price),
            display_amount(&compute_line_amount(line)),
            line.is_excluded.to_string(),
        ])?;
    }

    let total = display_amount(&compute_total(declaration));
    writer.write_record(["", "", "TOTAL", "", "", total.as_str(), ""])?;
    writer.flush()?;
    Ok(())
}

/// 生成 CSV 字节
pub fn export_csv_bytes(declaration: &ExportDeclaration) -> Result<Vec<u8>, AppError> {
    let mut buffer = Vec::new();
    write_export_csv(declaration, &mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExportLine, LineItem};
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    #[test]
    fn test_csv_lists_lines_and_total() {
        let mut kept = ExportLine::blank("1".to_string(), "e");
        kept.commande = "OPR1".to_string();
        kept.description = "Polo, bleu".to_string();
        kept.quantity = 3;
        kept.unit_price = BigDecimal::from_str("2.5").unwrap();

        let mut excluded = ExportLine::blank("2".to_string(), "e");
        excluded.quantity = 2;
        excluded.unit_price = BigDecimal::from_str("100").unwrap();
        excluded.is_excluded = true;

        let declaration = ExportDeclaration {
            lines: vec![kept, excluded],
            ..ExportDeclaration::new("a@b.c", "ACME")
        };

        let text = String::from_utf8(export_csv_bytes(&declaration).unwrap()).unwrap();
        let rows: Vec<&str> = text.lines().collect();

        assert_eq!(rows[0], "commande,modele,description,quantity,unitPrice,amount,excluded");
        assert_eq!(rows[1], "OPR1,,\"Polo, bleu\",3,2.50,7.50,false");
        assert_eq!(rows[2], ",,,2,100.00,200.00,true");
        assert_eq!(rows[3], ",,TOTAL,,,7.50,");
    }
}
