// src/services/csv_export.rs

use crate::models::stock::StockItem;

pub const EXPORT_HEADER: &str = "SKU,NOME,DESCRICAO,LOCAL,QUANTIDADE";
pub const FULL_EXPORT_FILENAME: &str = "estoque_completo.csv";
pub const FILTERED_EXPORT_FILENAME: &str = "estoque_filtrado.csv";

// Sem aspas nem escape: vírgula dentro do texto vira espaço.
fn clean(value: &str) -> String {
    value.replace(',', " ")
}

/// Gera o CSV no mesmo formato de cinco colunas aceito pela importação.
pub fn export_csv(items: &[StockItem]) -> String {
    let mut lines = Vec::with_capacity(items.len() + 1);
    lines.push(EXPORT_HEADER.to_string());
    lines.extend(items.iter().map(|i| {
        [
            clean(&i.sku),
            clean(&i.nome),
            clean(i.descricao.as_deref().unwrap_or("")),
            clean(&i.local),
            i.quantidade.to_string(),
        ]
        .join(",")
    }));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::csv_parser;
    use chrono::Utc;
    use uuid::Uuid;

    fn item(sku: &str, nome: &str, descricao: Option<&str>, quantidade: i64) -> StockItem {
        StockItem {
            item_id: Uuid::new_v4(),
            sku: sku.into(),
            nome: nome.into(),
            descricao: descricao.map(Into::into),
            local: "Depósito 1".into(),
            quantidade,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn commas_in_free_text_become_spaces() {
        let csv = export_csv(&[item("A", "Cabo, azul", Some("2,5mm"), 4)]);
        assert_eq!(
            csv,
            "SKU,NOME,DESCRICAO,LOCAL,QUANTIDADE\nA,Cabo  azul,2 5mm,Depósito 1,4"
        );
    }

    #[test]
    fn empty_inventory_exports_header_only() {
        assert_eq!(export_csv(&[]), EXPORT_HEADER);
    }

    #[test]
    fn export_is_readable_by_the_importer() {
        let items = vec![item("A", "Alfa", None, 1), item("B", "Beta", Some("b"), 20)];
        let rows = csv_parser::parse(&export_csv(&items));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sku, "A");
        assert_eq!(rows[0].descricao, None);
        assert_eq!(rows[1].descricao.as_deref(), Some("b"));
        assert_eq!(rows[1].quantidade, 20);
    }
}
