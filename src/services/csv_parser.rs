// src/services/csv_parser.rs

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::models::stock::ImportRow;

// Colunas reconhecidas no cabeçalho. "descricao" é a única opcional.
const COL_SKU: &str = "sku";
const COL_NOME: &str = "nome";
const COL_DESCRICAO: &str = "descricao";
const COL_LOCAL: &str = "local";
const COL_QUANTIDADE: &str = "quantidade";

/// Resultado do parser: as linhas válidas e quantas foram descartadas
/// por SKU, nome ou local vazios.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub rows: Vec<ImportRow>,
    pub dropped: usize,
}

impl ParseReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

struct ColumnIndex {
    sku: usize,
    nome: usize,
    descricao: Option<usize>,
    local: usize,
    quantidade: usize,
}

impl ColumnIndex {
    fn resolve(header_line: &str) -> Option<Self> {
        let header: Vec<String> = header_line
            .to_lowercase()
            .split(',')
            .map(|h| h.trim().to_string())
            .collect();
        // Primeira ocorrência vence em cabeçalhos duplicados
        let find = |name: &str| header.iter().position(|h| h == name);

        Some(Self {
            sku: find(COL_SKU)?,
            nome: find(COL_NOME)?,
            descricao: find(COL_DESCRICAO),
            local: find(COL_LOCAL)?,
            quantidade: find(COL_QUANTIDADE)?,
        })
    }
}

/// Converte o texto do CSV em linhas de importação. Nunca falha: arquivo
/// vazio ou cabeçalho incompleto resultam em lista vazia.
pub fn parse(text: &str) -> Vec<ImportRow> {
    parse_with_report(text).rows
}

pub fn parse_with_report(text: &str) -> ParseReport {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|l| !l.is_empty());

    let Some(header_line) = lines.next() else {
        return ParseReport::default();
    };
    let Some(idx) = ColumnIndex::resolve(header_line) else {
        return ParseReport::default();
    };

    let mut report = ParseReport::default();
    for line in lines {
        let cols: Vec<&str> = line.split(',').map(str::trim).collect();
        let cell = |i: usize| cols.get(i).copied().unwrap_or("");

        let (sku, nome, local) = (cell(idx.sku), cell(idx.nome), cell(idx.local));
        if sku.is_empty() || nome.is_empty() || local.is_empty() {
            report.dropped += 1;
            continue;
        }

        let descricao = idx
            .descricao
            .map(cell)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        report.rows.push(ImportRow {
            sku: sku.to_string(),
            nome: nome.to_string(),
            descricao,
            local: local.to_string(),
            quantidade: parse_quantity(cell(idx.quantidade)),
        });
    }
    report
}

/// Quantidade no formato brasileiro: "." é separador de milhar e ","
/// decimal. Valor inválido vira 0; fração é truncada (floor); negativo vira 0.
pub fn parse_quantity(raw: &str) -> i64 {
    let normalized = raw.trim().replace('.', "").replacen(',', ".", 1);
    if normalized.is_empty() {
        return 0;
    }

    let value = Decimal::from_str(&normalized)
        .unwrap_or(Decimal::ZERO)
        .floor();

    if value <= Decimal::ZERO {
        return 0;
    }
    value.to_i64().unwrap_or(i64::MAX)
}
