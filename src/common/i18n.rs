// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "pt";

// Mensagens por idioma -> chave. Placeholders: {sku}, {from}, {to}.
const MESSAGES: &[(&str, &[(&str, &str)])] = &[
    (
        "pt",
        &[
            ("validation_failed", "Um ou mais campos são inválidos."),
            ("invalid_import_file", "Arquivo vazio ou formato inválido"),
            ("stock_item_not_found", "SKU {sku} não encontrado no estoque."),
            ("confirmation_required", "Atualizar quantidade do SKU {sku} de {from} para {to}?"),
            ("import_in_progress", "Já existe uma operação de estoque em andamento."),
            ("import_failed", "Erro ao processar importação"),
        ],
    ),
    (
        "en",
        &[
            ("validation_failed", "One or more fields are invalid."),
            ("invalid_import_file", "File is empty or invalid"),
            ("stock_item_not_found", "SKU {sku} not found in stock."),
            ("confirmation_required", "Update quantity of SKU {sku} from {from} to {to}?"),
            ("import_in_progress", "Another stock operation is already in progress."),
            ("import_failed", "Failed to process import"),
        ],
    ),
];

#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Default for I18nStore {
    fn default() -> Self {
        let messages = MESSAGES
            .iter()
            .map(|(lang, entries)| (*lang, entries.iter().copied().collect()))
            .collect();
        Self { messages }
    }
}

impl I18nStore {
    /// Busca a mensagem no idioma pedido, caindo para o português e,
    /// em último caso, para a própria chave.
    pub fn get<'a>(&'a self, lang: &str, key: &'a str) -> &'a str {
        self.messages
            .get(lang)
            .and_then(|m| m.get(key))
            .or_else(|| self.messages.get(DEFAULT_LANG).and_then(|m| m.get(key)))
            .copied()
            .unwrap_or(key)
    }
}
