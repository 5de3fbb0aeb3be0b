// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::DEFAULT_LANG;

// Nosso extrator de idioma
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl Locale {
    /// "pt-BR,pt;q=0.9,en;q=0.8" -> "pt"
    pub fn from_header(header_str: &str) -> Option<Self> {
        accept_language::parse(header_str)
            .first() // Pega o idioma de maior peso
            .map(|tag_string| {
                // "pt-BR" -> split vira ["pt", "BR"] -> next() pega "pt"
                let lang = tag_string.split('-').next().unwrap_or(tag_string);
                Locale(lang.to_lowercase())
            })
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .and_then(Locale::from_header)
            .unwrap_or_default();

        Ok(locale)
    }
}
