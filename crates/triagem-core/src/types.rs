//! UI-agnostic chat and triage payload types
//!
//! This module contains the data structures shared by every frontend (terminal UI,
//! one-shot CLI, tests) and the wire types of the triage API. Wire field names are
//! Portuguese; the Rust field names are not, and serde renames bridge the two.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::render::{escape_html, Markup};

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Assistant,
}

/// Body of a chat message: raw text or a rendered triage result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text(String),
    Markup(Markup),
}

impl MessageContent {
    pub fn plain_text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Markup(markup) => markup.plain_text(),
        }
    }

    /// HTML fragment for the bubble body. Raw text is escaped.
    pub fn to_html(&self) -> String {
        match self {
            MessageContent::Text(text) => escape_html(text),
            MessageContent::Markup(markup) => markup.to_html(),
        }
    }
}

/// A chat message. Immutable once appended to a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: Sender,
    pub content: MessageContent,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn assistant_markup(markup: Markup) -> Self {
        Self {
            sender: Sender::Assistant,
            content: MessageContent::Markup(markup),
        }
    }

    pub fn plain_text(&self) -> String {
        self.content.plain_text()
    }
}

/// Outbound request body
#[derive(Debug, Serialize)]
pub struct TriageRequest<'a> {
    #[serde(rename = "texto_sintomas")]
    pub symptoms: &'a str,
}

/// Successful triage response. Optional sections decode to `None`/empty when the
/// field is missing or `null`; anything of the wrong type fails the whole decode.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TriageResponse {
    #[serde(rename = "resultado_triagem")]
    pub classification: String,
    #[serde(rename = "recomendacoes", default)]
    pub recommendations: Option<Recommendations>,

    // Gateway bookkeeping, accepted but never rendered
    #[serde(rename = "sintomas_originais", default)]
    pub original_symptoms: Option<String>,
    #[serde(rename = "urgencia", default)]
    pub urgency: Option<String>,
    #[serde(rename = "tempo_processamento", default)]
    pub processing_time: Option<f64>,
    #[serde(rename = "agentes_consultados", default, deserialize_with = "null_as_default")]
    pub consulted_agents: Vec<String>,
}

impl TriageResponse {
    /// A response carrying only the classification
    pub fn classification_only(classification: impl Into<String>) -> Self {
        Self {
            classification: classification.into(),
            recommendations: None,
            original_symptoms: None,
            urgency: None,
            processing_time: None,
            consulted_agents: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Recommendations {
    #[serde(rename = "observacoes", default)]
    pub observations: Option<String>,
    #[serde(rename = "recomendacoes_gerais", default, deserialize_with = "null_as_default")]
    pub general: Categories,
    #[serde(rename = "recomendacoes_especificas", default, deserialize_with = "null_as_default")]
    pub specific: Vec<String>,
    #[serde(rename = "medicos_recomendados", default, deserialize_with = "null_as_default")]
    pub providers: Vec<RecommendedProvider>,
    #[serde(rename = "urgencia", default)]
    pub urgency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecommendedProvider {
    #[serde(rename = "nome_local")]
    pub name: String,
    #[serde(rename = "especialidade")]
    pub specialty: String,
    #[serde(rename = "endereco")]
    pub address: String,
    #[serde(rename = "telefone", default)]
    pub phone: Option<String>,
}

/// General recommendations grouped by category, in payload order.
///
/// Decoded with a map visitor rather than a `HashMap` so the category order the
/// service chose is the order the user sees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Categories(Vec<(String, Vec<String>)>);

impl Categories {
    pub fn new(entries: Vec<(String, Vec<String>)>) -> Self {
        Self(entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(name, items)| (name.as_str(), items.as_slice()))
    }

    /// Every item across all categories, category by category
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.0.iter().flat_map(|(_, items)| items.iter().map(String::as_str))
    }

    pub fn is_empty(&self) -> bool {
        self.items().next().is_none()
    }
}

impl<'de> Deserialize<'de> for Categories {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CategoriesVisitor;

        impl<'de> Visitor<'de> for CategoriesVisitor {
            type Value = Categories;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category names to lists of recommendations")
            }

            fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, items)) = access.next_entry::<String, Vec<String>>()? {
                    entries.push((name, items));
                }
                Ok(Categories(entries))
            }
        }

        deserializer.deserialize_map(CategoriesVisitor)
    }
}

/// Error payload of a non-2xx response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ApiErrorBody {
    /// Human-readable `detail` from a raw error body, if it has one.
    ///
    /// Validation failures put a list of objects in `detail`; those are shown as
    /// compact JSON rather than dropped.
    pub fn detail_from(body: &[u8]) -> Option<String> {
        let parsed: ApiErrorBody = serde_json::from_slice(body).ok()?;
        match parsed.detail? {
            serde_json::Value::Null => None,
            serde_json::Value::String(text) if text.trim().is_empty() => None,
            serde_json::Value::String(text) => Some(text),
            other => Some(other.to_string()),
        }
    }
}

/// Gateway health report
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    #[serde(rename = "gateway_status")]
    pub gateway: String,
    #[serde(rename = "agente_triagem_status")]
    pub triage_agent: String,
    #[serde(rename = "agente_recomendacoes_status")]
    pub recommendations_agent: String,
    pub timestamp: String,
}

impl HealthStatus {
    pub fn all_healthy(&self) -> bool {
        [&self.gateway, &self.triage_agent, &self.recommendations_agent]
            .iter()
            .all(|status| status.as_str() == "healthy")
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
