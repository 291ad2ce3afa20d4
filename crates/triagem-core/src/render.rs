//! Triage response formatting
//!
//! `format_response` turns a decoded [`TriageResponse`] into a [`Markup`] document: an
//! ordered list of typed blocks. Frontends either draw the blocks directly (the terminal
//! UI) or serialize them with [`Markup::to_html`] / [`Markup::plain_text`].

use std::fmt::Write as _;

use crate::types::{RecommendedProvider, TriageResponse};

pub const CLASSIFICATION_LABEL: &str = "Resultado da Triagem:";
pub const GENERAL_HEADING: &str = "Recomendações Gerais";
pub const SPECIFIC_HEADING: &str = "Recomendações Específicas";
pub const PROVIDERS_HEADING: &str = "Médicos Recomendados";
pub const SPECIALTY_LABEL: &str = "Especialidade:";
pub const ADDRESS_LABEL: &str = "Endereço:";
pub const PHONE_LABEL: &str = "Telefone:";
pub const PHONE_MISSING: &str = "Não informado";

/// One visual element of a rendered triage result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// `Resultado da Triagem: <value>`
    Classification(String),
    /// Italic observations line
    Observation(String),
    Heading(String),
    /// Bulleted list; never empty
    List(Vec<String>),
    ProviderCard(ProviderCard),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCard {
    pub name: String,
    pub specialty: String,
    pub address: String,
    pub phone: Option<String>,
}

impl ProviderCard {
    pub fn phone_or_missing(&self) -> &str {
        self.phone
            .as_deref()
            .filter(|phone| !phone.trim().is_empty())
            .unwrap_or(PHONE_MISSING)
    }
}

impl From<&RecommendedProvider> for ProviderCard {
    fn from(provider: &RecommendedProvider) -> Self {
        Self {
            name: provider.name.clone(),
            specialty: provider.specialty.clone(),
            address: provider.address.clone(),
            phone: provider.phone.clone(),
        }
    }
}

/// A rendered triage result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup {
    blocks: Vec<Block>,
}

impl Markup {
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// HTML fragment for a chat bubble. Every interpolated value is escaped.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for block in &self.blocks {
            match block {
                Block::Classification(value) => {
                    let _ = write!(
                        html,
                        "<p><strong>{}</strong> {}</p>",
                        CLASSIFICATION_LABEL,
                        escape_html(value)
                    );
                }
                Block::Observation(text) => {
                    let _ = write!(html, "<p><em>{}</em></p>", escape_html(text));
                }
                Block::Heading(text) => {
                    let _ = write!(html, "<h4>{}</h4>", escape_html(text));
                }
                Block::List(items) => {
                    html.push_str("<ul>");
                    for item in items {
                        let _ = write!(html, "<li>{}</li>", escape_html(item));
                    }
                    html.push_str("</ul>");
                }
                Block::ProviderCard(card) => {
                    let _ = write!(
                        html,
                        "<div class=\"medico-card\"><strong>{}</strong><br>{} {}<br>{} {}<br>{} {}</div>",
                        escape_html(&card.name),
                        SPECIALTY_LABEL,
                        escape_html(&card.specialty),
                        ADDRESS_LABEL,
                        escape_html(&card.address),
                        PHONE_LABEL,
                        escape_html(card.phone_or_missing()),
                    );
                }
            }
        }
        html
    }

    /// Text rendition, one line per block, list item, and card field
    pub fn plain_text(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Classification(value) => {
                    lines.push(format!("{} {}", CLASSIFICATION_LABEL, value));
                }
                Block::Observation(text) | Block::Heading(text) => lines.push(text.clone()),
                Block::List(items) => {
                    lines.extend(items.iter().map(|item| format!("• {}", item)));
                }
                Block::ProviderCard(card) => {
                    lines.push(card.name.clone());
                    lines.push(format!("  {} {}", SPECIALTY_LABEL, card.specialty));
                    lines.push(format!("  {} {}", ADDRESS_LABEL, card.address));
                    lines.push(format!("  {} {}", PHONE_LABEL, card.phone_or_missing()));
                }
            }
        }
        lines.join("\n")
    }
}

/// Render a triage response. Pure: the same response always yields the same markup.
///
/// Sections after the classification appear only when their data is present and
/// non-empty, so there are never headings without items.
pub fn format_response(response: &TriageResponse) -> Markup {
    let mut blocks = vec![Block::Classification(response.classification.clone())];

    if let Some(recs) = &response.recommendations {
        blocks.push(Block::Observation(
            recs.observations.clone().unwrap_or_default(),
        ));

        if !recs.general.is_empty() {
            blocks.push(Block::Heading(GENERAL_HEADING.to_string()));
            blocks.push(Block::List(
                recs.general.items().map(str::to_string).collect(),
            ));
        }

        if !recs.specific.is_empty() {
            blocks.push(Block::Heading(SPECIFIC_HEADING.to_string()));
            blocks.push(Block::List(recs.specific.clone()));
        }

        if !recs.providers.is_empty() {
            blocks.push(Block::Heading(PROVIDERS_HEADING.to_string()));
            blocks.extend(
                recs.providers
                    .iter()
                    .map(|provider| Block::ProviderCard(provider.into())),
            );
        }
    }

    Markup { blocks }
}

/// Escape text for inclusion in HTML element content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> TriageResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_classification_only() {
        let response = parse(r#"{"resultado_triagem": "Risco moderado"}"#);
        let markup = format_response(&response);

        assert_eq!(
            markup.blocks(),
            &[Block::Classification("Risco moderado".to_string())]
        );
        assert_eq!(markup.plain_text(), "Resultado da Triagem: Risco moderado");
        assert_eq!(
            markup.to_html(),
            "<p><strong>Resultado da Triagem:</strong> Risco moderado</p>"
        );
    }

    #[test]
    fn test_null_recommendations_render_no_headings() {
        let response = parse(r#"{"resultado_triagem": "Baixo risco", "recomendacoes": null}"#);
        let html = format_response(&response).to_html();

        assert!(html.contains("Baixo risco"));
        assert!(!html.contains("<h4>"));
        assert!(!html.contains("<ul>"));
        assert!(!html.contains("<em>"));
    }

    #[test]
    fn test_empty_recommendations_block_keeps_observation_line_only() {
        let response = parse(r#"{"resultado_triagem": "Baixo risco", "recomendacoes": {}}"#);
        let markup = format_response(&response);

        assert_eq!(
            markup.blocks(),
            &[
                Block::Classification("Baixo risco".to_string()),
                Block::Observation(String::new()),
            ]
        );
    }

    #[test]
    fn test_full_response_section_order() {
        let response = parse(
            r#"{
                "resultado_triagem": "Urgência ALTA",
                "recomendacoes": {
                    "observacoes": "Busque atendimento imediatamente!",
                    "recomendacoes_gerais": {
                        "orientacoes": ["Ligue 192"],
                        "nao_fazer": ["Não dirija veículos", "Não ignore os sintomas"]
                    },
                    "recomendacoes_especificas": ["Monitore a temperatura"],
                    "medicos_recomendados": [
                        {"nome_local": "Hospital Central", "especialidade": "Emergência",
                         "endereco": "Rua A, 1", "telefone": "(11) 5555-0000"},
                        {"nome_local": "UPA Norte", "especialidade": "Clínica Geral",
                         "endereco": "Av. B, 200"}
                    ]
                }
            }"#,
        );
        let markup = format_response(&response);

        assert_eq!(
            markup.blocks(),
            &[
                Block::Classification("Urgência ALTA".to_string()),
                Block::Observation("Busque atendimento imediatamente!".to_string()),
                Block::Heading(GENERAL_HEADING.to_string()),
                Block::List(vec![
                    "Ligue 192".to_string(),
                    "Não dirija veículos".to_string(),
                    "Não ignore os sintomas".to_string(),
                ]),
                Block::Heading(SPECIFIC_HEADING.to_string()),
                Block::List(vec!["Monitore a temperatura".to_string()]),
                Block::Heading(PROVIDERS_HEADING.to_string()),
                Block::ProviderCard(ProviderCard {
                    name: "Hospital Central".to_string(),
                    specialty: "Emergência".to_string(),
                    address: "Rua A, 1".to_string(),
                    phone: Some("(11) 5555-0000".to_string()),
                }),
                Block::ProviderCard(ProviderCard {
                    name: "UPA Norte".to_string(),
                    specialty: "Clínica Geral".to_string(),
                    address: "Av. B, 200".to_string(),
                    phone: None,
                }),
            ]
        );

        let text = markup.plain_text();
        assert!(text.contains("UPA Norte\n  Especialidade: Clínica Geral\n  Endereço: Av. B, 200\n  Telefone: Não informado"));
        assert!(text.contains("  Telefone: (11) 5555-0000"));
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let response = parse(
            r#"{
                "resultado_triagem": "Urgência BAIXA",
                "recomendacoes": {
                    "observacoes": "Monitore a evolução.",
                    "recomendacoes_gerais": {"autocuidado": []},
                    "recomendacoes_especificas": [],
                    "medicos_recomendados": []
                }
            }"#,
        );
        let markup = format_response(&response);

        assert_eq!(markup.blocks().len(), 2);
        assert!(!markup
            .blocks()
            .iter()
            .any(|block| matches!(block, Block::Heading(_) | Block::List(_))));
    }

    #[test]
    fn test_format_is_deterministic() {
        let response = parse(
            r#"{"resultado_triagem": "Urgência MÉDIA",
                "recomendacoes": {"recomendacoes_gerais": {"b": ["2"], "a": ["1"]}}}"#,
        );
        assert_eq!(format_response(&response), format_response(&response));
        assert_eq!(
            format_response(&response).to_html(),
            format_response(&response).to_html()
        );
    }

    #[test]
    fn test_html_escapes_interpolated_values() {
        let response = parse(
            r#"{
                "resultado_triagem": "<script>alert('x')</script>",
                "recomendacoes": {
                    "observacoes": "a & b",
                    "medicos_recomendados": [
                        {"nome_local": "\"Clínica\"", "especialidade": "<b>", "endereco": "R. 1"}
                    ]
                }
            }"#,
        );
        let html = format_response(&response).to_html();

        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(html.contains("<em>a &amp; b</em>"));
        assert!(html.contains("<strong>&quot;Clínica&quot;</strong>"));
        assert!(html.contains("Especialidade: &lt;b&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_blank_phone_counts_as_missing() {
        let card = ProviderCard {
            name: "Posto".to_string(),
            specialty: "Pediatria".to_string(),
            address: "R. 2".to_string(),
            phone: Some("  ".to_string()),
        };
        assert_eq!(card.phone_or_missing(), PHONE_MISSING);
    }
}
