//! House of Commons transcript XML to statements.
//!
//! A document is cleaned up, loaded into an element tree, its metadata read
//! from the `ExtractedItem` block, and then its `HansardBody` is walked by
//! [`walker::Walker`] to produce one [`DraftStatement`] per utterance.

pub mod metadata;
pub mod speaker;
pub mod statement;
pub mod tags;
pub mod walker;

use crate::dom::{preprocess, XmlTree};
use crate::error::AlpheusError;
use crate::text::{build_tag, escape};
use crate::types::{DocumentMeta, DocumentType, Language};
use serde::{Deserialize, Serialize};

pub use statement::DraftStatement;

const STYLESHEET_URL: &str = "http://rhymeswithcycle.github.com/alpheus/alpheus.css";
const SCRIPT_URL: &str = "http://rhymeswithcycle.github.com/alpheus/alpheus.js";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub meta: DocumentMeta,
    pub statements: Vec<DraftStatement>,
}

pub fn parse_bytes(xml: &[u8]) -> Result<ParsedDocument, AlpheusError> {
    let xml = std::str::from_utf8(xml)
        .map_err(|e| AlpheusError::Xml(format!("document is not UTF-8: {e}")))?;
    parse_str(xml)
}

pub fn parse_str(xml: &str) -> Result<ParsedDocument, AlpheusError> {
    let tree = XmlTree::parse(&preprocess(xml))?;
    let meta = metadata::extract(&tree)?;
    let body = tree
        .find_first("HansardBody")
        .ok_or(AlpheusError::MissingElement("HansardBody"))?;
    let statements = walker::Walker::new(tree, &meta).run(body)?;
    tracing::debug!(
        "[Alpheus] Parsed {} statements from {} #{}",
        statements.len(),
        meta.document_type.as_str(),
        meta.document_number
    );
    Ok(ParsedDocument { meta, statements })
}

impl ParsedDocument {
    fn title(&self) -> String {
        let name = match (&self.meta.document_type, self.meta.language) {
            (DocumentType::Committee, Language::En) => self
                .meta
                .committee
                .as_ref()
                .map(|c| c.name_en.clone())
                .unwrap_or_default(),
            (DocumentType::Committee, Language::Fr) => self
                .meta
                .committee
                .as_ref()
                .map(|c| c.name_fr.clone())
                .unwrap_or_default(),
            (DocumentType::Debates, Language::En) => "House Debates".to_string(),
            (DocumentType::Debates, Language::Fr) => "Débats du Chambre".to_string(),
            (DocumentType::Other(_), _) => String::new(),
        };
        format!("{name}, {}", self.meta.date)
    }

    fn metadata_rows(&self) -> Vec<(&'static str, String)> {
        let meta = &self.meta;
        let mut rows = vec![
            ("date", meta.date.to_string()),
            ("document_number", meta.document_number.clone()),
            ("document_type", meta.document_type.as_str().to_string()),
            ("language", meta.language.as_str().to_string()),
            ("parliament", meta.parliament.to_string()),
            ("session", meta.session.to_string()),
        ];
        if let Some(committee) = &meta.committee {
            rows.push(("committee_acronym", committee.acronym.clone()));
            rows.push(("committee_name_en", committee.name_en.clone()));
            rows.push(("committee_name_fr", committee.name_fr.clone()));
        }
        rows.sort_by(|a, b| a.0.cmp(b.0));
        rows
    }

    /// Standalone HTML rendering of the parse, for eyeballing a transcript.
    pub fn as_html(&self) -> String {
        let title = self.title();
        let rows = self
            .metadata_rows()
            .into_iter()
            .map(|(name, value)| {
                format!(
                    "{}<th>{}</th><td>{}</td></tr>",
                    build_tag(
                        "tr",
                        &[
                            ("class", "metadata".to_string()),
                            ("data-name", name.to_string()),
                            ("data-value", value.clone()),
                        ],
                    ),
                    escape(name),
                    escape(&value)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        let statements = self
            .statements
            .iter()
            .map(DraftStatement::as_html)
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "<!DOCTYPE html>\n<html lang=\"{lang}\"><head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<link rel=\"stylesheet\" type=\"text/css\" href=\"{STYLESHEET_URL}\">\n</head>\n<body><h1>{title}</h1>\n<table>{rows}</table>\n{statements}\n<script type=\"text/javascript\" src=\"{SCRIPT_URL}\"></script>\n</body></html>\n",
            lang = self.meta.language.as_str(),
        )
    }
}
