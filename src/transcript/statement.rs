use crate::error::AlpheusError;
use crate::text::{build_tag, tame_whitespace};
use crate::types::{Language, PersonType, WrittenQuestion};
use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// One whole `<p …>…</p>` carrying a paragraph id. Content is single-line.
pub static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<p[^>]* data-HoCid=.+?</p>"#).unwrap());
static PARAGRAPH_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^<p[^>]* data-HoCid="(\d+)""#).unwrap());
static FIRST_HOCID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-HoCid="(\d+)""#).unwrap());

/// Numeric id of a paragraph matched by `PARAGRAPH_RE`; `0` when absent.
pub fn paragraph_id(paragraph: &str) -> u64 {
    PARAGRAPH_ID_RE
        .captures(paragraph)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

/// Paragraphs of a statement body, each with its id.
pub fn paragraphs(content: &str) -> Vec<(&str, u64)> {
    PARAGRAPH_RE
        .find_iter(content)
        .map(|m| (m.as_str(), paragraph_id(m.as_str())))
        .collect()
}

/// Attributes in force until a handler changes them.
#[derive(Debug, Clone, Default)]
pub struct CurrentAttributes {
    pub language: Option<Language>,
    pub timestamp: Option<NaiveDateTime>,
    pub h1: Option<String>,
    pub h2: Option<String>,
    pub h3: Option<String>,
}

/// Attributes handed to the next statement that opens, then forgotten.
#[derive(Debug, Clone, Default)]
pub struct OneTimeAttributes {
    pub person_attribution: Option<String>,
    pub person_id: Option<String>,
    pub person_type: Option<PersonType>,
    pub person_context: Option<String>,
    pub intervention_type: Option<String>,
    pub id: Option<String>,
    pub written_question: Option<WrittenQuestion>,
    pub has_non_procedural: bool,
}

impl OneTimeAttributes {
    pub fn has_speaker(&self) -> bool {
        self.person_attribution
            .as_deref()
            .is_some_and(|who| !who.is_empty())
    }
}

/// A contiguous utterance as it comes out of the transcript walk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftStatement {
    pub content: String,
    pub id: Option<String>,
    pub language: Option<Language>,
    pub timestamp: Option<NaiveDateTime>,
    pub h1: Option<String>,
    pub h2: Option<String>,
    pub h3: Option<String>,
    pub person_attribution: Option<String>,
    pub person_id: Option<String>,
    pub person_type: Option<PersonType>,
    pub person_context: Option<String>,
    pub intervention_type: Option<String>,
    pub written_question: Option<WrittenQuestion>,
    pub has_non_procedural: bool,
}

impl DraftStatement {
    pub(crate) fn open(current: &CurrentAttributes, one_time: OneTimeAttributes) -> Self {
        Self {
            content: String::new(),
            id: one_time.id,
            language: current.language,
            timestamp: current.timestamp,
            h1: current.h1.clone(),
            h2: current.h2.clone(),
            h3: current.h3.clone(),
            person_attribution: one_time.person_attribution,
            person_id: one_time.person_id,
            person_type: one_time.person_type,
            person_context: one_time.person_context,
            intervention_type: one_time.intervention_type,
            written_question: one_time.written_question,
            has_non_procedural: one_time.has_non_procedural,
        }
    }

    pub fn has_speaker(&self) -> bool {
        self.person_attribution
            .as_deref()
            .is_some_and(|who| !who.is_empty())
    }

    /// Normalises the body and fills in an id from the first paragraph when
    /// none was given. An `Intervention` without an `id` attribute also gets
    /// `p<first HoCid>`, so it can still pair with its French counterpart.
    pub(crate) fn finish(&mut self) -> Result<(), AlpheusError> {
        self.content = tame_whitespace(&self.content).replace("</blockquote><blockquote>", "");
        if self.content.trim().is_empty() {
            return Err(AlpheusError::EmptyStatement);
        }
        if self.id.is_none() {
            self.id = FIRST_HOCID_RE
                .captures(&self.content)
                .map(|caps| format!("p{}", &caps[1]));
        }
        Ok(())
    }

    pub fn paragraph_ids(&self) -> Vec<u64> {
        paragraphs(&self.content)
            .into_iter()
            .map(|(_, id)| id)
            .collect()
    }

    pub fn as_html(&self) -> String {
        let mut attrs: Vec<(&str, String)> = vec![
            ("class", "statement".to_string()),
            (
                "data-timestamp",
                self.timestamp
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "None".to_string()),
            ),
        ];
        let optional = [
            ("id", self.id.clone()),
            ("data-person-speaking-attribution", self.person_attribution.clone()),
            ("data-person-speaking-HoCid", self.person_id.clone()),
            (
                "data-person-speaking-type",
                self.person_type.map(|t| t.as_str().to_string()),
            ),
            ("data-h1", self.h1.clone()),
            ("data-h2", self.h2.clone()),
            ("data-h3", self.h3.clone()),
            ("data-intervention-type", self.intervention_type.clone()),
            (
                "data-written-question",
                self.written_question.map(|q| q.as_str().to_string()),
            ),
        ];
        for (key, value) in optional {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                attrs.push((key, value));
            }
        }
        format!("{}{}</div>", build_tag("div", &attrs), self.content)
    }
}
