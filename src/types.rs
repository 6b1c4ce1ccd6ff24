use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    En,
    Fr,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }

    /// Case-insensitive `en` / `fr`; anything else is unknown.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "en" => Some(Language::En),
            "fr" => Some(Language::Fr),
            _ => None,
        }
    }

    /// Single-letter form used in parl.gc.ca URLs.
    pub fn letter(self) -> &'static str {
        match self {
            Language::En => "E",
            Language::Fr => "F",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Debates,
    Committee,
    Other(String),
}

impl DocumentType {
    pub fn from_category(category: &str) -> Self {
        match category {
            "Debates" => DocumentType::Debates,
            "Committee" => DocumentType::Committee,
            other => DocumentType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DocumentType::Debates => "Debates",
            DocumentType::Committee => "Committee",
            DocumentType::Other(category) => category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeMeta {
    pub acronym: String,
    pub name_en: String,
    pub name_fr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub document_type: DocumentType,
    pub date: NaiveDate,
    pub parliament: u32,
    pub session: u32,
    pub language: Language,
    pub document_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committee: Option<CommitteeMeta>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonType {
    Witness,
    Clerk,
    Analyst,
}

impl PersonType {
    pub fn as_str(self) -> &'static str {
        match self {
            PersonType::Witness => "witness",
            PersonType::Clerk => "clerk",
            PersonType::Analyst => "analyst",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrittenQuestion {
    Question,
    Response,
}

impl WrittenQuestion {
    pub fn as_str(self) -> &'static str {
        match self {
            WrittenQuestion::Question => "question",
            WrittenQuestion::Response => "response",
        }
    }

    /// Stored form: `Q` or `R`.
    pub fn letter(self) -> &'static str {
        match self {
            WrittenQuestion::Question => "Q",
            WrittenQuestion::Response => "R",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoliticianRef {
    pub hoc_id: u32,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillRef {
    pub legisinfo_id: u32,
    pub number: String,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteRef {
    pub number: u32,
    pub description: String,
    pub url: String,
}

/// Old sequence number of a statement and the slug of its replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceMapping {
    pub sequence: usize,
    pub slug: String,
}
