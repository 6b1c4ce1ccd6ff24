use crate::configs::ImportConfig;
use crate::text::{
    html_to_text, slugify, truncate_chars, CHAIR_WORD_RE, MISTER_RE, NOT_A_MEMBER_RE,
    POLITICAL_POST_RE, TRAILING_PARENS_RE,
};
use crate::types::{BillRef, Language, PoliticianRef, VoteRef};
use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

static ANY_PARENS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.+\)").unwrap());
static POST_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((.+)\)").unwrap());

const ORIGINAL_LANG_ATTR: &str = "data-originallang=\"";

/// A statement ready to be stored, with both languages filled in where
/// possible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub sequence: usize,
    pub slug: String,
    pub source_id: Option<String>,
    pub time: Option<NaiveDateTime>,
    pub h1_en: String,
    pub h2_en: String,
    pub h3_en: String,
    pub h1_fr: String,
    pub h2_fr: String,
    pub h3_fr: String,
    pub who_en: String,
    pub who_fr: String,
    pub who_hocid: Option<u32>,
    pub who_context_en: String,
    pub who_context_fr: String,
    pub content_en: String,
    pub content_fr: String,
    /// Lower-cased `Intervention/@Type`.
    pub statement_type: String,
    /// `Q`, `R` or empty.
    pub written_question: String,
    pub wordcount: usize,
    /// Words originally spoken in English; `None` until counted.
    pub wordcount_en: Option<usize>,
    pub procedural: bool,
    pub politician: Option<PoliticianRef>,
    pub mentioned_politicians: Vec<PoliticianRef>,
    pub bills: Vec<BillRef>,
    pub vote: Option<VoteRef>,
}

/// How the speaker of a statement should be shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameInfo {
    pub display_name: String,
    pub post: Option<String>,
    /// Context that the attribution itself does not mention.
    pub post_reminder: Option<String>,
    pub named: bool,
    pub url: Option<String>,
}

fn one_paragraph_per_line(content: &str) -> String {
    content
        .replace('\n', "")
        .replace("</p>", "</p>\n")
        .trim()
        .to_string()
}

fn original_language(line: &str) -> Option<&str> {
    let start = line.find(ORIGINAL_LANG_ATTR)? + ORIGINAL_LANG_ATTR.len();
    Some(line.get(start..start + 2).unwrap_or(""))
}

fn word_count(lines: &[&str]) -> usize {
    html_to_text(&lines.join(" ")).split_whitespace().count()
}

impl Statement {
    pub fn content(&self, language: Language) -> &str {
        match language {
            Language::En => &self.content_en,
            Language::Fr => &self.content_fr,
        }
    }

    pub fn text_plain(&self) -> String {
        html_to_text(&self.content_en)
    }

    pub fn add_mentioned_politician(&mut self, politician: PoliticianRef) {
        if !self.mentioned_politicians.contains(&politician) {
            self.mentioned_politicians.push(politician);
        }
    }

    pub fn add_bill(&mut self, bill: BillRef) {
        if !self.bills.contains(&bill) {
            self.bills.push(bill);
        }
    }

    /// Normalises content layout, counts words and settles the procedural
    /// flag. Run once the statement's content is final.
    pub fn finalize(&mut self, config: &ImportConfig) {
        self.content_en = one_paragraph_per_line(&self.content_en);
        self.content_fr = one_paragraph_per_line(&self.content_fr);
        if self.wordcount_en.is_none() {
            self.generate_wordcounts();
        }
        if !self.procedural
            && self.wordcount <= config.procedural_word_limit
            && self.looks_procedural()
        {
            self.procedural = true;
        }
    }

    fn looks_procedural(&self) -> bool {
        let presiding = NOT_A_MEMBER_RE.is_match(&self.who_en) && CHAIR_WORD_RE.is_match(&self.who_en);
        let all_procedural = self
            .content_en
            .split('\n')
            .filter(|line| !line.is_empty())
            .all(|line| line.contains("class=\"procedural\""));
        presiding || self.who_en.is_empty() || all_procedural
    }

    /// Counts English and French words by the language each paragraph was
    /// spoken in. Untagged paragraphs are procedural and not counted.
    pub fn generate_wordcounts(&mut self) {
        let mut english: Vec<&str> = Vec::new();
        let mut french: Vec<&str> = Vec::new();
        for line in self.content_en.split('\n') {
            match original_language(line) {
                None => {}
                Some("en") => english.push(line),
                Some("fr") => french.push(line),
                Some(other) => {
                    tracing::warn!("[Import] Unrecognized language {}", other);
                    english.push(line);
                }
            }
        }
        let en = word_count(&english);
        let fr = word_count(&french);
        self.wordcount = en + fr;
        self.wordcount_en = Some(en);
    }

    /// The statement as originally spoken: each paragraph in the language it
    /// was delivered in.
    pub fn content_floor(&self) -> String {
        if self.content_fr.is_empty() {
            return self.content_en.clone();
        }
        let english: Vec<&str> = self.content_en.split('\n').collect();
        let french: Vec<&str> = self.content_fr.split('\n').collect();
        if english.len() != french.len() {
            tracing::error!(
                "[Import] Different en/fr paragraphs in statement {}",
                self.slug
            );
            return self.content_en.clone();
        }
        english
            .iter()
            .zip(french.iter())
            .map(|(en, fr)| match original_language(en) {
                Some("fr") => *fr,
                _ => *en,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn name_info(&self) -> NameInfo {
        let who = self.who_en.as_str();
        let mut info = NameInfo {
            named: true,
            ..NameInfo::default()
        };
        match &self.politician {
            None => {
                info.display_name = MISTER_RE.replace(who, "").into_owned();
                let context = self.who_context_en.as_str();
                if !context.is_empty() {
                    if who.contains(context) {
                        info.display_name =
                            TRAILING_PARENS_RE.replace(&info.display_name, "").into_owned();
                        info.post = Some(context.to_string());
                    } else {
                        info.post_reminder = Some(context.to_string());
                    }
                    if let Some(hocid) = self.who_hocid {
                        info.url = Some(format!("/search/?q=Witness%3A+%22{hocid}%22"));
                    }
                }
            }
            Some(politician) => {
                info.url = Some(politician.url.clone());
                if NOT_A_MEMBER_RE.is_match(who) {
                    info.display_name = if who.contains(&politician.name) {
                        ANY_PARENS_RE.replace_all(who, "").into_owned()
                    } else {
                        who.to_string()
                    };
                    info.named = false;
                } else if !who.contains('(') || !POLITICAL_POST_RE.is_match(who) {
                    info.display_name = politician.name.clone();
                } else {
                    info.post = POST_RE.captures(who).map(|caps| {
                        caps[1].split(',').next().unwrap_or_default().to_string()
                    });
                    info.display_name = politician.name.clone();
                }
            }
        }
        info
    }

    /// Assigns `<speaker>-<n>` slugs, numbering each speaker from 1.
    pub fn set_slugs(statements: &mut [Statement], max_chars: usize) {
        let mut counter: HashMap<String, usize> = HashMap::new();
        for statement in statements.iter_mut() {
            let mut slug = truncate_chars(&slugify(&statement.name_info().display_name), max_chars);
            if slug.is_empty() {
                slug = "procedural".to_string();
            }
            let n = counter.entry(slug.clone()).or_insert(0);
            *n += 1;
            statement.slug = format!("{slug}-{n}");
        }
    }
}
