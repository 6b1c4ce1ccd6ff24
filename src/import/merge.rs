use crate::configs::ImportConfig;
use crate::import::links::{process_related_links, EntityResolver};
use crate::import::statement::Statement;
use crate::runtime::logging::{LogLevel, QualityLog};
use crate::text::truncate_chars;
use crate::transcript::statement::{paragraph_id, paragraphs, PARAGRAPH_RE};
use crate::transcript::DraftStatement;
use regex::Captures;
use serde_json::json;
use std::collections::HashMap;

/// Headings as stored: when there is an h1 but no h2, the h3 moves up.
pub fn shift_headings(
    h1: Option<&str>,
    h2: Option<&str>,
    h3: Option<&str>,
) -> (String, String, String) {
    let h1 = h1.unwrap_or_default().to_string();
    let mut h2 = h2.unwrap_or_default().to_string();
    let mut h3 = h3.unwrap_or_default().to_string();
    if !h1.is_empty() && h2.is_empty() {
        h2 = std::mem::take(&mut h3);
    }
    (h1, h2, h3)
}

/// The French parse indexed by statement id and by paragraph id.
struct FrenchIndex<'a> {
    statements: HashMap<&'a str, &'a DraftStatement>,
    paragraphs: HashMap<u64, &'a str>,
    missing_ids: usize,
}

impl<'a> FrenchIndex<'a> {
    fn build(french: &'a [DraftStatement]) -> Self {
        let mut index = FrenchIndex {
            statements: HashMap::new(),
            paragraphs: HashMap::new(),
            missing_ids: 0,
        };
        for statement in french {
            if let Some(id) = statement.id.as_deref().filter(|id| !id.is_empty()) {
                index.statements.insert(id, statement);
            }
            for (paragraph, pid) in paragraphs(&statement.content) {
                if pid == 0 {
                    index.missing_ids += 1;
                } else {
                    index.paragraphs.insert(pid, paragraph);
                }
            }
        }
        index
    }
}

/// Fills in the French side of `statements` from the French parse. Returns
/// whether the document can be offered in both languages.
pub fn merge_french(
    statements: &mut [Statement],
    french: &[DraftStatement],
    config: &ImportConfig,
    resolver: &dyn EntityResolver,
    log: &mut QualityLog,
) -> bool {
    if statements.len() != french.len() {
        log.info(&format!(
            "French and English statement counts don't match ({} vs {})",
            statements.len(),
            french.len()
        ));
    }

    let index = FrenchIndex::build(french);
    if index.missing_ids as f64 > config.missing_paragraph_ratio * index.paragraphs.len() as f64 {
        log.log_event(
            LogLevel::Error,
            "French paragraphs not available",
            Some(json!({
                "missing_ids": index.missing_ids,
                "identified": index.paragraphs.len(),
            })),
        );
        return false;
    }

    let mut multilingual = true;
    for statement in statements.iter_mut() {
        let fr_data = statement
            .source_id
            .as_deref()
            .and_then(|id| index.statements.get(id).copied());
        let pids_en: Vec<u64> = paragraphs(&statement.content_en)
            .into_iter()
            .map(|(_, pid)| pid)
            .collect();
        let pids_fr: Option<Vec<u64>> = fr_data.map(DraftStatement::paragraph_ids);

        if let Some(fr) = fr_data.filter(|_| pids_fr.as_ref() == Some(&pids_en)) {
            statement.content_fr = process_related_links(&fr.content, statement, resolver, log);
        } else if pids_en.iter().all(|&pid| pid != 0) {
            let substituted = substitute_paragraphs(&statement.content_en, &index, log);
            statement.content_fr = process_related_links(&substituted, statement, resolver, log);
        } else {
            log.warn(&format!(
                "Could not do multilingual match of statement {}",
                statement.source_id.as_deref().unwrap_or("?")
            ));
            multilingual = false;
        }

        if let Some(fr) = fr_data {
            let (h1, h2, h3) = shift_headings(fr.h1.as_deref(), fr.h2.as_deref(), fr.h3.as_deref());
            statement.h1_fr = h1;
            statement.h2_fr = h2;
            statement.h3_fr = h3;
            statement.who_fr = truncate_chars(
                fr.person_attribution.as_deref().unwrap_or_default(),
                config.attribution_max_chars,
            );
            statement.who_context_fr = truncate_chars(
                fr.person_context.as_deref().unwrap_or_default(),
                config.attribution_max_chars,
            );
        }
    }
    multilingual
}

/// Swaps each English paragraph for the French one with the same id,
/// keeping the English where the French is missing.
fn substitute_paragraphs(content_en: &str, index: &FrenchIndex<'_>, log: &mut QualityLog) -> String {
    PARAGRAPH_RE
        .replace_all(content_en, |caps: &Captures| {
            let paragraph = &caps[0];
            let pid = paragraph_id(paragraph);
            if pid == 0 {
                return paragraph.to_string();
            }
            match index.paragraphs.get(&pid) {
                Some(french) => french.to_string(),
                None => {
                    log.log_event(
                        LogLevel::Error,
                        &format!("Paragraph ID {pid} not found in French"),
                        Some(json!({ "paragraph": pid })),
                    );
                    paragraph.to_string()
                }
            }
        })
        .into_owned()
}
