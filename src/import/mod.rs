//! Turning a pair of parsed transcripts into stored statements.

pub mod align;
pub mod links;
pub mod merge;
pub mod statement;

use crate::configs::ImportConfig;
use crate::error::ImportError;
use crate::runtime::logging::{LogLevel, QualityEvent, QualityLog};
use crate::runtime::store::TranscriptStore;
use crate::text::truncate_chars;
use crate::transcript::{parse_bytes, ParsedDocument};
use crate::types::{DocumentMeta, SequenceMapping};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use self::align::align_sequences;
use self::links::{process_related_links, EntityResolver};
use self::merge::{merge_french, shift_headings};
use self::statement::Statement;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreparedDocument {
    pub meta: DocumentMeta,
    /// Sitting date after reconciling the stored date with both parses.
    pub date: NaiveDate,
    pub number: String,
    pub multilingual: bool,
    pub statements: Vec<Statement>,
    pub events: Vec<QualityEvent>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Replace existing statements, recording where each old one went.
    pub reimport_preserving_sequence: bool,
}

/// A transcript as stored before import: both languages of raw XML.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub id: String,
    pub date: Option<NaiveDate>,
    pub xml_en: Vec<u8>,
    pub xml_fr: Vec<u8>,
}

pub struct ImportContext<'a> {
    pub store: &'a dyn TranscriptStore,
    pub resolver: &'a dyn EntityResolver,
    pub config: &'a ImportConfig,
}

#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub document: PreparedDocument,
    pub mappings: Vec<SequenceMapping>,
}

fn reconcile_date(
    known: Option<NaiveDate>,
    en: &ParsedDocument,
    fr: &ParsedDocument,
    log: &mut QualityLog,
) -> NaiveDate {
    match known {
        Some(date) => {
            // The XML sometimes carries the wrong date; the stored one stands.
            if date != en.meta.date && date != fr.meta.date {
                log.log_event(
                    LogLevel::Error,
                    &format!("Date mismatch: {date} vs {}", en.meta.date),
                    Some(json!({ "known": date, "parsed": en.meta.date })),
                );
            }
            date
        }
        None => en.meta.date,
    }
}

fn statement_from_draft(
    sequence: usize,
    draft: &crate::transcript::DraftStatement,
    config: &ImportConfig,
    resolver: &dyn EntityResolver,
    log: &mut QualityLog,
) -> Statement {
    let (h1_en, h2_en, h3_en) = shift_headings(draft.h1.as_deref(), draft.h2.as_deref(), draft.h3.as_deref());
    let who_hocid = match draft.person_id.as_deref().filter(|id| !id.is_empty()) {
        Some(raw) => match raw.parse::<u32>() {
            Ok(id) => Some(id),
            Err(_) => {
                log.warn(&format!("Could not parse person ID {raw}"));
                None
            }
        },
        None => None,
    };

    let mut statement = Statement {
        sequence,
        source_id: draft.id.clone(),
        time: draft.timestamp,
        h1_en,
        h2_en,
        h3_en,
        who_en: truncate_chars(
            draft.person_attribution.as_deref().unwrap_or_default(),
            config.attribution_max_chars,
        ),
        who_hocid,
        who_context_en: truncate_chars(
            draft.person_context.as_deref().unwrap_or_default(),
            config.attribution_max_chars,
        ),
        statement_type: draft
            .intervention_type
            .as_deref()
            .unwrap_or_default()
            .to_lowercase(),
        written_question: draft
            .written_question
            .map(|q| q.letter().to_string())
            .unwrap_or_default(),
        ..Statement::default()
    };

    // Only non-members carry a person type, so anyone else with an id is a
    // politician.
    if let Some(hocid) = who_hocid.filter(|_| draft.person_type.is_none()) {
        statement.politician = resolver.politician(hocid);
        if statement.politician.is_none() {
            log.info(&format!(
                "Could not resolve speaking politician ID {hocid} for {:?}",
                statement.who_en
            ));
        }
    }

    statement.content_en = process_related_links(&draft.content, &mut statement, resolver, log);
    statement
}

/// Builds storable bilingual statements from the two parses of a sitting.
pub fn prepare_document(
    en: &ParsedDocument,
    fr: &ParsedDocument,
    known_date: Option<NaiveDate>,
    config: &ImportConfig,
    resolver: &dyn EntityResolver,
) -> PreparedDocument {
    let mut log = QualityLog::new();
    let date = reconcile_date(known_date, en, fr, &mut log);

    let mut statements: Vec<Statement> = en
        .statements
        .iter()
        .enumerate()
        .map(|(sequence, draft)| statement_from_draft(sequence, draft, config, resolver, &mut log))
        .collect();

    let multilingual = merge_french(&mut statements, &fr.statements, config, resolver, &mut log);
    Statement::set_slugs(&mut statements, config.slug_max_chars);
    for statement in statements.iter_mut() {
        statement.finalize(config);
    }

    PreparedDocument {
        meta: en.meta.clone(),
        date,
        number: en.meta.document_number.clone(),
        multilingual,
        statements,
        events: log.into_events(),
    }
}

/// Parses, merges and stores a transcript. Returns `None` when the document
/// already has statements and the options do not allow replacing them.
pub async fn import_document(
    ctx: &ImportContext<'_>,
    source: &SourceDocument,
    options: ImportOptions,
) -> Result<Option<ImportOutcome>, ImportError> {
    let existing = ctx
        .store
        .statements(&source.id)
        .await
        .map_err(ImportError::Store)?;

    let mut old_statements = Vec::new();
    if !existing.is_empty() {
        if !options.reimport_preserving_sequence {
            tracing::info!(
                "[Import] Statements already exist for {}, skipping",
                source.id
            );
            return Ok(None);
        }
        let has_mappings = ctx
            .store
            .has_sequence_mappings(&source.id)
            .await
            .map_err(ImportError::Store)?;
        if has_mappings {
            tracing::error!("[Import] Sequence mapping already exists for {}", source.id);
            return Ok(None);
        }
        old_statements = existing;
    }

    let en = parse_bytes(&source.xml_en)?;
    let fr = parse_bytes(&source.xml_fr)?;
    let mut document = prepare_document(&en, &fr, source.date, ctx.config, ctx.resolver);

    let mappings = if old_statements.is_empty() {
        Vec::new()
    } else {
        let mut log = QualityLog::new();
        let mappings = align_sequences(&document.statements, &old_statements, ctx.config, &mut log);
        document.events.extend(log.into_events());
        mappings
    };

    ctx.store
        .replace_statements(&source.id, &document, &mappings)
        .await
        .map_err(ImportError::Store)?;
    tracing::info!(
        "[Import] Imported {} statements for {} ({} sequence mappings)",
        document.statements.len(),
        source.id,
        mappings.len()
    );

    Ok(Some(ImportOutcome { document, mappings }))
}
