//! Discovering and downloading House sittings from ourcommons.ca.

use crate::configs::ImportConfig;
use crate::dom::preprocess;
use crate::error::{AlpheusError, FetchError, ImportError};
use crate::runtime::fetcher::Fetcher;
use crate::runtime::store::TranscriptStore;
use crate::types::Language;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashSet;

pub fn hansard_url(parliament: u32, session: u32, sitting: u32, language: Language) -> String {
    format!(
        "https://www.ourcommons.ca/Content/House/{parliament}{session}/Debates/{sitting:03}/HAN{sitting:03}-{}.XML",
        language.letter()
    )
}

/// What a single pass over a publication tells us before a full parse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PublicationScan {
    /// Root `id` attribute, `-1` when absent.
    pub source_id: i64,
    pub paragraphs: usize,
    pub paragraphs_with_id: usize,
}

impl PublicationScan {
    /// Whether more than `coverage` of the paragraphs carry ids. Freshly
    /// published sittings are sometimes missing them.
    pub fn has_paragraph_ids(&self, coverage: f64) -> bool {
        self.paragraphs > 0 && self.paragraphs_with_id as f64 / self.paragraphs as f64 > coverage
    }
}

fn has_id(e: &BytesStart<'_>) -> Result<bool, AlpheusError> {
    Ok(e.try_get_attribute("id")?
        .is_some_and(|attr| !attr.value.is_empty()))
}

pub fn scan_publication(xml: &[u8]) -> Result<PublicationScan, AlpheusError> {
    let text = std::str::from_utf8(xml).map_err(|e| AlpheusError::Xml(e.to_string()))?;
    let cleaned = preprocess(text);
    let mut reader = Reader::from_str(&cleaned);
    reader.config_mut().trim_text(true);

    let mut scan = PublicationScan {
        source_id: -1,
        paragraphs: 0,
        paragraphs_with_id: 0,
    };
    let mut seen_root = false;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => {
                if !seen_root {
                    seen_root = true;
                    if let Some(attr) = e.try_get_attribute("id")? {
                        let raw = String::from_utf8_lossy(&attr.value).into_owned();
                        scan.source_id =
                            raw.trim().parse().map_err(|_| AlpheusError::InvalidAttribute {
                                tag: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                                attr: "id",
                                value: raw.clone(),
                            })?;
                    }
                }
                if e.name().as_ref() == b"ParaText" {
                    scan.paragraphs += 1;
                    if has_id(&e)? {
                        scan.paragraphs_with_id += 1;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(scan)
}

/// Both language versions of one sitting.
#[derive(Debug, Clone)]
pub struct FetchedSitting {
    pub sitting: u32,
    pub source_id: i64,
    pub xml_en: Vec<u8>,
    pub xml_fr: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum SittingFetch {
    Found(FetchedSitting),
    /// No English publication for this sitting yet.
    Missing,
    /// Published, but without enough paragraph ids to import.
    Skipped,
}

pub async fn fetch_sitting(
    fetcher: &dyn Fetcher,
    parliament: u32,
    session: u32,
    sitting: u32,
    require_paragraph_ids: bool,
    config: &ImportConfig,
) -> Result<SittingFetch, ImportError> {
    let url_en = hansard_url(parliament, session, sitting, Language::En);
    let xml_en = match fetcher.fetch(&url_en).await {
        Ok(body) => body,
        Err(FetchError::NotFound(_)) => return Ok(SittingFetch::Missing),
        Err(e) => {
            tracing::error!("[Import] {}", e);
            return Ok(SittingFetch::Missing);
        }
    };
    tracing::info!("[Import] Fetched {}", url_en);

    let url_fr = hansard_url(parliament, session, sitting, Language::Fr);
    let xml_fr = fetcher.fetch(&url_fr).await?;

    let scan_en = scan_publication(&xml_en)?;
    let scan_fr = scan_publication(&xml_fr)?;
    if scan_en.source_id != scan_fr.source_id {
        return Err(ImportError::SourceMismatch {
            en: scan_en.source_id,
            fr: scan_fr.source_id,
        });
    }

    if require_paragraph_ids
        && !(scan_en.has_paragraph_ids(config.paragraph_id_coverage)
            && scan_fr.has_paragraph_ids(config.paragraph_id_coverage))
    {
        tracing::warn!("[Import] Missing paragraph IDs in sitting {}, cancelling", sitting);
        return Ok(SittingFetch::Skipped);
    }

    Ok(SittingFetch::Found(FetchedSitting {
        sitting,
        source_id: scan_en.source_id,
        xml_en,
        xml_fr,
    }))
}

/// Result of walking forward through a session's sittings.
#[derive(Debug, Default)]
pub struct SittingWalk {
    pub fetched: Vec<FetchedSitting>,
    /// Set when the walk stopped on a failure rather than an unpublished
    /// sitting. `fetched` still holds everything taken before it.
    pub halted: Option<ImportError>,
}

impl SittingWalk {
    fn halt(&mut self, sitting: u32, error: ImportError) {
        tracing::error!("[Import] Stopping at sitting {}: {}", sitting, error);
        self.halted = Some(error);
    }
}

/// Refuses a source id the store holds or this walk has already taken.
async fn claim_source(
    store: &dyn TranscriptStore,
    seen: &mut HashSet<i64>,
    source_id: i64,
    sitting: u32,
) -> Result<(), ImportError> {
    let stored = store
        .source_exists(source_id)
        .await
        .map_err(ImportError::Store)?;
    if stored || !seen.insert(source_id) {
        return Err(ImportError::DuplicateSource { source_id, sitting });
    }
    Ok(())
}

/// Walks forward from `last_sitting` until a sitting is not yet published.
/// Sittings without paragraph ids are passed over, not treated as the end.
/// A failure, including a source id already stored or already seen in this
/// walk, stops the walk but keeps the sittings fetched so far.
pub async fn fetch_new_sittings(
    fetcher: &dyn Fetcher,
    store: &dyn TranscriptStore,
    parliament: u32,
    session: u32,
    last_sitting: u32,
    require_paragraph_ids: bool,
    config: &ImportConfig,
) -> SittingWalk {
    let mut walk = SittingWalk::default();
    let mut seen = HashSet::new();
    let mut sitting = last_sitting;
    loop {
        sitting += 1;
        let found = match fetch_sitting(
            fetcher,
            parliament,
            session,
            sitting,
            require_paragraph_ids,
            config,
        )
        .await
        {
            Ok(SittingFetch::Found(found)) => found,
            Ok(SittingFetch::Skipped) => continue,
            Ok(SittingFetch::Missing) => break,
            Err(e) => {
                walk.halt(sitting, e);
                break;
            }
        };
        if let Err(e) = claim_source(store, &mut seen, found.source_id, sitting).await {
            walk.halt(sitting, e);
            break;
        }
        tracing::info!("[Import] Found sitting {}", sitting);
        walk.fetched.push(found);
    }
    walk
}
