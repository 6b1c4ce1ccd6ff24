use crate::import::statement::Statement;
use crate::runtime::logging::QualityLog;
use crate::text::build_tag;
use crate::types::{BillRef, PoliticianRef, VoteRef};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static RELATED_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a class="related_link (\w+)" ([^>]+)>(.*?)</a>"#).unwrap()
});
static DATA_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-([\w-]+)="([^"]+)""#).unwrap());
static BILL_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[CS]\-\d+[A-E]?\b").unwrap());

/// Looks up the people, bills and votes that transcript links point at.
pub trait EntityResolver: Send + Sync {
    fn politician(&self, hoc_id: u32) -> Option<PoliticianRef>;
    fn bill(&self, legisinfo_id: u32) -> Option<BillRef>;
    /// Placeholder for a bill known only by its number so far.
    fn temporary_bill(&self, legisinfo_id: u32, number: &str) -> BillRef;
    fn vote(&self, number: u32) -> Option<VoteRef>;
    /// Where a vote that has not been imported yet will live.
    fn vote_url(&self, number: &str) -> String;
}

/// Resolves nothing; bills and votes fall back to session-relative URLs.
#[derive(Debug, Clone, Default)]
pub struct NoopResolver {
    pub session: String,
}

impl NoopResolver {
    pub fn new(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
        }
    }
}

impl EntityResolver for NoopResolver {
    fn politician(&self, _hoc_id: u32) -> Option<PoliticianRef> {
        None
    }

    fn bill(&self, _legisinfo_id: u32) -> Option<BillRef> {
        None
    }

    fn temporary_bill(&self, legisinfo_id: u32, number: &str) -> BillRef {
        BillRef {
            legisinfo_id,
            number: number.to_string(),
            name: String::new(),
            url: format!("/bills/{}/{number}/", self.session),
        }
    }

    fn vote(&self, _number: u32) -> Option<VoteRef> {
        None
    }

    fn vote_url(&self, number: &str) -> String {
        format!("/votes/{}/{number}/", self.session)
    }
}

/// Rewrites the parser's `related_link` anchors into site links, recording
/// what they point at on the statement. Links that cannot be resolved are
/// reduced to their text.
pub fn process_related_links(
    content: &str,
    statement: &mut Statement,
    resolver: &dyn EntityResolver,
    log: &mut QualityLog,
) -> String {
    RELATED_LINK_RE
        .replace_all(content, |caps: &Captures| {
            rewrite_link(&caps[1], &caps[2], &caps[3], statement, resolver, log)
        })
        .into_owned()
}

fn rewrite_link(
    link_type: &str,
    tag_attrs: &str,
    text: &str,
    statement: &mut Statement,
    resolver: &dyn EntityResolver,
    log: &mut QualityLog,
) -> String {
    let params: HashMap<&str, &str> = DATA_ATTR_RE
        .captures_iter(tag_attrs)
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str();
            let value = caps.get(2)?.as_str();
            Some((key, value))
        })
        .collect();
    let Some(hocid) = params.get("HoCid").and_then(|v| v.parse::<u32>().ok()) else {
        log.warn(&format!("Related {link_type} link without a usable id: {text}"));
        return text.to_string();
    };

    let (url, title) = match link_type {
        "politician" => {
            let Some(politician) = resolver.politician(hocid) else {
                log.warn(&format!(
                    "Could not resolve related politician #{hocid}, {text}"
                ));
                return text.to_string();
            };
            let link = (politician.url.clone(), Some(politician.name.clone()));
            statement.add_mentioned_politician(politician);
            link
        }
        "legislation" => {
            let bill = match resolver.bill(hocid) {
                Some(bill) => bill,
                None => match BILL_NUMBER_RE.find(text) {
                    Some(number) => resolver.temporary_bill(hocid, number.as_str()),
                    None => {
                        log.error(&format!("Invalid bill link {text}"));
                        return text.to_string();
                    }
                },
            };
            let link = (bill.url.clone(), Some(bill.name.clone()));
            statement.add_bill(bill);
            link
        }
        "vote" => {
            let number = params.get("number").copied().unwrap_or_default();
            match number.parse::<u32>().ok().and_then(|n| resolver.vote(n)) {
                Some(vote) => {
                    let link = (vote.url.clone(), Some(vote.description.clone()));
                    statement.vote = Some(vote);
                    link
                }
                // The vote is expected to be imported shortly.
                None => (resolver.vote_url(number), None),
            }
        }
        other => {
            log.error(&format!("Unknown link type {other}"));
            return text.to_string();
        }
    };

    let mut attrs = vec![("href", url), ("data-HoCid", hocid.to_string())];
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        attrs.push(("title", title));
    }
    format!("{}{text}</a>", build_tag("a", &attrs))
}
