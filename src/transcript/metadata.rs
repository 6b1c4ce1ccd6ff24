use crate::dom::XmlTree;
use crate::error::AlpheusError;
use crate::types::{CommitteeMeta, DocumentMeta, DocumentType, Language};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static CLOCK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+):(\d+)").unwrap());

/// `ExtractedItem` values by `Name`, first occurrence wins.
struct ExtractedItems(HashMap<String, String>);

impl ExtractedItems {
    fn collect(tree: &XmlTree) -> Self {
        let mut items = HashMap::new();
        for id in tree.find_all("ExtractedItem") {
            if let Some(name) = tree.attr(id, "Name") {
                items
                    .entry(name.to_string())
                    .or_insert_with(|| tree.get(id).text_str().to_string());
            }
        }
        Self(items)
    }

    fn get(&self, name: &'static str) -> Result<&str, AlpheusError> {
        self.0
            .get(name)
            .map(String::as_str)
            .ok_or(AlpheusError::MissingMetadata(name))
    }

    fn number<T: std::str::FromStr>(&self, name: &'static str) -> Result<T, AlpheusError> {
        let raw = self.get(name)?;
        raw.trim().parse().map_err(|_| AlpheusError::InvalidMetadata {
            field: name,
            value: raw.to_string(),
        })
    }
}

pub fn extract(tree: &XmlTree) -> Result<DocumentMeta, AlpheusError> {
    let root = tree.root();
    if tree.tag(root) != "Hansard" {
        return Err(AlpheusError::MissingElement("Hansard"));
    }

    let items = ExtractedItems::collect(tree);
    let year: i32 = items.number("MetaDateNumYear")?;
    let month: u32 = items.number("MetaDateNumMonth")?;
    let day: u32 = items.number("MetaDateNumDay")?;
    let date =
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| AlpheusError::InvalidMetadata {
            field: "MetaDateNum",
            value: format!("{year}-{month}-{day}"),
        })?;

    let lang = tree
        .attr(root, "xml:lang")
        .ok_or(AlpheusError::MissingMetadata("xml:lang"))?;
    let language = Language::from_code(lang).ok_or_else(|| AlpheusError::InvalidMetadata {
        field: "xml:lang",
        value: lang.to_string(),
    })?;

    let document_type = DocumentType::from_category(items.get("MetaDocumentCategory")?);
    let committee = if document_type == DocumentType::Committee {
        Some(CommitteeMeta {
            acronym: items.get("Acronyme")?.to_string(),
            name_en: items.get("InstitutionDebateEn")?.to_string(),
            name_fr: items.get("InstitutionDebateFr")?.to_string(),
        })
    } else {
        None
    };

    let number = items.get("Number")?;
    let document_number = number
        .split_whitespace()
        .last()
        .ok_or_else(|| AlpheusError::InvalidMetadata {
            field: "Number",
            value: number.to_string(),
        })?
        .trim_start_matches('0')
        .to_string();

    Ok(DocumentMeta {
        document_type,
        date,
        parliament: items.number("ParliamentNumber")?,
        session: items.number("SessionNumber")?,
        language,
        document_number,
        committee,
    })
}

/// Combines a sitting clock reading with the sitting date. Hansard counts
/// past midnight ("25:10"), which lands on the following day.
pub fn time_to_datetime(hour: u32, minute: u32, date: NaiveDate) -> Option<NaiveDateTime> {
    let date = date.checked_add_days(Days::new(u64::from(hour / 24)))?;
    let time = NaiveTime::from_hms_opt(hour % 24, minute, 0)?;
    Some(date.and_time(time))
}

/// Reads the clock from "The House met at 10 a.m." style openings, where
/// `number` is "10", "10.30" or "10:30" and `ampm` may be empty.
pub fn house_met_time(number: &str, ampm: &str) -> Option<NaiveTime> {
    let ampm = ampm.replace('.', "").to_lowercase();
    let number = number.replace('.', ":");
    let (hour, minute): (u32, u32) = match CLOCK_RE.captures(&number) {
        Some(caps) => (caps[1].parse().ok()?, caps[2].parse().ok()?),
        None => (number.parse().ok()?, 0),
    };
    let hour = match ampm.as_str() {
        "" => hour,
        _ if !(1..=12).contains(&hour) => return None,
        "am" => hour % 12,
        _ => hour % 12 + 12,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}
