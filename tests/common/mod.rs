#![allow(dead_code)]
use async_trait::async_trait;
use hansard_ingest::error::FetchError;
use hansard_ingest::import::links::{EntityResolver, NoopResolver};
use hansard_ingest::runtime::fetcher::Fetcher;
use hansard_ingest::types::{BillRef, PoliticianRef, VoteRef};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub fn fixtures_dir() -> String {
    format!("{}/tests/fixtures", env!("CARGO_MANIFEST_DIR"))
}

pub fn load_fixture(filename: &str) -> String {
    let path = Path::new(&fixtures_dir()).join(filename);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

pub fn load_fixture_bytes(filename: &str) -> Vec<u8> {
    load_fixture(filename).into_bytes()
}

/// A minimal English debate around `body`, which becomes the `HansardBody`.
pub fn debate_with_body(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Hansard id="1" xml:lang="en">
<ExtractedInformation>
<ExtractedItem Name="MetaDocumentCategory">Debates</ExtractedItem>
<ExtractedItem Name="MetaDateNumYear">2012</ExtractedItem>
<ExtractedItem Name="MetaDateNumMonth">6</ExtractedItem>
<ExtractedItem Name="MetaDateNumDay">11</ExtractedItem>
<ExtractedItem Name="ParliamentNumber">41</ExtractedItem>
<ExtractedItem Name="SessionNumber">1</ExtractedItem>
<ExtractedItem Name="Number">No. 142</ExtractedItem>
</ExtractedInformation>
<HansardBody>
{body}
</HansardBody>
</Hansard>"#
    )
}

/// Serves canned bodies by URL; anything unknown is a 404.
#[derive(Clone, Default)]
pub struct MockFetcher {
    pub responses: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    pub statuses: Arc<Mutex<HashMap<String, u16>>>,
    pub requested: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_response(&self, url: &str, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), body.as_bytes().to_vec());
    }

    pub fn add_status(&self, url: &str, status: u16) {
        self.statuses.lock().unwrap().insert(url.to_string(), status);
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        if let Some(status) = self.statuses.lock().unwrap().get(url) {
            return Err(FetchError::Status {
                status: *status,
                url: url.to_string(),
            });
        }
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_string()))
    }
}

/// Knows the two members and the one bill that appear in the debate fixtures.
pub struct FixtureResolver {
    fallback: NoopResolver,
}

impl FixtureResolver {
    pub fn new() -> Self {
        Self {
            fallback: NoopResolver::new("41-1"),
        }
    }
}

impl EntityResolver for FixtureResolver {
    fn politician(&self, hoc_id: u32) -> Option<PoliticianRef> {
        let (name, url) = match hoc_id {
            170 => ("Jane Doe", "/politicians/jane-doe/"),
            200 => ("John Smith", "/politicians/john-smith/"),
            _ => return None,
        };
        Some(PoliticianRef {
            hoc_id,
            name: name.to_string(),
            url: url.to_string(),
        })
    }

    fn bill(&self, legisinfo_id: u32) -> Option<BillRef> {
        (legisinfo_id == 5000).then(|| BillRef {
            legisinfo_id,
            number: "C-38".to_string(),
            name: "Jobs, Growth and Long-term Prosperity Act".to_string(),
            url: "/bills/41-1/C-38/".to_string(),
        })
    }

    fn temporary_bill(&self, legisinfo_id: u32, number: &str) -> BillRef {
        self.fallback.temporary_bill(legisinfo_id, number)
    }

    fn vote(&self, _number: u32) -> Option<VoteRef> {
        None
    }

    fn vote_url(&self, number: &str) -> String {
        self.fallback.vote_url(number)
    }
}
