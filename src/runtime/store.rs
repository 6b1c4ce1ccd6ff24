use crate::import::statement::Statement;
use crate::import::PreparedDocument;
use crate::types::SequenceMapping;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Persistence for imported transcripts, keyed by document id.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    async fn statements(&self, document_id: &str) -> Result<Vec<Statement>, String>;
    async fn has_sequence_mappings(&self, document_id: &str) -> Result<bool, String>;
    async fn source_exists(&self, source_id: i64) -> Result<bool, String>;
    /// Swaps the document's statements for the prepared ones and records the
    /// mappings, all at once or not at all.
    async fn replace_statements(
        &self,
        document_id: &str,
        document: &PreparedDocument,
        mappings: &[SequenceMapping],
    ) -> Result<(), String>;
}

#[derive(Debug, Default)]
struct MemoryState {
    statements: HashMap<String, Vec<Statement>>,
    mappings: HashMap<String, Vec<SequenceMapping>>,
    sources: HashSet<i64>,
}

/// Keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> Result<T, String> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| format!("Store lock poisoned: {e}"))?;
        Ok(f(&mut state))
    }

    pub fn insert_statements(&self, document_id: &str, statements: Vec<Statement>) -> Result<(), String> {
        self.with_state(|state| {
            state.statements.insert(document_id.to_string(), statements);
        })
    }

    pub fn insert_source(&self, source_id: i64) -> Result<(), String> {
        self.with_state(|state| {
            state.sources.insert(source_id);
        })
    }

    pub fn mappings(&self, document_id: &str) -> Result<Vec<SequenceMapping>, String> {
        self.with_state(|state| state.mappings.get(document_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl TranscriptStore for MemoryStore {
    async fn statements(&self, document_id: &str) -> Result<Vec<Statement>, String> {
        self.with_state(|state| state.statements.get(document_id).cloned().unwrap_or_default())
    }

    async fn has_sequence_mappings(&self, document_id: &str) -> Result<bool, String> {
        self.with_state(|state| {
            state
                .mappings
                .get(document_id)
                .is_some_and(|mappings| !mappings.is_empty())
        })
    }

    async fn source_exists(&self, source_id: i64) -> Result<bool, String> {
        self.with_state(|state| state.sources.contains(&source_id))
    }

    async fn replace_statements(
        &self,
        document_id: &str,
        document: &PreparedDocument,
        mappings: &[SequenceMapping],
    ) -> Result<(), String> {
        self.with_state(|state| {
            state
                .statements
                .insert(document_id.to_string(), document.statements.clone());
            if !mappings.is_empty() {
                state
                    .mappings
                    .insert(document_id.to_string(), mappings.to_vec());
            }
        })
    }
}
