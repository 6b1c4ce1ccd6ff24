use crate::text::{letters_only, strip_person_name, CONTEXT_RE, INDETERMINATE_RE};
use crate::transcript::statement::{DraftStatement, OneTimeAttributes};
use crate::types::PersonType;
use std::collections::HashMap;

/// `Affiliation/@Type` codes known to mark someone who is not a member.
pub const AFFILIATION_TYPES: &[(&str, PersonType)] = &[
    ("28", PersonType::Witness),
    ("27", PersonType::Clerk),
    ("26", PersonType::Analyst),
];

pub fn person_type_for_code(code: &str) -> Option<PersonType> {
    AFFILIATION_TYPES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, person_type)| *person_type)
}

/// The speaker formally introduced by the last `PersonSpeaking`.
#[derive(Debug, Clone)]
pub struct MainSpeaker {
    pub id: Option<String>,
    pub name: String,
}

impl Default for MainSpeaker {
    // Before anyone is introduced the id is empty, which never matches a real one.
    fn default() -> Self {
        Self {
            id: Some(String::new()),
            name: String::new(),
        }
    }
}

/// True when the open statement already belongs to this speaker and the label
/// is specific enough to merge on.
pub fn continues_statement(
    current: &DraftStatement,
    hoc_id: Option<&str>,
    description: &str,
) -> bool {
    let same_speaker = match hoc_id {
        Some(id) if !id.is_empty() && current.person_id.as_deref() == Some(id) => true,
        Some(_) => false,
        None => current.person_attribution.as_deref().is_some_and(|previous| {
            letters_only(&strip_person_name(description))
                == letters_only(&strip_person_name(previous))
        }),
    };
    // Two "An hon. member" in a row can be two different people.
    same_speaker && !INDETERMINATE_RE.is_match(description)
}

/// Remembers what has been learned about each attribution so later, sparser
/// mentions of the same person can be completed.
#[derive(Debug, Default)]
pub struct SpeakerResolver {
    ids: HashMap<String, String>,
    types: HashMap<String, PersonType>,
    contexts: HashMap<String, String>,
}

impl SpeakerResolver {
    /// Records a new speaker into the attributes of the next statement.
    /// `description` must already be whitespace-tamed.
    pub fn introduce(
        &mut self,
        hoc_id: Option<&str>,
        description: &str,
        affiliation_code: Option<&str>,
        pending: &mut OneTimeAttributes,
    ) {
        let stripped = strip_person_name(description);
        let hoc_id = hoc_id.filter(|id| !id.is_empty());

        pending.person_attribution = Some(description.to_string());
        match hoc_id {
            Some(id) => pending.person_id = Some(id.to_string()),
            None => {
                if let Some(known) = self.ids.get(&stripped) {
                    pending.person_id = Some(known.clone());
                }
            }
        }

        let code = affiliation_code.filter(|code| !code.is_empty());
        match code {
            Some(code) => {
                if let Some(person_type) = person_type_for_code(code) {
                    pending.person_type = Some(person_type);
                }
            }
            None => {
                if let Some(known) = self.types.get(&stripped) {
                    pending.person_type = Some(*known);
                }
            }
        }

        if let Some(caps) = CONTEXT_RE.captures(description) {
            pending.person_context = Some(caps[1].to_string());
        } else if let Some(known) = self.contexts.get(&stripped) {
            pending.person_context = Some(known.clone());
        }

        for key in [description.to_string(), stripped] {
            if let Some(id) = hoc_id {
                self.ids.insert(key.clone(), id.to_string());
            }
            if let Some(person_type) = pending.person_type {
                self.types.insert(key.clone(), person_type);
            }
            if let Some(context) = pending.person_context.as_ref().filter(|c| !c.is_empty()) {
                self.contexts.insert(key, context.clone());
            }
        }
    }
}
