/// Elements whose contents are discarded outright.
pub const EXCLUDE_TAGS: &[&str] = &[
    // Usually repeats a heading given elsewhere.
    "CatchLine",
    "Prayer",
    // Read by the WrittenQuestionResponse handler.
    "QuestionID",
    "Appendix",
];

/// Elements kept as HTML, attributes dropped and possibly renamed.
pub const PASSTHROUGH_TAGS: &[(&str, &str)] = &[
    ("I", "em"),
    ("Sup", "sup"),
    ("Sub", "sub"),
    ("table", "table"),
    ("row", "tr"),
    ("entry", "td"),
];

/// Structural elements whose text is kept without complaint.
pub const IGNORE_TAGS: &[&str] = &[
    "Quote",
    "QuotePara",
    "ForceColumnBreak",
    "SubjectOfBusinessContent",
    "Content",
    "HansardBody",
    "Intro",
    "Poetry",
    "Query",
    "Motion",
    "MotionBody",
    "CommitteeQuote",
    "LegislationQuote",
    "Pause",
    "StartPause",
    "EndPause",
    "Date",
    "Insertion",
    "colspec",
    "tgroup",
    "tbody",
    "thead",
    "title",
    "EditorsNotes",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Open,
    Close,
}

/// Whether the walker visits an element's children (and later its close).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Descend,
    NoDescend,
}

/// Elements with dedicated handling. Everything else goes through `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `ParaText` and `ThroneSpeechPara`.
    Paragraph,
    ProceduralText,
    ThroneSpeech,
    Bold,
    Verse,
    Line,
    /// `PersonSpeaking`, `Questioner` and `Responder`.
    PersonSpeaking,
    Intervention,
    FloorLanguage,
    Timestamp,
    SubjectOfBusinessQualifier,
    SubjectOfBusinessTitle,
    SubjectOfBusiness,
    OrderOfBusiness,
    OrderOfBusinessTitle,
    WrittenQuestionResponse,
    QuestionContent,
    ResponseContent,
    Affiliation,
    Document,
    Division,
    Default,
}

impl TagKind {
    pub fn classify(tag: &str) -> Self {
        match tag {
            "ParaText" | "ThroneSpeechPara" => TagKind::Paragraph,
            "ProceduralText" => TagKind::ProceduralText,
            "ThroneSpeech" => TagKind::ThroneSpeech,
            "B" => TagKind::Bold,
            "Verse" => TagKind::Verse,
            "Line" => TagKind::Line,
            "PersonSpeaking" | "Questioner" | "Responder" => TagKind::PersonSpeaking,
            "Intervention" => TagKind::Intervention,
            "FloorLanguage" => TagKind::FloorLanguage,
            "Timestamp" => TagKind::Timestamp,
            "SubjectOfBusinessQualifier" => TagKind::SubjectOfBusinessQualifier,
            "SubjectOfBusinessTitle" => TagKind::SubjectOfBusinessTitle,
            "SubjectOfBusiness" => TagKind::SubjectOfBusiness,
            "OrderOfBusiness" => TagKind::OrderOfBusiness,
            "OrderOfBusinessTitle" => TagKind::OrderOfBusinessTitle,
            "WrittenQuestionResponse" => TagKind::WrittenQuestionResponse,
            "QuestionContent" => TagKind::QuestionContent,
            "ResponseContent" => TagKind::ResponseContent,
            "Affiliation" => TagKind::Affiliation,
            "Document" => TagKind::Document,
            "Division" => TagKind::Division,
            _ => TagKind::Default,
        }
    }
}

pub fn is_excluded(tag: &str) -> bool {
    EXCLUDE_TAGS.contains(&tag)
}

pub fn passthrough(tag: &str) -> Option<&'static str> {
    PASSTHROUGH_TAGS
        .iter()
        .find(|(from, _)| *from == tag)
        .map(|(_, to)| *to)
}

pub fn is_ignored(tag: &str) -> bool {
    IGNORE_TAGS.contains(&tag) || passthrough(tag).is_some()
}
