use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static SLUG_DISALLOWED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SLUG_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").unwrap());

/// How a leading speaker label reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// A courtesy title in front of a real name ("Mr.", "Mme", "Hon.").
    Honorific,
    /// A presiding or procedural office ("The Speaker", "The Chair").
    Office,
    /// An unnamed voice from the floor ("An hon. member", "Des voix").
    Generic,
}

/// Ordered speaker-label prefixes. Honorifics come first so `classify_label`
/// prefers them.
pub const SPEAKER_LABELS: &[(&str, LabelKind)] = &[
    (r"Right\sHon\.\s", LabelKind::Honorific),
    (r"Mr\.?\s", LabelKind::Honorific),
    (r"Mrs\.?\s", LabelKind::Honorific),
    (r"Ms\.?\s", LabelKind::Honorific),
    (r"Miss\.?\s", LabelKind::Honorific),
    (r"Hon\.?\s", LabelKind::Honorific),
    (r"M\.\s", LabelKind::Honorific),
    (r"L.hon\.?\s", LabelKind::Honorific),
    (r"Mme\.?\s", LabelKind::Honorific),
    (r"Mlle\.?\s", LabelKind::Honorific),
    (r"Dr\.?\s", LabelKind::Honorific),
    (r"The\sSpeaker", LabelKind::Office),
    (r"Le\sprésident", LabelKind::Office),
    (r"The\sChair", LabelKind::Office),
    (r"The\sDeputy", LabelKind::Office),
    (r"The\sActing", LabelKind::Office),
    (r"Acting\s", LabelKind::Office),
    (r"Le\strès\s", LabelKind::Office),
    (r"Assistant\s", LabelKind::Office),
    (r"An\s[hH]on\.?\s", LabelKind::Generic),
    (r"Some\s[hH]on\.\s", LabelKind::Generic),
    (r"Une\svoix", LabelKind::Generic),
    (r"Des\svoix", LabelKind::Generic),
];

fn label_regex(wanted: LabelKind) -> Regex {
    let alternatives = SPEAKER_LABELS
        .iter()
        .filter(|(_, kind)| *kind == wanted)
        .map(|(pattern, _)| *pattern)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("^(?:{alternatives})")).unwrap()
}

pub static HONORIFIC_RE: LazyLock<Regex> =
    LazyLock::new(|| label_regex(LabelKind::Honorific));
static LABEL_RES: LazyLock<Vec<(Regex, LabelKind)>> = LazyLock::new(|| {
    SPEAKER_LABELS
        .iter()
        .map(|(pattern, kind)| (Regex::new(&format!("^(?:{pattern})")).unwrap(), *kind))
        .collect()
});

/// Generic attributions that may legitimately repeat across different people.
pub static INDETERMINATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(An?|Une)\s").unwrap());
/// Any parenthetical inside a name, e.g. a riding or a post.
pub static PARENS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\(.+\)\s*").unwrap());
/// A trailing parenthetical context, captured.
pub static CONTEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s?\((.+)\)\s*$").unwrap());
pub static TRAILING_PARENS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(.+\)\s*$").unwrap());
pub static POLITICAL_POST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(Minister|Leader|Secretary|Solicitor|Attorney|Speaker|Deputy |Soliciter|Chair |Parliamentary|President |for )").unwrap()
});
/// Attributions that do not name a member.
pub static NOT_A_MEMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(The|A|Some|Acting|Santa|One|Assistant|An\.?|Le|La|Une|Des|Voices)").unwrap()
});
pub static CHAIR_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(Speaker|Chair|président)").unwrap());
pub static MISTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(Mr|Mrs|Ms|Miss|Hon|Right Hon|M|Mme)\.?\s+").unwrap());

/// What the start of a paragraph says about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphCue {
    /// "(Motion agreed to)", "[Translation]"
    StageDirection,
    /// "Mr. X moved that ..." / "M. X demande ..."
    Motion,
}

pub const PARAGRAPH_CUES: &[(&str, ParagraphCue)] = &[
    ("(", ParagraphCue::StageDirection),
    ("[", ParagraphCue::StageDirection),
    ("moved", ParagraphCue::Motion),
    ("demande", ParagraphCue::Motion),
];

/// Stock phrase left at the top of the paragraph after a motion.
pub static MOTION_BOILERPLATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([S]?[hH]e said:|--)\s*").unwrap());

pub fn classify_label(label: &str) -> Option<LabelKind> {
    LABEL_RES
        .iter()
        .find(|(re, _)| re.is_match(label))
        .map(|(_, kind)| *kind)
}

pub fn paragraph_cue(text: &str) -> Option<ParagraphCue> {
    PARAGRAPH_CUES
        .iter()
        .find(|(prefix, _)| text.starts_with(prefix))
        .map(|(_, cue)| *cue)
}

pub fn tame_whitespace(s: &str) -> String {
    WHITESPACE_RE.replace_all(s, " ").trim().to_string()
}

/// Lower-cased ASCII letters only; used to compare names loosely.
pub fn letters_only(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect()
}

fn is_all_cased(s: &str, upper: bool) -> bool {
    let mut saw_cased = false;
    for c in s.chars() {
        if c.is_uppercase() {
            if !upper {
                return false;
            }
            saw_cased = true;
        } else if c.is_lowercase() {
            if upper {
                return false;
            }
            saw_cased = true;
        }
    }
    saw_cased
}

/// Title-cases headings that arrive in a single case ("ROUTINE PROCEEDINGS").
pub fn smart_title(s: &str) -> String {
    if !(is_all_cased(s, true) || is_all_cased(s, false)) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut previous_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if previous_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_letter = true;
        } else {
            out.push(c);
            previous_letter = false;
        }
    }
    out
}

/// Escapes text for HTML content. Quotation marks are left alone.
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Quotes an attribute value, picking single quotes when the value holds a
/// double quote but no single quote.
pub fn quote_attr(value: &str) -> String {
    let escaped = escape(value)
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;");
    if escaped.contains('"') {
        if escaped.contains('\'') {
            format!("\"{}\"", escaped.replace('"', "&quot;"))
        } else {
            format!("'{escaped}'")
        }
    } else {
        format!("\"{escaped}\"")
    }
}

/// Builds an opening tag with attributes sorted by name.
pub fn build_tag(name: &str, attrs: &[(&str, String)]) -> String {
    let mut sorted = attrs.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let mut out = format!("<{name}");
    for (key, value) in sorted {
        out.push(' ');
        out.push_str(key);
        out.push('=');
        out.push_str(&quote_attr(&value));
    }
    out.push('>');
    out
}

pub fn remove_accents(s: &str) -> String {
    s.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Permalink slug: ASCII, lower-case, hyphen separated.
pub fn slugify(s: &str) -> String {
    let ascii: String = remove_accents(s).chars().filter(char::is_ascii).collect();
    let cleaned = SLUG_DISALLOWED_RE.replace_all(&ascii, "").to_lowercase();
    SLUG_SEPARATOR_RE
        .replace_all(cleaned.trim(), "-")
        .trim_matches(|c| c == '-' || c == '_')
        .to_string()
}

/// Drops parentheticals and a leading honorific from a speaker label.
pub fn strip_person_name(name: &str) -> String {
    let tamed = tame_whitespace(name);
    let without_parens = PARENS_RE.replace_all(&tamed, "");
    HONORIFIC_RE
        .replace(&without_parens, "")
        .trim()
        .to_string()
}

/// Plain text of statement HTML: paragraphs become blank-line separated.
pub fn html_to_text(html: &str) -> String {
    let flattened = html
        .replace('\n', "")
        .replace("<br>", "\n")
        .replace("</p>", "\n\n")
        .replace("&amp;", "&");
    TAG_RE.replace_all(&flattened, "").trim().to_string()
}

pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tames_whitespace() {
        assert_eq!(tame_whitespace("  Mr.\n  John\u{a0} Smith "), "Mr. John Smith");
    }

    #[test]
    fn strips_person_names() {
        assert_eq!(strip_person_name("Hon. Jane Doe (Minister of Health)"), "Jane Doe");
        assert_eq!(strip_person_name("Mme Marie Dupont"), "Marie Dupont");
        assert_eq!(strip_person_name("The Speaker"), "The Speaker");
        assert_eq!(
            letters_only(&strip_person_name("Mr. O'Neil-Smith")),
            "oneilsmith"
        );
    }

    #[test]
    fn classifies_speaker_labels() {
        assert_eq!(classify_label("Mr. John Smith"), Some(LabelKind::Honorific));
        assert_eq!(classify_label("The Speaker:"), Some(LabelKind::Office));
        assert_eq!(classify_label("An hon. member"), Some(LabelKind::Generic));
        assert_eq!(classify_label("Des voix"), Some(LabelKind::Generic));
        assert_eq!(classify_label("John Smith"), None);
        assert_eq!(classify_label("Some hon. members"), Some(LabelKind::Generic));
        assert!(!HONORIFIC_RE.is_match("Some hon. members"));
    }

    #[test]
    fn detects_paragraph_cues() {
        assert_eq!(paragraph_cue("(Motion agreed to)"), Some(ParagraphCue::StageDirection));
        assert_eq!(paragraph_cue("[English]"), Some(ParagraphCue::StageDirection));
        assert_eq!(paragraph_cue("moved that the bill be read"), Some(ParagraphCue::Motion));
        assert_eq!(paragraph_cue("Thank you."), None);
        assert_eq!(
            MOTION_BOILERPLATE_RE.replace("  She said: Madam Speaker", ""),
            "Madam Speaker"
        );
    }

    #[test]
    fn smart_titles_single_case_headings() {
        assert_eq!(smart_title("ROUTINE PROCEEDINGS"), "Routine Proceedings");
        assert_eq!(smart_title("government orders"), "Government Orders");
        assert_eq!(smart_title("Oral Questions"), "Oral Questions");
    }

    #[test]
    fn builds_sorted_escaped_tags() {
        let tag = build_tag(
            "a",
            &[
                ("href", "http://x/?a=1&b=2".to_string()),
                ("data-HoCid", "42".to_string()),
                ("class", "related_link politician".to_string()),
            ],
        );
        assert_eq!(
            tag,
            r#"<a class="related_link politician" data-HoCid="42" href="http://x/?a=1&amp;b=2">"#
        );
        assert_eq!(quote_attr(r#"say "hi""#), r#"'say "hi"'"#);
    }

    #[test]
    fn slugifies_display_names() {
        assert_eq!(slugify("Hélène Laverdière"), "helene-laverdiere");
        assert_eq!(slugify("  An hon. member "), "an-hon-member");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn converts_html_to_text() {
        let html = "<p data-HoCid=\"1\">Fish &amp; chips</p>\n<p>Second<br>line</p>";
        assert_eq!(html_to_text(html), "Fish & chips\n\nSecond\nline");
    }
}
