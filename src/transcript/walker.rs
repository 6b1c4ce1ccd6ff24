use crate::dom::{NodeId, XmlTree};
use crate::error::AlpheusError;
use crate::text::{
    build_tag, classify_label, escape, letters_only, paragraph_cue, smart_title, tame_whitespace,
    LabelKind, ParagraphCue, MOTION_BOILERPLATE_RE,
};
use crate::transcript::metadata::{house_met_time, time_to_datetime};
use crate::transcript::speaker::{continues_statement, MainSpeaker, SpeakerResolver};
use crate::transcript::statement::{CurrentAttributes, DraftStatement, OneTimeAttributes};
use crate::transcript::tags::{is_excluded, is_ignored, passthrough, Flow, Phase, TagKind};
use crate::types::{DocumentMeta, Language, WrittenQuestion};
use regex::Regex;
use std::sync::LazyLock;

static HOUSE_MET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?P<text>The\s+House\s+met\s+at|La\s+séance\s+est\s+ouverte\s+à)\s+(?P<number>\d[\d:\.]*)\s*(?P<ampm>[ap]\.m\.|)",
    )
    .unwrap()
});

const PROFILE_URL: &str = "http://www.parl.gc.ca/MembersOfParliament/ProfileMP.aspx";
const BILL_URL: &str = "http://www.parl.gc.ca/LegisInfo/BillDetails.aspx";
const VOTE_URL: &str = "http://www.parl.gc.ca/HouseChamberBusiness/ChamberVoteDetail.aspx";

/// Walks a transcript body depth-first, turning tags into statements.
///
/// All parse state lives here: the attributes in force, the attributes
/// waiting for the next statement, the open statement, and what has been
/// learned about speakers so far.
pub struct Walker<'a> {
    tree: XmlTree,
    meta: &'a DocumentMeta,
    statements: Vec<DraftStatement>,
    current: Option<DraftStatement>,
    attrs: CurrentAttributes,
    pending: OneTimeAttributes,
    in_para: bool,
    /// Parent of the paragraph holding a quick interjection; the next
    /// unlabelled paragraph under it goes back to the main speaker.
    one_liner: Option<NodeId>,
    main_speaker: MainSpeaker,
    speakers: SpeakerResolver,
}

impl<'a> Walker<'a> {
    pub fn new(tree: XmlTree, meta: &'a DocumentMeta) -> Self {
        Self {
            tree,
            meta,
            statements: Vec::new(),
            current: None,
            attrs: CurrentAttributes {
                language: Some(meta.language),
                ..CurrentAttributes::default()
            },
            pending: OneTimeAttributes::default(),
            in_para: false,
            one_liner: None,
            main_speaker: MainSpeaker::default(),
            speakers: SpeakerResolver::default(),
        }
    }

    /// Walks from `start` and returns every statement found, in order.
    pub fn run(mut self, start: NodeId) -> Result<Vec<DraftStatement>, AlpheusError> {
        self.explore(start)?;
        if self
            .current
            .as_ref()
            .is_some_and(|s| !s.content.trim().is_empty())
        {
            self.close_statement()?;
        }
        Ok(self.statements)
    }

    fn explore(&mut self, id: NodeId) -> Result<(), AlpheusError> {
        let kind = TagKind::classify(self.tree.tag(id));
        if self.handle(kind, id, Phase::Open)? == Flow::Descend {
            let children = self.tree.children(id).to_vec();
            for child in children {
                self.explore(child)?;
            }
            self.handle(kind, id, Phase::Close)?;
        }
        Ok(())
    }

    fn handle(&mut self, kind: TagKind, id: NodeId, phase: Phase) -> Result<Flow, AlpheusError> {
        match kind {
            TagKind::Paragraph => self.paragraph(id, phase, false),
            TagKind::ProceduralText => self.procedural_text(id, phase),
            TagKind::ThroneSpeech => self.throne_speech(phase),
            TagKind::Bold => self.bold(id, phase),
            TagKind::Verse => self.verse(id, phase),
            TagKind::Line => self.line(id, phase),
            TagKind::PersonSpeaking => self.person_speaking(id, phase),
            TagKind::Intervention => self.intervention(id, phase),
            TagKind::FloorLanguage => self.floor_language(id, phase),
            TagKind::Timestamp => self.timestamp(id, phase),
            TagKind::SubjectOfBusinessQualifier => {
                self.attrs.h3 = Some(self.tree.text_content(id));
                Ok(Flow::NoDescend)
            }
            TagKind::SubjectOfBusinessTitle => {
                self.attrs.h2 = Some(self.tree.text_content(id));
                Ok(Flow::NoDescend)
            }
            TagKind::SubjectOfBusiness => {
                if phase == Phase::Close {
                    self.attrs.h3 = None;
                }
                Ok(Flow::Descend)
            }
            TagKind::OrderOfBusiness => {
                if phase == Phase::Close {
                    self.attrs.h1 = None;
                    self.attrs.h2 = None;
                }
                Ok(Flow::Descend)
            }
            TagKind::OrderOfBusinessTitle => {
                self.attrs.h1 = Some(smart_title(&self.tree.text_content(id)));
                Ok(Flow::NoDescend)
            }
            TagKind::WrittenQuestionResponse => self.written_question_response(id, phase),
            TagKind::QuestionContent => self.written_content(phase, WrittenQuestion::Question),
            TagKind::ResponseContent => self.written_content(phase, WrittenQuestion::Response),
            TagKind::Affiliation => self.affiliation(id, phase),
            TagKind::Document => self.legislation(id, phase),
            TagKind::Division => self.division(id),
            TagKind::Default => self.default_handler(id, phase),
        }
    }

    // ---- statement assembly ----

    fn add_code(&mut self, code: &str) {
        if code.is_empty() {
            return;
        }
        if self.current.is_none() {
            let pending = std::mem::take(&mut self.pending);
            self.current = Some(DraftStatement::open(&self.attrs, pending));
        }
        if let Some(statement) = self.current.as_mut() {
            statement.content.push_str(code);
        }
    }

    fn add_text(&mut self, text: &str) {
        if !text.is_empty() {
            self.add_code(&escape(text));
        }
    }

    /// Text on open, tail on close.
    fn add_tag_text(&mut self, id: NodeId, phase: Phase) {
        let element = self.tree.get(id);
        let text = match phase {
            Phase::Open if element.skip_text => return,
            Phase::Open => element.text_str().to_string(),
            Phase::Close => element.tail_str().to_string(),
        };
        self.add_text(&text);
    }

    fn close_statement(&mut self) -> Result<(), AlpheusError> {
        if let Some(mut statement) = self.current.take() {
            statement.finish()?;
            self.statements.push(statement);
        }
        Ok(())
    }

    fn is_person(&self) -> bool {
        match &self.current {
            Some(statement) => statement.has_speaker(),
            None => self.pending.has_speaker(),
        }
    }

    /// Someone has started speaking. Continuing speakers keep the open
    /// statement; anyone else closes it.
    fn new_person(
        &mut self,
        hoc_id: Option<&str>,
        description: &str,
        affiliation_code: Option<&str>,
    ) -> Result<(), AlpheusError> {
        let description = tame_whitespace(description);
        if let Some(current) = &self.current {
            if continues_statement(current, hoc_id, &description) {
                return Ok(());
            }
            self.close_statement()?;
        }
        self.speakers
            .introduce(hoc_id, &description, affiliation_code, &mut self.pending);
        Ok(())
    }

    fn language_letter(&self) -> &'static str {
        self.meta.language.letter()
    }

    // ---- handlers ----

    fn paragraph(&mut self, id: NodeId, phase: Phase, procedural: bool) -> Result<Flow, AlpheusError> {
        if phase == Phase::Close {
            if !self.in_para {
                return Err(AlpheusError::Structure(format!(
                    "closing <{}> outside a paragraph",
                    self.tree.tag(id)
                )));
            }
            self.in_para = false;
            self.add_code("</p>");
            if self.tree.has_descendant(id, "QuotePara") {
                self.add_code("</blockquote>");
            }
            if !self.tree.get(id).tail_str().trim().is_empty() {
                return Err(AlpheusError::Structure(format!(
                    "text after <{}>: {:?}",
                    self.tree.tag(id),
                    self.tree.get(id).tail_str().trim()
                )));
            }
            return Ok(Flow::Descend);
        }

        let mut procedural = procedural;
        let raw_text = self.tree.get(id).text.clone();
        let my_text = raw_text.as_deref().unwrap_or("").trim().to_string();
        let parent = self.tree.parent(id);

        if let Some(raw) = raw_text.as_deref() {
            if parent.is_some_and(|p| self.tree.tag(p) == "Intro") && HOUSE_MET_RE.is_match(&my_text) {
                self.house_met(raw);
                return Ok(Flow::NoDescend);
            }
        }

        if let Some(first) = self.inferred_speaker(id, &my_text) {
            self.attribute_inferred_speaker(id, first)?;
        } else if let Some(one_liner_parent) = self.one_liner.take() {
            if Some(one_liner_parent) == parent {
                let main = self.main_speaker.clone();
                self.new_person(main.id.as_deref(), &main.name, None)?;
            }
        }

        self.in_para = true;

        if !self.is_person() {
            procedural = true;
        }

        match paragraph_cue(&my_text) {
            Some(ParagraphCue::Motion) => {
                procedural = true;
                self.strip_motion_boilerplate(id);
            }
            Some(ParagraphCue::StageDirection) => procedural = true,
            None => {}
        }

        let mut p_attrs: Vec<(&str, String)> = vec![(
            "data-HoCid",
            self.tree.attr(id, "id").unwrap_or("0").to_string(),
        )];
        if procedural {
            p_attrs.push(("class", "procedural".to_string()));
        } else {
            match self.current.as_mut() {
                Some(statement) => statement.has_non_procedural = true,
                None => self.pending.has_non_procedural = true,
            }
            if let Some(language) = self.attrs.language {
                p_attrs.push(("data-originallang", language.as_str().to_string()));
            }
        }

        if self.tree.has_descendant(id, "QuotePara") {
            self.add_code("<blockquote>");
        }
        self.add_code(&build_tag("p", &p_attrs));
        self.add_tag_text(id, phase);
        Ok(Flow::Descend)
    }

    fn house_met(&mut self, raw: &str) {
        let Some(caps) = HOUSE_MET_RE.captures(raw) else {
            return;
        };
        match house_met_time(&caps["number"], &caps["ampm"]) {
            Some(time) => self.attrs.timestamp = Some(self.meta.date.and_time(time)),
            None => tracing::warn!(
                "[Alpheus] Could not read sitting start time from {:?}",
                raw.trim()
            ),
        }
    }

    /// A paragraph that opens with a bold name is usually someone else
    /// speaking. Returns that first child when it looks like a label.
    fn inferred_speaker(&self, id: NodeId, my_text: &str) -> Option<NodeId> {
        if !my_text.is_empty() {
            return None;
        }
        let first = *self.tree.children(id).first()?;
        let tag = self.tree.tag(first);
        if tag != "B" && tag != "Affiliation" {
            return None;
        }
        let label = self.tree.get(first).text_str().trim();
        if !label.chars().next().is_some_and(char::is_uppercase) {
            return None;
        }
        let following = self.tree.following_char(first)?;
        let looks_like_label = label.ends_with(':')
            || following == ':'
            || self
                .tree
                .attr(id, "Interjection")
                .is_some_and(|v| !v.is_empty())
            || (classify_label(label).is_some() && following.is_uppercase());
        looks_like_label.then_some(first)
    }

    fn attribute_inferred_speaker(&mut self, id: NodeId, label_id: NodeId) -> Result<(), AlpheusError> {
        let hoc_id = if self.tree.tag(label_id) == "Affiliation" {
            self.tree.attr(label_id, "DbId").map(str::to_string)
        } else {
            None
        };
        let raw_label = self.tree.get(label_id).text_str().to_string();
        let attribution = tame_whitespace(&raw_label.replace(':', ""));

        let returning_to_main = hoc_id == self.main_speaker.id
            || letters_only(&self.main_speaker.name).starts_with(&letters_only(&attribution))
            || classify_label(&attribution) == Some(LabelKind::Honorific);
        self.one_liner = if returning_to_main {
            None
        } else {
            // Generic interjections ("Des voix") hand the floor back afterwards.
            self.tree.parent(id)
        };

        self.new_person(hoc_id.as_deref(), raw_label.replace(':', "").trim(), None)?;

        let label = self.tree.get_mut(label_id);
        if !raw_label.ends_with(':') {
            if let Some(rest) = label.tail.as_deref().and_then(|t| t.strip_prefix(':')) {
                label.tail = Some(rest.to_string());
            }
        }
        label.skip_text = true;
        Ok(())
    }

    /// After "X moved that …" the next plain paragraph opens with a
    /// redundant "He said:".
    fn strip_motion_boilerplate(&mut self, id: NodeId) {
        let mut next = self.tree.next_sibling(id);
        while let Some(candidate) = next {
            if self.tree.tag(candidate) == "ParaText" && !self.tree.has_descendant(candidate, "QuotePara") {
                break;
            }
            next = self.tree.next_sibling(candidate);
        }
        if let Some(target) = next {
            let element = self.tree.get_mut(target);
            if let Some(text) = element.text.as_deref().filter(|t| !t.is_empty()) {
                element.text = Some(MOTION_BOILERPLATE_RE.replace(text, "").into_owned());
            }
        }
    }

    fn procedural_text(&mut self, id: NodeId, phase: Phase) -> Result<Flow, AlpheusError> {
        if !self.tree.get(id).tail_str().trim().is_empty() {
            return Err(AlpheusError::Structure(
                "text after <ProceduralText>".to_string(),
            ));
        }
        if self.tree.attr(id, "TocType") == Some("TPC") {
            // Table-of-contents headings.
            return Ok(if phase == Phase::Open {
                Flow::NoDescend
            } else {
                Flow::Descend
            });
        }
        self.paragraph(id, phase, true)
    }

    fn throne_speech(&mut self, phase: Phase) -> Result<Flow, AlpheusError> {
        if phase == Phase::Open {
            let speaker = match self.meta.language {
                Language::En => "The Governor General",
                Language::Fr => "Le gouverneur général",
            };
            self.new_person(None, speaker, None)?;
        }
        Ok(Flow::Descend)
    }

    fn bold(&mut self, id: NodeId, phase: Phase) -> Result<Flow, AlpheusError> {
        if !self.tree.get(id).skip_text {
            self.add_code(match phase {
                Phase::Open => "<strong>",
                Phase::Close => "</strong>",
            });
        }
        self.add_tag_text(id, phase);
        Ok(Flow::Descend)
    }

    fn verse(&mut self, id: NodeId, phase: Phase) -> Result<Flow, AlpheusError> {
        self.add_code(match phase {
            Phase::Open => r#"<span class="verse">"#,
            Phase::Close => "</span>",
        });
        self.add_tag_text(id, phase);
        Ok(Flow::Descend)
    }

    fn line(&mut self, id: NodeId, phase: Phase) -> Result<Flow, AlpheusError> {
        if phase == Phase::Close {
            self.add_code("<br>");
        }
        self.add_tag_text(id, phase);
        Ok(Flow::Descend)
    }

    fn person_speaking(&mut self, id: NodeId, phase: Phase) -> Result<Flow, AlpheusError> {
        if phase == Phase::Close {
            return Ok(Flow::Descend);
        }
        let Some(affiliation) = self.tree.child_by_tag(id, "Affiliation") else {
            tracing::warn!("[Alpheus] No affiliation in <{}>", self.tree.tag(id));
            return Ok(Flow::NoDescend);
        };
        let element = self.tree.get(affiliation);
        let name = element.text_str().to_string();
        if name.is_empty() {
            tracing::warn!("[Alpheus] Empty affiliation in <{}>", self.tree.tag(id));
            return Ok(Flow::NoDescend);
        }
        let db_id = element.attr("DbId").map(str::to_string);
        let code = element.attr("Type").map(str::to_string);
        let tail = element.tail_str().replace(':', "").trim().to_string();

        self.new_person(db_id.as_deref(), &name, code.as_deref())?;
        self.main_speaker = MainSpeaker { id: db_id, name };

        if !tail.is_empty() && !tail.starts_with('(') {
            tracing::warn!("[Alpheus] Looks like there's content in PersonSpeaking: {}", tail);
            self.add_text(&tail);
        }
        Ok(Flow::NoDescend)
    }

    fn intervention(&mut self, id: NodeId, phase: Phase) -> Result<Flow, AlpheusError> {
        match phase {
            Phase::Open => {
                self.pending.intervention_type = self.tree.attr(id, "Type").map(str::to_string);
                self.pending.id = self.tree.attr(id, "id").map(str::to_string);
            }
            Phase::Close => self.close_statement()?,
        }
        Ok(Flow::Descend)
    }

    fn floor_language(&mut self, id: NodeId, phase: Phase) -> Result<Flow, AlpheusError> {
        if phase == Phase::Open {
            self.attrs.language = self.tree.attr(id, "language").and_then(Language::from_code);
        }
        Ok(Flow::NoDescend)
    }

    fn timestamp(&mut self, id: NodeId, phase: Phase) -> Result<Flow, AlpheusError> {
        if phase == Phase::Close {
            return Ok(Flow::Descend);
        }
        let Some(raw_hour) = self.tree.attr(id, "Hr").filter(|h| !h.is_empty()) else {
            return Ok(Flow::NoDescend);
        };
        let invalid = |attr: &'static str, value: &str| AlpheusError::InvalidAttribute {
            tag: "Timestamp".to_string(),
            attr,
            value: value.to_string(),
        };
        let hour: u32 = raw_hour
            .replace(' ', "")
            .parse()
            .map_err(|_| invalid("Hr", raw_hour))?;
        let raw_minute = self.tree.attr(id, "Mn").unwrap_or("0");
        let minute: u32 = raw_minute.trim().parse().map_err(|_| invalid("Mn", raw_minute))?;
        let timestamp =
            time_to_datetime(hour, minute, self.meta.date).ok_or_else(|| invalid("Mn", raw_minute))?;

        self.attrs.timestamp = Some(timestamp);
        if let Some(statement) = self.current.as_mut() {
            // Only procedural text so far: the clock applies to this statement too.
            if !statement.has_non_procedural {
                statement.timestamp = Some(timestamp);
            }
        }
        Ok(Flow::NoDescend)
    }

    fn written_question_response(&mut self, id: NodeId, phase: Phase) -> Result<Flow, AlpheusError> {
        match phase {
            Phase::Open => {
                if let Some(question_id) = self.tree.child_by_tag(id, "QuestionID") {
                    let heading = self.tree.text_content(question_id).replace("--", "");
                    self.attrs.h3 = Some(heading.trim().to_string());
                }
            }
            Phase::Close => {
                if self
                    .attrs
                    .h3
                    .as_deref()
                    .is_some_and(|h3| h3.to_lowercase().starts_with("question"))
                {
                    self.attrs.h3 = None;
                }
            }
        }
        Ok(Flow::Descend)
    }

    fn written_content(&mut self, phase: Phase, marker: WrittenQuestion) -> Result<Flow, AlpheusError> {
        match phase {
            Phase::Open => self.pending.written_question = Some(marker),
            Phase::Close => self.close_statement()?,
        }
        Ok(Flow::Descend)
    }

    fn affiliation(&mut self, id: NodeId, phase: Phase) -> Result<Flow, AlpheusError> {
        let element = self.tree.get(id);
        let db_id = element
            .attr("DbId")
            .filter(|v| !v.is_empty() && !element.skip_text)
            .map(str::to_string);
        if let Some(db_id) = db_id {
            let code = match phase {
                Phase::Open => build_tag(
                    "a",
                    &[
                        (
                            "href",
                            format!(
                                "{PROFILE_URL}?Key={db_id}&Language={}",
                                self.language_letter()
                            ),
                        ),
                        ("data-HoCid", db_id.clone()),
                        ("class", "related_link politician".to_string()),
                    ],
                ),
                Phase::Close => "</a>".to_string(),
            };
            self.add_code(&code);
        }
        self.add_tag_text(id, phase);
        Ok(Flow::Descend)
    }

    fn legislation(&mut self, id: NodeId, phase: Phase) -> Result<Flow, AlpheusError> {
        let db_id = self
            .tree
            .attr(id, "DbId")
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        if let Some(db_id) = db_id {
            let code = match phase {
                Phase::Open => build_tag(
                    "a",
                    &[
                        (
                            "href",
                            format!(
                                "{BILL_URL}?&Mode=1&billId={db_id}&Language={}",
                                self.language_letter()
                            ),
                        ),
                        ("data-HoCid", db_id.clone()),
                        ("class", "related_link legislation".to_string()),
                    ],
                ),
                Phase::Close => "</a>".to_string(),
            };
            self.add_code(&code);
        }
        self.add_tag_text(id, phase);
        Ok(Flow::Descend)
    }

    fn division(&mut self, id: NodeId) -> Result<Flow, AlpheusError> {
        let number = self.tree.attr(id, "DivisionNumber").unwrap_or("");
        let url = format!(
            "{VOTE_URL}?Language={}&Mode=1&Parl={}&Ses={}&Vote={number}",
            self.language_letter(),
            self.meta.parliament,
            self.meta.session
        );
        let mut link_attrs: Vec<(&str, String)> = vec![
            ("class", "related_link vote".to_string()),
            ("href", url),
            ("data-number", number.to_string()),
        ];
        if let Some(vote_id) = self.tree.attr(id, "id") {
            link_attrs.push(("data-HoCid", vote_id.to_string()));
        }
        let code = format!(
            "{}{}Vote #{number}</a></p>",
            build_tag("p", &[("class", "division procedural".to_string())]),
            build_tag("a", &link_attrs),
        );
        self.add_code(&code);
        Ok(Flow::NoDescend)
    }

    fn default_handler(&mut self, id: NodeId, phase: Phase) -> Result<Flow, AlpheusError> {
        let tag = self.tree.tag(id).to_string();
        if is_excluded(&tag) {
            return Ok(Flow::NoDescend);
        }
        if let Some(html) = passthrough(&tag) {
            let code = match phase {
                Phase::Open => format!("<{html}>"),
                Phase::Close => format!("</{html}>"),
            };
            self.add_code(&code);
        }
        if self.in_para {
            self.add_tag_text(id, phase);
        }
        if phase == Phase::Open && !is_ignored(&tag) {
            return Err(AlpheusError::UnknownTag(tag));
        }
        Ok(Flow::Descend)
    }
}
