mod common;

use chrono::{NaiveDate, NaiveDateTime};
use common::{debate_with_body, load_fixture};
use hansard_ingest::error::AlpheusError;
use hansard_ingest::transcript::{parse_bytes, parse_str};
use hansard_ingest::types::{DocumentType, Language, PersonType, WrittenQuestion};

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2012, 6, 11)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .expect("valid time")
}

#[test]
fn reads_debate_metadata() {
    let doc = parse_str(&load_fixture("hansard/debates_en.xml")).expect("debate should parse");
    assert_eq!(doc.meta.document_type, DocumentType::Debates);
    assert_eq!(doc.meta.date, NaiveDate::from_ymd_opt(2012, 6, 11).expect("date"));
    assert_eq!(doc.meta.parliament, 41);
    assert_eq!(doc.meta.session, 1);
    assert_eq!(doc.meta.language, Language::En);
    assert_eq!(doc.meta.document_number, "142");
    assert!(doc.meta.committee.is_none());
}

#[test]
fn splits_debate_into_statements() {
    let doc = parse_str(&load_fixture("hansard/debates_en.xml")).expect("debate should parse");
    let ids: Vec<&str> = doc
        .statements
        .iter()
        .map(|s| s.id.as_deref().unwrap_or(""))
        .collect();
    assert_eq!(ids, vec!["INT1", "INT2", "p1004", "p1005", "p1006"]);

    let who: Vec<Option<&str>> = doc
        .statements
        .iter()
        .map(|s| s.person_attribution.as_deref())
        .collect();
    assert_eq!(
        who,
        vec![
            Some("Hon. Jane Doe (Minister of Health, CPC)"),
            Some("Mr. John Smith (Ottawa Centre, NDP)"),
            Some("Some hon. members"),
            Some("Mr. John Smith (Ottawa Centre, NDP)"),
            None,
        ]
    );
    assert!(doc.statements.iter().all(|s| !s.content.trim().is_empty()));
}

#[test]
fn carries_headings_and_timestamps() {
    let doc = parse_str(&load_fixture("hansard/debates_en.xml")).expect("debate should parse");
    let first = &doc.statements[0];
    assert_eq!(first.h1.as_deref(), Some("Government Orders"));
    assert_eq!(
        first.h2.as_deref(),
        Some("Jobs, Growth and Long-term Prosperity Act")
    );
    assert_eq!(first.h3, None);
    assert_eq!(first.timestamp, Some(at(11, 5)));
    assert_eq!(first.intervention_type.as_deref(), Some("Debate"));
    assert_eq!(first.person_id.as_deref(), Some("170"));
    assert_eq!(
        first.person_context.as_deref(),
        Some("Minister of Health, CPC")
    );
    assert!(doc.statements.iter().all(|s| s.timestamp == Some(at(11, 5))));
}

#[test]
fn renders_paragraph_markup() {
    let doc = parse_str(&load_fixture("hansard/debates_en.xml")).expect("debate should parse");
    assert_eq!(
        doc.statements[0].content,
        concat!(
            r#"<p data-HoCid="1001" data-originallang="en">Mr. Speaker, I rise to speak to "#,
            r#"<a class="related_link legislation" data-HoCid="5000" href="http://www.parl.gc.ca/LegisInfo/BillDetails.aspx?&amp;Mode=1&amp;billId=5000&amp;Language=E">Bill C-38</a> today.</p>"#,
            r#"<p data-HoCid="1002" data-originallang="en">It is a good bill for <em>all</em> Canadians.</p>"#,
        )
    );
    assert_eq!(doc.statements[0].paragraph_ids(), vec![1001, 1002]);
    assert!(doc.statements[1].content.contains(
        r#"<a class="related_link politician" data-HoCid="170" href="http://www.parl.gc.ca/MembersOfParliament/ProfileMP.aspx?Key=170&amp;Language=E">minister</a>"#
    ));
}

#[test]
fn interjection_returns_floor_to_main_speaker() {
    let doc = parse_str(&load_fixture("hansard/debates_en.xml")).expect("debate should parse");
    assert_eq!(
        doc.statements[2].content,
        r#"<p data-HoCid="1004" data-originallang="en"> Oh, oh!</p>"#
    );
    assert_eq!(doc.statements[2].person_id, None);
    assert_eq!(doc.statements[3].person_id.as_deref(), Some("200"));
    assert_eq!(doc.statements[3].paragraph_ids(), vec![1005]);
}

#[test]
fn stage_directions_and_divisions_are_procedural() {
    let doc = parse_str(&load_fixture("hansard/debates_en.xml")).expect("debate should parse");
    let last = doc.statements.last().expect("statements");
    assert_eq!(
        last.content,
        concat!(
            r#"<p class="procedural" data-HoCid="1006">(Motion agreed to)</p>"#,
            r#"<p class="division procedural"><a class="related_link vote" data-HoCid="77" data-number="12" href="http://www.parl.gc.ca/HouseChamberBusiness/ChamberVoteDetail.aspx?Language=E&amp;Mode=1&amp;Parl=41&amp;Ses=1&amp;Vote=12">Vote #12</a></p>"#,
        )
    );
    assert!(!last.has_non_procedural);
    assert!(doc.statements[0].has_non_procedural);
}

#[test]
fn parsing_is_deterministic() {
    let xml = load_fixture("hansard/debates_en.xml");
    let first = parse_str(&xml).expect("debate should parse");
    let second = parse_bytes(xml.as_bytes()).expect("debate should parse");
    assert_eq!(first, second);
}

#[test]
fn french_debate_converts_latin1_entities() {
    let doc = parse_str(&load_fixture("hansard/debates_fr.xml")).expect("debate should parse");
    assert_eq!(doc.meta.language, Language::Fr);
    assert_eq!(doc.statements.len(), 5);
    assert_eq!(
        doc.statements[0].person_attribution.as_deref(),
        Some("L'hon. Jane Doe (ministre de la Santé, PCC)")
    );
    assert_eq!(doc.statements[2].person_attribution.as_deref(), Some("Des voix"));
    assert_eq!(doc.statements[4].id.as_deref(), Some("p1006"));
}

#[test]
fn committee_speakers_are_completed_from_earlier_mentions() {
    let doc = parse_str(&load_fixture("hansard/committee_en.xml")).expect("committee should parse");
    assert_eq!(doc.meta.document_type, DocumentType::Committee);
    assert_eq!(doc.meta.document_number, "38");
    let committee = doc.meta.committee.as_ref().expect("committee metadata");
    assert_eq!(committee.acronym, "FINA");
    assert_eq!(committee.name_en, "Standing Committee on Finance");

    assert_eq!(doc.statements.len(), 3);
    let chair = &doc.statements[0];
    assert_eq!(chair.person_type, None);
    assert_eq!(chair.person_context.as_deref(), Some("Mr. James Rajotte"));

    let witness = &doc.statements[1];
    assert_eq!(witness.person_type, Some(PersonType::Witness));
    assert_eq!(witness.person_id.as_deref(), Some("900"));

    let again = &doc.statements[2];
    assert_eq!(again.person_attribution.as_deref(), Some("Ms. Jane Roe"));
    assert_eq!(again.person_id.as_deref(), Some("900"));
    assert_eq!(again.person_type, Some(PersonType::Witness));
    assert_eq!(
        again.person_context.as_deref(),
        Some("Director, Statistics Canada")
    );
    assert_eq!(again.language, Some(Language::Fr));
    assert!(again.content.contains(r#"data-originallang="fr""#));
}

#[test]
fn same_speaker_statements_coalesce() {
    let xml = debate_with_body(
        r#"<PersonSpeaking><Affiliation DbId="170">Hon. Jane Doe</Affiliation>:</PersonSpeaking>
<ParaText id="1">First point.</ParaText>
<PersonSpeaking><Affiliation DbId="170">Hon. Jane Doe (Minister of Health)</Affiliation>:</PersonSpeaking>
<ParaText id="2">Second point.</ParaText>"#,
    );
    let doc = parse_str(&xml).expect("should parse");
    assert_eq!(doc.statements.len(), 1);
    assert_eq!(doc.statements[0].paragraph_ids(), vec![1, 2]);
    assert_eq!(
        doc.statements[0].person_attribution.as_deref(),
        Some("Hon. Jane Doe")
    );
}

#[test]
fn indeterminate_speakers_never_coalesce() {
    let xml = debate_with_body(
        r#"<ParaText id="1"><B>An hon. member:</B> Shame!</ParaText>
<ParaText id="2"><B>An hon. member:</B> Hear, hear!</ParaText>"#,
    );
    let doc = parse_str(&xml).expect("should parse");
    assert_eq!(doc.statements.len(), 2);
    assert!(doc
        .statements
        .iter()
        .all(|s| s.person_attribution.as_deref() == Some("An hon. member")));
}

#[test]
fn headings_are_scoped_to_their_sections() {
    let xml = debate_with_body(
        r#"<OrderOfBusiness>
<OrderOfBusinessTitle>ROUTINE PROCEEDINGS</OrderOfBusinessTitle>
<SubjectOfBusiness>
<SubjectOfBusinessTitle>Petitions</SubjectOfBusinessTitle>
<SubjectOfBusinessQualifier>Health Care</SubjectOfBusinessQualifier>
<SubjectOfBusinessContent>
<Intervention id="A"><PersonSpeaking><Affiliation DbId="170">Hon. Jane Doe</Affiliation>:</PersonSpeaking><Content><ParaText id="1">I present a petition.</ParaText></Content></Intervention>
</SubjectOfBusinessContent>
</SubjectOfBusiness>
<SubjectOfBusiness>
<SubjectOfBusinessTitle>Questions on the Order Paper</SubjectOfBusinessTitle>
<SubjectOfBusinessContent>
<Intervention id="B"><PersonSpeaking><Affiliation DbId="200">Mr. John Smith</Affiliation>:</PersonSpeaking><Content><ParaText id="2">I ask that all questions stand.</ParaText></Content></Intervention>
</SubjectOfBusinessContent>
</SubjectOfBusiness>
</OrderOfBusiness>
<Intervention id="C"><PersonSpeaking><Affiliation DbId="170">Hon. Jane Doe</Affiliation>:</PersonSpeaking><Content><ParaText id="3">Thank you.</ParaText></Content></Intervention>"#,
    );
    let doc = parse_str(&xml).expect("should parse");
    let headings: Vec<(Option<&str>, Option<&str>, Option<&str>)> = doc
        .statements
        .iter()
        .map(|s| (s.h1.as_deref(), s.h2.as_deref(), s.h3.as_deref()))
        .collect();
    assert_eq!(
        headings,
        vec![
            (Some("Routine Proceedings"), Some("Petitions"), Some("Health Care")),
            (
                Some("Routine Proceedings"),
                Some("Questions on the Order Paper"),
                None
            ),
            (None, None, None),
        ]
    );
}

#[test]
fn house_met_sets_opening_time() {
    let xml = debate_with_body(
        r#"<Intro><ParaText>The House met at 2 p.m.</ParaText></Intro>
<PersonSpeaking><Affiliation DbId="170">Hon. Jane Doe</Affiliation>:</PersonSpeaking>
<ParaText id="1">Good afternoon.</ParaText>"#,
    );
    let doc = parse_str(&xml).expect("should parse");
    assert_eq!(doc.statements.len(), 1);
    assert_eq!(doc.statements[0].timestamp, Some(at(14, 0)));
}

#[test]
fn motion_drops_stock_phrase_from_next_paragraph() {
    let xml = debate_with_body(
        r#"<PersonSpeaking><Affiliation DbId="170">Hon. Jane Doe</Affiliation>:</PersonSpeaking>
<ParaText id="1">moved that Bill C-38 be now read a second time.</ParaText>
<ParaText id="2">She said: Mr. Speaker, this bill matters.</ParaText>"#,
    );
    let doc = parse_str(&xml).expect("should parse");
    assert_eq!(
        doc.statements[0].content,
        concat!(
            r#"<p class="procedural" data-HoCid="1">moved that Bill C-38 be now read a second time.</p>"#,
            r#"<p data-HoCid="2" data-originallang="en">Mr. Speaker, this bill matters.</p>"#,
        )
    );
}

#[test]
fn written_questions_are_marked() {
    let xml = debate_with_body(
        r#"<WrittenQuestionResponse>
<QuestionID>Question No. 512--</QuestionID>
<Questioner><Affiliation DbId="200">Mr. John Smith</Affiliation>:</Questioner>
<QuestionContent><ParaText id="10">With regard to government advertising, how much was spent?</ParaText></QuestionContent>
<Responder><Affiliation DbId="170">Hon. Jane Doe</Affiliation>:</Responder>
<ResponseContent><ParaText id="11">Nothing was spent.</ParaText></ResponseContent>
</WrittenQuestionResponse>
<PersonSpeaking><Affiliation DbId="200">Mr. John Smith</Affiliation>:</PersonSpeaking>
<ParaText id="12">Thank you.</ParaText>"#,
    );
    let doc = parse_str(&xml).expect("should parse");
    assert_eq!(doc.statements.len(), 3);
    assert_eq!(doc.statements[0].written_question, Some(WrittenQuestion::Question));
    assert_eq!(doc.statements[0].h3.as_deref(), Some("Question No. 512"));
    assert_eq!(doc.statements[1].written_question, Some(WrittenQuestion::Response));
    assert_eq!(doc.statements[1].person_id.as_deref(), Some("170"));
    assert_eq!(doc.statements[2].written_question, None);
    assert_eq!(doc.statements[2].h3, None);
}

#[test]
fn unknown_tag_is_fatal() {
    let xml = debate_with_body("<Mystery>What is this?</Mystery>");
    match parse_str(&xml) {
        Err(AlpheusError::UnknownTag(tag)) => assert_eq!(tag, "Mystery"),
        other => panic!("expected UnknownTag, got {other:?}"),
    }
}

#[test]
fn text_after_paragraph_is_fatal() {
    let xml = debate_with_body(
        r#"<PersonSpeaking><Affiliation DbId="170">Hon. Jane Doe</Affiliation>:</PersonSpeaking>
<Content><ParaText id="1">Hello.</ParaText>stray words</Content>"#,
    );
    assert!(matches!(parse_str(&xml), Err(AlpheusError::Structure(_))));
}

#[test]
fn unreadable_timestamp_is_fatal() {
    let xml = debate_with_body(r#"<Timestamp Hr="xx" Mn="00" />"#);
    match parse_str(&xml) {
        Err(AlpheusError::InvalidAttribute { attr, value, .. }) => {
            assert_eq!(attr, "Hr");
            assert_eq!(value, "xx");
        }
        other => panic!("expected InvalidAttribute, got {other:?}"),
    }
}

#[test]
fn metadata_problems_are_reported() {
    let xml = debate_with_body("").replace(
        r#"<ExtractedItem Name="Number">No. 142</ExtractedItem>"#,
        "",
    );
    assert!(matches!(
        parse_str(&xml),
        Err(AlpheusError::MissingMetadata("Number"))
    ));

    let xml = debate_with_body("").replace(r#"xml:lang="en""#, r#"xml:lang="de""#);
    assert!(matches!(
        parse_str(&xml),
        Err(AlpheusError::InvalidMetadata { field: "xml:lang", .. })
    ));

    assert!(matches!(
        parse_str(r#"<Debates xml:lang="en"></Debates>"#),
        Err(AlpheusError::MissingElement("Hansard"))
    ));

    let xml = debate_with_body("")
        .replace("<HansardBody>", "")
        .replace("</HansardBody>", "");
    assert!(matches!(
        parse_str(&xml),
        Err(AlpheusError::MissingElement("HansardBody"))
    ));
}

#[test]
fn malformed_xml_is_reported() {
    assert!(matches!(
        parse_bytes(b"<Hansard><HansardBody></Hansard>"),
        Err(AlpheusError::Xml(_))
    ));
    assert!(matches!(parse_bytes(&[0xff, 0xfe, 0x00]), Err(AlpheusError::Xml(_))));
}

#[test]
fn renders_standalone_html() {
    let doc = parse_str(&load_fixture("hansard/committee_en.xml")).expect("committee should parse");
    let html = doc.as_html();
    assert!(html.contains("<title>Standing Committee on Finance, 2012-05-03</title>"));
    assert!(html.contains(r#"data-name="committee_acronym" data-value="FINA""#));
    assert!(html.contains(r#"data-person-speaking-type="witness""#));
    assert_eq!(html.matches(r#"<div class="statement""#).count(), 3);
}
