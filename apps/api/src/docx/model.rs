//! In-memory view of a WordprocessingML body as paragraphs of formatting runs.
//!
//! Only the pieces the rewrite engine needs are modelled: body-level `w:p`
//! elements, their direct `w:r` children, each run's text and font color.
//! Every other event (paragraph properties, hyperlinks, tables, section
//! properties, whitespace) is kept verbatim and written back unchanged, so a
//! document with no edits serializes to the same `document.xml` it came from.

use std::fmt;
use std::path::Path;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::package::{DocxPackage, DOCUMENT_PART};
use super::DocxError;

type XmlEvent = Event<'static>;

const W_BODY: &[u8] = b"w:body";
const W_P: &[u8] = b"w:p";
const W_R: &[u8] = b"w:r";
const W_RPR: &[u8] = b"w:rPr";
const W_COLOR: &[u8] = b"w:color";

/// `w:rPr` children that must follow `w:color` in schema order.
const COLOR_SUCCESSORS: &[&[u8]] = &[
    b"w:spacing",
    b"w:w",
    b"w:kern",
    b"w:position",
    b"w:sz",
    b"w:szCs",
    b"w:highlight",
    b"w:u",
    b"w:effect",
    b"w:bdr",
    b"w:shd",
    b"w:fitText",
    b"w:vertAlign",
    b"w:rtl",
    b"w:cs",
    b"w:em",
    b"w:lang",
    b"w:eastAsianLayout",
    b"w:specVanish",
    b"w:oMath",
    b"w:rPrChange",
];

/// Color applied to runs whose text was rewritten (dark sea green).
pub const ACCENT_COLOR: RgbColor = RgbColor(0x2E, 0x8B, 0x57);

// ────────────────────────────────────────────────────────────────────────────
// RgbColor
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbColor(pub u8, pub u8, pub u8);

impl RgbColor {
    /// Parses the `RRGGBB` form used by `w:color/@w:val`. `auto` yields `None`.
    pub fn from_hex(value: &str) -> Option<Self> {
        if value.len() != 6 {
            return None;
        }
        let rgb = u32::from_str_radix(value, 16).ok()?;
        Some(Self((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8))
    }

    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Run
// ────────────────────────────────────────────────────────────────────────────

/// A `w:r` element: run properties plus content, with its text cached.
#[derive(Debug, Clone)]
pub struct Run {
    open: BytesStart<'static>,
    properties: Vec<XmlEvent>,
    content: Vec<XmlEvent>,
    text: String,
    color: Option<RgbColor>,
}

impl Run {
    fn from_events(events: Vec<XmlEvent>) -> Result<Self, DocxError> {
        let (open, children) = split_element(events)?;

        let mut properties = Vec::new();
        let mut content = Vec::new();
        let mut iter = children.into_iter();
        while let Some(event) = iter.next() {
            match tag_of(&event) {
                Tag::Start(name) if name == W_RPR => {
                    properties = take_subtree(event, &mut iter);
                }
                Tag::Empty(name) if name == W_RPR => properties = vec![event],
                Tag::Start(_) => content.extend(take_subtree(event, &mut iter)),
                _ => content.push(event),
            }
        }

        let text = text_of(&content)?;
        let color = color_of(&properties);
        Ok(Self {
            open,
            properties,
            content,
            text,
            color,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn color(&self) -> Option<RgbColor> {
        self.color
    }

    /// Replaces all run content with `text`, keeping the run properties.
    /// Tabs and line breaks become `w:tab` / `w:br` elements.
    pub fn set_text(&mut self, text: &str) {
        self.content = content_for(text);
        self.text = text.to_string();
    }

    pub fn set_color(&mut self, color: RgbColor) {
        self.properties = properties_with_color(std::mem::take(&mut self.properties), color);
        self.color = Some(color);
    }

    fn write<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), DocxError> {
        if self.properties.is_empty() && self.content.is_empty() {
            return write_event(writer, Event::Empty(self.open.borrow()));
        }
        write_event(writer, Event::Start(self.open.borrow()))?;
        for event in self.properties.iter().chain(self.content.iter()) {
            write_event(writer, event.borrow())?;
        }
        write_event(writer, Event::End(self.open.to_end()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Paragraph
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum ParagraphNode {
    Xml(XmlEvent),
    Run(usize),
}

/// A body-level `w:p` element. Runs are the paragraph's direct `w:r` children.
#[derive(Debug, Clone)]
pub struct Paragraph {
    open: BytesStart<'static>,
    nodes: Vec<ParagraphNode>,
    runs: Vec<Run>,
}

impl Paragraph {
    fn empty(open: BytesStart<'static>) -> Self {
        Self {
            open,
            nodes: Vec::new(),
            runs: Vec::new(),
        }
    }

    fn from_events(events: Vec<XmlEvent>) -> Result<Self, DocxError> {
        let (open, children) = split_element(events)?;
        let mut paragraph = Self::empty(open);

        let mut iter = children.into_iter();
        while let Some(event) = iter.next() {
            match tag_of(&event) {
                Tag::Start(name) if name == W_R => {
                    let run = Run::from_events(take_subtree(event, &mut iter))?;
                    paragraph.push_run(run);
                }
                Tag::Empty(name) if name == W_R => {
                    let run = Run::from_events(vec![event])?;
                    paragraph.push_run(run);
                }
                // Runs nested in hyperlinks, smart tags etc. are not direct runs.
                Tag::Start(_) => paragraph
                    .nodes
                    .extend(take_subtree(event, &mut iter).into_iter().map(ParagraphNode::Xml)),
                _ => paragraph.nodes.push(ParagraphNode::Xml(event)),
            }
        }
        Ok(paragraph)
    }

    fn push_run(&mut self, run: Run) {
        self.runs.push(run);
        self.nodes.push(ParagraphNode::Run(self.runs.len() - 1));
    }

    /// Full paragraph text: the concatenation of its runs' text.
    pub fn text(&self) -> String {
        self.runs.iter().map(Run::text).collect()
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn runs_mut(&mut self) -> &mut [Run] {
        &mut self.runs
    }

    fn write<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), DocxError> {
        if self.nodes.is_empty() {
            return write_event(writer, Event::Empty(self.open.borrow()));
        }
        write_event(writer, Event::Start(self.open.borrow()))?;
        for node in &self.nodes {
            match node {
                ParagraphNode::Xml(event) => write_event(writer, event.borrow())?,
                ParagraphNode::Run(index) => self.runs[*index].write(writer)?,
            }
        }
        write_event(writer, Event::End(self.open.to_end()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum BodyNode {
    Xml(XmlEvent),
    Paragraph(usize),
}

/// A loaded .docx: the zip package plus a parsed view of `word/document.xml`.
#[derive(Debug, Clone)]
pub struct Document {
    package: DocxPackage,
    nodes: Vec<BodyNode>,
    paragraphs: Vec<Paragraph>,
}

enum EventKind {
    BodyParagraph,
    EmptyBodyParagraph,
    Open(Vec<u8>),
    Close,
    Eof,
    Other,
}

impl Document {
    /// Loads a fresh in-memory copy of the document at `path`.
    pub fn open(path: &Path) -> Result<Self, DocxError> {
        Self::from_package(DocxPackage::open(path)?)
    }

    pub fn from_package(package: DocxPackage) -> Result<Self, DocxError> {
        let xml = package
            .part(DOCUMENT_PART)
            .ok_or_else(|| DocxError::InvalidPackage(format!("missing {DOCUMENT_PART}")))?;
        let xml = std::str::from_utf8(xml)
            .map_err(|e| DocxError::Xml(format!("{DOCUMENT_PART} is not UTF-8: {e}")))?;

        let events = read_events(xml)?;
        let mut nodes = Vec::with_capacity(events.len());
        let mut paragraphs = Vec::new();
        let mut stack: Vec<Vec<u8>> = Vec::new();

        let mut iter = events.into_iter();
        while let Some(event) = iter.next() {
            let in_body = stack.last().map(Vec::as_slice) == Some(W_BODY);
            let kind = match &event {
                Event::Start(e) if in_body && e.name().as_ref() == W_P => EventKind::BodyParagraph,
                Event::Empty(e) if in_body && e.name().as_ref() == W_P => {
                    EventKind::EmptyBodyParagraph
                }
                Event::Start(e) => EventKind::Open(e.name().as_ref().to_vec()),
                Event::End(_) => EventKind::Close,
                Event::Eof => EventKind::Eof,
                _ => EventKind::Other,
            };

            match kind {
                EventKind::BodyParagraph => {
                    let paragraph = Paragraph::from_events(take_subtree(event, &mut iter))?;
                    paragraphs.push(paragraph);
                    nodes.push(BodyNode::Paragraph(paragraphs.len() - 1));
                }
                EventKind::EmptyBodyParagraph => {
                    if let Event::Empty(open) = event {
                        paragraphs.push(Paragraph::empty(open));
                        nodes.push(BodyNode::Paragraph(paragraphs.len() - 1));
                    }
                }
                EventKind::Open(name) => {
                    stack.push(name);
                    nodes.push(BodyNode::Xml(event));
                }
                EventKind::Close => {
                    stack.pop();
                    nodes.push(BodyNode::Xml(event));
                }
                EventKind::Eof => break,
                EventKind::Other => nodes.push(BodyNode::Xml(event)),
            }
        }

        Ok(Self {
            package,
            nodes,
            paragraphs,
        })
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraphs_mut(&mut self) -> &mut [Paragraph] {
        &mut self.paragraphs
    }

    /// All text in the body in reading order, one line per `w:p` at any depth
    /// (tables, hyperlinks and text boxes included). Used for prompting;
    /// rewrites match against `paragraphs()` only.
    pub fn plain_text(&self) -> Result<String, DocxError> {
        let xml = self.to_xml()?;
        let xml = std::str::from_utf8(&xml)
            .map_err(|e| DocxError::Xml(format!("{DOCUMENT_PART} is not UTF-8: {e}")))?;
        flow_text(&read_events(xml)?)
    }

    /// Serializes the body back into `document.xml` bytes.
    pub fn to_xml(&self) -> Result<Vec<u8>, DocxError> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.nodes {
            match node {
                BodyNode::Xml(event) => write_event(&mut writer, event.borrow())?,
                BodyNode::Paragraph(index) => self.paragraphs[*index].write(&mut writer)?,
            }
        }
        Ok(writer.into_inner())
    }

    /// Writes the whole package to `path`, overwriting it.
    pub fn save(&self, path: &Path) -> Result<(), DocxError> {
        let mut package = self.package.clone();
        package.set_part(DOCUMENT_PART, self.to_xml()?);
        package.save(path)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Event helpers
// ────────────────────────────────────────────────────────────────────────────

enum Tag {
    Start(Vec<u8>),
    Empty(Vec<u8>),
    Other,
}

fn tag_of(event: &XmlEvent) -> Tag {
    match event {
        Event::Start(e) => Tag::Start(e.name().as_ref().to_vec()),
        Event::Empty(e) => Tag::Empty(e.name().as_ref().to_vec()),
        _ => Tag::Other,
    }
}

fn read_events(xml: &str) -> Result<Vec<XmlEvent>, DocxError> {
    let mut reader = Reader::from_str(xml);
    let mut events = Vec::new();
    loop {
        let event = reader.read_event().map_err(|e| {
            DocxError::Xml(format!(
                "{DOCUMENT_PART} at byte {}: {e}",
                reader.buffer_position()
            ))
        })?;
        let done = matches!(event, Event::Eof);
        events.push(event.into_owned());
        if done {
            return Ok(events);
        }
    }
}

fn write_event<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), DocxError> {
    writer
        .write_event(event)
        .map_err(|e| DocxError::Xml(e.to_string()))
}

/// Collects `first` (a Start event) and everything up to its matching End.
fn take_subtree<I: Iterator<Item = XmlEvent>>(first: XmlEvent, iter: &mut I) -> Vec<XmlEvent> {
    let mut events = vec![first];
    let mut depth = 1usize;
    for event in iter.by_ref() {
        match &event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth -= 1,
            _ => {}
        }
        events.push(event);
        if depth == 0 {
            break;
        }
    }
    events
}

/// Splits a complete element's events into its open tag and its children.
fn split_element(events: Vec<XmlEvent>) -> Result<(BytesStart<'static>, Vec<XmlEvent>), DocxError> {
    let mut iter = events.into_iter();
    match iter.next() {
        Some(Event::Empty(open)) => Ok((open, Vec::new())),
        Some(Event::Start(open)) => {
            let mut children: Vec<XmlEvent> = iter.collect();
            if matches!(children.last(), Some(Event::End(_))) {
                children.pop();
            }
            Ok((open, children))
        }
        _ => Err(DocxError::Xml("expected an element start tag".to_string())),
    }
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

/// Text of a run's content, reading only its direct children.
fn text_of(content: &[XmlEvent]) -> Result<String, DocxError> {
    let mut text = String::new();
    let mut depth = 0usize;
    let mut in_text = false;

    for event in content {
        match event {
            Event::Start(e) => {
                if depth == 0 && e.name().as_ref() == b"w:t" {
                    in_text = true;
                }
                depth += 1;
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    in_text = false;
                }
            }
            Event::Text(t) if in_text => {
                let unescaped = t.unescape().map_err(|e| DocxError::Xml(e.to_string()))?;
                text.push_str(&unescaped);
            }
            Event::CData(c) if in_text => text.push_str(&String::from_utf8_lossy(c)),
            Event::Empty(e) if depth == 0 => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                b"w:noBreakHyphen" => text.push('-'),
                _ => {}
            },
            _ => {}
        }
    }
    Ok(text)
}

/// Text of a whole event stream. `mc:Fallback` content repeats its
/// `mc:Choice` sibling and is skipped.
fn flow_text(events: &[XmlEvent]) -> Result<String, DocxError> {
    let mut text = String::new();
    let mut in_text = false;
    let mut skip_depth = 0usize;

    for event in events {
        if skip_depth > 0 {
            match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                _ => {}
            }
            continue;
        }
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:t" => in_text = true,
                b"mc:Fallback" => skip_depth = 1,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let unescaped = t.unescape().map_err(|e| DocxError::Xml(e.to_string()))?;
                text.push_str(&unescaped);
            }
            Event::CData(c) if in_text => text.push_str(&String::from_utf8_lossy(c)),
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                b"w:noBreakHyphen" => text.push('-'),
                b"w:p" => text.push('\n'),
                _ => {}
            },
            _ => {}
        }
    }

    let trimmed = text.trim_end_matches('\n').len();
    text.truncate(trimmed);
    Ok(text)
}

fn color_of(properties: &[XmlEvent]) -> Option<RgbColor> {
    properties.iter().find_map(|event| match event {
        Event::Start(e) | Event::Empty(e) if e.name().as_ref() == W_COLOR => {
            attribute(e, b"w:val").and_then(|val| RgbColor::from_hex(&val))
        }
        _ => None,
    })
}

fn text_element(piece: &str) -> [XmlEvent; 3] {
    let mut open = BytesStart::new("w:t");
    if piece.starts_with(char::is_whitespace) || piece.ends_with(char::is_whitespace) {
        open.push_attribute(("xml:space", "preserve"));
    }
    [
        Event::Start(open),
        Event::Text(BytesText::new(piece).into_owned()),
        Event::End(BytesEnd::new("w:t")),
    ]
}

fn content_for(text: &str) -> Vec<XmlEvent> {
    let mut content = Vec::new();
    let mut piece = String::new();
    for ch in text.chars() {
        let separator = match ch {
            '\t' => Some("w:tab"),
            '\n' | '\r' => Some("w:br"),
            _ => None,
        };
        match separator {
            Some(name) => {
                if !piece.is_empty() {
                    content.extend(text_element(&piece));
                    piece.clear();
                }
                content.push(Event::Empty(BytesStart::new(name)));
            }
            None => piece.push(ch),
        }
    }
    if !piece.is_empty() {
        content.extend(text_element(&piece));
    }
    content
}

fn color_element(color: RgbColor) -> XmlEvent {
    let mut element = BytesStart::new("w:color");
    element.push_attribute(("w:val", color.to_hex().as_str()));
    Event::Empty(element)
}

/// Returns run properties with any existing `w:color` replaced by `color`,
/// inserted at its schema position.
fn properties_with_color(properties: Vec<XmlEvent>, color: RgbColor) -> Vec<XmlEvent> {
    let (open, children) = match split_element(properties) {
        Ok(parts) => parts,
        Err(_) => (BytesStart::new("w:rPr"), Vec::new()),
    };

    let mut rebuilt = vec![Event::Start(open.clone())];
    let mut pending = Some(color_element(color));
    let mut iter = children.into_iter();
    while let Some(event) = iter.next() {
        match tag_of(&event) {
            // The old color element is dropped, children included.
            Tag::Start(name) if name == W_COLOR => {
                take_subtree(event, &mut iter);
            }
            Tag::Empty(name) if name == W_COLOR => {}
            Tag::Start(name) => {
                if COLOR_SUCCESSORS.contains(&name.as_slice()) {
                    rebuilt.extend(pending.take());
                }
                rebuilt.extend(take_subtree(event, &mut iter));
            }
            Tag::Empty(name) => {
                if COLOR_SUCCESSORS.contains(&name.as_slice()) {
                    rebuilt.extend(pending.take());
                }
                rebuilt.push(event);
            }
            Tag::Other => rebuilt.push(event),
        }
    }
    rebuilt.extend(pending.take());
    rebuilt.push(Event::End(open.to_end().into_owned()));
    rebuilt
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    pub(crate) const NS: &str =
        r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    /// Builds `document.xml` with one paragraph per entry, one run per string.
    pub(crate) fn document_xml(paragraphs: &[&[&str]]) -> String {
        let mut body = String::new();
        for runs in paragraphs {
            body.push_str("<w:p><w:pPr><w:pStyle w:val=\"ListBullet\"/></w:pPr>");
            for text in runs.iter() {
                body.push_str(&format!(
                    "<w:r><w:rPr><w:b/><w:sz w:val=\"20\"/></w:rPr><w:t xml:space=\"preserve\">{}</w:t></w:r>",
                    text.replace('&', "&amp;").replace('<', "&lt;")
                ));
            }
            body.push_str("</w:p>");
        }
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:document {NS}><w:body>{body}<w:sectPr/></w:body></w:document>"
        )
    }

    pub(crate) fn package_bytes(document_xml: &str) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
            .unwrap();
        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(document_xml.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    pub(crate) fn document_from_xml(xml: &str) -> Document {
        let package = DocxPackage::from_reader(Cursor::new(package_bytes(xml))).unwrap();
        Document::from_package(package).unwrap()
    }

    pub(crate) fn document_with(paragraphs: &[&[&str]]) -> Document {
        document_from_xml(&document_xml(paragraphs))
    }

    #[test]
    fn test_paragraph_text_is_concatenated_runs() {
        let doc = document_with(&[&["Led ", "a team of 5 engineers"], &["Solo bullet"]]);
        assert_eq!(doc.paragraphs().len(), 2);
        assert_eq!(doc.paragraphs()[0].runs().len(), 2);
        assert_eq!(doc.paragraphs()[0].text(), "Led a team of 5 engineers");
        assert_eq!(doc.paragraphs()[1].text(), "Solo bullet");
    }

    #[test]
    fn test_unmodified_document_serializes_identically() {
        let xml = document_xml(&[&["Built ", "things & stuff"], &["Other"]]);
        let doc = document_from_xml(&xml);
        assert_eq!(String::from_utf8(doc.to_xml().unwrap()).unwrap(), xml);
    }

    #[test]
    fn test_entities_are_unescaped_in_text() {
        let doc = document_with(&[&["R&D <team>"]]);
        assert_eq!(doc.paragraphs()[0].text(), "R&D <team>");
    }

    #[test]
    fn test_tabs_and_breaks_contribute_to_run_text() {
        let xml = format!(
            "<w:document {NS}><w:body><w:p><w:r><w:t>A</w:t><w:tab/><w:t>B</w:t><w:br/><w:t>C</w:t></w:r></w:p></w:body></w:document>"
        );
        let doc = document_from_xml(&xml);
        assert_eq!(doc.paragraphs()[0].text(), "A\tB\nC");
    }

    #[test]
    fn test_only_body_level_paragraphs_are_exposed() {
        let xml = format!(
            "<w:document {NS}><w:body><w:p><w:r><w:t>Top</w:t></w:r></w:p>\
             <w:tbl><w:tr><w:tc><w:p><w:r><w:t>Cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>\
             <w:p/></w:body></w:document>"
        );
        let doc = document_from_xml(&xml);
        let texts: Vec<String> = doc.paragraphs().iter().map(Paragraph::text).collect();
        assert_eq!(texts, vec!["Top".to_string(), String::new()]);
        // Table content still survives serialization.
        let out = String::from_utf8(doc.to_xml().unwrap()).unwrap();
        assert!(out.contains("<w:t>Cell</w:t>"));
    }

    #[test]
    fn test_hyperlink_runs_are_not_direct_runs() {
        let xml = format!(
            "<w:document {NS}><w:body><w:p><w:r><w:t>See </w:t></w:r>\
             <w:hyperlink r:id=\"rId1\"><w:r><w:t>site</w:t></w:r></w:hyperlink></w:p></w:body></w:document>"
        );
        let doc = document_from_xml(&xml);
        assert_eq!(doc.paragraphs()[0].runs().len(), 1);
        assert_eq!(doc.paragraphs()[0].text(), "See ");
    }

    #[test]
    fn test_set_text_preserves_properties_and_escapes() {
        let mut doc = document_with(&[&["old"]]);
        doc.paragraphs_mut()[0].runs_mut()[0].set_text(" a < b & c");
        assert_eq!(doc.paragraphs()[0].text(), " a < b & c");

        let out = String::from_utf8(doc.to_xml().unwrap()).unwrap();
        assert!(out.contains("<w:rPr><w:b/><w:sz w:val=\"20\"/></w:rPr>"));
        assert!(out.contains("<w:t xml:space=\"preserve\"> a &lt; b &amp; c</w:t>"));
    }

    #[test]
    fn test_set_text_with_tab_emits_tab_element() {
        let mut doc = document_with(&[&["old"]]);
        doc.paragraphs_mut()[0].runs_mut()[0].set_text("a\tb");
        let out = String::from_utf8(doc.to_xml().unwrap()).unwrap();
        assert!(out.contains("<w:t>a</w:t><w:tab/><w:t>b</w:t>"));
    }

    #[test]
    fn test_set_color_inserts_in_schema_order() {
        let mut doc = document_with(&[&["text"]]);
        doc.paragraphs_mut()[0].runs_mut()[0].set_color(ACCENT_COLOR);

        let out = String::from_utf8(doc.to_xml().unwrap()).unwrap();
        assert!(out.contains("<w:rPr><w:b/><w:color w:val=\"2E8B57\"/><w:sz w:val=\"20\"/></w:rPr>"));
        assert_eq!(doc.paragraphs()[0].runs()[0].color(), Some(ACCENT_COLOR));
    }

    #[test]
    fn test_set_color_replaces_existing_color_and_creates_missing_rpr() {
        let xml = format!(
            "<w:document {NS}><w:body><w:p>\
             <w:r><w:rPr><w:color w:val=\"FF0000\" w:themeColor=\"accent1\"/></w:rPr><w:t>red</w:t></w:r>\
             <w:r><w:t>plain</w:t></w:r></w:p></w:body></w:document>"
        );
        let mut doc = document_from_xml(&xml);
        assert_eq!(doc.paragraphs()[0].runs()[0].color(), Some(RgbColor(0xFF, 0, 0)));
        assert_eq!(doc.paragraphs()[0].runs()[1].color(), None);

        for run in doc.paragraphs_mut()[0].runs_mut() {
            run.set_color(ACCENT_COLOR);
        }
        let out = String::from_utf8(doc.to_xml().unwrap()).unwrap();
        assert!(!out.contains("FF0000"));
        assert_eq!(out.matches("<w:color w:val=\"2E8B57\"/>").count(), 2);
        assert!(out.contains("<w:r><w:rPr><w:color w:val=\"2E8B57\"/></w:rPr><w:t>plain</w:t></w:r>"));
    }

    #[test]
    fn test_rgb_color_hex() {
        assert_eq!(ACCENT_COLOR.to_hex(), "2E8B57");
        assert_eq!(RgbColor::from_hex("2e8b57"), Some(ACCENT_COLOR));
        assert_eq!(RgbColor::from_hex("auto"), None);
        assert_eq!(ACCENT_COLOR.to_string(), "#2E8B57");
    }

    #[test]
    fn test_plain_text_joins_paragraphs() {
        let doc = document_with(&[&["One"], &["Two ", "parts"]]);
        assert_eq!(doc.plain_text().unwrap(), "One\nTwo parts");
    }

    #[test]
    fn test_plain_text_includes_tables_hyperlinks_and_text_boxes() {
        let xml = format!(
            "<w:document {NS} xmlns:mc=\"http://schemas.openxmlformats.org/markup-compatibility/2006\">\
             <w:body><w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>\
             <w:tbl><w:tr><w:tc><w:p><w:r><w:t>Skills: Rust, Kafka</w:t></w:r></w:p></w:tc>\
             <w:tc><w:p><w:r><w:t>Go</w:t></w:r><w:r><w:tab/><w:t>SQL</w:t></w:r></w:p></w:tc></w:tr></w:tbl>\
             <w:p><w:r><w:t xml:space=\"preserve\">Portfolio: </w:t></w:r>\
             <w:hyperlink r:id=\"rId1\"><w:r><w:t>janedoe.dev</w:t></w:r></w:hyperlink></w:p>\
             <w:p><w:r><mc:AlternateContent><mc:Choice Requires=\"wps\"><w:txbxContent>\
             <w:p><w:r><w:t>Open to relocation</w:t></w:r></w:p></w:txbxContent></mc:Choice>\
             <mc:Fallback><w:txbxContent><w:p><w:r><w:t>Open to relocation</w:t></w:r></w:p>\
             </w:txbxContent></mc:Fallback></mc:AlternateContent></w:r></w:p>\
             <w:sectPr/></w:body></w:document>"
        );
        let doc = document_from_xml(&xml);

        assert_eq!(
            doc.plain_text().unwrap(),
            "Jane Doe\nSkills: Rust, Kafka\nGo\tSQL\nPortfolio: janedoe.dev\nOpen to relocation"
        );
        // Matching still sees body-level paragraphs and their direct runs only.
        assert_eq!(doc.paragraphs().len(), 3);
        assert_eq!(doc.paragraphs()[1].text(), "Portfolio: ");
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        let mut doc = document_with(&[&["before"]]);
        doc.paragraphs_mut()[0].runs_mut()[0].set_text("after");
        doc.save(&path).unwrap();

        let reopened = Document::open(&path).unwrap();
        assert_eq!(reopened.paragraphs()[0].text(), "after");
    }
}
