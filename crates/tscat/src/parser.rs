//! Streaming parser for XML translation catalogs (`.ts` files).
//!
//! The catalog is read as a flat event stream; no document tree is built.
//! Known elements are folded into [`Entry`] records in document order and
//! everything else is skipped with its content.
//!
//! ```text
//! <TS version="2.1" language="fr_FR">
//!   <context>
//!     <name>MainWindow</name>
//!     <message>
//!       <source>Value: %1 of %2</source>
//!       <comment>status bar</comment>
//!       <translation type="unfinished">Valeur : %1 sur %2</translation>
//!     </message>
//!   </context>
//! </TS>
//! ```
//!
//! # Status mapping
//!
//! | `type` attribute      | Text      | Status         |
//! |-----------------------|-----------|----------------|
//! | absent                | non-empty | `Final`        |
//! | absent                | empty     | `Unfinished`   |
//! | `unfinished` / `new`  | any       | `Unfinished`   |
//! | `vanished`/`obsolete` | any       | `Obsolete`     |
//! | `guess`               | any       | `MachineGuess` |
//! | `correct`             | any       | `Confirmed`    |
//! | no `<translation>`    | -         | `Unfinished`   |
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Malformed markup | Bad syntax, bad entity | `ParseErrorKind::Xml` |
//! | Mismatched end tag | `</b>` closing `<a>` | `ParseErrorKind::MismatchedEnd` |
//! | Invalid text | Bytes that are not UTF-8 | `ParseErrorKind::Encoding` |
//! | Truncated input | Element still open at end of input | `ParseErrorKind::Unterminated` |
//! | Message without source | No `<source>` child | `ParseErrorKind::MissingSource` |
//! | Unknown `type` | Token outside the status vocabulary | Error (strict) or `Final` + warning (lenient) |

use std::borrow::Cow;
use std::fmt;

use quick_xml::Reader;
use quick_xml::errors::IllFormedError;
use quick_xml::events::{BytesStart, Event};

use crate::entry::{Entry, Location, Status};

// ============================================================================
// Errors
// ============================================================================

/// What went wrong while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The markup itself is malformed (reported by the XML reader).
    Xml(String),
    /// Input ended while `element` was still open.
    Unterminated { element: String },
    /// An end tag did not match the open element.
    MismatchedEnd { expected: String, found: String },
    /// Text was not valid UTF-8.
    Encoding(String),
    /// A `<message>` had no `<source>`.
    MissingSource,
    /// A `type` attribute carried a token outside the status vocabulary.
    UnknownStatus(String),
    /// A `<byte value=".."/>` element did not name a valid character.
    InvalidByte(String),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xml(msg) => write!(f, "malformed markup: {msg}"),
            Self::Unterminated { element } => write!(f, "unterminated element <{element}>"),
            Self::MismatchedEnd { expected, found } => {
                write!(f, "expected </{expected}>, found </{found}>")
            }
            Self::Encoding(msg) => write!(f, "invalid encoding: {msg}"),
            Self::MissingSource => f.write_str("message has no <source>"),
            Self::UnknownStatus(token) => write!(f, "unknown translation type '{token}'"),
            Self::InvalidByte(value) => write!(f, "invalid <byte> value '{value}'"),
        }
    }
}

/// A catalog could not be parsed. Carries the byte offset and 1-based line
/// of the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    offset: usize,
    line: usize,
}

impl ParseError {
    fn at(kind: ParseErrorKind, input: &[u8], offset: usize) -> Self {
        let offset = offset.min(input.len());
        let line = input[..offset].iter().filter(|&&b| b == b'\n').count() + 1;
        Self { kind, offset, line }
    }

    #[must_use]
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// Byte offset into the input.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 1-based line number.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} (byte {}): {}", self.line, self.offset, self.kind)
    }
}

impl std::error::Error for ParseError {}

// ============================================================================
// Policy and output
// ============================================================================

/// How to treat a `type` attribute outside the known vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// Fail the parse with [`ParseErrorKind::UnknownStatus`].
    #[default]
    Strict,
    /// Treat the entry as `Final` and log a warning.
    Lenient,
}

impl StatusPolicy {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "lenient" | "relaxed" => Some(Self::Lenient),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }
}

impl fmt::Display for StatusPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes of the catalog's root element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CatalogHeader {
    pub version: Option<String>,
    /// Target language tag, e.g. `de_DE`. Drives plural form selection.
    pub language: Option<String>,
    pub source_language: Option<String>,
}

/// Result of parsing one catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCatalog {
    pub header: CatalogHeader,
    /// Entries in document order.
    pub entries: Vec<Entry>,
}

/// Parse a catalog with the default (strict) status policy.
pub fn parse_catalog(input: &[u8]) -> Result<ParsedCatalog, ParseError> {
    CatalogParser::default().parse(input)
}

/// Catalog parser. Stateless apart from its policy; one instance can parse
/// any number of inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogParser {
    status_policy: StatusPolicy,
}

impl CatalogParser {
    #[must_use]
    pub const fn new(status_policy: StatusPolicy) -> Self {
        Self { status_policy }
    }

    #[must_use]
    pub const fn status_policy(&self) -> StatusPolicy {
        self.status_policy
    }

    /// Parse `input` into entries in document order.
    pub fn parse(&self, input: &[u8]) -> Result<ParsedCatalog, ParseError> {
        let mut cursor = EventCursor::new(input);
        let mut catalog = ParsedCatalog::default();
        let mut contexts = 0usize;

        loop {
            match cursor.next()? {
                Event::Start(start) => match start.name().as_ref() {
                    b"TS" => catalog.header = cursor.header(&start)?,
                    b"context" => {
                        self.parse_context(&mut cursor, &mut catalog.entries)?;
                        contexts += 1;
                    }
                    _ => cursor.skip_element()?,
                },
                Event::Empty(start) if start.name().as_ref() == b"TS" => {
                    catalog.header = cursor.header(&start)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        tracing::debug!(
            entries = catalog.entries.len(),
            contexts,
            language = catalog.header.language.as_deref().unwrap_or(""),
            "parsed catalog"
        );
        Ok(catalog)
    }

    fn parse_context(
        &self,
        cursor: &mut EventCursor<'_>,
        out: &mut Vec<Entry>,
    ) -> Result<(), ParseError> {
        let mut name: Option<String> = None;
        let mut messages = Vec::new();

        loop {
            match cursor.next()? {
                Event::Start(start) => match start.name().as_ref() {
                    b"name" => name = Some(cursor.read_text()?),
                    b"message" => messages.push(self.parse_message(cursor, &start)?),
                    _ => cursor.skip_element()?,
                },
                Event::Empty(start) if start.name().as_ref() == b"message" => {
                    return Err(cursor.error(ParseErrorKind::MissingSource));
                }
                Event::End(_) => break,
                _ => {}
            }
        }

        // <name> normally comes first, but nothing in the format requires it.
        let name = name.unwrap_or_default();
        for mut entry in messages {
            entry.context.clone_from(&name);
            out.push(entry);
        }
        Ok(())
    }

    fn parse_message(
        &self,
        cursor: &mut EventCursor<'_>,
        start: &BytesStart<'_>,
    ) -> Result<Entry, ParseError> {
        let message_offset = cursor.position();
        let numerus = cursor
            .attr(start, "numerus")?
            .is_some_and(|v| v.eq_ignore_ascii_case("yes"));
        let id = cursor.attr(start, "id")?;

        let mut source = None;
        let mut disambiguator = None;
        let mut translator_note = None;
        let mut extracted_comment = None;
        let mut locations = Vec::new();
        let mut translation: Option<TranslationParts> = None;

        loop {
            match cursor.next()? {
                Event::Start(el) => match el.name().as_ref() {
                    b"source" => source = Some(cursor.read_text()?),
                    b"comment" => disambiguator = Some(cursor.read_text()?),
                    b"translatorcomment" => translator_note = Some(cursor.read_text()?),
                    b"extracomment" => extracted_comment = Some(cursor.read_text()?),
                    b"translation" => {
                        let offset = cursor.position();
                        let marker = cursor.attr(&el, "type")?;
                        let mut parts = cursor.read_translation()?;
                        parts.marker = marker;
                        parts.offset = offset;
                        translation = Some(parts);
                    }
                    b"location" => {
                        locations.push(cursor.location(&el)?);
                        cursor.skip_element()?;
                    }
                    _ => cursor.skip_element()?,
                },
                Event::Empty(el) => match el.name().as_ref() {
                    b"source" => source = Some(String::new()),
                    b"comment" => disambiguator = Some(String::new()),
                    b"translatorcomment" => translator_note = Some(String::new()),
                    b"extracomment" => extracted_comment = Some(String::new()),
                    b"translation" => {
                        translation = Some(TranslationParts {
                            marker: cursor.attr(&el, "type")?,
                            offset: cursor.position(),
                            ..TranslationParts::default()
                        });
                    }
                    b"location" => locations.push(cursor.location(&el)?),
                    _ => {}
                },
                Event::End(_) => break,
                _ => {}
            }
        }

        let Some(source) = source else {
            return Err(ParseError::at(
                ParseErrorKind::MissingSource,
                cursor.input,
                message_offset,
            ));
        };

        let mut entry = Entry::new(String::new(), source, String::new());
        entry.disambiguator = disambiguator;
        entry.translator_note = translator_note;
        entry.extracted_comment = extracted_comment;
        entry.locations = locations;
        entry.id = id;

        match translation {
            None => entry.status = Status::Unfinished,
            Some(parts) => {
                if !parts.forms.is_empty() {
                    entry = entry.with_plural_forms(parts.forms);
                } else if numerus && !parts.text.is_empty() {
                    // Numerus message written without <numerusform> children.
                    entry = entry.with_plural_forms(vec![parts.text]);
                } else {
                    entry.translation = parts.text;
                }
                entry.status =
                    self.resolve_status(cursor, parts.marker, parts.offset, &entry)?;
            }
        }
        Ok(entry)
    }

    fn resolve_status(
        &self,
        cursor: &EventCursor<'_>,
        marker: Option<String>,
        offset: usize,
        entry: &Entry,
    ) -> Result<Status, ParseError> {
        let Some(marker) = marker else {
            return Ok(if entry.has_translation() {
                Status::Final
            } else {
                Status::Unfinished
            });
        };
        if let Some(status) = Status::from_marker(&marker) {
            return Ok(status);
        }
        match self.status_policy {
            StatusPolicy::Strict => Err(ParseError::at(
                ParseErrorKind::UnknownStatus(marker),
                cursor.input,
                offset,
            )),
            StatusPolicy::Lenient => {
                tracing::warn!(
                    marker = %marker,
                    source = %entry.source,
                    "unknown translation type, treating as final"
                );
                Ok(Status::Final)
            }
        }
    }
}

// ============================================================================
// Event cursor
// ============================================================================

#[derive(Debug, Default)]
struct TranslationParts {
    text: String,
    forms: Vec<String>,
    marker: Option<String>,
    offset: usize,
}

/// Thin layer over the XML reader that tracks open elements, so truncated
/// input is reported instead of silently ending the document.
struct EventCursor<'i> {
    input: &'i [u8],
    reader: Reader<&'i [u8]>,
    open: Vec<Vec<u8>>,
}

impl<'i> EventCursor<'i> {
    fn new(input: &'i [u8]) -> Self {
        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(false);
        Self {
            input,
            reader,
            open: Vec::new(),
        }
    }

    fn position(&self) -> usize {
        usize::try_from(self.reader.buffer_position()).unwrap_or(usize::MAX)
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::at(kind, self.input, self.position())
    }

    fn xml_error(&self, err: quick_xml::Error) -> ParseError {
        let offset = usize::try_from(self.reader.error_position()).unwrap_or(usize::MAX);
        let offset = if offset == 0 { self.position() } else { offset };
        ParseError::at(classify(err), self.input, offset)
    }

    fn next(&mut self) -> Result<Event<'i>, ParseError> {
        let event = match self.reader.read_event() {
            Ok(event) => event,
            Err(err) => return Err(self.xml_error(err)),
        };
        match &event {
            Event::Start(start) => self.open.push(start.name().as_ref().to_vec()),
            Event::End(_) => {
                self.open.pop();
            }
            Event::Eof => {
                if let Some(name) = self.open.last() {
                    let element = String::from_utf8_lossy(name).into_owned();
                    return Err(self.error(ParseErrorKind::Unterminated { element }));
                }
            }
            _ => {}
        }
        Ok(event)
    }

    /// Skip the rest of the element whose start tag was just read.
    fn skip_element(&mut self) -> Result<(), ParseError> {
        let mut depth = 0usize;
        loop {
            match self.next()? {
                Event::Start(_) => depth += 1,
                Event::End(_) => {
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
    }

    fn attr(&self, start: &BytesStart<'_>, name: &str) -> Result<Option<String>, ParseError> {
        match start.try_get_attribute(name) {
            Ok(Some(attr)) => attr
                .unescape_value()
                .map(|v| Some(v.into_owned()))
                .map_err(|err| self.xml_error(err)),
            Ok(None) => Ok(None),
            Err(err) => Err(self.xml_error(quick_xml::Error::InvalidAttr(err))),
        }
    }

    fn header(&self, start: &BytesStart<'_>) -> Result<CatalogHeader, ParseError> {
        Ok(CatalogHeader {
            version: self.attr(start, "version")?,
            language: self.attr(start, "language")?,
            source_language: self.attr(start, "sourcelanguage")?,
        })
    }

    fn location(&self, start: &BytesStart<'_>) -> Result<Location, ParseError> {
        Ok(Location {
            filename: self.attr(start, "filename")?,
            line: self.attr(start, "line")?,
        })
    }

    /// Append one text-bearing event to `text`. Returns `false` for events
    /// that carry no text.
    fn push_text(&self, event: &Event<'i>, text: &mut String) -> Result<bool, ParseError> {
        match event {
            Event::Text(t) => {
                let unescaped = t.unescape().map_err(|err| self.xml_error(err))?;
                text.push_str(&unescaped);
            }
            Event::CData(c) => {
                let raw = std::str::from_utf8(c)
                    .map_err(|err| self.error(ParseErrorKind::Encoding(err.to_string())))?;
                text.push_str(raw);
            }
            Event::Empty(el) if el.name().as_ref() == b"byte" => {
                if let Some(ch) = self.byte_char(el)? {
                    text.push(ch);
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Read the character content of the element whose start tag was just
    /// read. Entities are unescaped once; whitespace is kept verbatim.
    /// When the element holds `<lengthvariant>` children the first one wins.
    fn read_text(&mut self) -> Result<String, ParseError> {
        let mut text = String::new();
        let mut variants = Vec::new();
        loop {
            let event = self.next()?;
            if self.push_text(&event, &mut text)? {
                continue;
            }
            match event {
                Event::Start(el) if el.name().as_ref() == b"lengthvariant" => {
                    variants.push(self.read_text()?);
                }
                Event::Start(_) => self.skip_element()?,
                Event::End(_) => break,
                _ => {}
            }
        }
        Ok(first_variant_or(variants, text))
    }

    fn read_translation(&mut self) -> Result<TranslationParts, ParseError> {
        let mut parts = TranslationParts::default();
        let mut variants = Vec::new();
        loop {
            let event = self.next()?;
            if self.push_text(&event, &mut parts.text)? {
                continue;
            }
            match event {
                Event::Start(el) => match el.name().as_ref() {
                    b"numerusform" => parts.forms.push(self.read_text()?),
                    b"lengthvariant" => variants.push(self.read_text()?),
                    _ => self.skip_element()?,
                },
                Event::Empty(el) if el.name().as_ref() == b"numerusform" => {
                    parts.forms.push(String::new());
                }
                Event::End(_) => break,
                _ => {}
            }
        }
        parts.text = first_variant_or(variants, std::mem::take(&mut parts.text));
        Ok(parts)
    }

    fn byte_char(&self, el: &BytesStart<'_>) -> Result<Option<char>, ParseError> {
        let Some(value) = self.attr(el, "value")? else {
            return Err(self.error(ParseErrorKind::InvalidByte(String::new())));
        };
        let (digits, radix) = if let Some(hex) = value.strip_prefix("0x") {
            (hex, 16)
        } else if let Some(hex) = value.strip_prefix('x') {
            (hex, 16)
        } else {
            (value.as_str(), 10)
        };
        let code = u32::from_str_radix(digits, radix)
            .map_err(|_| self.error(ParseErrorKind::InvalidByte(value.clone())))?;
        if code == 0 {
            return Ok(None);
        }
        char::from_u32(code)
            .map(Some)
            .ok_or_else(|| self.error(ParseErrorKind::InvalidByte(value)))
    }
}

fn classify(err: quick_xml::Error) -> ParseErrorKind {
    match err {
        quick_xml::Error::IllFormed(IllFormedError::MismatchedEndTag { expected, found }) => {
            ParseErrorKind::MismatchedEnd { expected, found }
        }
        quick_xml::Error::Encoding(err) => ParseErrorKind::Encoding(err.to_string()),
        other => ParseErrorKind::Xml(other.to_string()),
    }
}

fn first_variant_or(variants: Vec<String>, text: String) -> String {
    variants.into_iter().next().unwrap_or(text)
}

/// Unescape standard entities in a string fragment. Exposed for tooling that
/// handles catalog text outside of a full document.
pub fn unescape_text(raw: &str) -> Result<Cow<'_, str>, ParseError> {
    quick_xml::escape::unescape(raw).map_err(|err| {
        ParseError::at(ParseErrorKind::Xml(err.to_string()), raw.as_bytes(), 0)
    })
}
