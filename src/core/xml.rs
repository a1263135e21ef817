//! A small navigable XML tree built on top of the `quick-xml` tokenizer.
//!
//! Parser behaviour is controlled by a [`ParseOptions`] value handed to each
//! [`XmlParser`]. There is no process-wide parser state. Entity references are
//! never resolved beyond the predefined XML entities and character references,
//! so a document cannot make the parser touch the network or the filesystem.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt;
use thiserror::Error;

/// Document substituted for an empty response body.
pub const EMPTY_DOCUMENT: &str = "<root />";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Accept (and ignore) a DOCTYPE declaration instead of rejecting the document.
    /// Entities declared inside it are still never expanded.
    pub allow_dtd: bool,
    /// Drop whitespace-only text between elements and trim text content.
    pub trim_text: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            allow_dtd: false,
            trim_text: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Warning,
    Error,
}

/// A message reported by the parser, with the location it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    pub line: usize,
    pub column: usize,
    /// Byte offset into the parsed input.
    pub position: u64,
}

impl ParseDiagnostic {
    fn at(input: &str, position: u64, level: DiagnosticLevel, message: String) -> Self {
        let offset = usize::try_from(position)
            .unwrap_or(usize::MAX)
            .min(input.len());
        let consumed = &input.as_bytes()[..offset];
        let line = consumed.iter().filter(|&&b| b == b'\n').count() + 1;
        let column = match consumed.iter().rposition(|&b| b == b'\n') {
            Some(newline) => offset - newline,
            None => offset + 1,
        };

        Self {
            level,
            message,
            line,
            column,
            position,
        }
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Error => "error",
        };
        write!(
            f,
            "{} at line {}, column {}: {}",
            level, self.line, self.column, self.message
        )
    }
}

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("{0}")]
    Syntax(#[from] quick_xml::Error),

    #[error("DOCTYPE declarations are not allowed")]
    DtdNotAllowed,

    #[error("document has no root element")]
    NoRoot,

    #[error("text content outside of the root element")]
    TextOutsideRoot,

    #[error("extra content at the end of the document")]
    ExtraContent,

    #[error("unexpected closing tag </{0}>")]
    UnexpectedEnd(String),

    #[error("element <{0}> is never closed")]
    Unclosed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Concatenated text and CDATA content directly inside this element.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Follows `path` through first-matching children, starting below `self`.
    pub fn find(&self, path: &[&str]) -> Option<&Element> {
        path.iter()
            .try_fold(self, |element, name| element.child(name))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (key, value) in &self.attributes {
            write!(f, " {}=\"{}\"", key, escape(value.as_str()))?;
        }

        if self.children.is_empty() && self.text.is_empty() {
            return write!(f, "/>");
        }

        write!(f, ">{}", escape(self.text.as_str()))?;
        for child in &self.children {
            write!(f, "{}", child)?;
        }
        write!(f, "</{}>", self.name)
    }
}

/// A parsed response body. Owns its whole tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: Element,
}

impl XmlDocument {
    /// Parses `input`, discarding any collected diagnostics.
    pub fn parse(input: &str, options: &ParseOptions) -> Result<Self, XmlError> {
        XmlParser::new(options).parse(input)
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Looks up a path below the root element, e.g. `["SD", "POPULARITY"]`.
    pub fn find(&self, path: &[&str]) -> Option<&Element> {
        self.root.find(path)
    }
}

impl fmt::Display for XmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}

/// Builds an [`XmlDocument`] and keeps the diagnostics produced along the way.
pub struct XmlParser<'o> {
    options: &'o ParseOptions,
    diagnostics: Vec<ParseDiagnostic>,
}

impl<'o> XmlParser<'o> {
    pub fn new(options: &'o ParseOptions) -> Self {
        Self {
            options,
            diagnostics: Vec::new(),
        }
    }

    pub fn diagnostics(&self) -> &[ParseDiagnostic] {
        &self.diagnostics
    }

    pub fn last_diagnostic(&self) -> Option<&ParseDiagnostic> {
        self.diagnostics.last()
    }

    pub fn take_last_diagnostic(&mut self) -> Option<ParseDiagnostic> {
        self.diagnostics.pop()
    }

    pub fn parse(&mut self, input: &str) -> Result<XmlDocument, XmlError> {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(self.options.trim_text);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    return Err(self.fail(input, reader.buffer_position() as u64, err.into()))
                }
            };
            let position = reader.buffer_position() as u64;

            let outcome = match event {
                Event::Start(_) if stack.is_empty() && root.is_some() => {
                    Err(XmlError::ExtraContent)
                }
                Event::Start(start) => match Element::from_start(&start) {
                    Ok(element) => {
                        stack.push(element);
                        Ok(())
                    }
                    Err(err) => Err(err.into()),
                },
                Event::Empty(start) => match Element::from_start(&start) {
                    Ok(element) => attach(&mut stack, &mut root, element),
                    Err(err) => Err(err.into()),
                },
                Event::End(end) => match stack.pop() {
                    Some(element) => attach(&mut stack, &mut root, element),
                    None => Err(XmlError::UnexpectedEnd(
                        String::from_utf8_lossy(end.name().as_ref()).into_owned(),
                    )),
                },
                Event::Text(text) => match text.unescape() {
                    Ok(text) => append_text(&mut stack, root.is_some(), &text),
                    Err(err) => Err(err.into()),
                },
                Event::CData(cdata) => {
                    append_text(&mut stack, root.is_some(), &String::from_utf8_lossy(&cdata))
                }
                Event::DocType(_) if !self.options.allow_dtd => Err(XmlError::DtdNotAllowed),
                Event::DocType(_) => {
                    self.diagnostics.push(ParseDiagnostic::at(
                        input,
                        position,
                        DiagnosticLevel::Warning,
                        "DOCTYPE ignored, declared entities are not expanded".to_string(),
                    ));
                    Ok(())
                }
                Event::Decl(_) | Event::PI(_) | Event::Comment(_) => Ok(()),
                Event::Eof => break,
            };

            if let Err(err) = outcome {
                return Err(self.fail(input, position, err));
            }
        }

        if let Some(open) = stack.pop() {
            let position = input.len() as u64;
            return Err(self.fail(input, position, XmlError::Unclosed(open.name)));
        }

        match root {
            Some(root) => Ok(XmlDocument { root }),
            None => Err(self.fail(input, input.len() as u64, XmlError::NoRoot)),
        }
    }

    fn fail(&mut self, input: &str, position: u64, err: XmlError) -> XmlError {
        self.diagnostics.push(ParseDiagnostic::at(
            input,
            position,
            DiagnosticLevel::Error,
            err.to_string(),
        ));
        err
    }
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_some() => Err(XmlError::ExtraContent),
        None => {
            *root = Some(element);
            Ok(())
        }
    }
}

fn append_text(stack: &mut [Element], seen_root: bool, text: &str) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None if seen_root => Err(XmlError::ExtraContent),
        None => Err(XmlError::TextOutsideRoot),
    }
}
