//! Builds an [`Interface`] from introspection document tokens

use tracing::debug;

use crate::error::ParseError;
use crate::interface::{Argument, Interface, Method, Property, PropertyAccess, Signal};
use crate::lexer::tokens::{Tag, Token};

/// Elements with a fixed place in the document; finding one elsewhere is an error
const STRUCTURAL_ELEMENTS: &[&str] = &["node", "interface", "method", "signal", "property", "arg"];

/// Deepest nesting of `node` wrappers or skipped elements
pub const MAX_ELEMENT_DEPTH: usize = 64;

/// Parser for D-Bus introspection documents
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        // Character data carries no meaning in introspection documents
        let tokens: Vec<Token> = tokens
            .into_iter()
            .filter(|t| !matches!(t, Token::Text(_)))
            .collect();

        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    /// Parse a complete document holding exactly one interface
    pub fn parse(&mut self) -> Result<Interface, ParseError> {
        let mut interface = None;

        while let Some(token) = self.advance() {
            match token {
                Token::StartTag(tag) => self.parse_top_level(tag, &mut interface)?,
                Token::EndTag { name, line } => {
                    return Err(ParseError::UnmatchedClosingTag { name, line });
                }
                Token::Text(_) => {}
            }
        }

        interface.ok_or(ParseError::NoInterface)
    }

    /// An element outside any interface: a `node` wrapper or the interface itself
    fn parse_top_level(
        &mut self,
        tag: Tag,
        interface: &mut Option<Interface>,
    ) -> Result<(), ParseError> {
        match tag.name.as_str() {
            "node" => {
                self.descend(&tag)?;
                while let Some(child) = self.next_child(&tag)? {
                    self.parse_top_level(child, interface)?;
                }
                self.depth -= 1;
                Ok(())
            }
            "interface" => {
                let line = tag.line;
                let parsed = self.parse_interface(tag)?;
                if let Some(first) = interface {
                    return Err(ParseError::MultipleInterfaces {
                        first: first.name.clone(),
                        second: parsed.name,
                        line,
                    });
                }
                *interface = Some(parsed);
                Ok(())
            }
            _ => self.skip_or_reject(tag, "node"),
        }
    }

    fn parse_interface(&mut self, tag: Tag) -> Result<Interface, ParseError> {
        let mut interface = Interface::new(self.required(&tag, "name")?);
        debug!(interface = %interface.name, line = tag.line, "parsing interface");

        while let Some(child) = self.next_child(&tag)? {
            match child.name.as_str() {
                "method" => interface.methods.push(self.parse_method(child)?),
                "signal" => interface.signals.push(self.parse_signal(child)?),
                "property" => interface.properties.push(self.parse_property(child)?),
                _ => self.skip_or_reject(child, "interface")?,
            }
        }
        Ok(interface)
    }

    fn parse_method(&mut self, tag: Tag) -> Result<Method, ParseError> {
        let mut method = Method::named(self.required(&tag, "name")?);

        while let Some(child) = self.next_child(&tag)? {
            if child.name != "arg" {
                self.skip_or_reject(child, "method")?;
                continue;
            }
            let argument = self.parse_argument(&child)?;
            match child.attribute("direction").unwrap_or("in") {
                "in" => method.input_arguments.push(argument),
                "out" => method.output_arguments.push(argument),
                other => return Err(self.invalid("direction", other, &child)),
            }
            self.skip_element(child)?;
        }
        Ok(method)
    }

    fn parse_signal(&mut self, tag: Tag) -> Result<Signal, ParseError> {
        let mut signal = Signal::named(self.required(&tag, "name")?);

        while let Some(child) = self.next_child(&tag)? {
            if child.name != "arg" {
                self.skip_or_reject(child, "signal")?;
                continue;
            }
            // Signal arguments only travel outward
            match child.attribute("direction") {
                None | Some("out") => {}
                Some(other) => return Err(self.invalid("direction", other, &child)),
            }
            signal.arguments.push(self.parse_argument(&child)?);
            self.skip_element(child)?;
        }
        Ok(signal)
    }

    fn parse_property(&mut self, tag: Tag) -> Result<Property, ParseError> {
        let name = self.required(&tag, "name")?;
        let type_signature = self.required(&tag, "type")?;
        let access_value = self.required(&tag, "access")?;
        let access = PropertyAccess::parse(&access_value)
            .ok_or_else(|| self.invalid("access", &access_value, &tag))?;
        debug!(property = %name, access = access.as_str(), line = tag.line, "parsing property");

        self.skip_element(tag)?;
        Ok(Property::new(name, type_signature, access))
    }

    fn parse_argument(&self, tag: &Tag) -> Result<Argument, ParseError> {
        let type_signature = self.required(tag, "type")?;
        Ok(Argument::new(
            tag.attribute("name").unwrap_or_default(),
            type_signature,
        ))
    }

    /// Next child element of `parent`, or `None` once its closing tag is consumed
    fn next_child(&mut self, parent: &Tag) -> Result<Option<Tag>, ParseError> {
        if parent.self_closing {
            return Ok(None);
        }
        loop {
            match self.advance() {
                None => return Err(ParseError::UnexpectedEof),
                Some(Token::Text(_)) => continue,
                Some(Token::StartTag(tag)) => return Ok(Some(tag)),
                Some(Token::EndTag { name, line }) => {
                    if name == parent.name {
                        return Ok(None);
                    }
                    return Err(ParseError::MismatchedTag {
                        expected: parent.name.clone(),
                        found: name,
                        line,
                    });
                }
            }
        }
    }

    /// Consume `tag` and everything inside it
    fn skip_element(&mut self, tag: Tag) -> Result<(), ParseError> {
        self.descend(&tag)?;
        while let Some(child) = self.next_child(&tag)? {
            self.skip_element(child)?;
        }
        self.depth -= 1;
        Ok(())
    }

    fn descend(&mut self, tag: &Tag) -> Result<(), ParseError> {
        if self.depth == MAX_ELEMENT_DEPTH {
            return Err(ParseError::TooDeep {
                element: tag.name.clone(),
                line: tag.line,
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Ignore annotations and unknown elements; misplaced structure is an error
    fn skip_or_reject(&mut self, tag: Tag, parent: &str) -> Result<(), ParseError> {
        if STRUCTURAL_ELEMENTS.contains(&tag.name.as_str()) {
            return Err(ParseError::UnexpectedElement {
                element: tag.name,
                parent: parent.to_string(),
                line: tag.line,
            });
        }
        debug!(element = %tag.name, parent, line = tag.line, "ignoring element");
        self.skip_element(tag)
    }

    fn required(&self, tag: &Tag, attribute: &'static str) -> Result<String, ParseError> {
        tag.attribute(attribute)
            .map(str::to_string)
            .ok_or_else(|| ParseError::MissingAttribute {
                element: tag.name.clone(),
                attribute,
                line: tag.line,
            })
    }

    fn invalid(&self, attribute: &'static str, value: &str, tag: &Tag) -> ParseError {
        ParseError::InvalidAttribute {
            attribute,
            value: value.to_string(),
            line: tag.line,
        }
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }
}
