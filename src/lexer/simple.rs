//! Hand-written tokenizer for the XML subset used by introspection documents

use super::tokens::{Tag, Token};
use crate::error::LexError;

pub struct SimpleLexer {
    input: String,
    position: usize,
    line: usize,
}

impl SimpleLexer {
    pub fn new(input: String) -> Self {
        Self {
            input,
            position: 0,
            line: 1,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while !self.at_end() {
            // Prolog and markup we do not interpret
            if self.peek_str("<?") {
                self.skip_until("?>", "processing instruction")?;
                continue;
            }
            if self.peek_str("<!--") {
                self.skip_until("-->", "comment")?;
                continue;
            }
            if self.peek_str("<!") {
                self.skip_declaration()?;
                continue;
            }

            if self.peek_str("</") {
                tokens.push(self.read_end_tag()?);
                continue;
            }
            if self.current_char() == '<' {
                tokens.push(Token::StartTag(self.read_start_tag()?));
                continue;
            }

            let text = self.read_text()?;
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                tokens.push(Token::Text(trimmed.to_string()));
            }
        }

        Ok(tokens)
    }

    fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_char(&self) -> char {
        self.input[self.position..].chars().next().unwrap_or('\0')
    }

    fn peek_str(&self, s: &str) -> bool {
        self.input[self.position..].starts_with(s)
    }

    fn advance(&mut self) -> char {
        let c = self.current_char();
        if c == '\n' {
            self.line += 1;
        }
        self.position += c.len_utf8();
        c
    }

    fn skip_whitespace(&mut self) {
        while !self.at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    fn skip_until(&mut self, terminator: &str, construct: &'static str) -> Result<(), LexError> {
        let line = self.line;
        while !self.at_end() {
            if self.peek_str(terminator) {
                for _ in terminator.chars() {
                    self.advance();
                }
                return Ok(());
            }
            self.advance();
        }
        Err(LexError::Unterminated { construct, line })
    }

    /// `<!DOCTYPE ...>`, including an internal subset in brackets
    fn skip_declaration(&mut self) -> Result<(), LexError> {
        let line = self.line;
        let mut depth = 0usize;
        while !self.at_end() {
            match self.advance() {
                '[' => depth += 1,
                ']' => depth = depth.saturating_sub(1),
                '>' if depth == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(LexError::Unterminated {
            construct: "declaration",
            line,
        })
    }

    fn read_name(&mut self) -> Result<String, LexError> {
        let mut result = String::new();
        while !self.at_end() {
            let c = self.current_char();
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':') {
                result.push(self.advance());
            } else {
                break;
            }
        }
        if result.is_empty() {
            return Err(self.unexpected());
        }
        Ok(result)
    }

    fn read_end_tag(&mut self) -> Result<Token, LexError> {
        let line = self.line;
        self.advance(); // <
        self.advance(); // /
        let name = self.read_name()?;
        self.skip_whitespace();
        if self.at_end() {
            return Err(LexError::Unterminated {
                construct: "tag",
                line,
            });
        }
        if self.current_char() != '>' {
            return Err(self.unexpected());
        }
        self.advance();
        Ok(Token::EndTag { name, line })
    }

    fn read_start_tag(&mut self) -> Result<Tag, LexError> {
        let line = self.line;
        self.advance(); // <
        let name = self.read_name()?;
        let mut attributes: Vec<(String, String)> = Vec::new();

        loop {
            self.skip_whitespace();
            if self.at_end() {
                return Err(LexError::Unterminated {
                    construct: "tag",
                    line,
                });
            }
            if self.peek_str("/>") {
                self.advance();
                self.advance();
                return Ok(Tag {
                    name,
                    attributes,
                    self_closing: true,
                    line,
                });
            }
            if self.current_char() == '>' {
                self.advance();
                return Ok(Tag {
                    name,
                    attributes,
                    self_closing: false,
                    line,
                });
            }

            let attribute_line = self.line;
            let key = self.read_name()?;
            self.skip_whitespace();
            if self.current_char() != '=' {
                return Err(self.unexpected());
            }
            self.advance();
            self.skip_whitespace();
            let value = self.read_attribute_value()?;

            if attributes.iter().any(|(existing, _)| *existing == key) {
                return Err(LexError::DuplicateAttribute {
                    name: key,
                    line: attribute_line,
                });
            }
            attributes.push((key, value));
        }
    }

    fn read_attribute_value(&mut self) -> Result<String, LexError> {
        let quote = self.current_char();
        if quote != '"' && quote != '\'' {
            return Err(self.unexpected());
        }
        let line = self.line;
        self.advance();

        let mut result = String::new();
        while !self.at_end() {
            match self.current_char() {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '<' => return Err(self.unexpected()),
                '&' => result.push(self.read_entity()?),
                _ => result.push(self.advance()),
            }
        }
        Err(LexError::Unterminated {
            construct: "attribute value",
            line,
        })
    }

    fn read_text(&mut self) -> Result<String, LexError> {
        let mut result = String::new();
        while !self.at_end() && self.current_char() != '<' {
            if self.current_char() == '&' {
                result.push(self.read_entity()?);
            } else {
                result.push(self.advance());
            }
        }
        Ok(result)
    }

    /// Decode `&name;`, `&#N;` or `&#xH;` starting at the ampersand
    fn read_entity(&mut self) -> Result<char, LexError> {
        let line = self.line;
        self.advance(); // &
        let mut entity = String::new();
        loop {
            if self.at_end() {
                return Err(LexError::Unterminated {
                    construct: "entity reference",
                    line,
                });
            }
            match self.advance() {
                ';' => break,
                c if c.is_whitespace() || c == '<' || c == '&' => {
                    return Err(LexError::UnknownEntity { entity, line });
                }
                c => entity.push(c),
            }
        }

        let decoded = match entity.as_str() {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => match entity.strip_prefix('#') {
                Some(hex) if hex.starts_with('x') || hex.starts_with('X') => {
                    u32::from_str_radix(&hex[1..], 16).ok().and_then(char::from_u32)
                }
                Some(decimal) => decimal.parse::<u32>().ok().and_then(char::from_u32),
                None => None,
            },
        };
        decoded.ok_or(LexError::UnknownEntity { entity, line })
    }

    fn unexpected(&self) -> LexError {
        LexError::UnexpectedChar {
            found: self.current_char(),
            line: self.line,
        }
    }
}
