//! Token types in D-Bus introspection documents

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<name attr="value">` or the empty-element form `<name/>`
    StartTag(Tag),
    /// `</name>`
    EndTag { name: String, line: usize },
    /// Character data between tags, entity-decoded and trimmed
    Text(String),
}

/// An opening tag with its attributes in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// True for `<name/>`, which has no children and no closing tag
    pub self_closing: bool,
    pub line: usize,
}

impl Tag {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}
