//! Abstract Syntax Tree types for LaTeX math markup
//!
//! The tree is built once per document by [`crate::parse`] (or by hand) and is
//! read-only while rendering.

/// An ordered run of nodes: "everything between two points". May be empty.
pub type NodeList = Vec<Node>;

/// A node of the parsed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal characters, whitespace included
    Text(String),
    /// Macro invocation: \frac{a}{b}, \alpha, x_i
    Construct(Construct),
    /// Delimited scope: {...}, $...$, \[...\], or a script embellishment
    Group(Group),
    /// Non-macro special sequence: ~, &, --, \langle
    Special(String),
    /// `%` comment, invisible in output
    Comment(String),
}

/// A macro invocation with its resolved argument slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Construct {
    pub name: String,
    pub arguments: Vec<ArgumentSlot>,
}

/// A delimited scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub open: String,
    pub close: String,
    pub children: NodeList,
}

/// Kind of a single argument in a construct's signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// `{x}` or a single token
    Mandatory,
    /// `[x]`, may be absent
    Optional,
    /// A `*` right after the name
    Star,
    /// A script attached to the construct, introduced by this trigger char
    Embellishment(char),
    /// Content between an arbitrary delimiter pair, e.g. `(x)`
    AnyDelimited(char, char),
}

/// One argument position of a construct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSlot {
    pub kind: ArgKind,
    /// `None` when an optional slot was not supplied
    pub content: Option<NodeList>,
}

impl ArgumentSlot {
    pub fn mandatory(content: NodeList) -> Self {
        Self {
            kind: ArgKind::Mandatory,
            content: Some(content),
        }
    }

    pub fn optional(content: Option<NodeList>) -> Self {
        Self {
            kind: ArgKind::Optional,
            content,
        }
    }

    pub fn absent(kind: ArgKind) -> Self {
        Self {
            kind,
            content: None,
        }
    }

    pub fn is_present(&self) -> bool {
        self.content.is_some()
    }
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }

    pub fn special(s: impl Into<String>) -> Self {
        Node::Special(s.into())
    }

    pub fn comment(s: impl Into<String>) -> Self {
        Node::Comment(s.into())
    }

    /// A construct with no arguments: \alpha, \times
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::construct(name, Vec::new())
    }

    pub fn construct(name: impl Into<String>, arguments: Vec<ArgumentSlot>) -> Self {
        Node::Construct(Construct {
            name: name.into(),
            arguments,
        })
    }

    pub fn group(open: impl Into<String>, close: impl Into<String>, children: NodeList) -> Self {
        Node::Group(Group {
            open: open.into(),
            close: close.into(),
            children,
        })
    }

    /// A brace group `{...}`
    pub fn braces(children: NodeList) -> Self {
        Self::group("{", "}", children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_optional_is_not_present() {
        let slot = ArgumentSlot::optional(None);
        assert!(!slot.is_present());
        assert!(ArgumentSlot::optional(Some(Vec::new())).is_present());
    }
}
