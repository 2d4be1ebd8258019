//! Selectors
//!
//! The subset of CSS selectors needed to find references, notes and host
//! nodes: type, universal, class, id and attribute (`[a]`, `[a=v]`, `[a^=v]`)
//! simple selectors, descendant and child combinators, and selector lists.

use crate::{DomError, DomResult, DomTree, ElementData, NodeId};

/// Simple selector for matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Type(String),
    Universal,
    Class(String),
    Id(String),
    Attribute { name: String, matcher: AttrMatcher },
}

/// How an attribute selector compares values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrMatcher {
    Exists,
    Equals(String),
    Prefix(String),
}

impl SimpleSelector {
    fn matches(&self, elem: &ElementData) -> bool {
        match self {
            Self::Universal => true,
            Self::Type(tag) => elem.local_name == *tag,
            Self::Id(id) => elem.id() == Some(id.as_str()),
            Self::Class(class) => elem.has_class(class),
            Self::Attribute { name, matcher } => match (elem.get_attr(name), matcher) {
                (None, _) => false,
                (Some(_), AttrMatcher::Exists) => true,
                (Some(v), AttrMatcher::Equals(want)) => v == want,
                (Some(v), AttrMatcher::Prefix(want)) => !want.is_empty() && v.starts_with(want.as_str()),
            },
        }
    }
}

/// Sequence of simple selectors that must all match one element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    pub parts: Vec<SimpleSelector>,
}

impl CompoundSelector {
    pub fn matches(&self, elem: &ElementData) -> bool {
        self.parts.iter().all(|p| p.matches(elem))
    }
}

/// Relationship between two compounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
}

/// Compounds joined by combinators; `combinators[i]` sits between
/// `compounds[i]` and `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ComplexSelector {
    compounds: Vec<CompoundSelector>,
    combinators: Vec<Combinator>,
}

impl ComplexSelector {
    fn matches(&self, tree: &DomTree, element: NodeId) -> bool {
        self.matches_from(tree, self.compounds.len() - 1, element)
    }

    fn matches_from(&self, tree: &DomTree, index: usize, element: NodeId) -> bool {
        let Some(elem) = tree.element(element) else {
            return false;
        };
        if !self.compounds[index].matches(elem) {
            return false;
        }
        if index == 0 {
            return true;
        }
        let mut ancestor = parent_element(tree, element);
        match self.combinators[index - 1] {
            Combinator::Child => ancestor.is_some_and(|p| self.matches_from(tree, index - 1, p)),
            Combinator::Descendant => {
                while let Some(candidate) = ancestor {
                    if self.matches_from(tree, index - 1, candidate) {
                        return true;
                    }
                    ancestor = parent_element(tree, candidate);
                }
                false
            }
        }
    }
}

fn parent_element(tree: &DomTree, id: NodeId) -> Option<NodeId> {
    tree.parent(id).filter(|&p| tree.element(p).is_some())
}

/// Parsed selector list (`a, b`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Parse a selector list
    pub fn parse(source: &str) -> DomResult<Self> {
        let mut selectors = Vec::new();
        for group in source.split(',') {
            selectors.push(Parser::new(source, group).complex()?);
        }
        Ok(Self { selectors })
    }

    /// Check if an element matches any selector in the list
    pub fn matches(&self, tree: &DomTree, element: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(tree, element))
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, group: &'a str) -> Self {
        Self {
            source,
            chars: group.trim().chars().peekable(),
        }
    }

    fn error(&self, message: &str) -> DomError {
        DomError::syntax(self.source, message)
    }

    fn complex(mut self) -> DomResult<ComplexSelector> {
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();
        loop {
            let mut saw_space = false;
            while self.chars.next_if(|c| c.is_whitespace()).is_some() {
                saw_space = true;
            }
            let combinator = match self.chars.peek().copied() {
                None => break,
                Some('>') => {
                    self.chars.next();
                    while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
                    Combinator::Child
                }
                Some(_) if saw_space => Combinator::Descendant,
                Some(c) => return Err(self.error(&format!("unexpected '{c}'"))),
            };
            combinators.push(combinator);
            compounds.push(self.compound()?);
        }
        Ok(ComplexSelector { compounds, combinators })
    }

    fn compound(&mut self) -> DomResult<CompoundSelector> {
        let mut parts = Vec::new();
        if self.chars.next_if_eq(&'*').is_some() {
            parts.push(SimpleSelector::Universal);
        } else if self.chars.peek().is_some_and(|&c| is_ident_char(c)) {
            parts.push(SimpleSelector::Type(self.ident()?.to_ascii_lowercase()));
        }
        loop {
            match self.chars.peek().copied() {
                Some('.') => {
                    self.chars.next();
                    parts.push(SimpleSelector::Class(self.ident()?));
                }
                Some('#') => {
                    self.chars.next();
                    parts.push(SimpleSelector::Id(self.ident()?));
                }
                Some('[') => {
                    self.chars.next();
                    parts.push(self.attribute()?);
                }
                _ => break,
            }
        }
        if parts.is_empty() {
            return Err(self.error("expected a selector"));
        }
        Ok(CompoundSelector { parts })
    }

    fn attribute(&mut self) -> DomResult<SimpleSelector> {
        self.skip_spaces();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_spaces();
        let matcher = match self.chars.next() {
            Some(']') => return Ok(SimpleSelector::Attribute { name, matcher: AttrMatcher::Exists }),
            Some('=') => AttrMatcher::Equals(self.value()?),
            Some('^') if self.chars.next_if_eq(&'=').is_some() => AttrMatcher::Prefix(self.value()?),
            _ => return Err(self.error("malformed attribute selector")),
        };
        self.skip_spaces();
        if self.chars.next_if_eq(&']').is_none() {
            return Err(self.error("unterminated attribute selector"));
        }
        Ok(SimpleSelector::Attribute { name, matcher })
    }

    fn value(&mut self) -> DomResult<String> {
        self.skip_spaces();
        match self.chars.peek().copied() {
            Some(quote @ ('"' | '\'')) => {
                self.chars.next();
                let mut value = String::new();
                loop {
                    match self.chars.next() {
                        Some(c) if c == quote => return Ok(value),
                        Some(c) => value.push(c),
                        None => return Err(self.error("unterminated string")),
                    }
                }
            }
            _ => self.ident(),
        }
    }

    fn ident(&mut self) -> DomResult<String> {
        let mut ident = String::new();
        while let Some(c) = self.chars.next_if(|&c| is_ident_char(c)) {
            ident.push(c);
        }
        if ident.is_empty() {
            return Err(self.error("expected an identifier"));
        }
        Ok(ident)
    }

    fn skip_spaces(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}
