//! Tag annotations: `@name` or `@name{key = value, ...}`.

use super::Ident;
use crate::{Name, Span};
use rustc_hash::FxHashMap;

/// The set of tags attached to a declaration or struct field.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct TagTable {
    pub tags: FxHashMap<Name, Tag>,
}

impl TagTable {
    pub fn new() -> Self {
        TagTable::default()
    }

    #[inline]
    pub fn get(&self, name: Name) -> Option<&Tag> {
        self.tags.get(&name)
    }

    #[inline]
    pub fn has(&self, name: Name) -> bool {
        self.tags.contains_key(&name)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Insert a tag; returns the previous tag with the same name if any.
    pub fn insert(&mut self, tag: Tag) -> Option<Tag> {
        self.tags.insert(tag.name.name, tag)
    }
}

/// A single `@name{...}` annotation.
#[derive(Clone, PartialEq, Debug)]
pub struct Tag {
    pub name: Ident,
    pub args: FxHashMap<Name, TagArg>,
}

impl Tag {
    pub fn new(name: Ident) -> Self {
        Tag {
            name,
            args: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn arg(&self, name: Name) -> Option<&TagArg> {
        self.args.get(&name)
    }
}

/// A `key = value` argument inside a tag.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TagArg {
    pub value: TagValue,
    pub span: Span,
}

/// Tag argument values are literals or bare identifiers.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum TagValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Ident(Name),
}

impl TagValue {
    /// The integer payload, if this value is an integer literal.
    pub fn as_int(self) -> Option<i64> {
        match self {
            TagValue::Int(v) => Some(v),
            _ => None,
        }
    }
}
