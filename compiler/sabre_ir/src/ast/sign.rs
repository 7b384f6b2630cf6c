//! Type signatures as written in source.
//!
//! A signature is a chain of atoms read left to right, e.g.
//! `[4]math.vec3` is `Array { count }` then `Named { package, name }`.
//! Resolution folds the chain from the innermost (last) atom outward.

use super::Ident;
use crate::{ExprId, Span};

/// An unresolved type signature.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct TypeSign {
    pub atoms: Vec<TypeSignAtom>,
}

impl TypeSign {
    pub fn new() -> Self {
        TypeSign { atoms: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// The span of the named atom if any, else the first atom.
    pub fn span(&self) -> Span {
        for atom in &self.atoms {
            if let TypeSignAtom::Named { name, .. } | TypeSignAtom::Templated { name, .. } = atom {
                return name.span;
            }
        }
        match self.atoms.first() {
            Some(TypeSignAtom::Array { span, .. }) => *span,
            _ => Span::DUMMY,
        }
    }
}

/// One link in a type-signature chain.
#[derive(Clone, PartialEq, Debug)]
pub enum TypeSignAtom {
    /// `name` or `package.name`.
    Named {
        package: Option<Ident>,
        name: Ident,
    },
    /// `[count]` or `[]` for an unbounded array.
    Array {
        count: Option<ExprId>,
        span: Span,
    },
    /// `name<args, ...>` or `package.name<args, ...>`.
    Templated {
        package: Option<Ident>,
        name: Ident,
        args: Vec<TypeSign>,
    },
}
