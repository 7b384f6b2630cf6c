//! Named entities and their resolution state.

use crate::scope::ScopeId;
use crate::unit::PackageId;
use sabre_ir::{ast::Ident, DeclId, ExprId, FileId, Loc, Name, TypeSign};
use sabre_types::{SymRef, TypeId, Value};

/// Id of a [`Symbol`] within its package.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SymbolId(pub u32);

impl SymbolId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Three-state resolution marker. A symbol never leaves `Resolving` except
/// to `Resolved`; observing `Resolving` during a lookup is a cyclic
/// dependency.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SymbolState {
    Unresolved,
    Resolving,
    Resolved,
}

/// How an expression may be used: constant, assignable location, or plain
/// computed value.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum AddressMode {
    #[default]
    None,
    Const,
    Variable,
    ComputedValue,
}

/// A named entity.
#[derive(Debug)]
pub struct Symbol {
    pub name: Ident,
    pub file: FileId,
    pub package: PackageId,
    pub scope: Option<ScopeId>,
    pub state: SymbolState,
    pub ty: Option<TypeId>,
    /// Symbols this one references, in first-reference order.
    pub dependencies: Vec<SymRef>,
    pub is_top_level: bool,
    pub mangled_name: Option<Name>,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn new(name: Ident, file: FileId, package: PackageId, kind: SymbolKind) -> Self {
        Symbol {
            name,
            file,
            package,
            scope: None,
            state: SymbolState::Unresolved,
            ty: None,
            dependencies: Vec::new(),
            is_top_level: false,
            mangled_name: None,
            kind,
        }
    }

    pub fn loc(&self) -> Loc {
        Loc::new(self.file, self.name.span)
    }

    /// The declaration behind this symbol, when it has one.
    pub fn decl(&self) -> Option<DeclId> {
        match &self.kind {
            SymbolKind::Const { decl, .. }
            | SymbolKind::Func { decl }
            | SymbolKind::Struct { decl }
            | SymbolKind::Enum { decl }
            | SymbolKind::FuncInstantiation { decl, .. } => Some(*decl),
            SymbolKind::Var { decl, .. } => *decl,
            _ => None,
        }
    }

    pub fn add_dependency(&mut self, dep: SymRef) {
        if !self.dependencies.contains(&dep) {
            self.dependencies.push(dep);
        }
    }
}

/// Kind-specific payload.
#[derive(Debug)]
pub enum SymbolKind {
    Const {
        decl: DeclId,
        sign: TypeSign,
        value: Option<ExprId>,
        /// The initializer's folded value, readable across packages.
        folded: Option<Value>,
    },
    Var {
        /// `None` for function parameters.
        decl: Option<DeclId>,
        sign: TypeSign,
        value: Option<ExprId>,
        is_uniform: bool,
        binding: Option<i64>,
        binding_processed: bool,
    },
    Func {
        decl: DeclId,
    },
    /// Functions sharing one name; types are filled in during resolution.
    OverloadSet {
        decls: Vec<(DeclId, Option<TypeId>)>,
    },
    Struct {
        decl: DeclId,
    },
    Enum {
        decl: DeclId,
    },
    Package {
        package: PackageId,
    },
    /// Template parameter placeholder; type assigned at creation.
    Typename,
    /// A specialized clone of a templated function.
    FuncInstantiation {
        base: SymRef,
        decl: DeclId,
    },
    /// A specialized templated struct.
    StructInstantiation {
        base: SymRef,
    },
}

/// A shader entry point with its assigned resources.
#[derive(Debug)]
pub struct EntryPoint {
    pub symbol: SymbolId,
    pub mode: EntryMode,
    pub textures: Vec<SymRef>,
    pub samplers: Vec<SymRef>,
    pub uniforms: Vec<SymRef>,
}

impl EntryPoint {
    pub fn new(symbol: SymbolId, mode: EntryMode) -> Self {
        EntryPoint {
            symbol,
            mode,
            textures: Vec::new(),
            samplers: Vec::new(),
            uniforms: Vec::new(),
        }
    }
}

/// Shader pipeline stage of an entry point.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum EntryMode {
    Vertex,
    Pixel,
    Geometry,
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryMode::Vertex => write!(f, "vertex"),
            EntryMode::Pixel => write!(f, "pixel"),
            EntryMode::Geometry => write!(f, "geometry"),
        }
    }
}
