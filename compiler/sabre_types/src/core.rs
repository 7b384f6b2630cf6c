//! Core type representation.

use crate::Value;
use rustc_hash::FxHashMap;
use sabre_ir::{ast::Ident, ExprId, Name};

/// Identifies an interned type. Two structurally identical types always
/// carry the same id, so equality is an integer compare.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    // Builtins pre-interned by `TypeInterner::new`, in declaration order.
    pub const VOID: TypeId = TypeId(0);
    pub const BOOL: TypeId = TypeId(1);
    pub const INT: TypeId = TypeId(2);
    pub const UINT: TypeId = TypeId(3);
    pub const FLOAT: TypeId = TypeId(4);
    pub const DOUBLE: TypeId = TypeId(5);
    /// Untyped integer literal; coerces to any numeric scalar.
    pub const LIT_INT: TypeId = TypeId(6);
    /// Untyped float literal; coerces to any numeric scalar.
    pub const LIT_FLOAT: TypeId = TypeId(7);

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A symbol reference that is stable across packages: the owning package
/// index plus the symbol index inside it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SymRef {
    pub package: u32,
    pub symbol: u32,
}

/// Scalar base kinds used by vectors.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScalarKind {
    Bool,
    Int,
    Uint,
    Float,
    Double,
}

/// Texture dimensionality.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TextureDim {
    D1,
    D2,
    D3,
    Cube,
}

impl TextureDim {
    pub const fn type_name(self) -> &'static str {
        match self {
            TextureDim::D1 => "texture1d",
            TextureDim::D2 => "texture2d",
            TextureDim::D3 => "texture3d",
            TextureDim::Cube => "texture_cube",
        }
    }
}

/// Geometry-shader output stream topology.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum StreamKind {
    Point,
    Line,
    Triangle,
}

impl StreamKind {
    pub const fn type_name(self) -> &'static str {
        match self {
            StreamKind::Point => "point_stream",
            StreamKind::Line => "line_stream",
            StreamKind::Triangle => "triangle_stream",
        }
    }
}

/// A resolved struct field.
#[derive(Clone, Debug)]
pub struct StructField {
    pub name: Ident,
    pub ty: TypeId,
    pub default_value: Option<ExprId>,
}

/// A resolved enum field. The value is filled during enum completion.
#[derive(Clone, Debug)]
pub struct EnumField {
    pub name: Ident,
    pub value: Option<Value>,
}

/// A function signature: argument types plus return type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FuncSign {
    pub args: Vec<TypeId>,
    pub ret: TypeId,
}

/// The payload of an interned type.
#[derive(Clone, Debug)]
pub enum TypeData {
    Void,
    Bool,
    Int,
    Uint,
    Float,
    Double,
    LitInt,
    LitFloat,
    Vec {
        base: TypeId,
        width: u32,
    },
    /// Square float matrix.
    Mat {
        width: u32,
    },
    /// `count` is `-1` for unbounded arrays.
    Array {
        base: TypeId,
        count: i64,
    },
    Struct {
        sym: SymRef,
        name: Name,
        fields: Vec<StructField>,
        fields_by_name: FxHashMap<Name, usize>,
    },
    Enum {
        sym: SymRef,
        name: Name,
        fields: Vec<EnumField>,
        fields_by_name: FxHashMap<Name, usize>,
    },
    Func(FuncSign),
    /// A named function-overload set; the decl table lives on the symbol.
    OverloadSet {
        sym: SymRef,
        name: Name,
    },
    /// An imported package, usable on the left of a dot.
    Package {
        package: u32,
    },
    /// Template parameter placeholder during template checking.
    Typename {
        sym: SymRef,
        name: Name,
    },
    Texture {
        dim: TextureDim,
    },
    Sampler,
    SamplerState,
    Stream {
        kind: StreamKind,
    },
    /// Placeholder bound to a struct/enum symbol before completion.
    Incomplete {
        sym: SymRef,
        name: Name,
    },
    /// Placeholder while completion is in flight; hitting one again means
    /// the type depends on itself.
    Completing {
        sym: SymRef,
        name: Name,
    },
}

/// An interned type: payload plus template bookkeeping.
///
/// `template_args` holds the typename placeholders of a template base;
/// instantiations carry the base they came from in `template_base_type`
/// and their concrete arguments in `template_base_args`.
#[derive(Clone, Debug)]
pub struct Type {
    pub data: TypeData,
    pub template_args: Vec<TypeId>,
    pub template_base_type: Option<TypeId>,
    pub template_base_args: Vec<TypeId>,
}

impl Type {
    pub(crate) fn plain(data: TypeData) -> Self {
        Type {
            data,
            template_args: Vec::new(),
            template_base_type: None,
            template_base_args: Vec::new(),
        }
    }
}
