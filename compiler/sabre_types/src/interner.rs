//! The type interner.
//!
//! Canonical constructors for every compound type. Each constructor is
//! keyed on the structural signature of the type it builds, so calling a
//! constructor twice with the same inputs yields the same [`TypeId`], so
//! structural equality collapses to id equality.
//!
//! The interner also owns the template specialization tables: the
//! `(base, args)` instantiation memo and the cloned-decl memo for function
//! instantiations.

use crate::core::{
    EnumField, FuncSign, StreamKind, StructField, SymRef, TextureDim, Type, TypeData, TypeId,
};
use crate::Value;
use rustc_hash::FxHashMap;
use sabre_ir::{DeclId, Name, StringInterner};

/// Structural key for function types. Template bookkeeping participates in
/// identity so an instantiation of `id<T>` stays distinguishable from a
/// hand-written function with the same signature.
#[derive(Clone, Eq, PartialEq, Hash)]
struct FuncKey {
    args: Vec<TypeId>,
    ret: TypeId,
    templates: Vec<TypeId>,
    base: Option<TypeId>,
    base_args: Vec<TypeId>,
}

/// Interns every type of a compilation unit. Single-owner: the unit holds
/// it and a single typer mutates it at a time.
pub struct TypeInterner {
    types: Vec<Type>,
    vec_keys: FxHashMap<(TypeId, u32), TypeId>,
    mat_keys: FxHashMap<u32, TypeId>,
    array_keys: FxHashMap<(TypeId, i64), TypeId>,
    func_keys: FxHashMap<FuncKey, TypeId>,
    named_keys: FxHashMap<SymRef, TypeId>,
    overload_keys: FxHashMap<SymRef, TypeId>,
    package_keys: FxHashMap<u32, TypeId>,
    typename_keys: FxHashMap<SymRef, TypeId>,
    texture_keys: FxHashMap<TextureDim, TypeId>,
    stream_keys: FxHashMap<StreamKind, TypeId>,
    sampler: TypeId,
    sampler_state: TypeId,
    instantiations: FxHashMap<(TypeId, Vec<TypeId>), TypeId>,
    func_instantiation_decls: FxHashMap<(TypeId, Vec<TypeId>), (DeclId, SymRef)>,
}

impl TypeInterner {
    pub fn new() -> Self {
        let mut interner = TypeInterner {
            types: Vec::with_capacity(64),
            vec_keys: FxHashMap::default(),
            mat_keys: FxHashMap::default(),
            array_keys: FxHashMap::default(),
            func_keys: FxHashMap::default(),
            named_keys: FxHashMap::default(),
            overload_keys: FxHashMap::default(),
            package_keys: FxHashMap::default(),
            typename_keys: FxHashMap::default(),
            texture_keys: FxHashMap::default(),
            stream_keys: FxHashMap::default(),
            sampler: TypeId(0),
            sampler_state: TypeId(0),
            instantiations: FxHashMap::default(),
            func_instantiation_decls: FxHashMap::default(),
        };

        // Builtins in TypeId constant order.
        interner.alloc(Type::plain(TypeData::Void));
        interner.alloc(Type::plain(TypeData::Bool));
        interner.alloc(Type::plain(TypeData::Int));
        interner.alloc(Type::plain(TypeData::Uint));
        interner.alloc(Type::plain(TypeData::Float));
        interner.alloc(Type::plain(TypeData::Double));
        interner.alloc(Type::plain(TypeData::LitInt));
        interner.alloc(Type::plain(TypeData::LitFloat));
        interner.sampler = interner.alloc(Type::plain(TypeData::Sampler));
        interner.sampler_state = interner.alloc(Type::plain(TypeData::SamplerState));
        interner
    }

    fn alloc(&mut self, ty: Type) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    /// # Panics
    /// Panics if `id` was not produced by this interner.
    #[inline]
    pub fn ty(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    #[inline]
    pub fn data(&self, id: TypeId) -> &TypeData {
        &self.types[id.index()].data
    }

    // ===== Canonical constructors =====

    pub fn vec(&mut self, base: TypeId, width: u32) -> TypeId {
        if let Some(&id) = self.vec_keys.get(&(base, width)) {
            return id;
        }
        let id = self.alloc(Type::plain(TypeData::Vec { base, width }));
        self.vec_keys.insert((base, width), id);
        id
    }

    /// A vector of `base` with the given width; width 1 is the scalar
    /// itself (swizzles of length one produce scalars).
    pub fn vectorize(&mut self, base: TypeId, width: u32) -> TypeId {
        if width <= 1 {
            base
        } else {
            self.vec(base, width)
        }
    }

    pub fn mat(&mut self, width: u32) -> TypeId {
        if let Some(&id) = self.mat_keys.get(&width) {
            return id;
        }
        let id = self.alloc(Type::plain(TypeData::Mat { width }));
        self.mat_keys.insert(width, id);
        id
    }

    pub fn array(&mut self, base: TypeId, count: i64) -> TypeId {
        if let Some(&id) = self.array_keys.get(&(base, count)) {
            return id;
        }
        let id = self.alloc(Type::plain(TypeData::Array { base, count }));
        self.array_keys.insert((base, count), id);
        id
    }

    pub fn func(&mut self, sign: FuncSign, templates: Vec<TypeId>) -> TypeId {
        let key = FuncKey {
            args: sign.args.clone(),
            ret: sign.ret,
            templates: templates.clone(),
            base: None,
            base_args: Vec::new(),
        };
        if let Some(&id) = self.func_keys.get(&key) {
            return id;
        }
        let id = self.alloc(Type {
            data: TypeData::Func(sign),
            template_args: templates,
            template_base_type: None,
            template_base_args: Vec::new(),
        });
        self.func_keys.insert(key, id);
        id
    }

    /// Placeholder type for a struct/enum symbol, created before the body
    /// is examined so self-references are observable as cycles.
    pub fn incomplete(&mut self, sym: SymRef, name: Name) -> TypeId {
        if let Some(&id) = self.named_keys.get(&sym) {
            return id;
        }
        let id = self.alloc(Type::plain(TypeData::Incomplete { sym, name }));
        self.named_keys.insert(sym, id);
        id
    }

    /// Transition an `Incomplete` placeholder to `Completing`.
    pub fn begin_completing(&mut self, id: TypeId) {
        let ty = &mut self.types[id.index()];
        if let TypeData::Incomplete { sym, name } = ty.data {
            ty.data = TypeData::Completing { sym, name };
        }
    }

    /// Fill the fields of a struct placeholder in place; the id is stable
    /// across completion.
    pub fn complete_struct(
        &mut self,
        id: TypeId,
        fields: Vec<StructField>,
        fields_by_name: FxHashMap<Name, usize>,
        template_args: Vec<TypeId>,
    ) {
        let (sym, name) = match self.types[id.index()].data {
            TypeData::Incomplete { sym, name } | TypeData::Completing { sym, name } => (sym, name),
            _ => return,
        };
        let ty = &mut self.types[id.index()];
        ty.data = TypeData::Struct { sym, name, fields, fields_by_name };
        ty.template_args = template_args;
    }

    /// Fill the fields of an enum placeholder in place.
    pub fn complete_enum(
        &mut self,
        id: TypeId,
        fields: Vec<EnumField>,
        fields_by_name: FxHashMap<Name, usize>,
    ) {
        let (sym, name) = match self.types[id.index()].data {
            TypeData::Incomplete { sym, name } | TypeData::Completing { sym, name } => (sym, name),
            _ => return,
        };
        self.types[id.index()].data = TypeData::Enum { sym, name, fields, fields_by_name };
    }

    pub fn set_enum_field_value(&mut self, id: TypeId, field: usize, value: Value) {
        if let TypeData::Enum { fields, .. } = &mut self.types[id.index()].data {
            fields[field].value = Some(value);
        }
    }

    pub fn overload_set(&mut self, sym: SymRef, name: Name) -> TypeId {
        if let Some(&id) = self.overload_keys.get(&sym) {
            return id;
        }
        let id = self.alloc(Type::plain(TypeData::OverloadSet { sym, name }));
        self.overload_keys.insert(sym, id);
        id
    }

    pub fn package(&mut self, package: u32) -> TypeId {
        if let Some(&id) = self.package_keys.get(&package) {
            return id;
        }
        let id = self.alloc(Type::plain(TypeData::Package { package }));
        self.package_keys.insert(package, id);
        id
    }

    pub fn typename(&mut self, sym: SymRef, name: Name) -> TypeId {
        if let Some(&id) = self.typename_keys.get(&sym) {
            return id;
        }
        let id = self.alloc(Type::plain(TypeData::Typename { sym, name }));
        self.typename_keys.insert(sym, id);
        id
    }

    pub fn texture(&mut self, dim: TextureDim) -> TypeId {
        if let Some(&id) = self.texture_keys.get(&dim) {
            return id;
        }
        let id = self.alloc(Type::plain(TypeData::Texture { dim }));
        self.texture_keys.insert(dim, id);
        id
    }

    pub fn stream(&mut self, kind: StreamKind) -> TypeId {
        if let Some(&id) = self.stream_keys.get(&kind) {
            return id;
        }
        let id = self.alloc(Type::plain(TypeData::Stream { kind }));
        self.stream_keys.insert(kind, id);
        id
    }

    pub fn sampler(&self) -> TypeId {
        self.sampler
    }

    pub fn sampler_state(&self) -> TypeId {
        self.sampler_state
    }

    /// Resolve a builtin type name (`float`, `vec3`, `texture2d`, ...).
    pub fn builtin_from_name(&mut self, name: &str) -> Option<TypeId> {
        let id = match name {
            "void" => TypeId::VOID,
            "bool" => TypeId::BOOL,
            "int" => TypeId::INT,
            "uint" => TypeId::UINT,
            "float" => TypeId::FLOAT,
            "double" => TypeId::DOUBLE,
            "vec2" => self.vec(TypeId::FLOAT, 2),
            "vec3" => self.vec(TypeId::FLOAT, 3),
            "vec4" => self.vec(TypeId::FLOAT, 4),
            "ivec2" => self.vec(TypeId::INT, 2),
            "ivec3" => self.vec(TypeId::INT, 3),
            "ivec4" => self.vec(TypeId::INT, 4),
            "uvec2" => self.vec(TypeId::UINT, 2),
            "uvec3" => self.vec(TypeId::UINT, 3),
            "uvec4" => self.vec(TypeId::UINT, 4),
            "dvec2" => self.vec(TypeId::DOUBLE, 2),
            "dvec3" => self.vec(TypeId::DOUBLE, 3),
            "dvec4" => self.vec(TypeId::DOUBLE, 4),
            "bvec2" => self.vec(TypeId::BOOL, 2),
            "bvec3" => self.vec(TypeId::BOOL, 3),
            "bvec4" => self.vec(TypeId::BOOL, 4),
            "mat2" => self.mat(2),
            "mat3" => self.mat(3),
            "mat4" => self.mat(4),
            "texture1d" => self.texture(TextureDim::D1),
            "texture2d" => self.texture(TextureDim::D2),
            "texture3d" => self.texture(TextureDim::D3),
            "texture_cube" => self.texture(TextureDim::Cube),
            "sampler" => self.sampler,
            "sampler_state" => self.sampler_state,
            "point_stream" => self.stream(StreamKind::Point),
            "line_stream" => self.stream(StreamKind::Line),
            "triangle_stream" => self.stream(StreamKind::Triangle),
            _ => return None,
        };
        Some(id)
    }

    // ===== Classification =====

    /// Structural equality. Untyped literal types compare equal to every
    /// numeric scalar; value-level restrictions (sign, fraction) are the
    /// assignability check's concern.
    pub fn types_equal(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        let is_lit = |t: TypeId| t == TypeId::LIT_INT || t == TypeId::LIT_FLOAT;
        (is_lit(a) && self.is_numeric_scalar(b)) || (is_lit(b) && self.is_numeric_scalar(a))
    }

    pub fn is_numeric_scalar(&self, t: TypeId) -> bool {
        matches!(
            self.data(t),
            TypeData::Int
                | TypeData::Uint
                | TypeData::Float
                | TypeData::Double
                | TypeData::LitInt
                | TypeData::LitFloat
        )
    }

    pub fn has_bit_ops(&self, t: TypeId) -> bool {
        matches!(self.data(t), TypeData::Int | TypeData::Uint | TypeData::LitInt)
    }

    pub fn has_arithmetic(&self, t: TypeId) -> bool {
        self.is_numeric_scalar(t) || matches!(self.data(t), TypeData::Vec { .. } | TypeData::Mat { .. })
    }

    pub fn can_negate(&self, t: TypeId) -> bool {
        self.has_arithmetic(t)
    }

    pub fn can_increment(&self, t: TypeId) -> bool {
        self.is_numeric_scalar(t) || matches!(self.data(t), TypeData::Vec { .. })
    }

    pub fn is_bool_like(&self, t: TypeId) -> bool {
        match self.data(t) {
            TypeData::Bool => true,
            TypeData::Vec { base, .. } => *base == TypeId::BOOL,
            _ => false,
        }
    }

    pub fn is_vec(&self, t: TypeId) -> bool {
        matches!(self.data(t), TypeData::Vec { .. })
    }

    pub fn is_mat(&self, t: TypeId) -> bool {
        matches!(self.data(t), TypeData::Mat { .. })
    }

    pub fn is_array(&self, t: TypeId) -> bool {
        matches!(self.data(t), TypeData::Array { .. })
    }

    pub fn is_unbounded_array(&self, t: TypeId) -> bool {
        matches!(self.data(t), TypeData::Array { count: -1, .. })
    }

    pub fn is_bounded_array(&self, t: TypeId) -> bool {
        matches!(self.data(t), TypeData::Array { count, .. } if *count >= 0)
    }

    pub fn is_struct(&self, t: TypeId) -> bool {
        matches!(self.data(t), TypeData::Struct { .. })
    }

    pub fn is_enum(&self, t: TypeId) -> bool {
        matches!(self.data(t), TypeData::Enum { .. })
    }

    pub fn is_func(&self, t: TypeId) -> bool {
        matches!(self.data(t), TypeData::Func { .. } | TypeData::OverloadSet { .. })
    }

    pub fn is_sampler(&self, t: TypeId) -> bool {
        matches!(self.data(t), TypeData::Sampler)
    }

    pub fn is_sampler_state(&self, t: TypeId) -> bool {
        matches!(self.data(t), TypeData::SamplerState)
    }

    pub fn is_texture(&self, t: TypeId) -> bool {
        matches!(self.data(t), TypeData::Texture { .. })
    }

    pub fn is_stream(&self, t: TypeId) -> bool {
        matches!(self.data(t), TypeData::Stream { .. })
    }

    pub fn is_typename(&self, t: TypeId) -> bool {
        matches!(self.data(t), TypeData::Typename { .. })
    }

    /// Scalar types legal inside a uniform block.
    pub fn is_uniform_scalar(&self, t: TypeId) -> bool {
        self.is_numeric_scalar(t)
            || matches!(self.data(t), TypeData::Bool | TypeData::Vec { .. } | TypeData::Mat { .. })
    }

    /// Bit width used by shift-compatibility checks.
    pub fn width(&self, t: TypeId) -> u32 {
        match self.data(t) {
            TypeData::Bool => 1,
            TypeData::Int | TypeData::Uint | TypeData::Float => 32,
            TypeData::Double | TypeData::LitInt | TypeData::LitFloat => 64,
            TypeData::Vec { base, width } => self.width(*base) * width,
            TypeData::Mat { width } => width * width * 32,
            _ => 0,
        }
    }

    /// Whether the type still mentions template placeholders: either it is
    /// a template base, or an instantiation whose arguments are not all
    /// concrete yet.
    pub fn is_templated(&self, t: TypeId) -> bool {
        let ty = self.ty(t);
        if !ty.template_args.is_empty() {
            return true;
        }
        ty.template_base_args.iter().any(|&a| self.contains_typename(a))
    }

    pub fn contains_typename(&self, t: TypeId) -> bool {
        let ty = self.ty(t);
        if ty.template_base_args.iter().any(|&a| self.contains_typename(a)) {
            return true;
        }
        match &ty.data {
            TypeData::Typename { .. } => true,
            TypeData::Vec { base, .. } | TypeData::Array { base, .. } => {
                self.contains_typename(*base)
            }
            TypeData::Func(sign) => {
                sign.args.iter().any(|&a| self.contains_typename(a))
                    || self.contains_typename(sign.ret)
            }
            _ => false,
        }
    }

    // ===== Template instantiation =====

    /// Substitute `args` for `base`'s typename placeholders through every
    /// referenced type, recursively. Memoized on `(base, args)`. Types
    /// minted by this call (and not by an earlier one) are appended to
    /// `newly_instantiated`.
    pub fn template_instantiate(
        &mut self,
        base: TypeId,
        args: &[TypeId],
        newly_instantiated: &mut Vec<TypeId>,
    ) -> TypeId {
        let key = (base, args.to_vec());
        if let Some(&id) = self.instantiations.get(&key) {
            return id;
        }

        let template_args = self.ty(base).template_args.clone();
        let mut map = FxHashMap::default();
        for (&param, &arg) in template_args.iter().zip(args.iter()) {
            map.insert(param, arg);
        }

        let id = self.instantiate_with(base, args, &map, newly_instantiated);
        self.instantiations.insert(key, id);
        id
    }

    fn instantiate_with(
        &mut self,
        base: TypeId,
        args: &[TypeId],
        map: &FxHashMap<TypeId, TypeId>,
        newly: &mut Vec<TypeId>,
    ) -> TypeId {
        match self.ty(base).data.clone() {
            TypeData::Struct { sym, name, fields, fields_by_name } => {
                let new_fields: Vec<StructField> = fields
                    .into_iter()
                    .map(|f| StructField {
                        name: f.name,
                        ty: self.substitute(f.ty, map, newly),
                        default_value: f.default_value,
                    })
                    .collect();
                let id = self.alloc(Type {
                    data: TypeData::Struct { sym, name, fields: new_fields, fields_by_name },
                    template_args: Vec::new(),
                    template_base_type: Some(base),
                    template_base_args: args.to_vec(),
                });
                newly.push(id);
                id
            }
            TypeData::Func(sign) => {
                let new_sign = FuncSign {
                    args: sign.args.iter().map(|&a| self.substitute(a, map, newly)).collect(),
                    ret: self.substitute(sign.ret, map, newly),
                };
                let key = FuncKey {
                    args: new_sign.args.clone(),
                    ret: new_sign.ret,
                    templates: Vec::new(),
                    base: Some(base),
                    base_args: args.to_vec(),
                };
                if let Some(&id) = self.func_keys.get(&key) {
                    return id;
                }
                let id = self.alloc(Type {
                    data: TypeData::Func(new_sign),
                    template_args: Vec::new(),
                    template_base_type: Some(base),
                    template_base_args: args.to_vec(),
                });
                self.func_keys.insert(key, id);
                newly.push(id);
                id
            }
            // Non-template payloads have nothing to substitute.
            _ => base,
        }
    }

    fn substitute(
        &mut self,
        t: TypeId,
        map: &FxHashMap<TypeId, TypeId>,
        newly: &mut Vec<TypeId>,
    ) -> TypeId {
        if let Some(&mapped) = map.get(&t) {
            return mapped;
        }

        // An instantiation of another template: re-instantiate it with its
        // own arguments substituted.
        if let Some(inner_base) = self.ty(t).template_base_type {
            let old_args = self.ty(t).template_base_args.clone();
            let new_args: Vec<TypeId> =
                old_args.iter().map(|&a| self.substitute(a, map, newly)).collect();
            if new_args == old_args {
                return t;
            }
            return self.template_instantiate(inner_base, &new_args, newly);
        }

        match self.ty(t).data.clone() {
            TypeData::Vec { base, width } => {
                let new_base = self.substitute(base, map, newly);
                if new_base == base {
                    t
                } else {
                    self.vec(new_base, width)
                }
            }
            TypeData::Array { base, count } => {
                let new_base = self.substitute(base, map, newly);
                if new_base == base {
                    t
                } else {
                    self.array(new_base, count)
                }
            }
            TypeData::Func(sign) => {
                let new_args: Vec<TypeId> =
                    sign.args.iter().map(|&a| self.substitute(a, map, newly)).collect();
                let new_ret = self.substitute(sign.ret, map, newly);
                if new_args == sign.args && new_ret == sign.ret {
                    t
                } else {
                    let leftover: Vec<TypeId> = self
                        .ty(t)
                        .template_args
                        .iter()
                        .copied()
                        .filter(|p| !map.contains_key(p))
                        .collect();
                    self.func(FuncSign { args: new_args, ret: new_ret }, leftover)
                }
            }
            _ => t,
        }
    }

    /// Memoized AST clone for a function instantiation.
    pub fn find_func_instantiation_decl(
        &self,
        base: TypeId,
        args: &[TypeId],
    ) -> Option<(DeclId, SymRef)> {
        self.func_instantiation_decls.get(&(base, args.to_vec())).copied()
    }

    pub fn add_func_instantiation_decl(
        &mut self,
        base: TypeId,
        args: &[TypeId],
        decl: DeclId,
        sym: SymRef,
    ) {
        self.func_instantiation_decls.insert((base, args.to_vec()), (decl, sym));
    }

    // ===== Display =====

    /// Human-readable type name for diagnostics.
    pub fn display(&self, t: TypeId, strings: &StringInterner) -> String {
        let ty = self.ty(t);
        if let Some(base) = ty.template_base_type {
            // Instantiations print as `Base<args>`.
            let args: Vec<String> = ty
                .template_base_args
                .iter()
                .map(|&a| self.display(a, strings))
                .collect();
            if let TypeData::Func(_) = ty.data {
                // Instantiated functions print their signature below.
            } else {
                return format!("{}<{}>", self.display(base, strings), args.join(", "));
            }
        }
        match &ty.data {
            TypeData::Void => "void".to_string(),
            TypeData::Bool => "bool".to_string(),
            TypeData::Int => "int".to_string(),
            TypeData::Uint => "uint".to_string(),
            TypeData::Float => "float".to_string(),
            TypeData::Double => "double".to_string(),
            TypeData::LitInt => "untyped int".to_string(),
            TypeData::LitFloat => "untyped float".to_string(),
            TypeData::Vec { base, width } => {
                let prefix = match self.data(*base) {
                    TypeData::Int => "ivec",
                    TypeData::Uint => "uvec",
                    TypeData::Double => "dvec",
                    TypeData::Bool => "bvec",
                    _ => "vec",
                };
                format!("{prefix}{width}")
            }
            TypeData::Mat { width } => format!("mat{width}"),
            TypeData::Array { base, count } => {
                if *count < 0 {
                    format!("[]{}", self.display(*base, strings))
                } else {
                    format!("[{count}]{}", self.display(*base, strings))
                }
            }
            TypeData::Struct { name, .. }
            | TypeData::Enum { name, .. }
            | TypeData::Incomplete { name, .. }
            | TypeData::Completing { name, .. }
            | TypeData::Typename { name, .. } => strings.lookup(*name).to_string(),
            TypeData::Func(sign) => {
                let args: Vec<String> =
                    sign.args.iter().map(|&a| self.display(a, strings)).collect();
                if sign.ret == TypeId::VOID {
                    format!("func({})", args.join(", "))
                } else {
                    format!("func({}): {}", args.join(", "), self.display(sign.ret, strings))
                }
            }
            TypeData::OverloadSet { name, .. } => {
                format!("overload set '{}'", strings.lookup(*name))
            }
            TypeData::Package { .. } => "package".to_string(),
            TypeData::Texture { dim } => dim.type_name().to_string(),
            TypeData::Sampler => "sampler".to_string(),
            TypeData::SamplerState => "sampler_state".to_string(),
            TypeData::Stream { kind } => kind.type_name().to_string(),
        }
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_match_constants() {
        let interner = TypeInterner::new();
        assert!(matches!(interner.data(TypeId::VOID), TypeData::Void));
        assert!(matches!(interner.data(TypeId::LIT_FLOAT), TypeData::LitFloat));
    }

    #[test]
    fn structural_equality_is_id_equality() {
        let mut interner = TypeInterner::new();
        let v3a = interner.vec(TypeId::FLOAT, 3);
        let v3b = interner.vec(TypeId::FLOAT, 3);
        assert_eq!(v3a, v3b);

        let arr_a = interner.array(v3a, 4);
        let arr_b = interner.array(v3b, 4);
        assert_eq!(arr_a, arr_b);
        assert_ne!(arr_a, interner.array(v3a, 5));

        let f_a = interner.func(FuncSign { args: vec![TypeId::INT], ret: TypeId::INT }, vec![]);
        let f_b = interner.func(FuncSign { args: vec![TypeId::INT], ret: TypeId::INT }, vec![]);
        assert_eq!(f_a, f_b);
    }

    #[test]
    fn lit_types_coerce_in_equality() {
        let mut interner = TypeInterner::new();
        assert!(interner.types_equal(TypeId::LIT_INT, TypeId::UINT));
        assert!(interner.types_equal(TypeId::FLOAT, TypeId::LIT_FLOAT));
        assert!(!interner.types_equal(TypeId::LIT_INT, TypeId::BOOL));
        let v2 = interner.vec(TypeId::FLOAT, 2);
        assert!(!interner.types_equal(TypeId::LIT_FLOAT, v2));
    }

    #[test]
    fn vectorize_width_one_is_scalar() {
        let mut interner = TypeInterner::new();
        assert_eq!(interner.vectorize(TypeId::FLOAT, 1), TypeId::FLOAT);
        assert_eq!(interner.vectorize(TypeId::FLOAT, 3), interner.vec(TypeId::FLOAT, 3));
    }

    #[test]
    fn func_instantiation_is_memoized() {
        let mut interner = TypeInterner::new();
        let sym = SymRef { package: 0, symbol: 0 };
        let tn = interner.typename(sym, Name::EMPTY);
        let base = interner.func(FuncSign { args: vec![tn], ret: tn }, vec![tn]);

        let mut newly = Vec::new();
        let inst_int = interner.template_instantiate(base, &[TypeId::INT], &mut newly);
        assert_eq!(newly.len(), 1);
        match interner.data(inst_int) {
            TypeData::Func(sign) => {
                assert_eq!(sign.args, vec![TypeId::INT]);
                assert_eq!(sign.ret, TypeId::INT);
            }
            other => panic!("expected function type, got {other:?}"),
        }
        assert!(!interner.is_templated(inst_int));

        newly.clear();
        let again = interner.template_instantiate(base, &[TypeId::INT], &mut newly);
        assert_eq!(again, inst_int);
        assert!(newly.is_empty());

        let inst_float = interner.template_instantiate(base, &[TypeId::FLOAT], &mut newly);
        assert_ne!(inst_float, inst_int);
    }
}
