//! Expression typing.
//!
//! Every expression resolves to an interned type, an address mode, and,
//! when constant, a folded value. Results are memoized per expression id.

use crate::checker::Typer;
use crate::symbol::{AddressMode, SymbolKind};
use sabre_ir::{ast::Ident, BinaryOp, ExprId, ExprKind, Loc, Span, TypeSign, UnaryOp};
use sabre_types::{value, SymRef, TypeData, TypeId, Value};

const SWIZZLE_XYZW: [char; 4] = ['x', 'y', 'z', 'w'];
const SWIZZLE_RGBA: [char; 4] = ['r', 'g', 'b', 'a'];

/// Pick the swizzle style from the first character; mixing styles is
/// rejected later.
fn choose_swizzle_style(c: char) -> Option<&'static [char; 4]> {
    if SWIZZLE_XYZW.contains(&c) {
        return Some(&SWIZZLE_XYZW);
    }
    if SWIZZLE_RGBA.contains(&c) {
        return Some(&SWIZZLE_RGBA);
    }
    None
}

impl Typer<'_> {
    /// Resolve the type of an expression, memoizing the result.
    pub(crate) fn resolve_expr(&mut self, e: ExprId) -> TypeId {
        if let Some(t) = self.expr_type(e) {
            return t;
        }
        let expr = self.expr(e);
        let t = match expr.kind {
            ExprKind::IntLit(v) => {
                self.set_mode(e, AddressMode::Const);
                self.set_value(e, Value::Int(v));
                TypeId::LIT_INT
            }
            ExprKind::FloatLit(v) => {
                self.set_mode(e, AddressMode::Const);
                self.set_value(e, Value::Double(v));
                TypeId::LIT_FLOAT
            }
            ExprKind::BoolLit(v) => {
                self.set_mode(e, AddressMode::Const);
                self.set_value(e, Value::Bool(v));
                TypeId::BOOL
            }
            ExprKind::Ident(name) => self.resolve_atom_ident(e, name, expr.loc),
            ExprKind::Binary { op, op_span, lhs, rhs } => {
                self.resolve_binary_expr(e, op, op_span, lhs, rhs, expr.loc)
            }
            ExprKind::Unary { op, base } => self.resolve_unary_expr(e, op, base, expr.loc),
            ExprKind::Call { base, ref args } => {
                let args = args.clone();
                self.resolve_call_expr(e, base, &args, expr.loc)
            }
            ExprKind::Cast { base, ref sign } => {
                let sign = sign.clone();
                self.resolve_cast_expr(e, base, &sign, expr.loc)
            }
            ExprKind::Dot { lhs, field } => self.resolve_dot_expr(e, lhs, field, expr.loc),
            ExprKind::Indexed { base, index } => {
                self.resolve_indexed_expr(e, base, index, expr.loc)
            }
            ExprKind::Complit { ref sign, ref fields } => {
                let sign = sign.clone();
                let fields = fields.clone();
                self.resolve_complit_expr(e, &sign, &fields, expr.loc)
            }
        };
        self.pkg_mut().expr_types.insert(e, t);
        t
    }

    fn resolve_atom_ident(&mut self, e: ExprId, ident: Ident, loc: Loc) -> TypeId {
        let mut sym = self.find_symbol(ident.name);
        // Imports are only visible through the file scope of the usage
        // site.
        if sym.is_none() {
            if let Some(file_scope) = self.pkg().file_scope(loc.file) {
                sym = self
                    .pkg()
                    .scopes
                    .find(file_scope, ident.name)
                    .map(|id| self.sym_ref(id));
            }
        }

        let Some(sym) = sym else {
            let shown = self.unit.strings.lookup(ident.name);
            self.err(loc, format!("'{shown}' undefined symbol"));
            return TypeId::VOID;
        };

        self.pkg_mut().expr_symbols.insert(e, sym);
        self.resolve_symbol(sym);
        self.apply_symbol_usage(e, sym);
        self.unit.sym(sym).ty.unwrap_or(TypeId::VOID)
    }

    /// Address mode and constant value for an expression that names a
    /// symbol.
    pub(crate) fn apply_symbol_usage(&mut self, e: ExprId, sym: SymRef) {
        enum Usage {
            Const(Option<Value>),
            Var,
            Func(Option<TypeId>),
            Other,
        }
        let usage = match &self.unit.sym(sym).kind {
            SymbolKind::Const { folded, .. } => Usage::Const(folded.clone()),
            SymbolKind::Var { .. } => Usage::Var,
            SymbolKind::Func { .. } => Usage::Func(self.unit.sym(sym).ty),
            _ => Usage::Other,
        };
        match usage {
            Usage::Const(folded) => {
                if let Some(value) = folded {
                    self.set_value(e, value);
                }
                self.set_mode(e, AddressMode::Const);
            }
            Usage::Var => self.set_mode(e, AddressMode::Variable),
            Usage::Func(ty) => {
                if let Some(ty) = ty {
                    if self.func_return_type(ty) != TypeId::VOID {
                        self.set_mode(e, AddressMode::ComputedValue);
                    }
                }
            }
            Usage::Other => {}
        }
    }

    fn resolve_binary_expr(
        &mut self,
        e: ExprId,
        op: BinaryOp,
        op_span: Span,
        lhs: ExprId,
        rhs: ExprId,
        loc: Loc,
    ) -> TypeId {
        let lhs_type = self.resolve_expr(lhs);

        // An enum on the left becomes the expected type on the right so
        // `mode == .LINEAR` works.
        let rhs_type = if self.unit.types.is_enum(lhs_type) {
            self.with_expected(Some(lhs_type), |t| t.resolve_expr(rhs))
        } else {
            self.resolve_expr(rhs)
        };

        let lhs_loc = self.pkg().ast.expr(lhs).loc;
        let rhs_loc = self.pkg().ast.expr(rhs).loc;
        let op_loc = Loc::new(loc.file, op_span);

        let mut failed = false;

        // Matrix/vector multiplication needs matching widths.
        if op == BinaryOp::Mul {
            let lhs_mat = self.mat_width(lhs_type);
            let rhs_mat = self.mat_width(rhs_type);
            let lhs_vec = self.vec_parts(lhs_type);
            let rhs_vec = self.vec_parts(rhs_type);
            if let (Some(mat), Some((_, vec))) = (lhs_mat, rhs_vec) {
                if mat == vec {
                    self.finish_binary_modes(e, lhs, rhs, op);
                    return rhs_type;
                }
                let (a, b) = (self.display(lhs_type), self.display(rhs_type));
                self.err(loc, format!("width mismatch in multiply operation '{a}' * '{b}'"));
                failed = true;
            } else if let (Some((_, vec)), Some(mat)) = (lhs_vec, rhs_mat) {
                if vec == mat {
                    self.finish_binary_modes(e, lhs, rhs, op);
                    return lhs_type;
                }
                let (a, b) = (self.display(lhs_type), self.display(rhs_type));
                self.err(loc, format!("width mismatch in multiply operation '{a}' * '{b}'"));
                failed = true;
            }
        }

        // Vector/scalar arithmetic with matching bases.
        if op.is_arithmetic() {
            if let Some((base, _)) = self.vec_parts(lhs_type) {
                if self.unit.types.is_numeric_scalar(rhs_type) {
                    if self.unit.types.types_equal(base, rhs_type) {
                        self.finish_binary_modes(e, lhs, rhs, op);
                        return lhs_type;
                    }
                    let (a, b) = (self.display(lhs_type), self.display(rhs_type));
                    self.err(
                        loc,
                        format!(
                            "illegal binary operation on vector type, lhs is '{a}' and rhs is '{b}'"
                        ),
                    );
                    failed = true;
                }
            } else if let Some((base, _)) = self.vec_parts(rhs_type) {
                if self.unit.types.is_numeric_scalar(lhs_type) {
                    if self.unit.types.types_equal(base, lhs_type) {
                        self.finish_binary_modes(e, lhs, rhs, op);
                        return rhs_type;
                    }
                    let (a, b) = (self.display(lhs_type), self.display(rhs_type));
                    self.err(
                        loc,
                        format!(
                            "illegal binary operation on vector type, lhs is '{a}' and rhs is '{b}'"
                        ),
                    );
                    failed = true;
                }
            }
        }

        if op.is_bitwise() || op.is_shift() {
            if !self.unit.types.has_bit_ops(lhs_type) {
                let shown = self.display(lhs_type);
                self.err(lhs_loc, format!("type '{shown}' doesn't support bitwise operations"));
            }
            if !self.unit.types.has_bit_ops(rhs_type) {
                let shown = self.display(rhs_type);
                self.err(rhs_loc, format!("type '{shown}' doesn't support bitwise operations"));
            }
        } else if op.is_arithmetic() {
            if !self.unit.types.has_arithmetic(lhs_type) {
                let shown = self.display(lhs_type);
                self.err(lhs_loc, format!("type '{shown}' doesn't support arithmetic operations"));
            }
            if !self.unit.types.has_arithmetic(rhs_type) {
                let shown = self.display(rhs_type);
                self.err(rhs_loc, format!("type '{shown}' doesn't support arithmetic operations"));
            }
        }

        if !failed && !self.unit.types.types_equal(lhs_type, rhs_type) {
            let enum_int_mix = (self.unit.types.is_enum(lhs_type)
                && self.unit.types.types_equal(rhs_type, TypeId::INT))
                || (self.unit.types.is_enum(rhs_type)
                    && self.unit.types.types_equal(lhs_type, TypeId::INT));
            if enum_int_mix {
                // Enums and ints mix freely in binary expressions.
            } else if op.is_shift() {
                if !self.unit.types.has_bit_ops(rhs_type) {
                    let shown = self.display(rhs_type);
                    self.err(
                        rhs_loc,
                        format!("type '{shown}' cannot be used in a bitwise shift operation"),
                    );
                } else if self.unit.types.width(lhs_type) != self.unit.types.width(rhs_type) {
                    let (a, b) = (self.display(rhs_type), self.display(lhs_type));
                    self.err(
                        rhs_loc,
                        format!(
                            "type '{a}' is not compatible with '{b}' in a bitwise shift operation"
                        ),
                    );
                }
            } else {
                let (a, b) = (self.display(lhs_type), self.display(rhs_type));
                self.err(
                    loc,
                    format!("type mismatch in binary expression, lhs is '{a}' and rhs is '{b}'"),
                );
            }
        }

        if op.is_logical() {
            if !self.unit.types.is_bool_like(lhs_type) {
                let shown = self.display(lhs_type);
                self.err(
                    lhs_loc,
                    format!("logical operators only work on boolean types, but found '{shown}'"),
                );
            }
            if !self.unit.types.is_bool_like(rhs_type) {
                let shown = self.display(rhs_type);
                self.err(
                    rhs_loc,
                    format!("logical operators only work on boolean types, but found '{shown}'"),
                );
            }
        }

        if (self.unit.types.is_bool_like(lhs_type) || self.unit.types.is_bool_like(rhs_type))
            && !op.is_logical()
        {
            self.err(op_loc, "boolean types don't support such operator");
        }

        self.finish_binary_modes(e, lhs, rhs, op);

        if op.is_cmp() {
            if let Some((_, width)) = self.vec_parts(lhs_type) {
                return self.unit.types.vectorize(TypeId::BOOL, width);
            }
            if let Some((_, width)) = self.vec_parts(rhs_type) {
                return self.unit.types.vectorize(TypeId::BOOL, width);
            }
            return TypeId::BOOL;
        }

        // Untyped literals take the other side's type.
        if lhs_type == TypeId::LIT_INT || lhs_type == TypeId::LIT_FLOAT {
            rhs_type
        } else {
            lhs_type
        }
    }

    fn finish_binary_modes(&mut self, e: ExprId, lhs: ExprId, rhs: ExprId, op: BinaryOp) {
        if self.mode(lhs) == AddressMode::Const && self.mode(rhs) == AddressMode::Const {
            if let (Some(a), Some(b)) = (self.value(lhs), self.value(rhs)) {
                if let Some(folded) = value::fold_binary(&a, op, &b) {
                    self.set_value(e, folded);
                }
            }
            self.set_mode(e, AddressMode::Const);
        } else {
            self.set_mode(e, AddressMode::ComputedValue);
        }
    }

    fn resolve_unary_expr(&mut self, e: ExprId, op: UnaryOp, base: ExprId, loc: Loc) -> TypeId {
        let ty = self.resolve_expr(base);
        let base_loc = self.pkg().ast.expr(base).loc;

        match op {
            UnaryOp::Pos | UnaryOp::Neg => {
                if !self.unit.types.can_negate(ty) {
                    let shown = self.display(ty);
                    self.err(
                        base_loc,
                        format!(
                            "'{}' is only allowed for numeric types, but expression type is '{shown}'",
                            op.symbol()
                        ),
                    );
                }
            }
            UnaryOp::Inc | UnaryOp::Dec => {
                if !self.unit.types.can_increment(ty) {
                    let shown = self.display(ty);
                    self.err(
                        base_loc,
                        format!(
                            "'{}' is only allowed for numeric types, but expression type is '{shown}'",
                            op.symbol()
                        ),
                    );
                }
            }
            UnaryOp::Not => {
                if !self.unit.types.types_equal(ty, TypeId::BOOL) {
                    let shown = self.display(ty);
                    self.err(
                        base_loc,
                        format!(
                            "logical not operator is only allowed for boolean types, but expression type is '{shown}'"
                        ),
                    );
                }
            }
            UnaryOp::BitNot => {
                if !self.unit.types.has_bit_ops(ty) {
                    let shown = self.display(ty);
                    self.err(base_loc, format!("type '{shown}' cannot be used in a bit not operation"));
                }
            }
        }

        if self.mode(base) == AddressMode::Const
            && matches!(op, UnaryOp::Inc | UnaryOp::Dec)
        {
            self.err(loc, "cannot evaluate expression in compile time");
        }

        if let Some(base_value) = self.value(base) {
            if let Some(folded) = value::fold_unary(op, &base_value) {
                self.set_value(e, folded);
            }
        }

        if self.mode(base) == AddressMode::Const {
            self.set_mode(e, AddressMode::Const);
        } else {
            self.set_mode(e, AddressMode::ComputedValue);
        }
        ty
    }

    fn resolve_cast_expr(&mut self, e: ExprId, base: ExprId, sign: &TypeSign, loc: Loc) -> TypeId {
        let from = self.resolve_expr(base);
        let to = self.resolve_type_sign(sign, loc.file);

        let types = &self.unit.types;
        let scalars = types.is_numeric_scalar(from) && types.is_numeric_scalar(to);
        let vectors = match (self.vec_parts(from), self.vec_parts(to)) {
            (Some((from_base, from_width)), Some((to_base, to_width))) => {
                from_width == to_width
                    && self.unit.types.is_numeric_scalar(from_base)
                    && self.unit.types.is_numeric_scalar(to_base)
            }
            _ => false,
        };
        let enums = (self.unit.types.is_enum(from) && self.unit.types.is_numeric_scalar(to))
            || (self.unit.types.is_numeric_scalar(from) && self.unit.types.is_enum(to));

        if !(scalars || vectors || enums) {
            let (a, b) = (self.display(from), self.display(to));
            self.err(loc, format!("cannot cast '{a}' to '{b}'"));
        }

        // Casting preserves the constant value.
        if let Some(base_value) = self.value(base) {
            self.set_value(e, base_value);
        }
        let base_mode = self.mode(base);
        self.set_mode(e, base_mode);
        to
    }

    fn resolve_dot_expr(
        &mut self,
        e: ExprId,
        lhs: Option<ExprId>,
        field: Ident,
        loc: Loc,
    ) -> TypeId {
        let ty = match lhs {
            Some(lhs) => self.resolve_expr(lhs),
            // Omitted lhs takes its type from context (enum shorthand,
            // composite-literal selectors).
            None => match self.expected_expr_type() {
                Some(ty) => ty,
                None => {
                    self.err(
                        loc,
                        "we couldn't deduce lhs type of a dot expression from context, please provide it explicitly",
                    );
                    return TypeId::VOID;
                }
            },
        };
        let field_loc = Loc::new(loc.file, field.span);

        enum DotKind {
            Vec { base: TypeId, width: u32 },
            Struct { field_type: Option<TypeId>, sym: SymRef },
            Enum { value: Option<Option<Value>>, sym: SymRef },
            Package { package: u32 },
            Other,
        }
        let dot = match self.unit.types.data(ty) {
            TypeData::Vec { base, width } => DotKind::Vec { base: *base, width: *width },
            TypeData::Struct { sym, fields, fields_by_name, .. } => DotKind::Struct {
                field_type: fields_by_name.get(&field.name).map(|&i| fields[i].ty),
                sym: *sym,
            },
            TypeData::Enum { sym, fields, fields_by_name, .. } => DotKind::Enum {
                value: fields_by_name.get(&field.name).map(|&i| fields[i].value.clone()),
                sym: *sym,
            },
            TypeData::Package { package } => DotKind::Package { package: *package },
            _ => DotKind::Other,
        };

        match dot {
            DotKind::Vec { base, width } => self.resolve_swizzle(e, lhs, base, width, field, field_loc),
            DotKind::Struct { field_type, sym } => {
                let Some(field_type) = field_type else {
                    self.err(field_loc, "unknown structure field");
                    return TypeId::VOID;
                };
                if let Some(lhs) = lhs {
                    let mode = self.mode(lhs);
                    self.set_mode(e, mode);
                }
                self.pkg_mut().expr_symbols.insert(e, sym);
                field_type
            }
            DotKind::Enum { value, sym } => {
                let Some(value) = value else {
                    self.err(field_loc, "unknown enum field");
                    return TypeId::VOID;
                };
                match value {
                    Some(value) => {
                        self.set_mode(e, AddressMode::Const);
                        self.set_value(e, value);
                    }
                    None => self.err(loc, "enum field has no value yet"),
                }
                self.pkg_mut().expr_symbols.insert(e, sym);
                ty
            }
            DotKind::Package { package } => {
                let target = crate::unit::PackageId(package);
                let global = self.unit.pkg(target).global_scope;
                let Some(found) = self.unit.pkg(target).scopes.shallow_find(global, field.name)
                else {
                    self.err(field_loc, "undefined symbol");
                    return TypeId::VOID;
                };
                let found = SymRef { package, symbol: found.0 };
                if matches!(self.unit.sym(found).kind, SymbolKind::Package { .. }) {
                    self.err(field_loc, "you can't import a package from inside another package");
                }
                self.resolve_symbol(found);
                self.pkg_mut().expr_symbols.insert(e, found);
                self.apply_symbol_usage(e, found);
                self.unit.sym(found).ty.unwrap_or(TypeId::VOID)
            }
            DotKind::Other => {
                self.err(field_loc, "unknown structure field");
                TypeId::VOID
            }
        }
    }

    fn resolve_swizzle(
        &mut self,
        e: ExprId,
        lhs: Option<ExprId>,
        base: TypeId,
        width: u32,
        field: Ident,
        field_loc: Loc,
    ) -> TypeId {
        let text = self.unit.strings.lookup(field.name);
        let Some(first) = text.chars().next() else {
            self.err(field_loc, "illegal swizzle pattern");
            return TypeId::VOID;
        };
        let Some(style) = choose_swizzle_style(first) else {
            self.err(field_loc, "illegal swizzle pattern");
            return TypeId::VOID;
        };

        let mut outside_range = false;
        let mut illegal = false;
        let mut len = 0u32;
        for c in text.chars() {
            len += 1;
            outside_range |= !style[..width.min(4) as usize].contains(&c);
            illegal |= !style.contains(&c);
        }

        if illegal {
            self.err(field_loc, "illegal vector field");
            return TypeId::VOID;
        }
        if outside_range || len > 4 {
            self.err(field_loc, "vector field out of range");
            return TypeId::VOID;
        }

        if let Some(lhs) = lhs {
            let mode = self.mode(lhs);
            self.set_mode(e, mode);
        }
        self.unit.types.vectorize(base, len)
    }

    fn resolve_indexed_expr(&mut self, e: ExprId, base: ExprId, index: ExprId, loc: Loc) -> TypeId {
        let base_type = self.resolve_expr(base);
        if !self.unit.types.is_array(base_type) {
            let shown = self.display(base_type);
            self.err(loc, format!("type '{shown}' is not an array"));
            return base_type;
        }
        let (elem, count) = match self.unit.types.data(base_type) {
            TypeData::Array { base, count } => (*base, *count),
            _ => unreachable!(),
        };

        let index_type = self.resolve_expr(index);
        let index_loc = self.pkg().ast.expr(index).loc;
        if !self.unit.types.types_equal(index_type, TypeId::INT)
            && !self.unit.types.types_equal(index_type, TypeId::UINT)
        {
            let shown = self.display(index_type);
            self.err(
                index_loc,
                format!("array index type should be an int or uint, but we found '{shown}'"),
            );
            return elem;
        }

        if self.mode(index) == AddressMode::Const {
            if let Some(Value::Int(n)) = self.value(index) {
                if count >= 0 && n >= count {
                    self.err(
                        index_loc,
                        format!(
                            "array index out of range, array count is '{count}' but index is '{n}'"
                        ),
                    );
                }
            }
        }

        // Array elements are assignable unless the whole access is
        // constant.
        self.set_mode(e, AddressMode::Variable);
        if self.mode(base) == AddressMode::Const && self.mode(index) == AddressMode::Const {
            if let (Some(base_value), Some(Value::Int(n))) = (self.value(base), self.value(index)) {
                if matches!(base_value, Value::Aggregate(_)) && (count < 0 || n < count) && n >= 0 {
                    self.set_mode(e, AddressMode::Const);
                    if let Some(element) = base_value.aggregate_get(n as usize) {
                        self.set_value(e, element);
                    }
                }
            }
        }
        elem
    }

    // ===== Shared helpers =====

    pub(crate) fn vec_parts(&self, t: TypeId) -> Option<(TypeId, u32)> {
        match self.unit.types.data(t) {
            TypeData::Vec { base, width } => Some((*base, *width)),
            _ => None,
        }
    }

    pub(crate) fn mat_width(&self, t: TypeId) -> Option<u32> {
        match self.unit.types.data(t) {
            TypeData::Mat { width } => Some(*width),
            _ => None,
        }
    }

    /// The element type one level down, used as the expected type for
    /// positional composite-literal fields.
    pub(crate) fn peel_top_type(&self, t: TypeId) -> Option<TypeId> {
        match self.unit.types.data(t) {
            TypeData::Vec { base, .. } | TypeData::Array { base, .. } => Some(*base),
            _ => None,
        }
    }

    /// Whether the expression `rhs` can be assigned to a location of type
    /// `lhs`. Untyped literal values carry extra restrictions: negatives
    /// never fit unsigned types and fractional values never fit integers.
    pub(crate) fn can_assign(&self, lhs: TypeId, rhs: ExprId) -> bool {
        let Some(rhs_type) = self.expr_type(rhs) else {
            return false;
        };

        // A sampler slot accepts both samplers and sampler states.
        if self.unit.types.is_sampler(lhs)
            && (self.unit.types.is_sampler(rhs_type) || self.unit.types.is_sampler_state(rhs_type))
        {
            return true;
        }

        if !self.unit.types.types_equal(lhs, rhs_type) {
            return false;
        }

        let is_const = self.mode(rhs) == AddressMode::Const;
        if rhs_type == TypeId::LIT_INT {
            if lhs == TypeId::INT || lhs == TypeId::LIT_INT {
                true
            } else if lhs == TypeId::UINT {
                is_const
                    && match self.value(rhs) {
                        Some(v @ (Value::Int(_) | Value::Double(_))) => !v.is_negative(),
                        _ => false,
                    }
            } else {
                lhs == TypeId::FLOAT || lhs == TypeId::LIT_FLOAT || lhs == TypeId::DOUBLE
            }
        } else if rhs_type == TypeId::LIT_FLOAT {
            if lhs == TypeId::INT || lhs == TypeId::LIT_INT {
                is_const
                    && match self.value(rhs) {
                        Some(v @ (Value::Int(_) | Value::Double(_))) => !v.has_fraction(),
                        _ => false,
                    }
            } else if lhs == TypeId::UINT {
                is_const
                    && match self.value(rhs) {
                        Some(v @ (Value::Int(_) | Value::Double(_))) => {
                            !v.is_negative() && !v.has_fraction()
                        }
                        _ => false,
                    }
            } else {
                lhs == TypeId::FLOAT || lhs == TypeId::LIT_FLOAT || lhs == TypeId::DOUBLE
            }
        } else {
            true
        }
    }
}
