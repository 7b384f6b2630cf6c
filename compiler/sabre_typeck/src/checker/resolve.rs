//! Kind-specific declaration resolution.

use crate::checker::Typer;
use crate::scope::{ScopeFlags, ScopeOwner};
use crate::symbol::{AddressMode, Symbol, SymbolId, SymbolKind, SymbolState};
use rustc_hash::FxHashMap;
use sabre_ir::{ast::Ident, DeclId, DeclKind, FileId, Loc, Name, StmtKind, TypeSign, TypeSignAtom};
use sabre_types::{EnumField, FuncSign, StructField, SymRef, TypeData, TypeId, Value};

impl Typer<'_> {
    // ===== Constants and variables =====

    pub(crate) fn resolve_const(&mut self, id: SymbolId) -> TypeId {
        let (sign, value) = match &self.pkg().sym(id).kind {
            SymbolKind::Const { sign, value, .. } => (sign.clone(), *value),
            _ => unreachable!("resolve_const on a non-const symbol"),
        };
        let file = self.pkg().sym(id).file;
        let sym_loc = self.pkg().sym(id).loc();

        let infer = sign.is_empty();
        let mut res = TypeId::VOID;
        let mut expected = None;
        if !infer {
            res = self.resolve_type_sign(&sign, file);
            expected = Some(res);
        }

        match value {
            Some(init) => {
                let expr_type = self.with_expected(expected, |t| t.resolve_expr(init));
                let init_loc = self.pkg().ast.expr(init).loc;
                if infer {
                    res = expr_type;
                } else {
                    res = self.complete_unbounded(res, expr_type);
                    if !self.can_assign(res, init) {
                        let expected_shown = self.display(res);
                        let found = self.display(expr_type);
                        self.err(
                            init_loc,
                            format!("type mismatch expected '{expected_shown}' but found '{found}'"),
                        );
                    }
                }

                let folded = self.value(init);
                if folded.is_none() {
                    self.err(init_loc, "expression cannot be evaluated in compile time");
                }
                if let SymbolKind::Const { folded: slot, .. } = &mut self.pkg_mut().sym_mut(id).kind
                {
                    *slot = folded;
                }
            }
            None => {
                if infer {
                    self.err(sym_loc, "no expression to infer the type of the constant from");
                }
            }
        }
        res
    }

    pub(crate) fn resolve_var(&mut self, id: SymbolId) -> TypeId {
        let (sign, value) = match &self.pkg().sym(id).kind {
            SymbolKind::Var { sign, value, .. } => (sign.clone(), *value),
            _ => unreachable!("resolve_var on a non-var symbol"),
        };
        let file = self.pkg().sym(id).file;
        let sym_loc = self.pkg().sym(id).loc();

        let infer = sign.is_empty();
        let mut res = TypeId::VOID;
        let mut expected = None;
        if !infer {
            res = self.resolve_type_sign(&sign, file);
            expected = Some(res);
        }

        match value {
            Some(init) => {
                let expr_type = self.with_expected(expected, |t| t.resolve_expr(init));
                let init_loc = self.pkg().ast.expr(init).loc;
                if infer {
                    res = expr_type;
                } else {
                    res = self.complete_unbounded(res, expr_type);
                    if !self.can_assign(res, init) {
                        let expected_shown = self.display(res);
                        let found = self.display(expr_type);
                        self.err(
                            init_loc,
                            format!("type mismatch expected '{expected_shown}' but found '{found}'"),
                        );
                    }
                }
            }
            None => {
                if infer {
                    self.err(sym_loc, "no expression to infer the type of the variable from");
                }
            }
        }

        // `@uniform` variables must have uniform-legal types and get
        // registered for binding assignment.
        let decl = self.pkg().sym(id).decl();
        if let Some(decl) = decl {
            let uniform = self.unit.keywords.uniform;
            if self.pkg().ast.decl(decl).tags.has(uniform) {
                if self.check_uniform_suitable(res, 0) {
                    if let SymbolKind::Var { is_uniform, .. } = &mut self.pkg_mut().sym_mut(id).kind
                    {
                        *is_uniform = true;
                    }
                    let sym = self.sym_ref(id);
                    self.unit.all_uniforms.push(sym);
                } else {
                    let shown = self.display(res);
                    self.err(
                        sym_loc,
                        format!(
                            "uniform variable type '{shown}' contains types which cannot be used in a uniform"
                        ),
                    );
                }
            }
        }
        res
    }

    /// A declared unbounded array completes from a bounded initializer.
    fn complete_unbounded(&self, declared: TypeId, found: TypeId) -> TypeId {
        let types = &self.unit.types;
        if types.is_unbounded_array(declared) && types.is_bounded_array(found) {
            let (TypeData::Array { base: a, .. }, TypeData::Array { base: b, .. }) =
                (types.data(declared), types.data(found))
            else {
                return declared;
            };
            if types.types_equal(*a, *b) {
                return found;
            }
        }
        declared
    }

    // ===== Functions =====

    /// Build a function declaration's type: typename symbols for template
    /// parameters, argument and return types, and the argument symbols in
    /// the function's own scope. Memoized per declaration.
    pub(crate) fn resolve_func_decl(&mut self, decl_id: DeclId) -> TypeId {
        if let Some(&t) = self.pkg().decl_types.get(&decl_id) {
            return t;
        }
        let decl = self.decl(decl_id);
        let DeclKind::Func { name, templates, params, return_sign, .. } = decl.kind else {
            unreachable!("resolve_func_decl on a non-function declaration");
        };
        let file = decl.loc.file;

        let scope = self.create_scope_for(
            ScopeOwner::Decl(decl_id),
            self.current_scope(),
            name.name,
            None,
            ScopeFlags::NONE,
        );
        let func_type = self.with_scope(scope, |t| {
            let template_args = t.declare_typenames(&templates, file);

            let mut args = Vec::new();
            let mut param_types = Vec::new();
            for param in &params {
                let arg_type = t.resolve_type_sign(&param.sign, file);
                param_types.push(arg_type);
                for _ in &param.names {
                    args.push(arg_type);
                }
            }
            let ret = t.resolve_type_sign(&return_sign, file);
            let func_type = t.unit.types.func(FuncSign { args, ret }, template_args);

            t.pkg_mut().scopes.get_mut(scope).expected_type = Some(ret);

            for (param, &arg_type) in params.iter().zip(&param_types) {
                for pname in &param.names {
                    t.add_param_symbol(*pname, file, param.sign.clone(), arg_type);
                }
            }
            func_type
        });

        self.pkg_mut().decl_types.insert(decl_id, func_type);
        func_type
    }

    /// Typename symbols for template parameters, added to the current
    /// scope; returns their placeholder types.
    pub(crate) fn declare_typenames(&mut self, templates: &[Ident], file: FileId) -> Vec<TypeId> {
        let mut template_args = Vec::new();
        for tname in templates {
            let mut sym = Symbol::new(*tname, file, self.pkg, SymbolKind::Typename);
            sym.state = SymbolState::Resolved;
            let id = self.pkg_mut().add_symbol_entry(sym);
            let sref = self.sym_ref(id);
            let ty = self.unit.types.typename(sref, tname.name);
            self.pkg_mut().sym_mut(id).ty = Some(ty);
            self.add_symbol_at(id, self.current_scope());
            template_args.push(ty);
        }
        template_args
    }

    /// A resolved function-argument symbol in the current scope.
    pub(crate) fn add_param_symbol(
        &mut self,
        name: Ident,
        file: FileId,
        sign: TypeSign,
        ty: TypeId,
    ) -> SymbolId {
        let mut sym = Symbol::new(
            name,
            file,
            self.pkg,
            SymbolKind::Var {
                decl: None,
                sign,
                value: None,
                is_uniform: false,
                binding: None,
                binding_processed: false,
            },
        );
        sym.state = SymbolState::Resolved;
        sym.ty = Some(ty);
        let id = self.pkg_mut().add_symbol_entry(sym);
        self.add_symbol_at(id, self.current_scope())
    }

    /// Check a function body in the declaration's own scope. Deferred
    /// until after the type is resolved so recursion works.
    pub(crate) fn resolve_func_body(&mut self, decl_id: DeclId, ty: TypeId) {
        let name = match &self.pkg().ast.decl(decl_id).kind {
            DeclKind::Func { name, .. } => name.name,
            _ => Name::EMPTY,
        };
        let ret = self.func_return_type(ty);
        let scope = self.create_scope_for(
            ScopeOwner::Decl(decl_id),
            self.current_scope(),
            name,
            Some(ret),
            ScopeFlags::NONE,
        );
        self.resolve_func_body_in_scope(decl_id, ty, scope);
    }

    pub(crate) fn func_return_type(&self, ty: TypeId) -> TypeId {
        match self.unit.types.data(ty) {
            TypeData::Func(sign) => sign.ret,
            _ => TypeId::VOID,
        }
    }

    pub(crate) fn resolve_func_body_in_scope(
        &mut self,
        decl_id: DeclId,
        ty: TypeId,
        scope: crate::scope::ScopeId,
    ) {
        // Template bodies are only checked per instantiation.
        if self.unit.types.is_templated(ty) {
            return;
        }
        let decl = self.decl(decl_id);
        let DeclKind::Func { body: Some(body), .. } = decl.kind else {
            return;
        };

        self.with_scope(scope, |t| {
            t.with_func(decl_id, |t| {
                // Body statements run in the function scope itself so
                // local declarations shadow arguments directly.
                let StmtKind::Block(stmts) = t.stmt(body).kind else {
                    return;
                };
                for stmt in stmts {
                    t.resolve_stmt(stmt);
                }

                let ret = t.func_return_type(ty);
                if ret != TypeId::VOID {
                    let info = t.stmt_terminates(body);
                    if !info.will_return {
                        let msg = info.msg;
                        t.err(
                            info.loc,
                            format!("missing return at the end of the function because {msg}"),
                        );
                    }
                }
            });
        });
    }

    // ===== Overload sets =====

    /// Resolve every declaration of an overload set in its owning file
    /// scope (imports visible). Iterates a snapshot: registering further
    /// overloads while resolving cannot invalidate the walk.
    pub(crate) fn resolve_overload_set(&mut self, id: SymbolId) -> TypeId {
        let sref = self.sym_ref(id);
        let name = self.pkg().sym(id).name.name;
        let set_type = self.unit.types.overload_set(sref, name);

        let snapshot: Vec<DeclId> = match &self.pkg().sym(id).kind {
            SymbolKind::OverloadSet { decls } => decls.iter().map(|(d, _)| *d).collect(),
            _ => unreachable!("resolve_overload_set on a non-overload-set symbol"),
        };

        let mut seen: Vec<(Vec<TypeId>, DeclId)> = Vec::new();
        for decl_id in snapshot {
            let file = self.pkg().ast.decl(decl_id).loc.file;
            let file_scope = self.pkg().file_scope(file).unwrap_or(self.pkg().global_scope);
            let decl_type = self.with_scope(file_scope, |t| t.resolve_func_decl(decl_id));

            if let SymbolKind::OverloadSet { decls } = &mut self.pkg_mut().sym_mut(id).kind {
                for entry in decls.iter_mut() {
                    if entry.0 == decl_id {
                        entry.1 = Some(decl_type);
                    }
                }
            }

            let args = match self.unit.types.data(decl_type) {
                TypeData::Func(sign) => sign.args.clone(),
                _ => Vec::new(),
            };
            if let Some((_, first)) = seen.iter().find(|(a, _)| *a == args) {
                let first_loc = self.pkg().ast.decl(*first).loc;
                let (path, pos) = self.unit.sources.resolve(first_loc.file, first_loc.span);
                let msg = format!(
                    "function overload already defined {path}:{}:{}",
                    pos.line, pos.col
                );
                let decl_loc = self.pkg().ast.decl(decl_id).loc;
                self.err(decl_loc, msg);
            } else {
                seen.push((args, decl_id));
            }
        }
        set_type
    }

    /// Clash check for one overload added after the set was resolved.
    pub(crate) fn check_duplicate_overload(
        &mut self,
        set: SymbolId,
        decl_id: DeclId,
        decl_type: TypeId,
    ) {
        let entries: Vec<(DeclId, Option<TypeId>)> = match &self.pkg().sym(set).kind {
            SymbolKind::OverloadSet { decls } => decls.clone(),
            _ => return,
        };
        let args = match self.unit.types.data(decl_type) {
            TypeData::Func(sign) => sign.args.clone(),
            _ => return,
        };
        for (other, other_type) in entries {
            if other == decl_id {
                continue;
            }
            let Some(other_type) = other_type else { continue };
            let other_args = match self.unit.types.data(other_type) {
                TypeData::Func(sign) => sign.args.clone(),
                _ => continue,
            };
            if other_args == args {
                let first_loc = self.pkg().ast.decl(other).loc;
                let (path, pos) = self.unit.sources.resolve(first_loc.file, first_loc.span);
                let msg = format!(
                    "function overload already defined {path}:{}:{}",
                    pos.line, pos.col
                );
                let decl_loc = self.pkg().ast.decl(decl_id).loc;
                self.err(decl_loc, msg);
                return;
            }
        }
    }

    pub(crate) fn resolve_overload_set_bodies(&mut self, id: SymbolId) {
        let entries: Vec<(DeclId, Option<TypeId>)> = match &self.pkg().sym(id).kind {
            SymbolKind::OverloadSet { decls } => decls.clone(),
            _ => return,
        };
        for (decl_id, decl_type) in entries {
            let Some(decl_type) = decl_type else { continue };
            let scope = match self.find_scope_for(ScopeOwner::Decl(decl_id)) {
                Some(scope) => scope,
                None => continue,
            };
            self.resolve_func_body_in_scope(decl_id, decl_type, scope);
        }
    }

    // ===== Struct / enum completion =====

    /// Fill the fields of a struct or enum placeholder. Observing a type
    /// already in its `Completing` phase is a recursive-type error.
    pub(crate) fn complete_type(&mut self, id: SymbolId, used_from: Loc) {
        let Some(ty) = self.pkg().sym(id).ty else {
            return;
        };
        match self.unit.types.data(ty) {
            TypeData::Completing { .. } => {
                let name = self.unit.strings.lookup(self.pkg().sym(id).name.name);
                self.err(used_from, format!("'{name}' is a recursive type"));
                return;
            }
            TypeData::Incomplete { .. } => {}
            _ => return,
        }
        self.unit.types.begin_completing(ty);

        match self.pkg().sym(id).kind {
            SymbolKind::Struct { decl } => self.complete_struct_type(decl, ty),
            SymbolKind::Enum { decl } => self.complete_enum_type(decl, ty),
            _ => {}
        }
    }

    fn complete_struct_type(&mut self, decl_id: DeclId, ty: TypeId) {
        let decl = self.decl(decl_id);
        let DeclKind::Struct { name, templates, fields } = decl.kind else {
            return;
        };
        let file = decl.loc.file;

        let scope = self.create_scope_for(
            ScopeOwner::Decl(decl_id),
            self.current_scope(),
            name.name,
            None,
            ScopeFlags::NONE,
        );
        self.with_scope(scope, |t| {
            let template_args = t.declare_typenames(&templates, file);

            let mut struct_fields: Vec<StructField> = Vec::new();
            let mut fields_by_name: FxHashMap<Name, usize> = FxHashMap::default();
            for field in &fields {
                let field_type = t.resolve_type_sign(&field.sign, file);

                // Recursive completion for struct-typed fields that are
                // still placeholders.
                let pending = match t.unit.types.data(field_type) {
                    TypeData::Incomplete { sym, .. } | TypeData::Completing { sym, .. } => {
                        Some(*sym)
                    }
                    _ => None,
                };
                if let Some(pending) = pending {
                    if pending.package == t.pkg.0 {
                        let used_from = Loc::new(file, field.sign.span());
                        t.complete_type(SymbolId(pending.symbol), used_from);
                    }
                }

                if let Some(default_value) = field.default_value {
                    let default_type =
                        t.with_expected(Some(field_type), |t| t.resolve_expr(default_value));
                    let default_loc = t.pkg().ast.expr(default_value).loc;
                    if !t.unit.types.types_equal(default_type, field_type) {
                        let found = t.display(default_type);
                        let expected = t.display(field_type);
                        t.err(
                            default_loc,
                            format!(
                                "type mismatch in default value which has type '{found}' but field type is '{expected}'"
                            ),
                        );
                    }
                    if t.mode(default_value) != AddressMode::Const {
                        t.err(default_loc, "default value should be a constant");
                    }
                }

                for fname in &field.names {
                    struct_fields.push(StructField {
                        name: *fname,
                        ty: field_type,
                        default_value: field.default_value,
                    });
                    if let Some(&prev) = fields_by_name.get(&fname.name) {
                        let old_span = struct_fields[prev].name.span;
                        let (_, pos) = t.unit.sources.resolve(file, old_span);
                        let shown = t.unit.strings.lookup(fname.name);
                        t.err(
                            Loc::new(file, fname.span),
                            format!(
                                "'{shown}' field redefinition, first declared in {}:{}",
                                pos.line, pos.col
                            ),
                        );
                    } else {
                        fields_by_name.insert(fname.name, struct_fields.len() - 1);
                    }
                }
            }
            t.unit.types.complete_struct(ty, struct_fields, fields_by_name, template_args);
        });
    }

    fn complete_enum_type(&mut self, decl_id: DeclId, ty: TypeId) {
        let decl = self.decl(decl_id);
        let DeclKind::Enum { fields, .. } = decl.kind else {
            return;
        };
        let file = decl.loc.file;

        let mut enum_fields: Vec<EnumField> = Vec::new();
        let mut fields_by_name: FxHashMap<Name, usize> = FxHashMap::default();
        for field in &fields {
            enum_fields.push(EnumField { name: field.name, value: None });
            if let Some(&prev) = fields_by_name.get(&field.name.name) {
                let old_span = enum_fields[prev].name.span;
                let (_, pos) = self.unit.sources.resolve(file, old_span);
                let shown = self.unit.strings.lookup(field.name.name);
                self.err(
                    Loc::new(file, field.name.span),
                    format!(
                        "'{shown}' field redefinition, first declared in {}:{}",
                        pos.line, pos.col
                    ),
                );
            } else {
                fields_by_name.insert(field.name.name, enum_fields.len() - 1);
            }
        }
        self.unit.types.complete_enum(ty, enum_fields, fields_by_name);

        // Values default to a running integer; explicit constants restart
        // the sequence.
        let mut current = Value::Int(0);
        for (index, field) in fields.iter().enumerate() {
            if let Some(value_expr) = field.value {
                let value_type = self.with_expected(Some(ty), |t| t.resolve_expr(value_expr));
                let value_loc = self.pkg().ast.expr(value_expr).loc;
                if value_type != ty && !self.unit.types.types_equal(value_type, TypeId::INT) {
                    let shown = self.display(value_type);
                    self.err(
                        value_loc,
                        format!("enum value should be an integer, but instead we found '{shown}'"),
                    );
                    continue;
                }
                if self.mode(value_expr) != AddressMode::Const {
                    self.err(value_loc, "enum values should be constant");
                }
                if let Some(value) = self.value(value_expr) {
                    current = value;
                }
            }
            self.unit.types.set_enum_field_value(ty, index, current.clone());
            if let Value::Int(n) = &mut current {
                *n += 1;
            }
        }
    }

    // ===== Type signatures =====

    /// Resolve a written type signature, folding the atom chain from the
    /// innermost named atom outward. An empty signature is `void`.
    pub(crate) fn resolve_type_sign(&mut self, sign: &TypeSign, file: FileId) -> TypeId {
        let mut res = TypeId::VOID;
        for atom in sign.atoms.iter().rev() {
            match atom {
                TypeSignAtom::Named { package, name } => {
                    if let Some(named) = self.resolve_named_atom(*package, *name, file) {
                        res = named;
                    }
                }
                TypeSignAtom::Array { count, span } => {
                    res = self.resolve_array_atom(res, *count, Loc::new(file, *span));
                }
                TypeSignAtom::Templated { package, name, args } => {
                    if let Some(named) = self.resolve_named_atom(*package, *name, file) {
                        let arg_types: Vec<TypeId> =
                            args.iter().map(|a| self.resolve_type_sign(a, file)).collect();
                        res = self.template_instantiate_checked(
                            named,
                            arg_types,
                            Loc::new(file, name.span),
                        );
                    }
                }
            }
        }
        res
    }

    fn resolve_array_atom(
        &mut self,
        base: TypeId,
        count: Option<sabre_ir::ExprId>,
        loc: Loc,
    ) -> TypeId {
        let Some(count_expr) = count else {
            return self.unit.types.array(base, -1);
        };
        let count_type = self.resolve_expr(count_expr);
        let count_loc = self.pkg().ast.expr(count_expr).loc;
        let types = &self.unit.types;
        if !types.types_equal(count_type, TypeId::INT) && !types.types_equal(count_type, TypeId::UINT)
        {
            let shown = self.display(count_type);
            self.err(count_loc, format!("array count should be an integer but found '{shown}'"));
        }
        match self.value(count_expr) {
            Some(Value::Int(n)) => {
                if n < 0 {
                    self.err(count_loc, format!("array count should be >= 0 but found '{n}'"));
                    return self.unit.types.array(base, -1);
                }
                self.unit.types.array(base, n)
            }
            _ => {
                self.err(loc, "array count must be a constant integer");
                self.unit.types.array(base, -1)
            }
        }
    }

    /// Resolve a named type atom: a builtin, a symbol of the current
    /// package, or a symbol of an imported package.
    fn resolve_named_atom(
        &mut self,
        package: Option<Ident>,
        name: Ident,
        file: FileId,
    ) -> Option<TypeId> {
        if let Some(pkg_ident) = package {
            let mut package_sym = self.find_symbol(pkg_ident.name);
            // The import may live in the file scope of the usage site.
            if package_sym.is_none() {
                if let Some(file_scope) = self.pkg().file_scope(file) {
                    package_sym = self
                        .pkg()
                        .scopes
                        .find(file_scope, pkg_ident.name)
                        .map(|id| self.sym_ref(id));
                }
            }
            let Some(package_sym) = package_sym else {
                let shown = self.unit.strings.lookup(pkg_ident.name);
                self.err(Loc::new(file, pkg_ident.span), format!("'{shown}' undefined symbol"));
                return None;
            };
            let SymbolKind::Package { package: target } = self.unit.sym(package_sym).kind else {
                let shown = self.unit.strings.lookup(pkg_ident.name);
                self.err(
                    Loc::new(file, pkg_ident.span),
                    format!("'{shown}' is not an imported package"),
                );
                return None;
            };

            self.resolve_symbol(package_sym);

            let target_global = self.unit.pkg(target).global_scope;
            let Some(type_sym) =
                self.unit.pkg(target).scopes.shallow_find(target_global, name.name)
            else {
                let shown = self.unit.strings.lookup(name.name);
                self.err(Loc::new(file, name.span), format!("'{shown}' undefined symbol"));
                return None;
            };
            let type_ref = SymRef { package: target.0, symbol: type_sym.0 };
            self.resolve_symbol(type_ref);
            return self.unit.sym(type_ref).ty;
        }

        let name_str = self.unit.strings.lookup(name.name);
        if let Some(builtin) = self.unit.types.builtin_from_name(name_str) {
            return Some(builtin);
        }

        if let Some(sym) = self.find_symbol(name.name) {
            self.resolve_symbol(sym);
            return self.unit.sym(sym).ty;
        }

        self.err(Loc::new(file, name.span), format!("'{name_str}' undefined symbol"));
        None
    }

    // ===== Template instantiation =====

    /// Validate and run a template instantiation, then register symbols
    /// for any newly minted concrete struct types so they show up in the
    /// reachable list.
    pub(crate) fn template_instantiate_checked(
        &mut self,
        base: TypeId,
        args: Vec<TypeId>,
        loc: Loc,
    ) -> TypeId {
        let base_params = self.unit.types.ty(base).template_args.clone();
        if base_params.is_empty() {
            let shown = self.display(base);
            self.err(loc, format!("type '{shown}' is not a template type"));
            return base;
        }
        if args.len() != base_params.len() {
            self.err(
                loc,
                format!(
                    "template type expected #{} arguments, but #{} only was provided",
                    base_params.len(),
                    args.len()
                ),
            );
            return base;
        }

        let mut newly = Vec::new();
        let res = self.unit.types.template_instantiate(base, &args, &mut newly);

        for minted in newly {
            if self.unit.types.is_templated(minted) {
                continue;
            }
            let struct_sym = match self.unit.types.data(minted) {
                TypeData::Struct { sym, .. } => *sym,
                _ => continue,
            };
            let base_sym = self.unit.sym(struct_sym);
            let (name, file, is_top_level) = (base_sym.name, base_sym.file, base_sym.is_top_level);

            let mut sym =
                Symbol::new(name, file, self.pkg, SymbolKind::StructInstantiation { base: struct_sym });
            sym.state = SymbolState::Resolved;
            sym.ty = Some(minted);
            sym.is_top_level = is_top_level;
            let id = self.pkg_mut().add_symbol_entry(sym);

            let sref = self.sym_ref(id);
            self.add_dependency(sref);
            if is_top_level {
                self.pkg_mut().reachable_symbols.push(id);
            }
        }
        res
    }
}
