//! Call typing: single functions, template argument deduction and
//! instantiation, and overload resolution by similarity scoring.

use crate::checker::Typer;
use crate::symbol::{AddressMode, Symbol, SymbolKind, SymbolState};
use crate::unit::PackageId;
use rustc_hash::FxHashMap;
use sabre_ir::{DeclId, DeclKind, ExprId, Loc};
use sabre_types::{SymRef, TypeData, TypeId};

struct OverloadCandidate {
    ty: TypeId,
    decl: DeclId,
    instantiated: Option<(DeclId, SymRef, TypeId)>,
    score: i32,
}

impl Typer<'_> {
    pub(crate) fn resolve_call_expr(
        &mut self,
        e: ExprId,
        base: ExprId,
        args: &[ExprId],
        loc: Loc,
    ) -> TypeId {
        let base_type = self.resolve_expr(base);
        if !self.unit.types.is_func(base_type) {
            let base_loc = self.pkg().ast.expr(base).loc;
            self.err(base_loc, "invalid call, expression is not a function");
            return TypeId::VOID;
        }

        self.set_mode(e, AddressMode::ComputedValue);

        match self.unit.types.data(base_type) {
            TypeData::Func(_) => self.resolve_single_call(e, base, base_type, args, loc),
            TypeData::OverloadSet { sym, .. } => {
                let sym = *sym;
                self.resolve_overload_call(e, base, sym, args, loc)
            }
            _ => TypeId::VOID,
        }
    }

    fn resolve_single_call(
        &mut self,
        e: ExprId,
        base: ExprId,
        func_type: TypeId,
        args: &[ExprId],
        loc: Loc,
    ) -> TypeId {
        let symbol = self.pkg().expr_symbols.get(&base).copied();
        if let Some(sym) = symbol {
            if let SymbolKind::Func { decl } = self.unit.sym(sym).kind {
                if sym.package == self.pkg.0 {
                    self.pkg_mut().call_targets.insert(e, decl);
                }
            }
        }

        let sign_args_len = match self.unit.types.data(func_type) {
            TypeData::Func(sign) => sign.args.len(),
            _ => return TypeId::VOID,
        };
        if args.len() != sign_args_len {
            self.err(
                loc,
                format!(
                    "function expected {sign_args_len} arguments, but {} were provided",
                    args.len()
                ),
            );
            return self.func_return_type(func_type);
        }

        let mut resolved_map: FxHashMap<TypeId, TypeId> = FxHashMap::default();
        let mut final_type = func_type;
        if self.unit.types.is_templated(func_type) {
            if self.guess_template_args(func_type, args, &mut resolved_map) {
                let params = self.unit.types.ty(func_type).template_args.clone();
                let deduced: Option<Vec<TypeId>> =
                    params.iter().map(|p| resolved_map.get(p).copied()).collect();
                match deduced {
                    Some(arg_types) => {
                        let inst_type =
                            self.template_instantiate_checked(func_type, arg_types.clone(), loc);
                        let memoized = self
                            .unit
                            .types
                            .find_func_instantiation_decl(func_type, &arg_types);
                        let instantiated = match memoized {
                            Some(found) => Some(found),
                            None => match symbol {
                                Some(sym) => {
                                    let templated_decl =
                                        match self.unit.sym(sym).kind {
                                            SymbolKind::Func { decl } => Some(decl),
                                            _ => None,
                                        };
                                    templated_decl.and_then(|decl| {
                                        self.instantiate_func_decl(
                                            decl,
                                            PackageId(sym.package),
                                            sym,
                                            func_type,
                                            inst_type,
                                            &arg_types,
                                            loc,
                                            true,
                                        )
                                    })
                                }
                                None => None,
                            },
                        };
                        if let Some((decl, inst_sym)) = instantiated {
                            self.add_dependency(inst_sym);
                            self.push_reachable_once(inst_sym);
                            if inst_sym.package == self.pkg.0 {
                                self.pkg_mut().call_targets.insert(e, decl);
                            }
                            self.pkg_mut().expr_symbols.insert(base, inst_sym);
                        }
                        final_type = inst_type;
                    }
                    None => {
                        self.err(loc, "cannot deduce all template arguments of the call");
                    }
                }
            }
        }

        let formals = match self.unit.types.data(final_type) {
            TypeData::Func(sign) => sign.args.clone(),
            _ => Vec::new(),
        };
        for (i, &arg) in args.iter().enumerate() {
            let arg_type = self.resolve_expr(arg);
            let formal = formals.get(i).copied().unwrap_or(TypeId::VOID);
            if !self.can_assign(formal, arg) {
                let arg_loc = self.pkg().ast.expr(arg).loc;
                let shown_found = self.display(arg_type);
                if self.unit.types.is_typename(formal) || self.unit.types.is_templated(formal) {
                    if let Some(&bound) = resolved_map.get(&formal) {
                        let shown_expected = self.display(bound);
                        self.err(
                            arg_loc,
                            format!(
                                "function argument #{i} type mismatch, expected '{shown_expected}' but found '{shown_found}'"
                            ),
                        );
                    }
                } else {
                    let shown_expected = self.display(formal);
                    self.err(
                        arg_loc,
                        format!(
                            "function argument #{i} type mismatch, expected '{shown_expected}' but found '{shown_found}'"
                        ),
                    );
                }
            }
        }

        self.func_return_type(final_type)
    }

    fn resolve_overload_call(
        &mut self,
        e: ExprId,
        base: ExprId,
        set_sym: SymRef,
        args: &[ExprId],
        loc: Loc,
    ) -> TypeId {
        let home = PackageId(set_sym.package);
        let entries: Vec<(DeclId, Option<TypeId>)> = match &self.unit.sym(set_sym).kind {
            SymbolKind::OverloadSet { decls } => decls.clone(),
            _ => return TypeId::VOID,
        };

        // Non-templated candidates: first the one every argument matches
        // exactly (untyped literals match their natural scalar), then any
        // one every argument is assignable to.
        let mut templated: Vec<(DeclId, TypeId)> = Vec::new();
        let mut assignable: Option<(DeclId, TypeId)> = None;
        for (decl, ty) in &entries {
            let Some(ty) = *ty else { continue };
            let formals = match self.unit.types.data(ty) {
                TypeData::Func(sign) => sign.args.clone(),
                _ => continue,
            };
            if formals.len() != args.len() {
                continue;
            }
            if self.unit.types.is_templated(ty) {
                templated.push((*decl, ty));
                continue;
            }

            let mut exact = true;
            let mut fits = true;
            for (i, &arg) in args.iter().enumerate() {
                let arg_type = self.resolve_expr(arg);
                exact &= self.preferred_arg_match(formals[i], arg_type);
                if !self.can_assign(formals[i], arg) {
                    fits = false;
                    break;
                }
            }
            if exact && fits {
                if home == self.pkg {
                    self.pkg_mut().call_targets.insert(e, *decl);
                }
                return self.func_return_type(ty);
            }
            if fits && assignable.is_none() {
                assignable = Some((*decl, ty));
            }
        }
        if let Some((decl, ty)) = assignable {
            if home == self.pkg {
                self.pkg_mut().call_targets.insert(e, decl);
            }
            return self.func_return_type(ty);
        }

        // Second pass: score templated candidates; the unique top scorer
        // wins, ties are ambiguous.
        let mut candidates: Vec<OverloadCandidate> = Vec::new();
        for (decl, ty) in templated {
            let mut map = FxHashMap::default();
            let diag_mark = self.unit.diags.len();
            if !self.guess_template_args(ty, args, &mut map) {
                // A rejected candidate leaves no diagnostics behind.
                self.unit.diags.truncate(diag_mark);
                continue;
            }
            let params = self.unit.types.ty(ty).template_args.clone();
            let Some(arg_types) = params
                .iter()
                .map(|p| map.get(p).copied())
                .collect::<Option<Vec<TypeId>>>()
            else {
                continue;
            };

            let inst_type = self.template_instantiate_checked(ty, arg_types.clone(), loc);
            let instantiated = match self.unit.types.find_func_instantiation_decl(ty, &arg_types) {
                Some(found) => Some((found.0, found.1, inst_type)),
                None => self
                    .instantiate_func_decl(
                        decl, home, set_sym, ty, inst_type, &arg_types, loc, false,
                    )
                    .map(|(d, s)| (d, s, inst_type)),
            };

            let formals = match self.unit.types.data(ty) {
                TypeData::Func(sign) => sign.args.clone(),
                _ => Vec::new(),
            };
            let mut score = 0;
            for (i, &arg) in args.iter().enumerate() {
                let arg_type = self.resolve_expr(arg);
                score += self.similarity_score(arg_type, formals[i]);
            }
            candidates.push(OverloadCandidate { ty, decl, instantiated, score });
        }

        candidates.sort_by(|a, b| b.score.cmp(&a.score));
        if !candidates.is_empty() {
            let best = candidates[0].score;
            let tied = candidates.iter().filter(|c| c.score == best).count();
            if tied > 1 {
                let mut msg = String::from("ambiguous function call 'func(");
                for (i, &arg) in args.iter().enumerate() {
                    if i > 0 {
                        msg.push_str(", ");
                    }
                    let arg_type = self.resolve_expr(arg);
                    msg.push(':');
                    msg.push_str(&self.display(arg_type));
                }
                msg.push_str(")' in the overload set:");
                for (i, candidate) in candidates.iter().take(tied).enumerate() {
                    let decl_loc = self.unit.pkg(home).ast.decl(candidate.decl).loc;
                    let (path, pos) = self.unit.sources.resolve(decl_loc.file, decl_loc.span);
                    let shown = self.display(candidate.ty);
                    msg.push_str(&format!(
                        "\n  {i}. {shown} defined in {path}:{}:{}",
                        pos.line, pos.col
                    ));
                }
                self.err(loc, msg);
                return TypeId::VOID;
            }

            if let Some((decl, inst_sym, inst_type)) = candidates[0].instantiated {
                self.add_dependency(inst_sym);
                self.push_reachable_once(inst_sym);
                if inst_sym.package == self.pkg.0 {
                    self.pkg_mut().call_targets.insert(e, decl);
                }
                self.pkg_mut().expr_symbols.insert(base, inst_sym);
                return self.func_return_type(inst_type);
            }
        }

        // No candidate fits: list the whole set with signatures.
        let mut msg = String::from("cannot find suitable function for 'func(");
        for (i, &arg) in args.iter().enumerate() {
            if i > 0 {
                msg.push_str(", ");
            }
            let arg_type = self.resolve_expr(arg);
            msg.push(':');
            msg.push_str(&self.display(arg_type));
        }
        msg.push_str(")' in the overload set:");
        for (i, (decl, ty)) in entries.iter().enumerate() {
            let Some(ty) = *ty else { continue };
            let decl_loc = self.unit.pkg(home).ast.decl(*decl).loc;
            let (path, pos) = self.unit.sources.resolve(decl_loc.file, decl_loc.span);
            let shown = self.display(ty);
            msg.push_str(&format!(
                "\n  {i}. {shown} defined in {path}:{}:{}",
                pos.line, pos.col
            ));
        }
        self.err(loc, msg);
        TypeId::VOID
    }

    // ===== Template deduction =====

    /// Bind template parameters by structurally unifying each argument's
    /// actual type against the formal parameter.
    pub(crate) fn guess_template_args(
        &mut self,
        func_type: TypeId,
        args: &[ExprId],
        resolved: &mut FxHashMap<TypeId, TypeId>,
    ) -> bool {
        let formals = match self.unit.types.data(func_type) {
            TypeData::Func(sign) => sign.args.clone(),
            _ => return false,
        };
        let mut ok = true;
        for (i, &arg) in args.iter().enumerate() {
            let arg_type = self.resolve_expr(arg);
            let arg_loc = self.pkg().ast.expr(arg).loc;
            ok &= self.deduce_type(formals[i], arg_type, arg_loc, resolved);
        }
        ok
    }

    fn deduce_type(
        &mut self,
        expected: TypeId,
        actual: TypeId,
        arg_loc: Loc,
        resolved: &mut FxHashMap<TypeId, TypeId>,
    ) -> bool {
        if self.unit.types.is_typename(expected) {
            return match resolved.get(&expected) {
                Some(&bound) => {
                    if bound != actual {
                        let shown = self.display(expected);
                        let (a, b) = (self.display(bound), self.display(actual));
                        self.err(
                            arg_loc,
                            format!(
                                "type '{shown}' is ambiguous, we already deduced it to be '{a}' but we have another guess which is '{b}'"
                            ),
                        );
                        false
                    } else {
                        true
                    }
                }
                None => {
                    resolved.insert(expected, actual);
                    true
                }
            };
        }
        if self.unit.types.is_templated(expected) {
            let expected_args = self.unit.types.ty(expected).template_base_args.clone();
            let actual_args = self.unit.types.ty(actual).template_base_args.clone();
            let pairs = expected_args.len().min(actual_args.len());
            let mut res = expected_args.len() == actual_args.len();
            for i in 0..pairs {
                res &= self.deduce_type(expected_args[i], actual_args[i], arg_loc, resolved);
            }
            return res;
        }
        self.unit.types.types_equal(expected, actual)
    }

    /// An argument matches a formal exactly when the types are identical,
    /// or when an untyped literal meets its natural scalar type.
    fn preferred_arg_match(&self, formal: TypeId, arg_type: TypeId) -> bool {
        arg_type == formal
            || (arg_type == TypeId::LIT_INT && formal == TypeId::INT)
            || (arg_type == TypeId::LIT_FLOAT && formal == TypeId::FLOAT)
    }

    /// Exact matches count 1, typename mismatches 0; otherwise the score
    /// sums recursively over both template-base chains.
    pub(crate) fn similarity_score(&self, a: TypeId, b: TypeId) -> i32 {
        if self.unit.types.types_equal(a, b) {
            return 1;
        }
        if self.unit.types.is_typename(a) || self.unit.types.is_typename(b) {
            return 0;
        }
        let mut score = 0;
        let mut outer = self.unit.types.ty(a).template_base_type;
        while let Some(x) = outer {
            let mut inner = Some(b);
            while let Some(y) = inner {
                score += self.similarity_score(x, y);
                inner = self.unit.types.ty(y).template_base_type;
            }
            outer = self.unit.types.ty(x).template_base_type;
        }
        score
    }

    // ===== Instantiation =====

    /// Clone a templated function declaration, bind its typenames and
    /// parameters to the deduced types, and check the cloned body. With
    /// `report_errors`, body errors produce a note pointing at the call
    /// site; without it they roll back and the instantiation is dropped
    /// (overload scoring may reject the candidate anyway).
    #[allow(clippy::too_many_arguments)]
    fn instantiate_func_decl(
        &mut self,
        templated_decl: DeclId,
        home: PackageId,
        base_symbol: SymRef,
        templated_type: TypeId,
        inst_type: TypeId,
        arg_types: &[TypeId],
        call_loc: Loc,
        report_errors: bool,
    ) -> Option<(DeclId, SymRef)> {
        let saved = if home != self.pkg {
            Some(self.switch_package(home))
        } else {
            None
        };

        let result = self.instantiate_func_decl_local(
            templated_decl,
            base_symbol,
            templated_type,
            inst_type,
            arg_types,
            call_loc,
            report_errors,
        );

        if let Some(saved) = saved {
            self.restore_context(saved);
        }
        result
    }

    fn instantiate_func_decl_local(
        &mut self,
        templated_decl: DeclId,
        base_symbol: SymRef,
        templated_type: TypeId,
        inst_type: TypeId,
        arg_types: &[TypeId],
        call_loc: Loc,
        report_errors: bool,
    ) -> Option<(DeclId, SymRef)> {
        let base = self.unit.sym(base_symbol);
        let (name, file) = (base.name, base.file);

        let inst_decl = self.pkg_mut().ast.clone_decl(templated_decl);
        self.pkg_mut().decl_types.insert(inst_decl, inst_type);

        let mut sym = Symbol::new(
            name,
            file,
            self.pkg,
            SymbolKind::FuncInstantiation { base: base_symbol, decl: inst_decl },
        );
        sym.state = SymbolState::Resolved;
        sym.ty = Some(inst_type);
        let id = self.pkg_mut().add_symbol_entry(sym);
        let inst_sym = self.sym_ref(id);
        self.unit
            .types
            .add_func_instantiation_decl(templated_type, arg_types, inst_decl, inst_sym);

        // The clone's scope hangs off the template's parent so lookups
        // skip the template's own typename bindings.
        let templated_scope = self.find_scope_for(crate::scope::ScopeOwner::Decl(templated_decl));
        let parent = templated_scope
            .and_then(|s| self.pkg().scopes.get(s).parent)
            .unwrap_or(self.pkg().global_scope);
        let ret = self.func_return_type(inst_type);
        let inst_scope = self.create_scope_for(
            crate::scope::ScopeOwner::Decl(inst_decl),
            parent,
            name.name,
            Some(ret),
            crate::scope::ScopeFlags::NONE,
        );

        let decl = self.decl(inst_decl);
        let DeclKind::Func { templates, params, .. } = decl.kind else {
            return None;
        };
        let inst_formals = match self.unit.types.data(inst_type) {
            TypeData::Func(sign) => sign.args.clone(),
            _ => Vec::new(),
        };

        self.with_scope(inst_scope, |t| {
            for (tname, &concrete) in templates.iter().zip(arg_types.iter()) {
                let mut typename_sym = Symbol::new(*tname, file, t.pkg, SymbolKind::Typename);
                typename_sym.state = SymbolState::Resolved;
                typename_sym.ty = Some(concrete);
                let tid = t.pkg_mut().add_symbol_entry(typename_sym);
                t.add_symbol_at(tid, inst_scope);
            }
            let mut formal = 0;
            for param in &params {
                for pname in &param.names {
                    let ty = inst_formals.get(formal).copied().unwrap_or(TypeId::VOID);
                    t.add_param_symbol(*pname, file, param.sign.clone(), ty);
                    formal += 1;
                }
            }
        });

        let diag_mark = self.unit.diags.len();
        self.resolve_func_body_in_scope(inst_decl, inst_type, inst_scope);
        if self.unit.diags.len() > diag_mark {
            if report_errors {
                let base_name = self.unit.strings.lookup(name.name);
                let mut msg = format!(
                    "call to template function '{base_name}' has errors, it was instantiated with the following template arguments:"
                );
                let params = self.unit.types.ty(templated_type).template_args.clone();
                for (param, &concrete) in params.iter().zip(arg_types.iter()) {
                    let (p, c) = (self.display(*param), self.display(concrete));
                    msg.push_str(&format!("\n  - {p} = {c}"));
                }
                self.note(call_loc, msg);
            } else {
                self.unit.diags.truncate(diag_mark);
                return None;
            }
        }

        Some((inst_decl, inst_sym))
    }

    /// Append to the reachable list unless the symbol is already there.
    pub(crate) fn push_reachable_once(&mut self, sym: SymRef) {
        let home = PackageId(sym.package);
        let id = crate::symbol::SymbolId(sym.symbol);
        let pkg = self.unit.pkg_mut(home);
        if !pkg.reachable_symbols.contains(&id) {
            pkg.reachable_symbols.push(id);
        }
    }
}
