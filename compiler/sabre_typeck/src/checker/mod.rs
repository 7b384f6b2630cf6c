//! The typer: mutable checker state over a [`Unit`].
//!
//! This module owns the resolver state machine (the shallow walk, the
//! compile-time `if` driver, and lazy per-symbol resolution with cycle
//! detection); expression, statement, call and entry-point rules live in
//! the sibling modules.

mod call;
mod complit;
mod entry;
mod expr;
mod resolve;
mod stmt;

use crate::scope::{Scope, ScopeFlags, ScopeId, ScopeOwner};
use crate::symbol::{AddressMode, EntryMode, EntryPoint, Symbol, SymbolId, SymbolKind, SymbolState};
use crate::unit::{Package, PackageId, Stage, Unit};
use rustc_hash::FxHashSet;
use sabre_diagnostic::Diagnostic;
use sabre_ir::{ast::Ident, Decl, DeclId, DeclKind, Expr, ExprId, Loc, Name, Stmt, StmtId};
use sabre_types::{SymRef, TypeId, Value};

/// Type-check one package: register symbols, resolve them all, assign
/// bindings, validate entry points, and transition the stage.
pub fn check_package(unit: &mut Unit, pkg: PackageId) {
    let mut typer = Typer::new(unit, pkg);
    typer.check();
    let stage = if unit.has_errors() { Stage::Failed } else { Stage::Codegen };
    unit.pkg_mut(pkg).stage = stage;
}

/// Checker state for one package. Sub-package resolution swaps the
/// context in and out (see [`Typer::switch_package`]).
pub(crate) struct Typer<'u> {
    pub(crate) unit: &'u mut Unit,
    pub(crate) pkg: PackageId,
    pub(crate) scope_stack: Vec<ScopeId>,
    pub(crate) func_stack: Vec<DeclId>,
    pub(crate) expected_types: Vec<Option<TypeId>>,
    pub(crate) texture_binding_gen: i64,
    pub(crate) sampler_binding_gen: i64,
    pub(crate) uniform_binding_gen: i64,
}

/// Saved typer context while resolving a symbol of another package.
pub(crate) struct SavedContext {
    pkg: PackageId,
    scope_stack: Vec<ScopeId>,
    func_stack: Vec<DeclId>,
    expected_types: Vec<Option<TypeId>>,
}

impl<'u> Typer<'u> {
    pub(crate) fn new(unit: &'u mut Unit, pkg: PackageId) -> Self {
        let global = unit.pkg(pkg).global_scope;
        Typer {
            unit,
            pkg,
            scope_stack: vec![global],
            func_stack: Vec::new(),
            expected_types: Vec::new(),
            texture_binding_gen: 0,
            sampler_binding_gen: 0,
            uniform_binding_gen: 0,
        }
    }

    // ===== Driver =====

    pub(crate) fn check(&mut self) {
        tracing::info!(
            package = self.unit.strings.lookup(self.pkg().name),
            "checking package"
        );
        self.shallow_walk();
        self.collect_entry_points();

        let global = self.pkg().global_scope;
        let symbols = self.pkg().scopes.get(global).symbols.clone();
        for id in symbols {
            self.resolve_symbol(self.sym_ref(id));
        }

        // Crawl each entry point's dependency closure and assign binding
        // indices to every uniform it can reach.
        let entry_count = self.pkg().entry_points.len();
        for entry in 0..entry_count {
            let root = self.sym_ref(self.pkg().entry_points[entry].symbol);
            let mut visited = FxHashSet::default();
            let mut stack = vec![root];
            visited.insert(root);
            while let Some(sym) = stack.pop() {
                if let SymbolKind::Var { is_uniform: true, .. } = self.unit.sym(sym).kind {
                    self.assign_bindings(Some(entry), sym);
                }
                for dep in self.unit.sym(sym).dependencies.clone() {
                    if visited.insert(dep) {
                        stack.push(dep);
                    }
                }
            }
        }

        // Uniforms never referenced from an entry point still get stable
        // bindings.
        let all = self.unit.all_uniforms.clone();
        for sym in all {
            self.assign_bindings(None, sym);
        }

        for entry in 0..entry_count {
            self.check_entry_input(entry);
        }
    }

    fn collect_entry_points(&mut self) {
        let global = self.pkg().global_scope;
        let symbols = self.pkg().scopes.get(global).symbols.clone();
        let keywords = (
            self.unit.keywords.vertex,
            self.unit.keywords.pixel,
            self.unit.keywords.geometry,
        );
        for id in symbols {
            let SymbolKind::Func { decl } = self.pkg().sym(id).kind else {
                continue;
            };
            let tags = &self.pkg().ast.decl(decl).tags;
            let mode = if tags.has(keywords.0) {
                EntryMode::Vertex
            } else if tags.has(keywords.1) {
                EntryMode::Pixel
            } else if tags.has(keywords.2) {
                EntryMode::Geometry
            } else {
                continue;
            };
            self.pkg_mut().entry_points.push(EntryPoint::new(id, mode));
        }
    }

    // ===== Package / AST accessors =====

    #[inline]
    pub(crate) fn pkg(&self) -> &Package {
        self.unit.pkg(self.pkg)
    }

    #[inline]
    pub(crate) fn pkg_mut(&mut self) -> &mut Package {
        self.unit.pkg_mut(self.pkg)
    }

    /// Clone a declaration node out of the current package's arena.
    pub(crate) fn decl(&self, id: DeclId) -> Decl {
        self.pkg().ast.decl(id).clone()
    }

    pub(crate) fn stmt(&self, id: StmtId) -> Stmt {
        self.pkg().ast.stmt(id).clone()
    }

    pub(crate) fn expr(&self, id: ExprId) -> Expr {
        self.pkg().ast.expr(id).clone()
    }

    pub(crate) fn display(&self, t: TypeId) -> String {
        self.unit.types.display(t, &self.unit.strings)
    }

    pub(crate) fn err(&mut self, loc: Loc, message: impl Into<String>) {
        self.unit.diags.push(Diagnostic::error(loc, message));
        self.pkg_mut().had_errors = true;
    }

    pub(crate) fn note(&mut self, loc: Loc, message: impl Into<String>) {
        self.unit.diags.push(Diagnostic::note(loc, message));
    }

    // ===== Expression side tables =====

    pub(crate) fn expr_type(&self, e: ExprId) -> Option<TypeId> {
        self.pkg().expr_types.get(&e).copied()
    }

    pub(crate) fn mode(&self, e: ExprId) -> AddressMode {
        self.pkg().expr_modes.get(&e).copied().unwrap_or_default()
    }

    pub(crate) fn set_mode(&mut self, e: ExprId, mode: AddressMode) {
        self.pkg_mut().expr_modes.insert(e, mode);
    }

    pub(crate) fn value(&self, e: ExprId) -> Option<Value> {
        self.pkg().expr_values.get(&e).cloned()
    }

    pub(crate) fn set_value(&mut self, e: ExprId, value: Value) {
        self.pkg_mut().expr_values.insert(e, value);
    }

    // ===== Scope management =====

    pub(crate) fn current_scope(&self) -> ScopeId {
        *self.scope_stack.last().expect("scope stack is never empty")
    }

    /// Run `f` with `scope` pushed; the scope is popped on every path out.
    pub(crate) fn with_scope<R>(&mut self, scope: ScopeId, f: impl FnOnce(&mut Self) -> R) -> R {
        self.scope_stack.push(scope);
        let result = f(self);
        self.scope_stack.pop();
        result
    }

    pub(crate) fn with_func<R>(&mut self, decl: DeclId, f: impl FnOnce(&mut Self) -> R) -> R {
        self.func_stack.push(decl);
        let result = f(self);
        self.func_stack.pop();
        result
    }

    /// Run `f` with an expected expression type pushed for inference.
    pub(crate) fn with_expected<R>(
        &mut self,
        expected: Option<TypeId>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.expected_types.push(expected);
        let result = f(self);
        self.expected_types.pop();
        result
    }

    pub(crate) fn expected_expr_type(&self) -> Option<TypeId> {
        self.expected_types.last().copied().flatten()
    }

    /// The nearest enclosing return-type context.
    pub(crate) fn expected_return_type(&self) -> Option<TypeId> {
        self.pkg().scopes.expected_type(self.current_scope())
    }

    /// Get or create the scope owned by an AST node.
    pub(crate) fn create_scope_for(
        &mut self,
        owner: ScopeOwner,
        parent: ScopeId,
        name: Name,
        expected_type: Option<TypeId>,
        flags: ScopeFlags,
    ) -> ScopeId {
        if let Some(&existing) = self.pkg().scope_table.get(&owner) {
            return existing;
        }
        let pkg = self.pkg_mut();
        let mut scope = Scope::new(Some(parent), name, flags);
        scope.expected_type = expected_type;
        let id = pkg.scopes.add(scope);
        pkg.scope_table.insert(owner, id);
        id
    }

    pub(crate) fn find_scope_for(&self, owner: ScopeOwner) -> Option<ScopeId> {
        self.pkg().scope_table.get(&owner).copied()
    }

    // ===== Symbol table =====

    pub(crate) fn sym_ref(&self, id: SymbolId) -> SymRef {
        SymRef { package: self.pkg.0, symbol: id.0 }
    }

    /// Add a freshly created symbol to the current scope.
    pub(crate) fn add_new_symbol(&mut self, sym: Symbol) -> SymbolId {
        let id = self.pkg_mut().add_symbol_entry(sym);
        self.add_symbol_at(id, self.current_scope())
    }

    /// Add an existing symbol to `scope`, reporting redefinitions. Returns
    /// the winning symbol (the old one on a clash).
    pub(crate) fn add_symbol_at(&mut self, id: SymbolId, scope: ScopeId) -> SymbolId {
        let name = self.pkg().sym(id).name;
        if let Some(old) = self.pkg().scopes.shallow_find(scope, name.name) {
            if old != id {
                let old_sym = self.pkg().sym(old);
                let what = if matches!(old_sym.kind, SymbolKind::Package { .. }) {
                    "package"
                } else {
                    "symbol"
                };
                let old_loc = old_sym.loc();
                let (_, pos) = self.unit.sources.resolve(old_loc.file, old_loc.span);
                let (line, col) = (pos.line, pos.col);
                let name_str = self.unit.strings.lookup(name.name);
                let loc = self.pkg().sym(id).loc();
                self.err(
                    loc,
                    format!(
                        "'{name_str}' {what} redefinition, first declared in {line}:{col}"
                    ),
                );
                return old;
            }
            return id;
        }
        self.pkg_mut().scopes.add_symbol(scope, name.name, id);
        self.pkg_mut().sym_mut(id).scope = Some(scope);
        id
    }

    /// Look a name up through the current scope chain.
    pub(crate) fn find_symbol(&self, name: Name) -> Option<SymRef> {
        self.pkg()
            .scopes
            .find(self.current_scope(), name)
            .map(|id| self.sym_ref(id))
    }

    // ===== Dependency tracking =====

    pub(crate) fn add_dependency(&mut self, dep: SymRef) {
        if let Some(&top) = self.unit.symbol_stack.last() {
            self.unit.sym_mut(top).add_dependency(dep);
        }
    }

    fn enter_symbol(&mut self, sym: SymRef) {
        self.unit.symbol_stack.push(sym);
    }

    fn leave_symbol(&mut self) {
        self.unit.symbol_stack.pop();
    }

    // ===== Symbol resolution =====

    /// Lazily resolve a symbol, recursing into its dependencies. Re-entry
    /// on a `Resolving` symbol is a cyclic-dependency error.
    pub(crate) fn resolve_symbol(&mut self, sym: SymRef) {
        match self.unit.sym(sym).state {
            SymbolState::Resolved => {
                self.add_dependency(sym);
                return;
            }
            SymbolState::Resolving => {
                let loc = self.unit.sym(sym).loc();
                let name = self.unit.strings.lookup(self.unit.sym(sym).name.name);
                self.err(loc, format!("'{name}' cyclic dependency"));
                return;
            }
            SymbolState::Unresolved => {}
        }

        let home = PackageId(sym.package);
        if home != self.pkg {
            let saved = self.switch_package(home);
            self.resolve_symbol_inner(sym);
            self.restore_context(saved);
        } else {
            self.resolve_symbol_inner(sym);
        }
    }

    fn resolve_symbol_inner(&mut self, sym: SymRef) {
        let id = SymbolId(sym.symbol);
        self.pkg_mut().sym_mut(id).state = SymbolState::Resolving;

        self.add_dependency(sym);
        self.enter_symbol(sym);

        // Copy out the dispatch data so kind-specific resolution can
        // freely mutate the unit.
        #[derive(Clone, Copy)]
        enum Dispatch {
            Const,
            Var,
            Func(DeclId),
            Named,
            Package(PackageId),
            OverloadSet,
            Preset,
        }
        let dispatch = match &self.pkg().sym(id).kind {
            SymbolKind::Const { .. } => Dispatch::Const,
            SymbolKind::Var { .. } => Dispatch::Var,
            SymbolKind::Func { decl } => Dispatch::Func(*decl),
            SymbolKind::Struct { .. } | SymbolKind::Enum { .. } => Dispatch::Named,
            SymbolKind::Package { package } => Dispatch::Package(*package),
            SymbolKind::OverloadSet { .. } => Dispatch::OverloadSet,
            SymbolKind::Typename
            | SymbolKind::FuncInstantiation { .. }
            | SymbolKind::StructInstantiation { .. } => Dispatch::Preset,
        };

        let ty = match dispatch {
            Dispatch::Const => self.resolve_const(id),
            Dispatch::Var => self.resolve_var(id),
            Dispatch::Func(decl) => self.resolve_func_decl(decl),
            Dispatch::Named => {
                let name = self.pkg().sym(id).name.name;
                self.unit.types.incomplete(sym, name)
            }
            Dispatch::Package(package) => self.unit.types.package(package.0),
            Dispatch::OverloadSet => self.resolve_overload_set(id),
            // Typenames and instantiations are born resolved; getting here
            // with one means the state machine was bypassed.
            Dispatch::Preset => self.pkg().sym(id).ty.unwrap_or(TypeId::VOID),
        };
        self.pkg_mut().sym_mut(id).ty = Some(ty);
        self.pkg_mut().sym_mut(id).state = SymbolState::Resolved;

        match dispatch {
            Dispatch::Func(decl) => self.resolve_func_body(decl, ty),
            Dispatch::OverloadSet => self.resolve_overload_set_bodies(id),
            Dispatch::Package(package) => self.check_sub_package(package),
            Dispatch::Named => {
                let used_from = self.pkg().sym(id).loc();
                self.complete_type(id, used_from);
            }
            _ => {}
        }

        self.leave_symbol();

        // Top-level membership: the package global scope or any file scope.
        let is_top_level = {
            let pkg = self.pkg();
            let sym_scope = pkg.sym(id).scope;
            sym_scope == Some(pkg.global_scope)
                || pkg.files.iter().any(|f| Some(f.scope) == sym_scope)
        };
        self.pkg_mut().sym_mut(id).is_top_level = is_top_level;

        // Local variables keep their bare names.
        let prepend_scope =
            !(matches!(self.pkg().sym(id).kind, SymbolKind::Var { .. }) && !is_top_level);
        let mangled = self.generate_mangled_name(id, prepend_scope);
        self.pkg_mut().sym_mut(id).mangled_name = Some(mangled);

        let is_func = matches!(
            self.pkg().sym(id).kind,
            SymbolKind::Func { .. } | SymbolKind::OverloadSet { .. }
        );
        if is_top_level || is_func {
            self.pkg_mut().reachable_symbols.push(id);
        }
    }

    /// Check an imported package that is still in its `Check` stage: run
    /// its shallow walk so its top-level symbols become visible, and leave
    /// per-symbol resolution to first use.
    fn check_sub_package(&mut self, package: PackageId) {
        if self.unit.pkg(package).stage != Stage::Check {
            return;
        }
        let saved = self.switch_package(package);
        self.shallow_walk();
        self.restore_context(saved);

        let stage = if self.unit.pkg(package).had_errors {
            Stage::Failed
        } else {
            Stage::Codegen
        };
        self.unit.pkg_mut(package).stage = stage;
    }

    pub(crate) fn switch_package(&mut self, pkg: PackageId) -> SavedContext {
        let global = self.unit.pkg(pkg).global_scope;
        SavedContext {
            pkg: std::mem::replace(&mut self.pkg, pkg),
            scope_stack: std::mem::replace(&mut self.scope_stack, vec![global]),
            func_stack: std::mem::take(&mut self.func_stack),
            expected_types: std::mem::take(&mut self.expected_types),
        }
    }

    pub(crate) fn restore_context(&mut self, saved: SavedContext) {
        self.pkg = saved.pkg;
        self.scope_stack = saved.scope_stack;
        self.func_stack = saved.func_stack;
        self.expected_types = saved.expected_types;
    }

    // ===== Shallow walk =====

    /// Register every file's top-level declarations, deferring
    /// compile-time `if` blocks, then evaluate those and register the
    /// winning branches (nested `if`s re-enter the worklist).
    pub(crate) fn shallow_walk(&mut self) {
        let mut compile_ifs: Vec<DeclId> = Vec::new();

        let file_count = self.pkg().files.len();
        for file in 0..file_count {
            let decls = self.pkg().files[file].decls.clone();
            for decl in decls {
                if matches!(self.pkg().ast.decl(decl).kind, DeclKind::If { .. }) {
                    compile_ifs.push(decl);
                } else {
                    self.shallow_process_decl(decl);
                }
            }
        }

        let mut i = 0;
        while i < compile_ifs.len() {
            let if_decl = compile_ifs[i];
            i += 1;
            let decl = self.decl(if_decl);
            let DeclKind::If { conds, bodies, else_body } = decl.kind else {
                continue;
            };

            let mut winner = None;
            for (branch, cond) in conds.iter().enumerate() {
                let cond_type = self.resolve_expr(*cond);
                let cond_loc = self.pkg().ast.expr(*cond).loc;
                if cond_type != TypeId::BOOL {
                    let shown = self.display(cond_type);
                    self.err(cond_loc, format!("if condition type '{shown}' is not a boolean"));
                }
                if self.mode(*cond) != AddressMode::Const {
                    self.err(cond_loc, "compile time if condition is not a constant");
                }
                if let Some(Value::Bool(true)) = self.value(*cond) {
                    winner = Some(branch);
                    break;
                }
            }

            let branch_decls = match winner {
                Some(branch) => bodies[branch].clone(),
                None => else_body.clone(),
            };
            for decl in branch_decls {
                if matches!(self.pkg().ast.decl(decl).kind, DeclKind::If { .. }) {
                    compile_ifs.push(decl);
                } else {
                    self.shallow_process_decl(decl);
                }
            }
        }
    }

    fn shallow_process_decl(&mut self, decl_id: DeclId) {
        let decl = self.decl(decl_id);
        let file = decl.loc.file;
        match decl.kind {
            DeclKind::Const { names, sign, values } => {
                let reflect = self.unit.keywords.reflect;
                for (i, name) in names.iter().enumerate() {
                    let kind = SymbolKind::Const {
                        decl: decl_id,
                        sign: sign.clone(),
                        value: values.get(i).copied(),
                        folded: None,
                    };
                    let id = self.add_new_symbol(Symbol::new(*name, file, self.pkg, kind));
                    if decl.tags.has(reflect) {
                        let sym = self.sym_ref(id);
                        self.unit.reflected_symbols.push(sym);
                    }
                }
            }
            DeclKind::Var { names, sign, values } => {
                for (i, name) in names.iter().enumerate() {
                    let kind = SymbolKind::Var {
                        decl: Some(decl_id),
                        sign: sign.clone(),
                        value: values.get(i).copied(),
                        is_uniform: false,
                        binding: None,
                        binding_processed: false,
                    };
                    self.add_new_symbol(Symbol::new(*name, file, self.pkg, kind));
                }
            }
            DeclKind::Func { .. } => {
                self.add_func_symbol(decl_id);
            }
            DeclKind::Struct { name, .. } => {
                let kind = SymbolKind::Struct { decl: decl_id };
                self.add_new_symbol(Symbol::new(name, file, self.pkg, kind));
            }
            DeclKind::Enum { name, .. } => {
                let kind = SymbolKind::Enum { decl: decl_id };
                self.add_new_symbol(Symbol::new(name, file, self.pkg, kind));
            }
            DeclKind::Import { path, alias } => {
                self.shallow_process_import(decl_id, file, path, alias);
            }
            DeclKind::If { .. } => {
                // Deferred by the caller.
            }
        }
    }

    fn shallow_process_import(
        &mut self,
        _decl_id: DeclId,
        file: sabre_ir::FileId,
        path: Ident,
        alias: Option<Ident>,
    ) {
        let Some(&package) = self.unit.package_paths.get(&path.name) else {
            let path_str = self.unit.strings.lookup(path.name);
            self.err(Loc::new(file, path.span), format!("cannot resolve package \"{path_str}\""));
            return;
        };

        let name = alias.unwrap_or(Ident::new(self.unit.pkg(package).name, path.span));
        let kind = SymbolKind::Package { package };
        let current_pkg = self.pkg;
        let id = self.pkg_mut().add_symbol_entry(Symbol::new(name, file, current_pkg, kind));

        // Imports land in the file scope so sibling files of the same
        // package can import the same library under the same name.
        let file_scope = self
            .pkg()
            .file_scope(file)
            .expect("import declarations always belong to a registered file");
        let added = self.add_symbol_at(id, file_scope);
        if added != id {
            let loc = self.pkg().sym(added).loc();
            let is_package = matches!(self.pkg().sym(added).kind, SymbolKind::Package { .. });
            let name_str = self.unit.strings.lookup(self.pkg().sym(added).name.name);
            let msg = if is_package {
                format!("package '{name_str}' was first imported here")
            } else {
                format!("symbol '{name_str}' was first imported here")
            };
            self.err(loc, msg);
            return;
        }

        // Add to the package global scope only once, so one import of the
        // same package from two files does not read as a redefinition.
        let global = self.pkg().global_scope;
        match self.pkg().scopes.shallow_find(global, name.name) {
            Some(old) => {
                let same_package = matches!(
                    self.pkg().sym(old).kind,
                    SymbolKind::Package { package: old_pkg } if old_pkg == package
                );
                if !same_package {
                    self.add_symbol_at(id, global);
                }
            }
            None => {
                self.add_symbol_at(id, global);
            }
        }
    }

    /// Add a function declaration, folding it into an overload set when
    /// the name is already a function.
    pub(crate) fn add_func_symbol(&mut self, decl_id: DeclId) -> SymbolId {
        let decl = self.decl(decl_id);
        let DeclKind::Func { name, .. } = decl.kind else {
            unreachable!("add_func_symbol only takes function declarations");
        };
        let file = decl.loc.file;

        let existing = self
            .pkg()
            .scopes
            .find(self.current_scope(), name.name)
            .filter(|&id| {
                matches!(
                    self.pkg().sym(id).kind,
                    SymbolKind::Func { .. } | SymbolKind::OverloadSet { .. }
                )
            });

        let Some(existing) = existing else {
            let kind = SymbolKind::Func { decl: decl_id };
            return self.add_new_symbol(Symbol::new(name, file, self.pkg, kind));
        };

        // Convert a plain function symbol into an overload set in place,
        // keeping its identity in every scope that indexed it.
        if let SymbolKind::Func { decl: first_decl } = self.pkg().sym(existing).kind {
            if first_decl == decl_id {
                return existing;
            }
            let first_type = self.pkg().sym(existing).ty;
            self.pkg_mut().sym_mut(existing).kind =
                SymbolKind::OverloadSet { decls: vec![(first_decl, first_type)] };
        }

        let resolved = self.pkg().sym(existing).state == SymbolState::Resolved;
        let decl_type = if resolved { Some(self.resolve_func_decl(decl_id)) } else { None };

        if let SymbolKind::OverloadSet { decls } = &mut self.pkg_mut().sym_mut(existing).kind {
            decls.push((decl_id, decl_type));
        }

        if let Some(decl_type) = decl_type {
            self.check_duplicate_overload(existing, decl_id, decl_type);
            self.resolve_func_body(decl_id, decl_type);
        }
        existing
    }

    // ===== Mangled names =====

    /// Concatenate enclosing scope names and the symbol name, then bump a
    /// counter when the result collides with a name generated earlier in
    /// any ancestor scope.
    fn generate_mangled_name(&mut self, id: SymbolId, prepend_scope: bool) -> Name {
        let strings = std::rc::Rc::clone(&self.unit.strings);
        let sym_scope = self.pkg().sym(id).scope;
        let base_name = strings.lookup(self.pkg().sym(id).name.name);

        let mut result = String::new();
        if prepend_scope {
            let mut prefixes = Vec::new();
            let mut current = sym_scope;
            while let Some(scope) = current {
                let scope_ref = self.pkg().scopes.get(scope);
                if !scope_ref.name.is_empty() {
                    prefixes.push(strings.lookup(scope_ref.name));
                }
                current = scope_ref.parent;
            }
            for prefix in prefixes.iter().rev() {
                result.push_str(prefix);
                result.push('_');
            }
        }
        result.push_str(base_name);
        let interned = strings.intern(&result);

        let Some(sym_scope) = sym_scope else {
            return interned;
        };

        // Search ancestors for an earlier use of this generated name.
        let mut current = Some(sym_scope);
        while let Some(scope) = current {
            let parent = self.pkg().scopes.get(scope).parent;
            let counter = self
                .pkg_mut()
                .scopes
                .get_mut(scope)
                .generated_names
                .get_mut(&interned)
                .map(|count| {
                    *count += 1;
                    *count
                });
            if let Some(count) = counter {
                let renamed = format!("{result}_{count}");
                return strings.intern(&renamed);
            }
            current = parent;
        }

        self.pkg_mut()
            .scopes
            .get_mut(sym_scope)
            .generated_names
            .insert(interned, 1);
        interned
    }
}
