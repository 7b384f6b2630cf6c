//! The compilation unit and its packages.

use std::rc::Rc;

use crate::scope::{Scope, ScopeArena, ScopeFlags, ScopeId, ScopeOwner};
use crate::symbol::{AddressMode, EntryPoint, Symbol, SymbolId};
use rustc_hash::FxHashMap;
use sabre_diagnostic::{DiagnosticList, SourceMap};
use sabre_ir::{AstArena, DeclId, ExprId, FileId, Name, StringInterner};
use sabre_types::{SymRef, TypeId, TypeInterner, Value};

/// Id of a [`Package`] within a [`Unit`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct PackageId(pub u32);

impl PackageId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Compilation stage of a package.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Stage {
    Check,
    Codegen,
    Failed,
}

/// One source file of a package: its registered source, its file scope
/// (imports live there), and its top-level declarations.
#[derive(Debug)]
pub struct UnitFile {
    pub source: FileId,
    pub scope: ScopeId,
    pub decls: Vec<DeclId>,
}

/// Pre-interned tag and argument names the typer consumes.
#[derive(Debug)]
pub struct Keywords {
    pub uniform: Name,
    pub vertex: Name,
    pub pixel: Name,
    pub geometry: Name,
    pub reflect: Name,
    pub binding: Name,
    pub max_vertex_count: Name,
    pub sv_position: Name,
    pub sv_depth: Name,
}

impl Keywords {
    fn new(strings: &StringInterner) -> Self {
        Keywords {
            uniform: strings.intern("uniform"),
            vertex: strings.intern("vertex"),
            pixel: strings.intern("pixel"),
            geometry: strings.intern("geometry"),
            reflect: strings.intern("reflect"),
            binding: strings.intern("binding"),
            max_vertex_count: strings.intern("max_vertex_count"),
            sv_position: strings.intern("sv_position"),
            sv_depth: strings.intern("sv_depth"),
        }
    }
}

/// A package: a group of files checked together, with its own scopes,
/// symbols, AST arena and per-expression typing tables.
#[derive(Debug)]
pub struct Package {
    pub name: Name,
    pub stage: Stage,
    pub files: Vec<UnitFile>,
    pub ast: AstArena,
    pub scopes: ScopeArena,
    pub symbols: Vec<Symbol>,
    pub global_scope: ScopeId,
    pub entry_points: Vec<EntryPoint>,
    /// Resolved symbols in first-resolution order; consumed by code
    /// generation.
    pub reachable_symbols: Vec<SymbolId>,
    pub had_errors: bool,

    // Per-expression results of the typer.
    pub expr_types: FxHashMap<ExprId, TypeId>,
    pub expr_modes: FxHashMap<ExprId, AddressMode>,
    pub expr_values: FxHashMap<ExprId, Value>,
    pub expr_symbols: FxHashMap<ExprId, SymRef>,
    /// Resolved callee declaration per call expression.
    pub call_targets: FxHashMap<ExprId, DeclId>,
    /// Owning scope per AST node, discoverable for re-entry.
    pub scope_table: FxHashMap<ScopeOwner, ScopeId>,
    /// Resolved function types per declaration.
    pub decl_types: FxHashMap<DeclId, TypeId>,
}

impl Package {
    fn new(name: Name) -> Self {
        let mut scopes = ScopeArena::new();
        let global_scope = scopes.add(Scope::new(None, name, ScopeFlags::NONE));
        Package {
            name,
            stage: Stage::Check,
            files: Vec::new(),
            ast: AstArena::new(),
            scopes,
            symbols: Vec::new(),
            global_scope,
            entry_points: Vec::new(),
            reachable_symbols: Vec::new(),
            had_errors: false,
            expr_types: FxHashMap::default(),
            expr_modes: FxHashMap::default(),
            expr_values: FxHashMap::default(),
            expr_symbols: FxHashMap::default(),
            call_targets: FxHashMap::default(),
            scope_table: FxHashMap::default(),
            decl_types: FxHashMap::default(),
        }
    }

    pub fn sym(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn sym_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    pub fn add_symbol_entry(&mut self, sym: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(sym);
        id
    }

    /// The file scope for a registered source file.
    pub fn file_scope(&self, source: FileId) -> Option<ScopeId> {
        self.files.iter().find(|f| f.source == source).map(|f| f.scope)
    }
}

/// A whole compilation: every package, the shared type interner, string
/// interner, source map and diagnostic buffer.
pub struct Unit {
    pub strings: Rc<StringInterner>,
    pub types: TypeInterner,
    pub sources: SourceMap,
    pub diags: DiagnosticList,
    pub packages: Vec<Package>,
    /// Import path → package, filled by the loader before checking.
    pub package_paths: FxHashMap<Name, PackageId>,
    /// Stack of symbols currently being resolved; tops collect dependency
    /// edges.
    pub symbol_stack: Vec<SymRef>,
    /// Binding index → symbol, one map per resource kind.
    pub reachable_textures: FxHashMap<i64, SymRef>,
    pub reachable_samplers: FxHashMap<i64, SymRef>,
    pub reachable_uniforms: FxHashMap<i64, SymRef>,
    /// Every uniform variable, in resolution order.
    pub all_uniforms: Vec<SymRef>,
    /// Constants tagged `@reflect`.
    pub reflected_symbols: Vec<SymRef>,
    pub keywords: Keywords,
}

impl Unit {
    pub fn new(strings: Rc<StringInterner>) -> Self {
        let keywords = Keywords::new(&strings);
        Unit {
            strings,
            types: TypeInterner::new(),
            sources: SourceMap::new(),
            diags: DiagnosticList::new(),
            packages: Vec::new(),
            package_paths: FxHashMap::default(),
            symbol_stack: Vec::new(),
            reachable_textures: FxHashMap::default(),
            reachable_samplers: FxHashMap::default(),
            reachable_uniforms: FxHashMap::default(),
            all_uniforms: Vec::new(),
            reflected_symbols: Vec::new(),
            keywords,
        }
    }

    pub fn add_package(&mut self, name: Name) -> PackageId {
        let id = PackageId(self.packages.len() as u32);
        self.packages.push(Package::new(name));
        id
    }

    /// Make an import path resolvable.
    pub fn register_package_path(&mut self, path: Name, package: PackageId) {
        self.package_paths.insert(path, package);
    }

    pub fn pkg(&self, id: PackageId) -> &Package {
        &self.packages[id.index()]
    }

    pub fn pkg_mut(&mut self, id: PackageId) -> &mut Package {
        &mut self.packages[id.index()]
    }

    /// Register a file of `package`. Creates the file scope (parented at
    /// the package global scope).
    pub fn add_file(&mut self, package: PackageId, source: FileId, decls: Vec<DeclId>) {
        let pkg = self.pkg_mut(package);
        let scope = pkg
            .scopes
            .add(Scope::new(Some(pkg.global_scope), Name::EMPTY, ScopeFlags::NONE));
        pkg.files.push(UnitFile { source, scope, decls });
    }

    pub fn sym(&self, sym: SymRef) -> &Symbol {
        self.packages[sym.package as usize].sym(SymbolId(sym.symbol))
    }

    pub fn sym_mut(&mut self, sym: SymRef) -> &mut Symbol {
        self.packages[sym.package as usize].sym_mut(SymbolId(sym.symbol))
    }

    /// Whether the unit produced any hard error.
    pub fn has_errors(&self) -> bool {
        self.diags.has_errors()
    }
}
