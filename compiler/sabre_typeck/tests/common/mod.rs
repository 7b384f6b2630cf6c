//! Shared helpers: build units from in-memory sources and inspect the
//! typer's results.

use std::rc::Rc;

use sabre_ir::StringInterner;
use sabre_typeck::{check_package, PackageId, Symbol, SymbolKind, Unit};

/// Build a unit from root-package sources plus `(import path, source)`
/// pairs for importable packages, then check the root package.
pub fn check_sources(root_files: &[&str], imports: &[(&str, &str)]) -> (Unit, PackageId) {
    let strings = Rc::new(StringInterner::new());
    let mut unit = Unit::new(Rc::clone(&strings));

    for (path, source) in imports {
        let name_str = path.rsplit('/').next().unwrap_or(path);
        let name = unit.strings.intern(name_str);
        let package = unit.add_package(name);
        add_source(&mut unit, package, &format!("{path}.sabre"), source);
        let path_name = unit.strings.intern(path);
        unit.register_package_path(path_name, package);
    }

    let root_name = unit.strings.intern("main");
    let root = unit.add_package(root_name);
    for (i, source) in root_files.iter().enumerate() {
        add_source(&mut unit, root, &format!("main{i}.sabre"), source);
    }

    check_package(&mut unit, root);
    (unit, root)
}

pub fn check(source: &str) -> (Unit, PackageId) {
    check_sources(&[source], &[])
}

fn add_source(unit: &mut Unit, package: PackageId, path: &str, source: &str) {
    let file = unit.sources.add(path, source);
    let tokens = sabre_lexer::lex(source, &unit.strings);
    let strings = Rc::clone(&unit.strings);
    let decls = {
        let pkg = &mut unit.packages[package.index()];
        sabre_parse::parse_file(&tokens, file, &strings, &mut pkg.ast, &mut unit.diags)
    };
    unit.add_file(package, file, decls);
}

/// All diagnostic messages, for substring assertions.
pub fn messages(unit: &Unit) -> Vec<String> {
    unit.diags.all().iter().map(|d| d.message.clone()).collect()
}

#[track_caller]
pub fn assert_no_errors(unit: &Unit) {
    assert!(
        !unit.diags.has_errors(),
        "unexpected errors: {:#?}",
        messages(unit)
    );
}

#[track_caller]
pub fn assert_error_containing(unit: &Unit, needle: &str) {
    assert!(
        messages(unit).iter().any(|m| m.contains(needle)),
        "no diagnostic contains {needle:?}; got {:#?}",
        messages(unit)
    );
}

/// Look a top-level symbol up by name in the package global scope.
pub fn global_symbol<'a>(unit: &'a Unit, package: PackageId, name: &str) -> &'a Symbol {
    let pkg = unit.pkg(package);
    let name = unit.strings.intern(name);
    let id = pkg
        .scopes
        .shallow_find(pkg.global_scope, name)
        .unwrap_or_else(|| panic!("no global symbol named {:?}", unit.strings.lookup(name)));
    pkg.sym(id)
}

/// Render a symbol's resolved type.
pub fn type_of(unit: &Unit, package: PackageId, name: &str) -> String {
    let sym = global_symbol(unit, package, name);
    let ty = sym.ty.expect("symbol should be resolved");
    unit.types.display(ty, &unit.strings)
}

/// Count function instantiations on the reachable list.
pub fn reachable_instantiations(unit: &Unit, package: PackageId) -> usize {
    let pkg = unit.pkg(package);
    pkg.reachable_symbols
        .iter()
        .filter(|&&id| matches!(pkg.sym(id).kind, SymbolKind::FuncInstantiation { .. }))
        .count()
}
