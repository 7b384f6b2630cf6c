//! Compiler driver library: the filesystem package loader and the
//! lex → parse → check pipeline.
//!
//! A package is a directory of `.sabre` files (or a single file). Imports
//! are loaded up front, transitively, so the typer can resolve any quoted
//! import path to an already-registered package.

pub mod tracing_setup;

use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rustc_hash::FxHashMap;
use sabre_ir::{DeclKind, Name, StringInterner};
use sabre_typeck::{check_package, PackageId, Stage, SymbolKind, Unit};

/// Everything a compilation produced; diagnostics live on the unit.
pub struct CompileResult {
    pub unit: Unit,
    pub root: PackageId,
}

impl CompileResult {
    pub fn succeeded(&self) -> bool {
        self.unit.pkg(self.root).stage == Stage::Codegen
    }
}

/// Load and type-check the package at `path`.
pub fn compile(path: &Path) -> io::Result<CompileResult> {
    let strings = Rc::new(StringInterner::new());
    let mut unit = Unit::new(Rc::clone(&strings));

    let mut loader = Loader::default();
    let root = loader.load_package(&mut unit, path)?;

    check_package(&mut unit, root);
    Ok(CompileResult { unit, root })
}

/// Tracks filesystem packages already loaded so diamond imports share one
/// package value.
#[derive(Default)]
struct Loader {
    loaded: FxHashMap<PathBuf, PackageId>,
}

impl Loader {
    fn load_package(&mut self, unit: &mut Unit, path: &Path) -> io::Result<PackageId> {
        let canonical = path.canonicalize()?;
        if let Some(&package) = self.loaded.get(&canonical) {
            return Ok(package);
        }

        let name_str = canonical
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "main".to_string());
        let name = unit.strings.intern(&name_str);
        let package = unit.add_package(name);
        self.loaded.insert(canonical.clone(), package);

        let (base_dir, files) = collect_package_files(&canonical)?;
        tracing::debug!(package = name_str, files = files.len(), "loading package");

        let mut imports: Vec<Name> = Vec::new();
        for file_path in files {
            let text = std::fs::read_to_string(&file_path)?;
            let file = unit.sources.add(file_path.to_string_lossy().into_owned(), text);
            let tokens = {
                let source = &unit.sources.file(file).text;
                sabre_lexer::lex(source, &unit.strings)
            };

            let strings = Rc::clone(&unit.strings);
            let decls = {
                let pkg = &mut unit.packages[package.index()];
                sabre_parse::parse_file(&tokens, file, &strings, &mut pkg.ast, &mut unit.diags)
            };

            for &decl in &decls {
                if let DeclKind::Import { path, .. } = &unit.pkg(package).ast.decl(decl).kind {
                    imports.push(path.name);
                }
            }
            unit.add_file(package, file, decls);
        }

        for import in imports {
            let written = unit.strings.lookup(import).to_string();
            let target = resolve_import_path(&base_dir, &written);
            match target {
                Some(target) => {
                    let sub = self.load_package(unit, &target)?;
                    unit.register_package_path(import, sub);
                }
                None => {
                    // The typer reports unresolvable imports at their use
                    // site.
                    tracing::warn!(path = written, "import path does not exist");
                }
            }
        }

        Ok(package)
    }
}

/// The files of a package: a directory's `.sabre` files in name order, or
/// the single named file.
fn collect_package_files(path: &Path) -> io::Result<(PathBuf, Vec<PathBuf>)> {
    if path.is_dir() {
        let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "sabre"))
            .collect();
        files.sort();
        Ok((path.to_path_buf(), files))
    } else {
        let base = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        Ok((base, vec![path.to_path_buf()]))
    }
}

/// Resolve a quoted import path against the importing package's directory:
/// a sibling directory, or a file with the `.sabre` extension appended.
fn resolve_import_path(base_dir: &Path, written: &str) -> Option<PathBuf> {
    let as_dir = base_dir.join(written);
    if as_dir.is_dir() {
        return Some(as_dir);
    }
    let as_file = base_dir.join(format!("{written}.sabre"));
    if as_file.is_file() {
        return Some(as_file);
    }
    None
}

/// Render the typer's output surface: reachable symbols with mangled
/// names and resolved types, then each entry point with its assigned
/// bindings.
pub fn dump_symbols(result: &CompileResult, out: &mut impl io::Write) -> io::Result<()> {
    let unit = &result.unit;
    let pkg = unit.pkg(result.root);

    writeln!(out, "reachable symbols:")?;
    for &sym_id in &pkg.reachable_symbols {
        let sym = pkg.sym(sym_id);
        let shown_name = sym
            .mangled_name
            .map(|n| unit.strings.lookup(n))
            .unwrap_or_else(|| unit.strings.lookup(sym.name.name));
        let ty = sym
            .ty
            .map(|t| unit.types.display(t, &unit.strings))
            .unwrap_or_else(|| "?".to_string());
        writeln!(out, "  {shown_name}: {ty}")?;
    }

    for entry in &pkg.entry_points {
        let sym = pkg.sym(entry.symbol);
        let name = unit.strings.lookup(sym.name.name);
        writeln!(out, "entry {} {name}:", entry.mode)?;
        for (label, resources) in [
            ("textures", &entry.textures),
            ("samplers", &entry.samplers),
            ("uniforms", &entry.uniforms),
        ] {
            for &res in resources {
                let res_sym = unit.sym(res);
                let res_name = unit.strings.lookup(res_sym.name.name);
                let binding = match res_sym.kind {
                    SymbolKind::Var { binding: Some(b), .. } => b,
                    _ => -1,
                };
                writeln!(out, "  {label}[{binding}] = {res_name}")?;
            }
        }
    }
    Ok(())
}
