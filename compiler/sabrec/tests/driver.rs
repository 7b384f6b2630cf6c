//! Driver tests: filesystem package loading, import resolution, and the
//! dump output surface.

use std::fs;

use tempfile::TempDir;

const VERTEX_SHADER: &str = "\
struct VOut { @sv_position pos: vec4; }

@uniform var tint: vec4;

@vertex
func vs_main(p: vec3): VOut {
    var unused = tint;
    return VOut{vec4{p, 1.0}};
}
";

#[test]
fn compile_package_from_directory() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("shader.sabre"), VERTEX_SHADER).unwrap();

    let result = sabrec::compile(dir.path()).unwrap();
    assert!(
        result.succeeded(),
        "expected success, diagnostics: {:#?}",
        result.unit.diags.all()
    );

    let mut out = Vec::new();
    sabrec::dump_symbols(&result, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("reachable symbols:"), "got: {text}");
    assert!(text.contains("entry vertex vs_main:"), "got: {text}");
    assert!(text.contains("uniforms[0] = tint"), "got: {text}");
}

#[test]
fn compile_single_file_package() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("solo.sabre");
    fs::write(&file, "const K = 2 * 21;").unwrap();

    let result = sabrec::compile(&file).unwrap();
    assert!(result.succeeded());
}

#[test]
fn imports_resolve_against_the_package_directory() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("mathlib")).unwrap();
    fs::write(
        dir.path().join("mathlib/constants.sabre"),
        "const TAU = 6.28318;",
    )
    .unwrap();
    fs::write(
        dir.path().join("shader.sabre"),
        "import \"mathlib\" as mathlib;\nconst T = mathlib.TAU;\n",
    )
    .unwrap();

    let result = sabrec::compile(dir.path()).unwrap();
    assert!(
        result.succeeded(),
        "expected success, diagnostics: {:#?}",
        result.unit.diags.all()
    );
}

#[test]
fn type_errors_fail_the_unit() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("bad.sabre");
    fs::write(&file, "const X: int = true;").unwrap();

    let result = sabrec::compile(&file).unwrap();
    assert!(!result.succeeded());
    assert!(result.unit.diags.has_errors());
}

#[test]
fn missing_import_is_a_diagnostic_not_a_panic() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("lonely.sabre");
    fs::write(&file, "import \"nowhere\" as nowhere;").unwrap();

    let result = sabrec::compile(&file).unwrap();
    assert!(!result.succeeded());
}
