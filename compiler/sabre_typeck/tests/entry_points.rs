//! Entry-point validation and uniform binding assignment.

mod common;

use common::{assert_error_containing, assert_no_errors, check, global_symbol};
use sabre_typeck::{EntryMode, PackageId, SymbolKind, Unit};

fn binding_of(unit: &Unit, pkg: PackageId, name: &str) -> Option<i64> {
    match global_symbol(unit, pkg, name).kind {
        SymbolKind::Var { binding, .. } => binding,
        _ => None,
    }
}

#[test]
fn auto_bindings_count_up_in_declaration_order() {
    let (unit, pkg) = check(
        "@uniform var t0: texture2d;\n\
         @uniform var t1: texture2d;",
    );
    assert_no_errors(&unit);
    assert_eq!(binding_of(&unit, pkg, "t0"), Some(0));
    assert_eq!(binding_of(&unit, pkg, "t1"), Some(1));
}

#[test]
fn explicit_binding_advances_the_generator() {
    let (unit, pkg) = check(
        "@uniform{binding = 3} var fixed_tex: texture2d;\n\
         @uniform var auto_tex: texture2d;",
    );
    assert_no_errors(&unit);
    assert_eq!(binding_of(&unit, pkg, "fixed_tex"), Some(3));
    assert_eq!(binding_of(&unit, pkg, "auto_tex"), Some(4));
}

#[test]
fn binding_generators_are_independent_per_resource_kind() {
    let (unit, pkg) = check(
        "@uniform var tex: texture2d;\n\
         @uniform var smp: sampler;\n\
         @uniform var color: vec4;",
    );
    assert_no_errors(&unit);
    assert_eq!(binding_of(&unit, pkg, "tex"), Some(0));
    assert_eq!(binding_of(&unit, pkg, "smp"), Some(0));
    assert_eq!(binding_of(&unit, pkg, "color"), Some(0));
}

#[test]
fn duplicate_binding_is_reported() {
    let (unit, _) = check(
        "@uniform{binding = 0} var a: texture2d;\n\
         @uniform{binding = 0} var b: texture2d;",
    );
    assert_error_containing(&unit, "texture binding point 0 is shared");
}

#[test]
fn uniform_type_must_be_uniform_legal() {
    let (unit, _) = check("@uniform var bad: []float;");
    assert_error_containing(&unit, "cannot be used in a uniform");
}

#[test]
fn uniform_struct_with_texture_field_is_reported() {
    let (unit, _) = check(
        "struct Material { tex: texture2d; tint: vec4; }\n\
         @uniform var mat: Material;",
    );
    assert_error_containing(&unit, "cannot be used for uniform");
}

#[test]
fn entry_points_are_collected_with_modes() {
    let (unit, pkg) = check(
        "struct VOut { @sv_position pos: vec4; }\n\
         @vertex func vs_main(p: vec3): VOut { return VOut{vec4{p, 1.0}}; }\n\
         @pixel func ps_main(input: VOut): vec4 { return input.pos; }",
    );
    assert_no_errors(&unit);
    let entries = &unit.pkg(pkg).entry_points;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].mode, EntryMode::Vertex);
    assert_eq!(entries[1].mode, EntryMode::Pixel);
}

#[test]
fn entry_crawl_attaches_reachable_uniforms() {
    let (unit, pkg) = check(
        "@uniform var tex: texture2d;\n\
         @uniform var smp: sampler;\n\
         struct VOut { @sv_position pos: vec4; }\n\
         @vertex func vs_main(p: vec3): VOut {\n\
             var t = tex;\n\
             var s = smp;\n\
             return VOut{vec4{p, 1.0}};\n\
         }",
    );
    assert_no_errors(&unit);
    let entry = &unit.pkg(pkg).entry_points[0];
    assert_eq!(entry.textures.len(), 1);
    assert_eq!(entry.samplers.len(), 1);
    assert!(entry.uniforms.is_empty());
}

#[test]
fn unreferenced_uniforms_still_get_bindings() {
    let (unit, pkg) = check(
        "struct VOut { @sv_position pos: vec4; }\n\
         @vertex func vs_main(p: vec3): VOut { return VOut{vec4{p, 1.0}}; }\n\
         @uniform var unused_tex: texture2d;",
    );
    assert_no_errors(&unit);
    assert_eq!(binding_of(&unit, pkg, "unused_tex"), Some(0));
    assert!(unit.pkg(pkg).entry_points[0].textures.is_empty());
}

#[test]
fn sv_position_must_be_vec4() {
    let (unit, _) = check(
        "struct VOut { @sv_position pos: vec3; }\n\
         @vertex func vs_main(p: vec3): VOut { return VOut{p}; }",
    );
    assert_error_containing(&unit, "system position type is 'vec3', but it should be 'vec4'");
}

#[test]
fn sv_depth_must_be_float() {
    let (unit, _) = check(
        "struct POut { @sv_depth depth: int; @sv_position pos: vec4; }\n\
         @pixel func ps_main(): POut { return POut{1, vec4{0.0, 0.0, 0.0, 1.0}}; }",
    );
    assert_error_containing(&unit, "system depth type is 'int', but it should be 'float'");
}

#[test]
fn shader_io_rejects_opaque_free_types() {
    let (unit, _) = check(
        "enum Mode { A, B }\n\
         @vertex func vs_main(m: Mode): vec4 { return vec4{0.0, 0.0, 0.0, 1.0}; }",
    );
    assert_error_containing(&unit, "cannot be used as shader input");
}

#[test]
fn geometry_requires_max_vertex_count() {
    let (unit, _) = check(
        "@geometry func gs_main(stream: triangle_stream) { }",
    );
    assert_error_containing(&unit, "max vertex count tag argument");
}

#[test]
fn geometry_with_stream_and_count_is_legal() {
    let (unit, _) = check(
        "@geometry{max_vertex_count = 6} func gs_main(stream: triangle_stream) { }",
    );
    assert_no_errors(&unit);
}

#[test]
fn geometry_must_return_void() {
    let (unit, _) = check(
        "@geometry{max_vertex_count = 6} func gs_main(stream: triangle_stream): vec4 {\n\
             return vec4{0.0, 0.0, 0.0, 1.0};\n\
         }",
    );
    assert_error_containing(&unit, "geometry shader return type should be void");
}

#[test]
fn streams_are_rejected_outside_geometry_entries() {
    let (unit, _) = check(
        "@vertex func vs_main(stream: triangle_stream): vec4 {\n\
             return vec4{0.0, 0.0, 0.0, 1.0};\n\
         }",
    );
    assert_error_containing(&unit, "cannot be used as shader input");
}

#[test]
fn failed_unit_skips_codegen_stage() {
    let (unit, pkg) = check("const X = nope;");
    assert_eq!(unit.pkg(pkg).stage, sabre_typeck::Stage::Failed);

    let (unit, pkg) = check("const X = 1;");
    assert_eq!(unit.pkg(pkg).stage, sabre_typeck::Stage::Codegen);
}
