//! End-to-end typer tests over source snippets: resolution, folding,
//! compile-time `if`, templates, overloads, and the statement rules.

mod common;

use common::{
    assert_error_containing, assert_no_errors, check, check_sources, global_symbol, messages,
    reachable_instantiations, type_of,
};
use sabre_typeck::SymbolKind;
use sabre_types::Value;

fn const_value(unit: &sabre_typeck::Unit, pkg: sabre_typeck::PackageId, name: &str) -> Value {
    match &global_symbol(unit, pkg, name).kind {
        SymbolKind::Const { folded: Some(value), .. } => value.clone(),
        other => panic!("expected a folded constant for {name}, got {other:?}"),
    }
}

// ===== Constants and folding =====

#[test]
fn const_folding_works() {
    let (unit, pkg) = check("const X = 6 * 7;");
    assert_no_errors(&unit);
    assert_eq!(const_value(&unit, pkg, "X"), Value::Int(42));
}

#[test]
fn multi_name_declarations_pair_positionally() {
    let (unit, pkg) = check("const x, y = 1, 2.5;");
    assert_no_errors(&unit);
    assert_eq!(const_value(&unit, pkg, "x"), Value::Int(1));
    assert_eq!(const_value(&unit, pkg, "y"), Value::Double(2.5));
}

#[test]
fn cast_preserves_constant_value() {
    let (unit, pkg) = check("const X = 7 : float;");
    assert_no_errors(&unit);
    assert_eq!(const_value(&unit, pkg, "X"), Value::Int(7));
    assert_eq!(type_of(&unit, pkg, "X"), "float");
}

#[test]
fn reflected_constants_are_recorded() {
    let (unit, _) = check("@reflect const K = 3;");
    assert_no_errors(&unit);
    assert_eq!(unit.reflected_symbols.len(), 1);
}

#[test]
fn const_requires_compile_time_value() {
    let (unit, _) = check("var v = 1; const X = v;");
    assert_error_containing(&unit, "cannot be evaluated in compile time");
}

#[test]
fn const_type_annotation_is_checked() {
    let (unit, _) = check("const X: int = 1.5;");
    assert_error_containing(&unit, "type mismatch");
}

#[test]
fn lit_int_fits_int_but_negative_rejected_for_uint() {
    let (unit, _) = check("const A: int = -1;");
    assert_no_errors(&unit);

    let (unit, _) = check("const B: uint = -1;");
    assert_error_containing(&unit, "type mismatch");
}

#[test]
fn lit_float_assignability_table() {
    // 1.5 fits floats and doubles only.
    let (unit, _) = check("const A: float = 1.5; const B: double = 1.5;");
    assert_no_errors(&unit);

    let (unit, _) = check("const C: int = 1.5;");
    assert_error_containing(&unit, "type mismatch");

    let (unit, _) = check("const D: uint = 1.5;");
    assert_error_containing(&unit, "type mismatch");

    // A fraction-free non-negative float literal is accepted by uint.
    let (unit, _) = check("const E: uint = 2.0;");
    assert_no_errors(&unit);
}

#[test]
fn cyclic_consts_are_reported() {
    let (unit, _) = check("const X = Y; const Y = X;");
    assert_error_containing(&unit, "cyclic dependency");
}

#[test]
fn undefined_symbol_is_reported() {
    let (unit, _) = check("const X = nope;");
    assert_error_containing(&unit, "undefined symbol");
}

#[test]
fn symbol_redefinition_is_reported() {
    let (unit, _) = check("const X = 1; const X = 2;");
    assert_error_containing(&unit, "redefinition");
}

// ===== Compile-time if =====

#[test]
fn compile_time_if_selects_first_true_branch() {
    let (unit, pkg) = check(
        "const BUILD_DEBUG = true;\n\
         if BUILD_DEBUG { const X = 1; } else { const X = 2; }",
    );
    assert_no_errors(&unit);
    assert_eq!(const_value(&unit, pkg, "X"), Value::Int(1));
}

#[test]
fn compile_time_if_falls_back_to_else() {
    let (unit, pkg) = check(
        "const BUILD_DEBUG = false;\n\
         if BUILD_DEBUG { const X = 1; } else { const X = 2; }",
    );
    assert_no_errors(&unit);
    assert_eq!(const_value(&unit, pkg, "X"), Value::Int(2));
}

#[test]
fn compile_time_if_requires_constant_bool() {
    let (unit, _) = check("var flag = true; if flag { const X = 1; } else { const X = 2; }");
    assert_error_containing(&unit, "compile time if condition is not a constant");

    let (unit, _) = check("if 1 { const X = 1; } else { const X = 2; }");
    assert_error_containing(&unit, "is not a boolean");
}

#[test]
fn nested_compile_time_if() {
    let (unit, pkg) = check(
        "const A = true; const B = true;\n\
         if A { if B { const X = 3; } else { const X = 4; } } else { const X = 5; }",
    );
    assert_no_errors(&unit);
    assert_eq!(const_value(&unit, pkg, "X"), Value::Int(3));
}

// ===== Vectors, swizzles, matrices =====

#[test]
fn swizzle_roundtrip_typechecks() {
    let (unit, _) = check(
        "func f() {\n\
         var v = vec4{0.0, 0.0, 0.0, 0.0};\n\
         v.xyzw = v.wzyx;\n\
         }",
    );
    assert_no_errors(&unit);
}

#[test]
fn swizzle_width_mismatch_is_reported() {
    let (unit, _) = check(
        "func f() {\n\
         var v = vec4{0.0, 0.0, 0.0, 0.0};\n\
         v.xy = v.xyz;\n\
         }",
    );
    assert_error_containing(&unit, "type mismatch in assignment");
}

#[test]
fn swizzle_styles_cannot_mix() {
    let (unit, _) = check("var v = vec4{0.0, 0.0, 0.0, 0.0}; var w = v.rx;");
    assert_error_containing(&unit, "illegal vector field");
}

#[test]
fn swizzle_rgba_on_vec4() {
    let (unit, pkg) = check("var v = vec4{0.0, 0.0, 0.0, 0.0}; var w = v.rgba;");
    assert_no_errors(&unit);
    assert_eq!(type_of(&unit, pkg, "w"), "vec4");
}

#[test]
fn swizzle_out_of_range_on_narrow_vector() {
    let (unit, _) = check("var v = vec2{0.0, 0.0}; var w = v.xyz;");
    assert_error_containing(&unit, "vector field out of range");
}

#[test]
fn single_component_swizzle_is_scalar() {
    let (unit, pkg) = check("var v = vec3{1.0, 2.0, 3.0}; var x = v.x;");
    assert_no_errors(&unit);
    assert_eq!(type_of(&unit, pkg, "x"), "float");
}

#[test]
fn matrix_vector_multiplication() {
    let (unit, _) = check(
        "func f(m: mat4, v: vec4): vec4 { return m * v; }\n\
         func g(m: mat4, v: vec4): vec4 { return v * m; }\n\
         func h(m: mat4, v: vec4) { v *= m; }",
    );
    assert_no_errors(&unit);
}

#[test]
fn matrix_vector_width_mismatch() {
    let (unit, _) = check("func f(m: mat3, v: vec4): vec4 { return m * v; }");
    assert_error_containing(&unit, "width mismatch");
}

#[test]
fn vector_scalar_arithmetic() {
    let (unit, pkg) = check("var v = vec3{1.0, 2.0, 3.0}; var w = v * 2.0; var u = 2.0 * v;");
    assert_no_errors(&unit);
    assert_eq!(type_of(&unit, pkg, "w"), "vec3");
    assert_eq!(type_of(&unit, pkg, "u"), "vec3");
}

#[test]
fn vector_comparison_yields_bool_vector() {
    let (unit, pkg) = check(
        "var a = vec3{1.0, 2.0, 3.0};\n\
         var b = vec3{3.0, 2.0, 1.0};\n\
         var c = a == b;",
    );
    assert_no_errors(&unit);
    assert_eq!(type_of(&unit, pkg, "c"), "bvec3");
}

#[test]
fn vec4_from_vec3_positional_upcast() {
    let (unit, pkg) = check("var p = vec3{0.0, 0.0, 0.0}; var q = vec4{p, 1.0};");
    assert_no_errors(&unit);
    assert_eq!(type_of(&unit, pkg, "q"), "vec4");
}

// ===== Arrays and composite literals =====

#[test]
fn array_literal_and_indexing() {
    let (unit, pkg) = check("const A: [3]int = {1, 2, 3}; const X = A[2];");
    assert_no_errors(&unit);
    assert_eq!(const_value(&unit, pkg, "X"), Value::Int(3));
}

#[test]
fn array_index_out_of_range() {
    let (unit, _) = check("const A: [3]int = {1, 2, 3}; const X = A[3];");
    assert_error_containing(&unit, "array index out of range");
}

#[test]
fn array_index_must_be_integer() {
    let (unit, _) = check("const A: [3]int = {1, 2, 3}; const X = A[true];");
    assert_error_containing(&unit, "array index type should be an int or uint");
}

#[test]
fn unbounded_array_count_inferred_from_literal() {
    let (unit, pkg) = check("const A: []int = {1, 2};");
    assert_no_errors(&unit);
    assert_eq!(type_of(&unit, pkg, "A"), "[2]int");
}

#[test]
fn complit_named_selectors_and_duplicates() {
    let (unit, _) = check("const V = vec4{.x = 1.0, .w = 2.0};");
    assert_no_errors(&unit);

    let (unit, _) = check("const V = vec4{.x = 1.0, .x = 2.0};");
    assert_error_containing(&unit, "duplicate field");
}

#[test]
fn complit_too_many_fields() {
    let (unit, _) = check("const V = vec2{1.0, 2.0, 3.0};");
    assert_error_containing(&unit, "contains only 2 fields");
}

#[test]
fn complit_type_from_context() {
    let (unit, pkg) = check("const V: vec2 = {1.0, 2.0};");
    assert_no_errors(&unit);
    assert_eq!(type_of(&unit, pkg, "V"), "vec2");
}

#[test]
fn complit_type_unknown_without_context() {
    let (unit, _) = check("func f() { var x = {1.0, 2.0}; }");
    assert_error_containing(&unit, "could not infer composite literal type");
}

// ===== Structs and enums =====

#[test]
fn struct_fields_and_access() {
    let (unit, pkg) = check(
        "struct Light { pos: vec3; intensity: float = 1.0; }\n\
         var l = Light{vec3{0.0, 0.0, 0.0}, 2.0};\n\
         var i = l.intensity;",
    );
    assert_no_errors(&unit);
    assert_eq!(type_of(&unit, pkg, "i"), "float");
}

#[test]
fn struct_field_redefinition() {
    let (unit, _) = check("struct S { a: float; a: int; }");
    assert_error_containing(&unit, "field redefinition");
}

#[test]
fn struct_default_must_be_constant() {
    let (unit, _) = check("var v = 1.0; struct S { a: float = v; }");
    assert_error_containing(&unit, "default value should be a constant");
}

#[test]
fn cyclic_structs_are_reported() {
    let (unit, _) = check("struct A { b: B; } struct B { a: A; }");
    assert_error_containing(&unit, "recursive type");
}

#[test]
fn enum_values_sequence_with_explicit_restart() {
    let (unit, pkg) = check(
        "enum Mode { A, B = 7, C }\n\
         const X = Mode.A;\n\
         const Y = Mode.B;\n\
         const Z = Mode.C;",
    );
    assert_no_errors(&unit);
    assert_eq!(const_value(&unit, pkg, "X"), Value::Int(0));
    assert_eq!(const_value(&unit, pkg, "Y"), Value::Int(7));
    assert_eq!(const_value(&unit, pkg, "Z"), Value::Int(8));
}

#[test]
fn enum_shorthand_with_expected_type() {
    let (unit, pkg) = check("enum Mode { A, B } const M: Mode = .B;");
    assert_no_errors(&unit);
    assert_eq!(const_value(&unit, pkg, "M"), Value::Int(1));
}

#[test]
fn enum_unknown_field() {
    let (unit, _) = check("enum Mode { A } const M = Mode.Z;");
    assert_error_containing(&unit, "unknown enum field");
}

#[test]
fn enum_casts_to_int() {
    let (unit, pkg) = check("enum Mode { A, B } const M = Mode.B : int;");
    assert_no_errors(&unit);
    assert_eq!(type_of(&unit, pkg, "M"), "int");
    assert_eq!(const_value(&unit, pkg, "M"), Value::Int(1));
}

// ===== Functions, statements, termination =====

#[test]
fn function_return_type_is_checked() {
    let (unit, _) = check("func f(): int { var x: float = 1.5; return x; }");
    assert_error_containing(&unit, "incorrect return type");
}

#[test]
fn missing_return_on_if_without_else() {
    let (unit, _) = check("func f(x: bool): int { if x { return 1; } }");
    assert_error_containing(&unit, "missing return");
    assert_error_containing(&unit, "if statement is missing else branch");
}

#[test]
fn termination_satisfied_with_else() {
    let (unit, _) = check("func f(x: bool): int { if x { return 1; } else { return 0; } }");
    assert_no_errors(&unit);
}

#[test]
fn conditional_for_does_not_terminate() {
    let (unit, _) = check(
        "func f(): int { for var i = 0; i < 10; ++i { return 1; } }",
    );
    assert_error_containing(&unit, "missing return");
}

#[test]
fn break_outside_loop_is_reported() {
    let (unit, _) = check("func f() { break; }");
    assert_error_containing(&unit, "unexpected break statement");
}

#[test]
fn continue_inside_loop_is_fine() {
    let (unit, _) = check(
        "func f() { for var i = 0; i < 4; ++i { if i == 2 { continue; } } }",
    );
    assert_no_errors(&unit);
}

#[test]
fn assignment_targets_must_be_variables() {
    let (unit, _) = check("const C = 1; func f() { C = 2; }");
    assert_error_containing(&unit, "cannot assign into a constant value");

    let (unit, _) = check("func g(): int { return 1; } func f() { g() = 2; }");
    assert_error_containing(&unit, "cannot assign into a computed value");
}

#[test]
fn recursion_is_allowed() {
    let (unit, _) = check(
        "func fact(n: int): int { if n <= 1 { return 1; } else { return n * fact(n - 1); } }",
    );
    assert_no_errors(&unit);
}

#[test]
fn local_shadowing_is_allowed() {
    let (unit, _) = check("const x = 1; func f() { var x = 2.0; x = 3.0; }");
    assert_no_errors(&unit);
}

#[test]
fn call_arity_is_checked() {
    let (unit, _) = check("func f(x: int): int { return x; } var y = f(1, 2);");
    assert_error_containing(&unit, "function expected 1 arguments, but 2 were provided");
}

#[test]
fn calling_a_non_function_is_reported() {
    let (unit, _) = check("const x = 1; var y = x();");
    assert_error_containing(&unit, "invalid call, expression is not a function");
}

// ===== Templates =====

#[test]
fn template_deduction_instantiates_per_type() {
    let (unit, pkg) = check(
        "func id<T>(x: T): T { return x; }\n\
         var a = id(3);\n\
         var b = id(1.0);\n\
         var c = id(5);",
    );
    assert_no_errors(&unit);
    // Two distinct T bindings, three call sites.
    assert_eq!(reachable_instantiations(&unit, pkg), 2);
}

#[test]
fn template_deduction_conflict_is_ambiguous() {
    let (unit, _) = check(
        "func pair<T>(x: T, y: T): T { return x; }\n\
         var a = pair(1, 1.5);",
    );
    assert_error_containing(&unit, "ambiguous");
}

#[test]
fn template_body_errors_note_the_call_site() {
    let (unit, _) = check(
        "func twice<T>(x: T): T { return x * x; }\n\
         var a = twice(true);",
    );
    // The bool instantiation fails inside the body and the call site is
    // annotated with the substitution.
    assert_error_containing(&unit, "doesn't support arithmetic");
    assert!(
        unit.diags.all().iter().any(|d| d.is_note() && d.message.contains("instantiated")),
        "expected an instantiation note, got {:#?}",
        messages(&unit)
    );
}

// ===== Overloads =====

#[test]
fn overload_selects_by_argument_type() {
    let (unit, pkg) = check(
        "func f(x: int): int { return x; }\n\
         func f(x: float): float { return x; }\n\
         var a = f(2);\n\
         var b = f(2.0);",
    );
    assert_no_errors(&unit);
    assert_eq!(type_of(&unit, pkg, "a"), "int");
    assert_eq!(type_of(&unit, pkg, "b"), "float");
}

#[test]
fn overload_no_match_lists_the_set() {
    let (unit, _) = check(
        "func f(x: int): int { return x; }\n\
         func f(x: float): float { return x; }\n\
         var a = f(true);",
    );
    assert_error_containing(&unit, "cannot find suitable function");
    assert_error_containing(&unit, "func(int): int");
    assert_error_containing(&unit, "func(float): float");
}

#[test]
fn duplicate_overload_signature_is_reported() {
    let (unit, _) = check(
        "func f(x: int): int { return x; }\n\
         func f(x: int): int { return x + 1; }",
    );
    assert_error_containing(&unit, "function overload already defined");
}

#[test]
fn templated_overload_wins_by_similarity() {
    let (unit, pkg) = check(
        "func len<T>(x: T): int { return 1; }\n\
         func len(x: float): int { return 2; }\n\
         var a = len(1.5);\n\
         var b = len(true);",
    );
    // The concrete float overload takes `1.5`; the template takes `true`.
    assert_no_errors(&unit);
    assert_eq!(type_of(&unit, pkg, "a"), "int");
    assert_eq!(reachable_instantiations(&unit, pkg), 1);
}

// ===== Packages =====

#[test]
fn imported_constants_and_types_resolve() {
    let (unit, pkg) = check_sources(
        &["import \"std/colors\" as colors;\n\
           const R = colors.RED;\n\
           var c: colors.Color;"],
        &[(
            "std/colors",
            "const RED = 7; struct Color { r, g, b: float; }",
        )],
    );
    assert_no_errors(&unit);
    assert_eq!(const_value(&unit, pkg, "R"), Value::Int(7));
    assert_eq!(type_of(&unit, pkg, "c"), "Color");
}

#[test]
fn same_import_in_sibling_files_is_fine() {
    let (unit, _) = check_sources(
        &[
            "import \"std/colors\" as colors; const A = colors.RED;",
            "import \"std/colors\" as colors; const B = colors.RED;",
        ],
        &[("std/colors", "const RED = 7;")],
    );
    assert_no_errors(&unit);
}

#[test]
fn unresolvable_import_is_reported() {
    let (unit, _) = check("import \"no/such/package\" as nope;");
    assert_error_containing(&unit, "cannot resolve package");
}

#[test]
fn undefined_symbol_in_package_is_reported() {
    let (unit, _) = check_sources(
        &["import \"std/colors\" as colors; const A = colors.MISSING;"],
        &[("std/colors", "const RED = 7;")],
    );
    assert_error_containing(&unit, "undefined symbol");
}

// ===== Reachability =====

#[test]
fn reachable_list_has_no_duplicates() {
    let (unit, pkg) = check(
        "func id<T>(x: T): T { return x; }\n\
         const K = 2;\n\
         var a = id(3);\n\
         var b = id(4);\n\
         func f(): int { return K; }",
    );
    assert_no_errors(&unit);
    let reachable = &unit.pkg(pkg).reachable_symbols;
    let mut seen = std::collections::HashSet::new();
    for id in reachable {
        assert!(seen.insert(*id), "duplicate reachable symbol {id:?}");
    }
}

#[test]
fn dependencies_precede_dependents_in_reachable_order() {
    let (unit, pkg) = check(
        "const BASE = 3;\n\
         const DERIVED = BASE * 2;",
    );
    assert_no_errors(&unit);
    let pkg_ref = unit.pkg(pkg);
    let names: Vec<&str> = pkg_ref
        .reachable_symbols
        .iter()
        .map(|&id| unit.strings.lookup(pkg_ref.sym(id).name.name))
        .collect();
    let base = names.iter().position(|&n| n == "BASE").expect("BASE reachable");
    let derived = names.iter().position(|&n| n == "DERIVED").expect("DERIVED reachable");
    assert!(base < derived, "expected BASE before DERIVED, got {names:?}");
}

#[test]
fn mangled_names_include_package_prefix() {
    let (unit, pkg) = check("const K = 1;");
    assert_no_errors(&unit);
    let sym = global_symbol(&unit, pkg, "K");
    let mangled = unit.strings.lookup(sym.mangled_name.expect("mangled name assigned"));
    assert_eq!(mangled, "main_K");
}
