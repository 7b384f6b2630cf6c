use crate::parse_file;
use sabre_diagnostic::DiagnosticList;
use sabre_ir::{AstArena, DeclId, DeclKind, ExprKind, FileId, StmtKind, StringInterner,
    TypeSignAtom};
use sabre_lexer::lex;

struct Parsed {
    arena: AstArena,
    decls: Vec<DeclId>,
    diags: DiagnosticList,
    strings: StringInterner,
}

fn parse(source: &str) -> Parsed {
    let strings = StringInterner::new();
    let tokens = lex(source, &strings);
    let mut arena = AstArena::new();
    let mut diags = DiagnosticList::new();
    let decls = parse_file(&tokens, FileId(0), &strings, &mut arena, &mut diags);
    Parsed { arena, decls, diags, strings }
}

fn parse_ok(source: &str) -> Parsed {
    let parsed = parse(source);
    assert!(
        !parsed.diags.has_errors(),
        "unexpected parse errors: {:?}",
        parsed.diags.all()
    );
    parsed
}

#[test]
fn parse_const_decl_with_multiple_names() {
    let parsed = parse_ok("const x, y: float = 1.0, 2.0;");
    assert_eq!(parsed.decls.len(), 1);
    match &parsed.arena.decl(parsed.decls[0]).kind {
        DeclKind::Const { names, sign, values } => {
            assert_eq!(names.len(), 2);
            assert_eq!(values.len(), 2);
            assert_eq!(parsed.strings.lookup(names[0].name), "x");
            assert!(matches!(sign.atoms[0], TypeSignAtom::Named { .. }));
        }
        other => panic!("expected const declaration, got {other:?}"),
    }
}

#[test]
fn parse_func_with_params_and_body() {
    let parsed = parse_ok("func add(a, b: int): int { return a + b; }");
    match &parsed.arena.decl(parsed.decls[0]).kind {
        DeclKind::Func { name, params, body, templates, .. } => {
            assert_eq!(parsed.strings.lookup(name.name), "add");
            assert!(templates.is_empty());
            assert_eq!(params.len(), 1);
            assert_eq!(params[0].names.len(), 2);
            assert!(body.is_some());
        }
        other => panic!("expected function declaration, got {other:?}"),
    }
}

#[test]
fn parse_template_func() {
    let parsed = parse_ok("func id<T>(x: T): T { return x; }");
    match &parsed.arena.decl(parsed.decls[0]).kind {
        DeclKind::Func { templates, .. } => {
            assert_eq!(templates.len(), 1);
            assert_eq!(parsed.strings.lookup(templates[0].name), "T");
        }
        other => panic!("expected function declaration, got {other:?}"),
    }
}

#[test]
fn parse_struct_with_tagged_field() {
    let parsed = parse_ok(
        "struct Output { @sv_position pos: vec4; color: vec4 = vec4{0.0, 0.0, 0.0, 1.0}; }",
    );
    match &parsed.arena.decl(parsed.decls[0]).kind {
        DeclKind::Struct { fields, .. } => {
            assert_eq!(fields.len(), 2);
            assert!(!fields[0].tags.is_empty());
            assert!(fields[1].default_value.is_some());
        }
        other => panic!("expected struct declaration, got {other:?}"),
    }
}

#[test]
fn parse_enum_with_explicit_value() {
    let parsed = parse_ok("enum Mode { A, B = 7, C }");
    match &parsed.arena.decl(parsed.decls[0]).kind {
        DeclKind::Enum { fields, .. } => {
            assert_eq!(fields.len(), 3);
            assert!(fields[0].value.is_none());
            assert!(fields[1].value.is_some());
        }
        other => panic!("expected enum declaration, got {other:?}"),
    }
}

#[test]
fn parse_import_with_alias() {
    let parsed = parse_ok("import \"std/math\" as math;");
    match &parsed.arena.decl(parsed.decls[0]).kind {
        DeclKind::Import { path, alias } => {
            assert_eq!(parsed.strings.lookup(path.name), "std/math");
            assert_eq!(parsed.strings.lookup(alias.unwrap().name), "math");
        }
        other => panic!("expected import declaration, got {other:?}"),
    }
}

#[test]
fn parse_compile_time_if() {
    let parsed = parse_ok(
        "if DEBUG { const X = 1; } else if OTHER { const X = 3; } else { const X = 2; }",
    );
    match &parsed.arena.decl(parsed.decls[0]).kind {
        DeclKind::If { conds, bodies, else_body } => {
            assert_eq!(conds.len(), 2);
            assert_eq!(bodies.len(), 2);
            assert_eq!(else_body.len(), 1);
        }
        other => panic!("expected compile-time if, got {other:?}"),
    }
}

#[test]
fn parse_uniform_tag_with_binding() {
    let parsed = parse_ok("@uniform{binding = 3} var tex: texture2d;");
    let decl = parsed.arena.decl(parsed.decls[0]);
    let uniform = parsed.strings.intern("uniform");
    let binding = parsed.strings.intern("binding");
    let tag = decl.tags.get(uniform).expect("uniform tag");
    assert_eq!(tag.arg(binding).and_then(|a| a.value.as_int()), Some(3));
}

#[test]
fn parse_for_variants() {
    let parsed = parse_ok(
        "func f() {\n\
         for { break; }\n\
         for x < 10 { continue; }\n\
         for var i = 0; i < 10; ++i { discard; }\n\
         }",
    );
    let DeclKind::Func { body: Some(body), .. } = &parsed.arena.decl(parsed.decls[0]).kind else {
        panic!("expected function with a body");
    };
    let StmtKind::Block(stmts) = &parsed.arena.stmt(*body).kind else {
        panic!("expected block body");
    };
    assert_eq!(stmts.len(), 3);
    match &parsed.arena.stmt(stmts[2]).kind {
        StmtKind::For { init, cond, post, .. } => {
            assert!(init.is_some());
            assert!(cond.is_some());
            assert!(post.is_some());
        }
        other => panic!("expected for statement, got {other:?}"),
    }
}

#[test]
fn parse_swizzle_assignment() {
    let parsed = parse_ok("func f(v: vec4) { v.xy = v.yx; }");
    let DeclKind::Func { body: Some(body), .. } = &parsed.arena.decl(parsed.decls[0]).kind else {
        panic!("expected function with a body");
    };
    let StmtKind::Block(stmts) = &parsed.arena.stmt(*body).kind else {
        panic!("expected block body");
    };
    match &parsed.arena.stmt(stmts[0]).kind {
        StmtKind::Assign { lhs, rhs, .. } => {
            assert_eq!(lhs.len(), 1);
            assert_eq!(rhs.len(), 1);
            assert!(matches!(parsed.arena.expr(lhs[0]).kind, ExprKind::Dot { .. }));
        }
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn parse_complit_with_selectors() {
    let parsed = parse_ok("const v = vec4{.x = 1.0, .w = 2.0};");
    let DeclKind::Const { values, .. } = &parsed.arena.decl(parsed.decls[0]).kind else {
        panic!("expected const declaration");
    };
    match &parsed.arena.expr(values[0]).kind {
        ExprKind::Complit { fields, .. } => {
            assert_eq!(fields.len(), 2);
            assert!(fields.iter().all(|f| f.selector.is_some()));
        }
        other => panic!("expected composite literal, got {other:?}"),
    }
}

#[test]
fn complit_not_consumed_in_if_condition() {
    // `x` must parse as a plain identifier condition, with the brace
    // opening the body.
    let parsed = parse_ok("func f(x: bool) { if x { return; } }");
    assert!(parsed.decls.len() == 1);
}

#[test]
fn parse_cast_expr() {
    let parsed = parse_ok("const x = 1: float;");
    let DeclKind::Const { values, .. } = &parsed.arena.decl(parsed.decls[0]).kind else {
        panic!("expected const declaration");
    };
    assert!(matches!(parsed.arena.expr(values[0]).kind, ExprKind::Cast { .. }));
}

#[test]
fn leading_dot_float_is_diagnosed() {
    let parsed = parse("const x = .5;");
    assert!(parsed.diags.has_errors());
    let rendered = format!("{:?}", parsed.diags.all());
    assert!(rendered.contains("omit the leading 0"), "got: {rendered}");
}

#[test]
fn parser_recovers_after_bad_decl() {
    let parsed = parse("junk junk junk; const ok = 1;");
    assert!(parsed.diags.has_errors());
    assert_eq!(parsed.decls.len(), 1);
}

#[test]
fn nested_template_args_split_shr() {
    let parsed = parse_ok("func f(x: box<box<int>>): int { return 0; }");
    match &parsed.arena.decl(parsed.decls[0]).kind {
        DeclKind::Func { params, .. } => {
            let TypeSignAtom::Templated { args, .. } = &params[0].sign.atoms[0] else {
                panic!("expected templated signature");
            };
            assert!(matches!(args[0].atoms[0], TypeSignAtom::Templated { .. }));
        }
        other => panic!("expected function declaration, got {other:?}"),
    }
}
