//! End-to-end scenarios driving the library crates directly
//! (scanner → parser → generator) rather than the CLI surface.

#[test]
fn lex_only_minimal_program() {
    use pascalc_lex::{Scanner, TokenKind};

    let mut scanner = Scanner::new("begin end.").unwrap();
    let mut kinds = Vec::new();
    loop {
        let tok = scanner.current().clone();
        kinds.push(tok.kind);
        if tok.is(TokenKind::Eof) {
            break;
        }
        scanner.advance().unwrap();
    }

    assert_eq!(
        kinds,
        vec![
            TokenKind::ReservedWord,
            TokenKind::ReservedWord,
            TokenKind::Operation,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lex_identifier_and_real_literal() {
    use pascalc_lex::{Scanner, TokenKind};

    let mut scanner = Scanner::new("x := 12 + 3.5e2;").unwrap();
    let mut kinds = Vec::new();
    for _ in 0..6 {
        kinds.push(scanner.current().kind);
        scanner.advance().unwrap();
    }

    assert_eq!(
        kinds,
        vec![
            TokenKind::Identifier,
            TokenKind::Operation, // :=
            TokenKind::IntConst,
            TokenKind::Operation, // +
            TokenKind::RealConst,
            TokenKind::Delimiter, // ;
        ]
    );
}

#[test]
fn assignment_through_arithmetic_compiles_and_globals_get_distinct_labels() {
    let source = "program p;\nvar a,b:integer;\nbegin\n  a:=2;\n  b:=a*3+1;\nend.";
    let (program, scope) = pascalc_par::parse_with_scope(source).unwrap();
    assert_eq!(program.globals.len(), 2);
    assert_ne!(program.globals[0].label, program.globals[1].label);

    let a = scope.get("a").unwrap();
    let b = scope.get("b").unwrap();
    assert!(a.ty().unwrap().is_integer());
    assert!(b.ty().unwrap().is_integer());

    let asm = pascalc_gen::generate(&program);
    assert!(asm.contains("imul"));
    assert!(asm.contains(&program.globals[0].label));
    assert!(asm.contains(&program.globals[1].label));
}

#[test]
fn array_indexing_computes_byte_offset_from_element_size() {
    let source = "program p;\nvar a:array[1..5] of integer;\nbegin\n  a[3]:=a[1]+1;\nend.";
    let (program, _) = pascalc_par::parse_with_scope(source).unwrap();
    let asm = pascalc_gen::generate(&program);
    assert!(asm.contains("mul"));
}

#[test]
fn record_field_access_uses_byte_offsets() {
    let source = concat!(
        "program p;\n",
        "type rec = record x,y:integer end;\n",
        "var p:rec;\n",
        "begin\n",
        "  p.x:=p.y;\n",
        "end."
    );
    let (program, _) = pascalc_par::parse_with_scope(source).unwrap();
    let asm = pascalc_gen::generate(&program);
    // field y sits at offset 4 from the record's base address.
    assert!(asm.contains("4(%eax)") || asm.contains("lea\t4(%eax)"));
}

#[test]
fn assigning_real_to_integer_is_a_type_error() {
    let source = "program p;\nvar a:integer;\nbegin\n  a:=1.0;\nend.";
    let err = pascalc_par::parse(source).unwrap_err();
    assert_eq!(err.message, "incompatible types: Integer and Real");
}

#[test]
fn for_loop_with_empty_range_still_parses_and_compiles() {
    let source = "program p;\nvar i:integer;\nbegin\n  for i:=5 to 1 do i:=i;\nend.";
    let (program, _) = pascalc_par::parse_with_scope(source).unwrap();
    let asm = pascalc_gen::generate(&program);
    assert!(asm.contains("for_start"));
    assert!(asm.contains("for_check"));
}

#[test]
fn repeat_until_executes_body_at_least_once() {
    let source = "program p;\nvar i:integer;\nbegin\n  i:=0;\n  repeat\n    i:=i+1;\n  until i>0;\nend.";
    let (program, _) = pascalc_par::parse_with_scope(source).unwrap();
    // `body` precedes the condition check in a repeat/until; no pre-check jump exists.
    let asm = pascalc_gen::generate(&program);
    assert!(!asm.is_empty());
}

#[test]
fn every_generated_routine_and_main_end_in_a_return() {
    let source = concat!(
        "program p;\n",
        "function sq(n:integer):integer;\n",
        "begin\n",
        "  sq:=n*n;\n",
        "end;\n",
        "begin\n",
        "  sq(3);\n",
        "end."
    );
    let (program, _) = pascalc_par::parse_with_scope(source).unwrap();
    let asm = pascalc_gen::generate(&program);
    assert!(asm.trim_end().ends_with("ret") || asm.trim_end().contains("ret\t$"));
}
