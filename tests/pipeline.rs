use tacc::{compile, render_asm, render_tac, CompilationErrorKind};

fn tac(src: &str) -> String {
    render_tac(&compile(src).unwrap())
}

fn error_kind(src: &str) -> CompilationErrorKind {
    compile(src).unwrap_err().kind
}

#[test]
fn straight_line_program() {
    assert_eq!(
        tac("int x = 2 + 3;\nprint(x);\n"),
        "=== TAC ===\n    t1 = 2\n    t2 = 3\n    t3 = t1 + t2\n    x = t3\n    t4 = x\n    print t4\n"
    );
}

#[test]
fn if_else() {
    assert_eq!(
        tac("if (1) { print(1); } else { print(0); }"),
        "=== TAC ===
    t1 = 1
    ifz t1 goto L1
    t2 = 1
    print t2
    goto L2
L1:
    t3 = 0
    print t3
L2:
"
    );
}

#[test]
fn multiplication_operands_are_reduced_first() {
    assert_eq!(
        tac("int x = 2 + 3 * 4; print(x);"),
        "=== TAC ===
    t1 = 2
    t2 = 3
    t3 = 4
    t4 = t2 * t3
    t5 = t1 + t4
    x = t5
    t6 = x
    print t6
"
    );
}

#[test]
fn countdown_loop() {
    let src = "
        int n = 3;
        while (n) {
            print(n);
            n = n - 1;
        }
    ";
    assert_eq!(
        tac(src),
        "=== TAC ===
    t1 = 3
    n = t1
L1:
    t2 = n
    ifz t2 goto L2
    t3 = n
    print t3
    t4 = n
    t5 = 1
    t6 = t4 - t5
    n = t6
    goto L1
L2:
"
    );
}

#[test]
fn assembly_for_if_else() {
    let tac = compile("int a = 6 / 2; if (a) print(a); else print(0);").unwrap();
    assert_eq!(
        render_asm(&tac),
        "=== PSEUDO ASSEMBLY CODE ===
MOV t1, 6
MOV t2, 2
MOV R1, t1
DIV R1, t2
MOV t3, R1
MOV a, t3
MOV t4, a
CMP t4, 0
JE L1
MOV t5, a
PRINT t5
JMP L2
L1:
MOV t6, 0
PRINT t6
L2:
"
    );
}

#[test]
fn output_is_deterministic() {
    let src = "int i = 0; while (10 - i) { if (i - 5) print(i); i = i + 1; }";
    let first = compile(src).unwrap();
    let second = compile(src).unwrap();

    assert_eq!(render_tac(&first), render_tac(&second));
    assert_eq!(render_asm(&first), render_asm(&second));
}

#[test]
fn labels_are_unique_and_ordered() {
    let src = "
        int a = 1;
        if (a) { while (a) { a = 0; } } else { print(a); }
        while (a) { if (a) print(a); }
        if (a) print(a);
    ";
    let tac = tac(src);
    let placed: Vec<&str> = tac
        .lines()
        .filter(|line| line.ends_with(':'))
        .map(|line| line.trim_end_matches(':'))
        .collect();

    // five constructs allocate L1..L10; an `if` without `else` never places its first label
    assert_eq!(
        placed,
        vec!["L3", "L4", "L1", "L2", "L5", "L8", "L6", "L10"]
    );

    let mut unique = placed.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), placed.len());
}

#[test]
fn empty_program_has_only_header() {
    assert_eq!(tac(""), "=== TAC ===\n");
}

#[test]
fn assignment_requires_declaration() {
    assert_eq!(error_kind("x = 1;"), CompilationErrorKind::UndeclaredSymbol);
}

#[test]
fn reading_requires_declaration() {
    assert_eq!(
        error_kind("int x = y + 1;"),
        CompilationErrorKind::UndeclaredSymbol
    );
}

#[test]
fn redeclaration_is_rejected() {
    assert_eq!(error_kind("int x; int x;"), CompilationErrorKind::DuplicateSymbol);
    assert_eq!(
        error_kind("int x; { int x = 2; }"),
        CompilationErrorKind::DuplicateSymbol
    );
}

#[test]
fn declarations_in_blocks_are_global() {
    assert!(compile("{ int x = 1; } print(x);").is_ok());
}

#[test]
fn uninitialized_reads_are_not_diagnosed() {
    assert!(compile("int x; print(x);").is_ok());
}

#[test]
fn lex_error_has_position() {
    let err = compile("int x = 1;\nprint(x) @").unwrap_err();
    assert_eq!(err.kind, CompilationErrorKind::Lex);
    assert_eq!(err.to_string(), "unknown character '@' at 2:10");
}

#[test]
fn parse_error_names_token_and_line() {
    let err = compile("int x = 1;\nprint x;").unwrap_err();
    assert_eq!(err.kind, CompilationErrorKind::Parse);
    assert_eq!(
        err.to_string(),
        "unexpected token 'x' at 2:7, expected '('"
    );
}

#[test]
fn first_error_wins() {
    // the duplicate would be found later, but parsing fails first
    let err = compile("int x; int x; print(;").unwrap_err();
    assert_eq!(err.kind, CompilationErrorKind::Parse);
}

#[test]
fn oversized_literal_is_a_lex_error() {
    assert_eq!(
        error_kind("print(123456789012345678901234567890);"),
        CompilationErrorKind::Lex
    );
}

#[test]
fn deeply_nested_input_fails_cleanly() {
    let chain = format!("int x = {};", vec!["1"; 20_000].join("+"));
    assert_eq!(error_kind(&chain), CompilationErrorKind::Parse);

    let parens = format!("print({}", "(".repeat(10_000));
    let err = compile(&parens).unwrap_err();
    assert_eq!(err.kind, CompilationErrorKind::Parse);
    assert!(err.to_string().starts_with("nesting deeper than 256 levels at 1:"));
}

#[test]
fn all_ascii_whitespace_separates_tokens() {
    assert_eq!(
        tac("int x;\x0b\x0cprint(x);"),
        "=== TAC ===\n    t1 = x\n    print t1\n"
    );
}
