//! End-to-end parses of whole programs through the public entry point.

use algol68_compiler::options::{ProgramOptions, Stropping};
use algol68_compiler::source::MemoryLoader;
use algol68_compiler::syntax::{Attribute, NodeId};
use algol68_compiler::{parse_program, Parsed};
use rstest::rstest;

fn parse_files(options: ProgramOptions, files: &[(&str, &str)]) -> Parsed {
    let loader = MemoryLoader::new(files.iter().map(|&(path, text)| (path, text)));
    parse_program(options, &loader, files[0].0)
}

fn parse(text: &str) -> Parsed {
    parse_files(ProgramOptions::default(), &[("main.a68", text)])
}

/// Every attribute in the tree, root first.
fn attributes(parsed: &Parsed) -> Vec<Attribute> {
    let mut found = Vec::new();
    if let Some(root) = parsed.root {
        collect(parsed, root, &mut found);
    }
    found
}

fn collect(parsed: &Parsed, id: NodeId, found: &mut Vec<Attribute>) {
    let arena = &parsed.context.arena;
    found.push(arena.attribute(id));
    for child in arena.siblings(arena.sub(id)) {
        collect(parsed, child, found);
    }
}

fn messages(parsed: &Parsed) -> Vec<String> {
    parsed
        .context
        .diagnostics
        .iter()
        .map(|diagnostic| diagnostic.message.clone())
        .collect()
}

fn assert_clean(parsed: &Parsed) {
    assert!(
        parsed.is_clean(),
        "unexpected diagnostics: {:?}",
        messages(parsed)
    );
}

#[test]
fn identity_declarations_and_a_call() {
    let parsed = parse("BEGIN INT i = 1, j = 2; print ((i + j)) END");
    assert_clean(&parsed);

    let found = attributes(&parsed);
    assert_eq!(found[0], Attribute::ParticularProgram);
    assert!(found.contains(&Attribute::IdentityDeclaration));
    assert!(found.contains(&Attribute::InitialiserSeries));
    assert!(found.contains(&Attribute::Formula));
    assert!(found.contains(&Attribute::Call));
    assert!(found.contains(&Attribute::SerialClause));
    assert!(found.contains(&Attribute::ClosedClause));
}

#[rstest]
#[case::conditional("BEGIN IF TRUE THEN 1 ELSE 2 FI END", Attribute::ConditionalClause)]
#[case::elif_chain(
    "BEGIN IF 1 < 2 THEN 1 ELIF 2 < 3 THEN 2 FI END",
    Attribute::ConditionalClause
)]
#[case::case_clause("BEGIN CASE 2 IN 10, 20, 30 OUT 0 ESAC END", Attribute::CaseClause)]
#[case::collateral("BEGIN print ((1, 2, 3)) END", Attribute::CollateralClause)]
#[case::parallel("BEGIN PAR (1, 2) END", Attribute::ParallelClause)]
#[case::downto_loop("BEGIN FOR i FROM 10 DOWNTO 1 DO SKIP OD END", Attribute::LoopClause)]
#[case::jump("BEGIN done: GOTO done END", Attribute::Jump)]
#[case::generator("BEGIN REF INT p = HEAP INT; SKIP END", Attribute::Generator)]
#[case::cast("BEGIN REAL (1) END", Attribute::Cast)]
#[case::selection("BEGIN STRUCT (REAL re, im) z; re OF z END", Attribute::Selection)]
#[case::identity_relation("BEGIN REF INT p = NIL; p ISNT NIL END", Attribute::IdentityRelation)]
#[case::and_function("BEGIN TRUE ANDF FALSE END", Attribute::AndFunction)]
#[case::trimmer("BEGIN [1:10] INT a; a[2:3] END", Attribute::Trimmer)]
fn clean_programs(#[case] text: &str, #[case] expected: Attribute) {
    let parsed = parse(text);
    assert_clean(&parsed);
    assert!(
        attributes(&parsed).contains(&expected),
        "no {expected:?} in {text}"
    );
}

#[test]
fn conditional_without_then_recovers() {
    let parsed = parse("BEGIN IF TRUE 1 FI END");

    assert!(parsed.root.is_some());
    assert!(messages(&parsed).contains(&"conditional clause has no THEN part".to_string()));
    assert!(attributes(&parsed).contains(&Attribute::ConditionalClause));
}

#[test]
fn conformity_case_is_detected() {
    let parsed = parse(
        "BEGIN \
           UNION (INT, VOID) u = EMPTY; \
           CASE u IN (INT n): 1, (VOID): 2 OUT 3 ESAC \
         END",
    );
    assert_clean(&parsed);

    let found = attributes(&parsed);
    assert!(found.contains(&Attribute::ConformityClause));
    assert!(found.contains(&Attribute::SpecifiedUnitList));
    assert!(found.contains(&Attribute::UnionPack));
}

#[test]
fn loop_parts_assemble() {
    let parsed = parse("BEGIN FOR k FROM 1 TO 10 DO print (k) OD END");
    assert_clean(&parsed);

    let found = attributes(&parsed);
    for part in [
        Attribute::ForPart,
        Attribute::FromPart,
        Attribute::ToPart,
        Attribute::DoPart,
        Attribute::LoopClause,
    ] {
        assert!(found.contains(&part), "missing {part:?}");
    }
}

#[test]
fn until_part_belongs_to_the_loop() {
    let parsed = parse("BEGIN TO 3 DO SKIP UNTIL TRUE OD END");
    assert_clean(&parsed);

    let found = attributes(&parsed);
    assert!(found.contains(&Attribute::UntilPart));
    assert!(found.contains(&Attribute::EnquiryClause));
    assert!(found.contains(&Attribute::LoopClause));
}

#[test]
fn procedure_declaration_with_routine_text() {
    let parsed = parse("BEGIN PROC inc = (INT n) INT: n + 1; print (inc (1)) END");
    assert_clean(&parsed);

    let found = attributes(&parsed);
    assert!(found.contains(&Attribute::ProcedureDeclaration));
    assert!(found.contains(&Attribute::RoutineText));
    assert!(found.contains(&Attribute::ParameterPack));
    assert!(found.contains(&Attribute::Parameter));
    assert!(found.contains(&Attribute::Call));
}

#[test]
fn shared_declarer_parameters() {
    let parsed = parse("BEGIN PROC add = (INT a, b) INT: a + b; add (1, 2) END");
    assert_clean(&parsed);
    assert!(attributes(&parsed).contains(&Attribute::ParameterList));
}

#[test]
fn declared_operator_and_priority() {
    let parsed = parse(
        "BEGIN \
           PRIO MAX = 9; \
           OP MAX = (INT a, b) INT: IF a > b THEN a ELSE b FI; \
           print (1 MAX 2) \
         END",
    );
    assert_clean(&parsed);

    let found = attributes(&parsed);
    assert!(found.contains(&Attribute::PriorityDeclaration));
    assert!(found.contains(&Attribute::BriefOperatorDeclaration));
    assert!(found.contains(&Attribute::Formula));
}

#[test]
fn operator_without_priority_binds_last() {
    let parsed = parse("BEGIN OP FOO = (INT a, b) INT: 1; print (1 FOO 2) END");

    assert!(parsed.root.is_some());
    assert_eq!(parsed.context.diagnostics.error_count(), 1);
    assert!(messages(&parsed)
        .contains(&"no priority declared for operator 'FOO'".to_string()));
    assert!(attributes(&parsed).contains(&Attribute::Formula));
}

fn render(parsed: &Parsed) -> String {
    let root = parsed.root.expect("clean parse has a root");
    parsed.context.arena.render(&parsed.context.interner, root)
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let parsed = parse("BEGIN 2 + 3 * 4 END");
    assert_clean(&parsed);
    assert!(render(&parsed).contains("(formula 2 + (formula 3 * 4))"));

    let parsed = parse("BEGIN 2 * 3 + 4 END");
    assert_clean(&parsed);
    assert!(render(&parsed).contains("(formula (formula 2 * 3) + 4)"));
}

#[test]
fn a_low_priority_declaration_binds_below_addition() {
    let parsed = parse(
        "BEGIN \
           PRIO MAX = 1; \
           OP MAX = (INT a, b) INT: a; \
           1 MAX 2 + 3 \
         END",
    );
    assert_clean(&parsed);
    assert!(render(&parsed).contains("(formula 1 MAX (formula 2 + 3))"));
}

#[test]
fn monadic_binds_tighter_than_dyadic() {
    let parsed = parse("BEGIN - 1 + - 2 END");
    assert_clean(&parsed);

    let found = attributes(&parsed);
    assert!(found.contains(&Attribute::MonadicFormula));
    assert!(found.contains(&Attribute::Formula));
}

#[test]
fn modes_may_be_declared_after_use() {
    let parsed = parse("BEGIN MODE A = REF B, B = INT; SKIP END");
    assert_clean(&parsed);
    assert!(attributes(&parsed).contains(&Attribute::ModeDeclaration));
}

#[test]
fn rows_structs_and_slices() {
    let parsed = parse(
        "BEGIN \
           MODE POINT = STRUCT (REAL x, y); \
           [1:10] INT a; \
           a[1] := 1; \
           SKIP \
         END",
    );
    assert_clean(&parsed);

    let found = attributes(&parsed);
    assert!(found.contains(&Attribute::StructurePack));
    assert!(found.contains(&Attribute::VariableDeclaration));
    assert!(found.contains(&Attribute::Slice));
    assert!(found.contains(&Attribute::Assignation));
}

#[test]
fn format_text_reduces_to_pictures() {
    let parsed = parse("BEGIN printf (($5d, 2x$, 42)) END");
    assert_clean(&parsed);

    let found = attributes(&parsed);
    assert!(found.contains(&Attribute::FormatText));
    assert!(found.contains(&Attribute::PictureList));
    assert!(found.contains(&Attribute::IntegralPattern));
    assert!(found.contains(&Attribute::Insertion));
    assert!(found.contains(&Attribute::CollateralClause));
}

#[test]
fn real_pattern_with_exponent() {
    let parsed = parse("BEGIN printf (($+d.2d e+2d$, 3.14)) END");
    assert_clean(&parsed);
    assert!(attributes(&parsed).contains(&Attribute::RealPattern));
}

#[test]
fn boolean_pattern_needs_two_pictures() {
    let parsed = parse("BEGIN printf (($b(\"yes\")$, TRUE)) END");

    assert!(parsed.root.is_some());
    assert!(messages(&parsed)
        .contains(&"a boolean pattern chooses between 2 pictures, not 1".to_string()));
}

#[test]
fn refinements_are_substituted() {
    let parsed = parse("BEGIN sum END.\nsum: 1 + 2.");
    assert_clean(&parsed);
    assert!(attributes(&parsed).contains(&Attribute::Formula));
}

#[test]
fn unapplied_refinement_warns() {
    let parsed = parse("BEGIN SKIP END.\nghost: 1.");

    assert!(parsed.root.is_some());
    assert_eq!(parsed.context.diagnostics.error_count(), 0);
    assert!(messages(&parsed).contains(&"refinement 'ghost' is never applied".to_string()));
}

#[test]
fn refinement_applied_twice_is_an_error() {
    let parsed = parse("BEGIN sum; sum END.\nsum: SKIP.");

    assert!(parsed.root.is_some());
    assert_eq!(parsed.context.diagnostics.error_count(), 1);
    assert!(messages(&parsed)
        .contains(&"refinement 'sum' is applied more than once".to_string()));
}

#[test]
fn unbalanced_brackets_abort_the_parse() {
    let parsed = parse("BEGIN (1 END");

    assert!(parsed.root.is_none());
    assert!(messages(&parsed)
        .contains(&"unbalanced delimiters: 1 '(' without matching ')'".to_string()));
}

#[test]
fn every_unmatched_kind_is_named_at_once() {
    let parsed = parse("BEGIN ( [ 1 END");

    assert!(parsed.root.is_none());
    assert!(messages(&parsed).contains(
        &"unbalanced delimiters: 1 '(' without matching ')', 1 '[' without matching ']'"
            .to_string()
    ));
}

#[test]
fn crossed_nesting_reports_the_expected_closer() {
    let parsed = parse("BEGIN ( [ ) ] END");

    assert!(parsed.root.is_none());
    assert!(messages(&parsed).contains(&"']' expected but ')' found".to_string()));
}

#[test]
fn the_tree_renders_as_an_s_expression() {
    let parsed = parse("BEGIN SKIP END");
    assert_clean(&parsed);

    let rendered = render(&parsed);
    assert!(rendered.starts_with("(particular program"));
    assert!(rendered.contains("(serial clause"));
    assert!(rendered.contains("SKIP"));
}

#[test]
fn undeclared_bold_word_is_reported() {
    let parsed = parse("BEGIN FOO x END");

    assert!(parsed.root.is_some());
    assert!(messages(&parsed).contains(&"'FOO' has not been declared".to_string()));
}

#[test]
fn multiple_declaration_is_reported() {
    let parsed = parse("BEGIN INT x = 1; REAL x = 2.0; SKIP END");

    assert!(parsed.root.is_some());
    assert_eq!(parsed.context.diagnostics.error_count(), 1);
    assert!(messages(&parsed).contains(&"multiple declaration of 'x'".to_string()));
}

#[test]
fn mixed_separators_are_reported() {
    let parsed = parse("BEGIN 1, 2; 3 END");

    assert!(parsed.root.is_some());
    assert!(messages(&parsed)
        .contains(&"';' and ',' are mixed as separators in one clause".to_string()));
}

#[test]
fn quote_stropped_programs_parse() {
    let options = ProgramOptions {
        stropping: Stropping::Quote,
        ..Default::default()
    };
    let parsed = parse_files(
        options,
        &[("main.a68", "'BEGIN' 'INT' i = 1; print (i) 'END'")],
    );
    assert_clean(&parsed);

    let found = attributes(&parsed);
    assert!(found.contains(&Attribute::IdentityDeclaration));
    assert!(found.contains(&Attribute::Call));
}

#[test]
fn quote_stropped_comments_stay_opaque() {
    let options = ProgramOptions {
        stropping: Stropping::Quote,
        ..Default::default()
    };
    let parsed = parse_files(
        options,
        &[("main.a68", "'CO' ignore me 'CO' 'BEGIN' 'SKIP' 'END'")],
    );
    assert_clean(&parsed);
}

#[test]
fn includes_are_parsed_in_place() {
    let parsed = parse_files(
        ProgramOptions::default(),
        &[
            ("main.a68", "BEGIN\nPR include \"lib.a68\" PR\nprint (shared)\nEND"),
            ("lib.a68", "INT shared = 1;"),
        ],
    );
    assert_clean(&parsed);
    assert!(attributes(&parsed).contains(&Attribute::IdentityDeclaration));
}
