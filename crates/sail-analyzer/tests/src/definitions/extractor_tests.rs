use expect_test::{Expect, expect};

use super::*;
use crate::syntax::tokenize;

fn check(source: &str, expect: Expect) {
    let dump: String = extract(&tokenize(source))
        .into_iter()
        .map(|definition| {
            format!(
                "{:?} {} @{}\n",
                definition.kind, definition.name, definition.span.start
            )
        })
        .collect();
    expect.assert_eq(&dump);
}

fn kinds_and_names(source: &str) -> Vec<(DefinitionKind, String)> {
    extract(&tokenize(source))
        .into_iter()
        .map(|definition| (definition.kind, definition.name))
        .collect()
}

#[test]
fn single_function_definition() {
    let definitions = extract(&tokenize("function foo(x) = x + 1"));
    assert_eq!(
        definitions,
        vec![Definition {
            name: "foo".to_string(),
            span: Span::new(9, 12),
            kind: DefinitionKind::Function,
        }]
    );
}

#[test]
fn scattered_function_and_clauses() {
    check(
        "scattered function execute\nfunction clause execute ADD(rs) = ()\nval execute : ast -> unit",
        expect![[r#"
            ScatteredFunction execute @19
            FunctionClause execute @43
            Value execute @68
        "#]],
    );
}

#[test]
fn enum_and_union_members() {
    check(
        "enum Privilege = {User, Supervisor, Machine}\nunion ast = { ADD : (bits(5), bits(5)), NOP : unit }",
        expect![[r#"
            Enum Privilege @5
            EnumMember User @18
            EnumMember Supervisor @24
            EnumMember Machine @36
            Union ast @51
            UnionConstructor ADD @59
            UnionConstructor NOP @85
        "#]],
    );
}

#[test]
fn clause_heads_and_single_members() {
    check(
        "scattered union ast\nunion clause ast = ITYPE : (bits(12), regidx)\nenum clause extension = Ext_M",
        expect![[r#"
            Union ast @16
            Union ast @33
            UnionConstructor ITYPE @39
            Enum extension @78
            EnumMember Ext_M @90
        "#]],
    );
}

#[test]
fn parameterised_union_constructors() {
    check(
        "union option('a : Type) = { Some : 'a, None : unit }",
        expect![[r#"
            Union option @6
            UnionConstructor Some @28
            UnionConstructor None @39
        "#]],
    );
}

#[test]
fn only_top_level_bindings_are_variables() {
    let source = "\
let x = 1
register PC : bits(64)
function f() = let y = 2 in y
function g() = {
  let z = 3;
  var w = 4;
  z
}
var top : int = 0
";
    assert_eq!(
        kinds_and_names(source),
        vec![
            (DefinitionKind::Variable, "x".to_string()),
            (DefinitionKind::Register, "PC".to_string()),
            (DefinitionKind::Function, "f".to_string()),
            (DefinitionKind::Function, "g".to_string()),
            (DefinitionKind::Variable, "top".to_string()),
        ]
    );
}

#[test]
fn operator_names_are_glued() {
    let source = "\
infix 4 <_s
overload operator == = {eq_int, eq_bit}
infixl 7 xor
val operator <=_u : (bits('n), bits('n)) -> bool
";
    assert_eq!(
        kinds_and_names(source),
        vec![
            (DefinitionKind::Operator, "<_s".to_string()),
            (DefinitionKind::Operator, "==".to_string()),
            (DefinitionKind::Operator, "xor".to_string()),
            (DefinitionKind::Operator, "<=_u".to_string()),
        ]
    );
}

#[test]
fn overload_of_plain_name() {
    assert_eq!(
        kinds_and_names("overload to_str = {bool_to_str, int_to_str}"),
        vec![(DefinitionKind::Overload, "to_str".to_string())]
    );
}

#[test]
fn type_level_declarations() {
    let source = "\
type xlenbits = bits(64)
newtype regidx = Regidx : bits(5)
struct Pair = { fst : int, snd : int }
bitfield Mstatus : bits(64) = { MIE : 3 }
mapping clause encdec = NOP() <-> 0x13
mapping reg_name : regidx <-> string
scattered mapping encdec
";
    assert_eq!(
        kinds_and_names(source),
        vec![
            (DefinitionKind::Type, "xlenbits".to_string()),
            (DefinitionKind::Type, "regidx".to_string()),
            (DefinitionKind::Struct, "Pair".to_string()),
            (DefinitionKind::Bitfield, "Mstatus".to_string()),
            (DefinitionKind::MappingClause, "encdec".to_string()),
            (DefinitionKind::Mapping, "reg_name".to_string()),
            (DefinitionKind::Mapping, "encdec".to_string()),
        ]
    );
}

#[test]
fn partial_matches_are_skipped() {
    assert!(kinds_and_names("function").is_empty());
    assert!(kinds_and_names("function (").is_empty());
    assert!(kinds_and_names("val : int").is_empty());
    assert!(kinds_and_names("enum E = ").len() == 1);
}

#[test]
fn comments_and_strings_are_not_searched() {
    let source = "// function foo\n\"function bar\"\n/* val baz */\n/// enum Qux";
    assert!(kinds_and_names(source).is_empty());
}

#[test]
fn comments_between_keyword_and_name_are_ignored() {
    assert_eq!(
        kinds_and_names("function /* helper */ foo() = ()"),
        vec![(DefinitionKind::Function, "foo".to_string())]
    );
}
