//! Declaration collection and resolution tests
//!
//! Classes, enums, variables and externs declared at the top level or inside
//! classes, including references to declarations further down the program.

#[cfg(test)]
mod declaration_tests {
    use crate::utils::{analyze, semantic_error};
    use kestrel_ast::builder::AstBuilder;
    use kestrel_type_checker::{errors::SemanticErrorKind, symbol_table::SymbolKind};

    mod classes {
        use super::*;

        #[test]
        fn test_mutually_referencing_classes() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![
                    b.class("A", None, vec![b.var("b", Some(b.ty("B")), None)]),
                    b.class("B", None, vec![b.var("a", Some(b.ty("A")), None)]),
                ],
                vec![],
            );
            let analysis = analyze(program).expect("Mutually referencing classes should resolve");
            assert_eq!(analysis.declaration_type("A.b").as_deref(), Some("B"));
            assert_eq!(analysis.declaration_type("B.a").as_deref(), Some("A"));
        }

        #[test]
        fn test_field_chain_through_forward_declared_class() {
            let b = AstBuilder::default();
            let chain = b.member(b.member(b.call(b.identifier("A"), vec![]), "b"), "x");
            let program = b.program(
                vec![
                    b.class("A", None, vec![b.var("b", Some(b.ty("B")), None)]),
                    b.class("B", None, vec![b.var("x", Some(b.ty("Int")), None)]),
                    b.var("v", None, Some(chain)),
                ],
                vec![],
            );
            let analysis = analyze(program).expect("Field chain should resolve");
            assert_eq!(analysis.declaration_type("v").as_deref(), Some("Int"));
        }

        #[test]
        fn test_inherited_field() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![
                    b.class("A", None, vec![b.var("x", Some(b.ty("Int")), None)]),
                    b.class("B", Some(b.ty("A")), vec![]),
                    b.var("v", None, Some(b.member(b.call(b.identifier("B"), vec![]), "x"))),
                ],
                vec![],
            );
            let analysis = analyze(program).expect("Inherited field should resolve");
            assert_eq!(analysis.declaration_type("v").as_deref(), Some("Int"));
        }

        #[test]
        fn test_member_initialized_from_later_member() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![b.class(
                    "Counter",
                    None,
                    vec![
                        b.var("start", None, Some(b.identifier("step"))),
                        b.var("step", None, Some(b.int("1"))),
                    ],
                )],
                vec![],
            );
            let analysis = analyze(program).expect("Member initializers should resolve");
            assert_eq!(
                analysis.declaration_type("Counter.start").as_deref(),
                Some("Int")
            );
        }

        #[test]
        fn test_cyclic_inheritance() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![
                    b.class("A", Some(b.ty("B")), vec![]),
                    b.class("B", Some(b.ty("A")), vec![]),
                ],
                vec![],
            );
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::CyclicInheritance {
                    name: "A".to_string()
                }
            );
        }

        #[test]
        fn test_base_class_must_be_a_class() {
            let b = AstBuilder::default();
            let program = b.program(vec![b.class("A", Some(b.ty("Int")), vec![])], vec![]);
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::NotAnObject {
                    found: "Int".to_string()
                }
            );
            assert_eq!(err.context.as_deref(), Some("A"));
        }
    }

    mod variables {
        use super::*;

        #[test]
        fn test_literal_initializers() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![
                    b.var("a", None, Some(b.int("1"))),
                    b.var("f", None, Some(b.float("1.5"))),
                    b.var("s", None, Some(b.string("kestrel"))),
                    b.var("t", None, Some(b.boolean(true))),
                ],
                vec![],
            );
            let analysis = analyze(program).expect("Literal initializers should type");
            assert_eq!(analysis.declaration_type("a").as_deref(), Some("Int"));
            assert_eq!(analysis.declaration_type("f").as_deref(), Some("Float"));
            assert_eq!(analysis.declaration_type("s").as_deref(), Some("String"));
            assert_eq!(analysis.declaration_type("t").as_deref(), Some("Bool"));
        }

        #[test]
        fn test_sized_number_annotation() {
            let b = AstBuilder::default();
            let program = b.program(vec![b.var("a", Some(b.ty("UInt8")), None)], vec![]);
            let analysis = analyze(program).expect("Sized number annotation should resolve");
            assert_eq!(analysis.declaration_type("a").as_deref(), Some("UInt8"));
        }

        #[test]
        fn test_initializer_calls_later_function() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![
                    b.var("r", None, Some(b.call(b.identifier("answer"), vec![]))),
                    b.function(
                        "answer",
                        vec![],
                        Some(b.ty("Int")),
                        vec![b.ret(Some(b.int("42")))],
                    ),
                ],
                vec![],
            );
            let analysis = analyze(program).expect("Forward call should resolve");
            assert_eq!(analysis.declaration_type("r").as_deref(), Some("Int"));
        }

        #[test]
        fn test_duplicate_global_variable_is_allowed() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![
                    b.var("x", None, Some(b.int("1"))),
                    b.var("x", None, Some(b.int("2"))),
                ],
                vec![],
            );
            let result = analyze(program);
            assert!(
                result.is_ok(),
                "Global redeclaration should be allowed, got: {:?}",
                result.err()
            );
        }

        #[test]
        fn test_duplicate_local_variable_is_rejected() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![],
                vec![
                    b.var_stmt("x", None, Some(b.int("1"))),
                    b.var_stmt("x", None, Some(b.int("2"))),
                ],
            );
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::Redeclaration {
                    name: "x".to_string(),
                    kind: SymbolKind::Identifier,
                }
            );
        }

        #[test]
        fn test_local_may_shadow_global() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![b.var("x", None, Some(b.int("1")))],
                vec![b.var_stmt("x", None, Some(b.string("shadow")))],
            );
            let result = analyze(program);
            assert!(
                result.is_ok(),
                "Local should shadow global, got: {:?}",
                result.err()
            );
        }

        #[test]
        fn test_local_is_not_visible_in_its_own_initializer() {
            let b = AstBuilder::default();
            let program = b.program(vec![], vec![b.var_stmt("x", None, Some(b.identifier("x")))]);
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::UnresolvedReference {
                    name: "x".to_string()
                }
            );
        }

        #[test]
        fn test_global_initialized_from_itself() {
            let b = AstBuilder::default();
            let program = b.program(vec![b.var("a", None, Some(b.identifier("a")))], vec![]);
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::Incomplete {
                    node: "variable `a`".to_string(),
                    found: "<unknown>".to_string(),
                }
            );
            assert_eq!(err.context.as_deref(), Some("a"));
        }

        #[test]
        fn test_globals_initialized_from_each_other() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![
                    b.var("a", None, Some(b.identifier("b"))),
                    b.var("b", None, Some(b.identifier("a"))),
                ],
                vec![],
            );
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::Incomplete {
                    node: "variable `a`".to_string(),
                    found: "<unknown>".to_string(),
                }
            );
        }

        #[test]
        fn test_untyped_declaration() {
            let b = AstBuilder::default();
            let program = b.program(vec![b.var("a", None, None)], vec![]);
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::UntypedDeclaration {
                    name: "a".to_string()
                }
            );
        }

        #[test]
        fn test_unknown_annotation() {
            let b = AstBuilder::default();
            let program = b.program(vec![b.var("a", Some(b.ty("Foo")), None)], vec![]);
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::UnresolvedType {
                    name: "Foo".to_string()
                }
            );
        }

        #[test]
        fn test_generic_argument_count() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![b.var("a", Some(b.generic("Array", vec![])), None)],
                vec![],
            );
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::TypeArgumentCount {
                    name: "Array".to_string(),
                    expected: 1,
                    found: 0,
                }
            );
        }
    }

    mod enums_and_externs {
        use super::*;

        #[test]
        fn test_enum_member_access() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![
                    b.enumeration(
                        "Color",
                        vec![b.enum_item("Red", vec![]), b.enum_item("Green", vec![])],
                    ),
                    b.var("c", None, Some(b.member(b.identifier("Color"), "Red"))),
                ],
                vec![],
            );
            let analysis = analyze(program).expect("Enum member access should resolve");
            assert_eq!(analysis.declaration_type("c").as_deref(), Some("Color"));
        }

        #[test]
        fn test_unknown_enum_member() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![
                    b.enumeration("Color", vec![b.enum_item("Red", vec![])]),
                    b.var("c", None, Some(b.member(b.identifier("Color"), "Blue"))),
                ],
                vec![],
            );
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::UnknownEnumItem {
                    enum_name: "Color".to_string(),
                    item: "Blue".to_string(),
                }
            );
        }

        #[test]
        fn test_extern_with_concrete_types() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![b.extern_function(
                    "print",
                    vec![b.param("message", b.ty("String"))],
                    None,
                )],
                vec![b.expr_stmt(b.call(b.identifier("print"), vec![b.string("hi")]))],
            );
            let analysis = analyze(program).expect("Extern call should check");
            assert_eq!(
                analysis.declaration_type("print").as_deref(),
                Some("(String) -> Void")
            );
        }

        #[test]
        fn test_extern_with_unknown_type() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![b.extern_function("f", vec![b.param("x", b.ty("Foo"))], None)],
                vec![],
            );
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::ExternNotConcrete {
                    name: "f".to_string()
                }
            );
        }
    }
}
