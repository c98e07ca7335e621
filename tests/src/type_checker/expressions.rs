//! Expression checking tests
//!
//! Operators, calls, member access, indexing and assignment.

#[cfg(test)]
mod expression_tests {
    use crate::utils::{analyze, semantic_error};
    use kestrel_ast::{
        builder::AstBuilder,
        nodes::{Declaration, OperatorKind, UnaryOperatorKind},
    };
    use kestrel_type_checker::errors::{MismatchContext, SemanticErrorKind};

    fn global(b: &AstBuilder, name: &str, value: kestrel_ast::nodes::Expression) -> Declaration {
        b.var(name, None, Some(value))
    }

    mod operators {
        use super::*;

        #[test]
        fn test_arithmetic() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![
                    global(&b, "sum", b.binary(b.int("1"), OperatorKind::Add, b.int("2"))),
                    global(&b, "text", b.binary(b.string("a"), OperatorKind::Add, b.string("b"))),
                    global(&b, "less", b.binary(b.int("1"), OperatorKind::Lt, b.int("2"))),
                    global(&b, "negated", b.unary(UnaryOperatorKind::Neg, b.float("1.5"))),
                ],
                vec![],
            );
            let analysis = analyze(program).expect("Operators should check");
            assert_eq!(analysis.declaration_type("sum").as_deref(), Some("Int"));
            assert_eq!(analysis.declaration_type("text").as_deref(), Some("String"));
            assert_eq!(analysis.declaration_type("less").as_deref(), Some("Bool"));
            assert_eq!(analysis.declaration_type("negated").as_deref(), Some("Float"));
        }

        #[test]
        fn test_mismatched_operands() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![global(&b, "x", b.binary(b.int("1"), OperatorKind::Add, b.string("a")))],
                vec![],
            );
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::TypeMismatch {
                    expected: "Int".to_string(),
                    found: "String".to_string(),
                    context: MismatchContext::Operator(OperatorKind::Add),
                }
            );
        }

        #[test]
        fn test_no_implicit_number_widening() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![global(&b, "x", b.binary(b.int("1"), OperatorKind::Mul, b.float("2.0")))],
                vec![],
            );
            let err = semantic_error(program);
            assert!(
                matches!(err.kind, SemanticErrorKind::TypeMismatch { .. }),
                "Int and Float should not mix, got: {:?}",
                err.kind
            );
        }

        #[test]
        fn test_arithmetic_on_booleans() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![global(
                    &b,
                    "x",
                    b.binary(b.boolean(true), OperatorKind::Add, b.boolean(false)),
                )],
                vec![],
            );
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::InvalidOperand {
                    operator: OperatorKind::Add,
                    found: "Bool".to_string(),
                }
            );
        }

        #[test]
        fn test_logical_on_numbers() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![global(&b, "x", b.binary(b.int("1"), OperatorKind::And, b.int("2")))],
                vec![],
            );
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::InvalidOperand {
                    operator: OperatorKind::And,
                    found: "Int".to_string(),
                }
            );
        }

        #[test]
        fn test_not_on_number() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![global(&b, "x", b.unary(UnaryOperatorKind::Not, b.int("1")))],
                vec![],
            );
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::InvalidUnaryOperand {
                    operator: UnaryOperatorKind::Not,
                    found: "Int".to_string(),
                }
            );
        }

        #[test]
        fn test_void_operand() {
            let b = AstBuilder::default();
            let call = b.call(b.identifier("nothing"), vec![]);
            let program = b.program(
                vec![
                    b.function("nothing", vec![], None, vec![]),
                    global(&b, "x", b.binary(call, OperatorKind::Add, b.int("1"))),
                ],
                vec![],
            );
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::VoidOperand {
                    operator: OperatorKind::Add
                }
            );
        }

        #[test]
        fn test_non_boolean_condition() {
            let b = AstBuilder::default();
            let program = b.program(vec![], vec![b.while_stmt(b.int("1"), vec![])]);
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::TypeMismatch {
                    expected: "Bool".to_string(),
                    found: "Int".to_string(),
                    context: MismatchContext::Condition,
                }
            );
        }

        #[test]
        fn test_is_with_related_classes() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![
                    b.class("A", None, vec![]),
                    b.class("B", Some(b.ty("A")), vec![]),
                    global(&b, "b", b.call(b.identifier("B"), vec![])),
                    global(
                        &b,
                        "t",
                        b.binary(b.identifier("b"), OperatorKind::Is, b.identifier("A")),
                    ),
                ],
                vec![],
            );
            let analysis = analyze(program).expect("`is` should accept related classes");
            assert_eq!(analysis.declaration_type("t").as_deref(), Some("Bool"));
        }

        #[test]
        fn test_is_with_unrelated_classes() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![
                    b.class("A", None, vec![]),
                    b.class("C", None, vec![]),
                    global(&b, "a", b.call(b.identifier("A"), vec![])),
                    global(
                        &b,
                        "t",
                        b.binary(b.identifier("a"), OperatorKind::Is, b.identifier("C")),
                    ),
                ],
                vec![],
            );
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::TypeMismatch {
                    expected: "A".to_string(),
                    found: "C".to_string(),
                    context: MismatchContext::Operator(OperatorKind::Is),
                }
            );
        }
    }

    mod calls {
        use super::*;

        fn add(b: &AstBuilder) -> Declaration {
            let sum = b.binary(b.identifier("a"), OperatorKind::Add, b.identifier("b"));
            b.function(
                "add",
                vec![b.param("a", b.ty("Int")), b.param("b", b.ty("Int"))],
                Some(b.ty("Int")),
                vec![b.ret(Some(sum))],
            )
        }

        #[test]
        fn test_call_result() {
            let b = AstBuilder::default();
            let call = b.call(b.identifier("add"), vec![b.int("1"), b.int("2")]);
            let program = b.program(vec![add(&b), global(&b, "r", call)], vec![]);
            let analysis = analyze(program).expect("Call should check");
            assert_eq!(analysis.declaration_type("r").as_deref(), Some("Int"));
        }

        #[test]
        fn test_argument_count() {
            let b = AstBuilder::default();
            let call = b.call(b.identifier("add"), vec![b.int("1")]);
            let program = b.program(vec![add(&b), global(&b, "r", call)], vec![]);
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::ArgumentCount {
                    callee: "add".to_string(),
                    expected: 2,
                    found: 1,
                }
            );
        }

        #[test]
        fn test_argument_type() {
            let b = AstBuilder::default();
            let call = b.call(b.identifier("add"), vec![b.int("1"), b.string("two")]);
            let program = b.program(vec![add(&b), global(&b, "r", call)], vec![]);
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::TypeMismatch {
                    expected: "Int".to_string(),
                    found: "String".to_string(),
                    context: MismatchContext::Argument {
                        callee: "add".to_string(),
                        parameter: "b".to_string(),
                        index: 1,
                    },
                }
            );
        }

        #[test]
        fn test_calling_a_number() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![
                    global(&b, "x", b.int("1")),
                    global(&b, "y", b.call(b.identifier("x"), vec![])),
                ],
                vec![],
            );
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::NotCallable {
                    found: "Int".to_string()
                }
            );
        }

        #[test]
        fn test_constructor_with_arguments() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![
                    b.class("A", None, vec![]),
                    global(&b, "a", b.call(b.identifier("A"), vec![b.int("1")])),
                ],
                vec![],
            );
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::ArgumentCount {
                    callee: "A".to_string(),
                    expected: 0,
                    found: 1,
                }
            );
        }

        #[test]
        fn test_void_initializer() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![
                    b.function("nothing", vec![], None, vec![]),
                    global(&b, "x", b.call(b.identifier("nothing"), vec![])),
                ],
                vec![],
            );
            let err = semantic_error(program);
            assert_eq!(err.kind, SemanticErrorKind::VoidAssignment);
        }

        #[test]
        fn test_unresolved_reference() {
            let b = AstBuilder::default();
            let program = b.program(vec![global(&b, "y", b.identifier("z"))], vec![]);
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::UnresolvedReference {
                    name: "z".to_string()
                }
            );
        }
    }

    mod members {
        use super::*;

        fn point(b: &AstBuilder) -> Declaration {
            b.class(
                "Point",
                None,
                vec![
                    b.var("x", Some(b.ty("Int")), None),
                    b.function(
                        "getX",
                        vec![],
                        Some(b.ty("Int")),
                        vec![b.ret(Some(b.member(b.this(), "x")))],
                    ),
                ],
            )
        }

        #[test]
        fn test_method_call() {
            let b = AstBuilder::default();
            let call = b.call(b.member(b.identifier("p"), "getX"), vec![]);
            let program = b.program(
                vec![
                    point(&b),
                    global(&b, "p", b.call(b.identifier("Point"), vec![])),
                    global(&b, "v", call),
                ],
                vec![],
            );
            let analysis = analyze(program).expect("Method call should check");
            assert_eq!(analysis.declaration_type("v").as_deref(), Some("Int"));
        }

        #[test]
        fn test_missing_member() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![
                    point(&b),
                    global(&b, "p", b.call(b.identifier("Point"), vec![])),
                    global(&b, "w", b.member(b.identifier("p"), "y")),
                ],
                vec![],
            );
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::MissingMember {
                    type_name: "Point".to_string(),
                    member: "y".to_string(),
                }
            );
        }

        #[test]
        fn test_member_of_number() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![
                    global(&b, "n", b.int("1")),
                    global(&b, "w", b.member(b.identifier("n"), "y")),
                ],
                vec![],
            );
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::NotAnObject {
                    found: "Int".to_string()
                }
            );
        }

        #[test]
        fn test_this_outside_class() {
            let b = AstBuilder::default();
            let program = b.program(vec![], vec![b.expr_stmt(b.this())]);
            let err = semantic_error(program);
            assert_eq!(err.kind, SemanticErrorKind::OutsideObject { keyword: "this" });
        }

        #[test]
        fn test_super_without_base_class() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![b.class(
                    "A",
                    None,
                    vec![b.function("f", vec![], None, vec![b.expr_stmt(b.super_())])],
                )],
                vec![],
            );
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::NoBaseClass {
                    object: "A".to_string()
                }
            );
            assert_eq!(err.context.as_deref(), Some("f"));
        }

        #[test]
        fn test_super_method_call() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![
                    b.class(
                        "A",
                        None,
                        vec![b.function(
                            "size",
                            vec![],
                            Some(b.ty("Int")),
                            vec![b.ret(Some(b.int("1")))],
                        )],
                    ),
                    b.class(
                        "B",
                        Some(b.ty("A")),
                        vec![b.function(
                            "bigger",
                            vec![],
                            Some(b.ty("Int")),
                            vec![b.ret(Some(b.call(b.member(b.super_(), "size"), vec![])))],
                        )],
                    ),
                ],
                vec![],
            );
            let result = analyze(program);
            assert!(
                result.is_ok(),
                "super should resolve to the base class, got: {:?}",
                result.err()
            );
        }
    }

    mod indexing_and_assignment {
        use super::*;

        fn numbers(b: &AstBuilder) -> Declaration {
            b.var(
                "xs",
                Some(b.array_of(b.ty("Int"))),
                Some(b.array(vec![b.int("1"), b.int("2")])),
            )
        }

        #[test]
        fn test_index() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![
                    numbers(&b),
                    global(&b, "x", b.index(b.identifier("xs"), b.int("0"))),
                ],
                vec![],
            );
            let analysis = analyze(program).expect("Indexing should check");
            assert_eq!(analysis.declaration_type("x").as_deref(), Some("Int"));
        }

        #[test]
        fn test_index_with_string() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![
                    numbers(&b),
                    global(&b, "x", b.index(b.identifier("xs"), b.string("0"))),
                ],
                vec![],
            );
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::TypeMismatch {
                    expected: "Int".to_string(),
                    found: "String".to_string(),
                    context: MismatchContext::Index,
                }
            );
        }

        #[test]
        fn test_index_into_number() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![
                    global(&b, "n", b.int("1")),
                    global(&b, "x", b.index(b.identifier("n"), b.int("0"))),
                ],
                vec![],
            );
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::NotIndexable {
                    found: "Int".to_string()
                }
            );
        }

        #[test]
        fn test_assignment() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![numbers(&b)],
                vec![b.expr_stmt(b.assign(
                    b.index(b.identifier("xs"), b.int("0")),
                    b.int("3"),
                ))],
            );
            let result = analyze(program);
            assert!(
                result.is_ok(),
                "Element assignment should check, got: {:?}",
                result.err()
            );
        }

        #[test]
        fn test_assignment_type_mismatch() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![global(&b, "x", b.int("1"))],
                vec![b.expr_stmt(b.assign(b.identifier("x"), b.string("s")))],
            );
            let err = semantic_error(program);
            assert_eq!(
                err.kind,
                SemanticErrorKind::TypeMismatch {
                    expected: "Int".to_string(),
                    found: "String".to_string(),
                    context: MismatchContext::Assignment,
                }
            );
        }

        #[test]
        fn test_assignment_to_literal() {
            let b = AstBuilder::default();
            let program = b.program(
                vec![],
                vec![b.expr_stmt(b.assign(b.int("1"), b.int("2")))],
            );
            let err = semantic_error(program);
            assert_eq!(err.kind, SemanticErrorKind::InvalidAssignmentTarget);
        }
    }
}
