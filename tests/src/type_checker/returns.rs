//! Return statement tests

#[cfg(test)]
mod return_tests {
    use crate::utils::{analyze, semantic_error};
    use kestrel_ast::builder::AstBuilder;
    use kestrel_type_checker::errors::{MismatchContext, SemanticErrorKind};

    #[test]
    fn test_function_returning_value() {
        let b = AstBuilder::default();
        let program = b.program(
            vec![b.function("one", vec![], Some(b.ty("Int")), vec![b.ret(Some(b.int("1")))])],
            vec![],
        );
        let analysis = analyze(program).expect("Returning function should check");
        assert_eq!(analysis.declaration_type("one").as_deref(), Some("() -> Int"));
    }

    #[test]
    fn test_missing_return() {
        let b = AstBuilder::default();
        let program = b.program(vec![b.function("f", vec![], Some(b.ty("Int")), vec![])], vec![]);
        let err = semantic_error(program);
        assert_eq!(
            err.kind,
            SemanticErrorKind::MissingReturn {
                function: "f".to_string(),
                expected: "Int".to_string(),
            }
        );
        assert_eq!(err.context.as_deref(), Some("f"));
    }

    #[test]
    fn test_return_only_inside_branch() {
        let b = AstBuilder::default();
        let body = vec![b.if_stmt(b.boolean(true), vec![b.ret(Some(b.int("1")))], None)];
        let program = b.program(vec![b.function("f", vec![], Some(b.ty("Int")), body)], vec![]);
        let err = semantic_error(program);
        assert_eq!(
            err.kind,
            SemanticErrorKind::LastStatementNotReturn {
                function: "f".to_string()
            }
        );
    }

    #[test]
    fn test_statement_after_return() {
        let b = AstBuilder::default();
        let body = vec![
            b.ret(Some(b.int("1"))),
            b.var_stmt("x", None, Some(b.int("2"))),
        ];
        let program = b.program(vec![b.function("f", vec![], Some(b.ty("Int")), body)], vec![]);
        let err = semantic_error(program);
        assert_eq!(
            err.kind,
            SemanticErrorKind::LastStatementNotReturn {
                function: "f".to_string()
            }
        );
    }

    #[test]
    fn test_value_returned_from_void_function() {
        let b = AstBuilder::default();
        let program = b.program(
            vec![b.function("f", vec![], None, vec![b.ret(Some(b.int("1")))])],
            vec![],
        );
        let err = semantic_error(program);
        assert_eq!(err.kind, SemanticErrorKind::VoidReturnValue);
    }

    #[test]
    fn test_missing_return_value() {
        let b = AstBuilder::default();
        let program = b.program(
            vec![b.function("f", vec![], Some(b.ty("Int")), vec![b.ret(None)])],
            vec![],
        );
        let err = semantic_error(program);
        assert_eq!(
            err.kind,
            SemanticErrorKind::MissingReturnValue {
                expected: "Int".to_string()
            }
        );
    }

    #[test]
    fn test_returned_type_mismatch() {
        let b = AstBuilder::default();
        let program = b.program(
            vec![b.function(
                "f",
                vec![],
                Some(b.ty("Int")),
                vec![b.ret(Some(b.string("one")))],
            )],
            vec![],
        );
        let err = semantic_error(program);
        assert_eq!(
            err.kind,
            SemanticErrorKind::TypeMismatch {
                expected: "Int".to_string(),
                found: "String".to_string(),
                context: MismatchContext::Return,
            }
        );
    }

    #[test]
    fn test_object_returned_as_optional() {
        let b = AstBuilder::default();
        let program = b.program(
            vec![
                b.class("A", None, vec![]),
                b.function(
                    "make",
                    vec![],
                    Some(b.optional(b.ty("A"))),
                    vec![b.ret(Some(b.call(b.identifier("A"), vec![])))],
                ),
            ],
            vec![],
        );
        let result = analyze(program);
        assert!(
            result.is_ok(),
            "A value should be accepted where an optional is expected, got: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_bare_return_in_top_level_statements() {
        let b = AstBuilder::default();
        let program = b.program(vec![], vec![b.expr_stmt(b.int("1")), b.ret(None)]);
        let result = analyze(program);
        assert!(
            result.is_ok(),
            "Bare return should end the entry point, got: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_method_returning_field() {
        let b = AstBuilder::default();
        let program = b.program(
            vec![b.class(
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
            )],
            vec![],
        );
        let result = analyze(program);
        assert!(
            result.is_ok(),
            "Method should return its field, got: {:?}",
            result.err()
        );
    }
}
