//! `null` is only accepted where an optional class type is expected.

#[cfg(test)]
mod nullability_tests {
    use crate::utils::{analyze, semantic_error};
    use kestrel_ast::{builder::AstBuilder, nodes::OperatorKind};
    use kestrel_type_checker::errors::SemanticErrorKind;

    #[test]
    fn test_null_to_optional_object() {
        let b = AstBuilder::default();
        let null = b.null();
        let null_id = null.id();
        let program = b.program(
            vec![
                b.class("A", None, vec![]),
                b.var("a", Some(b.optional(b.ty("A"))), Some(null)),
            ],
            vec![],
        );
        let analysis = analyze(program).expect("null should be an optional object");
        assert_eq!(analysis.display_type(null_id).as_deref(), Some("Optional<A>"));
    }

    #[test]
    fn test_null_to_optional_primitive() {
        let b = AstBuilder::default();
        let program = b.program(
            vec![b.var("i", Some(b.optional(b.ty("Int"))), Some(b.null()))],
            vec![],
        );
        let err = semantic_error(program);
        assert_eq!(
            err.kind,
            SemanticErrorKind::Nullability {
                found: "Optional<Int>".to_string()
            }
        );
        assert_eq!(err.context.as_deref(), Some("i"));
    }

    #[test]
    fn test_null_to_string() {
        let b = AstBuilder::default();
        let program = b.program(vec![b.var("s", Some(b.ty("String")), Some(b.null()))], vec![]);
        let err = semantic_error(program);
        assert_eq!(
            err.kind,
            SemanticErrorKind::Nullability {
                found: "String".to_string()
            }
        );
    }

    #[test]
    fn test_null_to_non_optional_object() {
        let b = AstBuilder::default();
        let program = b.program(
            vec![
                b.class("A", None, vec![]),
                b.var("a", Some(b.ty("A")), Some(b.null())),
            ],
            vec![],
        );
        let err = semantic_error(program);
        assert_eq!(
            err.kind,
            SemanticErrorKind::Nullability {
                found: "A".to_string()
            }
        );
    }

    #[test]
    fn test_untyped_null() {
        let b = AstBuilder::default();
        let program = b.program(vec![b.var("x", None, Some(b.null()))], vec![]);
        let err = semantic_error(program);
        assert!(
            matches!(err.kind, SemanticErrorKind::Incomplete { .. }),
            "Expected incomplete type, got: {:?}",
            err.kind
        );
    }

    #[test]
    fn test_null_argument() {
        let b = AstBuilder::default();
        let program = b.program(
            vec![
                b.class("A", None, vec![]),
                b.function("take", vec![b.param("a", b.optional(b.ty("A")))], None, vec![]),
            ],
            vec![b.expr_stmt(b.call(b.identifier("take"), vec![b.null()]))],
        );
        let result = analyze(program);
        assert!(
            result.is_ok(),
            "null argument should take the parameter type, got: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_null_assignment_and_comparison() {
        let b = AstBuilder::default();
        let program = b.program(
            vec![
                b.class("A", None, vec![]),
                b.var(
                    "a",
                    Some(b.optional(b.ty("A"))),
                    Some(b.call(b.identifier("A"), vec![])),
                ),
            ],
            vec![
                b.expr_stmt(b.assign(b.identifier("a"), b.null())),
                b.expr_stmt(b.binary(b.identifier("a"), OperatorKind::Eq, b.null())),
            ],
        );
        let result = analyze(program);
        assert!(
            result.is_ok(),
            "null should be assignable and comparable to an optional object, got: {:?}",
            result.err()
        );
    }
}
