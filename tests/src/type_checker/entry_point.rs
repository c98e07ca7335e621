//! Entry point synthesis tests

#[cfg(test)]
mod entry_point_tests {
    use crate::utils::{analyze, semantic_error};
    use kestrel_ast::builder::AstBuilder;
    use kestrel_type_checker::{errors::SemanticErrorKind, passes::ENTRY_POINT};

    #[test]
    fn test_statements_become_main() {
        let b = AstBuilder::default();
        let statement = b.expr_stmt(b.int("1"));
        let statement_id = statement.id();
        let program = b.program(vec![], vec![statement]);
        let analysis = analyze(program).expect("Top-level statements should check");

        assert!(analysis.program().statements.is_empty());
        let main = analysis
            .program()
            .function(ENTRY_POINT)
            .expect("main should be synthesized");
        assert_eq!(main.body.statements.len(), 1);
        assert_eq!(main.body.statements[0].id(), statement_id);
        assert_eq!(analysis.declaration_type("main").as_deref(), Some("() -> Void"));
    }

    #[test]
    fn test_empty_program_gets_empty_main() {
        let b = AstBuilder::default();
        let analysis = analyze(b.program(vec![], vec![])).expect("Empty program should check");
        let main = analysis
            .program()
            .function(ENTRY_POINT)
            .expect("main should be synthesized");
        assert!(main.body.statements.is_empty());
    }

    #[test]
    fn test_explicit_main() {
        let b = AstBuilder::default();
        let program = b.program(
            vec![b.function("main", vec![], None, vec![b.expr_stmt(b.int("1"))])],
            vec![],
        );
        let analysis = analyze(program).expect("Explicit main should check");
        let mains = analysis
            .program()
            .declarations
            .iter()
            .filter(|declaration| declaration.name() == ENTRY_POINT)
            .count();
        assert_eq!(mains, 1);
    }

    #[test]
    fn test_main_and_statements_are_ambiguous() {
        let b = AstBuilder::default();
        let program = b.program(
            vec![b.function("main", vec![], None, vec![])],
            vec![b.expr_stmt(b.int("1"))],
        );
        let err = semantic_error(program);
        assert_eq!(err.kind, SemanticErrorKind::AmbiguousEntryPoint);
    }

    #[test]
    fn test_statement_variables_are_local_to_main() {
        let b = AstBuilder::default();
        let program = b.program(vec![], vec![b.var_stmt("x", None, Some(b.int("1")))]);
        let analysis = analyze(program).expect("Local variable should check");
        assert_eq!(analysis.declaration_type("x"), None);
    }

    #[test]
    fn test_statement_locals_are_invisible_to_functions() {
        let b = AstBuilder::default();
        let program = b.program(
            vec![b.function(
                "f",
                vec![],
                Some(b.ty("Int")),
                vec![b.ret(Some(b.identifier("x")))],
            )],
            vec![b.var_stmt("x", None, Some(b.int("1")))],
        );
        let err = semantic_error(program);
        assert_eq!(
            err.kind,
            SemanticErrorKind::UnresolvedReference {
                name: "x".to_string()
            }
        );
        assert_eq!(err.context.as_deref(), Some("f"));
    }

    #[test]
    fn test_statements_use_later_declarations() {
        let b = AstBuilder::default();
        let program = b.program(
            vec![
                b.class("Box", None, vec![b.var("size", Some(b.ty("Int")), None)]),
                b.function(
                    "make",
                    vec![],
                    Some(b.ty("Box")),
                    vec![b.ret(Some(b.call(b.identifier("Box"), vec![])))],
                ),
            ],
            vec![b.var_stmt(
                "n",
                Some(b.ty("Int")),
                Some(b.member(b.call(b.identifier("make"), vec![]), "size")),
            )],
        );
        let result = analyze(program);
        assert!(
            result.is_ok(),
            "Statements should see every declaration, got: {:?}",
            result.err()
        );
    }
}
