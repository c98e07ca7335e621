use core::fmt;
use std::fmt::{Display, Formatter};

/// Identifier of a syntax tree node, unique within one [`Program`]. Zero is reserved.
pub type NodeId = u32;

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub start_column: u32,
    pub end_column: u32,
}

impl Location {
    #[must_use]
    pub fn new(file: impl Into<String>, line: u32, start_column: u32, end_column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            start_column,
            end_column,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.file.is_empty() {
            write!(f, "{}:{}", self.line, self.start_column)
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.start_column)
        }
    }
}

#[macro_export]
macro_rules! ast_node {
    (
        $(#[$outer:meta])*
        $struct_vis:vis struct $name:ident {
            $(
                $(#[$field_attr:meta])*
                $field_vis:vis $field_name:ident : $field_ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Clone, PartialEq, Eq, Debug)]
        $struct_vis struct $name {
            pub id: $crate::nodes::NodeId,
            pub location: $crate::nodes::Location,
            $(
                $(#[$field_attr])*
                $field_vis $field_name : $field_ty,
            )*
        }
    };
}

macro_rules! ast_nodes {
    (
        $(
            $(#[$outer:meta])*
            $struct_vis:vis struct $name:ident { $($fields:tt)* }
        )+
    ) => {
        $(
            ast_node! {
                $(#[$outer])*
                $struct_vis struct $name { $($fields)* }
            }
        )+
    };
}

macro_rules! ast_enum {
    (
        $(#[$outer:meta])*
        $enum_vis:vis enum $name:ident {
            $(
                $(#[$arm_attr:meta])*
                $arm:ident ( $inner:ty ),
            )*
        }
    ) => {
        $(#[$outer])*
        #[derive(Clone, PartialEq, Eq, Debug)]
        $enum_vis enum $name {
            $(
                $(#[$arm_attr])*
                $arm ( $inner ),
            )*
        }

        impl $name {
            #[must_use]
            pub fn id(&self) -> NodeId {
                match self {
                    $(
                        $name::$arm(n) => n.id,
                    )*
                }
            }

            #[must_use]
            pub fn location(&self) -> &Location {
                match self {
                    $(
                        $name::$arm(n) => &n.location,
                    )*
                }
            }
        }
    };
}

macro_rules! ast_enums {
    (
        $(
            $(#[$outer:meta])*
            $enum_vis:vis enum $name:ident { $($arms:tt)* }
        )+
    ) => {
        $(
            ast_enum! {
                $(#[$outer])*
                $enum_vis enum $name { $($arms)* }
            }
        )+
    };
}

ast_enums! {

    pub enum Declaration {
        Object(ObjectDeclaration),
        Function(FunctionDeclaration),
        Variable(VariableDeclaration),
        Enum(EnumDeclaration),
        Extern(ExternDeclaration),
    }

    pub enum Statement {
        Expression(ExpressionStatement),
        Variable(VariableDeclaration),
        Return(ReturnStatement),
        If(IfStatement),
        While(WhileStatement),
        Block(Block),
    }

    pub enum Expression {
        Literal(Literal),
        Identifier(Identifier),
        This(ThisExpression),
        Super(SuperExpression),
        Call(CallExpression),
        Binary(BinaryExpression),
        Unary(UnaryExpression),
        MemberAccess(MemberAccessExpression),
        Index(IndexExpression),
        Assignment(AssignmentExpression),
        Array(ArrayLiteral),
        Structure(StructureLiteral),
        EnumShorthand(EnumShorthand),
    }

    /// A type annotation as written in source.
    pub enum TypeExpr {
        Named(NamedType),
        Function(FunctionTypeExpr),
        Structure(StructureType),
        InlineEnum(InlineEnumType),
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum LiteralKind {
    /// Digits as written; the literal's type is `Int`.
    Integer(String),
    /// Digits as written; the literal's type is `Float`.
    Float(String),
    String(String),
    Boolean(bool),
    Null,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum UnaryOperatorKind {
    Neg,
    Not,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum OperatorKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Is,
}

ast_nodes! {

    pub struct Program {
        pub declarations: Vec<Declaration>,
        pub statements: Vec<Statement>,
        pub(crate) next_id: NodeId,
    }

    pub struct Identifier {
        pub name: String,
    }

    pub struct ObjectDeclaration {
        pub name: Identifier,
        pub base: Option<TypeExpr>,
        pub members: Vec<Declaration>,
    }

    pub struct FunctionDeclaration {
        pub name: Identifier,
        pub parameters: Vec<Parameter>,
        pub returns: Option<TypeExpr>,
        pub body: Block,
    }

    pub struct Parameter {
        pub name: Identifier,
        pub ty: TypeExpr,
    }

    pub struct VariableDeclaration {
        pub name: Identifier,
        pub ty: Option<TypeExpr>,
        pub value: Option<Expression>,
    }

    pub struct EnumDeclaration {
        pub name: Identifier,
        pub items: Vec<EnumItemDeclaration>,
    }

    pub struct EnumItemDeclaration {
        pub name: Identifier,
        pub parameters: Vec<TypeExpr>,
    }

    /// A bodiless function provided by the host.
    pub struct ExternDeclaration {
        pub name: Identifier,
        pub parameters: Vec<Parameter>,
        pub returns: Option<TypeExpr>,
    }

    pub struct Block {
        pub statements: Vec<Statement>,
    }

    pub struct ExpressionStatement {
        pub expression: Expression,
    }

    pub struct ReturnStatement {
        pub value: Option<Expression>,
    }

    pub struct IfStatement {
        pub condition: Expression,
        pub then_block: Block,
        pub else_block: Option<Block>,
    }

    pub struct WhileStatement {
        pub condition: Expression,
        pub body: Block,
    }

    pub struct Literal {
        pub kind: LiteralKind,
    }

    pub struct ThisExpression {
    }

    pub struct SuperExpression {
    }

    pub struct CallExpression {
        pub callee: Box<Expression>,
        pub arguments: Vec<Expression>,
    }

    pub struct BinaryExpression {
        pub left: Box<Expression>,
        pub operator: OperatorKind,
        pub right: Box<Expression>,
    }

    pub struct UnaryExpression {
        pub operator: UnaryOperatorKind,
        pub operand: Box<Expression>,
    }

    pub struct MemberAccessExpression {
        pub object: Box<Expression>,
        pub member: Identifier,
    }

    pub struct IndexExpression {
        pub array: Box<Expression>,
        pub index: Box<Expression>,
    }

    pub struct AssignmentExpression {
        pub target: Box<Expression>,
        pub value: Box<Expression>,
    }

    pub struct ArrayLiteral {
        pub elements: Vec<Expression>,
    }

    pub struct StructureLiteral {
        pub fields: Vec<StructureLiteralField>,
    }

    pub struct StructureLiteralField {
        pub name: Identifier,
        pub value: Expression,
    }

    /// `.Item`, an enum item whose enum is taken from the expected type.
    pub struct EnumShorthand {
        pub item: Identifier,
    }

    pub struct NamedType {
        pub name: Identifier,
        pub arguments: Vec<TypeExpr>,
    }

    pub struct FunctionTypeExpr {
        pub parameters: Vec<TypeExpr>,
        pub returns: Option<Box<TypeExpr>>,
    }

    pub struct StructureType {
        pub fields: Vec<StructureTypeField>,
    }

    pub struct StructureTypeField {
        pub name: Identifier,
        pub ty: TypeExpr,
    }

    pub struct InlineEnumType {
        pub items: Vec<EnumItemDeclaration>,
    }
}
