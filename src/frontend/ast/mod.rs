use crate::frontend::lexer::Span;

#[derive(Debug)]
pub struct Module {
    /// Top level statements of the module body
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub span: Span,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Statement {
    pub span: Span,
    pub kind: StatementKind,
}

#[derive(Debug, Clone)]
pub enum StatementKind {
    /// Expression evaluated for its side effects
    Expression(Box<Expression>),
    /// x = 1
    Assignment {
        target: Identifier,
        value: Box<Expression>,
    },
    /// x += 1
    AugmentedAssignment {
        target: Identifier,
        operator: BinaryOperator,
        value: Box<Expression>,
    },
    /// x: int = 1
    AnnotatedAssignment {
        target: Identifier,
        annotation: Identifier,
        value: Option<Box<Expression>>,
    },
    Pass,
    Return(Option<Box<Expression>>),
    If {
        condition: Box<Expression>,
        body: Vec<Statement>,
        orelse: Vec<Statement>,
    },
    While {
        condition: Box<Expression>,
        body: Vec<Statement>,
    },
    FunctionDefinition(Box<FunctionDefinition>),
}

#[derive(Debug, Clone)]
pub struct FunctionDefinition {
    pub name: Identifier,
    pub parameters: Vec<Parameter>,
    pub return_annotation: Option<Identifier>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: Identifier,
    pub annotation: Option<Identifier>,
}

#[derive(Debug, Clone)]
pub struct Expression {
    pub span: Span,
    pub kind: ExpressionKind,
}

#[derive(Debug, Clone)]
pub enum ExpressionKind {
    Literal(Literal),
    Name(Identifier),
    Unary {
        operator: UnaryOperator,
        operand: Box<Expression>,
    },
    Binary {
        lhs: Box<Expression>,
        operator: BinaryOperator,
        rhs: Box<Expression>,
    },
    /// `a < b <= c`, kept whole so each operand is evaluated once
    Comparison {
        first: Box<Expression>,
        rest: Vec<(CompareOperator, Expression)>,
    },
    Call {
        callee: Identifier,
        arguments: Vec<Expression>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    None,
    Boolean(bool),
    Integer(i32),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Plus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    FloorDivide,
    Modulus,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOperator {
    LessThan,
    LessThanOrEqualTo,
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEqualTo,
}

impl core::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::FloorDivide => "//",
            BinaryOperator::Modulus => "%",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        })
    }
}

impl core::fmt::Display for CompareOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CompareOperator::LessThan => "<",
            CompareOperator::LessThanOrEqualTo => "<=",
            CompareOperator::Equals => "==",
            CompareOperator::NotEquals => "!=",
            CompareOperator::GreaterThan => ">",
            CompareOperator::GreaterThanOrEqualTo => ">=",
        })
    }
}
