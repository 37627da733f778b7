//! Expression and simple statement lowering.
//!
//! Expressions lower to ops with a net stack effect of +1, simple statements
//! to ops with a net effect of 0. Control-flow statements never reach this
//! module; the CFG builder splits them off first.

use crate::{
    error::{CompileError, Location, Result},
    frontend::{
        SourceFile,
        ast::{
            BinaryOperator, CompareOperator, Expression, ExpressionKind, Literal, Statement,
            StatementKind, UnaryOperator,
        },
        lexer::Span,
    },
    middle::op::{Constant, ConstantPool, Op, OpKind, ShuffleKind},
};

/// Leading character that turns a standalone string into a raw command
pub const ESCAPE_PREFIX: char = '/';

struct Lowering<'a> {
    source: &'a SourceFile,
    constants: &'a mut ConstantPool,
    ops: Vec<Op>,
}

/// Lowers a simple statement into ops with no net stack effect.
pub fn lower_statement(
    source: &SourceFile,
    constants: &mut ConstantPool,
    statement: &Statement,
) -> Result<Vec<Op>> {
    let mut lowering = Lowering {
        source,
        constants,
        ops: Vec::new(),
    };

    lowering.statement(statement)?;

    Ok(lowering.ops)
}

/// Lowers an expression into ops that leave exactly its value on the stack.
pub fn lower_expression(
    source: &SourceFile,
    constants: &mut ConstantPool,
    expression: &Expression,
) -> Result<Vec<Op>> {
    let mut lowering = Lowering {
        source,
        constants,
        ops: Vec::new(),
    };

    lowering.expression(expression)?;

    Ok(lowering.ops)
}

impl Lowering<'_> {
    fn emit(&mut self, kind: OpKind, span: Span) {
        self.ops.push(Op::new(kind, span));
    }

    fn load_constant(&mut self, constant: Constant, span: Span) {
        let index = self.constants.intern(constant);
        self.emit(OpKind::LoadConst(index), span);
    }

    fn statement(&mut self, statement: &Statement) -> Result<()> {
        let span = statement.span;

        match &statement.kind {
            StatementKind::Expression(expression) => match &expression.kind {
                ExpressionKind::Literal(Literal::String(text))
                    if text.starts_with(ESCAPE_PREFIX) =>
                {
                    let command = &text[ESCAPE_PREFIX.len_utf8()..];

                    if command.trim().is_empty() {
                        return Err(CompileError::syntax(
                            self.source,
                            span,
                            "escaped command is empty",
                        ));
                    }

                    self.emit(OpKind::Direct(command.to_owned()), span);
                }
                _ => {
                    self.expression(expression)?;
                    self.emit(OpKind::Pop, span);
                }
            },
            StatementKind::Assignment { target, value } => {
                self.expression(value)?;
                self.emit(OpKind::StoreName(target.name.clone()), target.span);
            }
            StatementKind::AugmentedAssignment {
                target,
                operator,
                value,
            } => {
                self.emit(OpKind::LoadName(target.name.clone()), target.span);
                self.expression(value)?;
                self.emit(OpKind::Binary(*operator), span);
                self.emit(OpKind::StoreName(target.name.clone()), target.span);
            }
            StatementKind::AnnotatedAssignment { target, value, .. } => match value {
                Some(value) => {
                    self.expression(value)?;
                    self.emit(OpKind::StoreName(target.name.clone()), target.span);
                }
                None => self.emit(OpKind::Nop, span),
            },
            StatementKind::Pass => self.emit(OpKind::Nop, span),
            StatementKind::Return(_)
            | StatementKind::If { .. }
            | StatementKind::While { .. }
            | StatementKind::FunctionDefinition(_) => {
                return Err(CompileError::MalformedProgram {
                    message: "control-flow statement lowered as a simple statement".to_owned(),
                    location: Some(Location::of_span(self.source, span)),
                    detail: String::new(),
                });
            }
        }

        Ok(())
    }

    fn expression(&mut self, expression: &Expression) -> Result<()> {
        let span = expression.span;

        match &expression.kind {
            ExpressionKind::Literal(literal) => {
                let constant = match literal {
                    Literal::None => Constant::None,
                    Literal::Boolean(value) => Constant::Boolean(*value),
                    Literal::Integer(value) => Constant::Integer(*value),
                    Literal::String(value) => Constant::String(value.clone()),
                };

                self.load_constant(constant, span);
            }
            ExpressionKind::Name(identifier) => {
                self.emit(OpKind::LoadName(identifier.name.clone()), span);
            }
            ExpressionKind::Unary { operator, operand } => self.unary(*operator, operand, span)?,
            ExpressionKind::Binary { lhs, operator, rhs } => {
                self.expression(lhs)?;
                self.expression(rhs)?;
                self.emit(OpKind::Binary(*operator), span);
            }
            ExpressionKind::Comparison { first, rest } => self.comparison(first, rest, span)?,
            ExpressionKind::Call { callee, arguments } => {
                self.emit(OpKind::LoadCallee(callee.name.clone()), callee.span);

                for argument in arguments {
                    self.expression(argument)?;
                }

                self.emit(
                    OpKind::Call {
                        argc: arguments.len(),
                    },
                    span,
                );
            }
        }

        Ok(())
    }

    fn unary(&mut self, operator: UnaryOperator, operand: &Expression, span: Span) -> Result<()> {
        match operator {
            UnaryOperator::Plus => self.expression(operand)?,
            UnaryOperator::Negate => {
                if let ExpressionKind::Literal(Literal::Integer(value)) = operand.kind {
                    if let Some(negated) = value.checked_neg() {
                        self.load_constant(Constant::Integer(negated), span);
                        return Ok(());
                    }
                }

                self.load_constant(Constant::Integer(0), span);
                self.expression(operand)?;
                self.emit(OpKind::Binary(BinaryOperator::Subtract), span);
            }
            UnaryOperator::Not => {
                self.expression(operand)?;
                self.load_constant(Constant::Integer(0), span);
                self.emit(OpKind::Compare(CompareOperator::Equals), span);
            }
        }

        Ok(())
    }

    /// `a < b < c` evaluates `b` once: it is duplicated under the first
    /// result, and partial results are folded with `and`.
    fn comparison(
        &mut self,
        first: &Expression,
        rest: &[(CompareOperator, Expression)],
        span: Span,
    ) -> Result<()> {
        self.expression(first)?;

        for (i, (operator, operand)) in rest.iter().enumerate() {
            let last = i + 1 == rest.len();

            // [acc] left
            self.expression(operand)?;

            if last {
                // [acc] left right -> [acc] result
                self.emit(OpKind::Compare(*operator), span);

                if i > 0 {
                    self.emit(OpKind::Binary(BinaryOperator::And), span);
                }

                continue;
            }

            // [acc] left right -> [acc] right result -> [acc] result right
            self.emit(OpKind::Shuffle(ShuffleKind::DupTop), span);
            self.emit(OpKind::Shuffle(ShuffleKind::RotThree), span);
            self.emit(OpKind::Compare(*operator), span);
            self.emit(OpKind::Shuffle(ShuffleKind::RotTwo), span);

            if i > 0 {
                // acc result right -> right acc result -> right acc' -> acc' right
                self.emit(OpKind::Shuffle(ShuffleKind::RotThree), span);
                self.emit(OpKind::Binary(BinaryOperator::And), span);
                self.emit(OpKind::Shuffle(ShuffleKind::RotTwo), span);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{frontend::parser::Parser, middle::storage::ConstIndex};
    use pretty_assertions::assert_eq;

    fn lower_module(source: &str) -> (Vec<Vec<OpKind>>, ConstantPool) {
        let source = SourceFile::from_memory(source);
        let module = Parser::parse_module(&source).expect("should parse");
        let mut constants = ConstantPool::new();

        let lowered = module
            .statements
            .iter()
            .map(|statement| {
                lower_statement(&source, &mut constants, statement)
                    .expect("should lower")
                    .into_iter()
                    .map(|op| op.kind)
                    .collect()
            })
            .collect();

        (lowered, constants)
    }

    fn lower_single(source: &str) -> Vec<OpKind> {
        let (mut lowered, _) = lower_module(source);
        lowered.remove(0)
    }

    fn net_effect(ops: &[OpKind]) -> isize {
        ops.iter().map(OpKind::stack_effect).sum()
    }

    fn load(name: &str) -> OpKind {
        OpKind::LoadName(name.to_owned())
    }

    fn store(name: &str) -> OpKind {
        OpKind::StoreName(name.to_owned())
    }

    #[test]
    fn assignment_evaluates_left_operand_first() {
        let (lowered, constants) = lower_module("x = 1 + 2\ny = x - 3\nz = x / y % x\n");

        assert_eq!(
            lowered[0],
            vec![
                OpKind::LoadConst(ConstIndex(1)),
                OpKind::LoadConst(ConstIndex(2)),
                OpKind::Binary(BinaryOperator::Add),
                store("x"),
            ]
        );
        assert_eq!(
            lowered[1],
            vec![
                load("x"),
                OpKind::LoadConst(ConstIndex(3)),
                OpKind::Binary(BinaryOperator::Subtract),
                store("y"),
            ]
        );
        assert_eq!(
            lowered[2],
            vec![
                load("x"),
                load("y"),
                OpKind::Binary(BinaryOperator::Divide),
                load("x"),
                OpKind::Binary(BinaryOperator::Modulus),
                store("z"),
            ]
        );
        assert_eq!(constants.get(ConstIndex(3)), Some(&Constant::Integer(3)));

        for ops in &lowered {
            assert_eq!(net_effect(ops), 0);
        }
    }

    #[test]
    fn escape_literal_becomes_one_direct_op() {
        let ops = lower_single("\"/say hello world\"\n");

        assert_eq!(ops, vec![OpKind::Direct("say hello world".to_owned())]);
        assert_eq!(net_effect(&ops), 0);
    }

    #[test]
    fn empty_escape_is_rejected() {
        for literal in ["\"/\"", "'/  '"] {
            let source = SourceFile::from_memory(format!("x = 1\n{literal}\n"));
            let module = Parser::parse_module(&source).expect("should parse");
            let mut constants = ConstantPool::new();

            let error = lower_statement(&source, &mut constants, &module.statements[1])
                .expect_err("nothing to run");

            assert!(matches!(
                error,
                CompileError::Syntax { ref message, ref location }
                    if message == "escaped command is empty" && location.line == 2
            ));
        }
    }

    #[test]
    fn plain_string_statement_is_evaluated_and_dropped() {
        let ops = lower_single("\"just a docstring\"\n");

        assert_eq!(ops, vec![OpKind::LoadConst(ConstIndex(1)), OpKind::Pop]);
    }

    #[test]
    fn call_names_callee_then_pushes_arguments() {
        let ops = lower_single("f(a, b)\n");

        assert_eq!(
            ops,
            vec![
                OpKind::LoadCallee("f".to_owned()),
                load("a"),
                load("b"),
                OpKind::Call { argc: 2 },
                OpKind::Pop,
            ]
        );
        assert_eq!(net_effect(&ops), 0);
    }

    #[test]
    fn augmented_assignment_reads_then_writes() {
        let ops = lower_single("count -= step\n");

        assert_eq!(
            ops,
            vec![
                load("count"),
                load("step"),
                OpKind::Binary(BinaryOperator::Subtract),
                store("count"),
            ]
        );
    }

    #[test]
    fn negated_literal_folds() {
        let (lowered, constants) = lower_module("x = -5\ny = -x\n");

        assert_eq!(lowered[0], vec![OpKind::LoadConst(ConstIndex(1)), store("x")]);
        assert_eq!(constants.get(ConstIndex(1)), Some(&Constant::Integer(-5)));
        assert_eq!(
            lowered[1],
            vec![
                OpKind::LoadConst(ConstIndex(2)),
                load("x"),
                OpKind::Binary(BinaryOperator::Subtract),
                store("y"),
            ]
        );
    }

    #[test]
    fn not_compares_against_zero() {
        let ops = lower_single("y = not x\n");

        assert_eq!(
            ops,
            vec![
                load("x"),
                OpKind::LoadConst(ConstIndex(1)),
                OpKind::Compare(CompareOperator::Equals),
                store("y"),
            ]
        );
    }

    #[test]
    fn chained_comparison_leaves_one_value() {
        let two = lower_single("r = a < b\n");
        let three = lower_single("r = a < b < c\n");
        let four = lower_single("r = a < b <= c != d\n");

        assert_eq!(net_effect(&two), 0);
        assert_eq!(net_effect(&three), 0);
        assert_eq!(net_effect(&four), 0);

        assert_eq!(
            three,
            vec![
                load("a"),
                load("b"),
                OpKind::Shuffle(ShuffleKind::DupTop),
                OpKind::Shuffle(ShuffleKind::RotThree),
                OpKind::Compare(CompareOperator::LessThan),
                OpKind::Shuffle(ShuffleKind::RotTwo),
                load("c"),
                OpKind::Compare(CompareOperator::LessThan),
                OpKind::Binary(BinaryOperator::And),
                store("r"),
            ]
        );
    }

    #[test]
    fn control_flow_is_rejected() {
        let source = SourceFile::from_memory("return 1\n");
        let module = Parser::parse_module(&source).expect("should parse");
        let mut constants = ConstantPool::new();

        let error = lower_statement(&source, &mut constants, &module.statements[0])
            .expect_err("return is not a simple statement");

        assert!(matches!(error, CompileError::MalformedProgram { .. }));
    }
}
