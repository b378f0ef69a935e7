//! Expression parsing for Kconfig
//!
//! Precedence, loosest first:
//!
//! ```text
//! OrExpr → AndExpr → NotExpr → CmpExpr → Primary
//! Primary = '(' OrExpr ')' | SYMBOL_REF | LITERAL
//! ```

use crate::parser::syntax_kind::SyntaxKind;
use rowan::Checkpoint;

/// Interface between the expression grammar and the parser driving it.
pub(crate) trait ExpressionParser {
    fn current_kind(&self) -> SyntaxKind;
    fn at(&self, kind: SyntaxKind) -> bool;
    fn bump(&mut self);
    fn error(&mut self, message: String);

    fn start_node(&mut self, kind: SyntaxKind);
    fn finish_node(&mut self);
    fn checkpoint(&mut self) -> Checkpoint;
    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind);
}

/// Whether the current token can begin an expression.
pub(crate) fn at_expression_start<P: ExpressionParser>(p: &P) -> bool {
    let kind = p.current_kind();
    kind.is_literal() || matches!(kind, SyntaxKind::BANG | SyntaxKind::L_PAREN)
}

/// Parse an expression. Returns false (after reporting) if none was present.
pub(crate) fn expression<P: ExpressionParser>(p: &mut P) -> bool {
    if !at_expression_start(p) {
        p.error("expected an expression".to_string());
        return false;
    }
    or_expr(p);
    true
}

/// `if expr` suffix, wrapped in a CONDITION node.
pub(crate) fn opt_condition<P: ExpressionParser>(p: &mut P) {
    if p.at(SyntaxKind::IF_KW) {
        p.start_node(SyntaxKind::CONDITION);
        p.bump(); // if
        expression(p);
        p.finish_node();
    }
}

fn or_expr<P: ExpressionParser>(p: &mut P) {
    let checkpoint = p.checkpoint();
    and_expr(p);
    while p.at(SyntaxKind::PIPE_PIPE) {
        p.start_node_at(checkpoint, SyntaxKind::OR_EXPR);
        p.bump();
        operand(p, and_expr);
        p.finish_node();
    }
}

fn and_expr<P: ExpressionParser>(p: &mut P) {
    let checkpoint = p.checkpoint();
    not_expr(p);
    while p.at(SyntaxKind::AMP_AMP) {
        p.start_node_at(checkpoint, SyntaxKind::AND_EXPR);
        p.bump();
        operand(p, not_expr);
        p.finish_node();
    }
}

fn not_expr<P: ExpressionParser>(p: &mut P) {
    if p.at(SyntaxKind::BANG) {
        p.start_node(SyntaxKind::NOT_EXPR);
        p.bump();
        operand(p, not_expr);
        p.finish_node();
    } else {
        comparison(p);
    }
}

fn comparison<P: ExpressionParser>(p: &mut P) {
    let checkpoint = p.checkpoint();
    primary(p);
    if p.current_kind().is_comparison() {
        p.start_node_at(checkpoint, SyntaxKind::CMP_EXPR);
        p.bump();
        primary(p);
        p.finish_node();
    }
}

/// Right-hand side of an operator: report a missing operand instead of
/// consuming the rest of the line.
fn operand<P: ExpressionParser>(p: &mut P, parse: fn(&mut P)) {
    if at_expression_start(p) {
        parse(p);
    } else {
        p.error("expected an operand".to_string());
    }
}

/// A parenthesized expression, symbol reference, or literal.
pub(crate) fn primary<P: ExpressionParser>(p: &mut P) {
    match p.current_kind() {
        SyntaxKind::L_PAREN => {
            p.start_node(SyntaxKind::PAREN_EXPR);
            p.bump();
            expression(p);
            if p.at(SyntaxKind::R_PAREN) {
                p.bump();
            } else {
                p.error("expected `)`".to_string());
            }
            p.finish_node();
        }
        SyntaxKind::IDENT => {
            p.start_node(SyntaxKind::SYMBOL_REF);
            p.bump();
            p.finish_node();
        }
        SyntaxKind::STRING
        | SyntaxKind::INT_NUMBER
        | SyntaxKind::HEX_NUMBER
        | SyntaxKind::MACRO => {
            p.start_node(SyntaxKind::LITERAL);
            p.bump();
            p.finish_node();
        }
        _ => p.error("expected a symbol or value".to_string()),
    }
}
