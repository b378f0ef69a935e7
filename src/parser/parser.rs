//! Recursive descent parser for Kconfig
//!
//! Builds a rowan GreenNode tree from tokens.
//! Supports error recovery and produces a lossless CST.

use super::grammar;
use super::lexer::{Lexer, Token};
use super::syntax_kind::SyntaxKind;
use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange, TextSize};

/// Parse result containing the green tree and any errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Get the root syntax node
    pub fn syntax(&self) -> super::SyntaxNode {
        super::SyntaxNode::new_root(self.green.clone())
    }

    /// Get the typed root of the tree
    pub fn source_file(&self) -> super::ast::SourceFile {
        super::ast::SourceFile::new(self.syntax())
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// What kind of problem a syntax error describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxErrorKind {
    /// Unexpected or missing token.
    Unexpected,
    /// `menu`/`choice`/`if` without its closer, or a stray closer.
    Unbalanced,
}

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
    pub kind: SyntaxErrorKind,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
            kind: SyntaxErrorKind::Unexpected,
        }
    }

    pub fn unbalanced(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
            kind: SyntaxErrorKind::Unbalanced,
        }
    }
}

/// Parse Kconfig source code into a CST
pub fn parse(input: &str) -> Parse {
    let tokens: Vec<_> = Lexer::new(input).collect();
    let mut parser = Parser::new(&tokens, TextSize::of(input));
    grammar::source_file(&mut parser);
    parser.finish()
}

/// The parser state
pub(crate) struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    end: TextSize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
    /// Closers of the blocks currently open, innermost last.
    blocks: Vec<SyntaxKind>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>], end: TextSize) -> Self {
        Self {
            tokens,
            pos: 0,
            end,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
            blocks: Vec::new(),
        }
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current_index(&self) -> Option<usize> {
        (self.pos..self.tokens.len()).find(|&idx| !self.tokens[idx].kind.is_trivia())
    }

    pub(crate) fn current(&self) -> Option<&Token<'a>> {
        self.current_index().map(|idx| &self.tokens[idx])
    }

    pub(crate) fn current_kind(&self) -> SyntaxKind {
        self.current().map(|t| t.kind).unwrap_or(SyntaxKind::EOF)
    }

    pub(crate) fn current_text(&self) -> &str {
        self.current().map(|t| t.text).unwrap_or("")
    }

    pub(crate) fn current_range(&self) -> TextRange {
        self.current()
            .map(|t| TextRange::at(t.offset, TextSize::of(t.text)))
            .unwrap_or_else(|| TextRange::empty(self.end))
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.current_kind() == kind
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.current_index().is_none()
    }

    /// Kind of the first significant token that is not a newline.
    pub(crate) fn next_statement_kind(&self) -> SyntaxKind {
        self.tokens[self.pos..]
            .iter()
            .map(|t| t.kind)
            .find(|k| !k.is_trivia() && *k != SyntaxKind::NEWLINE)
            .unwrap_or(SyntaxKind::EOF)
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    /// Move pending trivia into the node currently being built.
    pub(crate) fn eat_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            if !token.kind.is_trivia() {
                break;
            }
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    pub(crate) fn bump(&mut self) {
        self.eat_trivia();
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind, what: &str) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!("expected {what}"));
            false
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    pub(crate) fn error(&mut self, message: impl Into<String>) {
        let range = self.current_range();
        self.errors.push(SyntaxError::new(message, range));
    }

    pub(crate) fn push_error(&mut self, error: SyntaxError) {
        self.errors.push(error);
    }

    /// Report an error and skip the rest of the line into an ERROR node.
    ///
    /// Stops before the newline so the statement loop can consume it.
    pub(crate) fn recover_line(&mut self, message: impl Into<String>) {
        self.error(message);
        if self.at(SyntaxKind::NEWLINE) || self.at_eof() {
            return;
        }
        self.start_node(SyntaxKind::ERROR);
        while !self.at_eof() && !self.at(SyntaxKind::NEWLINE) {
            self.bump();
        }
        self.finish_node();
    }

    // =========================================================================
    // Block tracking
    // =========================================================================

    pub(crate) fn open_block(&mut self, closer: SyntaxKind) {
        self.blocks.push(closer);
    }

    pub(crate) fn close_block(&mut self) {
        self.blocks.pop();
    }

    /// Whether some open block is waiting for this closer.
    pub(crate) fn expects_closer(&self, closer: SyntaxKind) -> bool {
        self.blocks.contains(&closer)
    }

    // =========================================================================
    // Node building helpers
    // =========================================================================

    pub(crate) fn start_node(&mut self, kind: SyntaxKind) {
        self.eat_trivia();
        self.builder.start_node(kind.into());
    }

    pub(crate) fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    pub(crate) fn checkpoint(&mut self) -> Checkpoint {
        self.eat_trivia();
        self.builder.checkpoint()
    }

    pub(crate) fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    /// Start the root node without consuming leading trivia.
    pub(crate) fn start_root(&mut self) {
        self.builder.start_node(SyntaxKind::SOURCE_FILE.into());
    }
}

impl grammar::ExpressionParser for Parser<'_> {
    fn current_kind(&self) -> SyntaxKind {
        Parser::current_kind(self)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        Parser::at(self, kind)
    }

    fn bump(&mut self) {
        Parser::bump(self)
    }

    fn error(&mut self, message: String) {
        Parser::error(self, message)
    }

    fn start_node(&mut self, kind: SyntaxKind) {
        Parser::start_node(self, kind)
    }

    fn finish_node(&mut self) {
        Parser::finish_node(self)
    }

    fn checkpoint(&mut self) -> Checkpoint {
        Parser::checkpoint(self)
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        Parser::start_node_at(self, checkpoint, kind)
    }
}
