//! Logos-based lexer for Kconfig
//!
//! Fast tokenization using the logos crate, plus the one context-sensitive
//! rule of the language: the indented block after `help` is a single token.

use super::keywords::classify_word;
use super::syntax_kind::SyntaxKind;
use logos::Logos;
use rowan::TextSize;

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HelpState {
    Idle,
    /// Saw `help`, waiting for the end of its line.
    AfterKeyword,
    /// The next token is the help block, if any.
    AtBlock,
}

/// Lexer wrapping the logos-generated tokenizer
///
/// The lexer never fails: characters that match no rule come out as
/// [`SyntaxKind::ERROR`] tokens.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    help: HelpState,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            help: HelpState::Idle,
        }
    }

    fn help_block(&mut self) -> Option<Token<'a>> {
        let rest = self.inner.remainder();
        let len = help_block_len(rest);
        if len == 0 {
            return None;
        }
        let offset = TextSize::new(self.inner.span().end as u32);
        let text = &rest[..len];
        self.inner.bump(len);
        Some(Token {
            kind: SyntaxKind::HELP_TEXT,
            text,
            offset,
        })
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.help == HelpState::AtBlock {
            self.help = HelpState::Idle;
            if let Some(token) = self.help_block() {
                return Some(token);
            }
        }

        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.inner.span().start as u32);

        let kind = match logos_token {
            Ok(LogosToken::Word) => classify_word(text),
            Ok(t) => t.into(),
            Err(()) => SyntaxKind::ERROR,
        };

        match kind {
            SyntaxKind::HELP_KW => self.help = HelpState::AfterKeyword,
            SyntaxKind::NEWLINE if self.help == HelpState::AfterKeyword => {
                self.help = HelpState::AtBlock
            }
            _ => {}
        }

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Width of a line's leading whitespace, with tabs expanding to 8 columns.
fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / 8 + 1) * 8,
            _ => break,
        }
    }
    width
}

/// Length in bytes of the help block at the start of `rest`.
///
/// The block ends before the first non-blank line indented less than the
/// first text line. Trailing blank lines are not part of the block.
fn help_block_len(rest: &str) -> usize {
    let mut first_indent = None;
    let mut consumed = 0;
    let mut end = 0;
    for line in rest.split_inclusive('\n') {
        let body = line.trim_end_matches(['\n', '\r']);
        if body.trim().is_empty() {
            consumed += line.len();
            continue;
        }
        let indent = indent_width(body);
        match first_indent {
            None if indent == 0 => break,
            None => first_indent = Some(indent),
            Some(first) if indent < first => break,
            Some(_) => {}
        }
        consumed += line.len();
        end = consumed;
    }
    end
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\x0c]+")]
    Whitespace,

    #[regex(r"\\\r?\n")]
    LineContinuation,

    #[regex(r"#[^\n]*")]
    Comment,

    #[token("\n")]
    Newline,

    // =========================================================================
    // LITERALS
    // =========================================================================
    /// Keywords, identifiers, and unsigned numbers; see [`classify_word`].
    #[regex(r"[A-Za-z0-9_][A-Za-z0-9_\-]*")]
    Word,

    #[regex(r"-[0-9]+")]
    NegativeNumber,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    String,

    #[regex(r"\$\([^)\n]*\)")]
    Macro,

    #[token("---help---")]
    LegacyHelp,

    // =========================================================================
    // OPERATORS
    // =========================================================================
    #[token("=")]
    Eq,
    #[token("!=")]
    BangEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("!")]
    Bang,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace => SyntaxKind::WHITESPACE,
            LogosToken::LineContinuation => SyntaxKind::LINE_CONTINUATION,
            LogosToken::Comment => SyntaxKind::COMMENT,
            LogosToken::Newline => SyntaxKind::NEWLINE,
            LogosToken::Word => SyntaxKind::IDENT,
            LogosToken::NegativeNumber => SyntaxKind::INT_NUMBER,
            LogosToken::String => SyntaxKind::STRING,
            LogosToken::Macro => SyntaxKind::MACRO,
            LogosToken::LegacyHelp => SyntaxKind::HELP_KW,
            LogosToken::Eq => SyntaxKind::EQ,
            LogosToken::BangEq => SyntaxKind::BANG_EQ,
            LogosToken::Lt => SyntaxKind::LT,
            LogosToken::LtEq => SyntaxKind::LT_EQ,
            LogosToken::Gt => SyntaxKind::GT,
            LogosToken::GtEq => SyntaxKind::GT_EQ,
            LogosToken::Bang => SyntaxKind::BANG,
            LogosToken::AmpAmp => SyntaxKind::AMP_AMP,
            LogosToken::PipePipe => SyntaxKind::PIPE_PIPE,
            LogosToken::LParen => SyntaxKind::L_PAREN,
            LogosToken::RParen => SyntaxKind::R_PAREN,
        }
    }
}
