//! Typed AST wrappers over the untyped rowan CST.
//!
//! Each struct wraps a SyntaxNode and provides methods to access children.
//! Accessors return `None` for pieces a malformed entry is missing.

use super::syntax_kind::SyntaxKind;
use super::{SyntaxNode, SyntaxToken};
use rowan::TextRange;

/// Trait for AST nodes that wrap a SyntaxNode
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;

    fn text_range(&self) -> TextRange {
        self.syntax().text_range()
    }
}

// ============================================================================
// Helper macros
// ============================================================================

macro_rules! ast_node {
    ($name:ident, $($kind:ident)|+) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                matches!(kind, $(SyntaxKind::$kind)|+)
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

fn token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|t| t.kind() == kind)
}

fn first_significant_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|t| !t.kind().is_trivia())
}

fn child<N: AstNode>(node: &SyntaxNode) -> Option<N> {
    node.children().find_map(N::cast)
}

/// Decode a quoted string literal. Unterminated quotes are tolerated.
pub fn unquote(text: &str) -> String {
    let mut chars = text.chars();
    let quote = match chars.next() {
        Some(q @ ('"' | '\'')) => q,
        _ => return text.to_string(),
    };
    let mut out = String::with_capacity(text.len());
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            c if c == quote => break,
            c => out.push(c),
        }
    }
    out
}

// ============================================================================
// Root
// ============================================================================

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    pub fn new(node: SyntaxNode) -> Self {
        Self(node)
    }

    pub fn entries(&self) -> impl Iterator<Item = Entry> + '_ {
        self.0.children().filter_map(Entry::cast)
    }
}

// ============================================================================
// Entries
// ============================================================================

/// Any menu entry or directive
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Entry {
    Config(ConfigEntry),
    Choice(ChoiceEntry),
    Comment(CommentEntry),
    Menu(MenuEntry),
    If(IfBlock),
    Source(SourceEntry),
    MainMenu(MainMenuEntry),
}

impl AstNode for Entry {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::CONFIG
                | SyntaxKind::MENUCONFIG
                | SyntaxKind::CHOICE
                | SyntaxKind::COMMENT_ENTRY
                | SyntaxKind::MENU
                | SyntaxKind::IF_BLOCK
                | SyntaxKind::SOURCE
                | SyntaxKind::MAINMENU
        )
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::CONFIG | SyntaxKind::MENUCONFIG => Some(Self::Config(ConfigEntry(node))),
            SyntaxKind::CHOICE => Some(Self::Choice(ChoiceEntry(node))),
            SyntaxKind::COMMENT_ENTRY => Some(Self::Comment(CommentEntry(node))),
            SyntaxKind::MENU => Some(Self::Menu(MenuEntry(node))),
            SyntaxKind::IF_BLOCK => Some(Self::If(IfBlock(node))),
            SyntaxKind::SOURCE => Some(Self::Source(SourceEntry(node))),
            SyntaxKind::MAINMENU => Some(Self::MainMenu(MainMenuEntry(node))),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Config(n) => n.syntax(),
            Self::Choice(n) => n.syntax(),
            Self::Comment(n) => n.syntax(),
            Self::Menu(n) => n.syntax(),
            Self::If(n) => n.syntax(),
            Self::Source(n) => n.syntax(),
            Self::MainMenu(n) => n.syntax(),
        }
    }
}

ast_node!(ConfigEntry, CONFIG | MENUCONFIG);

impl ConfigEntry {
    pub fn is_menuconfig(&self) -> bool {
        self.0.kind() == SyntaxKind::MENUCONFIG
    }

    pub fn name(&self) -> Option<Name> {
        child(&self.0)
    }

    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.0.children().filter_map(Attribute::cast)
    }
}

ast_node!(ChoiceEntry, CHOICE);

impl ChoiceEntry {
    pub fn name(&self) -> Option<Name> {
        child(&self.0)
    }

    pub fn keyword_range(&self) -> TextRange {
        token(&self.0, SyntaxKind::CHOICE_KW)
            .map(|t| t.text_range())
            .unwrap_or_else(|| self.0.text_range())
    }

    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.0.children().filter_map(Attribute::cast)
    }

    pub fn entries(&self) -> impl Iterator<Item = Entry> + '_ {
        self.0.children().filter_map(Entry::cast)
    }
}

ast_node!(CommentEntry, COMMENT_ENTRY);

impl CommentEntry {
    pub fn text(&self) -> Option<String> {
        token(&self.0, SyntaxKind::STRING).map(|t| unquote(t.text()))
    }

    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.0.children().filter_map(Attribute::cast)
    }
}

ast_node!(MenuEntry, MENU);

impl MenuEntry {
    pub fn title(&self) -> Option<String> {
        token(&self.0, SyntaxKind::STRING).map(|t| unquote(t.text()))
    }

    pub fn title_range(&self) -> Option<TextRange> {
        token(&self.0, SyntaxKind::STRING).map(|t| t.text_range())
    }

    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.0.children().filter_map(Attribute::cast)
    }

    pub fn entries(&self) -> impl Iterator<Item = Entry> + '_ {
        self.0.children().filter_map(Entry::cast)
    }
}

ast_node!(IfBlock, IF_BLOCK);

impl IfBlock {
    pub fn condition(&self) -> Option<Expr> {
        child(&self.0)
    }

    pub fn entries(&self) -> impl Iterator<Item = Entry> + '_ {
        self.0.children().filter_map(Entry::cast)
    }
}

/// How a `source` directive resolves its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceKind {
    /// Resolve only against the including file's directory.
    pub relative: bool,
    /// A missing file is not an error.
    pub optional: bool,
}

ast_node!(SourceEntry, SOURCE);

impl SourceEntry {
    pub fn source_kind(&self) -> SourceKind {
        let keyword = first_significant_token(&self.0).map(|t| t.kind());
        SourceKind {
            relative: matches!(
                keyword,
                Some(SyntaxKind::RSOURCE_KW | SyntaxKind::ORSOURCE_KW)
            ),
            optional: matches!(
                keyword,
                Some(SyntaxKind::OSOURCE_KW | SyntaxKind::ORSOURCE_KW)
            ),
        }
    }

    pub fn path(&self) -> Option<String> {
        token(&self.0, SyntaxKind::STRING).map(|t| unquote(t.text()))
    }

    pub fn path_range(&self) -> Option<TextRange> {
        token(&self.0, SyntaxKind::STRING).map(|t| t.text_range())
    }
}

ast_node!(MainMenuEntry, MAINMENU);

impl MainMenuEntry {
    pub fn title(&self) -> Option<String> {
        token(&self.0, SyntaxKind::STRING).map(|t| unquote(t.text()))
    }
}

ast_node!(Name, NAME);

impl Name {
    pub fn text(&self) -> String {
        self.0
            .first_token()
            .map(|t| t.text().to_string())
            .unwrap_or_default()
    }

    /// Range of the identifier itself, without surrounding trivia.
    pub fn ident_range(&self) -> TextRange {
        token(&self.0, SyntaxKind::IDENT)
            .map(|t| t.text_range())
            .unwrap_or_else(|| self.0.text_range())
    }
}

// ============================================================================
// Attributes
// ============================================================================

/// One attribute line of an entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Attribute {
    Type(TypeAttr),
    Prompt(PromptAttr),
    Default(DefaultAttr),
    DefType(DefTypeAttr),
    Depends(DependsAttr),
    Select(SelectAttr),
    Imply(SelectAttr),
    Visible(VisibleAttr),
    Range(RangeAttr),
    Help(HelpAttr),
    Option(OptionAttr),
    Optional(OptionalAttr),
}

impl AstNode for Attribute {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::TYPE_ATTR
                | SyntaxKind::PROMPT_ATTR
                | SyntaxKind::DEFAULT_ATTR
                | SyntaxKind::DEF_TYPE_ATTR
                | SyntaxKind::DEPENDS_ATTR
                | SyntaxKind::SELECT_ATTR
                | SyntaxKind::IMPLY_ATTR
                | SyntaxKind::VISIBLE_ATTR
                | SyntaxKind::RANGE_ATTR
                | SyntaxKind::HELP_ATTR
                | SyntaxKind::OPTION_ATTR
                | SyntaxKind::OPTIONAL_ATTR
        )
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::TYPE_ATTR => Some(Self::Type(TypeAttr(node))),
            SyntaxKind::PROMPT_ATTR => Some(Self::Prompt(PromptAttr(node))),
            SyntaxKind::DEFAULT_ATTR => Some(Self::Default(DefaultAttr(node))),
            SyntaxKind::DEF_TYPE_ATTR => Some(Self::DefType(DefTypeAttr(node))),
            SyntaxKind::DEPENDS_ATTR => Some(Self::Depends(DependsAttr(node))),
            SyntaxKind::SELECT_ATTR => Some(Self::Select(SelectAttr(node))),
            SyntaxKind::IMPLY_ATTR => Some(Self::Imply(SelectAttr(node))),
            SyntaxKind::VISIBLE_ATTR => Some(Self::Visible(VisibleAttr(node))),
            SyntaxKind::RANGE_ATTR => Some(Self::Range(RangeAttr(node))),
            SyntaxKind::HELP_ATTR => Some(Self::Help(HelpAttr(node))),
            SyntaxKind::OPTION_ATTR => Some(Self::Option(OptionAttr(node))),
            SyntaxKind::OPTIONAL_ATTR => Some(Self::Optional(OptionalAttr(node))),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Type(n) => n.syntax(),
            Self::Prompt(n) => n.syntax(),
            Self::Default(n) => n.syntax(),
            Self::DefType(n) => n.syntax(),
            Self::Depends(n) => n.syntax(),
            Self::Select(n) | Self::Imply(n) => n.syntax(),
            Self::Visible(n) => n.syntax(),
            Self::Range(n) => n.syntax(),
            Self::Help(n) => n.syntax(),
            Self::Option(n) => n.syntax(),
            Self::Optional(n) => n.syntax(),
        }
    }
}

/// Prompt text carried by `prompt` or a type attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptText {
    pub text: String,
    pub range: TextRange,
}

fn prompt_text(node: &SyntaxNode) -> Option<PromptText> {
    token(node, SyntaxKind::STRING).map(|t| PromptText {
        text: unquote(t.text()),
        range: t.text_range(),
    })
}

// bool "Prompt" if COND
ast_node!(TypeAttr, TYPE_ATTR);

impl TypeAttr {
    /// The type keyword (`BOOL_KW`, `INT_KW`, ...).
    pub fn keyword(&self) -> Option<SyntaxToken> {
        first_significant_token(&self.0).filter(|t| t.kind().is_type_keyword())
    }

    pub fn prompt(&self) -> Option<PromptText> {
        prompt_text(&self.0)
    }

    pub fn condition(&self) -> Option<Condition> {
        child(&self.0)
    }
}

ast_node!(PromptAttr, PROMPT_ATTR);

impl PromptAttr {
    pub fn prompt(&self) -> Option<PromptText> {
        prompt_text(&self.0)
    }

    pub fn condition(&self) -> Option<Condition> {
        child(&self.0)
    }
}

ast_node!(DefaultAttr, DEFAULT_ATTR);

impl DefaultAttr {
    pub fn value(&self) -> Option<Expr> {
        child(&self.0)
    }

    pub fn condition(&self) -> Option<Condition> {
        child(&self.0)
    }
}

// def_bool / def_tristate
ast_node!(DefTypeAttr, DEF_TYPE_ATTR);

impl DefTypeAttr {
    pub fn keyword(&self) -> Option<SyntaxToken> {
        first_significant_token(&self.0)
    }

    pub fn value(&self) -> Option<Expr> {
        child(&self.0)
    }

    pub fn condition(&self) -> Option<Condition> {
        child(&self.0)
    }
}

ast_node!(DependsAttr, DEPENDS_ATTR);

impl DependsAttr {
    pub fn expr(&self) -> Option<Expr> {
        child(&self.0)
    }
}

// select / imply
ast_node!(SelectAttr, SELECT_ATTR | IMPLY_ATTR);

impl SelectAttr {
    pub fn is_imply(&self) -> bool {
        self.0.kind() == SyntaxKind::IMPLY_ATTR
    }

    pub fn target(&self) -> Option<SymbolRef> {
        child(&self.0)
    }

    pub fn condition(&self) -> Option<Condition> {
        child(&self.0)
    }
}

// visible if COND
ast_node!(VisibleAttr, VISIBLE_ATTR);

impl VisibleAttr {
    pub fn condition(&self) -> Option<Condition> {
        child(&self.0)
    }
}

ast_node!(RangeAttr, RANGE_ATTR);

impl RangeAttr {
    /// The lower and upper bound expressions.
    pub fn bounds(&self) -> (Option<Expr>, Option<Expr>) {
        let mut exprs = self.0.children().filter_map(Expr::cast);
        (exprs.next(), exprs.next())
    }

    pub fn condition(&self) -> Option<Condition> {
        child(&self.0)
    }
}

ast_node!(HelpAttr, HELP_ATTR);

impl HelpAttr {
    /// Help text with the common indentation removed.
    pub fn text(&self) -> String {
        let Some(raw) = token(&self.0, SyntaxKind::HELP_TEXT) else {
            return String::new();
        };
        let raw = raw.text();
        let indent = raw
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.len() - l.trim_start().len())
            .min()
            .unwrap_or(0);
        raw.lines()
            .map(|l| l.get(indent..).unwrap_or("").trim_end())
            .collect::<Vec<_>>()
            .join("\n")
            .trim_end()
            .to_string()
    }
}

// option modules / option env="X" / modules / transitional
ast_node!(OptionAttr, OPTION_ATTR);

impl OptionAttr {
    /// The option name: `modules`, `env`, `defconfig_list`, `transitional`, ...
    pub fn key(&self) -> Option<String> {
        let mut tokens = self
            .0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| !t.kind().is_trivia() && t.kind() != SyntaxKind::NEWLINE);
        let first = tokens.next()?;
        if first.kind() == SyntaxKind::OPTION_KW {
            tokens.next().map(|t| t.text().to_string())
        } else {
            Some(first.text().to_string())
        }
    }

    pub fn is_modules(&self) -> bool {
        token(&self.0, SyntaxKind::MODULES_KW).is_some()
    }

    pub fn value(&self) -> Option<String> {
        token(&self.0, SyntaxKind::STRING).map(|t| unquote(t.text()))
    }
}

ast_node!(OptionalAttr, OPTIONAL_ATTR);

ast_node!(Condition, CONDITION);

impl Condition {
    pub fn expr(&self) -> Option<Expr> {
        child(&self.0)
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Or(BinaryExpr),
    And(BinaryExpr),
    Not(NotExpr),
    Compare(CmpExpr),
    Paren(ParenExpr),
    Symbol(SymbolRef),
    Literal(Literal),
}

impl AstNode for Expr {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::OR_EXPR
                | SyntaxKind::AND_EXPR
                | SyntaxKind::NOT_EXPR
                | SyntaxKind::CMP_EXPR
                | SyntaxKind::PAREN_EXPR
                | SyntaxKind::SYMBOL_REF
                | SyntaxKind::LITERAL
        )
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::OR_EXPR => Some(Self::Or(BinaryExpr(node))),
            SyntaxKind::AND_EXPR => Some(Self::And(BinaryExpr(node))),
            SyntaxKind::NOT_EXPR => Some(Self::Not(NotExpr(node))),
            SyntaxKind::CMP_EXPR => Some(Self::Compare(CmpExpr(node))),
            SyntaxKind::PAREN_EXPR => Some(Self::Paren(ParenExpr(node))),
            SyntaxKind::SYMBOL_REF => Some(Self::Symbol(SymbolRef(node))),
            SyntaxKind::LITERAL => Some(Self::Literal(Literal(node))),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Or(n) | Self::And(n) => n.syntax(),
            Self::Not(n) => n.syntax(),
            Self::Compare(n) => n.syntax(),
            Self::Paren(n) => n.syntax(),
            Self::Symbol(n) => n.syntax(),
            Self::Literal(n) => n.syntax(),
        }
    }
}

// A || B, A && B
ast_node!(BinaryExpr, OR_EXPR | AND_EXPR);

impl BinaryExpr {
    pub fn lhs(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    pub fn rhs(&self) -> Option<Expr> {
        self.0.children().filter_map(Expr::cast).nth(1)
    }
}

ast_node!(NotExpr, NOT_EXPR);

impl NotExpr {
    pub fn operand(&self) -> Option<Expr> {
        child(&self.0)
    }
}

ast_node!(CmpExpr, CMP_EXPR);

impl CmpExpr {
    pub fn lhs(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    pub fn rhs(&self) -> Option<Expr> {
        self.0.children().filter_map(Expr::cast).nth(1)
    }

    pub fn op(&self) -> Option<SyntaxKind> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .map(|t| t.kind())
            .find(|k| k.is_comparison())
    }
}

ast_node!(ParenExpr, PAREN_EXPR);

impl ParenExpr {
    pub fn inner(&self) -> Option<Expr> {
        child(&self.0)
    }
}

ast_node!(SymbolRef, SYMBOL_REF);

impl SymbolRef {
    pub fn ident(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::IDENT)
    }

    pub fn name(&self) -> String {
        self.ident()
            .map(|t| t.text().to_string())
            .unwrap_or_default()
    }

    pub fn ident_range(&self) -> TextRange {
        self.ident()
            .map(|t| t.text_range())
            .unwrap_or_else(|| self.0.text_range())
    }
}

ast_node!(Literal, LITERAL);

impl Literal {
    pub fn token(&self) -> Option<SyntaxToken> {
        first_significant_token(&self.0)
    }
}
