//! Syntax kinds for the Rowan-based CST
//!
//! This enum defines all possible node and token kinds in the syntax tree.
//! It follows the Kconfig language grammar structure.

/// All syntax kinds (tokens and nodes) in Kconfig
///
/// Tokens are leaf nodes (identifiers, keywords, operators).
/// Nodes are composite (entries, attributes, expressions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments - preserved but not semantically meaningful)
    // =========================================================================
    WHITESPACE = 0,
    LINE_CONTINUATION, // `\` followed by a newline
    COMMENT,           // # ...

    // Statement separator
    NEWLINE,

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,      // FOO, 64BIT, y
    INT_NUMBER, // 42, -1
    HEX_NUMBER, // 0x1000
    STRING,     // "hello" or 'hello'
    MACRO,      // $(VAR)
    HELP_TEXT,  // indented block following `help`

    // =========================================================================
    // OPERATORS
    // =========================================================================
    EQ,        // =
    BANG_EQ,   // !=
    LT,        // <
    LT_EQ,     // <=
    GT,        // >
    GT_EQ,     // >=
    BANG,      // !
    AMP_AMP,   // &&
    PIPE_PIPE, // ||
    L_PAREN,   // (
    R_PAREN,   // )

    // =========================================================================
    // KEYWORDS - entries
    // =========================================================================
    CONFIG_KW,
    MENUCONFIG_KW,
    CHOICE_KW,
    ENDCHOICE_KW,
    COMMENT_KW,
    MENU_KW,
    ENDMENU_KW,
    IF_KW,
    ENDIF_KW,
    SOURCE_KW,
    RSOURCE_KW,
    OSOURCE_KW,
    ORSOURCE_KW,
    MAINMENU_KW,

    // =========================================================================
    // KEYWORDS - types
    // =========================================================================
    BOOL_KW,
    TRISTATE_KW,
    STRING_KW,
    INT_KW,
    HEX_KW,

    // =========================================================================
    // KEYWORDS - attributes
    // =========================================================================
    PROMPT_KW,
    DEFAULT_KW,
    DEF_BOOL_KW,
    DEF_TRISTATE_KW,
    DEPENDS_KW,
    ON_KW,
    SELECT_KW,
    IMPLY_KW,
    VISIBLE_KW,
    RANGE_KW,
    HELP_KW,
    OPTION_KW,
    MODULES_KW,
    OPTIONAL_KW,
    TRANSITIONAL_KW,

    // =========================================================================
    // SPECIAL
    // =========================================================================
    ERROR,
    /// Never stored in a tree; returned by the parser when input is exhausted.
    EOF,

    // =========================================================================
    // NODES - entries
    // =========================================================================
    SOURCE_FILE,
    CONFIG,
    MENUCONFIG,
    CHOICE,
    COMMENT_ENTRY,
    MENU,
    IF_BLOCK,
    SOURCE,
    MAINMENU,

    // =========================================================================
    // NODES - attributes
    // =========================================================================
    NAME,
    TYPE_ATTR,
    PROMPT_ATTR,
    DEFAULT_ATTR,
    DEF_TYPE_ATTR,
    DEPENDS_ATTR,
    SELECT_ATTR,
    IMPLY_ATTR,
    VISIBLE_ATTR,
    RANGE_ATTR,
    HELP_ATTR,
    OPTION_ATTR,
    OPTIONAL_ATTR,
    CONDITION,

    // =========================================================================
    // NODES - expressions
    // =========================================================================
    OR_EXPR,
    AND_EXPR,
    NOT_EXPR,
    CMP_EXPR,
    PAREN_EXPR,
    SYMBOL_REF,
    LITERAL,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::WHITESPACE | Self::LINE_CONTINUATION | Self::COMMENT
        )
    }

    /// Check if this is a keyword
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::CONFIG_KW as u16) && (self as u16) <= (Self::TRANSITIONAL_KW as u16)
    }

    /// Check if this is one of the value type keywords (`bool`, `int`, ...)
    pub fn is_type_keyword(self) -> bool {
        matches!(
            self,
            Self::BOOL_KW | Self::TRISTATE_KW | Self::STRING_KW | Self::INT_KW | Self::HEX_KW
        )
    }

    /// Check if this keyword starts a block-closing statement
    pub fn is_block_end(self) -> bool {
        matches!(self, Self::ENDMENU_KW | Self::ENDCHOICE_KW | Self::ENDIF_KW)
    }

    /// Check if this keyword starts an entry
    pub fn is_entry_start(self) -> bool {
        matches!(
            self,
            Self::CONFIG_KW
                | Self::MENUCONFIG_KW
                | Self::CHOICE_KW
                | Self::COMMENT_KW
                | Self::MENU_KW
                | Self::IF_KW
                | Self::SOURCE_KW
                | Self::RSOURCE_KW
                | Self::OSOURCE_KW
                | Self::ORSOURCE_KW
                | Self::MAINMENU_KW
        )
    }

    /// Check if this keyword starts an attribute line
    pub fn is_attribute_start(self) -> bool {
        self.is_type_keyword()
            || matches!(
                self,
                Self::PROMPT_KW
                    | Self::DEFAULT_KW
                    | Self::DEF_BOOL_KW
                    | Self::DEF_TRISTATE_KW
                    | Self::DEPENDS_KW
                    | Self::SELECT_KW
                    | Self::IMPLY_KW
                    | Self::VISIBLE_KW
                    | Self::RANGE_KW
                    | Self::HELP_KW
                    | Self::OPTION_KW
                    | Self::MODULES_KW
                    | Self::OPTIONAL_KW
                    | Self::TRANSITIONAL_KW
            )
    }

    /// Check if this is a comparison operator
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::EQ | Self::BANG_EQ | Self::LT | Self::LT_EQ | Self::GT | Self::GT_EQ
        )
    }

    /// Check if this is a literal
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::IDENT | Self::INT_NUMBER | Self::HEX_NUMBER | Self::STRING | Self::MACRO
        )
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KconfigLanguage {}

impl rowan::Language for KconfigLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<KconfigLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<KconfigLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<KconfigLanguage>;
