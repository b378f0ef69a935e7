//! Kconfig keyword table.
//!
//! Words are lexed by a single pattern and classified here, so identifiers
//! that merely start with a digit (`64BIT`) or look like numbers (`0x10`)
//! never fight with keyword rules inside the lexer.

use super::syntax_kind::SyntaxKind;

/// Keywords that start an entry, with a short description for completion.
pub const ENTRY_KEYWORDS: &[(&str, &str)] = &[
    ("config", "Declare a configuration symbol"),
    ("menuconfig", "Declare a symbol that opens a sub-menu"),
    ("choice", "Begin a group of mutually exclusive symbols"),
    ("endchoice", "End a choice block"),
    ("comment", "Display a comment in the menu"),
    ("menu", "Begin a menu"),
    ("endmenu", "End a menu"),
    ("if", "Begin a conditional block"),
    ("endif", "End a conditional block"),
    ("source", "Include another Kconfig file"),
    ("rsource", "Include a Kconfig file relative to this one"),
    ("osource", "Include a Kconfig file if it exists"),
    ("orsource", "Include a relative Kconfig file if it exists"),
    ("mainmenu", "Set the title of the configuration"),
];

/// Keywords that start an attribute line inside an entry.
pub const ATTRIBUTE_KEYWORDS: &[(&str, &str)] = &[
    ("bool", "Boolean symbol (y/n)"),
    ("tristate", "Tristate symbol (y/m/n)"),
    ("string", "String symbol"),
    ("int", "Decimal integer symbol"),
    ("hex", "Hexadecimal integer symbol"),
    ("prompt", "User-visible prompt"),
    ("default", "Default value"),
    ("def_bool", "Boolean type with a default value"),
    ("def_tristate", "Tristate type with a default value"),
    ("depends on", "Dependency expression"),
    ("select", "Force another symbol on (reverse dependency)"),
    ("imply", "Weakly enable another symbol"),
    ("visible if", "Menu visibility condition"),
    ("range", "Allowed numeric range"),
    ("help", "Help text"),
    ("option", "Special option"),
    ("optional", "Allow a choice with no selection"),
    ("modules", "Mark the modules symbol"),
    ("transitional", "Transitional symbol"),
];

/// Classify a lexed word as a keyword, number, or identifier.
pub fn classify_word(text: &str) -> SyntaxKind {
    if let Some(kind) = keyword_kind(text) {
        return kind;
    }
    let bytes = text.as_bytes();
    if bytes.len() > 2
        && bytes[0] == b'0'
        && (bytes[1] == b'x' || bytes[1] == b'X')
        && bytes[2..].iter().all(u8::is_ascii_hexdigit)
    {
        return SyntaxKind::HEX_NUMBER;
    }
    if bytes.iter().all(u8::is_ascii_digit) {
        return SyntaxKind::INT_NUMBER;
    }
    SyntaxKind::IDENT
}

/// Look up the keyword kind for a word.
pub fn keyword_kind(text: &str) -> Option<SyntaxKind> {
    use SyntaxKind::*;
    Some(match text {
        "config" => CONFIG_KW,
        "menuconfig" => MENUCONFIG_KW,
        "choice" => CHOICE_KW,
        "endchoice" => ENDCHOICE_KW,
        "comment" => COMMENT_KW,
        "menu" => MENU_KW,
        "endmenu" => ENDMENU_KW,
        "if" => IF_KW,
        "endif" => ENDIF_KW,
        "source" => SOURCE_KW,
        "rsource" => RSOURCE_KW,
        "osource" => OSOURCE_KW,
        "orsource" => ORSOURCE_KW,
        "mainmenu" => MAINMENU_KW,
        "bool" | "boolean" => BOOL_KW,
        "tristate" => TRISTATE_KW,
        "string" => STRING_KW,
        "int" => INT_KW,
        "hex" => HEX_KW,
        "prompt" => PROMPT_KW,
        "default" => DEFAULT_KW,
        "def_bool" => DEF_BOOL_KW,
        "def_tristate" => DEF_TRISTATE_KW,
        "depends" => DEPENDS_KW,
        "on" => ON_KW,
        "select" => SELECT_KW,
        "imply" => IMPLY_KW,
        "visible" => VISIBLE_KW,
        "range" => RANGE_KW,
        "help" => HELP_KW,
        "option" => OPTION_KW,
        "modules" => MODULES_KW,
        "optional" => OPTIONAL_KW,
        "transitional" => TRANSITIONAL_KW,
        _ => return None,
    })
}

/// The source text of a keyword kind, for error messages.
pub fn keyword_text(kind: SyntaxKind) -> Option<&'static str> {
    use SyntaxKind::*;
    Some(match kind {
        ENDMENU_KW => "endmenu",
        ENDCHOICE_KW => "endchoice",
        ENDIF_KW => "endif",
        MENU_KW => "menu",
        CHOICE_KW => "choice",
        IF_KW => "if",
        _ => return None,
    })
}
