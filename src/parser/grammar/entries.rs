//! Entry and attribute grammar
//!
//! ```text
//! SourceFile = Entry*
//! Entry      = Config | MenuConfig | Choice | Comment | Menu | If | Source | MainMenu
//! Config     = 'config' NAME NEWLINE Attribute*
//! Choice     = 'choice' NAME? NEWLINE Attribute* Entry* 'endchoice'
//! Menu       = 'menu' STRING NEWLINE Attribute* Entry* 'endmenu'
//! If         = 'if' Expr NEWLINE Entry* 'endif'
//! ```
//!
//! Every statement owns its terminating NEWLINE. Blank lines between
//! attributes stay inside the entry; blank lines between entries belong to
//! the enclosing block.

use super::expressions::{expression, opt_condition, primary};
use crate::parser::keywords::keyword_text;
use crate::parser::parser::{Parser, SyntaxError};
use crate::parser::syntax_kind::SyntaxKind;

/// Which entry an attribute list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryContext {
    Config,
    Choice,
    Menu,
    Comment,
}

impl EntryContext {
    fn describe(self) -> &'static str {
        match self {
            EntryContext::Config => "a config entry",
            EntryContext::Choice => "a choice",
            EntryContext::Menu => "a menu",
            EntryContext::Comment => "a comment",
        }
    }

    fn allows(self, kind: SyntaxKind) -> bool {
        use SyntaxKind::*;
        match self {
            EntryContext::Config => !matches!(kind, VISIBLE_KW | OPTIONAL_KW),
            EntryContext::Choice => {
                kind.is_type_keyword()
                    || matches!(kind, PROMPT_KW | DEFAULT_KW | DEPENDS_KW | OPTIONAL_KW | HELP_KW)
            }
            EntryContext::Menu => matches!(kind, DEPENDS_KW | VISIBLE_KW),
            EntryContext::Comment => matches!(kind, DEPENDS_KW),
        }
    }
}

/// How an entry list ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListEnd {
    /// At the closer of the current block.
    Closer,
    /// At a closer that belongs to an enclosing block.
    Outer,
    Eof,
}

/// SourceFile = Entry*
pub(crate) fn source_file(p: &mut Parser) {
    p.start_root();
    entry_list(p, None);
    p.eat_trivia();
    p.finish_node();
}

fn entry_list(p: &mut Parser, closer: Option<SyntaxKind>) -> ListEnd {
    loop {
        match p.current_kind() {
            SyntaxKind::EOF => return ListEnd::Eof,
            SyntaxKind::NEWLINE => p.bump(),
            kind if kind.is_block_end() => {
                if closer == Some(kind) {
                    return ListEnd::Closer;
                }
                if p.expects_closer(kind) {
                    return ListEnd::Outer;
                }
                stray_closer(p, kind);
            }
            kind if kind.is_entry_start() => entry(p),
            SyntaxKind::HELP_TEXT => {
                p.error("help text outside of an entry");
                p.start_node(SyntaxKind::ERROR);
                p.bump();
                p.finish_node();
            }
            kind if kind.is_attribute_start() => {
                let text = p.current_text().to_string();
                p.recover_line(format!("`{text}` must follow an entry"));
            }
            _ => p.recover_line("expected an entry"),
        }
    }
}

fn stray_closer(p: &mut Parser, kind: SyntaxKind) {
    let closer = keyword_text(kind).unwrap_or("closer");
    let opener = match kind {
        SyntaxKind::ENDMENU_KW => "menu",
        SyntaxKind::ENDCHOICE_KW => "choice",
        _ => "if",
    };
    p.push_error(SyntaxError::unbalanced(
        format!("`{closer}` without matching `{opener}`"),
        p.current_range(),
    ));
    p.start_node(SyntaxKind::ERROR);
    p.bump();
    while !p.at_eof() && !p.at(SyntaxKind::NEWLINE) {
        p.bump();
    }
    p.finish_node();
}

fn entry(p: &mut Parser) {
    match p.current_kind() {
        SyntaxKind::CONFIG_KW => config(p, SyntaxKind::CONFIG),
        SyntaxKind::MENUCONFIG_KW => config(p, SyntaxKind::MENUCONFIG),
        SyntaxKind::CHOICE_KW => choice(p),
        SyntaxKind::COMMENT_KW => comment(p),
        SyntaxKind::MENU_KW => menu(p),
        SyntaxKind::IF_KW => if_block(p),
        SyntaxKind::MAINMENU_KW => mainmenu(p),
        _ => source(p),
    }
}

/// Config = ('config' | 'menuconfig') NAME NEWLINE Attribute*
fn config(p: &mut Parser, kind: SyntaxKind) {
    p.start_node(kind);
    p.bump();
    name(p, true);
    end_of_line(p);
    attributes(p, EntryContext::Config);
    p.finish_node();
}

/// Choice = 'choice' NAME? NEWLINE Attribute* Entry* 'endchoice'
fn choice(p: &mut Parser) {
    let opener = p.current_range();
    p.start_node(SyntaxKind::CHOICE);
    p.bump();
    name(p, false);
    end_of_line(p);
    attributes(p, EntryContext::Choice);
    block_body(p, SyntaxKind::ENDCHOICE_KW, "choice", opener);
    p.finish_node();
}

/// Comment = 'comment' STRING NEWLINE Attribute*
fn comment(p: &mut Parser) {
    p.start_node(SyntaxKind::COMMENT_ENTRY);
    p.bump();
    p.expect(SyntaxKind::STRING, "a comment text");
    end_of_line(p);
    attributes(p, EntryContext::Comment);
    p.finish_node();
}

/// Menu = 'menu' STRING NEWLINE Attribute* Entry* 'endmenu'
fn menu(p: &mut Parser) {
    let opener = p.current_range();
    p.start_node(SyntaxKind::MENU);
    p.bump();
    p.expect(SyntaxKind::STRING, "a menu title");
    end_of_line(p);
    attributes(p, EntryContext::Menu);
    block_body(p, SyntaxKind::ENDMENU_KW, "menu", opener);
    p.finish_node();
}

/// If = 'if' Expr NEWLINE Entry* 'endif'
fn if_block(p: &mut Parser) {
    let opener = p.current_range();
    p.start_node(SyntaxKind::IF_BLOCK);
    p.bump();
    expression(p);
    end_of_line(p);
    block_body(p, SyntaxKind::ENDIF_KW, "if", opener);
    p.finish_node();
}

/// Source = ('source' | 'rsource' | 'osource' | 'orsource') STRING
fn source(p: &mut Parser) {
    p.start_node(SyntaxKind::SOURCE);
    p.bump();
    p.expect(SyntaxKind::STRING, "a file path");
    end_of_line(p);
    p.finish_node();
}

/// MainMenu = 'mainmenu' STRING
fn mainmenu(p: &mut Parser) {
    p.start_node(SyntaxKind::MAINMENU);
    p.bump();
    p.expect(SyntaxKind::STRING, "a title");
    end_of_line(p);
    p.finish_node();
}

fn name(p: &mut Parser, required: bool) {
    if p.at(SyntaxKind::IDENT) {
        p.start_node(SyntaxKind::NAME);
        p.bump();
        p.finish_node();
    } else if required {
        p.error("expected a symbol name");
    }
}

/// Entries of a block followed by its closer.
fn block_body(
    p: &mut Parser,
    closer: SyntaxKind,
    opener_text: &str,
    opener: rowan::TextRange,
) {
    let closer_text = keyword_text(closer).unwrap_or("end");
    p.open_block(closer);
    let end = entry_list(p, Some(closer));
    p.close_block();

    match end {
        ListEnd::Closer => {
            p.bump();
            end_of_line(p);
        }
        ListEnd::Outer => {
            let found = p.current_text().to_string();
            p.push_error(SyntaxError::unbalanced(
                format!("`{opener_text}` is not closed by `{closer_text}`"),
                opener,
            ));
            p.push_error(SyntaxError::unbalanced(
                format!("expected `{closer_text}` before `{found}`"),
                p.current_range(),
            ));
        }
        ListEnd::Eof => {
            p.push_error(SyntaxError::unbalanced(
                format!("`{opener_text}` is not closed by `{closer_text}`"),
                opener,
            ));
            p.push_error(SyntaxError::unbalanced(
                format!("unexpected end of file, expected `{closer_text}`"),
                p.current_range(),
            ));
        }
    }
}

/// Consume the rest of a statement, reporting trailing garbage.
fn end_of_line(p: &mut Parser) {
    if !p.at(SyntaxKind::NEWLINE) && !p.at_eof() {
        p.recover_line("expected end of line");
    }
    p.eat(SyntaxKind::NEWLINE);
}

fn attributes(p: &mut Parser, context: EntryContext) {
    loop {
        if p.at(SyntaxKind::NEWLINE) {
            if p.next_statement_kind().is_attribute_start() {
                p.bump();
                continue;
            }
            break;
        }
        let kind = p.current_kind();
        if !kind.is_attribute_start() {
            break;
        }
        if !context.allows(kind) {
            let text = p.current_text().to_string();
            p.error(format!("`{text}` is not allowed in {}", context.describe()));
        }
        attribute(p);
    }
}

fn attribute(p: &mut Parser) {
    use SyntaxKind::*;
    match p.current_kind() {
        kind if kind.is_type_keyword() => {
            p.start_node(TYPE_ATTR);
            p.bump();
            if p.at(STRING) {
                p.bump();
                opt_condition(p);
            }
        }
        PROMPT_KW => {
            p.start_node(PROMPT_ATTR);
            p.bump();
            p.expect(STRING, "a prompt string");
            opt_condition(p);
        }
        DEFAULT_KW => {
            p.start_node(DEFAULT_ATTR);
            p.bump();
            expression(p);
            opt_condition(p);
        }
        DEF_BOOL_KW | DEF_TRISTATE_KW => {
            p.start_node(DEF_TYPE_ATTR);
            p.bump();
            expression(p);
            opt_condition(p);
        }
        DEPENDS_KW => {
            p.start_node(DEPENDS_ATTR);
            p.bump();
            p.expect(ON_KW, "`on`");
            expression(p);
        }
        SELECT_KW | IMPLY_KW => {
            let node = if p.at(SELECT_KW) { SELECT_ATTR } else { IMPLY_ATTR };
            p.start_node(node);
            p.bump();
            if p.at(IDENT) {
                primary(p);
            } else {
                p.error("expected a symbol name");
            }
            opt_condition(p);
        }
        VISIBLE_KW => {
            p.start_node(VISIBLE_ATTR);
            p.bump();
            if p.at(IF_KW) {
                opt_condition(p);
            } else {
                p.error("expected `if`");
            }
        }
        RANGE_KW => {
            p.start_node(RANGE_ATTR);
            p.bump();
            primary(p);
            primary(p);
            opt_condition(p);
        }
        HELP_KW => {
            p.start_node(HELP_ATTR);
            p.bump();
            end_of_line(p);
            p.eat(HELP_TEXT);
            p.finish_node();
            return;
        }
        OPTION_KW => {
            p.start_node(OPTION_ATTR);
            p.bump();
            if p.at(MODULES_KW) || p.at(IDENT) {
                p.bump();
                if p.eat(EQ) {
                    p.expect(STRING, "an option value");
                }
            } else {
                p.error("expected an option name");
            }
        }
        MODULES_KW | TRANSITIONAL_KW => {
            p.start_node(OPTION_ATTR);
            p.bump();
        }
        _ => {
            p.start_node(OPTIONAL_ATTR);
            p.bump();
        }
    }
    end_of_line(p);
    p.finish_node();
}
