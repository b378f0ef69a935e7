//! Lowering: CST of every reachable file → symbol table + menu tree.
//!
//! Lowering is also the include resolver. `source` directives are followed
//! through a [`SourceDb`], with an explicit include stack for cycle
//! detection. Each enclosing `if`, `menu` and `choice` adds its condition
//! to the dependencies of the entries inside it.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use smol_str::SmolStr;
use tracing::{debug, warn};

use super::db::ParseResult;
use super::diagnostics::{Diagnostic, codes};
use super::expr::Expr;
use super::menu::{MenuId, MenuKind, MenuNode, MenuTree};
use super::symbols::{
    Choice, ChoiceDefault, ChoiceId, Definition, Prompt, RangeClause, ReverseKind, SymbolTable,
};
use super::types::SymbolType;
use crate::base::{FileId, FileRange, TextRange};
use crate::parser::{
    self, AstNode, Attribute, ChoiceEntry, CommentEntry, ConfigEntry, Entry, IfBlock, MenuEntry,
    SourceEntry, SourceKind, SymbolRef, SyntaxKind, SyntaxNode,
};
use crate::project::ExpandedPath;

/// Where lowering gets files from.
pub trait SourceDb {
    /// The parse of a file, or `None` if it cannot be read.
    fn parsed(&mut self, file: FileId) -> Option<ParseResult>;

    /// Expand `$(VAR)` references in a `source` argument.
    fn expand(&self, raw: &str) -> ExpandedPath;

    /// Find the file a `source` directive in `from` names.
    fn resolve_source(&mut self, from: FileId, path: &str, kind: SourceKind) -> Option<FileId>;

    /// Path of a file as shown in messages.
    fn display_path(&self, file: FileId) -> String;
}

/// Result of lowering a set of root files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweredProject {
    pub symbols: SymbolTable,
    pub menu: MenuTree,
    /// Syntax and lowering diagnostics.
    pub diagnostics: Vec<Diagnostic>,
    /// Every file reached from the roots, in the order first reached.
    pub files: IndexMap<FileId, ParseResult, FxBuildHasher>,
}

impl LoweredProject {
    pub fn contains_file(&self, file: FileId) -> bool {
        self.files.contains_key(&file)
    }
}

/// Lower every root in order. A root already reached through an earlier
/// root is not lowered twice.
pub fn lower<S: SourceDb + ?Sized>(db: &mut S, roots: &[FileId]) -> LoweredProject {
    let root_file = roots.first().copied().unwrap_or(FileId::new(0));
    let mut lowerer = Lowerer {
        db,
        symbols: SymbolTable::new(),
        menu: MenuTree::new(root_file),
        diagnostics: Vec::new(),
        files: IndexMap::default(),
        include_stack: Vec::new(),
    };

    for &root in roots {
        if lowerer.files.contains_key(&root) {
            continue;
        }
        lowerer.lower_file(root, &Scope::root());
    }

    let Lowerer {
        mut symbols,
        menu,
        mut diagnostics,
        files,
        ..
    } = lowerer;
    symbols.finish();
    diagnostics.extend(symbols.diagnostics().iter().cloned());
    debug!(
        files = files.len(),
        symbols = symbols.len(),
        menu_nodes = menu.len(),
        diagnostics = diagnostics.len(),
        "lowered project"
    );

    LoweredProject {
        symbols,
        menu,
        diagnostics,
        files,
    }
}

/// What an entry inherits from the blocks around it.
#[derive(Debug, Clone)]
struct Scope {
    parent: MenuId,
    dependency: Expr,
    visibility: Expr,
    choice: Option<ChoiceId>,
}

impl Scope {
    fn root() -> Self {
        Self {
            parent: MenuId::ROOT,
            dependency: Expr::yes(),
            visibility: Expr::yes(),
            choice: None,
        }
    }
}

struct Lowerer<'a, S: SourceDb + ?Sized> {
    db: &'a mut S,
    symbols: SymbolTable,
    menu: MenuTree,
    diagnostics: Vec<Diagnostic>,
    files: IndexMap<FileId, ParseResult, FxBuildHasher>,
    include_stack: Vec<FileId>,
}

impl<S: SourceDb + ?Sized> Lowerer<'_, S> {
    fn lower_file(&mut self, file: FileId, scope: &Scope) -> bool {
        let Some(parse) = self.db.parsed(file) else {
            return false;
        };
        if !self.files.contains_key(&file) {
            self.diagnostics.extend(
                parse
                    .parse
                    .errors
                    .iter()
                    .map(|e| Diagnostic::from_syntax_error(file, e)),
            );
            self.files.insert(file, parse.clone());
        }

        self.include_stack.push(file);
        for entry in parse.source_file().entries() {
            self.lower_entry(file, &entry, scope);
        }
        self.include_stack.pop();
        true
    }

    fn lower_entries(&mut self, file: FileId, entries: impl Iterator<Item = Entry>, scope: &Scope) {
        for entry in entries {
            self.lower_entry(file, &entry, scope);
        }
    }

    fn lower_entry(&mut self, file: FileId, entry: &Entry, scope: &Scope) {
        match entry {
            Entry::Config(config) => self.lower_config(file, config, scope),
            Entry::Choice(choice) => self.lower_choice(file, choice, scope),
            Entry::Comment(comment) => self.lower_comment(file, comment, scope),
            Entry::Menu(menu) => self.lower_menu(file, menu, scope),
            Entry::If(block) => self.lower_if(file, block, scope),
            Entry::Source(source) => self.lower_source(file, source, scope),
            Entry::MainMenu(mainmenu) => {
                if let Some(title) = mainmenu.title() {
                    self.menu.set_title(title.clone());
                    let range = trimmed_range(mainmenu.syntax());
                    self.push_node(
                        scope,
                        MenuKind::MainMenu,
                        None,
                        file,
                        range,
                        range,
                        Some(title),
                    );
                }
            }
        }
    }

    fn lower_config(&mut self, file: FileId, config: &ConfigEntry, scope: &Scope) {
        let Some(name_node) = config.name() else {
            return;
        };
        let name = name_node.text();
        let kind = if config.is_menuconfig() {
            MenuKind::MenuConfig
        } else {
            MenuKind::Config
        };

        let attributes: Vec<Attribute> = config.attributes().collect();
        let depends = own_dependency(&attributes);
        let dependency = scope.dependency.clone().and(depends.clone());
        let location = FileRange::new(file, name_node.ident_range());

        let menu = self.push_node(
            scope,
            kind,
            Some(SmolStr::new(&name)),
            file,
            trimmed_range(config.syntax()),
            name_node.ident_range(),
            None,
        );
        self.menu.node_mut(menu).dependency = dependency.clone();

        let definition = self.symbols.add_definition(
            &name,
            Definition {
                menu,
                location,
                prompt: None,
                depends,
                dependency,
                visibility: scope.visibility.clone(),
            },
        );
        if let Some(choice) = scope.choice {
            self.symbols.add_choice_member(choice, &name);
        }

        for attribute in &attributes {
            self.register_references(file, attribute.syntax());
            let attr_range = FileRange::new(file, trimmed_range(attribute.syntax()));
            match attribute {
                Attribute::Type(attr) => {
                    if let Some(ty) = attr.keyword().and_then(|k| symbol_type(k.kind())) {
                        let at = attr.keyword().map(|k| k.text_range()).unwrap_or(attr_range.range);
                        self.symbols.declare(&name, ty, FileRange::new(file, at));
                    }
                    if let Some(prompt) = attr.prompt() {
                        let prompt = make_prompt(file, prompt, attr.condition());
                        self.set_prompt(&name, definition, menu, prompt);
                    }
                }
                Attribute::Prompt(attr) => {
                    if let Some(prompt) = attr.prompt() {
                        let prompt = make_prompt(file, prompt, attr.condition());
                        self.set_prompt(&name, definition, menu, prompt);
                    }
                }
                Attribute::Default(attr) => {
                    let value = lower_opt(attr.value());
                    let cond = condition(attr.condition());
                    self.symbols.add_default(&name, value, cond, definition, attr_range);
                }
                Attribute::DefType(attr) => {
                    let ty = match attr.keyword().map(|k| k.kind()) {
                        Some(SyntaxKind::DEF_TRISTATE_KW) => SymbolType::Tristate,
                        _ => SymbolType::Bool,
                    };
                    let at = attr.keyword().map(|k| k.text_range()).unwrap_or(attr_range.range);
                    self.symbols.declare(&name, ty, FileRange::new(file, at));
                    let value = lower_opt(attr.value());
                    let cond = condition(attr.condition());
                    self.symbols.add_default(&name, value, cond, definition, attr_range);
                }
                Attribute::Select(attr) | Attribute::Imply(attr) => {
                    let Some(target) = attr.target() else {
                        continue;
                    };
                    let kind = if attr.is_imply() {
                        ReverseKind::Imply
                    } else {
                        ReverseKind::Select
                    };
                    self.symbols.add_reverse_dependency(
                        &target.name(),
                        &name,
                        condition(attr.condition()),
                        kind,
                        FileRange::new(file, target.ident_range()),
                    );
                }
                Attribute::Range(attr) => {
                    let (low, high) = attr.bounds();
                    self.symbols.add_range(
                        &name,
                        RangeClause {
                            low: lower_opt(low),
                            high: lower_opt(high),
                            cond: condition(attr.condition()),
                            location: attr_range,
                        },
                    );
                }
                Attribute::Help(attr) => self.symbols.set_help(&name, attr.text()),
                Attribute::Option(attr) => {
                    if attr.is_modules() {
                        self.symbols.mark_modules(&name);
                    }
                }
                Attribute::Depends(_) | Attribute::Visible(_) | Attribute::Optional(_) => {}
            }
        }
    }

    fn lower_choice(&mut self, file: FileId, entry: &ChoiceEntry, scope: &Scope) {
        let attributes: Vec<Attribute> = entry.attributes().collect();
        let dependency = scope.dependency.clone().and(own_dependency(&attributes));
        let name = entry.name().map(|n| SmolStr::new(n.text()));
        let name_range = entry
            .name()
            .map(|n| n.ident_range())
            .unwrap_or_else(|| entry.keyword_range());

        let existing = name.as_deref().and_then(|n| self.symbols.find_choice(n));
        let id = existing.unwrap_or_else(|| {
            self.symbols.add_choice(Choice {
                name: name.clone(),
                ty: None,
                prompt: None,
                optional: false,
                defaults: Vec::new(),
                members: Vec::new(),
                menu: MenuId::ROOT,
                dependency: dependency.clone(),
                location: FileRange::new(file, name_range),
                help: None,
            })
        });

        let menu = self.push_node(
            scope,
            MenuKind::Choice(id),
            None,
            file,
            trimmed_range(entry.syntax()),
            name_range,
            None,
        );
        self.menu.node_mut(menu).dependency = dependency.clone();
        if existing.is_none() {
            self.symbols.choice_mut(id).menu = menu;
        }

        for attribute in &attributes {
            self.register_references(file, attribute.syntax());
            match attribute {
                Attribute::Type(attr) => {
                    let ty = attr.keyword().and_then(|k| symbol_type(k.kind()));
                    let choice = self.symbols.choice_mut(id);
                    if choice.ty.is_none() {
                        choice.ty = ty;
                    }
                    if let Some(prompt) = attr.prompt() {
                        let prompt = make_prompt(file, prompt, attr.condition());
                        self.set_choice_prompt(id, menu, prompt);
                    }
                }
                Attribute::Prompt(attr) => {
                    if let Some(prompt) = attr.prompt() {
                        let prompt = make_prompt(file, prompt, attr.condition());
                        self.set_choice_prompt(id, menu, prompt);
                    }
                }
                Attribute::Default(attr) => {
                    if let Some(Expr::Symbol(target)) = attr.value().map(|v| Expr::lower(&v)) {
                        let cond = condition(attr.condition());
                        self.symbols
                            .choice_mut(id)
                            .defaults
                            .push(ChoiceDefault { target, cond });
                    } else {
                        self.diagnostics.push(Diagnostic::error(
                            FileRange::new(file, trimmed_range(attr.syntax())),
                            codes::INVALID_VALUE,
                            "a choice default must name a member symbol",
                        ));
                    }
                }
                Attribute::Optional(_) => self.symbols.choice_mut(id).optional = true,
                Attribute::Help(attr) => {
                    self.symbols.choice_mut(id).help.get_or_insert(attr.text());
                }
                _ => {}
            }
        }

        let inner = Scope {
            parent: menu,
            dependency,
            visibility: scope.visibility.clone(),
            choice: Some(id),
        };
        self.lower_entries(file, entry.entries(), &inner);
    }

    fn lower_comment(&mut self, file: FileId, entry: &CommentEntry, scope: &Scope) {
        let attributes: Vec<Attribute> = entry.attributes().collect();
        for attribute in &attributes {
            self.register_references(file, attribute.syntax());
        }
        let range = trimmed_range(entry.syntax());
        let menu = self.push_node(scope, MenuKind::Comment, None, file, range, range, entry.text());
        self.menu.node_mut(menu).dependency =
            scope.dependency.clone().and(own_dependency(&attributes));
    }

    fn lower_menu(&mut self, file: FileId, entry: &MenuEntry, scope: &Scope) {
        let attributes: Vec<Attribute> = entry.attributes().collect();
        let mut visible_if = Expr::yes();
        for attribute in &attributes {
            self.register_references(file, attribute.syntax());
            if let Attribute::Visible(attr) = attribute {
                visible_if = visible_if.and(condition(attr.condition()));
            }
        }
        let dependency = scope.dependency.clone().and(own_dependency(&attributes));
        let visibility = scope.visibility.clone().and(visible_if.clone());

        let range = trimmed_range(entry.syntax());
        let menu = self.push_node(
            scope,
            MenuKind::Menu,
            None,
            file,
            range,
            entry.title_range().unwrap_or(range),
            entry.title(),
        );
        let node = self.menu.node_mut(menu);
        node.dependency = dependency.clone();
        node.visible_if = visible_if;

        let inner = Scope {
            parent: menu,
            dependency,
            visibility,
            choice: None,
        };
        self.lower_entries(file, entry.entries(), &inner);
    }

    fn lower_if(&mut self, file: FileId, block: &IfBlock, scope: &Scope) {
        if let Some(cond) = block.condition() {
            self.register_references(file, cond.syntax());
        }
        let dependency = scope.dependency.clone().and(lower_opt(block.condition()));
        let range = trimmed_range(block.syntax());
        let menu = self.push_node(scope, MenuKind::If, None, file, range, range, None);
        self.menu.node_mut(menu).dependency = dependency.clone();

        let inner = Scope {
            parent: menu,
            dependency,
            ..scope.clone()
        };
        self.lower_entries(file, block.entries(), &inner);
    }

    fn lower_source(&mut self, file: FileId, entry: &SourceEntry, scope: &Scope) {
        let Some(raw) = entry.path() else {
            return;
        };
        let at = FileRange::new(
            file,
            entry
                .path_range()
                .unwrap_or_else(|| trimmed_range(entry.syntax())),
        );
        let kind = entry.source_kind();
        let expanded = self.db.expand(&raw);
        for var in &expanded.undefined {
            self.diagnostics.push(Diagnostic::warning(
                at,
                codes::UNDEFINED_VARIABLE,
                format!("undefined variable `{var}` in `{raw}`"),
            ));
        }

        let Some(target) = self.db.resolve_source(file, &expanded.path, kind) else {
            if !kind.optional {
                warn!(path = %expanded.path, "included file not found");
                self.diagnostics.push(Diagnostic::error(
                    at,
                    codes::MISSING_INCLUDE,
                    format!("cannot find included file `{}`", expanded.path),
                ));
            }
            return;
        };

        if let Some(start) = self.include_stack.iter().position(|&f| f == target) {
            let chain: Vec<String> = self.include_stack[start..]
                .iter()
                .chain(std::iter::once(&target))
                .map(|&f| self.db.display_path(f))
                .collect();
            self.diagnostics.push(Diagnostic::error(
                at,
                codes::INCLUDE_CYCLE,
                format!("include cycle: {}", chain.join(" -> ")),
            ));
            return;
        }

        if !self.lower_file(target, scope) && !kind.optional {
            self.diagnostics.push(Diagnostic::error(
                at,
                codes::MISSING_INCLUDE,
                format!("cannot read included file `{}`", expanded.path),
            ));
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn push_node(
        &mut self,
        scope: &Scope,
        kind: MenuKind,
        symbol: Option<SmolStr>,
        file: FileId,
        range: TextRange,
        name_range: TextRange,
        prompt: Option<String>,
    ) -> MenuId {
        self.menu.push(MenuNode {
            parent: Some(scope.parent),
            children: Vec::new(),
            kind,
            symbol,
            file,
            range,
            name_range,
            prompt,
            prompt_cond: Expr::yes(),
            dependency: scope.dependency.clone(),
            visible_if: Expr::yes(),
        })
    }

    fn set_prompt(&mut self, name: &str, definition: usize, menu: MenuId, prompt: Prompt) {
        let node = self.menu.node_mut(menu);
        node.prompt = Some(prompt.text.clone());
        node.prompt_cond = prompt.cond.clone();
        self.symbols.set_prompt(name, definition, prompt);
    }

    fn set_choice_prompt(&mut self, id: ChoiceId, menu: MenuId, prompt: Prompt) {
        let node = self.menu.node_mut(menu);
        node.prompt = Some(prompt.text.clone());
        node.prompt_cond = prompt.cond.clone();
        self.symbols.choice_mut(id).prompt.get_or_insert(prompt);
    }

    /// Register every symbol used inside `node`.
    fn register_references(&mut self, file: FileId, node: &SyntaxNode) {
        for symbol in node.descendants().filter_map(SymbolRef::cast) {
            let name = symbol.name();
            if name.is_empty() || matches!(name.as_str(), "y" | "m" | "n") {
                continue;
            }
            self.symbols
                .add_reference(&name, FileRange::new(file, symbol.ident_range()));
        }
    }
}

fn symbol_type(kind: SyntaxKind) -> Option<SymbolType> {
    Some(match kind {
        SyntaxKind::BOOL_KW => SymbolType::Bool,
        SyntaxKind::TRISTATE_KW => SymbolType::Tristate,
        SyntaxKind::STRING_KW => SymbolType::String,
        SyntaxKind::INT_KW => SymbolType::Int,
        SyntaxKind::HEX_KW => SymbolType::Hex,
        _ => return None,
    })
}

fn lower_opt(expr: Option<parser::Expr>) -> Expr {
    expr.map(|e| Expr::lower(&e))
        .unwrap_or(Expr::Const(super::types::Tristate::No))
}

/// `if` guard of an attribute; `y` when there is none.
fn condition(cond: Option<parser::Condition>) -> Expr {
    match cond {
        Some(cond) => lower_opt(cond.expr()),
        None => Expr::yes(),
    }
}

fn own_dependency(attributes: &[Attribute]) -> Expr {
    attributes
        .iter()
        .filter_map(|attr| match attr {
            Attribute::Depends(depends) => Some(lower_opt(depends.expr())),
            _ => None,
        })
        .fold(Expr::yes(), Expr::and)
}

fn make_prompt(
    file: FileId,
    prompt: parser::PromptText,
    cond: Option<parser::Condition>,
) -> Prompt {
    Prompt {
        text: prompt.text,
        cond: condition(cond),
        location: FileRange::new(file, prompt.range),
    }
}

/// Range of a node without leading/trailing trivia and newlines.
pub(crate) fn trimmed_range(node: &SyntaxNode) -> TextRange {
    let mut significant = node
        .descendants_with_tokens()
        .filter_map(|it| it.into_token())
        .filter(|t| {
            !t.kind().is_trivia()
                && !matches!(t.kind(), SyntaxKind::NEWLINE | SyntaxKind::HELP_TEXT)
        });
    let Some(first) = significant.next() else {
        return node.text_range();
    };
    let last = significant.last().unwrap_or_else(|| first.clone());
    TextRange::new(first.text_range().start(), last.text_range().end())
}
