//! Static type metadata
//!
//! Reads the first class declared in a PHP file together with its namespace,
//! its resolved parent, and the literal values of its property and constant
//! declarations. Nothing is executed; values that are not plain string or
//! string-list literals are recorded as unreadable.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

use crate::models::lexer::{tokenize, Token};
use crate::utils::naming::{normalize_class_name, qualify};

/// Keywords that may precede `class` in a declaration
static CLASS_MODIFIERS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["abstract", "final", "readonly"].into_iter().collect());

/// Statically extracted description of a class
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeMetadata {
    /// Fully-qualified class name
    pub name: String,
    pub namespace: String,
    pub short_name: String,
    /// Fully-qualified parent class name
    pub parent: Option<String>,
    pub is_abstract: bool,
    /// Properties initialized with a list of string literals
    pub declared_lists: HashMap<String, Vec<String>>,
    /// Properties initialized with a string literal
    pub declared_strings: HashMap<String, String>,
    /// Class constants initialized with a string literal
    pub constants: HashMap<String, String>,
    /// Properties declared with any other initializer (or none)
    pub unreadable: HashSet<String>,
}

impl TypeMetadata {
    /// Extract metadata for the first class declared in `source`
    pub fn from_source(source: &str) -> Option<Self> {
        let tokens = tokenize(source);
        MetadataParser::new(&tokens).parse()
    }

    pub fn list(&self, property: &str) -> Option<&[String]> {
        self.declared_lists.get(property).map(|v| v.as_slice())
    }

    pub fn string(&self, property: &str) -> Option<&str> {
        self.declared_strings.get(property).map(|s| s.as_str())
    }

    pub fn constant(&self, name: &str) -> Option<&str> {
        self.constants.get(name).map(|s| s.as_str())
    }

    /// Whether the class itself declares `property`, readable or not
    pub fn declares(&self, property: &str) -> bool {
        self.declared_lists.contains_key(property)
            || self.declared_strings.contains_key(property)
            || self.unreadable.contains(property)
    }
}

enum Value {
    List(Vec<String>),
    Str(String),
    Other,
}

struct MetadataParser<'t> {
    tokens: &'t [Token],
    pos: usize,
    namespace: String,
    /// Lowercased alias -> fully-qualified name
    imports: HashMap<String, String>,
}

impl<'t> MetadataParser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            namespace: String::new(),
            imports: HashMap::new(),
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn parse(mut self) -> Option<TypeMetadata> {
        let mut seen_namespace = false;

        while let Some(token) = self.next() {
            if token.is_keyword("namespace") && !seen_namespace {
                seen_namespace = true;
                self.parse_namespace();
            } else if token.is_keyword("use") {
                self.parse_use();
            } else if token.is_keyword("class") && self.is_class_declaration() {
                return self.parse_class();
            }
        }

        None
    }

    /// `class` after `::` or `new` is not a declaration
    fn is_class_declaration(&self) -> bool {
        match self.pos.checked_sub(2).and_then(|i| self.tokens.get(i)) {
            Some(prev) => !(prev.is_symbol("::") || prev.is_keyword("new")),
            None => true,
        }
    }

    fn parse_namespace(&mut self) {
        let mut namespace = String::new();
        while let Some(token) = self.peek() {
            match token {
                Token::Name(name) => {
                    namespace.push_str(name);
                    self.pos += 1;
                }
                _ => break,
            }
        }
        self.namespace = normalize_class_name(&namespace);
    }

    fn parse_use(&mut self) {
        // Closures (`use ($x)`) and function/const imports are not class imports
        match self.peek() {
            Some(t) if t.is_symbol("(") => return,
            Some(t) if t.is_keyword("function") || t.is_keyword("const") => {
                self.skip_past(";");
                return;
            }
            _ => {}
        }

        loop {
            let name = match self.next() {
                Some(Token::Name(name)) => normalize_class_name(name),
                _ => return,
            };

            // Group imports lex as `Prefix`, `\`, `{`
            let group = self.peek().map_or(false, |t| t.is_symbol("\\"))
                && self.tokens.get(self.pos + 1).map_or(false, |t| t.is_symbol("{"));
            if group {
                self.pos += 2;
                self.parse_group_use(&name);
            } else {
                let alias = self.parse_alias().unwrap_or_else(|| {
                    crate::utils::class_basename(&name).to_string()
                });
                self.imports.insert(alias.to_lowercase(), name);
            }

            match self.next() {
                Some(t) if t.is_symbol(",") => continue,
                _ => return,
            }
        }
    }

    fn parse_group_use(&mut self, prefix: &str) {
        while let Some(token) = self.next() {
            match token {
                Token::Name(name) => {
                    let full = qualify(prefix, &normalize_class_name(name));
                    let alias = self.parse_alias().unwrap_or_else(|| {
                        crate::utils::class_basename(&full).to_string()
                    });
                    self.imports.insert(alias.to_lowercase(), full);
                }
                t if t.is_symbol("}") => return,
                _ => {}
            }
        }
    }

    fn parse_alias(&mut self) -> Option<String> {
        if !self.peek().map_or(false, |t| t.is_keyword("as")) {
            return None;
        }
        self.pos += 1;
        match self.next() {
            Some(Token::Name(alias)) => Some(alias.clone()),
            _ => None,
        }
    }

    fn skip_past(&mut self, symbol: &str) {
        while let Some(token) = self.next() {
            if token.is_symbol(symbol) {
                return;
            }
        }
    }

    /// Resolve a class reference the way PHP does at compile time
    fn resolve(&self, name: &str) -> String {
        if let Some(stripped) = name.strip_prefix('\\') {
            return stripped.to_string();
        }

        let (first, rest) = match name.split_once('\\') {
            Some((first, rest)) => (first, Some(rest)),
            None => (name, None),
        };

        if first.eq_ignore_ascii_case("namespace") {
            return qualify(&self.namespace, rest.unwrap_or_default());
        }

        match (self.imports.get(&first.to_lowercase()), rest) {
            (Some(imported), Some(rest)) => format!("{}\\{}", imported, rest),
            (Some(imported), None) => imported.clone(),
            (None, _) => qualify(&self.namespace, name),
        }
    }

    fn parse_class(&mut self) -> Option<TypeMetadata> {
        let class_index = self.pos - 1;
        let is_abstract = self.tokens[..class_index]
            .iter()
            .rev()
            .take_while(|t| matches!(t, Token::Name(n) if CLASS_MODIFIERS.contains(n.to_lowercase().as_str())))
            .any(|t| t.is_keyword("abstract"));

        let short_name = match self.next() {
            Some(Token::Name(name)) => name.clone(),
            _ => return None,
        };

        let mut metadata = TypeMetadata {
            name: qualify(&self.namespace, &short_name),
            namespace: self.namespace.clone(),
            short_name,
            is_abstract,
            ..Default::default()
        };

        // Header: extends / implements, up to the opening brace
        while let Some(token) = self.next() {
            if token.is_symbol("{") {
                break;
            }
            if token.is_keyword("extends") {
                if let Some(Token::Name(parent)) = self.peek() {
                    metadata.parent = Some(self.resolve(parent));
                    self.pos += 1;
                }
            }
        }

        self.parse_body(&mut metadata);
        Some(metadata)
    }

    fn parse_body(&mut self, metadata: &mut TypeMetadata) {
        let mut depth = 0usize;
        let mut parens = 0usize;

        while let Some(token) = self.next() {
            match token {
                t if t.is_symbol("{") => depth += 1,
                t if t.is_symbol("}") => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                t if t.is_symbol("(") => parens += 1,
                t if t.is_symbol(")") => parens = parens.saturating_sub(1),
                _ if depth > 0 || parens > 0 => {}
                t if t.is_keyword("const") => self.parse_constants(metadata),
                Token::Variable(name) => self.parse_property(name, metadata),
                _ => {}
            }
        }
    }

    fn parse_property(&mut self, name: &str, metadata: &mut TypeMetadata) {
        let mut name = name.to_string();
        loop {
            let value = if self.peek().map_or(false, |t| t.is_symbol("=")) {
                self.pos += 1;
                self.parse_value()
            } else {
                Value::Other
            };

            match value {
                Value::List(items) => {
                    metadata.declared_lists.insert(name, items);
                }
                Value::Str(s) => {
                    metadata.declared_strings.insert(name, s);
                }
                Value::Other => {
                    metadata.unreadable.insert(name);
                }
            }

            // `protected $a = [], $b = 'x';`
            match self.next() {
                Some(t) if t.is_symbol(",") => match self.peek() {
                    Some(Token::Variable(next)) => {
                        name = next.clone();
                        self.pos += 1;
                    }
                    _ => return,
                },
                _ => return,
            }
        }
    }

    fn parse_constants(&mut self, metadata: &mut TypeMetadata) {
        loop {
            // An optional type precedes the name; the name is the last one before `=`
            let mut name = None;
            while let Some(token) = self.next() {
                match token {
                    Token::Name(n) => name = Some(n.clone()),
                    t if t.is_symbol("=") => break,
                    _ => return,
                }
            }

            let name = match name {
                Some(name) => name,
                None => return,
            };

            if let Value::Str(s) = self.parse_value() {
                metadata.constants.insert(name, s);
            }

            match self.next() {
                Some(t) if t.is_symbol(",") => continue,
                _ => return,
            }
        }
    }

    /// Parse an initializer, leaving the position on the terminating `,` or `;`
    fn parse_value(&mut self) -> Value {
        let value = match self.peek() {
            Some(Token::Str(s)) => {
                self.pos += 1;
                Value::Str(s.clone())
            }
            Some(t) if t.is_symbol("[") => {
                self.pos += 1;
                self.parse_list("]")
            }
            Some(t) if t.is_keyword("array")
                && self.tokens.get(self.pos + 1).map_or(false, |n| n.is_symbol("(")) =>
            {
                self.pos += 2;
                self.parse_list(")")
            }
            _ => Value::Other,
        };

        // Anything left before the terminator makes the value an expression
        match self.peek() {
            Some(t) if t.is_symbol(",") || t.is_symbol(";") => value,
            _ => {
                self.skip_expression();
                Value::Other
            }
        }
    }

    fn parse_list(&mut self, close: &str) -> Value {
        let mut items = Vec::new();

        loop {
            match self.next() {
                Some(t) if t.is_symbol(close) => return Value::List(items),
                Some(Token::Str(s)) => {
                    items.push(s.clone());
                    match self.next() {
                        Some(t) if t.is_symbol(",") => {}
                        Some(t) if t.is_symbol(close) => return Value::List(items),
                        _ => {
                            self.pos -= 1;
                            self.skip_nested(close);
                            return Value::Other;
                        }
                    }
                }
                Some(_) => {
                    self.pos -= 1;
                    self.skip_nested(close);
                    return Value::Other;
                }
                None => return Value::Other,
            }
        }
    }

    /// Skip to the closing delimiter of the current literal
    fn skip_nested(&mut self, close: &str) {
        let mut depth = 0usize;
        while let Some(token) = self.next() {
            if token.is_symbol("[") || token.is_symbol("(") || token.is_symbol("{") {
                depth += 1;
            } else if token.is_symbol("]") || token.is_symbol(")") || token.is_symbol("}") {
                if depth == 0 && token.is_symbol(close) {
                    return;
                }
                depth = depth.saturating_sub(1);
            }
        }
    }

    /// Skip to the next top-level `,` or `;` without consuming it
    fn skip_expression(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            if depth == 0 && (token.is_symbol(",") || token.is_symbol(";")) {
                return;
            }
            if token.is_symbol("[") || token.is_symbol("(") || token.is_symbol("{") {
                depth += 1;
            } else if token.is_symbol("]") || token.is_symbol(")") || token.is_symbol("}") {
                if depth == 0 {
                    return;
                }
                depth -= 1;
            }
            self.pos += 1;
        }
    }
}
