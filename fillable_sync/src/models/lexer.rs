//! Minimal PHP tokenizer
//!
//! Recognizes just enough of the language to pull names and literal
//! declarations out of a model file: open/close tags, comments, quoted strings,
//! heredocs, variables, (qualified) names, numbers and punctuation. Anything
//! outside `<?php ... ?>` is skipped as inline HTML.

/// A lexical token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    OpenTag,
    CloseTag,
    /// `$name`, without the sigil
    Variable(String),
    /// Identifier or qualified name, e.g. `class`, `Model`, `\App\Models\User`
    Name(String),
    /// Quoted string with escapes resolved
    Str(String),
    /// Double-quoted string or heredoc with interpolation
    Interpolated,
    Number(String),
    /// Punctuation and operators (`::`, `=>`, `->`, `?->`, `??`, or a single character)
    Symbol(String),
}

impl Token {
    /// Case-insensitive keyword check
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Name(name) if name.eq_ignore_ascii_case(keyword))
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        matches!(self, Token::Symbol(s) if s == symbol)
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_ident_char(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

/// Tokenize PHP source text
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.bytes[self.pos..].starts_with(s.as_bytes())
    }

    fn run(mut self) -> Vec<Token> {
        self.skip_inline_html();

        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];

            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else if self.starts_with("?>") {
                self.pos += 2;
                self.tokens.push(Token::CloseTag);
                self.skip_inline_html();
            } else if self.starts_with("//") || (b == b'#' && self.peek(1) != Some(b'[')) {
                self.skip_line_comment();
            } else if self.starts_with("/*") {
                self.skip_block_comment();
            } else if b == b'\'' {
                self.single_quoted();
            } else if b == b'"' || b == b'`' {
                self.double_quoted(b);
            } else if self.starts_with("<<<") {
                self.heredoc();
            } else if b == b'$' && self.peek(1).map_or(false, is_ident_start) {
                self.pos += 1;
                let name = self.ident();
                self.tokens.push(Token::Variable(name));
            } else if is_ident_start(b)
                || (b == b'\\' && self.peek(1).map_or(false, is_ident_start))
            {
                let name = self.qualified_name();
                self.tokens.push(Token::Name(name));
            } else if b.is_ascii_digit() {
                let start = self.pos;
                while self
                    .peek(0)
                    .map_or(false, |c| c.is_ascii_alphanumeric() || c == b'.' || c == b'_')
                {
                    self.pos += 1;
                }
                self.tokens.push(Token::Number(self.src[start..self.pos].to_string()));
            } else {
                self.symbol();
            }
        }

        self.tokens
    }

    fn skip_inline_html(&mut self) {
        match self.src[self.pos..].find("<?") {
            Some(offset) => {
                self.pos += offset + 2;
                if self.src[self.pos..]
                    .get(..3)
                    .map_or(false, |tag| tag.eq_ignore_ascii_case("php"))
                {
                    self.pos += 3;
                } else if self.peek(0) == Some(b'=') {
                    self.pos += 1;
                }
                self.tokens.push(Token::OpenTag);
            }
            None => self.pos = self.bytes.len(),
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(b) = self.peek(0) {
            if b == b'\n' || self.starts_with("?>") {
                break;
            }
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) {
        match self.src[self.pos + 2..].find("*/") {
            Some(offset) => self.pos += offset + 4,
            None => self.pos = self.bytes.len(),
        }
    }

    fn ident(&mut self) -> String {
        let start = self.pos;
        while self.peek(0).map_or(false, is_ident_char) {
            self.pos += 1;
        }
        self.src[start..self.pos].to_string()
    }

    fn qualified_name(&mut self) -> String {
        let start = self.pos;
        loop {
            if self.peek(0) == Some(b'\\') {
                self.pos += 1;
            }
            while self.peek(0).map_or(false, is_ident_char) {
                self.pos += 1;
            }
            // Continue only across a separator followed by another segment
            if !(self.peek(0) == Some(b'\\') && self.peek(1).map_or(false, is_ident_start)) {
                break;
            }
        }
        self.src[start..self.pos].to_string()
    }

    fn single_quoted(&mut self) {
        self.pos += 1;
        let mut value = String::new();
        let mut chunk_start = self.pos;

        while let Some(b) = self.peek(0) {
            match b {
                b'\\' if matches!(self.peek(1), Some(b'\'') | Some(b'\\')) => {
                    value.push_str(&self.src[chunk_start..self.pos]);
                    value.push(self.bytes[self.pos + 1] as char);
                    self.pos += 2;
                    chunk_start = self.pos;
                }
                b'\'' => {
                    value.push_str(&self.src[chunk_start..self.pos]);
                    self.pos += 1;
                    self.tokens.push(Token::Str(value));
                    return;
                }
                _ => self.pos += 1,
            }
        }

        // Unterminated
        self.tokens.push(Token::Interpolated);
    }

    fn double_quoted(&mut self, quote: u8) {
        self.pos += 1;
        let mut value = String::new();
        let mut chunk_start = self.pos;
        let mut interpolated = quote == b'`';

        while let Some(b) = self.peek(0) {
            if b == quote {
                value.push_str(&self.src[chunk_start..self.pos]);
                self.pos += 1;
                self.tokens.push(if interpolated {
                    Token::Interpolated
                } else {
                    Token::Str(value)
                });
                return;
            }

            match b {
                b'\\' => {
                    let escaped = match self.peek(1) {
                        Some(b'n') => Some('\n'),
                        Some(b't') => Some('\t'),
                        Some(b'r') => Some('\r'),
                        Some(b'v') => Some('\x0B'),
                        Some(b'e') => Some('\x1B'),
                        Some(b'f') => Some('\x0C'),
                        Some(b'\\') => Some('\\'),
                        Some(b'$') => Some('$'),
                        Some(c) if c == quote => Some(c as char),
                        _ => None,
                    };
                    match escaped {
                        Some(c) => {
                            value.push_str(&self.src[chunk_start..self.pos]);
                            value.push(c);
                            self.pos += 2;
                            chunk_start = self.pos;
                        }
                        None => self.pos += 1,
                    }
                }
                b'$' if self.peek(1).map_or(false, |c| is_ident_start(c) || c == b'{') => {
                    interpolated = true;
                    self.pos += 1;
                }
                b'{' if self.peek(1) == Some(b'$') => {
                    interpolated = true;
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }

        self.tokens.push(Token::Interpolated);
    }

    fn heredoc(&mut self) {
        self.pos += 3;
        while matches!(self.peek(0), Some(b' ') | Some(b'\t')) {
            self.pos += 1;
        }

        let nowdoc = self.peek(0) == Some(b'\'');
        if matches!(self.peek(0), Some(b'\'') | Some(b'"')) {
            self.pos += 1;
        }
        let label = self.ident();

        let body_start = match self.src[self.pos..].find('\n') {
            Some(offset) => self.pos + offset + 1,
            None => {
                self.pos = self.bytes.len();
                self.tokens.push(Token::Interpolated);
                return;
            }
        };

        // The closing label is the first line whose trimmed content starts with it
        let mut line_start = body_start;
        let mut body = String::new();
        while line_start < self.bytes.len() {
            let line_end = self.src[line_start..]
                .find('\n')
                .map_or(self.bytes.len(), |offset| line_start + offset);
            let line = &self.src[line_start..line_end];
            let trimmed = line.trim_start();

            if !label.is_empty()
                && trimmed.starts_with(label.as_str())
                && !trimmed[label.len()..].bytes().next().map_or(false, is_ident_char)
            {
                self.pos = line_start + (line.len() - trimmed.len()) + label.len();
                if nowdoc {
                    self.tokens.push(Token::Str(body.trim_end_matches('\n').to_string()));
                } else {
                    self.tokens.push(Token::Interpolated);
                }
                return;
            }

            body.push_str(line);
            body.push('\n');
            line_start = line_end + 1;
        }

        self.pos = self.bytes.len();
        self.tokens.push(Token::Interpolated);
    }

    fn symbol(&mut self) {
        for op in ["?->", "::", "=>", "->", "??"] {
            if self.starts_with(op) {
                self.pos += op.len();
                self.tokens.push(Token::Symbol(op.to_string()));
                return;
            }
        }

        // Advance by a whole character so slicing stays on char boundaries
        let ch = self.src[self.pos..].chars().next().unwrap_or('\0');
        self.pos += ch.len_utf8().max(1);
        self.tokens.push(Token::Symbol(ch.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_comments_and_html() {
        let tokens = tokenize("<html><?php // class Foo\n/* class Bar */ # class Baz\nclass Real {}");
        assert_eq!(
            tokens,
            vec![
                Token::OpenTag,
                Token::Name("class".to_string()),
                Token::Name("Real".to_string()),
                Token::Symbol("{".to_string()),
                Token::Symbol("}".to_string()),
            ]
        );
    }

    #[test]
    fn test_qualified_names_and_variables() {
        let tokens = tokenize(r"<?php use \Illuminate\Database\Eloquent\Model; $fillable");
        assert_eq!(tokens[2], Token::Name(r"\Illuminate\Database\Eloquent\Model".to_string()));
        assert_eq!(tokens[4], Token::Variable("fillable".to_string()));
    }

    #[test]
    fn test_string_escapes() {
        let tokens = tokenize(r#"<?php 'it\'s' "a\tb" "hi $name" 'c:\path'"#);
        assert_eq!(tokens[1], Token::Str("it's".to_string()));
        assert_eq!(tokens[2], Token::Str("a\tb".to_string()));
        assert_eq!(tokens[3], Token::Interpolated);
        assert_eq!(tokens[4], Token::Str(r"c:\path".to_string()));
    }

    #[test]
    fn test_attribute_is_not_a_comment() {
        let tokens = tokenize("<?php #[Table] class Foo {}");
        assert!(tokens.contains(&Token::Name("class".to_string())));
    }

    #[test]
    fn test_heredoc_consumes_body() {
        let source = "<?php $sql = <<<SQL\nclass Fake extends Nothing\nSQL;\nclass Real {}";
        let tokens = tokenize(source);
        let names: Vec<_> = tokens
            .iter()
            .filter_map(|t| match t {
                Token::Name(n) => Some(n.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["class", "Real"]);
    }
}
