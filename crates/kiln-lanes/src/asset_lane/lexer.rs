// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A small tokenizer for the engine's text formats.
//!
//! Whitespace, `//` line comments and `/* */` block comments are skipped.
//! Numbers carry an optional leading `-`, a fractional part and an exponent.
//! Every other character that cannot start a number or an identifier becomes
//! a single-character token.

/// The category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// An integer or decimal literal, possibly negative.
    Number,
    /// A run of letters, digits and underscores not starting with a digit.
    Identifier,
    /// `#`
    Hash,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `.`
    Period,
    /// Any other single character.
    Symbol(char),
    /// End of input.
    Eof,
}

/// A token borrowed from the lexer's source text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'s> {
    /// What the token is.
    pub kind: TokenKind,
    /// The exact source text of the token. Empty for [`TokenKind::Eof`].
    pub text: &'s str,
    /// Byte offset of the token in the source.
    pub offset: usize,
    /// 1-based line the token starts on.
    pub line: u32,
}

impl Token<'_> {
    /// Returns `true` if this is the identifier `name`.
    pub fn is_identifier(&self, name: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text == name
    }

    /// Parses a number token as `f32`.
    pub fn as_f32(&self) -> Option<f32> {
        match self.kind {
            TokenKind::Number => self.text.parse().ok(),
            _ => None,
        }
    }

    /// Parses a number token as a non-negative integer.
    pub fn as_u32(&self) -> Option<u32> {
        match self.kind {
            TokenKind::Number => self.text.parse().ok(),
            _ => None,
        }
    }

    /// A short description for error messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of file".to_string(),
            _ => format!("'{}'", self.text),
        }
    }
}

/// Splits source text into [`Token`]s on demand.
#[derive(Debug, Clone)]
pub struct Lexer<'s> {
    source: &'s str,
    pos: usize,
    line: u32,
}

impl<'s> Lexer<'s> {
    /// Creates a lexer positioned at the start of `source`.
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
        }
    }

    /// The full text being tokenized.
    pub fn source(&self) -> &'s str {
        self.source
    }

    /// The line the lexer is currently on.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Returns the next token without consuming it.
    pub fn peek(&self) -> Token<'s> {
        self.clone().next_token()
    }

    /// Consumes and returns the next token. Returns [`TokenKind::Eof`] forever
    /// once the input is exhausted.
    pub fn next_token(&mut self) -> Token<'s> {
        self.skip_trivia();

        let start = self.pos;
        let line = self.line;
        let bytes = self.source.as_bytes();

        let Some(&first) = bytes.get(start) else {
            return Token {
                kind: TokenKind::Eof,
                text: "",
                offset: start,
                line,
            };
        };

        let kind = if self.starts_number() {
            self.eat_number();
            TokenKind::Number
        } else if first.is_ascii_alphabetic() || first == b'_' || !first.is_ascii() {
            self.eat_identifier();
            TokenKind::Identifier
        } else {
            // ASCII, so a single byte is a whole char.
            self.pos += 1;
            match first {
                b'#' => TokenKind::Hash,
                b';' => TokenKind::Semicolon,
                b',' => TokenKind::Comma,
                b'.' => TokenKind::Period,
                other => TokenKind::Symbol(char::from(other)),
            }
        };

        Token {
            kind,
            text: &self.source[start..self.pos],
            offset: start,
            line,
        }
    }

    fn byte_at(&self, index: usize) -> Option<u8> {
        self.source.as_bytes().get(index).copied()
    }

    fn skip_trivia(&mut self) {
        while let Some(byte) = self.byte_at(self.pos) {
            match byte {
                b' ' | b'\t' | b'\r' => self.pos += 1,
                b'\n' => {
                    self.pos += 1;
                    self.line += 1;
                }
                b'/' if self.byte_at(self.pos + 1) == Some(b'/') => {
                    while let Some(b) = self.byte_at(self.pos) {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                b'/' if self.byte_at(self.pos + 1) == Some(b'*') => {
                    self.pos += 2;
                    loop {
                        match self.byte_at(self.pos) {
                            None => break,
                            Some(b'*') if self.byte_at(self.pos + 1) == Some(b'/') => {
                                self.pos += 2;
                                break;
                            }
                            Some(b'\n') => {
                                self.line += 1;
                                self.pos += 1;
                            }
                            Some(_) => self.pos += 1,
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn starts_number(&self) -> bool {
        let digit_at = |i: usize| self.byte_at(i).is_some_and(|b| b.is_ascii_digit());
        let mut i = self.pos;
        if self.byte_at(i) == Some(b'-') {
            i += 1;
        }
        digit_at(i) || (self.byte_at(i) == Some(b'.') && digit_at(i + 1))
    }

    fn eat_digits(&mut self) {
        while self.byte_at(self.pos).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn eat_number(&mut self) {
        if self.byte_at(self.pos) == Some(b'-') {
            self.pos += 1;
        }
        self.eat_digits();
        if self.byte_at(self.pos) == Some(b'.') {
            self.pos += 1;
            self.eat_digits();
        }
        if matches!(self.byte_at(self.pos), Some(b'e' | b'E')) {
            let mut i = self.pos + 1;
            if matches!(self.byte_at(i), Some(b'-' | b'+')) {
                i += 1;
            }
            if self.byte_at(i).is_some_and(|b| b.is_ascii_digit()) {
                self.pos = i;
                self.eat_digits();
            }
        }
    }

    fn eat_identifier(&mut self) {
        let rest = &self.source[self.pos..];
        let len = rest
            .char_indices()
            .find(|&(_, c)| !(c.is_alphanumeric() || c == '_'))
            .map_or(rest.len(), |(i, _)| i);
        // A lone non-alphanumeric, non-ASCII char still forms a token.
        let len = if len == 0 {
            rest.chars().next().map_or(0, char::len_utf8)
        } else {
            len
        };
        self.pos += len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token();
            out.push(token.kind);
            if token.kind == TokenKind::Eof {
                return out;
            }
        }
    }

    #[test]
    fn numbers_include_sign_and_fraction() {
        let mut lexer = Lexer::new("-1.5, 2 .25 3e2");
        let t = lexer.next_token();
        assert_eq!((t.kind, t.text), (TokenKind::Number, "-1.5"));
        assert_eq!(lexer.next_token().kind, TokenKind::Comma);
        assert_eq!(lexer.next_token().as_u32(), Some(2));
        assert_eq!(lexer.next_token().as_f32(), Some(0.25));
        assert_eq!(lexer.next_token().as_f32(), Some(300.0));
    }

    #[test]
    fn comments_are_skipped_and_lines_counted() {
        let source = "// header\nposition /* a\nb */ mesh;\n";
        let mut lexer = Lexer::new(source);
        let position = lexer.next_token();
        assert!(position.is_identifier("position"));
        assert_eq!(position.line, 2);
        let mesh = lexer.next_token();
        assert!(mesh.is_identifier("mesh"));
        assert_eq!(mesh.line, 3);
        assert_eq!(lexer.next_token().kind, TokenKind::Semicolon);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn file_names_split_on_the_period() {
        assert_eq!(
            kinds("cube.obj;"),
            vec![
                TokenKind::Identifier,
                TokenKind::Period,
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lone_hyphen_is_a_symbol() {
        assert_eq!(
            kinds("- x"),
            vec![TokenKind::Symbol('-'), TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn peek_does_not_consume() {
        let mut lexer = Lexer::new("#version");
        assert_eq!(lexer.peek().kind, TokenKind::Hash);
        assert_eq!(lexer.next_token().kind, TokenKind::Hash);
        assert!(lexer.next_token().is_identifier("version"));
    }
}
