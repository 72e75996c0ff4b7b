//! # Lexer
//!
//! Tokenizes a single chart line.
//!
//! | Input          | Token                   |
//! |----------------|-------------------------|
//! | `{D}` `{Am7}`  | `Chord { name }`        |
//! | `{REST}` `{--}`| `Rest`                  |
//! | `..`           | `Hold`                  |
//! | `(` `)`        | `OpenParen`/`CloseParen`|
//! | `x4` `X12`     | `Repeat { count }`      |
//! | anything else  | `Word { text }`         |
//!
//! Malformed input never fails: an unmatched `{` or a lone `.` is skipped.

use crate::ast::Token;

/// Tokenize one line of chart text.
pub fn tokenize(line: &str) -> Vec<Token> {
    Lexer::new(line.trim()).tokenize()
}

/// Lexer over one line of chart text
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            position: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek() {
            let start = self.position;

            match c {
                '{' => {
                    if let Some(token) = self.read_braced() {
                        tokens.push(token);
                    }
                }
                '.' => {
                    if let Some(token) = self.read_hold() {
                        tokens.push(token);
                    }
                }
                '(' => {
                    self.position += 1;
                    tokens.push(Token::OpenParen);
                }
                ')' => {
                    self.position += 1;
                    tokens.push(Token::CloseParen);
                }
                'x' | 'X' => {
                    let token = match self.read_repeat() {
                        Some(token) => Some(token),
                        None => self.read_word(),
                    };
                    tokens.extend(token);
                }
                c if c.is_whitespace() => {
                    self.position += 1;
                }
                _ => {
                    tokens.extend(self.read_word());
                }
            }

            // Every branch must consume input; a stray '}' is the only way to get here.
            if self.position == start {
                log::debug!(
                    "lexer stuck at column {} on {:?}, skipping",
                    self.position + 1,
                    c
                );
                self.position += 1;
            }
        }

        tokens
    }

    /// `{...}` chord or rest. An unmatched `{` is consumed with no token.
    fn read_braced(&mut self) -> Option<Token> {
        let open = self.position;
        let close = self.chars[open + 1..]
            .iter()
            .position(|&c| c == '}')
            .map(|offset| open + 1 + offset);

        let Some(close) = close else {
            self.position += 1;
            return None;
        };

        let content: String = self.chars[open + 1..close].iter().collect();
        let content = content.trim();
        self.position = close + 1;

        if content == "--" || content.eq_ignore_ascii_case("rest") {
            Some(Token::Rest)
        } else {
            Some(Token::chord(content))
        }
    }

    /// `..` is a hold; a lone `.` is dropped.
    fn read_hold(&mut self) -> Option<Token> {
        if self.peek_at(1) == Some('.') {
            self.position += 2;
            Some(Token::Hold)
        } else {
            self.position += 1;
            None
        }
    }

    /// `x` followed by digits. Leaves the position untouched when this isn't a repeat.
    fn read_repeat(&mut self) -> Option<Token> {
        let digits: String = self.chars[self.position + 1..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .collect();

        if digits.is_empty() {
            return None;
        }

        let count = digits.parse::<u32>().ok()?;
        self.position += 1 + digits.len();
        Some(Token::Repeat { count })
    }

    fn read_word(&mut self) -> Option<Token> {
        let start = self.position;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, '{' | '}' | '(' | ')') {
                break;
            }
            self.position += 1;
        }

        if self.position == start {
            return None;
        }
        let text: String = self.chars[start..self.position].iter().collect();
        Some(Token::word(text))
    }
}
