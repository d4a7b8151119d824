use crate::frontend::parser_error::ParserError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Decimal literal: labels, constants, branch targets.
    Int(i64),
    /// `x<digits>`
    Register(i64),
    Dot,
    Assign,
    EqEq,
    Plus,
    Minus,
    If,
    Goto,
    Else,
    Stop,
    Newline,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub span: Span,
}

pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current();
        if ch == Some('\n') {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.pos += 1;
        ch
    }

    fn span(&self) -> Span {
        Span {
            line: self.line,
            col: self.col,
        }
    }

    fn error(&self, span: Span, message: impl Into<String>) -> ParserError {
        ParserError::Syntax {
            message: message.into(),
            line: span.line,
            col: span.col,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.current() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn read_digits(&mut self) -> String {
        let mut digits = String::new();
        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        digits
    }

    fn read_int(&mut self, span: Span) -> Result<i64, ParserError> {
        let digits = self.read_digits();
        digits
            .parse::<i64>()
            .map_err(|_| self.error(span, format!("number '{}' is out of range", digits)))
    }

    fn read_word(&mut self, span: Span) -> Result<Token, ParserError> {
        let mut word = String::new();
        while let Some(ch) = self.current() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Ok(match word.as_str() {
            "if" => Token::If,
            "goto" => Token::Goto,
            "else" => Token::Else,
            "stop" => Token::Stop,
            _ => return Err(self.error(span, format!("unknown word '{}'", word))),
        })
    }

    pub fn tokenize(&mut self) -> Result<Vec<Spanned>, ParserError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            let span = self.span();

            let Some(ch) = self.current() else {
                tokens.push(Spanned {
                    token: Token::Eof,
                    span,
                });
                break;
            };

            let token = match ch {
                '#' => {
                    self.skip_comment();
                    continue;
                }
                '\n' => {
                    self.advance();
                    Token::Newline
                }
                '.' => {
                    self.advance();
                    Token::Dot
                }
                '+' => {
                    self.advance();
                    Token::Plus
                }
                '-' => {
                    self.advance();
                    Token::Minus
                }
                '=' => {
                    self.advance();
                    if self.current() == Some('=') {
                        self.advance();
                        Token::EqEq
                    } else {
                        Token::Assign
                    }
                }
                'x' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                    self.advance();
                    Token::Register(self.read_int(span)?)
                }
                c if c.is_ascii_digit() => Token::Int(self.read_int(span)?),
                c if c.is_ascii_alphabetic() => self.read_word(span)?,
                c => return Err(self.error(span, format!("unexpected character '{}'", c))),
            };

            tokens.push(Spanned { token, span });
        }

        Ok(tokens)
    }
}
