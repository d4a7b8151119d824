use std::str::FromStr;

use crate::frontend::lexer::{Lexer, Span, Spanned, Token};
use crate::frontend::parser_error::ParserError;
use crate::machine::instruction_error::InstructionError;
use crate::machine::op::Instruction;

/// Line-oriented parser for the URM textual grammar.
///
/// Each non-blank line is one labelled instruction:
///
/// ```text
/// L. xR = V
/// L. xR = xR + 1
/// L. xR = xR - 1
/// L. if xR == 0 goto T else goto F
/// L. xD = xS
/// L. stop
/// ```
///
/// Every line ends up in one of the checked `Instruction` constructors, so
/// label and register rules are enforced exactly as for hand-built values.
pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    /// Span of the most recently consumed token, used for errors at EOF.
    last_span: Option<Span>,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned>) -> Self {
        Parser {
            tokens,
            pos: 0,
            last_span: None,
        }
    }

    fn current(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn peek(&self) -> Option<&Token> {
        self.current().map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let token = self.tokens.get(self.pos).cloned();
        if let Some(s) = &token {
            self.last_span = Some(s.span);
        }
        self.pos += 1;
        token
    }

    fn span(&self) -> Span {
        self.current()
            .map(|s| s.span)
            .or(self.last_span)
            .unwrap_or(Span { line: 1, col: 1 })
    }

    fn error(&self, message: impl Into<String>) -> ParserError {
        let span = self.span();
        ParserError::Syntax {
            message: message.into(),
            line: span.line,
            col: span.col,
        }
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), ParserError> {
        if self.peek() == Some(&expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected {}, found {}", what, self.describe())))
        }
    }

    fn expect_int(&mut self, what: &str) -> Result<i64, ParserError> {
        match self.peek() {
            Some(Token::Int(n)) => {
                let n = *n;
                self.advance();
                Ok(n)
            }
            _ => Err(self.error(format!("expected {}, found {}", what, self.describe()))),
        }
    }

    fn expect_register(&mut self) -> Result<i64, ParserError> {
        match self.peek() {
            Some(Token::Register(r)) => {
                let r = *r;
                self.advance();
                Ok(r)
            }
            _ => Err(self.error(format!("expected register, found {}", self.describe()))),
        }
    }

    fn describe(&self) -> String {
        match self.peek() {
            None | Some(Token::Eof) => "end of input".to_string(),
            Some(Token::Newline) => "end of line".to_string(),
            Some(Token::Int(n)) => format!("'{}'", n),
            Some(Token::Register(r)) => format!("'x{}'", r),
            Some(Token::Dot) => "'.'".to_string(),
            Some(Token::Assign) => "'='".to_string(),
            Some(Token::EqEq) => "'=='".to_string(),
            Some(Token::Plus) => "'+'".to_string(),
            Some(Token::Minus) => "'-'".to_string(),
            Some(Token::If) => "'if'".to_string(),
            Some(Token::Goto) => "'goto'".to_string(),
            Some(Token::Else) => "'else'".to_string(),
            Some(Token::Stop) => "'stop'".to_string(),
        }
    }

    /// Parses every line into an instruction, in source order.
    pub fn parse(&mut self) -> Result<Vec<Instruction>, ParserError> {
        let mut instructions = Vec::new();

        loop {
            match self.peek() {
                None | Some(Token::Eof) => break,
                Some(Token::Newline) => {
                    self.advance();
                }
                Some(_) => {
                    instructions.push(self.parse_line()?);
                    match self.peek() {
                        None | Some(Token::Eof) => break,
                        Some(Token::Newline) => {
                            self.advance();
                        }
                        Some(_) => {
                            let found = self.describe();
                            return Err(self.error(format!("expected end of line, found {}", found)));
                        }
                    }
                }
            }
        }

        Ok(instructions)
    }

    fn parse_line(&mut self) -> Result<Instruction, ParserError> {
        let start = self.span();
        let label = self.expect_int("label")?;
        self.expect(Token::Dot, "'.' after label")?;

        let built = match self.peek() {
            Some(Token::Stop) => {
                self.advance();
                Instruction::halt(label)
            }
            Some(Token::If) => {
                self.advance();
                let register = self.expect_register()?;
                self.expect(Token::EqEq, "'=='")?;
                if self.expect_int("0")? != 0 {
                    return Err(self.error("branches can only test against 0"));
                }
                self.expect(Token::Goto, "'goto'")?;
                let if_zero = self.expect_int("target label")?;
                self.expect(Token::Else, "'else'")?;
                self.expect(Token::Goto, "'goto'")?;
                let otherwise = self.expect_int("target label")?;
                Instruction::branch(label, register, if_zero, otherwise)
            }
            Some(Token::Register(_)) => self.parse_assignment(label)?,
            _ => {
                let found = self.describe();
                return Err(self.error(format!("expected instruction, found {}", found)));
            }
        };

        built.map_err(|source| instruction_error(source, start))
    }

    /// `xD = ...`: constant, increment, decrement or copy.
    fn parse_assignment(
        &mut self,
        label: i64,
    ) -> Result<Result<Instruction, InstructionError>, ParserError> {
        let dest = self.expect_register()?;
        self.expect(Token::Assign, "'='")?;

        match self.peek() {
            Some(Token::Int(_)) => {
                let value = self.expect_int("value")?;
                Ok(Instruction::set(label, dest, value))
            }
            Some(Token::Minus) => {
                self.advance();
                let value = self.expect_int("value")?;
                Ok(Instruction::set(label, dest, -value))
            }
            Some(Token::Register(_)) => {
                let src = self.expect_register()?;
                let increment = match self.peek() {
                    Some(Token::Plus) => true,
                    Some(Token::Minus) => false,
                    _ => return Ok(Instruction::copy(label, dest, src)),
                };
                self.advance();
                if self.expect_int("1")? != 1 {
                    return Err(self.error("registers can only change by 1"));
                }
                if src != dest {
                    return Err(self.error(format!(
                        "x{} can only be updated from itself, found x{}",
                        dest, src
                    )));
                }
                Ok(if increment {
                    Instruction::increment(label, dest)
                } else {
                    Instruction::decrement(label, dest)
                })
            }
            _ => Err(self.error(format!(
                "expected value or register, found {}",
                self.describe()
            ))),
        }
    }
}

fn instruction_error(source: InstructionError, span: Span) -> ParserError {
    ParserError::Instruction {
        source,
        line: span.line,
        col: span.col,
    }
}

/// Parses a multi-line program into its instructions, in source order.
pub fn parse_program(source: &str) -> Result<Vec<Instruction>, ParserError> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(tokens).parse()
}

/// Parses exactly one instruction.
pub fn parse_instruction(source: &str) -> Result<Instruction, ParserError> {
    let mut instructions = parse_program(source)?;
    match instructions.len() {
        1 => Ok(instructions.remove(0)),
        n => Err(ParserError::Syntax {
            message: format!("expected exactly one instruction, found {}", n),
            line: 1,
            col: 1,
        }),
    }
}

impl FromStr for Instruction {
    type Err = ParserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_instruction(s)
    }
}

impl TryFrom<&str> for Instruction {
    type Error = ParserError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        parse_instruction(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::op::Op;

    fn parse(line: &str) -> Instruction {
        line.parse().unwrap()
    }

    fn construction_error(line: &str) -> InstructionError {
        match parse_instruction(line) {
            Err(ParserError::Instruction { source, .. }) => source,
            other => panic!("expected construction error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_each_form() {
        assert_eq!(
            *parse("1. x2 = 3").op(),
            Op::Set {
                register: 2,
                value: 3
            }
        );
        assert_eq!(*parse("2. x2 = x2 + 1").op(), Op::Increment { register: 2 });
        assert_eq!(*parse("3. x3 = x3 - 1").op(), Op::Decrement { register: 3 });
        assert_eq!(*parse("4. x2 = x3").op(), Op::Copy { dest: 2, src: 3 });
        assert_eq!(
            *parse("5. if x2 == 0 goto 3 else goto 4").op(),
            Op::Branch {
                register: 2,
                if_zero: 3,
                otherwise: 4
            }
        );
        let stop = parse("6. stop");
        assert!(stop.is_halt());
        assert_eq!(stop.label(), 6);
    }

    #[test]
    fn test_parse_matches_display() {
        for line in [
            "1. x2 = 3",
            "2. x2 = x2 + 1",
            "3. x3 = x3 - 1",
            "4. x2 = x3",
            "5. if x2 == 0 goto 3 else goto 4",
            "6. stop",
        ] {
            assert_eq!(parse(line).to_string(), line);
        }
    }

    #[test]
    fn test_construction_errors_pass_through() {
        assert_eq!(
            construction_error("1. x2 = -1"),
            InstructionError::InvalidRegisterInitialization { value: -1 }
        );
        assert_eq!(
            construction_error("1. x0 = 3"),
            InstructionError::InvalidRegisterIndex { register: 0 }
        );
        assert_eq!(
            construction_error("1. x0 = x0 + 1"),
            InstructionError::InvalidRegisterIndex { register: 0 }
        );
        assert_eq!(
            construction_error("1. x0 = x0 - 1"),
            InstructionError::InvalidRegisterIndex { register: 0 }
        );
        assert_eq!(
            construction_error("1. if x0 == 0 goto 3 else goto 4"),
            InstructionError::InvalidRegisterIndex { register: 0 }
        );
        assert_eq!(
            construction_error("1. if x2 == 0 goto 0 else goto 4"),
            InstructionError::InvalidLabel { label: 0 }
        );
        assert_eq!(
            construction_error("1. if x2 == 0 goto 3 else goto 0"),
            InstructionError::InvalidLabel { label: 0 }
        );
        assert_eq!(
            construction_error("1. x0 = x3"),
            InstructionError::InvalidRegisterIndex { register: 0 }
        );
        assert_eq!(
            construction_error("1. x2 = x0"),
            InstructionError::InvalidRegisterIndex { register: 0 }
        );
        assert_eq!(
            construction_error("0. stop"),
            InstructionError::InvalidLabel { label: 0 }
        );
    }

    #[test]
    fn test_syntax_errors() {
        for line in [
            "x1 = 1",
            "1 x1 = 1",
            "1. x1 = x2 + 1",
            "1. x1 = x1 + 2",
            "1. if x1 == 1 goto 2 else goto 3",
            "1. stop stop",
            "1. x1",
        ] {
            assert!(
                matches!(parse_instruction(line), Err(ParserError::Syntax { .. })),
                "{} should be a syntax error",
                line
            );
        }
    }

    #[test]
    fn test_program_skips_blank_lines_and_comments() {
        let source = "# add x2 and x3\n\n1. x1 = x2\n  2. stop  # end\n";
        let instructions = parse_program(source).unwrap();
        assert_eq!(instructions.len(), 2);
        assert_eq!(instructions[1].label(), 2);
    }

    #[test]
    fn test_error_location() {
        let err = parse_program("1. stop\n2. x1 = \n").unwrap_err();
        assert_eq!(err.line(), 2);
        assert!(err.to_string().contains("expected value or register"));
    }

    #[test]
    fn test_parse_instruction_rejects_many() {
        assert!(parse_instruction("1. stop\n2. stop").is_err());
        assert!(parse_instruction("").is_err());
    }
}
