//! Tokenizer for the expression sublanguage.

use crate::error::ExpressionError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '[' => {
                tokens.push(Token::LBracket);
                i += 1;
            }
            ']' => {
                tokens.push(Token::RBracket);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::DoubleStar);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                if chars.get(i + 1) == Some(&'/') {
                    tokens.push(Token::DoubleSlash);
                    i += 2;
                } else {
                    tokens.push(Token::Slash);
                    i += 1;
                }
            }
            '=' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Eq);
                    i += 2;
                } else {
                    return Err(ExpressionError::Syntax(
                        "assignment is not allowed; use '==' for comparison".into(),
                    ));
                }
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ne);
                    i += 2;
                } else {
                    // normalize() rewrites bare '!' before we get here
                    return Err(ExpressionError::Syntax("unexpected '!'".into()));
                }
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Le);
                    i += 2;
                } else {
                    tokens.push(Token::Lt);
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ge);
                    i += 2;
                } else {
                    tokens.push(Token::Gt);
                    i += 1;
                }
            }
            '\'' | '"' => {
                let quote = c;
                let mut s = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => {
                            return Err(ExpressionError::Syntax(
                                "unterminated string literal".into(),
                            ))
                        }
                        Some(&ch) if ch == quote => {
                            i += 1;
                            break;
                        }
                        Some('\\') => {
                            // Simple escapes only: \' \" \\
                            match chars.get(i + 1) {
                                Some(&esc) if esc == '\'' || esc == '"' || esc == '\\' => {
                                    s.push(esc);
                                    i += 2;
                                }
                                _ => {
                                    s.push('\\');
                                    i += 1;
                                }
                            }
                        }
                        Some(&ch) => {
                            s.push(ch);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Str(s));
            }
            '0'..='9' | '.' => {
                let start = i;
                let mut saw_dot = false;
                let mut saw_exp = false;
                while let Some(&ch) = chars.get(i) {
                    match ch {
                        '0'..='9' => i += 1,
                        '.' if !saw_dot && !saw_exp => {
                            saw_dot = true;
                            i += 1;
                        }
                        'e' | 'E' if !saw_exp && i > start => {
                            saw_exp = true;
                            i += 1;
                            if matches!(chars.get(i), Some('+') | Some('-')) {
                                i += 1;
                            }
                        }
                        _ => break,
                    }
                }
                let text: String = chars[start..i].iter().collect();
                if text == "." {
                    return Err(ExpressionError::Syntax("unexpected '.'".into()));
                }
                if saw_dot || saw_exp {
                    let f = text.parse::<f64>().map_err(|_| {
                        ExpressionError::Syntax(format!("invalid number literal: {text}"))
                    })?;
                    tokens.push(Token::Float(f));
                } else {
                    let n = text.parse::<i64>().map_err(|_| {
                        ExpressionError::Syntax(format!("invalid number literal: {text}"))
                    })?;
                    tokens.push(Token::Int(n));
                }
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let start = i;
                while matches!(chars.get(i), Some('a'..='z' | 'A'..='Z' | '0'..='9' | '_')) {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => {
                return Err(ExpressionError::Syntax(format!(
                    "unexpected character: '{other}'"
                )))
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_split_int_and_float() {
        assert_eq!(
            tokenize("1 2.5 3e2").unwrap(),
            vec![Token::Int(1), Token::Float(2.5), Token::Float(300.0)]
        );
    }

    #[test]
    fn two_char_operators() {
        assert_eq!(
            tokenize("** // == != <= >=").unwrap(),
            vec![
                Token::DoubleStar,
                Token::DoubleSlash,
                Token::Eq,
                Token::Ne,
                Token::Le,
                Token::Ge
            ]
        );
    }

    #[test]
    fn string_literals_both_quotes() {
        assert_eq!(
            tokenize(r#"'a' "b c""#).unwrap(),
            vec![Token::Str("a".into()), Token::Str("b c".into())]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(tokenize("'oops").is_err());
    }

    #[test]
    fn bare_assignment_is_rejected() {
        assert!(tokenize("x = 1").is_err());
    }
}
