use std::collections::VecDeque;

/// Line-oriented tokenizer for library files. Tokens are split on
/// whitespace; `#` outside a string starts a comment running to the end of
/// the line; a trailing `;` is split off into its own token so the parser
/// can uniformly require terminators. End of file is sticky.
pub(crate) struct Lexer<'a> {
    lines: std::str::Lines<'a>,
    line_number: usize,
    tokens: VecDeque<String>,
    eof: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Lexer { lines: text.lines(), line_number: 0, tokens: VecDeque::new(), eof: false }
    }

    /// The line the next token came from, for diagnostics.
    pub fn line(&self) -> usize {
        self.line_number
    }

    pub fn peek(&mut self) -> Option<&str> {
        self.fill();
        self.tokens.front().map(|token| token.as_str())
    }

    pub fn advance(&mut self) -> Option<String> {
        self.fill();
        self.tokens.pop_front()
    }

    fn fill(&mut self) {
        while self.tokens.is_empty() && !self.eof {
            match self.lines.next() {
                Some(line) => {
                    self.line_number += 1;
                    self.tokenize(line);
                }
                None => self.eof = true,
            }
        }
    }

    fn tokenize(&mut self, line: &str) {
        let mut chars = line.chars().peekable();
        loop {
            while matches!(chars.peek(), Some(chr) if chr.is_whitespace()) {
                chars.next();
            }
            match chars.peek() {
                None | Some('#') => break,
                Some('"') => {
                    let mut token = String::new();
                    token.push(chars.next().unwrap());
                    while let Some(chr) = chars.next() {
                        token.push(chr);
                        if chr == '"' {
                            break;
                        }
                    }
                    self.push_token(token);
                }
                Some(_) => {
                    let mut token = String::new();
                    while let Some(&chr) = chars.peek() {
                        if chr.is_whitespace() || chr == '#' {
                            break;
                        }
                        token.push(chr);
                        chars.next();
                    }
                    self.push_token(token);
                }
            }
        }
    }

    fn push_token(&mut self, token: String) {
        if token.len() > 1 && token.ends_with(';') {
            self.tokens.push_back(token[..token.len() - 1].to_owned());
            self.tokens.push_back(";".to_owned());
        } else {
            self.tokens.push_back(token);
        }
    }
}
