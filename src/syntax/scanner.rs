//! Go token scanner over printed declaration text.
//!
//! Used to retokenize the printer's output independently of the tree the
//! text was printed from. Only token boundaries matter here, so operators
//! are returned one character at a time and literal values are not decoded.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind
{
    Ident,
    Keyword,
    Number,
    Char,
    String,
    Comment,
    Operator,
}

/// A token and its byte offset in the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a>
{
    pub kind: TokenKind,
    pub offset: usize,
    pub text: &'a str,
}

const KEYWORDS: [&str; 25] = [
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

pub fn is_keyword(word: &str) -> bool
{
    KEYWORDS.contains(&word)
}

fn is_letter(c: char) -> bool
{
    c == '_' || c.is_alphabetic()
}

fn is_ident_char(c: char) -> bool
{
    is_letter(c) || c.is_numeric()
}

pub struct Scanner<'a>
{
    src: &'a str,
    offset: usize,
}

impl<'a> Scanner<'a>
{
    pub fn new(src: &'a str) -> Self
    {
        Self { src, offset: 0 }
    }

    /// Identifier tokens only, in source order.
    pub fn idents(src: &'a str) -> impl Iterator<Item = Token<'a>>
    {
        Scanner::new(src).filter(|t| t.kind == TokenKind::Ident)
    }

    fn rest(&self) -> &'a str
    {
        &self.src[self.offset..]
    }

    fn first(&self) -> Option<char>
    {
        self.rest()
            .chars()
            .next()
    }

    fn second(&self) -> Option<char>
    {
        self.rest()
            .chars()
            .nth(1)
    }

    fn bump(&mut self) -> Option<char>
    {
        let c = self.first()?;
        self.offset += c.len_utf8();
        Some(c)
    }

    fn bump_while(
        &mut self,
        mut f: impl FnMut(char) -> bool,
    )
    {
        while let Some(c) = self.first()
        {
            if !f(c)
            {
                break;
            }
            self.offset += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self)
    {
        self.bump_while(|c| matches!(c, ' ' | '\t' | '\n' | '\r'));
    }

    fn word(
        &mut self,
        start: usize,
    ) -> TokenKind
    {
        self.bump_while(is_ident_char);
        if is_keyword(&self.src[start..self.offset])
        {
            TokenKind::Keyword
        }
        else
        {
            TokenKind::Ident
        }
    }

    // Decimal, hex, octal and binary literals, with exponents and `_`
    // separators. A trailing `i` marks an imaginary literal.
    fn number(&mut self) -> TokenKind
    {
        let hex = self
            .rest()
            .starts_with("0x")
            || self
                .rest()
                .starts_with("0X");
        if hex
        {
            self.offset += 2;
        }

        while let Some(c) = self.first()
        {
            let exponent = if hex { matches!(c, 'p' | 'P') } else { matches!(c, 'e' | 'E') };
            if exponent
            {
                self.bump();
                if matches!(self.first(), Some('+' | '-'))
                {
                    self.bump();
                }
            }
            else if c.is_ascii_alphanumeric() || c == '_' || c == '.'
            {
                self.bump();
            }
            else
            {
                break;
            }
        }

        TokenKind::Number
    }

    // Interpreted string or rune literal. Ends at the closing quote, at an
    // unescaped newline, or at end of input.
    fn quoted(
        &mut self,
        quote: char,
    )
    {
        self.bump();
        while let Some(c) = self.first()
        {
            match c
            {
                '\\' =>
                {
                    self.bump();
                    self.bump();
                }
                '\n' => break,
                c if c == quote =>
                {
                    self.bump();
                    break;
                }
                _ =>
                {
                    self.bump();
                }
            }
        }
    }

    fn raw_string(&mut self)
    {
        self.bump();
        match self
            .rest()
            .find('`')
        {
            Some(end) => self.offset += end + 1,
            None => self.offset = self.src.len(),
        }
    }

    fn line_comment(&mut self)
    {
        match self
            .rest()
            .find('\n')
        {
            Some(end) => self.offset += end,
            None => self.offset = self.src.len(),
        }
    }

    fn block_comment(&mut self)
    {
        self.offset += 2;
        match self
            .rest()
            .find("*/")
        {
            Some(end) => self.offset += end + 2,
            None => self.offset = self.src.len(),
        }
    }
}

impl<'a> Iterator for Scanner<'a>
{
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>>
    {
        self.skip_whitespace();

        let start = self.offset;
        let c = self.first()?;

        let kind = match c
        {
            c if is_letter(c) => self.word(start),
            '0'..='9' => self.number(),
            '.' if self
                .second()
                .is_some_and(|d| d.is_ascii_digit()) =>
            {
                self.number()
            }
            '"' =>
            {
                self.quoted('"');
                TokenKind::String
            }
            '\'' =>
            {
                self.quoted('\'');
                TokenKind::Char
            }
            '`' =>
            {
                self.raw_string();
                TokenKind::String
            }
            '/' if self.second() == Some('/') =>
            {
                self.line_comment();
                TokenKind::Comment
            }
            '/' if self.second() == Some('*') =>
            {
                self.block_comment();
                TokenKind::Comment
            }
            _ =>
            {
                self.bump();
                TokenKind::Operator
            }
        };

        Some(Token { kind, offset: start, text: &self.src[start..self.offset] })
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn idents(src: &str) -> Vec<&str>
    {
        Scanner::idents(src)
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn keywords_are_not_identifiers()
    {
        assert_eq!(idents("type A struct {\n    X int\n}"), ["A", "X", "int"]);
        assert_eq!(idents("func (a *A) Get() (int, error)"), ["a", "A", "Get", "int", "error"]);
    }

    #[test]
    fn literals_and_comments_hide_their_contents()
    {
        let src = r#"var X = "not an ident" + `raw
still raw` /* block ident */ + 'y' // trailing ident"#;
        assert_eq!(idents(src), ["X"]);
    }

    #[test]
    fn offsets_point_at_token_start()
    {
        let src = "const Größe = 1";
        let toks: Vec<_> = Scanner::new(src).collect();
        assert_eq!(toks[1].kind, TokenKind::Ident);
        assert_eq!(toks[1].text, "Größe");
        assert_eq!(&src[toks[1].offset..], "Größe = 1");
    }

    #[test]
    fn hex_digits_do_not_swallow_following_identifier()
    {
        assert_eq!(idents("0x1e+a"), ["a"]);
        assert_eq!(idents("1e+9 + b"), ["b"]);
        assert_eq!(idents("0x1p-2i"), Vec::<&str>::new());
    }

    #[test]
    fn escaped_quotes_stay_inside_literals()
    {
        assert_eq!(idents(r#""a\"b" + c + '\'' + d"#), ["c", "d"]);
    }

    #[test]
    fn unterminated_literals_end_at_input_end()
    {
        assert_eq!(idents("x /* never closed y"), ["x"]);
        assert_eq!(idents("x `never closed y"), ["x"]);
        let last = Scanner::new("x \"open").last();
        assert_eq!(last.map(|t| t.kind), Some(TokenKind::String));
    }
}
