use std::fmt;

use crate::error::{Error, ErrorKind};

/// Byte offsets of a token within the template source.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " @ {}..{}", self.start, self.end)
    }
}

/// The block directives the engine knows about.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Directive {
    Each,
    If,
    Unless,
}

impl Directive {
    pub fn from_name(name: &str) -> Option<Directive> {
        match name {
            "each" => Some(Directive::Each),
            "if" => Some(Directive::If),
            "unless" => Some(Directive::Unless),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Directive::Each => "each",
            Directive::If => "if",
            Directive::Unless => "unless",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Represents a token in the template stream.
#[derive(Debug, PartialEq, Eq)]
pub enum Token<'a> {
    /// Raw template data between tags.
    Text(&'a str),
    /// An escaped placeholder (`{{path}}`).
    Escaped(&'a str),
    /// A raw placeholder (`{{{path}}}`).
    Raw(&'a str),
    /// A block-open tag (`{{#directive expr}}`).
    BlockOpen { directive: Directive, expr: &'a str },
    /// A block-close tag (`{{/name}}`), name not yet validated.
    BlockClose(&'a str),
    /// The `{{else}}` separator.
    Else,
}

/// Tokenizes a template within the byte range `offset..end`.
///
/// The tokenizer always operates on the full source string so that spans
/// stay absolute and errors can be reported with real line numbers even
/// when a block body deep inside the template is being scanned.
pub struct Tokenizer<'s> {
    source: &'s str,
    offset: usize,
    end: usize,
    failed: bool,
}

impl<'s> Tokenizer<'s> {
    pub fn new(source: &'s str, offset: usize, end: usize) -> Tokenizer<'s> {
        Tokenizer {
            source,
            offset,
            end,
            failed: false,
        }
    }

    /// Moves the scan cursor, used to skip past an already consumed block.
    pub fn jump(&mut self, offset: usize) {
        self.offset = offset;
    }

    pub fn next_token(&mut self) -> Result<Option<(Token<'s>, Span)>, Error> {
        if self.failed || self.offset >= self.end {
            return Ok(None);
        }
        let rest = &self.source[self.offset..self.end];
        match rest.find("{{") {
            None => {
                let span = Span {
                    start: self.offset,
                    end: self.end,
                };
                self.offset = self.end;
                Ok(Some((Token::Text(rest), span)))
            }
            Some(0) => self.tokenize_tag().map_err(|err| {
                self.failed = true;
                err
            }),
            Some(idx) => {
                let span = Span {
                    start: self.offset,
                    end: self.offset + idx,
                };
                self.offset += idx;
                Ok(Some((Token::Text(&rest[..idx]), span)))
            }
        }
    }

    fn tokenize_tag(&mut self) -> Result<Option<(Token<'s>, Span)>, Error> {
        let start = self.offset;
        let rest = &self.source[start..self.end];

        if rest.starts_with("{{{") {
            let inner = match rest[3..].find("}}}") {
                Some(idx) => &rest[3..3 + idx],
                None => return Err(self.syntax_error(ErrorKind::UnclosedTag, start)),
            };
            let span = Span {
                start,
                end: start + 3 + inner.len() + 3,
            };
            let body = inner.trim();
            if body.starts_with('#') || body.starts_with('/') || body == "else" {
                return Err(Error::new(
                    ErrorKind::InvalidRawTag,
                    format!("raw tags may only contain a path, got `{}`", body),
                )
                .with_line(self.source, start));
            }
            self.offset = span.end;
            return Ok(Some((Token::Raw(body), span)));
        }

        let inner = match rest[2..].find("}}") {
            Some(idx) => &rest[2..2 + idx],
            None => return Err(self.syntax_error(ErrorKind::UnclosedTag, start)),
        };
        let span = Span {
            start,
            end: start + 2 + inner.len() + 2,
        };
        self.offset = span.end;

        let body = inner.trim();
        let token = if let Some(stmt) = body.strip_prefix('#') {
            let mut parts = stmt.splitn(2, char::is_whitespace);
            let name = parts.next().unwrap_or("");
            let expr = parts.next().unwrap_or("").trim();
            match Directive::from_name(name) {
                Some(directive) => Token::BlockOpen { directive, expr },
                None => {
                    return Err(Error::new(
                        ErrorKind::UnknownDirective,
                        format!("`{}` is not a known block directive", name),
                    )
                    .with_line(self.source, start));
                }
            }
        } else if let Some(name) = body.strip_prefix('/') {
            Token::BlockClose(name)
        } else if body == "else" {
            Token::Else
        } else {
            Token::Escaped(body)
        };
        Ok(Some((token, span)))
    }

    fn syntax_error(&self, kind: ErrorKind, offset: usize) -> Error {
        let tail = &self.source[offset..self.end];
        let preview = tail.get(..tail.len().min(16)).unwrap_or(tail);
        Error::new(kind, format!("no closing delimiter for `{}`", preview))
            .with_line(self.source, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use similar_asserts::assert_eq;

    fn tokenize(source: &str) -> Result<Vec<Token<'_>>, Error> {
        let mut tokens = Tokenizer::new(source, 0, source.len());
        let mut rv = Vec::new();
        while let Some((token, _)) = tokens.next_token()? {
            rv.push(token);
        }
        Ok(rv)
    }

    #[test]
    fn test_basic_stream() {
        let tokens = tokenize("Hello {{name}}!").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Text("Hello "),
                Token::Escaped("name"),
                Token::Text("!"),
            ]
        );
    }

    #[test]
    fn test_block_tags() {
        let tokens = tokenize("{{#each items}}x{{else}}y{{/each}}").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::BlockOpen {
                    directive: Directive::Each,
                    expr: "items",
                },
                Token::Text("x"),
                Token::Else,
                Token::Text("y"),
                Token::BlockClose("each"),
            ]
        );
    }

    #[test]
    fn test_raw_tag() {
        let tokens = tokenize("{{{ html }}}").unwrap();
        assert_eq!(tokens, vec![Token::Raw("html")]);
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let tokens = tokenize("{{  user.name  }}{{#if   flag  }}{{/if}}").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Escaped("user.name"),
                Token::BlockOpen {
                    directive: Directive::If,
                    expr: "flag",
                },
                Token::BlockClose("if"),
            ]
        );
    }

    #[test]
    fn test_spans_are_absolute() {
        let source = "ab{{x}}cd";
        let mut tokens = Tokenizer::new(source, 0, source.len());
        let (_, text_span) = tokens.next_token().unwrap().unwrap();
        assert_eq!((text_span.start, text_span.end), (0, 2));
        let (_, tag_span) = tokens.next_token().unwrap().unwrap();
        assert_eq!((tag_span.start, tag_span.end), (2, 7));
    }

    #[test]
    fn test_unclosed_tag() {
        let err = tokenize("hello {{name").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnclosedTag);
        let err = tokenize("{{{raw").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnclosedTag);
    }

    #[test]
    fn test_unknown_directive() {
        let err = tokenize("{{#with user}}{{/with}}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownDirective);
        assert_eq!(
            err.to_string(),
            "unknown directive: `with` is not a known block directive (on line 1)"
        );
    }

    #[test]
    fn test_raw_tag_with_control_content() {
        for source in ["{{{#each items}}}", "{{{/each}}}", "{{{else}}}"] {
            let err = tokenize(source).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidRawTag);
        }
    }

    #[test]
    fn test_error_line_numbers() {
        let err = tokenize("line one\nline two {{#bogus x}}").unwrap_err();
        assert_eq!(err.line(), Some(2));
    }
}
