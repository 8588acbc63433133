use std::collections::BTreeMap;

use crate::error::{Error, ErrorKind};
use crate::lexer::{Directive, Span, Token, Tokenizer};
use crate::utils::HtmlEscape;
use crate::value::Value;

/// Nesting ceiling so that hostile templates cannot exhaust the call stack.
const MAX_DEPTH: usize = 64;

/// Renders a template against a context.
///
/// This is the only substitution entry point.  The template is walked left
/// to right; literal text is copied verbatim, `{{path}}` placeholders emit
/// the HTML escaped value at that dot path (`{{{path}}}` emits it raw), and
/// `{{#each}}`/`{{#if}}`/`{{#unless}}` blocks render their body or their
/// `{{else}}` segment.  Paths that resolve to nothing emit the empty string.
///
/// ```
/// use nanotemplate::{context, render};
///
/// let ctx = context! { name => "<Peter>" };
/// let rv = render("Hello {{name}}!", &ctx).unwrap();
/// assert_eq!(rv, "Hello &lt;Peter&gt;!");
/// ```
///
/// On a syntax error the whole render fails; no partial output is returned.
pub fn render(source: &str, ctx: &Value) -> Result<String, Error> {
    let mut out = String::with_capacity(source.len());
    render_range(source, 0, source.len(), ctx, 0, &mut out)?;
    Ok(out)
}

/// A matched block: the body segments and where to resume scanning.
struct Block {
    body: (usize, usize),
    else_body: (usize, usize),
    resume: usize,
}

fn render_range(
    source: &str,
    start: usize,
    end: usize,
    ctx: &Value,
    depth: usize,
    out: &mut String,
) -> Result<(), Error> {
    if depth > MAX_DEPTH {
        return Err(Error::new(
            ErrorKind::TooDeeplyNested,
            format!("more than {} nested blocks", MAX_DEPTH),
        )
        .with_line(source, start));
    }

    let mut tokens = Tokenizer::new(source, start, end);
    while let Some((token, span)) = tokens.next_token()? {
        match token {
            Token::Text(text) => out.push_str(text),
            Token::Escaped(path) => {
                let value = ctx.get_path(path);
                match value.as_str() {
                    Some(s) => out.push_str(&HtmlEscape(s).to_string()),
                    None => out.push_str(&value.to_string()),
                }
            }
            Token::Raw(path) => {
                let value = ctx.get_path(path);
                match value.as_str() {
                    Some(s) => out.push_str(s),
                    None => out.push_str(&value.to_string()),
                }
            }
            Token::BlockOpen { directive, expr } => {
                let block = match_block(source, span, end, directive)?;
                eval_block(source, directive, expr, &block, ctx, depth, out)?;
                tokens.jump(block.resume);
            }
            Token::BlockClose(name) => {
                return Err(Error::new(
                    ErrorKind::UnexpectedCloseTag,
                    format!("`{{{{/{}}}}}` has no matching open block", name),
                )
                .with_line(source, span.start));
            }
            Token::Else => {
                return Err(
                    Error::new(ErrorKind::UnexpectedElse, "`{{else}}` outside of a block")
                        .with_line(source, span.start),
                );
            }
        }
    }
    Ok(())
}

/// Locates the closing tag of a block and splits its body at a top level
/// `{{else}}`.
///
/// Matching is depth aware: nested blocks of any directive (including the
/// same one) are tracked on a stack, so `{{#each}}` inside `{{#each}}`
/// closes correctly and an `{{else}}` belonging to an inner block is not
/// mistaken for the outer split point.
fn match_block(source: &str, open: Span, end: usize, directive: Directive) -> Result<Block, Error> {
    let mut tokens = Tokenizer::new(source, open.end, end);
    let mut stack: Vec<Directive> = Vec::new();
    let mut else_tag: Option<Span> = None;

    while let Some((token, span)) = tokens.next_token()? {
        match token {
            Token::BlockOpen { directive, .. } => stack.push(directive),
            Token::BlockClose(name) => match stack.last() {
                Some(&inner) => {
                    if name == inner.name() {
                        stack.pop();
                    } else {
                        return Err(Error::new(
                            ErrorKind::UnexpectedCloseTag,
                            format!(
                                "`{{{{/{}}}}}` closes a `{{{{#{}}}}}` block",
                                name, inner
                            ),
                        )
                        .with_line(source, span.start));
                    }
                }
                None => {
                    if name != directive.name() {
                        return Err(Error::new(
                            ErrorKind::UnexpectedCloseTag,
                            format!(
                                "`{{{{/{}}}}}` closes a `{{{{#{}}}}}` block",
                                name, directive
                            ),
                        )
                        .with_line(source, span.start));
                    }
                    let (body_end, else_body) = match else_tag {
                        Some(tag) => (tag.start, (tag.end, span.start)),
                        None => (span.start, (span.start, span.start)),
                    };
                    return Ok(Block {
                        body: (open.end, body_end),
                        else_body,
                        resume: span.end,
                    });
                }
            },
            Token::Else if stack.is_empty() => {
                if else_tag.is_some() {
                    return Err(Error::new(
                        ErrorKind::UnexpectedElse,
                        format!("second `{{{{else}}}}` in `{{{{#{}}}}}` block", directive),
                    )
                    .with_line(source, span.start));
                }
                else_tag = Some(span);
            }
            _ => {}
        }
    }

    Err(Error::new(
        ErrorKind::UnclosedBlock,
        format!("`{{{{#{}}}}}` block was never closed", directive),
    )
    .with_line(source, open.start))
}

fn eval_block(
    source: &str,
    directive: Directive,
    expr: &str,
    block: &Block,
    ctx: &Value,
    depth: usize,
    out: &mut String,
) -> Result<(), Error> {
    let value = ctx.get_path(expr);
    let (body, else_body) = (block.body, block.else_body);
    match directive {
        Directive::Each => match value.as_seq() {
            Some(items) if !items.is_empty() => {
                for (index, item) in items.iter().enumerate() {
                    let scope = derived_context(item, index);
                    render_range(source, body.0, body.1, &scope, depth + 1, out)?;
                }
                Ok(())
            }
            // absent, not a sequence, or empty: the else segment renders
            // against the unmodified outer context
            _ => render_range(source, else_body.0, else_body.1, ctx, depth + 1, out),
        },
        Directive::If | Directive::Unless => {
            let mut truthy = value.is_true();
            if directive == Directive::Unless {
                truthy = !truthy;
            }
            let segment = if truthy { body } else { else_body };
            render_range(source, segment.0, segment.1, ctx, depth + 1, out)
        }
    }
}

/// Builds the per iteration context for `{{#each}}`.
///
/// A map element contributes its own keys; any other element is exposed as
/// `value`.  Both get a zero based `@index`.  The derived context does not
/// inherit keys from the enclosing one.
fn derived_context(item: &Value, index: usize) -> Value {
    let mut scope = match item {
        Value::Map(entries) => entries.clone(),
        _ => {
            let mut scope = BTreeMap::new();
            scope.insert("value".to_owned(), item.clone());
            scope
        }
    };
    scope.insert("@index".to_owned(), Value::U64(index as u64));
    Value::Map(scope)
}

#[cfg(test)]
mod tests {
    use super::*;

    use similar_asserts::assert_eq;

    #[test]
    fn test_derived_context_is_flat() {
        let item = Value::from("x");
        let scope = derived_context(&item, 3);
        assert_eq!(scope.get_path("value").as_str(), Some("x"));
        assert_eq!(scope.get_path("@index"), &Value::U64(3));
        assert!(scope.get_path("anything_else").is_undefined());
    }

    #[test]
    fn test_depth_limit() {
        let mut source = String::new();
        for _ in 0..(MAX_DEPTH + 2) {
            source.push_str("{{#if x}}");
        }
        source.push('y');
        for _ in 0..(MAX_DEPTH + 2) {
            source.push_str("{{/if}}");
        }
        let ctx = crate::context! { x => true };
        let err = render(&source, &ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TooDeeplyNested);
    }
}
