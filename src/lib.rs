//! nanotemplate is a tiny logic-less template engine.  Templates are plain
//! strings with `{{…}}` tags in them; rendering substitutes values from a
//! hierarchical data context and nothing else.  There are no expressions,
//! filters or template files — the engine is one pure function from a
//! template string and a context to an output string.
//!
//! ```html
//! <h1>Hello, {{user.name}}!</h1>
//! {{#each items}}<li>{{title}}</li>{{else}}<p>nothing here</p>{{/each}}
//! ```
//!
//! # Template Usage
//!
//! Build a context with the [`context!`] macro (or [`Value::from_serialize`]
//! for anything serde can serialize) and call [`render`]:
//!
//! ```
//! use nanotemplate::{context, render};
//!
//! let ctx = context! {
//!     name => "World",
//!     items => vec!["a", "b"],
//! };
//! let out = render("Hello {{name}}! {{#each items}}[{{value}}]{{/each}}", &ctx).unwrap();
//! assert_eq!(out, "Hello World! [a][b]");
//! ```
//!
//! # Tag Syntax
//!
//! * `{{path}}` — emit the value at a dot separated path, HTML escaped.
//!   Paths that resolve to nothing emit the empty string.
//! * `{{{path}}}` — the same, but without escaping.  Raw tags may only
//!   contain a path, never block control.
//! * `{{#each expr}} … {{/each}}` — iterate a sequence.  Every iteration
//!   renders the body against a fresh context derived from the element
//!   (its own keys if it is a map, otherwise a single `value` key) plus a
//!   zero based `@index`.  The derived context does not fall back to the
//!   enclosing scope.
//! * `{{#if expr}} … {{/if}}` and `{{#unless expr}} … {{/unless}}` —
//!   conditional rendering against the unchanged outer context.  Undefined,
//!   null, `false`, numeric zero and the empty string are falsy; everything
//!   else, including empty sequences, is truthy.
//! * `{{else}}` — optional alternative segment inside any block body.
//!
//! # Error Handling
//!
//! Malformed templates (unclosed tags or blocks, unknown directives, stray
//! `{{else}}` or closing tags, block control inside raw tags) fail the whole
//! render with an [`Error`]; no partial output is produced.  Missing data
//! is not an error.
//!
//! # Retrieval is not included
//!
//! Fetching template text, fetching a JSON data source and displaying the
//! result are the caller's concern.  With the `json` feature (on by
//! default) [`Value::from_json`] turns an already retrieved JSON document
//! into a context.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

mod error;
mod lexer;
mod macros;
mod render;
mod utils;

pub mod value;

pub use self::error::{Error, ErrorKind};
pub use self::render::render;
pub use self::value::Value;
