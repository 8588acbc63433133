use std::fmt;

/// Helper to HTML escape a string.
///
/// Replaces the five markup metacharacters `&`, `<`, `>`, `"` and `'`
/// with their entity forms.  Escaping happens exactly once per render;
/// recursive block evaluation never re-escapes already emitted output.
pub struct HtmlEscape<'a>(pub &'a str);

impl fmt::Display for HtmlEscape<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut start = 0;
        for (idx, c) in self.0.char_indices() {
            let entity = match c {
                '&' => "&amp;",
                '<' => "&lt;",
                '>' => "&gt;",
                '"' => "&quot;",
                '\'' => "&#039;",
                _ => continue,
            };
            if start < idx {
                f.write_str(&self.0[start..idx])?;
            }
            f.write_str(entity)?;
            start = idx + 1;
        }
        f.write_str(&self.0[start..])
    }
}
