/// Creates a template context from key/value pairs.
///
/// Keys are identifiers, values anything serializable.  A key without a
/// value captures the local variable of the same name.
///
/// ```
/// use nanotemplate::{context, render};
///
/// let name = "Peter";
/// let ctx = context! {
///     name,
///     items => vec!["a", "b"],
/// };
/// let rv = render("{{name}}: {{#each items}}{{value}} {{/each}}", &ctx).unwrap();
/// assert_eq!(rv, "Peter: a b ");
/// ```
#[macro_export]
macro_rules! context {
    () => {
        $crate::Value::Map(::std::collections::BTreeMap::new())
    };
    (
        $($key:ident $(=> $value:expr)?),* $(,)?
    ) => {{
        let mut ctx = ::std::collections::BTreeMap::new();
        $(
            $crate::__context_pair!(ctx, $key $(=> $value)?);
        )*
        $crate::Value::Map(ctx)
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! __context_pair {
    ($ctx:ident, $key:ident) => {
        $crate::__context_pair!($ctx, $key => $key)
    };
    ($ctx:ident, $key:ident => $value:expr) => {
        $ctx.insert(
            ::std::string::String::from(stringify!($key)),
            $crate::Value::from_serialize(&$value),
        );
    };
}
