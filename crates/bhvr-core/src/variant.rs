//! Template variant naming
//!
//! A slot's variants live next to each other in the template store and are
//! told apart by a `-with-<options>` suffix spliced in before the extension:
//!
//! ```text
//! App.tsx + {shadcn, rpc}   -> App-with-rpc-shadcn.tsx
//! README  + {tailwind}      -> README-with-tailwind
//! ```
//!
//! [`variant_name`] is the only place such names are built.

use std::collections::BTreeSet;

/// Resolve the variant file name for `base` under the given active options.
///
/// Option names are lowercased, deduplicated and sorted before joining, so
/// the result does not depend on the order they are passed in. An empty set
/// returns `base` unchanged.
pub fn variant_name<I, S>(base: &str, options: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let keys: BTreeSet<String> = options
        .into_iter()
        .map(|o| o.as_ref().to_lowercase())
        .filter(|o| !o.is_empty())
        .collect();

    if keys.is_empty() {
        return base.to_string();
    }

    let suffix = keys.into_iter().collect::<Vec<_>>().join("-");
    match base.rfind('.') {
        Some(dot) => format!("{}-with-{}{}", &base[..dot], suffix, &base[dot..]),
        None => format!("{}-with-{}", base, suffix),
    }
}
