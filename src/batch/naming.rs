//! Archive entry naming.

use std::collections::HashSet;

/// Marker appended to the stem of translated outputs.
pub const TRANSLATED_SUFFIX: &str = "-(translate)";

/// Split `name` into stem and extension (with the dot).
///
/// A leading dot does not start an extension, so `.hidden` has none.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    }
}

/// Entry name for the translated version of `original`.
///
/// The translated image is always PNG: `page.jpg` becomes
/// `page-(translate).png`.
pub fn translated_name(original: &str) -> String {
    let (stem, _) = split_extension(original);
    format!("{stem}{TRANSLATED_SUFFIX}.png")
}

/// Make names unique, keeping the first occurrence of each as-is.
///
/// Later duplicates get `-1`, `-2`, ... inserted before the extension,
/// skipping any candidate that is already taken.
///
/// # Example
///
/// ```
/// use sheetpack::batch::unique_names;
///
/// let names = unique_names(["a.png", "a.png", "a-1.png", "a.png"]);
/// assert_eq!(names, vec!["a.png", "a-1.png", "a-1-1.png", "a-2.png"]);
/// ```
pub fn unique_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut used: HashSet<String> = HashSet::new();
    let mut result = Vec::new();

    for name in names {
        let name = name.as_ref();
        let unique = if used.contains(name) {
            let (stem, extension) = split_extension(name);
            (1u64..)
                .map(|n| format!("{stem}-{n}{extension}"))
                .find(|candidate| !used.contains(candidate))
                .unwrap_or_else(|| name.to_string())
        } else {
            name.to_string()
        };

        used.insert(unique.clone());
        result.push(unique);
    }

    result
}
