/// Rewrite every `/` and `\` in `path` to `separator`.
///
/// Doubled separators are kept as they are.
pub fn normalize_separators(path: &str, separator: char) -> String {
    path.chars()
        .map(|c| if c == '/' || c == '\\' { separator } else { c })
        .collect()
}

/// Join segments with `separator`, keeping empty segments.
pub fn join_segments<'a>(separator: char, segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut joined = String::new();
    for (i, segment) in segments.into_iter().enumerate() {
        if i > 0 {
            joined.push(separator);
        }
        joined.push_str(segment);
    }
    joined
}
