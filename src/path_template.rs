//! Composition of operation paths from parent, class and method fragments.

use std::collections::BTreeMap;

/// A normalized path such as `/api/users/{id}` plus the regex constraints declared for its
/// placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTemplate {
    pub path: String,
    /// Placeholder name to regex
    pub constraints: BTreeMap<String, String>,
}

/// Combine the three fragments of an operation path.
///
/// Returns `None` when neither the class nor the method declares a path, which means the
/// method is not an operation.
pub fn resolve(
    class_path: Option<&str>,
    method_path: Option<&str>,
    parent_path: Option<&str>,
) -> Option<PathTemplate> {
    if class_path.is_none() && method_path.is_none() {
        return None;
    }

    let mut raw = String::new();
    if let Some(parent) = parent_path {
        if !parent.is_empty() && parent != "/" {
            if !parent.starts_with('/') {
                raw.push('/');
            }
            raw.push_str(parent.strip_suffix('/').unwrap_or(parent));
        }
    }
    if let Some(class) = class_path {
        raw.push_str(class);
    }
    if let Some(method) = method_path {
        if method != "/" {
            if !raw.ends_with('/') && !method.starts_with('/') {
                raw.push('/');
            }
            raw.push_str(method.strip_suffix('/').unwrap_or(method));
        }
    }

    let mut constraints = BTreeMap::new();
    let segments: Vec<String> = split_segments(&raw)
        .into_iter()
        .filter(|segment| !segment.is_empty())
        .map(|segment| normalize_segment(segment, &mut constraints))
        .collect();

    Some(PathTemplate {
        path: format!("/{}", segments.join("/")),
        constraints,
    })
}

/// Placeholder names of `raw` in order, with any `:regex` suffix dropped.
pub fn placeholders(raw: &str) -> Vec<String> {
    split_segments(raw)
        .into_iter()
        .filter_map(|segment| {
            let open = segment.find('{')?;
            let close = segment.rfind('}').filter(|close| *close > open)?;
            let inner = &segment[open + 1..close];
            let name = inner.split_once(':').map_or(inner, |(name, _)| name).trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

/// Split on `/` outside of braces.
fn split_segments(raw: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (idx, ch) in raw.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => {
                segments.push(&raw[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    segments.push(&raw[start..]);
    segments
}

/// Rewrite `{name:regex}` to `{name}`, recording the regex.
fn normalize_segment(segment: &str, constraints: &mut BTreeMap<String, String>) -> String {
    let Some(open) = segment.find('{') else {
        return segment.to_string();
    };
    let Some(close) = segment.rfind('}').filter(|close| *close > open) else {
        return segment.to_string();
    };

    let inner = &segment[open + 1..close];
    let Some((name, regex)) = inner.split_once(':') else {
        return segment.to_string();
    };
    let name = name.trim();
    if name.is_empty() {
        return segment.to_string();
    }

    constraints.insert(name.to_string(), regex.to_string());
    format!("{}{{{}}}{}", &segment[..open], name, &segment[close + 1..])
}
