//! Typeahead suggestions derived from the items that match a partial query.

use std::collections::BTreeMap;

use crate::model::{NewsItem, Suggestion, SuggestionKind};

/// Default cap on the number of suggestions returned.
pub const MAX_SUGGESTIONS: usize = 8;

/// Titles containing the partial text first (as query hints), then the
/// categories of `items` and the tags containing the partial text, each with
/// its item count. `items` is expected to be the remote match set already.
pub fn derive_suggestions(partial: &str, items: &[NewsItem], limit: usize) -> Vec<Suggestion> {
    let needle = partial.trim().to_lowercase();
    if needle.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut out: Vec<Suggestion> = Vec::new();
    for n in items {
        if n.title.to_lowercase().contains(&needle)
            && !out.iter().any(|s| s.text.eq_ignore_ascii_case(&n.title))
        {
            out.push(Suggestion {
                text: n.title.clone(),
                kind: SuggestionKind::Query,
                count: None,
            });
        }
    }
    out.truncate(limit / 2 + 1);

    let mut categories: BTreeMap<String, usize> = BTreeMap::new();
    let mut tags: BTreeMap<String, usize> = BTreeMap::new();
    for n in items {
        *categories.entry(n.category.to_lowercase()).or_default() += 1;
        for t in &n.tags {
            if t.to_lowercase().contains(&needle) {
                *tags.entry(t.to_lowercase()).or_default() += 1;
            }
        }
    }

    let mut counted: Vec<(String, usize, SuggestionKind)> = categories
        .into_iter()
        .map(|(k, c)| (k, c, SuggestionKind::Category))
        .chain(tags.into_iter().map(|(k, c)| (k, c, SuggestionKind::Tag)))
        .collect();
    // Highest count first; BTreeMap order keeps ties alphabetical.
    counted.sort_by(|a, b| b.1.cmp(&a.1));

    for (text, count, kind) in counted {
        if out.len() >= limit {
            break;
        }
        out.push(Suggestion {
            text,
            kind,
            count: Some(count),
        });
    }
    out
}
