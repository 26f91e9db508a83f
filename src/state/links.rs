//! Link index: mapping display lines to link targets.
//!
//! The transform stage emits inline markers of the form
//! `[display text](absolute-target)` anywhere in a line. The index records
//! the first marker per line; additional markers on the same visual line
//! are ignored (documented limitation, not silently merged). Targets are
//! assumed already absolutized by the transform stage.

use std::collections::BTreeMap;

/// A single indexed link: visible text plus its target reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    /// The text shown on the display line.
    pub text: String,
    /// The absolute reference the link points at.
    pub target: String,
}

/// Mapping from display line number to the line's link, built once per
/// content buffer.
#[derive(Debug, Clone, Default)]
pub struct LinkIndex {
    entries: BTreeMap<usize, LinkEntry>,
}

impl LinkIndex {
    /// Scan `lines` for inline link markers. Pure, O(total characters).
    pub fn build(lines: &[String]) -> Self {
        let mut entries = BTreeMap::new();
        for (number, line) in lines.iter().enumerate() {
            if let Some(parts) = split_marker(line) {
                entries.insert(
                    number,
                    LinkEntry {
                        text: parts.text.to_string(),
                        target: parts.target.to_string(),
                    },
                );
            }
        }
        Self { entries }
    }

    /// Link on `line`, if any.
    pub fn get(&self, line: usize) -> Option<&LinkEntry> {
        self.entries.get(&line)
    }

    /// Number of indexed lines.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no links.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A line split around its first inline link marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerParts<'a> {
    /// Text before the marker.
    pub before: &'a str,
    /// The link's display text.
    pub text: &'a str,
    /// The link's target reference.
    pub target: &'a str,
    /// Text after the marker.
    pub after: &'a str,
}

/// Locate the first well-formed `[text](target)` marker in a line.
///
/// Both the text and the target must be non-empty. Stray brackets that do
/// not form a complete marker are left alone: the text runs to the first
/// `]` after the opening bracket, and that `]` must be immediately
/// followed by `(` or the candidate is rejected and the scan resumes.
pub fn split_marker(line: &str) -> Option<MarkerParts<'_>> {
    let mut from = 0;
    while let Some(rel) = line[from..].find('[') {
        let open = from + rel;
        let rest = &line[open + 1..];
        if let Some(close) = rest.find(']') {
            if rest[close..].starts_with("](") {
                let text = &rest[..close];
                let tail = &rest[close + 2..];
                if let Some(end) = tail.find(')') {
                    let target = &tail[..end];
                    if !text.is_empty() && !target.is_empty() {
                        return Some(MarkerParts {
                            before: &line[..open],
                            text,
                            target,
                            after: &tail[end + 1..],
                        });
                    }
                }
            }
        }
        from = open + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn build_indexes_marked_lines_only() {
        let index = LinkIndex::build(&lines(&[
            "plain text",
            "see [docs](http://x/y) for more",
            "also plain",
        ]));
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.get(1),
            Some(&LinkEntry {
                text: "docs".to_string(),
                target: "http://x/y".to_string()
            })
        );
        assert_eq!(index.get(0), None);
        assert_eq!(index.get(2), None);
    }

    #[test]
    fn first_marker_per_line_wins() {
        let index = LinkIndex::build(&lines(&[
            "[one](http://a) and [two](http://b)",
        ]));
        let entry = index.get(0).expect("line indexed");
        assert_eq!(entry.text, "one");
        assert_eq!(entry.target, "http://a");
    }

    #[test]
    fn empty_text_or_target_is_not_a_marker() {
        assert!(split_marker("[](http://a)").is_none());
        assert!(split_marker("[text]()").is_none());
        assert!(split_marker("no marker here").is_none());
    }

    #[test]
    fn marker_text_never_spans_a_closing_bracket() {
        let index = LinkIndex::build(&lines(&["see [1] then [real](http://x)"]));
        let entry = index.get(0).expect("line indexed");
        assert_eq!(entry.text, "real");
        assert_eq!(entry.target, "http://x");

        // A bracket pair with no following paren is not the marker either.
        let parts = split_marker("[one] [two](http://t)").expect("marker found");
        assert_eq!(parts.text, "two");
        assert_eq!(parts.before, "[one] ");
    }

    #[test]
    fn stray_brackets_are_skipped() {
        let parts = split_marker("see [1] then [real](http://x)").expect("marker found");
        assert_eq!(parts.text, "real");
        assert_eq!(parts.target, "http://x");
        assert_eq!(parts.before, "see [1] then ");
        assert_eq!(parts.after, "");
    }

    #[test]
    fn split_preserves_surrounding_text() {
        let parts = split_marker("a [b](c) d").expect("marker found");
        assert_eq!(parts.before, "a ");
        assert_eq!(parts.text, "b");
        assert_eq!(parts.target, "c");
        assert_eq!(parts.after, " d");
    }

    #[test]
    fn multibyte_text_splits_cleanly() {
        let parts = split_marker("voir [ré sumé](http://x/é) ici").expect("marker found");
        assert_eq!(parts.text, "ré sumé");
        assert_eq!(parts.target, "http://x/é");
    }
}
