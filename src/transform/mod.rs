//! Transform collaborator: HTML to display lines with inline link markers.
//!
//! `html2text` renders anchors as numbered references (`[text][1]`) with a
//! trailing footnote list (`[1]: href`). This module folds the footnotes
//! back into the lines as inline `[text](absolute-target)` markers - the
//! exact shape the link index builder expects - and drops the footnote
//! lines from the output. Relative hrefs are absolutized against the
//! page's base reference, so downstream consumers never see a relative
//! target.
//!
//! At most one marker is injected per display line; further references on
//! the same line are reduced to their plain text (documented limitation of
//! the one-link-per-line index).

use crate::model::PLACEHOLDER_LINE;
use std::collections::HashMap;

/// Narrower terminals still get a readable flow.
const MIN_WRAP_WIDTH: usize = 20;

/// Convert raw HTML into display lines plus the line count.
///
/// The result is never empty: blank input produces the placeholder line.
pub fn to_display_lines(html: &str, base_reference: &str, width: usize) -> (Vec<String>, usize) {
    if html.trim().is_empty() {
        return (vec![PLACEHOLDER_LINE.to_string()], 1);
    }

    let rendered = html2text::from_read(html.as_bytes(), width.max(MIN_WRAP_WIDTH));

    let mut targets: HashMap<usize, String> = HashMap::new();
    for line in rendered.lines() {
        if let Some((number, href)) = parse_footnote(line) {
            targets
                .entry(number)
                .or_insert_with(|| absolutize(base_reference, href));
        }
    }

    let mut lines: Vec<String> = rendered
        .lines()
        .filter(|line| parse_footnote(line).is_none())
        .map(|line| rewrite_references(line, &targets))
        .collect();

    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        lines.push(PLACEHOLDER_LINE.to_string());
    }

    let count = lines.len();
    (lines, count)
}

/// Resolve `href` against the page's base reference. Falls back to the raw
/// href when the base itself does not parse.
fn absolutize(base_reference: &str, href: &str) -> String {
    reqwest::Url::parse(base_reference)
        .ok()
        .and_then(|base| base.join(href).ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| href.to_string())
}

/// Recognize a footnote line of the form `[N]: href`.
fn parse_footnote(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_start();
    let inner = trimmed.strip_prefix('[')?;
    let close = inner.find("]:")?;
    let number: usize = inner[..close].parse().ok()?;
    let href = inner[close + 2..].trim();
    if href.is_empty() {
        return None;
    }
    Some((number, href))
}

/// Replace the first resolvable `[text][N]` reference on the line with an
/// inline `[text](target)` marker; strip the numbering from the rest.
fn rewrite_references(line: &str, targets: &HashMap<usize, String>) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    let mut linked = false;

    while let Some(open) = rest.find('[') {
        match parse_reference(&rest[open..]) {
            Some((text, number, consumed)) => {
                out.push_str(&rest[..open]);
                match targets.get(&number) {
                    Some(target) if !linked && !text.is_empty() => {
                        out.push('[');
                        out.push_str(text);
                        out.push_str("](");
                        out.push_str(target);
                        out.push(')');
                        linked = true;
                    }
                    _ => out.push_str(text),
                }
                rest = &rest[open + consumed..];
            }
            None => {
                out.push_str(&rest[..open + 1]);
                rest = &rest[open + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parse a leading `[text][N]` reference. Returns the text, the footnote
/// number and the byte length consumed.
fn parse_reference(s: &str) -> Option<(&str, usize, usize)> {
    let inner = s.strip_prefix('[')?;
    let close = inner.find(']')?;
    let text = &inner[..close];
    let after = &inner[close + 1..];
    let digits_part = after.strip_prefix('[')?;
    let close2 = digits_part.find(']')?;
    let number: usize = digits_part[..close2].parse().ok()?;
    Some((text, number, 1 + close + 2 + close2 + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(pairs: &[(usize, &str)]) -> HashMap<usize, String> {
        pairs
            .iter()
            .map(|(n, url)| (*n, url.to_string()))
            .collect()
    }

    #[test]
    fn footnote_lines_parse() {
        assert_eq!(
            parse_footnote("[1]: http://example.test/docs"),
            Some((1, "http://example.test/docs"))
        );
        assert_eq!(parse_footnote("[12]: /relative"), Some((12, "/relative")));
        assert_eq!(parse_footnote("[not a number]: x"), None);
        assert_eq!(parse_footnote("plain text"), None);
        assert_eq!(parse_footnote("[1]:"), None);
    }

    #[test]
    fn first_reference_becomes_a_marker() {
        let line = "see [docs][1] and [more][2] here";
        let rewritten = rewrite_references(
            line,
            &targets(&[(1, "http://x/docs"), (2, "http://x/more")]),
        );
        assert_eq!(rewritten, "see [docs](http://x/docs) and more here");
    }

    #[test]
    fn unresolvable_reference_keeps_its_text() {
        let rewritten = rewrite_references("broken [ref][9] here", &targets(&[]));
        assert_eq!(rewritten, "broken ref here");
    }

    #[test]
    fn plain_brackets_survive() {
        let rewritten = rewrite_references("array[0] and [note]", &targets(&[(1, "http://x/")]));
        assert_eq!(rewritten, "array[0] and [note]");
    }

    #[test]
    fn empty_html_yields_the_placeholder() {
        let (lines, count) = to_display_lines("", "http://base.test/", 80);
        assert_eq!(lines, vec![PLACEHOLDER_LINE.to_string()]);
        assert_eq!(count, 1);
    }

    #[test]
    fn line_count_matches_lines() {
        let (lines, count) =
            to_display_lines("<p>one</p><p>two</p>", "http://base.test/", 80);
        assert_eq!(lines.len(), count);
        assert!(count >= 2, "two paragraphs produce at least two lines");
    }

    #[test]
    fn anchors_turn_into_absolute_markers() {
        let html = r#"<p>Read the <a href="/guide">guide</a> first.</p>"#;
        let (lines, _) = to_display_lines(html, "http://base.test/root/", 80);

        let marked: Vec<&String> = lines
            .iter()
            .filter(|l| l.contains("[guide](http://base.test/guide)"))
            .collect();
        assert_eq!(marked.len(), 1, "lines were: {lines:?}");

        assert!(
            lines.iter().all(|l| parse_footnote(l).is_none()),
            "footnote lines must be dropped: {lines:?}"
        );
    }

    #[test]
    fn absolute_hrefs_pass_through() {
        let html = r#"<a href="https://other.test/x">x</a>"#;
        let (lines, _) = to_display_lines(html, "http://base.test/", 80);
        assert!(
            lines
                .iter()
                .any(|l| l.contains("[x](https://other.test/x)")),
            "lines were: {lines:?}"
        );
    }
}
