// diff.rs — Unified diff rendering for edit previews and results.
//
// The diff always compares the file as read against the file as it will be
// written, so an edit that changes nothing renders an empty hunk list.

use similar::TextDiff;

/// Lines of unchanged context around each hunk.
pub const CONTEXT_LINES: usize = 3;

/// Render a unified diff between two line sets, labelled with `path` on both
/// sides and fenced as a markdown `diff` block.
pub fn render_unified_diff(path: &str, original: &[String], modified: &[String]) -> String {
    let before = join_lines(original);
    let after = join_lines(modified);

    let body = TextDiff::from_lines(&before, &after)
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .header(path, path)
        .to_string();

    format!("```diff\n{body}```")
}

// Every line gets a terminator so similar never emits "\ No newline" markers.
fn join_lines(lines: &[String]) -> String {
    let mut out = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}
