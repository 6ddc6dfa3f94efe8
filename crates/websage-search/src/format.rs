//! Markdown rendering of raw search results for the `search:` command.

use websage_core::SearchResult;

/// Render results as a flat markdown block, one result per paragraph:
/// bold title, link, snippet. Missing fields render as empty lines.
pub fn format_results_markdown(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| {
            format!(
                "**{}**\n{}\n{}",
                r.title.as_deref().unwrap_or(""),
                r.link.as_deref().unwrap_or(""),
                r.snippet.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
