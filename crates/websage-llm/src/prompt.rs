//! Grounding-prompt assembly.
//!
//! Merges the user query and fetched search results into a single prompt
//! string. Pure functions only; there are no failure modes here.

use websage_core::SearchResult;

/// Build the grounding prompt for a query and its search context.
///
/// Each result renders as `- {title}: {snippet} ({link})` with missing
/// fields as empty strings. The prompt asks the model to answer from the
/// given context and to reconcile discrepancies among sources.
pub fn assemble(query: &str, results: &[SearchResult]) -> String {
    let context = results
        .iter()
        .map(context_line)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Answer the user query using the following context from recent web search results:\n\
         {context}\n\n\
         Question: {query}\n\
         Provide a clear and concise answer, explaining any discrepancies if multiple sources differ."
    )
}

fn context_line(result: &SearchResult) -> String {
    format!(
        "- {}: {} ({})",
        result.title.as_deref().unwrap_or(""),
        result.snippet.as_deref().unwrap_or(""),
        result.link.as_deref().unwrap_or("")
    )
}
