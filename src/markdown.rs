use crate::search::Source;

/// Escape characters that break Markdown link syntax: `[`, `]`, `(`, `)`.
pub(crate) fn escape_md_link(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '[' | ']' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Bullet list of sources. Untitled entries get a placeholder; entries without
/// a URL are listed as plain text.
pub(crate) fn source_list(sources: &[Source]) -> String {
    let mut out = String::new();
    for source in sources {
        let title = match source.title.trim() {
            "" => "(untitled)",
            t => t,
        };
        let url = source.url.trim();
        if url.is_empty() {
            out.push_str(&format!("- {}\n", escape_md_link(title)));
        } else {
            out.push_str(&format!(
                "- [{}]({})\n",
                escape_md_link(title),
                escape_md_link(url)
            ));
        }
    }
    out
}
