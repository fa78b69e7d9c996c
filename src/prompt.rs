//! System/user message construction for the completion call.

use crate::llm::ChatMessage;
use crate::search::{Lang, SearchResult};

/// Character budget for the web context embedded in the user message.
pub const PROMPT_CONTEXT_CHARS: usize = 6000;

/// What the model gets to read besides the question.
#[derive(Debug, Clone, Copy)]
pub enum PromptContext<'a> {
    /// Numbered results the model may cite as `[n]`.
    Cited(&'a [SearchResult]),
    /// Unattributed snippet text.
    Plain(&'a str),
    /// Nothing usable came back from the web.
    Empty,
}

pub fn system_prompt(lang: Lang) -> &'static str {
    match lang {
        Lang::Es => {
            "Eres un asistente que responde en español. Usa el contexto web dado cuando sea útil. \
             Si el contexto contiene ruido, ignóralo. Responde de manera breve y clara. \
             Si afirmas un dato (por ejemplo, ganadores de premios), da el nombre exacto y el año."
        }
        Lang::En => {
            "You are an assistant that answers in English. Use the provided web context when helpful. \
             If the context contains noise, ignore it. Answer briefly and clearly. \
             If stating a fact (e.g., award winners), provide the exact name and year."
        }
    }
}

pub fn build_messages(query: &str, context: &PromptContext<'_>, lang: Lang) -> [ChatMessage; 2] {
    let user = match (context, lang) {
        (PromptContext::Cited(results), Lang::Es) => format!(
            "Pregunta: {query}\n\nFuentes web (pueden contener ruido):\n{}\n\n\
             Responde en español y cita las fuentes usadas con su número, por ejemplo [1].",
            truncate_chars(&format_sources(results), PROMPT_CONTEXT_CHARS)
        ),
        (PromptContext::Cited(results), Lang::En) => format!(
            "Question: {query}\n\nWeb sources (may include noise):\n{}\n\n\
             Answer in English and cite the sources you use by number, e.g. [1].",
            truncate_chars(&format_sources(results), PROMPT_CONTEXT_CHARS)
        ),
        (PromptContext::Plain(text), Lang::Es) => format!(
            "Pregunta: {query}\n\nContexto web (puede contener ruido):\n{}\n\n\
             Responde en español y, si corresponde, cita brevemente las fuentes proporcionadas.",
            truncate_chars(text, PROMPT_CONTEXT_CHARS)
        ),
        (PromptContext::Plain(text), Lang::En) => format!(
            "Question: {query}\n\nWeb context (may include noise):\n{}\n\n\
             Answer in English and, where appropriate, briefly cite the provided sources.",
            truncate_chars(text, PROMPT_CONTEXT_CHARS)
        ),
        (PromptContext::Empty, Lang::Es) => format!(
            "Pregunta: {query}\n\nNo se encontró contexto web relevante. \
             Responde en español con tu conocimiento general e indica que no hay fuentes web."
        ),
        (PromptContext::Empty, Lang::En) => format!(
            "Question: {query}\n\nNo relevant web context was found. \
             Answer in English from general knowledge and say that no web sources were found."
        ),
    };

    [ChatMessage::system(system_prompt(lang)), ChatMessage::user(user)]
}

/// `[n] title` / snippet / url, one block per result, 1-based.
pub fn format_sources(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let mut entry = format!("[{}] {}\n", i + 1, r.title);
            if !r.snippet.is_empty() {
                entry.push_str(&r.snippet);
                entry.push('\n');
            }
            entry.push_str(&r.url);
            entry
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Cuts `text` to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
