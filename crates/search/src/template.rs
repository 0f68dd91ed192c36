//! `{entity}` placeholder substitution for search templates.

use thiserror::Error;

/// A bad search template is a configuration problem, not a row-level fault —
/// the pipeline surfaces it before touching any row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template is missing the {{entity}} placeholder: {0:?}")]
    MissingPlaceholder(String),
    #[error("template has an unclosed '{{' at byte {0}")]
    UnclosedBrace(usize),
    #[error("template has an unexpected '}}' at byte {0}")]
    UnexpectedBrace(usize),
}

/// Render a search query by substituting `{entity}` in `template`.
///
/// `{{` and `}}` pass through as literal braces.  Any other brace usage, or a
/// template without the placeholder, is a [`TemplateError`].
pub fn render_query(template: &str, entity: &str) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len() + entity.len());
    let mut substituted = false;
    let mut chars = template.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '{' => {
                if chars.peek().map(|&(_, c)| c) == Some('{') {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut name = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(TemplateError::UnclosedBrace(pos));
                }
                if name != "entity" {
                    return Err(TemplateError::MissingPlaceholder(template.to_string()));
                }
                out.push_str(entity);
                substituted = true;
            }
            '}' => {
                if chars.peek().map(|&(_, c)| c) == Some('}') {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(TemplateError::UnexpectedBrace(pos));
                }
            }
            _ => out.push(ch),
        }
    }

    if !substituted {
        return Err(TemplateError::MissingPlaceholder(template.to_string()));
    }

    Ok(out)
}

// ── Tests ────────────────────────────────────────────────────────────────────
