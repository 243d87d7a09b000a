//! Post body rendering from text and link blocks.

use crate::api::{LinkBlock, TextBlock};

/// A block that contributes to the post body, in post order.
#[derive(Debug, Clone, Copy)]
pub enum TextPiece<'a> {
    Text(&'a TextBlock),
    Link(&'a LinkBlock),
}

/// Human-readable post body. `BLOCK_END` text blocks become line breaks; links
/// render as their URL unless their visible text is empty. Surrounding
/// whitespace is trimmed.
pub fn render_text(pieces: &[TextPiece<'_>]) -> String {
    let mut out = String::new();
    for piece in pieces {
        match piece {
            TextPiece::Text(t) if t.modificator.is_empty() => out.push_str(&decode_content(&t.content)),
            TextPiece::Text(_) => out.push('\n'),
            TextPiece::Link(l) => {
                if !decode_content(&l.content).is_empty() {
                    out.push_str(&l.url);
                }
            }
        }
    }
    out.trim().to_string()
}

/// First element of the JSON-encoded `[text, style, ranges]` triple.
/// Undecodable content renders as nothing.
pub fn decode_content(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(parts) => match parts.into_iter().next() {
            Some(serde_json::Value::String(s)) => s,
            _ => String::new(),
        },
        Err(e) => {
            tracing::warn!(content = %raw, error = %e, "undecodable text block");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(content: &str, modificator: &str) -> TextBlock {
        TextBlock {
            content: content.to_string(),
            modificator: modificator.to_string(),
        }
    }

    fn link(content: &str, url: &str) -> LinkBlock {
        LinkBlock {
            content: content.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn joins_text_line_breaks_and_visible_links() {
        let a = text(r#"["Hello ","unstyled",[]]"#, "");
        let br = text("", "BLOCK_END");
        let visible = link(r#"["see this","unstyled",[]]"#, "https://a.example");
        let hidden = link(r#"["","unstyled",[]]"#, "https://hidden.example");
        let b = text(r#"["Bold","unstyled",[[0,0,4]]]"#, "");
        let out = render_text(&[
            TextPiece::Text(&a),
            TextPiece::Link(&visible),
            TextPiece::Link(&hidden),
            TextPiece::Text(&br),
            TextPiece::Text(&b),
            TextPiece::Text(&br),
        ]);
        assert_eq!(out, "Hello https://a.example\nBold");
    }

    #[test]
    fn bad_content_renders_empty() {
        assert_eq!(decode_content("not json"), "");
        assert_eq!(decode_content("[]"), "");
        assert_eq!(decode_content(""), "");
    }
}
