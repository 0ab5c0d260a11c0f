//! Share-card formatting and clipboard copy
//!
//! Builds the plain-text card used for both clipboard copy and text
//! sharing, and writes it to the clipboard with the OSC 52 escape sequence
//! so no windowing system is required.

use std::io::Write;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::data::{Dua, Subcategory};

/// Renders the plain-text share card for a dua
///
/// Sections are included only when present, so a translation-only item
/// produces a compact card instead of a form with blank fields.
pub fn dua_card_text(subcategory: &Subcategory, dua: &Dua) -> String {
    let mut sections: Vec<String> = Vec::new();

    if !dua.title.is_empty() {
        sections.push(dua.title.clone());
    }
    if let Some(arabic) = dua.arabic.as_deref() {
        sections.push(arabic.to_string());
    }
    if let Some(transliteration) = dua.transliteration.as_deref() {
        sections.push(transliteration.to_string());
    }
    if let Some(translation) = dua.translation.as_deref() {
        sections.push(translation.to_string());
    }
    if let Some(reference) = dua.reference.as_deref() {
        sections.push(format!("— {}", reference));
    }

    let attribution = if subcategory.name.is_empty() {
        "Shared from Duaread".to_string()
    } else {
        format!("Shared from Duaread · {}", subcategory.name)
    };
    sections.push(attribution);

    sections.join("\n\n")
}

/// Copies text to the clipboard via OSC 52
///
/// The escape sequence carries the payload base64-encoded; the hosting
/// terminal owns the actual clipboard access. Takes the writer as a
/// parameter so tests can capture the exact bytes.
pub fn copy_to_clipboard<W: Write>(writer: &mut W, text: &str) -> std::io::Result<()> {
    write!(writer, "\x1b]52;c;{}\x07", STANDARD.encode(text))?;
    writer.flush()
}
