//! Text measurement, truncation, and wrapping for legend labels.
//!
//! Plotters has no text measuring on the `ab_glyph` path, so widths are estimated from
//! character count and font size.

/// Average glyph advance as a fraction of the font size (DejaVu Sans).
const AVG_ADVANCE: f32 = 0.60;

/// Narrowest box we try to wrap into; below this we truncate instead.
const MIN_WRAP_PX: u32 = 12;

/// Estimated pixel width of `text` at `font_px`.
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * AVG_ADVANCE).ceil() as u32
}

/// Longest prefix of `text` that fits `max_px`, with a trailing ellipsis when cut.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    // keep as many chars as fit together with the ellipsis
    let mut keep = chars.len();
    while keep > 0 {
        let candidate: String = chars[..keep].iter().chain(std::iter::once(&'…')).collect();
        if estimate_text_width_px(&candidate, font_px) <= max_px {
            return candidate;
        }
        keep -= 1;
    }
    String::new()
}

/// Break `text` into lines no wider than `max_px`, on word boundaries where possible.
/// A single word wider than the box is split by characters.
pub fn wrap_text_to_width(text: &str, font_px: u32, max_px: u32) -> Vec<String> {
    if max_px <= MIN_WRAP_PX {
        return vec![truncate_to_width(text, font_px, max_px)];
    }
    let fits = |s: &str| estimate_text_width_px(s, font_px) <= max_px;

    let mut lines: Vec<String> = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        let candidate = if cur.is_empty() {
            word.to_string()
        } else {
            format!("{cur} {word}")
        };
        if fits(&candidate) {
            cur = candidate;
            continue;
        }
        if !cur.is_empty() {
            lines.push(std::mem::take(&mut cur));
            if fits(word) {
                cur = word.to_string();
                continue;
            }
        }
        // hard-break an over-long word
        let mut piece = String::new();
        for ch in word.chars() {
            piece.push(ch);
            if !fits(&piece) {
                piece.pop();
                if piece.is_empty() {
                    lines.push(truncate_to_width(word, font_px, max_px));
                    break;
                }
                lines.push(std::mem::take(&mut piece));
                piece.push(ch);
            }
        }
        cur = piece;
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}
