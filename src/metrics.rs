//! Text measurement for the PDF base-14 Helvetica family.
//!
//! The renderer references the builtin Helvetica fonts instead of embedding
//! font files, so the advance widths below (Adobe AFM, 1/1000 em) are the
//! exact numbers a viewer uses to lay out the glyphs.  The builtin fonts are
//! addressed through WinAnsiEncoding, so only characters that encoding covers
//! can be drawn; [`unsupported_char`] finds the first one that cannot.

use crate::model::FontWeight;

/// Millimetres per typographic point.
pub const MM_PER_PT: f64 = 25.4 / 72.0;

/// Helvetica ascender height relative to the font size.
pub const HELVETICA_ASCENT: f64 = 0.718;

const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const HELVETICA_LATIN1_WIDTHS: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

#[rustfmt::skip]
const HELVETICA_BOLD_LATIN1_WIDTHS: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

/// Characters WinAnsiEncoding places in 0x80..=0x9F: (char, regular, bold).
#[rustfmt::skip]
const WIN_ANSI_EXTRAS: [(char, u16, u16); 27] = [
    ('€', 556, 556), ('‚', 222, 278), ('ƒ', 556, 556), ('„', 333, 500),
    ('…', 1000, 1000), ('†', 556, 556), ('‡', 556, 556), ('ˆ', 333, 333),
    ('‰', 1000, 1000), ('Š', 667, 667), ('‹', 333, 333), ('Œ', 1000, 1000),
    ('Ž', 611, 611), ('‘', 222, 278), ('’', 222, 278), ('“', 333, 500),
    ('”', 333, 500), ('•', 350, 350), ('–', 556, 556), ('—', 1000, 1000),
    ('˜', 333, 333), ('™', 1000, 1000), ('š', 500, 556), ('›', 333, 333),
    ('œ', 944, 944), ('ž', 500, 500), ('Ÿ', 667, 667),
];

/// Advance width of `ch`, or `None` when WinAnsiEncoding has no code for it.
pub fn glyph_width(ch: char, weight: FontWeight) -> Option<u16> {
    let (ascii, latin1) = match weight {
        FontWeight::Regular => (&HELVETICA_WIDTHS, &HELVETICA_LATIN1_WIDTHS),
        FontWeight::Bold => (&HELVETICA_BOLD_WIDTHS, &HELVETICA_BOLD_LATIN1_WIDTHS),
    };
    match ch {
        ' '..='~' => Some(ascii[ch as usize - 0x20]),
        '\u{a0}'..='\u{ff}' => Some(latin1[ch as usize - 0xa0]),
        _ => WIN_ANSI_EXTRAS
            .iter()
            .find(|(extra, _, _)| *extra == ch)
            .map(|&(_, regular, bold)| match weight {
                FontWeight::Regular => regular,
                FontWeight::Bold => bold,
            }),
    }
}

/// First character of `text` the builtin fonts cannot draw.
pub fn unsupported_char(text: &str) -> Option<char> {
    text.chars()
        .find(|&ch| glyph_width(ch, FontWeight::Regular).is_none())
}

/// Converts a font size in points to millimetres.
pub fn pt_to_mm(points: f64) -> f64 {
    points * MM_PER_PT
}

/// Width of `text` in millimetres when set at `font_size_pt`.
pub fn text_width_mm(text: &str, font_size_pt: f64, weight: FontWeight) -> f64 {
    let units: u32 = text.chars().map(|ch| u32::from(glyph_width(ch, weight).unwrap_or(FALLBACK_WIDTH))).sum();
    f64::from(units) / 1000.0 * pt_to_mm(font_size_pt)
}

/// Distance from the top of a line box to its baseline.
pub fn ascent_mm(font_size_pt: f64) -> f64 {
    pt_to_mm(font_size_pt) * HELVETICA_ASCENT
}

/// Breaks `text` into lines that fit `max_width_mm`.
///
/// Words are kept whole when possible; a single word wider than the limit is
/// split at character boundaries.  Empty input yields a single empty line so
/// that every table cell occupies at least one line.
pub fn wrap_text(
    text: &str,
    max_width_mm: f64,
    font_size_pt: f64,
    weight: FontWeight,
) -> Vec<String> {
    let measure = |candidate: &str| text_width_mm(candidate, font_size_pt, weight);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_owned()
        } else {
            format!("{current} {word}")
        };

        if measure(&candidate) <= max_width_mm {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if measure(word) <= max_width_mm {
            current = word.to_owned();
            continue;
        }

        for ch in word.chars() {
            current.push(ch);
            if measure(&current) > max_width_mm && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::take(&mut current));
                current.push(ch);
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_share_one_width() {
        let a = text_width_mm("0000", 12.0, FontWeight::Regular);
        let b = text_width_mm("9876", 12.0, FontWeight::Regular);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn bold_is_never_narrower() {
        let text = "Invoice Details: INV-001";
        assert!(
            text_width_mm(text, 11.0, FontWeight::Bold)
                >= text_width_mm(text, 11.0, FontWeight::Regular)
        );
    }

    #[test]
    fn width_scales_with_font_size() {
        let small = text_width_mm("Total", 10.0, FontWeight::Regular);
        let large = text_width_mm("Total", 20.0, FontWeight::Regular);
        assert!((large - 2.0 * small).abs() < 1e-9);
    }

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(
            wrap_text("Widget", 50.0, 11.0, FontWeight::Regular),
            vec!["Widget".to_owned()]
        );
    }

    #[test]
    fn long_text_wraps_within_width() {
        let text = "Extra long industrial grade widget with stainless fittings and a spare gasket";
        let lines = wrap_text(text, 40.0, 11.0, FontWeight::Regular);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(line, 11.0, FontWeight::Regular) <= 40.0);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn oversized_word_is_split() {
        let word = "W".repeat(40);
        let lines = wrap_text(&word, 20.0, 11.0, FontWeight::Regular);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn latin1_letters_use_their_own_widths() {
        assert_eq!(glyph_width('é', FontWeight::Regular), glyph_width('e', FontWeight::Regular));
        assert_eq!(glyph_width('Ö', FontWeight::Bold), glyph_width('O', FontWeight::Bold));
        assert_eq!(glyph_width('ñ', FontWeight::Regular), Some(556));
        assert_eq!(glyph_width('ç', FontWeight::Regular), Some(500));
        assert_eq!(glyph_width('\u{a0}', FontWeight::Regular), Some(278));
        assert_eq!(glyph_width('€', FontWeight::Bold), Some(556));
    }

    #[test]
    fn characters_outside_win_ansi_are_reported() {
        assert_eq!(unsupported_char("Crème brûlée – 5 €"), None);
        assert_eq!(unsupported_char("Łukasz"), Some('Ł'));
        assert_eq!(unsupported_char("INR ₹"), Some('₹'));
        assert_eq!(unsupported_char("田中"), Some('田'));
        assert_eq!(unsupported_char("tab\there"), Some('\t'));
    }

    #[test]
    fn empty_text_yields_one_empty_line() {
        assert_eq!(wrap_text("", 20.0, 11.0, FontWeight::Regular), vec![String::new()]);
    }
}
