//! Font-backed text width measurement used to place node labels. Falls
//! back to calibrated per-character factors when no matching system
//! font can be loaded, so layout stays usable on fontless machines.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Measures `text` at `font_size` in the first loadable family of the
/// CSS-style `font_family` list. Never fails: missing fonts or glyphs
/// degrade to the heuristic widths.
pub fn text_width(text: &str, font_size: f32, font_family: &str) -> f32 {
    if text.is_empty() || font_size <= 0.0 {
        return 0.0;
    }
    let measured = TEXT_MEASURER
        .lock()
        .ok()
        .and_then(|mut guard| guard.measure(text, font_size, font_family));
    measured.unwrap_or_else(|| fallback_text_width(text, font_size))
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<String, Option<FontAdvances>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let key = font_family.trim().to_string();
        if !self.cache.contains_key(&key) {
            let advances = self.load_advances(font_family);
            self.cache.insert(key.clone(), advances);
        }
        let advances = self.cache.get(&key)?.as_ref()?;
        Some(advances.measure(text, font_size))
    }

    fn load_advances(&mut self, font_family: &str) -> Option<FontAdvances> {
        let mut names: Vec<String> = Vec::new();
        let mut generic: Vec<Family<'static>> = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            match raw.to_ascii_lowercase().as_str() {
                "serif" => generic.push(Family::Serif),
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    generic.push(Family::SansSerif)
                }
                "monospace" | "ui-monospace" => generic.push(Family::Monospace),
                "cursive" => generic.push(Family::Cursive),
                "fantasy" => generic.push(Family::Fantasy),
                _ => names.push(raw.to_string()),
            }
        }

        let mut families: Vec<Family<'_>> = names.iter().map(|n| Family::Name(n)).collect();
        families.extend(generic);
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut loaded = None;
        self.db.with_face_data(id, |data, index| {
            if let Ok(face) = Face::parse(data, index) {
                loaded = Some(FontAdvances::from_face(&face));
            }
        });
        loaded
    }
}

/// ASCII advance table in font units, captured while the face data is
/// still borrowed. Non-ASCII characters use the fallback factor.
struct FontAdvances {
    units_per_em: u16,
    ascii: [u16; 128],
}

impl FontAdvances {
    fn from_face(face: &Face) -> Self {
        let mut ascii = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        Self {
            units_per_em: face.units_per_em().max(1),
            ascii,
        }
    }

    fn measure(&self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em as f32;
        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = if ch.is_ascii() {
                self.ascii[ch as usize]
            } else {
                0
            };
            if advance == 0 {
                width += char_width_factor(ch) * font_size;
            } else {
                width += advance as f32 * scale;
            }
        }
        width.max(0.0)
    }
}

fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

// Calibrated against browser output for the default sans stack at a
// 16px baseline.
fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.306,
        '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' => 0.321,
        'I' => 0.272,
        'J' => 0.557,
        'L' => 0.559,
        'M' => 0.903,
        'W' => 0.958,
        'A'..='Z' => 0.67,
        'f' | 't' => 0.33,
        'i' | 'j' | 'l' => 0.235,
        'm' => 0.867,
        'w' => 0.811,
        'r' => 0.364,
        'a'..='z' => 0.57,
        '0'..='9' => 0.60,
        '@' | '#' | '%' | '&' => 0.946,
        _ => 0.568,
    }
}
