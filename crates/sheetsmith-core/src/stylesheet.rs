//! Derives the render rules injected next to the grid widget so that its
//! cells pick up the current style classes.

use serde::Serialize;
use std::fmt::Write;

use crate::format::{Align, Color, StyleRecord, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE};
use crate::style::StyleRegistry;

/// Text color used when a record carries none
pub const DEFAULT_TEXT_COLOR: &str = "inherit";
/// Background used when a record carries none
pub const DEFAULT_BACKGROUND: &str = "transparent";

/// Normalize a user color to `#rrggbb` or a plain keyword such as `red` or
/// `transparent`. Anything else falls back to `fallback`.
fn css_color(value: Option<&str>, fallback: &str) -> String {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return fallback.to_string();
    };

    if value.starts_with('#') {
        return Color::from_hex(value)
            .map(|c| c.to_hex())
            .unwrap_or_else(|| fallback.to_string());
    }

    if value.chars().all(|c| c.is_ascii_alphabetic()) {
        value.to_ascii_lowercase()
    } else {
        fallback.to_string()
    }
}

/// Font family names are limited to letters, digits, spaces, `-` and `_`
fn css_font_family(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .filter(|f| {
            f.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        })
        .unwrap_or(DEFAULT_FONT_FAMILY)
        .to_string()
}

/// One rule binding a style class to concrete declarations
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRule {
    pub selector: String,
    pub font_family: String,
    pub font_size: u32,
    pub font_weight: &'static str,
    pub font_style: &'static str,
    pub color: String,
    pub background_color: String,
    pub text_align: &'static str,
}

impl RenderRule {
    pub fn from_record(class: &str, record: &StyleRecord) -> Self {
        let default_size: f64 = DEFAULT_FONT_SIZE.parse().unwrap_or(14.0);
        Self {
            selector: format!("td.{}", class),
            font_family: css_font_family(record.font.as_deref()),
            font_size: record.size_points(default_size).round() as u32,
            font_weight: if record.bold { "bold" } else { "normal" },
            font_style: if record.italic { "italic" } else { "normal" },
            color: css_color(record.color.as_deref(), DEFAULT_TEXT_COLOR),
            background_color: css_color(record.background.as_deref(), DEFAULT_BACKGROUND),
            text_align: record.alignment.unwrap_or(Align::Left).as_css(),
        }
    }

    fn write_css(&self, out: &mut String) {
        // writing into a String cannot fail
        let _ = write!(
            out,
            "{} {{ font-family: \"{}\"; font-size: {}px !important; font-weight: {} !important; \
             font-style: {} !important; color: {} !important; background-color: {} !important; \
             text-align: {} !important; }}",
            self.selector,
            self.font_family,
            self.font_size,
            self.font_weight,
            self.font_style,
            self.color,
            self.background_color,
            self.text_align,
        );
    }
}

/// Complete rule set for the registry at one point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StyleSheet {
    pub rules: Vec<RenderRule>,
}

impl StyleSheet {
    pub fn to_css(&self) -> String {
        let mut css = String::new();
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                css.push('\n');
            }
            rule.write_css(&mut css);
        }
        css
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Derive the full rule set, one rule per class in id order
pub fn synthesize(registry: &StyleRegistry) -> StyleSheet {
    StyleSheet {
        rules: registry
            .iter()
            .map(|(id, record)| RenderRule::from_record(id.as_str(), record))
            .collect(),
    }
}
