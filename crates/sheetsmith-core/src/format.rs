use serde::{Deserialize, Serialize};

/// Font family used when a record leaves it unset
pub const DEFAULT_FONT_FAMILY: &str = "arial";
/// Font size (points, as entered in the toolbar) used when a record leaves it unset
pub const DEFAULT_FONT_SIZE: &str = "14";

/// RGB color parsed from the CSS hex strings carried by style records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Convert to CSS hex color string
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse from CSS hex color string (`#rrggbb` or `#rgb`)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Color::rgb(r, g, b))
            }
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
                Some(Color::rgb(r * 17, g * 17, b * 17))
            }
            _ => None,
        }
    }

    /// Packed 0xRRGGBB value
    pub fn to_rgb_u32(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    pub fn as_css(&self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}

/// Style attributes attached to a style class.
///
/// A record is never edited in place; [`StyleRecord::with`] yields the updated
/// copy that replaces it in the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Align>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl StyleRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: set font family
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    /// Builder pattern: set font size
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Builder pattern: set bold
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Builder pattern: set text color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Builder pattern: set background color
    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }

    /// Builder pattern: set alignment
    pub fn with_alignment(mut self, alignment: Align) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Copy of this record with a single attribute replaced
    pub fn with(&self, attribute: &StyleAttribute) -> StyleRecord {
        let mut next = self.clone();
        match attribute {
            StyleAttribute::Font(font) => next.font = Some(font.clone()),
            StyleAttribute::Size(size) => next.size = Some(size.clone()),
            StyleAttribute::Bold(bold) => next.bold = *bold,
            StyleAttribute::Italic(italic) => next.italic = *italic,
            StyleAttribute::Color(color) => next.color = non_empty(color),
            StyleAttribute::Background(background) => next.background = non_empty(background),
            StyleAttribute::Alignment(alignment) => next.alignment = *alignment,
        }
        next
    }

    pub fn effective_font(&self) -> &str {
        self.font.as_deref().unwrap_or(DEFAULT_FONT_FAMILY)
    }

    pub fn effective_size(&self) -> &str {
        self.size.as_deref().unwrap_or(DEFAULT_FONT_SIZE)
    }

    /// Size in points; unset or unparseable sizes fall back to `default`
    pub fn size_points(&self, default: f64) -> f64 {
        self.size
            .as_deref()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(default)
    }

    pub fn text_color(&self) -> Option<Color> {
        self.color.as_deref().and_then(Color::from_hex)
    }

    /// Background fill; `transparent` and unparseable values mean no fill
    pub fn fill_color(&self) -> Option<Color> {
        self.background
            .as_deref()
            .filter(|bg| !bg.eq_ignore_ascii_case("transparent"))
            .and_then(Color::from_hex)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

/// One targeted style change coming from the toolbar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "attribute", content = "value", rename_all = "lowercase")]
pub enum StyleAttribute {
    Font(String),
    Size(String),
    Bold(bool),
    Italic(bool),
    Color(Option<String>),
    Background(Option<String>),
    Alignment(Option<Align>),
}

/// Toolbar state shown for the active cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolbarState {
    pub font: String,
    pub size: String,
    pub bold: bool,
    pub italic: bool,
    pub color: String,
    pub background: String,
    pub alignment: Align,
}

impl Default for ToolbarState {
    fn default() -> Self {
        Self {
            font: DEFAULT_FONT_FAMILY.to_string(),
            size: DEFAULT_FONT_SIZE.to_string(),
            bold: false,
            italic: false,
            color: String::new(),
            background: String::new(),
            alignment: Align::Left,
        }
    }
}

impl From<&StyleRecord> for ToolbarState {
    fn from(record: &StyleRecord) -> Self {
        Self {
            font: record.effective_font().to_string(),
            size: record.effective_size().to_string(),
            bold: record.bold,
            italic: record.italic,
            color: record.color.clone().unwrap_or_default(),
            background: record.background.clone().unwrap_or_default(),
            alignment: record.alignment.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex() {
        let color = Color::rgb(255, 128, 64);
        assert_eq!(color.to_hex(), "#ff8040");
        assert_eq!(Color::from_hex("#ff8040"), Some(color));
        assert_eq!(Color::from_hex("#fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("red"), None);
        assert_eq!(color.to_rgb_u32(), 0xFF8040);
    }

    #[test]
    fn test_with_preserves_untouched_fields() {
        let record = StyleRecord::new().with_font("times");
        let updated = record.with(&StyleAttribute::Bold(true));

        assert_eq!(updated, StyleRecord::new().with_font("times").with_bold(true));
        // the source record is left as it was
        assert!(!record.bold);
    }

    #[test]
    fn test_empty_color_clears() {
        let record = StyleRecord::new().with_color("#ff0000");
        let cleared = record.with(&StyleAttribute::Color(Some(String::new())));
        assert_eq!(cleared.color, None);
    }

    #[test]
    fn test_fill_color_ignores_transparent() {
        assert_eq!(StyleRecord::new().with_background("transparent").fill_color(), None);
        assert_eq!(
            StyleRecord::new().with_background("#00ff00").fill_color(),
            Some(Color::rgb(0, 255, 0))
        );
    }

    #[test]
    fn test_size_points_fallback() {
        assert_eq!(StyleRecord::new().size_points(12.0), 12.0);
        assert_eq!(StyleRecord::new().with_size("18").size_points(12.0), 18.0);
        assert_eq!(StyleRecord::new().with_size("big").size_points(12.0), 12.0);
    }

    #[test]
    fn test_attribute_wire_shape() {
        let attr: StyleAttribute =
            serde_json::from_str(r#"{"attribute":"bold","value":true}"#).unwrap();
        assert_eq!(attr, StyleAttribute::Bold(true));

        let attr: StyleAttribute =
            serde_json::from_str(r#"{"attribute":"alignment","value":"center"}"#).unwrap();
        assert_eq!(attr, StyleAttribute::Alignment(Some(Align::Center)));
    }

    #[test]
    fn test_toolbar_defaults_from_empty_record() {
        let toolbar = ToolbarState::from(&StyleRecord::new());
        assert_eq!(toolbar, ToolbarState::default());
    }
}
