use std::str::FromStr;

use ratatui::layout::Margin;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Padding;
use serde::Serialize;

// ═══════════════════════════════════════════════════════════════════════════════
// Palette (raw color values)
// ═══════════════════════════════════════════════════════════════════════════════

/// Seven raw color values that make up one visual theme.
///
/// Values are opaque strings (usually `#rrggbb`). They are never validated here;
/// interpretation happens when a [`Paint`] is turned into a ratatui [`Style`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub text_color: String,
    pub selected_bg: String,
    pub selected_text: String,
    pub indicator: String,
    pub input_text: String,
    pub input_placeholder: String,
    pub input_prompt: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            text_color: "#ffffff".to_string(),
            selected_bg: "#ffffff".to_string(),
            selected_text: "#000000".to_string(),
            indicator: "#ffffff".to_string(),
            input_text: "#ffffff".to_string(),
            input_placeholder: "#808080".to_string(),
            input_prompt: "#ffffff".to_string(),
        }
    }
}

impl Palette {
    /// Config keys, in field order
    pub const KEYS: [&'static str; 7] = [
        "text_color",
        "selected_bg",
        "selected_text",
        "indicator",
        "input_text",
        "input_placeholder",
        "input_prompt",
    ];

    /// Rosé Pine (main variant)
    pub fn rose_pine() -> Self {
        Self {
            text_color: "#908caa".to_string(),        // subtle
            selected_bg: "#26233a".to_string(),       // overlay
            selected_text: "#e0def4".to_string(),     // text
            indicator: "#c4a7e7".to_string(),         // iris
            input_text: "#e0def4".to_string(),        // text
            input_placeholder: "#6e6a86".to_string(), // muted
            input_prompt: "#c4a7e7".to_string(),      // iris
        }
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "text_color" => Some(&mut self.text_color),
            "selected_bg" => Some(&mut self.selected_bg),
            "selected_text" => Some(&mut self.selected_text),
            "indicator" => Some(&mut self.indicator),
            "input_text" => Some(&mut self.input_text),
            "input_placeholder" => Some(&mut self.input_placeholder),
            "input_prompt" => Some(&mut self.input_prompt),
            _ => None,
        }
    }

    /// Value stored under a config key, `None` for unknown keys
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "text_color" => &self.text_color,
            "selected_bg" => &self.selected_bg,
            "selected_text" => &self.selected_text,
            "indicator" => &self.indicator,
            "input_text" => &self.input_text,
            "input_placeholder" => &self.input_placeholder,
            "input_prompt" => &self.input_prompt,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Overwrites the field behind `key` verbatim.
    /// Returns false (and leaves the palette untouched) for an unknown key.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        match self.field_mut(key) {
            Some(field) => {
                *field = value.to_string();
                true
            }
            None => false,
        }
    }

    /// Renders the palette in `theme.conf` syntax
    pub fn to_conf(&self) -> String {
        let mut out = String::new();
        for key in Self::KEYS {
            if let Some(value) = self.get(key) {
                out.push_str(key);
                out.push('=');
                out.push_str(value);
                out.push('\n');
            }
        }
        out
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Built-in palettes
// ═══════════════════════════════════════════════════════════════════════════════

/// Palettes compiled into the binary, selectable by name without touching disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinPalette {
    Default,
    RosePine,
}

impl BuiltinPalette {
    pub const ALL: [BuiltinPalette; 2] = [BuiltinPalette::Default, BuiltinPalette::RosePine];

    /// Looks up a built-in by identifier.
    ///
    /// The empty name maps to [`BuiltinPalette::Default`]; names are matched
    /// exactly (no case folding).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "" => Some(Self::Default),
            "rose-pine" => Some(Self::RosePine),
            "default" => Some(Self::Default),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::RosePine => "rose-pine",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Self::Default => Palette::default(),
            Self::RosePine => Palette::rose_pine(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Styling objects
// ═══════════════════════════════════════════════════════════════════════════════

/// A color pairing plus text attributes, kept uninterpreted until rendering
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Paint {
    pub fg: Option<String>,
    pub bg: Option<String>,
    pub bold: bool,
}

impl Paint {
    pub fn fg(color: &str) -> Self {
        Self {
            fg: Some(color.to_string()),
            ..Self::default()
        }
    }

    pub fn with_bg(mut self, color: &str) -> Self {
        self.bg = Some(color.to_string());
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Converts to a ratatui style. A color ratatui cannot parse stays unset,
    /// so the terminal's own default shows through.
    pub fn style(&self) -> Style {
        let mut style = Style::default();
        if let Some(fg) = self.fg.as_deref().and_then(parse_color) {
            style = style.fg(fg);
        }
        if let Some(bg) = self.bg.as_deref().and_then(parse_color) {
            style = style.bg(bg);
        }
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        style
    }
}

/// Parses a palette value into a terminal color (`#rrggbb`, named, or index)
pub fn parse_color(value: &str) -> Option<Color> {
    Color::from_str(value).ok()
}

/// Spacing around the picker's content area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxStyle {
    pub padding: Padding,
    pub margin: Margin,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            // left, right, top, bottom
            padding: Padding::new(2, 2, 1, 1),
            margin: Margin::new(0, 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputStyles {
    pub text: Paint,
    pub placeholder: Paint,
    pub prompt: Paint,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Theme
// ═══════════════════════════════════════════════════════════════════════════════

/// Ready-to-render styles derived from a [`Palette`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub box_style: BoxStyle,
    pub text: Paint,
    pub selected: Paint,
    pub indicator: Paint,
    pub input: InputStyles,
}

impl Default for Theme {
    fn default() -> Self {
        Self::build(&Palette::default())
    }
}

impl Theme {
    /// Maps every palette color onto its styling object. Structural attributes
    /// (box spacing, bold selection) are fixed; only colors vary.
    pub fn build(p: &Palette) -> Self {
        Self {
            box_style: BoxStyle::default(),
            text: Paint::fg(&p.text_color),
            selected: Paint::fg(&p.selected_text).with_bg(&p.selected_bg).bold(),
            indicator: Paint::fg(&p.indicator),
            input: InputStyles {
                text: Paint::fg(&p.input_text),
                placeholder: Paint::fg(&p.input_placeholder),
                prompt: Paint::fg(&p.input_prompt),
            },
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Style helpers
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn text_style(&self) -> Style {
        self.text.style()
    }

    pub fn selected_style(&self) -> Style {
        self.selected.style()
    }

    pub fn indicator_style(&self) -> Style {
        self.indicator.style()
    }

    pub fn input_text_style(&self) -> Style {
        self.input.text.style()
    }

    pub fn placeholder_style(&self) -> Style {
        self.input.placeholder.style()
    }

    pub fn prompt_style(&self) -> Style {
        self.input.prompt.style()
    }
}
