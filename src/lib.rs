pub mod config;
pub mod ui;

pub use ui::theme::{BuiltinPalette, Palette, Theme};
pub use ui::theme_loader::{load_palette, resolve, PaletteError, PaletteResolver};
