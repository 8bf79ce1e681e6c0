pub mod picker;
pub mod theme;
pub mod theme_loader;
