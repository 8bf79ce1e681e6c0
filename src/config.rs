use std::path::{Path, PathBuf};

/// Directory under the platform config dir that holds algo's files
pub const APP_DIR_NAME: &str = "algo";

/// Palette override file name inside [`APP_DIR_NAME`]
pub const THEME_FILE_NAME: &str = "theme.conf";

/// Returns the platform user config directory
/// (`$XDG_CONFIG_HOME` or `~/.config` on Linux, `~/Library/Application Support` on macOS)
pub fn user_config_dir() -> Option<PathBuf> {
    dirs::config_dir()
}

/// Returns the application config directory (`<user config>/algo`)
pub fn config_dir() -> Option<PathBuf> {
    user_config_dir().map(|d| app_dir(&d))
}

/// Returns the theme file path (`<user config>/algo/theme.conf`)
pub fn theme_config_path() -> Option<PathBuf> {
    user_config_dir().map(|d| theme_path_in(&d))
}

/// Application directory below an explicit base config directory
pub fn app_dir(base: &Path) -> PathBuf {
    base.join(APP_DIR_NAME)
}

/// Theme file path below an explicit base config directory
pub fn theme_path_in(base: &Path) -> PathBuf {
    app_dir(base).join(THEME_FILE_NAME)
}
