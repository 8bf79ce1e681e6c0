use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

use super::theme::{BuiltinPalette, Palette};
use crate::config;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum PaletteError {
    /// Reading failed after the theme file was opened.
    /// `partial` holds every override applied before the failure.
    #[error("failed to read theme file: {source}")]
    Scan {
        partial: Box<Palette>,
        #[source]
        source: io::Error,
    },
}

impl PaletteError {
    /// Palette assembled before the failure
    pub fn partial(&self) -> &Palette {
        match self {
            Self::Scan { partial, .. } => partial,
        }
    }

    pub fn into_partial(self) -> Palette {
        match self {
            Self::Scan { partial, .. } => *partial,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// theme.conf parsing
// ═══════════════════════════════════════════════════════════════════════════════

/// Applies one `key = value` line to `palette`.
///
/// Blank lines, `#` comments, lines without `=` and unknown keys are skipped.
/// Returns true when a field was overwritten.
pub fn apply_line(palette: &mut Palette, line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return false;
    }

    let Some((key, value)) = line.split_once('=') else {
        return false;
    };

    palette.set(key.trim(), value.trim())
}

/// Reads `theme.conf` lines from `reader`, overwriting fields of `seed`.
///
/// Lines are decoded lossily, so bytes that are not UTF-8 only affect their own
/// line. Only an I/O failure stops the scan.
pub fn parse_palette<R: BufRead>(reader: R, seed: Palette) -> Result<Palette, PaletteError> {
    let mut palette = seed;
    for line in reader.split(b'\n') {
        match line {
            Ok(raw) => {
                let bytes = raw.strip_suffix(b"\r").unwrap_or(&raw[..]);
                apply_line(&mut palette, &String::from_utf8_lossy(bytes));
            }
            Err(source) => {
                return Err(PaletteError::Scan {
                    partial: Box::new(palette),
                    source,
                });
            }
        }
    }
    Ok(palette)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Resolution
// ═══════════════════════════════════════════════════════════════════════════════

/// Turns a theme name into a [`Palette`].
///
/// Built-in names (`""`, `"default"`, `"rose-pine"`) never touch the disk. Any
/// other name reads `<config dir>/algo/theme.conf` on top of the default
/// palette; a missing config dir or missing file yields the default palette.
#[derive(Debug, Clone, Default)]
pub struct PaletteResolver {
    /// Replaces the platform config dir when set
    config_base: Option<PathBuf>,
}

impl PaletteResolver {
    /// Resolver reading from the platform user config directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver reading `<base>/algo/theme.conf` instead of the platform location
    pub fn with_config_dir(base: impl Into<PathBuf>) -> Self {
        Self {
            config_base: Some(base.into()),
        }
    }

    /// Location of the theme file, `None` if no config directory can be found.
    /// The platform directory is looked up on every call.
    pub fn theme_path(&self) -> Option<PathBuf> {
        match &self.config_base {
            Some(base) => Some(config::theme_path_in(base)),
            None => config::theme_config_path(),
        }
    }

    /// Resolves `name`, surfacing a read failure on an opened theme file.
    pub fn load(&self, name: &str) -> Result<Palette, PaletteError> {
        if let Some(builtin) = BuiltinPalette::from_name(name) {
            debug!("using built-in palette '{}'", builtin.name());
            return Ok(builtin.palette());
        }

        let Some(path) = self.theme_path() else {
            debug!("no user config directory, using default palette");
            return Ok(Palette::default());
        };

        load_from_path(&path)
    }

    /// Resolves `name`; never fails. Any error falls back to the default palette.
    pub fn resolve(&self, name: &str) -> Palette {
        match self.load(name) {
            Ok(palette) => palette,
            Err(err) => {
                warn!("{}, using default palette", err);
                Palette::default()
            }
        }
    }
}

/// Reads a theme file on top of the default palette.
/// A file that cannot be opened is not an error.
pub fn load_from_path(path: &Path) -> Result<Palette, PaletteError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            debug!("theme file {} not opened ({}), using default palette", path.display(), err);
            return Ok(Palette::default());
        }
    };

    debug!("loading palette from {}", path.display());
    parse_palette(BufReader::new(file), Palette::default())
}

/// Resolves `name` against the platform config directory; never fails
pub fn resolve(name: &str) -> Palette {
    PaletteResolver::new().resolve(name)
}

/// Resolves `name` against the platform config directory, surfacing scan errors
pub fn load_palette(name: &str) -> Result<Palette, PaletteError> {
    PaletteResolver::new().load(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::{Cursor, Read};

    /// Writes `<base>/algo/theme.conf` and returns the base directory
    fn config_with(content: &[u8]) -> tempfile::TempDir {
        let base = tempfile::tempdir().unwrap();
        let app_dir = config::app_dir(base.path());
        fs::create_dir_all(&app_dir).unwrap();
        fs::write(app_dir.join(config::THEME_FILE_NAME), content).unwrap();
        base
    }

    /// Serves `data`, then fails every further read
    struct FailingReader {
        data: Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.read(buf)?;
            if n == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "device went away"));
            }
            Ok(n)
        }
    }

    const OVERRIDES: &str = "text_color=#ff0000\nindicator=#00ff00\n# comment\n\nbogusline\nunknown_key=xyz";

    // ========== line parsing ==========

    #[test]
    fn test_apply_line_skips_noise() {
        let mut p = Palette::default();
        assert!(!apply_line(&mut p, ""));
        assert!(!apply_line(&mut p, "    "));
        assert!(!apply_line(&mut p, "# text_color=#000000"));
        assert!(!apply_line(&mut p, "  # not a key = value"));
        assert!(!apply_line(&mut p, "text_color"));
        assert!(!apply_line(&mut p, "unknown_key=xyz"));
        assert!(!apply_line(&mut p, "Text_Color=#000000"));
        assert_eq!(p, Palette::default());
    }

    #[test]
    fn test_apply_line_trims_both_sides() {
        let mut p = Palette::default();
        assert!(apply_line(&mut p, "text_color = #112233"));
        assert_eq!(p.text_color, "#112233");

        assert!(apply_line(&mut p, "\t indicator\t=\t#445566   "));
        assert_eq!(p.indicator, "#445566");
    }

    #[test]
    fn test_apply_line_splits_on_first_equals() {
        let mut p = Palette::default();
        assert!(apply_line(&mut p, "input_prompt=a=b"));
        assert_eq!(p.input_prompt, "a=b");
    }

    #[test]
    fn test_apply_line_keeps_value_verbatim() {
        let mut p = Palette::default();
        assert!(apply_line(&mut p, "selected_bg=\"#ABCDEF\" # trailing"));
        assert_eq!(p.selected_bg, "\"#ABCDEF\" # trailing");

        assert!(apply_line(&mut p, "selected_text="));
        assert_eq!(p.selected_text, "");
    }

    #[test]
    fn test_parse_palette_overrides_seed() {
        let p = parse_palette(Cursor::new(OVERRIDES), Palette::default()).unwrap();

        let mut expected = Palette::default();
        expected.text_color = "#ff0000".to_string();
        expected.indicator = "#00ff00".to_string();
        assert_eq!(p, expected);
    }

    #[test]
    fn test_parse_palette_crlf_and_later_lines_win() {
        let input = "text_color=#111111\r\ntext_color=#222222\r\n";
        let p = parse_palette(Cursor::new(input), Palette::rose_pine()).unwrap();
        assert_eq!(p.text_color, "#222222");
        assert_eq!(p.indicator, Palette::rose_pine().indicator);
    }

    #[test]
    fn test_parse_palette_reports_partial_on_read_failure() {
        let reader = BufReader::new(FailingReader {
            data: Cursor::new(b"text_color=#ff0000\n".to_vec()),
        });
        let err = parse_palette(reader, Palette::default()).unwrap_err();

        assert_eq!(err.partial().text_color, "#ff0000");
        assert_eq!(err.partial().indicator, "#ffffff");
        assert!(err.to_string().contains("device went away"));
        assert_eq!(err.into_partial().text_color, "#ff0000");
    }

    #[test]
    fn test_round_trip_every_key() {
        for key in Palette::KEYS {
            let base = config_with(format!("  {} =  #0a0B0c  \n", key).as_bytes());
            let p = PaletteResolver::with_config_dir(base.path()).load("custom").unwrap();
            assert_eq!(p.get(key), Some("#0a0B0c"), "key {}", key);

            for other in Palette::KEYS.iter().filter(|k| **k != key) {
                assert_eq!(p.get(other), Palette::default().get(other));
            }
        }
    }

    // ========== resolution order ==========

    #[test]
    fn test_builtin_names_ignore_config_file() {
        let base = config_with(b"text_color=#ff0000\n");
        let resolver = PaletteResolver::with_config_dir(base.path());

        assert_eq!(resolver.load("").unwrap(), Palette::default());
        assert_eq!(resolver.load("default").unwrap(), Palette::default());
        assert_eq!(resolver.load("rose-pine").unwrap(), Palette::rose_pine());
    }

    #[test]
    fn test_builtin_names_without_config_dir() {
        let resolver = PaletteResolver::with_config_dir("/nonexistent/algo-test-base");
        assert_eq!(resolver.resolve("rose-pine"), Palette::rose_pine());
        assert_eq!(resolver.resolve("default"), Palette::default());
        assert_eq!(resolver.resolve(""), Palette::default());
    }

    #[test]
    fn test_missing_file_is_default_without_error() {
        let base = tempfile::tempdir().unwrap();
        let resolver = PaletteResolver::with_config_dir(base.path());

        assert_eq!(resolver.load("my-theme").unwrap(), Palette::default());
        assert_eq!(resolver.resolve("anything"), Palette::default());
    }

    #[test]
    fn test_unknown_name_reads_config_file() {
        let base = config_with(OVERRIDES.as_bytes());
        let p = PaletteResolver::with_config_dir(base.path()).load("user").unwrap();

        assert_eq!(p.text_color, "#ff0000");
        assert_eq!(p.indicator, "#00ff00");
        assert_eq!(p.selected_bg, "#ffffff");
        assert_eq!(p.selected_text, "#000000");
        assert_eq!(p.input_text, "#ffffff");
        assert_eq!(p.input_placeholder, "#808080");
        assert_eq!(p.input_prompt, "#ffffff");
    }

    #[test]
    fn test_user_file_seeds_from_default_not_named_builtin() {
        // "Rose-Pine" is not a built-in (case-sensitive), so only the file applies
        let base = config_with(b"indicator=#010203\n");
        let p = PaletteResolver::with_config_dir(base.path()).resolve("Rose-Pine");
        assert_eq!(p.indicator, "#010203");
        assert_eq!(p.text_color, Palette::default().text_color);
    }

    #[test]
    fn test_invalid_utf8_line_does_not_stop_parsing() {
        let base = config_with(b"text_color=#ff0000\n# caf\xe9\n\xff\xfe\nindicator=#00ff00\n");
        let resolver = PaletteResolver::with_config_dir(base.path());

        let p = resolver.load("user").unwrap();
        assert_eq!(p.text_color, "#ff0000");
        assert_eq!(p.indicator, "#00ff00");
        assert_eq!(resolver.resolve("user"), p);
    }

    #[test]
    fn test_invalid_utf8_value_is_kept_lossily() {
        let p = parse_palette(Cursor::new(&b"input_prompt=#ab\xffcd\r\n"[..]), Palette::default()).unwrap();
        assert_eq!(p.input_prompt, "#ab\u{fffd}cd");
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_in_place_of_file_is_scan_error() {
        let base = tempfile::tempdir().unwrap();
        fs::create_dir_all(config::theme_path_in(base.path())).unwrap();
        let resolver = PaletteResolver::with_config_dir(base.path());

        assert!(resolver.load("user").is_err());
        assert_eq!(resolver.resolve("user"), Palette::default());
    }

    #[test]
    fn test_platform_load_palette_builtin_names() {
        // built-in names resolve whether or not the platform has a config dir
        assert_eq!(load_palette("").unwrap(), Palette::default());
        assert_eq!(load_palette("default").unwrap(), Palette::default());
        assert_eq!(load_palette("rose-pine").unwrap(), Palette::rose_pine());
        assert_eq!(resolve("rose-pine"), Palette::rose_pine());
    }

    #[test]
    fn test_no_config_dir_falls_back_to_default() {
        let resolver = PaletteResolver { config_base: None };
        if resolver.theme_path().is_none() {
            assert_eq!(resolver.load("user").unwrap(), Palette::default());
        }
        // a base dir that does not exist behaves the same way
        let missing = PaletteResolver::with_config_dir("/nonexistent/algo-test-base");
        assert_eq!(missing.load("user").unwrap(), Palette::default());
    }

    #[test]
    fn test_theme_path_uses_override() {
        let resolver = PaletteResolver::with_config_dir("/srv/cfg");
        assert_eq!(resolver.theme_path(), Some(PathBuf::from("/srv/cfg/algo/theme.conf")));
    }
}
