//! Startup settings from the command line and the environment.
//!
//! Each source produces a [`ConfigFlags`]; [`ConfigFlags::union`] layers them
//! so the later source wins option by option. Nothing is written back.

use std::path::PathBuf;

use crate::highlight::{Background, set_background};

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "MDPANE_";

#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThemeMode {
    #[default]
    Auto,
    Light,
    Dark,
}

impl ThemeMode {
    /// Install this choice as the highlight background.
    pub fn apply(self) {
        set_background(match self {
            Self::Auto => None,
            Self::Light => Some(Background::Light),
            Self::Dark => Some(Background::Dark),
        });
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub split_width: Option<u16>,
    pub sync_render_limit: Option<usize>,
    pub export_dir: Option<PathBuf>,
    pub file_name: Option<String>,
    pub secondary_tty: Option<PathBuf>,
    pub theme: Option<ThemeMode>,
    pub gfm: bool,
    pub perf: bool,
    pub render_debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Layer `other` over `self`: options set in `other` win, switches add up.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            split_width: other.split_width.or(self.split_width),
            sync_render_limit: other.sync_render_limit.or(self.sync_render_limit),
            export_dir: other.export_dir.clone().or_else(|| self.export_dir.clone()),
            file_name: other.file_name.clone().or_else(|| self.file_name.clone()),
            secondary_tty: other
                .secondary_tty
                .clone()
                .or_else(|| self.secondary_tty.clone()),
            theme: other.theme.or(self.theme),
            gfm: self.gfm || other.gfm,
            perf: self.perf || other.perf,
            render_debug_log: other
                .render_debug_log
                .clone()
                .or_else(|| self.render_debug_log.clone()),
        }
    }

    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(format!("{ENV_PREFIX}{name}")).ok())
    }

    /// Read overrides through `lookup`, which receives names without the
    /// `MDPANE_` prefix. Unparseable values are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Self {
            split_width: get("SPLIT_WIDTH").and_then(|v| parse_number("SPLIT_WIDTH", &v)),
            sync_render_limit: get("SYNC_RENDER_LIMIT")
                .and_then(|v| parse_number("SYNC_RENDER_LIMIT", &v)),
            export_dir: get("EXPORT_DIR").map(PathBuf::from),
            file_name: get("FILE_NAME"),
            secondary_tty: get("SECONDARY_TTY").map(PathBuf::from),
            theme: get("THEME").and_then(|v| parse_theme(&v)),
            gfm: get("GFM").is_some_and(|v| parse_switch(&v)),
            perf: get("PERF").is_some_and(|v| parse_switch(&v)),
            render_debug_log: get("RENDER_DEBUG_LOG").map(PathBuf::from),
        }
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Option<T> {
    let parsed = value.parse().ok();
    if parsed.is_none() {
        tracing::warn!(var = %format!("{ENV_PREFIX}{name}"), value, "ignoring unparseable value");
    }
    parsed
}

fn parse_switch(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_theme(s: &str) -> Option<ThemeMode> {
    match s {
        "auto" => Some(ThemeMode::Auto),
        "light" => Some(ThemeMode::Light),
        "dark" => Some(ThemeMode::Dark),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_reads_known_variables() {
        let flags = ConfigFlags::from_lookup(lookup(&[
            ("SPLIT_WIDTH", "90"),
            ("EXPORT_DIR", "/tmp/out"),
            ("SECONDARY_TTY", "/dev/pts/3"),
            ("THEME", "light"),
            ("GFM", "yes"),
            ("RENDER_DEBUG_LOG", "render.log"),
        ]));
        assert_eq!(flags.split_width, Some(90));
        assert_eq!(flags.export_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(flags.secondary_tty, Some(PathBuf::from("/dev/pts/3")));
        assert_eq!(flags.theme, Some(ThemeMode::Light));
        assert!(flags.gfm);
        assert!(!flags.perf);
        assert_eq!(flags.render_debug_log, Some(PathBuf::from("render.log")));
    }

    #[test]
    fn test_bad_values_are_ignored() {
        let flags = ConfigFlags::from_lookup(lookup(&[
            ("SPLIT_WIDTH", "wide"),
            ("SYNC_RENDER_LIMIT", "-1"),
            ("THEME", "purple"),
            ("EXPORT_DIR", "   "),
        ]));
        assert_eq!(flags, ConfigFlags::default());
    }

    #[test]
    fn test_config_union_prefers_later_options() {
        let env = ConfigFlags {
            split_width: Some(80),
            export_dir: Some(PathBuf::from("env")),
            perf: true,
            theme: Some(ThemeMode::Light),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            split_width: Some(120),
            gfm: true,
            theme: Some(ThemeMode::Dark),
            ..ConfigFlags::default()
        };
        let merged = env.union(&cli);
        assert_eq!(merged.split_width, Some(120));
        assert_eq!(merged.export_dir, Some(PathBuf::from("env")));
        assert_eq!(merged.theme, Some(ThemeMode::Dark));
        assert!(merged.perf);
        assert!(merged.gfm);
    }
}
