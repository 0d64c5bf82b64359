//! Configuration for loading themes.
//!
//! [`ThemeConfig`] tells a [`ThemeLoader`](crate::ThemeLoader) where
//! to look for themes, which theme to fall back to, and how large
//! the image cache may grow.
//!
//! # Example
//!
//! ```rust
//! use toaru_render::config::{ThemeConfig, no_checks};
//!
//! let config = ThemeConfig::builder()
//!     .default_theme("Onyx")
//!     .search_path("/opt/themes")
//!     .finish(no_checks)
//!     .expect("invalid config");
//!
//! assert_eq!(config.default_theme(), "Onyx");
//! ```
use std::path::{Path, PathBuf};

use crate::{RenderError::InvalidConfig, Result};

/// The theme loaded when the requested theme cannot be.
pub const DEFAULT_THEME: &str = "Clearlooks";

/// The default number of resized pictures kept per image.
pub const DEFAULT_MAX_RESIZED: usize = 3;

/// The subdirectory of a theme holding the openbox theme file.
pub const THEME_SUBDIR: &str = "openbox-3";

/// The name of the theme file itself.
pub const THEME_FILE: &str = "themerc";

/// Configuration used by a `ThemeLoader` and its `RenderInstance`.
///
/// Search paths are tried in order; the first one that holds
/// `<name>/openbox-3/themerc` wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeConfig {
    /// Directories searched for themes.
    pub(crate) search_paths: Vec<PathBuf>,
    /// Theme loaded when the requested one fails.
    pub(crate) default_theme: String,
    /// Maximum resized pictures kept per cached image.
    pub(crate) max_resized: usize,
}

/// A const function that simply returns Ok. Pass this into validate if you have no
/// user-defined checks to run.
pub const fn no_checks(_: &ThemeConfig) -> Result<()> {
    Ok(())
}

impl ThemeConfig {
    /// Returns the default construction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a [`ThemeConfigBuilder`] to build your config with the
    /// 'builder' idiom.
    pub fn builder() -> ThemeConfigBuilder {
        ThemeConfigBuilder::new()
    }

    /// Checks the configuration to verify that all invariants are upheld.
    ///
    /// If you have no code you want to insert, pass in [`no_checks`] as a
    /// function pointer.
    pub fn validate<F>(&self, checks: F) -> Result<()>
    where
        F: FnOnce(&ThemeConfig) -> Result<()>,
    {
        if self.search_paths.is_empty() {
            return Err(InvalidConfig("no theme search paths".into()));
        }
        if self.default_theme.is_empty() {
            return Err(InvalidConfig("default theme name is empty".into()));
        }
        if self.default_theme.contains('/') {
            return Err(InvalidConfig(format!(
                "default theme '{}' is not a plain name",
                self.default_theme
            )));
        }
        if self.max_resized == 0 {
            return Err(InvalidConfig("image cache must keep at least one resize".into()));
        }
        checks(self)?;
        Ok(())
    }

    /// The directories searched for themes, in order.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// The name of the fallback theme.
    pub fn default_theme(&self) -> &str {
        &self.default_theme
    }

    /// The maximum number of resized pictures kept per image.
    pub fn max_resized(&self) -> usize {
        self.max_resized
    }

    /// Returns every candidate theme file for `name`, in search order.
    ///
    /// A name that is already a path to a directory is tried first.
    pub fn theme_files(&self, name: &str) -> Vec<PathBuf> {
        let mut ret = Vec::with_capacity(self.search_paths.len() + 1);
        let direct = Path::new(name);
        if direct.is_absolute() {
            ret.push(direct.join(THEME_SUBDIR).join(THEME_FILE));
        }
        ret.extend(
            self.search_paths
                .iter()
                .map(|dir| dir.join(name).join(THEME_SUBDIR).join(THEME_FILE)),
        );
        ret
    }
}

impl Default for ThemeConfig {
    fn default() -> ThemeConfig {
        ThemeConfig {
            search_paths: default_search_paths(),
            default_theme: DEFAULT_THEME.into(),
            max_resized: DEFAULT_MAX_RESIZED,
        }
    }
}

/// The user's data directory and home directory first, then the system one.
fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(data) = dirs::data_dir() {
        paths.push(data.join("themes"));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".themes"));
    }
    paths.push(PathBuf::from("/usr/share/themes"));
    paths
}

/// A helper type to construct a [`ThemeConfig`].
#[derive(Debug, Default)]
pub struct ThemeConfigBuilder {
    inner: ThemeConfig,
}

impl ThemeConfigBuilder {
    /// Creates a new `ThemeConfigBuilder`.
    pub fn new() -> Self {
        Self {
            inner: ThemeConfig::default(),
        }
    }

    /// Replaces the search paths entirely.
    pub fn search_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.inner.search_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a search path in front of the existing ones.
    pub fn search_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.inner.search_paths.insert(0, path.into());
        self
    }

    /// Sets the fallback theme name.
    pub fn default_theme<S: Into<String>>(mut self, name: S) -> Self {
        self.inner.default_theme = name.into();
        self
    }

    /// Sets how many resized pictures each image keeps.
    pub fn max_resized(mut self, max: usize) -> Self {
        self.inner.max_resized = max;
        self
    }

    /// Finishes construction, validates the config and returns
    /// it if validation is successful.
    ///
    /// You can supply an additional `check` to run
    /// additional code to validate your config.
    pub fn finish<F>(self, check: F) -> Result<ThemeConfig>
    where
        F: FnOnce(&ThemeConfig) -> Result<()>,
    {
        let config = self.inner;
        config.validate(check)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderError;

    #[test]
    fn test_default_config_is_valid() {
        let config = ThemeConfig::new();
        config.validate(no_checks).expect("default config invalid");
        assert_eq!(config.default_theme(), DEFAULT_THEME);
        assert_eq!(config.max_resized(), DEFAULT_MAX_RESIZED);
        assert!(config
            .search_paths()
            .contains(&PathBuf::from("/usr/share/themes")));
    }

    #[test]
    fn test_builder_rejects_invalid() {
        let empty = ThemeConfig::builder()
            .search_paths(Vec::<PathBuf>::new())
            .finish(no_checks);
        assert!(matches!(empty, Err(RenderError::InvalidConfig(_))));

        let zero = ThemeConfig::builder().max_resized(0).finish(no_checks);
        assert!(zero.is_err());

        let slashed = ThemeConfig::builder().default_theme("a/b").finish(no_checks);
        assert!(slashed.is_err());
    }

    #[test]
    fn test_user_checks_run() {
        let res = ThemeConfig::builder().finish(|cfg: &ThemeConfig| {
            if cfg.default_theme() == "Onyx" {
                Ok(())
            } else {
                Err(InvalidConfig("want Onyx".into()))
            }
        });
        assert!(res.is_err());
    }

    #[test]
    fn test_theme_files_order() {
        let config = ThemeConfig::builder()
            .search_paths(["/a", "/b"])
            .finish(no_checks)
            .unwrap();
        let files = config.theme_files("Bear2");
        assert_eq!(
            files,
            vec![
                PathBuf::from("/a/Bear2/openbox-3/themerc"),
                PathBuf::from("/b/Bear2/openbox-3/themerc"),
            ]
        );
    }
}
