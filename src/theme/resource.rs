//! Lookups in an X resource database holding a theme.

use std::fmt;
use std::path::Path;

use tracing::warn;
use x11rb::resource_manager::Database;

/// Derives the resource class of a dotted name by upper-casing the
/// first letter of every component.
///
/// ```rust
/// use toaru_render::theme::class_name;
///
/// assert_eq!(class_name("window.active.title.bg"), "Window.Active.Title.Bg");
/// ```
pub fn class_name(name: &str) -> String {
    let mut class = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            class.extend(c.to_uppercase());
        } else {
            class.push(c);
        }
        upper = c == '.';
    }
    class
}

/// A theme's resource database.
pub struct ThemeDb {
    db: Database,
}

impl fmt::Debug for ThemeDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeDb").finish_non_exhaustive()
    }
}

impl ThemeDb {
    /// Parses resource file contents.
    pub fn from_data(data: &[u8]) -> Self {
        Self {
            db: Database::new_from_data(data),
        }
    }

    /// Parses resource file contents, resolving `#include` lines
    /// relative to `dir`.
    pub fn from_data_in<P: AsRef<Path>>(data: &[u8], dir: P) -> Self {
        Self {
            db: Database::new_from_data_with_base_directory(data, dir.as_ref()),
        }
    }

    /// The trimmed value of `name`, if set and not blank.
    pub fn string(&self, name: &str) -> Option<&str> {
        self.db
            .get_string(name, &class_name(name))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The first of `names` that is set.
    pub fn first<'a, I>(&self, names: I) -> Option<&str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names.into_iter().find_map(|n| self.string(n))
    }

    /// The integer value of `name`, if set, parseable, and within
    /// `min..=max`.
    pub fn int(&self, name: &str, min: i32, max: i32) -> Option<i32> {
        let value = self.string(name)?.parse::<i32>().ok()?;
        if value < min || value > max {
            warn!("{} = {} is outside {}..={}, ignoring", name, value, min, max);
            return None;
        }
        Some(value)
    }
}
