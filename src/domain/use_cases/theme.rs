use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

/// Light/dark preference shared by every page of the process.
#[derive(Debug, Default)]
pub struct ThemeStore {
    dark: AtomicBool,
}

impl ThemeStore {
    pub fn new(dark: bool) -> Self {
        ThemeStore { dark: AtomicBool::new(dark) }
    }

    pub fn is_dark(&self) -> bool {
        self.dark.load(Ordering::Relaxed)
    }

    pub fn theme(&self) -> Theme {
        if self.is_dark() { Theme::Dark } else { Theme::Light }
    }

    /// Flips the mode and returns the new one.
    pub fn toggle(&self) -> Theme {
        let was_dark = self.dark.fetch_xor(true, Ordering::Relaxed);
        if was_dark { Theme::Light } else { Theme::Dark }
    }

    pub fn set(&self, dark: bool) {
        self.dark.store(dark, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_and_reports_new_mode() {
        let store = ThemeStore::new(false);
        assert_eq!(store.toggle(), Theme::Dark);
        assert!(store.is_dark());
        assert_eq!(store.toggle(), Theme::Light);
        store.set(true);
        assert_eq!(store.theme(), Theme::Dark);
    }
}
