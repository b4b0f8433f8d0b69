//! CSS custom properties for the accent color.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser dashboard writes these onto `document.documentElement`; this
//! server keeps them in a [`StyleMap`] and serves it as `/theme.css`. Both
//! go through the [`ThemeSink`] seam so the projection logic is shared.

#[cfg(test)]
#[path = "css_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::color::ColorVariants;
use crate::settings::SettingsSnapshot;

/// Component-library tokens that follow the accent color.
pub const MAIN_COLOR_ALIASES: &[&str] = &["--primary", "--ring", "--sidebar-primary", "--sidebar-ring", "--chart-1"];

/// Target for CSS custom properties, typically the document root.
pub trait ThemeSink: Send + Sync {
    fn set_property(&self, name: &str, value: &str);
}

/// In-memory set of custom properties.
#[derive(Debug, Default)]
pub struct StyleMap {
    props: Mutex<BTreeMap<String, String>>,
}

impl StyleMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn props(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.props
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.props().get(name).cloned()
    }

    /// Render as a `:root` rule. Values that could close the declaration or
    /// the rule are left out.
    #[must_use]
    pub fn to_css(&self) -> String {
        let mut css = String::from(":root {\n");
        for (name, value) in self.props().iter() {
            if !is_safe_css_value(value) {
                tracing::warn!(%name, %value, "skipping unsafe css value");
                continue;
            }
            let _ = writeln!(css, "  {name}: {value};");
        }
        css.push_str("}\n");
        css
    }
}

fn is_safe_css_value(value: &str) -> bool {
    !value.is_empty() && !value.contains([';', '{', '}', '<', '\\', '\n', '\r'])
}

impl ThemeSink for StyleMap {
    fn set_property(&self, name: &str, value: &str) {
        self.props().insert(name.to_owned(), value.to_owned());
    }
}

/// Write the accent variables for `main_color` onto `sink`.
pub fn apply_main_color(sink: &dyn ThemeSink, main_color: &str) -> ColorVariants {
    let variants = ColorVariants::derive(main_color);
    sink.set_property("--main-color", &variants.base);
    sink.set_property("--main-color-hover", &variants.hover);
    sink.set_property("--main-color-dark", &variants.dark);
    sink.set_property("--main-color-light", &variants.light);
    for alias in MAIN_COLOR_ALIASES {
        sink.set_property(alias, &variants.base);
    }
    variants
}

/// Keep `sink` in step with the settings' main color, using `fallback` while
/// no color is configured. Variables are rewritten only when the color changes.
#[must_use]
pub fn spawn_theme_projection(
    mut settings: watch::Receiver<SettingsSnapshot>,
    sink: Arc<dyn ThemeSink>,
    fallback: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut applied: Option<String> = None;
        loop {
            let color = settings
                .borrow_and_update()
                .main_color()
                .map_or_else(|| fallback.clone(), str::to_owned);
            if applied.as_deref() != Some(color.as_str()) {
                tracing::debug!(%color, "applying accent color");
                apply_main_color(sink.as_ref(), &color);
                applied = Some(color);
            }
            if settings.changed().await.is_err() {
                break;
            }
        }
    })
}
