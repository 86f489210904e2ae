//! Sub-extension loader configuration.

use serde::{Deserialize, Serialize};

/// Settings controlling how candidates are recognized and bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Key-file group every descriptor must carry.
    #[serde(default = "default_descriptor_group")]
    pub descriptor_group: String,
    /// File extension of descriptor files, without the dot.
    #[serde(default = "default_descriptor_extension")]
    pub descriptor_extension: String,
    /// File extension of code modules, without the dot.
    #[serde(default = "default_module_extension")]
    pub module_extension: String,
    /// Symbol every code module must export.
    #[serde(default = "default_factory_symbol")]
    pub factory_symbol: String,
    /// Locale used for localized descriptor keys. Falls back to the
    /// environment (`LC_ALL`, `LC_MESSAGES`, `LANG`) when unset.
    #[serde(default)]
    pub locale: Option<String>,
}

impl LoaderConfig {
    /// Returns the locale to use for localized lookups, if any.
    ///
    /// The codeset suffix (`.UTF-8`) is stripped; `C` and `POSIX` mean
    /// "no locale".
    pub fn effective_locale(&self) -> Option<String> {
        let raw = self.locale.clone().or_else(|| {
            ["LC_ALL", "LC_MESSAGES", "LANG"]
                .iter()
                .filter_map(|var| std::env::var(var).ok())
                .find(|value| !value.is_empty())
        })?;

        normalize_locale(&raw)
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            descriptor_group: default_descriptor_group(),
            descriptor_extension: default_descriptor_extension(),
            module_extension: default_module_extension(),
            factory_symbol: default_factory_symbol(),
            locale: None,
        }
    }
}

fn normalize_locale(raw: &str) -> Option<String> {
    // ll_CC.codeset@modifier -> ll_CC@modifier
    let (base, modifier) = match raw.split_once('@') {
        Some((base, modifier)) => (base, Some(modifier)),
        None => (raw, None),
    };
    let base = base.split('.').next().unwrap_or(base);

    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }

    Some(match modifier {
        Some(modifier) => format!("{base}@{modifier}"),
        None => base.to_string(),
    })
}

fn default_descriptor_group() -> String {
    "modproxy".to_string()
}

fn default_descriptor_extension() -> String {
    "plugin".to_string()
}

fn default_module_extension() -> String {
    std::env::consts::DLL_EXTENSION.to_string()
}

fn default_factory_symbol() -> String {
    "modproxy_create_extension".to_string()
}
