//! Sub-extension descriptor files.

use std::path::{Path, PathBuf};

use serde::Serialize;

use modproxy_core::config::LoaderConfig;
use modproxy_core::error::ErrorKind;
use modproxy_core::{KeyFile, ProxyError, ProxyResult};

/// Parsed contents of a descriptor file. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    /// Path of the descriptor file.
    pub path: PathBuf,
    /// File name without extension; shared with the code module.
    pub stem: String,
    /// Display name, localized. Never empty.
    pub name: String,
    /// Description, localized. Empty if absent.
    pub description: String,
    /// Version string. Empty if absent.
    pub version: String,
    /// Author. Empty if absent.
    pub author: String,
    /// Help resource reference. Empty if absent.
    pub help_uri: String,
    /// Whether the sub-extension offers a configuration panel.
    pub configurable: bool,
}

impl Descriptor {
    /// Reads and validates the descriptor at `path`.
    pub fn from_file(path: &Path, config: &LoaderConfig) -> ProxyResult<Self> {
        let keyfile = KeyFile::load(path).map_err(|e| {
            ProxyError::with_source(
                ErrorKind::Descriptor,
                format!("Failed to read descriptor '{}'", path.display()),
                e,
            )
        })?;
        Self::from_keyfile(path, &keyfile, config)
    }

    /// Builds a descriptor from an already parsed key file.
    pub fn from_keyfile(path: &Path, keyfile: &KeyFile, config: &LoaderConfig) -> ProxyResult<Self> {
        let group = config.descriptor_group.as_str();
        if !keyfile.has_group(group) {
            return Err(ProxyError::descriptor(format!(
                "Descriptor '{}' has no [{}] group",
                path.display(),
                group
            )));
        }

        let locale = config.effective_locale();
        let localized = |key: &str| {
            keyfile
                .locale_string(group, key, locale.as_deref())
                .unwrap_or_default()
                .trim()
                .to_string()
        };
        let plain = |key: &str| {
            keyfile
                .string(group, key)
                .unwrap_or_default()
                .trim()
                .to_string()
        };

        let name = localized("name");
        if name.is_empty() {
            return Err(ProxyError::descriptor(format!(
                "Descriptor '{}' has no name",
                path.display()
            )));
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                ProxyError::descriptor(format!("Descriptor '{}' has no usable stem", path.display()))
            })?
            .to_string();

        Ok(Self {
            path: path.to_path_buf(),
            stem,
            name,
            description: localized("description"),
            version: plain("version"),
            author: plain("author"),
            help_uri: plain("help_uri"),
            configurable: keyfile.boolean(group, "configurable").unwrap_or(false),
        })
    }

    /// Whether a help resource is declared.
    pub fn provides_help(&self) -> bool {
        !self.help_uri.is_empty()
    }

    /// Path of the code module that must accompany this descriptor.
    pub fn module_path(&self, config: &LoaderConfig) -> PathBuf {
        self.path.with_extension(&config.module_extension)
    }
}
