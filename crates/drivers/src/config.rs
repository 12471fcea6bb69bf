use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image_manager_application::{CompressionSettings, ExportSettings, ServiceSettings};
use image_manager_domain::SortKey;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub output_dir: PathBuf,
    pub archive_file_name: String,
    pub archive_folder: String,
    pub decode_workers: usize,
    pub sort_key: SortKey,
    pub compression: CompressionSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            archive_file_name: "export.zip".to_string(),
            archive_folder: "compress".to_string(),
            decode_workers: 4,
            sort_key: SortKey::FileName,
            compression: CompressionSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads a TOML config file, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            decode_workers: self.decode_workers,
            export: ExportSettings {
                archive_folder: self.archive_folder.clone(),
                archive_file_name: self.archive_file_name.clone(),
                compression: self.compression,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use image_manager_domain::ImageFormat;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn default_config_exports_webp_into_current_dir() {
        let config = AppConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.archive_file_name, "export.zip");
        assert_eq!(config.archive_folder, "compress");
        assert_eq!(config.compression.format, ImageFormat::Webp);
        assert_eq!(config.sort_key, SortKey::FileName);
    }

    #[test]
    fn missing_path_means_defaults() {
        let config = AppConfig::load(None).expect("defaults");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_given_values() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("image-manager.toml");
        fs::write(
            &path,
            r#"
archive_file_name = "album.zip"
sort_key = "ingestion"

[compression]
format = "jpeg"
quality = 80
"#,
        )
        .expect("write");

        let config = AppConfig::load(Some(&path)).expect("load");
        assert_eq!(config.archive_file_name, "album.zip");
        assert_eq!(config.sort_key, SortKey::Ingestion);
        assert_eq!(config.compression.format, ImageFormat::Jpeg);
        assert_eq!(config.compression.quality, 80);
        assert_eq!(config.compression.ratio_percent, 100);
        assert_eq!(config.archive_folder, "compress");

        let settings = config.service_settings();
        assert_eq!(settings.export.archive_file_name, "album.zip");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("bad.toml");
        fs::write(&path, "archive_name = \"x.zip\"\n").expect("write");
        assert!(AppConfig::load(Some(&path)).is_err());
    }
}
