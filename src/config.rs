use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::access::{validate_identity, AccessPolicy, PermissionLevel};
use crate::editor::{
    EditorSettings, DEFAULT_NEW_ZONE_CENTER, DEFAULT_NEW_ZONE_RADIUS, DEFAULT_NEW_ZONE_SIDES,
    DEFAULT_PICK_RADIUS,
};
use crate::geometry::Point;
use crate::ingest::SourceConfig;

const DEFAULT_SOURCE_URL: &str = "stub://warehouse";
const DEFAULT_TARGET_FPS: u32 = 10;
const DEFAULT_WIDTH: u32 = 800;
const DEFAULT_HEIGHT: u32 = 600;
const DEFAULT_IDENTITIES: &[&str] = &["niraj", "sovit"];

#[derive(Debug, Deserialize, Default)]
struct MonitorConfigFile {
    source: Option<SourceConfigFile>,
    access_levels: Option<BTreeMap<String, PermissionLevel>>,
    editor: Option<EditorConfigFile>,
    alerts: Option<AlertsConfigFile>,
    evaluate_while_editing: Option<bool>,
    devices: Option<Vec<DeviceConfig>>,
}

#[derive(Debug, Deserialize, Default)]
struct SourceConfigFile {
    url: Option<String>,
    target_fps: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
    max_frames: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct EditorConfigFile {
    pick_radius: Option<f64>,
    new_zone_center: Option<Point>,
    new_zone_radius: Option<u32>,
    new_zone_sides: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct AlertsConfigFile {
    db_path: Option<String>,
}

/// A camera the operator may pick by id and passcode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceConfig {
    pub id: String,
    pub passcode: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceRegistry {
    devices: Vec<DeviceConfig>,
}

impl DeviceRegistry {
    pub fn new(devices: Vec<DeviceConfig>) -> Self {
        Self { devices }
    }

    /// Stream URL for a device when the passcode matches.
    pub fn verify(&self, device_id: &str, passcode: &str) -> Option<&str> {
        self.devices
            .iter()
            .find(|device| device.id == device_id && device.passcode == passcode)
            .map(|device| device.url.as_str())
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub source: SourceConfig,
    pub access_levels: BTreeMap<String, PermissionLevel>,
    pub editor: EditorSettings,
    /// SQLite alert journal; `None` keeps alerts in memory.
    pub alert_db_path: Option<String>,
    /// Run detection while edit mode is on.
    pub evaluate_while_editing: bool,
    pub devices: DeviceRegistry,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::from_file(MonitorConfigFile::default())
    }
}

impl MonitorConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("ZONEGUARD_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from an explicit file, still honouring environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut cfg = Self::from_file(read_config_file(path)?);
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: MonitorConfigFile) -> Self {
        let source_file = file.source.unwrap_or_default();
        let source = SourceConfig {
            url: source_file
                .url
                .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string()),
            target_fps: source_file.target_fps.unwrap_or(DEFAULT_TARGET_FPS),
            width: source_file.width.unwrap_or(DEFAULT_WIDTH),
            height: source_file.height.unwrap_or(DEFAULT_HEIGHT),
            max_frames: source_file.max_frames,
        };
        let access_levels = file.access_levels.unwrap_or_else(|| {
            DEFAULT_IDENTITIES
                .iter()
                .map(|name| (name.to_string(), PermissionLevel::General))
                .collect()
        });
        let editor_file = file.editor.unwrap_or_default();
        let editor = EditorSettings {
            pick_radius: editor_file.pick_radius.unwrap_or(DEFAULT_PICK_RADIUS),
            new_zone_center: editor_file
                .new_zone_center
                .unwrap_or(DEFAULT_NEW_ZONE_CENTER),
            new_zone_radius: editor_file
                .new_zone_radius
                .unwrap_or(DEFAULT_NEW_ZONE_RADIUS),
            new_zone_sides: editor_file.new_zone_sides.unwrap_or(DEFAULT_NEW_ZONE_SIDES),
        };
        Self {
            source,
            access_levels,
            editor,
            alert_db_path: file.alerts.and_then(|alerts| alerts.db_path),
            evaluate_while_editing: file.evaluate_while_editing.unwrap_or(true),
            devices: DeviceRegistry::new(file.devices.unwrap_or_default()),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("ZONEGUARD_SOURCE_URL") {
            if !url.trim().is_empty() {
                self.source.url = url;
            }
        }
        if let Ok(fps) = std::env::var("ZONEGUARD_TARGET_FPS") {
            self.source.target_fps = fps
                .trim()
                .parse()
                .map_err(|_| anyhow!("ZONEGUARD_TARGET_FPS must be an integer"))?;
        }
        if let Ok(admins) = std::env::var("ZONEGUARD_ADMINS") {
            for name in split_csv(&admins) {
                self.access_levels.insert(name, PermissionLevel::Admin);
            }
        }
        if let Ok(path) = std::env::var("ZONEGUARD_ALERT_DB") {
            if !path.trim().is_empty() {
                self.alert_db_path = Some(path);
            }
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        for identity in self.access_levels.keys() {
            validate_identity(identity)?;
        }
        if self.source.width == 0 || self.source.height == 0 {
            return Err(anyhow!("frame width and height must be greater than zero"));
        }
        if self.source.target_fps == 0 {
            return Err(anyhow!("target_fps must be >= 1"));
        }
        if self.editor.pick_radius.is_nan() || self.editor.pick_radius <= 0.0 {
            return Err(anyhow!("editor pick_radius must be greater than zero"));
        }
        if self.editor.new_zone_sides < 3 {
            return Err(anyhow!("editor new_zone_sides must be at least 3"));
        }
        Ok(())
    }

    pub fn access_policy(&self) -> Result<AccessPolicy> {
        AccessPolicy::from_levels(
            self.access_levels
                .iter()
                .map(|(name, level)| (name.clone(), *level)),
        )
    }

    /// Identities known to the access table, in name order.
    pub fn identities(&self) -> Vec<String> {
        self.access_levels.keys().cloned().collect()
    }
}

fn read_config_file(path: &Path) -> Result<MonitorConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_startup_layout() {
        let cfg = MonitorConfig::default();
        assert_eq!(cfg.source.url, "stub://warehouse");
        assert_eq!((cfg.source.width, cfg.source.height), (800, 600));
        assert_eq!(cfg.editor.pick_radius, 20.0);
        assert!(cfg.evaluate_while_editing);
        assert!(cfg.alert_db_path.is_none());
        assert_eq!(cfg.identities(), vec!["niraj", "sovit"]);
        let policy = cfg.access_policy().unwrap();
        assert_eq!(policy.permission("niraj"), PermissionLevel::General);
    }

    #[test]
    fn device_registry_checks_passcode() {
        let devices = DeviceRegistry::new(vec![DeviceConfig {
            id: "device1".to_string(),
            passcode: "1234".to_string(),
            url: "http://192.168.0.61:8080/video".to_string(),
        }]);
        assert_eq!(
            devices.verify("device1", "1234"),
            Some("http://192.168.0.61:8080/video")
        );
        assert_eq!(devices.verify("device1", "0000"), None);
        assert_eq!(devices.verify("device2", "1234"), None);
    }

    #[test]
    fn validate_rejects_bad_identity() {
        let mut cfg = MonitorConfig::default();
        cfg.access_levels
            .insert("bad name".to_string(), PermissionLevel::Admin);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_fps() {
        let mut cfg = MonitorConfig::default();
        cfg.source.target_fps = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn split_csv_drops_blanks() {
        assert_eq!(split_csv(" alice, ,bob,"), vec!["alice", "bob"]);
    }
}
