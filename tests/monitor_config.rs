use std::path::Path;
use std::sync::Mutex;

use tempfile::NamedTempFile;

use zoneguard::{MonitorConfig, PermissionLevel, Point};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "ZONEGUARD_CONFIG",
        "ZONEGUARD_SOURCE_URL",
        "ZONEGUARD_ADMINS",
        "ZONEGUARD_ALERT_DB",
        "ZONEGUARD_TARGET_FPS",
    ] {
        std::env::remove_var(key);
    }
}

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp config");
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");
    file
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let file = write_config(
        r#"{
            "source": {
                "url": "stub://dock_a",
                "target_fps": 12,
                "width": 1280,
                "height": 720,
                "max_frames": 500
            },
            "access_levels": {
                "niraj": "admin",
                "sovit": "general"
            },
            "editor": {
                "pick_radius": 15.5,
                "new_zone_center": {"x": 640, "y": 360},
                "new_zone_sides": 8
            },
            "alerts": {"db_path": "alerts_prod.db"},
            "evaluate_while_editing": false,
            "devices": [
                {"id": "device1", "passcode": "1234", "url": "stub://dock_b"}
            ]
        }"#,
    );

    std::env::set_var("ZONEGUARD_CONFIG", file.path());
    std::env::set_var("ZONEGUARD_TARGET_FPS", "5");
    std::env::set_var("ZONEGUARD_ADMINS", "sovit, guard_7");

    let cfg = MonitorConfig::load().expect("load config");

    assert_eq!(cfg.source.url, "stub://dock_a");
    assert_eq!(cfg.source.target_fps, 5);
    assert_eq!((cfg.source.width, cfg.source.height), (1280, 720));
    assert_eq!(cfg.source.max_frames, Some(500));
    assert_eq!(cfg.editor.pick_radius, 15.5);
    assert_eq!(cfg.editor.new_zone_center, Point::new(640, 360));
    assert_eq!(cfg.editor.new_zone_radius, 100);
    assert_eq!(cfg.editor.new_zone_sides, 8);
    assert_eq!(cfg.alert_db_path.as_deref(), Some("alerts_prod.db"));
    assert!(!cfg.evaluate_while_editing);
    assert_eq!(cfg.devices.verify("device1", "1234"), Some("stub://dock_b"));
    assert_eq!(cfg.identities(), vec!["guard_7", "niraj", "sovit"]);

    let policy = cfg.access_policy().expect("policy");
    assert_eq!(policy.permission("niraj"), PermissionLevel::Admin);
    assert_eq!(policy.permission("sovit"), PermissionLevel::Admin);
    assert_eq!(policy.permission("guard_7"), PermissionLevel::Admin);
    assert_eq!(policy.permission("visitor"), PermissionLevel::General);

    clear_env();
}

#[test]
fn load_without_file_uses_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("ZONEGUARD_SOURCE_URL", "stub://override");
    std::env::set_var("ZONEGUARD_ALERT_DB", "/tmp/zoneguard-alerts.db");

    let cfg = MonitorConfig::load().expect("load config");
    assert_eq!(cfg.source.url, "stub://override");
    assert_eq!(cfg.source.target_fps, 10);
    assert_eq!(cfg.alert_db_path.as_deref(), Some("/tmp/zoneguard-alerts.db"));
    assert!(cfg.evaluate_while_editing);
    assert!(cfg.devices.is_empty());

    clear_env();
}

#[test]
fn rejects_invalid_identity_in_file() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let file = write_config(r#"{"access_levels": {"not a name": "admin"}}"#);
    let err = MonitorConfig::load_from(file.path()).unwrap_err();
    assert!(err.to_string().contains("identity"), "{}", err);

    clear_env();
}

#[test]
fn rejects_non_numeric_fps_override() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("ZONEGUARD_TARGET_FPS", "fast");
    assert!(MonitorConfig::load().is_err());

    clear_env();
}

#[test]
fn rejects_non_positive_pick_radius() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let file = write_config(r#"{"editor": {"pick_radius": 0.0}}"#);
    assert!(MonitorConfig::load_from(file.path()).is_err());

    clear_env();
}

#[test]
fn missing_config_file_is_an_error() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let err = MonitorConfig::load_from(Path::new("/nonexistent/zoneguard.json")).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));

    clear_env();
}
