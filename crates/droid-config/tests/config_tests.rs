#[cfg(test)]
mod tests {
    use droid_config::schema::*;
    use droid_config::{ConfigLoader, ConfigSource};
    use std::io::Write;
    use std::path::{Path, PathBuf};

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    // ── Default tests ──────────────────────────────────────────

    #[test]
    fn test_droid_config_defaults() {
        let config = DroidConfig::default();
        assert!(config.device.name.is_none());
        assert_eq!(config.server.transport, Transport::Stdio);
        assert_eq!(config.server.listen_addr(), "127.0.0.1:8000");
        assert!(config.shell.allowed_commands.is_empty());
        assert_eq!(config.adb.path, PathBuf::from("adb"));
        assert_eq!(config.artifacts.compressed_screenshot, PathBuf::from("compressed_screenshot.png"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_transport_parse() {
        assert_eq!("stdio".parse::<Transport>().unwrap(), Transport::Stdio);
        assert_eq!("HTTP".parse::<Transport>().unwrap(), Transport::Http);
        assert_eq!("streamable-http".parse::<Transport>().unwrap(), Transport::Http);
        assert_eq!("sse".parse::<Transport>().unwrap(), Transport::Sse);
        assert!("websocket".parse::<Transport>().is_err());
    }

    // ── Device name handling ───────────────────────────────────

    #[test]
    fn test_missing_file_auto_selects_with_notice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("non_existent.toml");
        let loader = ConfigLoader::load_with(&path, no_env).unwrap();
        assert_eq!(loader.source(), &ConfigSource::Missing(path.clone()));
        assert!(loader.get().device.requested_name().is_none());
        let notices = loader.notices();
        assert!(notices.iter().any(|n| n.contains("not found")));
        assert!(notices.iter().any(|n| n.contains("auto-selection")));
    }

    #[test]
    fn test_absent_name_auto_selects() {
        let f = write_config("[device]\n");
        let loader = ConfigLoader::load_with(f.path(), no_env).unwrap();
        assert!(loader.get().device.requested_name().is_none());
        let notices = loader.notices();
        assert!(notices.iter().any(|n| n.contains("Loaded config")));
        assert!(notices.iter().any(|n| n.contains("auto-select")));
    }

    #[test]
    fn test_empty_name_auto_selects() {
        let f = write_config("[device]\nname = \"\"\n");
        let loader = ConfigLoader::load_with(f.path(), no_env).unwrap();
        assert!(loader.get().device.requested_name().is_none());
    }

    #[test]
    fn test_whitespace_name_auto_selects() {
        let f = write_config("[device]\nname = \"   \\t  \\n  \"\n");
        let loader = ConfigLoader::load_with(f.path(), no_env).unwrap();
        assert!(loader.get().device.requested_name().is_none());
        assert!(loader.notices().iter().any(|n| n.contains("auto-select")));
    }

    #[test]
    fn test_name_is_trimmed() {
        let f = write_config("[device]\nname = \"  x  \"\n");
        let loader = ConfigLoader::load_with(f.path(), no_env).unwrap();
        assert_eq!(loader.get().device.requested_name().as_deref(), Some("x"));
    }

    #[test]
    fn test_configured_device_notice() {
        let f = write_config("[device]\nname = \"  test-device-123  \"\n");
        let loader = ConfigLoader::load_with(f.path(), no_env).unwrap();
        assert!(loader
            .notices()
            .iter()
            .any(|n| n.contains("Configured device: test-device-123")));
    }

    #[test]
    fn test_config_without_device_section() {
        let f = write_config("[logging]\nlevel = \"debug\"\n");
        let loader = ConfigLoader::load_with(f.path(), no_env).unwrap();
        assert!(loader.get().device.requested_name().is_none());
        assert_eq!(loader.get().logging.level, "debug");
    }

    #[test]
    fn test_empty_config_file() {
        let f = write_config("");
        let loader = ConfigLoader::load_with(f.path(), no_env).unwrap();
        assert!(matches!(loader.source(), ConfigSource::File(_)));
        assert!(loader.get().device.requested_name().is_none());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let f = write_config("[device]\nname = \"test-device\n");
        let err = ConfigLoader::load_with(f.path(), no_env).err().unwrap();
        assert!(matches!(err, droid_core::DroidError::Config(_)));
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn test_unknown_transport_is_config_error() {
        let f = write_config("[server]\ntransport = \"carrier-pigeon\"\n");
        assert!(ConfigLoader::load_with(f.path(), no_env).is_err());
    }

    // ── Env overrides ──────────────────────────────────────────

    #[test]
    fn test_env_overrides_apply() {
        let f = write_config("[device]\nname = \"from-file\"\n");
        let env = |key: &str| match key {
            "DROID_DEVICE" => Some("from-env".to_string()),
            "DROID_TRANSPORT" => Some("sse".to_string()),
            "DROID_ADB_PATH" => Some("/opt/platform-tools/adb".to_string()),
            _ => None,
        };
        let loader = ConfigLoader::load_with(f.path(), env).unwrap();
        let config = loader.get();
        assert_eq!(config.device.requested_name().as_deref(), Some("from-env"));
        assert_eq!(config.server.transport, Transport::Sse);
        assert_eq!(config.adb.path, PathBuf::from("/opt/platform-tools/adb"));
    }

    #[test]
    fn test_bad_transport_env_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let env = |key: &str| (key == "DROID_TRANSPORT").then(|| "nope".to_string());
        let loader = ConfigLoader::load_with(&dir.path().join("droid.toml"), env).unwrap();
        assert_eq!(loader.get().server.transport, Transport::Stdio);
    }

    // ── Validation ─────────────────────────────────────────────

    #[test]
    fn test_validate_rejects_spaced_allowlist_entry() {
        let mut config = DroidConfig::default();
        config.shell.allowed_commands = vec!["rm -rf".into()];
        let err = config.validate().unwrap_err();
        assert!(err.contains("shell.allowed_commands"));
    }

    #[test]
    fn test_validate_warns_on_public_bind() {
        let mut config = DroidConfig::default();
        config.server.transport = Transport::Http;
        config.server.host = "0.0.0.0".into();
        let warnings = config.validate().unwrap();
        assert!(warnings.iter().any(|w| w.field == "server.host"));
    }

    #[test]
    fn test_validate_rejects_same_screenshot_paths() {
        let mut config = DroidConfig::default();
        config.artifacts.compressed_screenshot = config.artifacts.screenshot.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_applies_defaults() {
        let config = ConfigLoader::parse("[server]\ntransport = \"http\"\nport = 9000\n").unwrap();
        assert_eq!(config.server.transport, Transport::Http);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.request_timeout_secs, 120);
    }

    // ── YAML ───────────────────────────────────────────────────

    fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_format_from_extension() {
        use droid_config::ConfigFormat;
        assert_eq!(ConfigFormat::from_path(Path::new("config.yaml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("conf/droid.YML")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("droid.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("droid")), ConfigFormat::Toml);
    }

    #[test]
    fn test_yaml_null_name_auto_selects() {
        let f = write_yaml("device:\n  name: null\n");
        let loader = ConfigLoader::load_with(f.path(), no_env).unwrap();
        assert!(loader.get().device.name.is_none());
        assert!(loader.get().device.requested_name().is_none());
        assert!(loader.notices().iter().any(|n| n.contains("will auto-select")));
    }

    #[test]
    fn test_yaml_empty_and_blank_names_auto_select() {
        for raw in ["device:\n  name: \"\"\n", "device:\n  name: \"  \"\n"] {
            let f = write_yaml(raw);
            let loader = ConfigLoader::load_with(f.path(), no_env).unwrap();
            assert!(loader.get().device.requested_name().is_none(), "{raw}");
        }
    }

    #[test]
    fn test_yaml_padded_name_is_trimmed() {
        let f = write_yaml("device:\n  name: \"  emulator-5554  \"\n");
        let loader = ConfigLoader::load_with(f.path(), no_env).unwrap();
        assert_eq!(loader.get().device.requested_name().as_deref(), Some("emulator-5554"));
        assert!(loader.notices().iter().any(|n| n == "Configured device: emulator-5554"));
    }

    #[test]
    fn test_yaml_sections_match_toml() {
        let f = write_yaml(
            "server:\n  transport: sse\n  port: 9100\nshell:\n  allowed_commands: [ls, input]\n",
        );
        let config = ConfigLoader::load_with(f.path(), no_env).unwrap().into_config();
        assert_eq!(config.server.transport, Transport::Sse);
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.shell.allowed_commands, vec!["ls", "input"]);
        assert_eq!(config.adb.path, PathBuf::from("adb"));
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let f = write_yaml("");
        let config = ConfigLoader::load_with(f.path(), no_env).unwrap().into_config();
        assert!(config.device.name.is_none());
        assert_eq!(config.server.transport, Transport::Stdio);
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        let f = write_yaml("device: [unclosed\n");
        let err = ConfigLoader::load_with(f.path(), no_env).err().unwrap();
        assert!(matches!(err, droid_core::DroidError::Config(_)));
    }
}
