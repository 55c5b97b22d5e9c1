use super::loader::load_config_with_env;
use super::*;
use std::path::PathBuf;

#[test]
fn test_defaults_match_reference_setup() {
    let config = Config::default();

    assert!(config.manifest_url.ends_with("/modlist.txt"));
    assert_eq!(config.installer_name, "ForgeInstaller.jar");
    assert_eq!(
        config.installer_path(),
        PathBuf::from("forge-installer").join("ForgeInstaller.jar")
    );
    assert_eq!(config.extra_files.len(), 2);
    assert_eq!(config.extra_files[0].file_name, "options.txt");
    assert_eq!(config.extra_files[1].file_name, "optionsof.txt");
    assert_eq!(config.installer_max_attempts, None);
    assert_eq!(config.network.max_retries, 0);
}

#[test]
fn test_derived_paths() {
    let config = Config {
        target_base_dir: PathBuf::from("/games/mc"),
        ..Config::default()
    };

    assert_eq!(config.mods_dir(), PathBuf::from("/games/mc/mods"));
    assert_eq!(
        config.install_marker(),
        PathBuf::from("/games/mc/versions/1.16.5-forge-36.2.39")
    );
}

#[test]
fn test_retry_backoff_doubles() {
    let network = NetworkConfig {
        retry_backoff_ms: 100,
        ..NetworkConfig::default()
    };

    assert_eq!(network.retry_backoff(1).as_millis(), 100);
    assert_eq!(network.retry_backoff(2).as_millis(), 200);
    assert_eq!(network.retry_backoff(3).as_millis(), 400);
}

#[test]
fn test_load_without_file_yields_defaults() {
    let config = load_config(None).expect("defaults should load");
    assert_eq!(config.manifest_url, Config::default().manifest_url);
    assert_eq!(config.extra_files, Config::default().extra_files);
}

#[test]
fn test_load_yaml_overrides_selected_fields() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("modprep.yaml");
    std::fs::write(
        &config_path,
        "manifest_url: http://localhost/list.txt\n\
         target_base_dir: /srv/game\n\
         installer_max_attempts: 3\n\
         network:\n  max_retries: 2\n",
    )
    .unwrap();

    let config = load_config(Some(config_path.to_str().unwrap())).unwrap();

    assert_eq!(config.manifest_url, "http://localhost/list.txt");
    assert_eq!(config.target_base_dir, PathBuf::from("/srv/game"));
    assert_eq!(config.installer_max_attempts, Some(3));
    assert_eq!(config.network.max_retries, 2);
    assert_eq!(config.network.read_timeout_secs, 60);
    assert_eq!(config.installer_name, "ForgeInstaller.jar");
}

#[test]
fn test_load_rejects_unknown_keys() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("modprep.yaml");
    std::fs::write(&config_path, "manifest_ulr: http://typo\n").unwrap();

    assert!(load_config(Some(config_path.to_str().unwrap())).is_err());
}

#[test]
fn test_load_missing_named_file_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("absent.yaml");

    assert!(load_config(Some(config_path.to_str().unwrap())).is_err());
}

#[test]
fn test_environment_overrides_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("modprep.yaml");
    std::fs::write(
        &config_path,
        "installer_tag: File Installer\nnetwork:\n  max_retries: 1\n  retry_backoff_ms: 250\n",
    )
    .unwrap();

    let env = [
        ("MODPREP_INSTALLER_TAG", "Patch Installer"),
        ("MODPREP_NETWORK__MAX_RETRIES", "3"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect();

    let config = load_config_with_env(Some(config_path.to_str().unwrap()), Some(env)).unwrap();

    assert_eq!(config.installer_tag, "Patch Installer");
    assert_eq!(config.network.max_retries, 3);
    assert_eq!(config.network.retry_backoff_ms, 250);
}
