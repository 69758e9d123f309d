use knock::config::load_profiles;
use knock::{ConfigError, KnockConfig, PortSource};
use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

fn write_profiles(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("knock-{}-{}.toml", name, process::id()));
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn profile_from_disk_builds_a_config() {
    let path = write_profiles(
        "disk",
        r#"
[profiles.gate]
type = "seed"
seed = -7
count = 4
offset = 40000
protocol = "tcp4"
remote = "192.0.2.44"
interval = "1m30s"
verbose = true
"#,
    );
    let file = load_profiles(&path).unwrap();
    fs::remove_file(&path).unwrap();

    let config = KnockConfig::try_from(file.profile("gate").unwrap()).unwrap();
    assert_eq!(
        config.source,
        PortSource::Seeded {
            seed: -7,
            count: 4,
            offset: 40000
        }
    );
    assert_eq!(config.transport.to_string(), "tcp4");
    assert_eq!(config.interval, Duration::from_secs(90));
    assert!(config.verbose);
    let ports = knock::sequence::generate(&config.source).unwrap();
    assert_eq!(*ports, [44989, 47463, 56445, 57411]);
}

#[test]
fn malformed_file_names_the_path() {
    let path = write_profiles("broken", "[profiles.x\nseed = 1\n");
    let err = load_profiles(&path).unwrap_err();
    fs::remove_file(&path).unwrap();
    match err {
        ConfigError::File { path: reported, .. } => {
            assert_eq!(reported, path.display().to_string())
        }
        other => panic!("unexpected {:?}", other),
    }
}
