//! End-to-end tests for the safealert binary. None of these touch the network.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const OVERPASS_FIXTURE: &str = r#"{
  "version": 0.6,
  "elements": [
    {"type": "node", "id": 1, "lat": 12.9750, "lon": 77.5946,
     "tags": {"amenity": "hospital", "name": "City Hospital"}},
    {"type": "way", "id": 2, "center": {"lat": 12.9720, "lon": 77.5946},
     "tags": {"amenity": "pharmacy", "name": "Corner Pharmacy"}},
    {"type": "node", "id": 3, "tags": {"amenity": "clinic"}}
  ]
}"#;

/// Command running in an empty directory so no stray safealert.toml is picked up
fn safealert(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("safealert").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("SAFEALERT_ENV")
        .env_remove("SAFEALERT_TIMEOUT_SECS")
        .env_remove("RUST_LOG");
    cmd
}

fn fixture(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("overpass.json");
    fs::write(&path, OVERPASS_FIXTURE).unwrap();
    path
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    safealert(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("nearby"))
        .stdout(predicate::str::contains("panic"))
        .stdout(predicate::str::contains("watch"));
}

#[test]
fn distance_one_degree_of_latitude() {
    let dir = TempDir::new().unwrap();
    safealert(&dir)
        .args(["distance", "0,0", "1,0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("111195 m"));
}

#[test]
fn distance_accepts_negative_coordinates() {
    let dir = TempDir::new().unwrap();
    safealert(&dir)
        .args(["distance", "-33.8688,151.2093", "-33.8688,151.2093"])
        .assert()
        .success()
        .stdout(predicate::str::diff("0 m\n"));
}

#[test]
fn distance_json_output() {
    let dir = TempDir::new().unwrap();
    safealert(&dir)
        .args(["--format", "json", "distance", "0,0", "0,1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"distance_m\""));
}

#[test]
fn invalid_coordinate_is_rejected() {
    let dir = TempDir::new().unwrap();
    safealert(&dir)
        .args(["distance", "100,0", "0,0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("latitude"));
}

#[test]
fn nearby_from_file_ranks_nearest_first() {
    let dir = TempDir::new().unwrap();
    let input = fixture(&dir);

    safealert(&dir)
        .args(["nearby", "12.9716,77.5946", "--input"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Corner Pharmacy (pharmacy) - 44 m (Nearest)"))
        .stdout(predicate::str::contains("City Hospital (hospital) - 378 m"))
        .stdout(predicate::str::contains("clinic").not());
}

#[test]
fn nearest_from_file_as_json() {
    let dir = TempDir::new().unwrap();
    let input = fixture(&dir);

    safealert(&dir)
        .args(["--format", "json", "nearest", "12.9716,77.5946", "--input"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Corner Pharmacy\""))
        .stdout(predicate::str::contains("\"distance_m\": 44"));
}

#[test]
fn nearby_with_no_matches_reports_radius() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("empty.json");
    fs::write(&input, r#"{"elements": []}"#).unwrap();

    safealert(&dir)
        .args(["nearby", "12.9716,77.5946", "--radius", "1500", "--input"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("No nearby places found within 1500 m."));
}

#[test]
fn missing_config_file_exits_with_config_code() {
    let dir = TempDir::new().unwrap();
    safealert(&dir)
        .args(["--config", "does-not-exist.toml", "distance", "0,0", "1,0"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("E3001"));
}

#[test]
fn config_file_sets_default_radius() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("safealert.toml"), "[search]\nradius_m = 750\n").unwrap();
    let input = dir.path().join("empty.json");
    fs::write(&input, r#"{"elements": []}"#).unwrap();

    safealert(&dir)
        .args(["nearby", "0,0", "--input"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("within 750 m."));
}

#[test]
fn nearby_from_file_respects_radius() {
    let dir = TempDir::new().unwrap();
    let input = fixture(&dir);

    safealert(&dir)
        .args(["nearby", "12.9716,77.5946", "--radius", "100", "--input"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Corner Pharmacy (pharmacy) - 44 m (Nearest)"))
        .stdout(predicate::str::contains("City Hospital").not());
}

#[test]
fn zero_radius_is_a_coded_validation_error() {
    let dir = TempDir::new().unwrap();
    let input = fixture(&dir);

    safealert(&dir)
        .args(["--format", "json", "nearby", "12.9716,77.5946", "--radius", "0", "--input"])
        .arg(&input)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("\"code_str\": \"E6002\""))
        .stderr(predicate::str::contains("\"category\": \"Validation\""));
}

#[test]
fn bad_category_is_a_coded_validation_error() {
    let dir = TempDir::new().unwrap();
    let input = fixture(&dir);

    safealert(&dir)
        .args(["nearest", "12.9716,77.5946", "--categories", "hospital];out;", "--input"])
        .arg(&input)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("E6003"));
}

#[test]
fn send_to_unreachable_endpoint_is_a_network_error() {
    let dir = TempDir::new().unwrap();
    let input = fixture(&dir);

    safealert(&dir)
        .env("SAFEALERT_ENV", "development")
        .args(["send", "12.9716,77.5946", "1", "--endpoint", "http://127.0.0.1:1/api/send-alert", "--input"])
        .arg(&input)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("E4002"))
        .stderr(predicate::str::contains("POST http://127.0.0.1:1/api/send-alert"));
}

#[test]
fn send_unknown_place_id_is_rejected() {
    let dir = TempDir::new().unwrap();
    let input = fixture(&dir);

    safealert(&dir)
        .args(["send", "12.9716,77.5946", "42", "--endpoint", "http://127.0.0.1:1/api/send-alert", "--input"])
        .arg(&input)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No place with id 42"));
}
