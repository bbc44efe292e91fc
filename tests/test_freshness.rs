//! Freshness checking and explicit reload

mod common;

use common::*;
use geodat::{CacheMode, Edition, GeoIpDatabase, OpenOptions};
use std::fs::{self, File};
use std::net::IpAddr;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn first_build() -> Fixture {
    country_fixture()
}

/// Same layout, new build string and 0.0.0.0/1 moved to Germany
fn second_build() -> Fixture {
    let mut f = Fixture::new(Edition::Country).info("GEO-106 20240301 Build 2");
    f.country("0.0.0.0/1", DE).country("128.0.0.0/1", GB);
    f
}

/// Atomically replace `path` and push its mtime forward
fn replace(path: &Path, fixture: &Fixture) {
    replace_with_mtime(path, fixture, SystemTime::now() + Duration::from_secs(10));
}

fn replace_with_mtime(path: &Path, fixture: &Fixture, mtime: SystemTime) {
    let staging = path.with_extension("new");
    fs::write(&staging, fixture.build()).unwrap();
    fs::rename(&staging, path).unwrap();
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(mtime)
        .unwrap();
}

fn addr() -> IpAddr {
    "8.8.8.8".parse().unwrap()
}

#[test]
fn test_reload_on_change_with_check() {
    for mode in [CacheMode::Disk, CacheMode::Index, CacheMode::Memory] {
        let dir = TempDir::new().unwrap();
        let path = first_build().write(dir.path(), "GeoIP.dat");
        let db = GeoIpDatabase::open(&path, OpenOptions::new().cache(mode).check_freshness(true))
            .unwrap();

        assert_eq!(db.country(addr()).unwrap().code, "US");
        assert!(db.container_info().unwrap().as_str().contains("Build 1"));

        replace(&path, &second_build());

        assert!(
            db.container_info().unwrap().as_str().contains("Build 2"),
            "{} cache did not reload",
            mode
        );
        assert_eq!(db.country(addr()).unwrap().code, "DE");
        assert_eq!(db.cache_mode().unwrap(), mode);
    }
}

#[test]
fn test_no_reload_without_check() {
    for mode in [CacheMode::Disk, CacheMode::Index, CacheMode::Memory] {
        let dir = TempDir::new().unwrap();
        let path = first_build().write(dir.path(), "GeoIP.dat");
        let db = GeoIpDatabase::open(&path, OpenOptions::new().cache(mode)).unwrap();

        let before = db.container_info().unwrap();
        replace(&path, &second_build());

        assert_eq!(db.container_info().unwrap(), before, "{} cache reloaded", mode);
        assert_eq!(db.country(addr()).unwrap().code, "US");
    }
}

#[test]
fn test_reload_when_mtime_moves_backward() {
    let dir = TempDir::new().unwrap();
    let path = first_build().write(dir.path(), "GeoIP.dat");
    let db = GeoIpDatabase::open(&path, OpenOptions::new().check_freshness(true)).unwrap();
    assert_eq!(db.country(addr()).unwrap().code, "US");

    let restored = SystemTime::now() - Duration::from_secs(30 * 24 * 3600);
    replace_with_mtime(&path, &second_build(), restored);

    assert_eq!(db.country(addr()).unwrap().code, "DE");
    assert!(db.container_info().unwrap().as_str().contains("Build 2"));
}

#[test]
fn test_explicit_reload() {
    let dir = TempDir::new().unwrap();
    let path = first_build().write(dir.path(), "GeoIP.dat");
    let db = GeoIpDatabase::open(&path, OpenOptions::new()).unwrap();

    replace(&path, &second_build());
    assert_eq!(db.country(addr()).unwrap().code, "US");

    db.reload().unwrap();
    assert_eq!(db.country(addr()).unwrap().code, "DE");
    assert!(db.container_info().unwrap().as_str().contains("Build 2"));
}

#[test]
fn test_unchanged_file_keeps_generation() {
    let dir = TempDir::new().unwrap();
    let path = first_build().write(dir.path(), "GeoIP.dat");
    let db = GeoIpDatabase::open(&path, OpenOptions::from_flags(OpenOptions::CHECK_CACHE)).unwrap();

    for _ in 0..5 {
        assert_eq!(db.country(addr()).unwrap().code, "US");
    }
    assert_eq!(db.last_netmask(), Some(7));
}

#[test]
fn test_removed_file_surfaces_io_error() {
    let dir = TempDir::new().unwrap();
    let path = first_build().write(dir.path(), "GeoIP.dat");
    let db = GeoIpDatabase::open(&path, OpenOptions::new().check_freshness(true)).unwrap();

    fs::remove_file(&path).unwrap();
    let err = db.country(addr()).unwrap_err();
    assert!(matches!(err, geodat::GeoIpError::Io(_)), "{}", err);
}
