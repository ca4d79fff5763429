//! Checks the bundled sample configuration and snapshot data.

use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use marine_common::{Location, ModelProvider, StationDirectory};

use marine_api::config::MarineConfig;
use marine_api::snapshot::SnapshotBackend;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

#[test]
fn test_sample_config_matches_defaults() {
    let config = MarineConfig::load_file(workspace_root().join("config/marine.yaml")).unwrap();
    assert_eq!(config, MarineConfig::default());
}

#[tokio::test]
async fn test_sample_snapshot_loads() {
    let backend = SnapshotBackend::open(workspace_root().join("data/snapshot")).unwrap();

    assert!(backend.buoys.fetch_stations().await.unwrap());
    assert!(backend.tide_stations.fetch_stations().await.unwrap());
    assert_eq!(backend.buoys.len(), 3);
    assert_eq!(backend.tide_stations.len(), 2);

    let newport = Location::new(41.4302, -71.455).unwrap();
    let closest = backend.tide_stations.find_closest_station(&newport).unwrap();
    assert_eq!(closest.station.info().station_id, "8452660");

    let mut names: Vec<&str> = backend.models.iter().map(|m| m.name()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["atlantic", "us_west_coast"]);

    let atlantic = backend
        .models
        .iter()
        .find(|m| m.name() == "atlantic")
        .unwrap();
    let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let raw = atlantic
        .fetch_grib_datas(atlantic.time_index(start), 10)
        .await
        .unwrap();
    let readings = atlantic.to_buoy_data(atlantic.parse_grib_datas(&newport, &raw).unwrap());
    assert_eq!(readings.len(), 3);
}
