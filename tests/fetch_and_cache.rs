mod common;

use approx::assert_abs_diff_eq;
use common::{call_color, fetcher, init_logger, test_config, Recorder, SolidTransport};
use mapstitch::{LatLng, MapType, Marker, Path};

const BHOPAL: LatLng = LatLng {
    lat: 23.2160579,
    lng: 77.4052857,
};

#[test]
fn composite_dimensions_follow_grid_size() {
    init_logger();
    for (zoom, ntiles) in [(3u8, 1u32), (10, 2), (15, 3), (21, 4)] {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), 16, ntiles);
        let recorder = Recorder::default();
        let mut fetcher = fetcher(&config, SolidTransport::new(recorder.clone(), 16));

        let composite = fetcher
            .fetch(BHOPAL, zoom, MapType::Roadmap, &[], &[], None)
            .unwrap();

        assert_eq!(composite.image.dimensions(), (ntiles * 16, ntiles * 16));
        assert_eq!(composite.ntiles, ntiles);
        assert_eq!(recorder.calls(), (ntiles * ntiles) as usize);
    }
}

#[test]
fn tiles_are_pasted_column_by_column() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 8, 2);
    let mut fetcher = fetcher(&config, SolidTransport::new(Recorder::default(), 8));

    let composite = fetcher
        .fetch(BHOPAL, 12, MapType::Terrain, &[], &[], None)
        .unwrap();

    // downloads run top to bottom within a column, then left to right
    assert_eq!(*composite.image.get_pixel(0, 0), call_color(1));
    assert_eq!(*composite.image.get_pixel(0, 8), call_color(2));
    assert_eq!(*composite.image.get_pixel(8, 0), call_color(3));
    assert_eq!(*composite.image.get_pixel(15, 15), call_color(4));
}

#[test]
fn second_fetch_is_served_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 16, 3);
    let markers = [Marker::new(BHOPAL, "O", "red")];
    let paths = [Path::new(vec![LatLng::new(23.0, 45.0), LatLng::new(23.0, 43.0)])];

    let recorder = Recorder::default();
    let mut first = fetcher(&config, SolidTransport::new(recorder.clone(), 16));
    let original = first
        .fetch(BHOPAL, 15, MapType::Hybrid, &markers, &paths, None)
        .unwrap();
    assert_eq!(recorder.calls(), 9);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 9);

    // a fresh fetcher has an empty memory tier, so hits come from disk
    let mut second = fetcher(&config, SolidTransport::new(recorder.clone(), 16));
    let cached = second
        .fetch(BHOPAL, 15, MapType::Hybrid, &markers, &paths, None)
        .unwrap();

    assert_eq!(recorder.calls(), 9);
    assert_eq!(second.stats().downloads, 0);
    assert_eq!(second.stats().cache_hits, 9);
    assert_eq!(original.image.as_raw(), cached.image.as_raw());
}

#[test]
fn coordinate_noise_below_precision_hits_the_cache() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 16, 2);
    let recorder = Recorder::default();
    let mut fetcher = fetcher(&config, SolidTransport::new(recorder.clone(), 16));

    fetcher
        .fetch(BHOPAL, 15, MapType::Roadmap, &[], &[], None)
        .unwrap();
    let jittered = LatLng::new(BHOPAL.lat + 0.000_001, BHOPAL.lng + 0.000_002);
    fetcher
        .fetch(jittered, 15, MapType::Roadmap, &[], &[], None)
        .unwrap();

    assert_eq!(recorder.calls(), 4);
}

#[test]
fn adding_an_overlay_misses_the_cache() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 16, 2);
    let recorder = Recorder::default();
    let mut fetcher = fetcher(&config, SolidTransport::new(recorder.clone(), 16));

    fetcher
        .fetch(BHOPAL, 15, MapType::Roadmap, &[], &[], None)
        .unwrap();
    assert_eq!(recorder.calls(), 4);

    let markers = [Marker::new(BHOPAL, "A", "blue")];
    fetcher
        .fetch(BHOPAL, 15, MapType::Roadmap, &markers, &[], None)
        .unwrap();
    assert_eq!(recorder.calls(), 8);

    let paths = [Path::new(vec![BHOPAL, LatLng::new(23.2158702, 77.4059846)])];
    fetcher
        .fetch(BHOPAL, 15, MapType::Roadmap, &markers, &paths, None)
        .unwrap();
    assert_eq!(recorder.calls(), 12);
}

#[test]
fn bounding_box_is_symmetric_around_center() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 640, 4);
    let mut fetcher = fetcher(&config, SolidTransport::new(Recorder::default(), 640));

    let composite = fetcher
        .fetch(BHOPAL, 15, MapType::Roadmap, &[], &[], None)
        .unwrap();
    let center = BHOPAL.truncated(4);

    assert_eq!(composite.image.dimensions(), (2560, 2560));
    assert!(composite.north_west.lat > center.lat);
    assert!(composite.north_west.lng < center.lng);
    assert!(composite.south_east.lat < center.lat);
    assert!(composite.south_east.lng > center.lng);

    let mid_lat = (composite.north_west.lat + composite.south_east.lat) / 2.0;
    let mid_lng = (composite.north_west.lng + composite.south_east.lng) / 2.0;
    assert_abs_diff_eq!(mid_lat, center.lat, epsilon = 1e-4);
    assert_abs_diff_eq!(mid_lng, center.lng, epsilon = 1e-9);
}

#[test]
fn urls_carry_request_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 16, 1);
    let recorder = Recorder::default();
    let mut fetcher = fetcher(&config, SolidTransport::new(recorder.clone(), 16));

    fetcher
        .fetch(BHOPAL, 15, MapType::Satellite, &[], &[], None)
        .unwrap();
    let markers = [Marker::new(BHOPAL, "O", "red")];
    fetcher
        .fetch(BHOPAL, 15, MapType::Satellite, &markers, &[], None)
        .unwrap();

    let urls = recorder.urls();
    assert_eq!(urls.len(), 2);
    let center = urls[0]
        .strip_prefix("https://maps.googleapis.com/maps/api/staticmap?center=")
        .and_then(|rest| rest.split('&').next())
        .unwrap();
    let (lat, lng) = center.split_once(',').unwrap();
    assert_abs_diff_eq!(lat.parse::<f64>().unwrap(), 23.216, epsilon = 1e-9);
    assert_abs_diff_eq!(lng.parse::<f64>().unwrap(), 77.4052, epsilon = 1e-9);
    assert!(urls[0].contains("&zoom=15&maptype=satellite&size=16x16&format=jpg"));
    assert!(!urls[0].contains("markers="));
    assert!(!urls[0].contains("path="));
    assert!(urls[0].ends_with("&key=TEST"));
    assert!(urls[1].contains("&markers=color:red%7Clabel:O%7C23.2160579,77.4052857"));
}

#[test]
fn radius_controls_grid_size() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 640, 4);
    let recorder = Recorder::default();
    let mut fetcher = fetcher(&config, SolidTransport::new(recorder.clone(), 640));

    let composite = fetcher
        .fetch(BHOPAL, 15, MapType::Roadmap, &[], &[], Some(500.0))
        .unwrap();

    assert_eq!(composite.ntiles, 1);
    assert_eq!(recorder.calls(), 1);
}

#[test]
fn failed_download_aborts_the_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 16, 2);
    let recorder = Recorder::default();
    let transport = SolidTransport::new(recorder.clone(), 16).failing_after(2);
    let mut fetcher = fetcher(&config, transport);

    let result = fetcher.fetch(BHOPAL, 15, MapType::Roadmap, &[], &[], None);

    assert!(matches!(
        result,
        Err(mapstitch::MapError::HttpStatus { status: 503, .. })
    ));
    assert_eq!(fetcher.stats().downloads, 2);
}
