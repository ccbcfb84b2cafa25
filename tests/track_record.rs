use assert_float_eq::assert_float_absolute_eq;
use tracklog_core::track_record::{build_record, parse_records, Position};

fn make_position() -> Position {
    Position {
        user_id: "42".to_string(),
        user_name: "user-42".to_string(),
        true_name: "True Name 42".to_string(),
        latitude: 31.23037,
        longitude: 121.47337,
        timestamp_ms: 1697349116449,
        accuracy: 3.9,
        speed: 0.6028665,
        battery_level: 88.0,
    }
}

#[test]
fn wire_format() {
    // lon,lat,timestamp,accuracy,speed terminated by `%`, no newline
    assert_eq!(
        build_record(&make_position()),
        "121.47337,31.23037,1697349116449,3.9,0.6028665%"
    );
}

#[test]
fn round_trip() {
    let position = make_position();
    let records = parse_records(&build_record(&position)).unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_float_absolute_eq!(record.longitude, position.longitude, 1e-9);
    assert_float_absolute_eq!(record.latitude, position.latitude, 1e-9);
    assert_eq!(record.timestamp_ms, position.timestamp_ms);
    assert_float_absolute_eq!(record.accuracy, position.accuracy, 1e-9);
    assert_float_absolute_eq!(record.speed, position.speed, 1e-9);
}

#[test]
fn records_append_back_to_back() {
    let mut content = String::new();
    for timestamp_ms in [0, 6000, 12000] {
        content.push_str(&build_record(&Position {
            timestamp_ms,
            ..make_position()
        }));
    }
    // no separator between records besides the terminator itself
    assert_eq!(content.matches('%').count(), 3);
    assert!(!content.contains('\n'));

    let records = parse_records(&content).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(
        records.iter().map(|r| r.timestamp_ms).collect::<Vec<_>>(),
        vec![0, 6000, 12000]
    );
}

#[test]
fn empty_content_has_no_records() {
    assert!(parse_records("").unwrap().is_empty());
}

#[test]
fn malformed_record_is_an_error() {
    assert!(parse_records("121.47,31.23,1000%121.47,31.23%").is_err());
    assert!(parse_records("not a record%").is_err());
}
