use std::sync::Mutex;

use tracklog_core::position_filter::RawSample;
use tracklog_core::session::{LocationQuality, PositionListener, SessionIdentity};
use tracklog_core::track_record::Position;

pub fn sample(latitude: f64, longitude: f64, timestamp_ms: i64) -> RawSample {
    RawSample {
        latitude,
        longitude,
        timestamp_ms,
        accuracy: 5.0,
        bearing: None,
        speed: 0.0,
    }
}

pub fn sample_with_bearing(
    latitude: f64,
    longitude: f64,
    timestamp_ms: i64,
    bearing: f64,
) -> RawSample {
    RawSample {
        bearing: Some(bearing),
        ..sample(latitude, longitude, timestamp_ms)
    }
}

pub fn identity(user_id: &str) -> SessionIdentity {
    SessionIdentity {
        user_id: user_id.to_string(),
        user_name: format!("user-{}", user_id),
        true_name: format!("True Name {}", user_id),
    }
}

pub fn position(user_id: &str, timestamp_ms: i64) -> Position {
    Position {
        user_id: user_id.to_string(),
        user_name: format!("user-{}", user_id),
        true_name: format!("True Name {}", user_id),
        latitude: 31.23037,
        longitude: 121.47337,
        timestamp_ms,
        accuracy: 3.9,
        speed: 0.6,
        battery_level: 88.0,
    }
}

/// Listener that just records everything it is told.
#[derive(Default)]
pub struct RecordingListener {
    pub updates: Mutex<Vec<Position>>,
    pub errors: Mutex<Vec<String>>,
    pub quality: Mutex<Vec<LocationQuality>>,
}

impl PositionListener for RecordingListener {
    fn on_position_update(&self, position: &Position) {
        self.updates.lock().unwrap().push(position.clone());
    }

    fn on_position_error(&self, error: &anyhow::Error) {
        self.errors.lock().unwrap().push(error.to_string());
    }

    fn on_location_quality(&self, quality: LocationQuality) {
        self.quality.lock().unwrap().push(quality);
    }
}
