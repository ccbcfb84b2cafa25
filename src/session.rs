use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};

use anyhow::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::position_filter::{PositionFilter, RawSample, TrackingConfig};
use crate::track_record::Position;
use crate::track_writer::{TrackWriter, WriterStats};

/// The `user_id` a device carries before anyone signed in. A session with
/// this identity never emits positions, it only warns.
pub const UNCONFIGURED_USER_ID: &str = "0";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub user_id: String,
    pub user_name: String,
    pub true_name: String,
}

impl SessionIdentity {
    pub fn is_configured(&self) -> bool {
        self.user_id != UNCONFIGURED_USER_ID
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumString)]
pub enum LocationQuality {
    Good,
    Degraded,
    Unavailable,
}

pub trait PositionListener: Send + Sync {
    fn on_position_update(&self, position: &Position);
    fn on_position_error(&self, error: &Error);
    fn on_location_quality(&self, quality: LocationQuality);
}

/// Read-only view of the device battery, 0-100.
pub trait BatteryGauge: Send + Sync {
    fn level(&self) -> Result<f64>;
}

pub struct FixedBatteryGauge(pub f64);

impl BatteryGauge for FixedBatteryGauge {
    fn level(&self) -> Result<f64> {
        Ok(self.0)
    }
}

#[derive(Clone, Debug)]
pub struct SessionSummary {
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
    pub accepted: u64,
    pub writer: WriterStats,
}

/* One tracking session for one user. Owns the filter state (guarded by a
mutex: evaluate is a read-then-write on `last_accepted` that must be atomic
per sample) and the trajectory writer. The listener and the log append are
independent failure domains: a failed append is reported through the listener
and tracking continues. */
pub struct TrackingSession {
    identity: SessionIdentity,
    filter: Mutex<PositionFilter>,
    // `None` once the session is stopped
    writer: Mutex<Option<TrackWriter>>,
    listener: Arc<dyn PositionListener>,
    battery: Arc<dyn BatteryGauge>,
    started_at: DateTime<Utc>,
    accepted: AtomicU64,
}

impl TrackingSession {
    pub fn start(
        base_dir: &str,
        identity: SessionIdentity,
        config: TrackingConfig,
        listener: Arc<dyn PositionListener>,
        battery: Arc<dyn BatteryGauge>,
    ) -> Result<TrackingSession> {
        let writer = TrackWriter::new(base_dir)?;
        info!("[session] tracking started for user {}", identity.user_id);
        Ok(TrackingSession {
            identity,
            filter: Mutex::new(PositionFilter::new(config)),
            writer: Mutex::new(Some(writer)),
            listener,
            battery,
            started_at: Utc::now(),
            accepted: AtomicU64::new(0),
        })
    }

    /// Entry point for the location source. Rejected samples go nowhere;
    /// accepted ones are enriched and emitted.
    pub fn on_sample(&self, sample: RawSample) {
        if self.is_stopped() {
            return;
        }
        let decision = self.filter.lock().unwrap().evaluate(&sample);
        if decision.is_accept() {
            self.emit(&sample);
        }
    }

    /// Platform sources sometimes deliver a whole batch of updates, and the
    /// batch can be out of order. Handle it in one go so we hold the filter
    /// lock for the whole batch.
    pub fn on_sample_batch(&self, mut samples: Vec<RawSample>) {
        if self.is_stopped() {
            return;
        }
        let mut filter = self.filter.lock().unwrap();
        samples.sort_by_key(|sample| sample.timestamp_ms);
        for sample in samples {
            if filter.evaluate(&sample).is_accept() {
                self.emit(&sample);
            }
        }
    }

    /// Forwarded from the location source.
    pub fn on_source_error(&self, message: &str) {
        self.listener.on_position_error(&anyhow!("{}", message));
    }

    /// Forwarded from the location source.
    pub fn on_quality(&self, quality: LocationQuality) {
        self.listener.on_location_quality(quality);
    }

    fn emit(&self, sample: &RawSample) {
        if !self.identity.is_configured() {
            warn!("[session] user id is not configured, dropping accepted position");
            self.listener.on_position_error(&anyhow!(
                "user id is not configured, restart the location service after signing in"
            ));
            return;
        }

        let battery_level = match self.battery.level() {
            Ok(level) => level,
            Err(e) => {
                // a missing battery reading never fails the update
                debug!("[session] battery level unavailable: {}", e);
                0.0
            }
        };
        let position = Position {
            user_id: self.identity.user_id.clone(),
            user_name: self.identity.user_name.clone(),
            true_name: self.identity.true_name.clone(),
            latitude: sample.latitude,
            longitude: sample.longitude,
            timestamp_ms: sample.timestamp_ms,
            accuracy: sample.accuracy,
            speed: sample.speed,
            battery_level,
        };
        self.accepted.fetch_add(1, Ordering::Relaxed);
        self.listener.on_position_update(&position);

        let writer = self.writer.lock().unwrap();
        match writer.as_ref() {
            Some(writer) => {
                if let Err(e) = writer.push(position) {
                    self.listener.on_position_error(&e);
                }
            }
            // raced with `stop`: the listener already got the record, only
            // the append is lost, and not silently
            None => self
                .listener
                .on_position_error(&anyhow!("session is stopped, record not written")),
        }
    }

    fn is_stopped(&self) -> bool {
        self.writer.lock().unwrap().is_none()
    }

    /// Stops accepting samples and drains the trajectory writer. Every record
    /// accepted before this call is either on disk or counted as failed in
    /// the summary.
    pub fn stop(&self) -> Result<SessionSummary> {
        let writer = self
            .writer
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| anyhow!("session is already stopped"))?;
        let stats = writer.shutdown()?;
        info!(
            "[session] tracking stopped, {} record(s) written, {} failed",
            stats.written, stats.failed
        );
        Ok(SessionSummary {
            started_at: self.started_at,
            stopped_at: Utc::now(),
            accepted: self.accepted.load(Ordering::Relaxed),
            writer: stats,
        })
    }
}
