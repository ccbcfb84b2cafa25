use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::geo_math::{bearing_delta, Point};

#[derive(Clone, Debug, PartialEq)]
pub struct RawSample {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp_ms: i64,
    pub accuracy: f64,
    /// Degrees, 0-360. Platform sources leave it out when the fix has no
    /// heading (e.g. standing still).
    pub bearing: Option<f64>,
    pub speed: f64,
}

impl RawSample {
    pub fn point(&self) -> Point {
        Point {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub min_interval_ms: i64,
    pub min_distance_km: f64,
    pub max_accuracy_m: f64,
    /// `0` disables the angle gate.
    pub angle_threshold_deg: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        TrackingConfig {
            min_interval_ms: 5 * 1000,
            min_distance_km: 0.1,
            max_accuracy_m: 200.0,
            angle_threshold_deg: 0.0,
        }
    }
}

impl TrackingConfig {
    pub fn from_json(json: &str) -> Result<TrackingConfig> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FilterDecision {
    /// First valid sample of the session, seeds the trajectory.
    Bootstrap,
    /// At least one of the time/distance/angle gates fired.
    Report,
    /// Nothing worth reporting, state untouched.
    Ignore,
}

impl FilterDecision {
    pub fn is_accept(&self) -> bool {
        !matches!(self, FilterDecision::Ignore)
    }
}

/* The whole decision state is one remembered sample: the last accepted one.
Rejected samples never touch it, so every gate is measured against the last
position that was actually reported, not the last one we saw. */
pub struct PositionFilter {
    config: TrackingConfig,
    last_accepted: Option<RawSample>,
}

impl PositionFilter {
    pub fn new(config: TrackingConfig) -> Self {
        PositionFilter {
            config,
            last_accepted: None,
        }
    }

    pub fn last_accepted(&self) -> &Option<RawSample> {
        &self.last_accepted
    }

    /// Decides whether `sample` is a reportable movement event. The three
    /// gates are OR-combined on purpose: we report on whichever dimension
    /// changes first, be it time, space, or heading.
    pub fn evaluate(&mut self, sample: &RawSample) -> FilterDecision {
        if sample.accuracy > self.config.max_accuracy_m {
            return FilterDecision::Ignore;
        }

        let decision = match &self.last_accepted {
            None => FilterDecision::Bootstrap,
            Some(last) => {
                let time_gate =
                    sample.timestamp_ms - last.timestamp_ms >= self.config.min_interval_ms;
                let distance_gate = last.point().ellipse_distance_km(&sample.point())
                    >= self.config.min_distance_km;
                let angle_gate = self.config.angle_threshold_deg > 0.0
                    && match (sample.bearing, last.bearing) {
                        (Some(curr), Some(prev)) => {
                            bearing_delta(curr, prev) >= self.config.angle_threshold_deg
                        }
                        _ => false,
                    };
                if time_gate || distance_gate || angle_gate {
                    FilterDecision::Report
                } else {
                    FilterDecision::Ignore
                }
            }
        };
        if decision.is_accept() {
            self.last_accepted = Some(sample.clone());
        }
        decision
    }
}
