use anyhow::Result;

/* On-disk trajectory format, kept byte-compatible with what consumers already
parse: one record is

    longitude,latitude,timestamp,accuracy,speed%

fields joined by `,`, record terminated by `%`, no newline. Records are
appended back-to-back, so a file is split on `%` first and each piece on `,`.
Numbers are written with Rust's default `Display` for `f64`/`i64`, i.e. the
shortest decimal that round-trips. */

pub const FIELD_SPLITTER: char = ',';
pub const RECORD_SPLITTER: char = '%';

/// An accepted position, enriched with the identity of the tracked user and
/// the device battery level at the time of the fix.
#[derive(Clone, Debug, PartialEq)]
pub struct Position {
    pub user_id: String,
    pub user_name: String,
    pub true_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp_ms: i64,
    pub accuracy: f64,
    pub speed: f64,
    /// 0-100. `0` when the battery collaborator had nothing to say.
    pub battery_level: f64,
}

pub fn build_record(position: &Position) -> String {
    format!(
        "{lng}{s}{lat}{s}{ts}{s}{acc}{s}{speed}{r}",
        lng = position.longitude,
        lat = position.latitude,
        ts = position.timestamp_ms,
        acc = position.accuracy,
        speed = position.speed,
        s = FIELD_SPLITTER,
        r = RECORD_SPLITTER,
    )
}

/// The subset of `Position` that actually lands on disk.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackRecord {
    pub longitude: f64,
    pub latitude: f64,
    pub timestamp_ms: i64,
    pub accuracy: f64,
    pub speed: f64,
}

pub fn parse_records(content: &str) -> Result<Vec<TrackRecord>> {
    let mut records = Vec::new();
    for raw in content.split(RECORD_SPLITTER) {
        // the terminator leaves an empty tail after the last record
        if raw.is_empty() {
            continue;
        }
        let fields: Vec<&str> = raw.split(FIELD_SPLITTER).collect();
        if fields.len() != 5 {
            bail!("malformed track record: {:?}", raw);
        }
        records.push(TrackRecord {
            longitude: fields[0].parse()?,
            latitude: fields[1].parse()?,
            timestamp_ms: fields[2].parse()?,
            accuracy: fields[3].parse()?,
            speed: fields[4].parse()?,
        });
    }
    Ok(records)
}
