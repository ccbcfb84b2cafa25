use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    mpsc, Arc,
};
use std::thread;
use std::time::Duration;

use anyhow::Result;

use crate::position_filter::RawSample;
use crate::session::{LocationQuality, TrackingSession};

/* Every way of obtaining location updates is a `LocationSource`: the
embedding application picks a variant (platform GPS, network, replay) and
injects it, the session does not care where samples come from. Delivery is an
explicit channel between the producing side and the session, consumed
sequentially by a pump thread. */
pub trait LocationSource {
    fn start_updates(&mut self) -> Result<()>;
    fn stop_updates(&mut self);
    fn request_single_location(&mut self) -> Result<()>;
}

const PUMP_POLL_INTERVAL: Duration = Duration::from_millis(200);
const SINGLE_FIX_WAIT: Duration = Duration::from_secs(10);

/// The variant for callback-driven platforms: the platform side pushes every
/// fix into the channel, the pump thread feeds them to the session one by
/// one. Stopping the pump stops delivery; records already accepted drain
/// through the session's writer on `stop`.
pub struct ChannelLocationSource {
    session: Arc<TrackingSession>,
    // consumed by `start_updates`, present only while the pump is not running
    rx: Option<mpsc::Receiver<RawSample>>,
    pump: Option<thread::JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl ChannelLocationSource {
    pub fn new(
        session: Arc<TrackingSession>,
    ) -> (ChannelLocationSource, mpsc::Sender<RawSample>) {
        let (tx, rx) = mpsc::channel();
        let source = ChannelLocationSource {
            session,
            rx: Some(rx),
            pump: None,
            stop: Arc::new(AtomicBool::new(false)),
        };
        (source, tx)
    }
}

impl LocationSource for ChannelLocationSource {
    fn start_updates(&mut self) -> Result<()> {
        let rx = self
            .rx
            .take()
            .ok_or_else(|| anyhow!("updates were already started"))?;
        self.stop.store(false, Ordering::Relaxed);
        let stop = self.stop.clone();
        let session = self.session.clone();
        self.pump = Some(thread::spawn(move || {
            session.on_quality(LocationQuality::Good);
            loop {
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                match rx.recv_timeout(PUMP_POLL_INTERVAL) {
                    Ok(sample) => session.on_sample(sample),
                    Err(mpsc::RecvTimeoutError::Timeout) => continue,
                    Err(mpsc::RecvTimeoutError::Disconnected) => {
                        // the producing side is gone
                        session.on_quality(LocationQuality::Unavailable);
                        break;
                    }
                }
            }
        }));
        Ok(())
    }

    fn stop_updates(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(pump) = self.pump.take() {
            let _ = pump.join();
        }
    }

    fn request_single_location(&mut self) -> Result<()> {
        // a passive source cannot solicit a fix, deliver the next pushed one
        let rx = self
            .rx
            .as_ref()
            .ok_or_else(|| anyhow!("continuous updates were started"))?;
        let sample = rx.recv_timeout(SINGLE_FIX_WAIT)?;
        self.session.on_sample(sample);
        Ok(())
    }
}

/// Replays a scripted list of samples on a schedule. Used by tests and by
/// dry runs on machines without a GPS.
pub struct SimulatedLocationSource {
    session: Arc<TrackingSession>,
    script: Arc<Vec<RawSample>>,
    interval: Duration,
    cursor: Arc<AtomicUsize>,
    stop: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<()>>,
}

impl SimulatedLocationSource {
    pub fn new(
        session: Arc<TrackingSession>,
        script: Vec<RawSample>,
        interval: Duration,
    ) -> SimulatedLocationSource {
        SimulatedLocationSource {
            session,
            script: Arc::new(script),
            interval,
            cursor: Arc::new(AtomicUsize::new(0)),
            stop: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }
}

impl LocationSource for SimulatedLocationSource {
    fn start_updates(&mut self) -> Result<()> {
        if self.worker.is_some() {
            bail!("updates were already started");
        }
        self.stop.store(false, Ordering::Relaxed);
        let session = self.session.clone();
        let script = self.script.clone();
        let cursor = self.cursor.clone();
        let stop = self.stop.clone();
        let interval = self.interval;
        self.worker = Some(thread::spawn(move || {
            session.on_quality(LocationQuality::Good);
            loop {
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                let i = cursor.fetch_add(1, Ordering::Relaxed);
                match script.get(i) {
                    Some(sample) => {
                        session.on_sample(sample.clone());
                        if !interval.is_zero() {
                            thread::sleep(interval);
                        }
                    }
                    None => {
                        session.on_quality(LocationQuality::Unavailable);
                        break;
                    }
                }
            }
        }));
        Ok(())
    }

    fn stop_updates(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    fn request_single_location(&mut self) -> Result<()> {
        if self.worker.is_some() {
            bail!("continuous updates are running");
        }
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        match self.script.get(i) {
            Some(sample) => {
                self.session.on_sample(sample.clone());
                Ok(())
            }
            None => {
                self.session.on_quality(LocationQuality::Unavailable);
                Err(anyhow!("replay script is exhausted"))
            }
        }
    }
}
