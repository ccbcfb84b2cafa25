use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::mpsc,
    thread,
};

use anyhow::Result;

use crate::track_record::{build_record, Position};

/* Appends accepted positions to the per-user trajectory file
`{user_id}.t3.bin` under the configured base directory. All disk I/O happens
on a dedicated writer thread fed by a channel, so a slow append never delays
delivery of the next sample. A failed append is logged and counted, it never
stops tracking. */

pub fn trajectory_file_path(base_dir: &Path, user_id: &str) -> PathBuf {
    base_dir.join(format!("{}.t3.bin", user_id))
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub written: u64,
    pub failed: u64,
}

pub struct TrackWriter {
    tx: mpsc::Sender<Position>,
    handle: thread::JoinHandle<WriterStats>,
}

struct WriterThread {
    base_dir: PathBuf,
    // opened lazily on the first append, one session writes one user's file
    file: Option<File>,
    stats: WriterStats,
}

impl WriterThread {
    fn append(&mut self, position: &Position) {
        match self.try_append(position) {
            Ok(()) => self.stats.written += 1,
            Err(e) => {
                self.stats.failed += 1;
                error!("[track_writer] failed to append record: {}", e);
            }
        }
    }

    fn try_append(&mut self, position: &Position) -> Result<()> {
        if self.file.is_none() {
            let path = trajectory_file_path(&self.base_dir, &position.user_id);
            self.file = Some(OpenOptions::new().create(true).append(true).open(&path)?);
        }
        let file = self.file.as_mut().unwrap();
        file.write_all(build_record(position).as_bytes())?;
        Ok(())
    }
}

impl TrackWriter {
    pub fn new(base_dir: &str) -> Result<TrackWriter> {
        let base_dir = PathBuf::from(base_dir);
        std::fs::create_dir_all(&base_dir)?;
        let mut writer = WriterThread {
            base_dir,
            file: None,
            stats: WriterStats::default(),
        };
        let (tx, rx) = mpsc::channel::<Position>();
        let handle = thread::spawn(move || {
            while let Ok(position) = rx.recv() {
                writer.append(&position);
            }
            writer.stats
        });
        Ok(TrackWriter { tx, handle })
    }

    /// Hands the record to the writer thread. Only fails when the writer
    /// thread is gone, which should not happen during a session.
    pub fn push(&self, position: Position) -> Result<()> {
        self.tx
            .send(position)
            .map_err(|_| anyhow!("writer thread is gone"))
    }

    /// Closes the channel and waits for the writer thread to drain pending
    /// appends. Nothing is dropped silently: anything that could not be
    /// written is reported in the returned stats.
    pub fn shutdown(self) -> Result<WriterStats> {
        drop(self.tx);
        let stats = self
            .handle
            .join()
            .map_err(|_| anyhow!("writer thread panicked"))?;
        if stats.failed > 0 {
            warn!(
                "[track_writer] {} record(s) could not be written",
                stats.failed
            );
        }
        Ok(stats)
    }
}
