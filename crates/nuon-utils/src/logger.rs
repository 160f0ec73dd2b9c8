//! Bounded-queue rotating file logger.
//!
//! Producers hand records to a bounded channel without ever blocking;
//! when the queue is full the record is dropped. A single worker thread
//! drains the queue and writes log files that rotate by size and,
//! optionally, by day, cycling through a bounded number of files.

use std::fs::File;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::sync::Mutex;
use std::thread::JoinHandle;

use chrono::{DateTime, Datelike, Local};
use log::{LevelFilter, Metadata, Record};
use nuon_common::{Result, Status};

use crate::fs::file_exists;

const MAX_PREFIX_LEN: usize = 128;
const MAX_FILE_KB: u32 = 1024 * 1024;
const MAX_FILE_COUNT: u32 = 100;

/// Configuration for a [`RotateLogger`].
#[derive(Clone, Debug)]
pub struct LoggerConfig {
    /// Log file name prefix; truncated to 128 characters.
    pub prefix: String,
    /// Directory receiving the log files; must already exist.
    pub directory: PathBuf,
    /// Start a fresh file (and reset the sequence) when the day changes.
    pub daily: bool,
    /// Size cap per file in kilobytes; capped at 1 GiB.
    pub max_file_kb: u32,
    /// How many files to cycle through; capped at 100.
    pub max_file_count: u32,
    /// Queue capacity; records beyond it are dropped.
    pub capacity: usize,
    /// Maximum level written.
    pub level: LevelFilter,
}

impl LoggerConfig {
    pub fn new(prefix: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            directory: directory.into(),
            daily: true,
            max_file_kb: 4 * 1024,
            max_file_count: 10,
            capacity: 1024,
            level: LevelFilter::Info,
        }
    }
}

struct LogTask {
    timestamp: DateTime<Local>,
    level: log::Level,
    target: String,
    message: String,
}

/// Sink side: owns the current file and the rotation state.
struct LogWriter {
    prefix: String,
    directory: PathBuf,
    daily: bool,
    max_file_bytes: u64,
    max_file_count: u32,
    file: Option<File>,
    written: u64,
    seq: u32,
    day: u32,
}

impl LogWriter {
    fn new(config: &LoggerConfig) -> Self {
        let mut prefix = config.prefix.clone();
        prefix.truncate(MAX_PREFIX_LEN);
        Self {
            prefix,
            directory: config.directory.clone(),
            daily: config.daily,
            max_file_bytes: u64::from(config.max_file_kb.min(MAX_FILE_KB)) * 1024,
            max_file_count: config.max_file_count.min(MAX_FILE_COUNT).max(1),
            file: None,
            written: 0,
            seq: 0,
            day: 0,
        }
    }

    fn file_name(&self, timestamp: &DateTime<Local>, seq: u32) -> String {
        if self.daily {
            format!(
                "{}-{}.{}.log",
                self.prefix,
                timestamp.format("%Y-%m-%d"),
                seq
            )
        } else {
            format!("{}.{}.log", self.prefix, seq)
        }
    }

    fn needs_rotation(&self, timestamp: &DateTime<Local>) -> bool {
        self.file.is_none()
            || self.written > self.max_file_bytes
            || (self.daily && self.day != timestamp.day())
    }

    fn rotate(&mut self, timestamp: &DateTime<Local>) {
        if self.daily && self.day != timestamp.day() {
            self.seq = 0;
        }
        self.seq = self.seq % self.max_file_count + 1;

        let path = self.directory.join(self.file_name(timestamp, self.seq));
        self.file = File::create(path).ok();
        self.written = 0;
        self.day = timestamp.day();
    }

    fn write(&mut self, task: &LogTask) {
        if self.needs_rotation(&task.timestamp) {
            self.rotate(&task.timestamp);
        }

        if let Some(file) = &mut self.file {
            let line = format!(
                "[{}][{}] {}:\t\t{}\n",
                task.timestamp.format("%y-%m-%d %H:%M:%S"),
                task.level,
                task.target,
                task.message
            );
            if file.write_all(line.as_bytes()).is_ok() {
                self.written += line.len() as u64;
            }
        }
    }

    fn run(mut self, receiver: Receiver<LogTask>) {
        while let Ok(task) = receiver.recv() {
            self.write(&task);
        }
        if let Some(file) = &mut self.file {
            let _ = file.flush();
        }
    }
}

/// A non-blocking logger writing size/day-rotated files.
///
/// Install it as the global `log` backend with
/// [`install`](Self::install), or drive it directly with
/// [`put`](Self::put).
#[derive(Debug)]
pub struct RotateLogger {
    level: LevelFilter,
    sender: Option<SyncSender<LogTask>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl RotateLogger {
    /// Validates the target directory and starts the worker thread.
    pub fn new(config: LoggerConfig) -> Result<Self> {
        if !file_exists(&config.directory) {
            return Err(Status::Fail(format!(
                "directory does not exist: {}",
                config.directory.display()
            )));
        }

        let (sender, receiver) = sync_channel(config.capacity.max(1));
        let writer = LogWriter::new(&config);
        let worker = std::thread::Builder::new()
            .name("nuon-logger".into())
            .spawn(move || writer.run(receiver))
            .map_err(|err| Status::ThreadError(format!("spawn logger thread failed: {err}")))?;

        Ok(Self {
            level: config.level,
            sender: Some(sender),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Enqueues one record. Never blocks; returns `false` when the queue
    /// is full (the record is dropped) or the worker is gone.
    pub fn put(&self, level: log::Level, target: &str, message: String) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };
        let task = LogTask {
            timestamp: Local::now(),
            level,
            target: target.to_string(),
            message,
        };
        match sender.try_send(task) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Installs this logger as the global `log` backend.
    pub fn install(self) -> Result<()> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))
            .map_err(|err| Status::Fail(format!("install logger failed: {err}")))?;
        log::set_max_level(level);
        Ok(())
    }

    /// Drains the queue and stops the worker.
    pub fn shutdown(mut self) {
        self.sender.take();
        if let Ok(mut worker) = self.worker.lock() {
            if let Some(handle) = worker.take() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for RotateLogger {
    fn drop(&mut self) {
        self.sender.take();
        if let Ok(mut worker) = self.worker.lock() {
            if let Some(handle) = worker.take() {
                let _ = handle.join();
            }
        }
    }
}

impl log::Log for RotateLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.put(record.level(), record.target(), record.args().to_string());
        }
    }

    fn flush(&self) {}
}
