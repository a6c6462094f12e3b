use std::{
    fs::{self, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::Arc,
    thread::{self, JoinHandle},
};

use chrono::{DateTime, Local};
use concat_string::concat_string;
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::Level;

use crate::config;

const BUFFER_SIZE: usize = 4096;

/// Named log handle handed to every component.
///
/// Lines always go to stderr; when `log.dir` is configured they are also queued to a
/// background thread that appends them to `<dir>/<date>_nsecli.log`.
#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
    debug: bool,
    writer: Option<Sender<Entry>>,
}

/// Closes the file sink and waits for the writer thread once dropped.
pub struct LogGuard {
    writer: Option<Sender<Entry>>,
    handle: Option<JoinHandle<()>>,
}

enum Entry {
    Line(LogMessage),
    Close,
}

pub struct LogMessage {
    pub level: Level,
    pub name: Arc<str>,
    pub msg: String,
    pub created_at: DateTime<Local>,
}

impl LogMessage {
    pub fn new(level: Level, name: Arc<str>, msg: String) -> Self {
        LogMessage {
            level,
            name,
            msg,
            created_at: Local::now(),
        }
    }

    fn format(&self) -> String {
        concat_string!(
            self.created_at.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            " ",
            self.level.to_string(),
            " [",
            self.name.as_ref(),
            "] ",
            self.msg
        )
    }
}

impl Logger {
    /// Builds the root logger from the application settings.
    pub fn new(app: &config::App) -> (Self, LogGuard) {
        let (writer, handle) = match &app.log.dir {
            Some(dir) => match Self::get_log_path(dir) {
                Some(path) => {
                    let (tx, rx) = unbounded::<Entry>();
                    let handle = thread::spawn(move || write_loop(path, rx));
                    (Some(tx), Some(handle))
                }
                None => {
                    error_console(format!("Failed to create log directory {}", dir.display()));
                    (None, None)
                }
            },
            None => (None, None),
        };

        let logger = Logger {
            name: Arc::from("nsecli"),
            debug: app.debug,
            writer: writer.clone(),
        };

        (logger, LogGuard { writer, handle })
    }

    /// A child logger sharing the same level and sink.
    pub fn named(&self, name: &str) -> Self {
        Logger {
            name: Arc::from(name),
            debug: self.debug,
            writer: self.writer.clone(),
        }
    }

    pub fn debug(&self, log: String) {
        if self.debug {
            self.send(Level::Debug, log);
        }
    }

    pub fn info(&self, log: String) {
        self.send(Level::Info, log);
    }

    pub fn warn(&self, log: String) {
        self.send(Level::Warn, log);
    }

    pub fn error(&self, log: String) {
        self.send(Level::Error, log);
    }

    fn send(&self, level: Level, msg: String) {
        let message = LogMessage::new(level, self.name.clone(), msg);
        eprintln!("{}", message.format());

        if let Some(writer) = &self.writer {
            if let Err(why) = writer.send(Entry::Line(message)) {
                error_console(why.to_string());
            }
        }
    }

    fn get_log_path(dir: &Path) -> Option<PathBuf> {
        if !dir.exists() {
            fs::create_dir_all(dir).ok()?;
        }

        let mut log_path = PathBuf::from(dir);
        log_path.push(format!("{}_nsecli.log", Local::now().format("%Y-%m-%d")));

        Some(log_path)
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            let _ = writer.send(Entry::Close);
        }

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error_console("log writer thread panicked".to_string());
            }
        }
    }
}

// 寫入檔案的操作使用另一個線程處理
fn write_loop(path: PathBuf, rx: Receiver<Entry>) {
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(why) => {
            error_console(format!("Failed to open log file {}: {}", path.display(), why));
            return;
        }
    };

    let mut writer = BufWriter::new(file);
    let mut line = String::with_capacity(BUFFER_SIZE);

    for received in &rx {
        let closing = match received {
            Entry::Line(message) => {
                line.push_str(&message.format());
                line.push('\n');
                false
            }
            Entry::Close => true,
        };

        if closing || rx.is_empty() || line.len() >= BUFFER_SIZE {
            if let Err(why) = writer.write_all(line.as_bytes()) {
                error_console(format!(
                    "Failed to write to log file. because:{:#?}\r\nmsg:{}",
                    why, line
                ));
            }

            if let Err(why) = writer.flush() {
                error_console(format!("Failed to flush log file. because:{:#?}", why));
            }

            line.clear();
        }

        if closing {
            break;
        }
    }
}

pub fn error_console(log: String) {
    eprintln!("{} Error {}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"), log);
}
