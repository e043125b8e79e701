//! `env_logger` setup
//!
//! The interactive view owns the terminal, so log lines go to a file under
//! the cache directory. Print mode writes them to stderr instead.

use env_logger::{Builder, Env};
use log::Record;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Environment variable selecting the log level
pub const LOG_ENV: &str = "GLOBEARC_LOG";

pub enum Target {
    Stderr,
    File(PathBuf),
}

fn format_line(record: &Record) -> String {
    format!(
        "{} {:<5} {}: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        record.level(),
        record.target(),
        record.args()
    )
}

/// Default log file: `<cache dir>/globearc/globearc.log`
pub fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("globearc")
        .join("globearc.log")
}

fn open_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global logger. Failing to open the log file disables logging.
pub fn init(target: Target) {
    let mut builder = Builder::from_env(Env::new().filter_or(LOG_ENV, "info"));
    builder.format(|buf, record| writeln!(buf, "{}", format_line(record)));

    match target {
        Target::Stderr => {
            builder.target(env_logger::Target::Stderr);
        }
        Target::File(path) => match open_file(&path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(_) => return,
        },
    }

    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_has_level_and_message() {
        let line = format_line(
            &Record::builder()
                .args(format_args!("texture ready"))
                .level(log::Level::Info)
                .target("globearc::texture")
                .build(),
        );
        assert!(line.contains("INFO"));
        assert!(line.ends_with("globearc::texture: texture ready"));
    }

    #[test]
    fn log_file_parents_are_created() {
        let dir = std::env::temp_dir().join(format!("globearc-log-{}", std::process::id()));
        let path = dir.join("nested").join("globearc.log");
        let mut file = open_file(&path).unwrap();
        writeln!(file, "{}", "hello").unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("hello"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn log_path_is_namespaced() {
        assert!(default_log_path().ends_with("globearc/globearc.log"));
    }
}
