use ansi_term::Colour;
use chrono_tz::Tz;
use env_logger::{Builder, Env};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

pub fn init(log_file: Option<&Path>, timezone: Tz) -> std::io::Result<()> {
    let log_file: Option<File> = match log_file {
        Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
        None => None,
    };

    Builder::from_env(Env::default().default_filter_or("info"))
        .format(move |buf, record| {
            let timestamp = chrono::Utc::now()
                .with_timezone(&timezone)
                .format("%Y-%m-%dT%H:%M:%S%:z");

            let level = match record.level() {
                log::Level::Error => Colour::Red.paint(record.level().to_string()),
                log::Level::Warn => Colour::Yellow.paint(record.level().to_string()),
                log::Level::Info => Colour::Green.paint(record.level().to_string()),
                log::Level::Debug => Colour::Blue.paint(record.level().to_string()),
                log::Level::Trace => Colour::Purple.paint(record.level().to_string()),
            };

            let console_line = format!(
                "[{} {} {}] {}",
                timestamp,
                level,
                record.module_path().unwrap_or_default(),
                record.args()
            );
            let file_line = format!(
                "[{} {} {}] {}",
                timestamp,
                record.level(),
                record.module_path().unwrap_or_default(),
                record.args()
            );

            write_record(buf, log_file.as_ref(), &console_line, &file_line)
        })
        .init();

    Ok(())
}

/// Writes to the console first; a failing log file is reported there instead of
/// swallowing the record.
fn write_record<C: Write, F: Write>(
    console: &mut C,
    file: Option<F>,
    console_line: &str,
    file_line: &str,
) -> std::io::Result<()> {
    writeln!(console, "{}", console_line)?;

    if let Some(mut file) = file {
        if let Err(e) = writeln!(file, "{}", file_line) {
            writeln!(console, "Failed to write to log file: {}", e)?;
        }
    }

    Ok(())
}
