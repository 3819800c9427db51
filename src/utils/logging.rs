//! Transcript logging
//!
//! Appends the conversation, as the user sees it, to a plain-text log file.
//! This is display logging, not session persistence: nothing is ever read
//! back from the file.

use chrono::Utc;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct LoggingState {
    file_path: Option<String>,
    is_active: bool,
}

impl LoggingState {
    /// Create the logging state. A file given on the command line enables
    /// logging immediately and stamps the session start.
    pub fn new(log_file: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut logging = LoggingState {
            file_path: log_file,
            is_active: false,
        };

        if logging.file_path.is_some() {
            logging.is_active = true;
            logging.log_message(&format!(
                "## Logging started at {}",
                Utc::now().to_rfc3339()
            ))?;
        }

        Ok(logging)
    }

    pub fn set_log_file(&mut self, path: String) -> Result<String, Box<dyn std::error::Error>> {
        // Test if we can create/write to the file
        self.test_file_access(&path)?;

        self.file_path = Some(path.clone());
        self.is_active = true;

        Ok(format!("Logging enabled to: {path}"))
    }

    pub fn toggle_logging(
        &mut self,
        pause_message: &str,
    ) -> Result<String, Box<dyn std::error::Error>> {
        match &self.file_path {
            Some(path) => {
                if self.is_active {
                    // Write pause message to log BEFORE pausing
                    self.log_message(&format!("## {}", pause_message))?;
                    self.is_active = false;
                    Ok(format!("Logging paused (file: {path})"))
                } else {
                    self.is_active = true;
                    Ok(format!("Logging resumed to: {path}"))
                }
            }
            None => {
                Err("No log file specified. Use /log <filename> to enable logging first.".into())
            }
        }
    }

    pub fn log_message(&self, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        if !self.is_active || self.file_path.is_none() {
            return Ok(());
        }

        self.write_to_log(content)
    }

    fn write_to_log(&self, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        let Some(file_path) = self.file_path.as_ref() else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;

        // Buffered so a multi-line message lands in one write
        let mut writer = BufWriter::with_capacity(64 * 1024, file);

        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }

        // Empty line after each message, matching the screen display
        writeln!(writer)?;

        writer.flush()?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn get_status_string(&self) -> String {
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!(
                "active ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
            (Some(path), false) => format!(
                "paused ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
        }
    }

    fn test_file_access(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn command_line_file_enables_logging_and_stamps_start() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat.log");
        let logging = LoggingState::new(Some(path.to_string_lossy().into_owned())).unwrap();

        assert!(logging.is_active());
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("## Logging started at "));
    }

    #[test]
    fn messages_append_with_blank_line_spacing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat.log");
        let mut logging = LoggingState::new(None).unwrap();
        logging
            .set_log_file(path.to_string_lossy().into_owned())
            .unwrap();

        logging.log_message("You: hi").unwrap();
        logging.log_message("hello back").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "You: hi\n\nhello back\n\n");
    }

    #[test]
    fn toggle_requires_a_file_and_pauses_writes() {
        let mut logging = LoggingState::new(None).unwrap();
        assert!(logging.toggle_logging("Logging paused").is_err());

        let dir = tempdir().unwrap();
        let path = dir.path().join("chat.log");
        logging
            .set_log_file(path.to_string_lossy().into_owned())
            .unwrap();

        let status = logging.toggle_logging("Logging paused for a break").unwrap();
        assert!(status.starts_with("Logging paused"));
        assert!(!logging.is_active());

        logging.log_message("dropped while paused").unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("## Logging paused for a break"));
        assert!(!contents.contains("dropped while paused"));

        let status = logging.toggle_logging("unused").unwrap();
        assert!(status.starts_with("Logging resumed"));
        assert!(logging.is_active());
    }

    #[test]
    fn status_string_reports_file_name() {
        let mut logging = LoggingState::new(None).unwrap();
        assert_eq!(logging.get_status_string(), "disabled");

        let dir = tempdir().unwrap();
        let path = dir.path().join("chat.log");
        logging
            .set_log_file(path.to_string_lossy().into_owned())
            .unwrap();
        assert_eq!(logging.get_status_string(), "active (chat.log)");
    }
}
