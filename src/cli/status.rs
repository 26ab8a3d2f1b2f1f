//! Status display module
//!
//! User-facing status lines. Diagnostics go through `tracing`; everything a
//! user is meant to read (links, the final status, fatal errors) goes here.

use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use crate::site::{CrossPostResult, UploadResult};
use crate::torrent::TorrentSummary;

/// Status display for CLI
pub struct StatusDisplay<W: Write = Stdout> {
    /// Where status lines are written
    out: W,
    /// Start time of the run
    start_time: Instant,
    /// Print detail lines
    verbose: bool,
    /// Quiet mode (errors only)
    quiet: bool,
}

impl StatusDisplay<Stdout> {
    /// Create a status display writing to stdout
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self::with_writer(io::stdout(), verbose, quiet)
    }
}

impl<W: Write> StatusDisplay<W> {
    /// Create a status display writing to `out`
    pub fn with_writer(out: W, verbose: bool, quiet: bool) -> Self {
        Self {
            out,
            start_time: Instant::now(),
            verbose,
            quiet,
        }
    }

    /// Print a status message
    pub fn print_status(&mut self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(self.out, "{}", message)
    }

    /// Print a detail line, shown in verbose mode only
    pub fn print_detail(&mut self, message: &str) -> io::Result<()> {
        if !self.verbose || self.quiet {
            return Ok(());
        }
        writeln!(self.out, "{}", message)
    }

    /// Print a fatal error message
    pub fn print_error(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", message)?;
        self.out.flush()
    }

    /// Print the torrent summary
    pub fn print_torrent_summary(&mut self, summary: &TorrentSummary) -> io::Result<()> {
        self.print_detail("Torrent Information:")?;
        self.print_detail(&format!("  Name: {}", summary.name))?;
        self.print_detail(&format!(
            "  Size: {} in {} file(s)",
            TorrentSummary::format_bytes(summary.total_size),
            summary.file_count
        ))?;
        self.print_detail(&format!("  Info hash: {}", summary.info_hash_hex()))?;
        match &summary.announce {
            Some(announce) => self.print_detail(&format!("  Announce: {}", announce)),
            None => self.print_detail("  Announce: none"),
        }
    }

    /// Print the links of a fresh upload
    pub fn print_upload(&mut self, result: &UploadResult) -> io::Result<()> {
        self.print_detail(&format!("Nyaa View Link: {}", result.view_url))?;
        self.print_detail(&format!("Nyaa Download Link: {}", result.download_url))
    }

    /// Print the cross-post status URL
    pub fn print_cross_post(&mut self, result: &CrossPostResult) -> io::Result<()> {
        self.print_detail(&format!("Tokyotosho Status URL: {}", result.details_url))
    }

    /// Print completion message
    pub fn print_complete(&mut self) -> io::Result<()> {
        self.print_status("Submission complete")?;
        self.print_detail(&format!("  Elapsed Time: {}", format_duration(self.start_time.elapsed())))?;
        self.out.flush()
    }

    /// Consume the display, returning its writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Format duration to human readable string
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;

    if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}.{:03}s", seconds, duration.subsec_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(display: StatusDisplay<Vec<u8>>) -> String {
        String::from_utf8(display.into_inner()).unwrap()
    }

    fn upload() -> UploadResult {
        UploadResult::new("http://nyaa.test", 42)
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.500s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
    }

    #[test]
    fn test_verbose_prints_links() {
        let mut display = StatusDisplay::with_writer(Vec::new(), true, false);
        display.print_upload(&upload()).unwrap();
        let text = output(display);
        assert!(text.contains("Nyaa View Link: http://nyaa.test/?page=view&tid=42"));
        assert!(text.contains("Nyaa Download Link: http://nyaa.test/?page=download&tid=42"));
    }

    #[test]
    fn test_default_hides_details() {
        let mut display = StatusDisplay::with_writer(Vec::new(), false, false);
        display.print_upload(&upload()).unwrap();
        display.print_complete().unwrap();
        assert_eq!(output(display), "Submission complete\n");
    }

    #[test]
    fn test_quiet_still_prints_errors() {
        let mut display = StatusDisplay::with_writer(Vec::new(), false, true);
        display.print_complete().unwrap();
        display.print_error("Need to have exactly one video in this folder").unwrap();
        assert_eq!(output(display), "Need to have exactly one video in this folder\n");
    }
}
