use std::io::Write;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use colored::*;
use crossterm::terminal::is_raw_mode_enabled;
use indicatif::{ProgressBar, ProgressStyle};
use sweepr_core::scanner::{ProgressSnapshot, ScanProgress};
use tokio::task::JoinHandle;

const REFRESH_INTERVAL: Duration = Duration::from_millis(100);
const TIP: &str = "You can press 'q' to finish early";

pub(crate) static SPINNER: OnceLock<ProgressBar> = OnceLock::new();

pub fn get_spinner() -> &'static ProgressBar {
    SPINNER.get_or_init(init_spinner)
}

fn init_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&[
            "▁▁▁▁▁",
            "▁▂▂▂▁",
            "▁▄▂▄▁",
            "▂▄▆▄▂",
            "▄▆█▆▄",
            "▂▄▆▄▂",
            "▁▄▂▄▁",
            "▁▂▂▂▁",
        ]);

    pb.set_style(style);
    pb.enable_steady_tick(REFRESH_INTERVAL);
    pb
}

/// Clears the spinner if one was ever shown.
pub fn clear() {
    if let Some(pb) = SPINNER.get() {
        pb.finish_and_clear();
    }
}

pub fn progress_message(snapshot: &ProgressSnapshot, show_tip: bool) -> String {
    let percent: u64 = match snapshot.total {
        0 => 100,
        total => snapshot.completed * 100 / total,
    };
    let mut msg = format!(
        "Probed {}/{} ({}%) · {} open · {} in flight",
        snapshot.completed,
        snapshot.total,
        percent,
        snapshot.open.to_string().green().bold(),
        snapshot.in_flight()
    );
    if show_tip {
        msg.push_str(&format!("  {}", TIP.italic().white()));
    }
    msg
}

/// Keeps the spinner message in step with the sweep counters until aborted.
pub fn start_progress_reporter(progress: Arc<ScanProgress>, show_tip: bool) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(REFRESH_INTERVAL);
        loop {
            ticker.tick().await;
            get_spinner().set_message(progress_message(&progress.snapshot(), show_tip));
        }
    })
}

/// Routes log output around the spinner so lines never tear it.
pub struct SpinnerWriter;

impl Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let msg = String::from_utf8_lossy(buf);
        let msg = msg.trim_end_matches('\n');
        // Raw mode leaves '\n' without a carriage return.
        let line_end: &str = match is_raw_mode_enabled() {
            Ok(true) => "\r\n",
            _ => "\n",
        };

        let mut result: std::io::Result<()> = Ok(());
        let mut emit = || {
            let mut stdout = std::io::stdout().lock();
            result = write!(stdout, "{msg}{line_end}").and_then(|_| stdout.flush());
        };
        match SPINNER.get() {
            Some(pb) => pb.suspend(emit),
            None => emit(),
        }
        result.map(|_| buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stdout().flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_message_reports_percentage() {
        colored::control::set_override(false);
        let snapshot = ProgressSnapshot {
            total: 200,
            dispatched: 120,
            completed: 100,
            open: 2,
            errors: 0,
        };
        let msg = progress_message(&snapshot, false);
        assert_eq!(msg, "Probed 100/200 (50%) · 2 open · 20 in flight");
    }
}
