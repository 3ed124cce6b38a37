use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tokio_util::sync::CancellationToken;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Collects the raw target text from a file, the arguments, or stdin, in that order.
pub fn read_targets(args: &[String], file: Option<&Path>) -> anyhow::Result<String> {
    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read targets from {}", path.display()))?;
        return Ok(join_lines(&content));
    }

    if !args.is_empty() {
        return Ok(args.join(" "));
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprint!("Targets (address, list, or A-B range): ");
        io::stderr().flush()?;
        let mut line = String::new();
        stdin.lock().read_line(&mut line).context("failed to read targets from stdin")?;
        return Ok(line);
    }

    let content = io::read_to_string(stdin).context("failed to read targets from stdin")?;
    Ok(join_lines(&content))
}

/// Folds multi-line input into one whitespace-separated line, skipping blanks and `#` comments.
fn join_lines(content: &str) -> String {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect::<Vec<&str>>()
        .join(" ")
}

fn is_stop_key(key: &KeyEvent) -> bool {
    let is_q = key.code == KeyCode::Char('q');
    let is_ctrl_c = key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
    (is_q || is_ctrl_c) && key.kind == KeyEventKind::Press
}

/// Watches the keyboard for 'q' or Ctrl-C while a sweep runs.
///
/// Raw mode swallows the Ctrl-C signal, so the key itself has to be handled here.
pub struct KeyListener {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl KeyListener {
    /// Returns `None` when stdin is not an interactive terminal.
    pub fn start(cancel: CancellationToken) -> anyhow::Result<Option<Self>> {
        if !io::stdin().is_terminal() {
            return Ok(None);
        }
        enable_raw_mode().context("failed to enable raw mode")?;

        let stop = Arc::new(AtomicBool::new(false));
        let stop_ref = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            while !stop_ref.load(Ordering::Relaxed) && !cancel.is_cancelled() {
                match event::poll(POLL_INTERVAL) {
                    Ok(true) => {
                        if let Ok(Event::Key(key)) = event::read() {
                            if is_stop_key(&key) {
                                debug!("Stop key pressed");
                                cancel.cancel();
                                break;
                            }
                        }
                    }
                    Ok(false) => {}
                    Err(_) => break,
                }
            }
        });

        Ok(Some(Self {
            stop,
            handle: Some(handle),
        }))
    }
}

impl Drop for KeyListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        let _ = disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_lines_skips_comments_and_blanks() {
        let content = "# lab hosts\n10.0.0.1\n\n  10.0.0.2  \n# end\n";
        assert_eq!(join_lines(content), "10.0.0.1 10.0.0.2");
    }

    #[test]
    fn arguments_are_joined_with_spaces() {
        let args = vec!["10.0.0.1".to_string(), "10.0.0.9".to_string()];
        assert_eq!(read_targets(&args, None).unwrap(), "10.0.0.1 10.0.0.9");
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_targets(&[], Some(Path::new("/nonexistent/targets.txt"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/targets.txt"));
    }

    #[test]
    fn q_and_ctrl_c_stop() {
        let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        assert!(is_stop_key(&q));
        assert!(is_stop_key(&ctrl_c));
        assert!(!is_stop_key(&c));
    }
}
