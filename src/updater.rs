use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};

/// Version of this build, compared against line 1 of the version endpoint.
pub const VERSION: u32 = 5;

const VERSION_URL: &str = "http://blizzy.de/ambient-light/version.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateInfo {
    pub update_available: bool,
    pub compatible_versions: Vec<String>,
}

/// One-shot remote version check. The fetch runs on a background thread and
/// reports back exactly once over a channel; any failure still lands the
/// state in `Done` (with an unknown result) so the check is never retried
/// within a session.
pub enum UpdatePoll {
    NotStarted,
    InFlight(Receiver<Option<UpdateInfo>>),
    Done(Option<UpdateInfo>),
}

impl UpdatePoll {
    pub fn new() -> Self {
        UpdatePoll::NotStarted
    }

    /// Kick off the fetch. Ignored unless the poll has never started.
    pub fn start(&mut self) {
        if !matches!(self, UpdatePoll::NotStarted) {
            return;
        }
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = match fetch_version_text() {
                Ok(text) => match parse_version_text(&text, VERSION) {
                    Ok(info) => {
                        if info.update_available {
                            info!("[UPDATE] update found (current version {})", VERSION);
                        } else {
                            info!("[UPDATE] no update found (current version {})", VERSION);
                        }
                        Some(info)
                    }
                    Err(e) => {
                        warn!("[UPDATE] unusable version response: {:#}", e);
                        None
                    }
                },
                Err(e) => {
                    warn!("[UPDATE] version check failed: {:#}", e);
                    None
                }
            };
            // Receiver may be gone if the app shut down mid-fetch.
            let _ = tx.send(result);
        });
        *self = UpdatePoll::InFlight(rx);
    }

    /// Drain the channel; call once per frame. Transitions to `Done` when
    /// the background thread reports (or dies without reporting).
    pub fn poll(&mut self) {
        if let UpdatePoll::InFlight(rx) = self {
            match rx.try_recv() {
                Ok(result) => *self = UpdatePoll::Done(result),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => *self = UpdatePoll::Done(None),
            }
        }
    }

    pub fn update_available(&self) -> bool {
        matches!(
            self,
            UpdatePoll::Done(Some(UpdateInfo {
                update_available: true,
                ..
            }))
        )
    }
}

fn fetch_version_text() -> Result<String> {
    debug!("[UPDATE] getting version from {}", VERSION_URL);
    let response = reqwest::blocking::get(VERSION_URL)
        .with_context(|| format!("Failed to fetch {}", VERSION_URL))?;
    response.text().context("Failed to read version response body")
}

/// Parse the two-line version response: line 1 is an integer version, line 2
/// a comma-separated list of compatible host versions. Anything else is a
/// parse error; no defaults are inferred.
fn parse_version_text(text: &str, current_version: u32) -> Result<UpdateInfo> {
    let text = text.replace('\r', "");
    let mut lines = text.split('\n');

    let version_line = lines.next().unwrap_or("");
    let remote_version: u32 = version_line
        .trim()
        .parse()
        .with_context(|| format!("Bad version number line: {:?}", version_line))?;

    let Some(compat_line) = lines.next() else {
        bail!("Missing compatible-versions line");
    };
    let compatible_versions: Vec<String> = compat_line
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();

    Ok(UpdateInfo {
        update_available: remote_version > current_version,
        compatible_versions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reports_newer_remote_version() {
        let info = parse_version_text("6\n1.2.0,1.2.1\n", 5).unwrap();
        assert!(info.update_available);
        assert_eq!(info.compatible_versions, vec!["1.2.0", "1.2.1"]);
    }

    #[test]
    fn test_parse_same_version_is_not_an_update() {
        let info = parse_version_text("5\n1.2.0", 5).unwrap();
        assert!(!info.update_available);
    }

    #[test]
    fn test_parse_strips_carriage_returns() {
        let info = parse_version_text("7\r\n1.2.0, 1.2.1\r\n", 5).unwrap();
        assert!(info.update_available);
        assert_eq!(info.compatible_versions, vec!["1.2.0", "1.2.1"]);
    }

    #[test]
    fn test_parse_fails_on_missing_second_line() {
        assert!(
            parse_version_text("6", 5).is_err(),
            "single-line response is a parse error, not a default"
        );
    }

    #[test]
    fn test_parse_fails_on_non_integer_version() {
        assert!(parse_version_text("latest\n1.2.0", 5).is_err());
    }

    #[test]
    fn test_parse_drops_empty_list_entries() {
        let info = parse_version_text("6\n1.2.0,,1.2.1,", 5).unwrap();
        assert_eq!(info.compatible_versions, vec!["1.2.0", "1.2.1"]);
    }

    #[test]
    fn test_poll_lands_done_when_thread_reports() {
        let (tx, rx) = mpsc::channel();
        let mut poll = UpdatePoll::InFlight(rx);

        poll.poll();
        assert!(matches!(poll, UpdatePoll::InFlight(_)), "no report yet");

        tx.send(Some(UpdateInfo {
            update_available: true,
            compatible_versions: vec![],
        }))
        .unwrap();
        poll.poll();
        assert!(poll.update_available());
    }

    #[test]
    fn test_dead_fetch_thread_still_lands_done() {
        let (tx, rx) = mpsc::channel::<Option<UpdateInfo>>();
        let mut poll = UpdatePoll::InFlight(rx);
        drop(tx);

        poll.poll();
        assert!(
            matches!(poll, UpdatePoll::Done(None)),
            "a fetch that dies without reporting must still mark the poll done"
        );
    }

    #[test]
    fn test_failed_poll_is_done_with_unknown_result() {
        let poll = UpdatePoll::Done(None);
        assert!(!poll.update_available());
    }
}
