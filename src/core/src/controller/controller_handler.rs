use crate::configuration::config::Config;
use crate::error_handling::types::*;
use crate::session_management::session_tracker::SessionTracker;
use crate::session_management::usage_report::UsageReport;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

/// How a finished report is printed.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

/// Outcome of monitoring a program from launch to exit.
#[derive(Debug)]
pub struct ProgramRun {
    pub report: UsageReport,
    /// `None` when the program was terminated by a signal.
    pub exit_code: Option<i32>,
}

/// Drives the command-line operations on top of a [`SessionTracker`].
pub struct Controller {
    tracker: Arc<SessionTracker>,
}

impl Controller {
    pub fn new(config: &Config) -> Self {
        Self::with_tracker(Arc::new(SessionTracker::new(config)))
    }

    pub fn with_tracker(tracker: Arc<SessionTracker>) -> Self {
        Self { tracker }
    }

    pub fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }

    /// Launches `program`, monitors it until it exits and reports the window.
    pub async fn run_program(
        &self,
        program: &str,
        args: &[String],
    ) -> Result<ProgramRun, ControllerError> {
        info!("launching {} {:?}", program, args);
        let mut child = Command::new(program)
            .args(args)
            .spawn()
            .map_err(ControllerError::SpawnFailed)?;

        let pid = match child.id() {
            Some(pid) => pid,
            None => return Err(ControllerError::ProcessExited),
        };

        if let Err(e) = self.tracker.start(pid) {
            error!("could not start monitoring pid {}: {}", pid, e);
            let _ = child.kill().await;
            return Err(e.into());
        }

        let status = match child.wait().await {
            Ok(status) => status,
            Err(e) => {
                self.tracker.abandon(pid);
                return Err(ControllerError::WaitFailed(e));
            }
        };
        debug!("pid {} exited with {}", pid, status);

        let report = self.tracker.end(pid)?;
        Ok(ProgramRun {
            report,
            exit_code: status.code(),
        })
    }

    /// Monitors an existing process for `seconds`, or until Ctrl-C when no
    /// duration is given. Ctrl-C always ends the window early.
    pub async fn watch(
        &self,
        pid: u32,
        seconds: Option<u64>,
    ) -> Result<UsageReport, ControllerError> {
        self.tracker.start(pid)?;

        let waited = match seconds {
            Some(secs) => {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(secs)) => Ok(()),
                    signal = tokio::signal::ctrl_c() => {
                        info!("interrupted, ending window for pid {}", pid);
                        signal
                    }
                }
            }
            None => {
                info!("watching pid {}, press Ctrl-C to stop", pid);
                tokio::signal::ctrl_c().await
            }
        };

        if let Err(e) = waited {
            warn!("signal handling failed, dropping window for pid {}: {}", pid, e);
            self.tracker.abandon(pid);
            return Err(ControllerError::SignalError(e));
        }

        Ok(self.tracker.end(pid)?)
    }

    pub fn connections(&self, pid: u32) -> usize {
        self.tracker.connection_count(pid)
    }

    /// Ends every window still open, logging each outcome.
    pub fn shutdown(&self) {
        for (pid, outcome) in self.tracker.shutdown_all() {
            match outcome {
                Ok(report) => info!("closed pid {} on shutdown: {}", pid, report.summary()),
                Err(e) => warn!("pid {} could not be closed cleanly: {}", pid, e),
            }
        }
    }
}

pub fn render(report: &UsageReport, format: OutputFormat) -> Result<String, ControllerError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| ControllerError::OutputError(e.to_string())),
        OutputFormat::Text => Ok(report.summary()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::fakes::{FixedConnections, ScriptedCounters};
    use serial_test::serial;

    fn controller(pairs: &[(u64, u64)]) -> Controller {
        let config = Config::default();
        let tracker = Arc::new(SessionTracker::with_sources(
            &config,
            Arc::new(ScriptedCounters::from_pairs(pairs)),
            Arc::new(FixedConnections(Ok(2))),
        ));
        Controller::with_tracker(tracker)
    }

    #[tokio::test]
    async fn test_watch_for_fixed_duration() {
        let controller = controller(&[(100, 200), (1_124, 2_248)]);

        let report = controller.watch(4321, Some(0)).await.unwrap();
        assert_eq!(report.bytes_sent, 1_024);
        assert_eq!(report.bytes_recv, 2_048);
        assert_eq!(report.connections, 2);
        assert!(!controller.tracker().is_active(4321));
    }

    #[tokio::test]
    async fn test_watch_propagates_counter_failure() {
        let config = Config::default();
        let tracker = Arc::new(SessionTracker::with_sources(
            &config,
            Arc::new(ScriptedCounters::new(vec![Err(InspectionError::Unsupported)])),
            Arc::new(FixedConnections(Ok(0))),
        ));
        let controller = Controller::with_tracker(tracker);

        let result = controller.watch(1, Some(0)).await;
        assert!(matches!(
            result,
            Err(ControllerError::MonitorError(MonitorError::CountersUnavailable(_)))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    #[serial]
    async fn test_run_program_reports_exit_code() {
        let controller = controller(&[(0, 0), (512, 1_024)]);

        let run = controller
            .run_program("sh", &["-c".to_string(), "exit 3".to_string()])
            .await
            .unwrap();

        assert_eq!(run.exit_code, Some(3));
        assert_eq!(run.report.bytes_sent, 512);
        assert_eq!(run.report.bytes_recv, 1_024);
        assert_eq!(controller.tracker().active_session_count(), 0);
    }

    #[tokio::test]
    async fn test_run_missing_program() {
        let controller = controller(&[(0, 0)]);
        let result = controller
            .run_program("/nonexistent/netusage-test-binary", &[])
            .await;
        assert!(matches!(result, Err(ControllerError::SpawnFailed(_))));
        assert_eq!(controller.tracker().active_session_count(), 0);
    }

    #[test]
    fn test_shutdown_closes_open_windows() {
        let controller = controller(&[(0, 0)]);
        controller.tracker().start(1).unwrap();
        controller.tracker().start(2).unwrap();

        controller.shutdown();
        assert_eq!(controller.tracker().active_session_count(), 0);
    }

    #[test]
    fn test_new_applies_restart_policy() {
        let config = Config {
            restart_policy: crate::configuration::types::RestartPolicy::Reject,
            ..Config::default()
        };
        let controller = Controller::new(&config);
        let pid = std::process::id();

        if controller.tracker().start(pid).is_err() {
            // No readable interface counters in this environment.
            return;
        }
        assert_eq!(
            controller.tracker().start(pid),
            Err(MonitorError::AlreadyStarted(pid))
        );
        controller.tracker().abandon(pid);
        assert_eq!(controller.tracker().active_session_count(), 0);
    }

    #[test]
    fn test_render_formats() {
        let report = UsageReport::from_deltas(1_024, 0, 1, Duration::from_secs(1));

        let json = render(&report, OutputFormat::Json).unwrap();
        let parsed: UsageReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);

        let text = render(&report, OutputFormat::Text).unwrap();
        assert_eq!(text, report.summary());
    }
}
