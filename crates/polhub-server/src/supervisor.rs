//! Resource-triggered restart supervisor
//!
//! One long-lived background task owned by `main`. It samples the host's
//! one-minute load average on a fixed cadence and, on crossing the
//! configured threshold, waits out a grace delay, spawns a detached
//! replacement process with the invocation captured at construction, and
//! exits the current process.
//!
//! The threshold is percent-scaled (default 70.0) but compared against the
//! raw load average, not instantaneous CPU utilization.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use sysinfo::System;
use tokio::time::{interval, sleep};
use tracing::{debug, error, warn};

use crate::config::SupervisorConfig;

/// Supervisor lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// Watching the load metric on the sampling cadence.
    Sampling,
    /// The metric crossed the threshold on the last sample.
    OverloadDetected,
    /// Waiting out the grace delay before handing off.
    Restarting,
}

impl SupervisorState {
    /// Pure transition: feed one load sample into the state machine.
    pub fn observe(self, load: f64, threshold: f64) -> Self {
        match self {
            SupervisorState::Sampling if load > threshold => SupervisorState::OverloadDetected,
            SupervisorState::Sampling => SupervisorState::Sampling,
            // OverloadDetected transitions to Restarting immediately;
            // Restarting is absorbing until the process exits.
            SupervisorState::OverloadDetected | SupervisorState::Restarting => {
                SupervisorState::Restarting
            },
        }
    }
}

/// Source of load samples; the production probe reads the host, tests
/// inject scripted sequences.
pub trait LoadProbe: Send {
    fn sample(&mut self) -> f64;
}

/// One-minute load average via sysinfo.
pub struct LoadAverageProbe;

impl LoadProbe for LoadAverageProbe {
    fn sample(&mut self) -> f64 {
        System::load_average().one
    }
}

/// Watches host load and hands the process off to a fresh replacement on
/// sustained overload.
pub struct RestartSupervisor {
    config: SupervisorConfig,
    /// Invocation captured at construction, reused verbatim for the
    /// replacement process.
    program: PathBuf,
    args: Vec<String>,
}

impl RestartSupervisor {
    /// Capture the current invocation. Call early in `main`, before
    /// anything mutates the environment.
    pub fn from_current_invocation(config: SupervisorConfig) -> std::io::Result<Self> {
        Ok(Self {
            config,
            program: std::env::current_exe()?,
            args: std::env::args().skip(1).collect(),
        })
    }

    /// Spawn the sampling loop as a background task. The task only returns
    /// by exiting the whole process.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let program = self.program.clone();
            let args = self.args.clone();
            self.run(LoadAverageProbe, move || {
                match spawn_replacement(&program, &args) {
                    Ok(()) => {
                        // No flush of in-flight requests; the replacement
                        // takes over the terminal and streams.
                        std::process::exit(0);
                    },
                    Err(e) => {
                        error!(error = %e, "failed to spawn replacement process");
                        false
                    },
                }
            })
            .await;
        })
    }

    /// The sampling loop, with the restart action injected.
    ///
    /// `on_restart` runs after the grace delay; returning `false` (spawn
    /// failure) resumes sampling so the next overload retries the handoff.
    async fn run<P, F>(&self, mut probe: P, mut on_restart: F)
    where
        P: LoadProbe,
        F: FnMut() -> bool + Send,
    {
        let mut ticker = interval(self.config.sample_interval);
        let mut state = SupervisorState::Sampling;

        loop {
            ticker.tick().await;
            let load = probe.sample();
            debug!(load, threshold = self.config.load_threshold, "load sample");

            state = state.observe(load, self.config.load_threshold);
            if state != SupervisorState::Restarting && state != SupervisorState::OverloadDetected {
                continue;
            }
            state = SupervisorState::Restarting;

            warn!(
                load,
                threshold = self.config.load_threshold,
                grace_ms = self.config.grace_delay.as_millis() as u64,
                "load threshold exceeded, scheduling restart"
            );
            sleep(self.config.grace_delay).await;

            if on_restart() {
                return;
            }
            state = SupervisorState::Sampling;
        }
    }
}

/// Launch the replacement process: same executable and argument vector,
/// inherited standard streams, fully detached from this process's lifetime.
fn spawn_replacement(program: &PathBuf, args: &[String]) -> std::io::Result<()> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    // New process group so the replacement outlives us and ignores our
    // terminal signals.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    command.spawn()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct ScriptedProbe {
        samples: Vec<f64>,
        cursor: usize,
    }

    impl ScriptedProbe {
        fn new(samples: &[f64]) -> Self {
            Self {
                samples: samples.to_vec(),
                cursor: 0,
            }
        }
    }

    impl LoadProbe for ScriptedProbe {
        fn sample(&mut self) -> f64 {
            let sample = self.samples[self.cursor.min(self.samples.len() - 1)];
            self.cursor += 1;
            sample
        }
    }

    fn supervisor(config: SupervisorConfig) -> RestartSupervisor {
        RestartSupervisor {
            config,
            program: PathBuf::from("/usr/bin/true"),
            args: vec!["--flag".to_string()],
        }
    }

    fn test_config() -> SupervisorConfig {
        SupervisorConfig {
            load_threshold: 70.0,
            sample_interval: Duration::from_secs(1),
            grace_delay: Duration::from_millis(5000),
        }
    }

    #[test]
    fn test_state_machine_trips_on_third_sample() {
        let mut state = SupervisorState::Sampling;
        let mut trip_index = None;

        for (i, load) in [50.0, 60.0, 75.0, 80.0].into_iter().enumerate() {
            state = state.observe(load, 70.0);
            if trip_index.is_none() && state != SupervisorState::Sampling {
                trip_index = Some(i);
            }
        }

        // Stays in Sampling for the first two ticks, trips exactly on the
        // third, and stays tripped.
        assert_eq!(trip_index, Some(2));
        assert_eq!(state, SupervisorState::Restarting);
    }

    #[test]
    fn test_state_machine_stays_sampling_below_threshold() {
        let mut state = SupervisorState::Sampling;
        for load in [0.0, 69.9, 70.0] {
            state = state.observe(load, 70.0);
        }
        // Equal to the threshold does not trip.
        assert_eq!(state, SupervisorState::Sampling);
    }

    #[test]
    fn test_overload_detected_moves_to_restarting() {
        let state = SupervisorState::OverloadDetected.observe(10.0, 70.0);
        assert_eq!(state, SupervisorState::Restarting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_fires_once_after_grace_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();

        let sup = supervisor(test_config());
        let task = tokio::spawn(async move {
            sup.run(ScriptedProbe::new(&[50.0, 60.0, 75.0, 80.0]), move || {
                fired_clone.fetch_add(1, Ordering::SeqCst);
                true
            })
            .await;
        });

        // Samples at t=0s, 1s, 2s; the third (75.0) trips the threshold
        // and starts the grace delay. Nothing fires yet.
        tokio::time::advance(Duration::from_millis(2500)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        // Still inside the grace window.
        tokio::time::advance(Duration::from_millis(1000)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        // Grace delay elapses: exactly one handoff.
        tokio::time::advance(Duration::from_millis(5000)).await;
        task.await.unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_spawn_resumes_sampling() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();

        let sup = supervisor(SupervisorConfig {
            load_threshold: 70.0,
            sample_interval: Duration::from_secs(1),
            grace_delay: Duration::from_millis(100),
        });
        let task = tokio::spawn(async move {
            sup.run(ScriptedProbe::new(&[90.0]), move || {
                // First attempt reports spawn failure; second succeeds.
                fired_clone.fetch_add(1, Ordering::SeqCst) >= 1
            })
            .await;
        });

        tokio::time::advance(Duration::from_secs(5)).await;
        task.await.unwrap();
        assert!(fired.load(Ordering::SeqCst) >= 2);
    }
}
