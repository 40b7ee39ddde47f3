use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting logger for run orchestration events.
///
/// Decouples use cases from where their progress goes (console, log crate,
/// nowhere) so callers can observe remote-call behavior without changing
/// the orchestration code.
pub trait RunLogger: Send {
    /// Record how long one remote call of a named stage took.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events. Used by tests.
pub struct NullRunLogger;

impl RunLogger for NullRunLogger {
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Console logger that tracks per-stage call timings and reports a summary
/// when the run completes.
pub struct StdoutRunLogger {
    timings: HashMap<String, Vec<f64>>,
    start_time: Instant,
    messages: Vec<String>,
}

impl StdoutRunLogger {
    pub fn new() -> Self {
        Self {
            timings: HashMap::new(),
            start_time: Instant::now(),
            messages: Vec::new(),
        }
    }

    /// Returns the formatted summary string, or `None` if no call was timed.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let calls: usize = self.timings.values().map(Vec::len).sum();
        let mut lines = vec![format!(
            "Run summary ({calls} remote calls, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len() as f64;
            lines.push(format!(
                "  {stage:14}: {n:3} calls  avg {avg_ms:7.1}ms  total {total_ms:8.0}ms",
                n = durations.len()
            ));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl Default for StdoutRunLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl RunLogger for StdoutRunLogger {
    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        println!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

/// Runs `call`, recording its wall time under `stage`.
pub(crate) fn timed<T>(logger: &mut dyn RunLogger, stage: &str, call: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = call();
    logger.timing(stage, start.elapsed().as_secs_f64() * 1000.0);
    result
}
