//! Coordination layer for the FitFusion client: the single-flight
//! [`RequestCoordinator`] and the [`Coach`] facade that routes the expensive
//! AI calls through it.

pub mod coordinator;

pub use coordinator::{Flight, Operation, RequestCoordinator};

use std::sync::Mutex;
use std::time::{Duration, Instant};

use fitfusion_api::{ApiClient, ApiError, RecommendationSet};
use fitfusion_config::Config;
use tracing::debug;

/// Timing captured for one completed chat turn.
#[derive(Debug, Clone)]
pub struct TurnTiming {
    /// Elapsed time until the first snapshot arrived, if any text arrived.
    pub time_to_first_snapshot: Option<Duration>,
    pub total: Duration,
    /// Length of the final answer in characters.
    pub answer_chars: usize,
}

/// The coaching facade: owns the API client and the request coordinator,
/// and records per-turn timing for the chat calls.
///
/// All methods take `&self`; a shared `Coach` can serve concurrent callers,
/// with duplicate chat or recommendation calls suppressed by the
/// coordinator.
pub struct Coach {
    client: ApiClient,
    coordinator: RequestCoordinator,
    turn_timings: Mutex<Vec<TurnTiming>>,
}

impl Coach {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            coordinator: RequestCoordinator::new(),
            turn_timings: Mutex::new(Vec::new()),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Ok(Self::new(ApiClient::from_config(config)?))
    }

    /// Direct access to the underlying client for the unguarded operations
    /// (auth, profiles, content, search).
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Ask the AI coach a question, streaming cumulative snapshots to
    /// `on_update`. Returns `Flight::Skipped` if a chat call is already in
    /// flight; otherwise the final complete answer.
    pub async fn ask(
        &self,
        query: &str,
        mut on_update: impl FnMut(&str),
    ) -> Result<Flight<String>, ApiError> {
        let started = Instant::now();
        let mut first_snapshot: Option<Duration> = None;

        let outcome = self
            .coordinator
            .run(Operation::Chat, async {
                self.client
                    .chat_with_updates(query, |snapshot| {
                        if first_snapshot.is_none() {
                            first_snapshot = Some(started.elapsed());
                        }
                        on_update(snapshot);
                    })
                    .await
            })
            .await?;

        if let Flight::Completed(answer) = &outcome {
            let timing = TurnTiming {
                time_to_first_snapshot: first_snapshot,
                total: started.elapsed(),
                answer_chars: answer.chars().count(),
            };
            debug!(
                first_snapshot_ms = timing.time_to_first_snapshot.map(|d| d.as_millis() as u64),
                total_ms = timing.total.as_millis() as u64,
                chars = timing.answer_chars,
                "chat turn completed"
            );
            if let Ok(mut timings) = self.turn_timings.lock() {
                timings.push(timing);
            }
        }
        Ok(outcome)
    }

    /// Fetch a fresh recommendation set, suppressing duplicates while one
    /// request is outstanding.
    pub async fn recommendations(&self) -> Result<Flight<RecommendationSet>, ApiError> {
        self.coordinator
            .run(Operation::Recommendations, self.client.recommendations())
            .await
    }

    /// Timings for the chat turns completed so far, in order.
    pub fn turn_timings(&self) -> Vec<TurnTiming> {
        self.turn_timings
            .lock()
            .map(|timings| timings.clone())
            .unwrap_or_default()
    }
}
