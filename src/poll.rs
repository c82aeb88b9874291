// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Bounded polling with a pluggable clock.

use async_trait::async_trait;
use rand::Rng;
use std::future::Future;
use std::time::{Duration, Instant};

/// Source of time for polling loops.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Fixed-interval retry policy bounded by a total duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_duration: Duration,
    /// Upper bound of a random delay added to each interval
    pub jitter: Option<Duration>,
}

impl RetryPolicy {
    pub fn new(interval: Duration, max_duration: Duration) -> Self {
        Self {
            interval,
            max_duration,
            jitter: None,
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = Some(jitter);
        self
    }

    /// Delay before the next attempt, never longer than `remaining`.
    pub fn next_delay(&self, remaining: Duration) -> Duration {
        let jitter = match self.jitter {
            Some(max) if !max.is_zero() => {
                let millis = rand::rng().random_range(0..=max.as_millis() as u64);
                Duration::from_millis(millis)
            }
            _ => Duration::ZERO,
        };
        (self.interval + jitter).min(remaining)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The probe returned true on the given attempt
    Satisfied { attempts: u32 },
    /// The deadline passed without the probe returning true
    TimedOut { attempts: u32 },
}

impl PollOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Satisfied { attempts } | PollOutcome::TimedOut { attempts } => *attempts,
        }
    }
}

/// Run `probe` until it returns true or `policy.max_duration` has elapsed since `started_at`.
///
/// The first attempt happens immediately. A probe error ends polling at once and is
/// returned unchanged.
pub async fn poll_until<F, Fut, E>(
    clock: &dyn Clock,
    policy: &RetryPolicy,
    started_at: Instant,
    mut probe: F,
) -> Result<PollOutcome, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let mut attempts = 0;

    loop {
        attempts += 1;
        if probe().await? {
            return Ok(PollOutcome::Satisfied { attempts });
        }

        let elapsed = clock.now().saturating_duration_since(started_at);
        if elapsed >= policy.max_duration {
            return Ok(PollOutcome::TimedOut { attempts });
        }

        clock.sleep(policy.next_delay(policy.max_duration - elapsed)).await;
    }
}
