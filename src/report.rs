//! Reply-latency summaries and plain-text rendering

use crate::reply::ReplyRecord;
use chrono::TimeDelta;

/// Aggregate figures over a set of reply records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplySummary {
    pub incoming: usize,
    pub answered: usize,
    pub unanswered: usize,
    /// Records carrying a warning
    pub flagged: usize,
    pub mean_latency: Option<TimeDelta>,
    pub median_latency: Option<TimeDelta>,
    pub longest_latency: Option<TimeDelta>,
}

impl ReplySummary {
    #[must_use]
    pub fn from_records(records: &[ReplyRecord<'_>]) -> Self {
        let mut latencies: Vec<TimeDelta> = records.iter().filter_map(|r| r.latency).collect();
        latencies.sort();

        let answered = latencies.len();
        let total = latencies
            .iter()
            .fold(TimeDelta::zero(), |acc, latency| acc + *latency);

        let mean_latency = i32::try_from(answered)
            .ok()
            .filter(|&n| n > 0)
            .map(|n| total / n);

        let median_latency = match answered {
            0 => None,
            n if n % 2 == 1 => Some(latencies[n / 2]),
            n => Some((latencies[n / 2 - 1] + latencies[n / 2]) / 2),
        };

        Self {
            incoming: records.len(),
            answered,
            unanswered: records.len() - answered,
            flagged: records.iter().filter(|r| r.is_flagged()).count(),
            mean_latency,
            median_latency,
            longest_latency: latencies.last().copied(),
        }
    }
}

/// Latency in hours, as shown in reports
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn latency_hours(latency: TimeDelta) -> f64 {
    latency.num_seconds() as f64 / 3600.0
}

/// Render one line per record, numbered from 1.
///
/// `self_address` only appears in the message for threads without replies.
#[must_use]
pub fn render_report(records: &[ReplyRecord<'_>], self_address: &str) -> String {
    let mut out = String::new();

    if records.is_empty() {
        out.push_str("No incoming messages in this thread.\n");
        return out;
    }

    for (i, record) in records.iter().enumerate() {
        let number = i + 1;
        let from = &record.counterpart().address;

        let line = match (record.latency, record.replied_at) {
            (Some(latency), Some(at)) => format!(
                "{number}. reply to {from} - {:.2} h (at {})",
                latency_hours(latency),
                at.format("%Y-%m-%d %H:%M")
            ),
            _ => format!("{number}. {from} - no reply"),
        };
        out.push_str(&line);

        if let Some(warning) = record.warning {
            out.push_str(&format!(" [{warning}]"));
        }
        out.push('\n');
    }

    if records.iter().all(|r| !r.is_answered()) {
        out.push_str(&format!("No replies by {self_address} found in this thread.\n"));
    }

    out
}
