//! Prometheus counters exposed on `/metrics`.

use domains::{DomainError, Result, VoteChange, VoteOutcome};
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum VoteResult {
    Recorded,
    Revised,
    Rejected,
    Conflict,
    Failed,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct VoteLabels {
    pub result: VoteResult,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    pub method: String,
    pub status: String,
}

pub struct Metrics {
    registry: Registry,
    votes: Family<VoteLabels, Counter>,
    requests: Family<RequestLabels, Counter>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("rusty_blog");
        let votes = Family::<VoteLabels, Counter>::default();
        let requests = Family::<RequestLabels, Counter>::default();
        registry.register("comment_votes", "Comment votes by result", votes.clone());
        registry.register("http_requests", "HTTP requests by method and status", requests.clone());
        Self { registry, votes, requests }
    }

    pub fn record_vote(&self, outcome: &Result<VoteOutcome>) {
        let result = match outcome {
            Ok(VoteOutcome { change: VoteChange::Recorded, .. }) => VoteResult::Recorded,
            Ok(VoteOutcome { change: VoteChange::Revised, .. }) => VoteResult::Revised,
            Err(DomainError::DuplicateVote) => VoteResult::Conflict,
            Err(DomainError::Internal(_)) => VoteResult::Failed,
            Err(_) => VoteResult::Rejected,
        };
        self.votes.get_or_create(&VoteLabels { result }).inc();
    }

    pub fn record_request(&self, method: &str, status: u16) {
        self.requests
            .get_or_create(&RequestLabels { method: method.to_string(), status: status.to_string() })
            .inc();
    }

    /// OpenMetrics text exposition of every registered metric.
    pub fn render(&self) -> String {
        let mut buffer = String::new();
        if encode(&mut buffer, &self.registry).is_err() {
            buffer.clear();
        }
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_results_are_counted_by_label() {
        let metrics = Metrics::new();
        metrics.record_vote(&Err(DomainError::AlreadyVoted));
        metrics.record_vote(&Err(DomainError::AlreadyVoted));
        metrics.record_vote(&Err(DomainError::DuplicateVote));

        let text = metrics.render();
        assert!(text.contains("rusty_blog_comment_votes_total{result=\"Rejected\"} 2"));
        assert!(text.contains("rusty_blog_comment_votes_total{result=\"Conflict\"} 1"));
    }

    #[test]
    fn requests_are_counted_by_method_and_status() {
        let metrics = Metrics::new();
        metrics.record_request("POST", 200);
        let text = metrics.render();
        assert!(text.contains("rusty_blog_http_requests_total{method=\"POST\",status=\"200\"} 1"));
    }
}
