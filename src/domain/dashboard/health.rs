use serde::Serialize;

pub const HEALTHY_MIN_RATE: f64 = 90.0;
pub const HEALTHY_MAX_BACKLOG: u64 = 2000;
pub const ATTENTION_MIN_RATE: f64 = 75.0;
pub const ATTENTION_MAX_BACKLOG: u64 = 5000;

/// Overall operational health derived from realization rate and backlog size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    Healthy,
    Attention,
    #[serde(rename = "At Risk")]
    AtRisk,
}

impl HealthStatus {
    /// `rate` is the realization rate by volume, in percent.
    pub fn classify(rate: f64, backlog_count: u64) -> Self {
        if rate >= HEALTHY_MIN_RATE && backlog_count < HEALTHY_MAX_BACKLOG {
            HealthStatus::Healthy
        } else if rate >= ATTENTION_MIN_RATE && backlog_count < ATTENTION_MAX_BACKLOG {
            HealthStatus::Attention
        } else {
            HealthStatus::AtRisk
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Attention => "Attention",
            HealthStatus::AtRisk => "At Risk",
        }
    }
}
