#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InspectionStatus {
    pub active: bool,
    pub camera_ready: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickMetrics {
    pub ticks_run: u64,
    pub ticks_idle: u64,
    pub ticks_skipped: u64,
    pub batches_emitted: u64,
    pub detections_emitted: u64,
    pub last_tick_ms: Option<u64>,
    pub p95_tick_ms: Option<u64>,
}

/// Figures shown on the dashboard and the live view summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total: u64,
    pub good: u64,
    pub bad: u64,
    pub speed_ms: u64,
    pub pass_rate_percent: u64,
    pub defect_rate_percent: u64,
    pub recent_detections: usize,
    pub recent_good: usize,
    pub recent_bad: usize,
}
