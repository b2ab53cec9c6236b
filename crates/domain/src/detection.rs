use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

pub const RECENT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Good,
    Bad,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Bad => "bad",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    pub id: u32,
    #[serde(flatten)]
    pub region: Region,
    #[serde(rename = "class")]
    pub classification: Classification,
    pub confidence: f32,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionBatch {
    pub detections: Vec<Detection>,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Counters {
    pub total: u64,
    pub good: u64,
    pub bad: u64,
    pub speed: u64,
}

impl Counters {
    pub fn record(&mut self, classification: Classification, speed_ms: u64) {
        self.total += 1;
        match classification {
            Classification::Good => self.good += 1,
            Classification::Bad => self.bad += 1,
        }
        self.speed = speed_ms;
    }

    pub fn pass_rate_percent(&self) -> u64 {
        rounded_percent(self.good, self.total)
    }

    pub fn defect_rate_percent(&self) -> u64 {
        rounded_percent(self.bad, self.total)
    }
}

fn rounded_percent(part: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u64
}

/// Newest-first list of recent detections, bounded to [`RECENT_HISTORY_LIMIT`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "Vec<Detection>", into = "Vec<Detection>")]
pub struct DetectionHistory {
    entries: VecDeque<Detection>,
}

impl DetectionHistory {
    pub fn push(&mut self, detection: Detection) {
        self.entries.push_front(detection);
        self.entries.truncate(RECENT_HISTORY_LIMIT);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.entries.iter()
    }

    pub fn newest(&self, limit: usize) -> Vec<Detection> {
        self.entries.iter().take(limit).cloned().collect()
    }

    pub fn count_of(&self, classification: Classification) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.classification == classification)
            .count()
    }
}

impl From<Vec<Detection>> for DetectionHistory {
    fn from(value: Vec<Detection>) -> Self {
        let mut entries = VecDeque::from(value);
        entries.truncate(RECENT_HISTORY_LIMIT);
        Self { entries }
    }
}

impl From<DetectionHistory> for Vec<Detection> {
    fn from(value: DetectionHistory) -> Self {
        value.entries.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(id: u32, classification: Classification) -> Detection {
        Detection {
            id,
            region: Region {
                x: 20,
                y: 40,
                width: 100,
                height: 250,
            },
            classification,
            confidence: 0.9,
            timestamp: "2026-03-16T09:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn counters_stay_consistent_with_recorded_detections() {
        let mut counters = Counters::default();
        let classes = [
            Classification::Good,
            Classification::Bad,
            Classification::Good,
            Classification::Good,
            Classification::Bad,
        ];
        for (index, class) in classes.iter().enumerate() {
            counters.record(*class, index as u64);
        }

        assert_eq!(counters.total, 5);
        assert_eq!(counters.good, 3);
        assert_eq!(counters.bad, 2);
        assert_eq!(counters.good + counters.bad, counters.total);
        assert_eq!(counters.speed, 4);
    }

    #[test]
    fn rates_are_zero_without_inspections() {
        let counters = Counters::default();
        assert_eq!(counters.pass_rate_percent(), 0);
        assert_eq!(counters.defect_rate_percent(), 0);
    }

    #[test]
    fn rates_are_rounded_percentages() {
        let counters = Counters {
            total: 3,
            good: 2,
            bad: 1,
            speed: 0,
        };
        assert_eq!(counters.pass_rate_percent(), 67);
        assert_eq!(counters.defect_rate_percent(), 33);
    }

    #[test]
    fn history_evicts_oldest_past_limit() {
        let mut history = DetectionHistory::default();
        for id in 0..(RECENT_HISTORY_LIMIT as u32 + 7) {
            history.push(detection(id, Classification::Good));
        }

        assert_eq!(history.len(), RECENT_HISTORY_LIMIT);
        let ids: Vec<u32> = history.iter().map(|entry| entry.id).collect();
        assert_eq!(ids.first(), Some(&56));
        assert_eq!(ids.last(), Some(&7));
    }

    #[test]
    fn history_deserialization_applies_limit() {
        let entries: Vec<Detection> = (0..60)
            .map(|id| detection(id, Classification::Bad))
            .collect();
        let json = serde_json::to_string(&entries).expect("json");
        let history: DetectionHistory = serde_json::from_str(&json).expect("parse");
        assert_eq!(history.len(), RECENT_HISTORY_LIMIT);
        assert_eq!(history.count_of(Classification::Bad), RECENT_HISTORY_LIMIT);
    }

    #[test]
    fn detection_serializes_with_flat_region_and_class_key() {
        let json = serde_json::to_value(detection(7, Classification::Good)).expect("json");
        assert_eq!(json["id"], 7);
        assert_eq!(json["x"], 20);
        assert_eq!(json["height"], 250);
        assert_eq!(json["class"], "good");
    }
}
