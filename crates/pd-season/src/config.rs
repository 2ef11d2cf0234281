//! Configuration for a season.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Screen position the room automation clicks before typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenPoint {
    /// Horizontal pixel.
    pub x: i32,
    /// Vertical pixel.
    pub y: i32,
}

impl Default for ScreenPoint {
    fn default() -> Self {
        Self { x: 500, y: 500 }
    }
}

/// Configuration for a season.
#[derive(Debug, Clone)]
pub struct SeasonConfig {
    /// RNG seed for suggestion jitter.
    pub seed: u64,
    /// Planned length of the season in minutes.
    pub target_duration_minutes: u32,
    /// Active-participant count at or below which the host should go to the final.
    pub final_threshold: usize,
    /// Remaining minutes under which short challenges are preferred.
    pub time_pressure_minutes: f64,
    /// How long to wait for an external collaborator.
    pub collaborator_timeout: Duration,
    /// Where the room automation clicks.
    pub click_point: ScreenPoint,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            target_duration_minutes: 60,
            final_threshold: 3,
            time_pressure_minutes: 15.0,
            collaborator_timeout: Duration::from_secs(30),
            click_point: ScreenPoint::default(),
        }
    }
}

impl SeasonConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the target duration (at least one minute).
    pub fn with_target_minutes(mut self, minutes: u32) -> Self {
        self.target_duration_minutes = minutes.max(1);
        self
    }

    /// Set the final-stretch threshold.
    pub fn with_final_threshold(mut self, active: usize) -> Self {
        self.final_threshold = active;
        self
    }

    /// Set the collaborator timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.collaborator_timeout = timeout;
        self
    }

    /// Set the automation click point.
    pub fn with_click_point(mut self, point: ScreenPoint) -> Self {
        self.click_point = point;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = SeasonConfig::default();
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.target_duration_minutes, 60);
        assert_eq!(cfg.final_threshold, 3);
        assert_eq!(cfg.click_point, ScreenPoint { x: 500, y: 500 });
    }

    #[test]
    fn builder_methods() {
        let cfg = SeasonConfig::default()
            .with_seed(7)
            .with_target_minutes(90)
            .with_final_threshold(2)
            .with_timeout(Duration::from_millis(10))
            .with_click_point(ScreenPoint { x: 1, y: 2 });
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.target_duration_minutes, 90);
        assert_eq!(cfg.final_threshold, 2);
        assert_eq!(cfg.collaborator_timeout, Duration::from_millis(10));
        assert_eq!(cfg.click_point.y, 2);
    }

    #[test]
    fn target_minutes_floor() {
        let cfg = SeasonConfig::default().with_target_minutes(0);
        assert_eq!(cfg.target_duration_minutes, 1);
    }
}
