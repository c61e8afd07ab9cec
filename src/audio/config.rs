use std::time::Duration;

/// Playback speeds offered by the rate selector.
pub const ALLOWED_RATES: [f32; 8] = [0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0];

#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub seek_step_secs: f64,
    pub initial_rate: f32,
    pub metadata_poll_interval: Duration,
    /// `None` waits forever for a stream to report its duration.
    pub metadata_max_attempts: Option<u32>,
    pub frame_interval: Duration,
    pub fallback_interval: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            seek_step_secs: 15.0,
            initial_rate: 1.0,
            metadata_poll_interval: Duration::from_millis(100),
            metadata_max_attempts: Some(600),
            frame_interval: Duration::from_millis(16),
            fallback_interval: Duration::from_millis(250),
        }
    }
}

pub fn is_allowed_rate(rate: f32) -> bool {
    ALLOWED_RATES.iter().any(|allowed| (allowed - rate).abs() < f32::EPSILON)
}

/// Next allowed speed above (`step > 0`) or below the current one, saturating
/// at the ends of the table.
pub fn step_rate(current: f32, step: i32) -> f32 {
    let index = ALLOWED_RATES
        .iter()
        .position(|rate| (rate - current).abs() < f32::EPSILON)
        .unwrap_or(3) as i32;
    let next = (index + step).clamp(0, ALLOWED_RATES.len() as i32 - 1);
    ALLOWED_RATES[next as usize]
}
