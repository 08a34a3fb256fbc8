use shared::domain::{Scores, WINNING_SCORE};

/// Normalizes a raw converter sample against the calibration reading that
/// counts as a full press. Samples past `max_raw` saturate at the winning score.
pub fn score_for(raw: i16, max_raw: i16) -> u8 {
    let percent = (f32::from(raw) / f32::from(max_raw) * f32::from(WINNING_SCORE)).round();
    percent.clamp(0.0, f32::from(WINNING_SCORE)) as u8
}

#[derive(Debug, Clone)]
pub struct ScoreTracker {
    max_raw: i16,
    scores: Scores,
}

impl ScoreTracker {
    pub fn new(max_raw: i16) -> Self {
        debug_assert!(max_raw > 0, "max_raw must be validated as positive");
        Self {
            max_raw,
            scores: Scores::ZERO,
        }
    }

    pub fn update(&mut self, red_raw: i16, green_raw: i16) -> Scores {
        self.scores = Scores::new(
            score_for(red_raw, self.max_raw),
            score_for(green_raw, self.max_raw),
        );
        self.scores
    }

    pub fn reset(&mut self) {
        self.scores = Scores::ZERO;
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    pub fn has_winner(&self) -> bool {
        self.scores.has_winner()
    }
}
