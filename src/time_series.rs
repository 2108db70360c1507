use serde::{Deserialize, Serialize};

/// Running score at `t` seconds into the session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScorePoint {
    pub t: f64,
    pub score: u32,
}

impl ScorePoint {
    pub fn new(t: f64, score: u32) -> Self {
        Self { t, score }
    }
}

impl From<ScorePoint> for (f64, f64) {
    fn from(p: ScorePoint) -> Self {
        (p.t, p.score as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_chart_tuple() {
        let tuple: (f64, f64) = ScorePoint::new(2.5, 180).into();
        assert_eq!(tuple, (2.5, 180.0));
    }
}
