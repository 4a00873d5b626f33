use serde::Serialize;

/// Summary statistics over a (ceiling-rounded) score population.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ScoreStats {
    pub num_students: usize,
    /// Mean of the rounded scores, itself rounded to the nearest integer.
    pub average: u32,
    pub highest: u32,
    pub lowest: u32,
}

impl ScoreStats {
    /// Walks the scores once, tracking the running sum and extremes.
    ///
    /// An empty slice yields the all-zero default; callers that parse input
    /// through [`crate::parser::parse_scores`] never see one.
    pub fn from_scores(scores: &[u32]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }

        let mut s = ScoreStats {
            num_students: scores.len(),
            average: 0,
            highest: 0,
            lowest: u32::MAX,
        };
        let mut sum: u64 = 0;
        for &score in scores {
            if score > s.highest {
                s.highest = score;
            }
            if score < s.lowest {
                s.lowest = score;
            }
            sum += u64::from(score);
        }
        s.average = (sum as f64 / scores.len() as f64).round() as u32;
        s
    }
}

/// Integer-binned frequency table over `[0, max_score]`, with the bin edges
/// the rendering layer expects (each score gets a bar from `i - 0.4` to
/// `i + 0.4`).
#[derive(Debug, Clone, Serialize)]
pub struct Histogram {
    pub top: Vec<u32>,
    pub left: Vec<f64>,
    pub right: Vec<f64>,
    pub bin_value: Vec<u32>,
}

impl Histogram {
    /// Counts each score into its bin. Callers guarantee every score is
    /// at most `max_score`.
    pub fn from_scores(scores: &[u32], max_score: u32) -> Self {
        let bins = max_score as usize + 1;
        let mut top = vec![0u32; bins];
        for &score in scores {
            top[score as usize] += 1;
        }
        let left = (0..bins).map(|i| i as f64 - 0.4).collect();
        let right = (0..bins).map(|i| i as f64 + 0.4).collect();
        let bin_value = (0..bins as u32).collect();
        Histogram {
            top,
            left,
            right,
            bin_value,
        }
    }

    /// Sums frequencies over the half-open score range `[lower, upper)`.
    pub fn count_between(&self, lower: u32, upper: u32) -> u32 {
        let hi = (upper as usize).min(self.top.len());
        self.top[(lower as usize).min(hi)..hi].iter().sum()
    }
}
