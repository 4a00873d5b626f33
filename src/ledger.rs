//! The grade ledger: an owned, mutable aggregate of scores, grade bands,
//! and derived statistics.
//!
//! The ledger is built once per plotting action from parsed scores and a
//! maximum score, then mutated in place by cut-off edits. Every mutation
//! runs to completion synchronously; callers never observe a half-updated
//! ledger.

use serde::Serialize;

use crate::error::GradeError;
use crate::parser::parse_scores;
use crate::stats::{Histogram, ScoreStats};

/// Number of grade bands in a ledger. Fixed: one per letter tier.
pub const NUM_BANDS: usize = 8;

/// Band labels, highest tier first.
const BAND_LABELS: [&str; NUM_BANDS] = ["A", "A-", "B", "B-", "C", "C-", "D", "E"];

/// Default cut-off for the top band, as a fraction of the maximum score.
const HIGHEST_BAND_FRACTION: f64 = 0.8;

/// Minimum distance enforced between adjacent cut-offs when a conflicting
/// band is repaired.
const MIN_GAP: u32 = 2;

/// One grade tier: label, inclusive cut-off, enabled flag, grade-point
/// weight, and the derived student count.
#[derive(Debug, Clone, Serialize)]
pub struct GradeBand {
    pub label: &'static str,
    pub cut_off: u32,
    pub enabled: bool,
    pub weight: f64,
    pub count: u32,
}

/// The per-course grade-point winner: the course with the maximum weighted
/// average, reported alongside its value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCourse {
    pub course: String,
    pub grade_point: f64,
}

/// Immutable rendering snapshot handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerView {
    pub max_score: u32,
    pub stats: ScoreStats,
    pub histogram: Histogram,
    pub bands: Vec<GradeBand>,
    pub course_grade_points: Vec<(String, f64)>,
    pub mgpa: Option<TopCourse>,
}

/// Aggregate root owning the score population and the band sequence.
#[derive(Debug, Clone)]
pub struct Ledger {
    max_score: u32,
    scores: Vec<u32>,
    bands: [GradeBand; NUM_BANDS],
    histogram: Histogram,
    stats: ScoreStats,
    courses: Vec<(String, f64)>,
    course_grade_points: Vec<(String, f64)>,
    top_course: Option<TopCourse>,
}

impl Ledger {
    /// Builds a ledger from already-parsed scores.
    ///
    /// Band defaults, highest tier first: cut-off at
    /// `round((0.8 - 0.1*i) * max_score)`, enabled on even indices (full
    /// letter grades on, minus grades and E off), weight `10 - i` except the
    /// lowest tier which is deliberately down-weighted to 2.
    ///
    /// # Errors
    ///
    /// [`GradeError::NoScores`] for an empty score slice and
    /// [`GradeError::MaxScore`] when `max_score` is below the highest
    /// observed score. A failed construction leaves nothing behind; callers
    /// keep their previous ledger.
    pub fn new(scores: Vec<u32>, max_score: u32) -> Result<Self, GradeError> {
        if scores.is_empty() {
            return Err(GradeError::NoScores);
        }
        let stats = ScoreStats::from_scores(&scores);
        if max_score < stats.highest {
            return Err(GradeError::MaxScore {
                requested: max_score,
                highest: stats.highest,
            });
        }

        let bands = std::array::from_fn(|i| GradeBand {
            label: BAND_LABELS[i],
            cut_off: ((HIGHEST_BAND_FRACTION - i as f64 * 0.1) * f64::from(max_score)).round()
                as u32,
            enabled: i % 2 == 0,
            weight: if i == NUM_BANDS - 1 {
                2.0
            } else {
                (10 - i) as f64
            },
            count: 0,
        });

        let histogram = Histogram::from_scores(&scores, max_score);
        let mut ledger = Ledger {
            max_score,
            scores,
            bands,
            histogram,
            stats,
            courses: Vec::new(),
            course_grade_points: Vec::new(),
            top_course: None,
        };
        ledger.recompute();
        Ok(ledger)
    }

    /// Parses raw score text and builds a ledger in one step.
    pub fn from_text(raw: &str, max_score: u32) -> Result<Self, GradeError> {
        Self::new(parse_scores(raw)?, max_score)
    }

    /// Replaces the externally supplied `(course, total marks)` list used
    /// for the cross-course grade-point comparison and recomputes.
    pub fn set_courses(&mut self, courses: Vec<(String, f64)>) {
        self.courses = courses;
        self.recompute();
    }

    /// Applies one cut-off edit and repairs the rest of the sequence so
    /// cut-offs stay strictly descending.
    ///
    /// The edited band stores `cut_off` exactly as requested. The forward
    /// sweep pushes every conflicting lower band down to two below its
    /// neighbour (floored at 0); the backward sweep pushes conflicting
    /// higher bands up symmetrically (capped at `max_score`). Disabled
    /// bands are repaired like enabled ones, so re-enabling one later
    /// yields a consistent value. Bands already out of conflict are left
    /// untouched.
    ///
    /// # Panics
    ///
    /// Panics if `index >= NUM_BANDS`; each band has exactly one bounded
    /// control in the calling layer.
    pub fn set_cut_off(&mut self, index: usize, enabled: bool, cut_off: u32) {
        let max_score = self.max_score;
        self.bands[index].enabled = enabled;
        self.bands[index].cut_off = cut_off;

        let mut higher = cut_off;
        for i in index + 1..NUM_BANDS {
            if self.bands[i].cut_off >= higher {
                self.bands[i].cut_off = higher.saturating_sub(MIN_GAP);
            }
            higher = self.bands[i].cut_off;
        }

        let mut lower = cut_off;
        for i in (0..index).rev() {
            if self.bands[i].cut_off <= lower {
                self.bands[i].cut_off = (lower + MIN_GAP).min(max_score);
            }
            lower = self.bands[i].cut_off;
        }

        self.recompute();
    }

    /// Recomputes every derived value: per-band student counts and the
    /// per-course grade points feeding the MGPA.
    fn recompute(&mut self) {
        // Each enabled band claims the half-open interval from its cut-off
        // up to the previous enabled band's cut-off. Disabled bands do not
        // consume their gap; the next enabled band below absorbs it.
        let mut upper = self.max_score + 1;
        for band in &mut self.bands {
            if !band.enabled {
                band.count = 0;
                continue;
            }
            band.count = self.histogram.count_between(band.cut_off, upper);
            upper = band.cut_off;
        }

        self.recompute_grade_points();
    }

    /// Maps every course total onto the first enabled band it meets and
    /// averages the tallied weights per course. Courses whose totals meet
    /// no enabled band are undefined and excluded from the map (and thus
    /// from the maximum).
    fn recompute_grade_points(&mut self) {
        let mut tallies: Vec<(String, f64, u32)> = Vec::new();
        for (name, total) in &self.courses {
            let weight = self
                .bands
                .iter()
                .filter(|b| b.enabled)
                .find(|b| *total >= f64::from(b.cut_off))
                .map(|b| b.weight);
            let Some(weight) = weight else {
                continue;
            };
            match tallies.iter_mut().find(|(n, _, _)| n == name) {
                Some((_, sum, count)) => {
                    *sum += weight;
                    *count += 1;
                }
                None => tallies.push((name.clone(), weight, 1)),
            }
        }

        self.course_grade_points = tallies
            .into_iter()
            .map(|(name, sum, count)| (name, round2(sum / f64::from(count))))
            .collect();

        // Maximum per-course value wins; strict comparison keeps the first
        // course in input order on ties.
        self.top_course = None;
        let mut best = f64::NEG_INFINITY;
        for (course, grade_point) in &self.course_grade_points {
            if *grade_point > best {
                best = *grade_point;
                self.top_course = Some(TopCourse {
                    course: course.clone(),
                    grade_point: *grade_point,
                });
            }
        }
    }

    /// Snapshot for the presentation layer.
    pub fn view(&self) -> LedgerView {
        LedgerView {
            max_score: self.max_score,
            stats: self.stats.clone(),
            histogram: self.histogram.clone(),
            bands: self.bands.to_vec(),
            course_grade_points: self.course_grade_points.clone(),
            mgpa: self.top_course.clone(),
        }
    }

    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    pub fn bands(&self) -> &[GradeBand] {
        &self.bands
    }

    pub fn stats(&self) -> &ScoreStats {
        &self.stats
    }

    pub fn course_grade_points(&self) -> &[(String, f64)] {
        &self.course_grade_points
    }

    /// The reported MGPA: maximum per-course grade point and the course
    /// that achieved it. `None` when no course data is available.
    pub fn mgpa(&self) -> Option<&TopCourse> {
        self.top_course.as_ref()
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
