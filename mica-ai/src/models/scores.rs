//! Score vector and rounding rules
//!
//! Every score axis is in [1.0, 5.0] with exactly one decimal digit,
//! regardless of analyzer failure. Rounding is half-to-even.

use serde::{Deserialize, Serialize};

/// Clamp into [1.0, 5.0] and round half-to-even to one decimal.
///
/// NaN and negative inputs collapse to the lower bound so a broken analyzer
/// value can never violate the score contract.
pub fn round_score(value: f64) -> f64 {
    let v = if value.is_nan() { 1.0 } else { value };
    let clamped = v.clamp(1.0, 5.0);
    (clamped * 10.0).round_ties_even() / 10.0
}

/// The seven evaluation axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreVector {
    pub initiative: f64,
    pub collaborative: f64,
    pub communication: f64,
    pub logic: f64,
    pub problem_solving: f64,
    pub voice: f64,
    pub action: f64,
}

impl ScoreVector {
    /// Build a vector with every axis clamped and rounded
    pub fn rounded(
        initiative: f64,
        collaborative: f64,
        communication: f64,
        logic: f64,
        problem_solving: f64,
        voice: f64,
        action: f64,
    ) -> Self {
        Self {
            initiative: round_score(initiative),
            collaborative: round_score(collaborative),
            communication: round_score(communication),
            logic: round_score(logic),
            problem_solving: round_score(problem_solving),
            voice: round_score(voice),
            action: round_score(action),
        }
    }

    /// Uniform vector (used by the centralized defaults)
    pub fn uniform(value: f64) -> Self {
        let v = round_score(value);
        Self {
            initiative: v,
            collaborative: v,
            communication: v,
            logic: v,
            problem_solving: v,
            voice: v,
            action: v,
        }
    }

    pub fn mean(&self) -> f64 {
        (self.initiative
            + self.collaborative
            + self.communication
            + self.logic
            + self.problem_solving
            + self.voice
            + self.action)
            / 7.0
    }

    /// Unrounded mean over a subset of axes
    pub fn mean_of(&self, axes: &[Axis]) -> f64 {
        axes.iter().map(|a| self.axis(*a)).sum::<f64>() / axes.len() as f64
    }

    pub fn as_array(&self) -> [f64; 7] {
        [
            self.initiative,
            self.collaborative,
            self.communication,
            self.logic,
            self.problem_solving,
            self.voice,
            self.action,
        ]
    }

    /// Apply a per-axis lower bound in place, re-rounding
    pub fn floor_at(&mut self, floor: f64, axes: &[Axis]) {
        for axis in axes {
            let slot = self.axis_mut(*axis);
            if *slot < floor {
                *slot = round_score(floor);
            }
        }
    }

    /// Apply a per-axis upper bound in place, re-rounding
    pub fn ceil_at(&mut self, ceiling: f64, axes: &[Axis]) {
        for axis in axes {
            let slot = self.axis_mut(*axis);
            if *slot > ceiling {
                *slot = round_score(ceiling);
            }
        }
    }

    fn axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Initiative => self.initiative,
            Axis::Collaborative => self.collaborative,
            Axis::Communication => self.communication,
            Axis::Logic => self.logic,
            Axis::ProblemSolving => self.problem_solving,
            Axis::Voice => self.voice,
            Axis::Action => self.action,
        }
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut f64 {
        match axis {
            Axis::Initiative => &mut self.initiative,
            Axis::Collaborative => &mut self.collaborative,
            Axis::Communication => &mut self.communication,
            Axis::Logic => &mut self.logic,
            Axis::ProblemSolving => &mut self.problem_solving,
            Axis::Voice => &mut self.voice,
            Axis::Action => &mut self.action,
        }
    }
}

/// Axis identifiers (ASCII; used for feedback table lookup and floor rules)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Initiative,
    Collaborative,
    Communication,
    Logic,
    ProblemSolving,
    Voice,
    Action,
}

impl Axis {
    pub const ALL: [Axis; 7] = [
        Axis::Initiative,
        Axis::Collaborative,
        Axis::Communication,
        Axis::Logic,
        Axis::ProblemSolving,
        Axis::Voice,
        Axis::Action,
    ];

    /// Axes derived from transcript content
    pub const CONTENT: [Axis; 4] = [
        Axis::Communication,
        Axis::Logic,
        Axis::Collaborative,
        Axis::ProblemSolving,
    ];

    /// Axes derived from facial analysis
    pub const FACIAL: [Axis; 2] = [Axis::Initiative, Axis::Action];

    /// Axes derived from acoustic analysis
    pub const ACOUSTIC: [Axis; 1] = [Axis::Voice];
}

/// One-sentence feedback per axis plus the overall sentence and sample answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreFeedback {
    pub initiative: String,
    pub collaborative: String,
    pub communication: String,
    pub logic: String,
    pub problem_solving: String,
    pub voice: String,
    pub action: String,
    pub overall: String,
    pub sample_answer: String,
}
