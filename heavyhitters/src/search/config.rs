// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::common::NumStdDev;
use crate::domain::Domain;
use crate::estimator::Estimate;
use crate::mechanism::PrivacyMechanism;

/// Decides whether a child candidate survives a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PruningRule {
    /// Keep while the confidence interval still reaches the threshold (`upper_bound >= τ`).
    ///
    /// Keeps borderline candidates until more evidence accumulates.
    #[default]
    ConfidenceOverlap,
    /// Keep only when the whole interval clears the threshold (`lower_bound >= τ`).
    LowerBound,
    /// Keep when the point estimate clears the threshold.
    PointEstimate,
}

impl PruningRule {
    /// Returns true if `estimate` survives the threshold `tau`.
    pub fn keeps(&self, estimate: &Estimate, tau: f64) -> bool {
        match self {
            PruningRule::ConfidenceOverlap => estimate.upper_bound() >= tau,
            PruningRule::LowerBound => estimate.lower_bound() >= tau,
            PruningRule::PointEstimate => estimate.frequency() >= tau,
        }
    }
}

/// Per-level pruning thresholds `τ(ℓ) = min(1, θ · decay^(m - ℓ))`.
///
/// With `decay = 1` every level uses θ. Larger decays demand more of short prefixes, which
/// trims the frontier harder near the root; the last level always uses θ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSchedule {
    threshold: f64,
    decay: f64,
    bit_length: u8,
}

impl ThresholdSchedule {
    pub(crate) fn new(threshold: f64, decay: f64, bit_length: u8) -> Self {
        Self {
            threshold,
            decay,
            bit_length,
        }
    }

    /// Returns the reporting threshold θ.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the threshold for prefixes of length `level`.
    pub fn at(&self, level: u8) -> f64 {
        let steps = self.bit_length.saturating_sub(level) as i32;
        (self.threshold * self.decay.powi(steps)).min(1.0)
    }
}

/// Validated parameters of one search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub(crate) domain: Domain,
    pub(crate) epsilon: f64,
    pub(crate) sample_size: usize,
    pub(crate) max_frontier: usize,
    pub(crate) rounds_per_participant: u32,
    pub(crate) schedule: ThresholdSchedule,
    pub(crate) pruning_rule: PruningRule,
    pub(crate) num_std_dev: NumStdDev,
    pub(crate) mechanism: PrivacyMechanism,
    pub(crate) refine: bool,
}

impl SearchConfig {
    /// Returns the value domain.
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Returns the total privacy budget of each participant.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Returns the budget spent by one answer.
    pub fn epsilon_slice(&self) -> f64 {
        self.epsilon / self.rounds_per_participant as f64
    }

    /// Returns the number of participants asked per candidate and level.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Returns the largest frontier carried to the next level.
    pub fn max_frontier(&self) -> usize {
        self.max_frontier
    }

    /// Returns how many rounds a participant may answer in one run.
    pub fn rounds_per_participant(&self) -> u32 {
        self.rounds_per_participant
    }

    /// Returns the threshold schedule.
    pub fn schedule(&self) -> &ThresholdSchedule {
        &self.schedule
    }

    /// Returns the pruning rule.
    pub fn pruning_rule(&self) -> PruningRule {
        self.pruning_rule
    }

    /// Returns the confidence interval width.
    pub fn num_std_dev(&self) -> NumStdDev {
        self.num_std_dev
    }

    /// Returns the mechanism used for level questions.
    pub fn mechanism(&self) -> PrivacyMechanism {
        self.mechanism
    }

    /// Returns true if a refinement round runs before reporting.
    pub fn refine(&self) -> bool {
        self.refine
    }
}
