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

use crate::aggregator::Aggregator;
use crate::common::CancellationToken;
use crate::common::NumStdDev;
use crate::common::RandomSource;
use crate::domain::Domain;
use crate::error::Error;
use crate::estimator::FrequencyEstimator;
use crate::mechanism::PrivacyMechanism;
use crate::search::PruningRule;
use crate::search::SearchConfig;
use crate::search::ThresholdSchedule;

const DEFAULT_BIT_LENGTH: u32 = 16;
const DEFAULT_EPSILON: f64 = 1.0;
const DEFAULT_SAMPLE_SIZE: usize = 2000;
const DEFAULT_THRESHOLD: f64 = 0.02;
const DEFAULT_EXPANSION_FACTOR: f64 = 2.0;

/// Builder for [`Aggregator`].
///
/// Setters only record values; [`AggregatorBuilder::build`] validates the whole
/// configuration.
#[derive(Debug, Clone)]
pub struct AggregatorBuilder {
    bit_length: u32,
    epsilon: f64,
    sample_size: usize,
    threshold: f64,
    expansion_factor: f64,
    target_count: Option<usize>,
    rounds_per_participant: u32,
    threshold_decay: f64,
    pruning_rule: PruningRule,
    num_std_dev: NumStdDev,
    mechanism: PrivacyMechanism,
    refine: bool,
    seed: Option<u64>,
    cancel: Option<CancellationToken>,
}

impl Default for AggregatorBuilder {
    fn default() -> Self {
        Self {
            bit_length: DEFAULT_BIT_LENGTH,
            epsilon: DEFAULT_EPSILON,
            sample_size: DEFAULT_SAMPLE_SIZE,
            threshold: DEFAULT_THRESHOLD,
            expansion_factor: DEFAULT_EXPANSION_FACTOR,
            target_count: None,
            rounds_per_participant: 1,
            threshold_decay: 1.0,
            pruning_rule: PruningRule::default(),
            num_std_dev: NumStdDev::default(),
            mechanism: PrivacyMechanism::default(),
            refine: true,
            seed: None,
            cancel: None,
        }
    }
}

impl AggregatorBuilder {
    /// Set the bit length `m` of the values, in `[1, 64]`.
    pub fn bit_length(mut self, bit_length: u32) -> Self {
        self.bit_length = bit_length;
        self
    }

    /// Set the privacy budget ε each participant may spend in one run.
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the number of participants asked per candidate and level.
    pub fn sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Set the reporting threshold θ, in `(0, 1]`.
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set how many heavy hitters the search expects. Defaults to `⌊1 / θ⌋`, the most values
    /// that can reach θ.
    pub fn target_count(mut self, target_count: usize) -> Self {
        self.target_count = Some(target_count);
        self
    }

    /// Set the frontier slack: at most `⌈target_count × expansion_factor⌉` candidates are
    /// carried from one level to the next.
    pub fn expansion_factor(mut self, expansion_factor: f64) -> Self {
        self.expansion_factor = expansion_factor;
        self
    }

    /// Set how many rounds a participant may answer; each answer spends `ε / rounds`.
    pub fn rounds_per_participant(mut self, rounds: u32) -> Self {
        self.rounds_per_participant = rounds;
        self
    }

    /// Set the threshold decay (at least 1); see
    /// [`ThresholdSchedule`](crate::search::ThresholdSchedule).
    pub fn threshold_decay(mut self, decay: f64) -> Self {
        self.threshold_decay = decay;
        self
    }

    /// Set the pruning rule.
    pub fn pruning_rule(mut self, rule: PruningRule) -> Self {
        self.pruning_rule = rule;
        self
    }

    /// Set the confidence interval width.
    pub fn num_std_dev(mut self, num_std_dev: NumStdDev) -> Self {
        self.num_std_dev = num_std_dev;
        self
    }

    /// Set the mechanism for level questions.
    pub fn mechanism(mut self, mechanism: PrivacyMechanism) -> Self {
        self.mechanism = mechanism;
        self
    }

    /// Enable or disable the refinement round before reporting.
    pub fn refine(mut self, refine: bool) -> Self {
        self.refine = refine;
        self
    }

    /// Set the seed of the random source. Without a seed, runs draw from entropy.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set a token that cancels runs between rounds.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Validates the configuration and builds an aggregator with no participants.
    ///
    /// # Errors
    ///
    /// * [`InvalidDomain`](crate::error::ErrorKind::InvalidDomain) unless the bit length is in
    ///   `[1, 64]`.
    /// * [`InvalidBudget`](crate::error::ErrorKind::InvalidBudget) unless ε is positive and
    ///   finite.
    /// * [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) for θ outside `(0, 1]`,
    ///   a zero sample size, target count or round count, an expansion factor below 1, or a
    ///   threshold decay below 1.
    pub fn build(self) -> Result<Aggregator, Error> {
        let domain = Domain::new(self.bit_length)?;
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(Error::invalid_budget(format!(
                "privacy budget must be positive and finite, got {}",
                self.epsilon
            )));
        }
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(Error::invalid_argument(format!(
                "threshold must be in (0, 1], got {}",
                self.threshold
            )));
        }
        if self.sample_size == 0 {
            return Err(Error::invalid_argument("sample size must be positive"));
        }
        // Binary groups split by parity; each extension bit needs at least one answer.
        if matches!(self.mechanism, PrivacyMechanism::BinaryRandomizedResponse)
            && self.sample_size < 2
        {
            return Err(Error::invalid_argument(format!(
                "binary randomized response needs a sample size of at least 2, got {}",
                self.sample_size
            )));
        }
        if !(self.expansion_factor.is_finite() && self.expansion_factor >= 1.0) {
            return Err(Error::invalid_argument(format!(
                "expansion factor must be at least 1, got {}",
                self.expansion_factor
            )));
        }
        if !(self.threshold_decay.is_finite() && self.threshold_decay >= 1.0) {
            return Err(Error::invalid_argument(format!(
                "threshold decay must be at least 1, got {}",
                self.threshold_decay
            )));
        }
        if self.rounds_per_participant == 0 {
            return Err(Error::invalid_argument(
                "participants must be allowed at least one round",
            ));
        }
        let target_count = self
            .target_count
            .unwrap_or_else(|| (1.0 / self.threshold).floor() as usize);
        if target_count == 0 {
            return Err(Error::invalid_argument("target count must be positive"));
        }
        let max_frontier = ((target_count as f64) * self.expansion_factor).ceil() as usize;

        let config = SearchConfig {
            domain,
            epsilon: self.epsilon,
            sample_size: self.sample_size,
            max_frontier: max_frontier.max(1),
            rounds_per_participant: self.rounds_per_participant,
            schedule: ThresholdSchedule::new(
                self.threshold,
                self.threshold_decay,
                domain.bit_length(),
            ),
            pruning_rule: self.pruning_rule,
            num_std_dev: self.num_std_dev,
            mechanism: self.mechanism,
            refine: self.refine,
        };
        Ok(Aggregator {
            estimator: FrequencyEstimator::new(config.num_std_dev),
            config,
            participants: Vec::new(),
            source: RandomSource::from_optional_seed(self.seed),
            cancel: self.cancel,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn kind(builder: AggregatorBuilder) -> ErrorKind {
        builder.build().unwrap_err().kind()
    }

    #[test]
    fn defaults() {
        let aggregator = Aggregator::builder().build().unwrap();
        let config = aggregator.config();
        assert_eq!(config.domain().bit_length(), 16);
        assert_eq!(config.sample_size(), 2000);
        assert_eq!(config.schedule().threshold(), 0.02);
        // ⌈⌊1 / 0.02⌋ × 2⌉
        assert_eq!(config.max_frontier(), 100);
        assert_eq!(config.epsilon_slice(), 1.0);
        assert_eq!(config.mechanism(), PrivacyMechanism::KaryRandomizedResponse);
        assert_eq!(config.pruning_rule(), PruningRule::ConfidenceOverlap);
        assert!(config.refine());
    }

    #[test]
    fn frontier_and_slices() {
        let aggregator = Aggregator::builder()
            .target_count(3)
            .expansion_factor(1.5)
            .epsilon(2.0)
            .rounds_per_participant(4)
            .build()
            .unwrap();
        assert_eq!(aggregator.config().max_frontier(), 5);
        assert_eq!(aggregator.config().epsilon_slice(), 0.5);
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert_eq!(kind(Aggregator::builder().bit_length(0)), ErrorKind::InvalidDomain);
        assert_eq!(kind(Aggregator::builder().bit_length(65)), ErrorKind::InvalidDomain);
        assert_eq!(kind(Aggregator::builder().epsilon(0.0)), ErrorKind::InvalidBudget);
        assert_eq!(
            kind(Aggregator::builder().epsilon(f64::INFINITY)),
            ErrorKind::InvalidBudget
        );
        assert_eq!(kind(Aggregator::builder().threshold(0.0)), ErrorKind::InvalidArgument);
        assert_eq!(kind(Aggregator::builder().threshold(1.5)), ErrorKind::InvalidArgument);
        assert_eq!(kind(Aggregator::builder().sample_size(0)), ErrorKind::InvalidArgument);
        assert_eq!(
            kind(Aggregator::builder().expansion_factor(0.5)),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            kind(Aggregator::builder().threshold_decay(0.9)),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            kind(Aggregator::builder().rounds_per_participant(0)),
            ErrorKind::InvalidArgument
        );
        assert_eq!(kind(Aggregator::builder().target_count(0)), ErrorKind::InvalidArgument);
    }

    #[test]
    fn binary_groups_need_two_members() {
        let binary = || {
            Aggregator::builder()
                .bit_length(2)
                .mechanism(PrivacyMechanism::BinaryRandomizedResponse)
        };
        assert_eq!(kind(binary().sample_size(1)), ErrorKind::InvalidArgument);
        assert!(binary().sample_size(2).build().is_ok());
        assert!(
            Aggregator::builder()
                .bit_length(2)
                .sample_size(1)
                .build()
                .is_ok()
        );
    }
}
