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

//! Protocol entry point.
//!
//! # Overview
//!
//! An [`Aggregator`] holds a population of subscribed [`Participant`]s and runs the heavy
//! hitter search over it. Nobody, the aggregator included, sees a participant's value: all it
//! receives are randomized responses, and each participant spends at most ε per run.
//!
//! A run resets every participant (fresh budget, empty response cache), derives a run seed
//! from the aggregator's random source, and drives a [`FrontierSearch`] to the end. Runs of an
//! aggregator built with a seed are reproducible; consecutive runs are independent trials.
//!
//! [`Aggregator::query`] estimates the frequency of a single known value, without the tree.
//!
//! # Examples
//!
//! ```
//! # use heavyhitters::aggregator::Aggregator;
//! # use heavyhitters::participant::Participant;
//! let mut aggregator = Aggregator::builder()
//!     .bit_length(4)
//!     .epsilon(2.0)
//!     .sample_size(300)
//!     .threshold(0.4)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//! for id in 0..4000 {
//!     let value = if id % 4 == 0 { "0001" } else { "1110" };
//!     aggregator
//!         .subscribe(Participant::new(id, value.parse().unwrap(), 2.0).unwrap())
//!         .unwrap();
//! }
//!
//! let report = aggregator.run().unwrap();
//! assert_eq!(report.hitters()[0].value().to_string(), "1110");
//! ```

mod builder;
mod report;

use rand::Rng;
use tracing::debug;
use tracing::info;

pub use self::builder::AggregatorBuilder;
pub use self::report::HeavyHitter;
pub use self::report::HeavyHitterReport;
use crate::common::CancellationToken;
use crate::common::RandomSource;
use crate::domain::BitString;
use crate::error::Error;
use crate::estimator::Estimate;
use crate::estimator::FrequencyEstimator;
use crate::mechanism::keep_probability;
use crate::participant::Participant;
use crate::participant::Query;
use crate::participant::QueryFingerprint;
use crate::partition::PopulationPartitioner;
use crate::search::FrontierSearch;
use crate::search::LevelSummary;
use crate::search::SearchConfig;
use crate::search::tally::GroupTally;
use crate::search::tally::ballot;
use crate::search::tally::tally_group;

// Round of standalone queries; search rounds count up from zero.
const QUERY_ROUND: u32 = u32::MAX;

/// Runs the heavy hitter protocol over a population of participants.
///
/// See the [module level documentation](self) for an overview.
#[derive(Debug)]
pub struct Aggregator {
    config: SearchConfig,
    participants: Vec<Participant>,
    source: RandomSource,
    estimator: FrequencyEstimator,
    cancel: Option<CancellationToken>,
}

impl Aggregator {
    /// Creates a builder with the default configuration.
    pub fn builder() -> AggregatorBuilder {
        AggregatorBuilder::default()
    }

    /// Returns the validated configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Returns the subscribed participants.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Returns the number of subscribed participants.
    pub fn population(&self) -> usize {
        self.participants.len()
    }

    /// Adds a participant to the population.
    ///
    /// Returns [`ErrorKind::InvalidDomain`](crate::error::ErrorKind::InvalidDomain) if the
    /// participant's value does not have the configured bit length, and
    /// [`ErrorKind::InvalidBudget`](crate::error::ErrorKind::InvalidBudget) if its total budget
    /// is smaller than the per-answer slice `epsilon / rounds_per_participant`.
    pub fn subscribe(&mut self, participant: Participant) -> Result<(), Error> {
        participant.check_domain(&self.config.domain)?;
        participant.check_budget(self.config.epsilon_slice())?;
        self.participants.push(participant);
        Ok(())
    }

    /// Adds every participant of `participants`, stopping at the first one rejected.
    pub fn subscribe_all<I>(&mut self, participants: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Participant>,
    {
        participants
            .into_iter()
            .try_for_each(|participant| self.subscribe(participant))
    }

    /// Resets the population and returns a search for one run, to be driven step by step.
    pub fn search(&mut self) -> FrontierSearch<'_> {
        self.participants.iter().for_each(Participant::reset);
        let source = RandomSource::from_seed(self.source.rng().random());
        FrontierSearch::new(
            self.config.clone(),
            &self.participants,
            source,
            self.cancel.clone(),
        )
    }

    /// Runs the search to the end and returns the values at or above the threshold.
    ///
    /// # Errors
    ///
    /// * [`InsufficientPopulation`](crate::error::ErrorKind::InsufficientPopulation) when a
    ///   level needs more participants than are left.
    /// * [`Cancelled`](crate::error::ErrorKind::Cancelled) when the cancellation token fires.
    pub fn run(&mut self) -> Result<HeavyHitterReport, Error> {
        self.run_with(|_| {})
    }

    /// Same as [`Aggregator::run`], calling `observer` after every level.
    pub fn run_with<F>(&mut self, observer: F) -> Result<HeavyHitterReport, Error>
    where
        F: FnMut(&LevelSummary),
    {
        let population = self.population();
        let report = self.search().run_with(observer)?;
        info!(
            population,
            participants_used = report.participants_used(),
            levels = report.levels().len(),
            reported = report.len(),
            "heavy hitter search finished"
        );
        Ok(report)
    }

    /// Estimates the frequency of `value` from a fresh sample of `sample_size` participants,
    /// each asked whether it holds `value`.
    ///
    /// Queries do not reset the population: a participant asked about the same value again
    /// repeats its answer, and budget spent here stays spent until the next run.
    ///
    /// # Errors
    ///
    /// * [`InvalidDomain`](crate::error::ErrorKind::InvalidDomain) if `value` does not have
    ///   the configured bit length.
    /// * [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if `sample_size` is
    ///   zero.
    /// * [`InsufficientPopulation`](crate::error::ErrorKind::InsufficientPopulation) if the
    ///   population is smaller than `sample_size`, or nobody in the sample has budget left.
    pub fn query(&mut self, value: &BitString, sample_size: usize) -> Result<Estimate, Error> {
        self.config.domain.check(value)?;
        if sample_size == 0 {
            return Err(Error::invalid_argument("sample size must be positive"));
        }
        let mut partitioner = PopulationPartitioner::new(self.participants.len(), 1);
        let partition = partitioner.partition(1, sample_size, self.source.rng())?;
        let seed = self.source.split();
        let epsilon = self.config.epsilon_slice();
        let fingerprint = QueryFingerprint::new(QUERY_ROUND, Query::Contains(*value));
        let participants = &self.participants;

        let tally = tally_group(&partition.groups()[0], |_, index| {
            let mut rng = seed.stream(index as u64);
            ballot(&participants[index], fingerprint, epsilon, &mut rng, |answer| {
                GroupTally::contains(0, answer)
            })
        })?;
        let (answers, votes) = (tally.answers[0], tally.votes[0]);
        debug!(value = %value, answers, votes, "answered standalone query");
        self.estimator
            .estimate(votes, answers, keep_probability(epsilon, 2), 2)
            .map_err(|err| err.with_context("value", value))
    }
}
