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

use std::cmp::Ordering;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::aggregator::HeavyHitter;
use crate::aggregator::HeavyHitterReport;
use crate::common::CancellationToken;
use crate::common::RandomSource;
use crate::domain::BitString;
use crate::error::Error;
use crate::estimator::FrequencyEstimator;
use crate::mechanism::PrivacyMechanism;
use crate::mechanism::keep_probability;
use crate::participant::Participant;
use crate::participant::Query;
use crate::participant::QueryFingerprint;
use crate::partition::PopulationPartitioner;
use crate::search::Candidate;
use crate::search::LevelSummary;
use crate::search::SearchConfig;
use crate::search::SearchState;
use crate::search::tally::GroupTally;
use crate::search::tally::ballot;
use crate::search::tally::tally_group;

/// Level-by-level search of the prefix tree for frequent values.
///
/// The search is a state machine advanced by [`FrontierSearch::step`]; [`FrontierSearch::run`]
/// drives it to the end. Each level draws a fresh disjoint group of participants per frontier
/// candidate, estimates both extensions of every candidate, and keeps the children that pass
/// the pruning rule, best first, up to the configured frontier size. A dropped prefix is never
/// asked about again.
pub struct FrontierSearch<'a> {
    config: SearchConfig,
    participants: &'a [Participant],
    partitioner: PopulationPartitioner,
    source: RandomSource,
    estimator: FrequencyEstimator,
    cancel: Option<CancellationToken>,

    state: SearchState,
    depth: u8,
    round: u32,
    frontier: Vec<Candidate>,
    tallies: Vec<GroupTally>,
    drawn: usize,
    children: Vec<Candidate>,
    survivors: Vec<Candidate>,
    history: Vec<LevelSummary>,
    results: Vec<Candidate>,
}

impl<'a> FrontierSearch<'a> {
    pub(crate) fn new(
        config: SearchConfig,
        participants: &'a [Participant],
        source: RandomSource,
        cancel: Option<CancellationToken>,
    ) -> Self {
        let partitioner =
            PopulationPartitioner::new(participants.len(), config.rounds_per_participant);
        let estimator = FrequencyEstimator::new(config.num_std_dev);
        Self {
            config,
            participants,
            partitioner,
            source,
            estimator,
            cancel,
            state: SearchState::Init,
            depth: 0,
            round: 0,
            frontier: Vec::new(),
            tallies: Vec::new(),
            drawn: 0,
            children: Vec::new(),
            survivors: Vec::new(),
            history: Vec::new(),
            results: Vec::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Returns the current state.
    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Returns the length of the prefixes in the frontier.
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Returns the current frontier, best candidate first.
    pub fn frontier(&self) -> &[Candidate] {
        &self.frontier
    }

    /// Returns the summaries of the levels pruned so far.
    pub fn history(&self) -> &[LevelSummary] {
        &self.history
    }

    /// Returns the reported values once the search is [`SearchState::Done`].
    pub fn results(&self) -> &[Candidate] {
        &self.results
    }

    /// Returns how many participants have answered at least once.
    pub fn participants_used(&self) -> usize {
        self.partitioner.num_used()
    }

    /// Advances the search by one transition and returns the new state.
    ///
    /// Any error moves the search to [`SearchState::Failed`]; stepping a failed search returns
    /// an error again. Stepping a finished search is a no-op.
    pub fn step(&mut self) -> Result<SearchState, Error> {
        let next = match self.state {
            SearchState::Init => Ok(self.init()),
            SearchState::LevelQuery => self.query_level(),
            SearchState::Estimate => self.estimate_level(),
            SearchState::Prune => Ok(self.prune_level()),
            SearchState::Expand => Ok(self.expand()),
            SearchState::Finalize => self.finalize(),
            SearchState::Done => return Ok(SearchState::Done),
            SearchState::Failed => {
                return Err(Error::invalid_argument("cannot step a failed search"));
            }
        };
        match next {
            Ok(state) => {
                self.state = state;
                Ok(state)
            }
            Err(err) => {
                self.state = SearchState::Failed;
                self.tallies.clear();
                self.children.clear();
                self.survivors.clear();
                Err(err.with_context("depth", self.depth))
            }
        }
    }

    /// Drives the search to the end and returns the report.
    pub fn run(self) -> Result<HeavyHitterReport, Error> {
        self.run_with(|_| {})
    }

    /// Drives the search to the end, calling `observer` after every pruned level.
    pub fn run_with<F>(mut self, mut observer: F) -> Result<HeavyHitterReport, Error>
    where
        F: FnMut(&LevelSummary),
    {
        loop {
            let levels = self.history.len();
            let state = self.step()?;
            if let Some(summary) = self.history.get(levels) {
                observer(summary);
            }
            if state == SearchState::Done {
                break;
            }
        }
        self.into_report()
    }

    /// Turns a finished search into its report.
    ///
    /// Returns an error if the search is not [`SearchState::Done`].
    pub fn into_report(self) -> Result<HeavyHitterReport, Error> {
        if self.state != SearchState::Done {
            return Err(Error::invalid_argument(format!(
                "search is in state {}, not Done",
                self.state
            )));
        }
        let participants_used = self.participants_used();
        let hitters = self
            .results
            .iter()
            .filter_map(|candidate| {
                let estimate = candidate.estimate()?;
                Some(HeavyHitter::new(*candidate.prefix(), *estimate))
            })
            .collect();
        Ok(HeavyHitterReport::new(
            hitters,
            self.history,
            participants_used,
            self.participants.len(),
        ))
    }

    fn init(&mut self) -> SearchState {
        self.frontier = vec![Candidate::root()];
        self.depth = 0;
        SearchState::LevelQuery
    }

    fn query_level(&mut self) -> Result<SearchState, Error> {
        self.check_cancelled()?;
        let groups = self.frontier.len();
        let partition =
            self.partitioner
                .partition(groups, self.config.sample_size, self.source.rng())?;
        let seed = self.source.split();
        let round = self.next_round();
        let epsilon = self.config.epsilon_slice();
        let mechanism = self.config.mechanism;
        let participants = self.participants;

        let mut tallies = Vec::with_capacity(groups);
        for (candidate, members) in self.frontier.iter().zip(partition.groups()) {
            let prefix = *candidate.prefix();
            let tally = tally_group(members, |position, index| {
                let mut rng = seed.stream(index as u64);
                let participant = &participants[index];
                match mechanism {
                    PrivacyMechanism::BinaryRandomizedResponse => {
                        let bit = (position % 2) as u8;
                        let fingerprint =
                            QueryFingerprint::new(round, Query::Contains(prefix.child(bit)));
                        ballot(participant, fingerprint, epsilon, &mut rng, |answer| {
                            GroupTally::contains(bit as usize, answer)
                        })
                    }
                    PrivacyMechanism::KaryRandomizedResponse => {
                        let fingerprint = QueryFingerprint::new(round, Query::Extension(prefix));
                        ballot(
                            participant,
                            fingerprint,
                            epsilon,
                            &mut rng,
                            GroupTally::extension,
                        )
                    }
                }
            })
            .map_err(|err| err.with_context("prefix", prefix))?;
            tallies.push(tally);
        }

        let excluded: u64 = tallies.iter().map(|tally| tally.excluded).sum();
        if excluded > 0 {
            warn!(
                depth = self.depth,
                excluded, "excluded participants without budget left"
            );
        }
        self.drawn = partition.num_assigned();
        self.tallies = tallies;
        Ok(SearchState::Estimate)
    }

    fn estimate_level(&mut self) -> Result<SearchState, Error> {
        let k = self.config.mechanism.level_symbols();
        let p = keep_probability(self.config.epsilon_slice(), k);
        let mut children = Vec::with_capacity(2 * self.frontier.len());
        for (candidate, tally) in self.frontier.iter().zip(&self.tallies) {
            for bit in 0..=1u8 {
                let child = candidate.prefix().child(bit);
                let slot = bit as usize;
                let estimate = self
                    .estimator
                    .estimate(tally.votes[slot], tally.answers[slot], p, k)
                    .map_err(|err| err.with_context("prefix", child))?;
                children.push(Candidate::new(child, estimate));
            }
        }
        self.children = children;
        Ok(SearchState::Prune)
    }

    fn prune_level(&mut self) -> SearchState {
        let level = self.depth + 1;
        let tau = self.config.schedule.at(level);
        let rule = self.config.pruning_rule;
        let candidates = self.children.len();

        let (mut kept, mut dropped): (Vec<Candidate>, Vec<Candidate>) =
            self.children.drain(..).partition(|candidate| {
                candidate
                    .estimate()
                    .is_some_and(|estimate| rule.keeps(estimate, tau))
            });
        kept.sort_by(by_rank);
        if kept.len() > self.config.max_frontier {
            dropped.extend(kept.drain(self.config.max_frontier..));
        }
        let mut dropped: Vec<BitString> = dropped.iter().map(|c| *c.prefix()).collect();
        dropped.sort();

        let excluded = self.tallies.iter().map(|tally| tally.excluded).sum();
        debug!(
            depth = level,
            frontier = self.frontier.len(),
            threshold = tau,
            kept = kept.len(),
            dropped = dropped.len(),
            "pruned level"
        );
        self.history.push(LevelSummary {
            depth: level,
            threshold: tau,
            candidates,
            kept: kept.len(),
            dropped,
            sample_size: self.drawn,
            excluded,
        });
        self.tallies.clear();
        self.survivors = kept;
        SearchState::Expand
    }

    fn expand(&mut self) -> SearchState {
        self.frontier = std::mem::take(&mut self.survivors);
        self.depth += 1;
        if self.frontier.is_empty() || self.depth >= self.config.domain.bit_length() {
            SearchState::Finalize
        } else {
            SearchState::LevelQuery
        }
    }

    fn finalize(&mut self) -> Result<SearchState, Error> {
        let mut results = std::mem::take(&mut self.frontier);
        if self.config.refine && !results.is_empty() {
            self.check_cancelled()?;
            self.refine(&mut results)?;
        }
        let theta = self.config.schedule.threshold();
        results.retain(|candidate| candidate.frequency() >= theta);
        results.sort_by(by_rank);
        self.results = results;
        Ok(SearchState::Done)
    }

    // Spends every remaining answer on the full-length survivors. Each survivor keeps its
    // search estimate unless the refinement group reaches the configured sample size.
    fn refine(&mut self, results: &mut [Candidate]) -> Result<(), Error> {
        let groups = results.len();
        let available = self.partitioner.available();
        if available / groups < self.config.sample_size {
            debug!(available, groups, "skipped refinement");
            return Ok(());
        }
        let partition = self.partitioner.remainder(groups, self.source.rng())?;
        let seed = self.source.split();
        let round = self.next_round();
        let epsilon = self.config.epsilon_slice();
        let p = keep_probability(epsilon, 2);
        let participants = self.participants;

        for (candidate, members) in results.iter_mut().zip(partition.groups()) {
            let value = *candidate.prefix();
            let fingerprint = QueryFingerprint::new(round, Query::Contains(value));
            let tally = tally_group(members, |_, index| {
                let mut rng = seed.stream(index as u64);
                ballot(&participants[index], fingerprint, epsilon, &mut rng, |answer| {
                    GroupTally::contains(0, answer)
                })
            })
            .map_err(|err| err.with_context("prefix", value))?;
            if tally.answers[0] >= self.config.sample_size as u64 {
                let estimate = self.estimator.estimate(tally.votes[0], tally.answers[0], p, 2)?;
                *candidate = Candidate::new(value, estimate);
            }
        }
        debug!(
            groups,
            participants = partition.num_assigned(),
            "refined full-length candidates"
        );
        Ok(())
    }

    fn next_round(&mut self) -> u32 {
        let round = self.round;
        self.round += 1;
        round
    }

    fn check_cancelled(&self) -> Result<(), Error> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => {
                info!(depth = self.depth, "search cancelled");
                Err(Error::cancelled("search cancelled between rounds"))
            }
            _ => Ok(()),
        }
    }
}

// Best estimate first, ties broken by prefix.
fn by_rank(a: &Candidate, b: &Candidate) -> Ordering {
    b.frequency()
        .total_cmp(&a.frequency())
        .then_with(|| a.prefix().cmp(b.prefix()))
}
