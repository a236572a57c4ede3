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

//! Disjoint assignment of participants to candidates.
//!
//! Every round draws, uniformly at random, a fresh disjoint subset of participants for each
//! candidate of the frontier. A participant is never in two subsets of the same round, so the
//! estimates of one round are statistically independent. Participants may be drawn again in a
//! later round at most `max_uses` times in total; each use costs one budget slice, so with
//! `max_uses` slices of `ε / max_uses` the sequential composition of a run stays within ε.

use rand::Rng;
use rand::seq::SliceRandom;
use rand::seq::index;

use crate::error::Error;

/// Assignment of participants (by index into the population) to the candidates of one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    groups: Vec<Vec<usize>>,
}

impl Partition {
    /// Returns the participant subsets, one per candidate in frontier order.
    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }

    /// Returns the number of subsets.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if there are no subsets.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Returns the total number of assigned participants.
    pub fn num_assigned(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }
}

/// Draws disjoint participant subsets round after round while tracking how often each
/// participant has been used.
#[derive(Debug, Clone)]
pub struct PopulationPartitioner {
    uses: Vec<u32>,
    max_uses: u32,
    available: Vec<usize>,
}

impl PopulationPartitioner {
    /// Creates a partitioner over `population` participants, each usable `max_uses` times.
    ///
    /// # Panics
    ///
    /// Panics if `max_uses` is zero.
    pub fn new(population: usize, max_uses: u32) -> Self {
        assert!(max_uses >= 1, "max_uses must be at least 1");
        Self {
            uses: vec![0; population],
            max_uses,
            available: (0..population).collect(),
        }
    }

    /// Returns the population size.
    pub fn population(&self) -> usize {
        self.uses.len()
    }

    /// Returns how many participants can still be drawn.
    pub fn available(&self) -> usize {
        self.available.len()
    }

    /// Returns how often participant `index` has been drawn.
    pub fn uses(&self, index: usize) -> u32 {
        self.uses[index]
    }

    /// Returns how many participants have been drawn at least once.
    pub fn num_used(&self) -> usize {
        self.uses.iter().filter(|&&uses| uses > 0).count()
    }

    /// Makes every participant available again, for a new run.
    pub fn reset(&mut self) {
        self.uses.iter_mut().for_each(|uses| *uses = 0);
        self.available = (0..self.uses.len()).collect();
    }

    /// Draws `groups` disjoint subsets of exactly `group_size` participants each.
    ///
    /// Returns [`ErrorKind::InsufficientPopulation`](crate::error::ErrorKind::InsufficientPopulation)
    /// when fewer than `groups * group_size` participants are available; nothing is drawn in
    /// that case.
    pub fn partition<R: Rng + ?Sized>(
        &mut self,
        groups: usize,
        group_size: usize,
        rng: &mut R,
    ) -> Result<Partition, Error> {
        if groups == 0 || group_size == 0 {
            return Err(Error::invalid_argument(format!(
                "cannot partition into {groups} groups of {group_size}"
            )));
        }
        let required = groups
            .checked_mul(group_size)
            .ok_or_else(|| Error::invalid_argument("partition size overflow"))?;
        if required > self.available.len() {
            return Err(Error::insufficient_population(
                required,
                self.available.len(),
            ));
        }

        let chosen: Vec<usize> = index::sample(rng, self.available.len(), required)
            .into_iter()
            .map(|i| self.available[i])
            .collect();
        self.mark_used(&chosen);
        let groups = chosen
            .chunks(group_size)
            .map(<[usize]>::to_vec)
            .collect();
        Ok(Partition { groups })
    }

    /// Splits every available participant into `groups` disjoint subsets of near-equal size.
    ///
    /// Subset sizes differ by at most one.
    pub fn remainder<R: Rng + ?Sized>(
        &mut self,
        groups: usize,
        rng: &mut R,
    ) -> Result<Partition, Error> {
        if groups == 0 {
            return Err(Error::invalid_argument("cannot partition into 0 groups"));
        }
        let mut chosen = self.available.clone();
        chosen.shuffle(rng);
        self.mark_used(&chosen);

        let base = chosen.len() / groups;
        let extra = chosen.len() % groups;
        let mut rest = chosen.as_slice();
        let mut out = Vec::with_capacity(groups);
        for i in 0..groups {
            let size = base + usize::from(i < extra);
            let (group, tail) = rest.split_at(size);
            out.push(group.to_vec());
            rest = tail;
        }
        Ok(Partition { groups: out })
    }

    fn mark_used(&mut self, chosen: &[usize]) {
        for &index in chosen {
            self.uses[index] += 1;
        }
        let (uses, max_uses) = (&self.uses, self.max_uses);
        self.available.retain(|&index| uses[index] < max_uses);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn groups_are_disjoint_and_sized() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut partitioner = PopulationPartitioner::new(1000, 1);
        let partition = partitioner.partition(4, 100, &mut rng).unwrap();
        assert_eq!(partition.len(), 4);
        assert!(partition.groups().iter().all(|group| group.len() == 100));

        let distinct: HashSet<usize> = partition.groups().iter().flatten().copied().collect();
        assert_eq!(distinct.len(), 400);
        assert_eq!(partitioner.available(), 600);
        assert_eq!(partitioner.num_used(), 400);
    }

    #[test]
    fn single_use_participants_never_return() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut partitioner = PopulationPartitioner::new(300, 1);
        let first = partitioner.partition(2, 50, &mut rng).unwrap();
        let second = partitioner.partition(2, 50, &mut rng).unwrap();
        let first: HashSet<usize> = first.groups().iter().flatten().copied().collect();
        assert!(second.groups().iter().flatten().all(|i| !first.contains(i)));
    }

    #[test]
    fn reuse_is_bounded_by_max_uses() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut partitioner = PopulationPartitioner::new(10, 3);
        for _ in 0..3 {
            partitioner.partition(1, 10, &mut rng).unwrap();
        }
        assert_eq!(partitioner.available(), 0);
        assert!((0..10).all(|i| partitioner.uses(i) == 3));
        let err = partitioner.partition(1, 1, &mut rng).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientPopulation);
    }

    #[test]
    fn insufficient_population_draws_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut partitioner = PopulationPartitioner::new(100, 1);
        let err = partitioner.partition(3, 40, &mut rng).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientPopulation);
        assert_eq!(partitioner.available(), 100);
    }

    #[test]
    fn remainder_splits_evenly() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut partitioner = PopulationPartitioner::new(103, 1);
        partitioner.partition(1, 3, &mut rng).unwrap();
        let rest = partitioner.remainder(3, &mut rng).unwrap();
        let sizes: Vec<usize> = rest.groups().iter().map(Vec::len).collect();
        assert_eq!(sizes, [34, 33, 33]);
        assert_eq!(rest.num_assigned(), 100);
        assert_eq!(partitioner.available(), 0);
    }

    #[test]
    fn reset_restores_everyone() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut partitioner = PopulationPartitioner::new(20, 1);
        partitioner.partition(2, 10, &mut rng).unwrap();
        partitioner.reset();
        assert_eq!(partitioner.available(), 20);
        assert_eq!(partitioner.uses(0), 0);
    }

    #[test]
    fn rejects_empty_shapes() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut partitioner = PopulationPartitioner::new(20, 1);
        assert_eq!(
            partitioner.partition(0, 10, &mut rng).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            partitioner.partition(2, 0, &mut rng).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }
}
