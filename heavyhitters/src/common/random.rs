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

//! Splittable random streams.
//!
//! A run owns a single [`RandomSource`]. Whenever work fans out (a round of participant
//! answers) the source hands out a [`StreamSeed`], and every unit of work derives its own
//! independent ChaCha stream from that seed and its identifier. Results therefore depend only
//! on the run seed, never on how work is scheduled across threads.

use rand::RngCore;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// The random source owned by a protocol run.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: ChaCha8Rng,
}

impl RandomSource {
    /// Creates a reproducible source from `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates a source seeded from the thread-local entropy source.
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }

    /// Creates a source from `seed` if present, otherwise from entropy.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }

    /// Draws a seed for an independent family of sub-streams.
    ///
    /// Advances this source, so consecutive calls yield unrelated seeds.
    pub fn split(&mut self) -> StreamSeed {
        let mut seed = [0u8; 32];
        self.rng.fill_bytes(&mut seed);
        StreamSeed(seed)
    }

    /// Returns the underlying generator for sequential draws (partitioning, shuffling).
    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}

/// Seed of a family of independent streams, one per stream identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSeed([u8; 32]);

impl StreamSeed {
    /// Returns the generator for stream `id`.
    ///
    /// The same `(seed, id)` pair always yields the same sequence.
    pub fn stream(&self, id: u64) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::from_seed(self.0);
        rng.set_stream(id);
        rng
    }
}
