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

use heavyhitters::domain::BitString;
use heavyhitters::domain::Domain;
use heavyhitters::participant::Participant;
use heavyhitters::participant::UniformValues;
use heavyhitters::participant::ValueSource;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub fn bits(s: &str) -> BitString {
    s.parse().unwrap()
}

/// Builds `size` participants with budget `budget`: `count` holders of each heavy value, in
/// order, then uniformly drawn values of `bit_length` bits.
pub fn population(
    bit_length: u32,
    budget: f64,
    heavy: &[(BitString, usize)],
    size: usize,
    seed: u64,
) -> Vec<Participant> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut uniform = UniformValues::new(Domain::new(bit_length).unwrap());
    let mut values = Vec::with_capacity(size);
    for &(value, count) in heavy {
        values.extend(std::iter::repeat_n(value, count));
    }
    while values.len() < size {
        values.push(uniform.sample(&mut rng));
    }
    values
        .into_iter()
        .enumerate()
        .map(|(id, value)| Participant::new(id as u64, value, budget).unwrap())
        .collect()
}
