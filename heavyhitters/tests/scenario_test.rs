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

//! Recall and precision of the full protocol at ε = 1, θ = 0.02 over 16-bit values.
//!
//! Every seed is one independent run over the same population of 400,000 participants: a
//! value V held by 5% of them, a value W held by 0.01%, and uniform values for the rest.

mod common;

use std::sync::OnceLock;

use common::bits;
use common::population;
use googletest::prelude::*;
use heavyhitters::aggregator::Aggregator;

const V: &str = "1011011001011100";
const W: &str = "0100100110100011";
const POPULATION: usize = 400_000;
const RUNS: usize = 10;

struct Outcome {
    // Estimated frequency of V, if reported.
    v: Option<f64>,
    v_first: bool,
    w_reported: bool,
}

fn outcomes() -> &'static [Outcome] {
    static OUTCOMES: OnceLock<Vec<Outcome>> = OnceLock::new();
    OUTCOMES.get_or_init(|| {
        let heavy = [(bits(V), POPULATION / 20), (bits(W), POPULATION / 10_000)];
        let mut aggregator = Aggregator::builder()
            .bit_length(16)
            .epsilon(1.0)
            .threshold(0.02)
            .sample_size(8000)
            .target_count(1)
            .expansion_factor(2.0)
            .seed(2024)
            .build()
            .unwrap();
        aggregator
            .subscribe_all(population(16, 1.0, &heavy, POPULATION, 2024))
            .unwrap();

        (0..RUNS)
            .map(|_| {
                let report = aggregator.run().unwrap();
                Outcome {
                    v: report.get(&bits(V)).map(|hitter| hitter.frequency()),
                    v_first: report
                        .hitters()
                        .first()
                        .is_some_and(|hitter| hitter.value() == &bits(V)),
                    w_reported: report.get(&bits(W)).is_some(),
                }
            })
            .collect()
    })
}

#[test]
fn test_frequent_value_is_recovered() {
    let recovered = outcomes()
        .iter()
        .filter(|outcome| outcome.v.is_some_and(|frequency| (frequency - 0.05).abs() <= 0.01))
        .count();
    assert_that!(recovered, ge(RUNS - 1));
}

#[test]
fn test_rare_value_is_not_reported() {
    let reported = outcomes().iter().filter(|outcome| outcome.w_reported).count();
    assert_that!(reported, le(1));
}

#[test]
fn test_frequent_value_ranks_first() {
    for outcome in outcomes().iter().filter(|outcome| outcome.v.is_some()) {
        assert!(outcome.v_first);
    }
}
