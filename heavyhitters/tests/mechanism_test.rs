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

use googletest::prelude::*;
use heavyhitters::domain::BitString;
use heavyhitters::mechanism::keep_probability;
use heavyhitters::mechanism::output_probability;
use heavyhitters::mechanism::respond;
use heavyhitters::participant::Participant;
use heavyhitters::participant::Query;
use heavyhitters::participant::QueryFingerprint;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const BUDGETS: [f64; 6] = [0.05, 0.25, 1.0, 2.0, 5.0, 10.0];
const SYMBOLS: [u32; 4] = [2, 3, 4, 16];

#[test]
fn test_likelihood_ratio_is_bounded() {
    for epsilon in BUDGETS {
        let bound = epsilon.exp() * (1.0 + 1e-12);
        for k in SYMBOLS {
            for output in 0..k {
                for a in 0..k {
                    for b in 0..k {
                        let ratio = output_probability(a, output, epsilon, k)
                            / output_probability(b, output, epsilon, k);
                        assert!(
                            ratio <= bound,
                            "ratio {ratio} exceeds e^{epsilon} for k = {k}, output {output}"
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn test_ratio_is_tight() {
    for epsilon in BUDGETS {
        for k in SYMBOLS {
            let ratio = output_probability(0, 0, epsilon, k) / output_probability(1, 0, epsilon, k);
            assert_that!(ratio.ln(), near(epsilon, 1e-9));
        }
    }
}

#[test]
fn test_empirical_output_distribution() {
    let mut rng = ChaCha8Rng::seed_from_u64(31);
    let trials = 200_000;
    for (epsilon, k) in [(0.5, 2), (1.0, 3), (2.0, 4)] {
        let mut counts = vec![0u32; k as usize];
        for _ in 0..trials {
            counts[respond(1, epsilon, k, &mut rng) as usize] += 1;
        }
        for output in 0..k {
            let expected = output_probability(1, output, epsilon, k);
            let observed = counts[output as usize] as f64 / trials as f64;
            assert_that!(observed, near(expected, 0.005));
        }
        let kept = counts[1] as f64 / trials as f64;
        assert_that!(kept, near(keep_probability(epsilon, k), 0.005));
    }
}

#[test]
fn test_memoized_answers_do_not_average_out() {
    // Asking one participant the same question many times must not reveal more than one
    // answer does.
    let value: BitString = "1100".parse().unwrap();
    let participant = Participant::new(1, value, 1.0).unwrap();
    let fingerprint = QueryFingerprint::new(0, Query::Contains(value));
    let mut rng = ChaCha8Rng::seed_from_u64(32);
    let answers: Vec<u32> = (0..1000)
        .map(|_| participant.answer(fingerprint, 1.0, &mut rng).unwrap())
        .collect();
    assert!(answers.iter().all(|&answer| answer == answers[0]));
    assert_eq!(participant.answered(), 1);
}
