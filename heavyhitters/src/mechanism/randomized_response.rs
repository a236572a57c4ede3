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

//! k-ary randomized response.

use rand::Rng;

/// Returns the probability that randomized response over `k` symbols reports the true symbol.
///
/// This is `e^ε / (e^ε + k - 1)`, evaluated as `1 / (1 + (k - 1) e^-ε)` so that large budgets
/// do not overflow.
///
/// # Panics
///
/// Panics if `epsilon` is not a positive finite number or `k < 2`.
pub fn keep_probability(epsilon: f64, k: u32) -> f64 {
    assert!(
        epsilon.is_finite() && epsilon > 0.0,
        "epsilon must be positive and finite, got {epsilon}"
    );
    assert!(k >= 2, "randomized response needs at least 2 symbols, got {k}");
    1.0 / (1.0 + (k - 1) as f64 * (-epsilon).exp())
}

/// Returns the probability that a participant holding `true_symbol` reports `output`.
///
/// This is the transition matrix of [`respond`]: `p` on the diagonal and `(1 - p) / (k - 1)`
/// everywhere else.
pub fn output_probability(true_symbol: u32, output: u32, epsilon: f64, k: u32) -> f64 {
    assert!(true_symbol < k && output < k, "symbols must be below {k}");
    let p = keep_probability(epsilon, k);
    if true_symbol == output {
        p
    } else {
        (1.0 - p) / (k - 1) as f64
    }
}

/// Perturbs `true_symbol` with k-ary randomized response.
///
/// Returns `true_symbol` with probability [`keep_probability`], otherwise one of the other
/// `k - 1` symbols chosen uniformly. For any two true symbols the probabilities of producing a
/// given output differ by at most a factor of `e^ε`.
///
/// # Panics
///
/// Panics if `true_symbol >= k`, `k < 2`, or `epsilon` is not a positive finite number.
pub fn respond<R: Rng + ?Sized>(true_symbol: u32, epsilon: f64, k: u32, rng: &mut R) -> u32 {
    assert!(true_symbol < k, "symbol {true_symbol} out of range for {k} symbols");
    let p = keep_probability(epsilon, k);
    if rng.random_bool(p) {
        return true_symbol;
    }
    let other = rng.random_range(0..k - 1);
    if other >= true_symbol { other + 1 } else { other }
}
