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

//! Debiasing of randomized-response vote counts.
//!
//! # Overview
//!
//! If a fraction `f` of a sample truly holds a symbol, k-ary randomized response reports it at
//! the rate `r = f p + (1 - f) q`, where `p` is the keep probability and `q = (1 - p) / (k - 1)`.
//! Inverting gives the unbiased estimator
//!
//! ```text
//! f̂ = (r̂ - q) / (p - q)
//! ```
//!
//! which for binary responses is the familiar `(r̂ - (1 - p)) / (2p - 1)`.
//!
//! # Accuracy
//!
//! The standard error of `f̂` is `sqrt(r̂ (1 - r̂) / n) / (p - q)`. It grows without bound as
//! `p - q` shrinks, that is as ε goes to zero. The confidence interval is
//! `f̂ ± z · se` for `z` given by [`NumStdDev`], clamped into `[0, 1]`.
//!
//! The point estimate is clamped into `[0, 1]` too. Raw debiased values routinely fall outside
//! that range for rare symbols; clamping loses that information, which is kept in
//! [`Estimate::raw`].
//!
//! # Examples
//!
//! ```
//! # use heavyhitters::common::NumStdDev;
//! # use heavyhitters::estimator::FrequencyEstimator;
//! # use heavyhitters::mechanism::keep_probability;
//! let estimator = FrequencyEstimator::new(NumStdDev::Two);
//! let p = keep_probability(1.0, 2);
//! // 10_000 answers, of which 3_500 said "yes".
//! let estimate = estimator.estimate(3_500, 10_000, p, 2).unwrap();
//! assert!(estimate.lower_bound() <= estimate.frequency());
//! assert!(estimate.frequency() <= estimate.upper_bound());
//! ```

use crate::common::NumStdDev;
use crate::error::Error;
use crate::mechanism::keep_probability;

/// A debiased frequency estimate with its confidence interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    frequency: f64,
    raw: f64,
    standard_error: f64,
    lower_bound: f64,
    upper_bound: f64,
    sample_size: u64,
}

impl Estimate {
    /// Returns the point estimate, clamped into `[0, 1]`.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Returns the unclamped debiased value.
    pub fn raw(&self) -> f64 {
        self.raw
    }

    /// Returns the estimated standard error of the debiased value.
    pub fn standard_error(&self) -> f64 {
        self.standard_error
    }

    /// Returns the lower end of the confidence interval.
    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    /// Returns the upper end of the confidence interval.
    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    /// Returns `(lower_bound, upper_bound)`.
    pub fn confidence_interval(&self) -> (f64, f64) {
        (self.lower_bound, self.upper_bound)
    }

    /// Returns the number of answers the estimate is based on.
    pub fn sample_size(&self) -> u64 {
        self.sample_size
    }
}

/// Turns vote counts into debiased frequency estimates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrequencyEstimator {
    num_std_dev: NumStdDev,
}

impl FrequencyEstimator {
    /// Creates an estimator whose intervals span `num_std_dev` standard errors on each side.
    pub fn new(num_std_dev: NumStdDev) -> Self {
        Self { num_std_dev }
    }

    /// Returns the interval width setting.
    pub fn num_std_dev(&self) -> NumStdDev {
        self.num_std_dev
    }

    /// Estimates the frequency of a symbol reported `votes` times out of `sample_size` answers
    /// drawn with `k`-ary randomized response of keep probability `keep_probability`.
    ///
    /// Returns [`ErrorKind::InsufficientPopulation`](crate::error::ErrorKind::InsufficientPopulation)
    /// for an empty sample and [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
    /// if `votes > sample_size`, `k < 2`, or `keep_probability` carries no signal
    /// (`keep_probability <= 1 / k`).
    pub fn estimate(
        &self,
        votes: u64,
        sample_size: u64,
        keep_probability: f64,
        k: u32,
    ) -> Result<Estimate, Error> {
        if sample_size == 0 {
            return Err(Error::insufficient_population(1, 0));
        }
        if votes > sample_size {
            return Err(Error::invalid_argument(format!(
                "{votes} votes exceed the sample size {sample_size}"
            )));
        }
        if k < 2 {
            return Err(Error::invalid_argument(format!(
                "randomized response needs at least 2 symbols, got {k}"
            )));
        }
        let q = (1.0 - keep_probability) / (k - 1) as f64;
        let signal = keep_probability - q;
        if !(signal > 0.0 && keep_probability <= 1.0) {
            return Err(Error::invalid_argument(format!(
                "keep probability {keep_probability} carries no signal for {k} symbols"
            )));
        }

        let n = sample_size as f64;
        let rate = votes as f64 / n;
        let raw = (rate - q) / signal;
        let standard_error = (rate * (1.0 - rate) / n).sqrt() / signal;
        let half_width = self.num_std_dev.multiplier() * standard_error;
        Ok(Estimate {
            frequency: raw.clamp(0.0, 1.0),
            raw,
            standard_error,
            lower_bound: (raw - half_width).clamp(0.0, 1.0),
            upper_bound: (raw + half_width).clamp(0.0, 1.0),
            sample_size,
        })
    }

    /// Same as [`FrequencyEstimator::estimate`], with the keep probability derived from the
    /// budget slice `epsilon` each answer was drawn with.
    pub fn estimate_for_budget(
        &self,
        votes: u64,
        sample_size: u64,
        epsilon: f64,
        k: u32,
    ) -> Result<Estimate, Error> {
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(Error::invalid_budget(format!(
                "budget slice must be positive and finite, got {epsilon}"
            )));
        }
        self.estimate(votes, sample_size, keep_probability(epsilon, k.max(2)), k)
    }
}
