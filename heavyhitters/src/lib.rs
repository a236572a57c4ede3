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

//! Heavy-hitter discovery under local differential privacy.
//!
//! A population of participants each holds one private value, an `m`-bit string. The
//! [`Aggregator`](aggregator::Aggregator) finds the values held by at least a fraction θ of the
//! population while only ever seeing randomized responses: each participant answers through
//! randomized response and spends at most its privacy budget ε per run.
//!
//! The crate is organised along the protocol:
//!
//! * [`mechanism`]: k-ary randomized response.
//! * [`participant`]: participants, the questions they answer, and their response caches.
//! * [`partition`]: disjoint random assignment of participants to candidates.
//! * [`estimator`]: debiasing of vote counts with confidence intervals.
//! * [`search`]: the level-by-level prefix-tree search.
//! * [`aggregator`]: configuration, population management, and reports.
//!
//! # Examples
//!
//! ```
//! # use heavyhitters::aggregator::Aggregator;
//! # use heavyhitters::domain::BitString;
//! # use heavyhitters::participant::Participant;
//! let mut aggregator = Aggregator::builder()
//!     .bit_length(3)
//!     .epsilon(2.0)
//!     .sample_size(200)
//!     .threshold(0.5)
//!     .seed(1)
//!     .build()
//!     .unwrap();
//! let value: BitString = "101".parse().unwrap();
//! aggregator
//!     .subscribe_all((0..2000).map(|id| Participant::new(id, value, 2.0).unwrap()))
//!     .unwrap();
//!
//! let estimate = aggregator.query(&value, 1000).unwrap();
//! assert!(estimate.frequency() > 0.8);
//! ```
//!
//! # Features
//!
//! * `rayon`: participants of a group answer in parallel. Results do not change, since every
//!   participant draws from its own random stream.

pub mod aggregator;
pub mod common;
pub mod domain;
pub mod error;
pub mod estimator;
pub mod mechanism;
pub mod participant;
pub mod partition;
pub mod search;
