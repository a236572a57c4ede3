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

//! Local privacy mechanism.
//!
//! # Overview
//!
//! Every answer a participant releases goes through k-ary randomized response: the true
//! symbol is reported with probability `p = e^ε / (e^ε + k - 1)` and any other symbol with
//! probability `(1 - p) / (k - 1)`. The ratio between the probabilities of any output under two
//! different true symbols is therefore at most `p / ((1 - p) / (k - 1)) = e^ε`, which is the
//! ε-local differential privacy guarantee.
//!
//! [`PrivacyMechanism`] selects how a level of the prefix-tree search is asked:
//!
//! * [`PrivacyMechanism::BinaryRandomizedResponse`] asks each participant a single yes/no
//!   question about one extension bit (`k = 2`). A candidate's participants are split in two
//!   halves, one per bit.
//! * [`PrivacyMechanism::KaryRandomizedResponse`] asks each participant which extension its value
//!   takes, if any (`k = 3`: bit 0, bit 1, neither). Every participant informs both children.
//!
//! Both spend exactly one budget slice per participant and round.
//!
//! # Examples
//!
//! ```
//! # use heavyhitters::mechanism::keep_probability;
//! # use heavyhitters::mechanism::output_probability;
//! let epsilon = 1.0_f64;
//! let p = keep_probability(epsilon, 2);
//! let ratio = output_probability(0, 0, epsilon, 2) / output_probability(1, 0, epsilon, 2);
//! assert!(ratio <= epsilon.exp() + 1e-12);
//! assert!(p > 0.5);
//! ```

mod randomized_response;

pub use self::randomized_response::keep_probability;
pub use self::randomized_response::output_probability;
pub use self::randomized_response::respond;

/// How participants are asked about the extensions of a candidate prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrivacyMechanism {
    /// One binary question per participant, about a single extension bit.
    BinaryRandomizedResponse,
    /// One three-symbol question per participant: extends with 0, with 1, or neither.
    #[default]
    KaryRandomizedResponse,
}

impl PrivacyMechanism {
    /// Returns the number of symbols a level question is answered with.
    pub fn level_symbols(&self) -> u32 {
        match self {
            PrivacyMechanism::BinaryRandomizedResponse => 2,
            PrivacyMechanism::KaryRandomizedResponse => 3,
        }
    }
}
