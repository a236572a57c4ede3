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

//! Types shared by the protocol components.

mod cancel;
mod random;

pub use self::cancel::CancellationToken;
pub use self::random::RandomSource;
pub use self::random::StreamSeed;

/// Width of a confidence interval, in standard errors of the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumStdDev {
    /// About 68.3% normal coverage.
    One,
    /// About 95.4% normal coverage.
    Two,
    /// About 99.7% normal coverage.
    #[default]
    Three,
}

impl NumStdDev {
    /// Returns the number of standard errors as a multiplier.
    pub fn multiplier(self) -> f64 {
        match self {
            NumStdDev::One => 1.0,
            NumStdDev::Two => 2.0,
            NumStdDev::Three => 3.0,
        }
    }
}
