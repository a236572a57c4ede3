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

use rand::Rng;

use crate::domain::BitString;
use crate::domain::Domain;

/// Supplies the private value of a participant when it is created.
///
/// The protocol never depends on how values were generated; this is the seam where an
/// application plugs in its own distribution.
pub trait ValueSource {
    /// Draws one value.
    fn sample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> BitString;
}

/// Always yields the same value.
#[derive(Debug, Clone, Copy)]
pub struct FixedValue(pub BitString);

impl ValueSource for FixedValue {
    fn sample<R: Rng + ?Sized>(&mut self, _rng: &mut R) -> BitString {
        self.0
    }
}

/// Yields values uniformly at random from a domain.
#[derive(Debug, Clone, Copy)]
pub struct UniformValues {
    domain: Domain,
}

impl UniformValues {
    /// Creates a uniform source over `domain`.
    pub fn new(domain: Domain) -> Self {
        Self { domain }
    }
}

impl ValueSource for UniformValues {
    fn sample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> BitString {
        let len = self.domain.bit_length();
        BitString::from_low_bits(rng.random::<u64>(), len)
    }
}
