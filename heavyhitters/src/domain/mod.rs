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

//! The value domain: fixed-length bit strings.
//!
//! A domain of bit length `m` holds `2^m` values. Values are never enumerated; the search walks
//! the binary prefix tree instead, one bit per level.
//!
//! ```
//! # use heavyhitters::domain::BitString;
//! # use heavyhitters::domain::Domain;
//! let domain = Domain::new(4).unwrap();
//! let value: BitString = "1011".parse().unwrap();
//! assert!(domain.contains(&value));
//! assert!(value.starts_with(&"10".parse().unwrap()));
//! ```

mod bit_string;

pub use self::bit_string::BitString;
pub use self::bit_string::MAX_BIT_LENGTH;

use crate::error::Error;

/// A domain of bit strings of one fixed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    bit_length: u8,
}

impl Domain {
    /// Creates a domain of `bit_length`-bit values.
    ///
    /// Returns [`ErrorKind::InvalidDomain`](crate::error::ErrorKind::InvalidDomain) unless
    /// `bit_length` is in `1..=64`.
    pub fn new(bit_length: u32) -> Result<Self, Error> {
        if bit_length == 0 || bit_length > MAX_BIT_LENGTH as u32 {
            return Err(Error::invalid_domain(format!(
                "bit length must be in [1, {MAX_BIT_LENGTH}], got {bit_length}"
            )));
        }
        Ok(Self {
            bit_length: bit_length as u8,
        })
    }

    /// Returns the bit length `m` of the values.
    pub fn bit_length(&self) -> u8 {
        self.bit_length
    }

    /// Returns true if `value` is a full-length value of this domain.
    pub fn contains(&self, value: &BitString) -> bool {
        value.len() == self.bit_length
    }

    /// Returns an error unless `value` belongs to this domain.
    pub fn check(&self, value: &BitString) -> Result<(), Error> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(Error::invalid_domain(format!(
                "expected a {}-bit value, got {} bits",
                self.bit_length,
                value.len()
            )))
        }
    }

    /// Returns true if `prefix` can be extended to a value of this domain.
    pub fn admits_prefix(&self, prefix: &BitString) -> bool {
        prefix.len() <= self.bit_length
    }
}
