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

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Longest bit string that can be represented.
pub const MAX_BIT_LENGTH: u8 = 64;

/// A bit string of at most [`MAX_BIT_LENGTH`] bits, most significant bit first.
///
/// Bit strings are both domain values (length `m`) and candidate prefixes (length `ℓ ≤ m`).
/// They order by length first and then lexicographically, which for equal lengths is the
/// numeric order of [`BitString::bits`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitString {
    len: u8,
    bits: u64,
}

impl BitString {
    /// Returns the empty string, the root of the prefix tree.
    pub const fn root() -> Self {
        Self { len: 0, bits: 0 }
    }

    /// Creates a bit string holding the `len` low-order bits of `bits`.
    ///
    /// Returns an error if `len` exceeds [`MAX_BIT_LENGTH`] or `bits` has bits set above `len`.
    pub fn new(bits: u64, len: u8) -> Result<Self, Error> {
        if len > MAX_BIT_LENGTH {
            return Err(Error::invalid_argument(format!(
                "bit string length must be at most {MAX_BIT_LENGTH}, got {len}"
            )));
        }
        if bits & !mask(len) != 0 {
            return Err(Error::invalid_argument(format!(
                "value {bits:#x} does not fit in {len} bits"
            )));
        }
        Ok(Self { len, bits })
    }

    /// Creates a bit string from the `len` low-order bits of `bits`, ignoring higher bits.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds [`MAX_BIT_LENGTH`].
    pub fn from_low_bits(bits: u64, len: u8) -> Self {
        assert!(
            len <= MAX_BIT_LENGTH,
            "bit string length must be at most {MAX_BIT_LENGTH}, got {len}"
        );
        Self {
            len,
            bits: bits & mask(len),
        }
    }

    /// Returns the number of bits.
    pub fn len(&self) -> u8 {
        self.len
    }

    /// Returns true for the empty string.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the bits as an integer, first bit most significant.
    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Returns the bit at `index`, counting from the first (most significant) bit.
    pub fn bit(&self, index: u8) -> Option<u8> {
        if index >= self.len {
            return None;
        }
        Some(((self.bits >> (self.len - 1 - index)) & 1) as u8)
    }

    /// Returns this string extended by one bit.
    ///
    /// # Panics
    ///
    /// Panics if `bit` is not 0 or 1, or if the string already has [`MAX_BIT_LENGTH`] bits.
    pub fn child(&self, bit: u8) -> Self {
        assert!(bit <= 1, "bit must be 0 or 1, got {bit}");
        assert!(
            self.len < MAX_BIT_LENGTH,
            "cannot extend a bit string of length {MAX_BIT_LENGTH}"
        );
        Self {
            len: self.len + 1,
            bits: (self.bits << 1) | bit as u64,
        }
    }

    /// Returns the first `len` bits, or `None` if this string is shorter.
    pub fn prefix(&self, len: u8) -> Option<Self> {
        if len > self.len {
            return None;
        }
        if len == 0 {
            return Some(Self::root());
        }
        Some(Self {
            len,
            bits: self.bits >> (self.len - len),
        })
    }

    /// Returns the string without its last bit, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        self.len.checked_sub(1).and_then(|len| self.prefix(len))
    }

    /// Returns true if `prefix` is a prefix of this string (every string starts with the root).
    pub fn starts_with(&self, prefix: &BitString) -> bool {
        self.prefix(prefix.len) == Some(*prefix)
    }
}

fn mask(len: u8) -> u64 {
    if len >= MAX_BIT_LENGTH {
        u64::MAX
    } else {
        (1u64 << len) - 1
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in 0..self.len {
            let digit = if (self.bits >> (self.len - 1 - index)) & 1 == 1 {
                '1'
            } else {
                '0'
            };
            fmt::Write::write_char(f, digit)?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitString(\"{self}\")")
    }
}

impl FromStr for BitString {
    type Err = Error;

    /// Parses a string of `0` and `1` characters, first character most significant.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > MAX_BIT_LENGTH as usize {
            return Err(Error::invalid_argument(format!(
                "bit string length must be at most {MAX_BIT_LENGTH}, got {}",
                s.len()
            )));
        }
        let mut value = Self::root();
        for c in s.chars() {
            let bit = match c {
                '0' => 0,
                '1' => 1,
                other => {
                    return Err(Error::invalid_argument(format!(
                        "bit strings contain only '0' and '1', got {other:?}"
                    )));
                }
            };
            value = value.child(bit);
        }
        Ok(value)
    }
}
