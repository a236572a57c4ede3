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

use crate::domain::BitString;

/// Symbol answered to [`Query::Extension`] when the value does not extend the prefix.
pub const NEITHER: u32 = 2;

/// A question the aggregator may ask a participant about its private value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    /// Does the value start with this prefix? Answered with 1 (yes) or 0 (no).
    Contains(BitString),
    /// Which bit follows this prefix in the value? Answered with 0, 1, or [`NEITHER`].
    Extension(BitString),
}

impl Query {
    /// Returns the number of symbols the answer is drawn from.
    pub fn symbols(&self) -> u32 {
        match self {
            Query::Contains(_) => 2,
            Query::Extension(_) => 3,
        }
    }

    /// Returns the prefix the query is about.
    pub fn prefix(&self) -> &BitString {
        match self {
            Query::Contains(prefix) | Query::Extension(prefix) => prefix,
        }
    }

    /// Returns the truthful answer for a participant holding `value`.
    pub fn true_symbol(&self, value: &BitString) -> u32 {
        match self {
            Query::Contains(prefix) => value.starts_with(prefix) as u32,
            Query::Extension(prefix) => {
                if value.starts_with(prefix) {
                    value.bit(prefix.len()).map_or(NEITHER, u32::from)
                } else {
                    NEITHER
                }
            }
        }
    }
}

/// Identity of a query within a run: the round it belongs to and the question itself.
///
/// The question carries the candidate prefix and, for binary queries, the extension bit.
/// Participants memoize answers by fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryFingerprint {
    round: u32,
    query: Query,
}

impl QueryFingerprint {
    /// Creates the fingerprint of `query` asked in `round`.
    pub fn new(round: u32, query: Query) -> Self {
        Self { round, query }
    }

    /// Returns the round.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Returns the query.
    pub fn query(&self) -> &Query {
        &self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> BitString {
        s.parse().unwrap()
    }

    #[test]
    fn contains_truth() {
        let value = bits("1101");
        assert_eq!(Query::Contains(bits("11")).true_symbol(&value), 1);
        assert_eq!(Query::Contains(bits("10")).true_symbol(&value), 0);
        assert_eq!(Query::Contains(BitString::root()).true_symbol(&value), 1);
        assert_eq!(Query::Contains(value).true_symbol(&value), 1);
    }

    #[test]
    fn extension_truth() {
        let value = bits("1101");
        assert_eq!(Query::Extension(BitString::root()).true_symbol(&value), 1);
        assert_eq!(Query::Extension(bits("11")).true_symbol(&value), 0);
        assert_eq!(Query::Extension(bits("110")).true_symbol(&value), 1);
        assert_eq!(Query::Extension(bits("10")).true_symbol(&value), NEITHER);
        // A full-length prefix has no extension.
        assert_eq!(Query::Extension(value).true_symbol(&value), NEITHER);
    }

    #[test]
    fn fingerprints_distinguish_rounds() {
        let query = Query::Contains(bits("01"));
        assert_ne!(QueryFingerprint::new(1, query), QueryFingerprint::new(2, query));
        assert_eq!(QueryFingerprint::new(1, query).query().prefix(), &bits("01"));
    }
}
