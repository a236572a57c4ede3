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

//! Participants and the questions they answer.
//!
//! A [`Participant`] holds one private [`BitString`](crate::domain::BitString) and a privacy
//! budget ε for the whole run. It only ever releases randomized responses to [`Query`]s, and it
//! answers a repeated [`QueryFingerprint`] from its cache.
//!
//! # Examples
//!
//! ```
//! # use heavyhitters::participant::Participant;
//! # use heavyhitters::participant::Query;
//! # use heavyhitters::participant::QueryFingerprint;
//! # use rand::SeedableRng;
//! let participant = Participant::new(7, "0110".parse().unwrap(), 1.0).unwrap();
//! let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
//! let fingerprint = QueryFingerprint::new(0, Query::Contains("01".parse().unwrap()));
//!
//! let first = participant.answer(fingerprint, 1.0, &mut rng).unwrap();
//! let again = participant.answer(fingerprint, 1.0, &mut rng).unwrap();
//! assert_eq!(first, again);
//! assert_eq!(participant.spent_budget(), 1.0);
//! ```

mod client;
mod query;
mod source;

pub use self::client::Participant;
pub use self::query::NEITHER;
pub use self::query::Query;
pub use self::query::QueryFingerprint;
pub use self::source::FixedValue;
pub use self::source::UniformValues;
pub use self::source::ValueSource;
