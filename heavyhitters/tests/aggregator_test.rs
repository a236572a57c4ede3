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

mod common;

use common::bits;
use common::population;
use googletest::prelude::*;
use heavyhitters::aggregator::Aggregator;
use heavyhitters::common::CancellationToken;
use heavyhitters::error::ErrorKind;
use heavyhitters::mechanism::PrivacyMechanism;
use heavyhitters::participant::Participant;

const V: &str = "1011011001011100";

fn scenario_aggregator(participants: Vec<Participant>) -> Aggregator {
    let mut aggregator = Aggregator::builder()
        .bit_length(16)
        .epsilon(1.0)
        .sample_size(2000)
        .threshold(0.02)
        .seed(42)
        .build()
        .unwrap();
    aggregator.subscribe_all(participants).unwrap();
    aggregator
}

#[test]
fn test_query_round_trip() {
    let mut aggregator = scenario_aggregator(population(16, 1.0, &[(bits(V), 10_000)], 10_000, 1));
    let estimate = aggregator.query(&bits(V), 5000).unwrap();
    assert_that!(estimate.frequency(), ge(0.95));
    assert_that!(estimate.lower_bound(), le(estimate.frequency()));
    assert_that!(estimate.upper_bound(), ge(estimate.frequency()));
    assert_eq!(estimate.sample_size(), 5000);
}

#[test]
fn test_query_of_absent_value() {
    let mut aggregator = scenario_aggregator(population(16, 1.0, &[], 10_000, 2));
    let estimate = aggregator.query(&bits(V), 5000).unwrap();
    assert_that!(estimate.frequency(), near(0.0, 0.06));
    assert_that!(estimate.lower_bound(), eq(0.0));
}

#[test]
fn test_query_needs_enough_participants() {
    let mut aggregator = scenario_aggregator(population(16, 1.0, &[], 100, 3));
    let err = aggregator.query(&bits(V), 101).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientPopulation);

    let err = aggregator.query(&bits(V), 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    let err = aggregator.query(&bits("101"), 10).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidDomain);
}

#[test]
fn test_repeated_query_repeats_answers() {
    // With the whole population sampled twice, every participant answers the same question
    // twice and must repeat itself.
    let mut aggregator = scenario_aggregator(population(16, 1.0, &[(bits(V), 300)], 1000, 4));
    let first = aggregator.query(&bits(V), 1000).unwrap();
    let second = aggregator.query(&bits(V), 1000).unwrap();
    assert_eq!(first, second);
    assert!(aggregator.participants().iter().all(|p| p.answered() == 1));
}

#[test]
fn test_subscribe_checks_domain() {
    let mut aggregator = scenario_aggregator(Vec::new());
    let err = aggregator
        .subscribe(Participant::new(0, bits("1011"), 1.0).unwrap())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidDomain);
    assert_eq!(aggregator.population(), 0);
}

#[test]
fn test_subscribe_checks_budget() {
    let mut aggregator = Aggregator::builder()
        .bit_length(4)
        .epsilon(2.0)
        .build()
        .unwrap();
    let err = aggregator
        .subscribe_all(population(4, 1.0, &[(bits("1010"), 5000)], 5000, 13))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidBudget);
    insta::assert_snapshot!(
        err.to_string(),
        @"InvalidBudget, context: { participant: 0 } => budget slice 2 exceeds the total budget 1"
    );
    assert_eq!(aggregator.population(), 0);

    // Split over two rounds, each answer costs 1.0.
    let mut split = Aggregator::builder()
        .bit_length(4)
        .epsilon(2.0)
        .rounds_per_participant(2)
        .build()
        .unwrap();
    split.subscribe_all(population(4, 1.0, &[], 100, 14)).unwrap();
    assert_eq!(split.population(), 100);
}

#[test]
fn test_run_needs_enough_participants() {
    let mut aggregator = scenario_aggregator(population(16, 1.0, &[], 1000, 5));
    let err = aggregator.run().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientPopulation);
    insta::assert_snapshot!(
        err.to_string(),
        @"InsufficientPopulation, context: { depth: 0 } => need 2000 participants with budget left, 1000 available"
    );

    let mut empty = scenario_aggregator(Vec::new());
    assert_eq!(
        empty.run().unwrap_err().kind(),
        ErrorKind::InsufficientPopulation
    );
}

#[test]
fn test_uniform_population_reports_nothing() {
    let mut aggregator = Aggregator::builder()
        .bit_length(12)
        .sample_size(1000)
        .threshold(0.3)
        .seed(6)
        .build()
        .unwrap();
    aggregator
        .subscribe_all(population(12, 1.0, &[], 30_000, 6))
        .unwrap();
    let report = aggregator.run().unwrap();
    assert!(report.is_empty());
    assert_eq!(report.population(), 30_000);
}

#[test]
fn test_cancelled_run() {
    let token = CancellationToken::new();
    let mut aggregator = Aggregator::builder()
        .bit_length(8)
        .sample_size(100)
        .threshold(0.1)
        .cancellation(token.clone())
        .build()
        .unwrap();
    aggregator
        .subscribe_all(population(8, 1.0, &[(bits("10101010"), 500)], 5000, 7))
        .unwrap();

    token.cancel();
    let err = aggregator.run().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}

#[test]
fn test_cancel_from_observer() {
    let token = CancellationToken::new();
    let mut aggregator = Aggregator::builder()
        .bit_length(8)
        .sample_size(100)
        .threshold(0.1)
        .seed(8)
        .cancellation(token.clone())
        .build()
        .unwrap();
    aggregator
        .subscribe_all(population(8, 1.0, &[(bits("10101010"), 2500)], 5000, 8))
        .unwrap();

    let mut levels = 0;
    let err = aggregator
        .run_with(|summary| {
            levels += 1;
            if summary.depth() == 3 {
                token.cancel();
            }
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(levels, 3);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let participants = || population(10, 1.0, &[(bits("1100110011"), 6000)], 40_000, 9);
    let build = || {
        Aggregator::builder()
            .bit_length(10)
            .sample_size(800)
            .threshold(0.05)
            .target_count(1)
            .seed(10)
            .build()
            .unwrap()
    };
    let mut first = build();
    first.subscribe_all(participants()).unwrap();
    let mut second = build();
    second.subscribe_all(participants()).unwrap();

    let report = first.run().unwrap();
    assert_eq!(report, second.run().unwrap());
    assert_eq!(report.hitters()[0].value(), &bits("1100110011"));
}

#[test]
fn test_observer_sees_every_level() {
    let value = bits("0110100110");
    let mut aggregator = Aggregator::builder()
        .bit_length(10)
        .sample_size(800)
        .threshold(0.05)
        .target_count(1)
        .mechanism(PrivacyMechanism::BinaryRandomizedResponse)
        .seed(11)
        .build()
        .unwrap();
    aggregator
        .subscribe_all(population(10, 1.0, &[(value, 8000)], 40_000, 11))
        .unwrap();

    let mut depths = Vec::new();
    let report = aggregator
        .run_with(|summary| depths.push(summary.depth()))
        .unwrap();
    assert_eq!(depths, (1..=10).collect::<Vec<u8>>());
    assert_eq!(report.levels().len(), 10);
    let hitter = report.get(&value).unwrap();
    assert_that!(hitter.frequency(), near(0.2, 0.05));
    assert_that!(hitter.lower_bound(), le(0.2));
    assert_that!(hitter.upper_bound(), ge(0.2));
}

#[test]
fn test_budget_is_never_exceeded() {
    let mut aggregator = Aggregator::builder()
        .bit_length(8)
        .epsilon(3.0)
        .sample_size(500)
        .threshold(0.1)
        .target_count(1)
        .rounds_per_participant(3)
        .seed(12)
        .build()
        .unwrap();
    aggregator
        .subscribe_all(population(8, 3.0, &[(bits("11110000"), 2500)], 5000, 12))
        .unwrap();

    let report = aggregator.run().unwrap();
    assert!(report.get(&bits("11110000")).is_some());
    for participant in aggregator.participants() {
        assert!(participant.answered() <= 3);
        assert_that!(participant.spent_budget(), le(3.0 + 1e-9));
    }
    assert!(aggregator.participants().iter().any(|p| p.answered() > 1));
}
