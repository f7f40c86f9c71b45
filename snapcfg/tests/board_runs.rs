// This file is part of snapcfg, an application to configure SNAP F-engine boards and their 10GbE destinations.
//
// Copyright 2025 The snapcfg developers.
//
// SPDX-License-Identifier: GPL-3.0-only
//
// snapcfg is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License version 3, as published by the Free Software Foundation.
//
// snapcfg is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranties of MERCHANTABILITY, SATISFACTORY QUALITY, or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with this program.  If not, see http://www.gnu.org/licenses/.

mod common;

use common::{FailAt, FakeBackend, test_data};
use googletest::prelude::*;
use rstest::*;
use snapcfg::configurator::RunOptions;
use snapcfg::run::{RunPlan, execute};

fn plan(layout: &str, filters: &[&str], options: RunOptions) -> RunPlan {
    RunPlan {
        layout_path: test_data(layout),
        filters: filters.iter().map(|f| f.to_string()).collect(),
        nchan_packet: None,
        options,
    }
}

#[gtest]
fn all_boards_configured_in_layout_order() {
    let backend = FakeBackend::new();
    let summary = execute(
        &plan("casm_feng_layout.yaml", &[], RunOptions::default()),
        &backend,
    )
    .expect("layout should load");

    let names: Vec<&str> = summary.results.iter().map(|r| r.name.as_str()).collect();
    expect_that!(names, eq(&vec!["snap01", "snap02"]));
    expect_true!(summary.all_succeeded());
    expect_that!(summary.exit_code(), eq(0));
    expect_that!(
        backend.calls(),
        eq(&vec![
            "open rpi-snap01",
            "configure rpi-snap01",
            "telemetry rpi-snap01",
            "close rpi-snap01",
            "open rpi-snap02",
            "configure rpi-snap02",
            "telemetry rpi-snap02",
            "close rpi-snap02",
        ])
    );
}

#[gtest]
#[rstest]
#[case::not_requested(false, 0)]
#[case::requested(true, 2)]
fn program_only_when_requested(#[case] program: bool, #[case] expected_programs: usize) {
    let backend = FakeBackend::new();
    let options = RunOptions {
        program,
        ..Default::default()
    };
    execute(&plan("casm_feng_layout.yaml", &[], options), &backend).expect("layout should load");

    let programs = backend
        .calls()
        .iter()
        .filter(|c| c.starts_with("program "))
        .count();
    expect_that!(programs, eq(expected_programs));
}

#[gtest]
#[rstest]
#[case::open(FailAt::Open, "ConnectionError", vec!["open rpi-snap01"])]
#[case::program(
    FailAt::Program,
    "ProgrammingError",
    vec!["open rpi-snap01", "program rpi-snap01", "close rpi-snap01"]
)]
#[case::configure(
    FailAt::Configure,
    "StreamConfigError",
    vec!["open rpi-snap01", "program rpi-snap01", "configure rpi-snap01", "close rpi-snap01"]
)]
fn failing_board_does_not_stop_the_run(
    #[case] fail_at: FailAt,
    #[case] kind: &str,
    #[case] expected_calls: Vec<&str>,
) {
    let backend = FakeBackend::new().failing("rpi-snap01", fail_at);
    let options = RunOptions {
        program: true,
        ..Default::default()
    };
    let summary =
        execute(&plan("casm_feng_layout.yaml", &[], options), &backend).expect("layout should load");

    expect_that!(summary.results.len(), eq(2));
    expect_false!(summary.results[0].succeeded());
    expect_that!(
        summary.results[0].error().map(|e| e.kind()),
        some(eq(kind))
    );
    expect_true!(summary.results[1].succeeded());
    expect_that!(summary.failures(), eq(1));
    expect_that!(summary.exit_code(), eq(1));

    let expected: Vec<String> = expected_calls.iter().map(|c| c.to_string()).collect();
    expect_that!(backend.calls_for("rpi-snap01"), eq(&expected));
    expect_that!(backend.calls_for("rpi-snap02").len(), eq(5));
}

#[gtest]
fn every_opened_session_is_closed_once() {
    let backend = FakeBackend::new()
        .failing("unreachable-snap02", FailAt::Open)
        .failing("notelemetry-snap03", FailAt::Telemetry)
        .failing("badstream-snap04", FailAt::Configure);
    let options = RunOptions {
        program: true,
        ..Default::default()
    };
    execute(&plan("helper_layout.yaml", &[], options), &backend).expect("layout should load");

    let calls = backend.calls();
    let opens = calls.iter().filter(|c| c.starts_with("open ")).count();
    let closes = calls.iter().filter(|c| c.starts_with("close ")).count();
    expect_that!(opens, eq(4));
    expect_that!(closes, eq(3));
    expect_that!(backend.calls_for("unreachable-snap02").len(), eq(1));
}

#[gtest]
fn missing_telemetry_still_counts_as_configured() {
    let backend = FakeBackend::new().failing("rpi-snap02", FailAt::Telemetry);
    let summary = execute(
        &plan("casm_feng_layout.yaml", &[], RunOptions::default()),
        &backend,
    )
    .expect("layout should load");

    expect_true!(summary.all_succeeded());
    expect_true!(summary.results[0].telemetry.is_some());
    expect_true!(summary.results[1].telemetry.is_none());
    expect_that!(
        summary.render(),
        contains_substring("| snap02 | rpi-snap02 | 1 | ok | - | - | - |")
    );
}

#[gtest]
fn close_failure_does_not_fail_the_board() {
    let backend = FakeBackend::new().failing("rpi-snap01", FailAt::Close);
    let summary = execute(
        &plan("casm_feng_layout.yaml", &[], RunOptions::default()),
        &backend,
    )
    .expect("layout should load");
    expect_true!(summary.all_succeeded());
}

#[gtest]
fn filters_select_by_host_or_source_ip() {
    let backend = FakeBackend::new();
    let summary = execute(
        &plan(
            "casm_feng_layout.yaml",
            &["192.168.0.57", "rpi-snap99"],
            RunOptions::default(),
        ),
        &backend,
    )
    .expect("layout should load");

    expect_that!(summary.results.len(), eq(1));
    expect_that!(summary.results[0].host.clone(), eq("rpi-snap02"));
    expect_that!(summary.unmatched.len(), eq(1));
    expect_that!(summary.exit_code(), eq(0));
    expect_that!(backend.calls_for("rpi-snap01").len(), eq(0));
    expect_that!(
        summary.render(),
        contains_substring("No board matches the requested address rpi-snap99")
    );
}

#[gtest]
fn each_board_receives_its_own_slice() {
    let backend = FakeBackend::new();
    execute(
        &plan("helper_layout.yaml", &[], RunOptions::default()),
        &backend,
    )
    .expect("layout should load");

    let configs = backend.configs.borrow();
    expect_that!(configs.len(), eq(4));
    for (feng_id, config) in configs.iter().enumerate() {
        let feng_id = feng_id as u32;
        expect_that!(config.feng_id, eq(feng_id));
        expect_that!(config.channels.start, eq(feng_id * 256));
        expect_that!(config.destinations.len(), eq(1));
        expect_that!(config.destinations[0].start_chan, eq(feng_id * 256));
        expect_that!(config.destinations[0].nchan, eq(256));
        expect_that!(config.nchan_packet, eq(128));
        expect_that!(config.macs.len(), eq(2));
    }
}

#[gtest]
fn nchan_packet_override_reaches_the_board() {
    let backend = FakeBackend::new();
    let mut plan = plan("helper_layout.yaml", &["rpi-snap01"], RunOptions::default());
    plan.nchan_packet = Some(64);
    execute(&plan, &backend).expect("layout should load");

    let configs = backend.configs.borrow();
    expect_that!(configs.len(), eq(1));
    expect_that!(configs[0].nchan_packet, eq(64));
}

#[gtest]
fn invalid_override_fails_before_any_board_is_touched() {
    let backend = FakeBackend::new();
    let mut plan = plan("helper_layout.yaml", &[], RunOptions::default());
    plan.nchan_packet = Some(100);
    let res = execute(&plan, &backend);

    expect_that!(
        res.map(|s| s.results.len()),
        err(displays_as(contains_substring("does not evenly divide")))
    );
    expect_that!(backend.calls().len(), eq(0));
}

#[gtest]
fn uncovered_board_outside_the_filter_is_ignored() {
    let backend = FakeBackend::new();
    let summary = execute(
        &plan("uncovered_slice.yaml", &["rpi-snap01"], RunOptions::default()),
        &backend,
    )
    .expect("layout should load");

    expect_that!(summary.results.len(), eq(1));
    expect_true!(summary.all_succeeded());
    expect_that!(summary.exit_code(), eq(0));
}

#[gtest]
fn uncovered_board_fails_alone_without_a_session() {
    let backend = FakeBackend::new();
    let summary = execute(
        &plan("uncovered_slice.yaml", &[], RunOptions::default()),
        &backend,
    )
    .expect("layout should load");

    expect_true!(summary.results[0].succeeded());
    expect_that!(
        summary.results[1].error().map(|e| e.kind()),
        some(eq("ConfigError"))
    );
    expect_that!(summary.exit_code(), eq(1));
    expect_that!(backend.calls_for("rpi-snap02").len(), eq(0));
}
