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

//! Turning command-line flags into run options, and logger setup.

use crate::Cli;
use log::LevelFilter;
use snapcfg::config::startup::{StartupOptions, parse_log_level};
use snapcfg::control::helper::HelperBackend;
use snapcfg::error::SnapError;
use std::path::PathBuf;

/// The command-line layer of the run options. Flags that were not given stay `None` so the
/// startup file can fill them in.
pub(crate) fn from_cli(cli: &Cli) -> StartupOptions {
    StartupOptions {
        nchan_packet: cli.nchan_packet,
        log_level: cli.log_level.clone(),
        program: cli.program.then_some(true),
        programmed: cli.programmed.then_some(true),
        test_mode: cli.test_mode.clone(),
        fft_shift: cli.fft_shift,
        eq_coeffs: cli.eq_coeffs,
        adc_gain: cli.adc_gain,
        sw_sync: cli.hw_sync.then_some(false),
        enable_tx: cli.no_tx.then_some(false),
    }
}

/// Layout path and address filters for this run. The positional layout beats the startup
/// file's `layout_yaml`; any `--ip` replaces the startup file's `ips` list as a whole.
pub(crate) fn run_targets(
    cli: &Cli,
    startup_layout: Option<PathBuf>,
    startup_ips: Vec<String>,
) -> (Option<PathBuf>, Vec<String>) {
    let layout = cli.layout_yaml.clone().or(startup_layout);
    let filters = if cli.ips.is_empty() {
        startup_ips
    } else {
        cli.ips.clone()
    };
    (layout, filters)
}

/// With `--helper-arg` the helper program is used as given, so its path may contain spaces.
pub(crate) fn helper_backend(cli: &Cli) -> Result<HelperBackend, SnapError> {
    if cli.helper_args.is_empty() {
        HelperBackend::from_command_line(&cli.helper)
    } else {
        Ok(HelperBackend::new(cli.helper.clone(), cli.helper_args.clone()))
    }
}

/// Initialise `env_logger`, honouring `RUST_LOG` (default `info`) unless `level` is given.
pub(crate) fn init_logging(level: Option<LevelFilter>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.init();
}

pub(crate) fn parse_level_name(value: &str) -> Result<String, String> {
    parse_log_level(value)
        .map(|_| value.to_string())
        .map_err(|e| e.to_string())
}

/// Decimal or `0x`-prefixed hexadecimal.
pub(crate) fn parse_u32(value: &str) -> Result<u32, String> {
    let value = value.trim();
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| format!("'{value}' is not a valid number: {e}"))
}
