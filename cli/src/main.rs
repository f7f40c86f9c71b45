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

//! `snapcfg` - configure multiple SNAP boards from a YAML layout.
//!
//! ```bash
//! # configure every board in the layout, loading the bitstream first
//! snapcfg configs/casm_feng_layout.yaml --program
//!
//! # only two boards, 256 channels per packet
//! snapcfg configs/casm_feng_layout.yaml --ip 192.168.0.56 rpi-snap02 --nchan-packet 256
//!
//! # standard bring-up recorded in a startup file
//! snapcfg --startup configs/snap_startup.yaml
//!
//! # check what would be sent without touching hardware
//! snapcfg configs/casm_feng_layout.yaml --dry-run --log-level DEBUG
//! ```
//!
//! # Exit status
//!
//! - `0` - every selected board was configured
//! - `1` - at least one board failed
//! - `2` - the startup or layout file could not be used
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - logging filter used when `--log-level` is not given. Defaults to `info`

mod options;

use clap::Parser;
use log::{debug, error};
use snapcfg::config::DEFAULT_HELPER;
use snapcfg::config::startup::{StartupConfig, parse_log_level, startup_from_file};
use snapcfg::control::ControlBackend;
use snapcfg::control::dry_run::DryRunBackend;
use snapcfg::run::{RunPlan, execute};
use std::path::PathBuf;
use std::process::ExitCode;

const EXIT_USAGE: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "snapcfg")]
#[command(bin_name = "snapcfg")]
#[command(about = "Configure multiple CASM SNAP boards from a YAML layout")]
pub(crate) struct Cli {
    /// Board/NIC/frequency layout file (YAML)
    layout_yaml: Option<PathBuf>,

    #[arg(
        long,
        help = r#"Startup file naming the layout, address filters and run options.
Options given on the command line take precedence over the file."#
    )]
    startup: Option<PathBuf>,

    /// Only configure boards whose host or source IP is listed
    #[arg(long = "ip", num_args = 1.., value_name = "ADDR")]
    ips: Vec<String>,

    /// Number of frequency channels per UDP packet, overriding the layout
    #[arg(long, alias = "nchan_packet")]
    nchan_packet: Option<u32>,

    /// Load the bitstream named by `common.fpgfile` before configuring
    #[arg(long, conflicts_with = "programmed")]
    program: bool,

    /// Boards already carry the bitstream; never program them
    #[arg(long)]
    programmed: bool,

    /// DEBUG, INFO, WARNING or ERROR
    #[arg(long, alias = "log_level", value_parser = options::parse_level_name)]
    log_level: Option<String>,

    /// Log what would be done without contacting any board
    #[arg(long)]
    dry_run: bool,

    #[arg(
        long,
        default_value = DEFAULT_HELPER,
        help = r#"Helper command wrapping the hardware-control library, split on whitespace.
When --helper-arg is given, this is taken verbatim as the program path."#
    )]
    helper: String,

    /// Argument passed to the helper before its command, may be repeated
    #[arg(long = "helper-arg", value_name = "ARG", allow_hyphen_values = true)]
    helper_args: Vec<String>,

    /// Test vector mode passed to the F-engine
    #[arg(long, alias = "test_mode")]
    test_mode: Option<String>,

    /// FFT shift schedule, decimal or 0x-prefixed hex
    #[arg(long, alias = "fft_shift", value_parser = options::parse_u32)]
    fft_shift: Option<u32>,

    /// Equalizer coefficient applied to every channel
    #[arg(long, alias = "eq_coeffs")]
    eq_coeffs: Option<f64>,

    /// ADC coarse gain
    #[arg(long, alias = "adc_gain", value_parser = options::parse_u32)]
    adc_gain: Option<u32>,

    /// Synchronise on the external PPS instead of a software sync
    #[arg(long)]
    hw_sync: bool,

    /// Configure streaming but leave transmission disabled
    #[arg(long)]
    no_tx: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let startup = match cli.startup.as_deref().map(startup_from_file).transpose() {
        Ok(startup) => startup.unwrap_or_default(),
        Err(e) => {
            options::init_logging(cli.log_level.as_deref().and_then(|l| parse_log_level(l).ok()));
            error!("Failed to read startup file: {e}");
            return ExitCode::from(EXIT_USAGE);
        }
    };
    let StartupConfig {
        layout_yaml,
        ips,
        options: file_options,
    } = startup;

    let run_options = options::from_cli(&cli).merge(file_options);
    match run_options.log_filter() {
        Ok(level) => options::init_logging(level),
        Err(e) => {
            options::init_logging(None);
            error!("{e}");
            return ExitCode::from(EXIT_USAGE);
        }
    }
    debug!("parsed cli command with {cli:?}");

    let (layout_path, filters) = options::run_targets(&cli, layout_yaml, ips);
    let Some(layout_path) = layout_path else {
        error!("No layout file given, pass one as an argument or set `layout_yaml` in --startup");
        return ExitCode::from(EXIT_USAGE);
    };
    let plan = RunPlan::new(layout_path, filters, &run_options);
    debug!("Run plan: {plan:?}");

    let backend: Box<dyn ControlBackend> = if cli.dry_run {
        Box::new(DryRunBackend)
    } else {
        match options::helper_backend(&cli) {
            Ok(helper) => Box::new(helper),
            Err(e) => {
                error!("{e}");
                return ExitCode::from(EXIT_USAGE);
            }
        }
    };

    let summary = match execute(&plan, backend.as_ref()) {
        Ok(summary) => summary,
        Err(e) => {
            error!("Failed to load layout {:?}: {e}", plan.layout_path);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    if let Err(e) = summary.write_to(&mut std::io::stdout()) {
        error!("Failed to print status summary: {e}");
    }
    ExitCode::from(summary.exit_code())
}
