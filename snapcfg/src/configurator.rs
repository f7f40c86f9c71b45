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

//! Per-board configuration.
//!
//! For each selected board the configurator:
//! 1. checks that the layout's destinations take the whole of the board's channel slice
//! 2. opens a control session to the board's management address
//! 3. loads the bitstream, when asked to
//! 4. merges the `common` layout section with the board's identity into an
//!    [`EffectiveBoardConfig`]
//! 5. hands that configuration to the streaming entry point of the control library
//! 6. reads back transmit telemetry for the status report
//!
//! Any failure in steps 1, 2, 3 or 5 ends that board's run and is recorded in its [`RunResult`];
//! the next board is processed regardless. A telemetry failure only leaves the metrics out.

use crate::config::hw_addr::MacAddress;
use crate::config::layout::{BoardSpec, ChannelRange, LayoutConfig};
use crate::control::{ControlBackend, SessionGuard, Telemetry};
use crate::error::SnapError;
use crate::report::RunResult;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::path::PathBuf;

/// Settings that apply to every board in one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Load the bitstream before configuring streaming.
    pub program: bool,
    /// Use a software-generated sync pulse instead of the external PPS.
    pub sw_sync: bool,
    pub enable_tx: bool,
    pub test_mode: Option<String>,
    pub fft_shift: Option<u32>,
    pub eq_coeffs: Option<f64>,
    pub adc_gain: Option<u32>,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            program: false,
            sw_sync: true,
            enable_tx: true,
            test_mode: None,
            fft_shift: None,
            eq_coeffs: None,
            adc_gain: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Endpoint {
    pub ip: Ipv4Addr,
    pub port: u16,
    pub mac: MacAddress,
}

/// One destination as seen by a single board: only the channels this board sends there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamDestination {
    pub ip: Ipv4Addr,
    pub port: u16,
    pub start_chan: u32,
    pub nchan: u32,
}

/// Everything the streaming entry point needs for one board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveBoardConfig {
    pub name: String,
    pub host: String,
    pub feng_id: u32,
    pub fpgfile: PathBuf,
    pub source: Endpoint,
    pub channels: ChannelRange,
    pub destinations: Vec<StreamDestination>,
    /// IP to MAC lookup for the source and every destination of this board.
    pub macs: BTreeMap<Ipv4Addr, MacAddress>,
    pub nchan_packet: u32,
    pub sw_sync: bool,
    pub enable_tx: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fft_shift: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eq_coeffs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adc_gain: Option<u32>,
}

impl EffectiveBoardConfig {
    /// Overlay `board` on the `common` section of `layout`.
    pub fn resolve(
        layout: &LayoutConfig,
        board: &BoardSpec,
        options: &RunOptions,
    ) -> EffectiveBoardConfig {
        let common = &layout.common;
        let mut macs = BTreeMap::new();
        macs.insert(board.source_ip, board.source_mac);

        let destinations = layout
            .destinations_for(board)
            .into_iter()
            .map(|(dest, part)| {
                macs.insert(dest.ip, dest.mac);
                StreamDestination {
                    ip: dest.ip,
                    port: dest.port.unwrap_or(common.dest_port),
                    start_chan: part.start,
                    nchan: part.len(),
                }
            })
            .collect();

        EffectiveBoardConfig {
            name: board.name.clone(),
            host: board.host.clone(),
            feng_id: board.feng_id,
            fpgfile: common.fpgfile.clone(),
            source: Endpoint {
                ip: board.source_ip,
                port: common.source_port,
                mac: board.source_mac,
            },
            channels: layout.slice_for(board),
            destinations,
            macs,
            nchan_packet: common.nchan_packet,
            sw_sync: options.sw_sync,
            enable_tx: options.enable_tx,
            test_mode: options.test_mode.clone(),
            fft_shift: options.fft_shift,
            eq_coeffs: options.eq_coeffs,
            adc_gain: options.adc_gain,
        }
    }
}

fn try_configure_board(
    backend: &dyn ControlBackend,
    layout: &LayoutConfig,
    board: &BoardSpec,
    options: &RunOptions,
) -> Result<Option<Telemetry>, SnapError> {
    layout.check_board(board)?;
    info!("Connecting to {} ({})", board.name, board.host);
    let mut session = SessionGuard::open(backend, &board.host)?;

    if options.program {
        info!("Programming {} with {:?}", board.name, layout.common.fpgfile);
        session.program(&layout.common.fpgfile)?;
    }

    let effective = EffectiveBoardConfig::resolve(layout, board, options);
    debug!("Effective configuration for {}: {effective:?}", board.name);
    info!(
        "Configuring {} (feng_id={}) - source {}:{}, channels {}",
        board.name, board.feng_id, effective.source.ip, effective.source.port, effective.channels
    );
    session.configure_stream(&effective)?;

    let telemetry = match session.telemetry() {
        Ok(telemetry) => {
            info!(
                "{}: tx {:.2} Gb/s - {} pps - flags {:?}",
                board.name, telemetry.gbps, telemetry.packet_rate, telemetry.flags
            );
            Some(telemetry)
        }
        Err(e) => {
            warn!("{}: {e}", board.name);
            None
        }
    };
    Ok(telemetry)
}

/// Configure a single board and record how it went.
pub fn configure_board(
    backend: &dyn ControlBackend,
    layout: &LayoutConfig,
    board: &BoardSpec,
    options: &RunOptions,
) -> RunResult {
    match try_configure_board(backend, layout, board, options) {
        Ok(telemetry) => RunResult::configured(board, telemetry),
        Err(e) => {
            error!("Configuration failed for board {}: {e}", board.name);
            RunResult::failed(board, e)
        }
    }
}

/// Configure `boards` one after another, in order.
pub fn configure_boards(
    backend: &dyn ControlBackend,
    layout: &LayoutConfig,
    boards: &[&BoardSpec],
    options: &RunOptions,
) -> Vec<RunResult> {
    let results: Vec<RunResult> = boards
        .iter()
        .map(|board| configure_board(backend, layout, board, options))
        .collect();
    info!("All requested boards processed.");
    results
}
