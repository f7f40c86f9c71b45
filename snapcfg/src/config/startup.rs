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

//! Startup file.
//!
//! A startup file records a standard bring-up so it can be repeated without retyping the
//! command line:
//!
//! ```yaml
//! layout_yaml: configs/casm_feng_layout.yaml
//! ips: [192.168.0.56, 192.168.0.57]
//! options:
//!   nchan_packet: 512
//!   log_level: INFO
//!   programmed: true     # boards already carry the bitstream
//!   test_mode: counter
//!   fft_shift: 0xffff
//!   eq_coeffs: 100
//!   adc_gain: 4
//! ```
//!
//! Values given on the command line always win over the file.

use crate::configurator::RunOptions;
use crate::error::SnapError;
use crate::system_io::fs_read;
use log::{LevelFilter, trace};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct StartupConfig {
    pub layout_yaml: Option<PathBuf>,
    #[serde(default)]
    pub ips: Vec<String>,
    #[serde(default)]
    pub options: StartupOptions,
}

/// Run options that may come from a startup file, the command line, or both.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct StartupOptions {
    pub nchan_packet: Option<u32>,
    pub log_level: Option<String>,
    pub program: Option<bool>,
    /// Legacy spelling: `programmed: true` means the firmware is already loaded.
    pub programmed: Option<bool>,
    pub test_mode: Option<String>,
    pub fft_shift: Option<u32>,
    pub eq_coeffs: Option<f64>,
    pub adc_gain: Option<u32>,
    pub sw_sync: Option<bool>,
    pub enable_tx: Option<bool>,
}

impl StartupOptions {
    pub fn merge(self, fallback: StartupOptions) -> StartupOptions {
        // an explicit `program` on either layer beats the legacy flag
        let (program, programmed) = match (self.program, self.programmed) {
            (None, None) => (fallback.program, fallback.programmed),
            layer => layer,
        };
        StartupOptions {
            nchan_packet: self.nchan_packet.or(fallback.nchan_packet),
            log_level: self.log_level.or(fallback.log_level),
            program,
            programmed,
            test_mode: self.test_mode.or(fallback.test_mode),
            fft_shift: self.fft_shift.or(fallback.fft_shift),
            eq_coeffs: self.eq_coeffs.or(fallback.eq_coeffs),
            adc_gain: self.adc_gain.or(fallback.adc_gain),
            sw_sync: self.sw_sync.or(fallback.sw_sync),
            enable_tx: self.enable_tx.or(fallback.enable_tx),
        }
    }

    /// Whether firmware should be loaded. Defaults to leaving the boards as they are.
    pub fn should_program(&self) -> bool {
        match (self.program, self.programmed) {
            (Some(program), _) => program,
            (None, Some(programmed)) => !programmed,
            (None, None) => false,
        }
    }

    pub fn log_filter(&self) -> Result<Option<LevelFilter>, SnapError> {
        self.log_level.as_deref().map(parse_log_level).transpose()
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            program: self.should_program(),
            sw_sync: self.sw_sync.unwrap_or(true),
            enable_tx: self.enable_tx.unwrap_or(true),
            test_mode: self.test_mode.clone(),
            fft_shift: self.fft_shift,
            eq_coeffs: self.eq_coeffs,
            adc_gain: self.adc_gain,
        }
    }
}

/// Accepts the level names operators are used to (`WARNING`, `INFO`, ...) in any case.
pub fn parse_log_level(level: &str) -> Result<LevelFilter, SnapError> {
    match level.trim().to_ascii_uppercase().as_str() {
        "TRACE" => Ok(LevelFilter::Trace),
        "DEBUG" => Ok(LevelFilter::Debug),
        "INFO" => Ok(LevelFilter::Info),
        "WARN" | "WARNING" => Ok(LevelFilter::Warn),
        "ERROR" | "CRITICAL" => Ok(LevelFilter::Error),
        "OFF" => Ok(LevelFilter::Off),
        _ => Err(SnapError::Config(format!("unknown log level '{level}'"))),
    }
}

fn startup_from_str(yaml: &str, file_path: &Path) -> Result<StartupConfig, SnapError> {
    // an empty file is a valid, empty startup config
    if yaml.trim().is_empty() {
        return Ok(StartupConfig::default());
    }
    serde_yaml::from_str(yaml).map_err(|e| SnapError::YamlDe {
        file: file_path.into(),
        e,
    })
}

pub fn startup_from_file(file_path: &Path) -> Result<StartupConfig, SnapError> {
    let config = startup_from_str(&fs_read(file_path)?, file_path)?;
    trace!("Startup config from {file_path:?}: {config:?}");
    Ok(config)
}
