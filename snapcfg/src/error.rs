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

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SnapError {
    #[error("SnapError::Config: {0}")]
    Config(String),
    #[error("SnapError::IORead: An IO error occurred when reading from {file:?}: {e}")]
    IORead { file: PathBuf, e: std::io::Error },
    #[error("SnapError::YamlDe: Failed to parse YAML from {file:?}: {e}")]
    YamlDe {
        file: PathBuf,
        e: serde_yaml::Error,
    },
    #[error("SnapError::Selection: No board matches the requested address {0}")]
    Selection(String),
    #[error("SnapError::Connection: Could not open a control session to {host}: {reason}")]
    Connection { host: String, reason: String },
    #[error("SnapError::Programming: Failed to program {host} with {fpgfile:?}: {reason}")]
    Programming {
        host: String,
        fpgfile: PathBuf,
        reason: String,
    },
    #[error("SnapError::StreamConfig: Failed to configure streaming on {host}: {reason}")]
    StreamConfig { host: String, reason: String },
    #[error("SnapError::Telemetry: Could not read status from {host}: {reason}")]
    Telemetry { host: String, reason: String },
}

impl SnapError {
    /// Errors that invalidate the whole run rather than a single board.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            SnapError::Config(..) | SnapError::IORead { .. } | SnapError::YamlDe { .. }
        )
    }

    /// Short label used in the status table.
    pub fn kind(&self) -> &'static str {
        match self {
            SnapError::Config(..) | SnapError::IORead { .. } | SnapError::YamlDe { .. } => {
                "ConfigError"
            }
            SnapError::Selection(..) => "SelectionError",
            SnapError::Connection { .. } => "ConnectionError",
            SnapError::Programming { .. } => "ProgrammingError",
            SnapError::StreamConfig { .. } => "StreamConfigError",
            SnapError::Telemetry { .. } => "TelemetryError",
        }
    }
}
