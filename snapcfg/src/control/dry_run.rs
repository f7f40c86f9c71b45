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

//! Backend that only logs. Useful for checking a layout before a bring-up.

use crate::configurator::EffectiveBoardConfig;
use crate::control::{BoardSession, ControlBackend, Telemetry};
use crate::error::SnapError;
use log::{info, trace};
use std::path::Path;

#[derive(Debug, Default)]
pub struct DryRunBackend;

impl ControlBackend for DryRunBackend {
    fn open(&self, host: &str) -> Result<Box<dyn BoardSession>, SnapError> {
        info!("[dry-run] would connect to {host}");
        Ok(Box::new(DryRunSession {
            host: host.to_string(),
        }))
    }
}

pub struct DryRunSession {
    host: String,
}

impl BoardSession for DryRunSession {
    fn host(&self) -> &str {
        &self.host
    }

    fn program(&mut self, fpgfile: &Path) -> Result<(), SnapError> {
        info!("[dry-run] would program {} with {fpgfile:?}", self.host);
        Ok(())
    }

    fn configure_stream(&mut self, config: &EffectiveBoardConfig) -> Result<(), SnapError> {
        let json = serde_json::to_string_pretty(config).map_err(|e| SnapError::StreamConfig {
            host: self.host.clone(),
            reason: format!("could not encode configuration: {e}"),
        })?;
        info!("[dry-run] would configure {} with:\n{json}", self.host);
        Ok(())
    }

    fn telemetry(&mut self) -> Result<Telemetry, SnapError> {
        Err(SnapError::Telemetry {
            host: self.host.clone(),
            reason: "no telemetry in a dry run".to_string(),
        })
    }

    fn close(&mut self) -> Result<(), SnapError> {
        trace!("[dry-run] closing {}", self.host);
        Ok(())
    }
}
