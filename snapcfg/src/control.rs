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

//! Capability interface to the hardware-control library.
//!
//! Everything that touches a board goes through two traits:
//! - [`ControlBackend`] - opens a control session to a board's management address
//! - [`BoardSession`] - programs the bitstream, configures streaming and reads telemetry
//!
//! Two backends ship with snapcfg:
//! - [`helper::HelperBackend`] - runs an external helper executable wrapping the vendor library
//! - [`dry_run::DryRunBackend`] - logs what would be done and touches nothing
//!
//! [`SessionGuard`] closes a session when it goes out of scope, so a board's session is always
//! released before the next board is started, whichever step failed.

pub mod dry_run;
pub mod helper;

use crate::configurator::EffectiveBoardConfig;
use crate::error::SnapError;
use log::{trace, warn};
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use std::path::Path;

/// Transmit status reported by a board after streaming was configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Transmit throughput in Gb/s.
    pub gbps: f64,
    /// Packets per second.
    pub packet_rate: u64,
    /// Status flags raised by the 10GbE core, empty when healthy.
    #[serde(default)]
    pub flags: Vec<String>,
}

/// Opens control sessions.
pub trait ControlBackend {
    /// Open a control session to `host`.
    ///
    /// # Returns: `Result<Box<dyn BoardSession>, SnapError>`
    /// * `Ok(Box<dyn BoardSession>)` - A live session
    /// * `Err(SnapError::Connection)` - Host unreachable, authentication failed or timed out
    fn open(&self, host: &str) -> Result<Box<dyn BoardSession>, SnapError>;
}

/// One open control session to one board.
pub trait BoardSession {
    /// Management address this session talks to.
    fn host(&self) -> &str;

    /// Load a bitstream onto the FPGA.
    ///
    /// # Returns: `Result<(), SnapError>`
    /// * `Ok(())` - Bitstream loaded
    /// * `Err(SnapError::Programming)` - The bitstream could not be loaded
    fn program(&mut self, fpgfile: &Path) -> Result<(), SnapError>;

    /// Configure the 10GbE core and packetizer with the board's effective configuration.
    ///
    /// # Returns: `Result<(), SnapError>`
    /// * `Ok(())` - Streaming configured
    /// * `Err(SnapError::StreamConfig)` - The library rejected the configuration
    fn configure_stream(&mut self, config: &EffectiveBoardConfig) -> Result<(), SnapError>;

    /// Read transmit status.
    ///
    /// # Returns: `Result<Telemetry, SnapError>`
    /// * `Ok(Telemetry)` - Current throughput, packet rate and flags
    /// * `Err(SnapError::Telemetry)` - Status unavailable
    fn telemetry(&mut self) -> Result<Telemetry, SnapError>;

    /// Release the session. Called exactly once, by [`SessionGuard`].
    fn close(&mut self) -> Result<(), SnapError>;
}

/// Owns an open session and closes it on drop.
pub struct SessionGuard {
    session: Box<dyn BoardSession>,
}

impl SessionGuard {
    pub fn open(backend: &dyn ControlBackend, host: &str) -> Result<SessionGuard, SnapError> {
        trace!("Opening control session to {host}");
        Ok(SessionGuard {
            session: backend.open(host)?,
        })
    }
}

impl Deref for SessionGuard {
    type Target = dyn BoardSession;

    fn deref(&self) -> &Self::Target {
        self.session.as_ref()
    }
}

impl DerefMut for SessionGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session.as_mut()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let host = self.session.host().to_string();
        match self.session.close() {
            Ok(()) => trace!("Closed control session to {host}"),
            Err(e) => warn!("Failed to close control session to {host}: {e}"),
        }
    }
}
