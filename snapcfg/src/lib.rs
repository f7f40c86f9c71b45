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

//! snapcfg - configure SNAP F-engine boards from a YAML layout.
//!
//! A run reads a layout file describing the boards and their downstream NICs, picks the boards
//! to work on, then for each one opens a control session, optionally programs the bitstream,
//! configures streaming and reads back telemetry. Boards are handled one at a time; a failure
//! on one board is recorded and the run moves on.
//!
//! # Architecture
//!
//! - [`config`] - layout and startup files
//! - [`selector`] - picks boards by management host or source IP
//! - [`configurator`] - merges `common` with a board and drives one board through its steps
//! - [`control`] - the capability traits in front of the hardware-control library
//! - [`report`] - per-board results and the status table
//! - [`run`] - one invocation, start to finish
//!
//! # Logging
//!
//! The crate logs through the `log` facade only; the binary decides where it goes.

pub mod config;
pub mod configurator;
pub mod control;
pub mod error;
pub mod report;
pub mod run;
pub mod selector;
pub mod system_io;
