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

//! Configuration files read by snapcfg.
//!
//! - [`layout`] - the board/NIC/frequency layout (`common` + `boards`)
//! - [`startup`] - the optional launcher file naming a layout and default run options
//! - [`hw_addr`] - MAC address parsing shared by both

pub mod hw_addr;
pub mod layout;
pub mod startup;

/// UDP port used for both ends of the stream when the layout does not name one.
pub static DEFAULT_UDP_PORT: u16 = 10000;

/// Channels produced by one F-engine, and the default width of a destination's block.
pub static DEFAULT_NCHAN: u32 = 512;

/// Frequency channels carried by each UDP packet.
pub static DEFAULT_NCHAN_PACKET: u32 = 512;

/// Size of the full band split across all F-engines.
pub static DEFAULT_NCHAN_TOTAL: u32 = 4096;

/// Executable used to reach the hardware-control library when `--helper` is not given.
pub static DEFAULT_HELPER: &str = "casm_f_helper";
