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

//! Board layout file.
//!
//! The layout has two top level sections. `common` holds the streaming parameters and the
//! destination list shared by every board; `boards` lists the network identity of each SNAP.
//!
//! ```yaml
//! common:
//!   fpgfile: /home/casm/firmware/casm_f_2025-06-01.fpg
//!   source_port: 10000
//!   dest_port: 10000
//!   nchan: 512          # channels produced by each F-engine
//!   nchan_packet: 512   # channels per UDP packet
//!   nchan_total: 4096
//!   destinations:
//!     - ip: 10.41.0.101
//!       mac: "0c:42:a1:3b:9e:20"
//!       start_chan: 0
//!     - ip: 10.41.0.102
//!       mac: "0c:42:a1:3b:9e:21"
//!       start_chan: 512
//! boards:
//!   - name: snap01
//!     host: rpi-snap01
//!     source_ip: 192.168.0.56
//!     source_mac: "02:02:c0:a8:00:38"
//!     feng_id: 0
//! ```
//!
//! # Channel slices
//!
//! The F-engine with `feng_id = k` owns channels `[k * nchan, (k + 1) * nchan)`. A destination
//! receives `[start_chan, start_chan + nchan)` where its own `nchan`, if present, overrides the
//! common one. Every slice of a board taking part in a run must be covered by destinations, and
//! every piece of a slice sent to one destination must hold a whole number of packets
//! ([`LayoutConfig::check_board`]).

use crate::config::hw_addr::MacAddress;
use crate::config::{DEFAULT_NCHAN, DEFAULT_NCHAN_PACKET, DEFAULT_NCHAN_TOTAL, DEFAULT_UDP_PORT};
use crate::error::SnapError;
use crate::system_io::fs_read;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

/// Half open range of frequency channels, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelRange {
    pub start: u32,
    pub end: u32,
}

impl ChannelRange {
    pub fn new(start: u32, len: u32) -> ChannelRange {
        ChannelRange {
            start,
            end: start.saturating_add(len),
        }
    }

    /// The slice of the band owned by the F-engine `feng_id` when each engine produces `nchan`.
    pub fn for_feng(feng_id: u32, nchan: u32) -> ChannelRange {
        ChannelRange::new(feng_id.saturating_mul(nchan), nchan)
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn intersect(&self, other: &ChannelRange) -> Option<ChannelRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(ChannelRange { start, end })
    }
}

impl fmt::Display for ChannelRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.start, self.end)
    }
}

/// One downstream NIC and the first channel it receives.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Destination {
    pub ip: Ipv4Addr,
    pub mac: MacAddress,
    pub start_chan: u32,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub nchan: Option<u32>,
}

impl Destination {
    pub fn channels(&self, common_nchan: u32) -> ChannelRange {
        ChannelRange::new(self.start_chan, self.nchan.unwrap_or(common_nchan))
    }
}

/// Network identity of one SNAP board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSpec {
    /// Logical name, falls back to `host` when the layout leaves it out.
    pub name: String,
    /// Management address used to open the control session.
    pub host: String,
    pub source_ip: Ipv4Addr,
    pub source_mac: MacAddress,
    pub feng_id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommonConfig {
    pub fpgfile: PathBuf,
    pub source_port: u16,
    pub dest_port: u16,
    pub nchan: u32,
    pub nchan_packet: u32,
    pub nchan_total: u32,
    pub destinations: Vec<Destination>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub common: CommonConfig,
    pub boards: Vec<BoardSpec>,
}

#[derive(Debug, Deserialize)]
struct LayoutFile {
    common: Option<CommonSection>,
    boards: Option<Vec<BoardEntry>>,
}

#[derive(Debug, Deserialize)]
struct CommonSection {
    fpgfile: Option<PathBuf>,
    source_port: Option<u16>,
    dest_port: Option<u16>,
    nchan: Option<u32>,
    nchan_packet: Option<u32>,
    nchan_total: Option<u32>,
    #[serde(default)]
    destinations: Vec<Destination>,
}

#[derive(Debug, Deserialize)]
struct BoardEntry {
    name: Option<String>,
    host: String,
    source_ip: Ipv4Addr,
    source_mac: MacAddress,
    feng_id: u32,
}

impl From<BoardEntry> for BoardSpec {
    fn from(value: BoardEntry) -> Self {
        BoardSpec {
            name: value.name.unwrap_or_else(|| value.host.clone()),
            host: value.host,
            source_ip: value.source_ip,
            source_mac: value.source_mac,
            feng_id: value.feng_id,
        }
    }
}

impl TryFrom<LayoutFile> for LayoutConfig {
    type Error = SnapError;

    fn try_from(value: LayoutFile) -> Result<Self, Self::Error> {
        let common = value.common.ok_or(SnapError::Config(
            "layout does not contain a top-level `common` section".to_string(),
        ))?;
        let boards = value.boards.ok_or(SnapError::Config(
            "layout does not contain a top-level `boards` list".to_string(),
        ))?;
        let fpgfile = common.fpgfile.ok_or(SnapError::Config(
            "`common` does not name an `fpgfile`".to_string(),
        ))?;

        let layout = LayoutConfig {
            common: CommonConfig {
                fpgfile,
                source_port: common.source_port.unwrap_or(DEFAULT_UDP_PORT),
                dest_port: common.dest_port.unwrap_or(DEFAULT_UDP_PORT),
                nchan: common.nchan.unwrap_or(DEFAULT_NCHAN),
                nchan_packet: common.nchan_packet.unwrap_or(DEFAULT_NCHAN_PACKET),
                nchan_total: common.nchan_total.unwrap_or(DEFAULT_NCHAN_TOTAL),
                destinations: common.destinations,
            },
            boards: boards.into_iter().map(BoardSpec::from).collect(),
        };
        layout.validate()?;
        Ok(layout)
    }
}

impl LayoutConfig {
    /// Replace `nchan_packet`, re-checking the layout-wide constraints that depend on it.
    pub fn with_nchan_packet(mut self, nchan_packet: u32) -> Result<LayoutConfig, SnapError> {
        debug!(
            "Overriding nchan_packet {} -> {nchan_packet}",
            self.common.nchan_packet
        );
        self.common.nchan_packet = nchan_packet;
        self.validate()?;
        Ok(self)
    }

    /// The part of the band produced by `board`.
    pub fn slice_for(&self, board: &BoardSpec) -> ChannelRange {
        ChannelRange::for_feng(board.feng_id, self.common.nchan)
    }

    /// The destinations receiving part of `board`'s slice, each clipped to the part it gets.
    pub fn destinations_for(&self, board: &BoardSpec) -> Vec<(&Destination, ChannelRange)> {
        let slice = self.slice_for(board);
        self.common
            .destinations
            .iter()
            .filter_map(|dest| {
                dest.channels(self.common.nchan)
                    .intersect(&slice)
                    .map(|part| (dest, part))
            })
            .collect()
    }

    fn validate(&self) -> Result<(), SnapError> {
        let common = &self.common;
        if common.nchan == 0 || common.nchan_packet == 0 || common.nchan_total == 0 {
            return Err(SnapError::Config(format!(
                "channel counts must be non-zero (nchan={}, nchan_packet={}, nchan_total={})",
                common.nchan, common.nchan_packet, common.nchan_total
            )));
        }
        if common.nchan % common.nchan_packet != 0 {
            return Err(SnapError::Config(format!(
                "nchan_packet={} does not evenly divide nchan={}",
                common.nchan_packet, common.nchan
            )));
        }
        self.validate_destinations()?;
        self.validate_boards()
    }

    fn validate_destinations(&self) -> Result<(), SnapError> {
        let common = &self.common;
        let mut starts = HashSet::new();
        let mut macs: HashMap<Ipv4Addr, MacAddress> = HashMap::new();
        let mut ranges: Vec<(ChannelRange, Ipv4Addr)> = Vec::new();
        for dest in &common.destinations {
            if !starts.insert(dest.start_chan) {
                return Err(SnapError::Config(format!(
                    "start_chan {} is used by more than one destination",
                    dest.start_chan
                )));
            }
            if let Some(mac) = macs.insert(dest.ip, dest.mac).filter(|mac| *mac != dest.mac) {
                return Err(SnapError::Config(format!(
                    "destination {} is listed with two MAC addresses, {mac} and {}",
                    dest.ip, dest.mac
                )));
            }
            let range = dest.channels(common.nchan);
            if range.is_empty() || range.end > common.nchan_total {
                return Err(SnapError::Config(format!(
                    "destination {} covers {range}, outside the band [0,{})",
                    dest.ip, common.nchan_total
                )));
            }
            ranges.push((range, dest.ip));
        }

        ranges.sort_by_key(|(range, _)| range.start);
        for pair in ranges.windows(2) {
            let ((a, a_ip), (b, b_ip)) = (&pair[0], &pair[1]);
            if a.intersect(b).is_some() {
                return Err(SnapError::Config(format!(
                    "destinations {a_ip} {a} and {b_ip} {b} overlap"
                )));
            }
        }
        trace!("{} destinations validated", ranges.len());
        Ok(())
    }

    fn validate_boards(&self) -> Result<(), SnapError> {
        let mut feng_ids = HashSet::new();
        for board in &self.boards {
            if board.host.trim().is_empty() {
                return Err(SnapError::Config(format!(
                    "board {} has an empty host",
                    board.name
                )));
            }
            if !feng_ids.insert(board.feng_id) {
                return Err(SnapError::Config(format!(
                    "feng_id {} is used by more than one board",
                    board.feng_id
                )));
            }
        }
        Ok(())
    }

    /// Check that the destinations can carry everything `board` produces.
    ///
    /// Only boards taking part in a run are checked, so a layout may list boards whose
    /// destinations are not wired up yet.
    ///
    /// # Returns: `Result<(), SnapError>`
    /// * `Ok(())` - The slice lies inside the band and every part is a whole number of packets
    /// * `Err(SnapError::Config)` - The slice is out of band, not fully covered, or splits a packet
    pub fn check_board(&self, board: &BoardSpec) -> Result<(), SnapError> {
        let common = &self.common;
        let slice = self.slice_for(board);
        if slice.end > common.nchan_total || slice.len() != common.nchan {
            return Err(SnapError::Config(format!(
                "board {} (feng_id={}) would produce {slice}, outside the band [0,{})",
                board.name, board.feng_id, common.nchan_total
            )));
        }

        let parts = self.destinations_for(board);
        let covered: u32 = parts.iter().map(|(_, part)| part.len()).sum();
        if covered != slice.len() {
            return Err(SnapError::Config(format!(
                "destinations cover only {covered} of the {} channels in {slice} produced by board {}",
                slice.len(),
                board.name
            )));
        }
        if let Some((dest, part)) = parts
            .iter()
            .find(|(_, part)| part.len() % common.nchan_packet != 0)
        {
            return Err(SnapError::Config(format!(
                "board {} sends {part} to {}, which is not a whole number of {}-channel packets",
                board.name, dest.ip, common.nchan_packet
            )));
        }
        trace!("board {} covered over {slice}", board.name);
        Ok(())
    }
}

fn parse_layout(yaml: &str) -> Result<LayoutFile, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}

/// Parse and validate a layout held in memory.
pub fn layout_from_str(yaml: &str) -> Result<LayoutConfig, SnapError> {
    let file = parse_layout(yaml)
        .map_err(|e| SnapError::Config(format!("layout is not valid YAML for snapcfg: {e}")))?;
    file.try_into()
}

/// Read, parse and validate the layout file at `file_path`.
///
/// # Returns: `Result<LayoutConfig, SnapError>`
/// * `Ok(LayoutConfig)` - A layout satisfying every channel and identity constraint
/// * `Err(SnapError::IORead)` - The file could not be read
/// * `Err(SnapError::YamlDe)` - The file is not a layout document
/// * `Err(SnapError::Config)` - Required keys are missing or the channel plan is inconsistent
pub fn load_layout(file_path: &Path) -> Result<LayoutConfig, SnapError> {
    let yaml = fs_read(file_path)?;
    let file = parse_layout(&yaml).map_err(|e| SnapError::YamlDe {
        file: file_path.into(),
        e,
    })?;
    let layout = LayoutConfig::try_from(file)?;
    debug!(
        "Loaded layout from {file_path:?}: {} boards, {} destinations",
        layout.boards.len(),
        layout.common.destinations.len()
    );
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_board_layout() -> &'static str {
        r#"
common:
  fpgfile: /tmp/casm_f.fpg
  nchan: 512
  nchan_packet: 256
  destinations:
    - ip: 10.41.0.101
      mac: "0c:42:a1:3b:9e:20"
      start_chan: 0
    - ip: 10.41.0.102
      mac: 0x0c42a13b9e21
      start_chan: 512
      port: 10001
boards:
  - name: snap01
    host: rpi-snap01
    source_ip: 192.168.0.56
    source_mac: "02:02:c0:a8:00:38"
    feng_id: 0
  - host: rpi-snap02
    source_ip: 192.168.0.57
    source_mac: "02:02:c0:a8:00:39"
    feng_id: 1
"#
    }

    #[test]
    fn defaults_fill_missing_common_fields() {
        let layout = layout_from_str(two_board_layout()).unwrap();
        assert_eq!(layout.common.source_port, DEFAULT_UDP_PORT);
        assert_eq!(layout.common.dest_port, DEFAULT_UDP_PORT);
        assert_eq!(layout.common.nchan_total, DEFAULT_NCHAN_TOTAL);
        assert_eq!(layout.common.destinations[1].port, Some(10001));
    }

    #[test]
    fn unnamed_board_is_named_after_host() {
        let layout = layout_from_str(two_board_layout()).unwrap();
        assert_eq!(layout.boards[1].name, "rpi-snap02");
    }

    #[test]
    fn each_board_gets_its_own_destination() {
        let layout = layout_from_str(two_board_layout()).unwrap();
        let first = layout.destinations_for(&layout.boards[0]);
        let second = layout.destinations_for(&layout.boards[1]);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].0.ip, Ipv4Addr::new(10, 41, 0, 101));
        assert_eq!(first[0].1, ChannelRange { start: 0, end: 512 });
        assert_eq!(second[0].1, ChannelRange { start: 512, end: 1024 });
    }

    #[test]
    fn override_must_divide_nchan() {
        let layout = layout_from_str(two_board_layout()).unwrap();
        let err = layout.clone().with_nchan_packet(384).unwrap_err();
        assert!(err.to_string().contains("does not evenly divide"));
        assert_eq!(layout.with_nchan_packet(128).unwrap().common.nchan_packet, 128);
    }

    #[test]
    fn channel_range_intersection() {
        let a = ChannelRange::new(0, 512);
        let b = ChannelRange::new(256, 512);
        assert_eq!(a.intersect(&b), Some(ChannelRange { start: 256, end: 512 }));
        assert_eq!(a.intersect(&ChannelRange::new(512, 10)), None);
        assert_eq!(ChannelRange::for_feng(3, 512).to_string(), "[1536,2048)");
    }

    #[test]
    fn uncovered_board_only_fails_its_own_check() {
        let yaml = two_board_layout().replace("start_chan: 512", "start_chan: 2048");
        let layout = layout_from_str(&yaml).unwrap();
        assert!(layout.check_board(&layout.boards[0]).is_ok());
        let err = layout.check_board(&layout.boards[1]).unwrap_err();
        assert!(err.to_string().contains("cover only 0 of the 512 channels"));
    }

    #[test]
    fn packet_straddling_two_destinations_is_rejected() {
        let yaml = two_board_layout()
            .replace("nchan: 512\n  nchan_packet: 256", "nchan: 512\n  nchan_packet: 512")
            .replace("start_chan: 0", "start_chan: 0\n      nchan: 256")
            .replace("start_chan: 512", "start_chan: 256");
        let layout = layout_from_str(&yaml).unwrap();
        let err = layout.check_board(&layout.boards[0]).unwrap_err();
        assert!(err.to_string().contains("not a whole number of 512-channel packets"));
    }

    #[test]
    fn one_ip_with_two_macs_is_rejected() {
        let yaml = two_board_layout().replace("ip: 10.41.0.102", "ip: 10.41.0.101");
        let err = layout_from_str(&yaml).unwrap_err();
        assert!(err.to_string().contains("10.41.0.101 is listed with two MAC addresses"));
    }
}
