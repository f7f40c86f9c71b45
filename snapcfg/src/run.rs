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

//! One invocation from layout file to summary.

use crate::config::layout::load_layout;
use crate::config::startup::StartupOptions;
use crate::configurator::{RunOptions, configure_boards};
use crate::control::ControlBackend;
use crate::error::SnapError;
use crate::report::RunSummary;
use crate::selector::select_boards;
use log::info;
use std::path::PathBuf;

/// What to configure and how.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub layout_path: PathBuf,
    /// Host names or source IPs; empty means every board in the layout.
    pub filters: Vec<String>,
    /// Replaces `common.nchan_packet` from the layout.
    pub nchan_packet: Option<u32>,
    pub options: RunOptions,
}

impl RunPlan {
    pub fn new(layout_path: PathBuf, filters: Vec<String>, options: &StartupOptions) -> RunPlan {
        RunPlan {
            layout_path,
            filters,
            nchan_packet: options.nchan_packet,
            options: options.run_options(),
        }
    }
}

/// Load, select and configure.
///
/// # Returns: `Result<RunSummary, SnapError>`
/// * `Ok(RunSummary)` - Every selected board was attempted; see the summary for outcomes
/// * `Err(SnapError)` - The layout could not be loaded, no board was touched
pub fn execute(plan: &RunPlan, backend: &dyn ControlBackend) -> Result<RunSummary, SnapError> {
    let mut layout = load_layout(&plan.layout_path)?;
    if let Some(nchan_packet) = plan.nchan_packet {
        layout = layout.with_nchan_packet(nchan_packet)?;
    }

    let selection = select_boards(&layout.boards, &plan.filters);
    info!(
        "Configuring {} of {} boards from {:?}",
        selection.boards.len(),
        layout.boards.len(),
        plan.layout_path
    );
    let results = configure_boards(backend, &layout, &selection.boards, &plan.options);
    Ok(RunSummary {
        results,
        unmatched: selection.unmatched,
    })
}
