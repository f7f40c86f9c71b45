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

//! Board selection by address filter.

use crate::config::layout::BoardSpec;
use crate::error::SnapError;
use log::{trace, warn};

/// Boards picked for this run, in layout order, and the filters that picked nothing.
#[derive(Debug)]
pub struct Selection<'a> {
    pub boards: Vec<&'a BoardSpec>,
    pub unmatched: Vec<SnapError>,
}

fn matches(board: &BoardSpec, filter: &str) -> bool {
    let filter = filter.trim();
    board.host == filter || board.source_ip.to_string() == filter
}

/// Select the boards whose `host` or `source_ip` equals one of `filters`.
///
/// An empty filter list selects every board. A board matched by several filters is selected
/// once. Every filter that matches no board yields a [`SnapError::Selection`] in
/// [`Selection::unmatched`]; the other filters are still honoured.
pub fn select_boards<'a, S: AsRef<str>>(boards: &'a [BoardSpec], filters: &[S]) -> Selection<'a> {
    if filters.is_empty() {
        trace!("No address filter given, selecting all {} boards", boards.len());
        return Selection {
            boards: boards.iter().collect(),
            unmatched: Vec::new(),
        };
    }

    let selected = boards
        .iter()
        .filter(|board| filters.iter().any(|f| matches(board, f.as_ref())))
        .collect();

    let unmatched = filters
        .iter()
        .map(AsRef::<str>::as_ref)
        .filter(|f| !boards.iter().any(|board| matches(board, f)))
        .map(|f| {
            let err = SnapError::Selection(f.to_string());
            warn!("{err}");
            err
        })
        .collect();

    Selection {
        boards: selected,
        unmatched,
    }
}
