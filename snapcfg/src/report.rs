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

//! Per-board outcomes and the status summary printed at the end of a run.

use crate::config::layout::BoardSpec;
use crate::control::Telemetry;
use crate::error::SnapError;
use std::io::{self, Write};

#[derive(Debug)]
pub enum Outcome {
    Configured,
    Failed(SnapError),
}

#[derive(Debug)]
pub struct RunResult {
    pub name: String,
    pub host: String,
    pub feng_id: u32,
    pub outcome: Outcome,
    pub telemetry: Option<Telemetry>,
}

impl RunResult {
    pub fn configured(board: &BoardSpec, telemetry: Option<Telemetry>) -> RunResult {
        RunResult {
            name: board.name.clone(),
            host: board.host.clone(),
            feng_id: board.feng_id,
            outcome: Outcome::Configured,
            telemetry,
        }
    }

    pub fn failed(board: &BoardSpec, error: SnapError) -> RunResult {
        RunResult {
            name: board.name.clone(),
            host: board.host.clone(),
            feng_id: board.feng_id,
            outcome: Outcome::Failed(error),
            telemetry: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, Outcome::Configured)
    }

    pub fn error(&self) -> Option<&SnapError> {
        match &self.outcome {
            Outcome::Configured => None,
            Outcome::Failed(e) => Some(e),
        }
    }

    fn status_cell(&self) -> String {
        match &self.outcome {
            Outcome::Configured => "ok".to_string(),
            Outcome::Failed(e) => {
                format!("FAILED ({}): {}", e.kind(), single_line(&e.to_string()))
            }
        }
    }
}

/// Longest error text shown in a table cell. The full text is in the log.
const MAX_CELL_CHARS: usize = 200;

/// Fold multi-line text (helper tracebacks) into one table cell.
fn single_line(text: &str) -> String {
    let folded = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("; ");
    if folded.chars().count() <= MAX_CELL_CHARS {
        return folded;
    }
    let mut cut: String = folded.chars().take(MAX_CELL_CHARS).collect();
    cut.push_str("...");
    cut
}

/// Everything a finished run has to say.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub results: Vec<RunResult>,
    /// Address filters that matched no board.
    pub unmatched: Vec<SnapError>,
}

impl RunSummary {
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| !r.succeeded()).count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures() == 0
    }

    /// Process exit status: `0` when every board was configured, `1` otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.all_succeeded() { 0 } else { 1 }
    }

    /// Render the summary as an ASCII table.
    pub fn render(&self) -> String {
        let mut ret_string = String::from(
            "---- BOARDS ----\n\
            | board | host | feng_id | status | tx Gb/s | pkt/s | flags |\n",
        );
        for result in &self.results {
            let (gbps, pps, flags) = match &result.telemetry {
                Some(t) => (
                    format!("{:.2}", t.gbps),
                    t.packet_rate.to_string(),
                    if t.flags.is_empty() {
                        "none".to_string()
                    } else {
                        t.flags.join(",")
                    },
                ),
                None => ("-".to_string(), "-".to_string(), "-".to_string()),
            };
            ret_string += format!(
                "| {} | {} | {} | {} | {gbps} | {pps} | {flags} |\n",
                result.name,
                result.host,
                result.feng_id,
                result.status_cell()
            )
            .as_str();
        }

        if !self.unmatched.is_empty() {
            ret_string += "\n---- UNMATCHED FILTERS ----\n";
            for e in &self.unmatched {
                ret_string.push_str(format!("| {} |\n", single_line(&e.to_string())).as_ref());
            }
        }

        let total = self.results.len();
        ret_string += format!(
            "\n{}/{total} boards configured successfully: {}\n",
            total - self.failures(),
            if self.all_succeeded() { "PASS" } else { "FAIL" }
        )
        .as_str();
        ret_string
    }

    pub fn write_to(&self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(self.render().as_bytes())?;
        out.flush()
    }
}
