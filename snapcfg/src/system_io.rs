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

//! Error wrapping file system helpers.
//!
//! Thin wrappers around `std::fs` that trace what they touch and convert failures into
//! [`SnapError`] values carrying the offending path.

use crate::error::SnapError;
use log::trace;
use std::fs::OpenOptions;
use std::io::Read;
use std::path::Path;

/// Read the contents of a file to a String.
///
/// Used for layout and startup files. Failures become `SnapError::IORead` naming the path, and
/// the size of what was read is traced.
///
/// # Arguments
///
/// * `file_path` - Path to the file to read
///
/// # Returns: `Result<String, SnapError>`
/// * `Ok(String)` - The complete contents of the file
/// * `Err(SnapError::IORead)` - If the file cannot be read (doesn't exist, is a directory, permissions, etc.)
pub fn fs_read(file_path: &Path) -> Result<String, SnapError> {
    trace!("Attempting to read from {file_path:?}");
    let mut buf: String = String::new();
    let result = OpenOptions::new()
        .read(true)
        .open(file_path)
        .and_then(|mut f| f.read_to_string(&mut buf));

    match result {
        Ok(bytes) => {
            trace!("Read {bytes} bytes from {file_path:?}");
            Ok(buf)
        }
        Err(e) => Err(SnapError::IORead {
            file: file_path.into(),
            e,
        }),
    }
}

/// Check that `path` names an existing regular file, such as a `.fpg` bitstream.
///
/// Returns a human readable reason on failure so callers can wrap it in whichever error
/// variant matches the step they are performing.
pub fn validate_file(path: &Path) -> Result<(), String> {
    trace!("Validating {path:?}");
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(format!("{path:?} is not a regular file")),
        Err(e) => Err(format!("{path:?} is not accessible: {e}")),
    }
}
