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

//! Control backend driving an external helper executable.
//!
//! The SNAP control library is not a Rust library, so snapcfg reaches it through a small helper
//! program that wraps it. Each operation is one invocation of the helper:
//!
//! | operation        | invocation                                   | stdin              | stdout              |
//! |------------------|----------------------------------------------|--------------------|---------------------|
//! | open             | `<helper> connect --host H`                  |                    |                     |
//! | program          | `<helper> program --host H --fpgfile P`      |                    |                     |
//! | configure_stream | `<helper> configure --host H`                | effective config   |                     |
//! | telemetry        | `<helper> status --host H`                   |                    | [`Telemetry`] JSON  |
//! | close            | `<helper> disconnect --host H`               |                    |                     |
//!
//! A zero exit status is success. Otherwise the helper's stderr becomes the reason attached to
//! the error for that step.

use crate::configurator::EffectiveBoardConfig;
use crate::control::{BoardSession, ControlBackend, Telemetry};
use crate::error::SnapError;
use crate::system_io::validate_file;
use log::{debug, trace};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

#[derive(Debug, Clone, PartialEq)]
pub struct HelperBackend {
    program: String,
    args: Vec<String>,
}

impl HelperBackend {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> HelperBackend {
        HelperBackend {
            program: program.into(),
            args,
        }
    }

    /// Split a command line such as `python3 /opt/casm/casm_f_helper.py` on whitespace.
    ///
    /// There is no quoting, so a program or argument containing a space cannot be expressed
    /// here. Use [`HelperBackend::new`] for those.
    pub fn from_command_line(command_line: &str) -> Result<HelperBackend, SnapError> {
        let mut words = command_line.split_whitespace().map(String::from);
        let program = words
            .next()
            .ok_or(SnapError::Config("helper command is empty".to_string()))?;
        Ok(HelperBackend::new(program, words.collect()))
    }

    fn run(&self, args: &[&str], input: Option<&str>) -> Result<String, String> {
        trace!("Running {} {:?} {args:?}", self.program, self.args);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .args(args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to start helper '{}': {e}", self.program))?;

        let write_result = match (input, child.stdin.take()) {
            (Some(input), Some(mut stdin)) => stdin.write_all(input.as_bytes()),
            _ => Ok(()),
        };

        let output = child
            .wait_with_output()
            .map_err(|e| format!("failed to wait for helper '{}': {e}", self.program))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(if stderr.is_empty() {
                format!("helper exited with {}", output.status)
            } else {
                stderr
            });
        }
        write_result.map_err(|e| format!("failed to send input to helper: {e}"))?;
        trace!("Helper done.");
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl ControlBackend for HelperBackend {
    fn open(&self, host: &str) -> Result<Box<dyn BoardSession>, SnapError> {
        self.run(&["connect", "--host", host], None)
            .map_err(|reason| SnapError::Connection {
                host: host.to_string(),
                reason,
            })?;
        Ok(Box::new(HelperSession {
            helper: self.clone(),
            host: host.to_string(),
            open: true,
        }))
    }
}

pub struct HelperSession {
    helper: HelperBackend,
    host: String,
    open: bool,
}

impl BoardSession for HelperSession {
    fn host(&self) -> &str {
        &self.host
    }

    fn program(&mut self, fpgfile: &Path) -> Result<(), SnapError> {
        let programming_error = |reason| SnapError::Programming {
            host: self.host.clone(),
            fpgfile: fpgfile.into(),
            reason,
        };
        validate_file(fpgfile).map_err(programming_error)?;
        let fpgfile_str = fpgfile.to_string_lossy();
        self.helper
            .run(
                &["program", "--host", &self.host, "--fpgfile", &fpgfile_str],
                None,
            )
            .map_err(programming_error)?;
        Ok(())
    }

    fn configure_stream(&mut self, config: &EffectiveBoardConfig) -> Result<(), SnapError> {
        let stream_error = |reason| SnapError::StreamConfig {
            host: self.host.clone(),
            reason,
        };
        let json = serde_json::to_string(config)
            .map_err(|e| stream_error(format!("could not encode configuration: {e}")))?;
        debug!("Sending configuration to helper: {json}");
        self.helper
            .run(&["configure", "--host", &self.host], Some(&json))
            .map_err(stream_error)?;
        Ok(())
    }

    fn telemetry(&mut self) -> Result<Telemetry, SnapError> {
        let telemetry_error = |reason| SnapError::Telemetry {
            host: self.host.clone(),
            reason,
        };
        let stdout = self
            .helper
            .run(&["status", "--host", &self.host], None)
            .map_err(telemetry_error)?;
        serde_json::from_str(stdout.trim())
            .map_err(|e| telemetry_error(format!("unreadable status '{}': {e}", stdout.trim())))
    }

    fn close(&mut self) -> Result<(), SnapError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.helper
            .run(&["disconnect", "--host", &self.host], None)
            .map_err(|reason| SnapError::Connection {
                host: self.host.clone(),
                reason,
            })?;
        Ok(())
    }
}
