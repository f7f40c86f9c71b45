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

#![allow(dead_code)]

use snapcfg::configurator::EffectiveBoardConfig;
use snapcfg::control::{BoardSession, ControlBackend, Telemetry};
use snapcfg::error::SnapError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub fn test_data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/test_data")
        .join(name)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailAt {
    Open,
    Program,
    Configure,
    Telemetry,
    Close,
}

/// In-memory backend recording every call made through it.
#[derive(Default)]
pub struct FakeBackend {
    failures: HashMap<String, FailAt>,
    pub calls: Rc<RefCell<Vec<String>>>,
    pub configs: Rc<RefCell<Vec<EffectiveBoardConfig>>>,
}

impl FakeBackend {
    pub fn new() -> FakeBackend {
        FakeBackend::default()
    }

    pub fn failing(mut self, host: &str, at: FailAt) -> FakeBackend {
        self.failures.insert(host.to_string(), at);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn calls_for(&self, host: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.ends_with(&format!(" {host}")))
            .collect()
    }
}

impl ControlBackend for FakeBackend {
    fn open(&self, host: &str) -> Result<Box<dyn BoardSession>, SnapError> {
        self.calls.borrow_mut().push(format!("open {host}"));
        let fail_at = self.failures.get(host).copied();
        if fail_at == Some(FailAt::Open) {
            return Err(SnapError::Connection {
                host: host.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(Box::new(FakeSession {
            host: host.to_string(),
            fail_at,
            calls: Rc::clone(&self.calls),
            configs: Rc::clone(&self.configs),
        }))
    }
}

struct FakeSession {
    host: String,
    fail_at: Option<FailAt>,
    calls: Rc<RefCell<Vec<String>>>,
    configs: Rc<RefCell<Vec<EffectiveBoardConfig>>>,
}

impl FakeSession {
    fn record(&self, call: &str) {
        self.calls.borrow_mut().push(format!("{call} {}", self.host));
    }
}

impl BoardSession for FakeSession {
    fn host(&self) -> &str {
        &self.host
    }

    fn program(&mut self, fpgfile: &Path) -> Result<(), SnapError> {
        self.record("program");
        if self.fail_at == Some(FailAt::Program) {
            return Err(SnapError::Programming {
                host: self.host.clone(),
                fpgfile: fpgfile.into(),
                reason: "bitstream rejected".to_string(),
            });
        }
        Ok(())
    }

    fn configure_stream(&mut self, config: &EffectiveBoardConfig) -> Result<(), SnapError> {
        self.record("configure");
        self.configs.borrow_mut().push(config.clone());
        if self.fail_at == Some(FailAt::Configure) {
            return Err(SnapError::StreamConfig {
                host: self.host.clone(),
                reason: "arp table write failed".to_string(),
            });
        }
        Ok(())
    }

    fn telemetry(&mut self) -> Result<Telemetry, SnapError> {
        self.record("telemetry");
        if self.fail_at == Some(FailAt::Telemetry) {
            return Err(SnapError::Telemetry {
                host: self.host.clone(),
                reason: "status read timed out".to_string(),
            });
        }
        Ok(Telemetry {
            gbps: 6.25,
            packet_rate: 190734,
            flags: vec![],
        })
    }

    fn close(&mut self) -> Result<(), SnapError> {
        self.record("close");
        if self.fail_at == Some(FailAt::Close) {
            return Err(SnapError::Connection {
                host: self.host.clone(),
                reason: "session already gone".to_string(),
            });
        }
        Ok(())
    }
}
