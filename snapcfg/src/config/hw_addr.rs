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

//! Hardware (MAC) addresses as written in layout files.
//!
//! Layout files in the wild spell MAC addresses several ways. All of the following describe
//! the same address:
//!
//! ```yaml
//! mac: "02:02:0a:29:00:65"
//! mac: "02-02-0a-29-00-65"
//! mac: "0x02020a290065"
//! mac: 0x02020a290065
//! mac: 2207783649381
//! ```
//!
//! The 10GbE core is handed the address as a plain integer, so that is what [`MacAddress`]
//! serializes to.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const MAC_MAX: u64 = 0xFFFF_FFFF_FFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress(u64);

impl MacAddress {
    pub fn new(value: u64) -> Result<MacAddress, String> {
        if value > MAC_MAX {
            return Err(format!("{value:#x} does not fit in 48 bits"));
        }
        Ok(MacAddress(value))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl FromStr for MacAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(hex) = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            let value = u64::from_str_radix(hex, 16)
                .map_err(|e| format!("'{s}' is not a hexadecimal MAC address: {e}"))?;
            return MacAddress::new(value);
        }

        let octets: Vec<&str> = trimmed.split([':', '-']).collect();
        if octets.len() == 6 {
            let mut value = 0u64;
            for octet in octets {
                if octet.is_empty() || octet.len() > 2 {
                    return Err(format!("'{s}' has a malformed octet '{octet}'"));
                }
                let byte = u8::from_str_radix(octet, 16)
                    .map_err(|e| format!("'{s}' has a malformed octet '{octet}': {e}"))?;
                value = (value << 8) | u64::from(byte);
            }
            return Ok(MacAddress(value));
        }

        // plain decimal integers occasionally end up quoted
        match trimmed.parse::<u64>() {
            Ok(value) => MacAddress::new(value),
            Err(_) => Err(format!("'{s}' is not a MAC address")),
        }
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0.to_be_bytes();
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[2], b[3], b[4], b[5], b[6], b[7]
        )
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

struct MacAddressVisitor;

impl Visitor<'_> for MacAddressVisitor {
    type Value = MacAddress;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a MAC address as xx:xx:xx:xx:xx:xx, a 0x-prefixed hex string or an integer")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        MacAddress::new(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        let v = u64::try_from(v).map_err(|_| E::custom(format!("{v} is negative")))?;
        self.visit_u64(v)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MacAddressVisitor)
    }
}
