// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw record wire format.
//!
//! The capture companion writes fixed-size frames: a little-endian `u32`
//! event-type code followed by a 64-byte NUL-padded device identifier
//! (the USB serial string as read from the kernel).

use crate::error::SourceError;
use crate::event::{DeviceEvent, DeviceEventKind, DeviceId};

/// Length of the device identifier field in a raw record.
pub const DEVICE_ID_LEN: usize = 64;

/// Total length of one raw record frame on the wire.
pub const RAW_RECORD_LEN: usize = 4 + DEVICE_ID_LEN;

/// One undecoded record as read from the event source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Event-type code (1 = attached, 2 = detached).
    pub kind_code: u32,
    /// NUL-padded device identifier bytes.
    pub device_id: [u8; DEVICE_ID_LEN],
}

impl RawRecord {
    /// Builds a record from an identifier and kind, NUL-padding the
    /// identifier field. Identifiers longer than the field are truncated.
    #[must_use]
    pub fn new(device_id: &[u8], kind: DeviceEventKind) -> Self {
        let mut field = [0u8; DEVICE_ID_LEN];
        let len = device_id.len().min(DEVICE_ID_LEN);
        field[..len].copy_from_slice(&device_id[..len]);
        Self {
            kind_code: kind.code(),
            device_id: field,
        }
    }

    /// Parses one wire frame.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MalformedRecord`] if the frame is not
    /// exactly [`RAW_RECORD_LEN`] bytes.
    pub fn from_frame(frame: &[u8]) -> Result<Self, SourceError> {
        if frame.len() != RAW_RECORD_LEN {
            return Err(SourceError::MalformedRecord(format!(
                "expected {RAW_RECORD_LEN}-byte frame, got {} bytes",
                frame.len()
            )));
        }
        let kind_code = u32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]);
        let mut device_id = [0u8; DEVICE_ID_LEN];
        device_id.copy_from_slice(&frame[4..]);
        Ok(Self {
            kind_code,
            device_id,
        })
    }

    /// Serializes the record into its wire frame.
    #[must_use]
    pub fn to_frame(&self) -> [u8; RAW_RECORD_LEN] {
        let mut frame = [0u8; RAW_RECORD_LEN];
        frame[..4].copy_from_slice(&self.kind_code.to_le_bytes());
        frame[4..].copy_from_slice(&self.device_id);
        frame
    }

    /// Decodes the record into a typed event.
    ///
    /// The identifier is truncated at its first NUL byte; the remaining
    /// bytes are preserved exactly.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MalformedRecord`] if the event-type code is
    /// unknown.
    pub fn decode(&self) -> Result<DeviceEvent, SourceError> {
        let kind = DeviceEventKind::from_code(self.kind_code).ok_or_else(|| {
            SourceError::MalformedRecord(format!("unknown event-type code {}", self.kind_code))
        })?;
        let len = self
            .device_id
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(DEVICE_ID_LEN);
        let device_id = DeviceId::from_bytes(self.device_id[..len].to_vec());
        Ok(DeviceEvent::new(device_id, kind))
    }
}
