// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identifier type.

use std::fmt;

/// Identifier of a USB device, as reported by the kernel.
///
/// This is the device's serial string captured by the event source,
/// stored as raw bytes. The bytes are preserved exactly as decoded from
/// the raw record (trailing NUL padding already stripped); comparison is
/// byte-for-byte.
///
/// # Examples
///
/// ```
/// use presence_lock::event::DeviceId;
///
/// let id = DeviceId::from_bytes(b"0123456789ABCDEF".to_vec());
/// assert_eq!(id.to_string(), "0123456789ABCDEF");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct DeviceId(Vec<u8>);

impl DeviceId {
    /// Creates a device identifier from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the raw identifier bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns `true` if the identifier is empty.
    ///
    /// Devices without a serial string show up as empty identifiers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the identifier matches the given string
    /// byte-for-byte.
    #[must_use]
    pub fn matches_str(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", String::from_utf8_lossy(&self.0))
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}
