// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded device events.

use super::DeviceId;

/// What happened to the device.
///
/// The discriminants match the event-type codes emitted by the capture
/// companion (1 = attached, 2 = detached).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum DeviceEventKind {
    /// The device was plugged in.
    Attached = 1,
    /// The device was unplugged.
    Detached = 2,
}

impl DeviceEventKind {
    /// Decodes an event-type code from a raw record.
    ///
    /// Returns `None` for codes the companion does not emit.
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::Attached),
            2 => Some(Self::Detached),
            _ => None,
        }
    }

    /// Returns the wire code for this kind.
    #[must_use]
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// A decoded attach/detach event for a single USB device.
///
/// Constructed only by the watcher's decode step and handed to listeners
/// in the order the underlying source emitted the raw records.
///
/// # Examples
///
/// ```
/// use presence_lock::event::{DeviceEvent, DeviceEventKind, DeviceId};
///
/// let event = DeviceEvent::attached(DeviceId::from("X1"));
/// assert!(event.is_attached());
/// assert_eq!(event.device_id().to_string(), "X1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEvent {
    device_id: DeviceId,
    kind: DeviceEventKind,
}

impl DeviceEvent {
    /// Creates a new event.
    #[must_use]
    pub fn new(device_id: DeviceId, kind: DeviceEventKind) -> Self {
        Self { device_id, kind }
    }

    /// Creates an attach event.
    #[must_use]
    pub fn attached(device_id: DeviceId) -> Self {
        Self::new(device_id, DeviceEventKind::Attached)
    }

    /// Creates a detach event.
    #[must_use]
    pub fn detached(device_id: DeviceId) -> Self {
        Self::new(device_id, DeviceEventKind::Detached)
    }

    /// Returns the identifier of the device involved.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Returns the event kind.
    #[must_use]
    pub fn kind(&self) -> DeviceEventKind {
        self.kind
    }

    /// Returns `true` if this is an attach event.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.kind == DeviceEventKind::Attached
    }

    /// Returns `true` if this is a detach event.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.kind == DeviceEventKind::Detached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_code() {
        assert_eq!(DeviceEventKind::from_code(1), Some(DeviceEventKind::Attached));
        assert_eq!(DeviceEventKind::from_code(2), Some(DeviceEventKind::Detached));
        assert_eq!(DeviceEventKind::from_code(0), None);
        assert_eq!(DeviceEventKind::from_code(3), None);
    }

    #[test]
    fn kind_code_round_trip() {
        for kind in [DeviceEventKind::Attached, DeviceEventKind::Detached] {
            assert_eq!(DeviceEventKind::from_code(kind.code()), Some(kind));
        }
    }

    #[test]
    fn constructors() {
        let id = DeviceId::from("X1");

        let attached = DeviceEvent::attached(id.clone());
        assert!(attached.is_attached());
        assert!(!attached.is_detached());
        assert_eq!(attached.device_id(), &id);

        let detached = DeviceEvent::detached(id.clone());
        assert!(detached.is_detached());
        assert_eq!(detached.kind(), DeviceEventKind::Detached);
    }
}
