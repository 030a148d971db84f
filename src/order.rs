//! Persisted toggle order.
//!
//! The user's chosen subset and order of toggles is stored as one string of
//! tokens joined by [`TOGGLE_DELIMITER`], e.g. `"WIFI|TORCH|BATTERY"`.
//! Parsing fails softly: unknown tokens written by a newer build are
//! skipped, duplicates keep their first position, and an input with nothing
//! usable falls back to the device's default order.

use heapless::Vec;
use log::{debug, warn};
use serde::Serialize;

use crate::registry::{DeviceCapabilities, ToggleKind};

/// Separator between tokens in the persisted string.
pub const TOGGLE_DELIMITER: char = '|';

// ---------------------------------------------------------------------------
// Toggle order
// ---------------------------------------------------------------------------

/// Ordered, duplicate-free sequence of toggle kinds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ToggleOrder {
    kinds: Vec<ToggleKind, { ToggleKind::COUNT }>,
}

impl ToggleOrder {
    pub fn new() -> Self {
        Self { kinds: Vec::new() }
    }

    /// Append `kind` unless it is already present.  Returns `true` if added.
    pub fn push(&mut self, kind: ToggleKind) -> bool {
        if self.contains(kind) {
            return false;
        }
        // Capacity equals the number of kinds, so a duplicate-free push
        // always fits.
        self.kinds.push(kind).is_ok()
    }

    pub fn contains(&self, kind: ToggleKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = ToggleKind> + '_ {
        self.kinds.iter().copied()
    }

    pub fn as_slice(&self) -> &[ToggleKind] {
        &self.kinds
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Copy of this order without the kinds `keep` rejects.
    pub fn filtered(&self, mut keep: impl FnMut(ToggleKind) -> bool) -> Self {
        let mut out = Self::new();
        for kind in self.iter().filter(|k| keep(*k)) {
            out.push(kind);
        }
        out
    }
}

impl FromIterator<ToggleKind> for ToggleOrder {
    fn from_iter<I: IntoIterator<Item = ToggleKind>>(iter: I) -> Self {
        let mut out = Self::new();
        for kind in iter {
            out.push(kind);
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Parse / serialize
// ---------------------------------------------------------------------------

/// Parses and serializes the persisted order for one device.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToggleOrderConfig {
    caps: DeviceCapabilities,
}

impl ToggleOrderConfig {
    pub fn new(caps: DeviceCapabilities) -> Self {
        Self { caps }
    }

    /// Parse a persisted order string.  Never returns an empty order.
    pub fn parse(&self, raw: Option<&str>) -> ToggleOrder {
        let Some(raw) = raw.filter(|s| !s.is_empty()) else {
            debug!("order: no stored toggles, using default");
            return self.default_order();
        };

        let mut order = ToggleOrder::new();
        for token in raw.split(TOGGLE_DELIMITER) {
            if token.is_empty() {
                continue;
            }
            match ToggleKind::from_token(token) {
                Some(kind) => {
                    if !order.push(kind) {
                        debug!("order: duplicate token '{}' dropped", token);
                    }
                }
                None => debug!("order: unknown token '{}' skipped", token),
            }
        }

        if order.is_empty() {
            warn!("order: '{}' has no known toggles, using default", raw);
            return self.default_order();
        }
        order
    }

    /// The fallback order for this device.
    pub fn default_order(&self) -> ToggleOrder {
        default_order(&self.caps)
    }

    pub fn caps(&self) -> &DeviceCapabilities {
        &self.caps
    }
}

/// Join tokens with the delimiter.  Inverse of [`ToggleOrderConfig::parse`]
/// for any duplicate-free sequence of known tokens.
pub fn serialize(order: &ToggleOrder) -> String {
    let mut out = String::new();
    for (i, kind) in order.iter().enumerate() {
        if i > 0 {
            out.push(TOGGLE_DELIMITER);
        }
        out.push_str(kind.token());
    }
    out
}

/// Default order: every kind the registry shows by default on this device,
/// in catalogue order.
pub fn default_order(caps: &DeviceCapabilities) -> ToggleOrder {
    ToggleKind::ALL
        .iter()
        .copied()
        .filter(|k| caps.shows_by_default(*k))
        .collect()
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Columns-per-row setting and the tile text size derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PanelLayout {
    pub columns: u8,
    /// Tile label size in scaled pixels.
    pub text_size_sp: u8,
}

impl PanelLayout {
    pub fn from_columns(columns: u8) -> Self {
        let columns = columns.max(1);
        let text_size_sp = match columns {
            5 => 8,
            4 => 10,
            _ => 12,
        };
        Self {
            columns,
            text_size_sp,
        }
    }
}
