//! Per-(text, block-role) error-correction admission thresholds.
//!
//! Each reconstructed text has an "info" block (carrying the group-type
//! structure) and a "data" block (carrying the characters themselves).
//! Broadcasters vary in how aggressively they apply error correction before
//! transmission, so this decoder lets the caller configure, per text and per
//! role, the worst [`BlockError`] it is still willing to trust -- exactly
//! mirroring the two-valued `INFO`/`DATA` correction levels of the reference
//! implementation this module is modeled on.

use crate::block::BlockError;

/// Which reconstructed text a correction threshold applies to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextKind {
    /// The Programme Service name.
    Ps,
    /// RadioText.
    Rt,
}

/// Which half of a group a character (or character pair) was carried in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlockRole {
    /// The block carrying the group-type/addressing structure (block B).
    Info,
    /// The block(s) carrying the actual characters (PS: block D; RT version
    /// A: blocks C and D together; RT version B: block D).
    Data,
}

impl BlockRole {
    fn index(self) -> usize {
        match self {
            BlockRole::Info => 0,
            BlockRole::Data => 1,
        }
    }
}

/// The worst [`BlockError`] a reconstructed character is still admitted at,
/// per text and per block role.
///
/// Defaults to [`BlockError::None`] everywhere, matching the reference
/// library's conservative factory default: callers opt into tolerating
/// noisier blocks explicitly, per text and per role, via
/// [`CorrectionTable::set_threshold`]. The ceiling is [`BlockError::Large`]:
/// a threshold can never be relaxed to admit an [`BlockError::Uncorrectable`]
/// block, since such a block carries no trustworthy bits at all.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CorrectionTable {
    ps: [BlockError; 2],
    rt: [BlockError; 2],
}

impl Default for CorrectionTable {
    fn default() -> Self {
        CorrectionTable {
            ps: [BlockError::None; 2],
            rt: [BlockError::None; 2],
        }
    }
}

impl CorrectionTable {
    /// Creates a table with the library default threshold
    /// ([`BlockError::None`]) for every text and block role.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current admission threshold for `kind`/`role`.
    pub fn threshold(&self, kind: TextKind, role: BlockRole) -> BlockError {
        let table = match kind {
            TextKind::Ps => &self.ps,
            TextKind::Rt => &self.rt,
        };
        table[role.index()]
    }

    /// Sets the admission threshold for `kind`/`role`. Values above
    /// [`BlockError::Large`] are clamped down to it, since an
    /// [`BlockError::Uncorrectable`] block must never be admitted.
    pub fn set_threshold(&mut self, kind: TextKind, role: BlockRole, max_error: BlockError) {
        let max_error = if max_error > BlockError::Large {
            BlockError::Large
        } else {
            max_error
        };
        let table = match kind {
            TextKind::Ps => &mut self.ps,
            TextKind::Rt => &mut self.rt,
        };
        table[role.index()] = max_error;
    }

    /// Whether a block with error level `observed` is admissible for
    /// `kind`/`role` under the current table.
    pub fn admits(&self, kind: TextKind, role: BlockRole, observed: BlockError) -> bool {
        observed <= self.threshold(kind, role)
    }
}
