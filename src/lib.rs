//! A decoder for the Radio Data System (RDS) sideband carried on FM
//! broadcasts.
//!
//! Feed it [`Group`]s (four 16-bit blocks plus a per-block [`BlockError`])
//! and it maintains an incrementally-updated view of the station's
//! metadata: PI, PTY, TP/TA/MS, ECC, the Alternative Frequency list, the
//! Programme Service name, and the two RadioText buffers.
//!
//! The hard part is [`text`]: RDS spreads station and RadioText names over
//! many groups, in arbitrary order, with only a soft per-block error
//! estimate rather than a verified correction, so the engine has to decide
//! *when* a character is trustworthy and *when* a buffer is coherent enough
//! to publish. See [`text::Text`] for the two-stage tentative/validated
//! confidence machine that does this.
//!
//! Everything here is synchronous, single-threaded per [`Parser`], and
//! needs no heap: every buffer (8-character PS, two 64-character RT slots,
//! 26-byte AF bitmap) is a compile-time constant size.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "alloc")]
extern crate alloc;

#[macro_use]
mod log;

pub mod af;
pub mod block;
pub mod correction;
pub mod dispatch;
mod hex;
pub mod parser;
pub mod scalar;
pub mod text;
mod utils;

#[cfg(feature = "unicode")]
pub mod g0;

mod error;

pub use crate::af::AfMap;
pub use crate::block::{BlockError, Group, RtFlag, Version};
pub use crate::correction::{BlockRole, TextKind};
pub use crate::dispatch::{Event, FnHandler, Handler};
pub use crate::error::Error;
pub use crate::parser::Parser;
pub use crate::text::{RenderedString, StringError, Text};

/// Number of characters in the Programme Service name.
pub const PS_LENGTH: usize = 8;

/// Number of characters in a RadioText buffer.
pub const RT_LENGTH: usize = 64;

/// Size, in bytes, of the Alternative Frequency bitmap (208 codes, 1 bit
/// each, MSB-first per byte).
pub const AF_BUFFER_LEN: usize = 26;

/// A reconstructed Programme Service name (8 characters).
pub type Ps = Text<PS_LENGTH>;

/// A reconstructed RadioText buffer (64 characters).
pub type Rt = Text<RT_LENGTH>;
