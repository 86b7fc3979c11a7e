//! Observer surface notified as the parser's view of a station updates.
//!
//! Two ways to receive updates are provided, at no cost to each other:
//!
//! - [`Handler`], a trait with one default (no-op) method per field. It's
//!   generic and monomorphized -- no function pointers, no `void*`, no
//!   allocation -- and is the primary, `no_std`-friendly surface.
//! - [`Event`] plus [`FnHandler`], an adapter over [`Handler`] for callers
//!   who'd rather match on a single tagged enum than implement nine methods.
//!
//! None of these callbacks carry the new field value for PS/RT/AF; they're
//! change notifications, and the caller reads the published content back
//! through the [`crate::Parser`] accessors, matching the rest of this
//! crate's accessor-based retrieval contract.

use crate::block::RtFlag;

/// Receives notifications as [`crate::Parser`] decodes new station data.
///
/// Every method has a no-op default, so implementors only need to override
/// the fields they care about.
pub trait Handler {
    /// The Programme Identification code changed.
    fn on_pi(&mut self, _pi: u16) {}
    /// The Programme Type changed.
    fn on_pty(&mut self, _pty: u8) {}
    /// The Traffic Programme flag changed.
    fn on_tp(&mut self, _tp: bool) {}
    /// The Traffic Announcement flag changed.
    fn on_ta(&mut self, _ta: bool) {}
    /// The Music/Speech flag changed.
    fn on_ms(&mut self, _ms: bool) {}
    /// The Extended Country Code changed.
    fn on_ecc(&mut self, _ecc: u8) {}
    /// A new Alternative Frequency code was received.
    fn on_af(&mut self, _af: u8) {}
    /// The published Programme Service name changed; read it back via
    /// [`crate::Parser::ps`].
    fn on_ps(&mut self) {}
    /// The published RadioText buffer identified by `flag` changed; read it
    /// back via [`crate::Parser::rt`].
    fn on_rt(&mut self, _flag: RtFlag) {}
}

/// A no-op handler, useful when only the accessors are needed and no
/// notifications are.
impl Handler for () {}

/// A single tagged notification, for callers who'd rather match on one enum
/// than implement [`Handler`]'s nine methods.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Event {
    /// See [`Handler::on_pi`].
    Pi(u16),
    /// See [`Handler::on_pty`].
    Pty(u8),
    /// See [`Handler::on_tp`].
    Tp(bool),
    /// See [`Handler::on_ta`].
    Ta(bool),
    /// See [`Handler::on_ms`].
    Ms(bool),
    /// See [`Handler::on_ecc`].
    Ecc(u8),
    /// See [`Handler::on_af`].
    Af(u8),
    /// See [`Handler::on_ps`].
    Ps,
    /// See [`Handler::on_rt`].
    Rt(RtFlag),
}

/// Adapts any `FnMut(Event)` closure into a [`Handler`].
pub struct FnHandler<F>(pub F)
where
    F: FnMut(Event);

impl<F> Handler for FnHandler<F>
where
    F: FnMut(Event),
{
    fn on_pi(&mut self, pi: u16) {
        (self.0)(Event::Pi(pi));
    }
    fn on_pty(&mut self, pty: u8) {
        (self.0)(Event::Pty(pty));
    }
    fn on_tp(&mut self, tp: bool) {
        (self.0)(Event::Tp(tp));
    }
    fn on_ta(&mut self, ta: bool) {
        (self.0)(Event::Ta(ta));
    }
    fn on_ms(&mut self, ms: bool) {
        (self.0)(Event::Ms(ms));
    }
    fn on_ecc(&mut self, ecc: u8) {
        (self.0)(Event::Ecc(ecc));
    }
    fn on_af(&mut self, af: u8) {
        (self.0)(Event::Af(af));
    }
    fn on_ps(&mut self) {
        (self.0)(Event::Ps);
    }
    fn on_rt(&mut self, flag: RtFlag) {
        (self.0)(Event::Rt(flag));
    }
}
