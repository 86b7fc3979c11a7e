//! The frame router: ties every collaborator together behind one
//! `parse`/`parse_string` entry point.

use crate::af::{self, AfByte, AfMap};
use crate::block::{BlockError, Group, RtFlag, Version};
use crate::correction::{BlockRole, CorrectionTable, TextKind};
use crate::dispatch::Handler;
use crate::error::Error;
use crate::hex;
use crate::scalar::Scalar;
use crate::text::{StringError, Text};
use crate::{PS_LENGTH, RT_LENGTH};

/// Decodes a stream of RDS [`Group`]s into a station's metadata, notifying
/// `H` of every change.
///
/// Stack-resident and `Copy`-free but otherwise ordinary: there's no
/// separate "heap" and "embedded" construction mode the way the reference
/// library has, since every buffer here is already a compile-time constant
/// size. A caller who wants a heap-allocated instance just writes
/// `Box::new(Parser::new(handler))`.
pub struct Parser<H = ()> {
    handler: H,
    pi: Scalar<u16>,
    pty: Scalar<u8>,
    tp: Scalar<bool>,
    ta: Scalar<bool>,
    ms: Scalar<bool>,
    ecc: Scalar<u8>,
    af: AfMap,
    af_follow_count: Option<u8>,
    ps: Text<PS_LENGTH>,
    rt: [Text<RT_LENGTH>; 2],
    last_rt_flag: Option<RtFlag>,
    correction: CorrectionTable,
    busy: bool,
}

impl<H: Handler> Parser<H> {
    /// Creates a new parser, ready to receive groups.
    pub fn new(handler: H) -> Self {
        Parser {
            handler,
            pi: Scalar::new(),
            pty: Scalar::new(),
            tp: Scalar::new(),
            ta: Scalar::new(),
            ms: Scalar::new(),
            ecc: Scalar::new(),
            af: AfMap::new(),
            af_follow_count: None,
            ps: Text::new(),
            rt: [Text::with_terminator(0x0D), Text::with_terminator(0x0D)],
            last_rt_flag: None,
            correction: CorrectionTable::new(),
            busy: false,
        }
    }

    /// Creates a new parser on the heap.
    ///
    /// Every buffer here is already a compile-time constant size, so this is
    /// never required to avoid a stack overflow the way it might be for the
    /// reference library's heap mode; it exists purely for callers who'd
    /// rather hold a `Box<Parser<H>>` (e.g. behind a trait object elsewhere
    /// in their program) than a bare value.
    #[cfg(feature = "alloc")]
    pub fn new_boxed(handler: H) -> alloc::boxed::Box<Self> {
        alloc::boxed::Box::new(Self::new(handler))
    }

    /// Replaces the handler, returning the previous one.
    ///
    /// Registration is forbidden while a callback is running (re-entrant
    /// use); `Err` hands the rejected `handler` back to the caller rather
    /// than dropping it.
    pub fn set_handler(&mut self, handler: H) -> Result<H, H> {
        if self.busy {
            warn!("set_handler() called re-entrantly from within a callback; ignoring");
            return Err(handler);
        }
        Ok(core::mem::replace(&mut self.handler, handler))
    }

    /// Borrows the handler mutably (e.g. to inspect state it accumulated).
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Resets all scalars to unknown, zeroes the AF bitmap, wipes PS/RT
    /// state, and forgets the last RT flag.
    pub fn clear(&mut self) -> bool {
        if self.busy {
            warn!("clear() called re-entrantly; ignoring");
            return false;
        }
        self.pi.clear();
        self.pty.clear();
        self.tp.clear();
        self.ta.clear();
        self.ms.clear();
        self.ecc.clear();
        self.af.clear();
        self.af_follow_count = None;
        self.ps.clear();
        self.rt[0].clear();
        self.rt[1].clear();
        self.last_rt_flag = None;
        true
    }

    /// The current admission threshold for `kind`/`role`.
    pub fn get_text_correction(&self, kind: TextKind, role: BlockRole) -> BlockError {
        self.correction.threshold(kind, role)
    }

    /// Sets the admission threshold for `kind`/`role` (clamped to
    /// [`BlockError::Large`]).
    pub fn set_text_correction(&mut self, kind: TextKind, role: BlockRole, max_error: BlockError) {
        self.correction.set_threshold(kind, role, max_error);
    }

    /// Whether `kind` renders (and dispatches) tentative characters before
    /// becoming fully available.
    pub fn get_text_progressive(&self, kind: TextKind) -> bool {
        match kind {
            TextKind::Ps => self.ps.is_progressive(),
            TextKind::Rt => self.rt[0].is_progressive(),
        }
    }

    /// Sets progressive rendering for `kind`.
    pub fn set_text_progressive(&mut self, kind: TextKind, on: bool) {
        match kind {
            TextKind::Ps => self.ps.set_progressive(on),
            TextKind::Rt => {
                self.rt[0].set_progressive(on);
                self.rt[1].set_progressive(on);
            }
        }
    }

    /// The current Programme Identification code.
    pub fn pi(&self) -> Option<u16> {
        self.pi.get()
    }

    /// The current Programme Type.
    pub fn pty(&self) -> Option<u8> {
        self.pty.get()
    }

    /// The current Traffic Programme flag.
    pub fn tp(&self) -> Option<bool> {
        self.tp.get()
    }

    /// The current Traffic Announcement flag.
    pub fn ta(&self) -> Option<bool> {
        self.ta.get()
    }

    /// The current Music/Speech flag.
    pub fn ms(&self) -> Option<bool> {
        self.ms.get()
    }

    /// The current Extended Country Code.
    pub fn ecc(&self) -> Option<u8> {
        self.ecc.get()
    }

    /// The most recently observed AF "follow" header (number of further AF
    /// codes the station announced), if any. Informational only.
    pub fn af_follow_count(&self) -> Option<u8> {
        self.af_follow_count
    }

    /// The Alternative Frequency bitmap.
    pub fn af(&self) -> &AfMap {
        &self.af
    }

    /// The reconstructed Programme Service name.
    pub fn ps(&self) -> &Text<PS_LENGTH> {
        &self.ps
    }

    /// One of the two reconstructed RadioText buffers.
    pub fn rt(&self, flag: RtFlag) -> &Text<RT_LENGTH> {
        &self.rt[flag.index()]
    }

    /// Decodes one RDS group, routing its fields and notifying the handler
    /// of every admitted change.
    ///
    /// Returns `false` if the group was rejected outright (PI or group-type
    /// block uncorrectable) or if this call was re-entrant.
    pub fn parse(&mut self, group: Group) -> bool {
        if self.busy {
            warn!("parse() called re-entrantly from within a callback; ignoring");
            return false;
        }
        if group.error_a() == BlockError::Uncorrectable || group.error_b() == BlockError::Uncorrectable {
            return false;
        }

        self.busy = true;

        if group.error_a() == BlockError::None {
            if self.pi.observe(group.pi()) {
                self.handler.on_pi(self.pi.get().unwrap());
            }
        }

        if group.error_b() == BlockError::None {
            if self.pty.observe(group.pty()) {
                self.handler.on_pty(self.pty.get().unwrap());
            }
            if self.tp.observe(group.tp()) {
                self.handler.on_tp(self.tp.get().unwrap());
            }

            match (group.group_type(), group.version()) {
                (0, _) => self.route_group0(&group),
                (1, Version::A) => self.route_group1a(&group),
                (2, Version::A) => self.route_group2a(&group),
                (2, Version::B) => self.route_group2b(&group),
                _ => {}
            }
        }

        self.busy = false;
        true
    }

    fn route_group0(&mut self, group: &Group) {
        if self.ta.observe(group.ta()) {
            self.handler.on_ta(self.ta.get().unwrap());
        }
        if self.ms.observe(group.ms()) {
            self.handler.on_ms(self.ms.get().unwrap());
        }

        if group.version() == Version::A && group.error_c() == BlockError::None {
            for byte in [group.af1(), group.af2()] {
                match af::classify(byte) {
                    AfByte::Frequency(code) => {
                        if !self.af.contains(code) && self.af.insert(code) {
                            self.handler.on_af(code);
                        }
                    }
                    AfByte::Follow(n) => self.af_follow_count = Some(n),
                    AfByte::Ignored => {}
                }
            }
        }

        if self.correction.admits(TextKind::Ps, BlockRole::Data, group.error_d()) {
            let offset = group.ps_segment() as usize * 2;
            let error = StringError::from_block_error(group.error_d());
            self.ps.observe_segment(offset, &group.ps_chars(), error);
        }
        if self.ps.poll().is_some() {
            self.handler.on_ps();
        }
    }

    fn route_group1a(&mut self, group: &Group) {
        if group.error_c() == BlockError::None {
            if let Some(ecc) = group.ecc() {
                if self.ecc.observe(ecc) {
                    self.handler.on_ecc(ecc);
                }
            }
        }
    }

    fn route_group2a(&mut self, group: &Group) {
        let data_error = core::cmp::max(group.error_c(), group.error_d());
        if self.correction.admits(TextKind::Rt, BlockRole::Data, data_error) {
            let offset = group.rt_segment() as usize * 4;
            let error = StringError::from_block_error(data_error);
            self.accept_rt_segment(group.rt_flag(), offset, &group.rt_chars_version_a(), error);
        }
    }

    fn route_group2b(&mut self, group: &Group) {
        if self.correction.admits(TextKind::Rt, BlockRole::Data, group.error_d()) {
            let offset = group.rt_segment() as usize * 2;
            let error = StringError::from_block_error(group.error_d());
            self.accept_rt_segment(group.rt_flag(), offset, &group.rt_chars_version_b(), error);
        }
    }

    fn accept_rt_segment(&mut self, flag: RtFlag, offset: usize, chars: &[u8], error: StringError) {
        if let Some(prev) = self.last_rt_flag {
            if prev == flag.other() {
                self.rt[prev.index()].clear();
            }
        }
        self.last_rt_flag = Some(flag);

        self.rt[flag.index()].observe_segment(offset, chars, error);
        if self.rt[flag.index()].poll().is_some() {
            self.handler.on_rt(flag);
        }
    }

    /// Parses a 16- or 18-hex-digit ASCII line: `AAAABBBBCCCCDDDD` plus an
    /// optional trailing error byte. Returns `false` (and leaves all state
    /// unchanged) if the line is malformed or this call was re-entrant.
    pub fn parse_string(&mut self, line: &str) -> bool {
        match hex::parse_line(line) {
            Some((blocks, errors)) => self.parse(Group::new(blocks, errors)),
            None => false,
        }
    }

    /// Like [`Parser::parse_string`], but surfaces *why* a malformed line
    /// was rejected rather than collapsing it to `false`.
    pub fn try_parse_string(&mut self, line: &str) -> Result<bool, Error> {
        match hex::parse_line(line) {
            Some((blocks, errors)) => Ok(self.parse(Group::new(blocks, errors))),
            None => Err(Error::MalformedLine),
        }
    }
}

impl Default for Parser<()> {
    fn default() -> Self {
        Parser::new(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Event, FnHandler};

    extern crate std;
    use std::vec::Vec;

    #[test]
    fn scenario_pi_pty_tp() {
        let mut seen: Vec<Event> = Vec::new();
        let mut parser = Parser::new(FnHandler(|e| seen.push(e)));
        assert!(parser.parse_string("1234567890123458"));
        assert_eq!(parser.pi(), Some(0x1234));
        assert_eq!(parser.pty(), Some(19));
        assert_eq!(parser.tp(), Some(true));
        assert!(seen.contains(&Event::Pi(0x1234)));
        assert!(seen.contains(&Event::Pty(19)));
        assert!(seen.contains(&Event::Tp(true)));
    }

    #[test]
    fn scenario_pi_with_uncorrectable_a_is_rejected() {
        // Trailing byte 0x03: eA = byte & 0x3 = 0b11 = Uncorrectable.
        let mut parser: Parser = Parser::default();
        assert!(!parser.parse_string("123456789012345803"));
        assert_eq!(parser.pi(), None);
    }

    #[test]
    fn scenario_af_two_codes() {
        let mut seen: Vec<Event> = Vec::new();
        let mut parser = Parser::new(FnHandler(|e| seen.push(e)));
        parser.parse_string("1234007890013458");
        parser.parse_string("1234007890013458");
        let contains_144 = parser.af().contains(144);
        let contains_1 = parser.af().contains(1);
        let af_events: Vec<Event> = seen.iter().copied().filter(|e| matches!(e, Event::Af(_))).collect();
        assert_eq!(af_events.len(), 2);
        assert!(contains_144);
        assert!(contains_1);
    }

    #[test]
    fn ps_two_stage_confirmation_across_four_segments() {
        let mut parser: Parser = Parser::default();
        // Four PS segments (ps_pos 0..3), each fed twice, chars ':','<','>', 'J' pairs.
        let segments = [
            (0u16, [b':', b';']),
            (1u16, [b'<', b'=']),
            (2u16, [b'>', b'?']),
            (3u16, [b'J', b'K']),
        ];
        for (pos, chars) in segments.iter() {
            let group = Group::new(
                [0x1234, 0x0000 | pos, 0x0000, ((chars[0] as u16) << 8) | chars[1] as u16],
                [BlockError::None; 4],
            );
            parser.parse(group);
            parser.parse(group);
        }
        assert!(parser.ps().is_available());
        assert_eq!(parser.ps().render().as_bytes(), b":;<=>?JK");
    }

    #[test]
    fn ps_rejects_low_confidence_under_default_strict_gate() {
        // Default correction threshold is NONE; a segment whose data block
        // (D) carries a LARGE error must be dropped outright.
        let mut parser: Parser = Parser::default();
        let mut group = Group::new([0x1234, 0x0000, 0x0000, 0x4142], [BlockError::None; 4]);
        group.errors[3] = BlockError::Large;
        parser.parse(group);
        parser.parse(group);

        assert!(!parser.ps().is_available());
        assert_eq!(parser.ps().render().as_bytes(), b"        ");
    }

    #[test]
    fn clear_resets_everything() {
        let mut parser: Parser = Parser::default();
        parser.parse_string("1234567890123458");
        assert!(parser.pi().is_some());
        assert!(parser.clear());
        assert_eq!(parser.pi(), None);
        assert_eq!(parser.pty(), None);
        assert!(!parser.ps().is_available());
    }

    #[test]
    fn reentrant_parse_is_rejected() {
        struct ReentrantHandler;
        impl Handler for ReentrantHandler {
            fn on_pi(&mut self, _pi: u16) {
                // Can't actually re-enter `parser` here (it's not reachable
                // from the handler), but we can exercise the guard directly.
            }
        }
        let mut parser = Parser::new(ReentrantHandler);
        parser.busy = true;
        assert!(!parser.parse_string("1234567890123458"));
        assert!(!parser.clear());
    }

    #[test]
    fn malformed_line_is_rejected_and_state_unchanged() {
        let mut parser: Parser = Parser::default();
        parser.parse_string("1234567890123458");
        let pi_before = parser.pi();
        assert!(!parser.parse_string("not-hex-at-all!!"));
        assert_eq!(parser.pi(), pi_before);
        assert_eq!(parser.try_parse_string("zz"), Err(Error::MalformedLine));
    }

    #[test]
    fn rt_flag_toggle_clears_only_the_opposite_buffer() {
        let mut parser: Parser = Parser::default();
        // RT-A, segment 0, four chars, twice to validate.
        let group_a = Group::new([0x1234, 0x2000, 0x4142, 0x4344], [BlockError::None; 4]);
        parser.parse(group_a);
        parser.parse(group_a);
        assert_eq!(&parser.rt(RtFlag::A).render().as_bytes()[0..4], b"ABCD");

        // Toggle to RT-B (bit 4 of B set) with different content.
        let group_b = Group::new([0x1234, 0x2010, 0x4142, 0x5859], [BlockError::None; 4]);
        parser.parse(group_b);
        parser.parse(group_b);

        // RT-A was cleared the moment the RT-B segment was admitted.
        assert!(!parser.rt(RtFlag::A).is_available());
        assert!(parser.rt(RtFlag::A).render().as_bytes().iter().all(|&b| b == b' '));
    }
}
