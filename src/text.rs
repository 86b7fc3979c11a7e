//! The string reconstructor: the core of this crate.
//!
//! RDS spreads a station name or RadioText message over many groups,
//! delivered a couple of characters at a time, in arbitrary order, with only
//! a soft per-block error estimate rather than a verified correction. This
//! module decides, position by position, when a character is trustworthy
//! enough to call "validated" rather than merely "tentative", and when a
//! whole buffer is coherent enough to hand to the caller.
//!
//! [`Text<N>`] is generic over the buffer length so the Programme Service
//! name (8 characters) and the two RadioText buffers (64 characters each)
//! are the same type with different `N`.

use crate::block::BlockError;

/// Fine-grained per-position confidence diagnostic.
///
/// Finer than [`BlockError`]'s four levels because a position's error is a
/// running minimum taken over possibly several accepted observations, and
/// callers displaying per-character confidence want room to show "getting
/// better" without a position jumping straight from some error to `None`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum StringError {
    /// No error at all.
    None = 0,
    Smallest,
    ExtraSmall,
    Small,
    MediumSmall,
    Medium,
    MediumLarge,
    Large,
    ExtraLarge,
    Largest,
    /// Never assigned to an admitted character (uncorrectable blocks are
    /// rejected before admission); used only to report a total value for a
    /// position that has never been written.
    Uncorrectable,
}

impl StringError {
    /// Quantizes a [`BlockError`] (as used at admission time) into its
    /// corresponding `StringError` grade.
    pub fn from_block_error(error: BlockError) -> Self {
        match error {
            BlockError::None => StringError::None,
            BlockError::Small => StringError::Medium,
            BlockError::Large => StringError::Large,
            BlockError::Uncorrectable => StringError::Uncorrectable,
        }
    }
}

/// One character slot's two-stage confidence state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
struct Position {
    tentative: Option<(u8, StringError)>,
    validated: Option<(u8, StringError)>,
}

impl Position {
    /// Applies one accepted observation. Returns whether the validated slot
    /// changed as a result (new value, improved error, or lost validation).
    fn observe(&mut self, c: u8, e: StringError) -> bool {
        match self.validated {
            Some((vc, ve)) if vc == c => {
                let merged = if e < ve { e } else { ve };
                let changed = merged != ve;
                self.validated = Some((c, merged));
                changed
            }
            Some(_) => {
                // Contradicts the validated character: one stray reception
                // cannot unilaterally flip a confirmed position.
                self.validated = None;
                self.tentative = Some((c, e));
                true
            }
            None => match self.tentative {
                Some((tc, te)) if tc == c => {
                    let merged = if e < te { e } else { te };
                    self.validated = Some((c, merged));
                    self.tentative = None;
                    true
                }
                _ => {
                    self.tentative = Some((c, e));
                    false
                }
            },
        }
    }

    fn clear(&mut self) {
        self.tentative = None;
        self.validated = None;
    }

    fn rendered(&self, progressive: bool) -> Option<(u8, StringError)> {
        self.validated.or_else(|| if progressive { self.tentative } else { None })
    }

    fn error(&self, progressive: bool) -> StringError {
        match self.validated {
            Some((_, e)) => e,
            None => match self.tentative {
                Some((_, e)) if progressive => e,
                _ => StringError::Uncorrectable,
            },
        }
    }
}

/// A fixed-size, `Copy` snapshot of a reconstructed string's rendered
/// content.
///
/// Always exposes its content as raw RDS bytes via [`RenderedString::as_bytes`];
/// RDS bytes outside the printable ASCII range are not generally valid UTF-8
/// on their own, so there is no blanket `Deref<Target = str>`. Under the
/// `unicode` feature, [`RenderedString::chars`] maps each byte through the
/// RDS G0 table lazily.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct RenderedString<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> Default for RenderedString<N> {
    fn default() -> Self {
        RenderedString {
            bytes: [b' '; N],
            len: N,
        }
    }
}

impl<const N: usize> RenderedString<N> {
    /// The rendered content as raw RDS bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Number of valid bytes (may be less than `N` for a RadioText buffer
    /// truncated at a CR terminator).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the rendered content is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates the rendered content as `char`s, mapping each byte through
    /// the RDS G0 table.
    #[cfg(feature = "unicode")]
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.as_bytes().iter().map(|&b| crate::g0::to_char(b))
    }
}

/// A reconstructed string of `N` characters: the Programme Service name
/// (`N = 8`) or one RadioText buffer (`N = 64`).
#[derive(Copy, Clone, Debug)]
pub struct Text<const N: usize> {
    positions: [Position; N],
    terminator: Option<u8>,
    progressive: bool,
    available: bool,
    was_available: bool,
    dirty: bool,
    last_published: RenderedString<N>,
}

impl<const N: usize> Default for Text<N> {
    fn default() -> Self {
        Text {
            positions: [Position {
                tentative: None,
                validated: None,
            }; N],
            terminator: None,
            progressive: false,
            available: false,
            was_available: false,
            dirty: false,
            last_published: RenderedString::default(),
        }
    }
}

impl<const N: usize> Text<N> {
    /// Creates an empty text with no terminator byte (suitable for PS).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty text that truncates its rendered content at the
    /// first validated occurrence of `terminator` (suitable for RT, with
    /// `terminator = 0x0D`).
    pub fn with_terminator(terminator: u8) -> Self {
        Text {
            terminator: Some(terminator),
            ..Self::default()
        }
    }

    /// Number of character positions (`N`).
    pub fn length(&self) -> usize {
        N
    }

    /// Whether every position currently holds a validated character.
    ///
    /// This is sticky: once reached it is only revoked by [`Text::clear`],
    /// never by a later single-position contradiction.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Whether tentative characters are rendered (and dispatched) before a
    /// position -- or the whole string -- becomes validated.
    pub fn is_progressive(&self) -> bool {
        self.progressive
    }

    /// Sets progressive rendering.
    pub fn set_progressive(&mut self, on: bool) {
        self.progressive = on;
    }

    /// Wipes all tentative/validated state and revokes availability.
    pub fn clear(&mut self) {
        for position in &mut self.positions {
            position.clear();
        }
        self.available = false;
        self.was_available = false;
        self.dirty = false;
        self.last_published = RenderedString::default();
    }

    /// Applies one admitted segment: `chars.len()` characters at `offset`,
    /// all carrying the same quantized error `error`.
    ///
    /// Returns whether any touched position's validated slot changed.
    pub fn observe_segment(&mut self, offset: usize, chars: &[u8], error: StringError) -> bool {
        let mut changed = false;
        for (k, &c) in chars.iter().enumerate() {
            let i = offset + k;
            if i >= N {
                break;
            }
            if self.positions[i].observe(c, error) {
                changed = true;
            }
        }
        if changed {
            self.dirty = true;
            if !self.available && self.positions.iter().all(|p| p.validated.is_some()) {
                self.available = true;
            }
        }
        changed
    }

    fn terminator_limit(&self) -> usize {
        match self.terminator {
            Some(t) => self
                .positions
                .iter()
                .position(|p| matches!(p.validated, Some((c, _)) if c == t))
                .unwrap_or(N),
            None => N,
        }
    }

    /// Renders the current content: validated character where present,
    /// otherwise the tentative character if [`Text::is_progressive`], else a
    /// space. Truncated at the terminator byte (if any) as found in the
    /// validated layer.
    pub fn render(&self) -> RenderedString<N> {
        let limit = self.terminator_limit();
        let mut bytes = [b' '; N];
        for i in 0..limit {
            bytes[i] = self.positions[i]
                .rendered(self.progressive)
                .map(|(c, _)| c)
                .unwrap_or(b' ');
        }
        RenderedString { bytes, len: limit }
    }

    /// Per-position confidence, matching what [`Text::render`] currently
    /// shows.
    pub fn errors(&self) -> [StringError; N] {
        let mut out = [StringError::Uncorrectable; N];
        for (i, position) in self.positions.iter().enumerate() {
            out[i] = position.error(self.progressive);
        }
        out
    }

    /// Advances the publication state machine after a group has been fully
    /// processed. Returns the freshly rendered content if it should be
    /// dispatched to the caller, `None` otherwise.
    pub fn poll(&mut self) -> Option<RenderedString<N>> {
        let rendered = self.render();
        let fire = if self.progressive {
            rendered != self.last_published
        } else {
            let became_available = !self.was_available && self.available;
            self.was_available = self.available;
            became_available || (self.available && self.dirty)
        };
        self.dirty = false;
        if fire {
            self.last_published = rendered;
            Some(rendered)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantizes_block_error() {
        assert_eq!(StringError::from_block_error(BlockError::None), StringError::None);
        assert_eq!(StringError::from_block_error(BlockError::Small), StringError::Medium);
        assert_eq!(StringError::from_block_error(BlockError::Large), StringError::Large);
        assert_eq!(
            StringError::from_block_error(BlockError::Uncorrectable),
            StringError::Uncorrectable
        );
    }

    #[test]
    fn single_observation_stays_tentative() {
        let mut t: Text<8> = Text::new();
        t.observe_segment(0, b"AB", StringError::None);
        assert!(!t.is_available());
        // Not progressive: renders spaces only.
        assert_eq!(t.render().as_bytes(), b"        ");
    }

    #[test]
    fn two_matching_observations_promote_to_validated() {
        let mut t: Text<8> = Text::new();
        t.observe_segment(0, b"AB", StringError::None);
        let changed = t.observe_segment(0, b"AB", StringError::None);
        assert!(changed);
        assert_eq!(t.render().as_bytes()[0..2], *b"AB");
    }

    #[test]
    fn conflicting_observation_does_not_flip_validated_on_one_try() {
        let mut t: Text<8> = Text::new();
        t.observe_segment(0, b"AB", StringError::None);
        t.observe_segment(0, b"AB", StringError::None);
        assert_eq!(t.render().as_bytes()[0..2], *b"AB");

        // One contradicting observation: validated is cleared but not
        // replaced yet.
        t.observe_segment(0, b"XY", StringError::None);
        assert_eq!(t.render().as_bytes()[0..2], *b"  ");

        // A second, matching contradiction promotes the new value.
        t.observe_segment(0, b"XY", StringError::None);
        assert_eq!(t.render().as_bytes()[0..2], *b"XY");
    }

    #[test]
    fn becomes_available_once_every_position_is_validated() {
        let mut t: Text<4> = Text::new();
        for _ in 0..2 {
            t.observe_segment(0, b"AB", StringError::None);
        }
        assert!(!t.is_available());
        for _ in 0..2 {
            t.observe_segment(2, b"CD", StringError::None);
        }
        assert!(t.is_available());
    }

    #[test]
    fn availability_is_sticky_across_a_single_contradiction() {
        let mut t: Text<2> = Text::new();
        for _ in 0..2 {
            t.observe_segment(0, b"AB", StringError::None);
        }
        assert!(t.is_available());

        // A single contradicting observation clears a validated slot, but
        // the string stays "available" until an explicit clear().
        t.observe_segment(0, b"XB", StringError::None);
        assert!(t.is_available());
    }

    #[test]
    fn clear_revokes_availability_and_wipes_state() {
        let mut t: Text<2> = Text::new();
        for _ in 0..2 {
            t.observe_segment(0, b"AB", StringError::None);
        }
        assert!(t.is_available());
        t.clear();
        assert!(!t.is_available());
        assert_eq!(t.render().as_bytes(), b"  ");
    }

    #[test]
    fn progressive_renders_tentative_characters() {
        let mut t: Text<2> = Text::new();
        t.set_progressive(true);
        t.observe_segment(0, b"AB", StringError::Large);
        assert_eq!(t.render().as_bytes(), b"AB");
        assert_eq!(t.errors()[0], StringError::Large);
    }

    #[test]
    fn rt_truncates_at_first_validated_cr() {
        let mut t: Text<8> = Text::with_terminator(0x0D);
        for _ in 0..2 {
            t.observe_segment(0, b"HI", StringError::None);
        }
        for _ in 0..2 {
            t.observe_segment(2, &[0x0D, b'X'], StringError::None);
        }
        assert_eq!(t.render().as_bytes(), b"HI");
    }

    #[test]
    fn poll_in_non_progressive_mode_fires_once_on_availability_then_on_validated_change() {
        let mut t: Text<2> = Text::new();
        t.observe_segment(0, b"AB", StringError::None);
        assert!(t.poll().is_none());

        t.observe_segment(0, b"AB", StringError::None);
        let published = t.poll();
        assert!(published.is_some());
        assert_eq!(published.unwrap().as_bytes(), b"AB");

        // No validated change: no re-dispatch.
        t.observe_segment(0, b"AB", StringError::None);
        assert!(t.poll().is_none());

        // A validated-layer change (even a losing one) re-dispatches.
        t.observe_segment(0, b"XB", StringError::None);
        assert!(t.poll().is_some());
    }

    #[test]
    fn poll_in_progressive_mode_fires_on_any_render_change() {
        let mut t: Text<2> = Text::new();
        t.set_progressive(true);
        t.observe_segment(0, b"AB", StringError::None);
        assert!(t.poll().is_some());
        // Repeating the same tentative observation doesn't change the render.
        t.observe_segment(0, b"AB", StringError::None);
        assert!(t.poll().is_none());
    }
}
