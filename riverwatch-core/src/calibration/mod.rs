//! Calibration Offsets
//!
//! ## Overview
//!
//! Field probes drift. Rather than rewriting stored readings, operators enter
//! an additive offset for a channel together with the time window in which it
//! applies. Raw readings stay untouched in storage and the correction is
//! overlaid every time they are read.
//!
//! ```text
//! channel pH-1   ──●────────●────────●────────●────────●──▶ time
//!                       [ offset #3: +0.25 ............. ongoing
//!          raw 7.1   raw 7.0  → 7.25  raw 7.2 → 7.45  ...
//! ```
//!
//! ## Window Semantics
//!
//! A [`ValidityWindow`] is closed on both ends. `valid_until = None` means the
//! offset is still in force and matches every instant at or after
//! `valid_from`. The same inclusive rule drives both resolution and the
//! overlap gate, so an instant can never be claimed by two stored offsets:
//!
//! ```text
//! A: [10:00, 12:00]
//! B: [12:00, 14:00]   ← rejected, 12:00 would match both
//! C: [12:01, 14:00]   ← accepted
//! ```
//!
//! ## Lifecycle
//!
//! - **create**: draft checked for required fields, inverted windows and
//!   overlaps with the channel's existing offsets ([`NewCalibrationOffset::validate`],
//!   [`check_no_overlap`])
//! - **deactivate**: `valid_until` is set to the current instant, the offset
//!   becomes historical but still corrects readings inside its window
//! - **delete**: the offset disappears and readings in its former window read
//!   as uncorrected from then on
//!
//! ## Resolution
//!
//! [`OffsetResolver`] never fails. A malformed offset simply never matches,
//! and if the non-overlap invariant was broken anyway (for example by a
//! delete racing a create) the first matching offset in the given order wins.

mod offset;
mod resolver;

pub use offset::{
    check_no_overlap, CalibrationOffset, NewCalibrationOffset, OffsetId, OffsetPatch,
    ValidityWindow,
};
pub use resolver::{CorrectedReading, OffsetResolver, Resolution};
