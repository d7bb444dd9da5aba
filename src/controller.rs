//! Dual-Slot Ambience Controller
//!
//! The controller owns two independently stored ambience settings and an
//! `active` discriminant saying which one drives the output. Each frame the
//! host samples the environment's live ambient color and calls [`AmbienceController::tick`];
//! a slot in follow-default mode republishes that color unchanged, a manual
//! slot overrides all three channels with its stored level.
//!
//! User commands arrive synchronously between ticks:
//!
//! - `edit` — slider drag, turns the active slot into a manual override
//! - `reset_to_default` — active slot goes back to tracking the live default
//! - `swap_slots` — flips which slot is active, contents untouched
//! - `show` / `hide` — attach or detach the adjustment panel
//!
//! Commands that write a level back into the visible control do so under a
//! scoped suppress-edits guard, so the write cannot echo back through the
//! edit path and falsely register as a manual override. The guard is RAII:
//! it re-enables edit handling on every exit path.

use std::time::{Duration, Instant};

use glam::Vec3;

use crate::model::{grayscale, AmbienceSetting, SlotId};
use crate::timer::AutoHideTimer;

/// The visible widget the controller pushes levels into. The concrete
/// surface is the slider panel in `main.rs`; tests use a recorder.
pub trait ControlSurface {
    fn set_displayed_level(&mut self, level: f32);
}

pub struct AmbienceController {
    slots: [AmbienceSetting; 2],
    active: SlotId,
    last_default: Vec3,
    listen_to_edits: bool,
    visible: bool,
    timer: AutoHideTimer,
}

impl AmbienceController {
    /// Explicit one-time initialization, before any `tick`. Missing persisted
    /// records are seeded as follow-default slots at the grayscale of the
    /// current environment default.
    pub fn new(
        environment_default: Vec3,
        stored: [Option<AmbienceSetting>; 2],
        auto_hide_delay: Duration,
    ) -> Self {
        let seed = AmbienceSetting::following_default(environment_default);
        Self {
            slots: [stored[0].unwrap_or(seed), stored[1].unwrap_or(seed)],
            active: SlotId::Primary,
            last_default: environment_default,
            listen_to_edits: true,
            visible: false,
            timer: AutoHideTimer::new(auto_hide_delay),
        }
    }

    /// Per-frame update. Records the live default and returns the color to
    /// publish: the default unchanged while the active slot follows it,
    /// otherwise the stored level applied uniformly to all channels.
    /// No I/O, never fails.
    pub fn tick(&mut self, environment_default: Vec3) -> Vec3 {
        self.last_default = environment_default;
        let active = self.active_setting();
        if active.use_default_ambience() {
            environment_default
        } else {
            Vec3::splat(active.level())
        }
    }

    /// Manual slider edit. Ignored (returns false) while a programmatic write
    /// is in flight. On success the active slot becomes a manual override at
    /// the clamped level and the auto-hide timer restarts; the caller is
    /// expected to persist.
    pub fn edit(&mut self, new_level: f32, now: Instant) -> bool {
        if !self.listen_to_edits {
            return false;
        }
        self.slots[self.active.index()] = AmbienceSetting::new(new_level, false);
        self.timer.start(now);
        true
    }

    /// Put the active slot back into follow-default mode at the last observed
    /// default level and sync the visible control. Counts as user activity,
    /// so the auto-hide timer restarts while the panel is up.
    pub fn reset_to_default(&mut self, surface: &mut dyn ControlSurface, now: Instant) {
        let level = grayscale(self.last_default);
        self.slots[self.active.index()] = AmbienceSetting::new(level, true);
        self.push_level_to_surface(surface);
        if self.visible {
            self.timer.start(now);
        }
    }

    /// Exchange which slot is active and sync the visible control to the
    /// newly active level. Slot contents are untouched, so swapping twice is
    /// an exact round trip.
    pub fn swap_slots(&mut self, surface: &mut dyn ControlSurface) {
        self.active = self.active.other();
        self.push_level_to_surface(surface);
    }

    pub fn show(&mut self, surface: &mut dyn ControlSurface, now: Instant) {
        self.visible = true;
        self.push_level_to_surface(surface);
        self.timer.start(now);
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.timer.cancel();
    }

    /// Cooperative auto-hide check; call once per frame. Returns true on the
    /// single frame the idle deadline expires and the panel hides.
    pub fn poll_auto_hide(&mut self, now: Instant) -> bool {
        if self.timer.fired(now) {
            self.visible = false;
            true
        } else {
            false
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn active_setting(&self) -> AmbienceSetting {
        self.slots[self.active.index()]
    }

    pub fn inactive_setting(&self) -> AmbienceSetting {
        self.slots[self.active.other().index()]
    }

    fn push_level_to_surface(&mut self, surface: &mut dyn ControlSurface) {
        if !self.visible {
            return;
        }
        let level = self.active_setting().level();
        let _suppress = SuppressEdits::new(&mut self.listen_to_edits);
        surface.set_displayed_level(level);
    }
}

/// Scoped echo suppression around a programmatic write into the control
/// surface. Dropping the guard re-enables edit handling, including on early
/// returns, so edits can never stay suppressed past the write.
struct SuppressEdits<'a> {
    flag: &'a mut bool,
}

impl<'a> SuppressEdits<'a> {
    fn new(flag: &'a mut bool) -> Self {
        *flag = false;
        Self { flag }
    }
}

impl Drop for SuppressEdits<'_> {
    fn drop(&mut self) {
        *self.flag = true;
    }
}
