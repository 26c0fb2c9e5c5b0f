//! One-shot title card
//!
//! The card waits below the frame, slides up to the center with a cubic
//! ease-out, and is then baked into a cached copy of the backdrop so it costs
//! nothing per frame. Phase changes are pure functions of time; the bake is
//! the only side effect and happens exactly once per backdrop.

use glam::Vec2;

use super::state::SimTime;
use crate::consts::OVERLAY_OFFSCREEN_GAP;
use crate::scenery::BackdropId;
use crate::{Viewport, ease_out_cubic};

/// Opaque card visual; only its box matters to the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayCard {
    pub size: Vec2,
}

impl OverlayCard {
    pub fn for_viewport(viewport: Viewport) -> Self {
        Self {
            size: Vec2::new(
                (viewport.width * 0.9).min(820.0).floor(),
                (viewport.height * 0.28).min(240.0).floor(),
            ),
        }
    }
}

/// Where the card is in its one-shot lifecycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayPhase {
    /// Waiting off-screen for its cue
    Dormant,
    /// Moving toward the center
    Sliding { started_at: SimTime },
    /// Centered but not yet baked (after a slide or a resize)
    Parked,
    /// Merged into the cached backdrop
    Baked,
}

impl OverlayPhase {
    /// Time-driven transition
    pub fn advance(self, now: SimTime, show_at: SimTime, slide_duration: f32) -> Self {
        match self {
            OverlayPhase::Dormant if now >= show_at => {
                OverlayPhase::Sliding { started_at: show_at }.advance(now, show_at, slide_duration)
            }
            OverlayPhase::Sliding { started_at }
                if slide_progress(now, started_at, slide_duration) >= 1.0 =>
            {
                OverlayPhase::Parked
            }
            other => other,
        }
    }

    /// Phase after the viewport changes; never replays the delay
    pub fn on_resize(self) -> Self {
        match self {
            OverlayPhase::Dormant => OverlayPhase::Dormant,
            OverlayPhase::Sliding { .. } | OverlayPhase::Parked | OverlayPhase::Baked => {
                OverlayPhase::Parked
            }
        }
    }
}

fn slide_progress(now: SimTime, started_at: SimTime, slide_duration: f32) -> f32 {
    (((now - started_at) / slide_duration as f64) as f32).clamp(0.0, 1.0)
}

/// Backdrop with the card painted in, cached once per bake
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Composite {
    pub backdrop: BackdropId,
    /// Top-left of the card on the backdrop
    pub card_origin: Vec2,
    pub card_size: Vec2,
}

#[derive(Debug, Clone)]
pub struct Overlay {
    phase: OverlayPhase,
    show_at: SimTime,
    slide_duration: f32,
    card: OverlayCard,
    center: Vec2,
    start_y: f32,
    target_y: f32,
    composite: Option<Composite>,
    bake_count: u32,
}

impl Overlay {
    pub fn new(
        card: OverlayCard,
        viewport: Viewport,
        show_at: SimTime,
        slide_duration: f32,
    ) -> Self {
        debug_assert!(slide_duration > 0.0, "slide duration must be positive");
        let mut overlay = Self {
            phase: OverlayPhase::Dormant,
            show_at,
            slide_duration,
            card,
            center: Vec2::ZERO,
            start_y: 0.0,
            target_y: 0.0,
            composite: None,
            bake_count: 0,
        };
        overlay.layout(card, viewport);
        overlay.center.y = overlay.start_y;
        overlay
    }

    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    pub fn card(&self) -> OverlayCard {
        self.card
    }

    /// Current center of the card
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Top-left of the card
    pub fn origin(&self) -> Vec2 {
        (self.center - self.card.size * 0.5).floor()
    }

    pub fn composite(&self) -> Option<&Composite> {
        self.composite.as_ref()
    }

    /// How many times the card has been baked
    pub fn bake_count(&self) -> u32 {
        self.bake_count
    }

    /// Whether the renderer must draw the card on top of the backdrop
    pub fn needs_blit(&self) -> bool {
        matches!(self.phase, OverlayPhase::Sliding { .. } | OverlayPhase::Parked)
    }

    /// Step the card and bake it once it comes to rest
    pub fn update(&mut self, now: SimTime, backdrop: BackdropId) {
        let next = self.phase.advance(now, self.show_at, self.slide_duration);
        if std::mem::discriminant(&next) != std::mem::discriminant(&self.phase) {
            log::info!("Title overlay {:?} -> {:?} at {:.2}s", self.phase, next, now);
        }
        self.phase = next;

        match self.phase {
            OverlayPhase::Dormant => self.center.y = self.start_y,
            OverlayPhase::Sliding { started_at } => {
                let eased = ease_out_cubic(slide_progress(now, started_at, self.slide_duration));
                self.center.y = self.start_y + (self.target_y - self.start_y) * eased;
            }
            OverlayPhase::Parked => {
                self.center.y = self.target_y;
                self.bake(backdrop);
                self.phase = OverlayPhase::Baked;
            }
            OverlayPhase::Baked => {}
        }
    }

    /// Re-derive positions for a new viewport and drop the stale composite
    pub fn resize(&mut self, card: OverlayCard, viewport: Viewport) {
        self.layout(card, viewport);
        self.composite = None;
        self.phase = self.phase.on_resize();
        self.center.y = match self.phase {
            OverlayPhase::Dormant => self.start_y,
            _ => self.target_y,
        };
    }

    fn layout(&mut self, card: OverlayCard, viewport: Viewport) {
        self.card = card;
        self.center.x = (viewport.width / 2.0).floor();
        self.target_y = (viewport.height / 2.0).floor();
        self.start_y = viewport.height + (card.size.y / 2.0).floor() + OVERLAY_OFFSCREEN_GAP;
    }

    fn bake(&mut self, backdrop: BackdropId) {
        self.composite = Some(Composite {
            backdrop,
            card_origin: self.origin(),
            card_size: self.card.size,
        });
        self.bake_count += 1;
        log::info!("Title overlay baked into backdrop {:?}", backdrop);
    }
}
