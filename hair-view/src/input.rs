//! Collects pointer and touch state from egui into a [`InputFrame`].

use glam::Vec2;
use hair_core::wind::InputFrame;

/// Active touch contacts in the order they started.
#[derive(Debug, Default)]
pub struct TouchTracker {
    contacts: Vec<(u64, Vec2)>,
}

impl TouchTracker {
    /// Applies one touch event. `pos` is in canvas coordinates.
    pub fn apply(&mut self, id: u64, phase: egui::TouchPhase, pos: Vec2) {
        match phase {
            egui::TouchPhase::Start | egui::TouchPhase::Move => {
                if let Some(contact) = self.contacts.iter_mut().find(|(cid, _)| *cid == id) {
                    contact.1 = pos;
                } else {
                    self.contacts.push((id, pos));
                }
            }
            egui::TouchPhase::End | egui::TouchPhase::Cancel => {
                self.contacts.retain(|(cid, _)| *cid != id);
            }
        }
    }

    pub fn positions(&self) -> Vec<Vec2> {
        self.contacts.iter().map(|&(_, pos)| pos).collect()
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
    }
}

#[inline]
pub fn to_glam(p: egui::Pos2, origin: egui::Pos2) -> Vec2 {
    Vec2::new(p.x - origin.x, p.y - origin.y)
}

/// Samples this frame's input relative to the canvas `rect`.
///
/// Touch events are folded into `touches` first; the pointer counts as
/// inside only while it is within `rect`.
pub fn sample(
    ctx: &egui::Context,
    rect: egui::Rect,
    touches: &mut TouchTracker,
    elapsed_ms: f64,
) -> InputFrame {
    ctx.input(|i| {
        for event in &i.events {
            if let egui::Event::Touch { id, phase, pos, .. } = event {
                touches.apply(id.0, *phase, to_glam(*pos, rect.min));
            }
        }

        let latest = i.pointer.latest_pos();
        InputFrame {
            touches: touches.positions(),
            pointer: latest.map(|p| to_glam(p, rect.min)),
            pointer_inside: latest.is_some_and(|p| rect.contains(p)),
            elapsed_ms,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touches_keep_start_order_and_update_in_place() {
        let mut t = TouchTracker::default();
        t.apply(7, egui::TouchPhase::Start, Vec2::new(1.0, 1.0));
        t.apply(3, egui::TouchPhase::Start, Vec2::new(2.0, 2.0));
        t.apply(7, egui::TouchPhase::Move, Vec2::new(5.0, 5.0));

        assert_eq!(t.positions(), vec![Vec2::new(5.0, 5.0), Vec2::new(2.0, 2.0)]);
    }

    #[test]
    fn ended_and_cancelled_touches_are_removed() {
        let mut t = TouchTracker::default();
        t.apply(1, egui::TouchPhase::Start, Vec2::ZERO);
        t.apply(2, egui::TouchPhase::Start, Vec2::ONE);
        t.apply(1, egui::TouchPhase::End, Vec2::ZERO);
        assert_eq!(t.positions(), vec![Vec2::ONE]);

        t.apply(2, egui::TouchPhase::Cancel, Vec2::ONE);
        assert!(t.positions().is_empty());
    }

    #[test]
    fn to_glam_is_relative_to_origin() {
        let p = to_glam(egui::pos2(15.0, 7.0), egui::pos2(10.0, 2.0));
        assert_eq!(p, Vec2::new(5.0, 5.0));
    }
}
