//! Click routing and serial ordering
//!
//! Linked members fill strictly in order: only the member at `active_index`
//! takes clicks, and no member after it may hold any fill. Racing members
//! take clicks independently.

use tracing::warn;

use super::{ClockGroup, GroupKind};
use crate::dial::{DialId, SegmentDial};
use crate::events::ClockHooks;

impl ClockGroup {
    /// Index of the dial eligible for clicks in a linked group.
    /// Equal to the member count once every dial is full.
    pub fn active_index(&self) -> usize {
        self.active_index
    }

    /// The dial eligible for clicks, if any member is still incomplete
    pub fn active_dial(&self) -> Option<&SegmentDial> {
        self.dial_at(self.active_index)
    }

    /// Left click on a member. Ignored clicks return false.
    pub fn click(&mut self, id: DialId, hooks: &mut dyn ClockHooks) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        match self.kind {
            GroupKind::Racing => {
                let filled = self.members[pos].dial.fill_next(hooks);
                self.refresh_active_index();
                filled
            }
            GroupKind::Linked => {
                if pos != self.active_index {
                    return false;
                }
                if !self.members[pos].dial.fill_next(hooks) {
                    return false;
                }
                self.refresh_active_index();
                self.reconcile_timer();
                true
            }
        }
    }

    /// Right click on a member, unfilling its last segment.
    ///
    /// In a linked group this applies to the active member, or, when the
    /// active member is empty, to the previous (full) member, moving
    /// `active_index` back to it.
    pub fn unclick(&mut self, id: DialId, hooks: &mut dyn ClockHooks) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        match self.kind {
            GroupKind::Racing => {
                let unfilled = self.members[pos].dial.unfill_last(hooks);
                self.refresh_active_index();
                unfilled
            }
            GroupKind::Linked => {
                let active = self.active_index;
                let active_has_fill = self
                    .members
                    .get(active)
                    .is_some_and(|m| m.dial.filled_count() > 0);

                let target = if active_has_fill {
                    (pos == active).then_some(active)
                } else {
                    active
                        .checked_sub(1)
                        .filter(|prev| pos == active || pos == *prev)
                };
                let Some(target) = target else {
                    return false;
                };
                if !self.members[target].dial.unfill_last(hooks) {
                    return false;
                }
                self.refresh_active_index();
                true
            }
        }
    }

    /// Recompute `active_index` as the first member that is not full
    pub(crate) fn refresh_active_index(&mut self) {
        self.active_index = self
            .members
            .iter()
            .position(|m| !m.dial.is_complete())
            .unwrap_or(self.members.len());
    }

    /// Clear fill on linked members past the first incomplete one.
    /// Returns the number of members repaired.
    pub(crate) fn repair_serial_order(&mut self) -> usize {
        self.refresh_active_index();
        if self.kind != GroupKind::Linked {
            return 0;
        }
        let mut repaired = 0;
        for (index, member) in self.members.iter_mut().enumerate().skip(self.active_index + 1) {
            if member.dial.filled_count > 0 {
                warn!(index, filled = member.dial.filled_count, "linked dial filled out of order, clearing");
                member.dial.filled_count = 0;
                repaired += 1;
            }
        }
        repaired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullHooks;

    #[test]
    fn test_racing_clicks_are_independent() {
        let mut group = ClockGroup::with_dials(GroupKind::Racing, "r", 3);
        let ids = group.dial_ids();
        assert!(group.click(ids[2], &mut NullHooks));
        assert!(group.click(ids[0], &mut NullHooks));
        assert!(group.unclick(ids[2], &mut NullHooks));
        assert_eq!(group.dial(ids[0]).unwrap().filled_count(), 1);
        assert_eq!(group.dial(ids[2]).unwrap().filled_count(), 0);
    }

    #[test]
    fn test_unknown_dial_is_ignored() {
        let mut group = ClockGroup::with_dials(GroupKind::Linked, "l", 2);
        assert!(!group.click(DialId::new(), &mut NullHooks));
        assert!(!group.unclick(DialId::new(), &mut NullHooks));
    }

    #[test]
    fn test_repair_clears_out_of_order_fill() {
        let mut group = ClockGroup::with_dials(GroupKind::Linked, "l", 3);
        group.members[2].dial.filled_count = 3;
        assert_eq!(group.repair_serial_order(), 1);
        assert_eq!(group.active_index(), 0);
        assert_eq!(group.dial_at(2).unwrap().filled_count(), 0);
    }
}
