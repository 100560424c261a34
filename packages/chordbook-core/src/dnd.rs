//! Drag-and-drop dispatch.
//!
//! A dragged chord card can land on a beat slot of the staff (assign the
//! chord) or on another chord card (reorder). The drop target is an explicit
//! tagged variant and [`resolve_drop`] is the single place that decides what
//! a drop means.

use serde::{Deserialize, Serialize};

use crate::chord::Chord;
use crate::ids::{ChordId, MeasureId};
use crate::reorder::index_of;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DropTarget {
    Beat {
        measure_id: MeasureId,
        beat_position: u8,
    },
    ChordCard {
        chord_id: ChordId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DropAction {
    AssignBeat {
        measure_id: MeasureId,
        beat_position: u8,
        chord_id: ChordId,
    },
    Reorder {
        from: usize,
        to: usize,
    },
}

/// Decide what dropping `dragged` onto `target` does.
///
/// Returns `None` for drops outside any target, unknown chords, or a card
/// dropped onto itself.
pub fn resolve_drop(dragged: ChordId, target: Option<&DropTarget>, chords: &[Chord]) -> Option<DropAction> {
    let from = index_of(chords, dragged)?;
    match *target? {
        DropTarget::Beat {
            measure_id,
            beat_position,
        } => Some(DropAction::AssignBeat {
            measure_id,
            beat_position,
            chord_id: dragged,
        }),
        DropTarget::ChordCard { chord_id } => {
            let to = index_of(chords, chord_id)?;
            (from != to).then_some(DropAction::Reorder { from, to })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chords() -> Vec<Chord> {
        (0..3)
            .map(|i| Chord::new(ChordId::new()).with_position(i))
            .collect()
    }

    #[test]
    fn test_drop_on_beat_assigns() {
        let chords = chords();
        let measure_id = MeasureId::new();
        let target = DropTarget::Beat {
            measure_id,
            beat_position: 3,
        };
        assert_eq!(
            resolve_drop(chords[1].id, Some(&target), &chords),
            Some(DropAction::AssignBeat {
                measure_id,
                beat_position: 3,
                chord_id: chords[1].id
            })
        );
    }

    #[test]
    fn test_drop_on_card_reorders() {
        let chords = chords();
        let target = DropTarget::ChordCard {
            chord_id: chords[0].id,
        };
        assert_eq!(
            resolve_drop(chords[2].id, Some(&target), &chords),
            Some(DropAction::Reorder { from: 2, to: 0 })
        );
    }

    #[test]
    fn test_ignored_drops() {
        let chords = chords();
        let own_card = DropTarget::ChordCard {
            chord_id: chords[1].id,
        };
        let unknown_card = DropTarget::ChordCard {
            chord_id: ChordId::new(),
        };
        assert_eq!(resolve_drop(chords[1].id, Some(&own_card), &chords), None);
        assert_eq!(resolve_drop(chords[1].id, Some(&unknown_card), &chords), None);
        assert_eq!(resolve_drop(chords[1].id, None, &chords), None);
        assert_eq!(resolve_drop(ChordId::new(), Some(&own_card), &chords), None);
    }

    #[test]
    fn test_drop_target_wire_format() {
        let id = MeasureId::new();
        let json = serde_json::to_value(DropTarget::Beat {
            measure_id: id,
            beat_position: 2,
        })
        .unwrap();
        assert_eq!(json["type"], "beat");
        assert_eq!(json["beat_position"], 2);
        assert_eq!(json["measure_id"], id.to_string());
    }
}
