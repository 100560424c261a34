//! Chord ordering within a song.
//!
//! Chords display in ascending `position`. Every reorder is an
//! [`array_move`] followed by renumbering positions to `0..n`, so the
//! result can be persisted as a plain ordered id list.

use crate::chord::Chord;
use crate::ids::ChordId;

/// Move the element at `from` to index `to`, shifting the ones in between.
///
/// Out-of-range indices leave the slice untouched.
pub fn array_move<T>(items: &mut [T], from: usize, to: usize) {
    if from >= items.len() || to >= items.len() || from == to {
        return;
    }
    if from < to {
        items[from..=to].rotate_left(1);
    } else {
        items[to..=from].rotate_right(1);
    }
}

pub fn renumber_positions(chords: &mut [Chord]) {
    for (index, chord) in chords.iter_mut().enumerate() {
        chord.position = index;
    }
}

/// Sort by position, ties broken by the existing order
pub fn sort_by_position(chords: &mut [Chord]) {
    chords.sort_by_key(|chord| chord.position);
}

/// Reordered copy of `chords`, or `None` when the move is a no-op
pub fn reorder(chords: &[Chord], from: usize, to: usize) -> Option<Vec<Chord>> {
    if from == to || from >= chords.len() || to >= chords.len() {
        return None;
    }
    let mut reordered = chords.to_vec();
    array_move(&mut reordered, from, to);
    renumber_positions(&mut reordered);
    Some(reordered)
}

pub fn move_up(chords: &[Chord], index: usize) -> Option<Vec<Chord>> {
    if index == 0 {
        return None;
    }
    reorder(chords, index, index - 1)
}

pub fn move_down(chords: &[Chord], index: usize) -> Option<Vec<Chord>> {
    reorder(chords, index, index + 1)
}

pub fn ordered_ids(chords: &[Chord]) -> Vec<ChordId> {
    chords.iter().map(|chord| chord.id).collect()
}

pub fn index_of(chords: &[Chord], id: ChordId) -> Option<usize> {
    chords.iter().position(|chord| chord.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chords(names: &[&str]) -> Vec<Chord> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Chord::new(ChordId::new()).with_name(*name).with_position(i))
            .collect()
    }

    fn names(chords: &[Chord]) -> Vec<&str> {
        chords.iter().map(|c| c.label()).collect()
    }

    #[test]
    fn test_array_move() {
        let mut items = vec![1, 2, 3, 4];
        array_move(&mut items, 3, 0);
        assert_eq!(items, vec![4, 1, 2, 3]);
        array_move(&mut items, 0, 2);
        assert_eq!(items, vec![1, 2, 4, 3]);
        array_move(&mut items, 9, 0);
        assert_eq!(items, vec![1, 2, 4, 3]);
    }

    #[test]
    fn test_move_last_to_first() {
        let original = chords(&["A", "B", "C", "D"]);
        let reordered = reorder(&original, 3, 0).unwrap();
        assert_eq!(names(&reordered), vec!["D", "A", "B", "C"]);
        let positions: Vec<usize> = reordered.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_move_up_and_down_edges() {
        let original = chords(&["A", "B", "C"]);
        assert!(move_up(&original, 0).is_none());
        assert!(move_down(&original, 2).is_none());
        assert_eq!(names(&move_up(&original, 2).unwrap()), vec!["A", "C", "B"]);
        assert_eq!(names(&move_down(&original, 0).unwrap()), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_sort_and_ids() {
        let mut list = chords(&["A", "B", "C"]);
        list[0].position = 2;
        list[2].position = 0;
        sort_by_position(&mut list);
        assert_eq!(names(&list), vec!["C", "B", "A"]);
        assert_eq!(index_of(&list, list[1].id), Some(1));
        assert_eq!(ordered_ids(&list).len(), 3);
    }
}
