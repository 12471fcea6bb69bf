use crate::{DomainError, ImageId, ImageStore};

/// Result of a drag-and-drop gesture, in positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropEvent {
    pub previous_index: usize,
    pub current_index: usize,
}

/// Remove-then-insert move of `ids[from]` to position `to`.
pub fn moved_sequence(
    ids: &[ImageId],
    from: usize,
    to: usize,
) -> Result<Vec<ImageId>, DomainError> {
    for index in [from, to] {
        if index >= ids.len() {
            return Err(DomainError::OutOfRange {
                index,
                count: ids.len(),
            });
        }
    }

    let mut sequence = ids.to_vec();
    let dragged = sequence.remove(from);
    sequence.insert(to, dragged);
    Ok(sequence)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ReorderEngine;

impl ReorderEngine {
    pub fn apply(store: &mut ImageStore, event: DropEvent) -> Result<(), DomainError> {
        let sequence = moved_sequence(&store.ids(), event.previous_index, event.current_index)?;
        store.apply_order(&sequence)
    }
}

/// Transient drag gesture state owned by the UI side.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    dragged_index: Option<usize>,
}

impl DragState {
    pub fn start(&mut self, index: usize) {
        self.dragged_index = Some(index);
    }

    pub fn end(&mut self) {
        self.dragged_index = None;
    }

    pub fn dragged_index(&self) -> Option<usize> {
        self.dragged_index
    }

    /// Finishes the gesture. The drag state is cleared even when the move is
    /// rejected.
    pub fn drop(&mut self, store: &mut ImageStore, event: DropEvent) -> Result<(), DomainError> {
        self.end();
        ReorderEngine::apply(store, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{names, store_with};

    fn drop_event(previous_index: usize, current_index: usize) -> DropEvent {
        DropEvent {
            previous_index,
            current_index,
        }
    }

    #[test]
    fn moving_forward_shifts_intervening_records_back() {
        let mut store = store_with(&["a", "b", "c", "d", "e"]);
        ReorderEngine::apply(&mut store, drop_event(1, 3)).expect("move");
        assert_eq!(names(&store), vec!["a", "c", "d", "b", "e"]);
    }

    #[test]
    fn moving_backward_shifts_intervening_records_forward() {
        let mut store = store_with(&["a", "b", "c", "d", "e"]);
        ReorderEngine::apply(&mut store, drop_event(3, 0)).expect("move");
        assert_eq!(names(&store), vec!["d", "a", "b", "c", "e"]);
    }

    #[test]
    fn every_move_lands_the_dragged_record_at_its_destination() {
        let size = 6;
        for from in 0..size {
            for to in 0..size {
                let original: Vec<String> = (0..size).map(|i| format!("img-{i}")).collect();
                let refs: Vec<&str> = original.iter().map(String::as_str).collect();
                let mut store = store_with(&refs);
                ReorderEngine::apply(&mut store, drop_event(from, to)).expect("move");
                let after = names(&store);

                assert_eq!(after[to], original[from]);
                let (low, high) = (from.min(to), from.max(to));
                for position in 0..size {
                    if position < low || position > high {
                        assert_eq!(after[position], original[position]);
                    }
                }
                for position in (low + 1)..=high {
                    if from < to {
                        assert_eq!(after[position - 1], original[position]);
                    } else {
                        assert_eq!(after[position], original[position - 1]);
                    }
                }
            }
        }
    }

    #[test]
    fn same_position_drop_is_a_no_op() {
        let mut store = store_with(&["a", "b", "c"]);
        let root = store.ids()[1];
        store.set_root(root).expect("root");
        let before: Vec<_> = store.iter().cloned().collect();

        ReorderEngine::apply(&mut store, drop_event(1, 1)).expect("move");

        let after: Vec<_> = store.iter().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn out_of_range_drop_is_rejected() {
        let mut store = store_with(&["a", "b"]);
        let result = ReorderEngine::apply(&mut store, drop_event(0, 2));
        assert_eq!(result, Err(DomainError::OutOfRange { index: 2, count: 2 }));
        assert_eq!(names(&store), vec!["a", "b"]);
    }

    #[test]
    fn drag_state_is_cleared_even_when_drop_fails() {
        let mut store = store_with(&["a", "b"]);
        let mut drag = DragState::default();

        drag.start(1);
        assert_eq!(drag.dragged_index(), Some(1));
        assert!(drag.drop(&mut store, drop_event(1, 7)).is_err());
        assert_eq!(drag.dragged_index(), None);

        drag.start(0);
        drag.drop(&mut store, drop_event(0, 1)).expect("drop");
        assert_eq!(drag.dragged_index(), None);
        assert_eq!(names(&store), vec!["b", "a"]);
    }

    #[test]
    fn session_scenario_keeps_positions_consistent() {
        let mut store = store_with(&["A", "B", "C"]);
        ReorderEngine::apply(&mut store, drop_event(1, 2)).expect("move");
        assert_eq!(names(&store), vec!["A", "C", "B"]);

        store.remove(0).expect("remove");
        assert_eq!(names(&store), vec!["C", "B"]);
        assert_eq!(
            store.iter().map(|record| record.order_index).collect::<Vec<_>>(),
            vec![0, 1]
        );
    }
}
