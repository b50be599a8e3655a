use crate::error::{LayoutError, Result};
use crate::geometry::Measured;
use crate::layout::{LayoutResult, LayoutSettings, RowPacker};

/// What the controller remembers between passes.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState<T> {
    last_row: Vec<T>,
    last_item_index: usize,
}

impl<T> Default for ControllerState<T> {
    fn default() -> Self {
        Self {
            last_row: Vec::new(),
            last_item_index: 0,
        }
    }
}

impl<T> ControllerState<T> {
    /// Items of the most recently computed row; they are re-packed on the next refresh.
    pub fn last_row(&self) -> &[T] {
        &self.last_row
    }

    /// Number of caller items consumed so far. Slicing the next snapshot at
    /// this index yields the newly appended items.
    pub fn last_item_index(&self) -> usize {
        self.last_item_index
    }
}

/// Stateful wrapper around [`RowPacker`] for append-only item collections.
///
/// Drive it from a single caller: `initial` once, then `refresh` with the full
/// current item list every time items are appended. Each refresh returns only
/// the previously-last row (re-packed) plus any rows formed by the new items.
#[derive(Debug, Clone)]
pub struct IncrementalLayout<T> {
    packer: RowPacker,
    state: ControllerState<T>,
}

impl<T: Measured + Clone> IncrementalLayout<T> {
    pub fn new(settings: LayoutSettings) -> Result<Self> {
        Ok(Self::with_packer(RowPacker::new(settings)?))
    }

    pub fn with_packer(packer: RowPacker) -> Self {
        Self {
            packer,
            state: ControllerState::default(),
        }
    }

    pub fn settings(&self) -> LayoutSettings {
        self.packer.settings()
    }

    pub fn state(&self) -> &ControllerState<T> {
        &self.state
    }

    /// Lay out the full list and reset the carry-over state to it.
    pub fn initial(&mut self, items: &[T]) -> Result<LayoutResult<T>> {
        let result = self.packer.compute(items)?;
        self.state = ControllerState {
            last_row: last_row_items(&result),
            last_item_index: items.len(),
        };
        Ok(result)
    }

    /// Re-pack the open last row together with the items appended to
    /// `snapshot` since the previous pass.
    ///
    /// `snapshot` is the caller's full current list. Items before the consumed
    /// index must be unchanged; a snapshot shorter than that index is a
    /// [`LayoutError::StateDesync`]. On any error the state is left untouched.
    pub fn refresh(&mut self, snapshot: &[T]) -> Result<LayoutResult<T>> {
        let consumed = self.state.last_item_index;
        let appended = snapshot
            .get(consumed..)
            .ok_or(LayoutError::StateDesync {
                consumed,
                supplied: snapshot.len(),
            })?;

        let carried = self.state.last_row.len();
        let mut batch = Vec::with_capacity(carried + appended.len());
        batch.extend_from_slice(&self.state.last_row);
        batch.extend_from_slice(appended);

        let result = self
            .packer
            .compute(&batch)
            .map_err(|err| to_snapshot_index(err, carried, consumed))?;

        self.state.last_item_index += batch.len() - carried;
        self.state.last_row = last_row_items(&result);
        Ok(result)
    }
}

fn last_row_items<T: Clone>(result: &LayoutResult<T>) -> Vec<T> {
    result
        .last_row()
        .map(|row| row.items.clone())
        .unwrap_or_default()
}

// Batch indices past the carried row map onto the caller's snapshot.
fn to_snapshot_index(err: LayoutError, carried: usize, consumed: usize) -> LayoutError {
    match err {
        LayoutError::InvalidDimension {
            index,
            width,
            height,
        } if index >= carried => LayoutError::InvalidDimension {
            index: consumed + (index - carried),
            width,
            height,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ImageItem;

    fn item(src: &str, ratio: f64) -> ImageItem {
        ImageItem::new(src, ratio * 100.0, 100.0)
    }

    fn controller() -> IncrementalLayout<ImageItem> {
        IncrementalLayout::new(LayoutSettings::new(300.0, 100.0).unwrap()).unwrap()
    }

    fn labels(result: &LayoutResult<ImageItem>) -> Vec<Vec<&str>> {
        result
            .rows
            .iter()
            .map(|row| row.items.iter().map(|i| i.src.as_str()).collect())
            .collect()
    }

    #[test]
    fn initial_records_last_row_and_index() {
        let items = vec![item("a", 2.0), item("b", 1.0), item("c", 1.5)];
        let mut layout = controller();
        let result = layout.initial(&items).unwrap();

        assert_eq!(labels(&result), vec![vec!["a", "b"], vec!["c"]]);
        assert_eq!(layout.state().last_row(), &items[2..]);
        assert_eq!(layout.state().last_item_index(), 3);
    }

    #[test]
    fn refresh_repacks_open_row_with_new_items() {
        let mut items = vec![item("a", 1.0), item("b", 1.0)];
        let mut layout = controller();
        let first = layout.initial(&items).unwrap();
        assert_eq!(labels(&first), vec![vec!["a", "b"]]);
        assert!(!first.rows[0].justified);

        items.push(item("c", 1.5));
        let second = layout.refresh(&items).unwrap();
        assert_eq!(labels(&second), vec![vec!["a", "b"], vec!["c"]]);
        assert!(second.rows[0].justified);
        assert_eq!(second.rows[0].height, 150.0);
        assert_eq!(layout.state().last_row(), &items[2..]);
        assert_eq!(layout.state().last_item_index(), 3);
    }

    #[test]
    fn refresh_excludes_closed_rows() {
        let mut items = vec![item("a", 2.0), item("b", 1.0), item("c", 1.5)];
        let mut layout = controller();
        layout.initial(&items).unwrap();

        items.push(item("d", 1.0));
        items.push(item("e", 1.0));
        let result = layout.refresh(&items).unwrap();
        assert_eq!(labels(&result), vec![vec!["c", "d"], vec!["e"]]);
        assert_eq!(layout.state().last_item_index(), 5);
    }

    #[test]
    fn refresh_without_new_items_repeats_last_row() {
        let items = vec![item("a", 2.0), item("b", 2.0)];
        let mut layout = controller();
        layout.initial(&items).unwrap();

        let result = layout.refresh(&items).unwrap();
        assert_eq!(labels(&result), vec![vec!["b"]]);
        assert_eq!(result.row_heights(), vec![100.0]);
        assert_eq!(layout.state().last_item_index(), 2);
    }

    #[test]
    fn refresh_before_initial_is_full_layout() {
        let items = vec![item("a", 2.0), item("b", 1.0), item("c", 1.5)];
        let mut layout = controller();
        let result = layout.refresh(&items).unwrap();
        assert_eq!(labels(&result), vec![vec!["a", "b"], vec!["c"]]);
        assert_eq!(layout.state().last_item_index(), 3);
    }

    #[test]
    fn shrunken_snapshot_is_state_desync() {
        let items = vec![item("a", 1.0), item("b", 1.0)];
        let mut layout = controller();
        layout.initial(&items).unwrap();

        let err = layout.refresh(&items[..1]).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::StateDesync {
                consumed: 2,
                supplied: 1
            }
        ));
        assert_eq!(layout.state().last_item_index(), 2);
    }

    #[test]
    fn invalid_new_item_reports_snapshot_index_and_keeps_state() {
        let mut items = vec![item("a", 2.0), item("b", 1.0), item("c", 1.5)];
        let mut layout = controller();
        layout.initial(&items).unwrap();
        let before = layout.state().clone();

        items.push(item("d", 1.0));
        items.push(ImageItem::new("broken", 100.0, 0.0));
        let err = layout.refresh(&items).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidDimension { index: 4, .. }));
        assert_eq!(layout.state(), &before);
    }

    #[test]
    fn empty_initial_leaves_empty_state() {
        let mut layout = controller();
        let result = layout.initial(&[]).unwrap();
        assert!(result.is_empty());
        assert!(layout.state().last_row().is_empty());
        assert_eq!(layout.state().last_item_index(), 0);
    }
}
