use std::mem;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::geometry::{Measured, is_positive};

/// Solved row heights are floored to a multiple of `1 / HEIGHT_SCALE`.
pub const HEIGHT_SCALE: f64 = 100.0;

/// Container geometry every layout pass is computed against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutSettings {
    /// Width each justified row must fill.
    pub container_width: f64,
    /// Nominal row height; items are first scaled to it and terminal rows keep it.
    pub base_height: f64,
}

impl LayoutSettings {
    pub fn new(container_width: f64, base_height: f64) -> Result<Self> {
        let settings = Self {
            container_width,
            base_height,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a JSON object such as
    /// `{"container_width": 960, "base_height": 180}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if is_positive(self.container_width) && is_positive(self.base_height) {
            Ok(())
        } else {
            Err(LayoutError::InvalidContainer {
                width: self.container_width,
                base_height: self.base_height,
            })
        }
    }
}

/// Items sharing one visual line, all rendered at `height`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row<T> {
    pub items: Vec<T>,
    pub height: f64,
    /// `true` when the row was closed by an overflow and its height solved to
    /// fill the container; `false` for the terminal row left at base height.
    pub justified: bool,
}

impl<T> Row<T> {
    fn closed(items: Vec<T>, height: f64) -> Self {
        Self {
            items,
            height,
            justified: true,
        }
    }

    fn open(items: Vec<T>, height: f64) -> Self {
        Self {
            items,
            height,
            justified: false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Measured> Row<T> {
    /// Total rendered width of the row at its assigned height.
    pub fn width(&self) -> f64 {
        self.items.iter().map(|item| item.width_at(self.height)).sum()
    }
}

/// Output of one packing pass. Rows are in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutResult<T> {
    pub rows: Vec<Row<T>>,
}

impl<T> Default for LayoutResult<T> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<T> LayoutResult<T> {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Heights index-aligned with `rows`.
    pub fn row_heights(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.height).collect()
    }

    pub fn last_row(&self) -> Option<&Row<T>> {
        self.rows.last()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.rows.iter().map(Row::len).sum()
    }

    /// Every item in layout order, flattened across rows.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.rows.iter().flat_map(|row| row.items.iter())
    }
}

/// Greedy single-pass justified row packer.
///
/// Items are scaled to the base height and appended to a pending row until the
/// next one would overflow the container. The pending row is then closed at the
/// height that makes it exactly as wide as the container, and the overflowing
/// item opens the next row. The final row of the pass keeps the base height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowPacker {
    settings: LayoutSettings,
}

impl RowPacker {
    pub fn new(settings: LayoutSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> LayoutSettings {
        self.settings
    }

    /// Partition `items` into rows.
    ///
    /// The whole call is rejected with [`LayoutError::InvalidDimension`] if any
    /// item has a non-finite or non-positive side; no partial layout is produced.
    pub fn compute<T: Measured + Clone>(&self, items: &[T]) -> Result<LayoutResult<T>> {
        validate_items(items)?;

        let LayoutSettings {
            container_width,
            base_height,
        } = self.settings;

        let mut rows = Vec::new();
        let mut pending: Vec<T> = Vec::new();
        let mut pending_width = 0.0;

        for item in items {
            let scaled = item.width_at(base_height);

            // An item wider than the container on its own still opens a row
            // rather than closing an empty one.
            if pending.is_empty() || pending_width + scaled <= container_width {
                pending.push(item.clone());
                pending_width += scaled;
                continue;
            }

            let height = solve_height(container_width, base_height, pending_width);
            rows.push(Row::closed(mem::take(&mut pending), height));
            pending.push(item.clone());
            pending_width = scaled;
        }

        if !pending.is_empty() {
            rows.push(Row::open(pending, base_height));
        }

        Ok(LayoutResult { rows })
    }
}

/// One-shot packing without keeping a [`RowPacker`] around.
pub fn compute<T: Measured + Clone>(
    items: &[T],
    container_width: f64,
    base_height: f64,
) -> Result<LayoutResult<T>> {
    RowPacker::new(LayoutSettings::new(container_width, base_height)?)?.compute(items)
}

fn validate_items<T: Measured>(items: &[T]) -> Result<()> {
    for (index, item) in items.iter().enumerate() {
        let width = item.intrinsic_width();
        let height = item.intrinsic_height();
        if !is_positive(width) || !is_positive(height) {
            return Err(LayoutError::InvalidDimension {
                index,
                width,
                height,
            });
        }
    }
    Ok(())
}

/// Height `y` satisfying `committed / base = container / y`, floored to hundredths.
///
/// `committed` is the row's width at base height and is always positive because
/// every accepted item has a positive width.
fn solve_height(container_width: f64, base_height: f64, committed: f64) -> f64 {
    let exact = container_width * base_height / committed;
    (exact * HEIGHT_SCALE).floor() / HEIGHT_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Dimensions;

    fn ratios(values: &[f64]) -> Vec<Dimensions> {
        values.iter().map(|r| Dimensions::new(r * 10.0, 10.0)).collect()
    }

    fn packer(width: f64, base: f64) -> RowPacker {
        RowPacker::new(LayoutSettings::new(width, base).unwrap()).unwrap()
    }

    fn row_lengths<T>(result: &LayoutResult<T>) -> Vec<usize> {
        result.rows.iter().map(Row::len).collect()
    }

    #[test]
    fn empty_input_yields_empty_layout() {
        let result = packer(300.0, 100.0).compute::<Dimensions>(&[]).unwrap();
        assert!(result.is_empty());
        assert!(result.row_heights().is_empty());
    }

    #[test]
    fn overflow_closes_previous_row() {
        let result = packer(300.0, 100.0)
            .compute(&ratios(&[2.0, 1.0, 1.5]))
            .unwrap();
        assert_eq!(row_lengths(&result), vec![2, 1]);
        assert_eq!(result.row_heights(), vec![100.0, 100.0]);
        assert!(result.rows[0].justified);
        assert!(!result.rows[1].justified);
    }

    #[test]
    fn exact_fit_single_item_stays_terminal() {
        let result = packer(300.0, 100.0).compute(&ratios(&[3.0])).unwrap();
        assert_eq!(row_lengths(&result), vec![1]);
        assert_eq!(result.row_heights(), vec![100.0]);
    }

    #[test]
    fn solved_height_is_floored_to_hundredths() {
        // Row [2.0, 1.0] is 300 wide at base 100; container 310 stretches it.
        let result = packer(310.0, 100.0)
            .compute(&ratios(&[2.0, 1.0, 1.5]))
            .unwrap();
        assert_eq!(result.rows[0].height, 103.33);
    }

    #[test]
    fn solved_height_uses_committed_width_directly() {
        // Recovering the committed width as (total - overflowing) loses enough
        // precision here to floor to 499.19.
        let items = [Dimensions::new(25.0, 13.0), Dimensions::new(23.0, 7.0)];
        let result = packer(960.0, 220.0).compute(&items).unwrap();
        assert_eq!(row_lengths(&result), vec![1, 1]);
        assert_eq!(result.rows[0].height, 499.2);
    }

    #[test]
    fn short_row_is_scaled_up_to_fill() {
        // [1.0, 1.0] is 200 wide; adding 1.5 overflows 300.
        let result = packer(300.0, 100.0)
            .compute(&ratios(&[1.0, 1.0, 1.5]))
            .unwrap();
        assert_eq!(row_lengths(&result), vec![2, 1]);
        assert_eq!(result.rows[0].height, 150.0);
        assert!((result.rows[0].width() - 300.0).abs() < 1e-9);
    }

    #[test]
    fn wide_leading_item_does_not_emit_empty_row() {
        let result = packer(300.0, 100.0)
            .compute(&ratios(&[6.0, 1.0]))
            .unwrap();
        assert_eq!(row_lengths(&result), vec![1, 1]);
        assert_eq!(result.rows[0].height, 50.0);
        assert_eq!(result.rows[1].height, 100.0);
    }

    #[test]
    fn wide_last_item_keeps_base_height() {
        let result = packer(300.0, 100.0)
            .compute(&ratios(&[1.0, 5.0]))
            .unwrap();
        assert_eq!(row_lengths(&result), vec![1, 1]);
        assert_eq!(result.rows[0].height, 300.0);
        assert_eq!(result.rows[1].height, 100.0);
        assert!(!result.rows[1].justified);
    }

    #[test]
    fn invalid_item_rejects_whole_call() {
        let mut items = ratios(&[1.0, 1.0]);
        items.push(Dimensions::new(10.0, 0.0));
        let err = packer(300.0, 100.0).compute(&items).unwrap_err();
        match err {
            LayoutError::InvalidDimension { index, height, .. } => {
                assert_eq!(index, 2);
                assert_eq!(height, 0.0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_width_item_is_rejected() {
        let items = [Dimensions::new(0.0, 10.0)];
        assert!(matches!(
            packer(300.0, 100.0).compute(&items),
            Err(LayoutError::InvalidDimension { index: 0, .. })
        ));
    }

    #[test]
    fn settings_reject_non_positive_geometry() {
        assert!(LayoutSettings::new(0.0, 100.0).is_err());
        assert!(LayoutSettings::new(300.0, -1.0).is_err());
        assert!(LayoutSettings::new(f64::NAN, 100.0).is_err());
        assert!(compute(&ratios(&[1.0]), 300.0, 0.0).is_err());
    }

    #[test]
    fn settings_load_from_json() {
        let settings =
            LayoutSettings::from_json_str(r#"{"container_width": 960, "base_height": 180}"#)
                .unwrap();
        assert_eq!(settings, LayoutSettings::new(960.0, 180.0).unwrap());

        let err = LayoutSettings::from_json_str(r#"{"container_width": 960}"#).unwrap_err();
        assert!(matches!(err, LayoutError::Config(_)));

        let err =
            LayoutSettings::from_json_str(r#"{"container_width": 0, "base_height": 1}"#)
                .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidContainer { .. }));
    }

    #[test]
    fn packs_borrowed_items() {
        let owned = ratios(&[2.0, 1.0, 1.5]);
        let borrowed: Vec<&Dimensions> = owned.iter().collect();
        let result = compute(&borrowed, 300.0, 100.0).unwrap();
        assert!(std::ptr::eq(result.rows[1].items[0], &owned[2]));
    }

    #[test]
    fn result_serializes_to_json() {
        let result = compute(&ratios(&[3.0]), 300.0, 100.0).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["rows"][0]["height"], 100.0);
        assert_eq!(json["rows"][0]["justified"], false);
        assert_eq!(json["rows"][0]["items"][0]["width"], 30.0);
    }
}
