//! Per-column vertical clip state.
//!
//! Two records are kept for every screen column:
//!
//! * [`Bounds`] in `Frame::seg_clip`: the rows still open to walls and
//!   flats, narrowed as segs are emitted front to back.
//! * [`OccludingColumn`]: the occluders themselves (depth, line, the rows
//!   they cover), used afterwards to clip sprites without a depth buffer.
//!
//! Rows at or above `top` and at or below `bottom` are occluded.

use crate::world::LinedefId;

/// Open vertical range of one column: rows `top < y < bottom`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub top: i16,
    pub bottom: i16,
}

impl Bounds {
    pub const CLOSED: Bounds = Bounds { top: 0, bottom: 0 };

    /// Nothing occluded in a column `height` rows tall.
    #[inline]
    pub fn open(height: usize) -> Self {
        Self {
            top: -1,
            bottom: height.min(i16::MAX as usize) as i16,
        }
    }

    /// No row left open.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.bottom as i32 - self.top as i32 <= 1
    }

    /// Narrow to the rows open in both.
    #[inline]
    pub fn intersect(self, other: Bounds) -> Bounds {
        Bounds {
            top: self.top.max(other.top),
            bottom: self.bottom.min(other.bottom),
        }
    }

    /// First and last open row, if any.
    #[inline]
    pub fn rows(&self) -> Option<(i32, i32)> {
        let first = self.top as i32 + 1;
        let last = self.bottom as i32 - 1;
        (first <= last).then_some((first, last))
    }
}

/// Occluders seen in one column, nearest first.
#[derive(Clone, Copy, Debug)]
pub struct OccludingColumn {
    count: u8,
    depths: [f32; OccludingColumn::MAX_ENTRIES],
    lines: [LinedefId; OccludingColumn::MAX_ENTRIES],
    bounds: [Bounds; OccludingColumn::MAX_ENTRIES],
}

impl Default for OccludingColumn {
    fn default() -> Self {
        Self {
            count: 0,
            depths: [0.0; Self::MAX_ENTRIES],
            lines: [0; Self::MAX_ENTRIES],
            bounds: [Bounds::CLOSED; Self::MAX_ENTRIES],
        }
    }
}

impl OccludingColumn {
    pub const MAX_ENTRIES: usize = 16;

    #[inline]
    pub fn len(&self) -> usize {
        self.count as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn depths(&self) -> &[f32] {
        &self.depths[..self.len()]
    }

    #[inline]
    pub fn lines(&self) -> &[LinedefId] {
        &self.lines[..self.len()]
    }

    #[inline]
    pub fn bounds(&self) -> &[Bounds] {
        &self.bounds[..self.len()]
    }

    pub fn is_sorted(&self) -> bool {
        self.depths().windows(2).all(|w| w[0] <= w[1])
    }

    /// Record an occluder at `depth`.
    ///
    /// Segs arrive front to back, so the insertion point is almost always
    /// the end. A full column keeps its entries; only an occluder that
    /// closes the column may replace the last one, since it hides
    /// everything behind it anyway. Returns false when the occluder was not
    /// tracked.
    pub fn insert(&mut self, depth: f32, line: LinedefId, bounds: Bounds, closes: bool) -> bool {
        let len = self.len();
        if len == Self::MAX_ENTRIES {
            if !closes || depth < self.depths[len - 1] {
                return false;
            }
            self.depths[len - 1] = depth;
            self.lines[len - 1] = line;
            self.bounds[len - 1] = bounds;
            return true;
        }

        let at = self.depths().partition_point(|&d| d <= depth);
        self.depths.copy_within(at..len, at + 1);
        self.lines.copy_within(at..len, at + 1);
        self.bounds.copy_within(at..len, at + 1);
        self.depths[at] = depth;
        self.lines[at] = line;
        self.bounds[at] = bounds;
        self.count += 1;
        true
    }

    /// Combined bounds of every occluder nearer than `depth`, skipping
    /// those `in_front_of` reports the object is actually in front of.
    /// `None` when nothing applies.
    pub fn occluder_for<F>(&self, depth: f32, mut in_front_of: F) -> Option<Bounds>
    where
        F: FnMut(LinedefId) -> bool,
    {
        let nearer = self.depths().partition_point(|&d| d < depth);
        (0..nearer)
            .filter(|&i| !in_front_of(self.lines[i]))
            .map(|i| self.bounds[i])
            .reduce(Bounds::intersect)
    }
}

/// One [`OccludingColumn`] per screen column.
#[derive(Default)]
pub struct OccludingColumns {
    cols: Vec<OccludingColumn>,
}

impl OccludingColumns {
    pub fn reset(&mut self, width: usize) {
        self.cols.clear();
        self.cols.resize(width, OccludingColumn::default());
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cols.is_empty()
    }

    #[inline]
    pub fn column(&self, x: usize) -> Option<&OccludingColumn> {
        self.cols.get(x)
    }

    /// See [`OccludingColumn::insert`]. Out-of-range columns are ignored.
    pub fn insert(&mut self, x: usize, depth: f32, line: LinedefId, bounds: Bounds, closes: bool) -> bool {
        self.cols
            .get_mut(x)
            .is_some_and(|c| c.insert(depth, line, bounds, closes))
    }

    /// See [`OccludingColumn::occluder_for`].
    pub fn occluder_for<F>(&self, x: usize, depth: f32, in_front_of: F) -> Option<Bounds>
    where
        F: FnMut(LinedefId) -> bool,
    {
        self.cols.get(x)?.occluder_for(depth, in_front_of)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OccludingColumn> {
        self.cols.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(top: i16, bottom: i16) -> Bounds {
        Bounds { top, bottom }
    }

    #[test]
    fn open_and_full() {
        let o = Bounds::open(100);
        assert_eq!(o.rows(), Some((0, 99)));
        assert!(!o.is_full());
        assert!(Bounds::CLOSED.is_full());
        assert!(b(10, 11).is_full());
        assert_eq!(b(10, 12).rows(), Some((11, 11)));
    }

    #[test]
    fn insert_keeps_depths_sorted() {
        let mut col = OccludingColumn::default();
        for (i, d) in [10.0, 20.0, 15.0, 5.0, 20.0].into_iter().enumerate() {
            assert!(col.insert(d, i as u16, b(i as i16, 90), false));
            assert!(col.is_sorted());
        }
        assert_eq!(col.depths(), &[5.0, 10.0, 15.0, 20.0, 20.0]);
        assert_eq!(col.lines(), &[3, 0, 2, 1, 4]);
    }

    #[test]
    fn full_column_only_takes_closers() {
        let mut col = OccludingColumn::default();
        for i in 0..OccludingColumn::MAX_ENTRIES {
            assert!(col.insert(i as f32, i as u16, b(0, 50), false));
        }
        assert!(!col.insert(100.0, 99, b(5, 40), false));
        assert!(col.insert(100.0, 99, Bounds::CLOSED, true));
        assert_eq!(col.len(), OccludingColumn::MAX_ENTRIES);
        assert_eq!(*col.lines().last().unwrap(), 99);
        assert!(col.is_sorted());
        // a closer nearer than the last entry would break the order
        assert!(!col.insert(3.5, 7, Bounds::CLOSED, true));
    }

    #[test]
    fn occluders_combine_nearer_entries_only() {
        let mut col = OccludingColumn::default();
        col.insert(10.0, 1, b(20, 180), false);
        col.insert(30.0, 2, b(40, 150), false);
        col.insert(50.0, 3, Bounds::CLOSED, true);

        assert_eq!(col.occluder_for(5.0, |_| false), None);
        assert_eq!(col.occluder_for(20.0, |_| false), Some(b(20, 180)));
        assert_eq!(col.occluder_for(40.0, |_| false), Some(b(40, 150)));
        assert!(col.occluder_for(60.0, |_| false).unwrap().is_full());
        // standing in front of line 2 leaves only line 1
        assert_eq!(col.occluder_for(40.0, |l| l == 2), Some(b(20, 180)));
    }

    #[test]
    fn columns_ignore_out_of_range() {
        let mut cols = OccludingColumns::default();
        cols.reset(4);
        assert!(!cols.insert(9, 1.0, 0, Bounds::CLOSED, true));
        assert!(cols.insert(3, 1.0, 0, Bounds::CLOSED, true));
        assert_eq!(cols.column(3).map(OccludingColumn::len), Some(1));
        assert_eq!(cols.occluder_for(9, 2.0, |_| false), None);
    }
}
