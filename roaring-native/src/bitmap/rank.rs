use super::Bitmap;
use crate::container::Container;
use crate::util;

/// Cumulative container cardinalities of a [`Bitmap`], answering rank and select
/// with a binary search over containers instead of a linear scan.
///
/// The index borrows the bitmap, so it cannot outlive a mutation.
///
/// # Examples
///
/// ```
/// use roaring_native::Bitmap;
///
/// let bitmap: Bitmap = (0..10).chain(100_000..100_010).collect();
/// let index = bitmap.rank_index();
///
/// assert_eq!(index.rank(100_004), 15);
/// assert_eq!(index.select(15), Some(100_005));
/// assert_eq!(index.select(20), None);
/// ```
#[derive(Clone, Debug)]
pub struct RankIndex<'a> {
    bitmap: &'a Bitmap,
    /// `cumulative[i]` is the cardinality of containers `0..=i`.
    cumulative: Vec<u64>,
}

impl<'a> RankIndex<'a> {
    fn new(bitmap: &'a Bitmap) -> Self {
        let cumulative = bitmap
            .containers()
            .iter()
            .scan(0, |total, container| {
                *total += container.len();
                Some(*total)
            })
            .collect();
        RankIndex { bitmap, cumulative }
    }

    fn before(&self, index: usize) -> u64 {
        index.checked_sub(1).map_or(0, |prev| self.cumulative[prev])
    }

    /// Number of values smaller or equal to `x`.
    pub fn rank(&self, x: u32) -> u64 {
        let (key, low) = util::split(x);
        let keys = self.bitmap.keys();
        let index = keys.partition_point(|&k| k < key);
        let before = self.before(index);
        match keys.get(index) {
            Some(&k) if k == key => before + self.bitmap.containers()[index].rank(low),
            _ => before,
        }
    }

    /// Value at 0-based position `rank`, if the bitmap holds more than `rank` values.
    pub fn select(&self, rank: u32) -> Option<u32> {
        let rank = u64::from(rank);
        let index = self.cumulative.partition_point(|&total| total <= rank);
        let container: &Container = self.bitmap.containers().get(index)?;
        let local = rank - self.before(index);
        container
            .select(local as u32)
            .map(|low| util::join(self.bitmap.keys()[index], low))
    }

    /// Total cardinality of the indexed bitmap.
    pub fn cardinality(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }
}

impl Bitmap {
    /// Builds a [`RankIndex`] for repeated rank/select queries.
    pub fn rank_index(&self) -> RankIndex<'_> {
        RankIndex::new(self)
    }
}
