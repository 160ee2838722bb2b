//! Voxel coordinate enumeration.

use ndarray::{indices, IxDyn};

/// Which coordinate varies fastest when enumerating a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexOrder {
    /// First coordinate (i) varies fastest.
    #[default]
    Ijk,
    /// Last coordinate varies fastest (row-major).
    Kji,
}

/// Every index coordinate of a volume with the given `shape`.
///
/// ```
/// use tfstats::voxels::{voxel_index_list, IndexOrder};
///
/// let ijk = voxel_index_list([2, 3], IndexOrder::Ijk);
/// assert_eq!(ijk, vec![[0, 0], [1, 0], [0, 1], [1, 1], [0, 2], [1, 2]]);
///
/// let kji = voxel_index_list([2, 3], IndexOrder::Kji);
/// assert_eq!(kji, vec![[0, 0], [0, 1], [0, 2], [1, 0], [1, 1], [1, 2]]);
/// ```
pub fn voxel_index_list<const N: usize>(shape: [usize; N], order: IndexOrder) -> Vec<[usize; N]> {
    // `indices` is row-major, so Ijk walks the reversed shape.
    let dims: Vec<usize> = match order {
        IndexOrder::Ijk => shape.iter().rev().copied().collect(),
        IndexOrder::Kji => shape.to_vec(),
    };
    indices(IxDyn(&dims))
        .into_iter()
        .map(|index| {
            let mut coord = [0usize; N];
            for (axis, slot) in coord.iter_mut().enumerate() {
                *slot = match order {
                    IndexOrder::Ijk => index[N - 1 - axis],
                    IndexOrder::Kji => index[axis],
                };
            }
            coord
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_first_hundred() {
        let vox = voxel_index_list([5, 5, 5], IndexOrder::Ijk);
        assert_eq!(vox.len(), 125);
        assert_eq!(vox[0], [0, 0, 0]);
        assert_eq!(vox[1], [1, 0, 0]);
        assert_eq!(vox[5], [0, 1, 0]);
        assert_eq!(vox[25], [0, 0, 1]);
        assert_eq!(vox[124], [4, 4, 4]);
    }

    #[test]
    fn test_kji_is_row_major() {
        let vox = voxel_index_list([2, 3, 4], IndexOrder::Kji);
        assert_eq!(vox.len(), 24);
        assert_eq!(vox[1], [0, 0, 1]);
        assert_eq!(vox[4], [0, 1, 0]);
        assert_eq!(vox[12], [1, 0, 0]);
        assert_eq!(vox[23], [1, 2, 3]);
    }

    #[test]
    fn test_empty_volume() {
        assert!(voxel_index_list([3, 0], IndexOrder::Ijk).is_empty());
        assert!(voxel_index_list([0, 3, 2], IndexOrder::Kji).is_empty());
    }

    #[test]
    fn test_orders_enumerate_same_set() {
        let mut ijk = voxel_index_list([3, 2, 4], IndexOrder::Ijk);
        let kji = voxel_index_list([3, 2, 4], IndexOrder::Kji);
        ijk.sort();
        assert_eq!(ijk, kji);
    }
}
