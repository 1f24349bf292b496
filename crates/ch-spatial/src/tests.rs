//! Unit tests for ch-spatial.

#[cfg(test)]
mod helpers {
    use crate::{RectangleInt2D, TreeNode};

    pub fn node(min_lon: i32, max_lon: i32, min_lat: i32, max_lat: i32) -> TreeNode {
        TreeNode::from(RectangleInt2D::new(min_lon, max_lon, min_lat, max_lat))
    }

    /// `n` unit squares along the longitude axis.
    pub fn row(n: i32) -> Vec<TreeNode> {
        (0..n).map(|i| node(i * 10, i * 10 + 10, 0, 10)).collect()
    }
}

// ── Rectangle ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod rectangle {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use ch_core::{Coordinate, FormatError, Record, Section};

    use crate::RectangleInt2D;

    #[test]
    fn byte_layout_is_lon_then_lat() {
        let mut out = Vec::new();
        RectangleInt2D::new(1, 2, -3, 4).encode(&mut out);
        assert_eq!(out.len(), 16);
        assert_eq!(&out[0..4], &1i32.to_le_bytes());
        assert_eq!(&out[4..8], &2i32.to_le_bytes());
        assert_eq!(&out[8..12], &(-3i32).to_le_bytes());
        assert_eq!(&out[12..16], &4i32.to_le_bytes());
        assert_eq!(RectangleInt2D::decode(&out).unwrap(), RectangleInt2D::new(1, 2, -3, 4));
    }

    #[test]
    fn decode_rejects_wrong_width() {
        let err = RectangleInt2D::decode(&[0u8; 15]).unwrap_err();
        assert!(matches!(err, FormatError::SizeMismatch { section: Section::TreeNodes, .. }));
    }

    #[test]
    fn empty_is_default_and_invalid() {
        assert!(RectangleInt2D::default().is_empty());
        assert!(!RectangleInt2D::EMPTY.is_valid());
        assert!(RectangleInt2D::new(0, 0, 0, 0).is_valid());
        assert!(!RectangleInt2D::new(5, 4, 0, 0).is_valid());
        assert!(!RectangleInt2D::new(0, 0, 1, 0).is_valid());
    }

    #[test]
    fn contains_is_inclusive() {
        let r = RectangleInt2D::new(0, 10, 0, 10);
        assert!(r.contains(&Coordinate::new(0, 0)));
        assert!(r.contains(&Coordinate::new(10, 10)));
        assert!(r.contains(&Coordinate::new(5, 7)));
        assert!(!r.contains(&Coordinate::new(11, 5)));
        assert!(!r.contains(&Coordinate::new(5, -1)));
        assert!(!RectangleInt2D::EMPTY.contains(&Coordinate::new(0, 0)));
    }

    #[test]
    fn merge_into_empty_yields_other() {
        let mut r = RectangleInt2D::EMPTY;
        let other = RectangleInt2D::new(-5, 5, 1, 2);
        r.merge(&other);
        assert_eq!(r, other);
    }

    #[test]
    fn merge_covers_every_point() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut r = RectangleInt2D::EMPTY;
        let points: Vec<Coordinate> = (0..200)
            .map(|_| {
                Coordinate::new(
                    rng.gen_range(-180_000_000..=180_000_000),
                    rng.gen_range(-90_000_000..=90_000_000),
                )
            })
            .collect();
        for p in &points {
            r.merge(&RectangleInt2D::from_point(*p));
        }
        assert!(r.is_valid());
        assert!(points.iter().all(|p| r.contains(p)));
        assert!(points.iter().all(|p| r.min_squared_distance(p) == 0));
    }

    #[test]
    fn min_squared_distance_outside() {
        let r = RectangleInt2D::new(0, 10, 0, 10);
        // Straight left of the rectangle.
        assert_eq!(r.min_squared_distance(&Coordinate::new(-3, 5)), 9);
        // Diagonal from the top-right corner.
        assert_eq!(r.min_squared_distance(&Coordinate::new(13, 14)), 9 + 16);
    }

    #[test]
    fn min_squared_distance_of_empty_is_infinite() {
        assert_eq!(RectangleInt2D::EMPTY.min_squared_distance(&Coordinate::new(0, 0)), u64::MAX);
    }

    #[test]
    fn extreme_distance_does_not_overflow() {
        let r = RectangleInt2D::new(i32::MAX, i32::MAX, i32::MAX, i32::MAX);
        let d = r.min_squared_distance(&Coordinate::new(i32::MIN, i32::MIN));
        assert!(d > 0);
    }
}

// ── Tree construction ─────────────────────────────────────────────────────────

#[cfg(test)]
mod tree {
    use ch_core::{FormatError, Section};

    use super::helpers::{node, row};
    use crate::{RectangleInt2D, StaticRTree, TreeLevelStart, TreeNode};

    #[test]
    fn level_starts_from_level_sizes() {
        let tree = StaticRTree::from_levels(vec![row(1), row(4), row(16)]).unwrap();
        let starts: Vec<u64> = tree.level_starts().iter().map(|s| s.0).collect();
        assert_eq!(starts, vec![0, 1, 5, 21]);
        assert_eq!(tree.node_count(), 21);
        assert_eq!(tree.level_count(), 3);
        assert_eq!(tree.leaf_level(), Some(2));
        assert_eq!(tree.level_range(1).unwrap(), 1..5);
        assert_eq!(tree.level_range(2).unwrap(), 5..21);
        assert_eq!(tree.level_nodes(2).unwrap().len(), 16);
    }

    #[test]
    fn level_out_of_range() {
        let tree = StaticRTree::from_levels(vec![row(1), row(4)]).unwrap();
        let err = tree.level_range(2).unwrap_err();
        assert_eq!(
            err,
            FormatError::OutOfRange { section: Section::TreeLevelStarts, index: 2, len: 2 }
        );
    }

    #[test]
    fn bounding_rectangle_lookup() {
        let tree = StaticRTree::from_levels(vec![vec![node(0, 40, 0, 10)], row(4)]).unwrap();
        assert_eq!(tree.bounding_rectangle_of(0).unwrap(), RectangleInt2D::new(0, 40, 0, 10));
        assert_eq!(tree.bounding_rectangle_of(3).unwrap(), RectangleInt2D::new(20, 30, 0, 10));
        assert_eq!(
            tree.bounding_rectangle_of(5).unwrap_err(),
            FormatError::OutOfRange { section: Section::TreeNodes, index: 5, len: 5 }
        );
    }

    #[test]
    fn bounds_merges_root_level() {
        let tree = StaticRTree::from_levels(vec![row(2), row(4)]).unwrap();
        assert_eq!(tree.bounds(), RectangleInt2D::new(0, 20, 0, 10));
    }

    #[test]
    fn empty_tree() {
        let tree = StaticRTree::from_levels(Vec::new()).unwrap();
        assert_eq!(tree.node_count(), 0);
        assert_eq!(tree.level_count(), 0);
        assert_eq!(tree.leaf_level(), None);
        assert!(tree.bounds().is_empty());
    }

    #[test]
    fn inverted_rectangle_is_rejected_with_index() {
        let mut leaves = row(4);
        leaves[2] = node(10, 5, 0, 10);
        let err = StaticRTree::from_levels(vec![row(1), leaves]).unwrap_err();
        assert_eq!(err, FormatError::InvalidRectangle { index: 3 });
    }

    #[test]
    fn empty_rectangle_is_allowed() {
        let leaves = vec![TreeNode::from(RectangleInt2D::EMPTY), node(0, 1, 0, 1)];
        assert!(StaticRTree::from_levels(vec![row(1), leaves]).is_ok());
    }

    #[test]
    fn level_starts_must_begin_at_zero() {
        let starts = vec![TreeLevelStart(1), TreeLevelStart(2)];
        let err = StaticRTree::from_parts(row(2), starts).unwrap_err();
        assert_eq!(err, FormatError::InvalidLevelStarts { index: 0 });
    }

    #[test]
    fn level_starts_must_not_decrease() {
        let starts = vec![TreeLevelStart(0), TreeLevelStart(3), TreeLevelStart(2), TreeLevelStart(4)];
        let err = StaticRTree::from_parts(row(4), starts).unwrap_err();
        assert_eq!(err, FormatError::InvalidLevelStarts { index: 2 });
    }

    #[test]
    fn level_starts_must_end_at_node_count() {
        let starts = vec![TreeLevelStart(0), TreeLevelStart(1), TreeLevelStart(4)];
        let err = StaticRTree::from_parts(row(5), starts).unwrap_err();
        assert_eq!(err, FormatError::InvalidLevelStarts { index: 2 });
    }

    #[test]
    fn missing_level_starts_rejected() {
        let err = StaticRTree::from_parts(Vec::new(), Vec::new()).unwrap_err();
        assert_eq!(err, FormatError::InvalidLevelStarts { index: 0 });
    }

    #[test]
    fn empty_level_is_allowed() {
        let starts = vec![TreeLevelStart(0), TreeLevelStart(1), TreeLevelStart(1), TreeLevelStart(3)];
        let tree = StaticRTree::from_parts(row(3), starts).unwrap();
        assert!(tree.level_nodes(1).unwrap().is_empty());
    }
}

// ── Implied parent/child layout ───────────────────────────────────────────────

#[cfg(test)]
mod layout {
    use ch_core::{FormatError, Section};

    use super::helpers::row;
    use crate::{BRANCHING_FACTOR, LEAF_NODE_SIZE, StaticRTree, TreeLevelStart};

    #[test]
    fn level_of_each_node() {
        let tree = StaticRTree::from_levels(vec![row(1), row(4), row(16)]).unwrap();
        assert_eq!(tree.level_of(0).unwrap(), 0);
        assert_eq!(tree.level_of(1).unwrap(), 1);
        assert_eq!(tree.level_of(4).unwrap(), 1);
        assert_eq!(tree.level_of(5).unwrap(), 2);
        assert_eq!(tree.level_of(20).unwrap(), 2);
        assert!(matches!(
            tree.level_of(21).unwrap_err(),
            FormatError::OutOfRange { section: Section::TreeNodes, index: 21, .. }
        ));
    }

    #[test]
    fn level_of_skips_empty_levels() {
        let starts = vec![TreeLevelStart(0), TreeLevelStart(1), TreeLevelStart(1), TreeLevelStart(3)];
        let tree = StaticRTree::from_parts(row(3), starts).unwrap();
        assert_eq!(tree.level_of(1).unwrap(), 2);
    }

    #[test]
    fn children_are_clipped_to_next_level() {
        let tree = StaticRTree::from_levels(vec![row(2), row(70)]).unwrap();
        assert_eq!(tree.child_range(0).unwrap(), 2..2 + BRANCHING_FACTOR);
        assert_eq!(tree.child_range(1).unwrap(), 2 + BRANCHING_FACTOR..72);
    }

    #[test]
    fn leaves_have_no_child_nodes() {
        let tree = StaticRTree::from_levels(vec![row(1), row(4)]).unwrap();
        assert!(matches!(
            tree.child_range(3).unwrap_err(),
            FormatError::OutOfRange { section: Section::TreeLevelStarts, index: 2, .. }
        ));
    }

    #[test]
    fn leaf_segment_ranges() {
        let tree = StaticRTree::from_levels(vec![row(1), row(2)]).unwrap();
        let segments = LEAF_NODE_SIZE + 10;
        assert_eq!(tree.leaf_segment_range(1, segments).unwrap(), 0..LEAF_NODE_SIZE);
        assert_eq!(tree.leaf_segment_range(2, segments).unwrap(), LEAF_NODE_SIZE..segments);
        assert!(tree.leaf_segment_range(0, segments).is_err());
    }
}

// ── Flat byte layout ──────────────────────────────────────────────────────────

#[cfg(test)]
mod flat {
    use ch_core::{FormatError, Metadata, Record, Section};

    use super::helpers::row;
    use crate::{StaticRTree, TreeLevelStart, TreeNode};

    #[test]
    fn encode_then_load() {
        let tree = StaticRTree::from_levels(vec![row(1), row(4), row(16)]).unwrap();
        let bytes = tree.encode();
        assert_eq!(bytes.len(), 8 + 21 * TreeNode::SIZE + 8 + 4 * TreeLevelStart::SIZE);
        assert_eq!(Metadata::decode(Section::TreeNodes, &bytes[..8]).unwrap().element_count, 21);

        let loaded = StaticRTree::load(&bytes).unwrap();
        assert_eq!(loaded.nodes(), tree.nodes());
        assert_eq!(loaded.level_starts(), tree.level_starts());
    }

    #[test]
    fn level_start_record_layout() {
        let mut out = Vec::new();
        TreeLevelStart(0x0102).encode(&mut out);
        assert_eq!(out, [2, 1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(TreeLevelStart::decode(&out).unwrap(), TreeLevelStart(0x0102));
        assert_eq!(
            TreeLevelStart::decode(&out[..7]).unwrap_err(),
            FormatError::SizeMismatch {
                section: Section::TreeLevelStarts,
                offset: 0,
                expected: 8,
                actual: 7,
            }
        );
    }

    #[test]
    fn write_to_matches_encode() {
        let tree = StaticRTree::from_levels(vec![row(2)]).unwrap();
        let mut out = Vec::new();
        tree.write_to(&mut out).unwrap();
        assert_eq!(out, tree.encode());
    }

    #[test]
    fn truncated_level_starts() {
        let tree = StaticRTree::from_levels(vec![row(1), row(4)]).unwrap();
        let bytes = tree.encode();
        let err = StaticRTree::load(&bytes[..bytes.len() - 4]).unwrap_err();
        assert!(matches!(
            err,
            FormatError::TruncatedInput { section: Section::TreeLevelStarts, .. }
        ));
    }

    #[test]
    fn trailing_bytes_rejected() {
        let tree = StaticRTree::from_levels(vec![row(1)]).unwrap();
        let mut bytes = tree.encode();
        bytes.push(0);
        let err = StaticRTree::load(&bytes).unwrap_err();
        assert!(matches!(err, FormatError::SizeMismatch { section: Section::TreeLevelStarts, .. }));
    }

    #[test]
    fn invalid_rectangle_on_disk() {
        let tree = StaticRTree::from_levels(vec![row(1), row(2)]).unwrap();
        let mut bytes = tree.encode();
        // Node 2 min_lon := i32::MAX, leaving max_lon below it.
        let at = 8 + 2 * TreeNode::SIZE;
        bytes[at..at + 4].copy_from_slice(&i32::MAX.to_le_bytes());
        assert_eq!(StaticRTree::load(&bytes).unwrap_err(), FormatError::InvalidRectangle { index: 2 });
    }

    #[test]
    fn tree_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StaticRTree>();
    }
}
