//! Packed Octree Operations - Pure DOP Functions
//!
//! Conversion between the arena octree and the packed word buffer, plus
//! direct lookups over a packed buffer. Every index read from a buffer is
//! checked before use; a malformed buffer is an error, never a panic.

use super::packed_octree_data::{
    PackedLayout, PackedOctree, PackedOctreeView, SparseVoxelOctreeHeader,
};
use super::{PersistenceError, PersistenceResult};
use crate::constants::packed::{
    CHILD_HAS_DATA_SHIFT, CHILD_IS_LEAF_SHIFT, FAR_TABLE_START_WORD, IS_FAR_BIT,
    MAX_CHILD_POINTER, MAX_LEVEL_SIZE, PALETTE_START_WORD, ROOT_SLOT,
};
use crate::world::core::{MaterialId, Voxel, WorldExtent};
use crate::world::octree::sparse_octree_operations::{
    child_index, child_min, compress_tree, create_sparse_octree, is_leaf, subdivide,
};
use crate::world::octree::{ChildOrder, SparseOctreeWorld, ROOT_NODE};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Build a node descriptor word
pub fn make_descriptor(pointer: u32, leaf_mask: u8, data_mask: u8) -> u32 {
    pointer
        | (leaf_mask as u32) << CHILD_IS_LEAF_SHIFT
        | (data_mask as u32) << CHILD_HAS_DATA_SHIFT
}

pub fn leaf_mask(word: u32) -> u8 {
    (word >> CHILD_IS_LEAF_SHIFT) as u8
}

pub fn data_mask(word: u32) -> u8 {
    (word >> CHILD_HAS_DATA_SHIFT) as u8
}

/// Position of `octant` inside the child block: only octants with data
/// occupy a slot
fn child_rank(data_mask: u8, octant: usize) -> usize {
    (data_mask as u32 & ((1u32 << octant) - 1)).count_ones() as usize
}

struct Palette {
    entries: Vec<(u32, u32)>,
    lookup: FxHashMap<(u32, u32), u32>,
}

impl Palette {
    fn index_of(&mut self, material: u32, color: u32) -> u32 {
        let entries = &mut self.entries;
        *self.lookup.entry((material, color)).or_insert_with(|| {
            entries.push((material, color));
            (entries.len() - 1) as u32
        })
    }
}

/// Linearize an octree breadth-first.
///
/// Each node's children with data form one contiguous block allocated when
/// the node is visited. A block further than `MAX_CHILD_POINTER` words
/// from its parent goes through the far table.
pub fn encode_octree(world: &SparseOctreeWorld) -> PersistenceResult<PackedOctree> {
    let mut data = vec![0u32; ROOT_SLOT];
    let mut far_table: Vec<u32> = Vec::new();
    let mut palette = Palette {
        entries: Vec::new(),
        lookup: FxHashMap::default(),
    };

    let root = world.nodes[ROOT_NODE as usize];
    let all_air = is_leaf(&root) && MaterialId(root.material).is_air();

    if !all_air {
        data.push(0);
        let mut queue = VecDeque::from([(ROOT_NODE, ROOT_SLOT)]);

        while let Some((index, slot)) = queue.pop_front() {
            let node = world.nodes[index as usize];
            let block_start = data.len();
            let mut leaves = 0u8;
            let mut present = 0u8;

            if is_leaf(&node) {
                // Solid leaf root: every octant carries its content
                let word = palette.index_of(node.material, node.color);
                let octants = if node.size > 1 { 8 } else { 1 };
                for octant in 0..octants {
                    leaves |= 1 << octant;
                    present |= 1 << octant;
                    data.push(word);
                }
            } else {
                for (octant, &child) in node.children.iter().enumerate() {
                    if child == 0 {
                        continue;
                    }
                    let child_node = world.nodes[child as usize];
                    if is_leaf(&child_node) {
                        if MaterialId(child_node.material).is_air() {
                            continue;
                        }
                        leaves |= 1 << octant;
                        present |= 1 << octant;
                        data.push(palette.index_of(child_node.material, child_node.color));
                    } else {
                        present |= 1 << octant;
                        queue.push_back((child, data.len()));
                        data.push(0);
                    }
                }
            }

            let offset = block_start - slot;
            let pointer = if present == 0 {
                0
            } else if offset <= MAX_CHILD_POINTER as usize {
                offset as u32
            } else {
                let far_index = far_table.len();
                if far_index > MAX_CHILD_POINTER as usize {
                    return Err(PersistenceError::FarTableOverflow {
                        needed: far_index + 1,
                        max: MAX_CHILD_POINTER as usize + 1,
                    });
                }
                far_table.push(block_start as u32);
                IS_FAR_BIT | far_index as u32
            };

            data[slot] = make_descriptor(pointer, leaves, present);
        }
    }

    let far_start = data.len();
    data.extend_from_slice(&far_table);
    let palette_start = data.len();
    for &(material, color) in &palette.entries {
        data.push(material);
        data.push(color);
    }
    data[FAR_TABLE_START_WORD] = far_start as u32;
    data[PALETTE_START_WORD] = palette_start as u32;

    log::debug!(
        "[PackedOctree::encode] {} node slots, {} far pointers, {} palette entries",
        far_start - ROOT_SLOT,
        far_table.len(),
        palette.entries.len()
    );

    Ok(PackedOctree {
        header: SparseVoxelOctreeHeader {
            max_level_size: world.max_depth,
        },
        data,
    })
}

/// Check the header and section boundaries of a packed buffer
pub fn read_layout(packed: &PackedOctree) -> PersistenceResult<PackedLayout> {
    let max_level_size = packed.header.max_level_size;
    if max_level_size > MAX_LEVEL_SIZE {
        return Err(PersistenceError::DepthOverflow { max_level_size });
    }

    let data = &packed.data;
    if data.len() < ROOT_SLOT {
        return Err(PersistenceError::Truncated {
            needed: ROOT_SLOT,
            available: data.len(),
        });
    }

    let far_start = data[FAR_TABLE_START_WORD] as usize;
    let palette_start = data[PALETTE_START_WORD] as usize;
    if palette_start > data.len() {
        return Err(PersistenceError::Truncated {
            needed: palette_start,
            available: data.len(),
        });
    }
    if far_start < ROOT_SLOT || far_start > palette_start {
        return Err(PersistenceError::BadLayout {
            far_start,
            palette_start,
        });
    }

    let palette_words = data.len() - palette_start;
    if palette_words % 2 != 0 {
        return Err(PersistenceError::BadPalette {
            reason: format!("odd palette length of {} words", palette_words),
        });
    }

    Ok(PackedLayout {
        far_start,
        palette_start,
        palette_len: palette_words / 2,
        root_size: 1u32 << max_level_size,
    })
}

/// Slot of `octant`'s child for the descriptor stored at `slot`
fn child_slot(
    packed: &PackedOctree,
    layout: &PackedLayout,
    slot: usize,
    word: u32,
    octant: usize,
) -> PersistenceResult<usize> {
    let pointer = (word & MAX_CHILD_POINTER) as usize;

    let block_start = if word & IS_FAR_BIT != 0 {
        let table_len = layout.palette_start - layout.far_start;
        if pointer >= table_len {
            return Err(PersistenceError::MissingFarPointer {
                slot,
                index: pointer,
                table_len,
            });
        }
        packed.data[layout.far_start + pointer] as usize
    } else {
        slot + pointer
    };

    let target = block_start + child_rank(data_mask(word), octant);
    if target < ROOT_SLOT || target >= layout.far_start {
        return Err(PersistenceError::DanglingPointer {
            slot,
            target,
            limit: layout.far_start,
        });
    }
    Ok(target)
}

/// Content of the leaf word at `slot`
fn palette_voxel(
    packed: &PackedOctree,
    layout: &PackedLayout,
    slot: usize,
) -> PersistenceResult<Voxel> {
    let index = packed.data[slot] as usize;
    if index >= layout.palette_len {
        return Err(PersistenceError::BadPalette {
            reason: format!(
                "slot {} references entry {} of {}",
                slot, index, layout.palette_len
            ),
        });
    }
    let base = layout.palette_start + 2 * index;
    Ok(Voxel::new(MaterialId(packed.data[base]), packed.data[base + 1]))
}

/// Rebuild an octree whose extent is the full root cube
pub fn decode_octree(packed: &PackedOctree) -> PersistenceResult<SparseOctreeWorld> {
    let layout = read_layout(packed)?;
    let size = layout.root_size;
    let extent =
        WorldExtent::new(size, size, size).map_err(|_| PersistenceError::ExtentMismatch {
            root_size: size,
            extent: (size, size, size),
        })?;
    decode_into(packed, layout, extent)
}

/// Rebuild an octree for a world of `extent`. The packed root cube must be
/// the one such a world uses.
pub fn decode_octree_with_extent(
    packed: &PackedOctree,
    extent: WorldExtent,
) -> PersistenceResult<SparseOctreeWorld> {
    let layout = read_layout(packed)?;
    if extent.max_axis().next_power_of_two() != layout.root_size {
        return Err(PersistenceError::ExtentMismatch {
            root_size: layout.root_size,
            extent: extent.as_tuple(),
        });
    }
    decode_into(packed, layout, extent)
}

fn decode_into(
    packed: &PackedOctree,
    layout: PackedLayout,
    extent: WorldExtent,
) -> PersistenceResult<SparseOctreeWorld> {
    let mut world = create_sparse_octree(extent, ChildOrder::default());
    if layout.far_start == ROOT_SLOT {
        return Ok(world);
    }

    let depth_overflow = || PersistenceError::DepthOverflow {
        max_level_size: packed.header.max_level_size,
    };

    let root_word = packed.data[ROOT_SLOT];
    if layout.root_size == 1 {
        if data_mask(root_word) & 1 != 0 {
            if leaf_mask(root_word) & 1 == 0 {
                return Err(depth_overflow());
            }
            let slot = child_slot(packed, &layout, ROOT_SLOT, root_word, 0)?;
            let voxel = palette_voxel(packed, &layout, slot)?;
            let root = &mut world.nodes[ROOT_NODE as usize];
            root.material = voxel.material.0;
            root.color = voxel.color;
        }
        return Ok(world);
    }

    // Each slot belongs to exactly one parent; a second reference would
    // turn the tree into a DAG that expands exponentially on decode
    let mut claimed = vec![false; layout.far_start];
    claimed[ROOT_SLOT] = true;

    let mut stack = vec![(ROOT_NODE as usize, ROOT_SLOT)];
    while let Some((index, slot)) = stack.pop() {
        let word = packed.data[slot];
        // Fresh air leaf of size >= 2, so this always splits
        let split = subdivide(&mut world, index);
        debug_assert!(split, "decoded node {} did not split", index);

        let children = world.nodes[index].children;
        let child_size = world.nodes[index].size / 2;
        let (leaves, present) = (leaf_mask(word), data_mask(word));

        for (octant, &child) in children.iter().enumerate() {
            if present & (1 << octant) == 0 {
                continue;
            }
            let target = child_slot(packed, &layout, slot, word, octant)?;
            if claimed[target] {
                return Err(PersistenceError::AliasedSlot { slot, target });
            }
            claimed[target] = true;

            if leaves & (1 << octant) != 0 {
                let voxel = palette_voxel(packed, &layout, target)?;
                let node = &mut world.nodes[child as usize];
                node.material = voxel.material.0;
                node.color = voxel.color;
            } else {
                if child_size < 2 {
                    return Err(depth_overflow());
                }
                stack.push((child as usize, target));
            }
        }
    }

    let collapsed = compress_tree(&mut world);
    log::debug!(
        "[PackedOctree::decode] Rebuilt {} nodes ({} collapsed after decode)",
        world.nodes.len() - world.free_nodes.len(),
        collapsed
    );
    Ok(world)
}

/// View a packed buffer for direct lookups
pub fn create_packed_view(packed: &PackedOctree) -> PersistenceResult<PackedOctreeView<'_>> {
    Ok(PackedOctreeView {
        packed,
        layout: read_layout(packed)?,
    })
}

/// Look up one cell by walking the packed descriptors. Cells outside the
/// root cube read as air.
pub fn view_voxel(view: &PackedOctreeView, x: u32, y: u32, z: u32) -> PersistenceResult<Voxel> {
    let layout = &view.layout;
    let size = layout.root_size;
    if x >= size || y >= size || z >= size || layout.far_start == ROOT_SLOT {
        return Ok(Voxel::air());
    }

    let mut slot = ROOT_SLOT;
    let mut min = [0u32; 3];
    let mut node_size = size;

    loop {
        let word = view.packed.data[slot];
        let half = node_size / 2;
        let octant = if node_size == 1 {
            0
        } else {
            child_index(min, half, x, y, z)
        };

        if data_mask(word) & (1 << octant) == 0 {
            return Ok(Voxel::air());
        }
        let target = child_slot(view.packed, layout, slot, word, octant)?;
        if leaf_mask(word) & (1 << octant) != 0 {
            return palette_voxel(view.packed, layout, target);
        }
        if half < 2 {
            return Err(PersistenceError::DepthOverflow {
                max_level_size: view.packed.header.max_level_size,
            });
        }

        min = child_min(min, half, octant);
        node_size = half;
        slot = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::octree::sparse_octree_operations::{get_voxel, set_voxel};

    fn octree(x: u32, y: u32, z: u32) -> SparseOctreeWorld {
        create_sparse_octree(WorldExtent::new(x, y, z).unwrap(), ChildOrder::default())
    }

    fn solid(material: u32) -> Voxel {
        Voxel::new(MaterialId(material), 0xFF00_0000 | material * 0x10101)
    }

    /// 2x2x2 world with only cell (1,0,1), octant 5, set
    fn single_cell_packed() -> PackedOctree {
        let mut tree = octree(2, 2, 2);
        set_voxel(&mut tree, 1, 0, 1, solid(3));
        encode_octree(&tree).unwrap()
    }

    fn assert_same_content(a: &SparseOctreeWorld, b: &SparseOctreeWorld) {
        let e = a.extent;
        for x in 0..e.x as i32 {
            for y in 0..e.y as i32 {
                for z in 0..e.z as i32 {
                    assert_eq!(
                        get_voxel(a, x, y, z),
                        get_voxel(b, x, y, z),
                        "cell ({}, {}, {})",
                        x,
                        y,
                        z
                    );
                }
            }
        }
    }

    #[test]
    fn test_descriptor_bit_layout() {
        let packed = single_cell_packed();
        let color = solid(3).color;

        assert_eq!(packed.header.max_level_size, 1);
        assert_eq!(
            packed.data,
            vec![4, 4, 1 | 0x20 << 16 | 0x20 << 24, 0, 3, color]
        );
        assert_eq!(leaf_mask(packed.data[2]), 0x20);
        assert_eq!(data_mask(packed.data[2]), 0x20);
    }

    #[test]
    fn test_empty_world() {
        let tree = octree(4, 4, 4);
        let packed = encode_octree(&tree).unwrap();
        assert_eq!(packed.data, vec![2, 2]);

        let decoded = decode_octree(&packed).unwrap();
        assert_eq!(decoded.node_count(), 1);
        let view = create_packed_view(&packed).unwrap();
        assert_eq!(view_voxel(&view, 1, 2, 3).unwrap(), Voxel::air());
    }

    #[test]
    fn test_single_cell_root() {
        let mut tree = octree(1, 1, 1);
        set_voxel(&mut tree, 0, 0, 0, solid(4));
        let packed = encode_octree(&tree).unwrap();
        assert_eq!(packed.header.max_level_size, 0);

        let decoded = decode_octree(&packed).unwrap();
        assert_eq!(get_voxel(&decoded, 0, 0, 0), solid(4));
        let view = create_packed_view(&packed).unwrap();
        assert_eq!(view_voxel(&view, 0, 0, 0).unwrap(), solid(4));
    }

    #[test]
    fn test_uniform_root_leaf() {
        let mut tree = octree(4, 4, 4);
        for i in 0..64 {
            set_voxel(&mut tree, i % 4, (i / 4) % 4, i / 16, solid(3));
        }
        tree.compress_tree();
        assert_eq!(tree.node_count(), 1);

        let packed = encode_octree(&tree).unwrap();
        // Root descriptor, 8 leaf words, one palette entry
        assert_eq!(packed.data[0], 11);
        assert_eq!(packed.data[1], 11);
        assert_eq!(packed.data.len(), 13);

        let decoded = decode_octree(&packed).unwrap();
        assert_eq!(decoded.node_count(), 1);
        assert_same_content(&tree, &decoded);
    }

    #[test]
    fn test_roundtrip_layered_world() {
        let mut tree = octree(16, 8, 12);
        for x in 0..16 {
            for z in 0..12 {
                let height = 2 + (x * 3 + z * 5) % 5;
                for y in 0..height {
                    let material = if y + 1 == height { 1 } else if y < 2 { 3 } else { 2 };
                    set_voxel(&mut tree, x, y, z, solid(material as u32));
                }
            }
        }
        tree.compress_tree();

        let packed = encode_octree(&tree).unwrap();
        let decoded = decode_octree_with_extent(&packed, tree.extent).unwrap();
        assert_same_content(&tree, &decoded);
        assert!(decoded.validate().is_empty());

        let view = create_packed_view(&packed).unwrap();
        for x in 0..16 {
            for y in 0..8 {
                for z in 0..12 {
                    assert_eq!(
                        view_voxel(&view, x as u32, y as u32, z as u32).unwrap(),
                        get_voxel(&tree, x, y, z)
                    );
                }
            }
        }
    }

    #[test]
    fn test_far_pointers_roundtrip() {
        // Checkerboard leaves never compress, pushing late child blocks
        // past the near pointer range
        let mut tree = octree(64, 64, 32);
        for x in 0..64 {
            for y in 0..64 {
                for z in 0..32 {
                    if (x + y + z) % 2 == 0 {
                        set_voxel(&mut tree, x, y, z, solid(2));
                    }
                }
            }
        }

        let packed = encode_octree(&tree).unwrap();
        let far_entries = packed.data[1] - packed.data[0];
        assert!(far_entries > 0);
        // Leaf words here are palette index 0, so only descriptors carry the bit
        let far_words = packed.data[2..packed.data[0] as usize]
            .iter()
            .filter(|&&w| w & IS_FAR_BIT != 0)
            .count();
        assert_eq!(far_words, far_entries as usize);

        let decoded = decode_octree_with_extent(&packed, tree.extent).unwrap();
        assert_same_content(&tree, &decoded);
    }

    #[test]
    fn test_extent_mismatch() {
        let packed = single_cell_packed();
        let extent = WorldExtent::new(8, 2, 2).unwrap();
        assert!(matches!(
            decode_octree_with_extent(&packed, extent),
            Err(PersistenceError::ExtentMismatch { root_size: 2, .. })
        ));
    }

    #[test]
    fn test_truncated_buffer() {
        let packed = PackedOctree {
            header: SparseVoxelOctreeHeader { max_level_size: 1 },
            data: vec![5],
        };
        assert!(matches!(
            decode_octree(&packed),
            Err(PersistenceError::Truncated {
                needed: 2,
                available: 1
            })
        ));

        let mut packed = single_cell_packed();
        packed.data[1] = 10;
        assert!(matches!(
            decode_octree(&packed),
            Err(PersistenceError::Truncated { needed: 10, .. })
        ));
    }

    #[test]
    fn test_bad_palette() {
        let mut packed = single_cell_packed();
        packed.data[3] = 7;
        assert!(matches!(
            decode_octree(&packed),
            Err(PersistenceError::BadPalette { .. })
        ));

        let mut packed = single_cell_packed();
        packed.data.push(0);
        assert!(matches!(
            create_packed_view(&packed),
            Err(PersistenceError::BadPalette { .. })
        ));
    }

    #[test]
    fn test_dangling_and_missing_far_pointer() {
        let mut packed = single_cell_packed();
        packed.data[2] = make_descriptor(5, 0x20, 0x20);
        assert!(matches!(
            decode_octree(&packed),
            Err(PersistenceError::DanglingPointer {
                slot: 2,
                target: 7,
                limit: 4
            })
        ));

        let mut packed = single_cell_packed();
        packed.data[2] = make_descriptor(IS_FAR_BIT, 0x20, 0x20);
        let view = create_packed_view(&packed).unwrap();
        assert!(matches!(
            view_voxel(&view, 1, 0, 1),
            Err(PersistenceError::MissingFarPointer { index: 0, table_len: 0, .. })
        ));
    }

    #[test]
    fn test_shared_child_block_rejected() {
        // 4x4x4 root with two internal children whose descriptors both
        // point at the leaf word in slot 5
        let color = solid(3).color;
        let packed = PackedOctree {
            header: SparseVoxelOctreeHeader { max_level_size: 2 },
            data: vec![
                6,
                6,
                make_descriptor(1, 0, 0x03),
                make_descriptor(2, 0x01, 0x01),
                make_descriptor(1, 0x01, 0x01),
                0,
                3,
                color,
            ],
        };
        assert!(matches!(
            decode_octree(&packed),
            Err(PersistenceError::AliasedSlot { target: 5, .. })
        ));

        // Same buffer with the second child owning its own block decodes
        let mut owned = packed.clone();
        owned.data = vec![
            7,
            7,
            make_descriptor(1, 0, 0x03),
            make_descriptor(2, 0x01, 0x01),
            make_descriptor(2, 0x01, 0x01),
            0,
            0,
            3,
            color,
        ];
        let decoded = decode_octree(&owned).unwrap();
        assert_eq!(get_voxel(&decoded, 0, 0, 0), solid(3));
        assert_eq!(get_voxel(&decoded, 2, 0, 0), solid(3));
        assert_eq!(get_voxel(&decoded, 1, 0, 0), Voxel::air());
    }

    #[test]
    fn test_depth_overflow() {
        let mut packed = single_cell_packed();
        packed.header.max_level_size = 40;
        assert!(matches!(
            decode_octree(&packed),
            Err(PersistenceError::DepthOverflow { max_level_size: 40 })
        ));

        // Child marked as a node at the single-cell level
        let mut packed = single_cell_packed();
        packed.data[2] = make_descriptor(1, 0, 0x20);
        assert!(matches!(
            decode_octree(&packed),
            Err(PersistenceError::DepthOverflow { .. })
        ));
    }
}
