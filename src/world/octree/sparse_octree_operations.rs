//! Sparse Voxel Octree Operations - Pure DOP Functions
//!
//! Free functions over `SparseOctreeWorld`: lazy subdivision on write,
//! uniform-region compression, point queries and tree statistics.
//! Nodes live in an index arena; a released subtree goes back on the free
//! list so edit/compress cycles reuse slots.

use super::sparse_octree_data::{
    ChildOrder, OctreeNode, OctreeStats, SparseOctreeWorld, NODE_LEAF, NODE_UNIFORM, ROOT_NODE,
};
use crate::world::core::{estimate_face_normal, MaterialId, Voxel, WorldExtent, AIR_COLOR};
use cgmath::Vector3;

/// Check if octree node is a leaf
pub fn is_leaf(node: &OctreeNode) -> bool {
    node.flags & NODE_LEAF != 0
}

/// Check if octree node is a leaf collapsed from 8 identical children
pub fn is_uniform(node: &OctreeNode) -> bool {
    node.flags & NODE_UNIFORM != 0
}

/// Content stored on a node
pub fn node_voxel(node: &OctreeNode) -> Voxel {
    Voxel::new(MaterialId(node.material), node.color)
}

/// Create an all-air octree whose root cube covers `extent`
pub fn create_sparse_octree(extent: WorldExtent, child_order: ChildOrder) -> SparseOctreeWorld {
    let root_size = extent.max_axis().next_power_of_two();
    let max_depth = root_size.trailing_zeros();

    log::debug!(
        "[SparseOctree::create] {}x{}x{} world, root size {}, max depth {}",
        extent.x,
        extent.y,
        extent.z,
        root_size,
        max_depth
    );

    let root = OctreeNode {
        children: [0; 8],
        material: MaterialId::AIR.0,
        color: AIR_COLOR,
        min: [0; 3],
        size: root_size,
        flags: NODE_LEAF,
    };

    SparseOctreeWorld {
        nodes: vec![root],
        free_nodes: Vec::new(),
        extent,
        root_size,
        max_depth,
        child_order,
    }
}

/// Store a node in the arena, reusing a released slot when one exists
pub fn allocate_node(world: &mut SparseOctreeWorld, node: OctreeNode) -> u32 {
    match world.free_nodes.pop() {
        Some(index) => {
            world.nodes[index as usize] = node;
            index
        }
        None => {
            world.nodes.push(node);
            (world.nodes.len() - 1) as u32
        }
    }
}

/// Return a node and all of its descendants to the free list
pub fn release_subtree(world: &mut SparseOctreeWorld, index: u32) {
    if index == ROOT_NODE {
        return;
    }

    let mut stack = vec![index];
    while let Some(current) = stack.pop() {
        let node = world.nodes[current as usize];
        stack.extend(node.children.iter().copied().filter(|&c| c != 0));
        world.nodes[current as usize] = OctreeNode::EMPTY;
        world.free_nodes.push(current);
    }
}

/// Calculate which octant a position belongs to
pub fn child_index(base_pos: [u32; 3], half_size: u32, x: u32, y: u32, z: u32) -> usize {
    let mut octant = 0;

    if x >= base_pos[0] + half_size {
        octant |= 1;
    }
    if y >= base_pos[1] + half_size {
        octant |= 2;
    }
    if z >= base_pos[2] + half_size {
        octant |= 4;
    }

    octant
}

/// Minimum corner of the child cube in `octant`
pub fn child_min(base_pos: [u32; 3], half_size: u32, octant: usize) -> [u32; 3] {
    [
        base_pos[0] + if octant & 1 != 0 { half_size } else { 0 },
        base_pos[1] + if octant & 2 != 0 { half_size } else { 0 },
        base_pos[2] + if octant & 4 != 0 { half_size } else { 0 },
    ]
}

fn template_child(parent: &OctreeNode, octant: usize) -> OctreeNode {
    let half = parent.size / 2;
    OctreeNode {
        children: [0; 8],
        material: parent.material,
        color: parent.color,
        min: child_min(parent.min, half, octant),
        size: half,
        flags: NODE_LEAF,
    }
}

/// Split a leaf into 8 leaves that inherit its content.
///
/// Returns false without touching the tree if the node is not a leaf or is
/// already a single cell.
pub fn subdivide(world: &mut SparseOctreeWorld, index: usize) -> bool {
    let parent = world.nodes[index];
    if !is_leaf(&parent) || parent.size <= 1 {
        return false;
    }

    let mut children = [0u32; 8];
    for (octant, slot) in children.iter_mut().enumerate() {
        *slot = allocate_node(world, template_child(&parent, octant));
    }

    let node = &mut world.nodes[index];
    node.children = children;
    node.flags = 0;
    true
}

/// Collapse an internal node whose 8 children are identical leaves.
///
/// A node with a missing or internal child is left alone.
pub fn try_compress(world: &mut SparseOctreeWorld, index: usize) -> bool {
    let node = world.nodes[index];
    if is_leaf(&node) || node.children.iter().any(|&c| c == 0) {
        return false;
    }

    let first = world.nodes[node.children[0] as usize];
    let identical = node.children.iter().all(|&c| {
        let child = &world.nodes[c as usize];
        is_leaf(child) && child.material == first.material && child.color == first.color
    });
    if !identical {
        return false;
    }

    for &child in &node.children {
        release_subtree(world, child);
    }

    let node = &mut world.nodes[index];
    node.children = [0; 8];
    node.material = first.material;
    node.color = first.color;
    node.flags = NODE_LEAF | NODE_UNIFORM;
    true
}

fn compress_pass(world: &mut SparseOctreeWorld, index: usize) -> usize {
    let node = world.nodes[index];
    if is_leaf(&node) {
        return 0;
    }

    let mut compressed = 0;
    for &child in &node.children {
        if child != 0 {
            compressed += compress_pass(world, child as usize);
        }
    }
    if try_compress(world, index) {
        compressed += 1;
    }
    compressed
}

/// Compress bottom-up until a full pass changes nothing.
/// Returns the number of nodes collapsed.
pub fn compress_tree(world: &mut SparseOctreeWorld) -> usize {
    let mut total = 0;
    let mut passes = 0;

    loop {
        let compressed = compress_pass(world, ROOT_NODE as usize);
        passes += 1;
        total += compressed;
        if compressed == 0 {
            break;
        }
    }

    log::debug!(
        "[SparseOctree::compress_tree] Collapsed {} nodes in {} passes, {} nodes remain",
        total,
        passes,
        node_count(world)
    );
    total
}

/// Write a voxel, subdividing uniform regions on the way down.
///
/// Air writes are ignored: empty space is implicit. Coordinates outside the
/// world extent are ignored as well.
pub fn set_voxel(world: &mut SparseOctreeWorld, x: i32, y: i32, z: i32, voxel: Voxel) {
    if !voxel.is_solid() {
        log::trace!(
            "[SparseOctree::set_voxel] Ignoring air write at ({}, {}, {})",
            x,
            y,
            z
        );
        return;
    }
    if !world.extent.contains(x, y, z) {
        log::trace!(
            "[SparseOctree::set_voxel] Ignoring write outside extent at ({}, {}, {})",
            x,
            y,
            z
        );
        return;
    }

    let (x, y, z) = (x as u32, y as u32, z as u32);
    let mut current = ROOT_NODE as usize;
    let mut depth = 0;

    loop {
        let node = world.nodes[current];

        if is_leaf(&node) {
            if node.material == voxel.material.0 && node.color == voxel.color {
                return;
            }
            if node.size <= 1 || depth >= world.max_depth {
                let target = &mut world.nodes[current];
                target.material = voxel.material.0;
                target.color = voxel.color;
                target.flags = NODE_LEAF;
                return;
            }
            let split = subdivide(world, current);
            debug_assert!(split, "leaf of size {} did not split", node.size);
        }

        let half = node.size / 2;
        let octant = child_index(node.min, half, x, y, z);

        let mut child = world.nodes[current].children[octant];
        if child == 0 {
            let parent = world.nodes[current];
            child = allocate_node(world, template_child(&parent, octant));
            world.nodes[current].children[octant] = child;
        }

        current = child as usize;
        depth += 1;
    }
}

/// Get voxel at position, air if out of bounds.
///
/// Descent stops at the first leaf. A missing child, or running out of
/// depth, yields the last node reached.
pub fn get_voxel(world: &SparseOctreeWorld, x: i32, y: i32, z: i32) -> Voxel {
    if !world.extent.contains(x, y, z) {
        return Voxel::air();
    }

    let (x, y, z) = (x as u32, y as u32, z as u32);
    let mut current = ROOT_NODE as usize;
    let mut depth = 0;

    loop {
        let node = &world.nodes[current];
        if is_leaf(node) || depth >= world.max_depth {
            return node_voxel(node);
        }

        let octant = child_index(node.min, node.size / 2, x, y, z);
        let child = node.children[octant];
        if child == 0 {
            return node_voxel(node);
        }

        current = child as usize;
        depth += 1;
    }
}

pub fn is_solid(world: &SparseOctreeWorld, x: i32, y: i32, z: i32) -> bool {
    get_voxel(world, x, y, z).is_solid()
}

pub fn get_normal(world: &SparseOctreeWorld, x: i32, y: i32, z: i32) -> Vector3<f32> {
    estimate_face_normal(&world.extent, x, y, z, |nx, ny, nz| {
        is_solid(world, nx, ny, nz)
    })
}

/// Nodes reachable from the root
pub fn node_count(world: &SparseOctreeWorld) -> u32 {
    let mut count = 0;
    let mut stack = vec![ROOT_NODE];
    while let Some(index) = stack.pop() {
        let node = &world.nodes[index as usize];
        count += 1;
        if !is_leaf(node) {
            stack.extend(node.children.iter().copied().filter(|&c| c != 0));
        }
    }
    count
}

/// Leaves reachable from the root
pub fn leaf_count(world: &SparseOctreeWorld) -> u32 {
    let mut count = 0;
    let mut stack = vec![ROOT_NODE];
    while let Some(index) = stack.pop() {
        let node = &world.nodes[index as usize];
        if is_leaf(node) {
            count += 1;
        } else {
            stack.extend(node.children.iter().copied().filter(|&c| c != 0));
        }
    }
    count
}

pub fn memory_usage(world: &SparseOctreeWorld) -> usize {
    node_count(world) as usize * std::mem::size_of::<OctreeNode>()
        + std::mem::size_of::<SparseOctreeWorld>()
}

/// Get octree statistics
pub fn get_stats(world: &SparseOctreeWorld) -> OctreeStats {
    OctreeStats {
        node_count: node_count(world),
        leaf_count: leaf_count(world),
        max_depth: world.max_depth,
        root_size: world.root_size,
        memory_bytes: memory_usage(world),
    }
}

/// Dimensions, node/leaf counts and node savings against one node per cell
pub fn describe(world: &SparseOctreeWorld) -> String {
    let nodes = node_count(world);
    let leaves = leaf_count(world);
    let compression = 100.0 * (1.0 - nodes as f64 / world.extent.cell_count() as f64);

    format!(
        "Octree ({}x{}x{}), Nodes: {}, Leaves: {}, Compression: {:.1}%",
        world.extent.x, world.extent.y, world.extent.z, nodes, leaves, compression
    )
}

/// Walk the tree and report structural problems. Empty when healthy.
pub fn validate(world: &SparseOctreeWorld) -> Vec<String> {
    let mut problems = Vec::new();
    let mut visited = vec![false; world.nodes.len()];
    let mut stack = vec![ROOT_NODE];

    let root = &world.nodes[ROOT_NODE as usize];
    if root.min != [0; 3] || root.size != world.root_size {
        problems.push(format!(
            "root covers {:?} size {} instead of the origin size {}",
            root.min, root.size, world.root_size
        ));
    }

    while let Some(index) = stack.pop() {
        if visited[index as usize] {
            problems.push(format!("node {} is reachable more than once", index));
            continue;
        }
        visited[index as usize] = true;

        let node = world.nodes[index as usize];
        let present = node.children.iter().filter(|&&c| c != 0).count();

        if is_leaf(&node) {
            if present > 0 {
                problems.push(format!("leaf {} has {} children", index, present));
            }
            continue;
        }

        if node.size <= 1 {
            problems.push(format!("internal node {} is a single cell", index));
            continue;
        }

        let half = node.size / 2;
        for (octant, &child) in node.children.iter().enumerate() {
            if child == 0 {
                problems.push(format!("internal node {} is missing octant {}", index, octant));
                continue;
            }
            let Some(child_node) = world.nodes.get(child as usize) else {
                problems.push(format!("node {} points past the arena at {}", index, child));
                continue;
            };
            let expected = child_min(node.min, half, octant);
            if child_node.min != expected || child_node.size != half {
                problems.push(format!(
                    "child {} of node {} covers {:?} size {}, expected {:?} size {}",
                    child, index, child_node.min, child_node.size, expected, half
                ));
            }
            stack.push(child);
        }
    }

    if !problems.is_empty() {
        log::warn!(
            "[SparseOctree::validate] {} structural problems found",
            problems.len()
        );
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;

    fn octree(x: u32, y: u32, z: u32) -> SparseOctreeWorld {
        create_sparse_octree(WorldExtent::new(x, y, z).unwrap(), ChildOrder::default())
    }

    fn solid(material: u32, color: u32) -> Voxel {
        Voxel::new(MaterialId(material), color)
    }

    #[test]
    fn test_root_size_is_power_of_two() {
        let tree = octree(5, 3, 2);
        assert_eq!(tree.root_size, 8);
        assert_eq!(tree.max_depth, 3);

        let tree = octree(1, 1, 1);
        assert_eq!(tree.root_size, 1);
        assert_eq!(tree.max_depth, 0);
    }

    #[test]
    fn test_set_get_roundtrip() {
        let mut tree = octree(8, 8, 8);
        set_voxel(&mut tree, 1, 2, 3, solid(3, 0xFF80_8080));
        set_voxel(&mut tree, 7, 7, 7, solid(4, 0xFF00_00FF));

        assert_eq!(get_voxel(&tree, 1, 2, 3), solid(3, 0xFF80_8080));
        assert_eq!(get_voxel(&tree, 7, 7, 7), solid(4, 0xFF00_00FF));
        assert_eq!(get_voxel(&tree, 0, 0, 0), Voxel::air());
        assert!(validate(&tree).is_empty());
    }

    #[test]
    fn test_single_cell_world() {
        let mut tree = octree(1, 1, 1);
        set_voxel(&mut tree, 0, 0, 0, solid(2, 0xFF11_1111));
        assert_eq!(get_voxel(&tree, 0, 0, 0).material, MaterialId(2));
        assert_eq!(node_count(&tree), 1);
    }

    #[test]
    fn test_air_and_out_of_range_writes_are_ignored() {
        let mut tree = octree(4, 4, 4);
        set_voxel(&mut tree, 1, 1, 1, solid(1, 0xFF00_FF00));
        set_voxel(&mut tree, 1, 1, 1, Voxel::air());
        set_voxel(&mut tree, 4, 0, 0, solid(1, 0xFF00_FF00));
        set_voxel(&mut tree, -1, 0, 0, solid(1, 0xFF00_FF00));

        assert!(is_solid(&tree, 1, 1, 1));
        assert_eq!(get_voxel(&tree, 4, 0, 0), Voxel::air());
    }

    #[test]
    fn test_overwrite_with_new_material() {
        let mut tree = octree(4, 4, 4);
        set_voxel(&mut tree, 2, 2, 2, solid(1, 0xFF00_FF00));
        set_voxel(&mut tree, 2, 2, 2, solid(3, 0xFF80_8080));
        assert_eq!(get_voxel(&tree, 2, 2, 2), solid(3, 0xFF80_8080));
    }

    #[test]
    fn test_matching_write_does_not_subdivide() {
        let mut tree = octree(4, 4, 4);
        tree.nodes[0].material = 3;
        tree.nodes[0].color = 0xFF80_8080;

        set_voxel(&mut tree, 1, 1, 1, solid(3, 0xFF80_8080));
        assert_eq!(node_count(&tree), 1);
    }

    #[test]
    fn test_subdivide_preserves_content() {
        let mut tree = octree(4, 4, 4);
        tree.nodes[0].material = 2;
        tree.nodes[0].color = 0xFF55_3311;

        assert!(subdivide(&mut tree, 0));
        assert!(!is_leaf(&tree.nodes[0]));
        for x in 0..4 {
            for z in 0..4 {
                assert_eq!(get_voxel(&tree, x, 3, z), solid(2, 0xFF55_3311));
            }
        }
        // Internal nodes cannot be subdivided again
        assert!(!subdivide(&mut tree, 0));
        assert!(validate(&tree).is_empty());
    }

    #[test]
    fn test_try_compress_refuses_mixed_children() {
        let mut tree = octree(2, 2, 2);
        set_voxel(&mut tree, 0, 0, 0, solid(5, 0xFF00_0005));
        assert!(!try_compress(&mut tree, 0));
        assert_eq!(node_count(&tree), 9);
    }

    #[test]
    fn test_try_compress_refuses_missing_child() {
        let mut tree = octree(2, 2, 2);
        subdivide(&mut tree, 0);
        let removed = tree.nodes[0].children[3];
        release_subtree(&mut tree, removed);
        tree.nodes[0].children[3] = 0;

        assert!(!try_compress(&mut tree, 0));
        assert!(!validate(&tree).is_empty());
    }

    #[test]
    fn test_uniform_block_compresses_to_single_leaf() {
        let mut tree = octree(2, 2, 2);
        for x in 0..2 {
            for y in 0..2 {
                for z in 0..2 {
                    set_voxel(&mut tree, x, y, z, solid(5, 0xFF00_0005));
                }
            }
        }
        assert_eq!(node_count(&tree), 9);

        assert_eq!(compress_tree(&mut tree), 1);
        assert_eq!(node_count(&tree), 1);
        assert!(is_uniform(&tree.nodes[0]));
        assert_eq!(get_voxel(&tree, 1, 1, 1), solid(5, 0xFF00_0005));
    }

    #[test]
    fn test_compress_is_idempotent() {
        let mut tree = octree(8, 8, 8);
        for x in 0..8 {
            for z in 0..8 {
                for y in 0..4 {
                    set_voxel(&mut tree, x, y, z, solid(3, 0xFF80_8080));
                }
            }
        }
        set_voxel(&mut tree, 5, 6, 1, solid(1, 0xFF00_FF00));

        let before: Vec<Voxel> = (0..512)
            .map(|i| get_voxel(&tree, i % 8, (i / 8) % 8, i / 64))
            .collect();

        assert!(compress_tree(&mut tree) > 0);
        let nodes_after_first = node_count(&tree);
        assert_eq!(compress_tree(&mut tree), 0);
        assert_eq!(node_count(&tree), nodes_after_first);

        let after: Vec<Voxel> = (0..512)
            .map(|i| get_voxel(&tree, i % 8, (i / 8) % 8, i / 64))
            .collect();
        assert_eq!(before, after);
        assert!(validate(&tree).is_empty());
    }

    #[test]
    fn test_free_list_reuses_slots() {
        let mut tree = octree(2, 2, 2);
        let fill = |tree: &mut SparseOctreeWorld, material| {
            for i in 0..8 {
                set_voxel(
                    tree,
                    i & 1,
                    (i >> 1) & 1,
                    i >> 2,
                    solid(material, 0xFF00_0000 | material),
                );
            }
        };

        fill(&mut tree, 1);
        compress_tree(&mut tree);
        let arena_len = tree.nodes.len();
        assert_eq!(tree.free_nodes.len(), 8);

        set_voxel(&mut tree, 0, 0, 0, solid(2, 0xFF00_0002));
        assert_eq!(tree.nodes.len(), arena_len);
        assert!(tree.free_nodes.is_empty());
    }

    #[test]
    fn test_validate_reports_bad_geometry() {
        let mut tree = octree(4, 4, 4);
        subdivide(&mut tree, 0);
        let child = tree.nodes[0].children[7] as usize;
        tree.nodes[child].size = 1;

        let problems = validate(&tree);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("expected"));
    }

    #[test]
    fn test_stats_and_describe() {
        let mut tree = octree(2, 2, 2);
        set_voxel(&mut tree, 0, 0, 0, solid(1, 0xFF00_FF00));

        let stats = get_stats(&tree);
        assert_eq!(stats.node_count, 9);
        assert_eq!(stats.leaf_count, 8);
        assert_eq!(stats.root_size, 2);
        assert_eq!(
            stats.memory_bytes,
            9 * std::mem::size_of::<OctreeNode>() + std::mem::size_of::<SparseOctreeWorld>()
        );
        assert!(describe(&tree).starts_with("Octree (2x2x2), Nodes: 9, Leaves: 8"));
    }
}
