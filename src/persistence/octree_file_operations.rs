//! Octree File Operations
//!
//! Binary transfer of a packed octree: header word, node count word, then
//! the node words, all native endian. No magic number or version field, so
//! the reader trusts the producer. A short read fails the whole load.

use super::packed_octree_data::{PackedOctree, SparseVoxelOctreeHeader};
use super::{PersistenceError, PersistenceResult};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const STREAM: &str = "<stream>";

fn io_error(path: &str) -> impl FnOnce(std::io::Error) -> PersistenceError + '_ {
    move |source| PersistenceError::Io {
        path: path.to_string(),
        source,
    }
}

fn write_to<W: Write>(writer: &mut W, packed: &PackedOctree, path: &str) -> PersistenceResult<()> {
    let count = u32::try_from(packed.data.len()).map_err(|_| PersistenceError::Io {
        path: path.to_string(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} words do not fit a u32 count", packed.data.len()),
        ),
    })?;

    writer
        .write_all(bytemuck::bytes_of(&packed.header))
        .map_err(io_error(path))?;
    writer
        .write_all(&count.to_ne_bytes())
        .map_err(io_error(path))?;
    writer
        .write_all(bytemuck::cast_slice(&packed.data))
        .map_err(io_error(path))?;
    writer.flush().map_err(io_error(path))
}

fn read_from<R: Read>(reader: &mut R, path: &str) -> PersistenceResult<PackedOctree> {
    let mut header = SparseVoxelOctreeHeader::default();
    reader
        .read_exact(bytemuck::bytes_of_mut(&mut header))
        .map_err(io_error(path))?;

    let mut count_bytes = [0u8; 4];
    reader
        .read_exact(&mut count_bytes)
        .map_err(io_error(path))?;
    let count = u32::from_ne_bytes(count_bytes) as usize;

    // Read through `take` so a lying count cannot force a huge allocation
    let byte_len = count as u64 * 4;
    let mut bytes = Vec::new();
    reader
        .take(byte_len)
        .read_to_end(&mut bytes)
        .map_err(io_error(path))?;
    if (bytes.len() as u64) < byte_len {
        return Err(PersistenceError::Truncated {
            needed: count,
            available: bytes.len() / 4,
        });
    }

    let data = bytes
        .chunks_exact(4)
        .map(|word| u32::from_ne_bytes([word[0], word[1], word[2], word[3]]))
        .collect();

    Ok(PackedOctree { header, data })
}

/// Write a packed octree to any byte sink
pub fn write_voxel_octree<W: Write>(
    writer: &mut W,
    packed: &PackedOctree,
) -> PersistenceResult<()> {
    write_to(writer, packed, STREAM)
}

/// Read a packed octree from any byte source
pub fn read_voxel_octree<R: Read>(reader: &mut R) -> PersistenceResult<PackedOctree> {
    read_from(reader, STREAM)
}

pub fn save_voxel_octree(packed: &PackedOctree, path: impl AsRef<Path>) -> PersistenceResult<()> {
    let path_str = path.as_ref().display().to_string();
    let file = File::create(path.as_ref()).map_err(io_error(&path_str))?;
    let mut writer = BufWriter::new(file);
    write_to(&mut writer, packed, &path_str)?;

    log::debug!(
        "[OctreeFile::save] Wrote {} words to {}",
        packed.data.len(),
        path_str
    );
    Ok(())
}

pub fn load_voxel_octree(path: impl AsRef<Path>) -> PersistenceResult<PackedOctree> {
    let path_str = path.as_ref().display().to_string();
    let file = File::open(path.as_ref()).map_err(io_error(&path_str))?;
    let mut reader = BufReader::new(file);
    let packed = read_from(&mut reader, &path_str)?;

    log::debug!(
        "[OctreeFile::load] Read {} words from {}",
        packed.data.len(),
        path_str
    );
    Ok(packed)
}
