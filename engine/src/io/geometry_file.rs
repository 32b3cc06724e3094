//! Binary geometry files
//!
//! Layout: an 8-byte signature, then `version`, `vertex_count` and
//! `index_count` as little-endian `u32`, then the raw vertex array followed
//! by the raw `u32` index array. Vertex and index bytes are the in-memory
//! representation, so files are only portable between little-endian hosts.

use super::error::GeometryFileError;
use crate::graphics::{Geometry, Vertex};

const MAGIC: &[u8; 8] = b"GEOMBIN\0";
const VERSION: u32 = 1;
const HEADER_LEN: usize = MAGIC.len() + 3 * 4;

/// Serialize a geometry's vertex and index data
pub fn encode(geometry: &Geometry) -> Vec<u8> {
    let vertex_bytes: &[u8] = bytemuck::cast_slice(&geometry.vertices);
    let index_bytes: &[u8] = bytemuck::cast_slice(&geometry.indices);

    let mut out = Vec::with_capacity(HEADER_LEN + vertex_bytes.len() + index_bytes.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&(geometry.vertices.len() as u32).to_le_bytes());
    out.extend_from_slice(&(geometry.indices.len() as u32).to_le_bytes());
    out.extend_from_slice(vertex_bytes);
    out.extend_from_slice(index_bytes);
    out
}

/// Rebuild a geometry from file contents
pub fn decode(id: impl Into<String>, bytes: &[u8]) -> Result<Geometry, GeometryFileError> {
    if bytes.len() < HEADER_LEN {
        return Err(GeometryFileError::TooShort);
    }
    if &bytes[..MAGIC.len()] != MAGIC {
        return Err(GeometryFileError::BadMagic);
    }

    let read_u32 = |offset: usize| {
        let mut word = [0u8; 4];
        word.copy_from_slice(&bytes[offset..offset + 4]);
        u32::from_le_bytes(word)
    };
    let version = read_u32(MAGIC.len());
    if version != VERSION {
        return Err(GeometryFileError::UnsupportedVersion(version));
    }
    let vertex_count = read_u32(MAGIC.len() + 4) as usize;
    let index_count = read_u32(MAGIC.len() + 8) as usize;

    let vertex_len = vertex_count * std::mem::size_of::<Vertex>();
    let index_len = index_count * std::mem::size_of::<u32>();
    let expected = HEADER_LEN + vertex_len + index_len;
    if bytes.len() != expected {
        return Err(GeometryFileError::Truncated {
            expected,
            actual: bytes.len(),
        });
    }

    let body = &bytes[HEADER_LEN..];
    // The body is not necessarily aligned for Vertex, so copy instead of casting in place
    let vertices: Vec<Vertex> = bytemuck::pod_collect_to_vec(&body[..vertex_len]);
    let indices: Vec<u32> = bytemuck::pod_collect_to_vec(&body[vertex_len..]);

    Ok(Geometry::new(id, vertices, indices))
}
