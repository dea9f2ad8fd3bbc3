//! The baked potentially visible set.
//!
//! | Field Size      | Data Type | Content                              |
//! |-----------------|-----------|--------------------------------------|
//! |  0x00-0x03      |    i32    | Number of vectors (clusters)         |
//! |  0x04-0x07      |    i32    | Size of each vector in bytes         |
//! |  0x08-...       |  u8 array | `count * stride` bytes of bit rows   |
//!
//! Row `a` bit `b` set means cluster `b` may be visible from cluster `a`.

use crate::error::LoadError;
use crate::lumps::read_i32;
use crate::reader::LumpIndex;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibilityTable {
    count: usize,
    stride: usize,
    bits: Vec<u8>,
}

impl VisibilityTable {
    /// Build a table directly, `bits` must hold `count * stride` bytes
    pub fn new(count: usize, stride: usize, bits: Vec<u8>) -> Self {
        debug_assert_eq!(bits.len(), count * stride);
        Self {
            count,
            stride,
            bits,
        }
    }

    /// A table for `count` clusters where nothing sees anything yet
    pub fn with_clusters(count: usize) -> Self {
        let stride = count.div_ceil(8);
        Self::new(count, stride, vec![0; count * stride])
    }

    /// Decode the lump. An empty lump is valid and means no PVS was baked.
    pub fn from_lump_bytes(data: &[u8]) -> Result<Self, LoadError> {
        if data.is_empty() {
            return Ok(Self::default());
        }

        let corrupt = |reason: String| LoadError::CorruptLump {
            lump: LumpIndex::Visibility,
            reason,
        };

        if data.len() < 8 {
            return Err(corrupt(format!("{} bytes is too short for the prefix", data.len())));
        }

        let count = read_i32(data, 0);
        let stride = read_i32(data, 4);
        if count < 0 || stride < 0 {
            return Err(corrupt(format!("negative size {}x{}", count, stride)));
        }

        let (count, stride) = (count as usize, stride as usize);
        if stride * 8 < count {
            return Err(corrupt(format!(
                "{} byte rows cannot hold {} clusters",
                stride, count
            )));
        }

        let size = count * stride;
        if data.len() - 8 < size {
            return Err(corrupt(format!(
                "{}x{} bit matrix does not fit in {} bytes",
                count,
                stride,
                data.len() - 8
            )));
        }

        Ok(Self::new(count, stride, data[8..8 + size].to_vec()))
    }

    pub fn write_le_bytes(&self, out: &mut Vec<u8>) {
        if self.is_empty() {
            return;
        }
        out.extend_from_slice(&(self.count as i32).to_le_bytes());
        out.extend_from_slice(&(self.stride as i32).to_le_bytes());
        out.extend_from_slice(&self.bits);
    }

    /// True when the file carried no visibility data at all
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn cluster_count(&self) -> usize {
        self.count
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Can anything in `test` be seen from `from`? A negative cluster on either
    /// side is the always-visible sentinel, and without a table everything is
    /// visible.
    #[inline]
    pub fn is_cluster_visible(&self, from: i32, test: i32) -> bool {
        if from < 0 || test < 0 || self.is_empty() {
            return true;
        }
        let (from, test) = (from as usize, test as usize);
        self.bits[from * self.stride + (test >> 3)] & (1 << (test & 7)) != 0
    }

    pub fn set_visible(&mut self, from: usize, to: usize) {
        self.bits[from * self.stride + (to >> 3)] |= 1 << (to & 7);
    }

    /// Mark every cluster as seeing itself, which is what the vis compiler
    /// always emits
    pub fn set_self_visible(&mut self) {
        for c in 0..self.count {
            self.set_visible(c, c);
        }
    }
}
