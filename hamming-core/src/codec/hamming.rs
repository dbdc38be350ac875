//! Hamming block code over a small self-describing container.
//!
//! Layout: `b"hamming"`, one byte with the number of data bits held by the
//! last block, one byte with the block size in bits, then the blocks packed
//! LSB-first. Bit 0 of every block is unused, parity bits sit at the powers
//! of two and data bits fill the remaining positions in ascending order.

use std::sync::Mutex;

use bitvec::field::BitField;
use bitvec::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::{Codec, CodecResult, HammingLevel};
use crate::error::CodecError;

pub const MAGIC: &[u8; 7] = b"hamming";
pub const HEADER_LEN: usize = 9;

/// Block positions that carry data, in fill order.
const DATA_POSITIONS: [usize; 11] = [3, 5, 6, 7, 9, 10, 11, 12, 13, 14, 15];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub last_block_data_bits: u8,
    pub level: HammingLevel,
}

impl Header {
    pub fn parse(buf: &[u8]) -> CodecResult<Self> {
        if buf.len() < HEADER_LEN {
            return Err(CodecError::TooShort {
                required: HEADER_LEN,
                actual: buf.len(),
            });
        }
        if &buf[..MAGIC.len()] != MAGIC {
            return Err(CodecError::BadMagic);
        }
        let level = HammingLevel::from_block_bits(buf[8]).ok_or(CodecError::UnsupportedBlock(buf[8]))?;
        let last = buf[7];
        if last as usize > level.data_bits() {
            return Err(CodecError::BadTrailer {
                last,
                max: level.data_bits(),
            });
        }
        Ok(Self {
            last_block_data_bits: last,
            level,
        })
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(MAGIC);
        out.push(self.last_block_data_bits);
        out.push(self.level.block_bits() as u8);
    }
}

/// Runs of input/output bytes that hold a whole number of blocks, so groups
/// can be coded independently.
#[derive(Debug, Clone, Copy)]
struct GroupLayout {
    data_bytes: usize,
    coded_bytes: usize,
}

impl GroupLayout {
    fn for_level(level: HammingLevel) -> Self {
        let (k, n) = (level.data_bits(), level.block_bits());
        let data_bits = k * 8 / gcd(k, 8);
        let blocks = data_bits / k;
        Self {
            data_bytes: data_bits / 8,
            coded_bytes: blocks * n / 8,
        }
    }
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 { a } else { gcd(b, a % b) }
}

/// XOR of the indices of all set bits; zero for an intact block.
fn syndrome(block: &BitSlice<u8, Lsb0>) -> usize {
    block.iter_ones().fold(0, |acc, i| acc ^ i)
}

fn check_aligned(payload: &[u8], level: HammingLevel) -> CodecResult<()> {
    let bits = payload.len() * 8;
    let block_bits = level.block_bits();
    if bits % block_bits != 0 {
        return Err(CodecError::Misaligned { bits, block_bits });
    }
    Ok(())
}

fn encode_group(data: &[u8], k: usize, n: usize) -> Vec<u8> {
    let bits = data.view_bits::<Lsb0>();
    let mut coded: BitVec<u8, Lsb0> = BitVec::with_capacity(bits.len().div_ceil(k) * n);
    for chunk in bits.chunks(k) {
        let mut block = bitvec![u8, Lsb0; 0; n];
        for (i, bit) in chunk.iter().by_vals().enumerate() {
            block.set(DATA_POSITIONS[i], bit);
        }
        let parity = syndrome(&block);
        let mut p = 1;
        while p <= parity {
            if p & parity != 0 {
                block.set(p, true);
            }
            p <<= 1;
        }
        coded.extend_from_bitslice(block.as_bitslice());
    }
    // every group is a whole number of bytes for the supported levels
    coded.into_vec()
}

fn decode_group(coded: &[u8], k: usize, n: usize, correct: bool) -> BitVec<u8, Lsb0> {
    let mut out: BitVec<u8, Lsb0> = BitVec::with_capacity(coded.len() * 8 / n * k);
    for block in coded.view_bits::<Lsb0>().chunks(n) {
        let mut block = block.to_bitvec();
        if correct {
            let s = syndrome(&block);
            if s != 0 {
                let flipped = !block[s];
                block.set(s, flipped);
            }
        }
        for &pos in &DATA_POSITIONS[..k] {
            out.push(block[pos]);
        }
    }
    out
}

pub struct HammingCodec {
    level: HammingLevel,
    rng: Mutex<ChaCha8Rng>,
}

impl HammingCodec {
    pub fn new(level: HammingLevel, seed: u64) -> Self {
        Self {
            level,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Seeds the corruptor from OS entropy; the seed is logged so a run can be replayed.
    pub fn from_entropy(level: HammingLevel) -> CodecResult<Self> {
        let seed = entropy_seed()?;
        tracing::debug!(seed, %level, "corruptor seeded from entropy");
        Ok(Self::new(level, seed))
    }

    pub fn level(&self) -> HammingLevel {
        self.level
    }
}

pub fn entropy_seed() -> CodecResult<u64> {
    let mut buf = [0u8; 8];
    getrandom::getrandom(&mut buf).map_err(|e| CodecError::Other(format!("entropy: {e}")))?;
    Ok(u64::from_le_bytes(buf))
}

impl Codec for HammingCodec {
    fn encode(&self, data: &[u8]) -> CodecResult<Vec<u8>> {
        let (k, n) = (self.level.data_bits(), self.level.block_bits());
        let layout = GroupLayout::for_level(self.level);

        let last = match (data.len() * 8) % k {
            0 => k,
            r => r,
        };
        let groups: Vec<Vec<u8>> = data
            .par_chunks(layout.data_bytes)
            .map(|g| encode_group(g, k, n))
            .collect();

        let mut out = Vec::with_capacity(HEADER_LEN + groups.iter().map(Vec::len).sum::<usize>());
        Header {
            last_block_data_bits: last as u8,
            level: self.level,
        }
        .write_to(&mut out);
        for g in groups {
            out.extend_from_slice(&g);
        }
        Ok(out)
    }

    fn corrupt(&self, coded: &[u8]) -> CodecResult<Vec<u8>> {
        let header = Header::parse(coded)?;
        check_aligned(&coded[HEADER_LEN..], header.level)?;

        let mut out = coded.to_vec();
        let mut rng = self.rng.lock().map_err(|_| CodecError::RngPoisoned)?;
        for block in out[HEADER_LEN..]
            .view_bits_mut::<Lsb0>()
            .chunks_mut(header.level.block_bits())
        {
            let i = rng.gen_range(0..block.len());
            let flipped = !block[i];
            block.set(i, flipped);
        }
        Ok(out)
    }

    fn decode(&self, coded: &[u8], correct: bool) -> CodecResult<Vec<u8>> {
        let header = Header::parse(coded)?;
        let level = header.level;
        let (k, n) = (level.data_bits(), level.block_bits());
        let payload = &coded[HEADER_LEN..];
        check_aligned(payload, level)?;

        let blocks = payload.len() * 8 / n;
        if blocks == 0 {
            return Ok(Vec::new());
        }
        let layout = GroupLayout::for_level(level);
        let groups: Vec<BitVec<u8, Lsb0>> = payload
            .par_chunks(layout.coded_bytes)
            .map(|g| decode_group(g, k, n, correct))
            .collect();

        let mut bits: BitVec<u8, Lsb0> = BitVec::with_capacity(blocks * k);
        for g in &groups {
            bits.extend_from_bitslice(g.as_bitslice());
        }
        // drop the padding carried by the last block
        bits.truncate((blocks - 1) * k + header.last_block_data_bits as usize);

        Ok(bits.chunks(8).map(|b| b.load_le::<u8>()).collect())
    }
}
