//! Binary checkpoint format for scan state.
//!
//! Format:
//! - Header (32 bytes):
//!   - Magic: "PFS1" (4 bytes)
//!   - Version: u32 LE (4 bytes)
//!   - Record length: u64 LE (8 bytes)
//!   - Checksum: u64 LE xxhash of the record (8 bytes)
//!   - Reserved: 8 bytes (zeros)
//! - Record (32 bytes), each field u64 LE:
//!   - First index of the range
//!   - End of the range (exclusive)
//!   - Next index to process
//!   - Reachable permutations counted so far

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use xxhash_rust::xxh64::xxh64;

const MAGIC: &[u8; 4] = b"PFS1";
const VERSION: u32 = 1;
const HEADER_SIZE: usize = 32;
const RECORD_SIZE: usize = 32;

/// Progress of a scan over `[start, end)`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ScanState {
    pub start: u64,
    pub end: u64,
    pub next: u64,
    pub reachable: u64,
}

impl ScanState {
    pub fn new(start: u64, end: u64) -> ScanState {
        ScanState {
            start,
            end,
            next: start,
            reachable: 0,
        }
    }

    /// Permutations processed so far.
    #[inline]
    pub fn processed(&self) -> u64 {
        self.next - self.start
    }

    #[inline]
    pub fn total(&self) -> u64 {
        self.end - self.start
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.next >= self.end
    }

    fn to_bytes(self) -> [u8; RECORD_SIZE] {
        let mut data = [0u8; RECORD_SIZE];
        for (chunk, value) in data
            .chunks_exact_mut(8)
            .zip([self.start, self.end, self.next, self.reachable])
        {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        data
    }

    fn from_bytes(data: &[u8; RECORD_SIZE]) -> ScanState {
        let mut values = [0u64; 4];
        for (value, chunk) in values.iter_mut().zip(data.chunks_exact(8)) {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            *value = u64::from_le_bytes(bytes);
        }
        let [start, end, next, reachable] = values;
        ScanState {
            start,
            end,
            next,
            reachable,
        }
    }
}

fn invalid(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

pub struct Checkpoint;

impl Checkpoint {
    /// Save scan state. Writes to a temporary file first and renames it over
    /// `path`, so an interrupted save leaves the previous checkpoint intact.
    pub fn save(path: &Path, state: &ScanState) -> io::Result<()> {
        let data = state.to_bytes();
        let checksum = xxh64(&data, 0);

        let tmp_path = path.with_extension("tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);

            // Header
            writer.write_all(MAGIC)?;
            writer.write_all(&VERSION.to_le_bytes())?;
            writer.write_all(&(RECORD_SIZE as u64).to_le_bytes())?;
            writer.write_all(&checksum.to_le_bytes())?;
            writer.write_all(&[0u8; 8])?; // Reserved

            writer.write_all(&data)?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, path)
    }

    /// Load scan state from a checkpoint file.
    pub fn load(path: &Path) -> io::Result<ScanState> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header)?;

        if &header[0..4] != MAGIC {
            return Err(invalid("Invalid checkpoint magic".to_string()));
        }

        let mut word = [0u8; 8];
        let version = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        if version != VERSION {
            return Err(invalid(format!("Unsupported checkpoint version: {}", version)));
        }
        word.copy_from_slice(&header[8..16]);
        let length = u64::from_le_bytes(word);
        if length != RECORD_SIZE as u64 {
            return Err(invalid(format!("Unexpected record length: {}", length)));
        }
        word.copy_from_slice(&header[16..24]);
        let stored_checksum = u64::from_le_bytes(word);

        let mut data = [0u8; RECORD_SIZE];
        reader.read_exact(&mut data)?;

        if xxh64(&data, 0) != stored_checksum {
            return Err(invalid("Checkpoint checksum mismatch".to_string()));
        }

        let state = ScanState::from_bytes(&data);
        if state.start > state.next || state.next > state.end || state.reachable > state.processed() {
            return Err(invalid(format!("Inconsistent checkpoint: {:?}", state)));
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("pushfight_{}_{}.bin", name, std::process::id()))
    }

    #[test]
    fn test_checkpoint_roundtrip() {
        let path = temp_path("roundtrip");
        let state = ScanState {
            start: 1000,
            end: 401_567_166_000,
            next: 123_456_789,
            reachable: 99_999_999,
        };

        Checkpoint::save(&path, &state).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), (HEADER_SIZE + RECORD_SIZE) as u64);
        assert_eq!(Checkpoint::load(&path).unwrap(), state);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_checkpoint_detects_corruption() {
        let path = temp_path("corrupt");
        Checkpoint::save(&path, &ScanState::new(0, 10)).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        bytes[HEADER_SIZE + 3] ^= 0xff;
        fs::write(&path, &bytes).unwrap();
        let err = Checkpoint::load(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        bytes[0] = b'X';
        fs::write(&path, &bytes).unwrap();
        assert!(Checkpoint::load(&path).is_err());

        fs::write(&path, &bytes[..HEADER_SIZE + 4]).unwrap();
        assert!(Checkpoint::load(&path).is_err());

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_state_progress() {
        let mut state = ScanState::new(10, 20);
        assert_eq!(state.processed(), 0);
        assert_eq!(state.total(), 10);
        assert!(!state.is_complete());
        state.next = 20;
        assert_eq!(state.processed(), 10);
        assert!(state.is_complete());
    }
}
