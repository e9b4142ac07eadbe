//! `.spf` spec file envelope.
//!
//! A spec is stored as a fixed header, a JSON payload, and a SHA-256 digest
//! of everything before it.
//!
//! Layout:
//!   [magic: 4 bytes "SPF\0"] [version_major: 1] [version_minor: 1]
//!   [flags: 1] [reserved: 1] [story_count: u32 LE] [version_count: u32 LE]
//!   [payload_length: u32 LE] [json_payload: N bytes] [sha256: 32 bytes]

use sha2::{Digest, Sha256};

use crate::error::LifecycleError;
use crate::spec::Spec;

const SPF_MAGIC: [u8; 4] = *b"SPF\0";

const VERSION_MAJOR: u8 = 0;
const VERSION_MINOR: u8 = 1;

/// Header size (magic + version + flags + reserved + counts + payload_len).
const HEADER_SIZE: usize = 4 + 1 + 1 + 1 + 1 + 4 + 4 + 4;

const HASH_SIZE: usize = 32;

/// A spec wrapped for storage.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecFile {
    pub spec: Spec,
}

impl SpecFile {
    pub fn new(spec: Spec) -> Self {
        Self { spec }
    }

    pub fn into_spec(self) -> Spec {
        self.spec
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, LifecycleError> {
        let json = serde_json::to_vec(&self.spec)
            .map_err(|e| LifecycleError::Serialization(e.to_string()))?;

        let story_count = count_u32(self.spec.user_stories().len())?;
        let version_count = count_u32(self.spec.versions().len())?;
        let payload_len = count_u32(json.len())?;

        let mut buf = Vec::with_capacity(HEADER_SIZE + json.len() + HASH_SIZE);
        buf.extend_from_slice(&SPF_MAGIC);
        buf.push(VERSION_MAJOR);
        buf.push(VERSION_MINOR);
        // flags, reserved
        buf.push(0);
        buf.push(0);
        buf.extend_from_slice(&story_count.to_le_bytes());
        buf.extend_from_slice(&version_count.to_le_bytes());
        buf.extend_from_slice(&payload_len.to_le_bytes());
        buf.extend_from_slice(&json);

        let digest = Sha256::digest(&buf);
        buf.extend_from_slice(&digest);
        Ok(buf)
    }

    /// Parse and check a stored spec.
    ///
    /// Beyond the envelope checks, the decoded spec must pass
    /// [`Spec::validate`], so a file with a broken history never loads.
    pub fn from_bytes(data: &[u8]) -> Result<Self, LifecycleError> {
        if data.len() < HEADER_SIZE + HASH_SIZE {
            return Err(LifecycleError::TooShort {
                expected: HEADER_SIZE + HASH_SIZE,
                actual: data.len(),
            });
        }
        if data[0..4] != SPF_MAGIC {
            return Err(LifecycleError::InvalidMagic);
        }
        let (major, minor) = (data[4], data[5]);
        if major != VERSION_MAJOR {
            return Err(LifecycleError::UnsupportedVersion { major, minor });
        }

        let story_count = read_u32(data, 8);
        let version_count = read_u32(data, 12);
        let payload_len = read_u32(data, 16) as usize;

        let payload_end = HEADER_SIZE + payload_len;
        if data.len() < payload_end + HASH_SIZE {
            return Err(LifecycleError::TooShort {
                expected: payload_end + HASH_SIZE,
                actual: data.len(),
            });
        }

        let stored = &data[payload_end..payload_end + HASH_SIZE];
        let computed = Sha256::digest(&data[..payload_end]);
        if computed.as_slice() != stored {
            return Err(LifecycleError::IntegrityFailed {
                expected: hex_encode(stored),
                actual: hex_encode(computed.as_slice()),
            });
        }

        let spec: Spec = serde_json::from_slice(&data[HEADER_SIZE..payload_end])
            .map_err(|e| LifecycleError::Deserialization(e.to_string()))?;

        if spec.user_stories().len() != story_count as usize {
            return Err(LifecycleError::Deserialization(format!(
                "story count mismatch: header says {story_count}, payload has {}",
                spec.user_stories().len()
            )));
        }
        if spec.versions().len() != version_count as usize {
            return Err(LifecycleError::Deserialization(format!(
                "version count mismatch: header says {version_count}, payload has {}",
                spec.versions().len()
            )));
        }
        spec.validate()?;

        Ok(Self { spec })
    }
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

fn count_u32(n: usize) -> Result<u32, LifecycleError> {
    u32::try_from(n).map_err(|_| LifecycleError::Serialization(format!("count {n} exceeds u32")))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
