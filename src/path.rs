//! Address-Path Builder (C6): pure functions turning an account/purpose/
//! index triple or an identity URI into the `AddressN` list a `GetAddress`
//! or `SignIdentity` request carries.

use sha2::{Digest, Sha256};

const HARDENED: u32 = 0x8000_0000;

/// An ordered BIP-32 derivation path. Each level's top bit is set iff
/// that level is hardened.
pub type AddressN = Vec<u32>;

fn harden(index: u32) -> u32 {
    index | HARDENED
}

/// The key purpose an address is being derived for, which selects the
/// BIP-44 change level (`p` in `forBip44`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    ReceiveFunds,
    Refund,
    Change,
    Authentication,
}

impl Purpose {
    fn change_level(self) -> u32 {
        match self {
            Purpose::ReceiveFunds | Purpose::Refund => 0,
            Purpose::Change | Purpose::Authentication => 1,
        }
    }
}

/// `m / 44' / 0' / account' / p / index`, `p` chosen by `purpose`. The
/// leaf levels are left unhardened.
pub fn for_bip44(account: u32, purpose: Purpose, index: u32) -> AddressN {
    vec![harden(44), harden(0), harden(account), purpose.change_level(), index]
}

/// Forwards an already-built path unchanged; hardened bits, if any,
/// are the caller's responsibility.
pub fn from_deterministic_path(path: &[u32]) -> AddressN {
    path.to_vec()
}

/// SLIP-0013 identity-key path: `[13', A', B', C', D']` where `A..D`
/// are the first four big-endian u32 words of the first 16 bytes of
/// `SHA-256(LE32(index) || uri)`.
///
/// The SLIP specifies 128 bits (16 bytes) of hash output; some source
/// implementations allocate a 32-byte buffer and then silently feed it
/// through, reading 8 words instead of 4. That is a bug, not a variant
/// to preserve — this reads exactly 16 bytes.
pub fn for_identity(uri: &str, index: u32) -> AddressN {
    let mut hasher = Sha256::new();
    hasher.update(index.to_le_bytes());
    hasher.update(uri.as_bytes());
    let digest = hasher.finalize();

    let mut words = [0u32; 4];
    for (word, chunk) in words.iter_mut().zip(digest[0..16].chunks_exact(4)) {
        *word = u32::from_be_bytes(chunk.try_into().unwrap());
    }

    vec![
        harden(13),
        harden(words[0]),
        harden(words[1]),
        harden(words[2]),
        harden(words[3]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bip44_receive_is_unhardened_change_zero() {
        let p = for_bip44(0, Purpose::ReceiveFunds, 5);
        assert_eq!(p, vec![harden(44), harden(0), harden(0), 0, 5]);
    }

    #[test]
    fn bip44_change_level_is_one() {
        let p = for_bip44(2, Purpose::Change, 7);
        assert_eq!(p, vec![harden(44), harden(0), harden(2), 1, 7]);
        let p = for_bip44(2, Purpose::Authentication, 7);
        assert_eq!(p[3], 1);
    }

    #[test]
    fn deterministic_path_passes_through() {
        let path = vec![harden(44), harden(0), harden(0)];
        assert_eq!(from_deterministic_path(&path), path);
    }

    #[test]
    fn slip13_vector_reads_exactly_sixteen_bytes() {
        let path = for_identity("https://satoshi@bitcoin.org/login", 0);
        assert_eq!(path.len(), 5);
        assert_eq!(path[0], harden(13));

        let mut hasher = Sha256::new();
        hasher.update(0u32.to_le_bytes());
        hasher.update(b"https://satoshi@bitcoin.org/login");
        let digest = hasher.finalize();
        let expected: Vec<u32> = digest[0..16]
            .chunks_exact(4)
            .map(|c| harden(u32::from_be_bytes(c.try_into().unwrap())))
            .collect();
        assert_eq!(&path[1..], expected.as_slice());
    }

    #[test]
    fn slip13_differs_by_index() {
        let a = for_identity("https://example.com", 0);
        let b = for_identity("https://example.com", 1);
        assert_ne!(a, b);
    }
}
