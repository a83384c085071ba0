use crate::{LinkId, PublicKey, VoteChoice};
use sha2::{Digest, Sha256};

/// The 32-byte vote commitment hash.
pub type VoteHash = [u8; 32];

/// Compute the vote commitment:
/// `SHA-256(validator ‖ link id (le u64) ‖ choice byte ‖ nonce (le u64))`.
///
/// Reveal recomputes this from the disclosed (choice, nonce) and requires
/// exact equality with the stored hash.
pub fn compute_vote_hash(
    validator: &PublicKey,
    link: LinkId,
    choice: VoteChoice,
    nonce: u64,
) -> VoteHash {
    let mut hasher = Sha256::new();
    hasher.update(validator.as_bytes());
    hasher.update(link.to_le_bytes());
    hasher.update([choice.as_byte()]);
    hasher.update(nonce.to_le_bytes());
    hasher.finalize().into()
}
