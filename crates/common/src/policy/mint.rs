//! Minting of shareable identifiers.

use rand::Rng;

/// URL-safe 64-symbol alphabet.
const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Length of a minted identifier. Eight symbols over a 64-symbol alphabet
/// gives 64^8 possible ids; collisions are treated as negligible and no
/// retry loop is layered on top.
pub const ID_LEN: usize = 8;

/// Mint a short opaque identifier for a new policy document.
pub fn mint_id() -> String {
    let mut rng = rand::rng();
    (0..ID_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_mint_shape() {
        let id = mint_id();
        assert_eq!(id.len(), ID_LEN);
        assert!(id.bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn test_mint_does_not_repeat_in_practice() {
        let ids: HashSet<String> = (0..1000).map(|_| mint_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
