//! Integration tests for hash crate

#[cfg(test)]
mod tests {
    use modman_hash::*;

    #[test]
    fn test_matches_hex_ignores_case_and_whitespace() {
        let hash = ContentHash::from_data(b"hello world");
        assert!(hash.matches_hex("5EB63BBBE01EEED093CB22BB8F5ACDC3"));
        assert!(hash.matches_hex(" 5eb63bbbe01eeed093cb22bb8f5acdc3\n"));
        assert!(!hash.matches_hex("5eb63bbbe01eeed093cb22bb8f5acdc4"));
    }

    #[test]
    fn test_malformed_hex_never_matches() {
        let hash = ContentHash::from_data(b"payload");
        assert!(!hash.matches_hex(""));
        assert!(!hash.matches_hex("not-hex"));
        assert!(!hash.matches_hex(&hash.to_hex()[..30]));
    }

    #[test]
    fn test_empty_layout_key_is_stable() {
        let empty: [&str; 0] = [];
        assert_eq!(layout_key(&empty), layout_key(&empty));
        assert_eq!(layout_key(&empty), ContentHash::from_data(b""));
    }
}
