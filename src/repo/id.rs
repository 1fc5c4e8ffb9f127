//! Identifier minting for create payloads.

use uuid::Uuid;

/// Mints collision-resistant, URL-safe identifiers.
pub trait IdSource: Send + Sync {
    fn mint(&self) -> String;
}

/// Random UUID v4, hyphenated. 36 characters, URL-safe.
pub struct UuidIdSource;

impl IdSource for UuidIdSource {
    fn mint(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_ids_are_long_and_url_safe() {
        let id = UuidIdSource.mint();
        assert_eq!(id.len(), 36);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-'));
    }

    #[test]
    fn minted_ids_do_not_repeat() {
        assert_ne!(UuidIdSource.mint(), UuidIdSource.mint());
    }
}
