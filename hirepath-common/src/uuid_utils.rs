//! UUID utilities

use crate::{Error, Result};
use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Parse a UUID read back from storage
///
/// A malformed stored id is corrupt data, not bad user input.
pub fn parse_stored(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::Internal(format!("Invalid stored UUID {:?}: {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_unique() {
        assert_ne!(generate(), generate());
    }

    #[test]
    fn test_parse_stored() {
        let id = generate();
        assert_eq!(parse_stored(&id.to_string()).unwrap(), id);
        assert!(matches!(parse_stored("not-a-uuid"), Err(Error::Internal(_))));
    }
}
