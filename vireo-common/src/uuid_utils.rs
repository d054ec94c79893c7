//! UUID helpers for TEXT-keyed rows

use crate::{Error, Result};
use uuid::Uuid;

/// Parse an identity column. Identities are written as hyphenated
/// UUID text by this crate only, so a malformed value means store
/// corruption, not caller error.
pub fn parse_db_id(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::Internal(format!("malformed id {s:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_hyphenated_text() {
        let id = Uuid::new_v4();
        assert_eq!(parse_db_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn malformed_text_is_internal_corruption() {
        assert!(matches!(
            parse_db_id("not-a-uuid"),
            Err(Error::Internal(_))
        ));
    }
}
