//! Principal identifiers

pub use kernel::id::{SocialAccountId, UserId};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_new() {
        let user_id = UserId::new();
        assert_eq!(user_id.as_uuid().get_version_num(), 4);
    }

    #[test]
    fn test_ids_are_distinct_types() {
        let uuid = uuid::Uuid::new_v4();
        let user_id = UserId::from_uuid(uuid);
        let account_id = SocialAccountId::from_uuid(uuid);
        assert_eq!(user_id.as_uuid(), account_id.as_uuid());
    }
}
