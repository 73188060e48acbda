// Fixed user dataset
// Immutable, shared by the list and lookup endpoints

use super::types::User;

pub static USERS: [User; 3] = [
    User {
        id: 1,
        name: "Juan Pérez",
        email: "juan@example.com",
        role: "admin",
    },
    User {
        id: 2,
        name: "María García",
        email: "maria@example.com",
        role: "user",
    },
    User {
        id: 3,
        name: "Carlos López",
        email: "carlos@example.com",
        role: "user",
    },
];

/// Id given to every fabricated user; nothing is stored, so it never advances
pub const CREATED_USER_ID: u64 = 4;

/// Role applied when a creation request omits `role`
pub const DEFAULT_ROLE: &str = "user";

pub fn find_user(id: u64) -> Option<&'static User> {
    USERS.iter().find(|u| u.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_ordered() {
        let ids: Vec<u64> = USERS.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(find_user(CREATED_USER_ID).is_none());
    }

    #[test]
    fn test_find_user() {
        assert_eq!(find_user(2).map(|u| u.email), Some("maria@example.com"));
        assert!(find_user(0).is_none());
        assert!(find_user(999).is_none());
    }
}
