use chrono::{DateTime, Utc};
use ticketdesk_common::{AssignedUser, Role};

/// User record as stored in the `users` table.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// bcrypt digest of the password
    pub password_hash: String,
    pub role: Role,
    /// Deactivated users cannot log in
    pub is_active: bool,
    pub registered_on: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    /// Token handed out on the most recent login
    pub session_token: Option<String>,
}

impl User {
    /// Denormalized copy stored inside a ticket's assignment list.
    pub fn snapshot(&self) -> AssignedUser {
        AssignedUser {
            user_id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Fields required to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub registered_on: DateTime<Utc>,
}
