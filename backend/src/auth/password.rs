use crate::error::ApiError;

/// bcrypt wrapper holding the configured work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash on the blocking pool so the async workers keep serving requests.
    pub async fn hash(&self, password: String) -> Result<String, ApiError> {
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| ApiError::Internal(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| {
                tracing::error!("Password hashing failed: {}", e);
                ApiError::Internal("Internal server error".to_string())
            })
    }

    /// False for a wrong password and for an unreadable digest.
    pub async fn verify(&self, password: String, digest: String) -> bool {
        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &digest)).await;
        match outcome {
            Ok(Ok(matches)) => matches,
            Ok(Err(e)) => {
                tracing::warn!("Stored password digest could not be verified: {}", e);
                false
            }
            Err(e) => {
                tracing::error!("Password verification task failed: {}", e);
                false
            }
        }
    }
}
