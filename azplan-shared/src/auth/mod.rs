/// Authentication and authorization primitives
///
/// # Modules
///
/// - [`password`]: Argon2id hashing and strength rules
/// - [`jwt`]: Access and refresh tokens
/// - [`api_token`]: Opaque API token generation and hashing
/// - [`middleware`]: Resolving the caller of a request
/// - [`authorization`]: Owner and shared-link access checks
///
/// # Example
///
/// ```no_run
/// use azplan_shared::auth::jwt::{create_token, Claims, TokenType};
/// use azplan_shared::auth::password::{hash_password, verify_password};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Bakery#2025")?;
/// assert!(verify_password("Bakery#2025", &hash)?);
///
/// let token = create_token(&Claims::new(Uuid::new_v4(), TokenType::Access), "secret")?;
/// # Ok(())
/// # }
/// ```

pub mod api_token;
pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
