#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    MissingCredentials,
    AccountExists,
    InvalidCredentials,
    HashingFailed(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::MissingCredentials => {
                write!(f, "Email and password are required")
            }
            DomainError::AccountExists => {
                write!(f, "An account with this email already exists")
            }
            DomainError::InvalidCredentials => {
                write!(f, "Invalid email or password")
            }
            DomainError::HashingFailed(msg) => {
                write!(f, "Password hashing failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for DomainError {}

pub type DomainResult<T> = Result<T, DomainError>;
