use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The key file is unreadable, structurally invalid, carries an
    /// unparseable private key, or its scope set violates the read-scope
    /// requirement.
    #[error("Malformed service-account key: {0}")]
    MalformedKey(String),

    /// The signed assertion was rejected as expired (key revoked or
    /// severe clock skew).
    #[error("Credential expired: {0}")]
    Expired(String),

    /// The token endpoint answered with a non-success status.
    #[error("Token exchange rejected by server (status {status}): {detail}")]
    RejectedByServer { status: u16, detail: String },

    /// The token endpoint could not be reached at all.
    #[error("Token endpoint unreachable: {0}")]
    Unreachable(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
