use thiserror::Error;

pub type TiplineResult<T> = Result<T, TiplineError>;

/// Error taxonomy for the encryption and access core.
///
/// The user-visible variants deliberately carry no internal detail: a caller
/// is never told which half of a credential pair was wrong, which tenant or
/// key version a payload belongs to, or which field failed to authenticate.
#[derive(Debug, Error)]
pub enum TiplineError {
    /// Fatal startup condition (missing/malformed master secret, bad config).
    /// The process must not serve requests when this is raised at init.
    #[error("config error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),

    /// Internal cipher failure that is not a tamper signal (e.g. an AEAD
    /// implementation error during encryption).
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Authentication tag mismatch on decrypt: tampering, corruption, wrong
    /// key, or wrong associated data. All collapse to one message.
    #[error("unable to decrypt this message")]
    Integrity,

    /// Unknown case id or wrong case key. The two causes are never
    /// distinguished.
    #[error("invalid case id or case key")]
    AccessDenied,

    /// Verification short-circuited by the rate-limit collaborator before
    /// any hash comparison took place.
    #[error("too many access attempts, try again later")]
    RateLimited,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
