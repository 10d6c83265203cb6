pub mod magic_link;
pub mod middleware;

pub use magic_link::{
    IssuedLogin, LinkCipher, LinkOutcome, MagicLinkError, MagicLinkPayload, MagicLinkService,
    MAGIC_LINK_TTL_MINUTES, SESSION_NONCE, SESSION_USER_ID,
};
