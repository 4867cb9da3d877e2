use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Salt substituted when the site has no `AUTH_SALT` configured.
///
/// Anyone who knows this literal can mint a valid token, so a site running on
/// the fallback accepts exclusion requests from any caller.
pub const FALLBACK_SALT: &str = "render-command-fallback-salt";

/// Domain-separation suffix appended to the salt before hashing.
pub const TOKEN_SEPARATOR: &str = "::render-command-exclusion";

/// Source of the long-lived secret salt.
///
/// Returning `None` (or an empty string) makes the [`TokenAuthority`] fall back
/// to [`FALLBACK_SALT`].
pub trait SaltProvider {
    fn salt(&self) -> Option<&str>;
}

/// A salt fixed at construction time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSalt(Option<String>);

impl StaticSalt {
    pub fn new(salt: impl Into<String>) -> Self {
        Self(Some(salt.into()))
    }

    /// A provider with no salt configured.
    pub const fn unset() -> Self {
        Self(None)
    }
}

impl From<Option<String>> for StaticSalt {
    fn from(salt: Option<String>) -> Self {
        Self(salt)
    }
}

impl SaltProvider for StaticSalt {
    fn salt(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Derives and checks exclusion tokens.
#[derive(Debug, Clone)]
pub struct TokenAuthority<P> {
    provider: P,
}

impl<P: SaltProvider> TokenAuthority<P> {
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Whether derivation will use [`FALLBACK_SALT`].
    pub fn uses_fallback(&self) -> bool {
        self.provider.salt().is_none_or(str::is_empty)
    }

    /// Compute `hex(SHA-256(salt || TOKEN_SEPARATOR))`.
    ///
    /// Deterministic: the same salt always yields the same 64-char lowercase
    /// hex string.
    pub fn derive_token(&self) -> String {
        let salt = match self.provider.salt() {
            Some(s) if !s.is_empty() => s,
            _ => {
                tracing::warn!("no salt configured, deriving exclusion token from fallback salt");
                FALLBACK_SALT
            }
        };
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(TOKEN_SEPARATOR.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Compare a presented token against the derived one in constant time.
    pub fn verify(&self, presented: &str) -> bool {
        let expected = self.derive_token();
        expected.as_bytes().ct_eq(presented.as_bytes()).into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn authority(salt: &str) -> TokenAuthority<StaticSalt> {
        TokenAuthority::new(StaticSalt::new(salt))
    }

    #[test]
    fn output_is_64_lowercase_hex_chars() {
        let token = authority("some-salt").derive_token();
        assert_eq!(token.len(), 64, "token must be 64 chars");
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()),
            "token must be lowercase hex: {token}"
        );
    }

    #[test]
    fn token_is_stable_across_calls() {
        let a = authority("stable-salt");
        assert_eq!(a.derive_token(), a.derive_token());
        assert_eq!(a.derive_token(), authority("stable-salt").derive_token());
    }

    #[test]
    fn different_salts_produce_different_tokens() {
        let salts = ["alpha", "beta", "alpha ", "ALPHA", "a-much-longer-salt-value"];
        let tokens: Vec<String> = salts.iter().map(|s| authority(s).derive_token()).collect();
        for (i, a) in tokens.iter().enumerate() {
            for b in &tokens[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn known_vector_for_explicit_salt() {
        assert_eq!(
            authority("test-salt").derive_token(),
            "05e3ffdb084f8e9fcb3f432af3f1bc0a97b074a08e653ca3aeecadfea2e709b1"
        );
    }

    #[test]
    fn unset_salt_uses_fallback() {
        let unset = TokenAuthority::new(StaticSalt::unset());
        assert!(unset.uses_fallback());
        assert_eq!(
            unset.derive_token(),
            "2d437d958632d9ce53a4555ccc39c6eff3adcbd898ccaec3b4425cf3611b0427"
        );
        assert_eq!(unset.derive_token(), authority(FALLBACK_SALT).derive_token());
    }

    #[test]
    fn empty_salt_is_treated_as_unset() {
        let empty = authority("");
        assert!(empty.uses_fallback());
        assert_eq!(
            empty.derive_token(),
            TokenAuthority::new(StaticSalt::unset()).derive_token()
        );
    }

    #[test]
    fn verify_accepts_only_the_derived_token() {
        let a = authority("verify-salt");
        let token = a.derive_token();
        assert!(a.verify(&token));
        assert!(!a.verify(&token.to_uppercase()));
        assert!(!a.verify(&token[..63]));
        assert!(!a.verify(""));
        assert!(!a.verify(&authority("other-salt").derive_token()));
    }
}
