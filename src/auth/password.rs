use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use tracing::error;

use crate::config::Argon2Config;

/// One-way, salted transform of a plaintext password. The salt and the work
/// factor are embedded in the returned PHC string, so output is different on
/// every call and old hashes keep verifying after a cost change.
pub fn hash_password(plain: &str, cfg: &Argon2Config) -> anyhow::Result<String> {
    let params = Params::new(cfg.m_cost_kib, cfg.t_cost, cfg.p_cost, None).map_err(|e| {
        error!(error = %e, "invalid argon2 params");
        anyhow::anyhow!(e.to_string())
    })?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Returns false on mismatch; errors only when the stored hash is not a
/// valid PHC string. Verification reads its params from the hash itself.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_params() -> Argon2Config {
        // Minimum legal costs keep the test suite fast.
        Argon2Config {
            m_cost_kib: Params::MIN_M_COST.max(8),
            t_cost: 1,
            p_cost: 1,
        }
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password, &cheap_params()).expect("hashing should succeed");
        assert!(!hash.is_empty());
        assert_ne!(hash, password);
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn same_plaintext_hashes_differently_but_both_verify() {
        let password = "correct-horse-battery-staple";
        let cfg = cheap_params();
        let first = hash_password(password, &cfg).expect("hashing should succeed");
        let second = hash_password(password, &cfg).expect("hashing should succeed");
        assert_ne!(first, second);
        assert!(verify_password(password, &first).unwrap());
        assert!(verify_password(password, &second).unwrap());
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("right-password", &cheap_params()).unwrap();
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn old_hashes_survive_a_cost_change() {
        let hash = hash_password("stable-password", &cheap_params()).unwrap();
        // Default-cost verifier still accepts a hash made with other params.
        assert!(verify_password("stable-password", &hash).unwrap());
    }
}
