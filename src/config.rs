use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Argon2 work-factor knobs. The chosen costs are embedded in every PHC
/// hash string, so changing them never invalidates previously stored hashes.
#[derive(Debug, Clone, Deserialize)]
pub struct Argon2Config {
    pub m_cost_kib: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        let defaults = argon2::Params::default();
        Self {
            m_cost_kib: defaults.m_cost(),
            t_cost: defaults.t_cost(),
            p_cost: defaults.p_cost(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub argon2: Argon2Config,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        // Empty when running with the in-memory store; the Postgres path
        // checks for it before connecting.
        let database_url = std::env::var("DATABASE_URL").unwrap_or_default();
        // No fallback on purpose: a missing secret must abort startup.
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "noicelens".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "noicelens-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        let defaults = Argon2Config::default();
        let argon2 = Argon2Config {
            m_cost_kib: env_u32("ARGON2_M_COST_KIB").unwrap_or(defaults.m_cost_kib),
            t_cost: env_u32("ARGON2_T_COST").unwrap_or(defaults.t_cost),
            p_cost: env_u32("ARGON2_P_COST").unwrap_or(defaults.p_cost),
        };
        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(15);
        Ok(Self {
            database_url,
            jwt,
            argon2,
            request_timeout_secs,
        })
    }
}

fn env_u32(name: &str) -> Option<u32> {
    std::env::var(name).ok().and_then(|v| v.parse::<u32>().ok())
}
