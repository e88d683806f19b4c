//! Process identity read from the environment.
//!
//! # Environment Variables
//! - `APP_ID`: application id, overrides `Config::family`
//! - `HOSTNAME`: instance name, used for `Config::host`
//! - `DEPLOY_ENV`: deploy environment (dev, uat, prod, ...)
//! - `ZONE`: availability zone

/// Identity of the running process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessEnv {
    pub app_id: String,
    pub hostname: String,
    pub deploy_env: String,
    pub zone: String,
}

impl ProcessEnv {
    /// Reads identity from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads identity through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).unwrap_or_default();
        Self {
            app_id: get("APP_ID"),
            hostname: get("HOSTNAME"),
            deploy_env: get("DEPLOY_ENV"),
            zone: get("ZONE"),
        }
    }
}

/// Hostname as reported by the operating system, or an empty string.
pub fn os_hostname() -> String {
    gethostname::gethostname()
        .to_string_lossy()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> =
            [("APP_ID", "shop.api"), ("DEPLOY_ENV", "uat")].into_iter().collect();
        let env = ProcessEnv::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(env.app_id, "shop.api");
        assert_eq!(env.deploy_env, "uat");
        assert!(env.hostname.is_empty());
        assert!(env.zone.is_empty());
    }

    #[test]
    fn test_os_hostname_from_system() {
        let name = os_hostname();
        assert!(!name.is_empty());
        assert_eq!(name, name.trim());
    }
}
