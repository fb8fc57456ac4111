use std::collections::HashMap;

/// Resolves a numeric owner id into an account name.
pub trait AccountResolver: Send + Sync {
    fn account_name(&self, uid: u32) -> Option<String>;

    /// Name for display; unknown ids fall back to the number itself.
    fn resolve(&self, uid: u32) -> String {
        self.account_name(uid).unwrap_or_else(|| uid.to_string())
    }
}

/// Accounts known to the host, loaded once through `sysinfo`.
#[derive(Debug, Default, Clone)]
pub struct SystemAccounts {
    names: HashMap<u32, String>,
}

impl SystemAccounts {
    #[cfg(unix)]
    pub fn load() -> Self {
        let users = sysinfo::Users::new_with_refreshed_list();
        let names = users
            .list()
            .iter()
            .map(|user| (**user.id(), user.name().to_string()))
            .collect();
        SystemAccounts { names }
    }

    #[cfg(not(unix))]
    pub fn load() -> Self {
        SystemAccounts::default()
    }
}

impl AccountResolver for SystemAccounts {
    fn account_name(&self, uid: u32) -> Option<String> {
        self.names.get(&uid).cloned()
    }
}

/// Fixed uid → name table.
#[derive(Debug, Default, Clone)]
pub struct StaticAccounts {
    names: HashMap<u32, String>,
}

impl StaticAccounts {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        StaticAccounts {
            names: entries
                .into_iter()
                .map(|(uid, name)| (uid, name.into()))
                .collect(),
        }
    }
}

impl AccountResolver for StaticAccounts {
    fn account_name(&self, uid: u32) -> Option<String> {
        self.names.get(&uid).cloned()
    }
}
