use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A named set of boolean authorization rules, forwarded with every request so the
/// receiving function can enforce access control.
///
/// Serialized as `{"rules": {"<name>": <bool>, ...}}`.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct Policy {
    pub rules: BTreeMap<String, bool>
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, name: impl Into<String>, allowed: bool) -> Self {
        self.rules.insert(name.into(), allowed);
        self
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for Policy {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter()
                .map(|(name, allowed)| (name.into(), allowed))
                .collect()
        }
    }
}

/// The identity and policy attached to every request sent by one client.
///
/// A `ClientConfig` is never mutated once a client has been built from it, so it can be
/// shared freely between concurrent calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub account: String,
    pub user: String,
    pub policy: Policy
}

impl ClientConfig {
    pub fn new(account: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            user: user.into(),
            policy: Policy::default()
        }
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_rule(mut self, name: impl Into<String>, allowed: bool) -> Self {
        self.policy = self.policy.with_rule(name, allowed);
        self
    }
}
