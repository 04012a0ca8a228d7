use crate::config::RenewConfig;

/// One renewal target with its effective enabled flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainDescriptor {
    pub name: String,
    pub enabled: bool,
}

/// Outcome of the eligibility pass: whether the run should do anything at
/// all, and the ordered renewal targets when it should.
///
/// An inactive plan short-circuits the whole run before any store or
/// filesystem access. An active plan with no enabled domains still imports
/// and re-exports the snapshot, so the store keeps tracking local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityPlan {
    pub active: bool,
    pub domains: Vec<DomainDescriptor>,
}

impl EligibilityPlan {
    fn inactive() -> Self {
        Self {
            active: false,
            domains: Vec::new(),
        }
    }
}

/// Decide whether certificate management is active and which domains to try.
///
/// Multi-site: the run is active when the global flag is set or any domain's
/// effective flag is set. Single-site: the run is active when the global flag
/// is set, and renews the first configured server name; an empty list means
/// there is nothing to renew, which is not an error.
pub fn resolve(config: &RenewConfig) -> EligibilityPlan {
    if config.multisite {
        let domains: Vec<DomainDescriptor> = config
            .server_names
            .iter()
            .map(|name| DomainDescriptor {
                name: name.clone(),
                enabled: config.effective_flag(name),
            })
            .collect();
        let active = config.auto_renew || domains.iter().any(|d| d.enabled);
        return EligibilityPlan { active, domains };
    }

    if !config.auto_renew {
        return EligibilityPlan::inactive();
    }

    let domains = match config.server_names.first() {
        Some(name) => vec![DomainDescriptor {
            name: name.clone(),
            enabled: true,
        }],
        None => Vec::new(),
    };
    EligibilityPlan {
        active: true,
        domains,
    }
}
