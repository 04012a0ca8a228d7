use std::collections::HashMap;

/// Suffix of the per-domain override variables, e.g.
/// `app.example.com_AUTO_LETS_ENCRYPT=yes`.
const OVERRIDE_SUFFIX: &str = "_AUTO_LETS_ENCRYPT";

/// Immutable job configuration, built once at startup from CLI arguments and
/// a single environment snapshot. Nothing downstream reads ambient
/// environment state.
#[derive(Debug, Clone)]
pub struct RenewConfig {
    /// Global "certificate management enabled" flag.
    pub auto_renew: bool,
    /// Multi-site mode: every server name carries its own effective flag.
    pub multisite: bool,
    /// Ordered server names. In single-site mode only the first entry is a
    /// renewal target.
    pub server_names: Vec<String>,
    /// Per-domain overrides of the global flag, keyed by domain name.
    pub overrides: HashMap<String, bool>,
}

impl RenewConfig {
    pub fn new(
        auto_renew: bool,
        multisite: bool,
        server_names_raw: &str,
        overrides: HashMap<String, bool>,
    ) -> Self {
        Self {
            auto_renew,
            multisite,
            server_names: split_server_names(server_names_raw),
            overrides,
        }
    }

    /// Effective flag for one domain: per-domain override if present,
    /// otherwise the global flag.
    pub fn effective_flag(&self, domain: &str) -> bool {
        self.overrides
            .get(domain)
            .copied()
            .unwrap_or(self.auto_renew)
    }
}

/// Normalize the space-separated server name value into an ordered list.
///
/// This is the only place the raw string is interpreted; everything after
/// the configuration boundary sees a plain list.
pub fn split_server_names(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// Collect `{DOMAIN}_AUTO_LETS_ENCRYPT` overrides from an environment
/// snapshot. Values follow the yes/no convention of the deployment contract.
pub fn overrides_from_env<I>(vars: I) -> HashMap<String, bool>
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| {
            let domain = key.strip_suffix(OVERRIDE_SUFFIX)?;
            if domain.is_empty() {
                return None;
            }
            Some((domain.to_string(), is_yes(&value)))
        })
        .collect()
}

/// The deployment contract expresses booleans as yes/no strings.
pub fn is_yes(value: &str) -> bool {
    value.eq_ignore_ascii_case("yes")
}
