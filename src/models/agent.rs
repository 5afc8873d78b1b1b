use serde::{Deserialize, Serialize};

/// Manager agent that owns a session when no specialist is active
pub const MANAGER_AGENT: &str = "hydrogen";

/// Display label of [`MANAGER_AGENT`]
pub const MANAGER_LABEL: &str = "Hydrogen (Manager)";

const AGENT_LABELS: &[(&str, &str)] = &[
    ("hydrogen", "Hydrogen (Manager)"),
    ("helium", "Helium (Life Goals)"),
    ("lithium", "Lithium (State Check)"),
    ("beryllium", "Beryllium (Tasks)"),
];

/// Known display label for an agent name
pub fn agent_label(agent: &str) -> Option<&'static str> {
    AGENT_LABELS
        .iter()
        .find(|(name, _)| *name == agent)
        .map(|(_, label)| *label)
}

/// Agent identity active for a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveAgent {
    pub agent: String,
    pub label: String,
}

impl ActiveAgent {
    /// The manager identity
    pub fn manager() -> Self {
        Self {
            agent: MANAGER_AGENT.to_string(),
            label: MANAGER_LABEL.to_string(),
        }
    }

    /// Build from optional wire fields, defaulting to the manager.
    ///
    /// A missing label is looked up from the agent name; an unknown agent
    /// without a label is shown by its name.
    pub fn resolve(agent: Option<String>, label: Option<String>) -> Self {
        let agent = agent
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| MANAGER_AGENT.to_string());
        let label = label.filter(|l| !l.is_empty()).unwrap_or_else(|| {
            agent_label(&agent)
                .map(str::to_string)
                .unwrap_or_else(|| agent.clone())
        });
        Self { agent, label }
    }
}

impl Default for ActiveAgent {
    fn default() -> Self {
        Self::manager()
    }
}

/// Response body of `GET /api/chat/active-agent`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveAgentResponse {
    #[serde(default)]
    pub active_agent: Option<String>,
    #[serde(default)]
    pub active_agent_label: Option<String>,
}

impl From<ActiveAgentResponse> for ActiveAgent {
    fn from(response: ActiveAgentResponse) -> Self {
        ActiveAgent::resolve(response.active_agent, response.active_agent_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_label_lookup() {
        assert_eq!(agent_label("helium"), Some("Helium (Life Goals)"));
        assert_eq!(agent_label("unknown"), None);
    }

    #[test]
    fn test_resolve_defaults_to_manager() {
        assert_eq!(ActiveAgent::resolve(None, None), ActiveAgent::manager());
        assert_eq!(
            ActiveAgent::resolve(Some(String::new()), None),
            ActiveAgent::manager()
        );
    }

    #[test]
    fn test_resolve_looks_up_missing_label() {
        let agent = ActiveAgent::resolve(Some("beryllium".to_string()), None);
        assert_eq!(agent.label, "Beryllium (Tasks)");
    }

    #[test]
    fn test_resolve_unknown_agent_uses_name() {
        let agent = ActiveAgent::resolve(Some("boron".to_string()), None);
        assert_eq!(agent.label, "boron");
    }

    #[test]
    fn test_from_response_with_null_fields() {
        let response: ActiveAgentResponse =
            serde_json::from_str(r#"{"active_agent": null, "active_agent_label": null}"#).unwrap();
        assert_eq!(ActiveAgent::from(response), ActiveAgent::manager());
    }
}
