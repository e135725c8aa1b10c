use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Agent identity must be a non-empty string")]
pub struct InvalidAgentIdentity;

/// Opaque key selecting which persona answers a request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgentIdentity(String);

impl AgentIdentity {
    pub fn new<S: Into<String>>(id: S) -> Result<Self, InvalidAgentIdentity> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(InvalidAgentIdentity);
        }
        Ok(AgentIdentity(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human readable name derived from the key, `digital_transform_analyst` becomes
    /// `Digital Transform Analyst`
    pub fn display_name(&self) -> String {
        self.0
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}

impl TryFrom<String> for AgentIdentity {
    type Error = InvalidAgentIdentity;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        AgentIdentity::new(value)
    }
}

impl FromStr for AgentIdentity {
    type Err = InvalidAgentIdentity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentIdentity::new(s.trim())
    }
}

impl From<AgentIdentity> for String {
    fn from(identity: AgentIdentity) -> Self {
        identity.0
    }
}

impl AsRef<str> for AgentIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of the agent listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Descriptor plus the example prompts shown when the agent is opened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    #[serde(flatten)]
    pub descriptor: AgentDescriptor,
    #[serde(default)]
    pub example_prompts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentList {
    pub agents: Vec<AgentDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_empty_identity() {
        assert_eq!(AgentIdentity::new(""), Err(InvalidAgentIdentity));
        assert_eq!(AgentIdentity::new("   "), Err(InvalidAgentIdentity));
        assert!(serde_json::from_value::<AgentIdentity>(json!("")).is_err());
    }

    #[test]
    fn test_parses_from_command_line_text() {
        let agent: AgentIdentity = " blogsmith ".parse().unwrap();
        assert_eq!(agent.as_str(), "blogsmith");
        assert!("".parse::<AgentIdentity>().is_err());
    }

    #[test]
    fn test_display_name() {
        let agent = AgentIdentity::new("digital_transform_analyst").unwrap();
        assert_eq!(agent.display_name(), "Digital Transform Analyst");
        assert_eq!(AgentIdentity::new("blogsmith").unwrap().display_name(), "Blogsmith");
    }

    #[test]
    fn test_profile_flattens_descriptor() {
        let profile = AgentProfile {
            descriptor: AgentDescriptor {
                id: "fitcoachai".to_string(),
                name: "FitCoachAI".to_string(),
                description: "Your personal AI fitness coach".to_string(),
            },
            example_prompts: vec![],
        };
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["id"], "fitcoachai");
        assert_eq!(value["example_prompts"], json!([]));
    }
}
