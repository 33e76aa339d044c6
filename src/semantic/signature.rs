//! Semantic signature of a piece of source code.

use std::fmt::Write as _;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The essential semantic information of a component, as returned by the
/// model. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SemanticSignature {
    /// Function and class signatures
    pub public_interfaces: Vec<String>,

    pub type_definitions: Vec<String>,

    pub critical_algorithms: Vec<Algorithm>,

    /// Import path -> local alias
    pub dependency_refs: IndexMap<String, String>,

    /// Constraints from docstrings and assertions
    pub behavioral_constraints: Vec<String>,
}

/// A named algorithmic pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Algorithm {
    pub name: String,
    pub pattern: String,
    #[serde(default)]
    pub complexity: Option<String>,
}

impl SemanticSignature {
    /// Parse the model's JSON reply
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn is_empty(&self) -> bool {
        self.public_interfaces.is_empty()
            && self.type_definitions.is_empty()
            && self.critical_algorithms.is_empty()
            && self.dependency_refs.is_empty()
            && self.behavioral_constraints.is_empty()
    }

    /// Render every section as bullet lists for a reconstruction prompt
    pub fn render_sections(&self) -> String {
        let mut out = String::new();

        out.push_str("Public Interfaces:\n");
        push_bullets(&mut out, &self.public_interfaces);

        out.push_str("\nType Definitions:\n");
        push_bullets(&mut out, &self.type_definitions);

        out.push_str("\nCritical Algorithms:\n");
        for algo in &self.critical_algorithms {
            let _ = writeln!(out, "- {}:", algo.name);
            let _ = writeln!(out, "  Pattern: {}", algo.pattern);
            if let Some(complexity) = &algo.complexity {
                let _ = writeln!(out, "  Complexity: {}", complexity);
            }
        }

        out.push_str("\nDependencies:\n");
        for (path, alias) in &self.dependency_refs {
            let _ = writeln!(out, "- {}: {}", path, alias);
        }

        out.push_str("\nBehavioral Constraints:\n");
        push_bullets(&mut out, &self.behavioral_constraints);

        out
    }
}

fn push_bullets(out: &mut String, items: &[String]) {
    for item in items {
        let _ = writeln!(out, "- {}", item);
    }
}
