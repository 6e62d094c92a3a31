//! Agent registry.
//!
//! Ordered collection of adapters keyed by id. Registration order doubles as
//! the consensus tie-break priority: the first registered agent wins ties.

use crate::ports::agent_adapter::AgentAdapter;
use conclave_domain::AgentId;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Agent already registered: {0}")]
    Duplicate(AgentId),

    #[error("Agent id '{0}' is reserved")]
    Reserved(AgentId),
}

/// Ordered set of participating agents.
#[derive(Default, Clone)]
pub struct AgentRegistry {
    agents: Vec<Arc<dyn AgentAdapter>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an adapter. Fails on a duplicate or reserved id.
    pub fn register(&mut self, agent: Arc<dyn AgentAdapter>) -> Result<(), RegistryError> {
        let id = agent.id().clone();
        if id.is_reserved() {
            return Err(RegistryError::Reserved(id));
        }
        if self.contains(&id) {
            return Err(RegistryError::Duplicate(id));
        }
        self.agents.push(agent);
        Ok(())
    }

    /// Builder-style variant of [`register`](Self::register).
    pub fn with(mut self, agent: Arc<dyn AgentAdapter>) -> Result<Self, RegistryError> {
        self.register(agent)?;
        Ok(self)
    }

    pub fn get(&self, id: &AgentId) -> Option<&Arc<dyn AgentAdapter>> {
        self.agents.iter().find(|a| a.id() == id)
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.get(id).is_some()
    }

    /// Zero-based registration rank; lower wins ties.
    pub fn priority(&self, id: &AgentId) -> Option<usize> {
        self.agents.iter().position(|a| a.id() == id)
    }

    /// All ids in registration order.
    pub fn priority_order(&self) -> Vec<AgentId> {
        self.agents.iter().map(|a| a.id().clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn AgentAdapter>> {
        self.agents.iter()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.priority_order()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedAgent;

    #[test]
    fn test_registration_order_is_priority() {
        let registry = AgentRegistry::new()
            .with(ScriptedAgent::new("planner").into_arc())
            .unwrap()
            .with(ScriptedAgent::new("executor").into_arc())
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.priority(&AgentId::new("planner")), Some(0));
        assert_eq!(registry.priority(&AgentId::new("executor")), Some(1));
        assert_eq!(registry.priority(&AgentId::new("ghost")), None);
        assert_eq!(
            registry.priority_order(),
            vec![AgentId::new("planner"), AgentId::new("executor")]
        );
    }

    #[test]
    fn test_rejects_duplicate() {
        let mut registry = AgentRegistry::new();
        registry.register(ScriptedAgent::new("a").into_arc()).unwrap();
        let err = registry
            .register(ScriptedAgent::new("a").into_arc())
            .unwrap_err();
        assert_eq!(err, RegistryError::Duplicate(AgentId::new("a")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_rejects_reserved_id() {
        let mut registry = AgentRegistry::new();
        let err = registry
            .register(ScriptedAgent::new("ALL").into_arc())
            .unwrap_err();
        assert!(matches!(err, RegistryError::Reserved(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_lookup() {
        let registry = AgentRegistry::new()
            .with(ScriptedAgent::new("a").into_arc())
            .unwrap();
        assert!(registry.get(&AgentId::new("a")).is_some());
        assert!(registry.get(&AgentId::new("b")).is_none());
    }
}
