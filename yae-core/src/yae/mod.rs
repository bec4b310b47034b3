//! The process-wide singleton tying every store, the worker pool, and the
//! per-user agent map together. Exactly one [`Yae`] exists per process,
//! reached through [`Yae::initialize`] then [`Yae::get_instance`].

pub mod agent;

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use once_cell::sync::OnceCell;

use crate::agent_loop::{AgentLoopDeps, LlmAdapter, WebAdapter};
use crate::error::AgentError;
use crate::pool::WorkerPool;
use crate::users::token::{generate_token, hash_token};
use crate::users::{InMemoryUserBackend, Role, User, UserRepository};
use crate::webhooks::{InMemoryWebhookBackend, WebhookRepository};
use crate::workflow::recover_stale_runs;
use crate::workflow_store::{InMemoryWorkflowRunBackend, WorkflowRunRepository};

pub use agent::UserAgent;

static INSTANCE: OnceCell<Yae> = OnceCell::new();

/// Process-wide runtime state: the admin datastore, the per-user agent map,
/// the shared worker pool, and the shared LLM/web adapters every agent loop
/// call reads through.
pub struct Yae {
    agents: DashMap<String, Arc<UserAgent>>,
    users: UserRepository,
    llm: Arc<dyn LlmAdapter>,
    web: Arc<dyn WebAdapter>,
    pool: Arc<WorkerPool>,
    runs: Arc<WorkflowRunRepository>,
    webhooks: Arc<WebhookRepository>,
}

impl Yae {
    /// Creates the admin datastore and agent map, sweeps stale workflow runs
    /// left behind by a prior process, initializes the pool, and returns a
    /// freshly generated admin token (shown once — only its hash is stored).
    /// Fails if called more than once per process.
    pub async fn initialize(
        llm: Arc<dyn LlmAdapter>,
        web: Arc<dyn WebAdapter>,
        pool_size: usize,
    ) -> Result<String, AgentError> {
        let runs = Arc::new(WorkflowRunRepository::new(Arc::new(InMemoryWorkflowRunBackend::new())));
        let swept = recover_stale_runs(&runs).await?;
        tracing::info!(swept, "swept stale workflow runs at startup");

        let admin_token = generate_token();
        let users = UserRepository::new(Arc::new(InMemoryUserBackend::new()));
        let admin = User::new("admin", hash_token(&admin_token), Role::Admin, Utc::now());
        users.create(&admin).await?;

        let yae = Yae {
            agents: DashMap::new(),
            users,
            llm,
            web,
            pool: Arc::new(WorkerPool::new(pool_size)),
            runs,
            webhooks: Arc::new(WebhookRepository::new(Arc::new(InMemoryWebhookBackend::new()))),
        };

        INSTANCE
            .set(yae)
            .map_err(|_| AgentError::Internal("Yae::initialize called more than once".to_string()))?;
        Ok(admin_token)
    }

    /// Fails with a fixed error if called before [`Self::initialize`].
    pub fn get_instance() -> Result<&'static Yae, AgentError> {
        INSTANCE
            .get()
            .ok_or_else(|| AgentError::Internal("Yae::get_instance called before Yae::initialize".to_string()))
    }

    /// Closes every agent datastore, clears the pool, and closes admin
    /// resources. In-memory backends have nothing to flush; this exists as
    /// the one place that ordering would matter for a durable backend.
    pub fn shutdown(&self) {
        self.agents.clear();
    }

    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    pub fn webhooks(&self) -> &WebhookRepository {
        &self.webhooks
    }

    /// Returns the existing agent for `agent_id`, creating (and seeding) one
    /// if this is the first time this user has been seen.
    pub async fn create_user_agent(&self, agent_id: impl Into<String>) -> Result<Arc<UserAgent>, AgentError> {
        let agent_id = agent_id.into();
        if let Some(existing) = self.agents.get(&agent_id) {
            return Ok(Arc::clone(existing.value()));
        }
        let agent = Arc::new(UserAgent::new(agent_id.clone()).await?);
        self.agents.insert(agent_id, Arc::clone(&agent));
        Ok(agent)
    }

    pub fn get_user_agent(&self, agent_id: &str) -> Option<Arc<UserAgent>> {
        self.agents.get(agent_id).map(|a| Arc::clone(a.value()))
    }

    /// Removes `agent_id` from the in-process map. Per the Open Question
    /// recorded in `DESIGN.md`, this does not touch the user's row in the
    /// admin datastore or vice versa.
    pub fn delete_user_agent(&self, agent_id: &str) {
        self.agents.remove(agent_id);
    }

    /// Assembles the shared (LLM/web/pool/runs) and per-agent dependencies
    /// an agent loop turn needs.
    pub fn agent_loop_deps(&self, agent: &UserAgent) -> AgentLoopDeps {
        AgentLoopDeps {
            agent_id: agent.agent_id.clone(),
            memory: Arc::clone(&agent.memory),
            messages: Arc::clone(&agent.messages),
            files: Arc::clone(&agent.files),
            llm: Arc::clone(&self.llm),
            web: Arc::clone(&self.web),
            pool: Arc::clone(&self.pool),
            runs: Arc::clone(&self.runs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_loop::MockLlmAdapter;
    use async_trait::async_trait;
    use crate::agent_loop::{SearchDepth, WebAdapter};

    struct NullWeb;

    #[async_trait]
    impl WebAdapter for NullWeb {
        async fn search(&self, _query: &str, _depth: SearchDepth) -> Result<String, AgentError> {
            Ok(String::new())
        }
        async fn fetch(&self, _url: &str) -> Result<String, AgentError> {
            Ok(String::new())
        }
    }

    /// **Scenario**: get_instance fails before initialize, succeeds after, and
    /// create_user_agent is idempotent for the same id. The process-wide
    /// singleton means this is the only test in the crate allowed to call
    /// `Yae::initialize`.
    #[tokio::test]
    async fn initialize_then_get_instance_and_idempotent_agent_creation() {
        assert!(Yae::get_instance().is_err());

        let admin_token = Yae::initialize(Arc::new(MockLlmAdapter::new(vec![])), Arc::new(NullWeb), 2)
            .await
            .unwrap();
        assert!(admin_token.starts_with("yae_"));

        let yae = Yae::get_instance().unwrap();
        let admin = yae.users().get_user_by_token(&admin_token).await.unwrap();
        assert_eq!(admin.role, Role::Admin);

        let a = yae.create_user_agent("user-1").await.unwrap();
        let b = yae.create_user_agent("user-1").await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        assert!(Yae::initialize(Arc::new(MockLlmAdapter::new(vec![])), Arc::new(NullWeb), 2)
            .await
            .is_err());
    }
}
