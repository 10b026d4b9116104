//! Read-only context for prompt grounding.
//!
//! Providers each render one titled section (the caller's projects, their
//! open tasks, the status vocabulary). A failing provider only costs its own
//! section; the snapshot degrades instead of failing the pipeline. Snapshots
//! are cached per user with a TTL so bursts of requests don't re-query the
//! domain every time.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use metrics::counter;
use taskpilot_commands::Services;
use taskpilot_core::actor::Actor;
use taskpilot_core::ids::UserId;
use taskpilot_domain::errors::DomainError;
use taskpilot_domain::types::TaskStatus;
use tracing::warn;

/// One titled block of prompt context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextSection {
    /// Section heading.
    pub title: String,
    /// Rendered body.
    pub body: String,
}

/// The assembled per-user context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContextSnapshot {
    /// Sections in provider order; failed providers are absent.
    pub sections: Vec<ContextSection>,
}

impl ContextSnapshot {
    /// Render the snapshot as prompt text.
    #[must_use]
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(|s| format!("## {}\n{}", s.title, s.body))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// A capability-scoped read-only context source.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// Section heading this provider contributes.
    fn title(&self) -> &str;

    /// Render the section body for this actor.
    async fn render(&self, actor: &Actor) -> Result<String, DomainError>;
}

/// Lists the caller's projects by name.
pub struct ProjectsProvider {
    services: Services,
}

impl ProjectsProvider {
    /// Provider over the given services.
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}

#[async_trait]
impl ContextProvider for ProjectsProvider {
    fn title(&self) -> &str {
        "Your projects"
    }

    async fn render(&self, actor: &Actor) -> Result<String, DomainError> {
        let projects = self.services.projects.list_for_user(&actor.id).await?;
        if projects.is_empty() {
            return Ok("(none)".to_string());
        }
        Ok(projects
            .iter()
            .map(|p| format!("- {} (id: {})", p.name, p.id))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Lists the caller's unfinished tasks.
pub struct OpenTasksProvider {
    services: Services,
}

impl OpenTasksProvider {
    /// Provider over the given services.
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}

#[async_trait]
impl ContextProvider for OpenTasksProvider {
    fn title(&self) -> &str {
        "Your open tasks"
    }

    async fn render(&self, actor: &Actor) -> Result<String, DomainError> {
        let tasks = self.services.tasks.list_for_user(&actor.id).await?;
        let open: Vec<_> = tasks
            .iter()
            .filter(|t| t.status != TaskStatus::Done)
            .collect();
        if open.is_empty() {
            return Ok("(none)".to_string());
        }
        Ok(open
            .iter()
            .map(|t| format!("- {} [{}] (id: {})", t.title, t.status, t.id))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Static enumeration of valid task statuses.
pub struct StatusVocabularyProvider;

#[async_trait]
impl ContextProvider for StatusVocabularyProvider {
    fn title(&self) -> &str {
        "Task statuses"
    }

    async fn render(&self, _actor: &Actor) -> Result<String, DomainError> {
        Ok(TaskStatus::ALL
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "))
    }
}

struct CachedSnapshot {
    taken_at: Instant,
    snapshot: ContextSnapshot,
}

/// Builds snapshots through the provider chain, with a per-user TTL cache.
pub struct ContextResolver {
    providers: Vec<Arc<dyn ContextProvider>>,
    ttl: Duration,
    cache: DashMap<UserId, CachedSnapshot>,
}

impl ContextResolver {
    /// Resolver over an ordered provider chain. TTL zero disables caching.
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn ContextProvider>>, ttl: Duration) -> Self {
        Self {
            providers,
            ttl,
            cache: DashMap::new(),
        }
    }

    /// The production provider chain: projects, open tasks, status vocabulary.
    #[must_use]
    pub fn standard(services: &Services, ttl: Duration) -> Self {
        Self::new(
            vec![
                Arc::new(ProjectsProvider::new(services.clone())),
                Arc::new(OpenTasksProvider::new(services.clone())),
                Arc::new(StatusVocabularyProvider),
            ],
            ttl,
        )
    }

    /// Cached snapshot if fresh, otherwise a rebuild through every provider.
    pub async fn resolve(&self, actor: &Actor) -> ContextSnapshot {
        if let Some(cached) = self.cache.get(&actor.id) {
            if cached.taken_at.elapsed() < self.ttl {
                counter!("context_cache_total", "outcome" => "hit").increment(1);
                return cached.snapshot.clone();
            }
        }
        counter!("context_cache_total", "outcome" => "miss").increment(1);

        let mut sections = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            match provider.render(actor).await {
                Ok(body) => sections.push(ContextSection {
                    title: provider.title().to_string(),
                    body,
                }),
                Err(err) => {
                    warn!(section = provider.title(), error = %err, "context provider failed, section skipped");
                }
            }
        }

        let snapshot = ContextSnapshot { sections };
        if !self.ttl.is_zero() {
            let _ = self.cache.insert(
                actor.id.clone(),
                CachedSnapshot {
                    taken_at: Instant::now(),
                    snapshot: snapshot.clone(),
                },
            );
        }
        snapshot
    }

    /// Drop a user's cached snapshot (after mutating commands, if desired).
    pub fn invalidate(&self, user: &UserId) {
        let _ = self.cache.remove(user);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use taskpilot_domain::testutil::InMemoryDirectory;

    fn alice() -> Actor {
        Actor::new("user_alice", "Alice")
    }

    struct CountingProvider {
        calls: AtomicU32,
    }

    #[async_trait]
    impl ContextProvider for CountingProvider {
        fn title(&self) -> &str {
            "Counting"
        }

        async fn render(&self, _actor: &Actor) -> Result<String, DomainError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("call {n}"))
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl ContextProvider for FailingProvider {
        fn title(&self) -> &str {
            "Broken"
        }

        async fn render(&self, _actor: &Actor) -> Result<String, DomainError> {
            Err(DomainError::Storage("down".into()))
        }
    }

    #[tokio::test]
    async fn provider_failure_skips_only_its_section() {
        let resolver = ContextResolver::new(
            vec![Arc::new(FailingProvider), Arc::new(StatusVocabularyProvider)],
            Duration::ZERO,
        );
        let snapshot = resolver.resolve(&alice()).await;

        assert_eq!(snapshot.sections.len(), 1);
        assert_eq!(snapshot.sections[0].title, "Task statuses");
        assert!(snapshot.sections[0].body.contains("In Progress"));
    }

    #[tokio::test]
    async fn fresh_snapshot_is_served_from_cache() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicU32::new(0),
        });
        let resolver = ContextResolver::new(vec![provider.clone()], Duration::from_secs(300));

        let first = resolver.resolve(&alice()).await;
        let second = resolver.resolve(&alice()).await;

        assert_eq!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_rebuild() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicU32::new(0),
        });
        let resolver = ContextResolver::new(vec![provider.clone()], Duration::from_secs(300));

        let _ = resolver.resolve(&alice()).await;
        resolver.invalidate(&alice().id);
        let _ = resolver.resolve(&alice()).await;

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn standard_chain_renders_projects() {
        let dir = Arc::new(InMemoryDirectory::new().with_actor(alice()));
        let _ = dir.seed_project(&alice().id, "Marketing");
        let services = Services::from_single(dir);
        let resolver = ContextResolver::standard(&services, Duration::ZERO);

        let snapshot = resolver.resolve(&alice()).await;
        let rendered = snapshot.render();
        assert!(rendered.contains("## Your projects"));
        assert!(rendered.contains("Marketing"));
        assert!(rendered.contains("## Task statuses"));
    }
}
