//! Inspector orchestrator
//!
//! The stateful façade behind `run`. Owns the session and the element
//! cache; both are mutated only from within `run` and the fetch helpers and
//! torn down atomically. There is no internal locking across awaits — the
//! model relies on one logical flow per call, with concurrent callers
//! serialized at the call site.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::inspector::cache::{CachedElement, ElementCache};
use crate::inspector::types::{
    AppMode, ElementMeta, FetchedElement, FetchedElements, RunRequest, RunResult,
};
use crate::inspector::{context, gestures};
use crate::session::Session;
use crate::{Error, Result};

/// The session-teardown command name
const TEARDOWN_METHOD: &str = "deleteSession";

/// The page-source command name, absorbed into the refresh step
const SOURCE_METHOD: &str = "getPageSource";

/// Default settle delay before the refresh probes
const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Stateful inspection façade over one live session
#[derive(Debug)]
pub struct Inspector {
    session: Arc<Session>,
    cache: RwLock<ElementCache>,
    fetch_generation: AtomicU64,
    closed: AtomicBool,
    settle_delay: Duration,
}

impl Inspector {
    /// Create an inspector over an established session
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            cache: RwLock::new(ElementCache::new()),
            fetch_generation: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Override the settle delay applied before the refresh probes
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// The owned session
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Whether the session-teardown path has run
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of cached elements
    pub fn cached_count(&self) -> usize {
        self.cache.read().expect("cache lock").len()
    }

    /// Metadata of a cached element, if present
    pub fn cached_element(&self, id: &str) -> Option<ElementMeta> {
        self.cache
            .read()
            .expect("cache lock")
            .get(id)
            .map(|c| c.meta())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::session_closed(self.session.id()));
        }
        Ok(())
    }

    /// Execute one logical client-method call
    pub async fn run(&self, request: RunRequest) -> Result<RunResult> {
        if request.method.as_deref() == Some(TEARDOWN_METHOD) {
            return self.teardown().await;
        }

        let mut result = RunResult::default();

        if let Some(method) = request.method.as_deref() {
            if let Some(element_id) = request.element_id.as_deref() {
                // An identifier is only ever supplied after a successful
                // fetch; a miss here is a caller bug, not a remote issue.
                let cached = self
                    .cache
                    .read()
                    .expect("cache lock")
                    .get(element_id)
                    .cloned()
                    .ok_or_else(|| Error::element_not_cached(element_id))?;
                self.ensure_open()?;

                result.element = Some(cached.meta());
                result.command_result =
                    Some(cached.element.execute(method, &request.args).await?);
            } else if gestures::is_gesture(method) {
                self.ensure_open()?;
                let actions = gestures::build(method, &request.args)?;
                result.command_result = Some(self.session.perform_actions(actions).await?);
            } else if method == SOURCE_METHOD {
                // The refresh step fetches the source; issuing it here too
                // would hit the remote twice.
            } else {
                self.ensure_open()?;
                result.command_result =
                    Some(self.session.execute(method, &request.args).await?);
            }
        } else if let (Some(strategy), Some(selector)) =
            (request.strategy.as_deref(), request.selector.as_deref())
        {
            if request.fetch_multiple {
                let fetched = self.fetch_elements(strategy, selector).await?;
                result.command_result = Some(serde_json::to_value(&fetched)?);
            } else {
                let fetched = self.fetch_element(strategy, selector).await?;
                if let Some(id) = &fetched.id {
                    result.element = self.cached_element(id);
                }
                result.command_result = Some(serde_json::to_value(&fetched)?);
            }
        }

        if !request.skip_refresh && !self.is_closed() {
            self.refresh(&request, &mut result).await;
        }

        Ok(result)
    }

    /// Best-effort teardown; the remote delete may fail, the reset may not
    async fn teardown(&self) -> Result<RunResult> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            info!("Deleting session {}", self.session.id());
            if let Err(err) = self.session.delete().await {
                warn!("session delete failed, discarding state anyway: {}", err);
            }
        }
        self.cache.write().expect("cache lock").clear();

        // Terminal result: same shape, null source/screenshot/window.
        Ok(RunResult::default())
    }

    /// Timed single-element search
    ///
    /// A miss is an expected outcome of exploratory searching and yields the
    /// empty result. A fetch superseded by a newer one is never committed to
    /// the cache and also yields the empty result.
    pub async fn fetch_element(&self, strategy: &str, selector: &str) -> Result<FetchedElement> {
        self.ensure_open()?;
        let generation = self.fetch_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let started = Instant::now();

        match self.session.find_element(strategy, selector).await {
            Ok(element) => {
                let elapsed = started.elapsed().as_millis() as u64;
                if self.fetch_generation.load(Ordering::SeqCst) != generation {
                    debug!("discarding superseded fetch for {}={}", strategy, selector);
                    return Ok(FetchedElement::empty());
                }

                let id = element.id().as_str().to_string();
                self.cache.write().expect("cache lock").insert_if_absent(CachedElement {
                    element,
                    variable_name: None,
                    variable_index: None,
                    strategy: strategy.to_string(),
                    selector: selector.to_string(),
                });

                Ok(FetchedElement {
                    id: Some(id),
                    execution_time_ms: Some(elapsed),
                })
            }
            Err(err) if err.is_miss() => Ok(FetchedElement::empty()),
            Err(err) => Err(err),
        }
    }

    /// Timed all-elements search
    ///
    /// An empty list is already the correct no-matches representation, so a
    /// failing list search indicates a genuine protocol problem and the
    /// error propagates.
    pub async fn fetch_elements(&self, strategy: &str, selector: &str) -> Result<FetchedElements> {
        self.ensure_open()?;
        let generation = self.fetch_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let started = Instant::now();

        let elements = self.session.find_elements(strategy, selector).await?;
        let elapsed = started.elapsed().as_millis() as u64;

        if self.fetch_generation.load(Ordering::SeqCst) != generation {
            debug!("discarding superseded fetch for {}={}", strategy, selector);
            return Ok(FetchedElements {
                ids: Vec::new(),
                variable_name: None,
                execution_time_ms: elapsed,
            });
        }

        let mut cache = self.cache.write().expect("cache lock");
        let group = cache.next_group_name();
        let mut ids = Vec::with_capacity(elements.len());
        for (index, element) in elements.into_iter().enumerate() {
            ids.push(element.id().as_str().to_string());
            cache.insert_if_absent(CachedElement {
                element,
                variable_name: Some(group.clone()),
                variable_index: Some(index),
                strategy: strategy.to_string(),
                selector: selector.to_string(),
            });
        }

        Ok(FetchedElements {
            ids,
            variable_name: Some(group),
            execution_time_ms: elapsed,
        })
    }

    /// The post-call refresh sequence
    ///
    /// Four independent steps; a failure in one is captured per-field and
    /// never aborts the siblings.
    async fn refresh(&self, request: &RunRequest, result: &mut RunResult) {
        // Let the remote UI finish reacting before probing.
        tokio::time::sleep(self.settle_delay).await;

        if !request.skip_screenshot {
            match self.session.take_screenshot().await {
                Ok(payload) => {
                    let cleaned: String =
                        payload.chars().filter(|c| !c.is_whitespace()).collect();
                    match BASE64.decode(cleaned.as_bytes()) {
                        Ok(_) => result.screenshot = Some(cleaned),
                        Err(err) => {
                            result.screenshot_error =
                                Some(format!("screenshot payload was not base64: {}", err));
                        }
                    }
                }
                Err(err) => result.screenshot_error = Some(err.to_string()),
            }
        }

        match self.session.window_rect().await {
            Ok(rect) => result.window_rect = Some(rect),
            Err(err) => result.window_error = Some(err.to_string()),
        }

        if request.app_mode == AppMode::Hybrid {
            result.context = Some(context::reconcile(&self.session).await);
        }

        match self.session.page_source().await {
            Ok(source) => result.source = Some(source),
            Err(err) => result.source_error = Some(err.to_string()),
        }
    }
}
