//! The intentgate engine: the composition root every tool call passes
//! through.
//!
//! The host process constructs one `HookEngine` per session and calls
//! `execute_pre_hooks` before and `execute_post_hooks` after each tool
//! invocation, awaiting each to completion before the next call. The pre
//! boundary is fail-closed (any error blocks the call); the post boundary
//! is fail-open (audit failures are logged, never surfaced).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{info, warn};

pub mod context;
pub mod post_tool;
pub mod pre_tool;
pub mod state_machine;

pub use context::{HookContext, HookVerdict, ToolCall, ToolInput, ToolVocabulary};
pub use post_tool::PostToolUseHook;
pub use pre_tool::PreToolUseHook;
pub use state_machine::{OrchestrationState, StateMachine};

use crate::intent::IntentStore;
use crate::io::{OrchestrationPaths, PathUtils};
use crate::policy::{ConstraintValidator, SemanticAnalyzer};
use crate::trace::{KnowledgeFile, SpatialMap, TraceLedger};
use crate::vcs::GitProvider;
use crate::Result;

/// Shared mutable state every hook operates on
pub struct EngineCore {
    pub(crate) workspace_root: PathBuf,
    pub(crate) vocab: ToolVocabulary,
    pub(crate) state: StateMachine,
    pub(crate) intents: IntentStore,
    pub(crate) constraints: ConstraintValidator,
    pub(crate) analyzer: SemanticAnalyzer,
    /// Pre-mutation content keyed by tool-supplied path; `None` marks a
    /// file that did not exist before the call
    pub(crate) snapshots: HashMap<String, Option<String>>,
    pub(crate) ledger: TraceLedger,
    pub(crate) spatial: SpatialMap,
    pub(crate) git: GitProvider,
    pub(crate) knowledge: KnowledgeFile,
    pub(crate) session_id: Option<String>,
    pub(crate) model_id: Option<String>,
}

impl EngineCore {
    /// Resolve a tool-supplied path against the workspace root
    pub(crate) fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.workspace_root.join(p)
        }
    }

    /// Build the per-call context handed to every hook
    fn context_for(&self, call: &ToolCall) -> HookContext {
        HookContext {
            tool_name: call.name.clone(),
            input: ToolInput::from_args(&call.name, &call.args, &self.vocab),
            args: call.args.clone(),
            intent_id: self.intents.selected_intent_id().map(str::to_string),
            timestamp: call.timestamp,
            session_id: self.session_id.clone(),
            model_id: self.model_id.clone(),
        }
    }
}

/// Normalizes path-separator style in file arguments so scope matching
/// behaves identically on every platform
#[derive(Debug, Default)]
pub struct PathNormalizer;

impl PathNormalizer {
    /// Returns replacement args when any path key needed rewriting
    fn intercept(&self, call: &ToolCall) -> Option<Value> {
        let obj = call.args.as_object()?;
        let needs_fix = ["path", "file_path", "filePath"].iter().any(|k| {
            obj.get(*k)
                .and_then(|v| v.as_str())
                .map(|s| s.contains('\\'))
                .unwrap_or(false)
        });
        if !needs_fix {
            return None;
        }

        let mut fixed = obj.clone();
        for key in ["path", "file_path", "filePath"] {
            if let Some(s) = fixed.get(key).and_then(|v| v.as_str()) {
                let normalized = PathUtils::normalize_separators(s);
                fixed.insert(key.to_string(), Value::String(normalized));
            }
        }
        Some(Value::Object(fixed))
    }
}

/// Interceptors run ahead of the pre hooks and may rewrite arguments
pub enum InterceptorImpl {
    PathNormalizer(PathNormalizer),
}

impl InterceptorImpl {
    fn intercept(&self, call: &ToolCall) -> Option<Value> {
        match self {
            InterceptorImpl::PathNormalizer(i) => i.intercept(call),
        }
    }
}

/// Registered pre hooks (enum wrapper for async dispatch)
pub enum PreHookImpl {
    IntentGate(PreToolUseHook),
}

impl PreHookImpl {
    async fn execute(
        &self,
        call: &ToolCall,
        ctx: &HookContext,
        core: &mut EngineCore,
    ) -> Result<HookVerdict> {
        match self {
            PreHookImpl::IntentGate(h) => h.execute(call, ctx, core).await,
        }
    }
}

/// Registered post hooks
pub enum PostHookImpl {
    Tracer(PostToolUseHook),
}

impl PostHookImpl {
    async fn execute(
        &self,
        call: &ToolCall,
        ctx: &HookContext,
        core: &mut EngineCore,
    ) -> Result<HookVerdict> {
        match self {
            PostHookImpl::Tracer(h) => h.execute(call, ctx, core).await,
        }
    }
}

/// The engine owning all orchestration state and the hook registries.
/// Construct one per session and pass it by reference; there is no global
/// instance.
pub struct HookEngine {
    core: EngineCore,
    interceptors: Vec<InterceptorImpl>,
    pre_hooks: Vec<PreHookImpl>,
    post_hooks: Vec<PostHookImpl>,
}

impl HookEngine {
    /// Create an engine for the given workspace. The intent spec is loaded
    /// when present; a missing or invalid spec leaves the store unloaded,
    /// which blocks any mutation until `reload_intents` succeeds.
    pub async fn new(workspace_root: impl AsRef<Path>) -> Result<Self> {
        let workspace_root = workspace_root.as_ref().to_path_buf();
        let paths = OrchestrationPaths::for_workspace(&workspace_root);
        paths.ensure_directories()?;

        let mut intents = IntentStore::new(paths.active_intents_file());
        if let Err(e) = intents.load().await {
            warn!("Intent spec not loaded: {}", e);
        }

        let mut ledger = TraceLedger::new(paths.trace_ledger_file());
        ledger.load().await?;

        let mut spatial =
            SpatialMap::new(paths.spatial_map_file()).with_markdown_mirror(paths.intent_map_file());
        spatial.load().await?;

        info!(
            "Hook engine ready for {} ({} trace records, {} map entries)",
            workspace_root.display(),
            ledger.len(),
            spatial.len()
        );

        Ok(Self {
            core: EngineCore {
                git: GitProvider::new(&workspace_root),
                knowledge: KnowledgeFile::new(paths.knowledge_file()),
                workspace_root,
                vocab: ToolVocabulary::default(),
                state: StateMachine::new(),
                intents,
                constraints: ConstraintValidator::new(),
                analyzer: SemanticAnalyzer::new(),
                snapshots: HashMap::new(),
                ledger,
                spatial,
                session_id: None,
                model_id: None,
            },
            interceptors: vec![InterceptorImpl::PathNormalizer(PathNormalizer)],
            pre_hooks: vec![PreHookImpl::IntentGate(PreToolUseHook::new())],
            post_hooks: vec![PostHookImpl::Tracer(PostToolUseHook::new())],
        })
    }

    /// Attach session/model identifiers recorded in trace records
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.core.session_id = Some(session_id.into());
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.core.model_id = Some(model_id.into());
        self
    }

    /// Replace the default tool vocabulary
    pub fn with_vocabulary(mut self, vocab: ToolVocabulary) -> Self {
        self.core.vocab = vocab;
        self
    }

    pub fn register_interceptor(&mut self, interceptor: InterceptorImpl) {
        self.interceptors.push(interceptor);
    }

    pub fn register_pre_hook(&mut self, hook: PreHookImpl) {
        self.pre_hooks.push(hook);
    }

    pub fn register_post_hook(&mut self, hook: PostHookImpl) {
        self.post_hooks.push(hook);
    }

    /// Gate one tool call before it executes. Fail-closed: every error at
    /// this boundary becomes a `Block` carrying the error text.
    pub async fn execute_pre_hooks(&mut self, call: &ToolCall) -> HookVerdict {
        let mut effective = call.clone();
        let mut modified = false;

        for interceptor in &self.interceptors {
            if let Some(args) = interceptor.intercept(&effective) {
                effective.args = args;
                modified = true;
            }
        }

        let ctx = self.core.context_for(&effective);
        for hook in &self.pre_hooks {
            match hook.execute(&effective, &ctx, &mut self.core).await {
                Ok(HookVerdict::Allow) => {}
                Ok(HookVerdict::Inject { context, args }) => {
                    // Interceptor rewrites ride along with the injection so
                    // the host executes the same args the hooks saw
                    let args = args.or_else(|| modified.then(|| effective.args.clone()));
                    return HookVerdict::Inject { context, args };
                }
                Ok(verdict) => return verdict,
                Err(e) => {
                    warn!("Pre hook error for '{}': {}", call.name, e);
                    return HookVerdict::Block {
                        reason: e.to_string(),
                    };
                }
            }
        }

        if modified {
            HookVerdict::Modify {
                args: effective.args,
            }
        } else {
            HookVerdict::Allow
        }
    }

    /// Record one completed tool call. Fail-open: errors are logged and
    /// the verdict is always `Allow` — audit failures never retroactively
    /// fail an executed call.
    pub async fn execute_post_hooks(&mut self, call: &ToolCall, _result: &Value) -> HookVerdict {
        // The same interceptors run here so the post hooks key snapshots
        // and trace paths identically to the pre pass, even when the host
        // hands back the unmodified call
        let mut effective = call.clone();
        for interceptor in &self.interceptors {
            if let Some(args) = interceptor.intercept(&effective) {
                effective.args = args;
            }
        }

        let ctx = self.core.context_for(&effective);
        for hook in &self.post_hooks {
            match hook.execute(&effective, &ctx, &mut self.core).await {
                Ok(verdict) => {
                    if !verdict.should_proceed() {
                        warn!(
                            "Post hook asked to block '{}' ({:?}); post hooks are observability \
                             only, continuing",
                            call.name, verdict
                        );
                    }
                }
                Err(e) => warn!("Post hook error for '{}': {}", call.name, e),
            }
        }
        HookVerdict::Allow
    }

    /// Return the session to `Idle` with no selection
    pub fn reset(&mut self) {
        self.core.state.reset();
        self.core.intents.clear_selection();
        self.core.snapshots.clear();
    }

    pub fn state(&self) -> OrchestrationState {
        self.core.state.state()
    }

    pub fn selected_intent_id(&self) -> Option<&str> {
        self.core.intents.selected_intent_id()
    }

    pub fn intents(&self) -> &IntentStore {
        &self.core.intents
    }

    /// Re-read the intent spec from disk
    pub async fn reload_intents(&mut self) -> Result<()> {
        self.core.intents.reload().await
    }

    pub fn ledger(&self) -> &TraceLedger {
        &self.core.ledger
    }

    pub fn spatial_map(&self) -> &SpatialMap {
        &self.core.spatial
    }

    pub fn knowledge(&self) -> &KnowledgeFile {
        &self.core.knowledge
    }
}
