//! In-memory stand-ins for git and hew's state directory.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use hew_git::{
    BranchTracking, CommitInfo, CommitRef, DiffStatusEntry, EditorKind, EngineOutcome, GitOps,
    HookEnv, Oid, SessionMarker,
};

use crate::config::Config;
use crate::error::Result;
use crate::state::SessionRecord;
use crate::traits::SessionStore;

pub fn oid(n: u8) -> Oid {
    Oid::from_bytes(&[n; 20]).unwrap()
}

type EngineStep = (hew_git::Result<EngineOutcome>, Option<SessionMarker>);

pub struct MockGit {
    git_dir: PathBuf,
    workdir: Option<PathBuf>,
    commits: HashMap<Oid, CommitInfo>,
    refs: HashMap<String, Oid>,
    head: Option<CommitRef>,
    tracking: HashMap<String, BranchTracking>,
    reflogs: HashMap<String, Vec<Oid>>,
    ancestry: HashSet<(Oid, Oid)>,
    diffs: HashMap<(Oid, Option<Oid>), Vec<DiffStatusEntry>>,
    clean: bool,
    staged: bool,
    conflicts: Vec<String>,
    marker: RefCell<Option<SessionMarker>>,
    outcomes: RefCell<VecDeque<EngineStep>>,
    calls: RefCell<Vec<String>>,
    hooks: RefCell<Option<HookEnv>>,
    pub amended: RefCell<Vec<(String, Vec<String>)>>,
}

impl MockGit {
    pub fn new() -> Self {
        Self {
            git_dir: PathBuf::from("/mock/.git"),
            workdir: None,
            commits: HashMap::new(),
            refs: HashMap::new(),
            head: None,
            tracking: HashMap::new(),
            reflogs: HashMap::new(),
            ancestry: HashSet::new(),
            diffs: HashMap::new(),
            clean: true,
            staged: false,
            conflicts: Vec::new(),
            marker: RefCell::new(None),
            outcomes: RefCell::new(VecDeque::new()),
            calls: RefCell::new(Vec::new()),
            hooks: RefCell::new(None),
            amended: RefCell::new(Vec::new()),
        }
    }

    pub fn with_commit(mut self, n: u8, parents: &[u8], summary: &str) -> Self {
        let id = oid(n);
        self.commits.insert(
            id,
            CommitInfo {
                id,
                parents: parents.iter().map(|p| oid(*p)).collect(),
                summary: summary.to_string(),
                message: format!("{summary}\n"),
            },
        );
        self
    }

    pub fn with_ref(mut self, name: &str, id: Oid) -> Self {
        self.refs.insert(name.to_string(), id);
        self
    }

    pub fn with_head(mut self, name: &str, id: Oid) -> Self {
        self.refs.insert(name.to_string(), id);
        self.head = Some(CommitRef::new(id, Some(name.to_string())));
        self
    }

    pub fn with_tracking(mut self, branch: &str, tracking: BranchTracking) -> Self {
        self.tracking.insert(branch.to_string(), tracking);
        self
    }

    pub fn with_reflog(mut self, name: &str, entries: Vec<Oid>) -> Self {
        self.reflogs.insert(name.to_string(), entries);
        self
    }

    /// Extra `(ancestor, descendant)` pairs beyond what commit parents imply.
    pub fn with_ancestry(mut self, pairs: &[(u8, u8)]) -> Self {
        self.ancestry
            .extend(pairs.iter().map(|(a, d)| (oid(*a), oid(*d))));
        self
    }

    pub fn with_diff(mut self, from: Oid, to: Option<Oid>, entries: Vec<DiffStatusEntry>) -> Self {
        self.diffs.insert((from, to), entries);
        self
    }

    pub fn with_workdir(mut self, dir: &Path) -> Self {
        self.workdir = Some(dir.to_path_buf());
        self
    }

    pub const fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    pub const fn with_staged_changes(mut self, staged: bool) -> Self {
        self.staged = staged;
        self
    }

    pub fn with_conflicts(mut self, files: &[&str]) -> Self {
        self.conflicts = files.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_marker(self, marker: SessionMarker) -> Self {
        *self.marker.borrow_mut() = Some(marker);
        self
    }

    /// Queue the result of the next engine run and the marker it leaves.
    pub fn with_outcome(self, outcome: EngineOutcome, marker: Option<SessionMarker>) -> Self {
        self.outcomes.borrow_mut().push_back((Ok(outcome), marker));
        self
    }

    pub fn with_error(self, error: hew_git::Error, marker: Option<SessionMarker>) -> Self {
        self.outcomes.borrow_mut().push_back((Err(error), marker));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn last_hooks(&self) -> Option<HookEnv> {
        self.hooks.borrow().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    fn run_engine(&self, hooks: &HookEnv) -> hew_git::Result<EngineOutcome> {
        *self.hooks.borrow_mut() = Some(hooks.clone());
        let (outcome, marker) = self
            .outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or((Ok(EngineOutcome::Completed), None));
        *self.marker.borrow_mut() = marker;
        outcome
    }

    /// `id` and everything reachable from it through recorded parents.
    fn reachable(&self, id: Oid) -> Vec<Oid> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            order.push(current);
            if let Some(info) = self.commits.get(&current) {
                queue.extend(info.parents.iter().copied());
            }
        }
        order
    }
}

impl GitOps for MockGit {
    fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    fn comment_char(&self) -> hew_git::Result<String> {
        Ok("#".into())
    }

    fn operator_editor(&self, kind: EditorKind) -> hew_git::Result<String> {
        Ok(match kind {
            EditorKind::Message => "vi".into(),
            EditorKind::Sequence => "vi -c 'set ft=gitrebase'".into(),
        })
    }

    fn resolve(&self, spec: &str) -> hew_git::Result<CommitRef> {
        if spec == "HEAD" {
            return self.head();
        }
        for name in [
            spec.to_string(),
            format!("refs/heads/{spec}"),
            format!("refs/remotes/{spec}"),
        ] {
            if let Some(id) = self.refs.get(&name) {
                return Ok(CommitRef::new(*id, Some(name)));
            }
        }
        if spec.len() == 40 {
            if let Ok(id) = Oid::from_str(spec) {
                return Ok(CommitRef::detached(id));
            }
        }
        Err(hew_git::Error::RefNotFound(spec.to_string()))
    }

    fn head(&self) -> hew_git::Result<CommitRef> {
        self.head
            .clone()
            .ok_or_else(|| hew_git::Error::RefNotFound("HEAD".into()))
    }

    fn commit_info(&self, id: Oid) -> hew_git::Result<CommitInfo> {
        self.commits
            .get(&id)
            .cloned()
            .ok_or_else(|| hew_git::Error::RefNotFound(id.to_string()))
    }

    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> hew_git::Result<bool> {
        Ok(self.ancestry.contains(&(ancestor, descendant))
            || self.reachable(descendant).contains(&ancestor))
    }

    fn merge_base(&self, one: Oid, two: Oid) -> hew_git::Result<Oid> {
        let ours: HashSet<Oid> = self.reachable(one).into_iter().collect();
        self.reachable(two)
            .into_iter()
            .find(|id| ours.contains(id))
            .ok_or(hew_git::Error::NoMergeBase(one, two))
    }

    fn branch_tracking(&self, branch: &str) -> hew_git::Result<BranchTracking> {
        Ok(self.tracking.get(branch).cloned().unwrap_or_default())
    }

    fn reflog(&self, refname: &str) -> hew_git::Result<Vec<Oid>> {
        Ok(self.reflogs.get(refname).cloned().unwrap_or_default())
    }

    fn is_clean(&self) -> hew_git::Result<bool> {
        Ok(self.clean)
    }

    fn has_staged_changes(&self) -> hew_git::Result<bool> {
        Ok(self.staged)
    }

    fn conflicting_files(&self) -> hew_git::Result<Vec<String>> {
        Ok(self.conflicts.clone())
    }

    fn stage_tracked(&self) -> hew_git::Result<()> {
        self.record("stage_tracked");
        Ok(())
    }

    fn diff_status(
        &self,
        from: Oid,
        to: Option<Oid>,
        pathspecs: &[String],
    ) -> hew_git::Result<Vec<DiffStatusEntry>> {
        let entries = self.diffs.get(&(from, to)).cloned().unwrap_or_default();
        Ok(entries
            .into_iter()
            .filter(|entry| pathspecs.is_empty() || pathspecs.contains(&entry.path))
            .collect())
    }

    fn rebase_interactive(&self, onto: Oid, hooks: &HookEnv) -> hew_git::Result<EngineOutcome> {
        self.record(format!("rebase_interactive {onto}"));
        self.run_engine(hooks)
    }

    fn rebase_continue(&self, hooks: &HookEnv) -> hew_git::Result<EngineOutcome> {
        self.record("rebase_continue");
        self.run_engine(hooks)
    }

    fn rebase_abort(&self) -> hew_git::Result<()> {
        self.record("rebase_abort");
        *self.marker.borrow_mut() = None;
        Ok(())
    }

    fn session_marker(&self) -> hew_git::Result<Option<SessionMarker>> {
        Ok(self.marker.borrow().clone())
    }

    fn amend_head(&self, _hooks: &HookEnv) -> hew_git::Result<Oid> {
        self.record("amend_head");
        Ok(oid(0xaa))
    }

    fn amend(&self, message: &str, paths: &[String]) -> hew_git::Result<Oid> {
        self.record("amend");
        self.amended
            .borrow_mut()
            .push((message.to_string(), paths.to_vec()));
        Ok(oid(0xab))
    }
}

pub struct MockStore {
    hew_dir: PathBuf,
    config: Config,
    pub session: RefCell<Option<SessionRecord>>,
    pub plan: RefCell<Option<String>>,
    pub last_plan: RefCell<Option<String>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            hew_dir: PathBuf::from("/mock/.git/hew"),
            config: Config::default(),
            session: RefCell::new(None),
            plan: RefCell::new(None),
            last_plan: RefCell::new(None),
        }
    }

    pub fn with_session(self, record: SessionRecord) -> Self {
        *self.session.borrow_mut() = Some(record);
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }
}

impl SessionStore for MockStore {
    fn hew_dir(&self) -> &Path {
        &self.hew_dir
    }

    fn load_config(&self) -> Result<Config> {
        Ok(self.config.clone())
    }

    fn load_session(&self) -> Result<Option<SessionRecord>> {
        Ok(self.session.borrow().clone())
    }

    fn save_session(&self, record: &SessionRecord) -> Result<()> {
        *self.session.borrow_mut() = Some(record.clone());
        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        *self.session.borrow_mut() = None;
        Ok(())
    }

    fn save_plan(&self, plan: &str) -> Result<PathBuf> {
        *self.plan.borrow_mut() = Some(plan.to_string());
        *self.last_plan.borrow_mut() = Some(plan.to_string());
        Ok(self.hew_dir.join("plan"))
    }

    fn clear_plan(&self) -> Result<()> {
        *self.plan.borrow_mut() = None;
        Ok(())
    }
}
