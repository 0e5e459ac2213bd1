//! In-memory GitHub used by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use shipwright::config::Config;
use shipwright::context::{Context, GitInfo};
use shipwright::error::ApiError;
use shipwright::github::{
    Commit, CommitDetail, FileContent, FileOptions, GitHubApi, ListOptions, Milestone, Page,
    Release, ReleaseRequest, RepositoryInfo, Response, User,
};
use shipwright::{GitHubClient, Repo};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

/// Recorded file write
#[derive(Debug, Clone)]
pub struct FileWrite {
    pub op: &'static str,
    pub path: String,
    pub options: FileOptions,
}

/// Mutable fake state; tests seed it and inspect it afterwards
#[derive(Debug)]
pub struct State {
    /// Releases, newest first
    pub releases: Vec<Release>,
    pub next_id: u64,
    /// Overrides the requested `per_page` on every listing
    pub page_size: Option<u32>,
    pub calls: Vec<String>,
    pub get_release_error: Option<ApiError>,
    pub upload_failures: VecDeque<ApiError>,
    pub uploads: Vec<(u64, String, usize)>,
    pub commits: Vec<Commit>,
    pub generated_notes: String,
    pub milestones: Vec<Milestone>,
    pub edited_milestones: Vec<Milestone>,
    pub default_branch: Result<String, ApiError>,
    /// path -> blob sha
    pub files: HashMap<String, String>,
    pub file_writes: Vec<FileWrite>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            releases: Vec::new(),
            next_id: 100,
            page_size: None,
            calls: Vec::new(),
            get_release_error: None,
            upload_failures: VecDeque::new(),
            uploads: Vec::new(),
            commits: Vec::new(),
            generated_notes: String::new(),
            milestones: Vec::new(),
            edited_milestones: Vec::new(),
            default_branch: Ok("main".to_string()),
            files: HashMap::new(),
            file_writes: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeGitHub {
    state: Mutex<State>,
}

impl FakeGitHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("fake state lock")
    }

    /// Names of the calls made so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.state().calls.iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: &str) -> MutexGuard<'_, State> {
        let mut state = self.state();
        state.calls.push(call.to_string());
        state
    }
}

fn paginate<T: Clone>(items: &[T], opts: ListOptions, page_size: Option<u32>) -> Page<T> {
    let per_page = page_size.unwrap_or(opts.per_page).max(1) as usize;
    let page = opts.page.unwrap_or(1).max(1) as usize;
    let start = (page - 1) * per_page;
    let end = (start + per_page).min(items.len());
    let slice = if start < items.len() {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };
    Page {
        items: slice,
        next_page: (end < items.len()).then(|| page as u32 + 1),
    }
}

fn not_found() -> ApiError {
    ApiError::status(404, "Not Found")
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn get_release_by_tag(&self, _repo: &Repo, tag: &str) -> Result<Release, ApiError> {
        let state = self.record("get_release_by_tag");
        if let Some(err) = &state.get_release_error {
            return Err(err.clone());
        }
        state
            .releases
            .iter()
            .find(|r| r.tag_name == tag && !r.draft)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_release(
        &self,
        _repo: &Repo,
        release: &ReleaseRequest,
    ) -> Result<Response<Release>, ApiError> {
        let mut state = self.record("create_release");
        let id = state.next_id;
        state.next_id += 1;
        let created = Release {
            id,
            name: Some(release.name.clone()),
            tag_name: release.tag_name.clone(),
            body: Some(release.body.clone()),
            draft: release.draft,
            prerelease: release.prerelease,
            target_commitish: release.target_commitish.clone(),
            discussion_category_name: release.discussion_category_name.clone(),
            html_url: None,
        };
        state.releases.insert(0, created.clone());
        Ok(Response {
            body: created,
            request_id: Some(format!("req-{id}")),
        })
    }

    async fn edit_release(
        &self,
        _repo: &Repo,
        id: u64,
        release: &ReleaseRequest,
    ) -> Result<Response<Release>, ApiError> {
        let mut state = self.record("edit_release");
        let existing = state
            .releases
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(not_found)?;
        existing.name = Some(release.name.clone());
        existing.body = Some(release.body.clone());
        existing.draft = release.draft;
        existing.prerelease = release.prerelease;
        Ok(Response {
            body: existing.clone(),
            request_id: None,
        })
    }

    async fn delete_release(&self, _repo: &Repo, id: u64) -> Result<(), ApiError> {
        let mut state = self.record("delete_release");
        let before = state.releases.len();
        state.releases.retain(|r| r.id != id);
        if state.releases.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn list_releases(
        &self,
        _repo: &Repo,
        opts: ListOptions,
    ) -> Result<Page<Release>, ApiError> {
        let state = self.record("list_releases");
        Ok(paginate(&state.releases, opts, state.page_size))
    }

    async fn upload_release_asset(
        &self,
        _repo: &Repo,
        release_id: u64,
        name: &str,
        content: Bytes,
    ) -> Result<(), ApiError> {
        let mut state = self.record("upload_release_asset");
        if let Some(err) = state.upload_failures.pop_front() {
            return Err(err);
        }
        state.uploads.push((release_id, name.to_string(), content.len()));
        Ok(())
    }

    async fn compare_commits(
        &self,
        _repo: &Repo,
        _base: &str,
        _head: &str,
        opts: ListOptions,
    ) -> Result<Page<Commit>, ApiError> {
        let state = self.record("compare_commits");
        Ok(paginate(&state.commits, opts, state.page_size))
    }

    async fn generate_release_notes(
        &self,
        _repo: &Repo,
        _tag: &str,
        _previous_tag: &str,
    ) -> Result<String, ApiError> {
        let state = self.record("generate_release_notes");
        Ok(state.generated_notes.clone())
    }

    async fn get_repository(&self, _repo: &Repo) -> Result<RepositoryInfo, ApiError> {
        let state = self.record("get_repository");
        state
            .default_branch
            .clone()
            .map(|default_branch| RepositoryInfo { default_branch })
    }

    async fn list_milestones(
        &self,
        _repo: &Repo,
        opts: ListOptions,
    ) -> Result<Page<Milestone>, ApiError> {
        let state = self.record("list_milestones");
        Ok(paginate(&state.milestones, opts, state.page_size))
    }

    async fn edit_milestone(&self, _repo: &Repo, milestone: &Milestone) -> Result<(), ApiError> {
        let mut state = self.record("edit_milestone");
        state.edited_milestones.push(milestone.clone());
        Ok(())
    }

    async fn get_contents(
        &self,
        _repo: &Repo,
        path: &str,
        _branch: Option<&str>,
    ) -> Result<FileContent, ApiError> {
        let state = self.record("get_contents");
        state
            .files
            .get(path)
            .map(|sha| FileContent { sha: sha.clone() })
            .ok_or_else(not_found)
    }

    async fn create_file(
        &self,
        _repo: &Repo,
        path: &str,
        opts: &FileOptions,
    ) -> Result<(), ApiError> {
        let mut state = self.record("create_file");
        state.files.insert(path.to_string(), "sha-created".to_string());
        state.file_writes.push(FileWrite {
            op: "create",
            path: path.to_string(),
            options: opts.clone(),
        });
        Ok(())
    }

    async fn update_file(
        &self,
        _repo: &Repo,
        path: &str,
        opts: &FileOptions,
    ) -> Result<(), ApiError> {
        let mut state = self.record("update_file");
        state.file_writes.push(FileWrite {
            op: "update",
            path: path.to_string(),
            options: opts.clone(),
        });
        Ok(())
    }
}

pub fn client(fake: &Arc<FakeGitHub>) -> GitHubClient {
    GitHubClient::new(fake.clone())
}

pub const BASE_CONFIG: &str = r#"
project_name = "widgets"

[release.github]
owner = "acme"
name = "widgets"
"#;

/// Context for `tag` with `extra` appended to [`BASE_CONFIG`]
pub fn context(tag: &str, extra: &str) -> Context {
    let config = Config::parse(&format!("{BASE_CONFIG}\n{extra}")).expect("valid test config");
    let git = GitInfo {
        current_tag: tag.to_string(),
        previous_tag: None,
        commit: "0123456789abcdef0123456789abcdef01234567".to_string(),
    };
    Context::new(config, git)
}

pub fn release(id: u64, tag: &str, name: &str, draft: bool) -> Release {
    Release {
        id,
        name: Some(name.to_string()),
        tag_name: tag.to_string(),
        body: None,
        draft,
        ..Release::default()
    }
}

pub fn commit(sha: &str, message: &str, login: Option<&str>) -> Commit {
    Commit {
        sha: sha.to_string(),
        commit: CommitDetail {
            message: message.to_string(),
        },
        author: login.map(|login| User {
            login: login.to_string(),
        }),
    }
}

pub fn milestone(number: u64, title: &str) -> Milestone {
    Milestone {
        number,
        title: title.to_string(),
        state: "open".to_string(),
    }
}
