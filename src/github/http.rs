//! REST transport for the GitHub API over `reqwest`.

use super::Repo;
use super::api::{
    Commit, CommitAuthorInfo, FileContent, FileOptions, GitHubApi, ListOptions, Milestone, Page,
    Release, ReleaseRequest, RepositoryInfo, Response,
};
use crate::context::Context;
use crate::error::{ApiError, ReleaseError, Result};
use crate::template::Template;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, LINK};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const DEFAULT_API_URL: &str = "https://api.github.com/";
const DEFAULT_UPLOAD_URL: &str = "https://uploads.github.com/";
const REQUEST_ID_HEADER: &str = "x-github-request-id";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// GitHub REST client
pub struct HttpGitHubApi {
    client: Client,
    api_url: Url,
    upload_url: Url,
}

struct Meta {
    next_page: Option<u32>,
    request_id: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct CompareResponse {
    commits: Vec<Commit>,
}

#[derive(Deserialize)]
struct GeneratedNotes {
    body: String,
}

impl HttpGitHubApi {
    /// Create a client for the endpoints configured on the context
    pub fn new(ctx: &Context, token: &str) -> Result<Self> {
        let urls = &ctx.config.github_urls;
        let template = Template::new(ctx);
        let api_url = if urls.api.is_empty() {
            DEFAULT_API_URL.to_string()
        } else {
            template.apply(&urls.api)?
        };
        let upload_url = if urls.upload.is_empty() {
            DEFAULT_UPLOAD_URL.to_string()
        } else {
            template.apply(&urls.upload)?
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| ReleaseError::config(format!("invalid GitHub token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .user_agent(concat!("shipwright/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(urls.skip_tls_verify)
            .build()
            .map_err(|e| ReleaseError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: parse_base(&api_url)?,
            upload_url: parse_base(&upload_url)?,
        })
    }

    fn endpoint(&self, base: &Url, path: &str) -> std::result::Result<Url, ApiError> {
        base.join(path)
            .map_err(|e| ApiError::transport(format!("invalid endpoint {path}: {e}")))
    }

    fn request(
        &self,
        method: Method,
        path: &str,
    ) -> std::result::Result<RequestBuilder, ApiError> {
        Ok(self.client.request(method, self.endpoint(&self.api_url, path)?))
    }

    async fn send(
        &self,
        req: RequestBuilder,
    ) -> std::result::Result<(reqwest::Response, Meta), ApiError> {
        let response = req
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;

        let headers = response.headers();
        let meta = Meta {
            next_page: headers
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_next_page),
            request_id: headers
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        };

        let status = response.status();
        if status.is_success() {
            return Ok((response, meta));
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.message)
            .unwrap_or_else(|_| status_message(status, &text));
        Err(ApiError::status(status.as_u16(), message).with_request_id(meta.request_id))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> std::result::Result<(T, Meta), ApiError> {
        let (response, meta) = self.send(req).await?;
        let body = response
            .json::<T>()
            .await
            .map_err(|e| ApiError::transport(format!("invalid response body: {e}")))?;
        Ok((body, meta))
    }

    async fn send_empty(&self, req: RequestBuilder) -> std::result::Result<(), ApiError> {
        self.send(req).await.map(|_| ())
    }
}

fn parse_base(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)
        .map_err(|e| ReleaseError::config(format!("invalid GitHub URL '{raw}': {e}")))?;
    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }
    Ok(url)
}

fn status_message(status: StatusCode, text: &str) -> String {
    if text.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        text.to_string()
    }
}

fn list_query(opts: ListOptions) -> Vec<(&'static str, String)> {
    let mut query = vec![("per_page", opts.per_page.to_string())];
    if let Some(page) = opts.page {
        query.push(("page", page.to_string()));
    }
    query
}

/// Extract the page number of the `rel="next"` entry of a `Link` header
pub fn parse_next_page(link: &str) -> Option<u32> {
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        if !params.split(';').any(|p| p.trim() == r#"rel="next""#) {
            return None;
        }
        let target = target.trim().trim_start_matches('<').trim_end_matches('>');
        let url = Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse().ok())
    })
}

#[derive(Serialize)]
struct FilePayload<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    committer: &'a CommitAuthorInfo,
}

impl<'a> FilePayload<'a> {
    fn new(opts: &'a FileOptions) -> Self {
        Self {
            message: &opts.message,
            content: BASE64.encode(&opts.content),
            branch: opts.branch.as_deref(),
            sha: opts.sha.as_deref(),
            committer: &opts.committer,
        }
    }
}

#[async_trait]
impl GitHubApi for HttpGitHubApi {
    async fn get_release_by_tag(
        &self,
        repo: &Repo,
        tag: &str,
    ) -> std::result::Result<Release, ApiError> {
        let path = format!("repos/{}/{}/releases/tags/{}", repo.owner, repo.name, tag);
        let (release, _) = self.send_json(self.request(Method::GET, &path)?).await?;
        Ok(release)
    }

    async fn create_release(
        &self,
        repo: &Repo,
        release: &ReleaseRequest,
    ) -> std::result::Result<Response<Release>, ApiError> {
        let path = format!("repos/{}/{}/releases", repo.owner, repo.name);
        let (body, meta) = self
            .send_json(self.request(Method::POST, &path)?.json(release))
            .await?;
        Ok(Response {
            body,
            request_id: meta.request_id,
        })
    }

    async fn edit_release(
        &self,
        repo: &Repo,
        id: u64,
        release: &ReleaseRequest,
    ) -> std::result::Result<Response<Release>, ApiError> {
        let path = format!("repos/{}/{}/releases/{}", repo.owner, repo.name, id);
        let (body, meta) = self
            .send_json(self.request(Method::PATCH, &path)?.json(release))
            .await?;
        Ok(Response {
            body,
            request_id: meta.request_id,
        })
    }

    async fn delete_release(&self, repo: &Repo, id: u64) -> std::result::Result<(), ApiError> {
        let path = format!("repos/{}/{}/releases/{}", repo.owner, repo.name, id);
        self.send_empty(self.request(Method::DELETE, &path)?).await
    }

    async fn list_releases(
        &self,
        repo: &Repo,
        opts: ListOptions,
    ) -> std::result::Result<Page<Release>, ApiError> {
        let path = format!("repos/{}/{}/releases", repo.owner, repo.name);
        let (items, meta) = self
            .send_json(self.request(Method::GET, &path)?.query(&list_query(opts)))
            .await?;
        Ok(Page {
            items,
            next_page: meta.next_page,
        })
    }

    async fn upload_release_asset(
        &self,
        repo: &Repo,
        release_id: u64,
        name: &str,
        content: Bytes,
    ) -> std::result::Result<(), ApiError> {
        let path = format!(
            "repos/{}/{}/releases/{}/assets",
            repo.owner, repo.name, release_id
        );
        let url = self.endpoint(&self.upload_url, &path)?;
        let req = self
            .client
            .post(url)
            .query(&[("name", name)])
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(content);
        self.send_empty(req).await
    }

    async fn compare_commits(
        &self,
        repo: &Repo,
        base: &str,
        head: &str,
        opts: ListOptions,
    ) -> std::result::Result<Page<Commit>, ApiError> {
        let path = format!(
            "repos/{}/{}/compare/{}...{}",
            repo.owner, repo.name, base, head
        );
        let (compare, meta): (CompareResponse, _) = self
            .send_json(self.request(Method::GET, &path)?.query(&list_query(opts)))
            .await?;
        Ok(Page {
            items: compare.commits,
            next_page: meta.next_page,
        })
    }

    async fn generate_release_notes(
        &self,
        repo: &Repo,
        tag: &str,
        previous_tag: &str,
    ) -> std::result::Result<String, ApiError> {
        let path = format!(
            "repos/{}/{}/releases/generate-notes",
            repo.owner, repo.name
        );
        let payload = serde_json::json!({
            "tag_name": tag,
            "previous_tag_name": previous_tag,
        });
        let (notes, _): (GeneratedNotes, _) = self
            .send_json(self.request(Method::POST, &path)?.json(&payload))
            .await?;
        Ok(notes.body)
    }

    async fn get_repository(
        &self,
        repo: &Repo,
    ) -> std::result::Result<RepositoryInfo, ApiError> {
        let path = format!("repos/{}/{}", repo.owner, repo.name);
        let (info, _) = self.send_json(self.request(Method::GET, &path)?).await?;
        Ok(info)
    }

    async fn list_milestones(
        &self,
        repo: &Repo,
        opts: ListOptions,
    ) -> std::result::Result<Page<Milestone>, ApiError> {
        let path = format!("repos/{}/{}/milestones", repo.owner, repo.name);
        let (items, meta) = self
            .send_json(self.request(Method::GET, &path)?.query(&list_query(opts)))
            .await?;
        Ok(Page {
            items,
            next_page: meta.next_page,
        })
    }

    async fn edit_milestone(
        &self,
        repo: &Repo,
        milestone: &Milestone,
    ) -> std::result::Result<(), ApiError> {
        let path = format!(
            "repos/{}/{}/milestones/{}",
            repo.owner, repo.name, milestone.number
        );
        let payload = serde_json::json!({
            "title": milestone.title,
            "state": milestone.state,
        });
        self.send_empty(self.request(Method::PATCH, &path)?.json(&payload))
            .await
    }

    async fn get_contents(
        &self,
        repo: &Repo,
        path: &str,
        branch: Option<&str>,
    ) -> std::result::Result<FileContent, ApiError> {
        let endpoint = format!("repos/{}/{}/contents/{}", repo.owner, repo.name, path);
        let mut req = self.request(Method::GET, &endpoint)?;
        if let Some(branch) = branch {
            req = req.query(&[("ref", branch)]);
        }
        let (content, _) = self.send_json(req).await?;
        Ok(content)
    }

    async fn create_file(
        &self,
        repo: &Repo,
        path: &str,
        opts: &FileOptions,
    ) -> std::result::Result<(), ApiError> {
        let endpoint = format!("repos/{}/{}/contents/{}", repo.owner, repo.name, path);
        self.send_empty(
            self.request(Method::PUT, &endpoint)?
                .json(&FilePayload::new(opts)),
        )
        .await
    }

    async fn update_file(
        &self,
        repo: &Repo,
        path: &str,
        opts: &FileOptions,
    ) -> std::result::Result<(), ApiError> {
        self.create_file(repo, path, opts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::context::GitInfo;
    use crate::github::{Outcome, classify};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer a single request with `status`, extra `headers` and `body`
    async fn serve_once(
        status: &'static str,
        headers: &'static str,
        body: &'static str,
    ) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.expect("read request");
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\n{headers}\
                 content-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket
                .write_all(response.as_bytes())
                .await
                .expect("write response");
        });
        format!("http://{addr}/")
    }

    fn api_for(base: &str) -> HttpGitHubApi {
        let config = Config::parse(&format!(
            "[github_urls]\napi = \"{base}\"\nupload = \"{base}\"\n"
        ))
        .expect("config");
        let ctx = Context::new(config, GitInfo::default());
        HttpGitHubApi::new(&ctx, "token").expect("client")
    }

    fn repo() -> Repo {
        Repo {
            owner: "acme".to_string(),
            name: "widgets".to_string(),
            branch: None,
        }
    }

    #[tokio::test]
    async fn test_error_response_maps_status_and_request_id() {
        let base = serve_once(
            "422 Unprocessable Entity",
            "x-github-request-id: ABCD:1234\r\n",
            r#"{"message":"Validation Failed"}"#,
        )
        .await;

        let result = api_for(&base)
            .upload_release_asset(&repo(), 7, "a.tar.gz", Bytes::from_static(b"data"))
            .await;

        let err = result.as_ref().expect_err("rejected");
        assert_eq!(err.status, Some(422));
        assert_eq!(err.request_id.as_deref(), Some("ABCD:1234"));
        assert_eq!(err.message, "Validation Failed");
        assert_eq!(classify(&result), Outcome::Fatal);
    }

    #[tokio::test]
    async fn test_server_error_is_retriable() {
        let base = serve_once("503 Service Unavailable", "", "").await;

        let result = api_for(&base).get_release_by_tag(&repo(), "v1.0.0").await;

        let err = result.as_ref().expect_err("unavailable");
        assert_eq!(err.status, Some(503));
        assert_eq!(err.request_id, None);
        assert_eq!(err.message, "Service Unavailable");
        assert_eq!(classify(&result), Outcome::Retriable);
    }

    #[tokio::test]
    async fn test_list_reads_next_page_from_link_header() {
        let base = serve_once(
            "200 OK",
            "link: <https://api.github.com/repositories/1/releases?page=2>; rel=\"next\"\r\n",
            "[]",
        )
        .await;

        let page = api_for(&base)
            .list_releases(&repo(), ListOptions::per_page(50))
            .await
            .expect("listed");

        assert!(page.items.is_empty());
        assert_eq!(page.next_page, Some(2));
    }

    #[test]
    fn test_parse_next_page() {
        let link = r#"<https://api.github.com/repositories/1/releases?per_page=50&page=3>; rel="next", <https://api.github.com/repositories/1/releases?per_page=50&page=9>; rel="last""#;
        assert_eq!(parse_next_page(link), Some(3));
    }

    #[test]
    fn test_parse_next_page_on_last_page() {
        let link = r#"<https://api.github.com/repositories/1/releases?page=1>; rel="prev", <https://api.github.com/repositories/1/releases?page=1>; rel="first""#;
        assert_eq!(parse_next_page(link), None);
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = parse_base("https://ghe.example.com/api/v3").expect("valid url");
        assert_eq!(
            url.join("repos/a/b").expect("join").as_str(),
            "https://ghe.example.com/api/v3/repos/a/b"
        );
    }
}
