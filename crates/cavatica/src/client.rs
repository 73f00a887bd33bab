//! Blocking HTTP client for the workspace API.

use crate::file::{parse_page, FilePage};
use crate::retry::{RetryDecision, RetryPolicy, RATE_LIMIT_RESET_HEADER};
use crate::{CavaticaError, CavaticaResult, RemoteFile};
use chrono::Utc;
use std::time::Duration;

/// Public Cavatica API endpoint.
pub const DEFAULT_API_URL: &str = "https://cavatica-api.sbgenomics.com/v2";

const AUTH_TOKEN_HEADER: &str = "X-SBG-Auth-Token";
const ADVANCE_ACCESS_HEADER: &str = "X-SBG-advance-access";

/// Files requested per page.
const PAGE_LIMIT: u32 = 100;

/// Workspace API client authenticated with a developer token.
pub struct CavaticaClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: String,
    policy: RetryPolicy,
}

impl CavaticaClient {
    /// Create a client for `base_url` (e.g. [`DEFAULT_API_URL`]).
    ///
    /// # Errors
    ///
    /// Returns [`CavaticaError::InvalidInput`] for an empty token, or
    /// [`CavaticaError::Http`] if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        token: &str,
        timeout: Duration,
        policy: RetryPolicy,
    ) -> CavaticaResult<Self> {
        if token.trim().is_empty() {
            return Err(CavaticaError::InvalidInput(
                "developer token cannot be empty".into(),
            ));
        }

        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            policy,
        })
    }

    /// URL of the first listing page for `project`.
    pub fn project_files_url(&self, project: &str) -> String {
        format!(
            "{}/files?project={}&fields=_all&offset=0&limit={PAGE_LIMIT}",
            self.base_url,
            urlencoding::encode(project)
        )
    }

    /// List every file of `project`, following `next` links in order.
    pub fn list_project_files(&self, project: &str) -> CavaticaResult<Vec<RemoteFile>> {
        if project.trim().is_empty() {
            return Err(CavaticaError::InvalidInput(
                "project id cannot be empty".into(),
            ));
        }

        let mut files = Vec::new();
        let mut next = Some(self.project_files_url(project));

        while let Some(url) = next.take() {
            let page = self.get_page(&url)?;
            tracing::debug!("listed {} files from {}", page.items.len(), url);
            files.extend(page.items);

            // A server echoing the same page back would loop forever.
            next = page.next.filter(|n| *n != url);
        }

        tracing::info!("project {} holds {} files", project, files.len());
        Ok(files)
    }

    fn get_page(&self, url: &str) -> CavaticaResult<FilePage> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let response = self
                .http
                .get(url)
                .header(AUTH_TOKEN_HEADER, &self.token)
                .header(ADVANCE_ACCESS_HEADER, "advance")
                .send()?;

            let status = response.status();
            if status.is_success() {
                let body = response.text()?;
                return parse_page(&body);
            }

            let reset = response
                .headers()
                .get(RATE_LIMIT_RESET_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let body = response.text().unwrap_or_default();

            match self
                .policy
                .decide(status.as_u16(), reset.as_deref(), &body, Utc::now())
            {
                RetryDecision::Retry(wait) if attempt < self.policy.max_attempts => {
                    tracing::warn!(
                        "workspace API returned {}; retrying in {}s (attempt {}/{})",
                        status,
                        wait.as_secs(),
                        attempt,
                        self.policy.max_attempts
                    );
                    std::thread::sleep(wait);
                }
                RetryDecision::Retry(_) => {
                    return Err(CavaticaError::RetriesExhausted {
                        attempts: attempt,
                        status: status.as_u16(),
                    });
                }
                RetryDecision::Fail => {
                    return Err(CavaticaError::Api {
                        status: status.as_u16(),
                        message: body,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Answer one connection per canned `(status, headers, body)` response, in
    /// order, and hand back the raw request heads once all were served.
    ///
    /// `responses` receives the stub's base URL so bodies can carry `next` links.
    fn serve<F>(responses: F) -> (String, thread::JoinHandle<Vec<String>>)
    where
        F: FnOnce(&str) -> Vec<(u16, &'static str, String)>,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub");
        let base = format!("http://{}", listener.local_addr().expect("stub addr"));
        let responses = responses(&base);

        let handle = thread::spawn(move || {
            let mut requests = Vec::new();
            for (status, headers, body) in responses {
                let (mut stream, _) = listener.accept().expect("accept");
                let mut raw = Vec::new();
                let mut buf = [0u8; 1024];
                while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut buf).expect("read request");
                    if n == 0 {
                        break;
                    }
                    raw.extend_from_slice(&buf[..n]);
                }
                requests.push(String::from_utf8_lossy(&raw).into_owned());

                let response = format!(
                    "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\n{headers}Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).expect("write response");
            }
            requests
        });

        (base, handle)
    }

    fn page(ids: &[&str], next: Option<String>) -> String {
        let items: Vec<_> = ids.iter().map(|id| serde_json::json!({"id": id})).collect();
        let links: Vec<_> = next
            .into_iter()
            .map(|href| serde_json::json!({"rel": "next", "href": href}))
            .collect();
        serde_json::json!({"items": items, "links": links}).to_string()
    }

    fn no_wait_client(base_url: &str, max_attempts: u32) -> CavaticaClient {
        let policy = RetryPolicy {
            max_attempts,
            maintenance_wait: Duration::ZERO,
            min_rate_limit_wait: Duration::ZERO,
        };
        CavaticaClient::new(base_url, "token", Duration::from_secs(5), policy)
            .expect("build client")
    }

    fn ids(files: &[RemoteFile]) -> Vec<&str> {
        files.iter().map(|f| f.id.as_str()).collect()
    }

    fn client(base_url: &str) -> CavaticaClient {
        CavaticaClient::new(
            base_url,
            "token",
            Duration::from_secs(5),
            RetryPolicy::default(),
        )
        .expect("build client")
    }

    #[test]
    fn trims_trailing_slash() {
        let client = client("https://cavatica-api.sbgenomics.com/v2/");
        assert_eq!(client.base_url, "https://cavatica-api.sbgenomics.com/v2");
    }

    #[test]
    fn project_url_encodes_project_id() {
        let client = client(DEFAULT_API_URL);
        assert_eq!(
            client.project_files_url("owner/my project"),
            "https://cavatica-api.sbgenomics.com/v2/files?project=owner%2Fmy%20project&fields=_all&offset=0&limit=100"
        );
    }

    #[test]
    fn rejects_empty_token() {
        let err = CavaticaClient::new(
            DEFAULT_API_URL,
            "  ",
            Duration::from_secs(5),
            RetryPolicy::default(),
        )
        .err()
        .expect("empty token");
        assert!(matches!(err, CavaticaError::InvalidInput(_)));
    }

    #[test]
    fn rejects_empty_project() {
        let err = client(DEFAULT_API_URL)
            .list_project_files("")
            .expect_err("empty project");
        assert!(matches!(err, CavaticaError::InvalidInput(_)));
    }

    #[test]
    fn follows_next_links_in_order() {
        let (base, server) = serve(|base| {
            vec![
                (200, "", page(&["f1", "f2"], Some(format!("{base}/files?offset=2")))),
                (200, "", page(&["f3"], None)),
            ]
        });

        let files = no_wait_client(&base, 3)
            .list_project_files("owner/project")
            .expect("list files");
        assert_eq!(ids(&files), vec!["f1", "f2", "f3"]);

        let requests = server.join().expect("stub thread");
        assert!(requests[0].starts_with(
            "GET /files?project=owner%2Fproject&fields=_all&offset=0&limit=100 "
        ));
        assert!(requests[1].starts_with("GET /files?offset=2 "));
        let head = requests[0].to_ascii_lowercase();
        assert!(head.contains("x-sbg-auth-token: token"));
        assert!(head.contains("x-sbg-advance-access: advance"));
    }

    #[test]
    fn next_link_to_the_same_page_stops_listing() {
        let (base, server) = serve(|base| {
            let first = format!("{base}/files?project=p&fields=_all&offset=0&limit=100");
            vec![(200, "", page(&["f1"], Some(first)))]
        });

        let files = no_wait_client(&base, 3)
            .list_project_files("p")
            .expect("list files");
        assert_eq!(ids(&files), vec!["f1"]);
        assert_eq!(server.join().expect("stub thread").len(), 1);
    }

    #[test]
    fn rate_limit_and_maintenance_are_retried() {
        let (base, server) = serve(|base| {
            vec![
                (200, "", page(&["f1"], Some(format!("{base}/files?offset=1")))),
                (429, "X-RateLimit-Reset: 0\r\n", String::new()),
                (503, "", r#"{"status": 503, "code": 0}"#.to_string()),
                (200, "", page(&["f2"], None)),
            ]
        });

        let files = no_wait_client(&base, 3)
            .list_project_files("p")
            .expect("list files");
        assert_eq!(ids(&files), vec!["f1", "f2"]);
        assert_eq!(server.join().expect("stub thread").len(), 4);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let (base, server) = serve(|_| vec![(429, "", String::new()), (429, "", String::new())]);

        let err = no_wait_client(&base, 2)
            .list_project_files("p")
            .expect_err("attempts exhausted");
        assert!(matches!(
            err,
            CavaticaError::RetriesExhausted { attempts: 2, status: 429 }
        ));
        assert_eq!(server.join().expect("stub thread").len(), 2);
    }

    #[test]
    fn not_found_fails_without_retry() {
        let (base, server) =
            serve(|_| vec![(404, "", r#"{"message": "Project not found"}"#.to_string())]);

        let err = no_wait_client(&base, 5)
            .list_project_files("p")
            .expect_err("404 is final");
        match err {
            CavaticaError::Api { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("Project not found"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert_eq!(server.join().expect("stub thread").len(), 1);
    }
}
