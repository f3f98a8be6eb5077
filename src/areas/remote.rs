//! Smart-HTTP remote
//!
//! The two-phase exchanges against a compatible remote: ref discovery
//! (`GET <repo>/info/refs?service=...`) followed by `POST` to
//! `git-upload-pack` (fetch) or `git-receive-pack` (push).
//!
//! The HTTP client sits behind the `Transport` seam; the protocol driver
//! only ever asks for "request this URL, give me the body bytes".
//! Credentials come from `GIT_USERNAME` / `GIT_TOKEN` and ride as basic
//! auth.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::core::GitError;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::protocol::pkt_line;
use crate::artifacts::protocol::remote_refs::RemoteRefs;
use crate::artifacts::protocol::{
    CAPABILITIES, RECEIVE_PACK_SERVICE, UPLOAD_PACK_SERVICE,
};
use bytes::Bytes;
use std::io::Cursor;

/// Byte-transfer capability the protocol driver consumes
pub trait Transport {
    fn get(&self, url: &str) -> anyhow::Result<Bytes>;
    fn post(&self, url: &str, content_type: &str, body: Bytes) -> anyhow::Result<Bytes>;
}

/// Blocking HTTP transport with optional basic auth
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    credentials: Option<(String, String)>,
}

impl HttpTransport {
    pub fn anonymous() -> Self {
        HttpTransport {
            client: reqwest::blocking::Client::new(),
            credentials: None,
        }
    }

    /// Credentials from the environment; both variables are required
    pub fn from_env() -> anyhow::Result<Self> {
        let username = std::env::var("GIT_USERNAME")
            .map_err(|_| GitError::missing_credentials("GIT_USERNAME"))?;
        let token =
            std::env::var("GIT_TOKEN").map_err(|_| GitError::missing_credentials("GIT_TOKEN"))?;

        Ok(HttpTransport {
            client: reqwest::blocking::Client::new(),
            credentials: Some((username, token)),
        })
    }

    /// Env credentials when present, anonymous otherwise
    pub fn from_env_or_anonymous() -> Self {
        Self::from_env().unwrap_or_else(|_| Self::anonymous())
    }

    fn execute(
        &self,
        request: reqwest::blocking::RequestBuilder,
        url: &str,
        accepted: &[u16],
    ) -> anyhow::Result<Bytes> {
        let request = match &self.credentials {
            Some((username, token)) => request.basic_auth(username, Some(token)),
            None => request,
        };

        let response = request
            .send()
            .map_err(|e| GitError::Transport(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        let body = response
            .bytes()
            .map_err(|e| GitError::Transport(format!("failed to read response from {url}: {e}")))?;

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(GitError::Auth(format!(
                "remote rejected credentials for {url} with status {status}"
            ))
            .into());
        }

        if !accepted.contains(&status.as_u16()) {
            let excerpt = String::from_utf8_lossy(&body[..body.len().min(200)]).to_string();
            return Err(GitError::Transport(format!(
                "unexpected status {status} from {url}: {excerpt}"
            ))
            .into());
        }

        Ok(body)
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> anyhow::Result<Bytes> {
        self.execute(self.client.get(url), url, &[200, 304])
    }

    fn post(&self, url: &str, content_type: &str, body: Bytes) -> anyhow::Result<Bytes> {
        self.execute(
            self.client
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(body.to_vec()),
            url,
            &[200],
        )
    }
}

/// Protocol driver for one remote repository
pub struct Remote<'t> {
    url: String,
    transport: &'t dyn Transport,
}

impl<'t> Remote<'t> {
    pub fn new(url: &str, transport: &'t dyn Transport) -> Self {
        Remote {
            url: url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    /// Phase one: ask the remote which refs it has
    pub fn discover_refs(&self) -> anyhow::Result<RemoteRefs> {
        let url = format!("{}/info/refs?service={UPLOAD_PACK_SERVICE}", self.url);
        let body = self.transport.get(&url)?;

        // `0xxx#` with a hex length is the smart-protocol marker
        if body.len() < 5
            || !body[..4].iter().all(|b| b.is_ascii_hexdigit())
            || body[4] != b'#'
        {
            return Err(GitError::Transport(
                "remote did not answer with a smart-protocol ref advertisement".to_string(),
            )
            .into());
        }

        let mut lines = pkt_line::read_pkt_lines(&mut Cursor::new(&body[..]))?;
        let banner = format!("# service={UPLOAD_PACK_SERVICE}");
        if lines.first().map(String::as_str) != Some(banner.as_str()) {
            return Err(GitError::Transport(
                "ref advertisement is missing the service banner".to_string(),
            )
            .into());
        }
        lines.remove(0);

        RemoteRefs::parse(&lines)
    }

    /// Phase two, fetch side: send wants, get a pack back
    pub fn fetch_pack(&self, wants: &[ObjectId]) -> anyhow::Result<Bytes> {
        let pkt_lines: Vec<String> = wants
            .iter()
            .map(|oid| pkt_line::create_pkt_line(&format!("want {oid} {CAPABILITIES}")))
            .collect();
        let request =
            pkt_line::create_pkt_line_stream(&pkt_lines) + &pkt_line::create_pkt_line("done");

        let body = self.transport.post(
            &format!("{}/{UPLOAD_PACK_SERVICE}", self.url),
            &format!("application/x-{UPLOAD_PACK_SERVICE}-request"),
            Bytes::from(request),
        )?;

        let mut reader = Cursor::new(&body[..]);
        let nak = pkt_line::read_pkt_line(&mut reader)?;
        if nak != "NAK" {
            return Err(GitError::Transport(format!(
                "expected NAK before the pack data, got {nak:?}"
            ))
            .into());
        }

        // the pack begins right after the 8-byte "0008NAK\n" frame
        Ok(body.slice(reader.position() as usize..))
    }

    /// Phase two, push side: announce the ref update, send the pack, and
    /// check the remote's status report.
    pub fn push_pack(
        &self,
        old_oid: &str,
        new_oid: &ObjectId,
        branch: &BranchName,
        pack: Bytes,
    ) -> anyhow::Result<()> {
        let refname = format!("refs/heads/{branch}");
        // command NUL capability-list: the capability list starts right
        // after the NUL, no separator
        let update = pkt_line::create_pkt_line(&format!(
            "{old_oid} {new_oid} {refname}\0report-status"
        ));

        let mut request = Vec::new();
        request.extend_from_slice(pkt_line::create_pkt_line_stream(&[update]).as_bytes());
        request.extend_from_slice(&pack);

        let body = self.transport.post(
            &format!("{}/{RECEIVE_PACK_SERVICE}", self.url),
            &format!("application/x-{RECEIVE_PACK_SERVICE}-request"),
            Bytes::from(request),
        )?;

        let report = pkt_line::read_pkt_lines(&mut Cursor::new(&body[..]))?;

        if !report.iter().any(|line| line == "unpack ok") {
            return Err(GitError::Transport(format!(
                "remote failed to unpack the push: {report:?}"
            ))
            .into());
        }
        if !report.iter().any(|line| line == &format!("ok {refname}")) {
            return Err(GitError::Transport(format!(
                "remote refused the update of {refname}: {report:?}"
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    const OID: &str = "3b18e512dba79e4c8300dd08aeb37f8e728b8dad";

    /// Canned transport recording the requests the driver makes
    struct FakeTransport {
        get_response: Bytes,
        post_response: Bytes,
        posts: RefCell<Vec<(String, Bytes)>>,
    }

    impl FakeTransport {
        fn new(get_response: Bytes, post_response: Bytes) -> Self {
            FakeTransport {
                get_response,
                post_response,
                posts: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for FakeTransport {
        fn get(&self, _url: &str) -> anyhow::Result<Bytes> {
            Ok(self.get_response.clone())
        }

        fn post(&self, url: &str, _content_type: &str, body: Bytes) -> anyhow::Result<Bytes> {
            self.posts.borrow_mut().push((url.to_string(), body));
            Ok(self.post_response.clone())
        }
    }

    fn advertisement() -> Bytes {
        let body = format!(
            "{}{}{}{}{}",
            pkt_line::create_pkt_line("# service=git-upload-pack"),
            pkt_line::FLUSH,
            pkt_line::create_pkt_line(&format!("{OID} HEAD\0multi_ack ofs-delta")),
            pkt_line::create_pkt_line(&format!("{OID} refs/heads/master")),
            pkt_line::FLUSH,
        );
        Bytes::from(body)
    }

    #[test]
    fn discovery_parses_the_advertised_refs() {
        let transport = FakeTransport::new(advertisement(), Bytes::new());
        let remote = Remote::new("https://example.com/repo.git/", &transport);

        let refs = remote.discover_refs().unwrap();

        assert_eq!(refs.head().unwrap().as_ref(), OID);
        assert_eq!(refs.branch("master").unwrap().as_ref(), OID);
    }

    #[test]
    fn discovery_rejects_a_dumb_response() {
        let transport = FakeTransport::new(Bytes::from_static(b"<html>not git</html>"), Bytes::new());
        let remote = Remote::new("https://example.com/repo.git", &transport);

        assert!(remote.discover_refs().is_err());
    }

    #[test]
    fn fetch_sends_wants_and_strips_the_nak_frame() {
        let pack_bytes = b"PACKdata".to_vec();
        let mut response = b"0008NAK\n".to_vec();
        response.extend_from_slice(&pack_bytes);

        let transport = FakeTransport::new(Bytes::new(), Bytes::from(response));
        let remote = Remote::new("https://example.com/repo.git", &transport);
        let want = ObjectId::try_parse(OID.to_string()).unwrap();

        let pack = remote.fetch_pack(&[want]).unwrap();
        assert_eq!(&pack[..], b"PACKdata");

        let posts = transport.posts.borrow();
        let (url, body) = &posts[0];
        assert_eq!(url, "https://example.com/repo.git/git-upload-pack");

        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains(&format!("want {OID}")));
        assert!(body.contains("ofs-delta"));
        assert!(body.ends_with("0009done\n"));
    }

    #[test]
    fn push_requires_both_status_lines() {
        let ok_report = format!(
            "{}{}{}",
            pkt_line::create_pkt_line("unpack ok"),
            pkt_line::create_pkt_line("ok refs/heads/master"),
            pkt_line::FLUSH,
        );
        let transport = FakeTransport::new(Bytes::new(), Bytes::from(ok_report));
        let remote = Remote::new("https://example.com/repo.git", &transport);

        let branch = BranchName::try_parse("master".to_string()).unwrap();
        let new_oid = ObjectId::try_parse(OID.to_string()).unwrap();
        remote
            .push_pack(
                &"0".repeat(40),
                &new_oid,
                &branch,
                Bytes::from_static(b"PACK"),
            )
            .unwrap();

        // the capability list follows the NUL directly
        let posts = transport.posts.borrow();
        let (url, body) = &posts[0];
        assert_eq!(url, "https://example.com/repo.git/git-receive-pack");
        let update_line = format!(
            "{} {OID} refs/heads/master\0report-status\n",
            "0".repeat(40)
        );
        let body = String::from_utf8_lossy(body);
        assert!(body.contains(&update_line));
        assert!(body.ends_with("PACK"));

        let failed_report = format!(
            "{}{}{}",
            pkt_line::create_pkt_line("unpack ok"),
            pkt_line::create_pkt_line("ng refs/heads/master non-fast-forward"),
            pkt_line::FLUSH,
        );
        let transport = FakeTransport::new(Bytes::new(), Bytes::from(failed_report));
        let remote = Remote::new("https://example.com/repo.git", &transport);

        assert!(
            remote
                .push_pack(
                    &"0".repeat(40),
                    &new_oid,
                    &branch,
                    Bytes::from_static(b"PACK"),
                )
                .is_err()
        );
    }
}
