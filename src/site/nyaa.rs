//! Nyaa tracker client
//!
//! Nyaa has no API for uploads. Everything here is an HTML form POST made
//! through one cookie-carrying session, with the interesting bits of the
//! response scraped out by pattern.

use std::sync::OnceLock;

use regex::Regex;
use reqwest::{multipart, Client, StatusCode};
use tracing::{debug, error, info};

use crate::error::UploadError;

const TORRENT_ID_PATTERN: &str = r#"<a href="[^"]*\?page=view[^"]*?tid=(\d+)">View your torrent\.</a>"#;

static TORRENT_ID_REGEX: OnceLock<Regex> = OnceLock::new();

fn torrent_id_regex() -> &'static Regex {
    TORRENT_ID_REGEX.get_or_init(|| Regex::new(TORRENT_ID_PATTERN).expect("torrent id pattern is valid"))
}

/// Description of an error status code Nyaa is known to answer with
pub fn error_description(code: u16) -> Option<&'static str> {
    match code {
        418 => Some("I'm a teapot: You're doing it wrong."),
        460 => Some(
            "Missing Announce URL: You forgot to include a valid announce URL. Torrents using \
             only DHT are not allowed, because this is most often just a mistake on behalf of \
             the uploader.",
        ),
        461 => Some("Already Exists: This torrent already exists in the database."),
        462 => Some("Invalid File: The file you uploaded or linked to does not seem to be a torrent."),
        463 => Some(
            "Missing Data: The form is missing required data like the category and/or the \
             checkbox which confirms that you have read the rules.",
        ),
        520 => Some(
            "Configuration Broken: Server-side error. Wait for a few minutes, and then notify \
             Nyaa if the problem did not go away.",
        ),
        _ => None,
    }
}

/// Turn a non-success status into the matching rejection error
pub fn check_status(status: StatusCode, context: &str) -> Result<(), UploadError> {
    if status.is_success() {
        return Ok(());
    }

    let code = status.as_u16();
    match error_description(code) {
        Some(description) => {
            error!("{} rejected by tracker: {}", context, description);
            Err(UploadError::tracker_rejected(
                format!("Server returned error code during {}:", context),
                description,
            ))
        }
        None => {
            debug!("{} failed with unrecognised status {}", context, code);
            Err(UploadError::unknown_tracker_status(format!(
                "Server returned error code during {}:",
                context
            )))
        }
    }
}

/// Extract the id of the new torrent from the upload response page
pub fn parse_torrent_id(body: &str) -> Result<u64, UploadError> {
    let digits = torrent_id_regex()
        .captures(body)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| {
            UploadError::parse_error_with_source(
                "Malformed upload response",
                "no \"View your torrent.\" link in the page",
            )
        })?
        .as_str();

    digits
        .parse::<u64>()
        .map_err(|e| UploadError::parse_error_with_source("Torrent id is not a number", e.to_string()))
}

/// Listing page of a torrent
pub fn view_url(base_url: &str, tid: u64) -> String {
    format!("{}/?page=view&tid={}", base_url.trim_end_matches('/'), tid)
}

/// Download link of a torrent
pub fn download_url(base_url: &str, tid: u64) -> String {
    format!("{}/?page=download&tid={}", base_url.trim_end_matches('/'), tid)
}

/// Identifier and links of a freshly uploaded torrent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    /// Torrent id assigned by Nyaa
    pub tid: u64,
    /// Listing page
    pub view_url: String,
    /// Download link
    pub download_url: String,
}

impl UploadResult {
    /// Derive the links for `tid` on the given site root
    pub fn new(base_url: &str, tid: u64) -> Self {
        Self {
            tid,
            view_url: view_url(base_url, tid),
            download_url: download_url(base_url, tid),
        }
    }
}

/// Fields of the upload form, besides the torrent file itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    /// Nyaa `catid`
    pub category_code: String,
    /// Website attributed on the listing
    pub info_url: String,
    /// `"1"` to hide the listing
    pub hidden: String,
}

impl UploadForm {
    /// Form fields in submission order
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", String::new()),
            ("torrenturl", String::new()),
            ("catid", self.category_code.clone()),
            ("info", self.info_url.clone()),
            ("hidden", self.hidden.clone()),
            ("rules", "1".to_string()),
            ("submit", "Upload".to_string()),
        ]
    }
}

/// Fields of the listing metadata form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataForm {
    /// Torrent id the metadata applies to
    pub tid: u64,
    /// Page to land on after saving
    pub redirect: String,
    /// Nyaa group field
    pub group: Option<String>,
    /// Nyaa title field
    pub title: Option<String>,
    /// Nyaa part field
    pub part: Option<String>,
    /// Release checksum
    pub crc32: Option<String>,
    /// Nyaa type field
    pub release_type: Option<String>,
    /// Listing name
    pub name: String,
    /// Website attributed on the listing
    pub info_url: String,
}

impl MetadataForm {
    /// Form fields in submission order; absent values are sent empty
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        vec![
            ("redirect", self.redirect.clone()),
            ("alias", String::new()),
            ("submission_key", String::new()),
            ("tid", self.tid.to_string()),
            ("group", opt(&self.group)),
            ("title", opt(&self.title)),
            ("part", opt(&self.part)),
            ("crc32", opt(&self.crc32)),
            ("type", opt(&self.release_type)),
            ("submit", "Submit".to_string()),
            ("namemod", self.name.clone()),
            ("infomod", self.info_url.clone()),
            ("descmod", String::new()),
        ]
    }
}

/// Logged-in Nyaa session
pub struct NyaaSession {
    client: Client,
    base_url: String,
}

impl NyaaSession {
    /// Create a session against the given site root
    pub fn new(base_url: impl Into<String>) -> Result<Self, UploadError> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Site root without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, query: &str) -> String {
        format!("{}/?{}", self.base_url, query)
    }

    /// Post the login form. The response is not checked: Nyaa does not signal
    /// a failed login through the status code, so bad credentials show up as
    /// a rejected upload.
    pub async fn login(&self, login: &str, password: &str) -> Result<(), UploadError> {
        let params = [
            ("login", login),
            ("password", password),
            ("method", "1"),
            ("submit", "Submit"),
        ];

        let response = self.client.post(self.endpoint("page=login")).form(&params).send().await?;
        debug!("Login answered with status {}", response.status());
        Ok(())
    }

    /// Upload a torrent and return the id Nyaa assigned to it
    pub async fn upload(
        &self,
        file_name: &str,
        torrent: Vec<u8>,
        form: &UploadForm,
    ) -> Result<UploadResult, UploadError> {
        info!("Uploading {} ({} bytes)", file_name, torrent.len());

        let file_part = multipart::Part::bytes(torrent)
            .file_name(file_name.to_string())
            .mime_str("application/x-bittorrent")?;

        let mut multipart_form = multipart::Form::new().part("torrent", file_part);
        for (key, value) in form.fields() {
            multipart_form = multipart_form.text(key, value);
        }

        let response = self
            .client
            .post(self.endpoint("page=upload"))
            .multipart(multipart_form)
            .send()
            .await?;

        check_status(response.status(), "upload")?;
        let body = response.text().await?;

        let tid = parse_torrent_id(&body)?;
        info!("Nyaa assigned torrent id {}", tid);
        Ok(UploadResult::new(&self.base_url, tid))
    }

    /// Save group/title/part/checksum/type on the listing
    pub async fn patch_metadata(&self, form: &MetadataForm) -> Result<(), UploadError> {
        debug!("Saving metadata for torrent {}", form.tid);

        let response = self
            .client
            .post(self.endpoint("page=manage&op=2"))
            .form(&form.fields())
            .send()
            .await?;

        check_status(response.status(), "metadata save")?;
        info!("Saved metadata for torrent {}", form.tid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const UPLOAD_PAGE: &str = r#"<html><body><p>Upload successful.</p>
<a href="http://www.nyaa.se/?page=view&#38;tid=42">View your torrent.</a></body></html>"#;

    #[test]
    fn test_torrent_id_pattern_compiles() {
        assert!(Regex::new(TORRENT_ID_PATTERN).is_ok());
    }

    #[test]
    fn test_parse_torrent_id() {
        let body = r#"<p><a href="http://www.nyaa.se/?page=view&tid=42">View your torrent.</a></p>"#;
        assert_eq!(parse_torrent_id(body).unwrap(), 42);
    }

    #[test]
    fn test_parse_torrent_id_escaped_ampersand() {
        assert_eq!(parse_torrent_id(UPLOAD_PAGE).unwrap(), 42);
    }

    #[test]
    fn test_parse_torrent_id_missing() {
        let err = parse_torrent_id("<html>Something went wrong</html>").unwrap_err();
        assert!(matches!(err, UploadError::ParseError { .. }));
    }

    #[test]
    fn test_urls() {
        let result = UploadResult::new("http://www.nyaa.se/", 42);
        assert_eq!(result.view_url, "http://www.nyaa.se/?page=view&tid=42");
        assert_eq!(result.download_url, "http://www.nyaa.se/?page=download&tid=42");
    }

    #[test]
    fn test_error_descriptions() {
        for code in [418, 460, 461, 462, 463, 520] {
            assert!(error_description(code).is_some(), "missing {}", code);
        }
        assert_eq!(error_description(404), None);
    }

    #[test]
    fn test_check_status() {
        assert!(check_status(StatusCode::OK, "upload").is_ok());

        let known = check_status(StatusCode::from_u16(461).unwrap(), "upload").unwrap_err();
        assert!(matches!(known, UploadError::TrackerRejected { .. }));
        assert!(known.to_string().contains("Already Exists"));
        assert!(!known.to_string().contains("461"));

        let unknown = check_status(StatusCode::NOT_FOUND, "upload").unwrap_err();
        assert!(matches!(unknown, UploadError::UnknownTrackerStatus { .. }));
        assert!(!unknown.to_string().contains("404"));
    }

    #[test]
    fn test_upload_form_fields() {
        let form = UploadForm {
            category_code: "1_37".to_string(),
            info_url: "http://example.org/".to_string(),
            hidden: "0".to_string(),
        };
        let fields = form.fields();
        assert!(fields.contains(&("catid", "1_37".to_string())));
        assert!(fields.contains(&("rules", "1".to_string())));
        assert!(fields.contains(&("name", String::new())));
        assert!(fields.contains(&("torrenturl", String::new())));
    }

    #[test]
    fn test_metadata_form_absent_values_are_empty() {
        let form = MetadataForm {
            tid: 7,
            redirect: "http://www.nyaa.se/?page=view&tid=7".to_string(),
            group: Some("Grp".to_string()),
            name: "Show - 01.mkv".to_string(),
            info_url: "http://example.org/".to_string(),
            ..Default::default()
        };
        let fields = form.fields();
        assert!(fields.contains(&("tid", "7".to_string())));
        assert!(fields.contains(&("group", "Grp".to_string())));
        assert!(fields.contains(&("crc32", String::new())));
        assert!(fields.contains(&("namemod", "Show - 01.mkv".to_string())));
        assert!(fields.contains(&("descmod", String::new())));
    }

    #[tokio::test]
    async fn test_login_posts_credentials() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/")
                .query_param("page", "login")
                .form_urlencoded_tuple("login", "user")
                .form_urlencoded_tuple("password", "secret")
                .form_urlencoded_tuple("method", "1");
            then.status(200).body("welcome");
        });

        let session = NyaaSession::new(server.base_url()).unwrap();
        session.login("user", "secret").await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_upload_returns_links() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/")
                .query_param("page", "upload")
                .body_includes("name=\"torrent\"; filename=\"a.torrent\"")
                .body_includes("Content-Type: application/x-bittorrent")
                .body_includes("name=\"catid\"\r\n\r\n1_37\r\n")
                .body_includes("name=\"hidden\"\r\n\r\n1\r\n")
                .body_includes("name=\"rules\"\r\n\r\n1\r\n")
                .body_includes("name=\"info\"\r\n\r\nhttp://example.org/\r\n");
            then.status(200).body(UPLOAD_PAGE);
        });

        let session = NyaaSession::new(server.base_url()).unwrap();
        let form = UploadForm {
            category_code: "1_37".to_string(),
            info_url: "http://example.org/".to_string(),
            hidden: "1".to_string(),
        };
        let result = session.upload("a.torrent", b"d4:infodee".to_vec(), &form).await.unwrap();

        mock.assert();
        assert_eq!(result.tid, 42);
        assert_eq!(result.view_url, format!("{}/?page=view&tid=42", server.base_url()));
        assert_eq!(result.download_url, format!("{}/?page=download&tid=42", server.base_url()));
    }

    #[tokio::test]
    async fn test_upload_rejected() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/").query_param("page", "upload");
            then.status(462);
        });

        let session = NyaaSession::new(server.base_url()).unwrap();
        let form = UploadForm {
            category_code: "1_37".to_string(),
            info_url: "http://example.org/".to_string(),
            hidden: "0".to_string(),
        };
        let err = session.upload("a.torrent", Vec::new(), &form).await.unwrap_err();
        assert!(err.to_string().contains("Invalid File"));
    }

    #[tokio::test]
    async fn test_patch_metadata() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/")
                .query_param("page", "manage")
                .query_param("op", "2")
                .form_urlencoded_tuple("tid", "7")
                .form_urlencoded_tuple("crc32", "ABCDEF12")
                .form_urlencoded_tuple("redirect", "http://www.nyaa.se/?page=view&tid=7")
                .form_urlencoded_tuple("namemod", "Show - 01.mkv")
                .form_urlencoded_tuple("infomod", "http://example.org/")
                .form_urlencoded_tuple("group", "");
            then.status(200);
        });

        let session = NyaaSession::new(server.base_url()).unwrap();
        let form = MetadataForm {
            tid: 7,
            redirect: "http://www.nyaa.se/?page=view&tid=7".to_string(),
            crc32: Some("ABCDEF12".to_string()),
            name: "Show - 01.mkv".to_string(),
            info_url: "http://example.org/".to_string(),
            ..Default::default()
        };
        session.patch_metadata(&form).await.unwrap();
        mock.assert();
    }
}
