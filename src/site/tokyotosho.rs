//! TokyoTosho cross-poster
//!
//! Announces a Nyaa download link on TokyoTosho. The site answers with a
//! comma-delimited status line such as `OK,12345`.

use reqwest::Client;
use tracing::{debug, info};

use crate::error::UploadError;
use crate::release::Category;

/// Comment attached to every announcement
pub const ANNOUNCE_COMMENT: &str = "Uploaded with nyaa-uploader.";

/// Outcome of a TokyoTosho submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossPostResult {
    /// First field of the status line
    pub status: String,
    /// Submission id, the second field of the status line
    pub submission_id: String,
    /// Details page of the submission
    pub details_url: String,
}

/// Parse the status line returned by `new.php`
pub fn parse_submission(body: &str, base_url: &str) -> Result<CrossPostResult, UploadError> {
    let mut fields = body.trim().split(',');
    let status = fields.next().unwrap_or_default().trim().to_string();
    let submission_id = fields
        .next()
        .map(|id| id.trim().to_string())
        .ok_or_else(|| {
            UploadError::parse_error_with_source(
                "Didn't find a comma, so the status can't have been returned correctly.",
                body.chars().take(100).collect::<String>(),
            )
        })?;
    if submission_id.is_empty() {
        return Err(UploadError::parse_error_with_source(
            "Status line has no submission id.",
            body.chars().take(100).collect::<String>(),
        ));
    }

    Ok(CrossPostResult {
        details_url: details_url(base_url, &submission_id),
        status,
        submission_id,
    })
}

/// Details page of a submission
pub fn details_url(base_url: &str, submission_id: &str) -> String {
    format!("{}/details.php?id={}", base_url.trim_end_matches('/'), submission_id)
}

/// Fields of the announcement form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossPostForm {
    /// Release category
    pub category: Category,
    /// Nyaa download link being announced
    pub download_url: String,
    /// Website attributed on the announcement
    pub website: String,
    /// TokyoTosho API key
    pub api_key: String,
}

impl CrossPostForm {
    /// Form fields in submission order
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("type", self.category.tokyotosho_code().to_string()),
            ("url", self.download_url.clone()),
            ("comment", ANNOUNCE_COMMENT.to_string()),
            ("website", self.website.clone()),
            ("apikey", self.api_key.clone()),
            ("send", "true".to_string()),
        ]
    }
}

/// TokyoTosho client. Submissions are authenticated by API key alone, so no
/// session is kept.
pub struct TokyoToshoClient {
    client: Client,
    base_url: String,
}

impl TokyoToshoClient {
    /// Create a client against the given site root
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Submit an announcement
    pub async fn submit(&self, form: &CrossPostForm) -> Result<CrossPostResult, UploadError> {
        info!("Submitting {} to TokyoTosho", form.download_url);

        let response = self
            .client
            .post(format!("{}/new.php", self.base_url))
            .form(&form.fields())
            .send()
            .await?;

        debug!("TokyoTosho answered with status {}", response.status());
        let body = response.text().await?;
        let result = parse_submission(&body, &self.base_url)?;

        info!("TokyoTosho submission {} ({})", result.submission_id, result.status);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const BASE: &str = "https://www.tokyotosho.info";

    fn form() -> CrossPostForm {
        CrossPostForm {
            category: Category::Asub,
            download_url: "http://www.nyaa.se/?page=download&tid=7".to_string(),
            website: "http://example.org/".to_string(),
            api_key: "key123".to_string(),
        }
    }

    #[test]
    fn test_parse_submission() {
        let result = parse_submission("OK,12345", BASE).unwrap();
        assert_eq!(result.status, "OK");
        assert_eq!(result.submission_id, "12345");
        assert_eq!(result.details_url, "https://www.tokyotosho.info/details.php?id=12345");
    }

    #[test]
    fn test_parse_submission_trailing_newline() {
        let result = parse_submission("OK,12345\n", BASE).unwrap();
        assert_eq!(result.submission_id, "12345");
    }

    #[test]
    fn test_parse_submission_without_comma() {
        let err = parse_submission("Invalid API key", BASE).unwrap_err();
        assert!(matches!(err, UploadError::ParseError { .. }));
        assert!(err.to_string().contains("Didn't find a comma"));
    }

    #[test]
    fn test_parse_submission_empty_id() {
        for body in ["OK,", "OK, ", "OK,\n"] {
            let err = parse_submission(body, BASE).unwrap_err();
            assert!(matches!(err, UploadError::ParseError { .. }), "accepted {:?}", body);
        }
    }

    #[test]
    fn test_form_fields() {
        let fields = form().fields();
        assert!(fields.contains(&("type", "1".to_string())));
        assert!(fields.contains(&("url", "http://www.nyaa.se/?page=download&tid=7".to_string())));
        assert!(fields.contains(&("apikey", "key123".to_string())));
        assert!(fields.contains(&("comment", ANNOUNCE_COMMENT.to_string())));
    }

    #[tokio::test]
    async fn test_submit() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/new.php")
                .form_urlencoded_tuple("type", "1")
                .form_urlencoded_tuple("apikey", "key123");
            then.status(200).body("OK,12345");
        });

        let client = TokyoToshoClient::new(server.base_url());
        let result = client.submit(&form()).await.unwrap();

        mock.assert();
        assert_eq!(result.submission_id, "12345");
        assert_eq!(result.details_url, format!("{}/details.php?id=12345", server.base_url()));
    }

    #[tokio::test]
    async fn test_submit_rejected() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/new.php");
            then.status(200).body("Error: bad key");
        });

        let client = TokyoToshoClient::new(server.base_url());
        assert!(client.submit(&form()).await.is_err());
    }
}
