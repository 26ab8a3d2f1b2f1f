//! Upload pipeline
//!
//! Runs one invocation: read the torrent, log in, upload, patch the listing,
//! record the links and optionally cross-post. Every stage returns a
//! `Result`; the first error ends the run.

use std::io::{Stdout, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::cli::{Credentials, CrossPostMode, Invocation, StatusDisplay};
use crate::error::UploadError;
use crate::links::{LinkRecord, TT_STATUS_LABEL};
use crate::site::{
    CrossPostForm, CrossPostResult, MetadataForm, NyaaSession, TokyoToshoClient, UploadForm, UploadResult,
};
use crate::torrent::TorrentInspector;

/// One upload run against both sites
pub struct Pipeline<W: Write = Stdout> {
    credentials: Credentials,
    invocation: Invocation,
    nyaa: NyaaSession,
    tokyotosho: TokyoToshoClient,
    display: StatusDisplay<W>,
}

impl<W: Write> Pipeline<W> {
    /// Create a pipeline for a validated invocation
    pub fn new(credentials: Credentials, invocation: Invocation, display: StatusDisplay<W>) -> Result<Self, UploadError> {
        credentials.validate()?;
        if invocation.cross_post != CrossPostMode::Skip {
            credentials.validate_cross_post()?;
        }

        let nyaa = NyaaSession::new(credentials.nyaa_url.clone())?;
        let tokyotosho = TokyoToshoClient::new(credentials.tokyotosho_url.clone());

        Ok(Self {
            credentials,
            invocation,
            nyaa,
            tokyotosho,
            display,
        })
    }

    /// Run the mode the invocation asks for
    pub async fn run(&mut self) -> Result<(), UploadError> {
        match self.invocation.cross_post {
            CrossPostMode::Deferred => {
                self.run_deferred_cross_post().await?;
            }
            CrossPostMode::Immediate | CrossPostMode::Skip => {
                self.run_upload().await?;
            }
        }
        self.display.print_complete()?;
        Ok(())
    }

    /// Upload to Nyaa, patch the listing, record the links and cross-post
    /// when asked to.
    pub async fn run_upload(&mut self) -> Result<UploadResult, UploadError> {
        self.report_checksum()?;
        let torrent = self.read_torrent()?;

        self.nyaa
            .login(&self.credentials.nyaa_login, &self.credentials.nyaa_pass)
            .await?;
        self.display.print_detail("Logged in successfully.")?;

        let upload_form = UploadForm {
            category_code: self.invocation.category.nyaa_code().to_string(),
            info_url: self.credentials.website.clone(),
            hidden: self.invocation.hidden_flag().to_string(),
        };
        let file_name = file_name(&self.invocation.torrent);
        let result = self.nyaa.upload(&file_name, torrent, &upload_form).await?;
        self.display.print_upload(&result)?;

        let metadata = self.metadata_form(&result);
        self.nyaa.patch_metadata(&metadata).await?;
        self.display.print_detail("Added following metadata successfully:")?;
        for (key, value) in metadata.fields() {
            self.display.print_detail(&format!("  {}: {}", key, value))?;
        }

        let record = LinkRecord::for_video(&self.invocation.video);
        record.write_upload(&result.download_url, &result.view_url)?;

        if self.invocation.cross_post == CrossPostMode::Immediate {
            self.cross_post(&record, &result.download_url).await?;
        }

        Ok(result)
    }

    /// Cross-post the download URL recorded by an earlier upload
    pub async fn run_deferred_cross_post(&mut self) -> Result<CrossPostResult, UploadError> {
        let record = LinkRecord::for_video(&self.invocation.video);
        let download_url = record.read_download_url()?;
        debug!("Recovered download URL {} from {}", download_url, record.path().display());
        self.cross_post(&record, &download_url).await
    }

    async fn cross_post(&mut self, record: &LinkRecord, download_url: &str) -> Result<CrossPostResult, UploadError> {
        let form = CrossPostForm {
            category: self.invocation.category,
            download_url: download_url.to_string(),
            website: self.credentials.website.clone(),
            api_key: self.credentials.tt_api_key.clone(),
        };
        let result = self.tokyotosho.submit(&form).await?;
        record.append(TT_STATUS_LABEL, &result.details_url)?;
        self.display.print_cross_post(&result)?;
        Ok(result)
    }

    fn report_checksum(&mut self) -> Result<(), UploadError> {
        let line = match (&self.invocation.checksum, self.invocation.checksum_overridden) {
            (Some(crc), true) => format!("Using supplied CRC: {}", crc),
            (Some(crc), false) => format!("Found CRC: {}", crc),
            (None, _) => "No CRC found, submitting an empty checksum".to_string(),
        };
        self.display.print_detail(&line)?;
        Ok(())
    }

    fn read_torrent(&mut self) -> Result<Vec<u8>, UploadError> {
        let data = TorrentInspector::read_file(&self.invocation.torrent)?;
        match TorrentInspector::inspect(&data) {
            Ok(summary) => {
                if !summary.has_announce() {
                    warn!(
                        "{} has no announce URL, Nyaa will likely reject it",
                        self.invocation.torrent.display()
                    );
                }
                self.display.print_torrent_summary(&summary)?;
            }
            Err(e) => warn!("{} does not look like a torrent: {}", self.invocation.torrent.display(), e),
        }
        Ok(data)
    }

    fn metadata_form(&self, result: &UploadResult) -> MetadataForm {
        MetadataForm {
            tid: result.tid,
            redirect: result.view_url.clone(),
            group: self.invocation.group.clone(),
            title: self.invocation.title.clone(),
            part: self.invocation.part.clone(),
            crc32: self.invocation.checksum.clone(),
            release_type: self.invocation.release_type.clone(),
            name: self.invocation.video_name(),
            info_url: self.credentials.website.clone(),
        }
    }

    /// Consume the pipeline, returning its status display
    pub fn into_display(self) -> StatusDisplay<W> {
        self.display
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| {
            debug!("Torrent path {} has no file name", path.display());
            "upload.torrent".to_string()
        })
}
