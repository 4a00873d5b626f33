//! One-shot submission of a finalized grade sheet to a remote endpoint.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::Result;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use tracing::info;

use crate::error::GradeError;
use crate::finalize::Submission;

/// POSTs the submission as JSON and returns the redirect URL from the
/// response body.
///
/// Fire-and-forget: a non-success status surfaces
/// [`GradeError::SubmitRejected`] with the remote status text and is not
/// retried.
pub async fn post_submission<C: HttpClient>(
    client: &C,
    url: &str,
    submission: &Submission,
) -> Result<String> {
    let mut req = reqwest::Request::new(reqwest::Method::POST, url.parse()?);
    req.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    *req.body_mut() = Some(serde_json::to_vec(submission)?.into());

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(GradeError::SubmitRejected {
            status: format!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown")
            ),
        }
        .into());
    }

    let redirect = resp.text().await?;
    info!(total_students = submission.total_students, "Grade sheet submitted");
    Ok(redirect)
}
