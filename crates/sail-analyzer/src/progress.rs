//! Work-done progress for long-running server work such as the workspace
//! scan, reported through `$/progress`.

use std::{
    panic::AssertUnwindSafe,
    sync::atomic::{AtomicU64, Ordering},
};

use futures::FutureExt;
use tower_lsp::{Client, lsp_types::*};
use tracing::{debug, warn};

static NEXT_PROGRESS_ID: AtomicU64 = AtomicU64::new(1);
const PROGRESS_TITLE_PREFIX: &str = "sail-analyzer:";

/// An open progress session.
///
/// Dropping a token that was never [`end`](Self::end)ed closes the session
/// with a "Cancelled" message, so an aborted scan never leaves a spinner
/// behind in the editor.
pub struct ProgressToken {
    client: Option<Client>,
    token: Option<NumberOrString>,
}

impl ProgressToken {
    pub async fn begin(
        client: &Client,
        title: &str,
        message: Option<String>,
    ) -> Self {
        let id = NEXT_PROGRESS_ID.fetch_add(1, Ordering::Relaxed);
        let token = NumberOrString::String(format!("sailAnalyzer/{}/{id}", title.trim()));
        let display_title = prefixed_progress_title(title);

        // The create request is awaited off the caller's task; the client may
        // answer late or not at all.
        let create_client = client.clone();
        let create_token = token.clone();
        tokio::spawn(async move {
            let result = AssertUnwindSafe(
                create_client.send_request::<request::WorkDoneProgressCreate>(WorkDoneProgressCreateParams {
                    token: create_token,
                }),
            )
            .catch_unwind()
            .await;
            match result {
                Ok(Ok(())) => {},
                Ok(Err(error)) => debug!("workDoneProgress/create rejected: {error}"),
                Err(_) => warn!("workDoneProgress/create panicked (client may have disconnected)"),
            }
        });

        let begin = WorkDoneProgress::Begin(WorkDoneProgressBegin {
            title: display_title.clone(),
            cancellable: Some(false),
            message,
            percentage: Some(0),
        });
        if !send_progress(client, token.clone(), begin).await {
            warn!("progress begin notification panicked (client may have disconnected)");
            return Self {
                client: None,
                token: None,
            };
        }

        debug!("progress begin: {display_title}");
        Self {
            client: Some(client.clone()),
            token: Some(token),
        }
    }

    /// `percentage` is clamped to `0..=100`.
    pub async fn report(
        &self,
        message: Option<String>,
        percentage: Option<u32>,
    ) {
        let (Some(client), Some(token)) = (&self.client, &self.token) else {
            return;
        };
        let report = WorkDoneProgress::Report(WorkDoneProgressReport {
            cancellable: Some(false),
            message,
            percentage: percentage.map(|p| p.min(100)),
        });
        send_progress(client, token.clone(), report).await;
    }

    pub async fn end(
        mut self,
        message: Option<String>,
    ) {
        let (Some(client), Some(token)) = (self.client.take(), self.token.take()) else {
            return;
        };
        debug!("progress end: {token:?}");
        send_progress(&client, token, WorkDoneProgress::End(WorkDoneProgressEnd { message })).await;
    }
}

impl Drop for ProgressToken {
    fn drop(&mut self) {
        if let (Some(client), Some(token)) = (self.client.take(), self.token.take()) {
            debug!("progress cancelled (drop): {token:?}");
            tokio::spawn(async move {
                let end = WorkDoneProgress::End(WorkDoneProgressEnd {
                    message: Some("Cancelled".to_string()),
                });
                send_progress(&client, token, end).await;
            });
        }
    }
}

/// Returns `false` when the client panicked while sending.
async fn send_progress(
    client: &Client,
    token: NumberOrString,
    value: WorkDoneProgress,
) -> bool {
    AssertUnwindSafe(client.send_notification::<notification::Progress>(ProgressParams {
        token,
        value: ProgressParamsValue::WorkDone(value),
    }))
    .catch_unwind()
    .await
    .is_ok()
}

/// Percentage of `done` out of `total`, for progress reports.
pub(crate) fn percent(
    done: usize,
    total: usize,
) -> u32 {
    if total == 0 {
        return 100;
    }
    u32::try_from(done.min(total) * 100 / total).unwrap_or(100)
}

fn prefixed_progress_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.starts_with(PROGRESS_TITLE_PREFIX) {
        return trimmed.to_owned();
    }
    format!("{PROGRESS_TITLE_PREFIX} {trimmed}")
}

#[cfg(test)]
#[path = "../tests/src/progress_tests.rs"]
mod tests;
