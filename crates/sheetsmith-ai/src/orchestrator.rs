use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use sheetsmith_core::{EditorSession, PromptRejection};

use crate::client::{CellMapClient, FillRequest};
use crate::error::FillError;
use crate::plan::FillPlan;

/// Pause between growing the grid and writing into the new cells
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FillReport {
    pub applied: usize,
    pub skipped: Vec<String>,
    pub grew: bool,
}

/// Runs one AI fill against a session.
///
/// The session lock is only held for the local steps; the backend request
/// runs without it so other operations on the session are not blocked. The
/// session's pending flag keeps a second submission out meanwhile.
///
/// Once started, a fill runs on its own task and always completes: dropping
/// the future returned by [`submit`](Self::submit) (a client that went away)
/// does not cancel the request, and the pending flag is released when the
/// task ends.
pub struct FillOrchestrator {
    client: CellMapClient,
    default_model: String,
    settle: Duration,
}

impl FillOrchestrator {
    pub fn new(client: CellMapClient, default_model: impl Into<String>) -> Self {
        Self {
            client,
            default_model: default_model.into(),
            settle: DEFAULT_SETTLE,
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Replace the session's prompt text, then submit it
    pub async fn submit_prompt(
        &self,
        session: &Arc<Mutex<EditorSession>>,
        prompt: &str,
        model: Option<&str>,
    ) -> Result<FillReport, FillError> {
        {
            let mut session = session.lock().await;
            if session.ai_prompt().is_pending() {
                return Err(FillError::InFlight);
            }
            session.ai_prompt_mut().set_text(prompt);
        }
        self.submit(session, model).await
    }

    /// Submit the session's current prompt.
    ///
    /// On success the grid is grown if needed and every decoded cell is
    /// written in one batch; the prompt is then cleared. On failure the grid
    /// is untouched and the prompt is kept. The pending flag is always
    /// released, except when the submission itself was refused.
    pub async fn submit(
        &self,
        session: &Arc<Mutex<EditorSession>>,
        model: Option<&str>,
    ) -> Result<FillReport, FillError> {
        let prompt = session
            .lock()
            .await
            .ai_prompt_mut()
            .begin()
            .map_err(|rejection| match rejection {
                PromptRejection::Empty => FillError::EmptyPrompt,
                PromptRejection::InFlight => FillError::InFlight,
            })?;

        let request = FillRequest {
            prompt,
            model: model
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .unwrap_or(&self.default_model)
                .to_string(),
        };

        let task = tokio::spawn(run_fill(
            self.client.clone(),
            self.settle,
            Arc::clone(session),
            request,
        ));

        match task.await {
            Ok(result) => result,
            Err(e) => {
                // the task died before it could release the flag
                session.lock().await.ai_prompt_mut().finish(false);
                tracing::error!(error = %e, "AI fill task failed");
                Err(FillError::Interrupted(e.to_string()))
            }
        }
    }
}

/// Fetch, apply, then release the pending flag
async fn run_fill(
    client: CellMapClient,
    settle: Duration,
    session: Arc<Mutex<EditorSession>>,
    request: FillRequest,
) -> Result<FillReport, FillError> {
    let result = fetch_and_apply(&client, settle, &session, &request).await;

    session.lock().await.ai_prompt_mut().finish(result.is_ok());

    match &result {
        Ok(report) => tracing::info!(
            applied = report.applied,
            skipped = report.skipped.len(),
            grew = report.grew,
            "Applied AI cell map"
        ),
        Err(e) => tracing::warn!(error = %e, "AI fill failed"),
    }
    result
}

async fn fetch_and_apply(
    client: &CellMapClient,
    settle: Duration,
    session: &Mutex<EditorSession>,
    request: &FillRequest,
) -> Result<FillReport, FillError> {
    let map = client.generate(request).await?;
    let plan = FillPlan::from_cell_map(&map);

    let grew = session.lock().await.ensure_size(plan.rows, plan.cols);
    if grew && !settle.is_zero() {
        tokio::time::sleep(settle).await;
    }

    let applied = session.lock().await.set_cells(&plan.updates);

    Ok(FillReport {
        applied,
        skipped: plan.skipped,
        grew,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use sheetsmith_core::CellCoord;

    fn orchestrator(base_url: &str) -> FillOrchestrator {
        FillOrchestrator::new(CellMapClient::new(base_url).unwrap(), "default-model")
            .with_settle(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_success_writes_cells_and_clears_prompt() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/generate-cellmap")
                    .json_body(json!({"prompt": "greet", "model": "default-model"}));
                then.status(200).json_body(json!({"c1r1": "Hello", "c2r1": "World"}));
            })
            .await;

        let session = Arc::new(Mutex::new(EditorSession::default()));
        let report = orchestrator(&server.base_url())
            .submit_prompt(&session, "  greet ", None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(report.applied, 2);
        assert!(!report.grew);

        let mut session = session.lock().await;
        assert_eq!(session.grid().get(CellCoord::new(0, 0)), Some("Hello"));
        assert_eq!(session.grid().get(CellCoord::new(0, 1)), Some("World"));
        assert!(session.ai_prompt().text.is_empty());
        assert!(!session.ai_prompt().is_pending());

        // exactly one data synchronization for the whole fill
        let patch = session.flush().unwrap();
        assert!(patch.data.is_some());
        assert!(session.flush().is_none());
    }

    #[tokio::test]
    async fn test_grid_grows_to_fit() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/generate-cellmap");
                then.status(200)
                    .json_body(json!({"c35r40": "far", "bogus": "x"}));
            })
            .await;

        let session = Arc::new(Mutex::new(EditorSession::default()));
        let report = orchestrator(&server.base_url())
            .submit_prompt(&session, "fill", Some("other-model"))
            .await
            .unwrap();

        assert!(report.grew);
        assert_eq!(report.skipped, vec!["bogus".to_string()]);

        let session = session.lock().await;
        assert_eq!(session.grid().row_count(), 40);
        assert_eq!(session.grid().col_count(), 35);
        assert_eq!(session.grid().get(CellCoord::new(39, 34)), Some("far"));
    }

    #[tokio::test]
    async fn test_failure_keeps_grid_and_prompt() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/generate-cellmap");
                then.status(500).json_body(json!({"detail": "boom"}));
            })
            .await;

        let session = Arc::new(Mutex::new(EditorSession::default()));
        session.lock().await.set_cell(CellCoord::new(2, 2), "keep");
        session.lock().await.flush();
        let before = session.lock().await.grid().clone();

        let err = orchestrator(&server.base_url())
            .submit_prompt(&session, "fill", None)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "boom");
        let mut session = session.lock().await;
        assert_eq!(session.grid(), &before);
        assert_eq!(session.ai_prompt().text, "fill");
        assert!(!session.ai_prompt().is_pending());
        assert!(session.flush().is_none());
    }

    #[tokio::test]
    async fn test_abandoned_submission_still_completes() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/generate-cellmap");
                then.status(200)
                    .delay(Duration::from_millis(300))
                    .json_body(json!({"c1r1": "late"}));
            })
            .await;

        let session = Arc::new(Mutex::new(EditorSession::default()));
        let orchestrator = orchestrator(&server.base_url());

        // the caller gives up while the backend is still answering
        let abandoned = tokio::time::timeout(
            Duration::from_millis(50),
            orchestrator.submit_prompt(&session, "fill", None),
        )
        .await;
        assert!(abandoned.is_err());
        assert!(session.lock().await.ai_prompt().is_pending());

        let mut released = false;
        for _ in 0..100 {
            if !session.lock().await.ai_prompt().is_pending() {
                released = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(released);

        {
            let session = session.lock().await;
            assert_eq!(session.grid().get(CellCoord::new(0, 0)), Some("late"));
            assert!(session.ai_prompt().text.is_empty());
        }

        // a new submission is accepted afterwards
        let report = orchestrator
            .submit_prompt(&session, "again", None)
            .await
            .unwrap();
        assert_eq!(report.applied, 1);
    }

    #[tokio::test]
    async fn test_empty_prompt_makes_no_request() {
        // nothing listens here; a request would surface as a network error
        let session = Arc::new(Mutex::new(EditorSession::default()));
        let err = orchestrator("http://127.0.0.1:9")
            .submit_prompt(&session, "   ", None)
            .await
            .unwrap_err();

        assert!(matches!(err, FillError::EmptyPrompt));
        assert!(!session.lock().await.ai_prompt().is_pending());
    }

    #[tokio::test]
    async fn test_second_submission_is_refused_while_pending() {
        let session = Arc::new(Mutex::new(EditorSession::default()));
        {
            let mut session = session.lock().await;
            session.ai_prompt_mut().set_text("first");
            session.ai_prompt_mut().begin().unwrap();
        }

        let orchestrator = orchestrator("http://127.0.0.1:9");
        let err = orchestrator.submit(&session, None).await.unwrap_err();
        assert!(matches!(err, FillError::InFlight));

        let err = orchestrator
            .submit_prompt(&session, "second", None)
            .await
            .unwrap_err();
        assert!(matches!(err, FillError::InFlight));

        // the first request still owns the flag and its prompt
        let session = session.lock().await;
        assert!(session.ai_prompt().is_pending());
        assert_eq!(session.ai_prompt().text, "first");
    }
}
