use std::time::Duration;

use ems_domain::PermissionSet;
use tracing::info;

use super::*;

/// A prepared save that can be submitted without borrowing the editor.
///
/// The role stays in saving mode until the outcome is handed back through
/// [`PermissionMatrixEditor::finish_save`].
pub struct SaveSubmission {
    store: Arc<dyn PermissionStore>,
    request: SaveRequest,
    timeout: Duration,
}

/// Store answer to a submitted save.
#[derive(Debug)]
pub enum SaveOutcome {
    /// The store answered within the timeout.
    Answered {
        /// Role that was saved.
        role_id: RoleId,
        /// Authoritative set or the store error.
        result: AppResult<PermissionSet>,
    },
    /// The store did not answer in time.
    TimedOut {
        /// Role that was saved.
        role_id: RoleId,
        /// Timeout that elapsed.
        after: Duration,
    },
}

impl SaveSubmission {
    /// Returns the snapshot being submitted.
    #[must_use]
    pub fn request(&self) -> &SaveRequest {
        &self.request
    }

    /// Sends the snapshot to the store, bounded by the editor's save timeout.
    pub async fn submit(self) -> SaveOutcome {
        let Self {
            store,
            request,
            timeout,
        } = self;
        let SaveRequest { role_id, updates } = request;

        let answer =
            tokio::time::timeout(timeout, store.update_permissions(&role_id, updates)).await;
        match answer {
            Ok(result) => SaveOutcome::Answered { role_id, result },
            Err(_) => SaveOutcome::TimedOut {
                role_id,
                after: timeout,
            },
        }
    }
}

impl PermissionMatrixEditor {
    /// Submits the complete permission snapshot of a role and awaits the store.
    ///
    /// A save that is not acknowledged within
    /// [`EditorSettings::save_timeout`] falls back to editing with the
    /// overlay intact. There is no automatic retry.
    pub async fn save(&mut self, role_id: &RoleId) -> AppResult<()> {
        let submission = self.save_submission(role_id)?;
        let outcome = submission.submit().await;
        self.finish_save(outcome)
    }

    /// Moves a role into saving and returns the snapshot to submit.
    pub fn prepare_save(&mut self, role_id: &RoleId) -> AppResult<SaveRequest> {
        self.require_manage(role_id)?;
        let updates = self.matrix_mut(role_id)?.begin_save()?;
        info!(role_id = %role_id, entries = updates.len(), "submitting permission snapshot");

        Ok(SaveRequest {
            role_id: role_id.clone(),
            updates,
        })
    }

    /// Like [`Self::prepare_save`], bundled with the store and timeout so
    /// the round trip can run while the editor is free for reads.
    pub fn save_submission(&mut self, role_id: &RoleId) -> AppResult<SaveSubmission> {
        let request = self.prepare_save(role_id)?;

        Ok(SaveSubmission {
            store: Arc::clone(&self.store),
            request,
            timeout: self.settings.save_timeout,
        })
    }

    /// Settles a submitted save.
    pub fn finish_save(&mut self, outcome: SaveOutcome) -> AppResult<()> {
        match outcome {
            SaveOutcome::Answered { role_id, result } => self.complete_save(&role_id, result),
            SaveOutcome::TimedOut { role_id, after } => {
                let error = AppError::Internal(format!(
                    "permission store did not acknowledge within {} ms",
                    after.as_millis()
                ));
                self.settle_failed_save(&role_id, NotificationKind::SaveTimedOut, error)
            }
        }
    }

    /// Applies the store's answer to a prepared save.
    ///
    /// On success the returned set becomes the new baseline. On failure the
    /// role goes back to editing and the overlay is kept.
    pub fn complete_save(
        &mut self,
        role_id: &RoleId,
        result: AppResult<PermissionSet>,
    ) -> AppResult<()> {
        let confirmed = match result {
            Ok(confirmed) => confirmed,
            Err(error) => {
                return self.settle_failed_save(role_id, NotificationKind::SaveFailure, error);
            }
        };

        self.matrix_mut(role_id)?.complete_save(confirmed)?;
        let role_name = self
            .find_role(role_id)
            .map(|role| role.name().to_owned())
            .unwrap_or_else(|_| role_id.to_string());
        info!(role_id = %role_id, "permission snapshot saved");
        self.notifier.notify(EditorNotification::new(
            NotificationKind::Saved,
            Some(role_id.clone()),
            format!("Permissions for '{role_name}' saved"),
        ));

        Ok(())
    }

    fn settle_failed_save(
        &mut self,
        role_id: &RoleId,
        kind: NotificationKind,
        error: AppError,
    ) -> AppResult<()> {
        self.matrix_mut(role_id)?.fail_save()?;
        self.report(kind, Some(role_id), &error);
        Err(error)
    }
}
