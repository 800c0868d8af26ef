//! The image-deletion confirmation dialog.
//!
//! Deleting an image record outright is gated by the same two-step shape as
//! membership removal (closed → pending confirmation → confirm/cancel), with
//! one addition: opening the dialog kicks off a usage check so the user sees
//! which galleries the deletion would cascade through before deciding.
//!
//! The dialog never performs the check or the deletion itself — the caller
//! runs the catalog query and feeds the outcome back through
//! [`resolve_usage`], and [`confirm`] hands back a [`DeleteRequest`] for the
//! caller to execute. That keeps the state machine synchronous and testable
//! while the I/O happens wherever the caller wants it.
//!
//! ## Stale results
//!
//! Every check is tied to a [`UsageToken`] minted when the dialog opens (or
//! on [`retry`]). A result arriving with a token the dialog no longer holds
//! — the dialog was cancelled, or a retry superseded the request — is
//! discarded without touching state. This is the abort handle for in-flight
//! checks: closing the dialog invalidates the token instead of chasing the
//! request.
//!
//! ## The force flag
//!
//! | usage state at confirm | request |
//! |---|---|
//! | resolved, no referencing galleries | plain delete |
//! | resolved, one or more galleries | force delete (cascade authorized) |
//! | still in flight, or check failed | force delete |
//!
//! Confirm is never blocked: with usage unknown the dialog cannot tell a
//! safe deletion from a cascading one, so the user-initiated action goes
//! through as a force delete rather than being silently refused.
//!
//! [`resolve_usage`]: DeletionDialog::resolve_usage
//! [`retry`]: DeletionDialog::retry
//! [`confirm`]: DeletionDialog::confirm

use crate::types::ImageUsage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DialogError {
    #[error("A deletion is already awaiting confirmation")]
    DialogOpen,
    #[error("No deletion is awaiting confirmation")]
    DialogClosed,
}

/// Handle tying one usage-check request to the dialog generation that
/// issued it. Results presented with a stale token are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageToken(u64);

/// Lifecycle of the usage check shown inside the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageState {
    /// Request in flight; the dialog shows a loading affordance.
    Pending,
    /// Galleries referencing the image (possibly none).
    Ready(Vec<ImageUsage>),
    /// The check failed; a retry is offered.
    Failed(String),
}

/// The deletion the caller should execute after a confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub image_id: String,
    /// True when the server-side cascade must be explicitly authorized.
    pub force: bool,
}

#[derive(Debug)]
struct PendingDeletion {
    image_id: String,
    usage: UsageState,
    token: u64,
}

/// The dialog itself. Modal: one pending target at a time.
#[derive(Debug, Default)]
pub struct DeletionDialog {
    pending: Option<PendingDeletion>,
    next_token: u64,
}

impl DeletionDialog {
    pub fn new() -> Self {
        Self::default()
    }

    fn mint_token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    /// Open the dialog for an image. Returns the token the caller must
    /// attach to the usage-check result. Errors while another deletion is
    /// pending — the dialog is modal.
    pub fn open(&mut self, image_id: &str) -> Result<UsageToken, DialogError> {
        if self.pending.is_some() {
            return Err(DialogError::DialogOpen);
        }
        let token = self.mint_token();
        self.pending = Some(PendingDeletion {
            image_id: image_id.to_string(),
            usage: UsageState::Pending,
            token,
        });
        Ok(UsageToken(token))
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    /// The image awaiting confirmation, if any.
    pub fn target(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.image_id.as_str())
    }

    /// Current usage-check state, while the dialog is open.
    pub fn usage(&self) -> Option<&UsageState> {
        self.pending.as_ref().map(|p| &p.usage)
    }

    /// Apply a usage-check outcome. Results carrying a stale token — the
    /// dialog was closed or the request superseded — are silently dropped.
    /// Returns whether the result was applied.
    pub fn resolve_usage(
        &mut self,
        token: UsageToken,
        outcome: Result<Vec<ImageUsage>, String>,
    ) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        if pending.token != token.0 {
            return false;
        }
        pending.usage = match outcome {
            Ok(usages) => UsageState::Ready(usages),
            Err(message) => UsageState::Failed(message),
        };
        true
    }

    /// Re-run the usage check after a failure. Mints a fresh token; the
    /// superseded request's eventual result will be discarded.
    pub fn retry(&mut self) -> Result<UsageToken, DialogError> {
        let token = self.mint_token();
        let pending = self.pending.as_mut().ok_or(DialogError::DialogClosed)?;
        pending.usage = UsageState::Pending;
        pending.token = token;
        Ok(UsageToken(token))
    }

    /// Confirm the deletion. Closes the dialog and returns the request the
    /// caller must issue; the force flag follows the table in the module
    /// docs.
    pub fn confirm(&mut self) -> Result<DeleteRequest, DialogError> {
        let pending = self.pending.take().ok_or(DialogError::DialogClosed)?;
        let force = match &pending.usage {
            UsageState::Ready(usages) => !usages.is_empty(),
            UsageState::Pending | UsageState::Failed(_) => true,
        };
        Ok(DeleteRequest {
            image_id: pending.image_id,
            force,
        })
    }

    /// Close without deleting. Whatever the in-flight check returns later
    /// is discarded.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(title: &str, is_cover: bool) -> ImageUsage {
        ImageUsage {
            gallery_id: format!("g-{title}"),
            gallery_title: title.to_string(),
            is_cover,
        }
    }

    #[test]
    fn open_starts_pending_with_target() {
        let mut dialog = DeletionDialog::new();
        dialog.open("img-1").unwrap();
        assert!(dialog.is_open());
        assert_eq!(dialog.target(), Some("img-1"));
        assert_eq!(dialog.usage(), Some(&UsageState::Pending));
    }

    #[test]
    fn dialog_is_modal() {
        let mut dialog = DeletionDialog::new();
        dialog.open("img-1").unwrap();
        assert!(matches!(dialog.open("img-2"), Err(DialogError::DialogOpen)));
        assert_eq!(dialog.target(), Some("img-1"));
    }

    #[test]
    fn confirm_with_no_usages_is_a_plain_delete() {
        let mut dialog = DeletionDialog::new();
        let token = dialog.open("img-1").unwrap();
        assert!(dialog.resolve_usage(token, Ok(vec![])));
        let request = dialog.confirm().unwrap();
        assert_eq!(
            request,
            DeleteRequest {
                image_id: "img-1".into(),
                force: false,
            }
        );
        assert!(!dialog.is_open());
    }

    #[test]
    fn confirm_with_usages_forces() {
        let mut dialog = DeletionDialog::new();
        let token = dialog.open("img-1").unwrap();
        dialog.resolve_usage(token, Ok(vec![usage("Coastline", true)]));
        let request = dialog.confirm().unwrap();
        assert!(request.force);
    }

    #[test]
    fn confirm_while_check_in_flight_forces() {
        let mut dialog = DeletionDialog::new();
        dialog.open("img-1").unwrap();
        let request = dialog.confirm().unwrap();
        assert!(request.force);
    }

    #[test]
    fn confirm_after_failed_check_forces() {
        let mut dialog = DeletionDialog::new();
        let token = dialog.open("img-1").unwrap();
        dialog.resolve_usage(token, Err("connection reset".into()));
        assert!(matches!(dialog.usage(), Some(UsageState::Failed(m)) if m == "connection reset"));
        let request = dialog.confirm().unwrap();
        assert!(request.force);
    }

    #[test]
    fn confirm_on_closed_dialog_errors() {
        let mut dialog = DeletionDialog::new();
        assert!(matches!(dialog.confirm(), Err(DialogError::DialogClosed)));
    }

    #[test]
    fn cancel_discards_target_and_later_result() {
        let mut dialog = DeletionDialog::new();
        let token = dialog.open("img-1").unwrap();
        dialog.cancel();
        assert!(!dialog.is_open());
        // The in-flight check resolves after the cancel: discarded.
        assert!(!dialog.resolve_usage(token, Ok(vec![usage("Coastline", false)])));
        assert!(!dialog.is_open());
    }

    #[test]
    fn stale_token_after_retry_is_discarded() {
        let mut dialog = DeletionDialog::new();
        let first = dialog.open("img-1").unwrap();
        dialog.resolve_usage(first, Err("timeout".into()));
        let second = dialog.retry().unwrap();
        assert_eq!(dialog.usage(), Some(&UsageState::Pending));

        // The first request limps home late — ignored.
        assert!(!dialog.resolve_usage(first, Ok(vec![usage("Old", false)])));
        assert_eq!(dialog.usage(), Some(&UsageState::Pending));

        // The retry's own result lands.
        assert!(dialog.resolve_usage(second, Ok(vec![])));
        assert_eq!(dialog.usage(), Some(&UsageState::Ready(vec![])));
    }

    #[test]
    fn retry_on_closed_dialog_errors() {
        let mut dialog = DeletionDialog::new();
        assert!(matches!(dialog.retry(), Err(DialogError::DialogClosed)));
    }

    #[test]
    fn reopen_after_cancel_mints_fresh_token() {
        let mut dialog = DeletionDialog::new();
        let first = dialog.open("img-1").unwrap();
        dialog.cancel();
        let second = dialog.open("img-2").unwrap();
        assert_ne!(first, second);
        assert_eq!(dialog.target(), Some("img-2"));
    }

    #[test]
    fn usage_report_retains_cover_flags() {
        let mut dialog = DeletionDialog::new();
        let token = dialog.open("img-1").unwrap();
        dialog.resolve_usage(
            token,
            Ok(vec![usage("Coastline", true), usage("Harbor", false)]),
        );
        match dialog.usage() {
            Some(UsageState::Ready(usages)) => {
                assert_eq!(usages.len(), 2);
                assert!(usages[0].is_cover);
                assert!(!usages[1].is_cover);
            }
            other => panic!("expected ready usage, got {other:?}"),
        }
    }
}
