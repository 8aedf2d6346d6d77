use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use ems_core::{AppError, AppResult};
use ems_domain::{
    EditMode, GroupKey, GroupingPolicy, Permission, PermissionCode, PermissionId, PermissionSet,
    PermissionUpdate, Role, RoleId,
};

use crate::{
    EditorAccess, EditorNotification, EditorNotifier, NotificationKind, PermissionStore,
};

use super::{EditorSettings, PermissionMatrixEditor, SaveOutcome};

#[derive(Default)]
struct FakePermissionStore {
    roles: Vec<Role>,
    permissions: Mutex<HashMap<RoleId, PermissionSet>>,
    fetch_calls: AtomicUsize,
    submitted: Mutex<Vec<(RoleId, Vec<PermissionUpdate>)>>,
    fail_fetch: AtomicBool,
    fail_save: AtomicBool,
    save_delay: Option<Duration>,
}

#[async_trait]
impl PermissionStore for FakePermissionStore {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        Ok(self.roles.clone())
    }

    async fn get_permissions(&self, role_id: &RoleId) -> AppResult<PermissionSet> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(AppError::Internal("permission backend unavailable".to_owned()));
        }

        self.permissions
            .lock()
            .await
            .get(role_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }

    async fn update_permissions(
        &self,
        role_id: &RoleId,
        updates: Vec<PermissionUpdate>,
    ) -> AppResult<PermissionSet> {
        self.submitted
            .lock()
            .await
            .push((role_id.clone(), updates.clone()));

        if let Some(delay) = self.save_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(AppError::Validation("update rejected".to_owned()));
        }

        let mut permissions = self.permissions.lock().await;
        let current = permissions
            .get(role_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;
        let updated = current
            .iter()
            .map(|permission| {
                let allowed = updates
                    .iter()
                    .find(|update| &update.permission_id == permission.permission_id())
                    .map_or(permission.allowed(), |update| update.allowed);
                Permission::new(
                    permission.permission_id().clone(),
                    permission.module(),
                    permission.code().clone(),
                    allowed,
                )
            })
            .collect::<AppResult<Vec<_>>>()?;
        let updated = PermissionSet::new(updated)?;
        permissions.insert(role_id.clone(), updated.clone());

        Ok(updated)
    }
}

#[derive(Default)]
struct RecordingNotifier {
    notifications: std::sync::Mutex<Vec<EditorNotification>>,
}

impl RecordingNotifier {
    fn kinds(&self) -> Vec<NotificationKind> {
        self.notifications
            .lock()
            .map(|notifications| {
                notifications
                    .iter()
                    .map(|notification| notification.kind)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl EditorNotifier for RecordingNotifier {
    fn notify(&self, notification: EditorNotification) {
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push(notification);
        }
    }
}

fn permission(id: &str, module: &str, code: &str, allowed: bool) -> AppResult<Permission> {
    Permission::new(
        PermissionId::new(id)?,
        module,
        PermissionCode::new(code)?,
        allowed,
    )
}

fn role(id: &str, name: &str) -> AppResult<Role> {
    Role::new(RoleId::new(id)?, name, None)
}

fn qa_permissions() -> AppResult<PermissionSet> {
    PermissionSet::new(vec![
        permission("view", "Tasks", "tasks.board.view", true)?,
        permission("create", "Tasks", "tasks.board.create", false)?,
        permission("edit", "Tasks", "tasks.board.edit", false)?,
    ])
}

fn admin_permissions() -> AppResult<PermissionSet> {
    PermissionSet::new(vec![
        permission("a1", "Employees", "employees.profile.view", true)?,
        permission("a2", "IT Asset Management", "it_assets.assets.view", false)?,
        permission("a3", "IT Asset Management", "it_assets.unknownmenu.view", false)?,
        permission("a4", "Settings", "settings.general.edit", true)?,
    ])
}

fn fake_store() -> AppResult<FakePermissionStore> {
    let qa = RoleId::new("QA")?;
    let super_admin = RoleId::new("SA")?;
    let admin = RoleId::new("ADM")?;

    Ok(FakePermissionStore {
        roles: vec![
            role("QA", "QA")?,
            role("SA", "Super Admin")?,
            role("ADM", "Admin")?,
        ],
        permissions: Mutex::new(HashMap::from([
            (qa, qa_permissions()?),
            (super_admin, qa_permissions()?),
            (admin, admin_permissions()?),
        ])),
        ..FakePermissionStore::default()
    })
}

fn editor(
    store: Arc<FakePermissionStore>,
    access: EditorAccess,
) -> (PermissionMatrixEditor, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let editor = PermissionMatrixEditor::new(
        store,
        notifier.clone(),
        access,
        GroupingPolicy::default(),
        EditorSettings {
            save_timeout: Duration::from_secs(5),
        },
    );
    (editor, notifier)
}

async fn loaded_editor(
    store: Arc<FakePermissionStore>,
    role_id: &RoleId,
) -> AppResult<(PermissionMatrixEditor, Arc<RecordingNotifier>)> {
    let (mut editor, notifier) = editor(store, EditorAccess::Manage);
    editor.load_roles().await?;
    editor.select_role(role_id).await?;
    Ok((editor, notifier))
}

fn values(editor: &PermissionMatrixEditor, role_id: &RoleId, ids: &[&str]) -> Vec<Option<bool>> {
    ids.iter()
        .map(|id| {
            PermissionId::new(*id)
                .ok()
                .and_then(|id| editor.effective_value(role_id, &id))
        })
        .collect()
}

#[tokio::test]
async fn qa_group_toggle_then_cancel_reverts() -> AppResult<()> {
    let qa = RoleId::new("QA")?;
    let tasks = GroupKey::Module("Tasks".to_owned());
    let (mut editor, _) = loaded_editor(Arc::new(fake_store()?), &qa).await?;

    editor.begin_edit(&qa)?;
    editor.toggle_group(&qa, &tasks, true)?;

    assert!(editor.is_group_fully_checked(&qa, &tasks));
    assert!(!editor.is_group_partially_checked(&qa, &tasks));
    assert_eq!(
        values(&editor, &qa, &["view", "create", "edit"]),
        vec![Some(true), Some(true), Some(true)]
    );

    editor.cancel_edit(&qa)?;
    assert_eq!(editor.mode(&qa), Some(EditMode::Viewing));
    assert_eq!(
        values(&editor, &qa, &["view", "create", "edit"]),
        vec![Some(true), Some(false), Some(false)]
    );
    Ok(())
}

#[tokio::test]
async fn select_role_fetches_only_on_first_expansion() -> AppResult<()> {
    let qa = RoleId::new("QA")?;
    let store = Arc::new(fake_store()?);
    let (mut editor, _) = editor(store.clone(), EditorAccess::Manage);
    editor.load_roles().await?;

    assert!(editor.select_role(&qa).await?);
    assert!(!editor.select_role(&qa).await?);
    assert!(editor.select_role(&qa).await?);

    assert_eq!(store.fetch_calls.load(Ordering::SeqCst), 1);
    assert!(editor.is_expanded(&qa));
    Ok(())
}

#[tokio::test]
async fn super_admin_edit_is_refused_locally() -> AppResult<()> {
    let super_admin = RoleId::new("SA")?;
    let store = Arc::new(fake_store()?);
    let (mut editor, notifier) = loaded_editor(store.clone(), &super_admin).await?;
    let calls_before = store.fetch_calls.load(Ordering::SeqCst);

    let result = editor.begin_edit(&super_admin);

    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert_eq!(editor.mode(&super_admin), Some(EditMode::Viewing));
    assert_eq!(store.fetch_calls.load(Ordering::SeqCst), calls_before);
    assert!(store.submitted.lock().await.is_empty());
    assert_eq!(notifier.kinds(), vec![NotificationKind::PermissionDenied]);
    Ok(())
}

#[tokio::test]
async fn save_submits_complete_snapshot_and_adopts_server_set() -> AppResult<()> {
    let qa = RoleId::new("QA")?;
    let store = Arc::new(fake_store()?);
    let (mut editor, notifier) = loaded_editor(store.clone(), &qa).await?;

    editor.begin_edit(&qa)?;
    editor.toggle_permission(&qa, &PermissionId::new("edit")?, true)?;
    editor.save(&qa).await?;

    let submitted = store.submitted.lock().await.clone();
    assert_eq!(submitted.len(), 1);
    let snapshot = submitted[0]
        .1
        .iter()
        .map(|update| (update.permission_id.as_str().to_owned(), update.allowed))
        .collect::<Vec<_>>();
    assert_eq!(
        snapshot,
        vec![
            ("view".to_owned(), true),
            ("create".to_owned(), false),
            ("edit".to_owned(), true),
        ]
    );

    assert_eq!(editor.mode(&qa), Some(EditMode::Viewing));
    assert!(editor.matrix(&qa).is_some_and(|matrix| matrix.overlay().is_none()));
    assert_eq!(
        values(&editor, &qa, &["view", "create", "edit"]),
        vec![Some(true), Some(false), Some(true)]
    );
    assert_eq!(notifier.kinds(), vec![NotificationKind::Saved]);
    Ok(())
}

#[tokio::test]
async fn rejected_save_keeps_overlay_and_editing_mode() -> AppResult<()> {
    let qa = RoleId::new("QA")?;
    let store = Arc::new(fake_store()?);
    store.fail_save.store(true, Ordering::SeqCst);
    let (mut editor, notifier) = loaded_editor(store.clone(), &qa).await?;

    editor.begin_edit(&qa)?;
    editor.toggle_permission(&qa, &PermissionId::new("create")?, true)?;
    let overlay_before = editor
        .matrix(&qa)
        .and_then(|matrix| matrix.overlay().cloned());

    let result = editor.save(&qa).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(editor.mode(&qa), Some(EditMode::Editing));
    assert_eq!(
        editor
            .matrix(&qa)
            .and_then(|matrix| matrix.overlay().cloned()),
        overlay_before
    );
    assert_eq!(notifier.kinds(), vec![NotificationKind::SaveFailure]);

    store.fail_save.store(false, Ordering::SeqCst);
    editor.save(&qa).await?;
    assert_eq!(editor.mode(&qa), Some(EditMode::Viewing));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn unacknowledged_save_times_out_back_to_editing() -> AppResult<()> {
    let qa = RoleId::new("QA")?;
    let mut store = fake_store()?;
    store.save_delay = Some(Duration::from_secs(60));
    let (mut editor, notifier) = loaded_editor(Arc::new(store), &qa).await?;

    editor.begin_edit(&qa)?;
    editor.toggle_permission(&qa, &PermissionId::new("create")?, true)?;
    let result = editor.save(&qa).await;

    assert!(matches!(result, Err(AppError::Internal(_))));
    assert_eq!(editor.mode(&qa), Some(EditMode::Editing));
    assert_eq!(
        editor.effective_value(&qa, &PermissionId::new("create")?),
        Some(true)
    );
    assert_eq!(notifier.kinds(), vec![NotificationKind::SaveTimedOut]);
    Ok(())
}

#[tokio::test]
async fn two_phase_save_exposes_saving_mode() -> AppResult<()> {
    let qa = RoleId::new("QA")?;
    let (mut editor, _) = loaded_editor(Arc::new(fake_store()?), &qa).await?;

    editor.begin_edit(&qa)?;
    let request = editor.prepare_save(&qa)?;
    assert_eq!(request.updates.len(), 3);
    assert_eq!(editor.mode(&qa), Some(EditMode::Saving));
    assert!(matches!(
        editor.toggle_permission(&qa, &PermissionId::new("edit")?, true),
        Err(AppError::Conflict(_))
    ));

    editor.complete_save(&qa, qa_permissions())?;
    assert_eq!(editor.mode(&qa), Some(EditMode::Viewing));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn submitted_save_leaves_editor_readable_until_finished() -> AppResult<()> {
    let qa = RoleId::new("QA")?;
    let mut store = fake_store()?;
    store.save_delay = Some(Duration::from_secs(2));
    let store = Arc::new(store);
    let (mut editor, notifier) = loaded_editor(store.clone(), &qa).await?;

    editor.begin_edit(&qa)?;
    editor.toggle_permission(&qa, &PermissionId::new("create")?, true)?;
    let submission = editor.save_submission(&qa)?;
    assert_eq!(submission.request().updates.len(), 3);

    let in_flight = tokio::spawn(submission.submit());
    tokio::task::yield_now().await;
    assert_eq!(editor.matrix_view(&qa)?.mode, EditMode::Saving);

    let outcome = in_flight
        .await
        .map_err(|error| AppError::Internal(error.to_string()))?;
    editor.finish_save(outcome)?;

    assert_eq!(editor.mode(&qa), Some(EditMode::Viewing));
    assert_eq!(
        editor.effective_value(&qa, &PermissionId::new("create")?),
        Some(true)
    );
    assert_eq!(notifier.kinds(), vec![NotificationKind::Saved]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn submitted_save_past_timeout_settles_back_to_editing() -> AppResult<()> {
    let qa = RoleId::new("QA")?;
    let mut store = fake_store()?;
    store.save_delay = Some(Duration::from_secs(60));
    let (mut editor, notifier) = loaded_editor(Arc::new(store), &qa).await?;

    editor.begin_edit(&qa)?;
    let outcome = editor.save_submission(&qa)?.submit().await;
    assert!(matches!(outcome, SaveOutcome::TimedOut { .. }));

    assert!(matches!(editor.finish_save(outcome), Err(AppError::Internal(_))));
    assert_eq!(editor.mode(&qa), Some(EditMode::Editing));
    assert_eq!(notifier.kinds(), vec![NotificationKind::SaveTimedOut]);
    Ok(())
}

#[tokio::test]
async fn stale_fetch_response_is_discarded() -> AppResult<()> {
    let qa = RoleId::new("QA")?;
    let (mut editor, _) = editor(Arc::new(fake_store()?), EditorAccess::Manage);
    editor.load_roles().await?;

    let older = editor.begin_fetch(&qa)?;
    let newer = editor.begin_fetch(&qa)?;
    let fresh = PermissionSet::new(vec![permission("view", "Tasks", "tasks.board.view", false)?])?;

    assert!(editor.apply_fetch(newer, Ok(fresh.clone()))?);
    assert!(!editor.apply_fetch(older, qa_permissions())?);
    assert_eq!(editor.matrix(&qa).map(|matrix| matrix.baseline()), Some(&fresh));
    Ok(())
}

#[tokio::test]
async fn background_refresh_during_edit_merges_new_permissions() -> AppResult<()> {
    let qa = RoleId::new("QA")?;
    let store = Arc::new(fake_store()?);
    let (mut editor, _) = loaded_editor(store.clone(), &qa).await?;

    editor.begin_edit(&qa)?;
    editor.toggle_permission(&qa, &PermissionId::new("create")?, true)?;
    store.permissions.lock().await.insert(
        qa.clone(),
        PermissionSet::new(vec![
            permission("view", "Tasks", "tasks.board.view", true)?,
            permission("create", "Tasks", "tasks.board.create", false)?,
            permission("edit", "Tasks", "tasks.board.edit", false)?,
            permission("archive", "Tasks", "tasks.board.archive", true)?,
        ])?,
    );

    editor.refresh_role(&qa).await?;

    assert_eq!(editor.mode(&qa), Some(EditMode::Editing));
    assert_eq!(
        values(&editor, &qa, &["view", "create", "edit", "archive"]),
        vec![Some(true), Some(true), Some(false), Some(true)]
    );
    assert_eq!(
        editor
            .matrix(&qa)
            .and_then(|matrix| matrix.overlay().map(|overlay| overlay.len())),
        Some(4)
    );
    Ok(())
}

#[tokio::test]
async fn failed_refresh_keeps_last_baseline() -> AppResult<()> {
    let qa = RoleId::new("QA")?;
    let store = Arc::new(fake_store()?);
    let (mut editor, notifier) = loaded_editor(store.clone(), &qa).await?;
    store.fail_fetch.store(true, Ordering::SeqCst);

    let result = editor.refresh_role(&qa).await;

    assert!(result.is_err());
    assert_eq!(
        editor.matrix(&qa).map(|matrix| matrix.baseline().clone()),
        Some(qa_permissions()?)
    );
    assert_eq!(notifier.kinds(), vec![NotificationKind::FetchFailure]);
    Ok(())
}

#[tokio::test]
async fn first_fetch_failure_collapses_and_retries_on_next_selection() -> AppResult<()> {
    let qa = RoleId::new("QA")?;
    let store = Arc::new(fake_store()?);
    store.fail_fetch.store(true, Ordering::SeqCst);
    let (mut editor, notifier) = editor(store.clone(), EditorAccess::Manage);
    editor.load_roles().await?;

    assert!(editor.select_role(&qa).await.is_err());
    assert!(editor.matrix(&qa).is_none());
    assert!(!editor.is_expanded(&qa));
    assert_eq!(notifier.kinds(), vec![NotificationKind::FetchFailure]);

    store.fail_fetch.store(false, Ordering::SeqCst);
    assert!(editor.select_role(&qa).await?);
    assert!(editor.matrix(&qa).is_some());
    assert_eq!(store.fetch_calls.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn view_only_access_cannot_edit() -> AppResult<()> {
    let qa = RoleId::new("QA")?;
    let (mut editor, notifier) = editor(Arc::new(fake_store()?), EditorAccess::ViewOnly);
    editor.load_roles().await?;
    editor.select_role(&qa).await?;

    assert!(matches!(editor.begin_edit(&qa), Err(AppError::Forbidden(_))));
    assert!(editor.matrix_view(&qa).is_ok());
    assert_eq!(notifier.kinds(), vec![NotificationKind::PermissionDenied]);
    Ok(())
}

#[tokio::test]
async fn denied_access_cannot_list_roles() -> AppResult<()> {
    let (mut editor, notifier) = editor(Arc::new(fake_store()?), EditorAccess::Denied);

    assert!(matches!(editor.load_roles().await, Err(AppError::Forbidden(_))));
    assert!(editor.roles().is_empty());
    assert_eq!(notifier.kinds(), vec![NotificationKind::PermissionDenied]);
    Ok(())
}

#[tokio::test]
async fn matrix_view_groups_asset_submenus_and_hides_excluded() -> AppResult<()> {
    let admin = RoleId::new("ADM")?;
    let (editor, _) = loaded_editor(Arc::new(fake_store()?), &admin).await?;

    let view = editor.matrix_view(&admin)?;
    let keys = view
        .groups
        .iter()
        .map(|group| group.key.to_string())
        .collect::<Vec<_>>();

    assert_eq!(keys, vec!["Employees", "IT Asset Management::Assets"]);
    assert_eq!(view.visible_count, 2);
    assert!(view.all_partially_checked);
    assert!(!view.all_checked);
    assert_eq!(view.groups[1].label, "Assets");
    Ok(())
}

#[tokio::test]
async fn check_all_covers_every_visible_permission() -> AppResult<()> {
    let admin = RoleId::new("ADM")?;
    let (mut editor, _) = loaded_editor(Arc::new(fake_store()?), &admin).await?;

    editor.begin_edit(&admin)?;
    let touched = editor.toggle_group(&admin, &GroupKey::AllVisible, true)?;
    let view = editor.matrix_view(&admin)?;

    assert_eq!(touched, 2);
    assert!(view.all_checked);
    assert!(view.groups.iter().all(|group| group.fully_checked));
    assert_eq!(
        values(&editor, &admin, &["a3"]),
        vec![Some(false)],
        "hidden permissions are not touched by check all"
    );
    Ok(())
}
