#[cfg(feature = "cli")]
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};

/// Effective uid of the current process. `None` when the platform has no
/// numeric uids or the process table cannot be read.
#[cfg(feature = "cli")]
pub fn effective_uid() -> Option<u32> {
    let pid = sysinfo::get_current_pid().ok()?;

    // 只刷新自己的使用者資訊
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        false,
        ProcessRefreshKind::nothing().with_user(UpdateKind::Always),
    );

    let process = system.process(pid)?;
    numeric_uid(process.effective_user_id()?)
}

#[cfg(not(feature = "cli"))]
pub fn effective_uid() -> Option<u32> {
    None
}

#[cfg(all(feature = "cli", unix))]
fn numeric_uid(uid: &sysinfo::Uid) -> Option<u32> {
    Some(**uid)
}

#[cfg(all(feature = "cli", not(unix)))]
fn numeric_uid(_uid: &sysinfo::Uid) -> Option<u32> {
    None
}

pub fn is_root() -> bool {
    effective_uid() == Some(0)
}

pub fn warn_if_root() {
    if is_root() {
        tracing::warn!("⚠️ Running as root; the container image ships a dedicated non-root user");
    }
}
