use crate::core::AppState;

/// Aborts the batch currently registered with `state`.
///
/// Returns `false` when no batch is running.
pub fn cancel_conversion(state: &AppState) -> bool {
    state.cancel_active()
}

/// Whether a batch is currently registered with `state`.
pub fn is_converting(state: &AppState) -> bool {
    state.is_busy()
}
