use tauri::AppHandle;
use tokio::sync::oneshot;

/// Runs `task` on the event-loop thread. Called from the main thread itself
/// the task may run inline.
pub(crate) fn run_on_main_thread_dispatch<F>(
    app_handle: &AppHandle,
    task_name: &str,
    task: F,
) -> Result<(), String>
where
    F: FnOnce(&AppHandle) + Send + 'static,
{
    let app_for_task = app_handle.clone();
    app_handle
        .run_on_main_thread(move || task(&app_for_task))
        .map_err(|error| format!("Failed to dispatch {task_name} to the main thread: {error}"))
}

/// Always queues `task` behind whatever the main thread is doing now. Window
/// event handlers use this since they can fire while shell state is locked.
pub(crate) fn defer_to_main_thread<F>(app_handle: &AppHandle, task_name: &'static str, task: F)
where
    F: FnOnce(&AppHandle) + Send + 'static,
{
    let app_handle = app_handle.clone();
    tauri::async_runtime::spawn(async move {
        if let Err(error) = run_on_main_thread_dispatch(&app_handle, task_name, task) {
            crate::append_desktop_log(&error);
        }
    });
}

pub(crate) async fn run_on_main_thread_with_result<T, F>(
    app_handle: &AppHandle,
    task_name: &str,
    task: F,
) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce(&AppHandle) -> T + Send + 'static,
{
    let (sender, receiver) = oneshot::channel();
    run_on_main_thread_dispatch(app_handle, task_name, move |app| {
        let _ = sender.send(task(app));
    })?;
    receiver
        .await
        .map_err(|_| format!("Main thread dropped {task_name} before it completed."))
}
