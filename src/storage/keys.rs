//! Record key layout shared by every backend.

#[must_use]
pub fn job_key(run_id: &str) -> String {
    format!("JOB_{}", run_id)
}

#[must_use]
pub fn task_key(run_id: &str, task_id: &str) -> String {
    format!("JOB_{}_TASK_{}", run_id, task_id)
}

#[must_use]
pub fn task_index_key(run_id: &str) -> String {
    format!("JOB_{}_TASKS", run_id)
}
