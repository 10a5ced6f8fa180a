use crate::models::Job;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use time::macros::format_description;
use time::OffsetDateTime;
use uuid::Uuid;

/// Client-wide registry of the jobs started through it, keyed by generated names.
///
/// Entries are clones of the [Job] returned to the caller and share its state.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry(Arc<Mutex<BTreeMap<String, Job>>>);

impl JobRegistry {
    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Job>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn insert(&self, key: String, job: Job) {
        self.lock().insert(key, job);
    }

    /// Look up a job by its registry key.
    pub fn get(&self, key: &str) -> Option<Job> {
        self.lock().get(key).cloned()
    }

    /// Registry keys, in lexical order.
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Jobs whose display name is `name`.
    pub fn find_by_name(&self, name: &str) -> Vec<Job> {
        self.lock()
            .values()
            .filter(|job| job.name() == name)
            .cloned()
            .collect()
    }

    /// Forget a job. Does not affect the job on the server.
    pub fn remove(&self, key: &str) -> Option<Job> {
        self.lock().remove(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Produce the display name and the registry key of a new job.
///
/// The display name is `name`, or `default_name` if not given. The key is the
/// display name followed by the current UTC time and a random suffix.
pub fn job_names(name: Option<&str>, default_name: &str) -> (String, String) {
    let display_name = name.unwrap_or(default_name).to_string();
    let now = OffsetDateTime::now_utc();
    let timestamp = now
        .format(format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .unwrap_or_else(|_| now.unix_timestamp().to_string());
    let suffix = Uuid::new_v4().simple().to_string();
    let key = format!("{}_{}_{}", display_name, timestamp, &suffix[..8]);
    (display_name, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_job_names() {
        let (name, key) = job_names(Some("test"), "def_job_name");
        assert_eq!(name, "test");
        assert!(key.starts_with("test_"));
    }

    #[test]
    fn test_job_names_using_own_default() {
        let (name, key) = job_names(None, "def_job_name");
        assert_eq!(name, "def_job_name");
        assert!(key.contains("job"));
    }

    #[test]
    fn test_job_names_using_default() {
        let (name, key) = job_names(None, crate::constants::DEFAULT_JOB_NAME);
        assert_eq!(name, "unknown_job");
        assert!(key.starts_with("unknown_job_"));
    }

    #[test]
    fn test_job_keys_do_not_collide() {
        let keys: HashSet<String> = (0..100).map(|_| job_names(None, "same").1).collect();
        assert_eq!(keys.len(), 100);
    }
}
