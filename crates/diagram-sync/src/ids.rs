/// Millisecond-stamped ids that never repeat within a session, even when two
/// are requested in the same millisecond.
#[derive(Debug, Default)]
pub(crate) struct IdSource {
    last_millis: i64,
}

impl IdSource {
    pub(crate) fn next_id(&mut self, prefix: &str, taken: impl Fn(&str) -> bool) -> String {
        let mut millis = chrono::Utc::now()
            .timestamp_millis()
            .max(self.last_millis + 1);
        loop {
            let id = format!("{prefix}{millis}");
            if !taken(&id) {
                self.last_millis = millis;
                return id;
            }
            millis += 1;
        }
    }
}
