use parking_lot::Mutex;

use oerc_core::{Notice, Notifier};

/// Notifier that keeps every notice for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    /// Everything notified so far, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    /// Number of notices equal to `notice`.
    pub fn count(&self, notice: &Notice) -> usize {
        self.notices.lock().iter().filter(|n| *n == notice).count()
    }

    /// Forget everything recorded so far.
    pub fn reset(&self) {
        self.notices.lock().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}
