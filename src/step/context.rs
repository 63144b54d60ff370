use std::sync::Arc;

use crate::notify::notifier::ProgressNotifier;
use crate::result::result_model::StepInfo;

/// Handle given to a running step body.
///
/// Comments attached here end up, in order, on the step's result and are
/// forwarded to the progress notifier as they are made.
pub struct StepContext {
    info: StepInfo,
    comments: Vec<String>,
    notifier: Arc<dyn ProgressNotifier>,
}

impl StepContext {
    pub(crate) fn new(info: StepInfo, notifier: Arc<dyn ProgressNotifier>) -> Self {
        StepContext {
            info,
            comments: Vec::new(),
            notifier,
        }
    }

    pub fn info(&self) -> &StepInfo {
        &self.info
    }

    pub fn comment(&mut self, comment: impl Into<String>) {
        let comment = comment.into();
        crate::notify::notifier::notify_safely("step_comment", || {
            self.notifier.step_comment(&self.info, &comment)
        });
        self.comments.push(comment);
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub(crate) fn into_comments(self) -> Vec<String> {
        self.comments
    }
}
