//! Console progress reporter for batch runs.

use mixdl_core::scheduler::{ItemState, ProgressReporter};

/// Prints one line per item start and finish, tagged with its position in
/// the batch. Backlog and scheduled transitions stay in the log only.
pub struct PrintReporter {
    labels: Vec<String>,
}

impl PrintReporter {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    fn label(&self, index: usize) -> &str {
        self.labels.get(index).map(String::as_str).unwrap_or("?")
    }
}

impl ProgressReporter for PrintReporter {
    fn report(&self, index: usize, state: ItemState, detail: Option<&str>) {
        let total = self.labels.len();
        match state {
            ItemState::Active => {
                println!("[{}/{}] {} ...", index + 1, total, self.label(index));
            }
            ItemState::Done => match detail {
                Some("ok") | None => {
                    println!("[{}/{}] {} done", index + 1, total, self.label(index));
                }
                Some(err) => {
                    println!("[{}/{}] {} FAILED: {}", index + 1, total, self.label(index), err);
                }
            },
            ItemState::Backlog | ItemState::Scheduled => {
                tracing::debug!(index, %state, "item state change");
            }
        }
    }
}
