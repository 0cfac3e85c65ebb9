use boltzpost::engine::progress::{Progress, ProgressCallback};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Renders progress as one bar over the input files plus a transient bar per file being split.
#[derive(Clone)]
pub struct CliProgressHandler {
    multi: MultiProgress,
    files: ProgressBar,
}

impl CliProgressHandler {
    pub fn new(total_files: usize) -> Self {
        Self::with_draw_target(total_files, ProgressDrawTarget::stderr())
    }

    /// A handler that tracks state but never draws.
    pub fn hidden(total_files: usize) -> Self {
        Self::with_draw_target(total_files, ProgressDrawTarget::hidden())
    }

    fn with_draw_target(total_files: usize, target: ProgressDrawTarget) -> Self {
        let multi = MultiProgress::with_draw_target(target);
        let files = multi.add(
            ProgressBar::new(total_files as u64)
                .with_style(Self::bar_style())
                .with_message("Files"),
        );
        Self { multi, files }
    }

    /// Marks one input file as done.
    pub fn file_done(&self) {
        self.files.inc(1);
    }

    pub fn finish(&self) {
        self.files.finish_and_clear();
    }

    /// Prints a line above the bars without tearing them.
    pub fn println(&self, line: impl AsRef<str>) {
        if self.multi.println(line.as_ref()).is_err() {
            eprintln!("{}", line.as_ref());
        }
    }

    /// A callback for one file's workflow. Task events drive a per-file sample bar that is
    /// removed once the task finishes.
    pub fn file_callback(&self, input: &Path) -> ProgressCallback<'static> {
        let multi = self.multi.clone();
        let label = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string());
        let task: Arc<Mutex<Option<ProgressBar>>> = Arc::new(Mutex::new(None));

        Box::new(move |progress: Progress| {
            let Ok(mut task) = task.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => debug!("{label}: {name}"),
                Progress::PhaseFinish => {}
                Progress::TaskStart { total_steps } => {
                    let pb = multi.add(
                        ProgressBar::new(total_steps)
                            .with_style(Self::bar_style())
                            .with_message(label.clone()),
                    );
                    *task = Some(pb);
                }
                Progress::TaskIncrement => {
                    if let Some(pb) = task.as_ref() {
                        pb.inc(1);
                    }
                }
                Progress::TaskFinish => {
                    if let Some(pb) = task.take() {
                        pb.finish_and_clear();
                        multi.remove(&pb);
                    }
                }
                Progress::ArtifactWritten { path } => debug!("Wrote {}", path.display()),
            }
        })
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<24} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                },
            )
            .progress_chars("##-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::thread;

    #[test]
    fn file_bar_counts_finished_inputs() {
        let handler = CliProgressHandler::hidden(3);
        assert_eq!(handler.files.length(), Some(3));
        handler.file_done();
        handler.file_done();
        assert_eq!(handler.files.position(), 2);
        handler.finish();
        assert!(handler.files.is_finished());
    }

    #[test]
    fn task_events_drive_a_transient_sample_bar() {
        let handler = CliProgressHandler::hidden(1);
        let callback = handler.file_callback(Path::new("runs/prediction.json"));

        callback(Progress::PhaseStart { name: "Writing samples" });
        callback(Progress::TaskStart { total_steps: 5 });
        callback(Progress::TaskIncrement);
        callback(Progress::ArtifactWritten {
            path: PathBuf::from("prediction_1_protein.cif"),
        });
        callback(Progress::TaskIncrement);
        callback(Progress::TaskFinish);
        callback(Progress::PhaseFinish);
        // Increments after the task has finished are ignored.
        callback(Progress::TaskIncrement);
    }

    #[test]
    fn callbacks_are_usable_from_worker_threads() {
        let handler = CliProgressHandler::hidden(2);
        let workers: Vec<_> = ["a.cif", "b.cif"]
            .into_iter()
            .map(|name| {
                let handler = handler.clone();
                thread::spawn(move || {
                    let callback = handler.file_callback(Path::new(name));
                    callback(Progress::TaskStart { total_steps: 1 });
                    callback(Progress::TaskIncrement);
                    callback(Progress::TaskFinish);
                    handler.file_done();
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(handler.files.position(), 2);
    }
}
