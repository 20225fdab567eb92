//! Label generation and file relocation.
//!
//! `LabelWorkflow` owns the session's selected folder and the resolved
//! configuration. Every public operation reports its progress and any failure
//! through the event sink before returning, so front ends only need to render
//! events and check the result.

use crate::config::AppConfig;
use crate::detector::{self, DetectionInvocation, DetectorControl, RUN_NAME};
use crate::error::{WorkflowError, WorkflowResult};
use crate::model::{FolderResult, GenerationReport, OutputLocation, SelectedFolder, WorkflowEvent};
use crate::picker::{self, FolderPicker};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;
use tokio::process::Command;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub const LABEL_EXTENSION: &str = "txt";
pub const CLASSES_FILE_NAME: &str = "classes.txt";

pub type EventSink = UnboundedSender<WorkflowEvent>;

#[derive(Debug, Clone)]
pub struct LabelWorkflow {
    cfg: Arc<AppConfig>,
    selected: Option<SelectedFolder>,
}

fn emit(events: &EventSink, ev: WorkflowEvent) {
    let _ = events.send(ev);
}

/// Log a failed operation to the sink and tracing, then hand the error back.
fn fail<T>(events: &EventSink, what: &str, err: WorkflowError) -> WorkflowResult<T> {
    tracing::error!(kind = err.kind(), error = %err, "{what}");
    emit(events, WorkflowEvent::Error(format!("{what}: {err}")));
    Err(err)
}

impl LabelWorkflow {
    pub fn new(cfg: AppConfig) -> Self {
        Self {
            cfg: Arc::new(cfg),
            selected: None,
        }
    }

    pub fn selected(&self) -> Option<&SelectedFolder> {
        self.selected.as_ref()
    }

    fn require_folder(&self) -> WorkflowResult<&SelectedFolder> {
        self.selected.as_ref().ok_or_else(WorkflowError::no_folder)
    }

    /// Ask the picker for a folder. A cancelled pick keeps the previous
    /// selection; an invalid path is an error and also keeps it.
    pub fn select_folder(
        &mut self,
        picker: &mut dyn FolderPicker,
        events: &EventSink,
    ) -> WorkflowResult<FolderResult> {
        let Some(raw) = picker.pick() else {
            tracing::debug!("folder selection cancelled");
            emit(events, WorkflowEvent::Info("Folder selection cancelled".into()));
            return Ok(FolderResult::Cancelled);
        };
        let folder = match picker::resolve_folder(&raw) {
            Ok(f) => f,
            Err(e) => return fail(events, "Folder selection failed", e),
        };
        tracing::info!(folder = %folder, "folder selected");
        emit(events, WorkflowEvent::FolderSelected(folder.path().to_path_buf()));
        self.selected = Some(folder.clone());
        Ok(FolderResult::Selected(folder))
    }

    /// Run the detector over the selected folder and move its label files
    /// next to the images.
    pub async fn generate_labels(
        &self,
        events: &EventSink,
        control_rx: Option<&mut UnboundedReceiver<DetectorControl>>,
    ) -> WorkflowResult<GenerationReport> {
        match self.generate_inner(events, control_rx).await {
            Ok(report) => {
                tracing::info!(
                    folder = %report.folder.display(),
                    count = report.moved_count,
                    output = ?report.output,
                    "labels generated"
                );
                emit(events, WorkflowEvent::GenerationFinished(Box::new(report.clone())));
                Ok(report)
            }
            Err(e) => fail(events, "Label generation failed", e),
        }
    }

    async fn generate_inner(
        &self,
        events: &EventSink,
        control_rx: Option<&mut UnboundedReceiver<DetectorControl>>,
    ) -> WorkflowResult<GenerationReport> {
        let folder = self.require_folder()?;
        let inv = DetectionInvocation::for_folder(&self.cfg, folder);
        let command = inv.display();
        tracing::info!(folder = %folder, %command, "running detector");
        emit(events, WorkflowEvent::DetectionStarted { command });

        let started = Instant::now();
        let outcome = detector::run_detector(&inv, control_rx).await?;
        if !outcome.success() {
            let stderr = outcome.stderr.trim();
            let detail = if stderr.is_empty() {
                match outcome.exit_code {
                    Some(code) => format!("detector exited with status {code}"),
                    None => "detector terminated by a signal".to_string(),
                }
            } else {
                stderr.to_string()
            };
            tracing::warn!(exit_code = ?outcome.exit_code, "detector failed");
            return Err(WorkflowError::ExternalTool(detail));
        }

        let output = locate_output_dir(folder.path());
        let moved = match output.dir() {
            Some(dir) => {
                tracing::debug!(dir = %dir.display(), "found detector output");
                relocate_labels(dir, folder.path())?
            }
            None => {
                tracing::warn!(folder = %folder, "detector succeeded but wrote no output directory");
                emit(
                    events,
                    WorkflowEvent::Warning(format!(
                        "Detector finished but no output directory was found under {}",
                        folder.join(RUN_NAME).display()
                    )),
                );
                Vec::new()
            }
        };
        remove_output_tree(folder.path())?;

        Ok(GenerationReport {
            folder: folder.path().to_path_buf(),
            moved_count: moved.len(),
            output,
            moved,
            elapsed: started.elapsed(),
            finished_at: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "now".into()),
        })
    }

    /// Copy the configured class list into the folder as `classes.txt`.
    pub fn add_classes_file(&self, events: &EventSink) -> WorkflowResult<PathBuf> {
        match self.add_classes_inner() {
            Ok(dst) => {
                tracing::info!(dst = %dst.display(), "classes file installed");
                emit(
                    events,
                    WorkflowEvent::Info(format!(
                        "Classes file added successfully to {}",
                        dst.parent().unwrap_or(&dst).display()
                    )),
                );
                Ok(dst)
            }
            Err(e) => fail(events, "Could not add classes file", e),
        }
    }

    fn add_classes_inner(&self) -> WorkflowResult<PathBuf> {
        let folder = self.require_folder()?;
        let src = &self.cfg.classes_file;
        if !src.is_file() {
            return Err(WorkflowError::MissingResource(src.clone()));
        }
        let dst = folder.join(CLASSES_FILE_NAME);

        // Copying a file onto itself would truncate it.
        if let (Ok(a), Ok(b)) = (fs::canonicalize(src), fs::canonicalize(&dst)) {
            if a == b {
                return Ok(dst);
            }
        }
        fs::copy(src, &dst).map_err(|e| {
            WorkflowError::io(format!("copy {} to {}", src.display(), dst.display()), e)
        })?;
        Ok(dst)
    }

    /// Launch the annotator on the folder and return its pid without waiting.
    pub fn open_annotator(&self, events: &EventSink) -> WorkflowResult<u32> {
        let folder = match self.require_folder() {
            Ok(f) => f,
            Err(e) => return fail(events, "Could not open annotator", e),
        };
        emit(
            events,
            WorkflowEvent::Info(format!("Opening annotator for folder: {folder}")),
        );

        // Dropping the child neither kills nor waits on it; the runtime reaps it.
        let spawned = Command::new(&self.cfg.annotator)
            .arg(folder.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let child = match spawned {
            Ok(c) => c,
            Err(e) => {
                let err = WorkflowError::ExternalTool(format!(
                    "could not launch {}: {e}",
                    self.cfg.annotator.display()
                ));
                return fail(events, "Could not open annotator", err);
            }
        };
        let pid = child.id().unwrap_or_default();
        tracing::info!(pid, annotator = %self.cfg.annotator.display(), "annotator launched");
        Ok(pid)
    }
}

/// Candidate output directories, most specific first. The detector nests its
/// run directory one level deeper when the requested one already exists.
pub fn output_candidates(folder: &Path) -> [PathBuf; 2] {
    let top = folder.join(RUN_NAME);
    [top.join(RUN_NAME), top]
}

/// First existing candidate wins.
pub fn locate_output_dir(folder: &Path) -> OutputLocation {
    output_candidates(folder)
        .into_iter()
        .enumerate()
        .find(|(_, dir)| dir.is_dir())
        .map_or(OutputLocation::NotFound, |(i, dir)| match i {
            0 => OutputLocation::Nested(dir),
            _ => OutputLocation::Flat(dir),
        })
}

/// Move every `*.txt` directly inside `src_dir` into `dest`, overwriting
/// same-named files. Returns the moved file names, sorted. Files moved before
/// a failure stay moved.
pub fn relocate_labels(src_dir: &Path, dest: &Path) -> WorkflowResult<Vec<String>> {
    let entries = fs::read_dir(src_dir)
        .map_err(|e| WorkflowError::io(format!("read {}", src_dir.display()), e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| WorkflowError::io(format!("read {}", src_dir.display()), e))?;
        let path = entry.path();
        if path.extension() == Some(OsStr::new(LABEL_EXTENSION)) && path.is_file() {
            names.push(entry.file_name());
        }
    }
    names.sort();

    let mut moved = Vec::with_capacity(names.len());
    for name in &names {
        let src = src_dir.join(name);
        let dst = dest.join(name);
        move_file(&src, &dst).map_err(|e| {
            WorkflowError::io(format!("move {} to {}", src.display(), dst.display()), e)
        })?;
        let shown = name.to_string_lossy().into_owned();
        tracing::debug!(file = %shown, "label moved");
        moved.push(shown);
    }
    Ok(moved)
}

/// Rename, falling back to copy + remove when the rename fails (e.g. across
/// filesystems).
fn move_file(src: &Path, dst: &Path) -> std::io::Result<()> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            fs::copy(src, dst).map_err(|_| rename_err)?;
            fs::remove_file(src)
        }
    }
}

/// Delete `<folder>/labels` and everything below it, if present.
fn remove_output_tree(folder: &Path) -> WorkflowResult<()> {
    let top = folder.join(RUN_NAME);
    if top.exists() {
        fs::remove_dir_all(&top)
            .map_err(|e| WorkflowError::io(format!("remove {}", top.display()), e))?;
        tracing::debug!(dir = %top.display(), "output directory removed");
    }
    Ok(())
}

#[cfg(all(test, unix))]
pub(crate) mod tests {
    use super::*;
    use crate::picker::FixedPicker;
    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    /// Shell prelude that sets `$P` to the `project=` argument.
    pub(crate) const PARSE_PROJECT: &str =
        r#"for a in "$@"; do case "$a" in project=*) P="${a#project=}";; esac; done"#;

    pub(crate) fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    struct Fixture {
        _tools: TempDir,
        _images: TempDir,
        tools: PathBuf,
        workflow: LabelWorkflow,
        events: EventSink,
        rx: mpsc::UnboundedReceiver<WorkflowEvent>,
    }

    impl Fixture {
        fn new(detector_body: &str) -> Self {
            let tools = TempDir::new().unwrap();
            let images = TempDir::new().unwrap();
            for i in 1..=5 {
                fs::write(images.path().join(format!("img{i}.jpg")), b"jpeg").unwrap();
            }
            let detector = write_script(
                tools.path(),
                "yolo",
                &format!("{PARSE_PROJECT}\n{detector_body}"),
            );
            let cfg = AppConfig {
                detector,
                model_weights: tools.path().join("best.pt"),
                classes_file: tools.path().join("classes.txt"),
                annotator: tools.path().join("labelImg"),
            };
            let (events, rx) = mpsc::unbounded_channel();
            let mut workflow = LabelWorkflow::new(cfg);
            let mut picker = FixedPicker(Some(images.path().to_path_buf()));
            workflow.select_folder(&mut picker, &events).unwrap();
            Self {
                tools: tools.path().to_path_buf(),
                _tools: tools,
                _images: images,
                workflow,
                events,
                rx,
            }
        }

        fn folder(&self) -> PathBuf {
            self.workflow.selected().unwrap().path().to_path_buf()
        }

        fn messages(&mut self) -> Vec<String> {
            let mut out = Vec::new();
            while let Ok(ev) = self.rx.try_recv() {
                out.push(ev.to_message());
            }
            out
        }
    }

    fn txt_files(dir: &Path) -> Vec<String> {
        let mut v: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".txt"))
            .collect();
        v.sort();
        v
    }

    const NESTED_FIVE: &str = r#"mkdir -p "$P/labels/labels"
echo annotated > "$P/labels/img1.jpg"
for i in 1 2 3 4 5; do echo "0 0.5 0.5 0.2 0.2" > "$P/labels/labels/img$i.txt"; done"#;

    #[tokio::test]
    async fn nested_output_is_moved_and_cleaned_up() {
        let mut fx = Fixture::new(NESTED_FIVE);
        let report = fx.workflow.generate_labels(&fx.events, None).await.unwrap();

        let folder = fx.folder();
        assert_eq!(report.moved_count, 5);
        assert_eq!(
            report.output,
            OutputLocation::Nested(folder.join("labels").join("labels"))
        );
        assert_eq!(
            txt_files(&folder),
            vec!["img1.txt", "img2.txt", "img3.txt", "img4.txt", "img5.txt"]
        );
        assert!(!folder.join("labels").exists());
        // images are untouched
        assert!(folder.join("img3.jpg").is_file());

        let msgs = fx.messages();
        assert!(msgs.iter().any(|m| m.starts_with("Running command:")
            && m.contains("task=detect mode=predict")));
        assert!(msgs
            .iter()
            .any(|m| m == "Labels generated and moved successfully! Total labels: 5"));
    }

    #[tokio::test]
    async fn flat_output_is_used_when_not_nested() {
        let fx = Fixture::new(
            r#"mkdir -p "$P/labels"
echo "1 0.1 0.1 0.1 0.1" > "$P/labels/a.txt"
echo "2 0.1 0.1 0.1 0.1" > "$P/labels/b.txt"
echo "not a label" > "$P/labels/a.json""#,
        );
        let report = fx.workflow.generate_labels(&fx.events, None).await.unwrap();

        let folder = fx.folder();
        assert_eq!(report.moved_count, 2);
        assert_eq!(report.moved, vec!["a.txt", "b.txt"]);
        assert_eq!(report.output, OutputLocation::Flat(folder.join("labels")));
        assert!(folder.join("a.txt").is_file());
        assert!(!folder.join("a.json").exists());
        assert!(!folder.join("labels").exists());
    }

    #[tokio::test]
    async fn empty_output_reports_zero() {
        let fx = Fixture::new(r#"mkdir -p "$P/labels/labels""#);
        let report = fx.workflow.generate_labels(&fx.events, None).await.unwrap();

        assert_eq!(report.moved_count, 0);
        assert!(matches!(report.output, OutputLocation::Nested(_)));
        assert!(!fx.folder().join("labels").exists());
    }

    #[tokio::test]
    async fn missing_output_is_reported_distinctly() {
        let mut fx = Fixture::new("exit 0");
        let report = fx.workflow.generate_labels(&fx.events, None).await.unwrap();

        assert_eq!(report.moved_count, 0);
        assert_eq!(report.output, OutputLocation::NotFound);
        assert!(fx
            .messages()
            .iter()
            .any(|m| m.starts_with("Warning: Detector finished but no output directory")));
    }

    #[tokio::test]
    async fn failing_detector_leaves_output_untouched() {
        let mut fx = Fixture::new(
            r#"mkdir -p "$P/labels/labels"
echo "0 0 0 0 0" > "$P/labels/labels/img1.txt"
echo "CUDA out of memory" >&2
exit 1"#,
        );
        let err = fx
            .workflow
            .generate_labels(&fx.events, None)
            .await
            .unwrap_err();

        match err {
            WorkflowError::ExternalTool(msg) => assert_eq!(msg, "CUDA out of memory"),
            other => panic!("unexpected error: {other:?}"),
        }
        let folder = fx.folder();
        assert!(folder.join("labels/labels/img1.txt").is_file());
        assert!(!folder.join("img1.txt").exists());
        assert!(fx
            .messages()
            .iter()
            .any(|m| m.starts_with("Error: Label generation failed")));
    }

    #[tokio::test]
    async fn existing_labels_are_overwritten() {
        let fx = Fixture::new(
            r#"mkdir -p "$P/labels/labels"
echo "fresh" > "$P/labels/labels/img1.txt""#,
        );
        let folder = fx.folder();
        fs::write(folder.join("img1.txt"), "stale\n").unwrap();

        let report = fx.workflow.generate_labels(&fx.events, None).await.unwrap();
        assert_eq!(report.moved_count, 1);
        assert_eq!(fs::read_to_string(folder.join("img1.txt")).unwrap(), "fresh\n");
    }

    #[tokio::test]
    async fn generate_without_folder_touches_nothing() {
        let tools = TempDir::new().unwrap();
        let marker = tools.path().join("ran");
        let detector = write_script(tools.path(), "yolo", &format!("touch {}", marker.display()));
        let workflow = LabelWorkflow::new(AppConfig {
            detector,
            ..Default::default()
        });
        let (events, mut rx) = mpsc::unbounded_channel();

        let err = workflow.generate_labels(&events, None).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Precondition(_)));
        assert!(!marker.exists());
        assert_eq!(
            rx.try_recv().unwrap().to_message(),
            "Error: Label generation failed: no folder selected"
        );
    }

    #[tokio::test]
    async fn missing_detector_is_external_tool_error() {
        let mut fx = Fixture::new("exit 0");
        let mut cfg = (*fx.workflow.cfg).clone();
        cfg.detector = fx.tools.join("not-installed");
        let selected = fx.workflow.selected.clone();
        fx.workflow = LabelWorkflow {
            cfg: Arc::new(cfg),
            selected,
        };

        let err = fx
            .workflow
            .generate_labels(&fx.events, None)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::ExternalTool(_)));

        // other operations keep working
        fs::write(fx.tools.join("classes.txt"), "car\n").unwrap();
        assert!(fx.workflow.add_classes_file(&fx.events).is_ok());
    }

    #[test]
    fn cancelled_selection_keeps_previous_folder() {
        let dir = TempDir::new().unwrap();
        let (events, _rx) = mpsc::unbounded_channel();
        let mut wf = LabelWorkflow::new(AppConfig::default());

        let first = wf
            .select_folder(&mut FixedPicker(Some(dir.path().to_path_buf())), &events)
            .unwrap();
        assert!(matches!(first, FolderResult::Selected(_)));
        let before = wf.selected().cloned();

        let second = wf.select_folder(&mut FixedPicker(None), &events).unwrap();
        assert_eq!(second, FolderResult::Cancelled);
        assert_eq!(wf.selected().cloned(), before);

        let bad = wf.select_folder(
            &mut FixedPicker(Some(dir.path().join("missing"))),
            &events,
        );
        assert!(bad.is_err());
        assert_eq!(wf.selected().cloned(), before);
    }

    #[test]
    fn classes_file_copy_is_idempotent() {
        let fx_tools = TempDir::new().unwrap();
        let images = TempDir::new().unwrap();
        let src = fx_tools.path().join("classes.txt");
        fs::write(&src, "person\ncar\nbicycle\n").unwrap();
        fs::write(images.path().join("classes.txt"), "old\n").unwrap();

        let (events, _rx) = mpsc::unbounded_channel();
        let mut wf = LabelWorkflow::new(AppConfig {
            classes_file: src.clone(),
            ..Default::default()
        });
        wf.select_folder(&mut FixedPicker(Some(images.path().to_path_buf())), &events)
            .unwrap();

        let dst = wf.add_classes_file(&events).unwrap();
        wf.add_classes_file(&events).unwrap();

        assert_eq!(dst.file_name().unwrap(), "classes.txt");
        assert_eq!(fs::read(&dst).unwrap(), fs::read(&src).unwrap());
        assert_eq!(fs::read_to_string(&src).unwrap(), "person\ncar\nbicycle\n");
        assert_eq!(txt_files(images.path()), vec!["classes.txt"]);
    }

    #[test]
    fn classes_file_inside_folder_is_not_truncated() {
        let images = TempDir::new().unwrap();
        let src = images.path().join("classes.txt");
        fs::write(&src, "person\n").unwrap();

        let (events, _rx) = mpsc::unbounded_channel();
        let mut wf = LabelWorkflow::new(AppConfig {
            classes_file: src.clone(),
            ..Default::default()
        });
        wf.select_folder(&mut FixedPicker(Some(images.path().to_path_buf())), &events)
            .unwrap();

        wf.add_classes_file(&events).unwrap();
        assert_eq!(fs::read_to_string(&src).unwrap(), "person\n");
    }

    #[test]
    fn classes_file_errors() {
        let images = TempDir::new().unwrap();
        let (events, _rx) = mpsc::unbounded_channel();
        let mut wf = LabelWorkflow::new(AppConfig {
            classes_file: images.path().join("nowhere/classes.txt"),
            ..Default::default()
        });

        assert!(matches!(
            wf.add_classes_file(&events),
            Err(WorkflowError::Precondition(_))
        ));

        wf.select_folder(&mut FixedPicker(Some(images.path().to_path_buf())), &events)
            .unwrap();
        assert!(matches!(
            wf.add_classes_file(&events),
            Err(WorkflowError::MissingResource(_))
        ));
        assert!(!images.path().join("classes.txt").exists());
    }

    #[tokio::test]
    async fn annotator_is_launched_with_folder() {
        let tools = TempDir::new().unwrap();
        let images = TempDir::new().unwrap();
        let marker = tools.path().join("opened");
        let annotator = write_script(
            tools.path(),
            "labelImg",
            &format!("echo \"$1\" > {}", marker.display()),
        );
        let (events, _rx) = mpsc::unbounded_channel();
        let mut wf = LabelWorkflow::new(AppConfig {
            annotator,
            ..Default::default()
        });
        wf.select_folder(&mut FixedPicker(Some(images.path().to_path_buf())), &events)
            .unwrap();

        let pid = wf.open_annotator(&events).unwrap();
        assert!(pid > 0);

        let deadline = Instant::now() + Duration::from_secs(5);
        while fs::read_to_string(&marker).map_or(true, |s| s.is_empty()) {
            assert!(Instant::now() < deadline, "annotator never ran");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let folder = wf.selected().unwrap().path().display().to_string();
        assert_eq!(fs::read_to_string(&marker).unwrap().trim(), folder);
    }

    #[tokio::test]
    async fn annotator_errors() {
        let images = TempDir::new().unwrap();
        let (events, _rx) = mpsc::unbounded_channel();
        let mut wf = LabelWorkflow::new(AppConfig {
            annotator: images.path().join("no-such-labelImg"),
            ..Default::default()
        });

        assert!(matches!(
            wf.open_annotator(&events),
            Err(WorkflowError::Precondition(_))
        ));
        wf.select_folder(&mut FixedPicker(Some(images.path().to_path_buf())), &events)
            .unwrap();
        assert!(matches!(
            wf.open_annotator(&events),
            Err(WorkflowError::ExternalTool(_))
        ));
    }

    #[tokio::test]
    async fn move_failure_keeps_progress_and_output() {
        let mut fx = Fixture::new(NESTED_FIVE);
        let folder = fx.folder();
        // a directory in the way makes the third move fail
        fs::create_dir(folder.join("img3.txt")).unwrap();

        let err = fx
            .workflow
            .generate_labels(&fx.events, None)
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Io { .. }), "got {err:?}");
        assert!(fx
            .messages()
            .iter()
            .any(|m| m.starts_with("Error: Label generation failed")));
        assert!(folder.join("img1.txt").is_file());
        assert!(folder.join("img2.txt").is_file());
        assert!(folder.join("img3.txt").is_dir());
        assert!(folder.join("labels/labels/img3.txt").is_file());
        assert!(folder.join("labels/labels/img5.txt").is_file());
    }

    #[test]
    fn non_utf8_label_names_are_moved() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let out = dir.path().join("labels/labels");
        fs::create_dir_all(&out).unwrap();
        let odd = OsStr::from_bytes(b"caf\xe9.txt");
        fs::write(out.join("ok.txt"), "0\n").unwrap();
        fs::write(out.join(odd), "1\n").unwrap();
        fs::write(out.join(OsStr::from_bytes(b"caf\xe9.json")), "{}").unwrap();

        let moved = relocate_labels(&out, dir.path()).unwrap();

        assert_eq!(moved.len(), 2);
        assert!(moved.contains(&"ok.txt".to_string()));
        assert!(moved.contains(&odd.to_string_lossy().into_owned()));
        assert_eq!(fs::read_to_string(dir.path().join(odd)).unwrap(), "1\n");
        assert!(dir.path().join("ok.txt").is_file());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 1);
    }

    #[test]
    fn candidates_check_nested_first() {
        let dir = TempDir::new().unwrap();
        let [nested, flat] = output_candidates(dir.path());
        assert_eq!(nested, dir.path().join("labels/labels"));
        assert_eq!(flat, dir.path().join("labels"));

        assert_eq!(locate_output_dir(dir.path()), OutputLocation::NotFound);
        fs::create_dir_all(&flat).unwrap();
        assert_eq!(locate_output_dir(dir.path()), OutputLocation::Flat(flat));
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(locate_output_dir(dir.path()), OutputLocation::Nested(nested));
    }
}
