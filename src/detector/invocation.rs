use crate::config::AppConfig;
use crate::model::SelectedFolder;
use std::ffi::OsString;
use std::path::PathBuf;

/// Name of the run directory the detector is asked to write into.
pub const RUN_NAME: &str = "labels";

/// One fixed-shape detector command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionInvocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

fn kv(key: &str, value: impl Into<OsString>) -> OsString {
    let mut s = OsString::from(format!("{key}="));
    s.push(value.into());
    s
}

impl DetectionInvocation {
    /// `yolo task=detect mode=predict model=<w> source=<f> save_txt=True
    /// project=<f> name=labels exist_ok=True`
    pub fn for_folder(cfg: &AppConfig, folder: &SelectedFolder) -> Self {
        let args = vec![
            kv("task", "detect"),
            kv("mode", "predict"),
            kv("model", cfg.model_weights.as_os_str()),
            kv("source", folder.path().as_os_str()),
            kv("save_txt", "True"),
            kv("project", folder.path().as_os_str()),
            kv("name", RUN_NAME),
            kv("exist_ok", "True"),
        ];
        Self {
            program: cfg.detector.clone(),
            args,
        }
    }

    /// Space-joined command line for display.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(|a| a.as_os_str()))
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
