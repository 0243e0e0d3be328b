//! Option loading and parsing for the insertion layer.
//!
//! Parses `veneer.toml` (or an override path provided by the host) into the
//! flat [`Options`] set consumed by the interpreter. Missing or malformed
//! files fall back to defaults so the layer always starts; numeric fields are
//! sanity-clamped after parsing. Unknown fields are ignored (TOML
//! deserialization tolerance) to allow forward evolution without immediate
//! warnings.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

/// Upper bound accepted for `soft_tab_stop`; larger values are configuration
/// mistakes, not tab stops.
const SOFT_TAB_STOP_MAX: u32 = 64;

/// Line-break sequence inserted for a return stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Options {
    /// Group every insertion session into a single undo transaction.
    #[serde(default = "Options::default_atomic_insert")]
    pub atomic_insert: bool,
    /// Ask the host to turn off input-method assistance on mode exit.
    #[serde(default)]
    pub disable_input_method: bool,
    /// Backspace deletes runs of spaces up to this stop width; 0 or 1
    /// disables the feature.
    #[serde(default)]
    pub soft_tab_stop: u32,
    #[serde(default)]
    pub line_ending: LineEnding,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            atomic_insert: Self::default_atomic_insert(),
            disable_input_method: false,
            soft_tab_stop: 0,
            line_ending: LineEnding::default(),
        }
    }
}

impl Options {
    const fn default_atomic_insert() -> bool {
        true
    }

    /// Soft tab stop as an applicable width, `None` when the feature is off.
    pub fn soft_tab_effective(&self) -> Option<u32> {
        if self.soft_tab_stop > 1 {
            Some(self.soft_tab_stop)
        } else {
            None
        }
    }

    fn sanitize(mut self) -> Self {
        if self.soft_tab_stop > SOFT_TAB_STOP_MAX {
            info!(
                target: "config",
                raw = self.soft_tab_stop,
                clamped = SOFT_TAB_STOP_MAX,
                "soft_tab_stop_clamped"
            );
            self.soft_tab_stop = SOFT_TAB_STOP_MAX;
        }
        self
    }
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    // Prefer a local working-directory `veneer.toml` before falling back to
    // the platform config dir.
    let local = PathBuf::from("veneer.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("veneer").join("veneer.toml");
    }
    // Final fallback relative filename.
    PathBuf::from("veneer.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Options> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<Options>(&content) {
            Ok(options) => Ok(options.sanitize()),
            Err(e) => {
                warn!(
                    target: "config",
                    path = %path.display(),
                    error = %e,
                    "options_parse_failed"
                );
                Ok(Options::default())
            }
        }
    } else {
        Ok(Options::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    #[test]
    fn default_options_when_missing_file() {
        let opts = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(opts.atomic_insert);
        assert!(!opts.disable_input_method);
        assert_eq!(opts.soft_tab_stop, 0);
        assert_eq!(opts.line_ending, LineEnding::Lf);
    }

    #[test]
    fn parses_all_fields() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "atomic_insert = false\ndisable_input_method = true\nsoft_tab_stop = 4\nline_ending = \"crlf\"\n",
        )
        .unwrap();
        let opts = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(!opts.atomic_insert);
        assert!(opts.disable_input_method);
        assert_eq!(opts.soft_tab_stop, 4);
        assert_eq!(opts.line_ending.as_str(), "\r\n");
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "soft_tab_stop = \"four\"\n").unwrap();
        let opts = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(opts, Options::default());
    }

    #[test]
    fn soft_tab_effective_requires_width_above_one() {
        let mut opts = Options::default();
        assert_eq!(opts.soft_tab_effective(), None);
        opts.soft_tab_stop = 1;
        assert_eq!(opts.soft_tab_effective(), None);
        opts.soft_tab_stop = 4;
        assert_eq!(opts.soft_tab_effective(), Some(4));
    }

    #[test]
    fn clamps_oversized_soft_tab_stop() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "soft_tab_stop = 1000\n").unwrap();
        let opts = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(opts.soft_tab_stop, SOFT_TAB_STOP_MAX);
    }

    #[test]
    fn clamp_logging_uses_config_target() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "soft_tab_stop = 1000\n").unwrap();
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        with_default(subscriber, || {
            load_from(Some(tmp.path().to_path_buf())).unwrap();
        });

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("INFO config:"));
        assert!(log_output.contains("soft_tab_stop_clamped"));
    }

    #[test]
    fn line_endings_render_their_sequences() {
        assert_eq!(LineEnding::Lf.as_str(), "\n");
        assert_eq!(LineEnding::CrLf.as_str(), "\r\n");
    }
}
