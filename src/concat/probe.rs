use std::path::{Path, PathBuf};
use std::process::Command;

use lofty::file::AudioFile;
use tracing::debug;

use super::error::ConcatError;

/// Whole-microsecond playback duration of one audio file.
pub trait DurationProbe {
    fn duration_micros(&self, path: &Path) -> Result<u64, ConcatError>;
}

/// Shells out to `ffprobe` and reads the container duration it prints.
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    binary: PathBuf,
}

impl FfprobeProbe {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl DurationProbe for FfprobeProbe {
    fn duration_micros(&self, path: &Path) -> Result<u64, ConcatError> {
        let probe_err = |reason: String| ConcatError::Probe {
            path: path.to_path_buf(),
            reason,
        };

        let output = Command::new(&self.binary)
            .args(["-v", "quiet", "-of", "csv=p=0", "-show_entries", "format=duration"])
            .arg(path)
            .output()
            .map_err(|e| probe_err(format!("cannot run '{}': {e}", self.binary.display())))?;

        if !output.status.success() {
            return Err(probe_err(format!("ffprobe exited with {}", output.status)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("ffprobe reported '{}' for '{}'", stdout.trim(), path.display());
        parse_seconds(&stdout).ok_or_else(|| probe_err(format!("unparsable duration '{}'", stdout.trim())))
    }
}

/// Reads the duration from the container headers without spawning anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyProbe;

impl DurationProbe for LoftyProbe {
    fn duration_micros(&self, path: &Path) -> Result<u64, ConcatError> {
        let tagged = lofty::read_from_path(path).map_err(|e| ConcatError::Probe {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let micros = tagged.properties().duration().as_micros();
        u64::try_from(micros).map_err(|_| ConcatError::Probe {
            path: path.to_path_buf(),
            reason: format!("duration of {micros}us is out of range"),
        })
    }
}

/// Decimal seconds (`"123.456789"`) to whole microseconds, truncating digits
/// past the sixth decimal. Parsed digit by digit so no float rounding creeps in.
pub fn parse_seconds(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let (whole, frac) = raw.split_once('.').unwrap_or((raw, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let seconds: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut micros = 0u64;
    for (i, digit) in frac.bytes().chain(std::iter::repeat(b'0')).take(6).enumerate() {
        micros += u64::from(digit - b'0') * 10u64.pow(5 - i as u32);
    }
    seconds.checked_mul(1_000_000)?.checked_add(micros)
}
