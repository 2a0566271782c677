use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use super::chapters::{Chapter, render_ffmetadata};
use super::error::ConcatError;

pub const FILE_LIST_NAME: &str = "files.txt";
pub const METADATA_NAME: &str = "metadata.txt";

/// Where a merge reads its inputs and writes its result.
#[derive(Debug, Clone)]
pub struct MergeJob {
    pub destination: PathBuf,
    pub output_name: String,
    pub ffmpeg: PathBuf,
}

impl MergeJob {
    pub fn file_list_path(&self) -> PathBuf {
        self.destination.join(FILE_LIST_NAME)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.destination.join(METADATA_NAME)
    }

    /// What ffmpeg writes; ffmpeg picks the muxer from the extension.
    pub fn intermediate_path(&self) -> PathBuf {
        self.destination.join(format!("{}.mp4", self.output_name))
    }

    pub fn output_path(&self) -> PathBuf {
        self.destination.join(format!("{}.m4b", self.output_name))
    }

    /// Write both input documents, run ffmpeg, rename the result to `.m4b`.
    pub fn run(&self, tracks: &[PathBuf], chapters: &[Chapter]) -> Result<PathBuf, ConcatError> {
        fs::create_dir_all(&self.destination).map_err(|source| ConcatError::Io {
            path: self.destination.clone(),
            source,
        })?;

        write_file(&self.metadata_path(), &render_ffmetadata(chapters))?;
        let list = render_file_list(tracks)?;
        write_file(&self.file_list_path(), &list)?;

        let intermediate = self.intermediate_path();
        info!(
            "Merging {} tracks into '{}'. This may take a while....",
            tracks.len(),
            intermediate.display()
        );
        let output = Command::new(&self.ffmpeg)
            .args(["-y", "-f", "concat", "-safe", "0", "-i"])
            .arg(self.file_list_path())
            .arg("-i")
            .arg(self.metadata_path())
            .args(["-map_metadata", "1", "-c", "copy"])
            .arg(&intermediate)
            .output()
            .map_err(|e| ConcatError::Merge {
                output: intermediate.clone(),
                reason: format!("cannot run '{}': {e}", self.ffmpeg.display()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail = stderr.lines().last().unwrap_or_default().trim();
            return Err(ConcatError::Merge {
                output: intermediate,
                reason: format!("ffmpeg exited with {}: {tail}", output.status),
            });
        }

        let final_path = self.output_path();
        fs::rename(&intermediate, &final_path).map_err(|source| ConcatError::Io {
            path: intermediate.clone(),
            source,
        })?;
        debug!("Renamed '{}' to '{}'", intermediate.display(), final_path.display());
        Ok(final_path)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), ConcatError> {
    fs::write(path, contents).map_err(|source| ConcatError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// `file '<abs path>'` lines for ffmpeg's concat demuxer.
pub fn render_file_list(tracks: &[PathBuf]) -> Result<String, ConcatError> {
    let mut out = String::new();
    for track in tracks {
        let abs = std::path::absolute(track).map_err(|source| ConcatError::Io {
            path: track.clone(),
            source,
        })?;
        let quoted = abs.to_string_lossy().replace('\'', r"'\''");
        out.push_str(&format!("file '{quoted}'\n"));
    }
    Ok(out)
}
