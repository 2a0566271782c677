use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::cli::ConcatArgs;
use crate::concat::{
    ConcatError, DurationProbe, FfprobeProbe, LoftyProbe, MergeJob, build_chapters, sort_tracks,
};
use crate::config::{ProbeBackend, Settings};

use super::source::{list_files, source_dir, source_path};

fn probe_for(settings: &Settings) -> Box<dyn DurationProbe> {
    match settings.concat.probe {
        ProbeBackend::Ffprobe => Box::new(FfprobeProbe::new(&settings.concat.ffprobe)),
        ProbeBackend::Lofty => Box::new(LoftyProbe),
    }
}

pub fn concat(args: &ConcatArgs, settings: &Settings) -> Result<()> {
    let format = args
        .format
        .as_deref()
        .unwrap_or(&settings.concat.format)
        .trim_start_matches('.')
        .to_string();
    let source = source_path(&args.source)?;

    let mut tracks = list_files(&args.source, &format, &settings.library)?;
    if tracks.is_empty() {
        return Err(ConcatError::NoTracks {
            dir: source,
            format,
        }
        .into());
    }
    sort_tracks(&mut tracks);
    info!("Building chapters for {} tracks", tracks.len());

    let probe = probe_for(settings);
    let chapters = build_chapters(&tracks, probe.as_ref())?;

    let job = MergeJob {
        destination: args.destination.clone().unwrap_or_else(|| source_dir(&source)),
        output_name: args
            .output
            .clone()
            .unwrap_or_else(|| settings.concat.output_name.clone()),
        ffmpeg: PathBuf::from(&settings.concat.ffmpeg),
    };
    let output = job.run(&tracks, &chapters)?;
    info!("Created '{}' with {} chapters", output.display(), chapters.len());
    Ok(())
}
