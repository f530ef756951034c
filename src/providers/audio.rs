use std::path::Path;

use anyhow::{Context, Result, bail};
use tokio::process::Command;
use tracing::{debug, info};

use super::{AudioSource, PreparedAudio};

/// Decodes media into mono 16 kHz WAV with ffmpeg and probes duration with
/// ffprobe. WAV inputs are probed in place without re-encoding.
#[derive(Debug, Clone)]
pub struct FfmpegAudioSource {
    sample_rate: u32,
    channels: u32,
}

impl Default for FfmpegAudioSource {
    fn default() -> Self {
        // 16 kHz mono is what the downstream ASR models expect
        Self {
            sample_rate: 16_000,
            channels: 1,
        }
    }
}

impl FfmpegAudioSource {
    pub fn new(sample_rate: u32, channels: u32) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    async fn extract(&self, media: &Path) -> Result<std::path::PathBuf> {
        let output = media.with_extension("wav");
        info!("Extracting audio from {:?} to {:?}", media, output);

        let status = Command::new("ffmpeg")
            .arg("-y")
            .arg("-i")
            .arg(media)
            .args(["-acodec", "pcm_s16le"])
            .args(["-ac", &self.channels.to_string()])
            .args(["-ar", &self.sample_rate.to_string()])
            .args(["-loglevel", "error"])
            .arg(&output)
            .status()
            .await
            .context("Failed to spawn ffmpeg (is it installed?)")?;

        if !status.success() {
            bail!("ffmpeg exited with status {status} for {media:?}");
        }

        Ok(output)
    }

    async fn probe_duration(&self, audio: &Path) -> Result<f64> {
        let output = Command::new("ffprobe")
            .args(["-v", "error"])
            .args(["-show_entries", "format=duration"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(audio)
            .output()
            .await
            .context("Failed to spawn ffprobe (is it installed?)")?;

        if !output.status.success() {
            bail!(
                "ffprobe failed for {audio:?}: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .trim()
            .parse::<f64>()
            .with_context(|| format!("Unparseable ffprobe duration: {stdout:?}"))
    }
}

impl AudioSource for FfmpegAudioSource {
    async fn prepare(&self, media: &Path) -> Result<PreparedAudio> {
        if !media.exists() {
            bail!("media file not found: {media:?}");
        }

        let path = if media.extension().is_some_and(|e| e.eq_ignore_ascii_case("wav")) {
            debug!("Input already WAV, probing in place");
            media.to_path_buf()
        } else {
            self.extract(media).await?
        };

        let duration_secs = self.probe_duration(&path).await?;
        info!("Audio ready: {:?} ({duration_secs:.2}s)", path);

        Ok(PreparedAudio {
            path,
            duration_secs,
        })
    }
}
