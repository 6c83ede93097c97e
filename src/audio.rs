//! Background music
//!
//! One track, loaded once and looped for the rest of the process on its own
//! thread. Real playback needs the `audio` feature; without it the track is
//! still loaded (so a missing file fails the same way) but nothing plays.

use std::path::Path;

/// Audio manager for the game
pub struct AudioManager {
    volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(0.7)
    }
}

impl AudioManager {
    pub fn new(volume: f32) -> Self {
        Self {
            volume: volume.clamp(0.0, 1.0),
            muted: false,
        }
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }

    /// Start looping `path` in the background
    ///
    /// Fails if the file cannot be loaded or no output device is available.
    #[cfg(feature = "audio")]
    pub fn play_background_loop(&self, path: &Path) -> anyhow::Result<()> {
        use std::fs::File;
        use std::io::BufReader;

        use anyhow::Context;
        use rodio::{Decoder, OutputStream, Sink, Source};

        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let source = Decoder::new(BufReader::new(file))
            .with_context(|| format!("decoding {}", path.display()))?
            .repeat_infinite();
        let volume = self.effective_volume();

        // The output stream is not Send, so it is opened on the music thread
        let (ready_tx, ready_rx) = flume::bounded::<anyhow::Result<()>>(1);
        std::thread::Builder::new()
            .name("music".to_string())
            .spawn(move || {
                let opened = OutputStream::try_default()
                    .map_err(anyhow::Error::from)
                    .and_then(|(stream, handle)| Ok((stream, Sink::try_new(&handle)?)));
                let (_stream, sink) = match opened {
                    Ok(output) => output,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                sink.set_volume(volume);
                sink.append(source);
                let _ = ready_tx.send(Ok(()));
                sink.sleep_until_end();
            })?;

        ready_rx.recv()??;
        log::info!("Playing {} on loop", path.display());
        Ok(())
    }

    /// Load `path` without playing it
    #[cfg(not(feature = "audio"))]
    pub fn play_background_loop(&self, path: &Path) -> anyhow::Result<()> {
        use anyhow::Context;

        std::fs::metadata(path).with_context(|| format!("opening {}", path.display()))?;
        log::warn!(
            "Built without the `audio` feature; {} will not play",
            path.display()
        );
        Ok(())
    }
}
