//! Notification sound queue.
//!
//! Clips are queued by name and played one at a time through an external
//! player (`aplay`, `paplay`, ...) as `<player> <clip_directory>/<name>.wav`.
//! The player runs as a child process and is polled with `try_wait` on
//! each tick, so playback never blocks the control loop. At most one clip
//! is started per tick.
//!
//! Without a player, clips are logged instead of played.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use heapless::{Deque, String};
use log::{debug, info, warn};

use crate::app::ports::SoundPort;
use crate::config::SoundSettings;

/// Clips waiting to be played.
pub const SOUND_QUEUE_CAPACITY: usize = 8;

/// Longest clip name accepted.
pub const CLIP_NAME_CAPACITY: usize = 64;

type ClipName = String<CLIP_NAME_CAPACITY>;

pub struct QueuedSound {
    queue: Deque<ClipName, SOUND_QUEUE_CAPACITY>,
    clip_directory: PathBuf,
    player: Option<std::string::String>,
    playing: Option<Child>,
    /// Clips started so far, played or logged.
    started: u64,
}

impl QueuedSound {
    pub fn new(settings: &SoundSettings) -> Self {
        Self {
            queue: Deque::new(),
            clip_directory: settings.clip_directory.clone(),
            player: settings.player.clone(),
            playing: None,
            started: 0,
        }
    }

    /// Clips still waiting to start.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_playing(&self) -> bool {
        self.playing.is_some()
    }

    pub fn started(&self) -> u64 {
        self.started
    }

    pub fn clip_path(&self, clip: &str) -> PathBuf {
        self.clip_directory.join(format!("{clip}.wav"))
    }

    /// Reap the running player, if it has exited. Returns `true` while a
    /// clip is still playing.
    fn poll_player(&mut self) -> bool {
        let Some(child) = self.playing.as_mut() else {
            return false;
        };
        match child.try_wait() {
            Ok(Some(status)) => {
                if !status.success() {
                    debug!("Sound player exited with {status}");
                }
                self.playing = None;
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!("Lost track of sound player: {e}");
                self.playing = None;
                false
            }
        }
    }

    fn start(&mut self, clip: &str) {
        let path = self.clip_path(clip);
        self.started += 1;

        let Some(player) = self.player.as_deref() else {
            info!("Would have played '{}'", path.display());
            return;
        };

        match Command::new(player)
            .arg(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => {
                debug!("Playing '{}'", path.display());
                self.playing = Some(child);
            }
            Err(e) => warn!("Could not start '{player}' for '{}': {e}", path.display()),
        }
    }
}

impl SoundPort for QueuedSound {
    fn queue(&mut self, clip: &str) {
        let Ok(name) = ClipName::try_from(clip) else {
            warn!("Sound clip name '{clip}' too long, ignored");
            return;
        };
        if self.queue.push_back(name).is_err() {
            warn!("Sound queue full, dropping '{clip}'");
        }
    }

    fn tick(&mut self) {
        if self.poll_player() {
            return;
        }
        if let Some(clip) = self.queue.pop_front() {
            self.start(&clip);
        }
    }
}

impl Drop for QueuedSound {
    fn drop(&mut self) {
        let Some(mut child) = self.playing.take() else {
            return;
        };
        if let Err(e) = child.kill() {
            debug!("Sound player already gone: {e}");
        }
        if let Err(e) = child.wait() {
            warn!("Could not reap sound player: {e}");
        }
    }
}
