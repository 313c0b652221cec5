//! Synthetic frame source for `stub://` URLs.

use anyhow::{anyhow, Result};

use super::{Frame, FrameSource};

/// Configuration for a frame source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceConfig {
    /// Source URL (e.g., "stub://dock_camera", "rtsp://192.168.1.100:554/stream")
    pub url: String,
    /// Target frame rate (frames per second).
    pub target_fps: u32,
    pub width: u32,
    pub height: u32,
    /// Stop after this many frames. `None` runs until quit.
    pub max_frames: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: "stub://warehouse".to_string(),
            target_fps: 10,
            width: 800,
            height: 600,
            max_frames: None,
        }
    }
}

pub struct SyntheticSource {
    config: SourceConfig,
    frames_captured: u64,
}

impl SyntheticSource {
    pub fn new(config: SourceConfig) -> Result<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(anyhow!("frame size must be non-zero"));
        }
        Ok(Self {
            config,
            frames_captured: 0,
        })
    }

    pub fn frames_captured(&self) -> u64 {
        self.frames_captured
    }
}

impl FrameSource for SyntheticSource {
    fn describe(&self) -> String {
        format!("{} (synthetic)", self.config.url)
    }

    /// Synthetic sources are always "connected".
    fn connect(&mut self) -> Result<()> {
        log::info!("frame source: connected to {}", self.describe());
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame> {
        if let Some(max) = self.config.max_frames {
            if self.frames_captured >= max {
                return Err(anyhow!(
                    "frame source {} exhausted after {} frames",
                    self.config.url,
                    max
                ));
            }
        }
        self.frames_captured += 1;
        Frame::new(self.frames_captured, self.config.width, self.config.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_source_exhausts() {
        let mut source = SyntheticSource::new(SourceConfig {
            max_frames: Some(2),
            ..SourceConfig::default()
        })
        .unwrap();
        assert_eq!(source.next_frame().unwrap().index, 1);
        let second = source.next_frame().unwrap();
        assert_eq!(second.index, 2);
        assert_eq!((second.width, second.height), (800, 600));
        assert!(source.next_frame().is_err());
        assert_eq!(source.frames_captured(), 2);
    }

    #[test]
    fn rejects_empty_frame_size() {
        let cfg = SourceConfig {
            width: 0,
            ..SourceConfig::default()
        };
        assert!(SyntheticSource::new(cfg).is_err());
    }
}
