//! Frame sources.
//!
//! Capture and decoding belong to an external collaborator; this module defines the
//! boundary it plugs into and ships a synthetic `stub://` source for demos and tests.
//!
//! A source error ends the monitoring loop. Exhaustion of a bounded source is reported
//! the same way.

use anyhow::{bail, Result};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod synthetic;

pub use synthetic::{SourceConfig, SyntheticSource};

/// One captured frame as seen by the engine. Pixels stay with the capture collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// 1-based sequence number within the source.
    pub index: u64,
    pub width: u32,
    pub height: u32,
    /// Capture time, seconds since the epoch.
    pub captured_at_s: u64,
}

impl Frame {
    pub fn new(index: u64, width: u32, height: u32) -> Result<Self> {
        let captured_at_s = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        Ok(Self {
            index,
            width,
            height,
            captured_at_s,
        })
    }
}

pub trait FrameSource: Send {
    /// Source description for logs.
    fn describe(&self) -> String;

    fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    /// Capture the next frame. Any error is fatal to the caller's loop.
    fn next_frame(&mut self) -> Result<Frame>;
}

/// Open a source for a configured URL.
pub fn open_source(config: SourceConfig) -> Result<Box<dyn FrameSource>> {
    if config.url.starts_with("stub://") {
        return Ok(Box::new(SyntheticSource::new(config)?));
    }
    bail!(
        "no capture backend for '{}': live capture is provided by the embedding application",
        config.url
    )
}
