use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::access::UNKNOWN_IDENTITY;
use crate::detect::backend::SubjectDetector;
use crate::detect::result::DetectedSubject;
use crate::geometry::BoundingBox;
use crate::ingest::Frame;

const BOX_W: i32 = 80;
const BOX_H: i32 = 100;
const MAX_STEP: i32 = 12;

struct Walker {
    identity: String,
    x: i32,
    y: i32,
    dx: i32,
    dy: i32,
}

/// Stub backend: people wandering around the frame, bouncing off the edges.
///
/// Positions come from a seeded RNG so a given seed always replays the same walk.
/// One extra walker carries the "Unknown" label to exercise unrecognised faces.
pub struct WandererDetector {
    walkers: Vec<Walker>,
    rng: StdRng,
    initialised: bool,
}

impl WandererDetector {
    pub fn new(identities: &[String], seed: u64) -> Self {
        let mut names: Vec<String> = identities.to_vec();
        names.push(UNKNOWN_IDENTITY.to_string());
        let walkers = names
            .into_iter()
            .map(|identity| Walker {
                identity,
                x: 0,
                y: 0,
                dx: 0,
                dy: 0,
            })
            .collect();
        Self {
            walkers,
            rng: StdRng::seed_from_u64(seed),
            initialised: false,
        }
    }

    fn place(&mut self, width: i32, height: i32) {
        for walker in &mut self.walkers {
            walker.x = self.rng.gen_range(0..=(width - BOX_W).max(0));
            walker.y = self.rng.gen_range(0..=(height - BOX_H).max(0));
            walker.dx = nonzero_step(&mut self.rng);
            walker.dy = nonzero_step(&mut self.rng);
        }
        self.initialised = true;
    }
}

fn nonzero_step(rng: &mut StdRng) -> i32 {
    let step = rng.gen_range(1..=MAX_STEP);
    if rng.gen_bool(0.5) {
        step
    } else {
        -step
    }
}

impl SubjectDetector for WandererDetector {
    fn name(&self) -> &'static str {
        "wanderer"
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectedSubject>> {
        let width = i32::try_from(frame.width).map_err(|_| anyhow!("frame width too large"))?;
        let height = i32::try_from(frame.height).map_err(|_| anyhow!("frame height too large"))?;
        if !self.initialised {
            self.place(width, height);
        }

        let max_x = (width - BOX_W).max(0);
        let max_y = (height - BOX_H).max(0);
        let mut out = Vec::with_capacity(self.walkers.len());
        for walker in &mut self.walkers {
            walker.x += walker.dx;
            walker.y += walker.dy;
            if walker.x < 0 || walker.x > max_x {
                walker.dx = -walker.dx;
                walker.x = walker.x.clamp(0, max_x);
            }
            if walker.y < 0 || walker.y > max_y {
                walker.dy = -walker.dy;
                walker.y = walker.y.clamp(0, max_y);
            }
            out.push(DetectedSubject {
                bbox: BoundingBox::new(walker.x, walker.y, walker.x + BOX_W, walker.y + BOX_H),
                identity: walker.identity.clone(),
                embedding_available: true,
            });
        }
        Ok(out)
    }
}
