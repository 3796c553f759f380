use chrono::{DateTime, Utc};
use png::ColorType;
use serde::Serialize;
use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::colors::Palette;
use crate::config::SimConfig;
use crate::error::{Error, Result};
use crate::simulation::Simulation;

/// Half the side of the square drawn for each ant.
const ANT_HALF_SIZE: i64 = 1;

/// One RGBA8 image at arena resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub tick: u64,
    pub pixels: Vec<u8>,
}

impl Frame {
    fn filled(width: u32, height: u32, tick: u64, color: [u8; 3]) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..width as usize * height as usize {
            pixels.extend_from_slice(&[color[0], color[1], color[2], 255]);
        }
        Self {
            width,
            height,
            tick,
            pixels,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.pixels[idx..idx + 4]);
        Some(out)
    }

    fn put(&mut self, x: i64, y: i64, color: [u8; 3]) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = ((y as usize * self.width as usize) + x as usize) * 4;
        self.pixels[idx..idx + 3].copy_from_slice(&color);
        self.pixels[idx + 3] = 255;
    }

    fn fill_disc(&mut self, cx: f32, cy: f32, radius: f32, color: [u8; 3]) {
        let r = radius.ceil() as i64;
        let (px, py) = (cx.floor() as i64, cy.floor() as i64);
        for dy in -r..=r {
            for dx in -r..=r {
                let (x, y) = (px + dx, py + dy);
                let (ox, oy) = (x as f32 + 0.5 - cx, y as f32 + 0.5 - cy);
                if ox * ox + oy * oy <= radius * radius {
                    self.put(x, y, color);
                }
            }
        }
    }

    fn fill_square(&mut self, cx: f32, cy: f32, half: i64, color: [u8; 3]) {
        let (px, py) = (cx.floor() as i64, cy.floor() as i64);
        for dy in -half..=half {
            for dx in -half..=half {
                self.put(px + dx, py + dy, color);
            }
        }
    }
}

#[derive(Serialize)]
struct RecordingMetadata<'a> {
    recorded_at: String,
    started_at: String,
    frame_count: usize,
    first_tick: u64,
    last_tick: u64,
    width: u32,
    height: u32,
    config: Option<&'a SimConfig>,
}

/// Software renderer for simulation snapshots with a bounded frame buffer.
/// Reads the simulation through its public accessors only.
pub struct FrameRecorder {
    palette: Palette,
    max_frames: usize,
    frames: VecDeque<Frame>,
    config: Option<SimConfig>,
    started_at: DateTime<Utc>,
}

impl Default for FrameRecorder {
    fn default() -> Self {
        Self::new(600)
    }
}

impl FrameRecorder {
    pub fn new(max_frames: usize) -> Self {
        Self::with_palette(max_frames, Palette::default())
    }

    pub fn with_palette(max_frames: usize, palette: Palette) -> Self {
        Self {
            palette,
            max_frames: max_frames.max(1),
            frames: VecDeque::new(),
            config: None,
            started_at: Utc::now(),
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Draws trails, then food, nest and ants on top.
    pub fn render(&self, sim: &Simulation) -> Frame {
        let field = sim.field();
        let (width, height) = (field.width() as u32, field.height() as u32);
        let mut frame = Frame::filled(width, height, sim.stats().tick, self.palette.background);

        for (idx, &level) in field.cells().iter().enumerate() {
            if level > 0.0 {
                let x = (idx % field.width()) as i64;
                let y = (idx / field.width()) as i64;
                frame.put(x, y, self.palette.trail_over_background(level));
            }
        }

        for food in sim.food().iter().filter(|food| food.is_active()) {
            frame.fill_disc(food.x, food.y, food.radius / 2.0, self.palette.food_source);
        }

        let nest = sim.nest();
        frame.fill_disc(nest.x, nest.y, nest.radius / 2.0, self.palette.nest);

        for ant in sim.ants() {
            frame.fill_square(ant.x, ant.y, ANT_HALF_SIZE, self.palette.ant(ant.has_food()));
        }

        frame
    }

    /// Renders and buffers a frame, dropping the oldest once full. A tick
    /// that is already the newest frame is not captured again; returns
    /// whether a frame was added.
    pub fn capture(&mut self, sim: &Simulation) -> bool {
        let tick = sim.stats().tick;
        if self.frames.back().is_some_and(|frame| frame.tick == tick) {
            return false;
        }
        if self.frames.len() == self.max_frames {
            self.frames.pop_front();
        }
        self.frames.push_back(self.render(sim));
        self.config = Some(sim.config().clone());
        true
    }

    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Writes every buffered frame as `frame_NNNN.png` plus `metadata.json`
    /// into `dir`, creating it if needed. Returns the number of frames written.
    pub fn save_png_sequence(&self, dir: &Path) -> Result<usize> {
        let (first, last) = match (self.frames.front(), self.frames.back()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(Error::NoFrames),
        };
        fs::create_dir_all(dir)?;

        for (i, frame) in self.frames.iter().enumerate() {
            let path = dir.join(format!("frame_{i:04}.png"));
            save_frame_as_png(&path, frame)?;
            debug!(path = %path.display(), tick = frame.tick, "frame written");
        }

        let metadata = RecordingMetadata {
            recorded_at: Utc::now().to_rfc3339(),
            started_at: self.started_at.to_rfc3339(),
            frame_count: self.frames.len(),
            first_tick: first.tick,
            last_tick: last.tick,
            width: first.width,
            height: first.height,
            config: self.config.as_ref(),
        };
        fs::write(dir.join("metadata.json"), serde_json::to_string_pretty(&metadata)?)?;

        info!(dir = %dir.display(), frames = self.frames.len(), "recording saved");
        Ok(self.frames.len())
    }
}

/// `base/recording_YYYYmmdd_HHMMSS`, for hosts that want a fresh directory per run.
pub fn timestamped_dir(base: &Path) -> PathBuf {
    base.join(format!("recording_{}", Utc::now().format("%Y%m%d_%H%M%S")))
}

pub fn save_frame_as_png(path: &Path, frame: &Frame) -> Result<()> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.pixels.len() != expected {
        return Err(Error::FrameSize {
            expected,
            actual: frame.pixels.len(),
        });
    }

    let file = File::create(path)?;
    let w = BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, frame.width, frame.height);
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&frame.pixels)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> Simulation {
        let config = SimConfig {
            population: 10,
            ..SimConfig::default()
        };
        Simulation::with_seed(config, 320, 240, 11)
    }

    #[test]
    fn render_matches_arena_and_draws_nest() {
        let sim = sim();
        let recorder = FrameRecorder::default();
        let frame = recorder.render(&sim);

        assert_eq!((frame.width, frame.height), (320, 240));
        assert_eq!(frame.pixels.len(), 320 * 240 * 4);

        let palette = recorder.palette();
        // ants all sit on the nest at tick 0, so probe off-centre
        let [r, g, b, a] = frame.pixel(160 + 8, 120).unwrap();
        assert_eq!([r, g, b], palette.nest);
        assert_eq!(a, 255);
        let [r, g, b, _] = frame.pixel(2, 2).unwrap();
        assert_eq!([r, g, b], palette.background);
        assert!(frame.pixel(320, 0).is_none());
    }

    #[test]
    fn capture_is_bounded() {
        let mut sim = sim();
        let mut recorder = FrameRecorder::new(3);
        for _ in 0..5 {
            sim.step();
            recorder.capture(&sim);
        }
        assert_eq!(recorder.len(), 3);
        let ticks: Vec<u64> = recorder.frames().map(|frame| frame.tick).collect();
        assert_eq!(ticks, vec![3, 4, 5]);
    }

    #[test]
    fn paused_ticks_are_captured_once() {
        let mut sim = sim();
        let mut recorder = FrameRecorder::new(10);
        assert!(recorder.capture(&sim));
        for _ in 0..4 {
            assert!(!recorder.capture(&sim));
        }
        sim.step();
        assert!(recorder.capture(&sim));
        assert!(!recorder.capture(&sim));

        let ticks: Vec<u64> = recorder.frames().map(|frame| frame.tick).collect();
        assert_eq!(ticks, vec![0, 1]);
    }

    #[test]
    fn saving_without_frames_fails() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = FrameRecorder::default();
        assert!(matches!(
            recorder.save_png_sequence(dir.path()),
            Err(Error::NoFrames)
        ));
    }

    #[test]
    fn mismatched_frame_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let frame = Frame {
            width: 4,
            height: 4,
            tick: 0,
            pixels: vec![0; 10],
        };
        let err = save_frame_as_png(&dir.path().join("bad.png"), &frame).unwrap_err();
        assert!(matches!(err, Error::FrameSize { expected: 64, actual: 10 }));
    }
}
