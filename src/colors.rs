/// Shared colour scheme so the live viewer and exported frames agree.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub background: [u8; 3],
    pub trail: [u8; 3],
    pub nest: [u8; 3],
    pub food_source: [u8; 3],
    pub ant_searching: [u8; 3],
    pub ant_returning: [u8; 3],
    pub text: [u8; 3],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: [240, 240, 240],
            trail: [0, 0, 255],          // Blue
            nest: [139, 69, 19],         // Brown
            food_source: [0, 200, 0],    // Green
            ant_searching: [0, 0, 0],    // Black
            ant_returning: [0, 200, 0],  // Green, carrying food
            text: [0, 0, 0],
        }
    }
}

impl Palette {
    pub fn ant(&self, has_food: bool) -> [u8; 3] {
        if has_food {
            self.ant_returning
        } else {
            self.ant_searching
        }
    }

    /// Blends the trail colour over the background. Intensity saturates at
    /// 255 field units regardless of the configured cap.
    pub fn trail_over_background(&self, level: f32) -> [u8; 3] {
        let t = (level / 255.0).clamp(0.0, 1.0);
        let mut out = [0u8; 3];
        for (channel, (bg, fg)) in out.iter_mut().zip(self.background.iter().zip(self.trail)) {
            *channel = (*bg as f32 + (fg as f32 - *bg as f32) * t).round() as u8;
        }
        out
    }
}
