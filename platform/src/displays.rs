use gp_core::error::Result;
use gp_core::traits::DisplayTopology;
use gp_core::types::Rect;

/// Display topology backed by configuration. Desktop bounds is the union
/// of the configured frames; `update` supports topology changes at runtime.
pub struct StaticDisplays {
    frames: Vec<Rect>,
}

impl StaticDisplays {
    pub fn new(frames: Vec<Rect>) -> Self {
        Self { frames }
    }

    pub fn update(&mut self, frames: Vec<Rect>) {
        self.frames = frames;
    }
}

impl DisplayTopology for StaticDisplays {
    fn enumerate_displays(&mut self) -> Result<Vec<Rect>> {
        Ok(self.frames.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumerate_returns_configured_frames() {
        let mut displays = StaticDisplays::new(vec![
            Rect::new(0.0, 0.0, 1920.0, 1080.0),
            Rect::new(1920.0, 0.0, 1280.0, 1024.0),
        ]);
        let frames = displays.enumerate_displays().unwrap();
        assert_eq!(frames.len(), 2);

        let union = frames.iter().skip(1).fold(frames[0], |acc, f| acc.union(f));
        assert_eq!(union, Rect::new(0.0, 0.0, 3200.0, 1080.0));
    }
}
