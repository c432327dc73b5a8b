//! Horizontal follow camera

use serde::{Deserialize, Serialize};

use crate::consts::{CAMERA_DEADZONE, CAMERA_LERP};
use crate::lerp;

/// Side-scrolling camera. Only the horizontal scroll is tracked; it never
/// moves backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// World x of the left edge of the view
    pub scroll_x: f32,
}

impl Camera {
    pub fn at(scroll_x: f32) -> Self {
        Self {
            scroll_x: scroll_x.max(0.0),
        }
    }

    /// Ease toward keeping `target_x` centred, ignoring motion inside the deadzone
    pub fn follow(&mut self, target_x: f32, viewport_width: f32) {
        let center = self.scroll_x + viewport_width / 2.0;
        let offset = target_x - center;
        if offset <= CAMERA_DEADZONE / 2.0 {
            return;
        }
        let desired = target_x - CAMERA_DEADZONE / 2.0 - viewport_width / 2.0;
        let next = lerp(self.scroll_x, desired, CAMERA_LERP);
        self.scroll_x = self.scroll_x.max(next);
    }

    /// World x of the right edge of the view
    pub fn right(&self, viewport_width: f32) -> f32 {
        self.scroll_x + viewport_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadzone_holds_still() {
        let mut camera = Camera::default();
        camera.follow(640.0 + CAMERA_DEADZONE / 2.0, 1280.0);
        assert_eq!(camera.scroll_x, 0.0);
    }

    #[test]
    fn test_follow_eases_forward() {
        let mut camera = Camera::default();
        camera.follow(1000.0, 1280.0);
        assert!(camera.scroll_x > 0.0);
        let desired = 1000.0 - CAMERA_DEADZONE / 2.0 - 640.0;
        assert!(camera.scroll_x < desired);
        assert!((camera.scroll_x - desired * CAMERA_LERP).abs() < 0.001);
    }

    #[test]
    fn test_never_scrolls_back() {
        let mut camera = Camera::at(500.0);
        camera.follow(0.0, 1280.0);
        assert_eq!(camera.scroll_x, 500.0);
        assert_eq!(camera.right(1280.0), 1780.0);
    }

    #[test]
    fn test_at_clamps_to_origin() {
        assert_eq!(Camera::at(-200.0).scroll_x, 0.0);
    }
}
