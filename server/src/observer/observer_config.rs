/// Per-observer visibility settings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserverConfig {
    /// Hard cutoff: anything further away is always hidden
    pub max_visibility_radius: f32,
    /// Anything closer is always visible, occluded or not
    pub unconditional_visibility_radius: f32,
    /// Height of the observer's eye above its position
    pub eye_height: f32,
}

impl ObserverConfig {
    pub fn new(max_visibility_radius: f32, unconditional_visibility_radius: f32) -> Self {
        Self {
            max_visibility_radius,
            unconditional_visibility_radius,
            ..Default::default()
        }
    }

    pub fn with_eye_height(mut self, eye_height: f32) -> Self {
        self.eye_height = eye_height;
        self
    }

    pub(crate) fn max_visibility_radius_squared(&self) -> f32 {
        self.max_visibility_radius * self.max_visibility_radius
    }

    pub(crate) fn unconditional_visibility_radius_squared(&self) -> f32 {
        self.unconditional_visibility_radius * self.unconditional_visibility_radius
    }
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            max_visibility_radius: 400.0,
            unconditional_visibility_radius: 15.0,
            eye_height: 1.7,
        }
    }
}
