use glam::{Mat4, Vec3};

/// Perspective camera with cached projection/view matrices.
///
/// Matrices are recomputed whenever an input changes or the viewport
/// resizes; a resize touches only aspect and projection, never the
/// location or target.
#[derive(Debug, Clone)]
pub struct Camera {
    pub location: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    projection_matrix: Mat4,
    view_matrix: Mat4,
}

/// The scene is authored Z-up.
const UP: Vec3 = Vec3::Z;

impl Camera {
    #[must_use]
    pub fn new(location: Vec3, target: Vec3, fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            location,
            target,
            fov,
            aspect,
            near,
            far,
            projection_matrix: Mat4::IDENTITY,
            view_matrix: Mat4::IDENTITY,
        };
        camera.update_matrices();
        camera
    }

    /// The fixed showcase viewpoint: slightly above the origin, 35° fov.
    #[must_use]
    pub fn showcase(aspect: f32) -> Self {
        Self::new(
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::ZERO,
            35.0_f32.to_radians(),
            aspect,
            0.01,
            100.0,
        )
    }

    /// Recomputes both matrices from the current fields.
    pub fn update_matrices(&mut self) {
        self.projection_matrix = Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far);
        self.view_matrix = Mat4::look_at_rh(self.location, self.target, UP);
    }

    /// Viewport resize: only aspect and projection change.
    pub fn resize(&mut self, width: u32, height: u32) {
        if height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
        self.projection_matrix = Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far);
    }

    /// Unit vector from the camera toward its target.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        (self.target - self.location).normalize()
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }
}
