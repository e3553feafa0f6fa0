/// Rendering surface the cube draws itself onto.
///
/// Mirrors a minimal shader interface: a matrix uniform, a colour uniform and
/// a call that draws the unit quad ([`crate::geometry::UNIT_QUAD`]) through the
/// current matrix in the current colour.
pub trait Surface {
    /// Row-major 4x4 matrix mapping quad corners to clip space
    fn set_matrix(&mut self, row_major: [f32; 16]);

    fn set_color(&mut self, rgb: [f32; 3]);

    fn draw_quad(&mut self);
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn set_matrix(&mut self, row_major: [f32; 16]) {
        (**self).set_matrix(row_major);
    }

    fn set_color(&mut self, rgb: [f32; 3]) {
        (**self).set_color(rgb);
    }

    fn draw_quad(&mut self) {
        (**self).draw_quad();
    }
}
