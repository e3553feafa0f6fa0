//! ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use cubelet_core::geometry::UNIT_QUAD;
use cubelet_core::Surface;
use nalgebra::{Matrix4, Vector4};
use std::io::Write;

/// Glyph for every covered cell; the colour does the rest
const FILL: char = '█';

/// Terminal-cell rasterizer implementing the cube's drawing surface
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    color_buffer: Vec<Option<[f32; 3]>>,
    matrix: Matrix4<f32>,
    color: [f32; 3],
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            color_buffer: vec![None; size],
            matrix: Matrix4::identity(),
            color: [1.0, 1.0, 1.0],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.color_buffer.fill(None);
    }

    /// Colour of the nearest quad covering a cell
    pub fn color_at(&self, x: usize, y: usize) -> Option<[f32; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.color_buffer[y * self.width + x]
    }

    /// Number of covered cells
    pub fn coverage(&self) -> usize {
        self.color_buffer.iter().filter(|c| c.is_some()).count()
    }

    /// Map a quad corner to (screen x, screen y, depth), or `None` when it
    /// falls outside the depth range
    fn project(&self, corner: [f64; 3]) -> Option<(f32, f32, f32)> {
        let [x, y, z] = corner.map(|v| v as f32);
        let clip = self.matrix * Vector4::new(x, y, z, 1.0);

        // Prevent division by near-zero w
        if clip.w.abs() < 1e-6 {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let depth = clip.z / clip.w;
        if !(-1.0..=1.0).contains(&depth) {
            return None;
        }

        let screen_x = (ndc_x + 1.0) * 0.5 * self.width as f32;
        let screen_y = (1.0 - ndc_y) * 0.5 * self.height as f32;

        Some((screen_x, screen_y, depth))
    }

    fn rasterize_triangle(&mut self, coords: [(f32, f32, f32); 3], color: [f32; 3]) {
        let [v0, v1, v2] = coords;

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                if let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;

                        let idx = y as usize * self.width + x as usize;
                        if depth < self.depth_buffer[idx] {
                            self.depth_buffer[idx] = depth;
                            self.color_buffer[idx] = Some(color);
                        }
                    }
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for y in 0..self.height {
            for x in 0..self.width {
                match self.color_buffer[y * self.width + x] {
                    Some(color) => {
                        let color = to_terminal_color(color);
                        if current != Some(color) {
                            writer.queue(SetForegroundColor(color))?;
                            current = Some(color);
                        }
                        writer.queue(Print(FILL))?;
                    }
                    None => {
                        writer.queue(Print(' '))?;
                    }
                }
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl Surface for AsciiRenderer {
    fn set_matrix(&mut self, row_major: [f32; 16]) {
        self.matrix = Matrix4::from_row_slice(&row_major);
    }

    fn set_color(&mut self, rgb: [f32; 3]) {
        self.color = rgb;
    }

    fn draw_quad(&mut self) {
        let mut corners = [(0.0, 0.0, 0.0); 4];
        for (slot, corner) in corners.iter_mut().zip(UNIT_QUAD) {
            match self.project(corner) {
                Some(projected) => *slot = projected,
                None => return, // Quad is clipped
            }
        }

        let color = self.color;
        self.rasterize_triangle([corners[0], corners[1], corners[2]], color);
        self.rasterize_triangle([corners[0], corners[2], corners[3]], color);
    }
}

fn to_terminal_color(rgb: [f32; 3]) -> Color {
    let [r, g, b] = rgb.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    Color::Rgb { r, g, b }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
