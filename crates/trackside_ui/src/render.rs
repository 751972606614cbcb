//! Draw surface.
//!
//! Widgets draw through the [`Drawer`] trait. [`CommandDrawer`] is the stock
//! implementation: it records render commands, splits them into batches at
//! clip boundaries and tessellates batches into GPU-ready vertices.

use crate::layout::Rect;
use crate::style::Color;
use crate::texture::{TextureHandle, TextureResolver};

/// Render context handed to every node's draw.
pub trait Drawer {
    /// Filled rectangle.
    fn draw_rect(&mut self, bounds: Rect, color: Color, corner_radius: f32);

    /// Rectangle outline.
    fn draw_outline(&mut self, bounds: Rect, color: Color, width: f32);

    /// Textured quad.
    fn draw_texture(&mut self, bounds: Rect, texture: TextureHandle, tint: Color);

    /// Text with its top-left corner at `(x, y)`.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, color: Color, font_size: f32);

    /// Resolver used for lazy texture lookup.
    fn textures(&self) -> &dyn TextureResolver;

    /// Clips subsequent drawing to `bounds`.
    fn push_clip(&mut self, _bounds: Rect) {}

    /// Pops the innermost clip.
    fn pop_clip(&mut self) {}
}

/// A render command for the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Filled rectangle.
    Rect {
        /// Bounds.
        bounds: Rect,
        /// Fill color.
        color: Color,
        /// Corner radius.
        corner_radius: f32,
    },
    /// Rectangle outline.
    RectOutline {
        /// Bounds.
        bounds: Rect,
        /// Stroke color.
        color: Color,
        /// Line width.
        width: f32,
    },
    /// Text.
    Text {
        /// Text content.
        text: String,
        /// X position.
        x: f32,
        /// Y position.
        y: f32,
        /// Text color.
        color: Color,
        /// Font size.
        font_size: f32,
    },
    /// Textured quad.
    Texture {
        /// Bounds.
        bounds: Rect,
        /// Texture.
        texture: TextureHandle,
        /// Tint color.
        color: Color,
    },
    /// Scissor rect (clip children).
    PushClip {
        /// Clip bounds.
        bounds: Rect,
    },
    /// Pop scissor rect.
    PopClip,
}

/// A batch of render commands sharing one clip rect.
#[derive(Debug, Clone, Default)]
pub struct UIBatch {
    /// Commands in this batch.
    pub commands: Vec<RenderCommand>,
    /// Clip rect (if any).
    pub clip: Option<Rect>,
}

/// Drawer that records commands for later submission.
pub struct CommandDrawer<R: TextureResolver> {
    resolver: R,
    /// All commands from the frame.
    commands: Vec<RenderCommand>,
    /// Clip stack.
    clip_stack: Vec<Rect>,
    /// Final batches for rendering.
    batches: Vec<UIBatch>,
}

impl<R: TextureResolver> CommandDrawer<R> {
    /// Creates a drawer over a texture resolver.
    #[must_use]
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            commands: Vec::with_capacity(4096),
            clip_stack: Vec::with_capacity(16),
            batches: Vec::with_capacity(64),
        }
    }

    /// Returns the resolver.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Mutable access to the resolver (hosts register textures as they load).
    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    /// Begins a new frame.
    pub fn begin_frame(&mut self) {
        self.commands.clear();
        self.clip_stack.clear();
        self.batches.clear();
    }

    /// Commands recorded so far this frame.
    #[must_use]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Returns the total command count.
    #[must_use]
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Returns the current clip rect.
    #[must_use]
    pub fn current_clip(&self) -> Option<Rect> {
        self.clip_stack.last().copied()
    }

    /// Ends the frame and returns batches for rendering.
    ///
    /// A new batch starts at every clip change.
    pub fn end_frame(&mut self) -> &[UIBatch] {
        self.batches.clear();
        let mut clips: Vec<Rect> = Vec::new();
        let mut current = UIBatch::default();

        for command in self.commands.drain(..) {
            match command {
                RenderCommand::PushClip { bounds } => {
                    clips.push(bounds);
                }
                RenderCommand::PopClip => {
                    clips.pop();
                }
                other => {
                    current.commands.push(other);
                    continue;
                }
            }
            let finished = std::mem::replace(
                &mut current,
                UIBatch {
                    commands: Vec::new(),
                    clip: clips.last().copied(),
                },
            );
            if !finished.commands.is_empty() {
                self.batches.push(finished);
            }
        }
        if !current.commands.is_empty() {
            self.batches.push(current);
        }
        self.clip_stack.clear();

        &self.batches
    }

    /// Batches produced by the last [`Self::end_frame`].
    #[must_use]
    pub fn batches(&self) -> &[UIBatch] {
        &self.batches
    }
}

impl<R: TextureResolver> Drawer for CommandDrawer<R> {
    fn draw_rect(&mut self, bounds: Rect, color: Color, corner_radius: f32) {
        self.commands.push(RenderCommand::Rect {
            bounds,
            color,
            corner_radius,
        });
    }

    fn draw_outline(&mut self, bounds: Rect, color: Color, width: f32) {
        self.commands.push(RenderCommand::RectOutline {
            bounds,
            color,
            width,
        });
    }

    fn draw_texture(&mut self, bounds: Rect, texture: TextureHandle, tint: Color) {
        self.commands.push(RenderCommand::Texture {
            bounds,
            texture,
            color: tint,
        });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, color: Color, font_size: f32) {
        self.commands.push(RenderCommand::Text {
            text: text.to_owned(),
            x,
            y,
            color,
            font_size,
        });
    }

    fn textures(&self) -> &dyn TextureResolver {
        &self.resolver
    }

    fn push_clip(&mut self, bounds: Rect) {
        // Intersect with current clip if any
        let actual_clip = if let Some(current) = self.clip_stack.last() {
            current.intersection(&bounds).unwrap_or(Rect::ZERO)
        } else {
            bounds
        };

        self.clip_stack.push(actual_clip);
        self.commands.push(RenderCommand::PushClip {
            bounds: actual_clip,
        });
    }

    fn pop_clip(&mut self) {
        if self.clip_stack.pop().is_some() {
            self.commands.push(RenderCommand::PopClip);
        }
    }
}

/// Vertex for UI rendering.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UIVertex {
    /// Position (x, y).
    pub position: [f32; 2],
    /// UV coordinates.
    pub uv: [f32; 2],
    /// Color (RGBA).
    pub color: [f32; 4],
}

impl UIVertex {
    /// Creates a new vertex.
    #[must_use]
    pub const fn new(x: f32, y: f32, u: f32, v: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            uv: [u, v],
            color,
        }
    }
}

/// Two triangles covering `bounds`.
fn push_quad(out: &mut Vec<UIVertex>, bounds: Rect, color: Color) {
    let c = color.to_array();
    let (l, t, r, b) = (bounds.x, bounds.y, bounds.right(), bounds.bottom());
    out.extend_from_slice(&[
        UIVertex::new(l, t, 0.0, 0.0, c),
        UIVertex::new(r, t, 1.0, 0.0, c),
        UIVertex::new(r, b, 1.0, 1.0, c),
        UIVertex::new(l, t, 0.0, 0.0, c),
        UIVertex::new(r, b, 1.0, 1.0, c),
        UIVertex::new(l, b, 0.0, 1.0, c),
    ]);
}

/// Tessellates a batch into triangle-list vertices.
///
/// Text is skipped; glyphs are rasterized by the host's text pass.
#[must_use]
pub fn tessellate(batch: &UIBatch) -> Vec<UIVertex> {
    let mut out = Vec::with_capacity(batch.commands.len() * 6);
    for command in &batch.commands {
        match command {
            RenderCommand::Rect { bounds, color, .. }
            | RenderCommand::Texture {
                bounds, color, ..
            } => push_quad(&mut out, *bounds, *color),
            RenderCommand::RectOutline {
                bounds,
                color,
                width,
            } => {
                let w = width.min(bounds.width / 2.0).min(bounds.height / 2.0).max(0.0);
                let inner_h = (bounds.height - 2.0 * w).max(0.0);
                push_quad(&mut out, Rect::new(bounds.x, bounds.y, bounds.width, w), *color);
                push_quad(
                    &mut out,
                    Rect::new(bounds.x, bounds.bottom() - w, bounds.width, w),
                    *color,
                );
                push_quad(&mut out, Rect::new(bounds.x, bounds.y + w, w, inner_h), *color);
                push_quad(
                    &mut out,
                    Rect::new(bounds.right() - w, bounds.y + w, w, inner_h),
                    *color,
                );
            }
            RenderCommand::Text { .. }
            | RenderCommand::PushClip { .. }
            | RenderCommand::PopClip => {}
        }
    }
    out
}
