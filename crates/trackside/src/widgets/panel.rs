//! Static building blocks: filled panels, text labels and images.

use trackside_ui::{Color, DrawContext, TextureSlot, Theme, Widget};

/// Filled rectangle with an optional border.
#[derive(Debug, Clone, Copy)]
pub struct Panel {
    fill: Color,
    border: Option<(Color, f32)>,
    corner_radius: f32,
}

impl Panel {
    /// Creates a borderless panel.
    #[must_use]
    pub const fn new(fill: Color) -> Self {
        Self {
            fill,
            border: None,
            corner_radius: 0.0,
        }
    }

    /// Card surface with the theme border.
    #[must_use]
    pub fn surface(theme: &Theme) -> Self {
        Self {
            fill: theme.surface,
            border: Some((theme.border, 1.0)),
            corner_radius: 4.0,
        }
    }

    /// Full-screen background.
    #[must_use]
    pub fn background(theme: &Theme) -> Self {
        Self::new(theme.background)
    }

    /// Adds a border.
    #[must_use]
    pub fn with_border(mut self, color: Color, width: f32) -> Self {
        self.border = Some((color, width));
        self
    }

    /// Rounds the corners.
    #[must_use]
    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }
}

impl Widget for Panel {
    fn name(&self) -> &'static str {
        "panel"
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) {
        let bounds = ctx.bounds();
        ctx.fill_rect(bounds, self.fill, self.corner_radius);
        if let Some((color, width)) = self.border {
            ctx.outline(color, width);
        }
    }
}

/// Single line of text anchored at the node's top-left corner.
#[derive(Debug, Clone)]
pub struct Label {
    text: String,
    color: Color,
    font_size: f32,
    padding: f32,
}

impl Label {
    /// Creates a label.
    #[must_use]
    pub fn new(text: impl Into<String>, color: Color, font_size: f32) -> Self {
        Self {
            text: text.into(),
            color,
            font_size,
            padding: 0.0,
        }
    }

    /// Body text in the theme's text color.
    #[must_use]
    pub fn body(text: impl Into<String>, theme: &Theme) -> Self {
        Self::new(text, theme.text, 14.0)
    }

    /// Insets the text from the node's corner.
    #[must_use]
    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    /// The text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Widget for Label {
    fn name(&self) -> &'static str {
        "label"
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) {
        if self.text.is_empty() {
            return;
        }
        let bounds = ctx.bounds();
        ctx.text_at(
            &self.text,
            bounds.x + self.padding,
            bounds.y + self.padding,
            self.color,
            self.font_size,
        );
    }
}

/// Image resolved lazily by key.
///
/// Nothing is drawn while the texture is unavailable, apart from the
/// optional placeholder fill.
#[derive(Debug, Clone)]
pub struct ImageBox {
    slot: TextureSlot,
    tint: Color,
    placeholder: Option<Color>,
}

impl ImageBox {
    /// Creates an image for a texture key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            slot: TextureSlot::new(key),
            tint: Color::WHITE,
            placeholder: None,
        }
    }

    /// Multiplies the texture by a color.
    #[must_use]
    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    /// Fills the node with `color` until the texture resolves.
    #[must_use]
    pub fn with_placeholder(mut self, color: Color) -> Self {
        self.placeholder = Some(color);
        self
    }
}

impl Widget for ImageBox {
    fn name(&self) -> &'static str {
        "image"
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) {
        if !ctx.texture(&mut self.slot, self.tint) {
            if let Some(color) = self.placeholder {
                ctx.fill(color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackside_ui::{
        CommandDrawer, Compositor, MapTextureResolver, NodeTree, NullResolver, Rect,
        RenderCommand, TextureHandle,
    };

    fn tree() -> NodeTree {
        NodeTree::new(Rect::new(0.0, 0.0, 200.0, 100.0))
    }

    #[test]
    fn test_panel_draws_fill_then_border() {
        let mut tree = tree();
        let panel = tree.create(Panel::surface(&Theme::DARK));
        tree.add_child(tree.root(), panel).expect("attach");

        let mut drawer = CommandDrawer::new(NullResolver);
        Compositor::new().draw(&mut tree, &mut drawer);

        assert_eq!(drawer.command_count(), 2);
        assert!(matches!(drawer.commands()[0], RenderCommand::Rect { corner_radius, .. } if corner_radius == 4.0));
        assert!(matches!(drawer.commands()[1], RenderCommand::RectOutline { .. }));
    }

    #[test]
    fn test_panel_builders() {
        let mut tree = tree();
        let panel = Panel::new(Color::WHITE)
            .with_border(Color::BLACK, 3.0)
            .with_corner_radius(8.0);
        let id = tree.create(panel);
        tree.add_child(tree.root(), id).expect("attach");

        let mut drawer = CommandDrawer::new(NullResolver);
        Compositor::new().draw(&mut tree, &mut drawer);

        assert!(matches!(drawer.commands()[0], RenderCommand::Rect { corner_radius, .. } if corner_radius == 8.0));
        assert!(matches!(drawer.commands()[1], RenderCommand::RectOutline { width, .. } if width == 3.0));
    }

    #[test]
    fn test_label_padding_and_empty() {
        let mut tree = tree();
        let label = tree.create(Label::body("P1", &Theme::DARK).with_padding(4.0));
        let empty = tree.create(Label::body("", &Theme::DARK));
        tree.add_child(tree.root(), label).expect("attach");
        tree.add_child(tree.root(), empty).expect("attach");

        let mut drawer = CommandDrawer::new(NullResolver);
        Compositor::new().draw(&mut tree, &mut drawer);

        assert_eq!(drawer.command_count(), 1);
        match &drawer.commands()[0] {
            RenderCommand::Text { text, x, y, .. } => {
                assert_eq!(text, "P1");
                assert_eq!((*x, *y), (4.0, 4.0));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_image_placeholder_until_resolved() {
        let mut tree = tree();
        let tint = Color::rgb(1.0, 0.5, 0.5);
        let image = tree.create(
            ImageBox::new("flag/nz")
                .with_placeholder(Color::BLACK)
                .with_tint(tint),
        );
        tree.add_child(tree.root(), image).expect("attach");
        let mut compositor = Compositor::new();

        let mut drawer = CommandDrawer::new(MapTextureResolver::new());
        compositor.draw(&mut tree, &mut drawer);
        assert!(matches!(drawer.commands()[0], RenderCommand::Rect { .. }));

        drawer.begin_frame();
        drawer.resolver_mut().insert("flag/nz", TextureHandle(3));
        tree.request_redraw(image);
        compositor.draw(&mut tree, &mut drawer);
        assert!(matches!(
            drawer.commands()[0],
            RenderCommand::Texture { texture: TextureHandle(3), color, .. } if color == tint
        ));
    }
}
