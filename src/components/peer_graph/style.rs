//! Visual configuration for the peer graph.
//!
//! Everything that decides how the swarm looks lives in [`GraphStyle`], which is
//! handed to the widget at construction. It deserializes from JSON with every
//! field optional, so pages can override only what they care about.

use serde::Deserialize;

use super::error::GraphError;
use super::types::PeerNode;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Alpha, 0.0..=1.0.
	pub a: f64,
}

impl Color {
	/// Opaque color from channels.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color from channels and alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Builds a color from hue (degrees), saturation and lightness (0.0..=1.0).
	pub fn hsl(h: f64, s: f64, l: f64) -> Self {
		let h = h.rem_euclid(360.0) / 60.0;
		let (s, l) = (s.clamp(0.0, 1.0), l.clamp(0.0, 1.0));
		let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
		let x = c * (1.0 - (h % 2.0 - 1.0).abs());
		let (r, g, b) = match h as u32 {
			0 => (c, x, 0.0),
			1 => (x, c, 0.0),
			2 => (0.0, c, x),
			3 => (0.0, x, c),
			4 => (x, 0.0, c),
			_ => (c, 0.0, x),
		};
		let m = l - c / 2.0;
		let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
		Self::rgb(channel(r), channel(g), channel(b))
	}

	/// Same color with alpha replaced.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// CSS string: hex when opaque, `rgba()` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}

	/// Parses a CSS color string.
	/// Supports hex (`#RRGGBB`) and `rgb()`/`rgba()` functional notation.
	pub fn parse(color_str: &str) -> Result<Self, GraphError> {
		let s = color_str.trim();
		let invalid = || GraphError::InvalidColor(color_str.to_string());

		if let Some(hex) = s.strip_prefix('#') {
			if hex.len() != 6 || !hex.is_ascii() {
				return Err(invalid());
			}
			let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
			return Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?));
		}

		let body = s
			.strip_prefix("rgba(")
			.or_else(|| s.strip_prefix("rgb("))
			.and_then(|rest| rest.strip_suffix(')'))
			.ok_or_else(invalid)?;
		let parts: Vec<&str> = body.split(',').map(str::trim).collect();
		if parts.len() != 3 && parts.len() != 4 {
			return Err(invalid());
		}
		let channel = |i: usize| parts[i].parse::<u8>().map_err(|_| invalid());
		let a = match parts.get(3) {
			Some(a) => a.parse::<f64>().map_err(|_| invalid())?,
			None => 1.0,
		};
		Ok(Color::rgba(channel(0)?, channel(1)?, channel(2)?, a))
	}
}

impl TryFrom<String> for Color {
	type Error = GraphError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Color::parse(&value)
	}
}

/// Link appearance and the rate-to-width mapping.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LinkStyle {
	/// Width of an unrated or idle link.
	pub min_width: f64,
	/// Width of a link at or above `max_bytes`.
	pub max_width: f64,
	/// Throughput (bytes per second) at which links reach `max_width`.
	pub max_bytes: f64,
	/// Stroke color.
	pub color: Color,
	/// Opacity of links before anything has been focused.
	pub opacity: f64,
	/// Opacity of links after focus has been cleared.
	pub rest_opacity: f64,
	/// Opacity of links between two active peers while one is focused.
	pub active_opacity: f64,
	/// Opacity of every other link while a peer is focused.
	pub dimmed_opacity: f64,
}

impl LinkStyle {
	/// Maps a throughput onto a stroke width.
	///
	/// The rate is clamped to `max_bytes` and scaled linearly into
	/// `[min_width, max_width]`.
	pub fn rate_to_width(&self, bytes_per_sec: f64) -> f64 {
		if self.max_bytes <= 0.0 || bytes_per_sec >= self.max_bytes {
			return self.max_width;
		}
		let t = bytes_per_sec.clamp(0.0, self.max_bytes) / self.max_bytes;
		self.min_width + (self.max_width - self.min_width) * t
	}

	/// Stroke width for a link, falling back to `min_width` when unrated.
	pub fn width(&self, width: Option<f64>) -> f64 {
		width.map_or(self.min_width, |w| w.max(self.min_width))
	}
}

impl Default for LinkStyle {
	fn default() -> Self {
		Self {
			min_width: 0.7,
			max_width: 5.0,
			max_bytes: 2_097_152.0,
			color: Color::rgb(200, 200, 200),
			opacity: 0.5,
			rest_opacity: 0.3,
			active_opacity: 1.0,
			dimmed_opacity: 0.02,
		}
	}
}

/// Node colors and base sizes (before density scaling).
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct NodeStyle {
	/// Fill of the local peer.
	pub me: Color,
	/// Fill of seeding peers.
	pub seeder: Color,
	/// Fill of every other peer.
	pub peer: Color,
	/// Fill of a hovered node and its children.
	pub hover: Color,
	/// Fill of the parents of a hovered node.
	pub dep: Color,
	/// Outline width of hovered neighbours, in pixels.
	pub hover_stroke: f64,
	/// Radius of the local peer.
	pub me_radius: f64,
	/// Radius of remote peers.
	pub radius: f64,
	/// Opacity of peers unrelated to the focused one.
	pub dimmed_opacity: f64,
}

impl NodeStyle {
	/// Fill color for a peer by kind.
	pub fn color(&self, node: &PeerNode) -> Color {
		if node.me {
			self.me
		} else if node.seeder {
			self.seeder
		} else {
			self.peer
		}
	}
}

impl Default for NodeStyle {
	fn default() -> Self {
		Self {
			me: Color::hsl(210.0, 0.7, 0.725),
			seeder: Color::hsl(120.0, 0.7, 0.725),
			peer: Color::hsl(55.0, 0.7, 0.725),
			hover: Color::rgb(169, 169, 169),
			dep: Color::rgb(37, 41, 41),
			hover_stroke: 2.0,
			me_radius: 15.0,
			radius: 10.0,
			dimmed_opacity: 0.2,
		}
	}
}

/// Label typography.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TextStyle {
	/// Label fill.
	pub color: Color,
	/// CSS font family.
	pub font_family: String,
	/// Font size of the local peer's label, in pixels.
	pub me_size: f64,
	/// Font size of remote peers' labels, in pixels.
	pub size: f64,
	/// Vertical label offset of the local peer (negative is above).
	pub me_offset: f64,
	/// Vertical label offset of remote peers.
	pub offset: f64,
}

impl Default for TextStyle {
	fn default() -> Self {
		Self {
			color: Color::rgb(200, 200, 200),
			font_family: "sans-serif".to_string(),
			me_size: 16.0,
			size: 12.0,
			me_offset: -22.0,
			offset: -15.0,
		}
	}
}

/// Drawing surface sizing.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SurfaceStyle {
	/// Canvas fill; transparent by default so the page shows through.
	pub background: Color,
	/// Viewport width at or above which the tall tier applies.
	pub breakpoint: f64,
	/// Canvas height on wide viewports.
	pub tall_height: f64,
	/// Canvas height on narrow viewports.
	pub short_height: f64,
	/// Quiet period before a window resize is applied.
	pub resize_debounce_ms: i32,
}

impl SurfaceStyle {
	/// Canvas height for a given viewport width.
	pub fn height_for(&self, viewport_width: f64) -> f64 {
		if viewport_width >= self.breakpoint {
			self.tall_height
		} else {
			self.short_height
		}
	}
}

impl Default for SurfaceStyle {
	fn default() -> Self {
		Self {
			background: Color::rgba(0, 0, 0, 0.0),
			breakpoint: 900.0,
			tall_height: 400.0,
			short_height: 250.0,
			resize_debounce_ms: 500,
		}
	}
}

/// Complete visual configuration for a peer graph.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct GraphStyle {
	/// Links and the rate mapping.
	pub link: LinkStyle,
	/// Node fills and sizes.
	pub node: NodeStyle,
	/// Labels.
	pub text: TextStyle,
	/// Canvas sizing.
	pub surface: SurfaceStyle,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rate_scales_between_bounds() {
		let link = LinkStyle::default();
		assert_eq!(link.rate_to_width(0.0), 0.7);
		let w = link.rate_to_width(150_000.0);
		assert!(w > 0.7 && w < 5.0, "{w}");
		assert!((link.rate_to_width(1_048_576.0) - 2.85).abs() < 1e-9);
	}

	#[test]
	fn rate_saturates_at_threshold() {
		let link = LinkStyle::default();
		assert_eq!(link.rate_to_width(2_097_152.0), 5.0);
		assert_eq!(link.rate_to_width(5_000_000.0), 5.0);
	}

	#[test]
	fn unrated_links_use_min_width() {
		let link = LinkStyle::default();
		assert_eq!(link.width(None), 0.7);
		assert_eq!(link.width(Some(0.1)), 0.7);
		assert_eq!(link.width(Some(3.0)), 3.0);
	}

	#[test]
	fn hsl_matches_known_values() {
		assert_eq!(Color::hsl(0.0, 1.0, 0.5), Color::rgb(255, 0, 0));
		assert_eq!(Color::hsl(120.0, 1.0, 0.5), Color::rgb(0, 255, 0));
		assert_eq!(Color::hsl(240.0, 1.0, 0.5), Color::rgb(0, 0, 255));
		assert_eq!(Color::hsl(0.0, 0.0, 1.0), Color::rgb(255, 255, 255));
	}

	#[test]
	fn node_color_by_kind() {
		let style = NodeStyle::default();
		let mut peer = PeerNode::new("a", "a");
		assert_eq!(style.color(&peer), style.peer);
		peer.seeder = true;
		assert_eq!(style.color(&peer), style.seeder);
		peer.me = true;
		assert_eq!(style.color(&peer), style.me);
	}

	#[test]
	fn parse_css_colors() {
		assert_eq!(Color::parse("#c8c8c8").unwrap(), Color::rgb(200, 200, 200));
		assert_eq!(
			Color::parse("rgba(1, 2, 3, 0.5)").unwrap(),
			Color::rgba(1, 2, 3, 0.5)
		);
		assert_eq!(Color::parse("rgb(10,20,30)").unwrap(), Color::rgb(10, 20, 30));
		assert!(Color::parse("#abc").is_err());
		assert!(Color::parse("blue").is_err());
		assert!(Color::parse("rgb(300, 0, 0)").is_err());
	}

	#[test]
	fn css_output() {
		assert_eq!(Color::rgb(200, 200, 200).to_css(), "#c8c8c8");
		assert_eq!(Color::rgba(0, 0, 0, 0.5).to_css(), "rgba(0, 0, 0, 0.5)");
	}

	#[test]
	fn height_tiers() {
		let surface = SurfaceStyle::default();
		assert_eq!(surface.height_for(1200.0), 400.0);
		assert_eq!(surface.height_for(900.0), 400.0);
		assert_eq!(surface.height_for(899.0), 250.0);
	}

	#[test]
	fn partial_style_override() {
		let json = r##"{ "link": { "max_width": 8.0, "color": "#ff0000" }, "surface": { "breakpoint": 600 } }"##;
		let style: GraphStyle = serde_json::from_str(json).unwrap();
		assert_eq!(style.link.max_width, 8.0);
		assert_eq!(style.link.min_width, 0.7);
		assert_eq!(style.link.color, Color::rgb(255, 0, 0));
		assert_eq!(style.surface.breakpoint, 600.0);
		assert_eq!(style.surface.tall_height, 400.0);
	}

	#[test]
	fn bad_color_in_style_fails() {
		let json = r#"{ "node": { "me": "not-a-color" } }"#;
		assert!(serde_json::from_str::<GraphStyle>(json).is_err());
	}
}
