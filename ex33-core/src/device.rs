//! Device catalog and viewport-fit scaling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Decorative frame drawn around the preview surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameStyle {
    None,
    Phone,
    Tablet,
    Laptop,
    Monitor,
    Desktop,
}

impl FrameStyle {
    /// Breathing room around the frame inside the viewport.
    /// Phones get less so the device renders larger.
    pub fn padding(self) -> f64 {
        match self {
            FrameStyle::Phone => 80.0,
            _ => 160.0,
        }
    }

    /// Extra (width, height) taken by bezels, laptop base or monitor stand.
    pub fn chrome(self) -> (f64, f64) {
        match self {
            FrameStyle::None => (0.0, 0.0),
            FrameStyle::Phone | FrameStyle::Tablet => (24.0, 24.0),
            FrameStyle::Laptop => (40.0, 120.0),
            FrameStyle::Monitor | FrameStyle::Desktop => (40.0, 140.0),
        }
    }
}

/// Closed set of devices offered by the toolbar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceId {
    Monitor,
    #[default]
    Desktop,
    Laptop,
    Tablet,
    Iphone,
    Xiaomi,
}

impl DeviceId {
    pub const ALL: [DeviceId; 6] = [
        DeviceId::Monitor,
        DeviceId::Desktop,
        DeviceId::Laptop,
        DeviceId::Tablet,
        DeviceId::Iphone,
        DeviceId::Xiaomi,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceId::Monitor => "monitor",
            DeviceId::Desktop => "desktop",
            DeviceId::Laptop => "laptop",
            DeviceId::Tablet => "tablet",
            DeviceId::Iphone => "iphone",
            DeviceId::Xiaomi => "xiaomi",
        }
    }

    pub fn parse(name: &str) -> Option<DeviceId> {
        let name = name.trim();
        DeviceId::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(name))
    }

    pub fn profile(self) -> &'static DeviceProfile {
        match self {
            DeviceId::Monitor => &CATALOG[0],
            DeviceId::Desktop => &CATALOG[1],
            DeviceId::Laptop => &CATALOG[2],
            DeviceId::Tablet => &CATALOG[3],
            DeviceId::Iphone => &CATALOG[4],
            DeviceId::Xiaomi => &CATALOG[5],
        }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Native pixel size and frame of a simulated device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeviceProfile {
    pub width: u32,
    pub height: u32,
    pub label: &'static str,
    pub frame: FrameStyle,
}

impl DeviceProfile {
    /// Scale using the profile's own frame style.
    pub fn scale_for(&self, viewport: Viewport, zoom: Zoom) -> f64 {
        compute_scale(
            self,
            self.frame,
            viewport.width,
            viewport.height,
            f64::from(zoom.percent()),
        )
    }
}

pub static CATALOG: [DeviceProfile; 6] = [
    DeviceProfile {
        width: 2560,
        height: 1440,
        label: "4K",
        frame: FrameStyle::Monitor,
    },
    DeviceProfile {
        width: 1920,
        height: 1080,
        label: "Desktop",
        frame: FrameStyle::Desktop,
    },
    DeviceProfile {
        width: 1440,
        height: 900,
        label: "Laptop",
        frame: FrameStyle::Laptop,
    },
    DeviceProfile {
        width: 768,
        height: 1024,
        label: "Tablet",
        frame: FrameStyle::Tablet,
    },
    DeviceProfile {
        width: 390,
        height: 844,
        label: "iPhone",
        frame: FrameStyle::Phone,
    },
    DeviceProfile {
        width: 360,
        height: 800,
        label: "Xiaomi",
        frame: FrameStyle::Phone,
    },
];

/// Space available to the preview pane, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1920.0, 1080.0)
    }
}

/// Fits a device (plus its frame chrome) into the viewport, then applies zoom.
///
/// Fit never upscales past native size; zoom is applied on top of the fit and
/// is not clamped here. Available space below zero counts as zero.
pub fn compute_scale(
    profile: &DeviceProfile,
    frame: FrameStyle,
    viewport_w: f64,
    viewport_h: f64,
    zoom_percent: f64,
) -> f64 {
    let padding = frame.padding();
    let avail_w = (viewport_w - padding).max(0.0);
    let avail_h = (viewport_h - padding).max(0.0);

    let (extra_w, extra_h) = frame.chrome();
    let frame_w = f64::from(profile.width) + extra_w;
    let frame_h = f64::from(profile.height) + extra_h;

    let scale_w = avail_w / frame_w;
    let scale_h = avail_h / frame_h;
    let base_scale = scale_w.min(scale_h).min(1.0);

    base_scale * (zoom_percent / 100.0)
}

/// Zoom percentage, clamped to [`Zoom::MIN`]..=[`Zoom::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Zoom(u16);

impl Zoom {
    pub const MIN: u16 = 25;
    pub const MAX: u16 = 150;
    pub const STEP: u16 = 10;

    pub fn new(percent: u16) -> Self {
        Zoom(percent.clamp(Self::MIN, Self::MAX))
    }

    pub fn percent(self) -> u16 {
        self.0
    }

    pub fn zoom_in(self) -> Self {
        Zoom::new(self.0.saturating_add(Self::STEP))
    }

    pub fn zoom_out(self) -> Self {
        Zoom::new(self.0.saturating_sub(Self::STEP))
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Zoom(100)
    }
}

/// Container widths the layout grid can be drawn at.
pub static GRIDS: [u32; 4] = [960, 1200, 1400, 1600];

/// Column layout guide drawn centered over the device frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOverlay {
    pub active: bool,
    pub size: u32,
}

impl GridOverlay {
    pub const COLUMNS: u32 = 12;
    pub const GUTTER: u32 = 20;
    pub const DEFAULT_SIZE: u32 = 1200;

    pub fn is_known_size(size: u32) -> bool {
        GRIDS.contains(&size)
    }

    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        self.active
    }

    /// Switches to `size` if it is one of [`GRIDS`]; returns whether it did.
    pub fn select(&mut self, size: u32) -> bool {
        if !Self::is_known_size(size) {
            return false;
        }
        self.size = size;
        true
    }

    /// Width of one column once the gutters are taken out.
    pub fn column_width(&self) -> f64 {
        let gutters = f64::from(Self::GUTTER * (Self::COLUMNS - 1));
        (f64::from(self.size) - gutters) / f64::from(Self::COLUMNS)
    }
}

impl Default for GridOverlay {
    fn default() -> Self {
        Self {
            active: false,
            size: Self::DEFAULT_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lookup_by_id() {
        let laptop = DeviceId::Laptop.profile();
        assert_eq!((laptop.width, laptop.height), (1440, 900));
        assert_eq!(laptop.frame, FrameStyle::Laptop);
        assert_eq!(DeviceId::Xiaomi.profile().frame, FrameStyle::Phone);
    }

    #[test]
    fn parse_device_names() {
        assert_eq!(DeviceId::parse("iPhone"), Some(DeviceId::Iphone));
        assert_eq!(DeviceId::parse(" tablet "), Some(DeviceId::Tablet));
        assert_eq!(DeviceId::parse("watch"), None);
    }

    #[test]
    fn laptop_on_full_hd_is_downscaled() {
        // avail 1760x920, frame 1480x1020 -> height bound: 920 / 1020
        let scale = DeviceId::Laptop
            .profile()
            .scale_for(Viewport::new(1920.0, 1080.0), Zoom::default());
        assert!((scale - 920.0 / 1020.0).abs() < 1e-9);
        assert!(scale < 1.0);
    }

    #[test]
    fn small_phone_never_upscaled_by_fit() {
        let scale = DeviceId::Xiaomi
            .profile()
            .scale_for(Viewport::new(3840.0, 2160.0), Zoom::default());
        assert_eq!(scale, 1.0);
    }

    #[test]
    fn zoom_multiplies_after_fit() {
        let profile = DeviceId::Iphone.profile();
        let scale = compute_scale(profile, profile.frame, 3840.0, 2160.0, 150.0);
        assert_eq!(scale, 1.5);
    }

    #[test]
    fn tiny_viewport_yields_zero_not_negative() {
        let profile = DeviceId::Monitor.profile();
        assert_eq!(compute_scale(profile, profile.frame, 100.0, 100.0, 100.0), 0.0);
    }

    #[test]
    fn zoom_steps_and_clamps() {
        let mut zoom = Zoom::default();
        for _ in 0..10 {
            zoom = zoom.zoom_in();
        }
        assert_eq!(zoom.percent(), Zoom::MAX);

        let mut zoom = Zoom::new(40);
        zoom = zoom.zoom_out();
        assert_eq!(zoom.percent(), 30);
        zoom = zoom.zoom_out();
        assert_eq!(zoom.percent(), Zoom::MIN);
        assert_eq!(Zoom::new(5).percent(), Zoom::MIN);
    }

    #[test]
    fn desktop_is_default_device() {
        assert_eq!(DeviceId::default(), DeviceId::Desktop);
    }

    #[test]
    fn grid_starts_hidden_at_1200() {
        let grid = GridOverlay::default();
        assert!(!grid.active);
        assert_eq!(grid.size, 1200);
        // 1200 - 11 * 20 = 980 over 12 columns
        assert!((grid.column_width() - 980.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn grid_only_accepts_catalog_sizes() {
        let mut grid = GridOverlay::default();
        assert!(grid.select(1600));
        assert_eq!(grid.size, 1600);
        assert!(!grid.select(1000));
        assert_eq!(grid.size, 1600);
        assert!(grid.toggle());
        assert!(!grid.toggle());
    }
}
