use ratatui::style::Color;

/// Memory gauge turns yellow above this share, red above `LOAD_HIGH`.
pub const LOAD_WARN: f64 = 60.0;
pub const LOAD_HIGH: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadLevel {
    Normal,
    Warning,
    Critical,
}

impl LoadLevel {
    pub fn from_percent(percent: f64) -> Self {
        if percent > LOAD_HIGH {
            LoadLevel::Critical
        } else if percent > LOAD_WARN {
            LoadLevel::Warning
        } else {
            LoadLevel::Normal
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    pub header_accent_bg: Color,
    pub header_accent_fg: Color,
    pub statusbar_bg: Color,
    pub overlay_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub accent: Color,
    pub pill_key_bg: Color,
    pub pill_key_fg: Color,
    pub pill_desc_fg: Color,
    pub surface_bg: Color,
    pub gauge_unfilled: Color,
    pub cpu_gauge: Color,
    pub load_normal: Color,
    pub load_warning: Color,
    pub load_critical: Color,
    pub table_header_fg: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
}

impl Theme {
    pub fn from_config(theme_name: &str) -> Self {
        match theme_name.to_lowercase().as_str() {
            "light" => Self::light(),
            "mono" => Self::mono(),
            _ => Self::dark(),
        }
    }

    pub fn load_color(&self, percent: f64) -> Color {
        match LoadLevel::from_percent(percent) {
            LoadLevel::Normal => self.load_normal,
            LoadLevel::Warning => self.load_warning,
            LoadLevel::Critical => self.load_critical,
        }
    }

    pub fn dark() -> Self {
        Theme {
            name: "dark",
            header_accent_bg: Color::Green,
            header_accent_fg: Color::Black,
            statusbar_bg: Color::DarkGray,
            overlay_border: Color::DarkGray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            accent: Color::Green,
            pill_key_bg: Color::Yellow,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::DarkGray,
            gauge_unfilled: Color::DarkGray,
            cpu_gauge: Color::Rgb(103, 232, 249),
            load_normal: Color::Rgb(16, 185, 129),
            load_warning: Color::Rgb(250, 204, 21),
            load_critical: Color::Rgb(239, 68, 68),
            table_header_fg: Color::Yellow,
            selection_bg: Color::Rgb(55, 65, 81),
            selection_fg: Color::White,
        }
    }

    pub fn light() -> Self {
        Theme {
            name: "light",
            header_accent_bg: Color::Blue,
            header_accent_fg: Color::White,
            statusbar_bg: Color::Rgb(220, 220, 220),
            overlay_border: Color::Rgb(150, 150, 150),
            text_primary: Color::Black,
            text_secondary: Color::DarkGray,
            accent: Color::Blue,
            pill_key_bg: Color::Blue,
            pill_key_fg: Color::White,
            pill_desc_fg: Color::Black,
            surface_bg: Color::Rgb(200, 200, 200),
            gauge_unfilled: Color::Rgb(200, 200, 200),
            cpu_gauge: Color::Rgb(70, 130, 180),
            load_normal: Color::Rgb(0, 140, 0),
            load_warning: Color::Rgb(200, 150, 0),
            load_critical: Color::Rgb(200, 40, 40),
            table_header_fg: Color::Blue,
            selection_bg: Color::Rgb(190, 210, 240),
            selection_fg: Color::Black,
        }
    }

    pub fn mono() -> Self {
        Theme {
            name: "mono",
            header_accent_bg: Color::White,
            header_accent_fg: Color::Black,
            statusbar_bg: Color::Black,
            overlay_border: Color::White,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            accent: Color::White,
            pill_key_bg: Color::White,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::Black,
            gauge_unfilled: Color::Black,
            cpu_gauge: Color::White,
            load_normal: Color::White,
            load_warning: Color::White,
            load_critical: Color::White,
            table_header_fg: Color::White,
            selection_bg: Color::White,
            selection_fg: Color::Black,
        }
    }
}
