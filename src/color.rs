use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize, Serializer};

/// 8-bit sRGB colour used by every rendered series.
pub type Rgb = Srgb<u8>;

// ---------------------------------------------------------------------------
// Colour specification as written in a plot configuration
// ---------------------------------------------------------------------------

/// A colour entry: a palette position (`3`) or a name
/// (`"tab:red"`, `"crimson"`, `"C2"`, `"#ff8800"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Index(usize),
    Name(String),
}

impl From<&str> for ColorSpec {
    fn from(name: &str) -> Self {
        ColorSpec::Name(name.to_string())
    }
}

// ---------------------------------------------------------------------------
// Default categorical palette
// ---------------------------------------------------------------------------

/// The ten-colour categorical cycle, in `tab:` naming.
const TAB10: [(&str, (u8, u8, u8)); 10] = [
    ("blue", (0x1f, 0x77, 0xb4)),
    ("orange", (0xff, 0x7f, 0x0e)),
    ("green", (0x2c, 0xa0, 0x2c)),
    ("red", (0xd6, 0x27, 0x28)),
    ("purple", (0x94, 0x67, 0xbd)),
    ("brown", (0x8c, 0x56, 0x4b)),
    ("pink", (0xe3, 0x77, 0xc2)),
    ("gray", (0x7f, 0x7f, 0x7f)),
    ("olive", (0xbc, 0xbd, 0x22)),
    ("cyan", (0x17, 0xbe, 0xcf)),
];

fn tab10(i: usize) -> Rgb {
    let (r, g, b) = TAB10[i % TAB10.len()].1;
    Srgb::new(r, g, b)
}

/// Colour of series `position` when the panel gives none.
pub fn default_color(position: usize) -> Rgb {
    tab10(position)
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Srgb::new(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Name lookup
// ---------------------------------------------------------------------------

/// Look up a colour name. Returns `None` for anything unrecognised.
///
/// Accepts `tab:<name>` (and `tab:grey`), the `C0`–`C9` cycle aliases,
/// CSS/SVG colour keywords and `#rrggbb` hex codes.
pub fn named_color(name: &str) -> Option<Rgb> {
    let lower = name.trim().to_ascii_lowercase();

    if let Some(tab) = lower.strip_prefix("tab:") {
        let tab = if tab == "grey" { "gray" } else { tab };
        return TAB10
            .iter()
            .position(|(n, _)| *n == tab)
            .map(tab10);
    }

    if let Some(digit) = lower.strip_prefix('c') {
        if let Ok(i) = digit.parse::<usize>() {
            return (i < TAB10.len()).then(|| tab10(i));
        }
    }

    if lower.starts_with('#') {
        return lower.parse::<Rgb>().ok();
    }

    palette::named::from_str(&lower)
}

/// Resolve one colour entry for series `position` of a panel with
/// `series_count` series. Never fails: unknown names and indices past the
/// categorical cycle fall back to an evenly spaced hue for that position.
pub fn resolve(spec: &ColorSpec, position: usize, series_count: usize) -> Rgb {
    let found = match spec {
        ColorSpec::Index(i) if *i < TAB10.len() => Some(tab10(*i)),
        ColorSpec::Index(_) => None,
        ColorSpec::Name(name) => named_color(name),
    };

    found.unwrap_or_else(|| {
        log::debug!("Unknown colour {spec:?}; using generated palette");
        let n = series_count.max(position + 1);
        generate_palette(n)[position]
    })
}

/// Serialise a colour as `#rrggbb`.
pub fn serialize_hex<S: Serializer>(color: &Rgb, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_hex(*color))
}

pub fn to_hex(color: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}
