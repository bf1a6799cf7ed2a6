use anyhow::{Context, Result};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use std::path::Path;

/// Display fields stamped onto a photo. Every field is optional; absent ones are skipped.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LocationInfo {
    #[serde(deserialize_with = "display_value")]
    pub date: Option<String>,
    #[serde(deserialize_with = "display_value")]
    pub time: Option<String>,
    #[serde(deserialize_with = "display_value")]
    pub direction: Option<String>,
    #[serde(deserialize_with = "display_value")]
    pub location: Option<String>,
    #[serde(deserialize_with = "display_value")]
    pub district: Option<String>,
    #[serde(deserialize_with = "display_value")]
    pub regency: Option<String>,
    #[serde(deserialize_with = "display_value")]
    pub province: Option<String>,
    #[serde(deserialize_with = "display_value")]
    pub altitude: Option<String>,
    #[serde(deserialize_with = "display_value")]
    pub speed: Option<String>,
    #[serde(deserialize_with = "display_value")]
    pub index: Option<String>,
    #[serde(deserialize_with = "numeric_value")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "numeric_value")]
    pub longitude: Option<f64>,
    /// Degrees clockwise from north.
    #[serde(deserialize_with = "numeric_value")]
    pub compass_angle: Option<f64>,
}

/// Which font a text row is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontRole {
    Main,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRow {
    pub text: String,
    pub role: FontRole,
}

impl LocationInfo {
    /// The values the command line falls back to when no location file is given.
    pub fn sample() -> Self {
        Self {
            date: Some("2 Okt 2025".into()),
            time: Some("10.53.31".into()),
            direction: Some("279° W".into()),
            location: Some("SMKN 1 Maja".into()),
            district: Some("Kecamatan Maja".into()),
            regency: Some("Kabupaten Majalengka".into()),
            province: Some("Jawa Barat".into()),
            altitude: Some("610.0msnm".into()),
            speed: Some("0.7km/h".into()),
            index: Some("8".into()),
            latitude: Some(-6.889678868870827),
            longitude: Some(108.30611937791178),
            compass_angle: Some(189.0),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse location fields")
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read location file: {}", path.display()))?;
        serde_yaml::from_str(&yaml)
            .with_context(|| format!("Failed to parse location file: {}", path.display()))
    }

    /// Needle angle in degrees; north when unset.
    pub fn compass_angle(&self) -> f64 {
        self.compass_angle.unwrap_or(0.0)
    }

    /// Rows of the text block, top to bottom. The date/time row is always present,
    /// even when both halves are empty.
    pub fn text_rows(&self) -> Vec<TextRow> {
        let stamp = format!(
            "{} {}",
            self.date.as_deref().unwrap_or(""),
            self.time.as_deref().unwrap_or("")
        );

        let optional: [(Option<&String>, FontRole, Option<&str>); 8] = [
            (self.direction.as_ref(), FontRole::Main, None),
            (self.location.as_ref(), FontRole::Secondary, None),
            (self.district.as_ref(), FontRole::Secondary, None),
            (self.regency.as_ref(), FontRole::Secondary, None),
            (self.province.as_ref(), FontRole::Secondary, None),
            (self.altitude.as_ref(), FontRole::Secondary, None),
            (self.speed.as_ref(), FontRole::Secondary, None),
            (self.index.as_ref(), FontRole::Secondary, Some("Index number: ")),
        ];

        std::iter::once(TextRow {
            text: stamp,
            role: FontRole::Main,
        })
        .chain(optional.into_iter().filter_map(|(value, role, label)| {
            value.map(|v| TextRow {
                text: format!("{}{}", label.unwrap_or(""), v),
                role,
            })
        }))
        .collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Flag(bool),
    Other(IgnoredAny),
}

fn display_value<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Scalar::Text(s) => Some(s),
        Scalar::Int(i) => Some(i.to_string()),
        // Debug keeps the trailing ".0" on whole floats.
        Scalar::Float(f) => Some(format!("{f:?}")),
        Scalar::Flag(b) => Some(b.to_string()),
        Scalar::Other(_) => None,
    }))
}

/// Numbers, or strings that parse as numbers. Anything else reads as absent.
fn numeric_value<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Scalar::Text(s) => s.trim().parse().ok(),
        Scalar::Int(i) => Some(i as f64),
        Scalar::Float(f) => Some(f),
        Scalar::Flag(_) | Scalar::Other(_) => None,
    }))
}
