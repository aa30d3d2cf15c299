use serde::{Deserialize, Deserializer};

/// Side length of an input tile in pixels.
pub const IMAGE_SIZE: u32 = 512;

/// Total pixel count of a tile; flat pixel indices must stay below this.
pub const MAX_PIXEL: u32 = IMAGE_SIZE * IMAGE_SIZE;

/// Recognized segmentation classes and their numeric codes.
pub const CLASSES: &[(&str, u32)] = &[("building", 1)];

/// Map a class label to its numeric code, if recognized.
pub fn class_code(label: &str) -> Option<u32> {
    CLASSES
        .iter()
        .find(|&&(name, _)| name == label)
        .map(|&(_, code)| code)
}

/// One row of the ground-truth table.
#[derive(Debug, Clone, Deserialize)]
pub struct GroundTruthRecord {
    pub img_id: String,
    #[serde(rename = "class")]
    pub class_label: String,
    /// Run-length segment encoding: space-separated (start, length) pairs.
    pub prediction: String,
    /// True if the row belongs to the public leaderboard split.
    #[serde(deserialize_with = "deserialize_public")]
    pub public: bool,
}

/// One row of the prediction table.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionRecord {
    pub img_id: String,
    #[serde(rename = "class")]
    pub class_label: String,
    pub prediction: String,
}

/// Accept the boolean spellings produced by common CSV writers.
fn deserialize_public<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    match value.as_str() {
        "True" | "true" | "TRUE" | "1" => Ok(true),
        "False" | "false" | "FALSE" | "0" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid public flag: {other:?}"
        ))),
    }
}

/// Final competition metric: mean IoU over the public and private splits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub public: f64,
    pub private: f64,
}
