//! Camera parameter catalog (OV2640 on ESP32-CAM)
//!
//! Slider ranges and defaults for every tuning parameter the panel knows
//! about. Whether the running firmware implements a parameter is only known
//! at runtime (HTTP 501).

use serde::Serialize;

/// One tunable camera parameter
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CameraParamSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub min: i64,
    pub max: i64,
    pub step: i64,
    pub default: i64,
    /// Prefix of the `<stem>-slider` / `<stem>-display` element ids
    pub id_stem: &'static str,
}

const fn param(
    name: &'static str,
    label: &'static str,
    min: i64,
    max: i64,
    step: i64,
    default: i64,
    id_stem: &'static str,
) -> CameraParamSpec {
    CameraParamSpec { name, label, min, max, step, default, id_stem }
}

/// Parameters whose values the status payload carries and the poller syncs
pub const STATUS_SYNCED_PARAMS: [&str; 3] = ["brightness", "contrast", "agc_gain"];

pub static CAMERA_PARAMS: &[CameraParamSpec] = &[
    param("brightness", "Brightness", -2, 2, 1, 2, "brightness"),
    param("contrast", "Contrast", -2, 2, 1, 2, "contrast"),
    param("saturation", "Saturation", -2, 2, 1, 1, "saturation"),
    param("sharpness", "Sharpness", -3, 3, 1, 0, "sharpness"),
    param("agc_gain", "AGC gain", 0, 30, 1, 30, "agc"),
    param("gainceiling", "Gain ceiling", 0, 6, 1, 6, "gainceiling"),
    param("aec_value", "Exposure (AEC)", 0, 2400, 100, 2000, "aec"),
    param("ae_level", "Auto exposure level", -2, 2, 1, 0, "ae_level"),
    param("aec2", "Auto exposure (DSP)", 0, 1, 1, 1, "aec2"),
    param("quality", "JPEG quality", 4, 63, 1, 10, "quality"),
    param("denoise", "Denoise", 0, 8, 1, 0, "denoise"),
    param("hmirror", "Horizontal mirror", 0, 1, 1, 0, "hmirror"),
    param("vflip", "Vertical flip", 0, 1, 1, 0, "vflip"),
    param("awb", "Auto white balance", 0, 1, 1, 1, "awb"),
    param("awb_gain", "AWB gain", 0, 1, 1, 1, "awb_gain"),
    param("wb_mode", "White balance mode", 0, 4, 1, 0, "wb_mode"),
    param("special_effect", "Special effect", 0, 6, 1, 0, "special_effect"),
    param("exposure_ctrl", "Exposure control", 0, 1, 1, 1, "exposure_ctrl"),
    param("aec_dsp", "AEC DSP", 0, 1, 1, 1, "aec_dsp"),
    param("agc_ctrl", "AGC control", 0, 1, 1, 1, "agc_ctrl"),
    param("bpc", "Black pixel correction", 0, 1, 1, 0, "bpc"),
    param("wpc", "White pixel correction", 0, 1, 1, 1, "wpc"),
    param("raw_gma", "RAW gamma", 0, 1, 1, 1, "raw_gma"),
    param("lenc", "Lens correction", 0, 1, 1, 1, "lenc"),
    param("dcw", "Downsize", 0, 1, 1, 1, "dcw"),
    param("colorbar", "Color bar test", 0, 1, 1, 0, "colorbar"),
];

/// Look up a parameter by wire name
pub fn lookup(name: &str) -> Option<&'static CameraParamSpec> {
    CAMERA_PARAMS.iter().find(|p| p.name == name)
}

/// Element id of the slider bound to `name`
pub fn slider_id(name: &str) -> String {
    format!("{}-slider", id_stem(name))
}

/// Element id of the numeric label next to the slider
pub fn display_id(name: &str) -> String {
    format!("{}-display", id_stem(name))
}

fn id_stem(name: &str) -> &str {
    lookup(name).map(|p| p.id_stem).unwrap_or(name)
}
