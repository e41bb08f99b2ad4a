//! Output framing per provider format.
//!
//! Landscape/portrait requests are expressed differently by every provider:
//! a pixel size, a ratio, or an aspect ratio plus orientation.

use vgen_models::{ProviderFormat, ProviderProfile, VideoShape};

/// Return a copy of `profile` adjusted for `shape`.
pub fn apply_shape(profile: &ProviderProfile, shape: VideoShape) -> ProviderProfile {
    let mut shaped = profile.clone();

    match profile.format {
        ProviderFormat::OpenAi => {
            let hd = profile.resolution.as_deref() == Some("1080p");
            shaped.size = match (shape, hd) {
                (VideoShape::Default, _) => None,
                (VideoShape::Landscape, true) => Some("1792x1024".into()),
                (VideoShape::Landscape, false) => Some("1280x720".into()),
                (VideoShape::Portrait, true) => Some("1024x1792".into()),
                (VideoShape::Portrait, false) => Some("720x1280".into()),
            };
        }
        ProviderFormat::SiliconFlow => {
            shaped.size = match shape {
                VideoShape::Default => None,
                VideoShape::Landscape => Some("1280x720".into()),
                VideoShape::Portrait => Some("720x1280".into()),
            };
        }
        ProviderFormat::Doubao => {
            shaped.ratio = Some(
                match shape {
                    VideoShape::Default => "adaptive",
                    VideoShape::Landscape => "16:9",
                    VideoShape::Portrait => "9:16",
                }
                .to_string(),
            );
        }
        ProviderFormat::VectorEngine => {
            let model = profile.effective_model();
            let veo3 = model.contains("veo3");
            let sora2 = model.contains("sora-2");

            let (aspect, orientation) = match shape {
                VideoShape::Default => (None, None),
                VideoShape::Landscape => (
                    Some(if veo3 { "16:9" } else { "3:2" }),
                    sora2.then_some("landscape"),
                ),
                VideoShape::Portrait => (
                    Some(if veo3 { "9:16" } else { "2:3" }),
                    sora2.then_some("portrait"),
                ),
            };

            if model.contains("veo") {
                shaped.resolution = None;
            }
            // veo2 and sora models take no aspect ratio
            shaped.aspect_ratio = if model.contains("veo2") || model.contains("sora") {
                None
            } else {
                aspect.map(str::to_string)
            };
            shaped.orientation = orientation.map(str::to_string);
        }
    }

    shaped
}
