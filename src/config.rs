use crate::constants::{
    DEFAULT_CLOUD_NAME, DEFAULT_MEDIA_HOST, DEFAULT_UPLOAD_PRESET, MAX_JPEG_QUALITY,
    MIN_JPEG_QUALITY, UPLOAD_QUALITY,
};
use crate::error::{Result, ShareError};

/// Where photos are sent: the media host's upload endpoint plus the unsigned upload preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub endpoint: String,
    pub upload_preset: String,
}

impl Default for Destination {
    fn default() -> Self {
        Self::cloudinary(DEFAULT_CLOUD_NAME, DEFAULT_UPLOAD_PRESET)
    }
}

impl Destination {
    pub fn cloudinary(cloud_name: &str, upload_preset: &str) -> Self {
        Self {
            endpoint: format!("{}/v1_1/{}/image/upload", DEFAULT_MEDIA_HOST, cloud_name),
            upload_preset: upload_preset.to_string(),
        }
    }

    /// Builds a destination from optional overrides.
    ///
    /// An explicit `endpoint` wins over `cloud_name`. Anything left unset falls
    /// back to the built-in defaults.
    pub fn new(
        endpoint: Option<String>,
        cloud_name: Option<String>,
        upload_preset: Option<String>,
    ) -> Result<Self> {
        let upload_preset = upload_preset.unwrap_or_else(|| DEFAULT_UPLOAD_PRESET.to_string());
        if upload_preset.trim().is_empty() {
            return Err(ShareError::InvalidDestination(
                "upload preset must not be empty".to_string(),
            ));
        }

        let endpoint = match endpoint {
            Some(endpoint) => endpoint,
            None => {
                let cloud_name = cloud_name.unwrap_or_else(|| DEFAULT_CLOUD_NAME.to_string());
                if cloud_name.trim().is_empty() || cloud_name.contains('/') {
                    return Err(ShareError::InvalidDestination(format!(
                        "invalid cloud name: {:?}",
                        cloud_name
                    )));
                }
                return Ok(Self::cloudinary(&cloud_name, &upload_preset));
            }
        };

        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ShareError::InvalidDestination(format!(
                "endpoint must be an http(s) URL: {}",
                endpoint
            )));
        }

        Ok(Self {
            endpoint,
            upload_preset,
        })
    }
}

/// Lossy encoding quality in the range (0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quality(f32);

impl Quality {
    pub fn new(value: f32) -> Result<Self> {
        if !(value > 0.0 && value <= 1.0) {
            return Err(ShareError::InvalidQuality(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    /// Maps onto the 1..=100 scale the JPEG encoder expects.
    pub fn to_jpeg_quality(&self) -> u8 {
        ((self.0 * 100.0).round() as u8).clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(UPLOAD_QUALITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_default() {
        let destination = Destination::default();
        assert_eq!(
            destination.endpoint,
            "https://api.cloudinary.com/v1_1/wedding-snap/image/upload"
        );
        assert_eq!(destination.upload_preset, "wedding_guests");
    }

    #[test]
    fn test_destination_new_with_cloud_name() {
        let destination =
            Destination::new(None, Some("anna-and-ben".to_string()), Some("guests".to_string()))
                .unwrap();
        assert_eq!(
            destination.endpoint,
            "https://api.cloudinary.com/v1_1/anna-and-ben/image/upload"
        );
        assert_eq!(destination.upload_preset, "guests");
    }

    #[test]
    fn test_destination_endpoint_overrides_cloud_name() {
        let destination = Destination::new(
            Some("http://127.0.0.1:9000/upload".to_string()),
            Some("ignored".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(destination.endpoint, "http://127.0.0.1:9000/upload");
        assert_eq!(destination.upload_preset, "wedding_guests");
    }

    #[test]
    fn test_destination_rejects_bad_values() {
        let result = Destination::new(Some("ftp://host/upload".to_string()), None, None);
        assert!(matches!(result, Err(ShareError::InvalidDestination(_))));

        let result = Destination::new(None, Some("a/b".to_string()), None);
        assert!(matches!(result, Err(ShareError::InvalidDestination(_))));

        let result = Destination::new(None, None, Some("  ".to_string()));
        assert!(matches!(result, Err(ShareError::InvalidDestination(_))));
    }

    #[test]
    fn test_quality_bounds() {
        assert!(Quality::new(1.0).is_ok());
        assert!(Quality::new(0.01).is_ok());
        assert!(matches!(Quality::new(0.0), Err(ShareError::InvalidQuality(_))));
        assert!(matches!(Quality::new(1.5), Err(ShareError::InvalidQuality(_))));
        assert!(matches!(Quality::new(f32::NAN), Err(ShareError::InvalidQuality(_))));
    }

    #[test]
    fn test_quality_to_jpeg_scale() {
        assert_eq!(Quality::default().to_jpeg_quality(), 70);
        assert_eq!(Quality::new(1.0).unwrap().to_jpeg_quality(), 100);
        assert_eq!(Quality::new(0.001).unwrap().to_jpeg_quality(), 1);
    }
}
