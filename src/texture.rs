//! Earth texture fetching and sampling

use image::{DynamicImage, RgbImage};
use log::{debug, error, info};
use std::io::Read;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Equirectangular earth map used when nothing else is configured
pub const DEFAULT_TEXTURE_URL: &str = "https://dariush-hassani.github.io/react-threejs-globe/texture.png";

/// Maximum size for a downloaded texture (20MB)
const MAX_TEXTURE_SIZE: u64 = 20 * 1024 * 1024;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("request for {url} failed: {reason}")]
    Fetch { url: String, reason: String },
    #[error("texture at {url} is {size} bytes, over the {limit} byte limit")]
    TooLarge { url: String, size: u64, limit: u64 },
    #[error("reading {0} failed: {1}")]
    Read(String, #[source] std::io::Error),
    #[error("could not decode texture: {0}")]
    Decode(#[from] image::ImageError),
    #[error("invalid path in {0}")]
    Path(String),
}

/// A decoded texture, sampled with wrapping `u` and clamped `v`
#[derive(Clone)]
pub struct Texture {
    image: RgbImage,
}

impl Texture {
    pub fn new(image: DynamicImage) -> Self {
        Self { image: image.to_rgb8() }
    }

    pub fn from_rgb(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Bilinear sample at texture coordinates; `v = 0` is the top row
    pub fn sample(&self, u: f32, v: f32) -> [f32; 3] {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 {
            return [0.0; 3];
        }

        let x = u.rem_euclid(1.0) * w as f32 - 0.5;
        let y = (v.clamp(0.0, 1.0) * h as f32 - 0.5).clamp(0.0, (h - 1) as f32);

        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;

        let xi0 = (x0 as i64).rem_euclid(w as i64) as u32;
        let xi1 = (xi0 + 1) % w;
        let yi0 = y0 as u32;
        let yi1 = (yi0 + 1).min(h - 1);

        let p00 = self.image.get_pixel(xi0, yi0).0;
        let p10 = self.image.get_pixel(xi1, yi0).0;
        let p01 = self.image.get_pixel(xi0, yi1).0;
        let p11 = self.image.get_pixel(xi1, yi1).0;

        let mut out = [0.0; 3];
        for c in 0..3 {
            let top = p00[c] as f32 * (1.0 - fx) + p10[c] as f32 * fx;
            let bottom = p01[c] as f32 * (1.0 - fx) + p11[c] as f32 * fx;
            out[c] = (top * (1.0 - fy) + bottom * fy) / 255.0;
        }
        out
    }
}

/// Result of the one-shot texture fetch
pub enum TextureEvent {
    Loaded(Texture),
    Failed(TextureError),
}

/// Fetches a texture on a background thread and reports back exactly once
pub struct TextureLoader {
    url: String,
    receiver: Option<Receiver<TextureEvent>>,
}

impl TextureLoader {
    /// Start fetching `url` (non-blocking)
    pub fn spawn(url: &str) -> Self {
        let (tx, rx) = mpsc::channel();
        let url_owned = url.to_string();

        thread::spawn(move || {
            let event = match load_texture(&url_owned) {
                Ok(texture) => TextureEvent::Loaded(texture),
                Err(e) => TextureEvent::Failed(e),
            };
            let _ = tx.send(event);
        });

        Self { url: url.to_string(), receiver: Some(rx) }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_pending(&self) -> bool {
        self.receiver.is_some()
    }

    /// Take the completion event if it has arrived. Returns `Some` at most once.
    pub fn poll(&mut self) -> Option<TextureEvent> {
        let rx = self.receiver.as_ref()?;
        let event = match rx.try_recv() {
            Ok(event) => event,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => TextureEvent::Failed(TextureError::Fetch {
                url: self.url.clone(),
                reason: "loader thread exited".to_string(),
            }),
        };
        self.receiver = None;
        Some(event)
    }

    /// Block until the fetch finishes (print mode)
    pub fn wait(mut self) -> TextureEvent {
        let Some(rx) = self.receiver.take() else {
            return TextureEvent::Failed(TextureError::Fetch {
                url: self.url,
                reason: "already consumed".to_string(),
            });
        };
        rx.recv().unwrap_or_else(|_| {
            TextureEvent::Failed(TextureError::Fetch {
                url: self.url.clone(),
                reason: "loader thread exited".to_string(),
            })
        })
    }
}

/// Load a texture from an http(s) URL, a `file://` URL, or a plain path
pub fn load_texture(url: &str) -> Result<Texture, TextureError> {
    let bytes = if let Some(path) = url.strip_prefix("file://") {
        let path = urlencoding::decode(path).map_err(|_| TextureError::Path(url.to_string()))?;
        read_file(path.as_ref())?
    } else if url.starts_with("http://") || url.starts_with("https://") {
        fetch(url)?
    } else {
        read_file(url)?
    };

    let texture = Texture::new(image::load_from_memory(&bytes)?);
    let (w, h) = texture.dimensions();
    debug!("decoded texture {} ({}x{})", url, w, h);
    Ok(texture)
}

fn read_file(path: &str) -> Result<Vec<u8>, TextureError> {
    std::fs::read(Path::new(path)).map_err(|e| TextureError::Read(path.to_string(), e))
}

fn fetch(url: &str) -> Result<Vec<u8>, TextureError> {
    let response = ureq::get(url)
        .timeout(FETCH_TIMEOUT)
        .call()
        .map_err(|e| TextureError::Fetch { url: url.to_string(), reason: e.to_string() })?;

    if let Some(len) = response
        .header("Content-Length")
        .and_then(|s| s.parse::<u64>().ok())
    {
        if len > MAX_TEXTURE_SIZE {
            return Err(TextureError::TooLarge { url: url.to_string(), size: len, limit: MAX_TEXTURE_SIZE });
        }
    }

    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(MAX_TEXTURE_SIZE + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| TextureError::Read(url.to_string(), e))?;

    if bytes.len() as u64 > MAX_TEXTURE_SIZE {
        return Err(TextureError::TooLarge {
            url: url.to_string(),
            size: bytes.len() as u64,
            limit: MAX_TEXTURE_SIZE,
        });
    }
    Ok(bytes)
}

/// Log the outcome of a fetch
pub fn log_event(url: &str, event: &TextureEvent) {
    match event {
        TextureEvent::Loaded(_) => info!("earth texture loaded from {}", url),
        TextureEvent::Failed(e) => error!("error loading earth texture from {}: {}", url, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn checker() -> Texture {
        // 2x2: red, green / blue, white
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 255, 0]));
        img.put_pixel(0, 1, Rgb([0, 0, 255]));
        img.put_pixel(1, 1, Rgb([255, 255, 255]));
        Texture::from_rgb(img)
    }

    #[test]
    fn sample_hits_texel_centers() {
        let tex = checker();
        assert_eq!(tex.sample(0.25, 0.25), [1.0, 0.0, 0.0]);
        assert_eq!(tex.sample(0.75, 0.25), [0.0, 1.0, 0.0]);
        assert_eq!(tex.sample(0.25, 0.75), [0.0, 0.0, 1.0]);
        assert_eq!(tex.sample(0.75, 0.75), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn sample_wraps_horizontally() {
        let tex = checker();
        assert_eq!(tex.sample(1.25, 0.25), tex.sample(0.25, 0.25));
        assert_eq!(tex.sample(-0.75, 0.25), tex.sample(0.25, 0.25));
    }

    #[test]
    fn sample_clamps_vertically() {
        let tex = checker();
        assert_eq!(tex.sample(0.25, -1.0), tex.sample(0.25, 0.0));
        assert_eq!(tex.sample(0.25, 2.0), tex.sample(0.25, 1.0));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_texture("/definitely/not/here.png").err().unwrap();
        assert!(matches!(err, TextureError::Read(..)));
    }

    #[test]
    fn loads_png_from_file_url() {
        let dir = std::env::temp_dir().join(format!("globearc-tex-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tiny map.png");
        checker_image().save(&path).unwrap();

        let url = format!("file://{}", urlencoding::encode(&path.to_string_lossy()).replace("%2F", "/"));
        let tex = load_texture(&url).unwrap();
        assert_eq!(tex.dimensions(), (2, 2));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let dir = std::env::temp_dir().join(format!("globearc-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.png");
        std::fs::write(&path, b"not a png").unwrap();

        let err = load_texture(&path.to_string_lossy()).err().unwrap();
        assert!(matches!(err, TextureError::Decode(_)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn loader_reports_failure_once() {
        let mut loader = TextureLoader::spawn("/definitely/not/here.png");
        let mut events = 0;
        for _ in 0..200 {
            if let Some(event) = loader.poll() {
                assert!(matches!(event, TextureEvent::Failed(_)));
                events += 1;
            }
            if !loader.is_pending() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(events, 1);
        assert!(loader.poll().is_none());
    }

    fn checker_image() -> RgbImage {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(1, 1, image::Rgb([255, 255, 255]));
        img
    }
}
