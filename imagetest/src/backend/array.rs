use std::any::Any;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::Array3;

use super::{downcast_native, ensure_file_exists, ImageBackend, NativeImage, NativeType};
use crate::canonical::CanonicalImage;
use crate::error::{Error, Result};

/// Raw pixel array backend: PNG files decoded straight into an
/// `Array3<u8>` of height x width x channels.
///
/// Palettes are expanded, 16-bit samples are stripped to 8 bits and
/// sub-byte gray is widened, so the array always holds 8-bit samples.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArrayBackend;

impl ArrayBackend {
    pub fn new() -> Self {
        Self
    }

    pub fn decode(&self, path: &Path) -> Result<Array3<u8>> {
        ensure_file_exists(path)?;

        let extension = common::get_file_extension(path)
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if extension != "png" {
            return Err(Error::UnsupportedFormat(extension));
        }

        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let decode_err = |e: png::DecodingError| match e {
            png::DecodingError::IoError(source) => Error::Io {
                path: path.to_path_buf(),
                source,
            },
            other => Error::Decode {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        };

        let mut decoder = png::Decoder::new(BufReader::new(file));
        decoder.set_transformations(png::Transformations::normalize_to_color8());
        let mut reader = decoder.read_info().map_err(decode_err)?;

        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).map_err(decode_err)?;
        buf.truncate(info.buffer_size());

        let channels = info.color_type.samples();
        let (width, height) = (info.width as usize, info.height as usize);

        // Rows are tightly packed for 8-bit output.
        Ok(Array3::from_shape_vec((height, width, channels), buf)?)
    }
}

impl ImageBackend for ArrayBackend {
    fn native_type(&self) -> NativeType {
        NativeType::of::<Array3<u8>>()
    }

    fn import_image(&self, path: &Path) -> Result<NativeImage> {
        let array = self.decode(path)?;
        tracing::debug!("Decoded {} into a {:?} array", path.display(), array.dim());
        Ok(NativeImage::new(array))
    }

    fn export_image(&self, image: &dyn Any) -> Result<CanonicalImage> {
        let array = downcast_native::<Array3<u8>>(image)?;
        Ok(array.mapv(|v| v as f32 / u8::MAX as f32))
    }
}
