use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::unbounded;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::{debug, info};

use crate::error::MorphError;
use crate::mapper::{map_pixels, position_grid, CoordinateBuffer};

/// Tunables for [`load_gallery`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GalleryOptions {
    /// Resample every image to `grid_size x grid_size` before validation.
    pub grid_size: Option<u32>,
}

/// A decoded and mapped image, immutable once loaded.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    file: PathBuf,
    pixels: RgbaImage,
    coordinates: CoordinateBuffer,
}

impl ImageRecord {
    /// Maps already-decoded pixels.
    pub fn from_rgba(file: impl Into<PathBuf>, pixels: RgbaImage) -> Self {
        let coordinates = map_pixels(&pixels);
        Self {
            file: file.into(),
            pixels,
            coordinates,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn coordinates(&self) -> &CoordinateBuffer {
        &self.coordinates
    }
}

/// Entry handed to the thumbnail strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub file: PathBuf,
    pub loaded: bool,
}

/// Ordered set of images sharing one square point grid.
#[derive(Debug, Clone)]
pub struct Gallery {
    records: Vec<ImageRecord>,
}

impl Gallery {
    /// Builds a gallery from mapped records after checking the shared grid.
    pub fn from_records(records: Vec<ImageRecord>) -> Result<Self, MorphError> {
        let dimensions: Vec<(&Path, u32, u32)> = records
            .iter()
            .map(|record| (record.file(), record.width(), record.height()))
            .collect();
        validate_grid(&dimensions)?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&ImageRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Shared `(width, height)` of every image.
    pub fn dimensions(&self) -> (u32, u32) {
        // Non-empty by construction.
        self.records
            .first()
            .map(|record| (record.width(), record.height()))
            .unwrap_or((0, 0))
    }

    pub fn point_count(&self) -> usize {
        let (width, height) = self.dimensions();
        width as usize * height as usize
    }

    pub fn position_grid(&self) -> Vec<[f32; 2]> {
        let (width, height) = self.dimensions();
        position_grid(width, height)
    }

    pub fn thumbnails(&self) -> Vec<Thumbnail> {
        self.records
            .iter()
            .map(|record| Thumbnail {
                file: record.file.clone(),
                loaded: true,
            })
            .collect()
    }
}

/// Decodes, validates and maps every file.
///
/// Files are decoded concurrently and the first decode failure aborts the
/// load. Dimensions are checked before any mapping work starts.
pub fn load_gallery(paths: &[PathBuf], options: GalleryOptions) -> Result<Gallery, MorphError> {
    if paths.is_empty() {
        return Err(MorphError::EmptyGallery);
    }

    let decoded = decode_all(paths, options)?;
    let dimensions: Vec<(&Path, u32, u32)> = paths
        .iter()
        .zip(&decoded)
        .map(|(path, image)| (path.as_path(), image.width(), image.height()))
        .collect();
    validate_grid(&dimensions)?;

    let records = map_all(paths, decoded)?;
    let gallery = Gallery { records };
    let (width, height) = gallery.dimensions();
    info!(
        images = gallery.len(),
        width,
        height,
        points = gallery.point_count(),
        "gallery ready"
    );
    Ok(gallery)
}

fn decode_all(paths: &[PathBuf], options: GalleryOptions) -> Result<Vec<RgbaImage>, MorphError> {
    run_decoders(paths, |path| decode_one(path, options))
}

/// Runs `decode` on one scoped worker per path and gathers results in path order.
///
/// Every worker is joined before returning, so a panicking decoder surfaces
/// as [`MorphError::Worker`]. Otherwise the first decode error received wins.
fn run_decoders<F>(paths: &[PathBuf], decode: F) -> Result<Vec<RgbaImage>, MorphError>
where
    F: Fn(&Path) -> Result<RgbaImage, MorphError> + Sync,
{
    let (sender, receiver) = unbounded();
    let decode = &decode;

    thread::scope(|scope| {
        let handles: Vec<_> = paths
            .iter()
            .enumerate()
            .map(|(index, path)| {
                let sender = sender.clone();
                scope.spawn(move || {
                    let result = decode(path);
                    let _ = sender.send((index, result));
                })
            })
            .collect();
        drop(sender);

        let mut slots: Vec<Option<RgbaImage>> = paths.iter().map(|_| None).collect();
        let mut first_error = None;
        for (index, result) in receiver.iter() {
            match result {
                Ok(image) => slots[index] = Some(image),
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }

        let panicked: Vec<&PathBuf> = handles
            .into_iter()
            .zip(paths)
            .filter_map(|(handle, path)| handle.join().is_err().then_some(path))
            .collect();
        if let Some(path) = panicked.first() {
            return Err(MorphError::Worker(format!(
                "decoding {} panicked",
                path.display()
            )));
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        slots
            .into_iter()
            .zip(paths)
            .map(|(slot, path)| {
                slot.ok_or_else(|| {
                    MorphError::Worker(format!(
                        "decoder for {} exited without a result",
                        path.display()
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()
    })
}

fn decode_one(path: &Path, options: GalleryOptions) -> Result<RgbaImage, MorphError> {
    let image = image::open(path).map_err(|source| MorphError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rgba = image.to_rgba8();
    debug!(
        path = %path.display(),
        width = rgba.width(),
        height = rgba.height(),
        "decoded image"
    );

    if let Some(edge) = options.grid_size.filter(|edge| *edge > 0) {
        if rgba.dimensions() != (edge, edge) {
            rgba = imageops::resize(&rgba, edge, edge, FilterType::Triangle);
            debug!(path = %path.display(), edge, "resampled image onto grid");
        }
    }
    Ok(rgba)
}

fn validate_grid(dimensions: &[(&Path, u32, u32)]) -> Result<(), MorphError> {
    let Some(&(_, expected_width, expected_height)) = dimensions.first() else {
        return Err(MorphError::EmptyGallery);
    };

    for &(path, width, height) in dimensions {
        if width != height {
            return Err(MorphError::NonSquareImage {
                path: path.to_path_buf(),
                width,
                height,
            });
        }
        if (width, height) != (expected_width, expected_height) {
            return Err(MorphError::DimensionMismatch {
                path: path.to_path_buf(),
                expected: (expected_width, expected_height),
                found: (width, height),
            });
        }
    }
    Ok(())
}

fn map_all(paths: &[PathBuf], decoded: Vec<RgbaImage>) -> Result<Vec<ImageRecord>, MorphError> {
    thread::scope(|scope| {
        let handles: Vec<_> = paths
            .iter()
            .zip(decoded)
            .map(|(path, pixels)| {
                scope.spawn(move || ImageRecord::from_rgba(path.clone(), pixels))
            })
            .collect();

        // Join every worker before reporting so none is left running.
        let joined: Vec<_> = handles.into_iter().map(|handle| handle.join()).collect();
        joined
            .into_iter()
            .zip(paths)
            .map(|(result, path)| {
                result.map_err(|_| {
                    MorphError::Worker(format!("mapping {} panicked", path.display()))
                })
            })
            .collect::<Result<Vec<_>, _>>()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(size: u32, color: [u8; 3]) -> RgbaImage {
        RgbaImage::from_pixel(size, size, image::Rgba([color[0], color[1], color[2], 255]))
    }

    #[test]
    fn from_records_rejects_mismatched_grids() {
        let records = vec![
            ImageRecord::from_rgba("a.png", solid(4, [1, 2, 3])),
            ImageRecord::from_rgba("b.png", solid(5, [1, 2, 3])),
        ];
        let err = Gallery::from_records(records).unwrap_err();
        match err {
            MorphError::DimensionMismatch {
                path,
                expected,
                found,
            } => {
                assert_eq!(path, PathBuf::from("b.png"));
                assert_eq!(expected, (4, 4));
                assert_eq!(found, (5, 5));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn from_records_rejects_rectangles() {
        let records = vec![ImageRecord::from_rgba(
            "wide.png",
            RgbaImage::new(4, 2),
        )];
        assert!(matches!(
            Gallery::from_records(records),
            Err(MorphError::NonSquareImage {
                width: 4,
                height: 2,
                ..
            })
        ));
    }

    #[test]
    fn from_records_rejects_empty() {
        assert!(matches!(
            Gallery::from_records(Vec::new()),
            Err(MorphError::EmptyGallery)
        ));
    }

    #[test]
    fn gallery_reports_grid_and_thumbnails() {
        let gallery = Gallery::from_records(vec![
            ImageRecord::from_rgba("a.png", solid(3, [255, 0, 0])),
            ImageRecord::from_rgba("b.png", solid(3, [0, 0, 255])),
        ])
        .unwrap();
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery.dimensions(), (3, 3));
        assert_eq!(gallery.point_count(), 9);
        assert_eq!(gallery.position_grid().len(), 9);
        assert_eq!(
            gallery.thumbnails(),
            vec![
                Thumbnail {
                    file: PathBuf::from("a.png"),
                    loaded: true
                },
                Thumbnail {
                    file: PathBuf::from("b.png"),
                    loaded: true
                },
            ]
        );
    }

    #[test]
    fn panicking_decoder_becomes_worker_error() {
        let paths = vec![PathBuf::from("good.png"), PathBuf::from("bad.png")];
        let result = run_decoders(&paths, |path| {
            if path.ends_with("bad.png") {
                panic!("decoder blew up");
            }
            Ok(solid(2, [1, 2, 3]))
        });
        match result {
            Err(MorphError::Worker(message)) => assert!(message.contains("bad.png"), "{message}"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn decoders_keep_path_order() {
        let paths = vec![PathBuf::from("a"), PathBuf::from("bb"), PathBuf::from("ccc")];
        let images = run_decoders(&paths, |path| {
            let edge = path.as_os_str().len() as u32;
            Ok(solid(edge, [0, 0, 0]))
        })
        .unwrap();
        let edges: Vec<u32> = images.iter().map(|image| image.width()).collect();
        assert_eq!(edges, vec![1, 2, 3]);
    }

    #[test]
    fn decode_error_is_reported_after_all_workers_finish() {
        let paths = vec![PathBuf::from("ok.png"), PathBuf::from("missing.png")];
        let result = run_decoders(&paths, |path| {
            if path.ends_with("missing.png") {
                Err(MorphError::EmptyGallery)
            } else {
                Ok(solid(2, [9, 9, 9]))
            }
        });
        assert!(matches!(result, Err(MorphError::EmptyGallery)));
    }

    #[test]
    fn solid_image_maps_in_index_order() {
        let record = ImageRecord::from_rgba("solid.png", solid(2, [10, 200, 30]));
        let pairs: Vec<_> = record.coordinates().pairs().collect();
        assert_eq!(pairs, vec![(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]);
    }
}
