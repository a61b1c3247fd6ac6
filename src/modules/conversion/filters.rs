use image::DynamicImage;

use super::events::Filter;

// Fixed, not configurable per job.
pub const BLUR_RADIUS: u32 = 25;

const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

pub fn apply(image: DynamicImage, filter: Filter) -> DynamicImage {
    match filter {
        Filter::Greyscale => image.grayscale(),
        Filter::Invert => {
            let mut image = image;
            image.invert();
            image
        }
        Filter::Sepia => sepia(&image),
        // Gaussian with the radius at two standard deviations.
        Filter::Blur => image.blur(BLUR_RADIUS as f32 / 2.0),
    }
}

fn sepia(image: &DynamicImage) -> DynamicImage {
    let mut rgba = image.to_rgba8();

    for pixel in rgba.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let rgb = [r as f32, g as f32, b as f32];
        let mix = |row: [f32; 3]| {
            (row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2])
                .round()
                .min(255.0) as u8
        };
        pixel.0 = [mix(SEPIA[0]), mix(SEPIA[1]), mix(SEPIA[2]), a];
    }

    DynamicImage::ImageRgba8(rgba)
}
