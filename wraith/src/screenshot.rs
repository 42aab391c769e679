use std::{fs::File, io::BufWriter, path::Path};

use shade::ppu::{Scanline, SCREEN_HEIGHT, SCREEN_WIDTH};

use crate::RunError;

/// The four shades of the original screen, lightest first.
const PALETTE: [[u8; 3]; 4] = [
    [0x9B, 0xBC, 0x0F],
    [0x8B, 0xAC, 0x0F],
    [0x30, 0x62, 0x30],
    [0x0F, 0x38, 0x0F],
];

/// Turns shade indices into packed RGB.
pub fn to_rgb(screen: &[Scanline]) -> Vec<u8> {
    screen
        .iter()
        .flatten()
        .flat_map(|&shade| PALETTE[(shade & 0b11) as usize])
        .collect()
}

pub fn write(path: &Path, screen: &[Scanline]) -> Result<(), RunError> {
    let file = File::create(path).map_err(|source| RunError::Io {
        path: path.to_owned(),
        source,
    })?;
    let mut encoder = png::Encoder::new(
        BufWriter::new(file),
        SCREEN_WIDTH as u32,
        SCREEN_HEIGHT as u32,
    );
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&to_rgb(screen))?;
    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shades_map_to_the_palette() {
        let mut screen = vec![[0; SCREEN_WIDTH]; SCREEN_HEIGHT];
        screen[0][1] = 3;
        let rgb = to_rgb(&screen);
        assert_eq!(rgb.len(), SCREEN_WIDTH * SCREEN_HEIGHT * 3);
        assert_eq!(&rgb[..3], &PALETTE[0]);
        assert_eq!(&rgb[3..6], &PALETTE[3]);
    }
}
