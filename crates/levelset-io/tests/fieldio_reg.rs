//! Field I/O regression test
//!
//! Writes synthetic fields to every enabled format, reads them back and
//! checks what each format is expected to preserve:
//!
//! - PNG / PGM: integer samples in `[0, 65535]` survive exactly
//! - TIFF: arbitrary f32 values survive exactly
//! - Native: dims, spacing and values survive for any dimension
//!
//! Also checks format detection on the written bytes and the planar-format
//! dimension guard.

use levelset_io::{FieldFormat, detect_format_from_bytes, load, read_from_bytes, save, write_to_bytes};
use levelset_test::fixtures::{disk_image, sphere_level_set};
use levelset_test::{RegParams, regout_dir};

#[test]
fn fieldio_reg() {
    let mut rp = RegParams::new("fieldio");
    let outdir = regout_dir();

    let disk = disk_image(&[40, 30], &[20.0, 15.0], 9.0, 200.0, 20.0);
    let level_set = sphere_level_set(&[16, 12], &[7.5, 6.0], 4.2);

    // --- Part 1: integer formats hold integer-valued images exactly ---
    for (i, format) in [FieldFormat::Png, FieldFormat::Pnm].iter().enumerate() {
        let path = format!("{}/fieldio.{}.{}", outdir, i, format.extension());
        save(&disk, &path).expect("save integer image");
        let restored = load(&path).expect("load integer image");
        rp.compare_fields(&disk, &restored, 0.0);
    }

    // 16-bit samples
    let wide = disk_image(&[12, 12], &[6.0, 6.0], 4.0, 40000.0, 3.0);
    let bytes = write_to_bytes(&wide, FieldFormat::Png).expect("png bytes");
    let restored = read_from_bytes(&bytes).expect("decode png");
    rp.compare_fields(&wide, &restored, 0.0);

    // --- Part 2: TIFF keeps signed floats ---
    let path = format!("{}/fieldio.levelset.tif", outdir);
    save(&level_set, &path).expect("save tiff");
    let restored = load(&path).expect("load tiff");
    rp.compare_fields(&level_set, &restored, 0.0);

    // --- Part 3: native format keeps N-D data and spacing ---
    let ball = sphere_level_set(&[9, 8, 7], &[4.0, 4.0, 3.0], 2.5)
        .with_spacing(&[0.5, 1.0, 2.0])
        .expect("valid spacing");
    let path = format!("{}/fieldio.ball.lsf", outdir);
    save(&ball, &path).expect("save native");
    let restored = load(&path).expect("load native");
    rp.compare_fields(&ball, &restored, 0.0);
    rp.check(restored.spacing() == ball.spacing(), "native spacing");

    // --- Part 4: format detection and guards ---
    for format in [
        FieldFormat::Png,
        FieldFormat::Pnm,
        FieldFormat::Tiff,
        FieldFormat::Native,
    ] {
        let bytes = write_to_bytes(&disk, format).expect("encode");
        let detected = detect_format_from_bytes(&bytes).expect("detect");
        rp.check(detected == format, &format!("detect {:?}", format));
    }

    let planar = write_to_bytes(&ball, FieldFormat::Png);
    rp.check(planar.is_err(), "3D field rejected by PNG");
    let unknown = save(&disk, format!("{}/fieldio.bmp", outdir));
    rp.check(unknown.is_err(), "unknown extension rejected");
    let missing = load(format!("{}/does-not-exist.png", outdir));
    rp.check(missing.is_err(), "missing file reported");

    // Negative values clip on integer formats
    let clipped = read_from_bytes(&write_to_bytes(&level_set, FieldFormat::Pnm).expect("pgm"))
        .expect("decode pgm");
    let (min, _) = clipped.min();
    rp.compare_values(0.0, min as f64, 0.0);

    assert!(rp.cleanup(), "fieldio regression test failed");
}
