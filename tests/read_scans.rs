use approx::assert_abs_diff_eq;
use image::imageops;
use pretty_assertions::assert_eq;
use punchread::{
    CardReader, CardState, DuplexVerdict, EbcdicTable, Finding, GeometryError, GeometryFault,
    Hollerith, PixelGrid, Polarity, PunchPattern, ReadError, ReaderConfig, RowOrder, ScanOptions,
    UNKNOWN_MARKER, compare_duplex, render_overlay, render_scan,
};

fn scan(text: &str, options: &ScanOptions) -> PixelGrid {
    let pattern = PunchPattern::from_text(&EbcdicTable::new(), text).unwrap();
    PixelGrid::new(render_scan(&pattern, options), Polarity::DarkHoles)
}

fn default_reader() -> CardReader {
    CardReader::new(ReaderConfig::default()).unwrap()
}

#[test]
fn digits_card_reads_back_exactly() {
    let text = "0123456789".repeat(8);
    let reading = default_reader().read(&scan(&text, &ScanOptions::default())).unwrap();

    assert_eq!(reading.text(), text);
    assert!(reading.findings.is_empty(), "{:?}", reading.findings);
    let d = &reading.diagnostics;
    assert_eq!(d.state, CardState::Decoded);
    assert_abs_diff_eq!(d.edges.left.at(500.0), 10.0, epsilon = 0.25);
    assert_abs_diff_eq!(d.edges.right.at(500.0), 590.0, epsilon = 0.25);
    assert_abs_diff_eq!(d.edges.skew(), 0.0, epsilon = 1e-3);
    assert_abs_diff_eq!(d.front.y_at(300.0), 1170.0, epsilon = 0.25);
    assert_eq!(d.drift_trace().len(), 80);
}

#[test]
fn mixed_text_round_trips() {
    let text = "       IDENTIFICATION DIVISION.                                        00000100";
    let reading = default_reader().read(&scan(text, &ScanOptions::default())).unwrap();
    assert_eq!(reading.text(), text);
    assert!(reading.decoded.is_printable());
}

#[test]
fn skewed_card_is_registered_and_read() {
    let text = "THE QUICK BROWN FOX JUMPS OVER THE LAZY DOG 0123456789 +-*/=()$,.'";
    let options = ScanOptions {
        left: 8.0,
        right: 580.0,
        skew: 0.008,
        ..ScanOptions::default()
    };
    let reading = default_reader().read(&scan(text, &options)).unwrap();
    assert_eq!(reading.text().trim_end(), text);
    assert_abs_diff_eq!(reading.diagnostics.edges.skew(), 0.008, epsilon = 1e-3);
    assert_abs_diff_eq!(reading.diagnostics.front.tilt(), -0.008, epsilon = 3e-3);
}

#[test]
fn uniform_hole_offset_is_absorbed_by_drift() {
    let text = "0123456789".repeat(8);
    let shifted = ScanOptions {
        hole_offset: (2.0, 1.5),
        ..ScanOptions::default()
    };
    let reader = default_reader();
    let straight = reader.read(&scan(&text, &ScanOptions::default())).unwrap();
    let reading = reader.read(&scan(&text, &shifted)).unwrap();

    assert_eq!(reading.text(), straight.text());
    let trace = reading.diagnostics.drift_trace();
    for drift in &trace[40..] {
        assert_abs_diff_eq!(drift.dx, 2.0, epsilon = 0.6);
        assert_abs_diff_eq!(drift.dy, 1.5, epsilon = 0.6);
    }
}

#[test]
fn higher_resolution_scan_reads_the_same() {
    let text = "HELLO, WORLD";
    let config = ReaderConfig {
        dpi: 300.0,
        ..ReaderConfig::default()
    };
    let reading = CardReader::new(config)
        .unwrap()
        .read(&scan(text, &ScanOptions::at_dpi(300.0)))
        .unwrap();
    assert_eq!(reading.text().trim_end(), text);
}

#[test]
fn light_hole_scanner_reads_after_inversion() {
    let pattern = PunchPattern::from_text(&EbcdicTable::new(), "LIGHT HOLES").unwrap();
    let mut image = render_scan(&pattern, &ScanOptions::default());
    imageops::invert(&mut image);
    let config = ReaderConfig {
        polarity: Polarity::LightHoles,
        ..ReaderConfig::default()
    };
    let reader = CardReader::new(config).unwrap();
    let reading = reader.read(&PixelGrid::new(image, reader.config().polarity)).unwrap();
    assert_eq!(reading.text().trim_end(), "LIGHT HOLES");
}

#[test]
fn duplex_faces_agree() {
    let text = "       MOVE CORRESPONDING A TO B.";
    let back_options = ScanOptions {
        row_order: RowOrder::NineFirst,
        ..ScanOptions::default()
    };
    let front = default_reader().read(&scan(text, &ScanOptions::default())).unwrap();
    let back_reader = CardReader::new(ReaderConfig {
        row_order: RowOrder::NineFirst,
        ..ReaderConfig::default()
    })
    .unwrap();
    let back = back_reader.read(&scan(text, &back_options)).unwrap();
    assert_eq!(back.text(), front.text());
    assert_eq!(compare_duplex(&front.pattern, &back.pattern), DuplexVerdict::Good);

    let damaged = back_reader
        .read(&scan("       MOVE CORRESPONDING A TO C.", &back_options))
        .unwrap();
    match compare_duplex(&front.pattern, &damaged.pattern) {
        DuplexVerdict::Bad { columns } => {
            assert_eq!(columns.len(), 1);
            assert_eq!(columns[0].column, 31);
        }
        DuplexVerdict::Good => panic!("damaged back face compared equal"),
    }
}

#[test]
fn faint_holes_are_flagged_as_low_confidence() {
    let mut columns = vec![Hollerith::BLANK; 80];
    columns[5] = Hollerith::row(12).unwrap();
    columns[9] = Hollerith::row(3).unwrap();
    let options = ScanOptions::default();
    let blank = render_scan(&PunchPattern::default(), &options);
    let mut image = render_scan(&PunchPattern::new(columns), &options);
    // grey the holes: column 5 just short of the margin, column 9 just under the ceiling
    for (x, y, px) in image.enumerate_pixels_mut() {
        if px.0[0] != blank.get_pixel(x, y).0[0] {
            px.0[0] = if y > 1040 { 170 } else { 90 };
        }
    }

    let reading = default_reader()
        .read(&PixelGrid::new(image, Polarity::DarkHoles))
        .unwrap();
    assert_eq!(reading.pattern.column(5), Hollerith::BLANK);
    assert_eq!(reading.pattern.column(9), Hollerith::row(3).unwrap());
    assert_eq!(reading.text(), format!("{:<80}", "         3"));

    assert_eq!(reading.findings.len(), 2, "{:?}", reading.findings);
    for (finding, (expected_column, expected_row)) in reading.findings.iter().zip([(5, 12), (9, 3)]) {
        match finding {
            Finding::LowConfidence {
                column,
                row,
                confidence,
            } => {
                assert_eq!((*column, *row), (expected_column, expected_row));
                assert_abs_diff_eq!(*confidence, 0.5, epsilon = 0.1);
            }
            other => panic!("unexpected finding {:?}", other),
        }
    }
}

#[test]
fn unmapped_pattern_is_surfaced_not_dropped() {
    let odd: Hollerith = "12-11-0-1-2-3".parse().unwrap();
    let pattern = PunchPattern::new([Hollerith::row(1).unwrap(), odd, Hollerith::row(2).unwrap()]);
    let image = render_scan(&pattern, &ScanOptions::default());
    let reading = default_reader()
        .read(&PixelGrid::new(image, Polarity::DarkHoles))
        .unwrap();

    assert_eq!(reading.pattern.column(1), odd);
    assert!(reading.text().starts_with(&format!("1{}2", UNKNOWN_MARKER)));
    assert!(
        reading
            .findings
            .contains(&Finding::UnknownPattern { column: 1, code: odd })
    );
    assert_eq!(reading.decoded.listing(), "<<binary>>");
}

#[test]
fn card_without_front_edge_in_view_is_aborted() {
    let options = ScanOptions {
        front: 900.0,
        ..ScanOptions::default()
    };
    match default_reader().read(&scan("X", &options)) {
        Err(ReadError::Geometry(GeometryError { stage, fault })) => {
            assert_eq!(stage, CardState::FrontEdgeFound);
            assert!(matches!(fault, GeometryFault::NoFrontEdge { .. }));
        }
        other => panic!("expected a front edge failure, got {:?}", other.map(|r| r.text())),
    }
}

#[test]
fn card_running_off_the_image_is_misregistered() {
    let options = ScanOptions {
        front: 1075.0,
        ..ScanOptions::default()
    };
    match default_reader().read(&scan("X", &options)) {
        Err(ReadError::Geometry(GeometryError { stage, fault })) => {
            assert_eq!(stage, CardState::GeometryBuilt);
            assert!(matches!(fault, GeometryFault::OutOfBounds { .. }));
        }
        other => panic!("expected misregistration, got {:?}", other.map(|r| r.text())),
    }
}

#[test]
fn overlay_marks_found_holes() {
    let grid = scan("1", &ScanOptions::default());
    let config = ReaderConfig::default();
    let reading = CardReader::new(config.clone()).unwrap().read(&grid).unwrap();
    let overlay = render_overlay(&grid, &reading.diagnostics, &config);
    assert_eq!(overlay.dimensions(), (600, 1181));

    let hole = reading.diagnostics.columns[0]
        .holes
        .iter()
        .find(|h| h.punched)
        .unwrap();
    let (hx, hy) = config.probe_half();
    let corner = (hole.measured.x as u32 - hx, hole.measured.y as u32 - hy);
    assert_eq!(overlay.get_pixel(corner.0, corner.1).0, [255, 255, 255]);
}
