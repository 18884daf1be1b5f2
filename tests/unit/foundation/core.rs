use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
    assert_eq!(r.len_frames(), 3);
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(2)).is_err());
    assert!(
        FrameRange::new(FrameIndex(3), FrameIndex(3))
            .unwrap()
            .is_empty()
    );
}

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert!((Fps::new(60, 2).unwrap().frames_to_secs(30) - 1.0).abs() < 1e-12);
}

#[test]
fn srgb_hex_decodes_to_linear() {
    let white = Rgb::from_srgb_hex(0xffffff);
    assert!((white.r - 1.0).abs() < 1e-6);
    assert!((white.b - 1.0).abs() < 1e-6);

    let c = Rgb::from_srgb_hex(0x808080);
    assert!((c.g - 0.2158605).abs() < 1e-4);
}

#[test]
fn parse_srgb_accepts_hash_and_rejects_garbage() {
    assert_eq!(
        Rgb::parse_srgb("#00ffcc").unwrap(),
        Rgb::from_srgb_hex(0x00ffcc)
    );
    assert_eq!(
        Rgb::parse_srgb("8800ff").unwrap(),
        Rgb::from_srgb_hex(0x8800ff)
    );
    assert!(Rgb::parse_srgb("#fff").is_err());
    assert!(Rgb::parse_srgb("#zzzzzz").is_err());
}

#[test]
fn srgb_encode_inverts_decode() {
    for i in 0..=10 {
        let c = i as f32 / 10.0;
        assert!((linear_to_srgb(srgb_to_linear(c)) - c).abs() < 1e-4);
    }
    assert_eq!(linear_to_srgb(4.0), 1.0);
    assert_eq!(linear_to_srgb(-1.0), 0.0);
}

#[test]
fn srgb_encode_reaches_white_exactly() {
    assert_eq!(linear_to_srgb(1.0), 1.0);
    assert_eq!(linear_to_srgb(srgb_to_linear(1.0)), 1.0);
    assert!(linear_to_srgb(0.999_9) < 1.0);
    assert_eq!((linear_to_srgb(1.0) * 255.0).round() as u8, 255);
}

#[test]
fn canvas_aspect_handles_zero_height() {
    assert_eq!(
        Canvas {
            width: 10,
            height: 0
        }
        .aspect(),
        1.0
    );
    assert_eq!(
        Canvas {
            width: 200,
            height: 100
        }
        .aspect(),
        2.0
    );
}

#[test]
fn srgb_hex_serializes_as_hash_string() {
    let c = SrgbHex(0x000020);
    assert_eq!(serde_json::to_string(&c).unwrap(), "\"#000020\"");
    let back: SrgbHex = serde_json::from_str("\"#8800FF\"").unwrap();
    assert_eq!(back, SrgbHex(0x8800ff));
    assert!(serde_json::from_str::<SrgbHex>("\"blue\"").is_err());
}
