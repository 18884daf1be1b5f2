use super::*;
use crate::foundation::core::Fps;

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("nebula-png-{tag}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn frame(width: u32, height: u32, px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data: px.repeat((width * height) as usize),
        premultiplied: true,
    }
}

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::default(),
    }
}

#[test]
fn unpremultiply_restores_straight_color() {
    let mut dst = [0u8; 12];
    unpremultiply_rgba8(&mut dst, &[128, 64, 0, 128, 10, 20, 30, 255, 9, 9, 9, 0]).unwrap();
    assert_eq!(&dst[0..4], &[255, 128, 0, 128]);
    assert_eq!(&dst[4..8], &[10, 20, 30, 255]);
    assert_eq!(&dst[8..12], &[0, 0, 0, 0]);
}

#[test]
fn unpremultiply_rejects_ragged_input() {
    let mut dst = [0u8; 6];
    assert!(unpremultiply_rgba8(&mut dst, &[0; 6]).is_err());
}

#[test]
fn writes_numbered_frames_that_decode_back() {
    let dir = temp_dir("seq");
    let mut sink = PngSequenceSink::new(&dir, "frame_");
    sink.begin(cfg(4, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(4, 2, [0, 0, 64, 128])).unwrap();
    sink.push_frame(FrameIndex(3), &frame(4, 2, [255, 255, 255, 255])).unwrap();
    sink.end().unwrap();

    assert_eq!(sink.written().len(), 2);
    assert_eq!(sink.written()[1], dir.join("frame_00003.png"));

    let img = image::open(dir.join("frame_00000.png")).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (4, 2));
    assert_eq!(img.get_pixel(1, 1).0, [0, 0, 128, 128]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn rejects_out_of_order_and_mismatched_frames() {
    let dir = temp_dir("order");
    let mut sink = PngSequenceSink::new(&dir, "f");
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(5), &frame(2, 2, [0, 0, 0, 255])).unwrap();
    assert!(sink.push_frame(FrameIndex(5), &frame(2, 2, [0, 0, 0, 255])).is_err());
    assert!(sink.push_frame(FrameIndex(6), &frame(3, 2, [0, 0, 0, 255])).is_err());
    sink.end().unwrap();
    assert!(sink.end().is_err());
    let _ = std::fs::remove_dir_all(&dir);
}
