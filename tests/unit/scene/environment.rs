use super::*;
use crate::foundation::core::{Canvas, Rgb};
use crate::scene::component::Mount;

fn stage() -> Stage {
    Stage::new(Canvas {
        width: 16,
        height: 16,
    })
}

#[test]
fn mount_applies_the_night_look() {
    let mut st = stage();
    let _m = Mount::new(SceneEnvironment::default(), &mut st).unwrap();
    assert_eq!(st.tone_mapping, ToneMapping::AcesFilmic);
    assert_eq!(st.exposure, 1.8);
    let fog = st.fog.unwrap();
    assert_eq!(fog.density, 0.01);
    assert_eq!(fog.color, Rgb::from_srgb_hex(0x000020));
    assert_eq!(st.background, Some(Rgb::from_srgb_hex(0x000020)));
}

#[test]
fn unmount_restores_previous_parameters() {
    let mut st = stage();
    st.tone_mapping = ToneMapping::Linear;
    st.exposure = 0.7;
    let mut m = Mount::new(SceneEnvironment::default(), &mut st).unwrap();
    m.advance(&Tick::at(4.0)).unwrap();
    m.dispose(&mut st);
    assert_eq!(st.tone_mapping, ToneMapping::Linear);
    assert_eq!(st.exposure, 0.7);
    assert!(st.fog.is_none());
    assert!(st.background.is_none());
}

#[test]
fn unavailable_stage_is_left_untouched() {
    let mut st = stage();
    st.suspend();
    let err = Mount::new(SceneEnvironment::default(), &mut st).err().unwrap();
    assert!(err.is_mount_failure());
    assert_eq!(st.tone_mapping, ToneMapping::None);
    assert!(st.fog.is_none());
}

#[test]
fn config_accepts_partial_json() {
    let cfg: EnvironmentConfig =
        serde_json::from_str(r##"{"exposure": 1.2, "background": "#102030"}"##).unwrap();
    assert_eq!(cfg.exposure, 1.2);
    assert_eq!(cfg.background, SrgbHex(0x102030));
    assert_eq!(cfg.tone_mapping, ToneMapping::AcesFilmic);
    assert!(cfg.validate().is_ok());

    let bad = EnvironmentConfig {
        exposure: 0.0,
        ..EnvironmentConfig::default()
    };
    assert!(bad.validate().is_err());
}
