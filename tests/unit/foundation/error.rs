use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        AugmentError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(AugmentError::buffer("x").to_string().contains("buffer error:"));
    assert!(
        AugmentError::transform("x")
            .to_string()
            .contains("transform error:")
    );
    assert!(
        AugmentError::UnknownGroup("g".to_owned())
            .to_string()
            .contains("'g'")
    );
}

#[test]
fn script_error_names_group_and_step() {
    let err = AugmentError::script("crop", 2, ScriptError::new(4, "boom"));
    let s = err.to_string();
    assert!(s.contains("'crop'"));
    assert!(s.contains("step 2"));
    assert!(s.contains("boom"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = AugmentError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
