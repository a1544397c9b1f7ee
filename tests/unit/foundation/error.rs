use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CdpError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(CdpError::input("x").to_string().contains("input error:"));
    assert!(
        CdpError::output_missing("x")
            .to_string()
            .contains("output missing:")
    );
    assert!(
        CdpError::envelope("x")
            .to_string()
            .contains("envelope error:")
    );
    assert!(
        CdpError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn stage_errors_name_the_stage() {
    let timeout = CdpError::stage_timeout("pvoc anal", 1500);
    assert!(timeout.to_string().contains("pvoc anal"));
    assert!(timeout.to_string().contains("1500"));

    let failure = CdpError::stage_failure("modify brassage", "ERROR: bad arg");
    assert!(failure.to_string().contains("ERROR: bad arg"));
}

#[test]
fn superseded_is_silent_and_configuration_is_fatal() {
    assert!(CdpError::Superseded { epoch: 3 }.is_silent());
    assert!(!CdpError::input("x").is_silent());
    assert!(CdpError::configuration("x").is_fatal());
    assert!(!CdpError::stage_failure("a", "b").is_fatal());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CdpError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
