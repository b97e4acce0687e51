use tof_core::{
    AppliedFocus, BankFocus, CalibrationConstant, DetectorGeometry, DetectorPosition, FocusError,
    FocusErrorCategory, FocusRequest, FocusTarget, FocusedSpectrumBuilder, Histogram,
    SpectrumMetadata, XScale,
};

fn tof_spectrum(group_id: i32) -> Histogram {
    let x_scale = XScale::variable(&[2000.0, 2100.0, 2250.0, 2450.0, 2700.0]).expect("scale");
    Histogram::new(
        x_scale,
        vec![4.0, 9.0, 16.0, 25.0],
        Some(vec![2.0, 3.0, 4.0, 5.0]),
        group_id,
    )
    .expect("spectrum")
}

#[test]
fn identity_geometry_relabel_is_a_no_op() {
    let spectrum = tof_spectrum(3);
    let metadata = SpectrumMetadata::default()
        .with_position(DetectorPosition::in_scattering_plane(1.0, 30.0))
        .with_initial_path(1.0);

    let focused = FocusedSpectrumBuilder::default()
        .build(FocusRequest::new(
            &spectrum,
            &metadata,
            FocusTarget::new(1.0, 30.0, 3),
        ))
        .expect("relabel should succeed");

    let before = spectrum.x_scale().boundaries();
    let after = focused.histogram.x_scale().boundaries();
    assert_eq!(before.len(), after.len());
    for (old, new) in before.iter().zip(&after) {
        assert!(((new - old) / old).abs() < 1.0e-5, "{old} -> {new}");
    }
    assert!(!focused.histogram.x_scale().is_uniform());
}

#[test]
fn doubling_the_path_doubles_the_boundaries() {
    let spectrum = tof_spectrum(3);
    let metadata = SpectrumMetadata::default()
        .with_position(DetectorPosition::in_scattering_plane(1.5, 90.0))
        .with_initial_path(0.5);

    let focused = FocusedSpectrumBuilder::default()
        .relabel(&spectrum, &metadata, &FocusTarget::new(3.5, 90.0, 8))
        .expect("relabel should succeed");

    let before = spectrum.x_scale().boundaries();
    let after = focused.histogram.x_scale().boundaries();
    for (old, new) in before.iter().zip(&after) {
        assert!((new / old - 2.0).abs() < 1.0e-5, "{old} -> {new}");
    }
    assert_eq!(focused.histogram.group_id(), 8);
}

#[test]
fn zero_degree_target_is_invalid() {
    let spectrum = tof_spectrum(3);
    let metadata = SpectrumMetadata::default()
        .with_position(DetectorPosition::in_scattering_plane(1.0, 30.0))
        .with_initial_path(1.0);

    let error = FocusedSpectrumBuilder::default()
        .build(FocusRequest::new(
            &spectrum,
            &metadata,
            FocusTarget::new(1.0, 0.0, 3),
        ))
        .expect_err("zero angle should fail");

    assert!(error.to_string().contains("Invalid angle"));
    assert_eq!(error.category(), FocusErrorCategory::InputValidationError);
    assert_eq!(
        error.diagnostic_line(),
        "ERROR: [INPUT.INVALID_TARGET] Invalid angle 0"
    );
}

#[test]
fn monitor_off_the_beam_line_is_rejected() {
    let monitor = Histogram::new(
        XScale::uniform(0.0, 20000.0, 201).expect("scale"),
        vec![1.0; 200],
        None,
        1,
    )
    .expect("monitor");
    let metadata = SpectrumMetadata::default()
        .with_position(DetectorPosition::new(5.0, 0.02, 0.0))
        .with_initial_path(10.0);
    let bank = BankFocus::new(DetectorGeometry::new(12.0, 90.0, 80.0, 100.0));

    let error = FocusedSpectrumBuilder::default()
        .build(
            FocusRequest::new(&monitor, &metadata, FocusTarget::new(2.0, 90.0, 100))
                .with_bank(bank),
        )
        .expect_err("off-axis monitor should fail");

    match error {
        FocusError::OffBeamAxis {
            group_id,
            distance,
            tolerance,
        } => {
            assert_eq!(group_id, 1);
            assert!((distance - 0.02).abs() < 1.0e-6);
            assert_eq!(tolerance, 0.01);
        }
        other => panic!("expected off-axis error, got {other:?}"),
    }
}

#[test]
fn bank_bins_beyond_monitor_range_are_zero() {
    let monitor = Histogram::new(
        XScale::uniform(0.0, 100.0, 11).expect("scale"),
        vec![3.0; 10],
        None,
        1,
    )
    .expect("monitor");
    let destination = XScale::uniform(0.0, 300.0, 31).expect("destination");
    let metadata = SpectrumMetadata::default()
        .with_position(DetectorPosition::new(0.0, 0.0, 0.0))
        .with_initial_path(10.0);
    let bank = BankFocus::new(DetectorGeometry::new(10.0, 90.0, 90.0, 90.0))
        .with_destination(&destination);

    let focused = FocusedSpectrumBuilder::default()
        .focus_to_bank(&monitor, &metadata, &FocusTarget::new(2.0, 90.0, 100), bank)
        .expect("out of coverage bins are not an error");

    let values = focused.histogram.values();
    assert_eq!(values.len(), 30);
    assert!(values[..10].iter().all(|value| *value == 3.0));
    assert!(values[10..].iter().all(|value| *value == 0.0));
    assert_eq!(focused.histogram.x_scale(), &destination);
    assert!(matches!(
        focused.applied,
        AppliedFocus::Bank {
            out_of_coverage: 20,
            ..
        }
    ));
}

#[test]
fn calibrated_focus_uses_difc_ratio() {
    let spectrum = tof_spectrum(9);
    let metadata = SpectrumMetadata::default()
        .with_position(DetectorPosition::in_scattering_plane(1.2, 150.0))
        .with_initial_path(20.0)
        .with_calibration(CalibrationConstant::new(10_000.0));
    let target = FocusTarget::new(1.0, 60.0, 1);

    let focused = FocusedSpectrumBuilder::default()
        .relabel(&spectrum, &metadata, &target)
        .expect("calibrated relabel should succeed");

    let new_difc = 2.0 * 252.816 * 0.5 * 21.0;
    let factor = new_difc / 10_000.0;
    let before = spectrum.x_scale().boundaries();
    let after = focused.histogram.x_scale().boundaries();
    for (old, new) in before.iter().zip(&after) {
        assert!((f64::from(*new) - f64::from(*old) * factor).abs() < 1.0e-3);
    }
    assert_eq!(focused.metadata.calibration, None);
    assert_eq!(focused.histogram.errors(), spectrum.errors());
}
