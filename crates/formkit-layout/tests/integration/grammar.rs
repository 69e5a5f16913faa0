//! Encoded grammar integration tests
//!
//! These tests verify that encoded track and cell strings:
//! - Decode to the expected track specs
//! - Survive an encode/decode round trip
//! - Report malformed input with the offending token

use formkit_layout::{
    Axis, CellAlignment, CellConstraint, ConfigurationError, Grid, LayoutError, LayoutMap,
    MeasureMode, ParseErrorKind, Size, TrackAlignment, TrackSpec,
};

use crate::support::{converter, init_tracing, FormHost};

#[test]
fn test_decode_mixed_columns() {
    init_tracing();
    let specs =
        TrackSpec::decode_list(Axis::Horizontal, "right:max(50dlu;pref), 4dlu, fill:10dlu:1.0")
            .unwrap();
    assert_eq!(specs.len(), 3);

    let alignments: Vec<TrackAlignment> = specs.iter().map(TrackSpec::default_alignment).collect();
    assert_eq!(
        alignments,
        vec![TrackAlignment::Trailing, TrackAlignment::Fill, TrackAlignment::Fill]
    );

    // middle is an unweighted fixed gap
    assert!(specs[1].size().is_constant());
    assert_eq!(specs[1].resize_weight(), 0.0);

    // third is growable
    assert!(specs[2].can_grow());
    assert_eq!(specs[2].resize_weight(), 1.0);
    assert!(!specs[0].can_grow());
}

#[test]
fn test_unknown_alignment_names_token() {
    let result: Result<Grid<u32>, _> = Grid::from_specs("bogus:10dlu", "p");
    let Err(LayoutError::Parse(err)) = result else {
        panic!("Expected a parse error");
    };
    assert_eq!(err.kind, ParseErrorKind::UnknownAlignment);
    assert_eq!(err.token, "bogus");
    assert!(err.to_string().contains("bogus"));
}

#[test]
fn test_track_lists_round_trip() {
    let lists = [
        (Axis::Horizontal, "right:max(50dlu;pref), 4dlu, fill:10dlu:1.0"),
        (Axis::Horizontal, "l:p, 3dlu, c:[20mm,pref,2in]:g, min(pref;100px)"),
        (Axis::Vertical, "top:pref, 3dlu, b:default:grow(0.25), 1.5cm, 12pt"),
        (Axis::Vertical, "p, $gap, 2*(p, 3dlu), fill:0:1"),
        (Axis::Horizontal, "4dluX, 3dluY, max(2dluY;pref)"),
    ];
    let mut map = LayoutMap::new();
    map.insert("gap", "7dlu");

    for (axis, source) in lists {
        let decoded = TrackSpec::decode_list_with_map(axis, source, &map).unwrap();
        let encoded = TrackSpec::encode_list(&decoded);
        let again = TrackSpec::decode_list(axis, &encoded).unwrap();
        assert_eq!(again, decoded, "{source} -> {encoded}");
    }
}

#[test]
fn test_explicit_dialog_units() {
    let specs = TrackSpec::decode_list(Axis::Horizontal, "4dluX, 3dluY").unwrap();
    assert_eq!(TrackSpec::encode_list(&specs), "4dluX, 3dluY");

    let grid: Grid<&'static str> = Grid::from_specs("4dluX, 8dluY", "8dluY, 4dluX")
        .unwrap()
        .with_converter(converter());
    let host = FormHost::new();

    // fallback base units 6 x 12, whatever the track axis
    assert_eq!(
        grid.track_sizes(&host, Axis::Horizontal, MeasureMode::Preferred),
        vec![6, 12]
    );
    assert_eq!(
        grid.track_sizes(&host, Axis::Vertical, MeasureMode::Preferred),
        vec![12, 6]
    );
}

#[test]
fn test_grid_from_specs_with_variables() {
    let mut map = LayoutMap::new();
    map.insert("label", "right:pref");
    map.insert("gap", "3dlu");

    let grid: Grid<u32> =
        Grid::from_specs_with_map("$label, $gap, pref:grow", "3*(p, $gap), p", &map).unwrap();
    assert_eq!(grid.column_count(), 3);
    assert_eq!(grid.row_count(), 7);
    assert_eq!(
        grid.column_spec(1).unwrap().default_alignment(),
        TrackAlignment::Trailing
    );
    assert_eq!(TrackSpec::encode_list(grid.rows()), "pref, 3dlu, pref, 3dlu, pref, 3dlu, pref");
}

#[test]
fn test_unknown_variable() {
    let result: Result<Grid<u32>, _> = Grid::from_specs("pref, $missing", "p");
    let Err(LayoutError::Parse(err)) = result else {
        panic!("Expected a parse error");
    };
    assert_eq!(err.kind, ParseErrorKind::UnknownVariable);
    assert_eq!(err.position, 6);
}

#[test]
fn test_add_encoded_constraint() {
    let mut grid: Grid<u32> = Grid::from_specs("p, p, p, p", "p, p, p, p, p").unwrap();
    grid.add_encoded(1, "3, 5, 2, 1, fc").unwrap();

    let constraint = grid.constraints(&1).unwrap();
    assert_eq!(
        *constraint,
        CellConstraint::xywh(3, 5, 2, 1).with_alignment(CellAlignment::Fill, CellAlignment::Center)
    );
    assert_eq!(constraint.to_string(), "3, 5, 2, 1, fc");
}

#[test]
fn test_add_encoded_errors() {
    let mut grid: Grid<u32> = Grid::from_specs("p, p", "p").unwrap();

    assert!(matches!(
        grid.add_encoded(1, "1, one"),
        Err(LayoutError::Parse(_))
    ));
    assert!(matches!(
        grid.add_encoded(1, "2, 1, 2, 1"),
        Err(LayoutError::Configuration(ConfigurationError::CellOutOfRange { .. }))
    ));
    assert!(grid.placements().is_empty());
}

#[test]
fn test_wrong_axis_specs_rejected() {
    let result: Result<Grid<u32>, _> = Grid::new(
        vec![TrackSpec::column(Size::PREFERRED)],
        vec![TrackSpec::column(Size::PREFERRED)],
    );
    assert_eq!(
        result.unwrap_err(),
        ConfigurationError::AxisMismatch {
            expected: Axis::Vertical,
            found: Axis::Horizontal,
        }
    );
}
