//! Editing integration tests
//!
//! These tests verify that a grid stays consistent when its tracks and
//! placements change after construction.

use formkit_layout::{
    Axis, CellConstraint, ConfigurationError, Dimension, Grid, Rect, Size, TrackSpec, Unit,
};

use crate::support::{assert_bounds, converter, FormHost};

#[test]
fn test_inserted_column_moves_components_right() {
    let mut grid = Grid::from_specs("pref, pref", "pref")
        .unwrap()
        .with_converter(converter());
    grid.add("first", CellConstraint::xy(1, 1)).unwrap();
    grid.add("second", CellConstraint::xy(2, 1)).unwrap();
    let mut host = FormHost::new().widget("first", 30, 10).widget("second", 40, 10);

    let gap = TrackSpec::column(Size::constant(10.0, Unit::Pixel).unwrap());
    grid.insert_column(2, gap).unwrap();
    grid.arrange(&mut host, Rect::new(0, 0, 80, 10));

    assert_eq!(TrackSpec::encode_list(grid.columns()), "pref, 10px, pref");
    assert_bounds(host.bounds("first"), Rect::new(0, 0, 30, 10));
    assert_bounds(host.bounds("second"), Rect::new(40, 0, 40, 10));
}

#[test]
fn test_removed_row_pulls_components_up() {
    let mut grid = Grid::from_specs("pref", "p, 5px, p")
        .unwrap()
        .with_converter(converter());
    grid.add("top", CellConstraint::xy(1, 1)).unwrap();
    grid.add("bottom", CellConstraint::xy(1, 3)).unwrap();
    let mut host = FormHost::new().widget("top", 20, 10).widget("bottom", 20, 10);

    assert_eq!(grid.compute_natural_size(&host).height, 25);
    let removed = grid.remove_row(2).unwrap();
    assert_eq!(removed.encode(), "5px");

    grid.arrange(&mut host, Rect::new(0, 0, 20, 20));
    assert_eq!(grid.constraints(&"bottom").unwrap().row, 2);
    assert_bounds(host.bounds("bottom"), Rect::new(0, 10, 20, 10));
}

#[test]
fn test_appended_tracks_accept_new_components() {
    let mut grid = Grid::from_specs("pref", "pref")
        .unwrap()
        .with_converter(converter());
    grid.add("a", CellConstraint::xy(1, 1)).unwrap();
    assert!(matches!(
        grid.add("b", CellConstraint::xy(2, 1)),
        Err(ConfigurationError::CellOutOfRange { .. })
    ));

    grid.append_column(TrackSpec::decode(Axis::Horizontal, "4dlu").unwrap())
        .unwrap();
    grid.append_column(TrackSpec::decode(Axis::Horizontal, "pref:grow").unwrap())
        .unwrap();
    grid.add("b", CellConstraint::xy(3, 1)).unwrap();
    let host = FormHost::new().widget("a", 20, 10).widget("b", 30, 10);

    assert_eq!(grid.compute_natural_size(&host), Dimension::new(20 + 6 + 30, 10));
    let info = grid.layout_info(&host, Rect::new(0, 0, 100, 10));
    assert_eq!(info.column_widths, vec![20, 6, 74]);
}

#[test]
fn test_moving_and_removing_components() {
    let mut grid = Grid::from_specs("pref, pref", "pref")
        .unwrap()
        .with_converter(converter());
    grid.add("wide", CellConstraint::xy(1, 1)).unwrap();
    grid.add("narrow", CellConstraint::xy(2, 1)).unwrap();
    let mut host = FormHost::new().widget("wide", 50, 10).widget("narrow", 10, 10);
    assert_eq!(grid.compute_natural_size(&host).width, 60);

    // swap columns by re-adding
    grid.add("wide", CellConstraint::xy(2, 1)).unwrap();
    grid.add("narrow", CellConstraint::xy(1, 1)).unwrap();
    grid.arrange(&mut host, Rect::new(0, 0, 60, 10));
    assert_bounds(host.bounds("narrow"), Rect::new(0, 0, 10, 10));
    assert_bounds(host.bounds("wide"), Rect::new(10, 0, 50, 10));

    assert_eq!(grid.remove(&"wide"), Some(CellConstraint::xy(2, 1)));
    assert_eq!(grid.compute_natural_size(&host), Dimension::new(10, 10));
    assert_eq!(grid.placements().len(), 1);
}

#[test]
fn test_group_survives_inserted_column() {
    let mut grid = Grid::from_specs("pref, pref", "pref")
        .unwrap()
        .with_converter(converter());
    grid.add("a", CellConstraint::xy(1, 1)).unwrap();
    grid.add("b", CellConstraint::xy(2, 1)).unwrap();
    grid.set_column_groups(vec![vec![1, 2]]).unwrap();
    let host = FormHost::new().widget("a", 20, 10).widget("b", 45, 10);

    grid.insert_column(2, TrackSpec::decode(Axis::Horizontal, "4dlu").unwrap())
        .unwrap();

    assert_eq!(grid.column_groups(), &[vec![1, 3]]);
    assert_eq!(
        grid.layout_info(&host, Rect::new(0, 0, 96, 10)).column_widths,
        vec![45, 6, 45]
    );
    assert_eq!(
        grid.remove_column(3),
        Err(ConfigurationError::TrackGrouped {
            axis: Axis::Horizontal,
            index: 3
        })
    );
}
