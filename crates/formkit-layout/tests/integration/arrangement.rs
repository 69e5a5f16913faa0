//! Arrangement integration tests
//!
//! These tests verify that components receive the right bounds:
//! - Cells follow the computed track origins and sizes
//! - Alignment defaults come from the first spanned track
//! - Insets shrink the cell before alignment
//! - Hidden components are left alone

use formkit_layout::{CellAlignment, CellConstraint, Dimension, Grid, Insets, Rect};

use crate::support::{
    assert_bounds, assert_contiguous, assert_inside, converter, init_tracing, FormHost,
};

#[test]
fn test_label_and_field_form() {
    init_tracing();
    let mut grid = Grid::from_specs("10dlu, 4dlu, pref", "p, 3dlu, p")
        .unwrap()
        .with_converter(converter());
    grid.add_encoded("label", "1, 1, ff").unwrap();
    grid.add_encoded("field", "3, 3").unwrap();
    let mut host = FormHost::new().widget("label", 40, 14).widget("field", 50, 16);

    // 10dlu = 15px, 4dlu = 6px, 3dlu = 5px
    assert_eq!(grid.compute_natural_size(&host), Dimension::new(71, 35));

    let content = Rect::new(12, 8, 71, 35);
    grid.arrange(&mut host, content);

    assert_bounds(host.bounds("label"), Rect::new(12, 8, 15, 14));
    assert_bounds(host.bounds("field"), Rect::new(33, 27, 50, 16));
    assert_contiguous(&grid.layout_info(&host, content), (12, 8));
}

#[test]
fn test_span_uses_first_track_alignment() {
    let mut grid = Grid::from_specs("right:50px, 50px", "40px, 40px")
        .unwrap()
        .with_converter(converter());
    grid.add("default", CellConstraint::xywh(1, 1, 2, 1)).unwrap();
    grid.add_encoded("explicit", "1, 2, 2, 1, ct").unwrap();
    let mut host = FormHost::new()
        .widget("default", 20, 10)
        .widget("explicit", 20, 10);

    grid.arrange(&mut host, Rect::new(0, 0, 100, 80));

    // right of the 100px span, centered in the row
    assert_bounds(host.bounds("default"), Rect::new(80, 15, 20, 10));
    assert_bounds(host.bounds("explicit"), Rect::new(40, 40, 20, 10));
}

#[test]
fn test_insets_shrink_the_cell() {
    let mut grid = Grid::from_specs("100px", "50px, 50px")
        .unwrap()
        .with_converter(converter());
    grid.add(
        "filled",
        CellConstraint::xy(1, 1)
            .with_alignment(CellAlignment::Fill, CellAlignment::Fill)
            .with_insets(Insets::uniform(5)),
    )
    .unwrap();
    grid.add(
        "trailing",
        CellConstraint::xy(1, 2)
            .with_alignment(CellAlignment::Trailing, CellAlignment::Trailing)
            .with_insets(Insets::new(0, 0, 4, 8)),
    )
    .unwrap();
    let mut host = FormHost::new()
        .widget("filled", 10, 10)
        .widget("trailing", 30, 20);

    grid.arrange(&mut host, Rect::new(0, 0, 100, 100));

    assert_bounds(host.bounds("filled"), Rect::new(5, 5, 90, 40));
    assert_bounds(host.bounds("trailing"), Rect::new(62, 76, 30, 20));
}

#[test]
fn test_components_stay_inside_cells() {
    let mut grid = Grid::from_specs(
        "pref, 4dlu, fill:pref:grow",
        "p, 3dlu, p, 3dlu, fill:p:grow",
    )
    .unwrap()
    .with_converter(converter());
    grid.add_encoded("name_label", "1, 1").unwrap();
    grid.add_encoded("name", "3, 1").unwrap();
    grid.add_encoded("notes_label", "1, 3, r, t").unwrap();
    grid.add_encoded("notes", "3, 3").unwrap();
    grid.add_encoded("summary", "1, 5, 3, 1").unwrap();
    let mut host = FormHost::new()
        .widget("name_label", 30, 10)
        .widget("name", 60, 12)
        .widget("notes_label", 35, 10)
        .widget("notes", 60, 14)
        .widget("summary", 80, 40);

    let natural = grid.compute_natural_size(&host);
    assert_eq!(natural, Dimension::new(35 + 6 + 60, 12 + 5 + 14 + 5 + 40));

    for width in (natural.width..natural.width + 120).step_by(7) {
        for height in (natural.height..natural.height + 90).step_by(9) {
            let content = Rect::new(10, 10, width, height);
            grid.arrange(&mut host, content);
            let info = grid.layout_info(&host, content);
            assert_contiguous(&info, (10, 10));

            for placement in grid.placements() {
                let bounds = host.bounds(placement.component).unwrap();
                let cell = info.cell_rect(&placement.constraint).unwrap();
                assert_inside(bounds, cell);
                assert_inside(bounds, content);
            }
        }
    }
}

#[test]
fn test_hidden_components_keep_old_bounds() {
    let mut grid = Grid::from_specs("pref, pref", "pref")
        .unwrap()
        .with_converter(converter());
    grid.add("shown", CellConstraint::xy(1, 1)).unwrap();
    grid.add("hidden", CellConstraint::xy(2, 1)).unwrap();
    let mut host = FormHost::new().widget("shown", 30, 10).widget("hidden", 40, 20);

    grid.arrange(&mut host, Rect::new(0, 0, 70, 20));
    assert_bounds(host.bounds("hidden"), Rect::new(30, 0, 40, 20));

    host.set_visible("hidden", false);
    assert_eq!(grid.compute_natural_size(&host), Dimension::new(30, 10));
    grid.arrange(&mut host, Rect::new(5, 5, 30, 10));
    assert_bounds(host.bounds("shown"), Rect::new(5, 5, 30, 10));
    assert_bounds(host.bounds("hidden"), Rect::new(30, 0, 40, 20));

    host.set_visible("hidden", true);
    assert_eq!(grid.compute_natural_size(&host), Dimension::new(70, 20));
}

#[test]
fn test_unmeasurable_component_fills_or_collapses() {
    let mut grid = Grid::from_specs("40px", "20px, 20px")
        .unwrap()
        .with_converter(converter());
    grid.add("filled", CellConstraint::xy(1, 1)).unwrap();
    grid.add_encoded("centered", "1, 2, c, c").unwrap();
    let mut host = FormHost::new();

    grid.arrange(&mut host, Rect::new(0, 0, 40, 40));

    // column fills by default; the row centers a zero height
    assert_bounds(host.bounds("filled"), Rect::new(0, 10, 40, 0));
    assert_bounds(host.bounds("centered"), Rect::new(20, 30, 0, 0));
}
