//! Editier-Operationen auf einer Pipeline.
//!
//! Die Editoren sind zustandslose Funktionsgruppen (`fn op(pipeline: &mut Pipeline, ...)`),
//! nur der [`PipelineEditor`] hält einen Anker über mehrere Aufrufe.

pub mod connection;
pub mod divide;
pub mod main_editor;
pub mod morph;
pub mod pipeline_editor;
pub mod points;
pub mod replace;
pub mod selection;

pub use connection::{
    connect_beams, connect_bent_pipes, connect_flanges, connect_pipes, connect_valves,
    generic_structure_connection,
};
pub use divide::{
    divide_structures, divide_structures_by_projection, divide_structures_evenly,
    preview_divide_structures, preview_divide_structures_by_projection,
    preview_divide_structures_evenly,
};
pub use main_editor::{
    add_bend, add_elbow, add_structure_deltas, collapse_overloaded_bends,
    collapse_selected_bends, get_point_tangency, recalculate_curvatures,
    remove_selected_structures,
};
pub use morph::{morph_structure, morph_structures};
pub use pipeline_editor::{snap_to_point, Anchor, PipelineEditor};
pub use points::{attach_point, detach_point, merge_coincident_points, move_point, move_selected_points};
pub use replace::replace_structures;
pub use selection::{
    clear_selection, select_all_structures, select_points, select_points_of_selected_structures,
    select_structures, select_structures_at_selected_points,
};
