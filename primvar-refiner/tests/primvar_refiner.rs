//! Tests for primvar refinement.


use std::sync::Arc;

use primvar_refiner::far::{
    InterpolationMode, Primvar, PrimvarRefiner, Refinement, StencilTable, Topology, TopologyLevel,
    TopologyRefiner,
};
use primvar_refiner::{Error, Index};
use test_utils::*;

const MODES: [InterpolationMode; 4] = [
    InterpolationMode::Vertex,
    InterpolationMode::Varying,
    InterpolationMode::FaceUniform,
    InterpolationMode::FaceVarying,
];

/// Four base vertices, one child vertex blending vertices 0 and 3.
fn blend_refiner(indices: &[u32], weights: &[f32]) -> TopologyRefiner {
    let mut vertex = StencilTable::default();
    vertex.push(indices, weights);

    let mut refiner = TopologyRefiner::new(TopologyLevel::new(4, 0));
    refiner
        .add_refinement(Refinement::new(vertex.clone(), vertex, Vec::new()))
        .expect("Tables are consistent");
    refiner
}

#[test]
fn test_weighted_blend_of_colors() -> anyhow::Result<()> {
    init_logger();
    let refiner = blend_refiner(&[0, 3], &[0.5, 0.5]);
    let primvar_refiner = PrimvarRefiner::new(&refiner);

    let colors = [
        Primvar([1.0, 0.0, 0.0]),
        Primvar([0.0, 1.0, 0.0]),
        Primvar([0.0, 0.0, 1.0]),
        Primvar([1.0, 1.0, 1.0]),
    ];
    let mut refined = [Primvar::<3>::default()];
    primvar_refiner.interpolate(0, &colors, &mut refined)?;
    assert_eq!(refined, [Primvar([1.0, 0.5, 0.5])]);

    // Same through the flat, width-dispatched path.
    let flat: Vec<f32> = colors.iter().flat_map(|color| color.0).collect();
    let mut refined = [0.0f32; 3];
    primvar_refiner.interpolate_flat(InterpolationMode::Vertex, 3, 0, &flat, &mut refined)?;
    assert_eq!(refined, [1.0, 0.5, 0.5]);

    Ok(())
}

#[test]
fn test_empty_stencil_clears_destination() -> anyhow::Result<()> {
    let refiner = blend_refiner(&[], &[]);
    let primvar_refiner = PrimvarRefiner::new(&refiner);

    let mut refined = [7.0f32];
    primvar_refiner.interpolate_flat(
        InterpolationMode::Vertex,
        1,
        0,
        &[1.0, 2.0, 3.0, 4.0],
        &mut refined,
    )?;
    assert_eq!(refined, [0.0]);

    Ok(())
}

#[test]
fn test_invalid_width_leaves_destination_untouched() {
    init_logger();
    let refiner = identity_refiner(2);
    let primvar_refiner = PrimvarRefiner::new(&refiner);

    for width in [0, 5, 16, usize::MAX] {
        for mode in MODES {
            let src = vec![1.0f32; 2 * width.min(16)];
            let mut dst = vec![-1.0f32; 2 * width.min(16)];

            let result = primvar_refiner.interpolate_flat(mode, width, 0, &src, &mut dst);

            assert_eq!(result, Err(Error::InvalidWidth(width)));
            assert!(dst.iter().all(|&value| value == -1.0));
            assert_eq!(
                primvar_refiner.interpolate_to_vec(mode, width, 0, &src),
                Err(Error::InvalidWidth(width))
            );
        }
    }
}

#[test]
fn test_all_widths_dispatch() -> anyhow::Result<()> {
    let refiner = grid_refiner(1, 1);
    let primvar_refiner = PrimvarRefiner::new(&refiner);

    for width in 1..=4 {
        // Vertex i holds (i, i, ...).
        let src: Vec<f32> = (0..4).flat_map(|i| vec![i as f32; width]).collect();
        let refined =
            primvar_refiner.interpolate_to_vec(InterpolationMode::Varying, width, 0, &src)?;

        assert_eq!(refined.len(), 9 * width);
        // The face center is the average of all four corners.
        assert_close(&refined[4 * width..5 * width], &vec![1.5; width]);
    }

    Ok(())
}

#[test]
fn test_face_uniform_inherits_parent_value() -> anyhow::Result<()> {
    let refiner = identity_refiner(3);
    let primvar_refiner = PrimvarRefiner::new(&refiner);

    let src = [Primvar([1.0, 2.0]), Primvar([3.0, 4.0]), Primvar([5.0, 6.0])];
    let mut dst = [Primvar([f32::NAN; 2]); 3];
    primvar_refiner.interpolate_face_uniform(0, &src, &mut dst)?;
    assert_eq!(dst, src);

    // Material ids on a grid: every child face carries its parent's id.
    let refiner = grid_refiner(2, 1);
    let primvar_refiner = PrimvarRefiner::new(&refiner);

    let material_ids = [10.0f32, 20.0, 30.0, 40.0];
    let refined =
        primvar_refiner.interpolate_to_vec(InterpolationMode::FaceUniform, 1, 0, &material_ids)?;

    assert_eq!(
        refined,
        [
            10.0, 10.0, 20.0, 20.0, //
            10.0, 10.0, 20.0, 20.0, //
            30.0, 30.0, 40.0, 40.0, //
            30.0, 30.0, 40.0, 40.0,
        ]
    );

    Ok(())
}

#[test]
fn test_vertex_and_varying_agree_on_identity_topology() -> anyhow::Result<()> {
    let refiner = identity_refiner(4);
    let primvar_refiner = PrimvarRefiner::new(&refiner);

    let src = [[0.5f32, -1.0], [2.0, 3.0], [4.5, 0.0], [-7.0, 1.25]];
    let mut vertex = [[0.0f32; 2]; 4];
    let mut varying = [[0.0f32; 2]; 4];

    primvar_refiner.interpolate(0, &src, &mut vertex)?;
    primvar_refiner.interpolate_varying(0, &src, &mut varying)?;

    assert_eq!(vertex, src);
    assert_eq!(vertex, varying);

    Ok(())
}

#[test]
fn test_vertex_and_varying_differ_on_smooth_topology() -> anyhow::Result<()> {
    let refiner = grid_refiner(2, 1);
    let primvar_refiner = PrimvarRefiner::new(&refiner);

    // A bump in the middle vertex.
    let mut heights = [0.0f32; 9];
    heights[4] = 1.0;

    let smooth = primvar_refiner.interpolate_to_vec(InterpolationMode::Vertex, 1, 0, &heights)?;
    let linear = primvar_refiner.interpolate_to_vec(InterpolationMode::Varying, 1, 0, &heights)?;

    // The child of the middle vertex sits at (2, 2) in the 5 x 5 child grid.
    assert_eq!(linear[12], 1.0);
    assert!((smooth[12] - 0.5625).abs() < 1e-6);

    Ok(())
}

#[test]
fn test_constant_values_stay_constant() -> anyhow::Result<()> {
    let refiner = grid_refiner(2, 2);
    let primvar_refiner = PrimvarRefiner::new(&refiner);
    let value = Primvar([0.25, -3.0, 8.0, 1.0]);

    for level in 0..2 {
        let level_counts = |level: usize| refiner.level(level).expect("Level should exist");
        let (parent, child) = (level_counts(level), level_counts(level + 1));

        let vertices = vec![value; parent.vertex_count()];
        let mut refined = vec![Primvar::default(); child.vertex_count()];

        primvar_refiner.interpolate(level, &vertices, &mut refined)?;
        refined.iter().for_each(|v| assert_close(&v.0, &value.0));

        primvar_refiner.interpolate_varying(level, &vertices, &mut refined)?;
        refined.iter().for_each(|v| assert_close(&v.0, &value.0));

        let faces = vec![value; parent.face_count()];
        let mut refined = vec![Primvar::default(); child.face_count()];
        primvar_refiner.interpolate_face_uniform(level, &faces, &mut refined)?;
        refined.iter().for_each(|v| assert_close(&v.0, &value.0));

        let corners = vec![value; parent.face_varying_value_count(0).unwrap()];
        let mut refined = vec![Primvar::default(); child.face_varying_value_count(0).unwrap()];
        primvar_refiner.interpolate_face_varying(level, &corners, &mut refined)?;
        refined.iter().for_each(|v| assert_close(&v.0, &value.0));
    }

    Ok(())
}

#[test]
fn test_face_varying_channels_refine_independently() -> anyhow::Result<()> {
    // Two faces sharing an edge. Channel 0 is continuous (4 values), channel
    // 1 has a seam along the shared edge (6 values).
    let base = TopologyLevel::new(4, 2)
        .with_face_varying_channel(4)
        .with_face_varying_channel(6);

    let mut continuous = StencilTable::default();
    continuous.push(&[1, 2], &[0.5, 0.5]);

    // Each side of the seam gets its own midpoint.
    let mut seamed = StencilTable::default();
    seamed.push(&[1, 2], &[0.5, 0.5]).push(&[3, 4], &[0.5, 0.5]);

    let mut refiner = TopologyRefiner::new(base);
    refiner.add_refinement(
        Refinement::new(StencilTable::default(), StencilTable::default(), vec![Index(0), Index(1)])
            .with_face_varying_channel(continuous)
            .with_face_varying_channel(seamed),
    )?;

    let primvar_refiner = PrimvarRefiner::new(&refiner);

    let uvs = [[0.0f32, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    let mut refined = [[0.0f32; 2]; 1];
    primvar_refiner.interpolate_face_varying(0, &uvs, &mut refined)?;
    assert_eq!(refined, [[1.0, 0.5]]);

    let uvs = [
        [0.0f32, 0.0],
        [0.5, 0.0],
        [0.5, 1.0],
        [0.6, 0.0],
        [0.6, 1.0],
        [1.0, 1.0],
    ];
    let mut refined = [[0.0f32; 2]; 2];
    primvar_refiner.interpolate_face_varying_channel(0, 1, &uvs, &mut refined)?;
    assert_eq!(refined, [[0.5, 0.5], [0.6, 0.5]]);

    assert_eq!(
        primvar_refiner.interpolate_face_varying_channel(0, 2, &uvs, &mut refined),
        Err(Error::InvalidChannel { channel: 2, count: 2 })
    );

    Ok(())
}

#[test]
fn test_invalid_level() {
    let refiner = grid_refiner(1, 1);
    let primvar_refiner = PrimvarRefiner::new(&refiner);

    // There is no refinement step starting at the finest level.
    let src = [0.0f32; 9];
    let mut dst = [0.0f32; 25];
    assert_eq!(
        primvar_refiner.interpolate(1, &src, &mut dst),
        Err(Error::InvalidLevel { level: 1, max: 1 })
    );
    assert_eq!(
        primvar_refiner.interpolate_to_vec(InterpolationMode::Vertex, 1, 7, &src),
        Err(Error::InvalidLevel { level: 7, max: 1 })
    );
}

#[test]
fn test_invalid_buffer_sizes() {
    let refiner = grid_refiner(1, 1);
    let primvar_refiner = PrimvarRefiner::new(&refiner);

    let mut dst = [0.0f32; 9];
    assert_eq!(
        primvar_refiner.interpolate(0, &[0.0f32; 3], &mut dst),
        Err(Error::InvalidBufferSize {
            expected: 4,
            actual: 3
        })
    );

    let mut dst = [0.0f32; 8];
    assert_eq!(
        primvar_refiner.interpolate_varying(0, &[0.0f32; 4], &mut dst),
        Err(Error::InvalidBufferSize {
            expected: 9,
            actual: 8
        })
    );

    // Flat buffers are checked in floats.
    let mut dst = [0.0f32; 27];
    assert_eq!(
        primvar_refiner.interpolate_flat(InterpolationMode::Vertex, 3, 0, &[0.0; 11], &mut dst),
        Err(Error::InvalidBufferSize {
            expected: 12,
            actual: 11
        })
    );
}

#[test]
fn test_topology_accessor() {
    let refiner = grid_refiner(1, 1);
    let primvar_refiner = PrimvarRefiner::new(&refiner);

    assert!(std::ptr::eq(primvar_refiner.topology_refiner(), &refiner));
    assert_eq!(primvar_refiner.topology_refiner().max_level(), 1);
}

#[test]
fn test_dropping_primvar_refiner_keeps_topology() -> anyhow::Result<()> {
    let refiner = grid_refiner(1, 1);

    let first = PrimvarRefiner::new(&refiner);
    let copy = first.clone();
    drop(first);
    // The clone outlives the original.
    let refined = copy.interpolate_to_vec(InterpolationMode::Vertex, 1, 0, &[1.0; 4])?;
    assert_eq!(refined, [1.0; 9]);

    // A refiner moved into a thread is destroyed when the thread ends.
    let moved = PrimvarRefiner::new(&refiner);
    std::thread::scope(|scope| {
        scope
            .spawn(move || {
                moved
                    .interpolate_to_vec(InterpolationMode::Varying, 1, 0, &[2.0; 4])
                    .map(|refined| refined.len())
            })
            .join()
            .expect("Thread should not panic")
    })?;

    assert_eq!(refiner.max_level(), 1);
    assert_eq!(refiner.level(1).unwrap().vertex_count(), 9);

    let second = PrimvarRefiner::new(&refiner);
    let refined = second.interpolate_to_vec(InterpolationMode::Vertex, 1, 0, &[1.0; 4])?;
    assert_eq!(refined.len(), refiner.level(1).unwrap().vertex_count());

    Ok(())
}

#[test]
fn test_concurrent_refinement_matches_sequential() {
    let refiner = grid_refiner(4, 2);
    let positions = grid_positions(4);

    let sequential = PrimvarRefiner::new(&refiner)
        .interpolate_to_vec(InterpolationMode::Vertex, 3, 0, &positions)
        .expect("Sequential refinement");

    let (a, b) = std::thread::scope(|scope| {
        let refine = || {
            let primvar_refiner = PrimvarRefiner::new(&refiner);
            primvar_refiner.interpolate_to_vec(InterpolationMode::Vertex, 3, 0, &positions)
        };
        let a = scope.spawn(refine);
        let b = scope.spawn(refine);
        (a.join().unwrap(), b.join().unwrap())
    });

    assert_eq!(a.expect("Thread a"), sequential);
    assert_eq!(b.expect("Thread b"), sequential);
}

/// A topology owned elsewhere and shared through an `Arc`.
struct SharedTopology(Arc<TopologyRefiner>);

impl Topology for SharedTopology {
    fn max_level(&self) -> usize {
        self.0.max_level()
    }

    fn level(&self, level: usize) -> Option<&TopologyLevel> {
        self.0.level(level)
    }

    fn refinement(&self, level: usize) -> Option<&Refinement> {
        self.0.refinement(level)
    }
}

#[test]
fn test_external_topology() -> anyhow::Result<()> {
    let refiner = Arc::new(grid_refiner(1, 1));
    let shared = SharedTopology(Arc::clone(&refiner));

    let corners = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0];
    let expected = PrimvarRefiner::new(refiner.as_ref())
        .interpolate_to_vec(InterpolationMode::Vertex, 2, 0, &corners)?;

    let primvar_refiner = PrimvarRefiner::new(&shared);
    let refined = primvar_refiner.interpolate_to_vec(InterpolationMode::Vertex, 2, 0, &corners)?;
    assert_eq!(refined, expected);

    // Trait objects work, too.
    let dynamic: &dyn Topology = &shared;
    let primvar_refiner = PrimvarRefiner::new(dynamic);
    assert_eq!(primvar_refiner.element_counts(InterpolationMode::FaceUniform, 0)?, (1, 4));

    Ok(())
}

/// A topology that hands out its tables without any checks.
struct UncheckedTopology {
    levels: [TopologyLevel; 2],
    refinement: Refinement,
}

impl Topology for UncheckedTopology {
    fn max_level(&self) -> usize {
        1
    }

    fn level(&self, level: usize) -> Option<&TopologyLevel> {
        self.levels.get(level)
    }

    fn refinement(&self, level: usize) -> Option<&Refinement> {
        (level == 0).then_some(&self.refinement)
    }
}

#[test]
fn test_out_of_range_stencil_index_is_an_error() {
    init_logger();

    let mut stencils = StencilTable::default();
    stencils.push(&[7], &[1.0]);

    let topology = UncheckedTopology {
        levels: [
            TopologyLevel::new(2, 1).with_face_varying_channel(2),
            TopologyLevel::new(1, 1).with_face_varying_channel(1),
        ],
        refinement: Refinement::new(stencils.clone(), stencils.clone(), vec![Index(3)])
            .with_face_varying_channel(stencils),
    };
    let primvar_refiner = PrimvarRefiner::new(&topology);

    assert_eq!(
        primvar_refiner.interpolate_to_vec(InterpolationMode::Vertex, 1, 0, &[1.0, 2.0]),
        Err(Error::IndexOutOfBounds { index: 7, max: 2 })
    );
    assert_eq!(
        primvar_refiner.interpolate_to_vec(InterpolationMode::Varying, 2, 0, &[0.0; 4]),
        Err(Error::IndexOutOfBounds { index: 7, max: 2 })
    );
    assert_eq!(
        primvar_refiner.interpolate_to_vec(InterpolationMode::FaceVarying, 3, 0, &[0.0; 6]),
        Err(Error::IndexOutOfBounds { index: 7, max: 2 })
    );

    let mut dst = [0.0f32];
    assert_eq!(
        primvar_refiner.interpolate_face_uniform(0, &[5.0f32], &mut dst),
        Err(Error::IndexOutOfBounds { index: 3, max: 1 })
    );
}
