use primvar_refiner::far;

/// Refinement tables of a closed curve with `len` control vertices: cubic
/// B-spline weights for vertex data, midpoints for varying data.
fn closed_curve_refinement(len: usize) -> far::Refinement {
    let mut vertex = far::StencilTable::with_capacity(2 * len, 5 * len);
    let mut varying = far::StencilTable::with_capacity(2 * len, 3 * len);

    for i in 0..len {
        let prev = ((i + len - 1) % len) as u32;
        let next = ((i + 1) % len) as u32;
        let i = i as u32;

        vertex.push(&[prev, i, next], &[0.125, 0.75, 0.125]);
        vertex.push(&[i, next], &[0.5, 0.5]);

        varying.push(&[i], &[1.0]);
        varying.push(&[i, next], &[0.5, 0.5]);
    }

    far::Refinement::new(vertex, varying, Vec::new())
}

fn main() {
    env_logger::init();

    // A square control polygon.
    let vertices = [
        -0.5, -0.5, 0.0, //
        0.5, -0.5, 0.0, //
        0.5, 0.5, 0.0, //
        -0.5, 0.5, 0.0,
    ];

    // Refine up to 'max level' of 3.
    let max_level = 3;

    let mut refiner = far::TopologyRefiner::new(far::TopologyLevel::new(vertices.len() / 3, 0));
    let mut len = vertices.len() / 3;
    for _ in 0..max_level {
        refiner
            .add_refinement(closed_curve_refinement(len))
            .expect("Could not add refinement");
        len *= 2;
    }

    // Interpolate vertex primvar data.
    let primvar_refiner = far::PrimvarRefiner::new(&refiner);

    // Create a vector holding all the subdivison levels.
    let mut refined_verts = Vec::with_capacity(max_level + 1);

    refined_verts.push(vertices.to_vec());

    for level in 0..max_level {
        refined_verts.push(
            primvar_refiner
                .interpolate_to_vec(
                    far::InterpolationMode::Vertex,
                    3, // Each element is a 3-tuple.
                    level,
                    refined_verts[level].as_slice(),
                )
                .unwrap(),
        );
    }

    // Output an OBJ of the highest level.
    println!("o subdivision_curve");

    let points = refined_verts.last().unwrap();
    for v in points.chunks(3) {
        println!("v {} {} {}", v[0], v[1], v[2]);
    }

    print!("l");
    for i in 0..points.len() / 3 {
        print!(" {}", i + 1);
    }
    println!(" 1");
}
