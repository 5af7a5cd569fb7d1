use retarget_rbf::{
    config::Params,
    generate_random_points,
    interpolant_config::{BasisKind, InterpolantSettings},
    point_arrays_to_csv,
    progress::{closure_sink, ProgressMsg},
    ControlPointSet, FittedModel, TestDeformations,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A stand-in source body: vertices scattered through a 0.4 x 0.3 x 1.8 box.
    let num_vertices = 2000;
    let mut source_vertices = generate_random_points(num_vertices, 3, Some(42));
    source_vertices
        .row_iter_mut()
        .for_each(|row| {
            row.iter_mut()
                .zip([0.4, 0.3, 1.8])
                .for_each(|(element, extent)| *element *= extent);
        });

    // The target body is 10% taller and carries a bulge around the belly.
    let target_vertices = TestDeformations::bulge(
        &TestDeformations::uniform_scale(&source_vertices, 1.1),
        &[0.2, 0.25, 1.1],
        0.4,
    );

    // Thin the mesh pairs before fitting; the dense solve grows with the cube
    // of the number of control points.
    let control_points = ControlPointSet::new(source_vertices.clone(), target_vertices)?.proxy(4)?;

    let (sink, listener) = closure_sink(256, |msg| match msg {
        ProgressMsg::Message { message } => println!("{message}"),
        ProgressMsg::PolynomialReduced { rank } => {
            println!("control points span a reduced affine space of rank {rank}")
        }
        ProgressMsg::SolverFallback { lu_residual, rank } => println!(
            "LU rejected (residual {lu_residual:e}), least-squares solve with rank {rank}"
        ),
        ProgressMsg::EvaluationProgress { chunk, num_chunks, .. } => {
            if chunk == num_chunks {
                println!("mapped {num_chunks} chunks");
            }
        }
    });

    let settings = InterpolantSettings::builder(BasisKind::PolyharmonicSpline).build();

    let model = FittedModel::builder(control_points, settings)
        .params(Params::builder().parallel_evaluation(true).build())
        .progress_callback(sink)
        .fit()?;

    // Bone heads and tails, mapped 100 at a time.
    let bones = generate_random_points(60, 3, Some(7));
    let mapped_bones = model.evaluate_chunked(&bones, 100)?;

    // Every source vertex, as a skinned mesh would be mapped.
    let mapped_vertices = model.evaluate(&source_vertices)?;

    let out_dir = std::env::temp_dir();
    point_arrays_to_csv(
        &mapped_bones,
        &out_dir.join("retargeted_bones.csv").to_string_lossy(),
    )?;
    point_arrays_to_csv(
        &mapped_vertices,
        &out_dir.join("retargeted_vertices.csv").to_string_lossy(),
    )?;
    model.save_model(out_dir.join("body_retarget.json"))?;

    println!(
        "solved with {:?}, relative residual {:e}",
        model.solve_report().method,
        model.solve_report().relative_residual
    );

    drop(model);
    let _ = listener.join();

    Ok(())
}
