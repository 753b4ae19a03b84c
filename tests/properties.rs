use proptest::prelude::*;
use ricciflow::prelude::*;
use std::f64::consts::PI;

fn grid_flow_state(
    nx: usize,
    ny: usize,
    factors: &[f64],
) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>, f64)> {
    let mut mesh: RicciFlowMesh = primitives::grid(nx, ny).into();
    let mut flow = RicciFlow::new(&mut mesh, CornerConcentration, RicciFlowOptions::default())?;

    let n = flow.mesh().topology().num_vertices();
    for (i, &u) in factors.iter().cycle().take(n).enumerate() {
        flow.mesh_mut().vertex_mut(VertexId::new(i)).u = u;
    }

    flow.compute_edge_lengths();
    flow.compute_corner_angles()?;
    flow.compute_vertex_curvature();

    let mesh = flow.mesh();
    let lengths = mesh.topology().edge_ids().map(|e| mesh.edge(e).length).collect();
    let angles = mesh
        .topology()
        .halfedge_ids()
        .filter(|&he| !mesh.topology().is_boundary_halfedge(he))
        .map(|he| mesh.corner_angle(he))
        .collect();
    let curvature = mesh.topology().vertex_ids().map(|v| mesh.vertex(v).k).collect();
    let chi = mesh.topology().euler_characteristic() as f64;
    Ok((lengths, angles, curvature, chi))
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn gauss_bonnet_holds_for_any_conformal_factor(
        nx in 1usize..5,
        ny in 1usize..5,
        factors in prop::collection::vec(-1.0f64..1.0, 1..32),
    ) {
        let (_, angles, curvature, chi) = grid_flow_state(nx, ny, &factors).unwrap();

        let total: f64 = curvature.iter().sum();
        prop_assert!((total - 2.0 * PI * chi).abs() < 1e-9, "total = {total}");

        for a in angles {
            prop_assert!(a > 0.0 && a < PI);
        }
    }

    #[test]
    fn derived_quantities_are_deterministic(
        nx in 1usize..4,
        ny in 1usize..4,
        factors in prop::collection::vec(-1.0f64..1.0, 1..16),
    ) {
        let first = grid_flow_state(nx, ny, &factors).unwrap();
        let second = grid_flow_state(nx, ny, &factors).unwrap();

        let bits = |xs: &[f64]| xs.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        prop_assert_eq!(bits(&first.0), bits(&second.0));
        prop_assert_eq!(bits(&first.1), bits(&second.1));
        prop_assert_eq!(bits(&first.2), bits(&second.2));
    }

    #[test]
    fn gauss_bonnet_holds_after_a_solve(
        nx in 2usize..5,
        ny in 2usize..5,
        rounds in 1usize..4,
    ) {
        let mut mesh: RicciFlowMesh = primitives::grid(nx, ny).into();
        let target = BoundaryCircularization::new(mesh.topology(), OuterLoop::Longest).unwrap();
        let options = RicciFlowOptions::default()
            .with_method(SolveMethod::NewtonWithTargetRefresh)
            .with_max_refresh_rounds(rounds);
        RicciFlow::new(&mut mesh, target, options).unwrap().calculate_metric().unwrap();

        let chi = mesh.topology().euler_characteristic() as f64;
        let total = mesh.total_curvature();
        prop_assert!((total - 2.0 * PI * chi).abs() < 1e-9, "total = {total}");
    }

    #[test]
    fn edge_lengths_follow_conformal_factors(
        factors in prop::collection::vec(-2.0f64..2.0, 7),
    ) {
        let mut mesh: RicciFlowMesh = primitives::hexagon_fan().into();
        let mut flow = RicciFlow::new(&mut mesh, CornerConcentration, RicciFlowOptions::default()).unwrap();
        for (i, &u) in factors.iter().enumerate() {
            flow.mesh_mut().vertex_mut(VertexId::new(i)).u = u;
        }
        flow.compute_edge_lengths();

        let mesh = flow.mesh();
        for e in mesh.topology().edge_ids() {
            let [a, b] = mesh.topology().edge_vertices(e);
            let expected = mesh.vertex(a).u.exp() + mesh.vertex(b).u.exp();
            prop_assert!((mesh.edge(e).length - expected).abs() < 1e-12);
        }
    }
}
