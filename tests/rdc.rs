/* ************************************************************************ **
** This file is part of rdc2, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! End-to-end: parsed settings in, per-step observables out.

#[macro_use]
extern crate rdc2_assert_close;

use rdc2::array_types::V3;
use rdc2::kernel::config::Settings;
use rdc2::kernel::{DIPOLAR_CONST, Rdc};
use rdc2::structure::Cell;

fn settings_of_yaml(yaml: &str) -> Settings {
    serde_yaml::from_str(yaml).unwrap()
}

#[test]
fn direct_pipeline() {
    let settings = settings_of_yaml(r#"
atoms: [[20, 21], [37, 38]]
gyrom: 1.0
"#);
    let rdc = Rdc::from_settings(&settings).unwrap();
    assert!(rdc.supports_derivatives());

    let evaluator = match rdc {
        Rdc::Direct(ref evaluator) => evaluator,
        #[cfg(feature = "svd-support")]
        Rdc::Svd(_) => panic!("svd mode was not requested"),
    };

    let cell = Cell::orthorhombic(50.0, 50.0, 50.0).unwrap();
    let positions = vec![
        // bond 0 along z at unit length: D = -K
        V3([0.0, 0.0, 0.0]), V3([0.0, 0.0, 1.0]),
        // bond 1 in the xy plane: cos(theta) = 0, so D = -0.5 * Dmax = K / 2
        V3([1.0, 1.0, 0.0]), V3([2.0, 1.0, 0.0]),
    ];
    let out = evaluator.compute(&positions, &cell);

    assert_close!(rel=1e-12, out.couplings[0], -DIPOLAR_CONST);
    assert_close!(rel=1e-12, out.couplings[1], 0.5 * DIPOLAR_CONST);

    // forces balance within each bond
    for i in 0..2 {
        assert_eq!(out.gradients[2 * i + 1], -out.gradients[2 * i]);
    }

    let components = rdc.components("rdc");
    assert_eq!(components[0].name, "rdc_0");
    assert!(components.iter().all(|c| c.with_derivatives));
}

#[test]
fn serial_setting_changes_nothing_but_the_worker_count() {
    let parallel = settings_of_yaml("atoms: [[1, 2], [3, 4], [5, 6]]\ngyrom: -72.5388");
    let serial = settings_of_yaml("atoms: [[1, 2], [3, 4], [5, 6]]\ngyrom: -72.5388\nserial: true");

    let parallel = match Rdc::from_settings(&parallel).unwrap() {
        Rdc::Direct(evaluator) => evaluator,
        #[cfg(feature = "svd-support")]
        _ => unreachable!(),
    };
    let serial = match Rdc::from_settings(&serial).unwrap() {
        Rdc::Direct(evaluator) => evaluator,
        #[cfg(feature = "svd-support")]
        _ => unreachable!(),
    };
    assert_eq!(serial.num_workers(), 1);

    let cell = Cell::orthorhombic(20.0, 20.0, 20.0).unwrap();
    let positions: Vec<V3> = (0..6)
        .map(|i| V3([i as f64 * 0.7, (i % 2) as f64, 1.0 + i as f64 * 0.3]))
        .collect();

    let a = parallel.compute(&positions, &cell);
    let b = serial.compute(&positions, &cell);
    assert_eq!(a.couplings, b.couplings);
    assert_eq!(a.gradients, b.gradients);
}

#[test]
fn config_errors_name_the_offender() {
    let err = Rdc::from_settings(&settings_of_yaml(r#"
atoms: [[1, 2], [3, 4], [5, 6, 7]]
"#)).unwrap_err();
    assert!(err.to_string().contains("atoms group 3"), "{}", err);

    let err = Rdc::from_settings(&settings_of_yaml(r#"
atoms: [[1, 2], [3, 4]]
gyrom: [1.0, 2.0, 3.0]
"#)).unwrap_err();
    assert!(err.to_string().contains("gyrom"), "{}", err);
}

#[cfg(feature = "svd-support")]
mod svd {
    use super::*;

    #[test]
    fn svd_pipeline_reproduces_exact_data() {
        // experimental couplings generated exactly from one alignment
        // tensor over six independent orientations; the fit must reproduce
        // them to near machine precision
        let tensor = [8e-4, -3e-4, 1e-4, -2e-4, 5e-5]; // xx yy xy xz yz
        let gyrom = -72.5388;

        let orientations = [
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.6, 0.8],
            [0.6, 0.0, 0.8],
            [0.577350269189626, 0.577350269189626, 0.577350269189626],
            [0.267261241912424, 0.534522483824849, 0.801783725737273],
        ];
        let mut positions = Vec::new();
        let mut couplings = Vec::new();
        for mu in &orientations {
            positions.push(V3([1.0, 2.0, 3.0]));
            positions.push(V3([1.0 + mu[0], 2.0 + mu[1], 3.0 + mu[2]]));

            let row = [
                mu[0] * mu[0] - mu[2] * mu[2],
                mu[1] * mu[1] - mu[2] * mu[2],
                2.0 * mu[0] * mu[1],
                2.0 * mu[0] * mu[2],
                2.0 * mu[1] * mu[2],
            ];
            let dmax = -DIPOLAR_CONST * gyrom; // unit bond length
            let forward: f64 = row.iter().zip(&tensor).map(|(a, b)| a * b).sum();
            couplings.push(forward * dmax);
        }

        let settings = Settings {
            atoms: (0..orientations.len()).map(|i| vec![2 * i + 1, 2 * i + 2]).collect(),
            gyrom: rdc2::kernel::config::PerBond::Broadcast(gyrom),
            scale: rdc2::kernel::config::PerBond::Broadcast(1.0),
            coupling: couplings.clone(),
            serial: false,
            svd: true,
        };

        let rdc = Rdc::from_settings(&settings).unwrap();
        assert!(!rdc.supports_derivatives());
        let fitter = match rdc {
            Rdc::Svd(fitter) => fitter,
            Rdc::Direct(_) => panic!("svd mode was requested"),
        };

        let cell = Cell::orthorhombic(50.0, 50.0, 50.0).unwrap();
        let out = fitter.compute(&positions, &cell).unwrap();
        assert_close!(rel=1e-9, abs=1e-12, out.couplings, couplings);
        assert_close!(rel=1e-7, abs=1e-12, out.tensor.s_xx, tensor[0]);
        assert_close!(rel=1e-7, abs=1e-12, out.tensor.s_zz(), -tensor[0] - tensor[1]);
    }
}
